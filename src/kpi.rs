// Indicator cards: column means over the filtered readings.
use polars::prelude::*;

use crate::schema::{CHUVA_MM, PH_SOLO, TEMP_C, UMIDADE_SOLO};
use crate::util::format_number;

struct KpiSpec {
    column: &'static str,
    label: &'static str,
    decimals: usize,
}

const KPI_CARDS: [KpiSpec; 4] = [
    KpiSpec { column: UMIDADE_SOLO, label: "Avg soil humidity (%)", decimals: 1 },
    KpiSpec { column: PH_SOLO, label: "Avg pH", decimals: 2 },
    KpiSpec { column: TEMP_C, label: "Avg temperature (°C)", decimals: 1 },
    KpiSpec { column: CHUVA_MM, label: "Avg rainfall (mm)", decimals: 1 },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub column: &'static str,
    pub label: &'static str,
    pub value: Option<f64>,
    pub decimals: usize,
}

impl Kpi {
    pub fn display_value(&self) -> String {
        self.value
            .map(|v| format_number(v, self.decimals))
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Mean of the numeric values of `series`; text cells count as null.
pub fn mean(series: &Series) -> Option<f64> {
    series.cast(&DataType::Float64).ok()?.mean()
}

/// One card per KPI column present in the frame, in fixed order.
pub fn kpi_cards(df: &DataFrame) -> Vec<Kpi> {
    KPI_CARDS
        .iter()
        .filter_map(|spec| {
            let series = df.column(spec.column).ok()?;
            Some(Kpi {
                column: spec.column,
                label: spec.label,
                value: mean(series),
                decimals: spec.decimals,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nulls() {
        assert_eq!(mean(&Series::new("x", &[Some(10.0), None, Some(20.0)])), Some(15.0));
        assert_eq!(mean(&Series::new("x", &[None::<f64>, None])), None);
        assert_eq!(mean(&Series::new_empty("x", &DataType::Float64)), None);
    }

    #[test]
    fn cards_only_for_present_columns_in_fixed_order() {
        let df = DataFrame::new(vec![
            Series::new(CHUVA_MM, &[1.0, 2.0]),
            Series::new(PH_SOLO, &[6.5, 6.0]),
        ])
        .unwrap();
        let cards = kpi_cards(&df);
        let columns: Vec<&str> = cards.iter().map(|k| k.column).collect();
        assert_eq!(columns, vec![PH_SOLO, CHUVA_MM]);
        assert_eq!(cards[0].display_value(), "6.25");
        assert_eq!(cards[1].display_value(), "1.5");
    }

    #[test]
    fn all_null_column_shows_dash() {
        let df = DataFrame::new(vec![Series::new(TEMP_C, &[Some("n/d"), None])]).unwrap();
        let cards = kpi_cards(&df);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].display_value(), "-");
    }
}
