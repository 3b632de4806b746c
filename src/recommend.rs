// Rule-based irrigation suggestion per sensor reading.
//
// Rules are evaluated top to bottom and the first match wins:
// - Rain at or above `RAIN_THRESHOLD_MM`: do not irrigate.
// - Soil humidity at or above `HUMIDITY_OK`: do not irrigate.
// - Hot (`TEMP_HIGH_C`) and dry (below `HUMIDITY_LOW`): irrigate heavily.
// - Humidity between `HUMIDITY_LOW` and `HUMIDITY_OK`: irrigate lightly.
// - Anything else: irrigate.
//
// Missing readings count as zero.
use polars::prelude::*;

use crate::frame::{float_values, has_column};
use crate::schema::{CHUVA_MM, SUGESTAO, TEMP_C, UMIDADE_SOLO};

pub const HUMIDITY_OK: f64 = 40.0;
pub const HUMIDITY_LOW: f64 = 30.0;
pub const TEMP_HIGH_C: f64 = 32.0;
pub const RAIN_THRESHOLD_MM: f64 = 3.0;

/// Columns that must all exist before suggestions are computed.
pub const REQUIRED_COLUMNS: [&str; 3] = [UMIDADE_SOLO, CHUVA_MM, TEMP_C];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suggestion {
    NaoIrrigar,
    IrrigarForte,
    IrrigarLeve,
    Irrigar,
}

impl Suggestion {
    pub fn label(self) -> &'static str {
        match self {
            Suggestion::NaoIrrigar => "NAO_IRRIGAR",
            Suggestion::IrrigarForte => "IRRIGAR_FORTE",
            Suggestion::IrrigarLeve => "IRRIGAR_LEVE",
            Suggestion::Irrigar => "IRRIGAR",
        }
    }
}

/// Classify one reading. Order of the checks matters.
pub fn suggest(humidity: f64, rain_mm: f64, temp_c: f64) -> Suggestion {
    if rain_mm >= RAIN_THRESHOLD_MM {
        return Suggestion::NaoIrrigar;
    }
    if humidity >= HUMIDITY_OK {
        return Suggestion::NaoIrrigar;
    }
    if temp_c >= TEMP_HIGH_C && humidity < HUMIDITY_LOW {
        return Suggestion::IrrigarForte;
    }
    if (HUMIDITY_LOW..HUMIDITY_OK).contains(&humidity) {
        return Suggestion::IrrigarLeve;
    }
    Suggestion::Irrigar
}

pub fn suggest_reading(
    humidity: Option<f64>,
    rain_mm: Option<f64>,
    temp_c: Option<f64>,
) -> Suggestion {
    suggest(
        humidity.unwrap_or(0.0),
        rain_mm.unwrap_or(0.0),
        temp_c.unwrap_or(0.0),
    )
}

/// Missing required columns, in rule order. Empty when suggestions can run.
pub fn missing_columns(df: &DataFrame) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !has_column(df, c))
        .collect()
}

/// The `SUGESTAO` column for `df`, or `None` when any input column is absent.
pub fn suggestion_column(df: &DataFrame) -> Option<Series> {
    let humidity = float_values(df, UMIDADE_SOLO)?;
    let rain = float_values(df, CHUVA_MM)?;
    let temp = float_values(df, TEMP_C)?;
    let labels: Vec<&str> = humidity
        .into_iter()
        .zip(rain)
        .zip(temp)
        .map(|((h, r), t)| suggest_reading(h, r, t).label())
        .collect();
    Some(Series::new(SUGESTAO, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        assert_eq!(suggest(40.0, 0.0, 20.0), Suggestion::NaoIrrigar);
        assert_eq!(suggest(39.999, 0.0, 20.0), Suggestion::IrrigarLeve);
        assert_eq!(suggest(29.999, 0.0, 32.0), Suggestion::IrrigarForte);
        assert_eq!(suggest(35.0, 0.0, 20.0), Suggestion::IrrigarLeve);
        assert_eq!(suggest(30.0, 2.999, 40.0), Suggestion::IrrigarLeve);
        assert_eq!(suggest(29.0, 0.0, 31.9), Suggestion::Irrigar);
    }

    #[test]
    fn earlier_rules_take_priority() {
        assert_eq!(suggest(25.0, 0.0, 35.0), Suggestion::IrrigarForte);
        assert_eq!(suggest(50.0, 0.0, 35.0), Suggestion::NaoIrrigar);
        // rain beats extreme heat and dry soil
        assert_eq!(suggest(10.0, 5.0, 40.0), Suggestion::NaoIrrigar);
        assert_eq!(suggest(10.0, 3.0, 32.0), Suggestion::NaoIrrigar);
    }

    #[test]
    fn result_is_always_one_of_the_labels() {
        let labels = ["NAO_IRRIGAR", "IRRIGAR_FORTE", "IRRIGAR_LEVE", "IRRIGAR"];
        for h in [-5.0, 0.0, 29.9, 30.0, 39.9, 40.0, 100.0] {
            for r in [0.0, 2.9, 3.0, 50.0] {
                for t in [-10.0, 0.0, 31.9, 32.0, 45.0] {
                    let s = suggest(h, r, t);
                    assert!(labels.contains(&s.label()));
                    if r >= RAIN_THRESHOLD_MM {
                        assert_eq!(s, Suggestion::NaoIrrigar);
                    }
                }
            }
        }
    }

    #[test]
    fn missing_values_count_as_zero() {
        assert_eq!(suggest_reading(None, None, None), Suggestion::Irrigar);
        assert_eq!(
            suggest_reading(Some(20.0), None, Some(33.0)),
            Suggestion::IrrigarForte
        );
    }

    fn labels(series: &Series) -> Vec<String> {
        series
            .str()
            .unwrap()
            .into_iter()
            .map(|s| s.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn column_requires_all_inputs() {
        let mut df = DataFrame::new(vec![
            Series::new(UMIDADE_SOLO, &[25.0]),
            Series::new(TEMP_C, &[35.0]),
        ])
        .unwrap();
        assert!(suggestion_column(&df).is_none());
        assert_eq!(missing_columns(&df), vec![CHUVA_MM]);

        df.with_column(Series::new(CHUVA_MM, &[None::<f64>])).unwrap();
        assert!(missing_columns(&df).is_empty());
        let col = suggestion_column(&df).unwrap();
        assert_eq!(col.name(), SUGESTAO);
        assert_eq!(labels(&col), vec!["IRRIGAR_FORTE"]);
    }

    #[test]
    fn rows_are_classified_independently() {
        let df = DataFrame::new(vec![
            Series::new(UMIDADE_SOLO, &[25.0, 50.0, 10.0]),
            Series::new(CHUVA_MM, &[0.0, 0.0, 5.0]),
            Series::new(TEMP_C, &[35.0, 35.0, 40.0]),
        ])
        .unwrap();
        let forward = labels(&suggestion_column(&df).unwrap());
        let mut reversed = labels(&suggestion_column(&df.reverse()).unwrap());
        reversed.reverse();
        assert_eq!(forward, reversed);
        assert_eq!(forward, vec!["IRRIGAR_FORTE", "NAO_IRRIGAR", "NAO_IRRIGAR"]);
    }
}
