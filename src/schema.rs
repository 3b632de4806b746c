// Canonical column vocabulary and the normalizer that maps raw headers onto it.
use once_cell::sync::Lazy;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::Result;
use crate::frame::{datetime_series, is_datetime};
use crate::util::parse_datetime_safe;

pub const DATA_COLETA: &str = "DATA_COLETA";
pub const HORA_COLETA: &str = "HORA_COLETA";
pub const UMIDADE_SOLO: &str = "UMIDADE_SOLO";
pub const PH_SOLO: &str = "PH_SOLO";
pub const NITROGENIO_N: &str = "NITROGENIO_N";
pub const FOSFORO_P: &str = "FOSFORO_P";
pub const POTASSIO_K: &str = "POTASSIO_K";
pub const CHUVA_MM: &str = "CHUVA_MM";
pub const TEMP_C: &str = "TEMP_C";
pub const STATUS_IRRIGACAO: &str = "STATUS_IRRIGACAO";
pub const SUGESTAO: &str = "SUGESTAO";

/// Measurement columns offered for charting, in display order.
pub const MEASUREMENT_COLUMNS: [&str; 7] = [
    UMIDADE_SOLO,
    PH_SOLO,
    FOSFORO_P,
    POTASSIO_K,
    NITROGENIO_N,
    CHUVA_MM,
    TEMP_C,
];

pub const DEFAULT_CHART_COLUMNS: [&str; 4] = [UMIDADE_SOLO, PH_SOLO, FOSFORO_P, POTASSIO_K];

static COLUMN_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("data_coleta", DATA_COLETA),
        ("hora_coleta", HORA_COLETA),
        ("umidade_solo", UMIDADE_SOLO),
        ("ph_solo", PH_SOLO),
        ("nitrogenio_n", NITROGENIO_N),
        ("fosforo_p", FOSFORO_P),
        ("potassio_k", POTASSIO_K),
        ("chuva_mm", CHUVA_MM),
        ("temp_c", TEMP_C),
        ("status_irrigacao", STATUS_IRRIGACAO),
    ])
});

/// Canonical name for a raw header; unknown headers are upper-cased.
pub fn canonical_name(raw: &str) -> String {
    match COLUMN_MAP.get(raw.to_lowercase().as_str()) {
        Some(canonical) => canonical.to_string(),
        None => raw.to_uppercase(),
    }
}

/// Canonical names for `raw`, in order. A later header that lands on a name
/// already taken gets a `_DUPLICATED_<n>` suffix, so lookups find the first.
fn canonical_names<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    raw.into_iter()
        .map(|name| {
            let canonical = canonical_name(name);
            let mut candidate = canonical.clone();
            let mut n = 0;
            while taken.contains(&candidate) {
                candidate = format!("{}_DUPLICATED_{}", canonical, n);
                n += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// Rename every column to the canonical vocabulary and parse `DATA_COLETA`
/// into a datetime column. Values that are not dates become null.
pub fn normalize(df: DataFrame) -> Result<DataFrame> {
    let names = canonical_names(df.get_column_names());
    let columns: Vec<Series> = df
        .get_columns()
        .iter()
        .zip(&names)
        .map(|(series, name)| series.clone().with_name(name))
        .collect();
    let mut df = DataFrame::new(columns)?;

    let text = match df.column(DATA_COLETA) {
        Ok(series) if !is_datetime(series) => series.cast(&DataType::String)?,
        _ => return Ok(df),
    };
    let parsed: Vec<_> = text.str()?.into_iter().map(parse_datetime_safe).collect();
    let invalid = parsed.iter().filter(|v| v.is_none()).count();
    if invalid > 0 {
        debug!(invalid, rows = parsed.len(), "unparseable {} values set to null", DATA_COLETA);
    }
    df.with_column(datetime_series(DATA_COLETA, &parsed)?)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{has_column, timestamps};
    use chrono::NaiveDate;

    fn raw() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Data_Coleta", &["2024-01-05", "sem data"]),
            Series::new("umidade_solo", &[30.0, 45.0]),
            Series::new("sensor_id", &[Some("A"), None]),
            Series::new("TEMP_C", &[Some(20.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn maps_known_names_case_insensitively() {
        assert_eq!(canonical_name("umidade_solo"), UMIDADE_SOLO);
        assert_eq!(canonical_name("Chuva_MM"), CHUVA_MM);
        assert_eq!(canonical_name("STATUS_IRRIGACAO"), STATUS_IRRIGACAO);
        assert_eq!(canonical_name("sensor_id"), "SENSOR_ID");
    }

    #[test]
    fn normalize_renames_and_parses_dates() {
        let df = normalize(raw()).unwrap();
        assert_eq!(
            df.get_column_names(),
            vec![DATA_COLETA, UMIDADE_SOLO, "SENSOR_ID", TEMP_C]
        );
        let dates = timestamps(&df, DATA_COLETA).unwrap();
        assert_eq!(
            dates[0],
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(dates[1], None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(raw()).unwrap();
        let twice = normalize(once.clone()).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn frame_without_date_column_is_only_renamed() {
        let df = DataFrame::new(vec![Series::new("ph_solo", &[6.5])]).unwrap();
        let df = normalize(df).unwrap();
        assert_eq!(df.get_column_names(), vec![PH_SOLO]);
        assert!(!has_column(&df, DATA_COLETA));
    }

    #[test]
    fn numeric_date_column_becomes_null_timestamps() {
        let df = DataFrame::new(vec![Series::new("data_coleta", &[20240101.0])]).unwrap();
        let df = normalize(df).unwrap();
        assert_eq!(timestamps(&df, DATA_COLETA).unwrap(), vec![None]);
    }

    #[test]
    fn colliding_headers_keep_the_first_canonical_name() {
        let df = DataFrame::new(vec![
            Series::new("TEMP_C", &[30.0]),
            Series::new("temp_c", &[10.0]),
            Series::new("Temp_C", &[20.0]),
        ])
        .unwrap();
        let df = normalize(df).unwrap();
        assert_eq!(
            df.get_column_names(),
            vec![TEMP_C, "TEMP_C_DUPLICATED_0", "TEMP_C_DUPLICATED_1"]
        );
        assert_eq!(df.column(TEMP_C).unwrap().f64().unwrap().get(0), Some(30.0));
    }
}
