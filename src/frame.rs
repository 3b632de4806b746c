// Small accessors over polars `DataFrame`s used by the pipeline stages.
//
// Collection timestamps are stored as `Datetime(ms)` columns holding naive
// local times, so conversions here never apply a time zone.
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().contains(&name)
}

pub fn is_datetime(series: &Series) -> bool {
    matches!(series.dtype(), DataType::Datetime(_, _))
}

pub fn to_millis(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

pub fn from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|t| t.naive_utc())
}

/// Build a `Datetime(ms)` series from optional timestamps.
pub fn datetime_series(name: &str, values: &[Option<NaiveDateTime>]) -> PolarsResult<Series> {
    let millis: Vec<Option<i64>> = values.iter().map(|t| t.map(to_millis)).collect();
    Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Values of `name` cast to `f64`. Cells that are not numbers become null.
pub fn float_values(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
    let cast = df.column(name).ok()?.cast(&DataType::Float64).ok()?;
    let values = cast.f64().ok()?.into_iter().collect();
    Some(values)
}

/// Timestamps of `name`, or `None` unless it is a datetime column.
pub fn timestamps(df: &DataFrame, name: &str) -> Option<Vec<Option<NaiveDateTime>>> {
    let series = df.column(name).ok()?;
    if !is_datetime(series) {
        return None;
    }
    let millis = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .and_then(|s| s.cast(&DataType::Int64))
        .ok()?;
    let values = millis
        .i64()
        .ok()?
        .into_iter()
        .map(|ms| ms.and_then(from_millis))
        .collect();
    Some(values)
}

/// Text shown for one cell in previews; nulls render empty.
pub fn cell_display(series: &Series, row: usize) -> String {
    match series.get(row) {
        Ok(AnyValue::Null) | Err(_) => String::new(),
        Ok(AnyValue::String(s)) => s.to_string(),
        Ok(AnyValue::Float64(v)) => format_cell_number(v),
        Ok(AnyValue::Datetime(ms, TimeUnit::Milliseconds, _)) => from_millis(ms)
            .map(|t| t.format(TIMESTAMP_FMT).to_string())
            .unwrap_or_default(),
        Ok(other) => other.to_string(),
    }
}

fn format_cell_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        v.to_string()
    }
}
