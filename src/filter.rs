// Period selection and the inclusive calendar-date filter on `DATA_COLETA`.
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::frame::{from_millis, is_datetime, to_millis};
use crate::schema::DATA_COLETA;
use crate::util::parse_date_safe;

/// Period chosen in the shell. A single date leaves the frame unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    Single(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl DateSelection {
    /// Parse `YYYY-MM-DD [YYYY-MM-DD]`; `None` on empty or malformed input.
    pub fn parse(input: &str) -> Option<DateSelection> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            [one] => parse_date_safe(Some(*one)).map(DateSelection::Single),
            [start, end] => Some(DateSelection::Range(
                parse_date_safe(Some(*start))?,
                parse_date_safe(Some(*end))?,
            )),
            _ => None,
        }
    }
}

/// `DATA_COLETA` as epoch milliseconds, when it is a datetime column.
fn date_millis(df: &DataFrame) -> Option<Int64Chunked> {
    let series = df.column(DATA_COLETA).ok()?;
    if !is_datetime(series) {
        return None;
    }
    let millis = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .and_then(|s| s.cast(&DataType::Int64))
        .ok()?;
    millis.i64().ok().cloned()
}

fn midnight_millis(day: NaiveDate) -> i64 {
    to_millis(day.and_time(chrono::NaiveTime::MIN))
}

/// Earliest and latest collection dates, ignoring nulls.
pub fn date_bounds(df: &DataFrame) -> Option<(NaiveDate, NaiveDate)> {
    let millis = date_millis(df)?;
    let first = from_millis(millis.min()?)?.date();
    let last = from_millis(millis.max()?)?.date();
    Some((first, last))
}

/// Keep rows whose `DATA_COLETA` date lies in the closed range.
///
/// The end date counts whole: a reading at 18:00 on `end` is kept. Frames
/// without parsed dates, and single-date selections, pass through.
pub fn filter_by_date(df: DataFrame, selection: &DateSelection) -> Result<DataFrame> {
    let DateSelection::Range(start, end) = *selection else {
        return Ok(df);
    };
    let Some(millis) = date_millis(&df) else {
        return Ok(df);
    };
    if millis.null_count() == millis.len() {
        return Ok(df);
    }
    let lower = midnight_millis(start);
    let upper = end.succ_opt().map_or(i64::MAX, midnight_millis);
    let mask = millis.gt_eq(lower) & millis.lt(upper);
    let kept = df.filter(&mask)?;
    debug!(%start, %end, kept = kept.height(), total = df.height(), "date filter applied");
    Ok(kept)
}
