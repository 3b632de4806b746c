// Flexible CSV loading for sensor exports.
//
// Exports come from spreadsheets in two dialects: `;` with a decimal comma
// and plain `,`. Every column is read as text first and numeric columns are
// cast afterwards, so both dialects end up with `Float64` readings.
use crate::error::{DashboardError, Result};
use crate::util::parse_f64_safe;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub delimiter: char,
    pub rows: usize,
    pub columns: usize,
}

/// Read a sensor export, trying `;` first and falling back to `,` when that
/// fails or yields a single column.
pub fn read_csv_flex(path: &Path) -> Result<(DataFrame, LoadReport)> {
    read_with_fallback(path, |separator| read_with_separator(path, separator))
}

fn read_with_fallback<F>(path: &Path, mut attempt: F) -> Result<(DataFrame, LoadReport)>
where
    F: FnMut(u8) -> Result<DataFrame>,
{
    let (df, separator) = match attempt(b';') {
        Ok(df) if df.width() > 1 => (df, b';'),
        Ok(_) => {
            debug!(path = %path.display(), "';' parse yielded one column, retrying with ','");
            (attempt(b',')?, b',')
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "';' parse failed, retrying with ','");
            (attempt(b',')?, b',')
        }
    };
    let report = LoadReport {
        delimiter: separator as char,
        rows: df.height(),
        columns: df.width(),
    };
    info!(
        path = %path.display(),
        delimiter = %report.delimiter,
        rows = report.rows,
        columns = report.columns,
        "loaded sensor file"
    );
    Ok((df, report))
}

fn read_with_separator(path: &Path, separator: u8) -> Result<DataFrame> {
    let read_err = |source: PolarsError| match source {
        PolarsError::NoData(_) => DashboardError::EmptyInput(path.to_path_buf()),
        source => DashboardError::Read {
            path: path.to_path_buf(),
            source,
        },
    };
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_truncate_ragged_lines(true),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(read_err)?;

    let columns = raw
        .get_columns()
        .iter()
        .map(clean_column)
        .collect::<PolarsResult<Vec<Series>>>()?;
    if columns.iter().all(|s| s.name().is_empty()) {
        return Err(DashboardError::EmptyInput(path.to_path_buf()));
    }
    Ok(DataFrame::new(columns)?)
}

/// Trim the header (and a stray byte-order mark) and cast numeric text.
fn clean_column(series: &Series) -> PolarsResult<Series> {
    let name = series.name().trim_start_matches('\u{feff}').trim().to_string();
    let series = match numeric_cast(series)? {
        Some(numbers) => numbers,
        None => series.clone(),
    };
    Ok(series.with_name(&name))
}

/// A text column becomes `Float64` when it has at least one value and every
/// non-blank value parses as a number, decimal comma included.
fn numeric_cast(series: &Series) -> PolarsResult<Option<Series>> {
    let text = series.str()?;
    let mut any = false;
    let all_numeric = text
        .into_iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .all(|v| {
            any = true;
            parse_f64_safe(Some(v)).is_some()
        });
    if !(any && all_numeric) {
        return Ok(None);
    }
    let values: Float64Chunked = text.into_iter().map(parse_f64_safe).collect();
    Ok(Some(values.into_series()))
}
