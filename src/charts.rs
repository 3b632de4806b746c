// Chart data extraction and plain-text chart rendering for the terminal.
use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::error::Result;
use crate::frame::{float_values, has_column, is_datetime, timestamps};
use crate::schema::{DATA_COLETA, DEFAULT_CHART_COLUMNS, MEASUREMENT_COLUMNS, STATUS_IRRIGACAO};
use crate::util::{format_int, format_number};

const CHART_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 10;
const BAR_WIDTH: usize = 40;
const COUNT_COLUMN: &str = "QTD";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub column: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Measurement columns present in the frame, in display order.
pub fn available_variables(df: &DataFrame) -> Vec<&'static str> {
    MEASUREMENT_COLUMNS
        .iter()
        .copied()
        .filter(|c| has_column(df, c))
        .collect()
}

/// Preferred subset of the available variables, or all of them when none of
/// the preferred ones exist.
pub fn default_variables(df: &DataFrame) -> Vec<&'static str> {
    let preferred: Vec<&'static str> = DEFAULT_CHART_COLUMNS
        .iter()
        .copied()
        .filter(|c| has_column(df, c))
        .collect();
    if preferred.is_empty() {
        available_variables(df)
    } else {
        preferred
    }
}

/// One series per selected column, ordered by collection time.
///
/// Empty when the frame has no parsed `DATA_COLETA` column. Rows with a null
/// date or a null value are left out of a series.
pub fn time_series(df: &DataFrame, columns: &[String]) -> Result<Vec<TimeSeries>> {
    if !df.column(DATA_COLETA).is_ok_and(is_datetime) {
        return Ok(Vec::new());
    }
    let sorted = df.sort(
        [DATA_COLETA],
        SortMultipleOptions::default()
            .with_nulls_last(true)
            .with_maintain_order(true),
    )?;
    let Some(dates) = timestamps(&sorted, DATA_COLETA) else {
        return Ok(Vec::new());
    };

    let series = columns
        .iter()
        .filter_map(|column| {
            let values = float_values(&sorted, column)?;
            let points = dates
                .iter()
                .zip(values)
                .filter_map(|(t, v)| Some(((*t)?, v?)))
                .collect();
            Some(TimeSeries {
                column: column.clone(),
                points,
            })
        })
        .collect();
    Ok(series)
}

/// Frequency of each `STATUS_IRRIGACAO` value, most frequent first. Ties
/// keep the order in which the values first appear.
pub fn status_distribution(df: &DataFrame) -> Result<Option<Vec<StatusCount>>> {
    if !has_column(df, STATUS_IRRIGACAO) {
        return Ok(None);
    }
    let counts = df
        .clone()
        .lazy()
        .filter(col(STATUS_IRRIGACAO).is_not_null())
        .group_by_stable([col(STATUS_IRRIGACAO)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort(
            [COUNT_COLUMN],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let statuses = counts.column(STATUS_IRRIGACAO)?.cast(&DataType::String)?;
    let totals = counts.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    let rows = statuses
        .str()?
        .into_iter()
        .zip(totals.u64()?.into_iter())
        .filter_map(|(status, count)| {
            Some(StatusCount {
                status: status?.to_string(),
                count: count? as usize,
            })
        })
        .collect();
    Ok(Some(rows))
}

pub fn render_line_chart(series: &TimeSeries) -> String {
    let mut out = format!("{} over time\n", series.column);
    let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
        out.push_str("(no data)\n");
        return out;
    };

    let (lo, hi) = series
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    let span = if (hi - lo).abs() < f64::EPSILON { 1.0 } else { hi - lo };
    let total_secs = (last.0 - first.0).num_seconds();

    let mut grid = vec![vec![' '; CHART_WIDTH]; CHART_HEIGHT];
    for (t, v) in &series.points {
        let x = if total_secs == 0 {
            0
        } else {
            ((*t - first.0).num_seconds() as f64 / total_secs as f64 * (CHART_WIDTH - 1) as f64)
                .round() as usize
        };
        let level = ((v - lo) / span * (CHART_HEIGHT - 1) as f64).round() as usize;
        grid[CHART_HEIGHT - 1 - level.min(CHART_HEIGHT - 1)][x.min(CHART_WIDTH - 1)] = '*';
    }

    let hi_label = format_number(hi, 2);
    let lo_label = format_number(lo, 2);
    let label_width = hi_label.len().max(lo_label.len());
    for (row, cells) in grid.iter().enumerate() {
        let label = match row {
            0 => hi_label.as_str(),
            r if r == CHART_HEIGHT - 1 => lo_label.as_str(),
            _ => "",
        };
        let line: String = cells.iter().collect();
        out.push_str(&format!("{:>w$} |{}\n", label, line.trim_end(), w = label_width));
    }
    out.push_str(&format!("{:>w$} +{}\n", "", "-".repeat(CHART_WIDTH), w = label_width));
    let start = first.0.format("%Y-%m-%d").to_string();
    let end = last.0.format("%Y-%m-%d").to_string();
    let gap = CHART_WIDTH.saturating_sub(start.len() + end.len());
    out.push_str(&format!(
        "{:>w$}  {}{}{}\n",
        "",
        start,
        " ".repeat(gap),
        end,
        w = label_width
    ));
    out
}

pub fn render_bar_chart(rows: &[StatusCount]) -> String {
    let Some(max) = rows.iter().map(|r| r.count).max() else {
        return "(no data)\n".to_string();
    };
    let label_width = rows.iter().map(|r| r.status.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let len = if max == 0 { 0 } else { (row.count * BAR_WIDTH).div_ceil(max) };
        out.push_str(&format!(
            "{:<w$} | {} {}\n",
            row.status,
            "#".repeat(len),
            format_int(row.count),
            w = label_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::datetime_series;
    use crate::schema::{CHUVA_MM, FOSFORO_P, PH_SOLO, TEMP_C, UMIDADE_SOLO};
    use chrono::NaiveDate;

    fn at(d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 1, d).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            datetime_series(DATA_COLETA, &[at(3), None, at(1), at(2)]).unwrap(),
            Series::new(UMIDADE_SOLO, &[Some(30.0), Some(99.0), Some(10.0), None]),
            Series::new(TEMP_C, &[1.0; 4]),
            Series::new(
                STATUS_IRRIGACAO,
                &[Some("DESLIGADA"), Some("LIGADA"), None, Some("LIGADA")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn variables_follow_display_order() {
        let df = sample();
        assert_eq!(available_variables(&df), vec![UMIDADE_SOLO, TEMP_C]);
        assert_eq!(default_variables(&df), vec![UMIDADE_SOLO]);

        let only_weather = DataFrame::new(vec![
            Series::new(TEMP_C, &[1.0]),
            Series::new(CHUVA_MM, &[1.0]),
        ])
        .unwrap();
        assert_eq!(default_variables(&only_weather), vec![CHUVA_MM, TEMP_C]);
    }

    #[test]
    fn series_are_sorted_by_date_and_skip_nulls() {
        let series = time_series(
            &sample(),
            &[UMIDADE_SOLO.to_string(), FOSFORO_P.to_string()],
        )
        .unwrap();
        assert_eq!(series.len(), 1);
        let values: Vec<f64> = series[0].points.iter().map(|p| p.1).collect();
        assert_eq!(values, vec![10.0, 30.0]);
        assert_eq!(series[0].points[0].0, at(1).unwrap());
    }

    #[test]
    fn no_series_without_date_column() {
        let df = DataFrame::new(vec![Series::new(PH_SOLO, &[6.0])]).unwrap();
        assert!(time_series(&df, &[PH_SOLO.to_string()]).unwrap().is_empty());
    }

    #[test]
    fn status_counts_descend_and_ignore_nulls() {
        let dist = status_distribution(&sample()).unwrap().unwrap();
        assert_eq!(
            dist,
            vec![
                StatusCount { status: "LIGADA".into(), count: 2 },
                StatusCount { status: "DESLIGADA".into(), count: 1 },
            ]
        );
        let df = DataFrame::new(vec![Series::new(PH_SOLO, &[6.0])]).unwrap();
        assert!(status_distribution(&df).unwrap().is_none());
    }

    #[test]
    fn equal_status_counts_keep_first_appearance() {
        let df = DataFrame::new(vec![Series::new(
            STATUS_IRRIGACAO,
            &["OFF", "ON", "ON", "OFF", "AUTO"],
        )])
        .unwrap();
        let statuses: Vec<String> = status_distribution(&df)
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|row| row.status)
            .collect();
        assert_eq!(statuses, vec!["OFF", "ON", "AUTO"]);
    }

    #[test]
    fn line_chart_marks_extremes() {
        let series = TimeSeries {
            column: UMIDADE_SOLO.to_string(),
            points: vec![(at(1).unwrap(), 10.0), (at(3).unwrap(), 30.0)],
        };
        let text = render_line_chart(&series);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "UMIDADE_SOLO over time");
        assert!(lines[1].starts_with("30.00 |"));
        assert!(lines[1].ends_with('*'));
        assert!(lines[CHART_HEIGHT].starts_with("10.00 |*"));
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("2024-01-03"));
    }

    #[test]
    fn empty_inputs_render_placeholders() {
        let series = TimeSeries {
            column: TEMP_C.to_string(),
            points: Vec::new(),
        };
        assert!(render_line_chart(&series).ends_with("(no data)\n"));
        assert_eq!(render_bar_chart(&[]), "(no data)\n");
    }

    #[test]
    fn bar_chart_scales_to_the_largest_count() {
        let text = render_bar_chart(&[
            StatusCount { status: "LIGADA".into(), count: 4 },
            StatusCount { status: "OFF".into(), count: 1 },
        ]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("LIGADA | {} 4", "#".repeat(BAR_WIDTH)));
        assert_eq!(lines[1], format!("OFF    | {} 1", "#".repeat(BAR_WIDTH / 4)));
    }
}
