// One top-to-bottom dashboard pass: load, normalize, filter, then derive
// the KPI cards, chart series, status distribution and suggestion preview.
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

use crate::charts::{self, StatusCount, TimeSeries};
use crate::error::Result;
use crate::filter::{date_bounds, filter_by_date, DateSelection};
use crate::frame::has_column;
use crate::kpi::{kpi_cards, Kpi};
use crate::loader::{read_csv_flex, LoadReport};
use crate::recommend::{missing_columns, suggestion_column};
use crate::schema::{normalize, CHUVA_MM, DATA_COLETA, PH_SOLO, SUGESTAO, TEMP_C, UMIDADE_SOLO};

const PREVIEW_COLUMNS: [&str; 6] = [DATA_COLETA, UMIDADE_SOLO, PH_SOLO, CHUVA_MM, TEMP_C, SUGESTAO];

/// Choices made in the shell that shape a render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    /// `None` means the full date range of the file.
    pub period: Option<DateSelection>,
    /// `None` means the default chart variables.
    pub variables: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub enum RecommendationPanel {
    Preview(DataFrame),
    MissingColumns(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub loaded_rows: usize,
    pub rows: usize,
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    pub period: Option<DateSelection>,
    pub kpis: Vec<Kpi>,
    pub variables: Vec<String>,
    pub charts: Vec<TimeSeries>,
    pub status: Option<Vec<StatusCount>>,
    pub recommendations: RecommendationPanel,
}

/// Read the file and build a fresh view of it.
pub fn run(
    path: &Path,
    selections: &Selections,
    preview_rows: usize,
) -> Result<(DashboardView, LoadReport)> {
    let (df, report) = read_csv_flex(path)?;
    Ok((build(df, selections, preview_rows)?, report))
}

fn preview(df: &DataFrame, suggestions: Series, rows: usize) -> Result<DataFrame> {
    let mut with_suggestions = df.clone();
    with_suggestions.with_column(suggestions)?;
    let present: Vec<&str> = PREVIEW_COLUMNS
        .iter()
        .copied()
        .filter(|c| has_column(&with_suggestions, c))
        .collect();
    Ok(with_suggestions.select(present)?.head(Some(rows)))
}

pub fn build(df: DataFrame, selections: &Selections, preview_rows: usize) -> Result<DashboardView> {
    let df = normalize(df)?;
    let loaded_rows = df.height();
    let bounds = date_bounds(&df);
    let period = selections
        .period
        .or_else(|| bounds.map(|(start, end)| DateSelection::Range(start, end)));
    let df = match &period {
        Some(selection) => filter_by_date(df, selection)?,
        None => df,
    };

    let available = charts::available_variables(&df);
    let variables: Vec<String> = match &selections.variables {
        Some(chosen) => chosen
            .iter()
            .filter(|v| available.iter().any(|a| *a == v.as_str()))
            .cloned()
            .collect(),
        None => charts::default_variables(&df)
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let kpis = kpi_cards(&df);
    let series = charts::time_series(&df, &variables)?;
    let status = charts::status_distribution(&df)?;
    let rows = df.height();
    let recommendations = match suggestion_column(&df) {
        Some(suggestions) => {
            RecommendationPanel::Preview(preview(&df, suggestions, preview_rows)?)
        }
        None => RecommendationPanel::MissingColumns(missing_columns(&df)),
    };
    info!(loaded_rows, rows, charts = series.len(), "dashboard built");

    Ok(DashboardView {
        loaded_rows,
        rows,
        bounds,
        period,
        kpis,
        variables,
        charts: series,
        status,
        recommendations,
    })
}
