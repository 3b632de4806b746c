// Terminal rendering: markdown tables and the assembled dashboard text.
use polars::prelude::DataFrame;
use std::fmt::Write as _;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::charts::{render_bar_chart, render_line_chart};
use crate::dashboard::{DashboardView, RecommendationPanel};
use crate::filter::DateSelection;
use crate::frame::cell_display;
use crate::types::{KpiRow, StatusRow};
use crate::util::format_int;

pub fn markdown_rows<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    format!("{}\n", table_str)
}

pub fn markdown_table(df: &DataFrame) -> String {
    if df.height() == 0 {
        return "(no rows)\n".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(df.get_column_names().into_iter().map(str::to_string));
    for row in 0..df.height() {
        builder.push_record(df.get_columns().iter().map(|series| cell_display(series, row)));
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    format!("{}\n", table_str)
}

fn describe_period(period: Option<&DateSelection>) -> String {
    match period {
        Some(DateSelection::Range(start, end)) => format!("{} to {}", start, end),
        Some(DateSelection::Single(day)) => format!("{} (single date, not filtered)", day),
        None => "all rows".to_string(),
    }
}

/// Render the full dashboard as terminal text.
pub fn format_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "FarmTech Solutions - Sensor Dashboard\n");
    let _ = writeln!(
        out,
        "Rows: {} of {} loaded | Period: {}",
        format_int(view.rows),
        format_int(view.loaded_rows),
        describe_period(view.period.as_ref())
    );
    if let Some((start, end)) = view.bounds {
        let _ = writeln!(out, "Dates available: {} to {}", start, end);
    }
    if !view.variables.is_empty() {
        let _ = writeln!(out, "Charted variables: {}", view.variables.join(", "));
    }
    let _ = writeln!(out);

    if !view.kpis.is_empty() {
        let rows: Vec<KpiRow> = view.kpis.iter().map(KpiRow::from).collect();
        let _ = writeln!(out, "Indicators\n");
        out.push_str(&markdown_rows(&rows));
        let _ = writeln!(out);
    }

    for series in &view.charts {
        out.push_str(&render_line_chart(series));
        let _ = writeln!(out);
    }

    if let Some(status) = &view.status {
        let rows: Vec<StatusRow> = status.iter().map(StatusRow::from).collect();
        let _ = writeln!(out, "Irrigation status distribution\n");
        out.push_str(&render_bar_chart(status));
        let _ = writeln!(out);
        out.push_str(&markdown_rows(&rows));
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Irrigation suggestion (simple rules)\n");
    match &view.recommendations {
        RecommendationPanel::Preview(df) => out.push_str(&markdown_table(df)),
        RecommendationPanel::MissingColumns(missing) => {
            let _ = writeln!(
                out,
                "Info: suggestions need the columns UMIDADE_SOLO, CHUVA_MM and TEMP_C (missing: {}).",
                missing.join(", ")
            );
        }
    }
    out
}
