// Tabled row types for the indicator and status tables.
use tabled::Tabled;

use crate::charts::StatusCount;
use crate::kpi::Kpi;

#[derive(Debug, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl From<&Kpi> for KpiRow {
    fn from(kpi: &Kpi) -> Self {
        KpiRow {
            indicator: kpi.label.to_string(),
            column: kpi.column.to_string(),
            value: kpi.display_value(),
        }
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct StatusRow {
    #[tabled(rename = "STATUS_IRRIGACAO")]
    pub status: String,
    #[tabled(rename = "QTD")]
    pub count: usize,
}

impl From<&StatusCount> for StatusRow {
    fn from(row: &StatusCount) -> Self {
        StatusRow {
            status: row.status.clone(),
            count: row.count,
        }
    }
}
