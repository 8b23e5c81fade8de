use std::fs;
use std::path::Path;

use ariva_core::config::{AppConfig, LoadOptions};
use ariva_core::reports::{
    customer_report, dispute_report, overview, performance_report, ptp_report, region_report,
};
use ariva_core::snapshot::InvoiceSnapshot;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use super::CommandResult;
use crate::ReportKind;

pub fn run(kind: ReportKind, input: &Path, as_of: Option<NaiveDate>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: 2,
                output: error_payload("report", "config_validation", &error.to_string()),
            }
        }
    };

    let snapshot = match load_snapshot(input) {
        Ok(snapshot) => snapshot,
        Err(message) => {
            return CommandResult {
                exit_code: 3,
                output: error_payload("report", "snapshot_unreadable", &message),
            }
        }
    };

    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let report: Value = match kind {
        ReportKind::Aging => serde_json::to_value(overview(
            &snapshot,
            as_of,
            config.reports.top_overdue_limit,
            config.reports.trend_weeks,
        )),
        ReportKind::Disputes => {
            serde_json::to_value(dispute_report(&snapshot, as_of, config.reports.trend_months))
        }
        ReportKind::Ptp => serde_json::to_value(ptp_report(&snapshot)),
        ReportKind::Performance => serde_json::to_value(performance_report(&snapshot, as_of)),
        ReportKind::Regions => serde_json::to_value(region_report(
            &snapshot,
            as_of,
            config.reports.top_overdue_limit,
        )),
        ReportKind::Customers => serde_json::to_value(customer_report(
            &snapshot,
            as_of,
            config.reports.top_overdue_limit,
        )),
    }
    .expect("report payloads serialize");

    let payload = json!({
        "command": "report",
        "status": "ok",
        "kind": kind_label(kind),
        "asOf": as_of,
        "report": report,
    });

    CommandResult { exit_code: 0, output: pretty(&payload) }
}

pub(crate) fn load_snapshot(path: &Path) -> Result<InvoiceSnapshot, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read snapshot file `{}`: {error}", path.display()))?;
    let parsed: Value = serde_json::from_str(&raw)
        .map_err(|error| format!("could not parse snapshot file `{}`: {error}", path.display()))?;

    let records = match &parsed {
        Value::Array(records) => records.as_slice(),
        Value::Object(object) => object
            .get("invoices")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or("snapshot object is missing an `invoices` array".to_string())?,
        _ => return Err("snapshot root must be an array or an object".to_string()),
    };

    Ok(InvoiceSnapshot::from_json_records(records))
}

fn kind_label(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Aging => "aging",
        ReportKind::Disputes => "disputes",
        ReportKind::Ptp => "ptp",
        ReportKind::Performance => "performance",
        ReportKind::Regions => "regions",
        ReportKind::Customers => "customers",
    }
}

pub(crate) fn error_payload(command: &str, error_class: &str, detail: &str) -> String {
    pretty(&json!({
        "command": command,
        "status": "error",
        "error_class": error_class,
        "detail": detail,
    }))
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).expect("payload serializes")
}
