use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aging::metrics::{collection_rate, summary, top_overdue, ArSummary, OverdueInvoice};
use crate::aging::trend::{weekly_trend, WeeklyTrendPoint};
use crate::aging::{schedule, AgingSchedule};
use crate::snapshot::{DataQuality, InvoiceSnapshot};

/// The dashboard payload: aging buckets, top overdue ranking, collection
/// rate, KPI summary, and the snapshot's data-quality counters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub as_of: NaiveDate,
    pub aging_buckets: AgingSchedule,
    pub top_overdue: Vec<OverdueInvoice>,
    pub collection_rate: Decimal,
    pub summary: ArSummary,
    pub weekly_trend: Vec<WeeklyTrendPoint>,
    pub data_quality: DataQuality,
}

pub fn overview(
    snapshot: &InvoiceSnapshot,
    as_of: NaiveDate,
    top_n: usize,
    trend_weeks: u32,
) -> Overview {
    let invoices = &snapshot.invoices;

    Overview {
        as_of,
        aging_buckets: schedule(invoices, as_of),
        top_overdue: top_overdue(invoices, as_of, top_n),
        collection_rate: collection_rate(invoices),
        summary: summary(invoices, as_of),
        weekly_trend: weekly_trend(invoices, as_of, trend_weeks),
        data_quality: snapshot.quality.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;

    use super::overview;
    use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus};
    use crate::snapshot::InvoiceSnapshot;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn invoice(id: &str, amount: i64, days_overdue: i64, status: InvoiceStatus) -> Invoice {
        let due_date = as_of() - Days::new(days_overdue.max(0) as u64);
        Invoice {
            id: InvoiceId(id.to_string()),
            amount: Decimal::from(amount),
            issue_date: due_date - Days::new(30),
            due_date,
            status,
            assigned_to: None,
            region: None,
            customer_name: "Acme Inc".to_string(),
            promise: None,
        }
    }

    #[test]
    fn payload_uses_the_wire_field_names() {
        let snapshot = InvoiceSnapshot::new(vec![
            invoice("INV-1", 100, 5, InvoiceStatus::Open),
            invoice("INV-2", 200, 45, InvoiceStatus::Overdue),
            invoice("INV-3", 50, 10, InvoiceStatus::Paid),
        ]);

        let value = serde_json::to_value(overview(&snapshot, as_of(), 5, 4)).unwrap();

        assert!(value.get("agingBuckets").is_some());
        assert!(value.get("topOverdue").is_some());
        assert_eq!(value["collectionRate"], serde_json::json!("14.29"));
        assert_eq!(value["topOverdue"][0]["id"], "INV-2");
        assert_eq!(value["topOverdue"][0]["daysOverdue"], 45);
        assert_eq!(value["dataQuality"]["accepted"], 3);
    }
}
