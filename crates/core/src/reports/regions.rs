use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aging::metrics::{percentage, top_overdue, OverdueInvoice};
use crate::aging::{schedule, AgingSchedule};
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::snapshot::InvoiceSnapshot;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub region: String,
    pub invoice_count: u32,
    pub total_amount: Decimal,
    pub collected_amount: Decimal,
    pub overdue_amount: Decimal,
    pub collection_rate_pct: Decimal,
    pub aging_buckets: AgingSchedule,
    pub top_overdue: Vec<OverdueInvoice>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionReport {
    /// Per-region rows, largest book of business first.
    pub regions: Vec<RegionSummary>,
    /// AR with no region on file; surfaced so it cannot hide.
    pub unassigned_amount: Decimal,
    pub unassigned_count: u32,
}

pub fn region_report(snapshot: &InvoiceSnapshot, as_of: NaiveDate, top_n: usize) -> RegionReport {
    let mut by_region: BTreeMap<String, Vec<Invoice>> = BTreeMap::new();
    let mut unassigned_amount = Decimal::ZERO;
    let mut unassigned_count = 0;

    for invoice in &snapshot.invoices {
        let Some(region) = &invoice.region else {
            unassigned_amount += invoice.amount;
            unassigned_count += 1;
            continue;
        };
        by_region.entry(region.clone()).or_default().push(invoice.clone());
    }

    let mut regions: Vec<RegionSummary> = by_region
        .into_iter()
        .map(|(region, invoices)| {
            let mut total_amount = Decimal::ZERO;
            let mut collected_amount = Decimal::ZERO;
            let mut overdue_amount = Decimal::ZERO;
            for invoice in &invoices {
                total_amount += invoice.amount;
                if invoice.status == InvoiceStatus::Paid {
                    collected_amount += invoice.amount;
                }
                if invoice.is_past_due(as_of) {
                    overdue_amount += invoice.amount;
                }
            }

            RegionSummary {
                region,
                invoice_count: invoices.len() as u32,
                total_amount,
                collected_amount,
                overdue_amount,
                collection_rate_pct: percentage(collected_amount, total_amount),
                aging_buckets: schedule(&invoices, as_of),
                top_overdue: top_overdue(&invoices, as_of, top_n),
            }
        })
        .collect();

    // Largest total first; region name breaks ties so output is stable.
    regions.sort_by(|a, b| {
        b.total_amount.cmp(&a.total_amount).then_with(|| a.region.cmp(&b.region))
    });

    RegionReport { regions, unassigned_amount, unassigned_count }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;

    use super::region_report;
    use crate::aging::AgingBucket;
    use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus};
    use crate::snapshot::InvoiceSnapshot;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn invoice(
        id: &str,
        amount: i64,
        days_overdue: i64,
        status: InvoiceStatus,
        region: Option<&str>,
    ) -> Invoice {
        let due_date = if days_overdue >= 0 {
            as_of() - Days::new(days_overdue as u64)
        } else {
            as_of() + Days::new((-days_overdue) as u64)
        };
        Invoice {
            id: InvoiceId(id.to_string()),
            amount: Decimal::from(amount),
            issue_date: due_date - Days::new(30),
            due_date,
            status,
            assigned_to: None,
            region: region.map(str::to_string),
            customer_name: "Acme Inc".to_string(),
            promise: None,
        }
    }

    #[test]
    fn rolls_up_per_region_with_aging_and_top_overdue() {
        let snapshot = InvoiceSnapshot::new(vec![
            invoice("INV-1", 100, 10, InvoiceStatus::Open, Some("west")),
            invoice("INV-2", 200, 0, InvoiceStatus::Paid, Some("west")),
            invoice("INV-3", 400, 45, InvoiceStatus::Overdue, Some("east")),
            invoice("INV-4", 50, -5, InvoiceStatus::Open, Some("east")),
            invoice("INV-5", 75, 3, InvoiceStatus::Open, None),
        ]);

        let report = region_report(&snapshot, as_of(), 5);

        assert_eq!(report.regions.len(), 2);
        let east = &report.regions[0];
        assert_eq!(east.region, "east");
        assert_eq!(east.total_amount, Decimal::from(450));
        assert_eq!(east.overdue_amount, Decimal::from(400));
        assert_eq!(east.collection_rate_pct, Decimal::ZERO);
        assert_eq!(east.aging_buckets.totals(AgingBucket::Days31To60).count, 1);
        assert_eq!(east.aging_buckets.totals(AgingBucket::Current).count, 1);
        assert_eq!(east.top_overdue.len(), 1);
        assert_eq!(east.top_overdue[0].id.0, "INV-3");

        let west = &report.regions[1];
        assert_eq!(west.region, "west");
        assert_eq!(west.invoice_count, 2);
        assert_eq!(west.collected_amount, Decimal::from(200));
        assert_eq!(west.collection_rate_pct, Decimal::new(6667, 2));
        assert_eq!(west.top_overdue[0].id.0, "INV-1");

        assert_eq!(report.unassigned_amount, Decimal::from(75));
        assert_eq!(report.unassigned_count, 1);
    }

    #[test]
    fn regions_with_equal_totals_order_by_name() {
        let snapshot = InvoiceSnapshot::new(vec![
            invoice("INV-1", 100, 0, InvoiceStatus::Open, Some("south")),
            invoice("INV-2", 100, 0, InvoiceStatus::Open, Some("north")),
        ]);

        let report = region_report(&snapshot, as_of(), 5);

        let names: Vec<&str> = report.regions.iter().map(|row| row.region.as_str()).collect();
        assert_eq!(names, ["north", "south"]);
    }

    #[test]
    fn empty_snapshot_produces_zeroed_report() {
        let report = region_report(&InvoiceSnapshot::default(), as_of(), 5);

        assert!(report.regions.is_empty());
        assert_eq!(report.unassigned_count, 0);
    }
}
