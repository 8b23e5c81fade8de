use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aging::metrics::percentage;
use crate::domain::invoice::InvoiceStatus;
use crate::domain::user::UserId;
use crate::snapshot::InvoiceSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorPerformance {
    pub collector: UserId,
    pub assigned_count: u32,
    pub assigned_amount: Decimal,
    pub collected_amount: Decimal,
    pub overdue_amount: Decimal,
    pub collection_rate_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// Per-collector rows, ordered by collector id for stable output.
    pub collectors: Vec<CollectorPerformance>,
    pub team_assigned_amount: Decimal,
    pub team_collected_amount: Decimal,
    pub team_collection_rate_pct: Decimal,
    /// AR with no assigned collector; surfaced so it cannot hide.
    pub unassigned_amount: Decimal,
    pub unassigned_count: u32,
}

#[derive(Default)]
struct Tally {
    assigned_count: u32,
    assigned_amount: Decimal,
    collected_amount: Decimal,
    overdue_amount: Decimal,
}

pub fn performance_report(snapshot: &InvoiceSnapshot, as_of: NaiveDate) -> PerformanceReport {
    let mut tallies: BTreeMap<UserId, Tally> = BTreeMap::new();
    let mut unassigned_amount = Decimal::ZERO;
    let mut unassigned_count = 0;

    for invoice in &snapshot.invoices {
        let Some(collector) = &invoice.assigned_to else {
            unassigned_amount += invoice.amount;
            unassigned_count += 1;
            continue;
        };

        let tally = tallies.entry(collector.clone()).or_default();
        tally.assigned_count += 1;
        tally.assigned_amount += invoice.amount;
        if invoice.status == InvoiceStatus::Paid {
            tally.collected_amount += invoice.amount;
        }
        if invoice.is_past_due(as_of) {
            tally.overdue_amount += invoice.amount;
        }
    }

    let mut team_assigned_amount = Decimal::ZERO;
    let mut team_collected_amount = Decimal::ZERO;
    let collectors = tallies
        .into_iter()
        .map(|(collector, tally)| {
            team_assigned_amount += tally.assigned_amount;
            team_collected_amount += tally.collected_amount;
            CollectorPerformance {
                collector,
                assigned_count: tally.assigned_count,
                assigned_amount: tally.assigned_amount,
                collected_amount: tally.collected_amount,
                overdue_amount: tally.overdue_amount,
                collection_rate_pct: percentage(tally.collected_amount, tally.assigned_amount),
            }
        })
        .collect();

    PerformanceReport {
        collectors,
        team_assigned_amount,
        team_collected_amount,
        team_collection_rate_pct: percentage(team_collected_amount, team_assigned_amount),
        unassigned_amount,
        unassigned_count,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;

    use super::performance_report;
    use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus};
    use crate::domain::user::UserId;
    use crate::snapshot::InvoiceSnapshot;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn invoice(
        id: &str,
        amount: i64,
        days_overdue: i64,
        status: InvoiceStatus,
        collector: Option<&str>,
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
            assigned_to: collector.map(|value| UserId(value.to_string())),
            region: None,
            customer_name: "Acme Inc".to_string(),
            promise: None,
        }
    }

    #[test]
    fn rolls_up_per_collector_and_team() {
        let snapshot = InvoiceSnapshot::new(vec![
            invoice("INV-1", 100, 10, InvoiceStatus::Open, Some("u-ann")),
            invoice("INV-2", 100, 0, InvoiceStatus::Paid, Some("u-ann")),
            invoice("INV-3", 300, 40, InvoiceStatus::Overdue, Some("u-bob")),
            invoice("INV-4", 50, -5, InvoiceStatus::Open, None),
        ]);

        let report = performance_report(&snapshot, as_of());

        assert_eq!(report.collectors.len(), 2);
        let ann = &report.collectors[0];
        assert_eq!(ann.collector.0, "u-ann");
        assert_eq!(ann.assigned_count, 2);
        assert_eq!(ann.assigned_amount, Decimal::from(200));
        assert_eq!(ann.collected_amount, Decimal::from(100));
        assert_eq!(ann.overdue_amount, Decimal::from(100));
        assert_eq!(ann.collection_rate_pct, Decimal::from(50));

        let bob = &report.collectors[1];
        assert_eq!(bob.collection_rate_pct, Decimal::ZERO);
        assert_eq!(bob.overdue_amount, Decimal::from(300));

        assert_eq!(report.team_assigned_amount, Decimal::from(500));
        assert_eq!(report.team_collection_rate_pct, Decimal::from(20));
        assert_eq!(report.unassigned_amount, Decimal::from(50));
        assert_eq!(report.unassigned_count, 1);
    }

    #[test]
    fn empty_snapshot_produces_zeroed_report() {
        let report = performance_report(&InvoiceSnapshot::default(), as_of());

        assert!(report.collectors.is_empty());
        assert_eq!(report.team_collection_rate_pct, Decimal::ZERO);
    }
}
