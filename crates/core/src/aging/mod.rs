//! Aging classification: pure functions from an invoice slice and a
//! reference date to bucketed totals.

pub mod metrics;
pub mod trend;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::invoice::Invoice;

/// Canonical aging partition. Half-open on days overdue: anything not yet
/// due (or due today) is `current`; the buckets cover every possible
/// day-count with no overlap and no gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "1-30")]
    Days1To30,
    #[serde(rename = "31-60")]
    Days31To60,
    #[serde(rename = "61-90")]
    Days61To90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    pub fn for_days_overdue(days: i64) -> Self {
        match days {
            _ if days <= 0 => Self::Current,
            _ if days <= 30 => Self::Days1To30,
            _ if days <= 60 => Self::Days31To60,
            _ if days <= 90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Days1To30 => "1-30",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Over90 => "90+",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Current => 0,
            Self::Days1To30 => 1,
            Self::Days31To60 => 2,
            Self::Days61To90 => 3,
            Self::Over90 => 4,
        }
    }
}

impl std::fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTotals {
    pub amount: Decimal,
    pub count: u32,
}

/// Per-bucket summed amounts and counts over the unpaid invoice set.
/// Serializes as an ordered map keyed by bucket label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgingSchedule {
    slots: [BucketTotals; 5],
}

impl AgingSchedule {
    pub fn totals(&self, bucket: AgingBucket) -> BucketTotals {
        self.slots[bucket.index()]
    }

    pub fn amount(&self, bucket: AgingBucket) -> Decimal {
        self.totals(bucket).amount
    }

    /// Sum over all buckets; equals the outstanding (non-paid) total of the
    /// classified set.
    pub fn total_amount(&self) -> Decimal {
        self.slots.iter().map(|slot| slot.amount).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgingBucket, BucketTotals)> + '_ {
        AgingBucket::ALL.iter().map(|bucket| (*bucket, self.totals(*bucket)))
    }

    fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        let slot = &mut self.slots[bucket.index()];
        slot.amount += amount;
        slot.count += 1;
    }
}

impl Serialize for AgingSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(AgingBucket::ALL.len()))?;
        for (bucket, totals) in self.iter() {
            map.serialize_entry(bucket.label(), &totals)?;
        }
        map.end()
    }
}

/// Classify every unpaid invoice into exactly one bucket. Paid invoices are
/// excluded entirely; they only ever feed the collection-rate numerator.
pub fn schedule(invoices: &[Invoice], as_of: NaiveDate) -> AgingSchedule {
    let mut schedule = AgingSchedule::default();
    for invoice in invoices.iter().filter(|invoice| invoice.is_outstanding()) {
        let bucket = AgingBucket::for_days_overdue(invoice.days_overdue(as_of));
        schedule.add(bucket, invoice.amount);
    }
    schedule
}
