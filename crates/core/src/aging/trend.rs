use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::aging::{schedule, AgingSchedule};
use crate::domain::invoice::Invoice;

/// One trailing week window: the aging breakdown computed as if the window
/// end were "now", over invoices whose due date falls inside the window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrendPoint {
    pub week_ending: NaiveDate,
    pub buckets: AgingSchedule,
}

/// Trailing `weeks` week-windows, most recent last. Each window covers due
/// dates in `(end - 7d, end]` and is classified with the window end as the
/// reference date, so a point never changes once its week has closed.
pub fn weekly_trend(invoices: &[Invoice], as_of: NaiveDate, weeks: u32) -> Vec<WeeklyTrendPoint> {
    let mut points = Vec::with_capacity(weeks as usize);

    for offset in (0..weeks).rev() {
        let week_ending = as_of - Days::new(u64::from(offset) * 7);
        let week_start = week_ending - Days::new(7);

        let window: Vec<Invoice> = invoices
            .iter()
            .filter(|invoice| invoice.due_date > week_start && invoice.due_date <= week_ending)
            .cloned()
            .collect();

        points.push(WeeklyTrendPoint { week_ending, buckets: schedule(&window, week_ending) });
    }

    points
}
