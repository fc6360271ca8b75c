//! Calendar windows over which threshold usage is aggregated.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use csw_pack::ThresholdPeriod;

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodWindow {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Period the window was derived from.
    pub period: ThresholdPeriod,
}

impl PeriodWindow {
    /// The window of `period` containing `date`.
    ///
    /// Weeks are ISO weeks (Monday to Sunday).
    pub fn containing(period: ThresholdPeriod, date: NaiveDate) -> Self {
        let (start, end) = match period {
            ThresholdPeriod::PerTransaction | ThresholdPeriod::Daily => (date, date),
            ThresholdPeriod::Weekly => {
                let week = date.week(Weekday::Mon);
                (week.first_day(), week.last_day())
            }
            ThresholdPeriod::Monthly => (first_of_month(date), last_of_month(date)),
            ThresholdPeriod::Yearly => (
                NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
                NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
            ),
        };
        Self { start, end, period }
    }

    /// Whether historical transactions count toward this window.
    pub fn aggregates_history(&self) -> bool {
        self.period != ThresholdPeriod::PerTransaction
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}
