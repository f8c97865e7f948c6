//! Daily counter rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The count recorded for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyTally {
    /// Calendar day.
    pub date: NaiveDate,
    /// Count for the day.
    pub count: i32,
}

impl DailyTally {
    /// Create a tally row.
    pub fn new(date: NaiveDate, count: i32) -> Self {
        Self { date, count }
    }
}
