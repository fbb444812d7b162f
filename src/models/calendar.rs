//! Holiday calendar.
//!
//! Duty applicability depends on two calendar facts per date: its weekday
//! (taken directly from [`chrono`]) and whether it is a public holiday.
//! The holiday side is modeled as an explicit date set so the engine stays
//! independent of any regional holiday arithmetic — the consumer loads
//! whatever dates apply.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Public-holiday lookup for a planning horizon.
///
/// A date is a holiday iff it was registered. An empty calendar means
/// no holidays, which degrades holiday handling to plain weekday
/// scheduling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Creates a calendar without any holidays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: registers a holiday date.
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    /// Registers a holiday date.
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Whether the given date is a public holiday.
    #[inline]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Number of registered holidays.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Whether no holidays are registered.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}
