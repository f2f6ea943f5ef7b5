//! Calendar-date seam.
//!
//! All "due" and "rollover" decisions obtain the current local date through
//! [`Clock`]. Pure functions take a `NaiveDate` argument and never read the
//! system time themselves.

use std::sync::{Arc, Mutex};

use chrono::{Datelike, Local, NaiveDate};

/// Source of the current local calendar date.
pub trait Clock: Send + Sync {
    /// Today's date in the user's local timezone.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests and simulations.
///
/// Clones share the same date, so a test can keep a handle and advance the
/// day after handing the clock to a [`crate::Store`].
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        let mut guard = self.date.lock().unwrap_or_else(|e| e.into_inner());
        *guard = date;
    }

    /// Move the clock forward (or backward, for skew tests) by `days`.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.date.lock().unwrap_or_else(|e| e.into_inner());
        *guard += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Format a date as the `YYYY-MM-DD` day key used by the daily list.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Weekday as 0 = Sunday ..= 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}
