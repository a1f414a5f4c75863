//! Time handling for quotations
//!
//! All business dates ("today", vehicle age, document recency, cover start)
//! are evaluated in the jurisdiction's local calendar, never in UTC. The
//! current instant is read through the [`Clock`] trait so that the rating and
//! validation logic stays deterministic under test.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for policy jurisdictions
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timezone::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA zone name such as `Africa/Nairobi`
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(name.to_string()))
    }

    /// Returns the calendar date of `instant` in this timezone
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Africa::Nairobi)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Date arithmetic out of range")]
    OutOfRange,
}

/// Source of the current instant and the jurisdiction's calendar
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;

    /// The jurisdiction timezone business dates are evaluated in
    fn timezone(&self) -> Timezone;

    /// Today's date in the jurisdiction timezone
    fn today(&self) -> NaiveDate {
        self.timezone().local_date(self.now())
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    timezone: Timezone,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>, timezone: Timezone) -> Self {
        Self { instant, timezone }
    }

    /// Freezes the clock at 12:00 UTC on `date`, which falls on the same
    /// calendar day in every African timezone
    pub fn on_date(date: NaiveDate, timezone: Timezone) -> Self {
        let noon = date
            .and_time(NaiveTime::MIN)
            .and_utc()
            + chrono::Duration::hours(12);
        Self { instant: noon, timezone }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// Subtracts whole calendar months, clamping to the last day of a short month
pub fn subtract_months(date: NaiveDate, months: u32) -> Result<NaiveDate, TemporalError> {
    date.checked_sub_months(Months::new(months))
        .ok_or(TemporalError::OutOfRange)
}

/// Completed years between `born` and `on`; zero if `on` precedes `born`
pub fn age_on(born: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - born.year();
    if (on.month(), on.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    years.max(0) as u32
}
