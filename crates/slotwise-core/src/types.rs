// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the parsers, the calendar, the memory, and the brain.
//!
//! All calendar times are naive local times of the business. Weekday numbers
//! follow the 0 = Sunday convention used by the stores.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SlotwiseError;

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is operational but experiencing issues.
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum CollaboratorKind {
    CalendarStore,
    HandoverStore,
    NotificationGateway,
}

/// Coarse urgency of a customer's request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// Author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Customer,
    Ai,
    Human,
}

/// A time-of-day window on a 24h clock. Start is always strictly before end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

/// Windows wider than this are too broad to search without narrowing.
pub const MAX_WINDOW_MINUTES: i64 = 240;

impl TimeWindow {
    /// Creates a window from hour/minute pairs.
    pub fn new(
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
    ) -> Result<Self, SlotwiseError> {
        let start = NaiveTime::from_hms_opt(start_hour, start_minute, 0).ok_or_else(|| {
            SlotwiseError::InvalidInput(format!("invalid start {start_hour}:{start_minute:02}"))
        })?;
        let end = NaiveTime::from_hms_opt(end_hour, end_minute, 0).ok_or_else(|| {
            SlotwiseError::InvalidInput(format!("invalid end {end_hour}:{end_minute:02}"))
        })?;
        Self::from_times(start, end)
    }

    /// Creates a window from two times of day.
    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Result<Self, SlotwiseError> {
        if start >= end {
            return Err(SlotwiseError::InvalidInput(format!(
                "time window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }

    pub fn start_minute(&self) -> u32 {
        self.start.minute()
    }

    pub fn end_hour(&self) -> u32 {
        self.end.hour()
    }

    pub fn end_minute(&self) -> u32 {
        self.end.minute()
    }

    /// Width of the window in minutes.
    pub fn width_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether the window is too wide to search without asking for a narrower time.
    pub fn is_too_broad(&self) -> bool {
        self.width_minutes() > MAX_WINDOW_MINUTES
    }

    /// Intersects this window with `[start, end)`, returning the overlap if non-empty.
    pub fn intersect(&self, start: NaiveTime, end: NaiveTime) -> Option<(NaiveTime, NaiveTime)> {
        let s = self.start.max(start);
        let e = self.end.min(end);
        (s < e).then_some((s, e))
    }
}

/// Recurrence frequency of a booking series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

/// A recurrence rule attached to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Step multiplier, at least 1.
    pub interval: u32,
    /// Weekdays the series lands on (0 = Sunday .. 6 = Saturday).
    #[serde(default)]
    pub by_weekday: Option<BTreeSet<u8>>,
    /// Days of the month the series lands on (1..=31).
    #[serde(default)]
    pub by_monthday: Option<BTreeSet<u8>>,
    /// Last date (inclusive) an occurrence may start on.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Total number of occurrences in the series.
    #[serde(default)]
    pub occurrences: Option<u32>,
}

impl RecurrenceRule {
    /// Creates an open-ended rule with no filters.
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            by_weekday: None,
            by_monthday: None,
            end_date: None,
            occurrences: None,
        }
    }

    pub fn with_weekdays(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.by_weekday = Some(days.into_iter().collect());
        self
    }

    pub fn with_monthdays(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.by_monthday = Some(days.into_iter().collect());
        self
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn count(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    /// Checks the rule's contract.
    pub fn validate(&self) -> Result<(), SlotwiseError> {
        if self.interval == 0 {
            return Err(SlotwiseError::InvalidRule("interval must be at least 1".into()));
        }
        if let Some(days) = &self.by_weekday
            && let Some(bad) = days.iter().find(|d| **d > 6)
        {
            return Err(SlotwiseError::InvalidRule(format!(
                "weekday {bad} is outside 0..=6"
            )));
        }
        if let Some(days) = &self.by_monthday
            && let Some(bad) = days.iter().find(|d| !(1..=31).contains(*d))
        {
            return Err(SlotwiseError::InvalidRule(format!(
                "day of month {bad} is outside 1..=31"
            )));
        }
        Ok(())
    }

    /// Whether a candidate date passes the weekday and monthday filters.
    pub fn matches(&self, date: NaiveDate) -> bool {
        let weekday_ok = self
            .by_weekday
            .as_ref()
            .is_none_or(|days| days.contains(&weekday_number(date)));
        let monthday_ok = self
            .by_monthday
            .as_ref()
            .is_none_or(|days| days.contains(&(date.day() as u8)));
        weekday_ok && monthday_ok
    }
}

/// Weekday of a date as 0 = Sunday .. 6 = Saturday.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Lifecycle status of a booking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A booking row as held by the calendar store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    /// Present when this row stands for a whole recurring series.
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

impl Booking {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// Request to create a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub client_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// A recurring weekly opening range of the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRange {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A one-off range during which nothing may be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Persisted handover state for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverState {
    pub conversation_id: String,
    pub active: bool,
    pub reason: Option<String>,
    /// Urgency score in 1..=10.
    pub urgency: u8,
    pub last_notified_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

/// An outbound SMS or email payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub body: String,
}

/// Whether two half-open ranges `[a_start, a_end)` and `[b_start, b_end)` overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}
