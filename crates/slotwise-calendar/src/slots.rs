// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Earliest-slot search against the calendar store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::{debug, instrument};

use slotwise_core::clock::Clock;
use slotwise_core::error::SlotwiseError;
use slotwise_core::timeout::bounded;
use slotwise_core::traits::CalendarStore;
use slotwise_core::types::{TimeWindow, overlaps, weekday_number};

use crate::recurrence::RecurrenceEngine;

/// Default gap kept free after a slot before the next booking starts.
pub const DEFAULT_BUFFER_MINUTES: u32 = 15;

/// Default deadline for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters of one slot search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub client_id: String,
    /// First day searched. Defaults to today.
    pub preferred_date: Option<NaiveDate>,
    /// Restricts candidates to this part of each day.
    pub time_window: Option<TimeWindow>,
    pub duration_minutes: u32,
    /// Number of days searched, the first day included.
    pub search_days_ahead: u32,
    /// Earliest acceptable start. Defaults to now.
    pub not_before: Option<NaiveDateTime>,
}

impl SlotQuery {
    pub fn new(client_id: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            client_id: client_id.into(),
            preferred_date: None,
            time_window: None,
            duration_minutes,
            search_days_ahead: 14,
            not_before: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.preferred_date = Some(date);
        self
    }

    pub fn within(mut self, window: Option<TimeWindow>) -> Self {
        self.time_window = window;
        self
    }

    pub fn days(mut self, days: u32) -> Self {
        self.search_days_ahead = days;
        self
    }

    pub fn not_before(mut self, at: NaiveDateTime) -> Self {
        self.not_before = Some(at);
        self
    }
}

/// A busy range of the day being searched.
#[derive(Debug, Clone, Copy)]
struct Busy {
    start: NaiveDateTime,
    end: NaiveDateTime,
    /// Bookings need a turnaround gap after a slot; blocked time does not.
    needs_gap: bool,
}

/// Finds the earliest bookable slot for a client.
pub struct SlotFinder {
    store: Arc<dyn CalendarStore>,
    clock: Arc<dyn Clock>,
    engine: RecurrenceEngine,
    buffer: TimeDelta,
    timeout: Duration,
}

impl SlotFinder {
    pub fn new(store: Arc<dyn CalendarStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            engine: RecurrenceEngine::default(),
            buffer: TimeDelta::minutes(i64::from(DEFAULT_BUFFER_MINUTES)),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_engine(mut self, engine: RecurrenceEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_buffer_minutes(mut self, minutes: u32) -> Self {
        self.buffer = TimeDelta::minutes(i64::from(minutes));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Earliest start that fits the query, or `None` once the horizon is
    /// exhausted.
    #[instrument(skip(self, query), fields(client_id = %query.client_id))]
    pub async fn find_earliest_slot(
        &self,
        query: &SlotQuery,
    ) -> Result<Option<NaiveDateTime>, SlotwiseError> {
        if query.duration_minutes == 0 {
            return Err(SlotwiseError::InvalidInput(
                "slot duration must be at least one minute".into(),
            ));
        }
        let now = self.clock.now();
        let first_day = query.preferred_date.unwrap_or(now.date());
        let not_before = query.not_before.unwrap_or(now);
        let duration = TimeDelta::minutes(i64::from(query.duration_minutes));

        for offset in 0..query.search_days_ahead {
            let date = first_day + TimeDelta::days(i64::from(offset));
            if date < not_before.date() {
                continue;
            }
            if let Some(slot) = self
                .first_slot_on(&query.client_id, date, query.time_window, duration, not_before)
                .await?
            {
                debug!(%slot, days_searched = offset + 1, "slot found");
                return Ok(Some(slot));
            }
        }
        debug!(days = query.search_days_ahead, "no slot within horizon");
        Ok(None)
    }

    /// True when the business has no opening hours on `date`.
    pub async fn is_day_closed(&self, client_id: &str, date: NaiveDate) -> Result<bool, SlotwiseError> {
        let ranges = bounded(
            self.timeout,
            self.store.availability(client_id, weekday_number(date)),
        )
        .await?;
        Ok(ranges.is_empty())
    }

    /// First day after `from` with any opening hours, looking at most
    /// `max_days` ahead.
    pub async fn find_next_open_day(
        &self,
        client_id: &str,
        from: NaiveDate,
        max_days: u32,
    ) -> Result<Option<NaiveDate>, SlotwiseError> {
        for offset in 1..=max_days {
            let date = from + TimeDelta::days(i64::from(offset));
            if !self.is_day_closed(client_id, date).await? {
                return Ok(Some(date));
            }
        }
        Ok(None)
    }

    async fn first_slot_on(
        &self,
        client_id: &str,
        date: NaiveDate,
        window: Option<TimeWindow>,
        duration: TimeDelta,
        not_before: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, SlotwiseError> {
        let mut ranges = bounded(
            self.timeout,
            self.store.availability(client_id, weekday_number(date)),
        )
        .await?;
        if ranges.is_empty() {
            return Ok(None);
        }
        ranges.sort_by_key(|r| r.start);

        let busy = self.busy_ranges(client_id, date).await?;

        for range in ranges {
            let (open, close) = match window {
                Some(w) => match w.intersect(range.start, range.end) {
                    Some(span) => span,
                    None => continue,
                },
                None => (range.start, range.end),
            };
            let close = date.and_time(close);
            let mut candidate = date.and_time(open);
            while candidate + duration <= close {
                if candidate >= not_before && self.is_free(candidate, candidate + duration, &busy) {
                    return Ok(Some(candidate));
                }
                candidate += duration;
            }
        }
        Ok(None)
    }

    /// Blocked time and every active booking instance touching `date`.
    async fn busy_ranges(&self, client_id: &str, date: NaiveDate) -> Result<Vec<Busy>, SlotwiseError> {
        let day_start = date.and_time(NaiveTime::MIN);
        // Bookings just past midnight still constrain the last slot's gap.
        let day_end = day_start + TimeDelta::days(1) + self.buffer;

        let blocked = bounded(self.timeout, self.store.blocked_ranges(client_id, date)).await?;
        let bookings = bounded(
            self.timeout,
            self.store.bookings(client_id, day_start, day_end),
        )
        .await?;

        let mut busy: Vec<Busy> = blocked
            .into_iter()
            .map(|b| Busy {
                start: b.start,
                end: b.end,
                needs_gap: false,
            })
            .collect();
        for booking in bookings.iter().filter(|b| b.is_active()) {
            for occurrence in self.engine.expand_booking(booking, day_start, day_end)? {
                busy.push(Busy {
                    start: occurrence.start,
                    end: occurrence.end,
                    needs_gap: true,
                });
            }
        }
        Ok(busy)
    }

    fn is_free(&self, start: NaiveDateTime, end: NaiveDateTime, busy: &[Busy]) -> bool {
        busy.iter().all(|b| {
            let padded_end = if b.needs_gap { end + self.buffer } else { end };
            !overlaps(start, padded_end, b.start, b.end)
        })
    }
}
