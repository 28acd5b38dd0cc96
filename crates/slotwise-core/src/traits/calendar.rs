// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar store trait: business availability, blocked time, and bookings.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::SlotwiseError;
use crate::traits::adapter::Collaborator;
use crate::types::{AvailabilityRange, BlockedRange, Booking, NewBooking};

/// Read/write access to the relational booking system of record.
///
/// Every call is a fallible network round trip from the engine's point of
/// view. Implementations must not retry internally.
#[async_trait]
pub trait CalendarStore: Collaborator {
    /// Opening ranges of `client_id` on a weekday (0 = Sunday).
    async fn availability(
        &self,
        client_id: &str,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityRange>, SlotwiseError>;

    /// Blocked ranges of `client_id` touching `date`.
    async fn blocked_ranges(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<BlockedRange>, SlotwiseError>;

    /// Bookings of `client_id` that may affect `[start, end)`.
    ///
    /// Returns non-recurring bookings overlapping the range, plus every
    /// recurring series whose base booking starts before `end`. Callers
    /// expand the series themselves.
    async fn bookings(
        &self,
        client_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Booking>, SlotwiseError>;

    /// Creates a booking and returns the stored row.
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, SlotwiseError>;

    /// Replaces an existing booking row.
    async fn update_booking(&self, booking: &Booking) -> Result<(), SlotwiseError>;
}
