// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar store whose reads and writes can be made to fail.
//!
//! `FaultyCalendar` delegates to an [`InMemoryCalendarStore`] until a test
//! flips one of its switches, so the same fixture covers both the happy path
//! and store outages.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use slotwise_core::SlotwiseError;
use slotwise_core::traits::{CalendarStore, Collaborator};
use slotwise_core::types::{
    AvailabilityRange, BlockedRange, Booking, CollaboratorKind, HealthStatus, NewBooking,
};
use slotwise_storage::InMemoryCalendarStore;

#[derive(Default)]
pub struct FaultyCalendar {
    inner: InMemoryCalendarStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FaultyCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing store, for seeding and for inspecting created bookings.
    pub fn inner(&self) -> &InMemoryCalendarStore {
        &self.inner
    }

    pub fn fail_reads(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), SlotwiseError> {
        if flag.load(Ordering::SeqCst) {
            return Err(SlotwiseError::store(std::io::Error::other(format!(
                "calendar {op} unavailable"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl Collaborator for FaultyCalendar {
    fn name(&self) -> &str {
        "faulty-calendar"
    }

    fn kind(&self) -> CollaboratorKind {
        CollaboratorKind::CalendarStore
    }

    async fn health_check(&self) -> Result<HealthStatus, SlotwiseError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("reads failing".into()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CalendarStore for FaultyCalendar {
    async fn availability(
        &self,
        client_id: &str,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityRange>, SlotwiseError> {
        self.check(&self.fail_reads, "read")?;
        self.inner.availability(client_id, day_of_week).await
    }

    async fn blocked_ranges(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<BlockedRange>, SlotwiseError> {
        self.check(&self.fail_reads, "read")?;
        self.inner.blocked_ranges(client_id, date).await
    }

    async fn bookings(
        &self,
        client_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Booking>, SlotwiseError> {
        self.check(&self.fail_reads, "read")?;
        self.inner.bookings(client_id, start, end).await
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, SlotwiseError> {
        self.check(&self.fail_writes, "write")?;
        self.inner.create_booking(booking).await
    }

    async fn update_booking(&self, booking: &Booking) -> Result<(), SlotwiseError> {
        self.check(&self.fail_writes, "write")?;
        self.inner.update_booking(booking).await
    }
}
