// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local calendar store.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, info};

use slotwise_core::error::SlotwiseError;
use slotwise_core::traits::{CalendarStore, Collaborator};
use slotwise_core::types::{
    AvailabilityRange, BlockedRange, Booking, BookingStatus, CollaboratorKind, HealthStatus,
    NewBooking, overlaps,
};

#[derive(Debug, Default, Clone)]
struct ClientCalendar {
    availability: Vec<AvailabilityRange>,
    blocked: Vec<BlockedRange>,
    bookings: Vec<Booking>,
}

/// Seed data for one client, as read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarSeed {
    pub client_id: String,
    #[serde(default)]
    pub availability: Vec<AvailabilityRange>,
    #[serde(default)]
    pub blocked: Vec<BlockedRange>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Calendar store held entirely in memory, keyed by client id.
#[derive(Debug, Default)]
pub struct InMemoryCalendarStore {
    clients: DashMap<String, ClientCalendar>,
}

impl InMemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the opening hours of a client.
    pub fn set_availability(&self, client_id: &str, ranges: Vec<AvailabilityRange>) {
        self.clients.entry(client_id.to_string()).or_default().availability = ranges;
    }

    pub fn add_blocked(&self, client_id: &str, range: BlockedRange) {
        self.clients
            .entry(client_id.to_string())
            .or_default()
            .blocked
            .push(range);
    }

    /// Inserts a fully formed booking row, keeping its id.
    pub fn insert_booking(&self, booking: Booking) {
        self.clients
            .entry(booking.client_id.clone())
            .or_default()
            .bookings
            .push(booking);
    }

    /// Every booking row of a client, in insertion order.
    pub fn bookings_of(&self, client_id: &str) -> Vec<Booking> {
        self.clients
            .get(client_id)
            .map(|c| c.bookings.clone())
            .unwrap_or_default()
    }

    /// Loads seed data from a JSON array of [`CalendarSeed`] objects.
    /// Returns the number of bookings loaded.
    pub fn load_seed_json(&self, json: &str) -> Result<usize, SlotwiseError> {
        let seeds: Vec<CalendarSeed> = serde_json::from_str(json)
            .map_err(|e| SlotwiseError::InvalidInput(format!("calendar seed: {e}")))?;
        let mut loaded = 0;
        for seed in seeds {
            let mut entry = self.clients.entry(seed.client_id.clone()).or_default();
            if !seed.availability.is_empty() {
                entry.availability = seed.availability;
            }
            entry.blocked.extend(seed.blocked);
            loaded += seed.bookings.len();
            entry.bookings.extend(seed.bookings);
        }
        info!(bookings = loaded, "calendar seed loaded");
        Ok(loaded)
    }
}

#[async_trait]
impl Collaborator for InMemoryCalendarStore {
    fn name(&self) -> &str {
        "memory-calendar"
    }

    fn kind(&self) -> CollaboratorKind {
        CollaboratorKind::CalendarStore
    }

    async fn health_check(&self) -> Result<HealthStatus, SlotwiseError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CalendarStore for InMemoryCalendarStore {
    async fn availability(
        &self,
        client_id: &str,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityRange>, SlotwiseError> {
        Ok(self
            .clients
            .get(client_id)
            .map(|c| {
                c.availability
                    .iter()
                    .filter(|r| r.day_of_week == day_of_week)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn blocked_ranges(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<BlockedRange>, SlotwiseError> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + TimeDelta::days(1);
        Ok(self
            .clients
            .get(client_id)
            .map(|c| {
                c.blocked
                    .iter()
                    .filter(|b| overlaps(b.start, b.end, day_start, day_end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn bookings(
        &self,
        client_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Booking>, SlotwiseError> {
        Ok(self
            .clients
            .get(client_id)
            .map(|c| {
                c.bookings
                    .iter()
                    .filter(|b| {
                        if b.is_recurring() {
                            b.start < end
                        } else {
                            overlaps(b.start, b.end, start, end)
                        }
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, SlotwiseError> {
        if booking.end <= booking.start {
            return Err(SlotwiseError::InvalidInput(format!(
                "booking end {} is not after start {}",
                booking.end, booking.start
            )));
        }
        let row = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            rule_id: booking
                .recurrence
                .as_ref()
                .map(|_| uuid::Uuid::new_v4().to_string()),
            client_id: booking.client_id,
            start: booking.start,
            end: booking.end,
            status: BookingStatus::Confirmed,
            recurrence: booking.recurrence,
            conversation_id: booking.conversation_id,
            customer_phone: booking.customer_phone,
            customer_name: booking.customer_name,
        };
        debug!(booking_id = %row.id, client_id = %row.client_id, start = %row.start, "booking created");
        self.insert_booking(row.clone());
        Ok(row)
    }

    async fn update_booking(&self, booking: &Booking) -> Result<(), SlotwiseError> {
        let mut client = self.clients.get_mut(&booking.client_id).ok_or_else(|| {
            SlotwiseError::InvalidInput(format!("unknown client {}", booking.client_id))
        })?;
        let row = client
            .bookings
            .iter_mut()
            .find(|b| b.id == booking.id)
            .ok_or_else(|| SlotwiseError::InvalidInput(format!("unknown booking {}", booking.id)))?;
        *row = booking.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotwise_core::types::{Frequency, RecurrenceRule};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn new_booking(start: NaiveDateTime, recurrence: Option<RecurrenceRule>) -> NewBooking {
        NewBooking {
            client_id: "c1".into(),
            start,
            end: start + TimeDelta::hours(1),
            recurrence,
            conversation_id: None,
            customer_phone: None,
            customer_name: None,
        }
    }

    #[tokio::test]
    async fn availability_filters_by_weekday() {
        let store = InMemoryCalendarStore::new();
        let open = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let close = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        store.set_availability(
            "c1",
            vec![
                AvailabilityRange { day_of_week: 1, start: open, end: close },
                AvailabilityRange { day_of_week: 2, start: open, end: close },
            ],
        );
        assert_eq!(store.availability("c1", 1).await.unwrap().len(), 1);
        assert!(store.availability("c1", 0).await.unwrap().is_empty());
        assert!(store.availability("other", 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bookings_include_recurring_series_started_before_range() {
        let store = InMemoryCalendarStore::new();
        let weekly = RecurrenceRule::new(Frequency::Weekly, 1);
        let series = store.create_booking(new_booking(at(5, 9), Some(weekly))).await.unwrap();
        let one_off = store.create_booking(new_booking(at(19, 10), None)).await.unwrap();
        let _elsewhere = store.create_booking(new_booking(at(20, 10), None)).await.unwrap();

        let found = store.bookings("c1", at(19, 0), at(20, 0)).await.unwrap();
        let ids: Vec<_> = found.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![series.id.as_str(), one_off.id.as_str()]);
        assert!(series.rule_id.is_some());
        assert!(one_off.rule_id.is_none());
    }

    #[tokio::test]
    async fn update_replaces_row() {
        let store = InMemoryCalendarStore::new();
        let mut row = store.create_booking(new_booking(at(19, 10), None)).await.unwrap();
        row.status = BookingStatus::Cancelled;
        store.update_booking(&row).await.unwrap();
        assert_eq!(store.bookings_of("c1")[0].status, BookingStatus::Cancelled);

        row.id = "missing".into();
        assert!(store.update_booking(&row).await.is_err());
    }

    #[tokio::test]
    async fn inverted_booking_is_rejected() {
        let store = InMemoryCalendarStore::new();
        let mut bad = new_booking(at(19, 10), None);
        bad.end = bad.start;
        assert!(store.create_booking(bad).await.is_err());
    }

    #[tokio::test]
    async fn blocked_ranges_touching_the_day() {
        let store = InMemoryCalendarStore::new();
        store.add_blocked(
            "c1",
            BlockedRange { start: at(18, 22), end: at(19, 11), reason: None },
        );
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(store.blocked_ranges("c1", date).await.unwrap().len(), 1);
        let later = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        assert!(store.blocked_ranges("c1", later).await.unwrap().is_empty());
    }

    #[test]
    fn seed_json_loads_bookings() {
        let store = InMemoryCalendarStore::new();
        let json = r#"[{
            "client_id": "c1",
            "availability": [{"day_of_week": 1, "start": "09:00:00", "end": "17:00:00"}],
            "bookings": [{
                "id": "b1", "client_id": "c1",
                "start": "2026-10-19T10:00:00", "end": "2026-10-19T11:00:00",
                "status": "confirmed",
                "recurrence": {"frequency": "WEEKLY", "interval": 1, "by_weekday": [1, 3]}
            }]
        }]"#;
        assert_eq!(store.load_seed_json(json).unwrap(), 1);
        let rows = store.bookings_of("c1");
        assert!(rows[0].is_recurring());

        assert!(store.load_seed_json(r#"[{"client_id": "c1", "bogus": 1}]"#).is_err());
    }
}
