// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Slotwise scheduling engine.
//!
//! This crate provides the foundational collaborator traits, the error type,
//! and the calendar/conversation types shared by every other crate in the
//! workspace. Store and gateway backends implement the traits defined here.

pub mod clock;
pub mod error;
pub mod text;
pub mod timeout;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SlotwiseError;
pub use text::phrase_regex;
pub use timeout::bounded;
pub use types::{
    AvailabilityRange, BlockedRange, Booking, BookingStatus, CollaboratorKind, Frequency,
    HandoverState, HealthStatus, NewBooking, Notification, RecurrenceRule, Sender, TimeWindow,
    UrgencyLevel,
};

// Re-export all collaborator traits at crate root.
pub use traits::{CalendarStore, Classifier, Collaborator, HandoverStore, NotificationGateway};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slotwise_error_has_all_variants() {
        let _config = SlotwiseError::Config("test".into());
        let _store = SlotwiseError::store(std::io::Error::other("test"));
        let _gateway = SlotwiseError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _timeout = SlotwiseError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let _rule = SlotwiseError::InvalidRule("test".into());
        let _input = SlotwiseError::InvalidInput("test".into());
        let _internal = SlotwiseError::Internal("test".into());
    }

    #[test]
    fn collaborator_kind_round_trips_through_strings() {
        use std::str::FromStr;

        for kind in [
            CollaboratorKind::CalendarStore,
            CollaboratorKind::HandoverStore,
            CollaboratorKind::NotificationGateway,
        ] {
            let parsed = CollaboratorKind::from_str(&kind.to_string()).expect("should parse back");
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        assert_eq!(HealthStatus::Healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), HealthStatus::Healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), HealthStatus::Healthy);
    }

    #[test]
    fn all_collaborator_traits_are_exported() {
        fn _assert_calendar<T: CalendarStore>() {}
        fn _assert_handover<T: HandoverStore>() {}
        fn _assert_gateway<T: NotificationGateway>() {}
        fn _assert_collaborator<T: Collaborator>() {}
    }
}
