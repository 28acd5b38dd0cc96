// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar reasoning for Slotwise: recurring-booking expansion and the
//! earliest-slot search built on top of it.

pub mod recurrence;
pub mod slots;

pub use recurrence::{BookingOccurrence, DEFAULT_SAFETY_CAP_FLOOR, RecurrenceEngine};
pub use slots::{DEFAULT_BUFFER_MINUTES, SlotFinder, SlotQuery};
