// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory collaborator adapters for Slotwise.
//!
//! Production deployments put a relational calendar, a handover table, and
//! an SMS gateway behind the core traits. These adapters keep everything in
//! process for the interactive shell and for tests.

pub mod calendar;
pub mod handover;
pub mod notify;

pub use calendar::{CalendarSeed, InMemoryCalendarStore};
pub use handover::InMemoryHandoverStore;
pub use notify::LogGateway;
