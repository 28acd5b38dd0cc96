// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Slotwise integration tests.
//!
//! Provides mock collaborators and test harness infrastructure for fast,
//! deterministic tests with a manual clock and in-memory stores.
//!
//! # Components
//!
//! - [`FaultyCalendar`] - In-memory calendar with switchable read/write failures
//! - [`RecordingGateway`] - Notification gateway that captures what it sends
//! - [`TestHarness`] - A complete brain wired to the mocks above

pub mod harness;
pub mod mock_calendar;
pub mod mock_gateway;

pub use harness::TestHarness;
pub use mock_calendar::FaultyCalendar;
pub use mock_gateway::RecordingGateway;
