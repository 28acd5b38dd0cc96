// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic natural-language extraction for scheduling messages.
//!
//! Every parser here is rule based: no model calls, no network. A miss is
//! `None` or `false`, never an error, and drives a clarifying question
//! upstream.

pub mod date;
pub mod intent;
pub mod time;
pub mod urgency;

pub use date::DateParser;
pub use intent::{IntentClassifier, ReplyIntent};
pub use time::TimeParser;
pub use urgency::UrgencyClassifier;
