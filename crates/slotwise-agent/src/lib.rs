// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation handling for the Slotwise scheduling engine.
//!
//! The [`SchedulingBrain`] is the central coordinator that:
//! - Screens every message for unsafe content
//! - Tracks conversation memory, loops, and expiry
//! - Escalates frustrated or confused customers to a human
//! - Finds, offers, and books calendar slots

pub mod brain;
pub mod handover;
pub mod manager;
pub mod templates;

pub use brain::{
    BrainDeps, InboundMessage, InboundReply, ProcessRequest, SchedulingBrain, SchedulingDecision,
};
pub use handover::{HandoverDecision, HandoverDetectionEngine, HandoverTrigger, HandoverUrgency};
pub use manager::{HandoverManager, HandoverOutcome, HandoverRequest};
