// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the scheduling engine.
//!
//! Every external collaborator extends the [`Collaborator`] base trait and
//! uses `#[async_trait]` for dynamic dispatch compatibility. The text
//! classifiers share the synchronous [`Classifier`] seam.

pub mod adapter;
pub mod calendar;
pub mod classifier;
pub mod handover;
pub mod notify;

pub use adapter::Collaborator;
pub use calendar::CalendarStore;
pub use classifier::Classifier;
pub use handover::HandoverStore;
pub use notify::NotificationGateway;
