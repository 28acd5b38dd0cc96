// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handover state persistence keyed by conversation.

use async_trait::async_trait;

use crate::error::SlotwiseError;
use crate::traits::adapter::Collaborator;
use crate::types::HandoverState;

/// Stores which conversations are currently owned by a human operator.
#[async_trait]
pub trait HandoverStore: Collaborator {
    /// Returns the handover state of a conversation, if one was ever recorded.
    async fn get(&self, conversation_id: &str) -> Result<Option<HandoverState>, SlotwiseError>;

    /// Inserts or replaces the handover state of a conversation.
    async fn put(&self, state: HandoverState) -> Result<(), SlotwiseError>;
}
