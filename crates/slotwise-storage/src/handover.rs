// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local handover state.

use async_trait::async_trait;
use dashmap::DashMap;

use slotwise_core::error::SlotwiseError;
use slotwise_core::traits::{Collaborator, HandoverStore};
use slotwise_core::types::{CollaboratorKind, HandoverState, HealthStatus};

#[derive(Debug, Default)]
pub struct InMemoryHandoverStore {
    states: DashMap<String, HandoverState>,
}

impl InMemoryHandoverStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversations currently held by a human.
    pub fn active(&self) -> Vec<HandoverState> {
        let mut out: Vec<_> = self
            .states
            .iter()
            .filter(|s| s.active)
            .map(|s| s.value().clone())
            .collect();
        out.sort_by(|a, b| a.conversation_id.cmp(&b.conversation_id));
        out
    }
}

#[async_trait]
impl Collaborator for InMemoryHandoverStore {
    fn name(&self) -> &str {
        "memory-handover"
    }

    fn kind(&self) -> CollaboratorKind {
        CollaboratorKind::HandoverStore
    }

    async fn health_check(&self) -> Result<HealthStatus, SlotwiseError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl HandoverStore for InMemoryHandoverStore {
    async fn get(&self, conversation_id: &str) -> Result<Option<HandoverState>, SlotwiseError> {
        Ok(self.states.get(conversation_id).map(|s| s.value().clone()))
    }

    async fn put(&self, state: HandoverState) -> Result<(), SlotwiseError> {
        self.states.insert(state.conversation_id.clone(), state);
        Ok(())
    }
}
