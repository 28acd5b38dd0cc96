// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handover lifecycle: hand a conversation to a human, notify the owner,
//! and hand it back.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tracing::{info, warn};

use slotwise_config::model::HandoverConfig;
use slotwise_core::clock::Clock;
use slotwise_core::error::SlotwiseError;
use slotwise_core::timeout::bounded;
use slotwise_core::traits::{HandoverStore, NotificationGateway};
use slotwise_core::types::{HandoverState, Notification};
use slotwise_memory::ConversationMemory;

use crate::handover::HandoverUrgency;
use crate::templates;

/// A request to put a conversation in front of a human.
#[derive(Debug, Clone)]
pub struct HandoverRequest {
    pub conversation_id: String,
    pub reason: String,
    /// 1..=10.
    pub urgency: u8,
    /// Masked customer contact for the owner notification.
    pub customer: Option<String>,
}

/// What a trigger call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoverOutcome {
    /// The owner was notified on this call.
    pub notified: bool,
}

/// Owns the handover state machine: inactive -> active -> released.
pub struct HandoverManager {
    store: Arc<dyn HandoverStore>,
    gateway: Arc<dyn NotificationGateway>,
    memory: Arc<ConversationMemory>,
    clock: Arc<dyn Clock>,
    throttle: TimeDelta,
    owner_contact: Option<String>,
    timeout: Duration,
}

impl HandoverManager {
    pub fn new(
        store: Arc<dyn HandoverStore>,
        gateway: Arc<dyn NotificationGateway>,
        memory: Arc<ConversationMemory>,
        clock: Arc<dyn Clock>,
        config: &HandoverConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            memory,
            clock,
            throttle: TimeDelta::seconds(i64::try_from(config.notify_throttle_secs).unwrap_or(i64::MAX)),
            owner_contact: config.owner_contact.clone(),
            timeout,
        }
    }

    /// Whether a human currently owns the conversation.
    pub async fn is_active(&self, conversation_id: &str) -> Result<bool, SlotwiseError> {
        let state = bounded(self.timeout, self.store.get(conversation_id)).await?;
        Ok(state.is_some_and(|s| s.active))
    }

    /// Marks the conversation as handed over, silences the bot, and notifies
    /// the owner unless they were notified about it within the throttle
    /// window. Notification failures are logged, not returned.
    pub async fn trigger(&self, request: HandoverRequest) -> Result<HandoverOutcome, SlotwiseError> {
        let now = self.clock.now();
        let existing = bounded(self.timeout, self.store.get(&request.conversation_id)).await?;

        let last_notified_at = existing.as_ref().and_then(|s| s.last_notified_at);
        let urgency = match &existing {
            Some(s) if s.active => s.urgency.max(request.urgency),
            _ => request.urgency,
        }
        .clamp(1, 10);

        let mut state = HandoverState {
            conversation_id: request.conversation_id.clone(),
            active: true,
            reason: Some(request.reason.clone()),
            urgency,
            last_notified_at,
            updated_at: now,
        };

        self.memory.mark_silenced_for_handover(&request.conversation_id);

        let throttled = last_notified_at.is_some_and(|at| now - at < self.throttle);
        let mut notified = false;
        match (&self.owner_contact, throttled) {
            (Some(owner), false) => {
                let body = templates::handover_notification(
                    &HandoverUrgency::from_score(urgency).to_string(),
                    &request.conversation_id,
                    urgency,
                    &request.reason,
                    request.customer.as_deref(),
                );
                let notification = Notification {
                    recipient: owner.clone(),
                    body,
                };
                match bounded(self.timeout, self.gateway.send(notification)).await {
                    Ok(()) => {
                        state.last_notified_at = Some(now);
                        notified = true;
                    }
                    Err(e) => warn!(
                        conversation_id = %request.conversation_id,
                        error = %e,
                        "owner notification failed"
                    ),
                }
            }
            (Some(_), true) => {
                info!(conversation_id = %request.conversation_id, "owner notification throttled");
            }
            (None, _) => {}
        }

        bounded(self.timeout, self.store.put(state)).await?;
        info!(
            conversation_id = %request.conversation_id,
            reason = %request.reason,
            urgency,
            notified,
            "conversation handed over"
        );
        Ok(HandoverOutcome { notified })
    }

    /// Hands the conversation back to the bot.
    pub async fn release(&self, conversation_id: &str) -> Result<(), SlotwiseError> {
        let existing = bounded(self.timeout, self.store.get(conversation_id)).await?;
        if let Some(mut state) = existing {
            state.active = false;
            state.updated_at = self.clock.now();
            bounded(self.timeout, self.store.put(state)).await?;
        }
        self.memory.unsilence(conversation_id);
        info!(conversation_id, "conversation released from handover");
        Ok(())
    }
}
