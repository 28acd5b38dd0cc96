// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state record.

use std::collections::VecDeque;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use slotwise_core::types::{Sender, TimeWindow, UrgencyLevel};

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub text: String,
    pub sender: Sender,
    pub timestamp: NaiveDateTime,
}

/// Everything the engine remembers about one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub conversation_id: String,
    /// The slot most recently offered. Overwritten on every proposal.
    pub last_proposed_slot: Option<NaiveDateTime>,
    /// The slot confirmed in this conversation, if any.
    pub booked_slot: Option<NaiveDateTime>,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time_window: Option<TimeWindow>,
    pub urgency: Option<UrgencyLevel>,
    pub previous_questions: Vec<String>,
    pub declined_slots: Vec<NaiveDateTime>,
    pub last_interaction: NaiveDateTime,
    /// Ring of recent normalized customer messages, oldest first.
    pub recent_messages: VecDeque<String>,
    pub loop_count: u32,
    pub decline_count: u32,
    pub contradiction_count: u32,
    pub all_messages: Vec<MessageRecord>,
    /// Set while a human owns the conversation.
    pub silenced: bool,
}

impl ConversationState {
    pub fn new(conversation_id: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            last_proposed_slot: None,
            booked_slot: None,
            preferred_date: None,
            preferred_time_window: None,
            urgency: None,
            previous_questions: Vec::new(),
            declined_slots: Vec::new(),
            last_interaction: now,
            recent_messages: VecDeque::new(),
            loop_count: 0,
            decline_count: 0,
            contradiction_count: 0,
            all_messages: Vec::new(),
            silenced: false,
        }
    }

    /// Untouched for longer than `ttl`.
    pub fn is_expired(&self, now: NaiveDateTime, ttl: TimeDelta) -> bool {
        now - self.last_interaction > ttl
    }

    /// Most recent customer messages, newest last.
    pub fn customer_messages(&self, limit: usize) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .all_messages
            .iter()
            .rev()
            .filter(|m| m.sender == Sender::Customer)
            .take(limit)
            .map(|m| m.text.as_str())
            .collect();
        out.reverse();
        out
    }
}
