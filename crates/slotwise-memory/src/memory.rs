// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory operations.
//!
//! Every read goes through the liveness check: a conversation untouched for
//! longer than the TTL is discarded and started over, so nothing from an
//! old exchange (proposed slot, counters, preferences) leaks into a new one.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use slotwise_config::model::MemoryConfig;
use slotwise_core::clock::Clock;
use slotwise_core::types::{Sender, TimeWindow, UrgencyLevel};

use crate::state::{ConversationState, MessageRecord};
use crate::store::ConversationStore;

/// Bare tokens that carry no scheduling information on their own.
const AMBIGUOUS_TOKENS: &[&str] = &[
    "ok", "okay", "k", "kk", "yes", "yeah", "yep", "ya", "sure", "hmm", "hm", "huh", "what",
    "idk", "maybe", "lol",
];

/// Messages longer than this that are not repeats end a loop streak.
const SUBSTANTIVE_LENGTH: usize = 10;

/// Cap of the urgency score.
const MAX_URGENCY_SCORE: u8 = 10;

/// Result of feeding one message to the loop detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCheck {
    pub is_loop: bool,
    pub loop_count: u32,
}

/// What changed when preferences were merged into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferenceUpdate {
    /// The new date differs from one stated earlier.
    pub contradiction: bool,
}

/// Per-conversation memory over an injectable store.
pub struct ConversationMemory {
    store: Arc<dyn ConversationStore>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    ring_size: usize,
    hard_reset_threshold: u32,
}

impl ConversationMemory {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        clock: Arc<dyn Clock>,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            store,
            clock,
            ttl: TimeDelta::hours(i64::from(config.ttl_hours)),
            ring_size: config.ring_size.max(1),
            hard_reset_threshold: config.hard_reset_threshold,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Current state, created if absent and restarted if expired.
    pub fn get_or_create(&self, conversation_id: &str) -> ConversationState {
        let now = self.clock.now();
        match self.store.get(conversation_id) {
            Some(state) if !state.is_expired(now, self.ttl) => state,
            Some(_) => self.reset(conversation_id),
            None => {
                let state = ConversationState::new(conversation_id, now);
                self.store.set(state.clone());
                state
            }
        }
    }

    /// Current state without creating one. Expired state reads as absent.
    pub fn get(&self, conversation_id: &str) -> Option<ConversationState> {
        let now = self.clock.now();
        self.store
            .get(conversation_id)
            .filter(|s| !s.is_expired(now, self.ttl))
    }

    /// True when stored state exists but has outlived the TTL.
    pub fn needs_reset(&self, conversation_id: &str) -> bool {
        let now = self.clock.now();
        self.store
            .get(conversation_id)
            .is_some_and(|s| s.is_expired(now, self.ttl))
    }

    /// Replaces the state with a fresh one.
    pub fn reset(&self, conversation_id: &str) -> ConversationState {
        let state = ConversationState::new(conversation_id, self.clock.now());
        self.store.set(state.clone());
        info!(conversation_id, "conversation memory reset");
        state
    }

    pub fn touch(&self, conversation_id: &str) {
        let now = self.clock.now();
        self.update(conversation_id, |s| s.last_interaction = now);
    }

    pub fn propose_slot(&self, conversation_id: &str, slot: NaiveDateTime) {
        let now = self.clock.now();
        self.update(conversation_id, |s| {
            s.last_proposed_slot = Some(slot);
            s.last_interaction = now;
        });
    }

    /// Records a declined slot. Returns the new decline count.
    pub fn decline_slot(&self, conversation_id: &str, slot: NaiveDateTime) -> u32 {
        self.update(conversation_id, |s| {
            s.declined_slots.push(slot);
            s.decline_count += 1;
            s.decline_count
        })
    }

    pub fn record_booking(&self, conversation_id: &str, slot: NaiveDateTime) {
        self.update(conversation_id, |s| s.booked_slot = Some(slot));
    }

    /// Forgets a booking that could not be persisted.
    pub fn clear_booking(&self, conversation_id: &str) {
        self.update(conversation_id, |s| s.booked_slot = None);
    }

    /// Merges freshly extracted preferences. `None` values keep what was
    /// stored.
    pub fn set_preferences(
        &self,
        conversation_id: &str,
        date: Option<NaiveDate>,
        window: Option<TimeWindow>,
        urgency: UrgencyLevel,
    ) -> PreferenceUpdate {
        self.update(conversation_id, |s| {
            let mut update = PreferenceUpdate::default();
            if let Some(date) = date {
                if s.preferred_date.is_some_and(|old| old != date) {
                    s.contradiction_count += 1;
                    update.contradiction = true;
                }
                s.preferred_date = Some(date);
            }
            if window.is_some() {
                s.preferred_time_window = window;
            }
            if urgency != UrgencyLevel::None {
                s.urgency = Some(urgency);
            }
            update
        })
    }

    pub fn add_question(&self, conversation_id: &str, question: &str) {
        self.update(conversation_id, |s| s.previous_questions.push(question.to_string()));
    }

    /// Records an inbound message in the loop ring and reports whether the
    /// conversation is going in circles.
    pub fn detect_loop(&self, conversation_id: &str, message: &str) -> LoopCheck {
        let normalized = message.trim().to_lowercase();
        let ring_size = self.ring_size;
        let check = self.update(conversation_id, |s| {
            let ambiguous = is_ambiguous_token(&normalized);
            let previous_ambiguous = s
                .recent_messages
                .back()
                .is_some_and(|prev| is_ambiguous_token(prev));
            let repeated = s.recent_messages.iter().any(|m| *m == normalized);

            s.recent_messages.push_back(normalized.clone());
            while s.recent_messages.len() > ring_size {
                s.recent_messages.pop_front();
            }

            if ambiguous || repeated {
                s.loop_count += 1;
            } else if normalized.chars().count() > SUBSTANTIVE_LENGTH {
                s.loop_count = 0;
            }

            LoopCheck {
                is_loop: repeated || (ambiguous && previous_ambiguous),
                loop_count: s.loop_count,
            }
        });
        if check.is_loop {
            debug!(conversation_id, loop_count = check.loop_count, "loop detected");
        }
        check
    }

    pub fn needs_hard_reset(&self, conversation_id: &str) -> bool {
        self.get(conversation_id)
            .is_some_and(|s| s.loop_count >= self.hard_reset_threshold)
    }

    /// Clears the loop counter and the ring.
    pub fn reset_loop(&self, conversation_id: &str) {
        self.update(conversation_id, |s| {
            s.loop_count = 0;
            s.recent_messages.clear();
        });
    }

    pub fn add_message(&self, conversation_id: &str, text: &str, sender: Sender) {
        let now = self.clock.now();
        self.update(conversation_id, |s| {
            s.all_messages.push(MessageRecord {
                text: text.to_string(),
                sender,
                timestamp: now,
            });
        });
    }

    pub fn mark_silenced_for_handover(&self, conversation_id: &str) {
        self.update(conversation_id, |s| s.silenced = true);
    }

    pub fn unsilence(&self, conversation_id: &str) {
        self.update(conversation_id, |s| s.silenced = false);
    }

    pub fn is_silenced(&self, conversation_id: &str) -> bool {
        self.get(conversation_id).is_some_and(|s| s.silenced)
    }

    /// Escalation priority in 1..=10.
    pub fn urgency_score(&self, conversation_id: &str) -> u8 {
        self.get(conversation_id).map_or(1, |s| score(&s))
    }

    /// Drops every state older than the TTL. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.store.sweep(self.clock.now() - self.ttl);
        if removed > 0 {
            info!(removed, "expired conversations swept");
        }
        removed
    }

    fn update<R>(&self, conversation_id: &str, f: impl FnOnce(&mut ConversationState) -> R) -> R {
        let mut state = self.get_or_create(conversation_id);
        let out = f(&mut state);
        self.store.set(state);
        out
    }
}

/// Urgency score of a state snapshot.
pub fn score(state: &ConversationState) -> u8 {
    let mut score: u8 = 1;
    score += match state.urgency {
        Some(UrgencyLevel::High) => 4,
        Some(UrgencyLevel::Medium) => 2,
        Some(UrgencyLevel::Low) => 1,
        Some(UrgencyLevel::None) | None => 0,
    };
    if state.decline_count >= 3 {
        score += 3;
    }
    if state.loop_count >= 3 {
        score += 2;
    }
    if state.contradiction_count >= 2 {
        score += 2;
    }
    score.min(MAX_URGENCY_SCORE)
}

/// A bare acknowledgement, a lone question mark, or nothing but symbols.
pub fn is_ambiguous_token(normalized: &str) -> bool {
    let word = normalized.trim_end_matches(['.', '!']);
    AMBIGUOUS_TOKENS.contains(&word) || !normalized.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryConversationStore;
    use slotwise_core::clock::ManualClock;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn memory() -> (ConversationMemory, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now()));
        let memory = ConversationMemory::new(
            Arc::new(InMemoryConversationStore::new()),
            clock.clone(),
            &MemoryConfig::default(),
        );
        (memory, clock)
    }

    #[test]
    fn ambiguous_tokens() {
        assert!(is_ambiguous_token("ok"));
        assert!(is_ambiguous_token("ok!"));
        assert!(is_ambiguous_token("???"));
        assert!(is_ambiguous_token("\u{1f44d}"));
        assert!(is_ambiguous_token(""));
        assert!(!is_ambiguous_token("ok tuesday"));
        assert!(!is_ambiguous_token("no"));
    }

    #[test]
    fn repeated_ok_escalates_to_hard_reset() {
        let (m, _) = memory();
        let first = m.detect_loop("c", "ok");
        assert!(!first.is_loop);
        assert!(m.detect_loop("c", "OK ").is_loop);
        assert!(!m.needs_hard_reset("c"));
        assert!(m.detect_loop("c", "ok").is_loop);
        let fourth = m.detect_loop("c", "ok");
        assert!(fourth.is_loop);
        assert_eq!(fourth.loop_count, 4);
        assert!(m.needs_hard_reset("c"));

        m.reset_loop("c");
        assert!(!m.needs_hard_reset("c"));
        assert!(m.get("c").unwrap().recent_messages.is_empty());
    }

    #[test]
    fn substantive_message_breaks_the_streak() {
        let (m, _) = memory();
        m.detect_loop("c", "ok");
        m.detect_loop("c", "yes");
        let check = m.detect_loop("c", "could we try thursday morning");
        assert!(!check.is_loop);
        assert_eq!(check.loop_count, 0);
    }

    #[test]
    fn repeated_sentence_is_a_loop() {
        let (m, _) = memory();
        assert!(!m.detect_loop("c", "what times do you have").is_loop);
        assert!(m.detect_loop("c", "What times do you have").is_loop);
    }

    #[test]
    fn ring_forgets_old_messages() {
        let (m, _) = memory();
        m.detect_loop("c", "first long message here");
        for i in 0..5 {
            m.detect_loop("c", &format!("filler message number {i}"));
        }
        assert!(!m.detect_loop("c", "first long message here").is_loop);
        assert_eq!(m.get("c").unwrap().recent_messages.len(), 5);
    }

    #[test]
    fn stale_state_is_reset_on_access() {
        let (m, clock) = memory();
        m.propose_slot("c", now() + TimeDelta::hours(3));
        m.decline_slot("c", now() + TimeDelta::hours(3));

        clock.advance(TimeDelta::hours(24) + TimeDelta::minutes(1));
        assert!(m.needs_reset("c"));
        assert!(m.get("c").is_none());

        let fresh = m.get_or_create("c");
        assert_eq!(fresh.last_proposed_slot, None);
        assert_eq!(fresh.decline_count, 0);
        assert!(!m.needs_reset("c"));
    }

    #[test]
    fn exactly_ttl_is_still_alive() {
        let (m, clock) = memory();
        m.touch("c");
        clock.advance(TimeDelta::hours(24));
        assert!(!m.needs_reset("c"));
    }

    #[test]
    fn preferences_track_contradictions() {
        let (m, _) = memory();
        let tue = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let wed = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert!(!m.set_preferences("c", Some(tue), None, UrgencyLevel::None).contradiction);
        assert!(!m.set_preferences("c", Some(tue), None, UrgencyLevel::None).contradiction);
        assert!(m.set_preferences("c", Some(wed), None, UrgencyLevel::Low).contradiction);
        // A message without a date keeps the stored one.
        m.set_preferences("c", None, None, UrgencyLevel::None);

        let s = m.get("c").unwrap();
        assert_eq!(s.preferred_date, Some(wed));
        assert_eq!(s.contradiction_count, 1);
        assert_eq!(s.urgency, Some(UrgencyLevel::Low));
    }

    #[test]
    fn urgency_score_weights() {
        let (m, _) = memory();
        assert_eq!(m.urgency_score("nobody"), 1);

        m.set_preferences("c", None, None, UrgencyLevel::High);
        assert_eq!(m.urgency_score("c"), 5);
        for _ in 0..3 {
            m.decline_slot("c", now());
        }
        assert_eq!(m.urgency_score("c"), 8);
        for _ in 0..3 {
            m.detect_loop("c", "ok");
        }
        assert_eq!(m.urgency_score("c"), 10);

        let mut s = m.get("c").unwrap();
        s.contradiction_count = 5;
        assert_eq!(score(&s), 10);
    }

    #[test]
    fn silence_round_trip() {
        let (m, _) = memory();
        m.mark_silenced_for_handover("c");
        assert!(m.is_silenced("c"));
        m.unsilence("c");
        assert!(!m.is_silenced("c"));
    }

    #[test]
    fn transcript_keeps_senders() {
        let (m, _) = memory();
        m.add_message("c", "hi", Sender::Customer);
        m.add_message("c", "Hello!", Sender::Ai);
        m.add_message("c", "tuesday?", Sender::Customer);
        let s = m.get("c").unwrap();
        assert_eq!(s.all_messages.len(), 3);
        assert_eq!(s.customer_messages(5), vec!["hi", "tuesday?"]);
        assert_eq!(s.customer_messages(1), vec!["tuesday?"]);
    }

    #[test]
    fn sweep_expired_uses_ttl() {
        let (m, clock) = memory();
        m.touch("old");
        clock.advance(TimeDelta::hours(20));
        m.touch("young");
        clock.advance(TimeDelta::hours(5));
        assert_eq!(m.sweep_expired(), 1);
        assert!(m.get("young").is_some());
    }
}
