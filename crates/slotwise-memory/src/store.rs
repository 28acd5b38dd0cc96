// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed storage for conversation state.

use chrono::NaiveDateTime;
use dashmap::DashMap;

use crate::state::ConversationState;

/// Keyed conversation state storage.
///
/// Must support concurrent access across keys. Callers serialize writes to
/// the same key.
pub trait ConversationStore: Send + Sync {
    fn get(&self, conversation_id: &str) -> Option<ConversationState>;

    fn set(&self, state: ConversationState);

    fn delete(&self, conversation_id: &str);

    /// Removes every state last touched before `cutoff`. Returns how many.
    fn sweep(&self, cutoff: NaiveDateTime) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sharded in-process map.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    states: DashMap<String, ConversationState>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn get(&self, conversation_id: &str) -> Option<ConversationState> {
        self.states.get(conversation_id).map(|s| s.value().clone())
    }

    fn set(&self, state: ConversationState) {
        self.states.insert(state.conversation_id.clone(), state);
    }

    fn delete(&self, conversation_id: &str) {
        self.states.remove(conversation_id);
    }

    fn sweep(&self, cutoff: NaiveDateTime) -> usize {
        let before = self.states.len();
        self.states.retain(|_, s| s.last_interaction >= cutoff);
        before.saturating_sub(self.states.len())
    }

    fn len(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn set_get_delete() {
        let store = InMemoryConversationStore::new();
        assert!(store.is_empty());
        store.set(ConversationState::new("a", at(9)));
        assert_eq!(store.get("a").unwrap().conversation_id, "a");
        store.delete("a");
        assert!(store.get("a").is_none());
    }

    #[test]
    fn sweep_removes_only_stale_states() {
        let store = InMemoryConversationStore::new();
        store.set(ConversationState::new("old", at(1)));
        store.set(ConversationState::new("new", at(10)));
        assert_eq!(store.sweep(at(5)), 1);
        assert!(store.get("old").is_none());
        assert!(store.get("new").is_some());
    }
}
