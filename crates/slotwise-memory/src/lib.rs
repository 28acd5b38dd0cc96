// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation scheduling memory.
//!
//! State is process-local, keyed by conversation id, and expires after a
//! period of silence. A background sweeper removes expired state even when
//! the conversation is never touched again.

pub mod memory;
pub mod state;
pub mod store;
pub mod sweeper;

pub use memory::{ConversationMemory, LoopCheck, PreferenceUpdate};
pub use state::{ConversationState, MessageRecord};
pub use store::{ConversationStore, InMemoryConversationStore};
pub use sweeper::spawn_sweeper;
