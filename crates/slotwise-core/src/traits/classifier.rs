// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable text classification strategy.

/// Maps free text to a category.
///
/// The safety screen, the urgency detector, and the confirm/decline detector
/// all sit behind this trait so a keyword implementation can be swapped for
/// a stronger classifier without touching the conversation state machine.
pub trait Classifier: Send + Sync {
    /// The category produced by this classifier.
    type Category;

    /// Classifies a message.
    fn classify(&self, text: &str) -> Self::Category;
}
