// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confirm / decline detection for replies to a proposed slot.

use std::sync::LazyLock;

use regex::Regex;
use strum::Display;

use slotwise_core::phrase_regex;
use slotwise_core::traits::Classifier;

/// How a customer answered a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReplyIntent {
    Confirm,
    Decline,
    Other,
}

const CONFIRM: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "yup",
    "ya",
    "sure",
    "ok",
    "okay",
    "k",
    "perfect",
    "sounds good",
    "that works",
    "works for me",
    "book it",
    "confirm",
    "confirmed",
    "great",
    "go ahead",
    "let's do it",
    "lets do it",
];

const DECLINE: &[&str] = &[
    "no",
    "nope",
    "nah",
    "can't",
    "cant",
    "cannot",
    "can not",
    "doesn't work",
    "doesnt work",
    "won't work",
    "wont work",
    "not good",
    "another",
    "different time",
    "something else",
    "other time",
    "later",
    "earlier",
];

/// Negations that do not decline anything.
const BENIGN_NEGATIONS: &[&str] = &["no problem", "no worries", "no prob"];

static CONFIRM_RE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(CONFIRM));
static DECLINE_RE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(DECLINE));
static BENIGN_RE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(BENIGN_NEGATIONS));

/// Keyword reply-intent classifier. Declines win over confirms.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn intent(&self, text: &str) -> ReplyIntent {
        let lower = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
        let stripped = BENIGN_RE.replace_all(&lower, " ");

        if DECLINE_RE.is_match(&stripped) {
            ReplyIntent::Decline
        } else if CONFIRM_RE.is_match(&stripped) || BENIGN_RE.is_match(&lower) {
            ReplyIntent::Confirm
        } else {
            ReplyIntent::Other
        }
    }

    pub fn is_confirmation(&self, text: &str) -> bool {
        self.intent(text) == ReplyIntent::Confirm
    }

    pub fn is_decline(&self, text: &str) -> bool {
        self.intent(text) == ReplyIntent::Decline
    }
}

impl Classifier for IntentClassifier {
    type Category = ReplyIntent;

    fn classify(&self, text: &str) -> ReplyIntent {
        self.intent(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmations() {
        let c = IntentClassifier::new();
        for text in ["yes perfect", "Yep!", "ok", "sounds good", "book it please", "That works"] {
            assert_eq!(c.intent(text), ReplyIntent::Confirm, "{text}");
        }
    }

    #[test]
    fn declines() {
        let c = IntentClassifier::new();
        for text in ["no", "Nope", "I can't do that", "doesn\u{2019}t work", "another time?", "something later"] {
            assert_eq!(c.intent(text), ReplyIntent::Decline, "{text}");
        }
    }

    #[test]
    fn decline_wins_when_mixed() {
        let c = IntentClassifier::new();
        assert_eq!(c.intent("ok but can we do another day"), ReplyIntent::Decline);
    }

    #[test]
    fn benign_negation_is_not_a_decline() {
        let c = IntentClassifier::new();
        assert_eq!(c.intent("no problem, see you then"), ReplyIntent::Confirm);
    }

    #[test]
    fn unrelated_text_is_other() {
        let c = IntentClassifier::new();
        assert_eq!(c.intent("what's the address?"), ReplyIntent::Other);
        // "know" and "nowhere" do not contain the word "no".
        assert_eq!(c.intent("I know nowhere nearby"), ReplyIntent::Other);
    }
}
