// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical urgency detection.

use std::sync::LazyLock;

use regex::Regex;

use slotwise_core::phrase_regex;
use slotwise_core::traits::Classifier;
use slotwise_core::types::UrgencyLevel;

/// Needs attention right now.
const HIGH: &[&str] = &[
    "emergency",
    "asap",
    "a.s.a.p",
    "urgent",
    "urgently",
    "immediately",
    "right away",
    "right now",
];

/// Wants something in the same day.
const MEDIUM: &[&str] = &[
    "today",
    "tonight",
    "soon",
    "this morning",
    "this afternoon",
    "this evening",
];

/// Flexible but eager.
const LOW: &[&str] = &["this week", "earliest", "first available", "next available"];

static HIGH_RE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(HIGH));
static MEDIUM_RE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(MEDIUM));
static LOW_RE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(LOW));

/// Keyword urgency classifier. No state, no allocation beyond lowercasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrgencyClassifier;

impl UrgencyClassifier {
    pub fn new() -> Self {
        Self
    }

    /// The highest urgency level any phrase in `text` implies.
    pub fn urgency_level(&self, text: &str) -> UrgencyLevel {
        let lower = text.to_lowercase();
        if HIGH_RE.is_match(&lower) {
            UrgencyLevel::High
        } else if MEDIUM_RE.is_match(&lower) {
            UrgencyLevel::Medium
        } else if LOW_RE.is_match(&lower) {
            UrgencyLevel::Low
        } else {
            UrgencyLevel::None
        }
    }

    /// Medium or higher.
    pub fn is_urgent(&self, text: &str) -> bool {
        self.urgency_level(text) >= UrgencyLevel::Medium
    }
}

impl Classifier for UrgencyClassifier {
    type Category = UrgencyLevel;

    fn classify(&self, text: &str) -> UrgencyLevel {
        self.urgency_level(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        let c = UrgencyClassifier::new();
        assert_eq!(c.urgency_level("It's an EMERGENCY, pipe burst"), UrgencyLevel::High);
        assert_eq!(c.urgency_level("can you come asap"), UrgencyLevel::High);
        assert_eq!(c.urgency_level("need it right away"), UrgencyLevel::High);
        assert_eq!(c.urgency_level("anything today?"), UrgencyLevel::Medium);
        assert_eq!(c.urgency_level("this afternoon if possible"), UrgencyLevel::Medium);
        assert_eq!(c.urgency_level("earliest you have"), UrgencyLevel::Low);
        assert_eq!(c.urgency_level("sometime this week"), UrgencyLevel::Low);
        assert_eq!(c.urgency_level("tuesday at 3pm"), UrgencyLevel::None);
    }

    #[test]
    fn highest_level_wins() {
        let c = UrgencyClassifier::new();
        assert_eq!(c.urgency_level("today please, it's urgent"), UrgencyLevel::High);
    }

    #[test]
    fn is_urgent_means_medium_or_above() {
        let c = UrgencyClassifier::new();
        assert!(c.is_urgent("asap"));
        assert!(c.is_urgent("soon please"));
        assert!(!c.is_urgent("first available"));
        assert!(!c.is_urgent("hello"));
    }

    #[test]
    fn word_boundaries() {
        let c = UrgencyClassifier::new();
        // Keywords embedded in longer words do not count.
        assert_eq!(c.urgency_level("insurgents"), UrgencyLevel::None);
        assert_eq!(c.urgency_level("the soonest"), UrgencyLevel::None);
    }

    #[test]
    fn classifier_trait_matches_level() {
        let c = UrgencyClassifier::new();
        assert_eq!(c.classify("urgent"), c.urgency_level("urgent"));
    }
}
