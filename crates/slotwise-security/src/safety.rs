// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unsafe-content screening.
//!
//! Categories are checked in a fixed order and the first hit wins, so a
//! message mentioning both self-harm and a medical question is handled as
//! self-harm. All phrases match on word boundaries.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use slotwise_core::phrase_regex;
use slotwise_core::traits::Classifier;

/// Why a message was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UnsafeCategory {
    SelfHarm,
    Abuse,
    Illegal,
    Medical,
    Sexual,
}

/// Outcome of a safety check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    pub category: Option<UnsafeCategory>,
}

impl SafetyVerdict {
    pub const SAFE: Self = Self {
        safe: true,
        category: None,
    };

    fn unsafe_because(category: UnsafeCategory) -> Self {
        Self {
            safe: false,
            category: Some(category),
        }
    }

    /// The category to deflect with, or `None` when the message is safe.
    ///
    /// An unsafe verdict without a category is treated as abuse, which
    /// gets the generic refusal.
    pub fn refusal(&self) -> Option<UnsafeCategory> {
        if self.safe {
            None
        } else {
            Some(self.category.unwrap_or(UnsafeCategory::Abuse))
        }
    }
}

const SELF_HARM: &[&str] = &[
    "hurt myself",
    "harm myself",
    "kill myself",
    "killing myself",
    "end my life",
    "take my own life",
    "suicide",
    "suicidal",
    "want to die",
    "cut myself",
    "self harm",
    "self-harm",
];

const ABUSE: &[&str] = &[
    "i will kill you",
    "i'll kill you",
    "kill you",
    "hurt you",
    "find where you live",
    "burn it down",
    "you'll regret",
    "watch your back",
    "piece of shit",
    "fuck you",
];

/// Tokens counted toward the aggressive-language threshold.
const AGGRESSIVE_TOKENS: &[&str] = &[
    "idiot", "idiots", "stupid", "useless", "moron", "morons", "damn", "hell", "crap", "shit",
    "fuck", "fucking", "pathetic", "incompetent", "hate",
];

/// Aggressive tokens needed to classify a message as abuse.
const AGGRESSIVE_THRESHOLD: usize = 3;

const ILLEGAL: &[&str] = &[
    "buy drugs",
    "sell drugs",
    "cocaine",
    "heroin",
    "meth",
    "launder",
    "money laundering",
    "fake id",
    "untraceable",
    "cash only no records",
    "under the table",
];

const MEDICAL: &[&str] = &[
    "diagnose",
    "diagnosis",
    "prescribe",
    "prescription",
    "what medication",
    "which medication",
    "dosage",
    "overdose",
    "is it cancer",
    "should i take",
    "side effects",
    "chest pain",
];

const SEXUAL: &[&str] = &[
    "sex",
    "sexual",
    "nude",
    "nudes",
    "naked",
    "happy ending",
    "hook up",
    "escort",
    "send pics",
];

/// Category order: the first matching list wins.
const ORDERED: &[(UnsafeCategory, &[&str])] = &[
    (UnsafeCategory::SelfHarm, SELF_HARM),
    (UnsafeCategory::Abuse, ABUSE),
    (UnsafeCategory::Illegal, ILLEGAL),
    (UnsafeCategory::Medical, MEDICAL),
    (UnsafeCategory::Sexual, SEXUAL),
];

static CATEGORY_PATTERNS: LazyLock<Vec<(UnsafeCategory, Regex)>> = LazyLock::new(|| {
    ORDERED
        .iter()
        .map(|(category, phrases)| (*category, phrase_regex(phrases)))
        .collect()
});

static AGGRESSIVE: LazyLock<Regex> = LazyLock::new(|| phrase_regex(AGGRESSIVE_TOKENS));

/// Keyword safety screen. Runs before anything else looks at a message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyFilter;

impl SafetyFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, message: &str) -> SafetyVerdict {
        let lower = message.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");

        for (category, pattern) in CATEGORY_PATTERNS.iter() {
            if pattern.is_match(&lower) {
                warn!(category = %category, "unsafe message");
                return SafetyVerdict::unsafe_because(*category);
            }
            if *category == UnsafeCategory::Abuse
                && AGGRESSIVE.find_iter(&lower).count() >= AGGRESSIVE_THRESHOLD
            {
                warn!(category = %category, "aggressive message");
                return SafetyVerdict::unsafe_because(*category);
            }
        }
        SafetyVerdict::SAFE
    }
}

impl Classifier for SafetyFilter {
    type Category = SafetyVerdict;

    fn classify(&self, text: &str) -> SafetyVerdict {
        self.check(text)
    }
}

/// The fixed reply sent instead of processing an unsafe message.
pub fn deflection_message(category: UnsafeCategory) -> &'static str {
    match category {
        UnsafeCategory::SelfHarm => {
            "I'm really sorry you're going through this. I'm not able to help with this here, but you don't have to face it alone. If you're in immediate danger, please call your local emergency number now, or reach a crisis line such as 988 (call or text, US). I've also let a member of our team know."
        }
        UnsafeCategory::Abuse => {
            "I'm not able to continue this conversation. A member of our team will review it."
        }
        UnsafeCategory::Illegal => {
            "I can't help with that. I can only help with booking appointments."
        }
        UnsafeCategory::Medical => {
            "I'm not able to give medical advice. Please contact a doctor or pharmacist, or call your local emergency number if it's urgent. I can still help you book an appointment."
        }
        UnsafeCategory::Sexual => {
            "I can't help with that. I can only help with booking appointments."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_harm_is_caught_with_exact_deflection() {
        let verdict = SafetyFilter::new().check("I want to hurt myself");
        assert_eq!(
            verdict,
            SafetyVerdict {
                safe: false,
                category: Some(UnsafeCategory::SelfHarm)
            }
        );
        assert!(deflection_message(UnsafeCategory::SelfHarm).contains("988"));
    }

    #[test]
    fn first_category_in_order_wins() {
        // Self-harm beats medical.
        let verdict = SafetyFilter::new().check("what dosage would it take to kill myself");
        assert_eq!(verdict.category, Some(UnsafeCategory::SelfHarm));
    }

    #[test]
    fn abuse_threshold() {
        let f = SafetyFilter::new();
        assert_eq!(f.check("this is stupid").category, None);
        assert_eq!(
            f.check("you stupid useless idiot").category,
            Some(UnsafeCategory::Abuse)
        );
        assert_eq!(f.check("I'll kill you").category, Some(UnsafeCategory::Abuse));
    }

    #[test]
    fn categories() {
        let f = SafetyFilter::new();
        assert_eq!(f.check("can I pay with a fake ID").category, Some(UnsafeCategory::Illegal));
        assert_eq!(
            f.check("can you diagnose this rash").category,
            Some(UnsafeCategory::Medical)
        );
        assert_eq!(f.check("do you do a happy ending").category, Some(UnsafeCategory::Sexual));
    }

    #[test]
    fn word_boundaries_avoid_false_positives() {
        let f = SafetyFilter::new();
        assert!(f.check("I'm in Essex, can I book for Tuesday?").safe);
        assert!(f.check("my method is to book early").safe);
        assert!(f.check("Shell station on the corner").safe);
        assert!(f.check("tomorrow at 3pm please").safe);
    }

    #[test]
    fn curly_apostrophes_are_normalized() {
        let f = SafetyFilter::new();
        assert_eq!(f.check("I\u{2019}ll kill you").category, Some(UnsafeCategory::Abuse));
    }

    #[test]
    fn refusal_defaults_a_missing_category() {
        assert_eq!(SafetyVerdict::SAFE.refusal(), None);
        let uncategorized = SafetyVerdict {
            safe: false,
            category: None,
        };
        assert_eq!(uncategorized.refusal(), Some(UnsafeCategory::Abuse));
        assert_eq!(
            SafetyFilter::new().check("can you diagnose this rash").refusal(),
            Some(UnsafeCategory::Medical)
        );
    }

    #[test]
    fn category_names() {
        assert_eq!(UnsafeCategory::SelfHarm.to_string(), "self-harm");
        assert_eq!("medical".parse::<UnsafeCategory>().unwrap(), UnsafeCategory::Medical);
    }

    #[test]
    fn every_category_has_a_deflection() {
        for (category, _) in ORDERED {
            assert!(!deflection_message(*category).is_empty());
        }
    }
}
