// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation scoring: does this conversation need a human?
//!
//! Each detector has strong markers, which fire on their own, and mild
//! markers, which only add a moderate signal. Moderate signals escalate VIP
//! customers. Repeated failure (many declines, a long loop) escalates
//! regardless of wording.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use slotwise_core::phrase_regex;
use slotwise_memory::ConversationMemory;

/// Declines after which the conversation is escalated.
const DECLINE_ESCALATION: u32 = 3;

/// Loop count after which the conversation is escalated.
const LOOP_ESCALATION: u32 = 4;

/// Added to the score of VIP customers.
const VIP_BONUS: u8 = 2;

/// Customer messages inspected for repeated mild frustration.
const FRUSTRATION_WINDOW: usize = 3;

/// What tripped an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HandoverTrigger {
    ExplicitRequest,
    Frustration,
    Anger,
    Confusion,
    ComplexRequest,
    RepeatedDeclines,
    ConversationLoop,
}

/// Notification bucket of an urgency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HandoverUrgency {
    Low,
    Medium,
    High,
    Critical,
}

impl HandoverUrgency {
    pub fn from_score(score: u8) -> Self {
        match score {
            9.. => Self::Critical,
            7..=8 => Self::High,
            4..=6 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Outcome of escalation detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverDecision {
    pub should_escalate: bool,
    /// The most severe trigger behind the decision.
    pub reason: Option<HandoverTrigger>,
    /// 1..=10.
    pub urgency_score: u8,
    /// Every detector that fired or raised a moderate signal.
    pub triggers: Vec<HandoverTrigger>,
}

impl HandoverDecision {
    pub fn urgency(&self) -> HandoverUrgency {
        HandoverUrgency::from_score(self.urgency_score)
    }
}

struct Detector {
    trigger: HandoverTrigger,
    strong: Regex,
    mild: Regex,
    strong_severity: u8,
    mild_severity: u8,
}

static DETECTORS: LazyLock<Vec<Detector>> = LazyLock::new(|| {
    vec![
        Detector {
            trigger: HandoverTrigger::ExplicitRequest,
            strong: phrase_regex(&[
                "speak to a human",
                "talk to a human",
                "speak to a person",
                "talk to a person",
                "speak to someone",
                "talk to someone",
                "real person",
                "actual person",
                "human please",
                "representative",
                "speak to the owner",
                "speak to a manager",
                "call me",
            ]),
            mild: phrase_regex(&["are you a bot", "is this a bot", "are you a robot", "is this automated"]),
            strong_severity: 6,
            mild_severity: 3,
        },
        Detector {
            trigger: HandoverTrigger::Frustration,
            strong: phrase_regex(&[
                "this is ridiculous",
                "waste of time",
                "wasting my time",
                "fed up",
                "so frustrating",
                "frustrated",
                "not helpful",
                "give up",
            ]),
            mild: phrase_regex(&["ugh", "seriously", "come on", "already told you", "i said", "annoying"]),
            strong_severity: 6,
            mild_severity: 3,
        },
        Detector {
            trigger: HandoverTrigger::Anger,
            strong: phrase_regex(&[
                "furious",
                "unacceptable",
                "outrageous",
                "angry",
                "complaint",
                "terrible service",
                "worst service",
            ]),
            mild: phrase_regex(&["not happy", "disappointed", "upset"]),
            strong_severity: 8,
            mild_severity: 4,
        },
        Detector {
            trigger: HandoverTrigger::Confusion,
            strong: phrase_regex(&[
                "i don't understand",
                "i dont understand",
                "makes no sense",
                "doesn't make sense",
                "confused",
                "what do you mean",
                "i'm lost",
            ]),
            mild: phrase_regex(&["not sure", "unclear"]),
            strong_severity: 4,
            mild_severity: 2,
        },
        Detector {
            trigger: HandoverTrigger::ComplexRequest,
            strong: phrase_regex(&[
                "group booking",
                "multiple people",
                "refund",
                "cancel my",
                "reschedule",
                "wedding",
                "quote",
                "invoice",
                "insurance",
            ]),
            mild: phrase_regex(&["how much", "price", "pricing", "cost"]),
            strong_severity: 5,
            mild_severity: 2,
        },
    ]
});

/// Severity of escalations caused by repeated failure.
const FAILURE_SEVERITY: u8 = 5;

/// Scores a message plus conversation history for escalation.
pub struct HandoverDetectionEngine {
    memory: Arc<ConversationMemory>,
}

impl HandoverDetectionEngine {
    pub fn new(memory: Arc<ConversationMemory>) -> Self {
        Self { memory }
    }

    pub fn detect(&self, message: &str, conversation_id: &str, is_vip: bool) -> HandoverDecision {
        let lower = normalize(message);
        let state = self.memory.get(conversation_id);

        // (trigger, severity, fired)
        let mut signals: Vec<(HandoverTrigger, u8, bool)> = Vec::new();
        for detector in DETECTORS.iter() {
            if detector.strong.is_match(&lower) {
                signals.push((detector.trigger, detector.strong_severity, true));
            } else if detector.mild.is_match(&lower) {
                let repeated = detector.trigger == HandoverTrigger::Frustration
                    && state.as_ref().is_some_and(|s| {
                        mild_frustration_repeats(&s.customer_messages(FRUSTRATION_WINDOW), &lower)
                    });
                let severity = if repeated {
                    detector.strong_severity
                } else {
                    detector.mild_severity
                };
                signals.push((detector.trigger, severity, repeated));
            }
        }

        if let Some(s) = &state {
            if s.decline_count >= DECLINE_ESCALATION {
                signals.push((HandoverTrigger::RepeatedDeclines, FAILURE_SEVERITY, true));
            }
            if s.loop_count >= LOOP_ESCALATION {
                signals.push((HandoverTrigger::ConversationLoop, FAILURE_SEVERITY, true));
            }
        }

        let any_fired = signals.iter().any(|(_, _, fired)| *fired);
        let should_escalate = any_fired || (is_vip && !signals.is_empty());

        let top = signals
            .iter()
            .filter(|(_, _, fired)| *fired || is_vip)
            .max_by_key(|(_, severity, _)| *severity);
        let max_severity = signals.iter().map(|(_, s, _)| *s).max();
        let urgency_score = match max_severity {
            Some(s) if is_vip => s.saturating_add(VIP_BONUS).min(10),
            Some(s) => s.min(10),
            None => 1,
        }
        .max(1);

        let decision = HandoverDecision {
            should_escalate,
            reason: if should_escalate { top.map(|(t, _, _)| *t) } else { None },
            urgency_score,
            triggers: signals.iter().map(|(t, _, _)| *t).collect(),
        };
        debug!(
            conversation_id,
            should_escalate = decision.should_escalate,
            urgency_score = decision.urgency_score,
            triggers = ?decision.triggers,
            "handover detection"
        );
        decision
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Mild frustration in at least two of the last three customer messages,
/// the current one included.
fn mild_frustration_repeats(history: &[&str], current: &str) -> bool {
    let Some(detector) = DETECTORS
        .iter()
        .find(|d| d.trigger == HandoverTrigger::Frustration)
    else {
        return false;
    };
    let mut window: Vec<String> = history.iter().map(|m| normalize(m)).collect();
    // The current message may already be in the transcript.
    if window.last().map(String::as_str) != Some(current) {
        window.push(current.to_string());
    }
    let start = window.len().saturating_sub(FRUSTRATION_WINDOW);
    window[start..]
        .iter()
        .filter(|m| detector.mild.is_match(m))
        .count()
        >= 2
}
