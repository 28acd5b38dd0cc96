// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-of-day window extraction.
//!
//! Resolution order: "before N" / "after N" bounds, then a specific clock
//! time (widened to +/- 30 minutes), then named day parts.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use slotwise_core::types::TimeWindow;

/// Half-width of the window around a specific clock time.
const SPECIFIC_MARGIN_MINUTES: u32 = 30;

/// Earliest hour implied by "before N".
const DAY_START_HOUR: u32 = 8;

/// Latest hour implied by "after N".
const DAY_END_HOUR: u32 = 20;

/// Named day parts as (pattern, start h, start m, end h, end m), checked in order.
const NAMED_WINDOWS: &[(&str, u32, u32, u32, u32)] = &[
    (r"\blunch\s?time\b|\blunch\b", 12, 0, 13, 30),
    (r"\bnoon\b|\bmidday\b|\bmid-day\b", 11, 30, 12, 30),
    (r"\bmorning\b|\bmorn\b", 8, 0, 12, 0),
    (r"\bafternoon\b|\barvo\b", 12, 0, 17, 0),
    (r"\bevening\b|\btonight\b|\btonite\b", 17, 0, 20, 0),
];

/// Vague qualifiers that make any extracted window untrustworthy.
const AMBIGUOUS_PATTERNS: &[&str] = &[
    r"(?:\d|-)ish\b",
    r"\bish\b",
    r"\bafter school\b",
    r"\bbefore dinner\b",
    r"\bafter work\b",
    r"\bsometime\b",
    r"\bsome time\b",
    r"\bor so\b",
];

static AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bafter\s+(\d{1,2})(?::([0-5]\d))?\s*(am|pm|a\.m\.|p\.m\.)?").unwrap()
});

static BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bbefore\s+(\d{1,2})(?::([0-5]\d))?\s*(am|pm|a\.m\.|p\.m\.)?").unwrap()
});

/// "3pm", "10:30 am", "3 p.m."
static WITH_MERIDIEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::([0-5]\d))?\s*(am|pm|a\.m\.|p\.m\.)").unwrap()
});

/// "10:30", "15:00"
static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):([0-5]\d)\b").unwrap());

/// "at 3", "around 4". Needs the preposition so bare numbers are ignored.
static PREPOSITION_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bat|\baround|\babout|\bby|@)\s*(\d{1,2})\b").unwrap()
});

static NAMED: LazyLock<Vec<(Regex, (u32, u32, u32, u32))>> = LazyLock::new(|| {
    NAMED_WINDOWS
        .iter()
        .map(|(pattern, sh, sm, eh, em)| (Regex::new(pattern).unwrap(), (*sh, *sm, *eh, *em)))
        .collect()
});

static AMBIGUOUS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    AMBIGUOUS_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

/// Extracts a time-of-day window from free text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeParser;

impl TimeParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the most specific time expression in `text`.
    pub fn parse(&self, text: &str) -> Option<TimeWindow> {
        let lower = text.to_lowercase();

        if let Some(caps) = AFTER.captures(&lower) {
            let (hour, minute) = resolve_hour(&caps)?;
            if hour >= DAY_END_HOUR {
                return None;
            }
            return TimeWindow::new(hour, minute, DAY_END_HOUR, 0).ok();
        }
        if let Some(caps) = BEFORE.captures(&lower) {
            let (hour, minute) = resolve_hour(&caps)?;
            if hour <= DAY_START_HOUR {
                return None;
            }
            return TimeWindow::new(DAY_START_HOUR, 0, hour, minute).ok();
        }

        if let Some(caps) = WITH_MERIDIEM
            .captures(&lower)
            .or_else(|| CLOCK.captures(&lower))
            .or_else(|| PREPOSITION_HOUR.captures(&lower))
        {
            let (hour, minute) = resolve_hour(&caps)?;
            return around(hour, minute);
        }

        NAMED.iter().find_map(|(re, (sh, sm, eh, em))| {
            re.is_match(&lower)
                .then(|| TimeWindow::new(*sh, *sm, *eh, *em).ok())
                .flatten()
        })
    }

    /// True when the text carries a vague time qualifier.
    pub fn is_ambiguous(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        AMBIGUOUS.iter().any(|re| re.is_match(&lower))
    }

    /// True when the window is wider than four hours.
    pub fn is_too_broad(&self, window: &TimeWindow) -> bool {
        window.is_too_broad()
    }
}

/// Turns captured hour/minute/meridiem groups into a 24h time.
///
/// Without am/pm, 1-7 reads as afternoon and 8-12 as morning or noon.
fn resolve_hour(caps: &Captures<'_>) -> Option<(u32, u32)> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = caps.get(3).map(|m| m.as_str().replace('.', ""));

    let hour = match meridiem.as_deref() {
        Some("pm") if (1..12).contains(&hour) => hour + 12,
        Some("pm") if hour == 12 => 12,
        Some("am") if hour == 12 => 0,
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(_) => hour,
        None if (1..=7).contains(&hour) => hour + 12,
        None if hour <= 23 => hour,
        None => return None,
    };
    Some((hour, minute))
}

fn around(hour: u32, minute: u32) -> Option<TimeWindow> {
    let center = hour * 60 + minute;
    let start = center.saturating_sub(SPECIFIC_MARGIN_MINUTES);
    let end = (center + SPECIFIC_MARGIN_MINUTES).min(23 * 60 + 59);
    TimeWindow::new(start / 60, start % 60, end / 60, end % 60).ok()
}
