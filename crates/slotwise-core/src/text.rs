// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phrase matching shared by the keyword classifiers.

use regex::Regex;

/// Builds a case-sensitive matcher for any of `phrases` on word boundaries.
///
/// Phrases are escaped, so punctuation such as `?` or `'` is literal. Callers
/// lowercase the input first.
pub fn phrase_regex(phrases: &[&str]) -> Regex {
    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("escaped phrase list is a valid pattern")
}
