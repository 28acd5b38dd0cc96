// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer PII redaction for log output.
//!
//! Message bodies and phone numbers pass through these helpers before they
//! reach a log line.

use std::sync::LazyLock;

use regex::Regex;

static PII_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Email addresses.
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap(),
        // Phone numbers: optional +, then 7 or more digits with common separators.
        Regex::new(r"\+?\d[\d\s().\-]{5,}\d").unwrap(),
    ]
});

/// The redaction placeholder.
const REDACTED: &str = "[REDACTED]";

/// Replaces emails and phone numbers in free text.
pub fn redact(input: &str) -> String {
    let mut result = input.to_string();
    for pattern in PII_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).to_string();
    }
    result
}

/// Keeps only the last four digits of a phone number.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(digits.len() - 4))
}
