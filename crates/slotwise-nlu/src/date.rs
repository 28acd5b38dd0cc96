// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar date extraction from free text.
//!
//! Rule based and reference-relative: "tomorrow", "friday", "the 12th",
//! "march 3rd", "next week". Returns `None` when nothing date-like is found.

use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use regex::Regex;

use slotwise_core::types::weekday_number;

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sept", 9),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Weekday spellings mapped to 0 = Sunday .. 6 = Saturday.
const WEEKDAYS: &[(&str, u8)] = &[
    ("sunday", 0),
    ("monday", 1),
    ("tuesday", 2),
    ("wednesday", 3),
    ("thursday", 4),
    ("friday", 5),
    ("saturday", 6),
    ("sun", 0),
    ("mon", 1),
    ("tues", 2),
    ("tue", 2),
    ("weds", 3),
    ("wed", 3),
    ("thurs", 4),
    ("thur", 4),
    ("thu", 4),
    ("fri", 5),
    ("sat", 6),
];

const MONTH_PATTERN: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

/// "12th of march", "12 march", "12th march". Groups: day, suffix, "of",
/// month.
static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(st|nd|rd|th)?\s+(of\s+)?({MONTH_PATTERN})\b"
    ))
    .expect("day-month pattern is valid")
});

/// "march 12", "march 12th". Groups: month, day, suffix.
static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({MONTH_PATTERN})\.?\s+(\d{{1,2}})(st|nd|rd|th)?\b"
    ))
    .expect("month-day pattern is valid")
});

/// "the 12th", "12th". The ordinal suffix keeps "at 3" from reading as a date.
static ORDINAL_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").expect("ordinal pattern is valid")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(sunday|monday|tuesday|wednesday|thursday|friday|saturday|sun|mon|tues|tue|weds|wed|thurs|thur|thu|fri|sat)\b")
        .expect("weekday pattern is valid")
});

static DAY_AFTER_TOMORROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bday after (?:tomorrow|tmrw|tmr)\b").expect("pattern is valid")
});

static TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:tomorrow|tmrw|tmr|tomorow|tommorow)\b").expect("pattern is valid"));

static TODAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:today|tonight|tonite)\b").expect("pattern is valid"));

static WEEKEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bweekend\b").expect("pattern is valid"));

static NEXT_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnext week\b").expect("pattern is valid"));

/// Extracts calendar dates relative to a reference day.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateParser;

impl DateParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the first date expression found in `text`.
    ///
    /// Explicit dates win over relative keywords, which win over weekday
    /// names, so "friday the 12th" resolves to the 12th.
    pub fn parse(&self, text: &str, reference: NaiveDate) -> Option<NaiveDate> {
        let lower = text.to_lowercase();

        if let Some((day, month)) = named_month(&lower) {
            // A named month that does not hold the day is no date at all.
            return Self::explicit_with_month(day, month, reference);
        }
        if let Some(caps) = ORDINAL_DAY.captures(&lower) {
            let day: u32 = caps[1].parse().ok()?;
            return Self::resolve_day_of_month(day, reference);
        }
        if DAY_AFTER_TOMORROW.is_match(&lower) {
            return Some(reference + TimeDelta::days(2));
        }
        if TOMORROW.is_match(&lower) {
            return Some(reference + TimeDelta::days(1));
        }
        if TODAY.is_match(&lower) {
            return Some(reference);
        }
        if let Some(caps) = WEEKDAY.captures(&lower) {
            let target = lookup(WEEKDAYS, &caps[1])?;
            return Some(next_weekday(reference, target));
        }
        if WEEKEND.is_match(&lower) {
            // Sunday already counts as this weekend.
            if weekday_number(reference) == 0 {
                return Some(reference);
            }
            return Some(next_weekday(reference, 6));
        }
        if NEXT_WEEK.is_match(&lower) {
            return Some(reference + TimeDelta::days(7));
        }
        None
    }

    fn explicit_with_month(day: &str, month: &str, reference: NaiveDate) -> Option<NaiveDate> {
        let day: u32 = day.parse().ok()?;
        let month = lookup(MONTHS, month)?;

        let this_year = NaiveDate::from_ymd_opt(reference.year(), month, day)?;
        if this_year >= reference {
            Some(this_year)
        } else {
            NaiveDate::from_ymd_opt(reference.year() + 1, month, day)
        }
    }

    /// A bare day of month: this month if still ahead, otherwise next month.
    fn resolve_day_of_month(day: u32, reference: NaiveDate) -> Option<NaiveDate> {
        if day >= reference.day()
            && let Some(date) = reference.with_day(day)
        {
            return Some(date);
        }
        let next_month = reference.with_day(1)?.checked_add_months(Months::new(1))?;
        next_month.with_day(day)
    }
}

/// Day and month text of the first named-month date in `lower`.
///
/// "may" is also a verb ("10 may work"), so it only reads as a month when
/// marked by an ordinal suffix or "of".
fn named_month(lower: &str) -> Option<(&str, &str)> {
    let is_month = |month: &str, marked: bool| month != "may" || marked;

    if let Some(caps) = DAY_MONTH
        .captures_iter(lower)
        .find(|c| is_month(&c[4], c.get(2).is_some() || c.get(3).is_some()))
    {
        return Some((caps.get(1)?.as_str(), caps.get(4)?.as_str()));
    }
    let caps = MONTH_DAY
        .captures_iter(lower)
        .find(|c| is_month(&c[1], c.get(3).is_some()))?;
    Some((caps.get(2)?.as_str(), caps.get(1)?.as_str()))
}

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table.iter().find(|(name, _)| *name == key).map(|(_, v)| *v)
}

/// The first date on or after `from` that falls on `target` (0 = Sunday).
pub fn next_weekday(from: NaiveDate, target: u8) -> NaiveDate {
    let current = i64::from(weekday_number(from));
    let delta = (i64::from(target) - current).rem_euclid(7);
    from + TimeDelta::days(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sunday 2026-10-18.
    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    #[test]
    fn relative_keywords() {
        let p = DateParser::new();
        assert_eq!(p.parse("today please", reference()), Some(d(10, 18)));
        assert_eq!(p.parse("Tomorrow works", reference()), Some(d(10, 19)));
        assert_eq!(p.parse("day after tomorrow", reference()), Some(d(10, 20)));
        assert_eq!(p.parse("next week sometime", reference()), Some(d(10, 25)));
    }

    #[test]
    fn weekday_names_resolve_on_or_after_reference() {
        let p = DateParser::new();
        assert_eq!(p.parse("Tuesday afternoon please", reference()), Some(d(10, 20)));
        assert_eq!(p.parse("can you do FRI", reference()), Some(d(10, 23)));
        // The reference day itself counts.
        assert_eq!(p.parse("sunday?", reference()), Some(d(10, 18)));
    }

    #[test]
    fn weekday_abbreviations_need_word_boundaries() {
        let p = DateParser::new();
        // "sat" inside "satisfied" and "mon" inside "money" are not weekdays.
        assert_eq!(p.parse("I was satisfied with the money", reference()), None);
    }

    #[test]
    fn weekend_means_saturday() {
        let p = DateParser::new();
        let monday = d(10, 19);
        assert_eq!(p.parse("this weekend?", monday), Some(d(10, 24)));
        assert_eq!(p.parse("this weekend?", reference()), Some(d(10, 18)));
    }

    #[test]
    fn ordinal_day_of_month() {
        let p = DateParser::new();
        assert_eq!(p.parse("the 21st", reference()), Some(d(10, 21)));
        // Already past this month: roll to next month.
        assert_eq!(p.parse("the 12th", reference()), Some(d(11, 12)));
    }

    #[test]
    fn explicit_month_names() {
        let p = DateParser::new();
        assert_eq!(p.parse("December 3rd", reference()), Some(d(12, 3)));
        assert_eq!(p.parse("3rd of dec", reference()), Some(d(12, 3)));
        assert_eq!(
            p.parse("march 2", reference()),
            NaiveDate::from_ymd_opt(2027, 3, 2)
        );
    }

    #[test]
    fn may_as_a_verb_is_not_a_month() {
        let p = DateParser::new();
        assert_eq!(p.parse("Friday at 10 may work", reference()), Some(d(10, 23)));
        assert_eq!(p.parse("3 may be better", reference()), None);
        assert_eq!(
            p.parse("May 5th", reference()),
            NaiveDate::from_ymd_opt(2027, 5, 5)
        );
        assert_eq!(
            p.parse("the 5th of may", reference()),
            NaiveDate::from_ymd_opt(2027, 5, 5)
        );
        assert_eq!(
            p.parse("5 of may", reference()),
            NaiveDate::from_ymd_opt(2027, 5, 5)
        );
    }

    #[test]
    fn explicit_date_beats_weekday() {
        let p = DateParser::new();
        assert_eq!(p.parse("friday the 30th", reference()), Some(d(10, 30)));
    }

    #[test]
    fn invalid_calendar_dates_are_none() {
        let p = DateParser::new();
        assert_eq!(p.parse("february 30th", reference()), None);
    }

    #[test]
    fn plain_times_are_not_dates() {
        let p = DateParser::new();
        assert_eq!(p.parse("around 3pm", reference()), None);
        assert_eq!(p.parse("ok", reference()), None);
    }

    #[test]
    fn next_weekday_wraps_the_week() {
        // Saturday -> Monday is two days.
        assert_eq!(next_weekday(d(10, 24), 1), d(10, 26));
    }
}
