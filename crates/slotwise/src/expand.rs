// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `slotwise expand` command implementation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;

use slotwise_calendar::{BookingOccurrence, RecurrenceEngine};
use slotwise_config::SlotwiseConfig;
use slotwise_core::error::SlotwiseError;
use slotwise_core::types::{Frequency, RecurrenceRule};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// daily, weekly, monthly, or custom.
    #[arg(long)]
    pub frequency: Frequency,
    #[arg(long, default_value_t = 1)]
    pub interval: u32,
    /// Start of the first instance, "YYYY-MM-DD HH:MM".
    #[arg(long, value_parser = parse_datetime)]
    pub start: NaiveDateTime,
    /// End of the first instance, "YYYY-MM-DD HH:MM".
    #[arg(long, value_parser = parse_datetime)]
    pub end: NaiveDateTime,
    /// First day of the listing.
    #[arg(long)]
    pub from: NaiveDate,
    /// Last day of the listing (inclusive).
    #[arg(long)]
    pub to: NaiveDate,
    /// Weekdays to keep, 0 = Sunday.
    #[arg(long, value_delimiter = ',')]
    pub weekdays: Vec<u8>,
    /// Days of the month to keep.
    #[arg(long, value_delimiter = ',')]
    pub monthdays: Vec<u8>,
    /// Last date an occurrence may start on.
    #[arg(long)]
    pub until: Option<NaiveDate>,
    /// Total occurrences in the series.
    #[arg(long)]
    pub count: Option<u32>,
}

impl ExpandArgs {
    fn rule(&self) -> RecurrenceRule {
        let mut rule = RecurrenceRule::new(self.frequency, self.interval);
        if !self.weekdays.is_empty() {
            rule = rule.with_weekdays(self.weekdays.iter().copied());
        }
        if !self.monthdays.is_empty() {
            rule = rule.with_monthdays(self.monthdays.iter().copied());
        }
        if let Some(until) = self.until {
            rule = rule.until(until);
        }
        if let Some(count) = self.count {
            rule = rule.count(count);
        }
        rule
    }
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM\": {e}"))
}

/// Expands the rule described by `args`.
pub fn expand(
    config: &SlotwiseConfig,
    args: &ExpandArgs,
) -> Result<Vec<BookingOccurrence>, SlotwiseError> {
    if args.to < args.from {
        return Err(SlotwiseError::InvalidInput(format!(
            "--to {} is before --from {}",
            args.to, args.from
        )));
    }
    let engine = RecurrenceEngine::new(config.recurrence.safety_cap_floor);
    let range_start = args.from.and_time(NaiveTime::MIN);
    let range_end = args.to.succ_opt().unwrap_or(args.to).and_time(NaiveTime::MIN);
    engine.expand_rule(
        &args.rule(),
        args.start,
        args.end,
        range_start,
        range_end,
        "cli",
        None,
    )
}

pub fn run_expand(config: &SlotwiseConfig, args: &ExpandArgs) -> Result<(), SlotwiseError> {
    let occurrences = expand(config, args)?;
    for occurrence in &occurrences {
        let index = occurrence
            .occurrence_index
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        println!(
            "{index:>4}  {}  {}",
            occurrence.start.format("%a %Y-%m-%d %H:%M"),
            occurrence.end.format("%H:%M")
        );
    }
    println!("{} occurrences", occurrences.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(frequency: Frequency) -> ExpandArgs {
        ExpandArgs {
            frequency,
            interval: 1,
            start: parse_datetime("2026-10-19 09:00").unwrap(),
            end: parse_datetime("2026-10-19 10:00").unwrap(),
            from: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            weekdays: Vec::new(),
            monthdays: Vec::new(),
            until: None,
            count: None,
        }
    }

    #[test]
    fn weekly_series_lists_each_week_in_range() {
        let out = expand(&SlotwiseConfig::default(), &args(Frequency::Weekly)).unwrap();
        let starts: Vec<String> = out
            .iter()
            .map(|o| o.start.format(DATETIME_FORMAT).to_string())
            .collect();
        assert_eq!(starts, vec!["2026-10-19 09:00", "2026-10-26 09:00"]);
    }

    #[test]
    fn count_limits_the_listing() {
        let mut a = args(Frequency::Daily);
        a.count = Some(3);
        let out = expand(&SlotwiseConfig::default(), &a).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut a = args(Frequency::Daily);
        a.to = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        assert!(matches!(
            expand(&SlotwiseConfig::default(), &a),
            Err(SlotwiseError::InvalidInput(_))
        ));
    }

    #[test]
    fn bad_datetime_is_explained() {
        let err = parse_datetime("tomorrow").unwrap_err();
        assert!(err.contains("YYYY-MM-DD HH:MM"));
    }
}
