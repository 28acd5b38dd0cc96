// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expansion of recurring bookings into concrete occurrences.
//!
//! A recurring booking is stored once, as its first instance plus a
//! [`RecurrenceRule`]. Anything that needs to know whether a calendar block
//! is taken must expand the series against the range it cares about.
//!
//! Generation walks whole periods from the base start (a day, a week, or a
//! month, times the interval). Inside a weekly period a weekday filter
//! expands to every listed weekday of that Sunday-started week; inside a
//! monthly period a monthday filter expands to every listed day the month
//! actually has. Other periods yield one candidate that must pass the
//! filters.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use slotwise_core::error::SlotwiseError;
use slotwise_core::types::{Booking, Frequency, RecurrenceRule, weekday_number};

/// Lower bound of the period safety cap for rules without a count.
pub const DEFAULT_SAFETY_CAP_FLOOR: u32 = 1000;

/// One concrete instance of a booking. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOccurrence {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Zero-based position in the series; `None` for one-off bookings.
    pub occurrence_index: Option<u32>,
    pub original_booking_id: String,
    pub rule_id: Option<String>,
}

impl BookingOccurrence {
    /// The occurrence a non-recurring booking stands for.
    pub fn single(booking: &Booking) -> Self {
        Self {
            start: booking.start,
            end: booking.end,
            occurrence_index: None,
            original_booking_id: booking.id.clone(),
            rule_id: booking.rule_id.clone(),
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Expands recurrence rules. Stateless apart from its safety cap.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceEngine {
    safety_cap_floor: u32,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_CAP_FLOOR)
    }
}

impl RecurrenceEngine {
    pub fn new(safety_cap_floor: u32) -> Self {
        Self {
            safety_cap_floor: safety_cap_floor.max(1),
        }
    }

    pub fn safety_cap_floor(&self) -> u32 {
        self.safety_cap_floor
    }

    /// Expand `rule` from the base instance `[base_start, base_end)` and
    /// return the occurrences overlapping `[range_start, range_end)`,
    /// ascending by start.
    #[allow(clippy::too_many_arguments)]
    pub fn expand_rule(
        &self,
        rule: &RecurrenceRule,
        base_start: NaiveDateTime,
        base_end: NaiveDateTime,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
        booking_id: &str,
        rule_id: Option<&str>,
    ) -> Result<Vec<BookingOccurrence>, SlotwiseError> {
        rule.validate()?;
        if base_end <= base_start {
            return Err(SlotwiseError::InvalidRule(format!(
                "base end {base_end} is not after base start {base_start}"
            )));
        }

        let mut out = Vec::new();
        let filter_is_empty = rule.by_weekday.as_ref().is_some_and(|d| d.is_empty())
            || rule.by_monthday.as_ref().is_some_and(|d| d.is_empty());
        if filter_is_empty || range_end <= range_start || rule.occurrences == Some(0) {
            return Ok(out);
        }

        let duration = base_end - base_start;
        let first_period = self.fast_forward(rule, base_start, duration, range_start);
        let cap = 2 * u64::from(rule.occurrences.unwrap_or(0).max(self.safety_cap_floor));
        // Unfiltered fixed-length periods hold exactly one match each.
        let mut matched = first_period;

        let mut period = first_period;
        'periods: while period - first_period < cap {
            let candidates = period_candidates(rule, base_start.date(), period);
            period += 1;
            let Some(candidates) = candidates else {
                // Month arithmetic left the calendar.
                break;
            };

            for date in candidates {
                let start = date.and_time(base_start.time());
                if start < base_start || !rule.matches(date) {
                    continue;
                }
                if rule.end_date.is_some_and(|end| date > end) || start >= range_end {
                    break 'periods;
                }

                let index = matched;
                matched += 1;
                let end = start + duration;
                if start < range_end && end > range_start {
                    out.push(BookingOccurrence {
                        start,
                        end,
                        occurrence_index: u32::try_from(index).ok(),
                        original_booking_id: booking_id.to_string(),
                        rule_id: rule_id.map(str::to_string),
                    });
                }
                if rule.occurrences.is_some_and(|n| matched >= u64::from(n)) {
                    break 'periods;
                }
            }
        }

        if period - first_period >= cap {
            debug!(booking_id, cap, "recurrence expansion stopped at safety cap");
        }
        Ok(out)
    }

    /// Expand any booking, recurring or not, against a range.
    pub fn expand_booking(
        &self,
        booking: &Booking,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
    ) -> Result<Vec<BookingOccurrence>, SlotwiseError> {
        match &booking.recurrence {
            Some(rule) => self.expand_rule(
                rule,
                booking.start,
                booking.end,
                range_start,
                range_end,
                &booking.id,
                booking.rule_id.as_deref(),
            ),
            None if booking.start < range_end && booking.end > range_start => {
                Ok(vec![BookingOccurrence::single(booking)])
            }
            None => Ok(Vec::new()),
        }
    }

    /// First period worth walking for open-ended rules whose periods have a
    /// fixed length and exactly one candidate.
    fn fast_forward(
        &self,
        rule: &RecurrenceRule,
        base_start: NaiveDateTime,
        duration: TimeDelta,
        range_start: NaiveDateTime,
    ) -> u64 {
        let unfiltered = rule.by_weekday.is_none() && rule.by_monthday.is_none();
        if !unfiltered || rule.occurrences.is_some() {
            return 0;
        }
        let step_days = match rule.frequency {
            Frequency::Daily | Frequency::Custom => i64::from(rule.interval),
            Frequency::Weekly => 7 * i64::from(rule.interval),
            Frequency::Monthly => return 0,
        };
        let gap_days = (range_start - duration - base_start).num_days();
        // One period of slack so an instance straddling range_start is kept.
        u64::try_from(gap_days / step_days - 1).unwrap_or(0)
    }
}

/// Candidate dates of the `period`-th period, ascending. `None` once the
/// period lies outside chrono's calendar.
fn period_candidates(rule: &RecurrenceRule, base: NaiveDate, period: u64) -> Option<Vec<NaiveDate>> {
    let steps = period.checked_mul(u64::from(rule.interval))?;
    match rule.frequency {
        Frequency::Daily | Frequency::Custom => {
            let anchor = base.checked_add_days(chrono::Days::new(steps))?;
            Some(vec![anchor])
        }
        Frequency::Weekly => {
            let anchor = base.checked_add_days(chrono::Days::new(steps.checked_mul(7)?))?;
            match &rule.by_weekday {
                Some(days) => {
                    let week_start =
                        anchor - TimeDelta::days(i64::from(weekday_number(anchor)));
                    Some(
                        days.iter()
                            .map(|d| week_start + TimeDelta::days(i64::from(*d)))
                            .collect(),
                    )
                }
                None => Some(vec![anchor]),
            }
        }
        Frequency::Monthly => {
            let month_start = base
                .with_day(1)?
                .checked_add_months(Months::new(u32::try_from(steps).ok()?))?;
            match &rule.by_monthday {
                Some(days) => Some(
                    days.iter()
                        .filter_map(|d| month_start.with_day(u32::from(*d)))
                        .collect(),
                ),
                // Months without the base day are skipped, not clamped.
                None => Some(month_start.with_day(base.day()).into_iter().collect()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn expand(
        rule: &RecurrenceRule,
        base_start: NaiveDateTime,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
    ) -> Vec<BookingOccurrence> {
        RecurrenceEngine::default()
            .expand_rule(
                rule,
                base_start,
                base_start + TimeDelta::hours(1),
                range_start,
                range_end,
                "b1",
                Some("r1"),
            )
            .unwrap()
    }

    #[test]
    fn weekly_by_weekday_lands_on_every_listed_day() {
        // Monday 2026-10-19, 10:00.
        let rule = RecurrenceRule::new(Frequency::Weekly, 1).with_weekdays([1, 3]);
        let out = expand(
            &rule,
            at(2026, 10, 19, 10, 0),
            at(2026, 10, 19, 0, 0),
            at(2026, 11, 2, 0, 0),
        );
        let starts: Vec<_> = out.iter().map(|o| o.start).collect();
        assert_eq!(
            starts,
            vec![
                at(2026, 10, 19, 10, 0),
                at(2026, 10, 21, 10, 0),
                at(2026, 10, 26, 10, 0),
                at(2026, 10, 28, 10, 0),
            ]
        );
        assert!(out.iter().all(|o| o.duration() == TimeDelta::hours(1)));
        assert_eq!(out[0].occurrence_index, Some(0));
        assert_eq!(out[3].occurrence_index, Some(3));
        assert_eq!(out[0].rule_id.as_deref(), Some("r1"));
    }

    #[test]
    fn weekdays_before_the_base_start_are_skipped() {
        // Base on Wednesday; Monday of that week is before the series began.
        let rule = RecurrenceRule::new(Frequency::Weekly, 1).with_weekdays([1, 3]);
        let out = expand(
            &rule,
            at(2026, 10, 21, 10, 0),
            at(2026, 10, 18, 0, 0),
            at(2026, 10, 27, 0, 0),
        );
        let starts: Vec<_> = out.iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![at(2026, 10, 21, 10, 0), at(2026, 10, 26, 10, 0)]);
    }

    #[test]
    fn count_limits_the_series() {
        let rule = RecurrenceRule::new(Frequency::Daily, 1).count(3);
        let out = expand(
            &rule,
            at(2026, 10, 19, 9, 0),
            at(2026, 10, 1, 0, 0),
            at(2026, 12, 1, 0, 0),
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].start, at(2026, 10, 21, 9, 0));
    }

    #[test]
    fn count_includes_instances_before_the_range() {
        let rule = RecurrenceRule::new(Frequency::Daily, 1).count(3);
        let out = expand(
            &rule,
            at(2026, 10, 19, 9, 0),
            at(2026, 10, 21, 0, 0),
            at(2026, 12, 1, 0, 0),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].occurrence_index, Some(2));
    }

    #[test]
    fn end_date_is_inclusive() {
        let rule = RecurrenceRule::new(Frequency::Daily, 2)
            .until(NaiveDate::from_ymd_opt(2026, 10, 23).unwrap());
        let out = expand(
            &rule,
            at(2026, 10, 19, 9, 0),
            at(2026, 10, 1, 0, 0),
            at(2026, 12, 1, 0, 0),
        );
        let days: Vec<_> = out.iter().map(|o| o.start.day()).collect();
        assert_eq!(days, vec![19, 21, 23]);
    }

    #[test]
    fn monthly_monthday_skips_short_months() {
        let rule = RecurrenceRule::new(Frequency::Monthly, 1).with_monthdays([31]);
        let out = expand(
            &rule,
            at(2026, 10, 31, 9, 0),
            at(2026, 10, 1, 0, 0),
            at(2027, 2, 1, 0, 0),
        );
        let months: Vec<_> = out.iter().map(|o| o.start.month()).collect();
        assert_eq!(months, vec![10, 12, 1]);
    }

    #[test]
    fn monthly_without_filter_keeps_the_base_day() {
        let rule = RecurrenceRule::new(Frequency::Monthly, 2);
        let out = expand(
            &rule,
            at(2026, 1, 15, 9, 0),
            at(2026, 1, 1, 0, 0),
            at(2026, 8, 1, 0, 0),
        );
        let months: Vec<_> = out.iter().map(|o| o.start.month()).collect();
        assert_eq!(months, vec![1, 3, 5, 7]);
        assert!(out.iter().all(|o| o.start.day() == 15));
    }

    #[test]
    fn open_ended_daily_series_reaches_far_ranges() {
        // Five years of daily instances exceed the period cap without fast-forward.
        let rule = RecurrenceRule::new(Frequency::Daily, 1);
        let out = expand(
            &rule,
            at(2021, 10, 19, 9, 0),
            at(2026, 10, 19, 0, 0),
            at(2026, 10, 20, 0, 0),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, at(2026, 10, 19, 9, 0));
    }

    #[test]
    fn instance_straddling_range_start_is_kept() {
        let rule = RecurrenceRule::new(Frequency::Daily, 1);
        let out = RecurrenceEngine::default()
            .expand_rule(
                &rule,
                at(2026, 10, 1, 23, 0),
                at(2026, 10, 2, 1, 0),
                at(2026, 10, 10, 0, 0),
                at(2026, 10, 10, 12, 0),
                "b1",
                None,
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, at(2026, 10, 9, 23, 0));
    }

    #[test]
    fn empty_filter_yields_nothing() {
        let rule = RecurrenceRule::new(Frequency::Weekly, 1).with_weekdays([]);
        let out = expand(
            &rule,
            at(2026, 10, 19, 10, 0),
            at(2026, 10, 19, 0, 0),
            at(2026, 11, 19, 0, 0),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn sparse_filters_stop_at_the_period_cap() {
        // Sundays that fall on the 31st.
        let rule = RecurrenceRule::new(Frequency::Monthly, 1)
            .with_monthdays([31])
            .with_weekdays([0]);
        let engine = RecurrenceEngine::new(10);
        let out = engine
            .expand_rule(
                &rule,
                at(2026, 10, 31, 9, 0),
                at(2026, 10, 31, 10, 0),
                at(2026, 10, 1, 0, 0),
                at(2035, 1, 1, 0, 0),
                "b1",
                None,
            )
            .unwrap();
        // Twenty monthly periods run from October 2026 to May 2028.
        let starts: Vec<_> = out.iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![at(2027, 1, 31, 9, 0), at(2027, 10, 31, 9, 0)]);
    }

    #[test]
    fn malformed_rules_are_errors() {
        let engine = RecurrenceEngine::default();
        let base = at(2026, 10, 19, 10, 0);
        let range = (at(2026, 10, 1, 0, 0), at(2026, 11, 1, 0, 0));

        let zero = RecurrenceRule::new(Frequency::Daily, 0);
        let bad_weekday = RecurrenceRule::new(Frequency::Weekly, 1).with_weekdays([7]);
        let bad_monthday = RecurrenceRule::new(Frequency::Monthly, 1).with_monthdays([0]);
        for rule in [zero, bad_weekday, bad_monthday] {
            let err = engine
                .expand_rule(&rule, base, base + TimeDelta::hours(1), range.0, range.1, "b", None)
                .unwrap_err();
            assert!(matches!(err, SlotwiseError::InvalidRule(_)));
        }

        let ok = RecurrenceRule::new(Frequency::Daily, 1);
        assert!(engine
            .expand_rule(&ok, base, base, range.0, range.1, "b", None)
            .is_err());
    }

    #[test]
    fn one_off_bookings_expand_to_themselves() {
        let booking = Booking {
            id: "b9".into(),
            client_id: "c".into(),
            start: at(2026, 10, 19, 10, 0),
            end: at(2026, 10, 19, 11, 0),
            status: slotwise_core::types::BookingStatus::Confirmed,
            recurrence: None,
            rule_id: None,
            conversation_id: None,
            customer_phone: None,
            customer_name: None,
        };
        let engine = RecurrenceEngine::default();
        let hit = engine
            .expand_booking(&booking, at(2026, 10, 19, 0, 0), at(2026, 10, 20, 0, 0))
            .unwrap();
        assert_eq!(hit, vec![BookingOccurrence::single(&booking)]);
        let miss = engine
            .expand_booking(&booking, at(2026, 10, 20, 0, 0), at(2026, 10, 21, 0, 0))
            .unwrap();
        assert!(miss.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn weekly_filter_only_emits_listed_weekdays(
                days in proptest::collection::btree_set(0u8..7, 1..4),
                offset_days in 0i64..400,
                hour in 6u32..20,
            ) {
                let rule = RecurrenceRule::new(Frequency::Weekly, 1).with_weekdays(days.clone());
                let base = at(2026, 1, 5, hour, 0);
                let range_start = at(2026, 1, 5, 0, 0) + TimeDelta::days(offset_days);
                let range_end = range_start + TimeDelta::days(14);
                let out = RecurrenceEngine::default()
                    .expand_rule(&rule, base, base + TimeDelta::minutes(45), range_start, range_end, "b", None)
                    .unwrap();

                prop_assert_eq!(out.len(), 2 * days.len());
                for occ in &out {
                    prop_assert!(days.contains(&weekday_number(occ.start.date())));
                    prop_assert_eq!(occ.duration(), TimeDelta::minutes(45));
                }
                prop_assert!(out.windows(2).all(|w| w[0].start < w[1].start));
            }
        }
    }
}
