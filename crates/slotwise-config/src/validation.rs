// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: positive durations,
//! sane thresholds, and well-formed opening hours.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::SlotwiseConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &SlotwiseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.agent.default_duration_minutes == 0 {
        fail("agent.default_duration_minutes must be greater than 0".to_string());
    }

    if config.agent.default_duration_minutes > 12 * 60 {
        fail(format!(
            "agent.default_duration_minutes must be at most 720, got {}",
            config.agent.default_duration_minutes
        ));
    }

    if config.agent.search_days_ahead == 0 {
        fail("agent.search_days_ahead must be at least 1".to_string());
    }

    if config.agent.store_timeout_ms == 0 {
        fail("agent.store_timeout_ms must be greater than 0".to_string());
    }

    if config.memory.ttl_hours == 0 {
        fail("memory.ttl_hours must be at least 1".to_string());
    }

    if config.memory.ring_size < 2 {
        fail(format!(
            "memory.ring_size must be at least 2 to detect repeats, got {}",
            config.memory.ring_size
        ));
    }

    if config.memory.hard_reset_threshold < 2 {
        fail(format!(
            "memory.hard_reset_threshold must be at least 2, got {}",
            config.memory.hard_reset_threshold
        ));
    }

    if config.memory.sweep_interval_secs == 0 {
        fail("memory.sweep_interval_secs must be greater than 0".to_string());
    }

    if config.recurrence.safety_cap_floor == 0 {
        fail("recurrence.safety_cap_floor must be at least 1".to_string());
    }

    if let Some(contact) = &config.handover.owner_contact
        && contact.trim().is_empty()
    {
        fail("handover.owner_contact must not be empty when set".to_string());
    }

    if config.business.client_id.trim().is_empty() {
        fail("business.client_id must not be empty".to_string());
    }

    let mut seen = HashSet::new();
    for (i, hours) in config.business.hours.iter().enumerate() {
        if hours.day > 6 {
            fail(format!(
                "business.hours[{i}].day must be 0 (Sunday) to 6 (Saturday), got {}",
                hours.day
            ));
        }
        match hours.to_range() {
            Ok(range) if range.start >= range.end => fail(format!(
                "business.hours[{i}] opens at {} but closes at {}",
                hours.open, hours.close
            )),
            Ok(range) => {
                if !seen.insert((range.day_of_week, range.start, range.end)) {
                    fail(format!("business.hours[{i}] duplicates an earlier range"));
                }
            }
            Err(e) => fail(e.to_string()),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OpeningHours;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&SlotwiseConfig::default()).is_ok());
    }

    #[test]
    fn zero_duration_fails_validation() {
        let mut config = SlotwiseConfig::default();
        config.agent.default_duration_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "default_duration_minutes"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = SlotwiseConfig::default();
        config.agent.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log_level"));
    }

    #[test]
    fn inverted_opening_hours_fail_validation() {
        let mut config = SlotwiseConfig::default();
        config.business.hours = vec![OpeningHours {
            day: 2,
            open: "17:00".to_string(),
            close: "09:00".to_string(),
        }];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "closes at"));
    }

    #[test]
    fn malformed_opening_time_fails_validation() {
        let mut config = SlotwiseConfig::default();
        config.business.hours = vec![OpeningHours {
            day: 2,
            open: "nine".to_string(),
            close: "17:00".to_string(),
        }];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "invalid time `nine`"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = SlotwiseConfig::default();
        config.agent.search_days_ahead = 0;
        config.memory.ttl_hours = 0;
        config.memory.hard_reset_threshold = 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
