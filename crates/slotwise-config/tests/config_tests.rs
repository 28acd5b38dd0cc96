// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Slotwise configuration system.

use std::io::Write;

use slotwise_config::diagnostic::ConfigError;
use slotwise_config::model::SlotwiseConfig;
use slotwise_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_slotwise_config() {
    let toml = r#"
[agent]
name = "salon-bot"
log_level = "debug"
default_duration_minutes = 45
search_days_ahead = 21
buffer_minutes = 10
store_timeout_ms = 2500
auto_book = false

[memory]
ttl_hours = 12
ring_size = 6
hard_reset_threshold = 5
sweep_interval_secs = 60

[recurrence]
safety_cap_floor = 500

[handover]
notify_throttle_secs = 120
owner_contact = "+15550001111"
vip_customers = ["+15550002222"]

[business]
client_id = "salon-42"
hours = [
  { day = 2, open = "10:00", close = "18:00" },
  { day = 6, open = "09:00", close = "13:00" },
]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "salon-bot");
    assert_eq!(config.agent.default_duration_minutes, 45);
    assert_eq!(config.agent.search_days_ahead, 21);
    assert_eq!(config.agent.buffer_minutes, 10);
    assert_eq!(config.agent.store_timeout().as_millis(), 2500);
    assert!(!config.agent.auto_book);
    assert_eq!(config.memory.ttl_hours, 12);
    assert_eq!(config.memory.ring_size, 6);
    assert_eq!(config.memory.hard_reset_threshold, 5);
    assert_eq!(config.recurrence.safety_cap_floor, 500);
    assert_eq!(config.handover.notify_throttle_secs, 120);
    assert_eq!(config.handover.owner_contact.as_deref(), Some("+15550001111"));
    assert_eq!(config.handover.vip_customers, vec!["+15550002222"]);
    assert_eq!(config.business.client_id, "salon-42");
    assert_eq!(config.business.hours.len(), 2);
    assert_eq!(config.business.hours[1].day, 6);
}

/// Missing sections fall back to compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.agent.default_duration_minutes, 60);
    assert_eq!(config.agent.search_days_ahead, 14);
    assert_eq!(config.memory.ttl_hours, 24);
    assert_eq!(config.memory.ring_size, 5);
    assert_eq!(config.memory.hard_reset_threshold, 4);
    assert_eq!(config.recurrence.safety_cap_floor, 1000);
    assert_eq!(config.handover.notify_throttle_secs, 300);
    assert_eq!(config.business.hours.len(), 5, "weekdays open by default");
}

/// Unknown keys are rejected with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[agent]
serch_days_ahead = 3
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("search_days_ahead"));
}

/// Wrong value types surface as InvalidType diagnostics.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[memory]
ttl_hours = "one day"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject string for integer");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("ttl_hours"))));
}

/// Semantic validation runs after deserialization.
#[test]
fn semantic_errors_are_reported() {
    let toml = r#"
[agent]
default_duration_minutes = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("zero duration is invalid");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("default_duration_minutes"))));
}

/// A config file on disk is loaded and validated.
#[test]
fn loads_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[agent]\nsearch_days_ahead = 7").unwrap();

    let config = load_and_validate_path(file.path()).expect("file config should load");
    assert_eq!(config.agent.search_days_ahead, 7);
}

/// Environment variables override file values, with underscores preserved in key names.
#[test]
fn env_overrides_map_sections_to_keys() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("slotwise.toml", "[agent]\nsearch_days_ahead = 7\n")?;
        jail.set_env("SLOTWISE_AGENT_SEARCH_DAYS_AHEAD", "9");
        jail.set_env("SLOTWISE_MEMORY_TTL_HOURS", "6");

        let path = jail.directory().join("slotwise.toml");
        let config: SlotwiseConfig =
            slotwise_config::load_config_from_path(&path).map_err(|e| e.to_string())?;
        assert_eq!(config.agent.search_days_ahead, 9);
        assert_eq!(config.memory.ttl_hours, 6);
        Ok(())
    });
}
