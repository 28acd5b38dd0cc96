// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Slotwise scheduling engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use slotwise_core::{AvailabilityRange, SlotwiseError};

/// Top-level Slotwise configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlotwiseConfig {
    /// Engine identity and scheduling behavior.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Recurrence expansion settings.
    #[serde(default)]
    pub recurrence: RecurrenceConfig,

    /// Human handover and notification settings.
    #[serde(default)]
    pub handover: HandoverConfig,

    /// Business calendar used by the in-memory store.
    #[serde(default)]
    pub business: BusinessConfig,
}

/// Engine identity and scheduling behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Appointment length used when the inbound trigger does not carry one.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,

    /// Days scanned by the broad and fallback slot searches.
    #[serde(default = "default_search_days_ahead")]
    pub search_days_ahead: u32,

    /// Minimum gap between the end of a proposed slot and the next booking.
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: u32,

    /// Offset added to a declined slot before searching for the next one.
    #[serde(default = "default_decline_offset_minutes")]
    pub decline_offset_minutes: u32,

    /// Deadline for every calendar/handover store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Create the booking row as soon as a customer confirms a proposed slot.
    #[serde(default = "default_auto_book")]
    pub auto_book: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            default_duration_minutes: default_duration_minutes(),
            search_days_ahead: default_search_days_ahead(),
            buffer_minutes: default_buffer_minutes(),
            decline_offset_minutes: default_decline_offset_minutes(),
            store_timeout_ms: default_store_timeout_ms(),
            auto_book: default_auto_book(),
        }
    }
}

impl AgentConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

fn default_agent_name() -> String {
    "slotwise".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duration_minutes() -> u32 {
    60
}

fn default_search_days_ahead() -> u32 {
    14
}

fn default_buffer_minutes() -> u32 {
    15
}

fn default_decline_offset_minutes() -> u32 {
    15
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_auto_book() -> bool {
    true
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Hours of silence after which a conversation's state is discarded.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,

    /// Number of recent messages kept for loop detection.
    #[serde(default = "default_ring_size")]
    pub ring_size: usize,

    /// Loop count at which the permissive hard-reset reply is sent.
    #[serde(default = "default_hard_reset_threshold")]
    pub hard_reset_threshold: u32,

    /// Seconds between background sweeps of expired conversations.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            ring_size: default_ring_size(),
            hard_reset_threshold: default_hard_reset_threshold(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_ttl_hours() -> u32 {
    24
}

fn default_ring_size() -> usize {
    5
}

fn default_hard_reset_threshold() -> u32 {
    4
}

fn default_sweep_interval_secs() -> u64 {
    600
}

/// Recurrence expansion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecurrenceConfig {
    /// Floor of the iteration cap: expansion stops after
    /// `2 * max(occurrences, safety_cap_floor)` periods.
    #[serde(default = "default_safety_cap_floor")]
    pub safety_cap_floor: u32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            safety_cap_floor: default_safety_cap_floor(),
        }
    }
}

fn default_safety_cap_floor() -> u32 {
    1000
}

/// Human handover configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HandoverConfig {
    /// Minimum seconds between two owner notifications for one conversation.
    #[serde(default = "default_notify_throttle_secs")]
    pub notify_throttle_secs: u64,

    /// Phone number or email address that receives handover notifications.
    /// `None` disables notifications.
    #[serde(default)]
    pub owner_contact: Option<String>,

    /// Customer phone numbers treated as VIP.
    #[serde(default)]
    pub vip_customers: Vec<String>,
}

impl Default for HandoverConfig {
    fn default() -> Self {
        Self {
            notify_throttle_secs: default_notify_throttle_secs(),
            owner_contact: None,
            vip_customers: Vec::new(),
        }
    }
}

fn default_notify_throttle_secs() -> u64 {
    300
}

/// Business calendar served by the in-memory store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessConfig {
    /// Client identifier the calendar belongs to.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Weekly opening hours.
    #[serde(default = "default_hours")]
    pub hours: Vec<OpeningHours>,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            hours: default_hours(),
        }
    }
}

/// One opening range, e.g. `{ day = 1, open = "09:00", close = "17:00" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpeningHours {
    /// 0 = Sunday .. 6 = Saturday.
    pub day: u8,
    /// Opening time as `HH:MM`.
    pub open: String,
    /// Closing time as `HH:MM`.
    pub close: String,
}

fn default_client_id() -> String {
    "default".to_string()
}

fn default_hours() -> Vec<OpeningHours> {
    (1..=5)
        .map(|day| OpeningHours {
            day,
            open: "09:00".to_string(),
            close: "17:00".to_string(),
        })
        .collect()
}

impl OpeningHours {
    /// Converts the textual hours into an availability range.
    pub fn to_range(&self) -> Result<AvailabilityRange, SlotwiseError> {
        let parse = |value: &str| {
            NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
                SlotwiseError::Config(format!("invalid time `{value}` in business.hours: {e}"))
            })
        };
        Ok(AvailabilityRange {
            day_of_week: self.day,
            start: parse(&self.open)?,
            end: parse(&self.close)?,
        })
    }
}
