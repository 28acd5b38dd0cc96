// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./slotwise.toml` > `~/.config/slotwise/slotwise.toml` > `/etc/slotwise/slotwise.toml`
//! with environment variable overrides via `SLOTWISE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SlotwiseConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/slotwise/slotwise.toml` (system-wide)
/// 3. `~/.config/slotwise/slotwise.toml` (user XDG config)
/// 4. `./slotwise.toml` (local directory)
/// 5. `SLOTWISE_*` environment variables
pub fn load_config() -> Result<SlotwiseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SlotwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlotwiseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SlotwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlotwiseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SlotwiseConfig::default()))
        .merge(Toml::file("/etc/slotwise/slotwise.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("slotwise/slotwise.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("slotwise.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SLOTWISE_AGENT_SEARCH_DAYS_AHEAD` must map to
/// `agent.search_days_ahead`, not `agent.search.days.ahead`.
fn env_provider() -> Env {
    Env::prefixed("SLOTWISE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("recurrence_", "recurrence.", 1)
            .replacen("handover_", "handover.", 1)
            .replacen("business_", "business.", 1);
        mapped.into()
    })
}
