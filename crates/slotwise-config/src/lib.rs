// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Slotwise scheduling engine.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use slotwise_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("search horizon: {} days", config.agent.search_days_ahead);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::SlotwiseConfig;

use tracing::{info, warn};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors are converted into diagnostics with source spans read
/// from whichever config files exist.
pub fn load_and_validate() -> Result<SlotwiseConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => checked(config, "xdg"),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a specific file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<SlotwiseConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => checked(config, &path.display().to_string()),
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SlotwiseConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => checked(config, "<inline>"),
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn checked(config: SlotwiseConfig, source: &str) -> Result<SlotwiseConfig, Vec<ConfigError>> {
    if let Err(errors) = validation::validate_config(&config) {
        warn!(source, errors = errors.len(), "configuration rejected");
        return Err(errors);
    }
    info!(
        source,
        client_id = %config.business.client_id,
        search_days_ahead = config.agent.search_days_ahead,
        "configuration loaded"
    );
    Ok(config)
}

/// Read whichever config files exist so diagnostics can show source spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/slotwise/slotwise.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("slotwise/slotwise.toml"));
    }
    candidates.push(
        std::env::current_dir()
            .map(|d| d.join("slotwise.toml"))
            .unwrap_or_else(|_| std::path::PathBuf::from("slotwise.toml")),
    );

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn loading_logs_the_source() {
        load_and_validate_str("").unwrap();
        assert!(logs_contain("configuration loaded"));
        assert!(logs_contain("<inline>"));
    }

    #[test]
    #[traced_test]
    fn rejected_config_is_logged() {
        let errors = load_and_validate_str("[agent]\nsearch_days_ahead = 0\n").unwrap_err();
        assert!(!errors.is_empty());
        assert!(logs_contain("configuration rejected"));
    }
}
