// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slotwise - a conversational scheduling assistant.
//!
//! This is the binary entry point: an interactive chat against the
//! in-memory calendar, a config checker, and a recurrence expander.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod expand;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slotwise_config::SlotwiseConfig;

use crate::expand::ExpandArgs;

/// Slotwise - a conversational scheduling assistant.
#[derive(Parser, Debug)]
#[command(name = "slotwise", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the scheduling assistant in the terminal.
    Chat {
        /// JSON calendar seed (availability, blocked ranges, bookings).
        #[arg(long)]
        seed: Option<PathBuf>,
        /// Customer phone number to chat as.
        #[arg(long)]
        phone: Option<String>,
    },
    /// Validate the configuration and print a summary.
    CheckConfig,
    /// Print the occurrences of a recurrence rule within a range.
    Expand(ExpandArgs),
}

fn load(path: Option<&PathBuf>) -> SlotwiseConfig {
    let loaded = match path {
        Some(path) => slotwise_config::load_and_validate_path(path),
        None => slotwise_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            slotwise_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Chat { seed, phone }) => chat::run_chat(config, seed, phone).await,
        Some(Commands::CheckConfig) => {
            print_summary(&config);
            Ok(())
        }
        Some(Commands::Expand(args)) => expand::run_expand(&config, &args),
        None => {
            println!("slotwise: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("slotwise: {e}");
        std::process::exit(1);
    }
}

fn print_summary(config: &SlotwiseConfig) {
    println!("config OK (agent.name={})", config.agent.name);
    println!(
        "  slots: {} min, {} days ahead, {} min buffer",
        config.agent.default_duration_minutes,
        config.agent.search_days_ahead,
        config.agent.buffer_minutes
    );
    println!(
        "  memory: {}h ttl, loop reset after {}",
        config.memory.ttl_hours, config.memory.hard_reset_threshold
    );
    println!(
        "  handover: owner {}, {} VIP customers",
        config.handover.owner_contact.as_deref().unwrap_or("not set"),
        config.handover.vip_customers.len()
    );
    println!(
        "  business: {} ({} opening ranges)",
        config.business.client_id,
        config.business.hours.len()
    );
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slotwise={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn expand_arguments_parse() {
        let cli = Cli::try_parse_from([
            "slotwise",
            "expand",
            "--frequency",
            "weekly",
            "--start",
            "2026-10-19 09:00",
            "--end",
            "2026-10-19 10:00",
            "--from",
            "2026-10-19",
            "--to",
            "2026-11-30",
            "--weekdays",
            "1,3",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Expand(args)) => {
                assert_eq!(args.weekdays, vec![1, 3]);
                assert_eq!(args.interval, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn binary_loads_config_defaults() {
        let config = slotwise_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.default_duration_minutes, 60);
    }

    #[test]
    #[serial]
    fn explicit_config_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotwise.toml");
        std::fs::write(&path, "[agent]\nsearch_days_ahead = 7\n").unwrap();

        let config = load(Some(&path));
        assert_eq!(config.agent.search_days_ahead, 7);
    }
}
