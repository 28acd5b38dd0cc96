// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `slotwise chat` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Messages go through the full inbound pipeline against an in-memory
//! calendar built from `[business]`, so confirmations create real bookings
//! for the rest of the session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use slotwise_agent::{BrainDeps, InboundMessage, SchedulingBrain};
use slotwise_config::SlotwiseConfig;
use slotwise_core::clock::SystemClock;
use slotwise_core::error::SlotwiseError;
use slotwise_memory::{InMemoryConversationStore, spawn_sweeper};
use slotwise_storage::{InMemoryCalendarStore, InMemoryHandoverStore, LogGateway};

/// Builds the in-memory calendar for the configured business.
pub fn build_calendar(
    config: &SlotwiseConfig,
    seed: Option<&PathBuf>,
) -> Result<InMemoryCalendarStore, SlotwiseError> {
    let calendar = InMemoryCalendarStore::new();
    let hours = config
        .business
        .hours
        .iter()
        .map(|h| h.to_range())
        .collect::<Result<Vec<_>, _>>()?;
    calendar.set_availability(&config.business.client_id, hours);

    if let Some(path) = seed {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SlotwiseError::Config(format!("cannot read seed {}: {e}", path.display()))
        })?;
        calendar.load_seed_json(&json)?;
    }
    Ok(calendar)
}

/// Runs the `slotwise chat` interactive REPL.
pub async fn run_chat(
    config: SlotwiseConfig,
    seed: Option<PathBuf>,
    phone: Option<String>,
) -> Result<(), SlotwiseError> {
    let calendar = Arc::new(build_calendar(&config, seed.as_ref())?);
    let handover_store = Arc::new(InMemoryHandoverStore::new());
    let brain = SchedulingBrain::new(
        &config,
        BrainDeps {
            calendar: calendar.clone(),
            handover_store: handover_store.clone(),
            gateway: Arc::new(LogGateway),
            conversations: Arc::new(InMemoryConversationStore::new()),
            clock: Arc::new(SystemClock),
        },
    );

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        brain.memory(),
        Duration::from_secs(config.memory.sweep_interval_secs),
        cancel.clone(),
    );

    let conversation_id = format!("cli-{}", uuid::Uuid::new_v4());
    info!(conversation_id = %conversation_id, "chat session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| SlotwiseError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "slotwise chat".bold().green());
    println!(
        "Type {} to exit, {} to hand the conversation back from a human.\n",
        "/quit".yellow(),
        "/release".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/release" {
                    match brain.handover().release(&conversation_id).await {
                        Ok(()) => println!("{}", "conversation released".dimmed()),
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    }
                    continue;
                }

                let reply = brain
                    .handle_inbound(InboundMessage {
                        message: trimmed.to_string(),
                        conversation_id: conversation_id.clone(),
                        client_id: config.business.client_id.clone(),
                        customer_phone: phone.clone(),
                        customer_name: None,
                        default_duration_minutes: None,
                    })
                    .await;
                println!("{} {}", "slotwise>".cyan(), reply.reply);
                if let Some(id) = reply.booking_id {
                    println!("{}", format!("booking {id} created").dimmed());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    let active = handover_store.active().len();
    if active > 0 {
        println!("{}", format!("{active} conversation(s) awaiting a human").dimmed());
    }
    let booked = calendar.bookings_of(&config.business.client_id).len();
    println!("{}", format!("{booked} booking(s) on the calendar").dimmed());

    cancel.cancel();
    let _ = sweeper.await;
    println!("{}", "goodbye".dimmed());
    Ok(())
}
