// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background removal of expired conversations.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::memory::ConversationMemory;

/// Spawns a task that sweeps expired state every `interval` until `cancel`
/// fires. The first sweep runs one interval after start.
pub fn spawn_sweeper(
    memory: Arc<ConversationMemory>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = memory.sweep_expired();
                    debug!(removed, "conversation sweep");
                }
                _ = cancel.cancelled() => {
                    info!("conversation sweeper shutting down");
                    break;
                }
            }
        }
    })
}
