// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification gateway for deterministic testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use slotwise_core::SlotwiseError;
use slotwise_core::traits::{Collaborator, NotificationGateway};
use slotwise_core::types::{CollaboratorKind, HealthStatus, Notification};

/// Captures every notification passed to `send()` for assertion in tests.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `send()` fail.
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all notifications that were sent.
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Collaborator for RecordingGateway {
    fn name(&self) -> &str {
        "recording-gateway"
    }

    fn kind(&self) -> CollaboratorKind {
        CollaboratorKind::NotificationGateway
    }

    async fn health_check(&self) -> Result<HealthStatus, SlotwiseError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, notification: Notification) -> Result<(), SlotwiseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SlotwiseError::Gateway {
                message: "mock gateway is failing".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(notification);
        Ok(())
    }
}
