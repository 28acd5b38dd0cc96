// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification gateway that writes to the log instead of sending SMS.

use async_trait::async_trait;
use tracing::info;

use slotwise_core::error::SlotwiseError;
use slotwise_core::traits::{Collaborator, NotificationGateway};
use slotwise_core::types::{CollaboratorKind, HealthStatus, Notification};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogGateway;

#[async_trait]
impl Collaborator for LogGateway {
    fn name(&self) -> &str {
        "log"
    }

    fn kind(&self) -> CollaboratorKind {
        CollaboratorKind::NotificationGateway
    }

    async fn health_check(&self) -> Result<HealthStatus, SlotwiseError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl NotificationGateway for LogGateway {
    async fn send(&self, notification: Notification) -> Result<(), SlotwiseError> {
        info!(recipient = %notification.recipient, body = %notification.body, "notification");
        Ok(())
    }
}
