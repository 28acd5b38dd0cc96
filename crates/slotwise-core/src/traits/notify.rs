// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification gateway trait for SMS/email delivery to business owners.

use async_trait::async_trait;

use crate::error::SlotwiseError;
use crate::traits::adapter::Collaborator;
use crate::types::Notification;

/// Fire-and-forget delivery of an SMS or email payload.
#[async_trait]
pub trait NotificationGateway: Collaborator {
    /// Sends a notification.
    async fn send(&self, notification: Notification) -> Result<(), SlotwiseError>;
}
