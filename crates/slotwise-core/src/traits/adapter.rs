// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that all external collaborators implement.

use async_trait::async_trait;

use crate::error::SlotwiseError;
use crate::types::{CollaboratorKind, HealthStatus};

/// The base trait for store and gateway collaborators.
///
/// Provides identity and a health probe so the binary can report which
/// backends are wired in and whether they respond.
#[async_trait]
pub trait Collaborator: Send + Sync + 'static {
    /// Returns the human-readable name of this collaborator instance.
    fn name(&self) -> &str;

    /// Returns the kind of collaborator (calendar store, handover store, gateway).
    fn kind(&self) -> CollaboratorKind;

    /// Performs a health check and returns the collaborator's current status.
    async fn health_check(&self) -> Result<HealthStatus, SlotwiseError>;
}
