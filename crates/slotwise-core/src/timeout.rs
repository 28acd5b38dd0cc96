// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline wrapper for collaborator calls.

use std::future::Future;
use std::time::Duration;

use crate::error::SlotwiseError;

/// Awaits a collaborator call, failing with [`SlotwiseError::Timeout`] once
/// `duration` elapses. The call is not retried.
pub async fn bounded<T, F>(duration: Duration, fut: F) -> Result<T, SlotwiseError>
where
    F: Future<Output = Result<T, SlotwiseError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(SlotwiseError::Timeout { duration }),
    }
}
