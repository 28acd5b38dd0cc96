// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content safety for Slotwise.
//!
//! - [`safety`]: screens inbound messages for self-harm, abuse, illegal,
//!   medical, and sexual content before any scheduling logic runs.
//! - [`redact`]: strips customer contact details from log output.

pub mod redact;
pub mod safety;

pub use redact::{mask_phone, redact};
pub use safety::{SafetyFilter, SafetyVerdict, UnsafeCategory, deflection_message};
