// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end conversation tests.
//!
//! `TestHarness` assembles a complete scheduling brain over in-memory stores,
//! a manual clock, and recording mocks. Provides `send()` to drive the full
//! pipeline one message at a time.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use slotwise_agent::{
    BrainDeps, InboundMessage, InboundReply, ProcessRequest, SchedulingBrain, SchedulingDecision,
};
use slotwise_config::SlotwiseConfig;
use slotwise_core::SlotwiseError;
use slotwise_core::clock::ManualClock;
use slotwise_memory::InMemoryConversationStore;
use slotwise_storage::InMemoryHandoverStore;

use crate::mock_calendar::FaultyCalendar;
use crate::mock_gateway::RecordingGateway;

/// Customer phone used by `inbound()`.
pub const TEST_PHONE: &str = "+15551234567";

/// Monday 2026-10-19, 08:00.
pub fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default()
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: SlotwiseConfig,
    start: NaiveDateTime,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = SlotwiseConfig::default();
        config.handover.owner_contact = Some("owner@example.com".to_string());
        Self {
            config,
            start: default_start(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: SlotwiseConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock's starting instant.
    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    /// Mark a customer phone as VIP.
    pub fn with_vip(mut self, phone: &str) -> Self {
        self.config.handover.vip_customers.push(phone.to_string());
        self
    }

    /// Turn off booking on confirmation.
    pub fn without_auto_book(mut self) -> Self {
        self.config.agent.auto_book = false;
        self
    }

    /// Build the harness, seeding the calendar with the configured opening hours.
    pub fn build(self) -> Result<TestHarness, SlotwiseError> {
        let calendar = Arc::new(FaultyCalendar::new());
        let hours = self
            .config
            .business
            .hours
            .iter()
            .map(|h| h.to_range())
            .collect::<Result<Vec<_>, _>>()?;
        calendar
            .inner()
            .set_availability(&self.config.business.client_id, hours);

        let clock = Arc::new(ManualClock::new(self.start));
        let handover_store = Arc::new(InMemoryHandoverStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let brain = SchedulingBrain::new(
            &self.config,
            BrainDeps {
                calendar: calendar.clone(),
                handover_store: handover_store.clone(),
                gateway: gateway.clone(),
                conversations: Arc::new(InMemoryConversationStore::new()),
                clock: clock.clone(),
            },
        );

        Ok(TestHarness {
            brain: Arc::new(brain),
            calendar,
            handover_store,
            gateway,
            clock,
            config: self.config,
        })
    }
}

/// A complete test environment with mock collaborators.
pub struct TestHarness {
    /// The brain under test.
    pub brain: Arc<SchedulingBrain>,
    /// Calendar store with switchable failures.
    pub calendar: Arc<FaultyCalendar>,
    pub handover_store: Arc<InMemoryHandoverStore>,
    /// Captures owner notifications.
    pub gateway: Arc<RecordingGateway>,
    /// Drives time for TTL and throttle tests.
    pub clock: Arc<ManualClock>,
    pub config: SlotwiseConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one message through `process()` for the default client.
    pub async fn send(&self, conversation_id: &str, message: &str) -> SchedulingDecision {
        let request = ProcessRequest {
            message: message.to_string(),
            conversation_id: conversation_id.to_string(),
            client_id: self.config.business.client_id.clone(),
            default_duration_minutes: self.config.agent.default_duration_minutes,
            is_vip: false,
            customer_phone: None,
        };
        self.brain.process(&request).await
    }

    /// Run one message through `handle_inbound()` as [`TEST_PHONE`].
    pub async fn inbound(&self, conversation_id: &str, message: &str) -> InboundReply {
        self.inbound_from(conversation_id, message, TEST_PHONE).await
    }

    pub async fn inbound_from(
        &self,
        conversation_id: &str,
        message: &str,
        phone: &str,
    ) -> InboundReply {
        self.brain
            .handle_inbound(InboundMessage {
                message: message.to_string(),
                conversation_id: conversation_id.to_string(),
                client_id: self.config.business.client_id.clone(),
                customer_phone: Some(phone.to_string()),
                customer_name: Some("Test Customer".to_string()),
                default_duration_minutes: None,
            })
            .await
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.clock.advance(delta);
    }
}
