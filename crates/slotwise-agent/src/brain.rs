// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message scheduling pipeline.
//!
//! One inbound message produces exactly one reply. The steps run in a fixed
//! order and most of them can short-circuit:
//!
//! 1. handover check (a human owns the conversation: stay quiet)
//! 2. safety screen
//! 3. memory expiry
//! 4. loop detection
//! 5. extraction of date, time window, and urgency
//! 6. escalation detection
//! 7. confirmation of a proposed slot
//! 8. decline of a proposed slot
//! 9. clarification of vague or broad times
//! 10. slot search dispatch
//!
//! Store failures anywhere in the pipeline turn into the fallback reply.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, info, info_span, warn};

use slotwise_calendar::{RecurrenceEngine, SlotFinder, SlotQuery};
use slotwise_config::SlotwiseConfig;
use slotwise_core::clock::Clock;
use slotwise_core::error::SlotwiseError;
use slotwise_core::timeout::bounded;
use slotwise_core::traits::{CalendarStore, Classifier, HandoverStore, NotificationGateway};
use slotwise_core::types::{NewBooking, Sender, TimeWindow, UrgencyLevel};
use slotwise_memory::{ConversationMemory, ConversationStore};
use slotwise_nlu::{DateParser, IntentClassifier, ReplyIntent, TimeParser, UrgencyClassifier};
use slotwise_security::{SafetyFilter, SafetyVerdict, deflection_message, mask_phone, redact};

use crate::handover::HandoverDetectionEngine;
use crate::manager::{HandoverManager, HandoverRequest};
use crate::templates;

/// Urgency score forced on unsafe-content handovers.
const UNSAFE_URGENCY: u8 = 10;

/// Days searched when the preferred day has nothing.
const FALLBACK_SEARCH_DAYS: u32 = 14;

/// One message to decide on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub message: String,
    pub conversation_id: String,
    pub client_id: String,
    pub default_duration_minutes: u32,
    #[serde(default)]
    pub is_vip: bool,
    /// Customer contact, used only in owner notifications.
    #[serde(default)]
    pub customer_phone: Option<String>,
}

/// The reply and what it committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingDecision {
    pub reply: String,
    pub proposed_slot: Option<NaiveDateTime>,
    pub should_book: bool,
}

impl SchedulingDecision {
    fn reply(reply: String) -> Self {
        Self {
            reply,
            proposed_slot: None,
            should_book: false,
        }
    }

    fn offer(reply: String, slot: NaiveDateTime) -> Self {
        Self {
            reply,
            proposed_slot: Some(slot),
            should_book: false,
        }
    }
}

/// An inbound text from the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message: String,
    pub conversation_id: String,
    pub client_id: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub default_duration_minutes: Option<u32>,
}

/// The reply to an inbound text, with the booking it created if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundReply {
    pub reply: String,
    pub proposed_slot: Option<NaiveDateTime>,
    pub should_book: bool,
    pub booking_id: Option<String>,
}

/// Collaborators the brain is built from.
pub struct BrainDeps {
    pub calendar: Arc<dyn CalendarStore>,
    pub handover_store: Arc<dyn HandoverStore>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub conversations: Arc<dyn ConversationStore>,
    pub clock: Arc<dyn Clock>,
}

/// Contact details used when a confirmation turns into a booking.
struct BookingContact {
    customer_phone: Option<String>,
    customer_name: Option<String>,
}

/// Slot-search settings taken from `[agent]`.
#[derive(Debug, Clone)]
struct BrainSettings {
    default_duration_minutes: u32,
    search_days_ahead: u32,
    decline_offset: TimeDelta,
    auto_book: bool,
    store_timeout: Duration,
    vip_customers: HashSet<String>,
}

/// Orchestrates parsing, memory, escalation, and slot search for every
/// inbound message.
pub struct SchedulingBrain {
    memory: Arc<ConversationMemory>,
    calendar: Arc<dyn CalendarStore>,
    slots: SlotFinder,
    handover: HandoverManager,
    detector: HandoverDetectionEngine,
    clock: Arc<dyn Clock>,
    dates: DateParser,
    times: TimeParser,
    safety: Arc<dyn Classifier<Category = SafetyVerdict>>,
    urgency: Arc<dyn Classifier<Category = UrgencyLevel>>,
    intents: Arc<dyn Classifier<Category = ReplyIntent>>,
    settings: BrainSettings,
    locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl SchedulingBrain {
    pub fn new(config: &SlotwiseConfig, deps: BrainDeps) -> Self {
        let timeout = config.agent.store_timeout();
        let memory = Arc::new(ConversationMemory::new(
            deps.conversations,
            deps.clock.clone(),
            &config.memory,
        ));
        let slots = SlotFinder::new(deps.calendar.clone(), deps.clock.clone())
            .with_engine(RecurrenceEngine::new(config.recurrence.safety_cap_floor))
            .with_buffer_minutes(config.agent.buffer_minutes)
            .with_timeout(timeout);
        let handover = HandoverManager::new(
            deps.handover_store,
            deps.gateway,
            memory.clone(),
            deps.clock.clone(),
            &config.handover,
            timeout,
        );

        Self {
            detector: HandoverDetectionEngine::new(memory.clone()),
            memory,
            calendar: deps.calendar,
            slots,
            handover,
            clock: deps.clock,
            dates: DateParser::new(),
            times: TimeParser::new(),
            safety: Arc::new(SafetyFilter::new()),
            urgency: Arc::new(UrgencyClassifier::new()),
            intents: Arc::new(IntentClassifier::new()),
            settings: BrainSettings {
                default_duration_minutes: config.agent.default_duration_minutes,
                search_days_ahead: config.agent.search_days_ahead,
                decline_offset: TimeDelta::minutes(i64::from(config.agent.decline_offset_minutes)),
                auto_book: config.agent.auto_book,
                store_timeout: timeout,
                vip_customers: config.handover.vip_customers.iter().cloned().collect(),
            },
            locks: DashMap::new(),
        }
    }

    /// Replaces the confirm/decline classifier.
    pub fn with_intent_classifier(
        mut self,
        classifier: Arc<dyn Classifier<Category = ReplyIntent>>,
    ) -> Self {
        self.intents = classifier;
        self
    }

    /// Replaces the safety screen.
    pub fn with_safety_classifier(
        mut self,
        classifier: Arc<dyn Classifier<Category = SafetyVerdict>>,
    ) -> Self {
        self.safety = classifier;
        self
    }

    /// Replaces the urgency detector.
    pub fn with_urgency_classifier(
        mut self,
        classifier: Arc<dyn Classifier<Category = UrgencyLevel>>,
    ) -> Self {
        self.urgency = classifier;
        self
    }

    pub fn memory(&self) -> Arc<ConversationMemory> {
        self.memory.clone()
    }

    pub fn handover(&self) -> &HandoverManager {
        &self.handover
    }

    /// Decides the reply to one message. Never fails: internal errors become
    /// the fallback reply.
    pub async fn process(&self, request: &ProcessRequest) -> SchedulingDecision {
        self.respond(request, None).await.0
    }

    /// Gateway entry point: resolves VIP status, decides, and books the slot
    /// when the customer confirmed and auto-booking is on.
    pub async fn handle_inbound(&self, inbound: InboundMessage) -> InboundReply {
        let is_vip = inbound
            .customer_phone
            .as_ref()
            .is_some_and(|p| self.settings.vip_customers.contains(p));
        let request = ProcessRequest {
            message: inbound.message,
            conversation_id: inbound.conversation_id,
            client_id: inbound.client_id,
            default_duration_minutes: inbound
                .default_duration_minutes
                .unwrap_or(self.settings.default_duration_minutes),
            is_vip,
            customer_phone: inbound.customer_phone.clone(),
        };
        let contact = BookingContact {
            customer_phone: inbound.customer_phone,
            customer_name: inbound.customer_name,
        };
        let (decision, booking_id) = self.respond(&request, Some(contact)).await;
        InboundReply {
            reply: decision.reply,
            proposed_slot: decision.proposed_slot,
            should_book: decision.should_book,
            booking_id,
        }
    }

    /// Runs the pipeline under the conversation's lock, books if asked to,
    /// and records the reply in the transcript.
    async fn respond(
        &self,
        request: &ProcessRequest,
        contact: Option<BookingContact>,
    ) -> (SchedulingDecision, Option<String>) {
        let conversation_id = request.conversation_id.as_str();
        let lock = self
            .locks
            .entry(conversation_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock().await;

        let span = info_span!(
            "process",
            conversation_id,
            client_id = %request.client_id,
        );
        let (decision, booking_id) = async {
            let mut decision = self.decide(request).await;
            let mut booking_id = None;
            if let Some(contact) = contact
                && decision.should_book
                && self.settings.auto_book
                && let Some(slot) = decision.proposed_slot
            {
                match self.book(request, slot, contact).await {
                    Ok(id) => booking_id = Some(id),
                    Err(e) => {
                        error!(error = %e, step = "book", "booking failed");
                        self.memory.clear_booking(conversation_id);
                        decision = SchedulingDecision::reply(templates::fallback());
                    }
                }
            }
            (decision, booking_id)
        }
        .instrument(span)
        .await;

        self.memory.add_message(conversation_id, &decision.reply, Sender::Ai);

        drop(guard);
        drop(lock);
        self.locks
            .remove_if(conversation_id, |_, l| Arc::strong_count(l) == 1);
        (decision, booking_id)
    }

    async fn book(
        &self,
        request: &ProcessRequest,
        slot: NaiveDateTime,
        contact: BookingContact,
    ) -> Result<String, SlotwiseError> {
        let booking = NewBooking {
            client_id: request.client_id.clone(),
            start: slot,
            end: slot + TimeDelta::minutes(i64::from(request.default_duration_minutes)),
            recurrence: None,
            conversation_id: Some(request.conversation_id.clone()),
            customer_phone: contact.customer_phone,
            customer_name: contact.customer_name,
        };
        let row = bounded(self.settings.store_timeout, self.calendar.create_booking(booking)).await?;
        info!(booking_id = %row.id, %slot, "booking created");
        Ok(row.id)
    }

    async fn decide(&self, request: &ProcessRequest) -> SchedulingDecision {
        let conversation_id = request.conversation_id.as_str();
        debug!(message = %redact(&request.message), "inbound message");

        // 1. A human owns the conversation.
        match self.handover.is_active(conversation_id).await {
            Ok(active) if active || self.memory.is_silenced(conversation_id) => {
                self.memory
                    .add_message(conversation_id, &request.message, Sender::Customer);
                debug!(step = "handover", "conversation silenced");
                return SchedulingDecision::reply(templates::handover_silent());
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, step = "handover", "handover lookup failed");
                return SchedulingDecision::reply(templates::fallback());
            }
        }

        // 2. Safety runs before anything reads the message.
        let verdict = self.safety.classify(&request.message);
        if let Some(category) = verdict.refusal() {
            warn!(step = "safety", category = %category, "unsafe message deflected");
            // The transcript keeps a marker, never the text.
            self.memory.add_message(
                conversation_id,
                &format!("[withheld: {category}]"),
                Sender::Customer,
            );
            let handover = HandoverRequest {
                conversation_id: request.conversation_id.clone(),
                reason: format!("unsafe_content:{category}"),
                urgency: UNSAFE_URGENCY,
                customer: request.customer_phone.as_deref().map(mask_phone),
            };
            if let Err(e) = self.handover.trigger(handover).await {
                error!(error = %e, step = "safety", "forced handover failed");
            }
            return SchedulingDecision::reply(deflection_message(category).to_string());
        }

        // 3. Stale memory starts over.
        if self.memory.needs_reset(conversation_id) {
            self.memory.reset(conversation_id);
            self.memory
                .add_message(conversation_id, &request.message, Sender::Customer);
            return SchedulingDecision::reply(templates::memory_reset());
        }

        // 4. Loops.
        let check = self.memory.detect_loop(conversation_id, &request.message);
        if self.memory.needs_hard_reset(conversation_id) {
            self.memory.reset_loop(conversation_id);
            self.memory
                .add_message(conversation_id, &request.message, Sender::Customer);
            info!(step = "loop", loop_count = check.loop_count, "loop hard reset");
            return SchedulingDecision::reply(templates::loop_hard_reset());
        }
        if check.is_loop {
            self.memory
                .add_message(conversation_id, &request.message, Sender::Customer);
            return SchedulingDecision::reply(templates::loop_reset());
        }

        match self.decide_scheduling(request).await {
            Ok(decision) => decision,
            Err(e) => {
                error!(error = %e, client_id = %request.client_id, "scheduling failed");
                SchedulingDecision::reply(templates::fallback())
            }
        }
    }

    /// Steps 5 to 10.
    async fn decide_scheduling(
        &self,
        request: &ProcessRequest,
    ) -> Result<SchedulingDecision, SlotwiseError> {
        let conversation_id = request.conversation_id.as_str();
        let message = request.message.as_str();
        let now = self.clock.now();
        let today = now.date();

        // 5. Extraction.
        self.memory.touch(conversation_id);
        let date = self.dates.parse(message, today);
        let window = self.times.parse(message);
        let ambiguous = self.times.is_ambiguous(message);
        let urgency = self.urgency.classify(message);
        let update = self.memory.set_preferences(
            conversation_id,
            date,
            if ambiguous { None } else { window },
            urgency,
        );
        if update.contradiction {
            debug!(step = "extract", "customer changed the preferred date");
        }
        self.memory
            .add_message(conversation_id, message, Sender::Customer);
        debug!(step = "extract", ?date, ?window, %urgency, ambiguous, "extracted");

        // 6. Escalation.
        let detection = self
            .detector
            .detect(message, conversation_id, request.is_vip);
        if detection.should_escalate {
            let reason = detection
                .reason
                .map_or_else(|| "escalation".to_string(), |r| r.to_string());
            let urgency = detection
                .urgency_score
                .max(self.memory.urgency_score(conversation_id));
            self.handover
                .trigger(HandoverRequest {
                    conversation_id: request.conversation_id.clone(),
                    reason,
                    urgency,
                    customer: request.customer_phone.as_deref().map(mask_phone),
                })
                .await?;
            info!(
                step = "handover",
                urgency_score = urgency,
                detected = detection.urgency_score,
                "escalated to a human"
            );
            return Ok(SchedulingDecision::reply(templates::handover_escalated()));
        }

        let state = self.memory.get_or_create(conversation_id);
        let intent = self.intents.classify(message);

        // 7. Confirmation.
        if intent == ReplyIntent::Confirm
            && let Some(slot) = state.last_proposed_slot
        {
            if state.booked_slot == Some(slot) {
                return Ok(SchedulingDecision::reply(templates::already_booked(slot)));
            }
            self.memory.record_booking(conversation_id, slot);
            info!(step = "confirm", %slot, "slot confirmed");
            return Ok(SchedulingDecision {
                reply: templates::confirm_booking(slot),
                proposed_slot: Some(slot),
                should_book: true,
            });
        }

        // 8. Decline.
        if intent == ReplyIntent::Decline
            && let Some(declined) = state.last_proposed_slot
        {
            let declines = self.memory.decline_slot(conversation_id, declined);
            let (from, not_before) = match date {
                Some(d) if d != declined.date() => (d, now),
                _ => (declined.date(), declined + self.settings.decline_offset),
            };
            let query = SlotQuery::new(&request.client_id, request.default_duration_minutes)
                .on(from)
                .within(state.preferred_time_window)
                .days(self.settings.search_days_ahead)
                .not_before(not_before.max(now));
            debug!(step = "decline", declines, %declined, "searching after decline");
            return Ok(match self.slots.find_earliest_slot(&query).await? {
                Some(slot) => self.propose(conversation_id, slot, templates::offer_next_slot(slot)),
                None => SchedulingDecision::reply(templates::no_availability()),
            });
        }

        // 9. Clarification.
        if let Some(w) = window
            && w.is_too_broad()
        {
            return Ok(self.ask(conversation_id, templates::ask_for_time_in_range(&w)));
        }
        if ambiguous {
            return Ok(self.ask(conversation_id, templates::ask_for_specific_time()));
        }
        if window.is_some() && date.is_none() {
            return Ok(self.ask(conversation_id, templates::ask_for_date()));
        }

        // 10. Dispatch on what this message contained.
        let duration = request.default_duration_minutes;
        let client_id = request.client_id.as_str();
        if urgency >= UrgencyLevel::Medium {
            return self.urgent(conversation_id, client_id, duration, window, today).await;
        }
        match (date, window) {
            (Some(date), None) => self.date_only(conversation_id, client_id, duration, date).await,
            (Some(date), Some(window)) => {
                self.date_and_time(conversation_id, client_id, duration, date, window)
                    .await
            }
            (None, Some(_)) => Ok(self.ask(conversation_id, templates::ask_for_date())),
            (None, None) if state.last_proposed_slot.is_none() => {
                let query = SlotQuery::new(client_id, duration)
                    .on(today)
                    .days(self.settings.search_days_ahead);
                Ok(match self.slots.find_earliest_slot(&query).await? {
                    Some(slot) => self.propose(conversation_id, slot, templates::offer_slot(slot)),
                    None => SchedulingDecision::reply(templates::no_availability()),
                })
            }
            (None, None) => Ok(SchedulingDecision::reply(templates::clarify())),
        }
    }

    async fn urgent(
        &self,
        conversation_id: &str,
        client_id: &str,
        duration: u32,
        window: Option<TimeWindow>,
        today: NaiveDate,
    ) -> Result<SchedulingDecision, SlotwiseError> {
        for date in [today, today + TimeDelta::days(1)] {
            let query = SlotQuery::new(client_id, duration)
                .on(date)
                .within(window)
                .days(1);
            if let Some(slot) = self.slots.find_earliest_slot(&query).await? {
                debug!(step = "dispatch", path = "urgent", %slot, "slot found");
                return Ok(self.propose(conversation_id, slot, templates::offer_slot(slot)));
            }
        }
        Ok(SchedulingDecision::reply(templates::no_urgent_availability()))
    }

    async fn date_only(
        &self,
        conversation_id: &str,
        client_id: &str,
        duration: u32,
        date: NaiveDate,
    ) -> Result<SchedulingDecision, SlotwiseError> {
        if self.slots.is_day_closed(client_id, date).await? {
            let next = self
                .slots
                .find_next_open_day(client_id, date, FALLBACK_SEARCH_DAYS)
                .await?;
            return Ok(SchedulingDecision::reply(templates::day_closed(date, next)));
        }
        let same_day = SlotQuery::new(client_id, duration).on(date).days(1);
        if let Some(slot) = self.slots.find_earliest_slot(&same_day).await? {
            return Ok(self.propose(conversation_id, slot, templates::offer_slot(slot)));
        }
        self.fallback_search(conversation_id, client_id, duration, date)
            .await
    }

    async fn date_and_time(
        &self,
        conversation_id: &str,
        client_id: &str,
        duration: u32,
        date: NaiveDate,
        window: TimeWindow,
    ) -> Result<SchedulingDecision, SlotwiseError> {
        let exact = SlotQuery::new(client_id, duration)
            .on(date)
            .within(Some(window))
            .days(1);
        if let Some(slot) = self.slots.find_earliest_slot(&exact).await? {
            return Ok(self.propose(conversation_id, slot, templates::offer_slot(slot)));
        }
        self.fallback_search(conversation_id, client_id, duration, date)
            .await
    }

    /// Two-week search from `date` without a time restriction.
    async fn fallback_search(
        &self,
        conversation_id: &str,
        client_id: &str,
        duration: u32,
        date: NaiveDate,
    ) -> Result<SchedulingDecision, SlotwiseError> {
        let wide = SlotQuery::new(client_id, duration)
            .on(date)
            .days(FALLBACK_SEARCH_DAYS);
        Ok(match self.slots.find_earliest_slot(&wide).await? {
            Some(slot) => self.propose(
                conversation_id,
                slot,
                templates::offer_alternative(date, slot),
            ),
            None => SchedulingDecision::reply(templates::no_availability()),
        })
    }

    fn propose(&self, conversation_id: &str, slot: NaiveDateTime, reply: String) -> SchedulingDecision {
        self.memory.propose_slot(conversation_id, slot);
        info!(step = "propose", %slot, "slot proposed");
        SchedulingDecision::offer(reply, slot)
    }

    fn ask(&self, conversation_id: &str, question: String) -> SchedulingDecision {
        self.memory.add_question(conversation_id, &question);
        SchedulingDecision::reply(question)
    }
}
