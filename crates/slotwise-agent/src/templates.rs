// SPDX-FileCopyrightText: 2026 Slotwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer-facing reply wording.
//!
//! Every string a customer can receive comes from this module. The wording
//! is fixed: no randomization, no locale switching.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use slotwise_core::types::TimeWindow;

/// "Monday, Oct 19 at 11:00 AM"
pub fn format_slot(slot: NaiveDateTime) -> String {
    slot.format("%A, %b %-d at %-I:%M %p").to_string()
}

/// "Monday, Oct 19"
pub fn format_day(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

/// "2:30 PM"
pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn offer_slot(slot: NaiveDateTime) -> String {
    format!(
        "I have {} available. Would you like me to book it?",
        format_slot(slot)
    )
}

pub fn offer_next_slot(slot: NaiveDateTime) -> String {
    format!(
        "No problem. The next available time is {}. Does that work for you?",
        format_slot(slot)
    )
}

pub fn offer_alternative(requested: NaiveDate, slot: NaiveDateTime) -> String {
    format!(
        "{} is fully booked, but I have {} available. Would that work for you?",
        format_day(requested),
        format_slot(slot)
    )
}

pub fn confirm_booking(slot: NaiveDateTime) -> String {
    format!("You're booked for {}. See you then!", format_slot(slot))
}

pub fn already_booked(slot: NaiveDateTime) -> String {
    format!(
        "You're already booked for {}. Let us know if you need to change it.",
        format_slot(slot)
    )
}

pub fn ask_for_date() -> String {
    "What day works best for you?".to_string()
}

pub fn ask_for_time_in_range(window: &TimeWindow) -> String {
    format!(
        "Which time in that range works best for you? I can look anywhere between {} and {}.",
        format_time(window.start()),
        format_time(window.end())
    )
}

pub fn ask_for_specific_time() -> String {
    "Could you give me a specific time? For example, 10am or 2:30pm.".to_string()
}

pub fn loop_reset() -> String {
    "Sorry, I think we're going in circles. Could you tell me the day and time you'd like, for example \"Thursday at 2pm\"?".to_string()
}

pub fn loop_hard_reset() -> String {
    "Let's start fresh. Tell me any day and time that suits you and I'll find the closest opening, or reply \"earliest\" for the first available slot.".to_string()
}

pub fn memory_reset() -> String {
    "Welcome back! It's been a while, so let's start fresh. What day and time would you like to book?".to_string()
}

pub fn handover_silent() -> String {
    "Thanks, a member of our team has your message and will reply shortly.".to_string()
}

pub fn handover_escalated() -> String {
    "I'm passing you to a member of our team, who will be in touch shortly.".to_string()
}

pub fn no_availability() -> String {
    "Sorry, I couldn't find any openings in the next two weeks. Would you like to try a different day or time?".to_string()
}

pub fn no_urgent_availability() -> String {
    "Sorry, we don't have anything free today or tomorrow. Would you like the next available time instead?".to_string()
}

pub fn day_closed(date: NaiveDate, next_open: Option<NaiveDate>) -> String {
    let closed = date.format("%A");
    match next_open {
        Some(next) => format!(
            "Sorry, we're closed on {closed}. The next day we're open is {}. Would that work?",
            format_day(next)
        ),
        None => format!("Sorry, we're closed on {closed}. Which other day works for you?"),
    }
}

pub fn clarify() -> String {
    "I'd be happy to help you book. What day and time would suit you?".to_string()
}

pub fn fallback() -> String {
    "Sorry, I'm having trouble checking the calendar right now. A member of our team will follow up with you shortly.".to_string()
}

/// Message sent to the business owner when a conversation needs a human.
pub fn handover_notification(
    level: &str,
    conversation_id: &str,
    urgency_score: u8,
    reason: &str,
    customer: Option<&str>,
) -> String {
    format!(
        "[{}] Conversation {conversation_id} needs a human (urgency {urgency_score}/10): {reason}. Customer: {}.",
        level.to_uppercase(),
        customer.unwrap_or("unknown")
    )
}
