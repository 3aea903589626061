//! Message identifiers and texts for each step of the conversation.
//!
//! The presentation layer owns the message elements; the controller only
//! refers to them by id and occasionally fills in dynamic text.

use std::sync::LazyLock;
use std::time::Duration;

use super::model::{AnswerSet, Field, SERVICE_CATALOG};

/// Ids of the widget controls the controller needs.
pub mod controls {
    pub const INPUT: &str = "chat-input";
    pub const SEND: &str = "chat-send";
    pub const SKIP: &str = "chat-skip";
    pub const CONTAINER: &str = "chat-messages";

    /// Elements that must exist for the widget to mount.
    pub const REQUIRED: [&str; 4] = [INPUT, SEND, SKIP, CONTAINER];
}

/// Ids of the message elements.
pub mod ids {
    pub const GREETING: &str = "bot-greeting";
    pub const ASK_NAME: &str = "bot-ask-name";
    pub const NAME_ACK: &str = "bot-name-ack";
    pub const ASK_SERVICE: &str = "bot-ask-service";
    pub const SERVICE_OPTIONS: &str = "service-options";
    pub const SERVICE_RESPONSE: &str = "bot-service-response";
    pub const ASK_EMAIL: &str = "bot-ask-email";
    pub const EMAIL_INVALID: &str = "bot-email-invalid";
    pub const ASK_PHONE: &str = "bot-ask-phone";
    pub const PHONE_INVALID: &str = "bot-phone-invalid";
    pub const ASK_WORKPLACE: &str = "bot-ask-workplace";
    pub const ASK_ROLE: &str = "bot-ask-role";
    pub const SKIP_ACK: &str = "bot-skip-ack";
    pub const CLOSING: &str = "bot-closing";

    pub const USER_NAME: &str = "user-name";
    pub const USER_SERVICE: &str = "user-service";
    pub const USER_EMAIL: &str = "user-email";
    pub const USER_PHONE: &str = "user-phone";
    pub const USER_WORKPLACE: &str = "user-workplace";
    pub const USER_ROLE: &str = "user-role";

    pub const PHONE_SKIPPED: &str = "user-phone-skipped";
    pub const WORKPLACE_SKIPPED: &str = "user-workplace-skipped";
    pub const ROLE_SKIPPED: &str = "user-role-skipped";
}

/// A message to reveal `delay` after the prompt begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMessage {
    pub delay: Duration,
    pub id: &'static str,
}

impl TimedMessage {
    const fn at(delay_ms: u64, id: &'static str) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            id,
        }
    }
}

/// Gap between consecutive bot bubbles within one prompt.
const BUBBLE_GAP_MS: u64 = 500;

/// Messages making up a step's prompt, in display order.
pub fn prompt_for(field: Field) -> Vec<TimedMessage> {
    match field {
        Field::Name => vec![
            TimedMessage::at(0, ids::GREETING),
            TimedMessage::at(BUBBLE_GAP_MS, ids::ASK_NAME),
        ],
        Field::Service => vec![
            TimedMessage::at(0, ids::ASK_SERVICE),
            TimedMessage::at(BUBBLE_GAP_MS, ids::SERVICE_OPTIONS),
        ],
        Field::Email => vec![TimedMessage::at(0, ids::ASK_EMAIL)],
        Field::Phone => vec![TimedMessage::at(0, ids::ASK_PHONE)],
        Field::Workplace => vec![TimedMessage::at(0, ids::ASK_WORKPLACE)],
        Field::Role => vec![TimedMessage::at(0, ids::ASK_ROLE)],
    }
}

/// Element echoing the visitor's own answer.
pub fn echo_id(field: Field) -> &'static str {
    match field {
        Field::Name => ids::USER_NAME,
        Field::Service => ids::USER_SERVICE,
        Field::Email => ids::USER_EMAIL,
        Field::Phone => ids::USER_PHONE,
        Field::Workplace => ids::USER_WORKPLACE,
        Field::Role => ids::USER_ROLE,
    }
}

/// Inline validation message for a rejected answer.
pub fn invalid_message(field: Field) -> Option<(&'static str, &'static str)> {
    match field {
        Field::Email => Some((
            ids::EMAIL_INVALID,
            "Hmm, that email doesn't look quite right. Could you double-check it?",
        )),
        Field::Phone => Some((
            ids::PHONE_INVALID,
            "That number seems short. Please include the area code (at least 10 digits).",
        )),
        _ => None,
    }
}

/// Visitor-side "skipped" bubble for a skippable step.
pub fn skipped_id(field: Field) -> Option<&'static str> {
    match field {
        Field::Phone => Some(ids::PHONE_SKIPPED),
        Field::Workplace => Some(ids::WORKPLACE_SKIPPED),
        Field::Role => Some(ids::ROLE_SKIPPED),
        _ => None,
    }
}

/// Bot reply to a skip.
pub fn skip_ack_text(field: Field) -> &'static str {
    match field {
        Field::Phone => "No problem, email works just fine.",
        Field::Workplace => "All good, we can cover that later.",
        _ => "Sure thing.",
    }
}

/// First word of the visitor's name, used to personalise replies.
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

pub fn name_ack_text(name: &str) -> String {
    format!("Nice to meet you, {}!", first_name(name))
}

/// Closing message shown once every step is done.
pub fn closing_text(answers: &AnswerSet) -> String {
    match answers.get(Field::Name) {
        Some(name) => format!(
            "Thanks, {}! We've got everything we need and will be in touch within one business day.",
            first_name(name)
        ),
        None => {
            "Thanks! We've got everything we need and will be in touch within one business day."
                .to_string()
        }
    }
}

/// Closing message pre-filled when the visitor skips the last step.
pub fn closing_after_skip_text(answers: &AnswerSet) -> String {
    match answers.get(Field::Name) {
        Some(name) => format!(
            "No worries, {}. We have what we need and will be in touch within one business day.",
            first_name(name)
        ),
        None => "No worries. We have what we need and will be in touch within one business day."
            .to_string(),
    }
}

/// One `[id] Label` button per catalog entry.
static SERVICE_OPTIONS_TEXT: LazyLock<String> = LazyLock::new(|| {
    SERVICE_CATALOG
        .iter()
        .map(|category| format!("[{}] {}", category.id, category.label))
        .collect::<Vec<_>>()
        .join("  ")
});

/// Default text of every message element, for presentations that render
/// from scratch instead of toggling pre-authored markup.
pub fn default_text(id: &str) -> Option<&'static str> {
    let text = match id {
        ids::GREETING => "Hi there! Thanks for stopping by.",
        ids::ASK_NAME => "What's your name?",
        ids::ASK_SERVICE => "What can we help you with?",
        ids::SERVICE_OPTIONS => SERVICE_OPTIONS_TEXT.as_str(),
        ids::ASK_EMAIL => "What's the best email to reach you at?",
        ids::ASK_PHONE => "And a phone number? (optional)",
        ids::ASK_WORKPLACE => "Where do you work? (optional)",
        ids::ASK_ROLE => "Last one: what's your role there? (optional)",
        ids::PHONE_SKIPPED | ids::WORKPLACE_SKIPPED | ids::ROLE_SKIPPED => "Skip",
        _ => return None,
    };
    Some(text)
}
