//! ConversationController — drives the intake conversation step by step and
//! submits the answers once it completes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::config::ConversationConfig;
use crate::scheduler::Scheduler;
use crate::sink::SubmissionSink;

use super::model::{AnswerSet, Field, ServiceCategory};
use super::presentation::{Presentation, reveal};
use super::prompts::{self, controls, ids};
use super::state::{ConversationState, Step, StepTable, Validator};
use super::validate::{is_valid_email, is_valid_phone};

/// Collaborators injected into a controller.
#[derive(Clone)]
pub struct ControllerDeps {
    pub presentation: Arc<dyn Presentation>,
    pub sink: Arc<dyn SubmissionSink>,
    pub scheduler: Arc<dyn Scheduler>,
}

/// Outcome of a step's process function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Processed {
    Accepted,
    Rejected,
}

/// Diagnostic snapshot of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationStatus {
    pub conversation_id: Uuid,
    pub step: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_field: Option<Field>,
    pub started: bool,
    pub complete: bool,
    pub submitted: bool,
    pub answers: AnswerSet,
}

/// Drives one conversation from greeting to submission.
///
/// All operations take `&mut self`; the only work that outlives a call is the
/// delayed reveals handed to the scheduler and the detached submission.
pub struct ConversationController {
    id: Uuid,
    config: ConversationConfig,
    table: StepTable,
    state: ConversationState,
    answers: AnswerSet,
    /// Closing text set by a skip action, used instead of the default.
    closing: Option<String>,
    deps: ControllerDeps,
}

impl ConversationController {
    pub fn new(config: ConversationConfig, deps: ControllerDeps) -> Self {
        let table = StepTable::standard(config.offer_services);
        Self {
            id: Uuid::new_v4(),
            config,
            table,
            state: ConversationState::default(),
            answers: AnswerSet::default(),
            closing: None,
            deps,
        }
    }

    /// Build a controller only if the widget's controls are present.
    ///
    /// Returns `None` when any required element is missing: the widget is
    /// simply not on this page.
    pub fn mount(config: ConversationConfig, deps: ControllerDeps) -> Option<Self> {
        if let Some(missing) = controls::REQUIRED
            .iter()
            .find(|id| !deps.presentation.has_element(id))
        {
            tracing::debug!(element = %missing, "Chat widget not present, skipping setup");
            return None;
        }
        Some(Self::new(config, deps))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step_index(&self) -> usize {
        self.state.step
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.table.get(self.state.step)
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn is_started(&self) -> bool {
        self.state.started
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete(self.table.len())
    }

    pub fn status(&self) -> ConversationStatus {
        ConversationStatus {
            conversation_id: self.id,
            step: self.state.step,
            current_field: self.current_step().map(|s| s.field),
            started: self.state.started,
            complete: self.is_complete(),
            submitted: self.state.submitted,
            answers: self.answers.clone(),
        }
    }

    /// Begin the conversation. Triggered by the input gaining focus or being
    /// clicked; later calls do nothing.
    pub fn start(&mut self) {
        if self.state.started {
            return;
        }
        self.state.started = true;
        tracing::info!(conversation = %self.id, "Conversation started");

        self.enter_step(Duration::ZERO);
    }

    /// Handle text sent from the input box.
    pub fn submit_input(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || !self.state.started {
            return;
        }
        let Some(step) = self.current_step().copied() else {
            return;
        };
        if !step.consumes_text() {
            tracing::debug!(conversation = %self.id, step = %step.field, "Ignoring text while waiting for a button");
            return;
        }

        match self.process(&step, text) {
            Processed::Accepted => {
                self.deps.presentation.clear_input();
                let next = self.table.next_after(self.state.step);
                if self.move_to(next) {
                    self.enter_step(self.config.step_delay);
                }
            }
            Processed::Rejected => {
                tracing::debug!(conversation = %self.id, step = %step.field, "Answer rejected");
            }
        }
    }

    /// Handle a click on a service-category button.
    pub fn select_category(&mut self, category_id: &str) {
        if !self.state.started {
            return;
        }
        let Some(step) = self.current_step().copied() else {
            return;
        };
        if step.consumes_text() {
            tracing::debug!(conversation = %self.id, step = %step.field, "Ignoring category outside the branch step");
            return;
        }
        let Some(category) = ServiceCategory::lookup(category_id) else {
            tracing::warn!(conversation = %self.id, category = %category_id, "Unknown service category");
            return;
        };

        self.answers.record(step.field, category.label);
        tracing::info!(conversation = %self.id, service = %category.label, "Service selected");

        let p = self.deps.presentation.as_ref();
        p.hide_message(ids::SERVICE_OPTIONS);
        p.set_message_text(prompts::echo_id(step.field), category.label);
        reveal(p, prompts::echo_id(step.field));
        p.set_message_text(ids::SERVICE_RESPONSE, category.response);
        self.reveal_later(self.config.step_delay, ids::SERVICE_RESPONSE);

        let next = self.state.step + 1;
        if self.move_to(next) {
            self.enter_step(self.config.step_delay * 2);
        }
    }

    /// Handle a click on the skip control.
    pub fn skip(&mut self) {
        if !self.state.started {
            return;
        }
        let Some(step) = self.current_step().copied() else {
            return;
        };
        if !step.skippable {
            return;
        }

        let p = self.deps.presentation.as_ref();
        if let Some(id) = prompts::skipped_id(step.field) {
            reveal(p, id);
        }
        self.deps.presentation.clear_input();
        self.on_skip(&step);
        tracing::info!(conversation = %self.id, step = %step.field, "Step skipped");

        let next = self.table.next_after(self.state.step);
        if self.move_to(next) {
            self.enter_step(self.config.step_delay);
        }
    }

    /// Validate and record an answer for a text step.
    fn process(&mut self, step: &Step, text: &str) -> Processed {
        let p = Arc::clone(&self.deps.presentation);

        let valid = match step.validator {
            Some(Validator::Email) => is_valid_email(text),
            Some(Validator::Phone) => is_valid_phone(text),
            None => true,
        };

        if !valid {
            if let Some((id, message)) = prompts::invalid_message(step.field) {
                p.set_message_text(id, message);
                reveal(p.as_ref(), id);
            }
            return Processed::Rejected;
        }

        if let Some((id, _)) = prompts::invalid_message(step.field) {
            p.hide_message(id);
        }

        if !self.answers.record(step.field, text) {
            tracing::warn!(conversation = %self.id, field = %step.field, "Field already recorded, keeping first answer");
        }

        let echo = prompts::echo_id(step.field);
        p.set_message_text(echo, text);
        reveal(p.as_ref(), echo);

        if step.field == Field::Name {
            p.set_message_text(ids::NAME_ACK, &prompts::name_ack_text(text));
            self.reveal_later(self.config.step_delay / 2, ids::NAME_ACK);
        }

        Processed::Accepted
    }

    /// A step's skip action: acknowledge, and pre-fill the closing message
    /// when skipping the last step.
    fn on_skip(&mut self, step: &Step) {
        if self.table.next_after(self.state.step) >= self.table.len() {
            self.closing = Some(prompts::closing_after_skip_text(&self.answers));
        }

        let p = self.deps.presentation.as_ref();
        p.set_message_text(ids::SKIP_ACK, prompts::skip_ack_text(step.field));
        self.reveal_later(self.config.step_delay / 2, ids::SKIP_ACK);
    }

    /// Advance to `next`. Returns true when a further step awaits, false when
    /// the conversation has just completed (or the move was refused).
    fn move_to(&mut self, next: usize) -> bool {
        let terminal = self.table.len();
        if let Err(e) = self.state.advance_to(next, terminal) {
            tracing::warn!(conversation = %self.id, "Failed to advance conversation: {}", e);
            return false;
        }

        if self.state.is_complete(terminal) {
            self.complete();
            return false;
        }
        true
    }

    /// Show the current step's prompt after `lead`, and set controls for it.
    fn enter_step(&self, lead: Duration) {
        let Some(step) = self.current_step().copied() else {
            return;
        };
        tracing::debug!(conversation = %self.id, step = %step.field, index = self.state.step, "Entering step");

        for message in prompts::prompt_for(step.field) {
            self.reveal_later(lead + message.delay, message.id);
        }

        let p = self.deps.presentation.as_ref();
        p.set_skip_visible(step.skippable);
        p.set_input_enabled(step.consumes_text());
    }

    /// Terminal state: lock the widget, say goodbye, submit.
    fn complete(&mut self) {
        tracing::info!(conversation = %self.id, "Conversation complete");
        let p = self.deps.presentation.as_ref();
        p.set_input_enabled(false);
        p.set_skip_visible(false);
        let closing = self
            .closing
            .get_or_insert_with(|| prompts::closing_text(&self.answers));
        p.set_message_text(ids::CLOSING, closing);
        self.reveal_later(self.config.step_delay, ids::CLOSING);

        self.submit();
    }

    /// Post the answers, at most once per conversation.
    fn submit(&mut self) {
        if self.state.submitted {
            return;
        }
        self.state.submitted = true;

        let email = self.answers.get(Field::Email).unwrap_or_default();
        if !is_valid_email(email) {
            tracing::warn!(conversation = %self.id, "Recorded email failed re-validation, not submitting");
            return;
        }

        let fields = self.answers.to_form_fields(self.table.buttons_enabled());
        let sink = Arc::clone(&self.deps.sink);
        let conversation = self.id;

        self.deps.scheduler.spawn(Box::pin(async move {
            match sink.send(&fields).await {
                Ok(reply) => {
                    tracing::info!(%conversation, sink = sink.name(), reply = %reply, "Submission delivered");
                }
                Err(e) => {
                    tracing::error!(%conversation, sink = sink.name(), "Submission failed: {}", e);
                }
            }
        }));
    }

    fn reveal_later(&self, delay: Duration, id: &'static str) {
        let presentation = Arc::clone(&self.deps.presentation);
        self.deps
            .scheduler
            .schedule(delay, Box::new(move || reveal(presentation.as_ref(), id)));
    }
}
