//! Step table and conversation state machine.

use super::model::Field;

/// How a step receives its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Free text from the input box.
    Text,
    /// A button click carrying a category id.
    Buttons,
}

/// Format check applied before a text answer is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Email,
    Phone,
}

/// One stage of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The answer this step records.
    pub field: Field,
    pub input: InputMode,
    pub validator: Option<Validator>,
    pub skippable: bool,
}

impl Step {
    const fn text(field: Field) -> Self {
        Self {
            field,
            input: InputMode::Text,
            validator: None,
            skippable: false,
        }
    }

    const fn validated(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    const fn optional(mut self) -> Self {
        self.skippable = true;
        self
    }

    pub fn consumes_text(&self) -> bool {
        self.input == InputMode::Text
    }
}

/// The fixed conversation: name, service branch, email, phone, workplace, role.
pub const STEPS: [Step; 6] = [
    Step::text(Field::Name),
    Step {
        field: Field::Service,
        input: InputMode::Buttons,
        validator: None,
        skippable: false,
    },
    Step::text(Field::Email).validated(Validator::Email),
    Step::text(Field::Phone).validated(Validator::Phone).optional(),
    Step::text(Field::Workplace).optional(),
    Step::text(Field::Role).optional(),
];

/// Ordered steps plus whether button-driven steps can be answered.
#[derive(Debug, Clone)]
pub struct StepTable {
    steps: Vec<Step>,
    buttons_enabled: bool,
}

impl StepTable {
    pub fn new(steps: Vec<Step>, buttons_enabled: bool) -> Self {
        Self {
            steps,
            buttons_enabled,
        }
    }

    /// The standard intake conversation.
    pub fn standard(offer_services: bool) -> Self {
        Self::new(STEPS.to_vec(), offer_services)
    }

    /// Number of steps; also the index of the terminal state.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn buttons_enabled(&self) -> bool {
        self.buttons_enabled
    }

    /// Index of the step holding `field`, if any.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.steps.iter().position(|s| s.field == field)
    }

    /// Index reached by advancing from `index`.
    ///
    /// Moves one position, plus one more for each button-driven step that
    /// cannot be answered because buttons are disabled. Never exceeds `len()`.
    pub fn next_after(&self, index: usize) -> usize {
        let mut next = (index + 1).min(self.len());
        while let Some(step) = self.steps.get(next) {
            if step.consumes_text() || self.buttons_enabled {
                break;
            }
            next += 1;
        }
        next
    }
}

/// Mutable conversation state: position plus lifecycle flags.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Current step index; equals the table length once complete.
    pub step: usize,
    /// Set on the first `start()`.
    pub started: bool,
    /// Set when the submission has been dispatched (or aborted).
    pub submitted: bool,
}

impl ConversationState {
    /// Move forward to `target`. Rejects anything that is not strictly ahead
    /// or lies past the terminal index.
    pub fn advance_to(&mut self, target: usize, terminal: usize) -> Result<usize, String> {
        if target <= self.step {
            return Err(format!(
                "Cannot move from step {} back to step {}",
                self.step, target
            ));
        }
        if target > terminal {
            return Err(format!(
                "Step {} is past the terminal step {}",
                target, terminal
            ));
        }
        self.step = target;
        Ok(target)
    }

    pub fn is_complete(&self, terminal: usize) -> bool {
        self.step >= terminal
    }
}
