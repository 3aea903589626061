//! Intake conversation — the scripted chat that collects contact details.
//!
//! The controller walks a fixed table of steps (name, service, email, phone,
//! workplace, role), validating email and phone, letting the later steps be
//! skipped, and posts the answers to a form-intake endpoint once finished.

pub mod controller;
pub mod model;
pub mod presentation;
pub mod prompts;
pub mod state;
pub mod validate;

pub use controller::{ControllerDeps, ConversationController, ConversationStatus};
pub use model::{AnswerSet, Field, FormFields, SERVICE_CATALOG, ServiceCategory};
pub use presentation::Presentation;
pub use state::{ConversationState, InputMode, Step, StepTable, Validator};
pub use validate::{is_valid_email, is_valid_phone};
