//! Intake Chat — scripted contact-intake conversation.

pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
pub mod scheduler;
pub mod sink;
