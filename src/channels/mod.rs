//! Front-ends that host the chat widget.

pub mod cli;

pub use cli::{CliPresentation, Command};
