//! CLI channel — renders the chat widget on stdout and reads answers from stdin.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Mutex;

use crate::intake::presentation::Presentation;
use crate::intake::prompts::{self, controls};

/// A line typed at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text for the current step.
    Text(String),
    /// Press the skip control.
    Skip,
    /// Click a service-category button.
    Service(String),
    /// Print the conversation status.
    Status,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "/skip" => Command::Skip,
            "/status" => Command::Status,
            "/quit" | "/exit" => Command::Quit,
            _ => match lower.strip_prefix("/service ") {
                Some(id) => Command::Service(id.trim().to_string()),
                None => Command::Text(trimmed.to_string()),
            },
        }
    }
}

#[derive(Default)]
struct Screen {
    texts: HashMap<String, String>,
    shown: HashSet<String>,
    input_enabled: bool,
    skip_visible: bool,
}

/// Terminal rendition of the chat widget.
///
/// Showing a message prints it once; updating its text lets it print again.
#[derive(Default)]
pub struct CliPresentation {
    screen: Mutex<Screen>,
}

impl CliPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the input box currently accepts text.
    pub fn input_enabled(&self) -> bool {
        self.screen.lock().unwrap_or_else(|e| e.into_inner()).input_enabled
    }

    pub fn skip_visible(&self) -> bool {
        self.screen.lock().unwrap_or_else(|e| e.into_inner()).skip_visible
    }

    fn print_prompt(screen: &Screen) {
        if screen.skip_visible {
            eprint!("(/skip) > ");
        } else {
            eprint!("> ");
        }
    }
}

impl Presentation for CliPresentation {
    fn has_element(&self, id: &str) -> bool {
        controls::REQUIRED.contains(&id) || prompts::default_text(id).is_some()
    }

    fn show_message(&self, id: &str) {
        let mut screen = self.screen.lock().unwrap_or_else(|e| e.into_inner());
        if !screen.shown.insert(id.to_string()) {
            return;
        }

        let text = screen
            .texts
            .get(id)
            .map(String::as_str)
            .or_else(|| prompts::default_text(id));
        let Some(text) = text else {
            tracing::debug!(element = %id, "No text for message");
            return;
        };

        if id.starts_with("user-") {
            println!("\n  you: {}", text);
        } else {
            println!("\n  bot: {}", text);
        }
        Self::print_prompt(&screen);
    }

    fn hide_message(&self, id: &str) {
        let mut screen = self.screen.lock().unwrap_or_else(|e| e.into_inner());
        screen.shown.remove(id);
    }

    fn set_message_text(&self, id: &str, text: &str) {
        let mut screen = self.screen.lock().unwrap_or_else(|e| e.into_inner());
        screen.texts.insert(id.to_string(), text.to_string());
        screen.shown.remove(id);
    }

    fn clear_input(&self) {}

    fn set_input_enabled(&self, enabled: bool) {
        let mut screen = self.screen.lock().unwrap_or_else(|e| e.into_inner());
        screen.input_enabled = enabled;
    }

    fn set_skip_visible(&self, visible: bool) {
        let mut screen = self.screen.lock().unwrap_or_else(|e| e.into_inner());
        screen.skip_visible = visible;
    }

    fn scroll_to_bottom(&self) {
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!("Failed to flush stdout: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::prompts::ids;

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("/skip"), Command::Skip);
        assert_eq!(Command::parse("  /SKIP "), Command::Skip);
        assert_eq!(Command::parse("/status"), Command::Status);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(
            Command::parse("/service ai-consulting"),
            Command::Service("ai-consulting".to_string())
        );
        assert_eq!(
            Command::parse(" Ada Lovelace "),
            Command::Text("Ada Lovelace".to_string())
        );
    }

    #[test]
    fn presentation_knows_widget_elements() {
        let p = CliPresentation::new();
        for id in controls::REQUIRED {
            assert!(p.has_element(id));
        }
        assert!(p.has_element(ids::ASK_NAME));
        assert!(!p.has_element("newsletter-signup"));
    }

    #[test]
    fn show_is_idempotent_until_text_changes() {
        let p = CliPresentation::new();
        p.show_message(ids::ASK_NAME);
        assert!(p.screen.lock().unwrap().shown.contains(ids::ASK_NAME));

        p.set_message_text(ids::EMAIL_INVALID, "try again");
        assert!(!p.screen.lock().unwrap().shown.contains(ids::EMAIL_INVALID));
        p.show_message(ids::EMAIL_INVALID);
        assert!(p.screen.lock().unwrap().shown.contains(ids::EMAIL_INVALID));
    }

    #[test]
    fn tracks_control_state() {
        let p = CliPresentation::new();
        p.set_input_enabled(true);
        p.set_skip_visible(true);
        assert!(p.input_enabled());
        assert!(p.skip_visible());
        p.set_skip_visible(false);
        assert!(!p.skip_visible());
    }
}
