//! Presentation seam — the widget the controller drives.

/// The chat widget as seen by the controller.
///
/// Implementations own the actual rendering: DOM elements, a terminal, or a
/// recording double in tests. Every method must be idempotent so reordered
/// or repeated delayed reveals are harmless.
pub trait Presentation: Send + Sync {
    /// Whether an element with this id exists.
    fn has_element(&self, _id: &str) -> bool {
        true
    }

    fn show_message(&self, id: &str);

    fn hide_message(&self, id: &str);

    fn set_message_text(&self, id: &str, text: &str);

    fn clear_input(&self);

    fn set_input_enabled(&self, enabled: bool);

    fn set_skip_visible(&self, visible: bool);

    /// Scroll the message container to its end.
    fn scroll_to_bottom(&self);
}

/// Show a message and keep it in view.
pub fn reveal(presentation: &dyn Presentation, id: &str) {
    presentation.show_message(id);
    presentation.scroll_to_bottom();
}
