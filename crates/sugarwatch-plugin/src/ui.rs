//! Host UI contract
//!
//! Plugins never touch the host's element storage directly. They go through
//! [`Ui`], which owns the elements and hands out a lock to keep removals from
//! interleaving with a render.

use std::sync::MutexGuard;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UiError {
    #[error("Element already registered: {0}")]
    DuplicateElement(String),

    #[error("No such element: {0}")]
    MissingElement(String),

    #[error("UI state lock poisoned")]
    LockPoisoned,
}

/// Key of the host-owned status line
pub const STATUS_KEY: &str = "status";

/// Held while removing elements; blocks renders until dropped
pub type UiGuard<'a> = MutexGuard<'a, ()>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Black,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Font {
    Bold,
    #[default]
    Medium,
}

/// A `label value` pair drawn at a fixed position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
    pub position: (u32, u32),
    pub color: Color,
    pub label_font: Font,
    pub text_font: Font,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            position: (0, 0),
            color: Color::default(),
            label_font: Font::Bold,
            text_font: Font::Medium,
        }
    }

    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.position = (x, y);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_fonts(mut self, label_font: Font, text_font: Font) -> Self {
        self.label_font = label_font;
        self.text_font = text_font;
        self
    }

    /// Text as drawn, e.g. `BAT : 87%`
    pub fn text(&self) -> String {
        if self.label.is_empty() {
            self.value.clone()
        } else {
            format!("{} {}", self.label, self.value)
        }
    }
}

/// What a plugin may do to the host's display
pub trait Ui: Send + Sync {
    /// Display width in pixels
    fn width(&self) -> u32;

    fn add_element(&self, key: &str, element: LabeledValue) -> Result<(), UiError>;

    fn remove_element(&self, key: &str) -> Result<(), UiError>;

    /// Set an element's displayed value
    fn set(&self, key: &str, value: &str) -> Result<(), UiError>;

    /// Replace an element's label
    fn set_label(&self, key: &str, label: &str) -> Result<(), UiError>;

    /// Redraw, applying `new_data` as element values first. `force` redraws
    /// even when nothing changed.
    fn update(&self, force: bool, new_data: &[(&str, &str)]) -> Result<(), UiError>;

    /// Take the render lock
    fn lock(&self) -> Result<UiGuard<'_>, UiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_value_builder() {
        let element = LabeledValue::new("BAT :", "0%")
            .at(135, 0)
            .with_color(Color::Black)
            .with_fonts(Font::Bold, Font::Medium);

        assert_eq!(element.position, (135, 0));
        assert_eq!(element.label_font, Font::Bold);
        assert_eq!(element.text_font, Font::Medium);
        assert_eq!(element.text(), "BAT : 0%");
    }

    #[test]
    fn test_unlabeled_text() {
        assert_eq!(LabeledValue::new("", "Hello").text(), "Hello");
    }

    #[test]
    fn test_ui_error_display() {
        assert!(UiError::DuplicateElement("bat".into())
            .to_string()
            .contains("bat"));
        assert!(UiError::MissingElement("bat".into())
            .to_string()
            .contains("No such element"));
    }
}
