//! In-memory display state
//!
//! A [`Ui`] implementation that keeps elements in a map and renders them to
//! text. The monitor logs its frames; tests inspect it directly.

use crate::ui::{LabeledValue, STATUS_KEY, Ui, UiError, UiGuard};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ViewState {
    elements: BTreeMap<String, LabeledValue>,
    dirty: bool,
    renders: usize,
    last_frame: String,
}

pub struct View {
    width: u32,
    render_lock: Mutex<()>,
    state: Mutex<ViewState>,
}

impl View {
    /// A view of the given width with an empty status line
    pub fn new(width: u32) -> Self {
        let mut elements = BTreeMap::new();
        elements.insert(STATUS_KEY.to_string(), LabeledValue::new("", "").at(0, 20));

        Self {
            width,
            render_lock: Mutex::new(()),
            state: Mutex::new(ViewState {
                elements,
                dirty: true,
                ..ViewState::default()
            }),
        }
    }

    /// Snapshot of one element
    pub fn element(&self, key: &str) -> Option<LabeledValue> {
        self.state().ok()?.elements.get(key).cloned()
    }

    pub fn has_element(&self, key: &str) -> bool {
        self.element(key).is_some()
    }

    pub fn status(&self) -> String {
        self.element(STATUS_KEY)
            .map(|e| e.value)
            .unwrap_or_default()
    }

    /// Number of frames drawn so far
    pub fn renders(&self) -> usize {
        self.state().map(|s| s.renders).unwrap_or(0)
    }

    pub fn last_frame(&self) -> String {
        self.state()
            .map(|s| s.last_frame.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, ViewState>, UiError> {
        self.state.lock().map_err(|_| UiError::LockPoisoned)
    }

    fn with_element<F>(&self, key: &str, f: F) -> Result<(), UiError>
    where
        F: FnOnce(&mut LabeledValue),
    {
        let mut state = self.state()?;
        let element = state
            .elements
            .get_mut(key)
            .ok_or_else(|| UiError::MissingElement(key.to_string()))?;
        f(element);
        state.dirty = true;
        Ok(())
    }
}

/// Elements top to bottom, left to right, one per line
fn render(elements: &BTreeMap<String, LabeledValue>) -> String {
    let mut ordered: Vec<&LabeledValue> = elements.values().collect();
    ordered.sort_by_key(|e| (e.position.1, e.position.0));
    ordered
        .into_iter()
        .map(LabeledValue::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl Ui for View {
    fn width(&self) -> u32 {
        self.width
    }

    fn add_element(&self, key: &str, element: LabeledValue) -> Result<(), UiError> {
        let mut state = self.state()?;
        if state.elements.contains_key(key) {
            return Err(UiError::DuplicateElement(key.to_string()));
        }
        state.elements.insert(key.to_string(), element);
        state.dirty = true;
        Ok(())
    }

    fn remove_element(&self, key: &str) -> Result<(), UiError> {
        let mut state = self.state()?;
        state
            .elements
            .remove(key)
            .ok_or_else(|| UiError::MissingElement(key.to_string()))?;
        state.dirty = true;
        Ok(())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), UiError> {
        self.with_element(key, |e| e.value = value.to_string())
    }

    fn set_label(&self, key: &str, label: &str) -> Result<(), UiError> {
        self.with_element(key, |e| e.label = label.to_string())
    }

    fn update(&self, force: bool, new_data: &[(&str, &str)]) -> Result<(), UiError> {
        let _render = self.lock()?;

        for (key, value) in new_data {
            self.set(key, value)?;
        }

        let mut state = self.state()?;
        if !force && !state.dirty {
            return Ok(());
        }

        state.last_frame = render(&state.elements);
        state.renders += 1;
        state.dirty = false;
        tracing::trace!("frame {}:\n{}", state.renders, state.last_frame);
        Ok(())
    }

    fn lock(&self) -> Result<UiGuard<'_>, UiError> {
        self.render_lock.lock().map_err(|_| UiError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_view_has_status_line() {
        let view = View::new(250);
        assert_eq!(view.width(), 250);
        assert!(view.has_element(STATUS_KEY));
        assert_eq!(view.status(), "");
    }

    #[test]
    fn test_add_and_duplicate() {
        let view = View::new(250);
        view.add_element("bat", LabeledValue::new("BAT :", "0%"))
            .unwrap();
        assert_eq!(
            view.add_element("bat", LabeledValue::new("BAT :", "0%")),
            Err(UiError::DuplicateElement("bat".into()))
        );
    }

    #[test]
    fn test_set_and_set_label() {
        let view = View::new(250);
        view.add_element("bat", LabeledValue::new("BAT :", "0%"))
            .unwrap();

        view.set("bat", "87%").unwrap();
        view.set_label("bat", "CHG :").unwrap();

        let element = view.element("bat").unwrap();
        assert_eq!(element.label, "CHG :");
        assert_eq!(element.value, "87%");
    }

    #[test]
    fn test_missing_element() {
        let view = View::new(250);
        assert_eq!(
            view.set("bat", "1%"),
            Err(UiError::MissingElement("bat".into()))
        );
        assert_eq!(
            view.remove_element("bat"),
            Err(UiError::MissingElement("bat".into()))
        );
    }

    #[test]
    fn test_update_renders_only_when_dirty_or_forced() {
        let view = View::new(250);
        view.update(false, &[]).unwrap();
        assert_eq!(view.renders(), 1);

        view.update(false, &[]).unwrap();
        assert_eq!(view.renders(), 1);

        view.update(true, &[]).unwrap();
        assert_eq!(view.renders(), 2);

        view.update(false, &[(STATUS_KEY, "Hello")]).unwrap();
        assert_eq!(view.renders(), 3);
        assert_eq!(view.status(), "Hello");
    }

    #[test]
    fn test_frame_order_follows_position() {
        let view = View::new(250);
        view.add_element("bat", LabeledValue::new("BAT :", "50%").at(135, 0))
            .unwrap();
        view.update(true, &[(STATUS_KEY, "Zzz")]).unwrap();

        assert_eq!(view.last_frame(), "BAT : 50%\nZzz");
    }

    #[test]
    fn test_remove_under_lock() {
        let view = View::new(250);
        view.add_element("bat", LabeledValue::new("BAT :", "0%"))
            .unwrap();

        let guard = view.lock().unwrap();
        view.remove_element("bat").unwrap();
        drop(guard);

        assert!(!view.has_element("bat"));
    }
}
