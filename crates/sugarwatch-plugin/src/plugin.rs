//! Host plugin contract
//!
//! The host calls these hooks at fixed points of its lifecycle. Hooks return
//! nothing: a plugin deals with its own failures and must never take the host
//! down by accident.

use crate::ui::Ui;

/// Static description of a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub author: &'static str,
    pub version: &'static str,
    pub license: &'static str,
    pub description: &'static str,
}

pub trait Plugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    /// Called once after the plugin is instantiated
    fn on_loaded(&mut self) {}

    /// Called once the display exists; register elements here
    fn on_ui_setup(&self, _ui: &dyn Ui) {}

    /// Called on every refresh of the display
    fn on_ui_update(&self, _ui: &dyn Ui) {}

    /// Called at teardown, possibly from a different thread than updates
    fn on_unload(&self, _ui: &dyn Ui) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::View;

    struct Noop;

    impl Plugin for Noop {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                name: "noop",
                author: "",
                version: "0.0.0",
                license: "MIT",
                description: "does nothing",
            }
        }
    }

    #[test]
    fn test_default_hooks_leave_ui_alone() {
        let mut plugin = Noop;
        let view = View::new(250);

        plugin.on_loaded();
        plugin.on_ui_setup(&view);
        plugin.on_ui_update(&view);
        plugin.on_unload(&view);

        assert_eq!(plugin.info().name, "noop");
        assert_eq!(view.renders(), 0);
    }
}
