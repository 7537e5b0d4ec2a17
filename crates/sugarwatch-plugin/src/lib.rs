//! Battery indicator plugin for the PiSugar 3
//!
//! The host drives a [`Plugin`] through its lifecycle hooks and hands it a
//! [`Ui`] to draw on. [`PiSugar3`] reads the battery on every UI update,
//! shows the percentage and shuts the host down when the battery is empty.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sugarwatch_config::PluginOptions;
//! use sugarwatch_hal::mock::{MockBus, MockPower};
//! use sugarwatch_hal::REG_CAPACITY;
//! use sugarwatch_plugin::{PiSugar3, Plugin, Ui, View};
//!
//! let bus = MockBus::new();
//! bus.set_register(REG_CAPACITY, 76);
//! for reg in [0x02, 0x03, 0x04] {
//!     bus.set_register(reg, 0);
//! }
//!
//! let mut plugin = PiSugar3::new(
//!     PluginOptions::default(),
//!     Arc::new(bus),
//!     Arc::new(MockPower::new()),
//! );
//! let view = View::new(250);
//!
//! plugin.on_loaded();
//! plugin.on_ui_setup(&view);
//! plugin.on_ui_update(&view);
//! view.update(false, &[]).unwrap();
//!
//! assert!(view.last_frame().contains("BAT : 76%"));
//! ```

pub mod debounce;
pub mod pisugar3;
pub mod plugin;
pub mod ui;
pub mod view;

pub use debounce::{Confirmation, FOLLOW_UP_SAMPLES, SAMPLE_INTERVAL, ShutdownDelay};
pub use pisugar3::PiSugar3;
pub use plugin::{Plugin, PluginInfo};
pub use ui::{Color, Font, LabeledValue, STATUS_KEY, Ui, UiError, UiGuard};
pub use view::View;
