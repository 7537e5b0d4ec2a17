//! PiSugar 3 battery indicator
//!
//! Shows the remaining capacity next to a `BAT :` or `CHG :` label and halts
//! the host once the battery is confirmed to be at or below the configured
//! threshold.

use crate::debounce::{Confirmation, SAMPLE_INTERVAL, ShutdownDelay, confirm_low_capacity};
use crate::plugin::{Plugin, PluginInfo};
use crate::ui::{Color, Font, LabeledValue, STATUS_KEY, Ui};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use sugarwatch_config::PluginOptions;
use sugarwatch_hal::{PowerControl, RegisterBus, Ups, UpsStatus};
use tracing::{error, info, warn};

/// UI registry key of the battery element
pub const ELEMENT_KEY: &str = "bat";

pub const LABEL_BATTERY: &str = "BAT :";
pub const LABEL_CHARGING: &str = "CHG :";

/// Status line shown right before shutting down
pub const EXHAUSTED_STATUS: &str = "Battery exhausted, bye ...";

/// Displayed value, right-aligned to two characters: ` 7%`, `42%`, `100%`
pub fn format_capacity(capacity: u8) -> String {
    format!("{:>2}%", capacity)
}

pub fn label_for(status: &UpsStatus) -> &'static str {
    if status.is_charging() {
        LABEL_CHARGING
    } else {
        LABEL_BATTERY
    }
}

pub struct PiSugar3 {
    options: PluginOptions,
    bus: Arc<dyn RegisterBus>,
    power: Arc<dyn PowerControl>,
    ups: Option<Ups>,
    delay: ShutdownDelay,
    sample_interval: Duration,
    /// Set once the host accepted the shutdown request
    shut_down: AtomicBool,
}

impl PiSugar3 {
    pub fn new(
        options: PluginOptions,
        bus: Arc<dyn RegisterBus>,
        power: Arc<dyn PowerControl>,
    ) -> Self {
        Self {
            options,
            bus,
            power,
            ups: None,
            delay: ShutdownDelay::new(),
            sample_interval: SAMPLE_INTERVAL,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Override the pause between confirmation samples
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Shutdown threshold in percent
    pub fn threshold(&self) -> u8 {
        self.options.shutdown
    }

    /// Handle for aborting a pending low-battery check from another thread
    pub fn shutdown_delay(&self) -> ShutdownDelay {
        self.delay.clone()
    }

    /// Whether a shutdown request has already succeeded
    pub fn has_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn refresh_element(&self, ui: &dyn Ui, capacity: u8, status: &UpsStatus) {
        if let Err(e) = ui.set_label(ELEMENT_KEY, label_for(status)) {
            warn!("[pisugar3] label update failed: {}", e);
        }
        if let Err(e) = ui.set(ELEMENT_KEY, &format_capacity(capacity)) {
            warn!("[pisugar3] value update failed: {}", e);
        }
    }

    fn check_shutdown(&self, ui: &dyn Ui, ups: &Ups, capacity: u8) {
        let threshold = self.threshold();
        if capacity > threshold {
            return;
        }

        info!("[pisugar3] Battery capacity low. Checking multiple times before shutdown.");
        let outcome = confirm_low_capacity(
            capacity,
            threshold,
            &self.delay,
            self.sample_interval,
            || ups.capacity(),
        );

        let max = match outcome {
            Confirmation::Cancelled => {
                info!("[pisugar3] Low battery check cancelled");
                return;
            }
            Confirmation::Recovered { max } => {
                info!("[pisugar3] Maximum battery capacity: {:>2}%", max);
                return;
            }
            Confirmation::Confirmed { max } => max,
        };

        info!("[pisugar3] Maximum battery capacity: {:>2}%", max);
        info!(
            "[pisugar3] Battery capacity reached threshold (<= {}%): shutting down",
            threshold
        );

        if let Err(e) = ui.update(true, &[(STATUS_KEY, EXHAUSTED_STATUS)]) {
            warn!("[pisugar3] final redraw failed: {}", e);
        }
        match self.power.shutdown() {
            Ok(()) => self.shut_down.store(true, Ordering::SeqCst),
            Err(e) => error!("[pisugar3] shutdown failed: {}", e),
        }
    }
}

impl Plugin for PiSugar3 {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "pisugar3",
            author: env!("CARGO_PKG_AUTHORS"),
            version: env!("CARGO_PKG_VERSION"),
            license: env!("CARGO_PKG_LICENSE"),
            description: "A plugin that will add a percentage indicator for the PiSugar 3",
        }
    }

    fn on_loaded(&mut self) {
        self.ups = Some(Ups::new(Arc::clone(&self.bus)));
        self.delay.reset();
        info!("[pisugar3] plugin loaded.");
    }

    fn on_ui_setup(&self, ui: &dyn Ui) {
        let element = LabeledValue::new(LABEL_BATTERY, "0%")
            .at(ui.width() / 2 + 10, 0)
            .with_color(Color::Black)
            .with_fonts(Font::Bold, Font::Medium);

        if let Err(e) = ui.add_element(ELEMENT_KEY, element) {
            warn!("[pisugar3] setup err: {}", e);
        }
    }

    fn on_ui_update(&self, ui: &dyn Ui) {
        let Some(ups) = &self.ups else {
            warn!("[pisugar3] update before load, skipping");
            return;
        };
        if self.has_shut_down() {
            return;
        }

        let capacity = ups.capacity();
        let status = ups.status();
        self.refresh_element(ui, capacity, &status);
        self.check_shutdown(ui, ups, capacity);
    }

    fn on_unload(&self, ui: &dyn Ui) {
        self.delay.cancel();

        let _guard = match ui.lock() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("[pisugar3] unload err: {}", e);
                return;
            }
        };
        if let Err(e) = ui.remove_element(ELEMENT_KEY) {
            warn!("[pisugar3] unload err: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugarwatch_hal::mock::{MockBus, MockPower};

    #[test]
    fn test_format_capacity() {
        assert_eq!(format_capacity(0), " 0%");
        assert_eq!(format_capacity(7), " 7%");
        assert_eq!(format_capacity(42), "42%");
        assert_eq!(format_capacity(100), "100%");
    }

    #[test]
    fn test_label_for_status() {
        assert_eq!(label_for(&UpsStatus(0x80, 0, 0)), LABEL_CHARGING);
        assert_eq!(label_for(&UpsStatus(0xc3, 0, 0)), LABEL_CHARGING);
        assert_eq!(label_for(&UpsStatus(0x7f, 0xff, 0xff)), LABEL_BATTERY);
        assert_eq!(label_for(&UpsStatus(0, 0, 0)), LABEL_BATTERY);
    }

    #[test]
    fn test_plugin_info() {
        let plugin = PiSugar3::new(
            PluginOptions::default(),
            Arc::new(MockBus::new()),
            Arc::new(MockPower::new()),
        );
        let info = plugin.info();
        assert_eq!(info.name, "pisugar3");
        assert!(info.description.contains("PiSugar 3"));
        assert_eq!(plugin.threshold(), 10);
    }
}
