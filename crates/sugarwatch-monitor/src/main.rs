//! sugarwatch monitor
//!
//! Minimal host for the PiSugar 3 plugin on machines without a display
//! framework. Drives the plugin lifecycle on a fixed cadence and logs every
//! frame that changes.
//!
//! Signals:
//! - SIGTERM / SIGINT: stop, aborting any pending low-battery check
//! - SIGUSR1: abort a pending low-battery check and keep running

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use sugarwatch_config::{MonitorConfig, SugarwatchConfig};
use sugarwatch_hal::{DeviceHandle, I2cGet, SystemPower};
use sugarwatch_plugin::{PiSugar3, Plugin, ShutdownDelay, Ui, View};
use tracing::{debug, info, warn};

static STOP: AtomicBool = AtomicBool::new(false);
static CANCEL_CHECK: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
    setup_logging();

    let config = load_config()?;
    info!(
        "sugarwatch monitor starting (shutdown at {}%, every {}s)",
        config.plugin.shutdown, config.monitor.poll_interval_secs
    );

    check_i2cget(&config.monitor);
    setup_signal_handlers()?;

    let bus = I2cGet::new(DeviceHandle::pisugar3()).with_program(&config.monitor.i2cget_path);
    let mut plugin = PiSugar3::new(
        config.plugin.clone(),
        Arc::new(bus),
        Arc::new(SystemPower::new()),
    );
    let view = View::new(config.monitor.display_width);

    let info = plugin.info();
    info!("Loading plugin {} v{}", info.name, info.version);
    plugin.on_loaded();
    plugin.on_ui_setup(&view);

    let watcher = spawn_signal_watcher(plugin.shutdown_delay());

    let interval = Duration::from_secs(config.monitor.poll_interval_secs.max(1));
    let result = run(&plugin, &view, interval);

    plugin.on_unload(&view);
    STOP.store(true, Ordering::SeqCst);
    let _ = watcher.join();

    info!("sugarwatch monitor stopped");
    result
}

/// Setup logging to console
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(false))
        .init();
}

/// Config file from the first argument, otherwise the default locations
fn load_config() -> Result<SugarwatchConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SugarwatchConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => SugarwatchConfig::load_default().context("Failed to load default config"),
    }
}

fn check_i2cget(config: &MonitorConfig) {
    match which::which(&config.i2cget_path) {
        Ok(path) => debug!("Using {}", path.display()),
        Err(_) => warn!(
            "{} not found; every battery read will fail and report 0%",
            config.i2cget_path
        ),
    }
}

fn setup_signal_handlers() -> Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGTERM, &action)?;
        sigaction(Signal::SIGINT, &action)?;
        sigaction(Signal::SIGUSR1, &action)?;
    }

    Ok(())
}

// Only async-signal-safe work here: flip flags, the watcher does the rest
extern "C" fn handle_signal(sig: i32) {
    match sig {
        libc::SIGTERM | libc::SIGINT => STOP.store(true, Ordering::SeqCst),
        libc::SIGUSR1 => CANCEL_CHECK.store(true, Ordering::SeqCst),
        _ => {}
    }
}

/// Turns signal flags into cancellations of the plugin's shutdown delay
fn spawn_signal_watcher(delay: ShutdownDelay) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !STOP.load(Ordering::SeqCst) {
            if CANCEL_CHECK.swap(false, Ordering::SeqCst) {
                if delay.abort_pending() {
                    info!("Aborting pending low battery check");
                } else {
                    debug!("SIGUSR1 ignored, no low battery check pending");
                }
            }
            thread::sleep(Duration::from_millis(100));
        }
        delay.cancel();
    })
}

fn run(plugin: &PiSugar3, view: &View, interval: Duration) -> Result<()> {
    let mut rendered = view.renders();

    while !STOP.load(Ordering::SeqCst) {
        plugin.on_ui_update(view);

        view.update(false, &[]).context("Display update failed")?;

        if view.renders() != rendered {
            rendered = view.renders();
            info!("{}", view.last_frame().replace('\n', " | "));
        }

        if plugin.has_shut_down() {
            info!("Host shutdown requested, stopping");
            return Ok(());
        }

        sleep_unless_stopped(interval);
    }

    info!("Received shutdown signal");
    Ok(())
}

fn sleep_unless_stopped(duration: Duration) {
    let deadline = Instant::now() + duration;
    while !STOP.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(250)));
    }
}
