//! Low-battery confirmation
//!
//! A single low reading is not trusted. The capacity is sampled five more
//! times, half a second apart, and only if the best of all six readings is
//! still at or below the threshold is the shutdown confirmed. The waits go
//! through a [`ShutdownDelay`] so another thread can abort a pending check.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Readings taken after the initial low one
pub const FOLLOW_UP_SAMPLES: usize = 5;

/// Pause before each follow-up reading
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of a confirmation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Every sample stayed at or below the threshold
    Confirmed { max: u8 },
    /// At least one sample came back above the threshold
    Recovered { max: u8 },
    /// The delay was cancelled before all samples were taken
    Cancelled,
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed { .. })
    }
}

#[derive(Debug, Default)]
struct DelayState {
    /// Set by `cancel`, cleared by `reset`
    cancelled: bool,
    /// A confirmation run is in flight
    pending: bool,
    /// Set by `abort_pending`, cleared when the run ends
    aborted: bool,
}

impl DelayState {
    fn interrupted(&self) -> bool {
        self.cancelled || self.aborted
    }
}

/// Cancellable sleep shared between the sampling thread and whoever may want
/// to abort it. Clones share state.
///
/// [`cancel`](Self::cancel) is sticky: every wait returns immediately until
/// [`reset`](Self::reset). [`abort_pending`](Self::abort_pending) only stops
/// the confirmation run currently in flight.
#[derive(Debug, Clone, Default)]
pub struct ShutdownDelay {
    inner: Arc<(Mutex<DelayState>, Condvar)>,
}

/// Marks a confirmation run as pending until dropped
struct PendingRun<'a> {
    delay: &'a ShutdownDelay,
}

impl Drop for PendingRun<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.delay.inner.0.lock() {
            state.pending = false;
            state.aborted = false;
        }
    }
}

impl ShutdownDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `duration`. Returns `false` if cancelled or aborted.
    pub fn wait(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let Ok(state) = lock.lock() else {
            return false;
        };

        match cvar.wait_timeout_while(state, duration, |state| !state.interrupted()) {
            Ok((state, _)) => !state.interrupted(),
            Err(_) => false,
        }
    }

    /// Abort pending and future waits
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        if let Ok(mut state) = lock.lock() {
            state.cancelled = true;
        }
        cvar.notify_all();
    }

    /// Re-arm after a cancel
    pub fn reset(&self) {
        if let Ok(mut state) = self.inner.0.lock() {
            state.cancelled = false;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.0.lock().map(|s| s.cancelled).unwrap_or(true)
    }

    /// Whether a confirmation run is sampling right now
    pub fn is_pending(&self) -> bool {
        self.inner.0.lock().map(|s| s.pending).unwrap_or(false)
    }

    /// Stop the confirmation run in flight, if any. Later runs are not
    /// affected. Returns `false` when nothing was pending.
    pub fn abort_pending(&self) -> bool {
        let (lock, cvar) = &*self.inner;
        let aborted = match lock.lock() {
            Ok(mut state) if state.pending => {
                state.aborted = true;
                true
            }
            _ => false,
        };
        if aborted {
            cvar.notify_all();
        }
        aborted
    }

    fn begin_run(&self) -> PendingRun<'_> {
        if let Ok(mut state) = self.inner.0.lock() {
            state.pending = true;
            state.aborted = false;
        }
        PendingRun { delay: self }
    }
}

/// Debounce-by-maximum over `initial` plus [`FOLLOW_UP_SAMPLES`] readings
pub fn confirm_low_capacity<F>(
    initial: u8,
    threshold: u8,
    delay: &ShutdownDelay,
    interval: Duration,
    mut sample: F,
) -> Confirmation
where
    F: FnMut() -> u8,
{
    let _run = delay.begin_run();
    let mut max = initial;
    for _ in 0..FOLLOW_UP_SAMPLES {
        if !delay.wait(interval) {
            return Confirmation::Cancelled;
        }
        max = max.max(sample());
    }

    if max <= threshold {
        Confirmation::Confirmed { max }
    } else {
        Confirmation::Recovered { max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    fn run(samples: [u8; 6], threshold: u8) -> (Confirmation, usize) {
        let mut follow_ups = samples[1..].iter().copied();
        let mut taken = 0;
        let outcome = confirm_low_capacity(
            samples[0],
            threshold,
            &ShutdownDelay::new(),
            Duration::ZERO,
            || {
                taken += 1;
                follow_ups.next().unwrap_or(0)
            },
        );
        (outcome, taken)
    }

    #[test]
    fn test_recovered_when_best_sample_above_threshold() {
        let (outcome, taken) = run([9, 11, 12, 8, 9, 10], 10);
        assert_eq!(outcome, Confirmation::Recovered { max: 12 });
        assert_eq!(taken, 5);
    }

    #[test]
    fn test_confirmed_when_all_samples_low() {
        let (outcome, taken) = run([5, 6, 4, 3, 2, 1], 10);
        assert_eq!(outcome, Confirmation::Confirmed { max: 6 });
        assert!(outcome.is_confirmed());
        assert_eq!(taken, 5);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(
            run([10, 10, 10, 10, 10, 10], 10).0,
            Confirmation::Confirmed { max: 10 }
        );
        assert_eq!(
            run([10, 10, 10, 10, 10, 11], 10).0,
            Confirmation::Recovered { max: 11 }
        );
    }

    #[test]
    fn test_initial_sample_counts_toward_max() {
        assert_eq!(
            run([12, 1, 1, 1, 1, 1], 10).0,
            Confirmation::Recovered { max: 12 }
        );
    }

    #[test]
    fn test_cancelled_delay_stops_sampling() {
        let delay = ShutdownDelay::new();
        delay.cancel();

        let mut taken = 0;
        let outcome = confirm_low_capacity(3, 10, &delay, Duration::from_secs(60), || {
            taken += 1;
            3
        });

        assert_eq!(outcome, Confirmation::Cancelled);
        assert_eq!(taken, 0);
    }

    #[test]
    fn test_cancel_wakes_pending_wait() {
        let delay = ShutdownDelay::new();
        let waiter = delay.clone();
        let started = Instant::now();

        let handle = thread::spawn(move || waiter.wait(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(50));
        delay.cancel();

        assert!(!handle.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_wait_elapses_and_reset_rearms() {
        let delay = ShutdownDelay::new();
        assert!(delay.wait(Duration::from_millis(1)));

        delay.cancel();
        assert!(delay.is_cancelled());
        assert!(!delay.wait(Duration::from_millis(1)));

        delay.reset();
        assert!(!delay.is_cancelled());
        assert!(delay.wait(Duration::from_millis(1)));
    }

    #[test]
    fn test_abort_without_pending_run_is_ignored() {
        let delay = ShutdownDelay::new();
        assert!(!delay.is_pending());
        assert!(!delay.abort_pending());

        assert_eq!(
            confirm_low_capacity(4, 10, &delay, Duration::ZERO, || 4),
            Confirmation::Confirmed { max: 4 }
        );
    }

    #[test]
    fn test_abort_stops_only_the_run_in_flight() {
        let delay = ShutdownDelay::new();
        let sampler = delay.clone();

        let handle = thread::spawn(move || {
            confirm_low_capacity(2, 10, &sampler, Duration::from_secs(30), || 2)
        });

        let started = Instant::now();
        while !delay.is_pending() && started.elapsed() < Duration::from_secs(10) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(delay.abort_pending());
        assert_eq!(handle.join().unwrap(), Confirmation::Cancelled);

        assert!(!delay.is_pending());
        assert!(!delay.is_cancelled());
        assert_eq!(
            confirm_low_capacity(2, 10, &delay, Duration::ZERO, || 2),
            Confirmation::Confirmed { max: 2 }
        );
    }

    #[test]
    fn test_default_timing() {
        assert_eq!(FOLLOW_UP_SAMPLES, 5);
        assert_eq!(SAMPLE_INTERVAL * FOLLOW_UP_SAMPLES as u32, Duration::from_millis(2500));
    }
}
