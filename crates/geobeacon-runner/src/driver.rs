//! Periodic driver for the location hub.
//!
//! The hub has no thread of its own. This module calls
//! [`LocationHub::update`] once per tick, paced against the wall clock, until
//! asked to stop.
//!
//! ## Pacing
//!
//! Deadlines advance by a fixed interval from the start time, so short sleeps
//! do not accumulate drift. When an update (or a slow subscriber) overruns
//! the interval by more than [`TickPacer::max_lag`], the schedule is reset to
//! "now" and a warning is logged at most once per [`LAG_WARN_INTERVAL`].

use geobeacon_hub::{HubStats, LocationHub, Transport, UpdateOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Minimum time between two lag warnings.
pub const LAG_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Keeps a fixed tick rate against the wall clock.
#[derive(Debug)]
pub struct TickPacer {
    interval: Duration,
    next_deadline: Instant,
    last_lag_warn: Option<Instant>,
    lag_events: u64,
}

impl TickPacer {
    /// Create a pacer whose first tick is due immediately.
    pub fn new(interval: Duration) -> Self {
        TickPacer {
            interval,
            next_deadline: Instant::now(),
            last_lag_warn: None,
            lag_events: 0,
        }
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How far behind schedule a tick may start before the schedule resets.
    pub fn max_lag(&self) -> Duration {
        self.interval * 2
    }

    /// Number of times the schedule was reset after falling behind.
    pub fn lag_events(&self) -> u64 {
        self.lag_events
    }

    /// Sleep until the next tick is due, then schedule the one after.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
        } else if now - self.next_deadline > self.max_lag() {
            let behind = now - self.next_deadline;
            self.lag_events += 1;
            let should_warn = self
                .last_lag_warn
                .map_or(true, |last| now - last >= LAG_WARN_INTERVAL);
            if should_warn {
                tracing::warn!(
                    "update loop running {:?} behind schedule ({} lag events so far)",
                    behind,
                    self.lag_events
                );
                self.last_lag_warn = Some(now);
            }
            self.next_deadline = now;
        }
        self.next_deadline += self.interval;
    }
}

/// Log what an update did.
pub fn log_outcome(outcome: &UpdateOutcome, location: &impl std::fmt::Display) {
    match outcome {
        UpdateOutcome::Idle => {}
        UpdateOutcome::Updated { notified } => {
            tracing::info!("location updated to {} ({} subscribers notified)", location, notified);
        }
        UpdateOutcome::Rejected(reason) => {
            tracing::warn!("invalid location line rejected: {}", reason);
        }
    }
}

/// Run update cycles every `interval` until `running` is cleared.
pub fn run<T: Transport>(
    hub: &mut LocationHub<T>,
    interval: Duration,
    running: &AtomicBool,
) -> HubStats {
    let mut pacer = TickPacer::new(interval);
    while running.load(Ordering::Relaxed) {
        pacer.wait();
        let outcome = hub.update();
        log_outcome(&outcome, hub.location());
    }
    hub.stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobeacon_hub::MemoryTransport;
    use geobeacon_protocol::LocationFix;
    use std::sync::Arc;

    #[test]
    fn test_pacer_first_tick_immediate() {
        let mut pacer = TickPacer::new(Duration::from_millis(200));
        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn test_pacer_keeps_interval() {
        let mut pacer = TickPacer::new(Duration::from_millis(20));
        let start = Instant::now();
        for _ in 0..4 {
            pacer.wait();
        }
        // First tick is immediate, then three full intervals.
        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(pacer.lag_events(), 0);
    }

    #[test]
    fn test_pacer_resets_after_lag() {
        let mut pacer = TickPacer::new(Duration::from_millis(5));
        pacer.wait();
        std::thread::sleep(Duration::from_millis(50));
        pacer.wait();
        assert_eq!(pacer.lag_events(), 1);
    }

    #[test]
    fn test_run_stops_when_flag_cleared() {
        let running = Arc::new(AtomicBool::new(true));
        let mut transport = MemoryTransport::new();
        transport.push_rx(b"+10.000000,+020.000000\n");
        let mut hub = LocationHub::new(transport);

        let seen = Arc::clone(&running);
        hub.subscribe(move |_: &LocationFix| seen.store(false, Ordering::Relaxed))
            .unwrap();

        let stats = run(&mut hub, Duration::from_millis(1), &running);
        assert_eq!(stats.accepted, 1);
        assert_eq!(hub.location().to_string(), "+10.000000,+020.000000");
    }
}
