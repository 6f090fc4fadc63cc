//! Replay of recorded serial input.
//!
//! Feeds a captured byte stream to a [`LocationHub`] a few bytes per tick,
//! the way a slow UART would deliver it, and writes one line per accepted
//! fix or diagnostic to an output stream. No pacing: ticks run back to back.

use crate::error::RunnerResult;
use geobeacon_hub::{HubStats, LocationHub, LocationSubscriber, MemoryTransport, UpdateOutcome};
use geobeacon_protocol::{codec, LocationFix};
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// How replay results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// A replay event in JSON form.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReplayEvent<'a> {
    Fix {
        tick: u64,
        record: String,
        latitude: f64,
        longitude: f64,
        fix: &'a LocationFix,
    },
    Diagnostic {
        tick: u64,
        message: String,
    },
}

/// Replays `data` into a fresh hub, `chunk_size` bytes per tick.
pub struct Replay {
    hub: LocationHub<MemoryTransport>,
    fixes: Rc<RefCell<Vec<LocationFix>>>,
}

impl Replay {
    /// Create a replay with an empty hub.
    ///
    /// The replay takes one subscriber slot to collect fixes for output.
    pub fn new() -> RunnerResult<Self> {
        let fixes = Rc::new(RefCell::new(Vec::new()));
        let mut hub = LocationHub::new(MemoryTransport::new());
        let collected = Rc::clone(&fixes);
        hub.subscribe(move |fix: &LocationFix| collected.borrow_mut().push(*fix))?;
        Ok(Replay { hub, fixes })
    }

    /// Register an additional subscriber, e.g. a beacon advertiser.
    pub fn subscribe<S>(&mut self, subscriber: S) -> RunnerResult<()>
    where
        S: LocationSubscriber + 'static,
    {
        self.hub.subscribe(subscriber)?;
        Ok(())
    }

    /// Run the replay, writing results to `out`. Returns the hub counters.
    pub fn run<W: Write>(
        mut self,
        data: &[u8],
        chunk_size: usize,
        format: OutputFormat,
        out: &mut W,
    ) -> RunnerResult<HubStats> {
        let chunk_size = chunk_size.max(1);
        let mut tick = 0u64;

        for chunk in data.chunks(chunk_size) {
            tick += 1;
            self.hub.transport_mut().push_rx(chunk);
            self.tick(tick, format, out)?;
        }

        // Drain lines that arrived together with an earlier one, and whatever
        // the per-pass limit left behind.
        while self.hub.transport().pending() > 0 {
            tick += 1;
            self.tick(tick, format, out)?;
        }

        Ok(self.hub.stats())
    }

    fn tick<W: Write>(&mut self, tick: u64, format: OutputFormat, out: &mut W) -> RunnerResult<()> {
        let outcome = self.hub.update();
        if let UpdateOutcome::Rejected(reason) = &outcome {
            tracing::debug!(tick, "rejected: {}", reason);
        }

        let fixes: Vec<LocationFix> = self.fixes.borrow_mut().drain(..).collect();
        for fix in &fixes {
            write_fix(out, format, tick, fix)?;
        }
        for message in self.hub.transport_mut().take_sent() {
            write_diagnostic(out, format, tick, &message)?;
        }
        Ok(())
    }
}

fn write_fix<W: Write>(out: &mut W, format: OutputFormat, tick: u64, fix: &LocationFix) -> RunnerResult<()> {
    let record = String::from_utf8_lossy(&codec::encode(fix)).into_owned();
    let (latitude, longitude) = fix.to_degrees();
    match format {
        OutputFormat::Text => {
            writeln!(out, "[{:>5}] fix {} ({:.6}, {:.6})", tick, record, latitude, longitude)?;
        }
        OutputFormat::Json => {
            let event = ReplayEvent::Fix {
                tick,
                record,
                latitude,
                longitude,
                fix,
            };
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    Ok(())
}

fn write_diagnostic<W: Write>(out: &mut W, format: OutputFormat, tick: u64, message: &[u8]) -> RunnerResult<()> {
    let message = String::from_utf8_lossy(message).into_owned();
    match format {
        OutputFormat::Text => writeln!(out, "[{:>5}] diagnostic {}", tick, message)?,
        OutputFormat::Json => {
            let event = ReplayEvent::Diagnostic { tick, message };
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    Ok(())
}
