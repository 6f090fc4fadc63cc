//! The location hub.
//!
//! [`LocationHub`] owns the current fix and everything needed to refresh it:
//! the transport, the frame assembler and the subscriber registry. A driver
//! calls [`LocationHub::update`] once per tick. Most ticks find no complete
//! line and do nothing.

use crate::error::HubResult;
use crate::subscriber::{LocationSubscriber, SubscriberId, SubscriberRegistry};
use crate::transport::Transport;
use geobeacon_protocol::{codec, CodecError, FrameAssembler, LocationFix};
use std::iter;

/// Message sent back over the transport when a line fails validation.
pub const INVALID_LOCATION_MESSAGE: &[u8] = b"Invalid location!";

/// Upper bound on bytes pulled from the transport in one update, matching the
/// receive FIFO depth of the serial driver.
pub const RX_PASS_LIMIT: usize = 256;

/// What a call to [`LocationHub::update`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No complete record was available.
    Idle,
    /// A new fix was stored and subscribers were notified.
    Updated {
        /// Number of subscribers called.
        notified: usize,
    },
    /// A complete line failed validation. The stored fix is unchanged.
    Rejected(CodecError),
}

/// Running counters for the update loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Records accepted.
    pub accepted: u64,
    /// Lines rejected by validation.
    pub rejected: u64,
    /// Bare terminators with nothing before them.
    pub empty_lines: u64,
    /// Bytes dropped because a line overflowed the frame buffer.
    pub overflow_bytes: u64,
}

/// Owner of the current location and its update cycle.
///
/// Construct one at start-up and hand it to the periodic driver. The hub is
/// single-threaded: subscribers run inside [`update`](Self::update) on the
/// caller's thread.
#[derive(Debug)]
pub struct LocationHub<T> {
    transport: T,
    assembler: FrameAssembler,
    location: LocationFix,
    subscribers: SubscriberRegistry,
    stats: HubStats,
}

impl<T: Transport> LocationHub<T> {
    /// Create a hub reading from `transport`, starting at the default fix.
    pub fn new(transport: T) -> Self {
        LocationHub {
            transport,
            assembler: FrameAssembler::new(),
            location: LocationFix::default(),
            subscribers: SubscriberRegistry::new(),
            stats: HubStats::default(),
        }
    }

    /// Register a subscriber for new fixes.
    ///
    /// Fails once all slots are taken. Slots are never released.
    pub fn subscribe<S>(&mut self, subscriber: S) -> HubResult<SubscriberId>
    where
        S: LocationSubscriber + 'static,
    {
        let id = self.subscribers.subscribe(Box::new(subscriber))?;
        log::debug!("registered location {}", id);
        Ok(id)
    }

    /// Run one update cycle.
    ///
    /// Pulls bytes from the transport up to the end of the current line. Bytes
    /// of a following line stay in the transport for the next cycle. If a line
    /// was completed it is validated: a valid one replaces the stored fix and is handed to
    /// every subscriber, an invalid one is answered with
    /// [`INVALID_LOCATION_MESSAGE`] on the transport.
    pub fn update(&mut self) -> UpdateOutcome {
        let transport = &mut self.transport;
        let status = self
            .assembler
            .accumulate_pass(iter::from_fn(|| transport.receive()).take(RX_PASS_LIMIT));

        if !status.complete {
            return UpdateOutcome::Idle;
        }

        let outcome = if status.has_record() {
            self.process_frame()
        } else {
            self.stats.empty_lines += 1;
            UpdateOutcome::Idle
        };

        self.stats.overflow_bytes += self.assembler.dropped() as u64;
        self.assembler.reset();
        outcome
    }

    fn process_frame(&mut self) -> UpdateOutcome {
        let frame = self.assembler.frame();

        if let Err(err) = codec::validate_detailed(frame) {
            log::debug!(
                "rejected location line {:?}: {}",
                String::from_utf8_lossy(frame),
                err
            );
            self.stats.rejected += 1;
            self.transport.send(INVALID_LOCATION_MESSAGE);
            return UpdateOutcome::Rejected(err);
        }

        self.location = codec::decode(frame);
        self.stats.accepted += 1;
        log::trace!("new location fix {}", self.location);

        let notified = self.subscribers.notify_all(&self.location);
        UpdateOutcome::Updated { notified }
    }

    /// The current fix.
    pub fn location(&self) -> &LocationFix {
        &self.location
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Counters since the hub was created.
    pub fn stats(&self) -> HubStats {
        self.stats
    }

    /// Shared access to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

}
