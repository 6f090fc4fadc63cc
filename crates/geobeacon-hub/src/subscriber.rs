//! Subscriber registry.
//!
//! Consumers register a [`LocationSubscriber`] to hear about every new fix.
//! The registry has a fixed number of slots and no way to unsubscribe, so
//! once it is full it stays full. Subscribers are notified synchronously in
//! slot order and must return quickly: the next update cycle waits for them.

use crate::error::{HubError, HubResult};
use geobeacon_protocol::LocationFix;
use std::fmt;

/// Number of subscriber slots.
pub const MAX_SUBSCRIBERS: usize = 5;

/// Something that wants to be told about new location fixes.
pub trait LocationSubscriber {
    /// Called once per accepted fix.
    fn notify(&mut self, fix: &LocationFix);
}

impl<F> LocationSubscriber for F
where
    F: FnMut(&LocationFix),
{
    fn notify(&mut self, fix: &LocationFix) {
        self(fix)
    }
}

/// Handle for a registered subscriber: its slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(usize);

impl SubscriberId {
    /// Slot index, which is also the notification position.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

/// Fixed-capacity, ordered set of subscribers.
#[derive(Default)]
pub struct SubscriberRegistry {
    slots: [Option<Box<dyn LocationSubscriber>>; MAX_SUBSCRIBERS],
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("occupied", &self.len())
            .field("capacity", &MAX_SUBSCRIBERS)
            .finish()
    }
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a subscriber in the first free slot.
    pub fn subscribe(&mut self, subscriber: Box<dyn LocationSubscriber>) -> HubResult<SubscriberId> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(HubError::RegistryFull {
                capacity: MAX_SUBSCRIBERS,
            })?;
        *slot = Some(subscriber);
        Ok(SubscriberId(index))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.len() == MAX_SUBSCRIBERS
    }

    /// Notify every subscriber in slot order. Returns how many were called.
    pub fn notify_all(&mut self, fix: &LocationFix) -> usize {
        let mut notified = 0;
        for subscriber in self.slots.iter_mut().flatten() {
            subscriber.notify(fix);
            notified += 1;
        }
        notified
    }
}
