//! GNSS Beacon Location Hub
//!
//! This crate holds the single current location of the beacon and keeps it
//! fresh from a serial link. Each call to [`LocationHub::update`] pulls the
//! bytes that have arrived, and when they complete a line, validates and
//! decodes it with [`geobeacon_protocol`] and fans the new fix out to the
//! registered subscribers.
//!
//! # Example
//!
//! ```rust
//! use geobeacon_hub::{LocationHub, MemoryTransport, UpdateOutcome};
//! use geobeacon_protocol::LocationFix;
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_rx(b"+47.606209,-122.332071\r\n");
//!
//! let mut hub = LocationHub::new(transport);
//! hub.subscribe(|fix: &LocationFix| println!("new fix: {}", fix))?;
//!
//! assert_eq!(hub.update(), UpdateOutcome::Updated { notified: 1 });
//! # Ok::<(), geobeacon_hub::HubError>(())
//! ```

mod error;
mod hub;
mod subscriber;
mod transport;

pub use error::*;
pub use hub::*;
pub use subscriber::*;
pub use transport::*;
