//! # geobeacon-runner
//!
//! Host-side runner for the GNSS location beacon.
//!
//! The location core ([`geobeacon_hub`] and [`geobeacon_protocol`]) expects an
//! embedding application to supply a serial link and a periodic update call.
//! This crate supplies both for a desktop host:
//!
//! - [`uart_server`]: a TCP port standing in for the GNSS UART
//! - [`driver`]: the paced update loop
//! - [`replay`]: offline replay of captured serial data
//! - [`beacon`]: the advertiser that turns fixes into radio payloads
//! - [`config`]: YAML configuration

pub mod beacon;
pub mod config;
pub mod driver;
mod error;
pub mod replay;
pub mod uart_server;

pub use error::*;
