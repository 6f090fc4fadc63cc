//! GNSS Beacon Location Protocol
//!
//! This crate turns the text lines a GNSS receiver writes on its serial port
//! into validated fixed-point locations, and back into the fixed-width record
//! that gets advertised.
//!
//! # Record Format
//!
//! ```text
//! [+|-]DD.DDDDDD,[+|-]DDD.DDDDDD<CR|LF|CRLF>
//! ```
//!
//! - Latitude comes first, bounded by ±90 degrees
//! - Longitude follows a single comma, bounded by ±180 degrees
//! - Both fractions carry exactly six digits
//! - A missing sign means positive
//!
//! # Example
//!
//! ```rust
//! use geobeacon_protocol::{codec, FrameAssembler};
//!
//! let mut assembler = FrameAssembler::new();
//! assembler.accumulate_pass(b"47.606209,-122.".iter().copied());
//! let status = assembler.accumulate_pass(b"332071\r\n".iter().copied());
//! assert!(status.has_record());
//!
//! let fix = codec::parse(assembler.frame()).unwrap();
//! assert_eq!(fix.to_string(), "+47.606209,-122.332071");
//! ```

pub mod codec;
mod error;
mod frame;
mod types;

pub use error::*;
pub use frame::*;
pub use types::*;
