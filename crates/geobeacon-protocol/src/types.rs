//! Coordinate data model.
//!
//! A location is carried as a fixed-point pair of axes. Each axis stores a
//! sign, whole degrees and a six-digit decimal fraction, so the textual record
//! `+47.606209,-122.332071` maps to exact integers with no floating point
//! rounding on the way in or out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional digits carried by each axis.
pub const DECIMAL_PRECISION: usize = 6;

/// Scale of the fixed-point decimal part (`10^DECIMAL_PRECISION`).
pub const DECIMAL_SCALE: u32 = 1_000_000;

/// Maximum absolute latitude in degrees.
pub const MAX_ABS_LATITUDE: u16 = 90;

/// Maximum absolute longitude in degrees.
pub const MAX_ABS_LONGITUDE: u16 = 180;

/// Encoded latitude field length: `±DD.DDDDDD`.
pub const LATITUDE_FIELD_LEN: usize = 1 + 2 + 1 + DECIMAL_PRECISION;

/// Encoded longitude field length: `±DDD.DDDDDD`.
pub const LONGITUDE_FIELD_LEN: usize = 1 + 3 + 1 + DECIMAL_PRECISION;

/// Encoded record length: latitude, comma, longitude.
pub const RECORD_LEN: usize = LATITUDE_FIELD_LEN + 1 + LONGITUDE_FIELD_LEN;

/// Separator between the latitude and longitude fields.
pub const AXIS_SEPARATOR: u8 = b',';

/// Decimal point inside an axis field.
pub const DECIMAL_POINT: u8 = b'.';

/// One of the two axes of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// North/south axis, bounded by ±90 degrees.
    Latitude,
    /// East/west axis, bounded by ±180 degrees.
    Longitude,
}

impl Axis {
    /// Maximum absolute value in whole degrees.
    pub const fn max_degrees(self) -> u16 {
        match self {
            Axis::Latitude => MAX_ABS_LATITUDE,
            Axis::Longitude => MAX_ABS_LONGITUDE,
        }
    }

    /// Number of digits used for whole degrees when encoding.
    pub const fn degree_width(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    /// The decimal point of an incoming field must sit strictly before this
    /// index (room for an optional sign plus the degree digits).
    pub const fn decimal_point_limit(self) -> usize {
        self.degree_width() + 2
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Sign of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sign {
    /// North or east. Also used when the record omits the sign.
    #[default]
    Positive,
    /// South or west.
    Negative,
}

impl Sign {
    /// Sign character used in the wire record.
    pub const fn as_byte(self) -> u8 {
        match self {
            Sign::Positive => b'+',
            Sign::Negative => b'-',
        }
    }

    /// Parse a leading sign byte, if the byte is one.
    pub const fn from_byte(byte: u8) -> Option<Sign> {
        match byte {
            b'+' => Some(Sign::Positive),
            b'-' => Some(Sign::Negative),
            _ => None,
        }
    }

    /// `1` or `-1`.
    pub const fn signum(self) -> i8 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }
}

/// One axis of a location in fixed-point form.
///
/// The value is `sign * (degrees + decimal / 1_000_000)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Sign of the value.
    pub sign: Sign,
    /// Whole degrees.
    pub degrees: u16,
    /// Fractional degrees in millionths (`0..1_000_000`).
    pub decimal: u32,
}

impl Coordinate {
    /// Create a coordinate from its parts.
    pub const fn new(sign: Sign, degrees: u16, decimal: u32) -> Self {
        Coordinate {
            sign,
            degrees,
            decimal,
        }
    }

    /// Value in degrees as a float, for display and logging.
    pub fn to_degrees(&self) -> f64 {
        let magnitude = self.degrees as f64 + self.decimal as f64 / DECIMAL_SCALE as f64;
        self.sign.signum() as f64 * magnitude
    }

    /// Check the axis invariants: whole degrees within the bound, a decimal
    /// part below the fixed-point scale, and no fraction at the bound itself.
    pub fn is_within(&self, axis: Axis) -> bool {
        let max = axis.max_degrees();
        self.decimal < DECIMAL_SCALE
            && (self.degrees < max || (self.degrees == max && self.decimal == 0))
    }
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocationFix {
    /// North/south component.
    pub latitude: Coordinate,
    /// East/west component.
    pub longitude: Coordinate,
}

impl LocationFix {
    /// Create a fix from two coordinates.
    pub const fn new(latitude: Coordinate, longitude: Coordinate) -> Self {
        LocationFix {
            latitude,
            longitude,
        }
    }

    /// Both axes as floating point degrees `(latitude, longitude)`.
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.latitude.to_degrees(), self.longitude.to_degrees())
    }

    /// Whether both axes satisfy their bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_within(Axis::Latitude) && self.longitude.is_within(Axis::Longitude)
    }
}

impl fmt::Display for LocationFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = crate::codec::encode(self);
        // The encoder only emits ASCII.
        f.write_str(&String::from_utf8_lossy(&record))
    }
}
