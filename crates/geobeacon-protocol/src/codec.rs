//! Coordinate record codec.
//!
//! A record is two axis fields joined by a comma:
//!
//! ```text
//! [+|-]DD.DDDDDD,[+|-]DDD.DDDDDD
//! ```
//!
//! The sign is optional on input and defaults to positive. The fractional part
//! always has exactly six digits. Latitude is bounded by 90 degrees and
//! longitude by 180; at the bound itself every fractional digit must be zero.
//!
//! [`decode`] trusts its input. Always run [`validate`] (or use [`parse`],
//! which does both) before decoding bytes that came off the wire.

use crate::error::{CodecError, CodecResult};
use crate::types::{
    Axis, Coordinate, LocationFix, Sign, AXIS_SEPARATOR, DECIMAL_POINT, DECIMAL_PRECISION,
    LATITUDE_FIELD_LEN, RECORD_LEN,
};

// ============================================================================
// Validation
// ============================================================================

/// Check a candidate record against the grammar and the axis bounds.
pub fn validate(record: &[u8]) -> bool {
    validate_detailed(record).is_ok()
}

/// Check a candidate record, reporting the first rule it breaks.
pub fn validate_detailed(record: &[u8]) -> CodecResult<()> {
    let separator = find_separator(record)?;
    validate_axis(&record[..separator], Axis::Latitude)?;
    validate_axis(&record[separator + 1..], Axis::Longitude)
}

/// Validate then decode a candidate record.
pub fn parse(record: &[u8]) -> CodecResult<LocationFix> {
    validate_detailed(record)?;
    Ok(decode(record))
}

fn find_separator(record: &[u8]) -> CodecResult<usize> {
    match record.iter().position(|&b| b == AXIS_SEPARATOR) {
        Some(pos) if pos > 0 && pos + 1 < record.len() => Ok(pos),
        _ => Err(CodecError::MissingSeparator),
    }
}

fn validate_axis(field: &[u8], axis: Axis) -> CodecResult<()> {
    let max_index = axis.decimal_point_limit();
    let point = field
        .iter()
        .position(|&b| b == DECIMAL_POINT)
        .filter(|&pos| pos < max_index)
        .ok_or(CodecError::MissingDecimalPoint { axis, max_index })?;

    let fraction = &field[point + 1..];
    if fraction.len() != DECIMAL_PRECISION {
        return Err(CodecError::FractionLength {
            axis,
            expected: DECIMAL_PRECISION,
            actual: fraction.len(),
        });
    }

    let start = usize::from(Sign::from_byte(field[0]).is_some());
    if start == point {
        // No degree digits at all, e.g. "+.123456".
        return Err(CodecError::InvalidDigit {
            axis,
            offset: point,
            byte: DECIMAL_POINT,
        });
    }

    // At most four digits fit before the point, so u16 cannot overflow.
    let mut degrees: u16 = 0;
    for (offset, &byte) in field.iter().enumerate().take(point).skip(start) {
        if !byte.is_ascii_digit() {
            return Err(CodecError::InvalidDigit { axis, offset, byte });
        }
        degrees = degrees * 10 + u16::from(byte - b'0');
    }

    let max = axis.max_degrees();
    if degrees > max {
        return Err(CodecError::OutOfRange { axis, max });
    }

    for (i, &byte) in fraction.iter().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(CodecError::InvalidDigit {
                axis,
                offset: point + 1 + i,
                byte,
            });
        }
        if degrees == max && byte != b'0' {
            return Err(CodecError::OutOfRange { axis, max });
        }
    }

    Ok(())
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a record that has already passed [`validate`].
///
/// No checks are repeated here. Unvalidated input never panics but produces
/// an unspecified fix.
pub fn decode(record: &[u8]) -> LocationFix {
    let separator = record
        .iter()
        .position(|&b| b == AXIS_SEPARATOR)
        .unwrap_or(record.len());
    let (latitude, rest) = record.split_at(separator);
    let longitude = rest.get(1..).unwrap_or_default();

    LocationFix::new(decode_axis(latitude), decode_axis(longitude))
}

fn decode_axis(field: &[u8]) -> Coordinate {
    let point = field
        .iter()
        .position(|&b| b == DECIMAL_POINT)
        .unwrap_or(field.len());

    let (sign, start) = match field.first().copied().and_then(Sign::from_byte) {
        Some(sign) => (sign, 1),
        None => (Sign::Positive, 0),
    };

    let degrees = field
        .get(start..point)
        .unwrap_or_default()
        .iter()
        .fold(0u16, |acc, &b| {
            acc.wrapping_mul(10).wrapping_add(u16::from(b.wrapping_sub(b'0')))
        });

    let decimal = field
        .get(point + 1..)
        .unwrap_or_default()
        .iter()
        .fold(0u32, |acc, &b| {
            acc.wrapping_mul(10).wrapping_add(u32::from(b.wrapping_sub(b'0')))
        });

    Coordinate::new(sign, degrees, decimal)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a fix as a fixed-width record: `±DD.DDDDDD,±DDD.DDDDDD`.
pub fn encode(fix: &LocationFix) -> [u8; RECORD_LEN] {
    let mut record = [0u8; RECORD_LEN];
    write_axis(
        &mut record[..LATITUDE_FIELD_LEN],
        &fix.latitude,
        Axis::Latitude,
    );
    record[LATITUDE_FIELD_LEN] = AXIS_SEPARATOR;
    write_axis(
        &mut record[LATITUDE_FIELD_LEN + 1..],
        &fix.longitude,
        Axis::Longitude,
    );
    record
}

/// Encode a fix into a caller-provided buffer.
///
/// The buffer must be exactly [`RECORD_LEN`] bytes. Otherwise it is left
/// untouched and an error is returned.
pub fn encode_into(fix: &LocationFix, buffer: &mut [u8]) -> CodecResult<()> {
    if buffer.len() != RECORD_LEN {
        return Err(CodecError::BufferSize {
            expected: RECORD_LEN,
            actual: buffer.len(),
        });
    }
    buffer.copy_from_slice(&encode(fix));
    Ok(())
}

fn write_axis(field: &mut [u8], coordinate: &Coordinate, axis: Axis) {
    let width = axis.degree_width();
    field[0] = coordinate.sign.as_byte();
    write_digits(&mut field[1..=width], u32::from(coordinate.degrees));
    field[width + 1] = DECIMAL_POINT;
    write_digits(&mut field[width + 2..], coordinate.decimal);
}

/// Write `value` right-aligned and zero-padded, keeping only the low digits
/// that fit.
fn write_digits(out: &mut [u8], mut value: u32) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}
