//! Framing and codec working together on realistic serial input.

use geobeacon_protocol::{codec, CodecError, FrameAssembler, LocationFix, Sign};

/// Feed `chunks` one pass each, returning every record completed along the way.
fn assemble(chunks: &[&[u8]]) -> Vec<Vec<u8>> {
    let mut assembler = FrameAssembler::new();
    let mut records = Vec::new();
    for chunk in chunks {
        let status = assembler.accumulate_pass(chunk.iter().copied());
        if status.complete {
            if status.has_record() {
                records.push(assembler.frame().to_vec());
            }
            assembler.reset();
        }
    }
    records
}

#[test]
fn test_three_chunk_record_decodes() {
    let records = assemble(&[b"12.345678", b",045.67", b"8901\r\n"]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], b"12.345678,045.678901");

    let fix = codec::parse(&records[0]).expect("record should be valid");
    assert_eq!(fix.latitude.sign, Sign::Positive);
    assert_eq!(fix.latitude.degrees, 12);
    assert_eq!(fix.latitude.decimal, 345_678);
    assert_eq!(fix.longitude.degrees, 45);
    assert_eq!(fix.longitude.decimal, 678_901);
}

#[test]
fn test_byte_at_a_time() {
    let line = b"-33.868820,+151.209296\n";
    let chunks: Vec<&[u8]> = line.chunks(1).collect();
    let records = assemble(&chunks);
    assert_eq!(records.len(), 1);
    assert_eq!(
        codec::parse(&records[0]).unwrap().to_string(),
        "-33.868820,+151.209296"
    );
}

#[test]
fn test_consecutive_lines_in_separate_passes() {
    let records = assemble(&[
        b"+01.000000,+002.000000\r\n",
        b"\r\n",
        b"+03.000000,+004.000000\r\n",
    ]);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| codec::validate(r)));
}

#[test]
fn test_over_long_line_is_rejected_by_codec() {
    let records = assemble(&[b"+12.345678,+045.678901234567890\r\n"]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].len(), geobeacon_protocol::FRAME_CAPACITY);
    assert!(matches!(
        codec::validate_detailed(&records[0]),
        Err(CodecError::FractionLength { .. })
    ));
}

#[test]
fn test_display_matches_encoding() {
    let fix: LocationFix = codec::parse(b"5.5,1.1").unwrap_or_default();
    assert_eq!(fix, LocationFix::default());
    assert_eq!(fix.to_string().as_bytes(), &codec::encode(&fix));
}
