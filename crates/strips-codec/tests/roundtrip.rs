//! Round-trip tests over the public transcoding boundary.

use strips_codec::{
    decode_downlink, decode_reports_mask, decode_uplink, encode_downlink, encode_reports_mask,
    DownlinkCommand, ReportValue, StripsError, REPORTS, SETTINGS,
};

/// Decode, re-encode and decode again; the bytes and the structure must hold.
fn assert_round_trip(port: u16, bytes: &[u8]) {
    let first = decode_downlink(port, bytes)
        .unwrap_or_else(|e| panic!("decode {} {:02x?}: {}", port, bytes, e));
    let encoded = encode_downlink(&first).expect("encode should succeed");
    assert_eq!(encoded.port, port);
    assert_eq!(encoded.data, hex::encode(bytes));
    assert_eq!(encoded.payload, bytes);

    let second = decode_downlink(encoded.port, &encoded.payload).expect("re-decode should succeed");
    assert_eq!(second, first);
}

// ============================================================================
// Downlink round-trips
// ============================================================================

#[test]
fn test_round_trip_set_setting_every_setting() {
    for setting in SETTINGS.iter() {
        // Values chosen to be canonical for every codec.
        let raw: u32 = match setting.id {
            0x03 | 0x22..=0x25 => 0x1000_0206,
            0x32 => 0x0000_0003,
            _ => 0x0001_F4A0,
        };
        let mut bytes = vec![0x01, setting.id];
        bytes.extend_from_slice(&raw.to_be_bytes());
        assert_round_trip(11, &bytes);
    }
}

#[test]
fn test_round_trip_set_setting_many_groups() {
    let mut bytes = vec![0x01];
    for id in [0x02u8, 0x03, 0x01, 0x32, 0x31] {
        bytes.push(id);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, id & 0x03]);
    }
    assert_round_trip(11, &bytes);
}

#[test]
fn test_round_trip_get_setting() {
    assert_round_trip(11, &[0x02]);
    assert_round_trip(11, &[0x02, 0x00]);
    let all: Vec<u8> = std::iter::once(0x02).chain(SETTINGS.iter().map(|s| s.id)).collect();
    assert_round_trip(11, &all);
}

#[test]
fn test_round_trip_fixed_commands() {
    for (first, last) in [(0u16, 0u16), (1, 0xFFFF), (0x1234, 0x5678)] {
        let [f0, f1] = first.to_be_bytes();
        let [l0, l1] = last.to_be_bytes();
        assert_round_trip(2, &[0x01, f0, f1, l0, l1]);
    }
    for id in [0x00u8, 0x05, 0x09, 0xF0] {
        assert_round_trip(10, &[0x01, id]);
    }
    for minutes in [0u16, 60, 0xFFFF] {
        let [m0, m1] = minutes.to_be_bytes();
        assert_round_trip(10, &[0x08, m0, m1]);
    }
    assert_round_trip(224, &[0x06]);
}

#[test]
fn test_round_trip_through_json() {
    let bytes = [0x01, 0x03, 0x00, 0x00, 0x00, 0x06, 0x32, 0x00, 0x00, 0x00, 0x01];
    let cmd = decode_downlink(11, &bytes).unwrap();
    let json = serde_json::to_string(&cmd).unwrap();
    let parsed = DownlinkCommand::from_json(&serde_json::from_str(&json).unwrap()).unwrap();
    assert_eq!(encode_downlink(&parsed).unwrap().payload, bytes);
}

// ============================================================================
// Literal scenarios
// ============================================================================

#[test]
fn test_set_setting_literal() {
    let cmd = decode_downlink(11, &[0x01, 0x02, 0x00, 0x00, 0x00, 0x03]).unwrap();
    let DownlinkCommand::SetSetting(values) = &cmd else {
        panic!("expected SetSetting, got {:?}", cmd);
    };
    let entry = values.get("BASE_POLL_INTERVAL").unwrap();
    assert_eq!(entry.value, "3");
    assert_eq!(entry.setting.unit, "ms");

    let encoded = encode_downlink(&cmd).unwrap();
    assert!(encoded.data.eq_ignore_ascii_case("010200000003"));
}

#[test]
fn test_unrecognized_port() {
    assert_eq!(
        decode_downlink(999, &[1]),
        Err(StripsError::UnrecognizedDownlink { port: 999, cmd: 1 })
    );
}

#[test]
fn test_unknown_setting_rejected() {
    assert_eq!(decode_downlink(11, &[2, 0xFF]), Err(StripsError::UnknownSetting(0xFF)));
}

#[test]
fn test_unnamed_mask_bits_rejected() {
    // Reports mask bits 29-31 and sensor config bits above 1 have no name,
    // so they could not be encoded back.
    assert_eq!(
        decode_downlink(11, &hex::decode("010320000000").unwrap()),
        Err(StripsError::invalid_value("REPORTS_ENABLED", "0x20000000"))
    );
    assert_eq!(
        decode_downlink(11, &hex::decode("013200000004").unwrap()),
        Err(StripsError::invalid_value("SENSOR_CONFIGURATION", "0x00000004"))
    );
    assert_round_trip(11, &hex::decode("01031fffffff").unwrap());
    assert_round_trip(11, &hex::decode("013200000003").unwrap());
}

#[test]
fn test_repeated_get_setting_id_rejected() {
    assert_eq!(
        decode_downlink(11, &hex::decode("020303").unwrap()),
        Err(StripsError::DuplicateSetting(0x03))
    );
    assert_eq!(
        decode_downlink(11, &hex::decode("02033203").unwrap()),
        Err(StripsError::DuplicateSetting(0x03))
    );
}

#[test]
fn test_repeated_set_setting_id_keeps_last_value() {
    let cmd = decode_downlink(11, &hex::decode("010200000001010200000002").unwrap()).unwrap();
    assert_eq!(encode_downlink(&cmd).unwrap().data, "010200000002");
}

#[test]
fn test_unjoin_size_enforced() {
    assert!(matches!(
        decode_downlink(10, &[8, 0x00]),
        Err(StripsError::BadPackageSize { .. })
    ));
}

#[test]
fn test_end_compliance_test_packet_size() {
    assert_eq!(decode_downlink(224, &[0x06]), Ok(DownlinkCommand::EndComplianceTest));

    // Earlier firmware tooling sent a 2-byte packet; the current format has
    // no payload at all.
    assert_eq!(
        decode_downlink(224, &[0x06, 0x00]),
        Err(StripsError::BadPackageSize {
            command: "End compliance test",
            expected: 1,
            actual: 2
        })
    );
}

#[test]
fn test_uplink_direct_literal() {
    let set = decode_uplink(1, &[0x01, 0x55]).unwrap();
    assert_eq!(set.get("BatteryReport"), Some(&ReportValue::Unsigned(0x55)));
    assert_eq!(set.history_item_count, 0);
}

// ============================================================================
// Bitmask idempotence
// ============================================================================

#[test]
fn test_reports_mask_literal() {
    assert_eq!(encode_reports_mask("BatteryReport|TempReport").unwrap(), 0x0000_0006);
    assert_eq!(decode_reports_mask(0x0000_0006), "BatteryReport|TempReport");
}

#[test]
fn test_reports_mask_every_cardinality() {
    let names: Vec<&str> = REPORTS.iter().map(|r| r.name).collect();
    for n in 0..=names.len() {
        let prefix = names[..n].join("|");
        assert_eq!(decode_reports_mask(encode_reports_mask(&prefix).unwrap()), prefix);

        let suffix = names[names.len() - n..].join("|");
        assert_eq!(decode_reports_mask(encode_reports_mask(&suffix).unwrap()), suffix);
    }

    let alternating: Vec<&str> = names.iter().copied().step_by(2).collect();
    let s = alternating.join("|");
    assert_eq!(decode_reports_mask(encode_reports_mask(&s).unwrap()), s);
}
