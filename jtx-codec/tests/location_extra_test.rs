//! JT/T 808 位置附加信息解码测试

use bytes::Bytes;
use jtx_codec::jt808::{LocationExtra, TemperatureBlock, VendorBlock};
use jtx_codec::{DecodeIssue, DecoderConfig, ExtraFieldDecoder};
use jtx_core::utils::hex_to_bytes;

/// 终端上报的附加信息，包含一个未知标签0xEE
const LOCATION_EXTRA_HEX: &str = "01 04 00 00 30 39 \
                                  02 02 01 F6 \
                                  25 04 00 00 00 11 \
                                  2B 04 12 34 AB CD \
                                  30 01 1F \
                                  31 01 0C \
                                  EE 02 AA BB \
                                  E1 1C \
                                  00 01 00 02 2E E0 \
                                  00 02 00 06 56 31 2E 32 00 00 \
                                  00 10 00 08 01 02 54 31 02 02 00 FA";

fn payload() -> Vec<u8> {
    hex_to_bytes(LOCATION_EXTRA_HEX).unwrap()
}

#[test]
fn test_decode_location_extra() {
    let data = payload();
    assert_eq!(data.len(), 62);

    let decoder = ExtraFieldDecoder::default();
    let decoded = decoder.decode_slice::<LocationExtra>(&data);
    assert!(decoded.is_clean(), "issues: {:?}", decoded.issues);
    assert_eq!(decoded.consumed, data.len());

    let extra = decoded.record;
    assert_eq!(extra.mileage, Some(12_345));
    assert_eq!(extra.mileage_km(), Some(1234.5));
    assert_eq!(extra.fuel, Some(502));
    assert_eq!(extra.recorder_speed, None);

    assert_eq!(extra.vehicle_signal, Some(0x11));
    assert!(extra.low_beam);
    assert!(!extra.high_beam);
    assert!(extra.brake);

    assert_eq!(extra.analog, Some(0x1234_ABCD));
    assert_eq!(extra.ad1, Some(0x1234));
    assert_eq!(extra.ad0, Some(0xABCD));

    assert_eq!(extra.signal_strength, Some(31));
    assert_eq!(extra.gnss_satellites, Some(12));

    assert_eq!(
        extra.vendor,
        Some(VendorBlock {
            voltage: Some(12_000),
            firmware: Some("V1.2".to_string()),
            build_time: None,
            temperature: Some(TemperatureBlock {
                probe_id: Some("T1".to_string()),
                tenths: Some(250),
            }),
        })
    );
}

#[test]
fn test_decode_inside_full_message_body() {
    // 0x0200消息体：28字节基本信息 + 附加信息
    let mut body = vec![0u8; 28];
    body.extend(payload());
    let body = Bytes::from(body);

    let decoder = ExtraFieldDecoder::default();
    let decoded = decoder
        .decode::<LocationExtra>(&body, 28, body.len() - 28)
        .unwrap();
    assert!(decoded.is_clean());
    assert_eq!(decoded.record.gnss_satellites, Some(12));
}

#[test]
fn test_string_padding_kept_when_configured() {
    let config = DecoderConfig {
        trim_string_padding: false,
        ..DecoderConfig::default()
    };
    let decoder = ExtraFieldDecoder::with_config(config);
    let decoded = decoder.decode_slice::<LocationExtra>(&payload());

    let firmware = decoded.record.vendor.and_then(|v| v.firmware);
    assert_eq!(firmware.as_deref(), Some("V1.2\0\0"));
}

#[test]
fn test_malformed_vendor_block_keeps_siblings() {
    // 厂商块内电压段声明16字节，实际只有2字节
    let data = hex_to_bytes("02 02 01 F6 E1 06 00 01 00 10 2E E0 31 01 0C").unwrap();

    let decoder = ExtraFieldDecoder::default();
    let decoded = decoder.decode_slice::<LocationExtra>(&data);

    assert_eq!(decoded.record.fuel, Some(502));
    assert_eq!(decoded.record.gnss_satellites, Some(12));
    assert_eq!(decoded.record.vendor, Some(VendorBlock::default()));
    assert_eq!(decoded.consumed, data.len());
    assert_eq!(
        decoded.issues,
        vec![DecodeIssue::NestedDecodeFailure {
            tag: 0xE1,
            field: "vendor",
            issues: vec![DecodeIssue::TruncatedSegment {
                offset: 0,
                tag: Some(0x0001),
                needed: 20,
                available: 6,
            }],
        }]
    );
}

#[test]
fn test_wrong_length_reports_conversion_failure() {
    // 0x30信号强度应为1字节
    let data = hex_to_bytes("30 02 00 1F 31 01 0C").unwrap();

    let decoder = ExtraFieldDecoder::default();
    let decoded = decoder.decode_slice::<LocationExtra>(&data);

    assert_eq!(decoded.record.signal_strength, None);
    assert_eq!(decoded.record.gnss_satellites, Some(12));
    assert!(matches!(
        decoded.issues.as_slice(),
        [DecodeIssue::ConversionFailed {
            tag: 0x30,
            field: "signal_strength",
            ..
        }]
    ));
}

#[test]
fn test_record_serializes_to_json() {
    let decoder = ExtraFieldDecoder::default();
    let decoded = decoder.decode_slice::<LocationExtra>(&payload());

    let json = serde_json::to_value(&decoded.record).unwrap();
    assert_eq!(json["mileage"], 12_345);
    assert_eq!(json["ad0"], 0xABCD);
    assert_eq!(json["vendor"]["temperature"]["probe_id"], "T1");
}
