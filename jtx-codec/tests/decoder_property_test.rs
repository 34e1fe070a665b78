//! 解码器性质测试
//!
//! proptest生成任意字节流和段序列，检查解码器的不变量：
//! - 任意输入都不会panic，消耗字节数不超过窗口
//! - 没有诊断信息时窗口被完整消耗
//! - 未知标签只被跳过，不影响记录
//! - 拆分和切片结果与直接的位运算一致

use jtx_codec::jt808::LocationExtra;
use jtx_codec::{schema_for, ExtraFieldDecoder};
use proptest::prelude::*;

fn known_tags() -> Vec<u32> {
    schema_for::<LocationExtra>().tags()
}

/// 生成一个LocationExtra不认识的段
fn unknown_segment_strategy() -> impl Strategy<Value = Vec<u8>> {
    let known = known_tags();
    let tag = any::<u8>().prop_filter("tag must be unknown", move |t| {
        !known.contains(&u32::from(*t))
    });
    (tag, prop::collection::vec(any::<u8>(), 0..32)).prop_map(|(tag, body)| {
        let mut segment = vec![tag, body.len() as u8];
        segment.extend(body);
        segment
    })
}

proptest! {
    #[test]
    fn prop_arbitrary_input_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let decoder = ExtraFieldDecoder::default();
        let decoded = decoder.decode_slice::<LocationExtra>(&data);

        prop_assert!(decoded.consumed <= data.len());
        if decoded.is_clean() {
            prop_assert_eq!(decoded.consumed, data.len());
        }
    }

    #[test]
    fn prop_unknown_segments_are_skipped(
        segments in prop::collection::vec(unknown_segment_strategy(), 0..8)
    ) {
        let data = segments.concat();
        let decoder = ExtraFieldDecoder::default();
        let decoded = decoder.decode_slice::<LocationExtra>(&data);

        prop_assert!(decoded.is_clean(), "issues: {:?}", decoded.issues);
        prop_assert_eq!(decoded.consumed, data.len());
        prop_assert_eq!(decoded.record, LocationExtra::default());
    }

    #[test]
    fn prop_unknown_segments_do_not_disturb_known(
        before in prop::collection::vec(unknown_segment_strategy(), 0..4),
        after in prop::collection::vec(unknown_segment_strategy(), 0..4),
        mileage in any::<u32>(),
    ) {
        let mut data = before.concat();
        data.extend([0x01, 0x04]);
        data.extend(mileage.to_be_bytes());
        data.extend(after.concat());

        let decoder = ExtraFieldDecoder::default();
        let decoded = decoder.decode_slice::<LocationExtra>(&data);

        prop_assert!(decoded.is_clean());
        prop_assert_eq!(decoded.record.mileage, Some(mileage));
        prop_assert_eq!(decoded.consumed, data.len());
    }

    #[test]
    fn prop_split_and_sliced_match_bit_math(signal in any::<u32>(), analog in any::<u32>()) {
        let mut data = vec![0x2B, 0x04];
        data.extend(analog.to_be_bytes());
        data.extend([0x25, 0x04]);
        data.extend(signal.to_be_bytes());

        let decoder = ExtraFieldDecoder::default();
        let extra = decoder.decode_slice::<LocationExtra>(&data).into_record();

        prop_assert_eq!(extra.ad1, Some((analog >> 16) as u16));
        prop_assert_eq!(extra.ad0, Some((analog & 0xFFFF) as u16));
        prop_assert_eq!(extra.low_beam, signal & 0x01 != 0);
        prop_assert_eq!(extra.high_beam, signal & 0x02 != 0);
        prop_assert_eq!(extra.brake, signal & 0x10 != 0);
    }
}
