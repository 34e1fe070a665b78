//! 工具模块
//!
//! 大端整数读取、字节范围切片以及比特字段提取

use crate::error::{RangeError, RangeUnit};

/// 读取 `count` 字节（1~4）的大端无符号整数
///
/// # 参数
/// - `data`: 原始数据
/// - `offset`: 起始字节偏移
/// - `count`: 字节数
///
/// # 返回
/// - `Ok(u32)`: 读取的整数
/// - `Err(RangeError)`: 超出数据边界或字节数非法
pub fn read_be_uint(data: &[u8], offset: usize, count: usize) -> Result<u32, RangeError> {
    let bytes = extract_byte_range(data, offset, count)?;
    if count == 0 || count > 4 {
        return Err(RangeError {
            offset,
            length: count,
            available: 4,
            unit: RangeUnit::Byte,
        });
    }
    Ok(bytes
        .iter()
        .fold(0u32, |value, &byte| (value << 8) | u32::from(byte)))
}

/// 从字节数组中提取指定字节范围
///
/// # 参数
/// - `data`: 原始数据
/// - `byte_offset`: 字节偏移量
/// - `byte_length`: 字节长度
pub fn extract_byte_range(
    data: &[u8],
    byte_offset: usize,
    byte_length: usize,
) -> Result<&[u8], RangeError> {
    let end = byte_offset
        .checked_add(byte_length)
        .filter(|&end| end <= data.len())
        .ok_or(RangeError {
            offset: byte_offset,
            length: byte_length,
            available: data.len(),
            unit: RangeUnit::Byte,
        })?;
    Ok(&data[byte_offset..end])
}

/// 从字节数据中提取bit字段值（MSB优先，bit 0 为首字节最高位）
///
/// 支持跨字节的bit字段，例如从四字节模拟量中取高16位。
///
/// # 示例
/// ```
/// use jtx_core::utils::extract_bit_field;
///
/// let raw = [0x0A, 0x45];
/// assert_eq!(extract_bit_field(&raw, 5, 11).unwrap(), 0x245);
/// ```
pub fn extract_bit_field(
    data: &[u8],
    bit_offset: usize,
    bit_length: usize,
) -> Result<u64, RangeError> {
    let out_of_range = RangeError {
        offset: bit_offset,
        length: bit_length,
        available: data.len() * 8,
        unit: RangeUnit::Bit,
    };
    if bit_length == 0 || bit_length > 64 {
        return Err(out_of_range);
    }
    let end_bit = bit_offset
        .checked_add(bit_length)
        .filter(|&end| end <= data.len() * 8)
        .ok_or(out_of_range)?;

    let start_byte = bit_offset / 8;
    let end_byte = (end_bit - 1) / 8;

    // 涉及的字节最多9个，用u128承载避免溢出
    let value = data[start_byte..=end_byte]
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte));

    let total_bits = (end_byte - start_byte + 1) * 8;
    let shift = total_bits - (bit_offset % 8) - bit_length;
    let mask = if bit_length == 64 {
        u128::from(u64::MAX)
    } else {
        (1u128 << bit_length) - 1
    };

    Ok(((value >> shift) & mask) as u64)
}

/// 提取整数值的 `[start, end)` 比特（LSB为bit 0）
///
/// 范围非法时返回 `None`。
pub fn bit_range(value: u64, start: u32, end: u32) -> Option<u64> {
    if start >= end || end > 64 {
        return None;
    }
    let width = end - start;
    let mask = if width == 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    Some((value >> start) & mask)
}

/// 将字节数组转换为十六进制字符串
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// 将十六进制字符串转换为字节数组，忽略空白字符
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let clean: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(clean)
}
