//! 内置转换器

use jtx_core::{ConvertError, DataType, DecoderConfig};

use super::ConverterRegistry;

pub(super) fn register_defaults(registry: &mut ConverterRegistry) {
    registry
        .register(DataType::Byte, |body, _| fixed::<1>(body).map(u8::from_be_bytes))
        .register(DataType::Word, |body, _| fixed::<2>(body).map(u16::from_be_bytes))
        .register(DataType::Dword, |body, _| fixed::<4>(body).map(u32::from_be_bytes))
        .register(DataType::Qword, |body, _| fixed::<8>(body).map(u64::from_be_bytes))
        .register(DataType::Bytes, |body, _| Ok(body.to_vec()))
        .register(DataType::Bytes, |body, _| Ok(body.clone()))
        .register(DataType::String, |body, config| Ok(decode_string(body, config)))
        .register(DataType::Bcd8421, |body, _| decode_bcd(body));
}

/// 定长大端整数的字节数必须精确匹配
fn fixed<const N: usize>(body: &[u8]) -> Result<[u8; N], ConvertError> {
    <[u8; N]>::try_from(body).map_err(|_| ConvertError::UnexpectedLength {
        expected: N,
        actual: body.len(),
    })
}

fn decode_string(body: &[u8], config: &DecoderConfig) -> String {
    let text = String::from_utf8_lossy(body);
    let text: &str = if config.trim_string_padding {
        text.trim_end_matches(|c: char| c == '\0' || c == ' ')
    } else {
        &text
    };
    text.to_owned()
}

fn decode_bcd(body: &[u8]) -> Result<String, ConvertError> {
    let mut digits = String::with_capacity(body.len() * 2);
    for (offset, &byte) in body.iter().enumerate() {
        let (high, low) = (byte >> 4, byte & 0x0F);
        if high > 9 || low > 9 {
            return Err(ConvertError::InvalidBcd { offset, byte });
        }
        digits.push(char::from(b'0' + high));
        digits.push(char::from(b'0' + low));
    }
    Ok(digits)
}
