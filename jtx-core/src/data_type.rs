//! 协议数据类型标识
//!
//! 附加信息项在协议文档中声明的数据类型，转换器按
//! （数据类型, 目标字段类型）查找。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 协议数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 无符号单字节整型
    Byte,
    /// 无符号双字节整型（大端）
    Word,
    /// 无符号四字节整型（大端）
    Dword,
    /// 无符号八字节整型（大端）
    Qword,
    /// 原始字节序列
    Bytes,
    /// 字符串
    String,
    /// 8421码BCD
    Bcd8421,
    /// 厂商自定义类型
    Other(u16),
}

impl DataType {
    /// 定长类型的字节数；变长类型返回 `None`
    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            DataType::Byte => Some(1),
            DataType::Word => Some(2),
            DataType::Dword => Some(4),
            DataType::Qword => Some(8),
            DataType::Bytes | DataType::String | DataType::Bcd8421 | DataType::Other(_) => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Byte => write!(f, "BYTE"),
            DataType::Word => write!(f, "WORD"),
            DataType::Dword => write!(f, "DWORD"),
            DataType::Qword => write!(f, "QWORD"),
            DataType::Bytes => write!(f, "BYTES"),
            DataType::String => write!(f, "STRING"),
            DataType::Bcd8421 => write!(f, "BCD_8421"),
            DataType::Other(id) => write!(f, "OTHER({id:#06x})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_len() {
        assert_eq!(DataType::Byte.fixed_len(), Some(1));
        assert_eq!(DataType::Dword.fixed_len(), Some(4));
        assert_eq!(DataType::String.fixed_len(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Bcd8421.to_string(), "BCD_8421");
        assert_eq!(DataType::Other(0x1F).to_string(), "OTHER(0x001f)");
    }
}
