//! 标签/长度字段宽度

use serde::{Deserialize, Serialize};

/// 标签或长度字段占用的字节数（1~4）
///
/// 用枚举表示，超出范围的宽度无法构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    One,
    Two,
    Three,
    Four,
}

impl Width {
    /// 字节数
    pub const fn bytes(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
            Width::Three => 3,
            Width::Four => 4,
        }
    }

    /// 由字节数构造
    pub const fn from_bytes(count: usize) -> Option<Self> {
        match count {
            1 => Some(Width::One),
            2 => Some(Width::Two),
            3 => Some(Width::Three),
            4 => Some(Width::Four),
            _ => None,
        }
    }
}
