//! 解码错误定义
//!
//! 错误分为两类：
//! - [`DecodeError`]：调用方违反前置条件，整个解码调用失败
//! - [`DecodeIssue`]：单条记录解码过程中的诊断信息，附加在结果上返回，
//!   不会跨越嵌套边界向上抛出

use thiserror::Error;

use crate::data_type::DataType;

/// 致命错误：解码调用本身无法开始
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// 调用方给出的 `(start, length)` 超出了缓冲区
    #[error("range {start}+{length} exceeds buffer of {buffer_len} bytes")]
    RangeOutOfBounds {
        start: usize,
        length: usize,
        buffer_len: usize,
    },
}

/// 单条记录解码过程中收集到的诊断信息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeIssue {
    /// 叶子字段没有注册对应的转换器，字段保持默认值
    #[error("no converter for field `{field}` (tag {tag:#x}): {data_type} -> {target}")]
    NoConverterFound {
        tag: u32,
        field: &'static str,
        data_type: DataType,
        target: &'static str,
    },

    /// 转换器拒绝了该字段的内容，字段保持默认值
    #[error("field `{field}` (tag {tag:#x}) could not be converted")]
    ConversionFailed {
        tag: u32,
        field: &'static str,
        #[source]
        cause: ConvertError,
    },

    /// 段头或段体超出了当前记录的边界，记录解码在此终止
    #[error("truncated segment at offset {offset} (tag {tag:?}): need {needed} bytes, {available} available")]
    TruncatedSegment {
        offset: usize,
        tag: Option<u32>,
        needed: usize,
        available: usize,
    },

    /// 嵌套记录解码时产生了诊断信息
    #[error("nested field `{field}` (tag {tag:#x}) decoded with {} issue(s)", .issues.len())]
    NestedDecodeFailure {
        tag: u32,
        field: &'static str,
        issues: Vec<DecodeIssue>,
    },

    /// 切片声明超出了源字段的原始字节
    #[error("sliced field `{field}` out of source range")]
    SliceOutOfRange {
        field: &'static str,
        #[source]
        cause: RangeError,
    },

    /// 嵌套层数超过配置上限
    #[error("nesting depth exceeds limit of {max_depth}")]
    NestingTooDeep { max_depth: usize },
}

impl DecodeIssue {
    /// 诊断信息所属的标签（如果有）
    pub fn tag(&self) -> Option<u32> {
        match self {
            DecodeIssue::NoConverterFound { tag, .. }
            | DecodeIssue::ConversionFailed { tag, .. }
            | DecodeIssue::NestedDecodeFailure { tag, .. } => Some(*tag),
            DecodeIssue::TruncatedSegment { tag, .. } => *tag,
            DecodeIssue::SliceOutOfRange { .. } | DecodeIssue::NestingTooDeep { .. } => None,
        }
    }

    /// 是否导致当前记录提前终止
    pub fn is_fatal_for_record(&self) -> bool {
        matches!(
            self,
            DecodeIssue::TruncatedSegment { .. } | DecodeIssue::NestingTooDeep { .. }
        )
    }
}

/// 转换器错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// 定长类型的字节数不匹配
    #[error("expected {expected} bytes, got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },

    /// BCD编码中出现了大于9的半字节
    #[error("invalid BCD byte {byte:#04x} at offset {offset}")]
    InvalidBcd { offset: usize, byte: u8 },

    /// 转换结果与字段的静态类型不一致
    #[error("converted value is not a `{expected}`")]
    TypeMismatch { expected: &'static str },

    /// 自定义转换器的错误
    #[error("{0}")]
    Invalid(String),
}

/// 字节/比特范围越界
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("range {offset}+{length} exceeds {available} available ({unit})")]
pub struct RangeError {
    pub offset: usize,
    pub length: usize,
    pub available: usize,
    pub unit: RangeUnit,
}

/// 范围的计量单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeUnit {
    Bit,
    Byte,
}

impl std::fmt::Display for RangeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeUnit::Bit => write!(f, "bits"),
            RangeUnit::Byte => write!(f, "bytes"),
        }
    }
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
