//! 解码配置

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// 解码器配置
///
/// 可以从JSON加载，缺省字段取默认值：
///
/// ```
/// use jtx_core::DecoderConfig;
///
/// let config = DecoderConfig::from_json(r#"{ "max_nesting_depth": 3 }"#).unwrap();
/// assert_eq!(config.max_nesting_depth, 3);
/// assert!(config.trim_string_padding);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// 嵌套记录的最大层数（顶层记录为第0层）
    pub max_nesting_depth: usize,
    /// 是否去掉STRING内容末尾的NUL/空格填充
    pub trim_string_padding: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 8,
            trim_string_padding: true,
        }
    }
}

impl DecoderConfig {
    /// 从JSON字符串加载
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从JSON文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
