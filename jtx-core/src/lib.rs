//! JTX Core Library
//!
//! 附加信息（extra field）解码系统的基础类型：错误定义、数据类型标识、
//! 字段宽度、解码配置以及字节/比特工具函数。

pub mod config;
pub mod data_type;
pub mod error;
pub mod utils;
pub mod width;

// 导出错误类型
pub use error::{ConfigError, ConvertError, DecodeError, DecodeIssue, RangeError, RangeUnit};

pub use config::DecoderConfig;
pub use data_type::DataType;
pub use width::Width;
