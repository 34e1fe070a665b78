//! JTX Extra Field Codec
//!
//! 将终端上报消息中的附加信息段（标签-长度-内容的自描述序列，内容可以
//! 递归嵌套）解码为强类型记录：
//!
//! - [`schema`]: 每种记录类型的字段声明与按类型缓存的模式
//! - [`converter`]: 按（数据类型, 字段类型）查找的值转换器
//! - [`decoder`]: 递归遍历TLV段的解码器
//! - [`post_process`]: 拆分字段与切片字段的后处理
//! - [`jt808`]: JT/T 808 位置附加信息记录

pub mod converter;
pub mod cursor;
pub mod decoder;
pub mod jt808;
pub mod post_process;
pub mod schema;

pub use converter::ConverterRegistry;
pub use cursor::{DecodeCursor, Segment};
pub use decoder::{Decoded, ExtraFieldDecoder};
pub use post_process::FieldValue;
pub use schema::{schema_for, ExtraMsgBody, FieldDescriptor, SchemaBuilder, TypeSchema};

pub use jtx_core::{DataType, DecodeError, DecodeIssue, DecoderConfig, Width};
