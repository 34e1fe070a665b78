//! 值转换器注册表
//!
//! 按（协议数据类型, 目标字段类型）查找转换函数。转换函数接收段内容，
//! 返回类型擦除后的值，由字段的赋值闭包还原为具体类型。

mod defaults;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use jtx_core::{ConvertError, DataType, DecoderConfig};

use crate::post_process::FieldValue;

/// 类型擦除后的转换结果
pub type ConvertedValue = Box<dyn Any + Send>;

/// 类型擦除后的转换函数
pub type ConvertFn =
    dyn Fn(&Bytes, &DecoderConfig) -> Result<ConvertedValue, ConvertError> + Send + Sync;

/// 转换器查找键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConverterKey {
    pub data_type: DataType,
    pub target: TypeId,
}

impl ConverterKey {
    /// 以 `V` 为目标类型的键
    pub fn of<V: 'static>(data_type: DataType) -> Self {
        Self {
            data_type,
            target: TypeId::of::<V>(),
        }
    }
}

/// 转换器注册表
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<ConverterKey, Arc<ConvertFn>>,
    names: HashMap<ConverterKey, &'static str>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = self
            .names
            .iter()
            .map(|(key, name)| format!("{} -> {name}", key.data_type))
            .collect();
        entries.sort();
        f.debug_struct("ConverterRegistry")
            .field("converters", &entries)
            .finish()
    }
}

impl ConverterRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含内置转换器的注册表
    ///
    /// | 数据类型 | 目标类型 |
    /// |---|---|
    /// | BYTE | `u8` |
    /// | WORD | `u16` |
    /// | DWORD | `u32` |
    /// | QWORD | `u64` |
    /// | BYTES | `Vec<u8>`, `Bytes` |
    /// | STRING | `String` |
    /// | BCD_8421 | `String` |
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        defaults::register_defaults(&mut registry);
        registry
    }

    /// 注册转换器，同一个键重复注册时后者覆盖前者
    pub fn register<V, F>(&mut self, data_type: DataType, convert: F) -> &mut Self
    where
        V: FieldValue,
        F: Fn(&Bytes, &DecoderConfig) -> Result<V, ConvertError> + Send + Sync + 'static,
    {
        let key = ConverterKey::of::<V>(data_type);
        let erased = move |body: &Bytes, config: &DecoderConfig| {
            convert(body, config).map(|value| Box::new(value) as ConvertedValue)
        };
        if self.converters.insert(key, Arc::new(erased)).is_some() {
            tracing::debug!(%data_type, target = type_name::<V>(), "converter replaced");
        }
        self.names.insert(key, type_name::<V>());
        self
    }

    /// 查找转换器
    pub fn lookup(&self, data_type: DataType, target: TypeId) -> Option<&ConvertFn> {
        self.converters
            .get(&ConverterKey { data_type, target })
            .map(|convert| convert.as_ref())
    }

    /// 是否存在以 `V` 为目标类型的转换器
    pub fn contains<V: 'static>(&self, data_type: DataType) -> bool {
        self.converters.contains_key(&ConverterKey::of::<V>(data_type))
    }

    /// 已注册的转换器数量
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
