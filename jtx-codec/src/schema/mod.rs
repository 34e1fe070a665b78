//! 记录类型的字段模式
//!
//! 记录类型实现 [`ExtraMsgBody`]，在 `describe` 中向 [`SchemaBuilder`]
//! 声明自己的附加信息字段。模式只在首次使用时构建一次，之后解码只查表，
//! 不再检查类型本身。

mod cache;

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use bytes::Bytes;
use jtx_core::{ConvertError, DataType, DecodeIssue, Width};
use serde::Serialize;

use crate::converter::ConvertedValue;
use crate::decoder::ExtraFieldDecoder;
use crate::post_process::{FieldValue, SlicedField, SplitTarget};

pub use cache::{schema_for, SchemaCache};

/// 附加信息记录类型
///
/// ```
/// use jtx_codec::{DataType, ExtraMsgBody, SchemaBuilder};
///
/// #[derive(Debug, Default)]
/// struct Mileage {
///     km: Option<u32>,
/// }
///
/// impl ExtraMsgBody for Mileage {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.leaf(0x01, "km", DataType::Dword, |m: &mut Self, v| m.km = Some(v));
///     }
/// }
/// ```
pub trait ExtraMsgBody: Default + 'static {
    /// 标签字节数
    const TAG_WIDTH: Width = Width::One;
    /// 长度字节数
    const LENGTH_WIDTH: Width = Width::One;

    /// 声明字段
    fn describe(schema: &mut SchemaBuilder<Self>);
}

type AssignFn<T> =
    Box<dyn Fn(&mut T, ConvertedValue) -> Result<Option<u64>, ConvertError> + Send + Sync>;

type NestedFn<T> =
    Box<dyn Fn(&mut T, &ExtraFieldDecoder, &Bytes, usize) -> Vec<DecodeIssue> + Send + Sync>;

/// 叶子字段：内容交给转换器
pub struct LeafMapping<T> {
    data_type: DataType,
    value_type: TypeId,
    value_type_name: &'static str,
    assign: AssignFn<T>,
    splits: Vec<SplitTarget<T>>,
}

impl<T> LeafMapping<T> {
    /// 声明的协议数据类型
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// 字段的静态类型
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// 拆分目标
    pub fn splits(&self) -> &[SplitTarget<T>] {
        &self.splits
    }

    /// 赋值，返回拆分用的整数值
    pub(crate) fn assign(
        &self,
        record: &mut T,
        value: ConvertedValue,
    ) -> Result<Option<u64>, ConvertError> {
        (self.assign)(record, value)
    }
}

/// 嵌套字段：内容按子记录类型自己的模式递归解码
pub struct NestedMapping<T> {
    record_type: &'static str,
    tag_width: Width,
    length_width: Width,
    decode: NestedFn<T>,
}

impl<T> NestedMapping<T> {
    /// 子记录类型名
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    /// 子记录的标签字节数
    pub fn tag_width(&self) -> Width {
        self.tag_width
    }

    /// 子记录的长度字节数
    pub fn length_width(&self) -> Width {
        self.length_width
    }

    pub(crate) fn decode(
        &self,
        record: &mut T,
        decoder: &ExtraFieldDecoder,
        body: &Bytes,
        depth: usize,
    ) -> Vec<DecodeIssue> {
        (self.decode)(record, decoder, body, depth)
    }
}

/// 字段种类，在模式构建时确定
pub enum FieldKind<T> {
    Leaf(LeafMapping<T>),
    Nested(NestedMapping<T>),
}

/// 单个字段的映射信息
pub struct FieldMapping<T> {
    tag: u32,
    name: &'static str,
    kind: FieldKind<T>,
}

impl<T> FieldMapping<T> {
    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind<T> {
        &self.kind
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, FieldKind::Nested(_))
    }

    /// 与记录类型无关的字段描述
    pub fn descriptor(&self) -> FieldDescriptor {
        let kind = match &self.kind {
            FieldKind::Leaf(leaf) => DescriptorKind::Leaf {
                data_type: leaf.data_type,
                value_type: leaf.value_type_name,
                splits: leaf.splits.iter().map(SplitTarget::name).collect(),
            },
            FieldKind::Nested(nested) => DescriptorKind::Nested {
                record_type: nested.record_type,
                tag_width: nested.tag_width,
                length_width: nested.length_width,
            },
        };
        FieldDescriptor {
            tag: self.tag,
            name: self.name,
            kind,
        }
    }
}

/// 字段描述（可比较、可序列化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub tag: u32,
    pub name: &'static str,
    pub kind: DescriptorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DescriptorKind {
    Leaf {
        data_type: DataType,
        value_type: &'static str,
        splits: Vec<&'static str>,
    },
    Nested {
        record_type: &'static str,
        tag_width: Width,
        length_width: Width,
    },
}

/// 一个记录类型的完整模式
pub struct TypeSchema<T> {
    record_type: &'static str,
    tag_width: Width,
    length_width: Width,
    fields: Vec<FieldMapping<T>>,
    by_tag: HashMap<u32, usize>,
    sliced: Vec<SlicedField<T>>,
}

impl<T: ExtraMsgBody> TypeSchema<T> {
    /// 运行 `T::describe` 构建模式
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();
        T::describe(&mut builder);
        builder.finish()
    }
}

impl<T> TypeSchema<T> {
    /// 记录类型名
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    pub fn tag_width(&self) -> Width {
        self.tag_width
    }

    pub fn length_width(&self) -> Width {
        self.length_width
    }

    /// 按标签查找字段
    pub fn mapping(&self, tag: u32) -> Option<&FieldMapping<T>> {
        self.by_tag.get(&tag).map(|&index| &self.fields[index])
    }

    /// 按声明顺序的字段
    pub fn fields(&self) -> &[FieldMapping<T>] {
        &self.fields
    }

    /// 按声明顺序的标签
    pub fn tags(&self) -> Vec<u32> {
        self.fields.iter().map(FieldMapping::tag).collect()
    }

    /// 按声明顺序的字段描述
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        self.fields.iter().map(FieldMapping::descriptor).collect()
    }

    /// 切片字段声明
    pub fn sliced(&self) -> &[SlicedField<T>] {
        &self.sliced
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> fmt::Debug for TypeSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("record_type", &self.record_type)
            .field("tag_width", &self.tag_width)
            .field("length_width", &self.length_width)
            .field("fields", &self.descriptors())
            .field(
                "sliced",
                &self.sliced.iter().map(SlicedField::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 字段声明入口
pub struct SchemaBuilder<T> {
    tag_width: Width,
    length_width: Width,
    fields: Vec<FieldMapping<T>>,
    by_tag: HashMap<u32, usize>,
    sliced: Vec<SlicedField<T>>,
}

impl<T: ExtraMsgBody> SchemaBuilder<T> {
    fn new() -> Self {
        Self {
            tag_width: T::TAG_WIDTH,
            length_width: T::LENGTH_WIDTH,
            fields: Vec::new(),
            by_tag: HashMap::new(),
            sliced: Vec::new(),
        }
    }

    /// 声明叶子字段
    ///
    /// # 参数
    /// - `tag`: 段标签
    /// - `name`: 字段名
    /// - `data_type`: 协议数据类型，和 `V` 一起决定使用的转换器
    /// - `setter`: 赋值闭包
    pub fn leaf<V, F>(
        &mut self,
        tag: u32,
        name: &'static str,
        data_type: DataType,
        setter: F,
    ) -> LeafDecl<'_, T>
    where
        V: FieldValue,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign =
            move |record: &mut T, value: ConvertedValue| -> Result<Option<u64>, ConvertError> {
                let value = value
                    .downcast::<V>()
                    .map_err(|_| ConvertError::TypeMismatch {
                        expected: type_name::<V>(),
                    })?;
                let split_source = value.split_source();
                setter(record, *value);
                Ok(split_source)
            };
        let index = self.insert(FieldMapping {
            tag,
            name,
            kind: FieldKind::Leaf(LeafMapping {
                data_type,
                value_type: TypeId::of::<V>(),
                value_type_name: type_name::<V>(),
                assign: Box::new(assign),
                splits: Vec::new(),
            }),
        });
        LeafDecl {
            builder: self,
            index,
        }
    }

    /// 声明嵌套字段，子记录使用 `C` 自己的标签/长度字节数
    pub fn nested<C, F>(&mut self, tag: u32, name: &'static str, setter: F) -> &mut Self
    where
        C: ExtraMsgBody,
        F: Fn(&mut T, C) + Send + Sync + 'static,
    {
        let decode = move |record: &mut T,
                           decoder: &ExtraFieldDecoder,
                           body: &Bytes,
                           depth: usize| {
            let decoded = decoder.decode_nested::<C>(body, depth);
            setter(record, decoded.record);
            decoded.issues
        };
        self.insert(FieldMapping {
            tag,
            name,
            kind: FieldKind::Nested(NestedMapping {
                record_type: type_name::<C>(),
                tag_width: C::TAG_WIDTH,
                length_width: C::LENGTH_WIDTH,
                decode: Box::new(decode),
            }),
        });
        self
    }

    /// 声明按比特切片的字段（源字段原始大端字节，MSB优先）
    pub fn sliced_bits<V, G, F>(
        &mut self,
        name: &'static str,
        source: G,
        bit_offset: usize,
        bit_length: usize,
        setter: F,
    ) -> &mut Self
    where
        V: FieldValue,
        G: Fn(&T) -> Option<&V> + Send + Sync + 'static,
        F: Fn(&mut T, u64) + Send + Sync + 'static,
    {
        self.sliced
            .push(SlicedField::bits(name, source, bit_offset, bit_length, setter));
        self
    }

    /// 声明按字节切片的字段
    pub fn sliced_bytes<V, G, F>(
        &mut self,
        name: &'static str,
        source: G,
        byte_range: Range<usize>,
        setter: F,
    ) -> &mut Self
    where
        V: FieldValue,
        G: Fn(&T) -> Option<&V> + Send + Sync + 'static,
        F: Fn(&mut T, Vec<u8>) + Send + Sync + 'static,
    {
        self.sliced
            .push(SlicedField::bytes(name, source, byte_range, setter));
        self
    }

    /// 同一标签重复声明时，后声明的覆盖先声明的
    fn insert(&mut self, mapping: FieldMapping<T>) -> usize {
        if let Some(&index) = self.by_tag.get(&mapping.tag) {
            tracing::warn!(
                record = type_name::<T>(),
                tag = mapping.tag,
                replaced = self.fields[index].name,
                by = mapping.name,
                "duplicate tag in schema"
            );
            self.fields[index] = mapping;
            return index;
        }
        let index = self.fields.len();
        self.by_tag.insert(mapping.tag, index);
        self.fields.push(mapping);
        index
    }

    fn finish(self) -> TypeSchema<T> {
        TypeSchema {
            record_type: type_name::<T>(),
            tag_width: self.tag_width,
            length_width: self.length_width,
            fields: self.fields,
            by_tag: self.by_tag,
            sliced: self.sliced,
        }
    }
}

/// 叶子字段声明，可以继续追加拆分目标
pub struct LeafDecl<'b, T> {
    builder: &'b mut SchemaBuilder<T>,
    index: usize,
}

impl<T: ExtraMsgBody> LeafDecl<'_, T> {
    /// 把字段值的 `[start, end)` 比特（LSB为bit 0）拆到另一个字段
    pub fn split<F>(self, name: &'static str, bits: Range<u32>, setter: F) -> Self
    where
        F: Fn(&mut T, u64) + Send + Sync + 'static,
    {
        if let Some(FieldMapping {
            kind: FieldKind::Leaf(leaf),
            ..
        }) = self.builder.fields.get_mut(self.index)
        {
            leaf.splits.push(SplitTarget::new(name, bits, setter));
        }
        self
    }

    /// 单比特标志位
    pub fn flag<F>(self, name: &'static str, bit: u32, setter: F) -> Self
    where
        F: Fn(&mut T, bool) + Send + Sync + 'static,
    {
        self.split(name, bit..bit.saturating_add(1), move |record, value| {
            setter(record, value == 1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Inner {
        code: Option<u8>,
    }

    impl ExtraMsgBody for Inner {
        const TAG_WIDTH: Width = Width::Two;
        const LENGTH_WIDTH: Width = Width::Four;

        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.leaf(0x0001, "code", DataType::Byte, |r: &mut Self, v| r.code = Some(v));
        }
    }

    #[derive(Debug, Default)]
    struct Outer {
        status: Option<u32>,
        alarm: bool,
        inner: Option<Inner>,
        high: u64,
    }

    impl ExtraMsgBody for Outer {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema
                .leaf(0x25, "status", DataType::Dword, |r: &mut Self, v| {
                    r.status = Some(v)
                })
                .flag("alarm", 0, |r, v| r.alarm = v);
            schema
                .nested(0xE1, "inner", |r: &mut Self, v| r.inner = Some(v))
                .sliced_bits("high", |r: &Self| r.status.as_ref(), 0, 16, |r, v| {
                    r.high = v
                });
        }
    }

    #[derive(Debug, Default)]
    struct Redeclared {
        first: Option<u8>,
        second: Option<u16>,
    }

    impl ExtraMsgBody for Redeclared {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.leaf(0x01, "first", DataType::Byte, |r: &mut Self, v| r.first = Some(v));
            schema.leaf(0x01, "second", DataType::Word, |r: &mut Self, v| {
                r.second = Some(v)
            });
        }
    }

    #[test]
    fn test_build_schema() {
        let schema = TypeSchema::<Outer>::build();
        assert_eq!(schema.tag_width(), Width::One);
        assert_eq!(schema.length_width(), Width::One);
        assert_eq!(schema.tags(), vec![0x25, 0xE1]);
        assert_eq!(schema.sliced().len(), 1);

        let status = schema.mapping(0x25).unwrap();
        assert!(!status.is_nested());
        match status.kind() {
            FieldKind::Leaf(leaf) => {
                assert_eq!(leaf.data_type(), DataType::Dword);
                assert_eq!(leaf.value_type(), TypeId::of::<u32>());
                assert_eq!(leaf.splits().len(), 1);
                assert_eq!(leaf.splits()[0].bits(), 0..1);
            }
            FieldKind::Nested(_) => panic!("status should be a leaf"),
        }
    }

    #[test]
    fn test_nested_uses_child_widths() {
        let schema = TypeSchema::<Outer>::build();
        let inner = schema.mapping(0xE1).unwrap();
        assert!(inner.is_nested());
        assert_eq!(
            inner.descriptor().kind,
            DescriptorKind::Nested {
                record_type: type_name::<Inner>(),
                tag_width: Width::Two,
                length_width: Width::Four,
            }
        );
    }

    #[test]
    fn test_unknown_tag_has_no_mapping() {
        let schema = TypeSchema::<Outer>::build();
        assert!(schema.mapping(0x99).is_none());
    }

    #[test]
    fn test_duplicate_tag_last_declaration_wins() {
        let schema = TypeSchema::<Redeclared>::build();
        assert_eq!(schema.len(), 1);
        let field = schema.mapping(0x01).unwrap();
        assert_eq!(field.name(), "second");
    }

    #[test]
    fn test_assign_rejects_wrong_type() {
        let schema = TypeSchema::<Inner>::build();
        let Some(FieldKind::Leaf(leaf)) = schema.mapping(0x0001).map(FieldMapping::kind) else {
            panic!("code should be a leaf");
        };
        let mut record = Inner::default();
        let err = leaf.assign(&mut record, Box::new(7u16)).unwrap_err();
        assert_eq!(err, ConvertError::TypeMismatch { expected: "u8" });
        assert_eq!(leaf.assign(&mut record, Box::new(7u8)), Ok(Some(7)));
        assert_eq!(record.code, Some(7));
    }
}
