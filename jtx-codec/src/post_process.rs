//! 依赖字段后处理
//!
//! - 拆分（split）：叶子字段赋值之后，立即从它的整数值中按比特范围
//!   拆出其它字段
//! - 切片（sliced）：整条记录遍历完成之后，按声明顺序从已解码字段的
//!   原始大端字节中截取比特/字节范围，赋给目标字段

use std::ops::Range;

use bytes::Bytes;
use jtx_core::utils::{bit_range, extract_bit_field, extract_byte_range};
use jtx_core::DecodeIssue;

/// 可以作为叶子字段值的类型
///
/// 两个方法分别为拆分和切片提供数据源，默认都不提供。
pub trait FieldValue: Send + 'static {
    /// 拆分用的整数值
    fn split_source(&self) -> Option<u64> {
        None
    }

    /// 切片用的原始字节（大端）
    fn raw_bytes(&self) -> Vec<u8> {
        Vec::new()
    }
}

macro_rules! impl_unsigned_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn split_source(&self) -> Option<u64> {
                    Some(u64::from(*self))
                }

                fn raw_bytes(&self) -> Vec<u8> {
                    self.to_be_bytes().to_vec()
                }
            }
        )*
    };
}

impl_unsigned_field_value!(u8, u16, u32, u64);

impl FieldValue for Vec<u8> {
    fn raw_bytes(&self) -> Vec<u8> {
        self.clone()
    }
}

impl FieldValue for Bytes {
    fn raw_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl FieldValue for String {
    fn raw_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

type SplitSetter<T> = Box<dyn Fn(&mut T, u64) + Send + Sync>;

/// 拆分目标：从源值的 `[start, end)` 比特（LSB为bit 0）取值
pub struct SplitTarget<T> {
    pub(crate) name: &'static str,
    pub(crate) bits: Range<u32>,
    pub(crate) set: SplitSetter<T>,
}

impl<T: 'static> SplitTarget<T> {
    pub(crate) fn new<F>(name: &'static str, bits: Range<u32>, set: F) -> Self
    where
        F: Fn(&mut T, u64) + Send + Sync + 'static,
    {
        Self {
            name,
            bits,
            set: Box::new(set),
        }
    }
}

impl<T> SplitTarget<T> {
    /// 目标字段名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 比特范围
    pub fn bits(&self) -> Range<u32> {
        self.bits.clone()
    }
}

/// 叶子字段赋值后调用：把源值拆到各个目标字段
pub(crate) fn apply_splits<T>(record: &mut T, value: u64, targets: &[SplitTarget<T>]) {
    for target in targets {
        match bit_range(value, target.bits.start, target.bits.end) {
            Some(part) => (target.set)(record, part),
            None => tracing::debug!(
                field = target.name,
                bits = ?target.bits,
                "split range outside of 64-bit value, skipped"
            ),
        }
    }
}

type SliceFn<T> = Box<dyn Fn(&mut T) -> Result<(), DecodeIssue> + Send + Sync>;

/// 切片字段声明
pub struct SlicedField<T> {
    pub(crate) name: &'static str,
    pub(crate) apply: SliceFn<T>,
}

impl<T: 'static> SlicedField<T> {
    /// 按比特切片（MSB优先）
    pub(crate) fn bits<V, G, F>(
        name: &'static str,
        source: G,
        bit_offset: usize,
        bit_length: usize,
        setter: F,
    ) -> Self
    where
        V: FieldValue,
        G: Fn(&T) -> Option<&V> + Send + Sync + 'static,
        F: Fn(&mut T, u64) + Send + Sync + 'static,
    {
        let apply = move |record: &mut T| -> Result<(), DecodeIssue> {
            let Some(raw) = source(&*record).map(V::raw_bytes) else {
                return Ok(());
            };
            let value = extract_bit_field(&raw, bit_offset, bit_length)
                .map_err(|cause| DecodeIssue::SliceOutOfRange { field: name, cause })?;
            setter(record, value);
            Ok(())
        };
        Self {
            name,
            apply: Box::new(apply),
        }
    }

    /// 按字节切片
    pub(crate) fn bytes<V, G, F>(
        name: &'static str,
        source: G,
        byte_range: Range<usize>,
        setter: F,
    ) -> Self
    where
        V: FieldValue,
        G: Fn(&T) -> Option<&V> + Send + Sync + 'static,
        F: Fn(&mut T, Vec<u8>) + Send + Sync + 'static,
    {
        let apply = move |record: &mut T| -> Result<(), DecodeIssue> {
            let Some(raw) = source(&*record).map(V::raw_bytes) else {
                return Ok(());
            };
            let length = byte_range.end.saturating_sub(byte_range.start);
            let slice = extract_byte_range(&raw, byte_range.start, length)
                .map_err(|cause| DecodeIssue::SliceOutOfRange { field: name, cause })?;
            setter(record, slice.to_vec());
            Ok(())
        };
        Self {
            name,
            apply: Box::new(apply),
        }
    }
}

impl<T> SlicedField<T> {
    /// 目标字段名
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 记录遍历完成后调用：按声明顺序计算所有切片字段
///
/// 源字段为 `None` 时跳过该切片，目标保持默认值。
pub(crate) fn apply_sliced<T>(
    record: &mut T,
    sliced: &[SlicedField<T>],
    issues: &mut Vec<DecodeIssue>,
) {
    for field in sliced {
        if let Err(issue) = (field.apply)(record) {
            tracing::warn!(field = field.name, %issue, "sliced field skipped");
            issues.push(issue);
        }
    }
}
