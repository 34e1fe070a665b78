//! 附加信息解码器
//!
//! 在 `[start, start + length)` 窗口内逐段解析：
//!
//! ```text
//! segment     := tag(TAG_WIDTH bytes, BE) length(LENGTH_WIDTH bytes, BE) body(length bytes)
//! record      := segment*
//! nested-body := record   // 使用子记录类型自己的字节数
//! ```
//!
//! 未知标签和缺失的转换器不会中断解码；越界的段会终止当前记录，
//! 已解码的字段保留。所有诊断信息附加在 [`Decoded`] 上返回。

use bytes::Bytes;
use jtx_core::{DecodeError, DecodeIssue, DecoderConfig};

use crate::converter::ConverterRegistry;
use crate::cursor::DecodeCursor;
use crate::post_process::{apply_sliced, apply_splits};
use crate::schema::{schema_for, ExtraMsgBody, FieldKind};

/// 解码结果
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// 解码出的记录
    pub record: T,
    /// 诊断信息
    pub issues: Vec<DecodeIssue>,
    /// 消耗的字节数；正常结束时等于窗口长度
    pub consumed: usize,
}

impl<T> Decoded<T> {
    /// 没有任何诊断信息
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_record(self) -> T {
        self.record
    }
}

/// 附加信息解码器
#[derive(Debug, Clone)]
pub struct ExtraFieldDecoder {
    registry: ConverterRegistry,
    config: DecoderConfig,
}

impl Default for ExtraFieldDecoder {
    fn default() -> Self {
        Self::new(ConverterRegistry::with_defaults(), DecoderConfig::default())
    }
}

impl ExtraFieldDecoder {
    /// 创建解码器
    pub fn new(registry: ConverterRegistry, config: DecoderConfig) -> Self {
        Self { registry, config }
    }

    /// 使用内置转换器和给定配置
    pub fn with_config(config: DecoderConfig) -> Self {
        Self::new(ConverterRegistry::with_defaults(), config)
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// 解码缓冲区 `[start, start + length)` 为记录 `T`
    ///
    /// # 返回
    /// - `Ok(Decoded<T>)`: 记录及诊断信息（可能只解码了一部分）
    /// - `Err(DecodeError)`: 窗口超出缓冲区
    pub fn decode<T: ExtraMsgBody>(
        &self,
        buffer: &Bytes,
        start: usize,
        length: usize,
    ) -> Result<Decoded<T>, DecodeError> {
        let bound = start
            .checked_add(length)
            .filter(|&end| end <= buffer.len())
            .ok_or(DecodeError::RangeOutOfBounds {
                start,
                length,
                buffer_len: buffer.len(),
            })?;
        Ok(self.walk::<T>(buffer, start, bound, 0))
    }

    /// 解码整个切片
    pub fn decode_slice<T: ExtraMsgBody>(&self, data: &[u8]) -> Decoded<T> {
        let buffer = Bytes::copy_from_slice(data);
        self.walk::<T>(&buffer, 0, buffer.len(), 0)
    }

    /// 解码附加信息并通过 `setter` 赋给所属的消息
    ///
    /// 附加信息记录本身是上层消息的一个字段。
    pub fn decode_into<P, T, F>(
        &self,
        parent: &mut P,
        setter: F,
        buffer: &Bytes,
        start: usize,
        length: usize,
    ) -> Result<Vec<DecodeIssue>, DecodeError>
    where
        T: ExtraMsgBody,
        F: FnOnce(&mut P, T),
    {
        let decoded = self.decode::<T>(buffer, start, length)?;
        setter(parent, decoded.record);
        Ok(decoded.issues)
    }

    /// 嵌套字段的递归入口，`depth` 为父记录的层数
    pub(crate) fn decode_nested<T: ExtraMsgBody>(&self, body: &Bytes, depth: usize) -> Decoded<T> {
        self.walk::<T>(body, 0, body.len(), depth + 1)
    }

    fn walk<T: ExtraMsgBody>(
        &self,
        buffer: &Bytes,
        start: usize,
        bound: usize,
        depth: usize,
    ) -> Decoded<T> {
        let schema = schema_for::<T>();
        let mut record = T::default();
        let mut issues = Vec::new();
        let mut cursor = DecodeCursor::new(buffer, start, bound);

        while !cursor.is_exhausted() {
            let segment = match cursor.next_segment(schema.tag_width(), schema.length_width()) {
                Ok(segment) => segment,
                Err(issue) => {
                    report(&mut issues, issue);
                    break;
                }
            };

            let Some(mapping) = schema.mapping(segment.tag) else {
                tracing::trace!(
                    record = schema.record_type(),
                    tag = segment.tag,
                    len = segment.body.len(),
                    "unknown tag skipped"
                );
                continue;
            };

            match mapping.kind() {
                FieldKind::Nested(nested) => {
                    let nested_issues = if depth >= self.config.max_nesting_depth {
                        vec![DecodeIssue::NestingTooDeep {
                            max_depth: self.config.max_nesting_depth,
                        }]
                    } else {
                        nested.decode(&mut record, self, &segment.body, depth)
                    };
                    if !nested_issues.is_empty() {
                        report(
                            &mut issues,
                            DecodeIssue::NestedDecodeFailure {
                                tag: segment.tag,
                                field: mapping.name(),
                                issues: nested_issues,
                            },
                        );
                    }
                }
                FieldKind::Leaf(leaf) => {
                    let Some(convert) = self.registry.lookup(leaf.data_type(), leaf.value_type())
                    else {
                        report(
                            &mut issues,
                            DecodeIssue::NoConverterFound {
                                tag: segment.tag,
                                field: mapping.name(),
                                data_type: leaf.data_type(),
                                target: leaf.value_type_name(),
                            },
                        );
                        continue;
                    };

                    let assigned = convert(&segment.body, &self.config)
                        .and_then(|value| leaf.assign(&mut record, value));
                    match assigned {
                        Ok(Some(split_source)) => {
                            apply_splits(&mut record, split_source, leaf.splits());
                        }
                        Ok(None) => {}
                        Err(cause) => report(
                            &mut issues,
                            DecodeIssue::ConversionFailed {
                                tag: segment.tag,
                                field: mapping.name(),
                                cause,
                            },
                        ),
                    }
                }
            }
        }

        apply_sliced(&mut record, schema.sliced(), &mut issues);

        let consumed = cursor.position().saturating_sub(start);
        tracing::debug!(
            record = schema.record_type(),
            depth,
            consumed,
            issues = issues.len(),
            "record decoded"
        );

        Decoded {
            record,
            issues,
            consumed,
        }
    }
}

fn report(issues: &mut Vec<DecodeIssue>, issue: DecodeIssue) {
    tracing::warn!(%issue, "extra field issue");
    issues.push(issue);
}
