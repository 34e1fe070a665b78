//! TLV段游标
//!
//! 在不可变缓冲区的 `[start, bound)` 窗口内逐段前进，只进不退。
//! 段头和段体在切片之前都做边界检查，越界返回
//! [`DecodeIssue::TruncatedSegment`]，不会读到窗口之外。

use bytes::Bytes;
use jtx_core::utils::read_be_uint;
use jtx_core::{DecodeIssue, Width};

/// 一个完整的TLV段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 段标签
    pub tag: u32,
    /// 段头在缓冲区中的偏移
    pub offset: usize,
    /// 段内容（与原缓冲区共享内存）
    pub body: Bytes,
}

impl Segment {
    /// 段在缓冲区中占用的总字节数
    pub fn encoded_len(&self, tag_width: Width, length_width: Width) -> usize {
        tag_width.bytes() + length_width.bytes() + self.body.len()
    }
}

/// 解码游标
#[derive(Debug)]
pub struct DecodeCursor<'a> {
    buffer: &'a Bytes,
    position: usize,
    bound: usize,
}

impl<'a> DecodeCursor<'a> {
    /// 创建游标，窗口被收紧到缓冲区之内
    pub fn new(buffer: &'a Bytes, start: usize, bound: usize) -> Self {
        let bound = bound.min(buffer.len());
        Self {
            buffer,
            position: start.min(bound),
            bound,
        }
    }

    /// 当前偏移
    pub fn position(&self) -> usize {
        self.position
    }

    /// 窗口内剩余字节数
    pub fn remaining(&self) -> usize {
        self.bound - self.position
    }

    /// 窗口是否已经走完
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.bound
    }

    /// 读取下一个段
    ///
    /// 成功时游标前进到段尾；失败时游标停在该段的起始位置。
    pub fn next_segment(
        &mut self,
        tag_width: Width,
        length_width: Width,
    ) -> Result<Segment, DecodeIssue> {
        let offset = self.position;
        let available = self.remaining();
        let window = &self.buffer[..self.bound];
        let header_len = tag_width.bytes() + length_width.bytes();

        let tag = read_be_uint(window, offset, tag_width.bytes()).ok();
        if available < header_len {
            return Err(DecodeIssue::TruncatedSegment {
                offset,
                tag,
                needed: header_len,
                available,
            });
        }

        let (Some(tag), Ok(body_len)) = (
            tag,
            read_be_uint(window, offset + tag_width.bytes(), length_width.bytes()),
        ) else {
            return Err(DecodeIssue::TruncatedSegment {
                offset,
                tag,
                needed: header_len,
                available,
            });
        };
        let body_len = body_len as usize;

        let body_start = offset + header_len;
        if body_len > self.bound - body_start {
            return Err(DecodeIssue::TruncatedSegment {
                offset,
                tag: Some(tag),
                needed: header_len + body_len,
                available,
            });
        }

        let body = self.buffer.slice(body_start..body_start + body_len);
        self.position = body_start + body_len;
        Ok(Segment { tag, offset, body })
    }
}
