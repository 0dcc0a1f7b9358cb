// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cursor for reading values out of the binary format.

use byteorder::{BigEndian, ByteOrder};

use super::codes;
use crate::core::config::DEFAULT_MAX_DEPTH;
use crate::core::{CodecError, DescribedValue, Result, Value};

/// Cursor that tracks the read position and nesting depth.
///
/// Every read is bounds-checked; a short buffer yields
/// [`CodecError::BufferTooShort`] rather than a panic.
pub struct WireCursor<'a> {
    /// The data buffer
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Current nesting depth of lists, maps and described values
    depth: usize,
    /// Maximum nesting depth
    max_depth: usize,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    /// Create a cursor with a custom nesting limit.
    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            offset: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if the cursor consumed all data.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Consume `n` raw bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::buffer_too_short(
                n,
                self.remaining(),
                self.offset,
            ));
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    /// Read one value, recursively.
    pub fn read_value(&mut self) -> Result<Value> {
        let position = self.offset;
        let code = self.read_u8()?;
        let value = match code {
            codes::DESCRIBED => {
                self.enter()?;
                let descriptor = self.read_value()?;
                let value = self.read_value()?;
                self.depth -= 1;
                Value::Described(Box::new(DescribedValue { descriptor, value }))
            }
            codes::NULL => Value::Null,
            codes::TRUE => Value::Bool(true),
            codes::FALSE => Value::Bool(false),
            codes::UINT0 => Value::UInt(0),
            codes::ULONG0 => Value::ULong(0),
            codes::LIST0 => Value::List(Vec::new()),
            codes::UBYTE => Value::UByte(self.read_u8()?),
            codes::BYTE => Value::Byte(self.read_u8()? as i8),
            codes::SMALLUINT => Value::UInt(u32::from(self.read_u8()?)),
            codes::SMALLULONG => Value::ULong(u64::from(self.read_u8()?)),
            codes::SMALLINT => Value::Int(i32::from(self.read_u8()? as i8)),
            codes::SMALLLONG => Value::Long(i64::from(self.read_u8()? as i8)),
            codes::USHORT => Value::UShort(BigEndian::read_u16(self.take(2)?)),
            codes::SHORT => Value::Short(BigEndian::read_i16(self.take(2)?)),
            codes::UINT => Value::UInt(self.read_u32()?),
            codes::INT => Value::Int(BigEndian::read_i32(self.take(4)?)),
            codes::FLOAT => Value::Float(BigEndian::read_f32(self.take(4)?)),
            codes::CHAR => {
                let scalar = self.read_u32()?;
                let c = char::from_u32(scalar).ok_or_else(|| {
                    CodecError::malformed(format!(
                        "invalid char scalar 0x{scalar:x} at position {position}"
                    ))
                })?;
                Value::Char(c)
            }
            codes::ULONG => Value::ULong(BigEndian::read_u64(self.take(8)?)),
            codes::LONG => Value::Long(BigEndian::read_i64(self.take(8)?)),
            codes::DOUBLE => Value::Double(BigEndian::read_f64(self.take(8)?)),
            codes::TIMESTAMP => Value::Timestamp(BigEndian::read_i64(self.take(8)?)),
            codes::VBIN8 | codes::VBIN32 => {
                let len = self.read_length(code == codes::VBIN8)?;
                Value::Binary(self.take(len)?.to_vec())
            }
            codes::STR8 | codes::STR32 => {
                let len = self.read_length(code == codes::STR8)?;
                Value::String(self.read_utf8(len, position)?)
            }
            codes::SYM8 | codes::SYM32 => {
                let len = self.read_length(code == codes::SYM8)?;
                Value::Symbol(self.read_utf8(len, position)?)
            }
            codes::LIST8 | codes::LIST32 => {
                Value::List(self.read_compound(code == codes::LIST8, position)?)
            }
            codes::MAP8 | codes::MAP32 => {
                let items = self.read_compound(code == codes::MAP8, position)?;
                if items.len() % 2 != 0 {
                    return Err(CodecError::malformed(format!(
                        "map at position {position} has an odd element count {}",
                        items.len()
                    )));
                }
                let mut entries = Vec::with_capacity(items.len() / 2);
                let mut iter = items.into_iter();
                while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                    entries.push((key, value));
                }
                Value::Map(entries)
            }
            other => return Err(CodecError::InvalidFormatCode { code: other, position }),
        };
        Ok(value)
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn read_length(&mut self, short: bool) -> Result<usize> {
        if short {
            Ok(usize::from(self.read_u8()?))
        } else {
            Ok(self.read_u32()? as usize)
        }
    }

    fn read_utf8(&mut self, len: usize, position: usize) -> Result<String> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            CodecError::malformed(format!("invalid UTF-8 at position {position}: {e}"))
        })
    }

    /// Size and count prefix, then `count` values which must fill `size` exactly.
    fn read_compound(&mut self, short: bool, position: usize) -> Result<Vec<Value>> {
        let size = self.read_length(short)?;
        let count_width = if short { 1 } else { 4 };
        if size < count_width || self.remaining() < size {
            return Err(CodecError::buffer_too_short(
                size.max(count_width),
                self.remaining(),
                self.offset,
            ));
        }
        let end = self.offset + size;
        let count = self.read_length(short)?;

        self.enter()?;
        // Each element takes at least one byte, cap the preallocation by that.
        let mut items = Vec::with_capacity(count.min(end - self.offset));
        for _ in 0..count {
            if self.offset >= end {
                return Err(CodecError::malformed(format!(
                    "compound at position {position} declares {count} elements but its size ends early"
                )));
            }
            items.push(self.read_value()?);
        }
        self.depth -= 1;

        if self.offset != end {
            return Err(CodecError::malformed(format!(
                "compound at position {position} declares size {size} but its elements end at offset {}",
                self.offset
            )));
        }
        Ok(items)
    }
}
