// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encoder for the binary value format.

use byteorder::{BigEndian, WriteBytesExt};

use super::codes;
use crate::core::{CodecError, Result, Value};

/// Default initial capacity for the encoder buffer.
const DEFAULT_CAPACITY: usize = 64;

/// Writes [`Value`]s into a byte buffer.
///
/// # Example
///
/// ```
/// use evocodec::encoding::wire::{WireCursor, WireEncoder};
/// use evocodec::Value;
///
/// let mut encoder = WireEncoder::new();
/// encoder.write_value(&Value::Int(42)).unwrap();
/// let bytes = encoder.finish();
///
/// let mut cursor = WireCursor::new(&bytes);
/// assert_eq!(cursor.read_value().unwrap(), Value::Int(42));
/// ```
pub struct WireEncoder {
    buffer: Vec<u8>,
}

impl Default for WireEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl WireEncoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an encoder with a pre-sized buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append raw bytes (used for headers).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Consume the encoder and return the buffer.
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Write one value, recursively.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let out = &mut self.buffer;
        match value {
            Value::Null => out.write_u8(codes::NULL)?,
            Value::Bool(true) => out.write_u8(codes::TRUE)?,
            Value::Bool(false) => out.write_u8(codes::FALSE)?,
            Value::UByte(v) => {
                out.write_u8(codes::UBYTE)?;
                out.write_u8(*v)?;
            }
            Value::Byte(v) => {
                out.write_u8(codes::BYTE)?;
                out.write_i8(*v)?;
            }
            Value::UShort(v) => {
                out.write_u8(codes::USHORT)?;
                out.write_u16::<BigEndian>(*v)?;
            }
            Value::Short(v) => {
                out.write_u8(codes::SHORT)?;
                out.write_i16::<BigEndian>(*v)?;
            }
            Value::UInt(0) => out.write_u8(codes::UINT0)?,
            Value::UInt(v) => match u8::try_from(*v) {
                Ok(small) => {
                    out.write_u8(codes::SMALLUINT)?;
                    out.write_u8(small)?;
                }
                Err(_) => {
                    out.write_u8(codes::UINT)?;
                    out.write_u32::<BigEndian>(*v)?;
                }
            },
            Value::Int(v) => match i8::try_from(*v) {
                Ok(small) => {
                    out.write_u8(codes::SMALLINT)?;
                    out.write_i8(small)?;
                }
                Err(_) => {
                    out.write_u8(codes::INT)?;
                    out.write_i32::<BigEndian>(*v)?;
                }
            },
            Value::ULong(0) => out.write_u8(codes::ULONG0)?,
            Value::ULong(v) => match u8::try_from(*v) {
                Ok(small) => {
                    out.write_u8(codes::SMALLULONG)?;
                    out.write_u8(small)?;
                }
                Err(_) => {
                    out.write_u8(codes::ULONG)?;
                    out.write_u64::<BigEndian>(*v)?;
                }
            },
            Value::Long(v) => match i8::try_from(*v) {
                Ok(small) => {
                    out.write_u8(codes::SMALLLONG)?;
                    out.write_i8(small)?;
                }
                Err(_) => {
                    out.write_u8(codes::LONG)?;
                    out.write_i64::<BigEndian>(*v)?;
                }
            },
            Value::Float(v) => {
                out.write_u8(codes::FLOAT)?;
                out.write_f32::<BigEndian>(*v)?;
            }
            Value::Double(v) => {
                out.write_u8(codes::DOUBLE)?;
                out.write_f64::<BigEndian>(*v)?;
            }
            Value::Char(c) => {
                out.write_u8(codes::CHAR)?;
                out.write_u32::<BigEndian>(*c as u32)?;
            }
            Value::Timestamp(ms) => {
                out.write_u8(codes::TIMESTAMP)?;
                out.write_i64::<BigEndian>(*ms)?;
            }
            Value::Binary(bytes) => self.write_variable(codes::VBIN8, codes::VBIN32, bytes)?,
            Value::String(s) => self.write_variable(codes::STR8, codes::STR32, s.as_bytes())?,
            Value::Symbol(s) => self.write_variable(codes::SYM8, codes::SYM32, s.as_bytes())?,
            Value::List(items) => {
                if items.is_empty() {
                    out.write_u8(codes::LIST0)?;
                } else {
                    let mut body = WireEncoder::new();
                    for item in items {
                        body.write_value(item)?;
                    }
                    self.write_compound(codes::LIST8, codes::LIST32, items.len(), body.finish())?;
                }
            }
            Value::Map(entries) => {
                let mut body = WireEncoder::new();
                for (key, value) in entries {
                    body.write_value(key)?;
                    body.write_value(value)?;
                }
                self.write_compound(codes::MAP8, codes::MAP32, entries.len() * 2, body.finish())?;
            }
            Value::Described(described) => {
                out.write_u8(codes::DESCRIBED)?;
                self.write_value(&described.descriptor)?;
                self.write_value(&described.value)?;
            }
            Value::Instance(instance) => {
                return Err(CodecError::malformed(format!(
                    "live instance of {} reached the value encoder",
                    instance.rust_type()
                )));
            }
        }
        Ok(())
    }

    fn write_variable(&mut self, code8: u8, code32: u8, bytes: &[u8]) -> Result<()> {
        match u8::try_from(bytes.len()) {
            Ok(len) => {
                self.buffer.write_u8(code8)?;
                self.buffer.write_u8(len)?;
            }
            Err(_) => {
                self.buffer.write_u8(code32)?;
                self.buffer.write_u32::<BigEndian>(length_u32(bytes.len())?)?;
            }
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Lists and maps: size covers the count field plus the body.
    fn write_compound(&mut self, code8: u8, code32: u8, count: usize, body: Vec<u8>) -> Result<()> {
        match (u8::try_from(body.len() + 1), u8::try_from(count)) {
            (Ok(size), Ok(count)) => {
                self.buffer.write_u8(code8)?;
                self.buffer.write_u8(size)?;
                self.buffer.write_u8(count)?;
            }
            _ => {
                self.buffer.write_u8(code32)?;
                self.buffer
                    .write_u32::<BigEndian>(length_u32(body.len() + 4)?)?;
                self.buffer.write_u32::<BigEndian>(length_u32(count)?)?;
            }
        }
        self.buffer.extend_from_slice(&body);
        Ok(())
    }
}

fn length_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CodecError::malformed(format!("length {len} exceeds 32 bits")))
}
