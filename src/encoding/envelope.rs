// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The outer frame of every payload.
//!
//! Layout: a five byte header followed by one described list holding the
//! object body and the schema that describes it.

use super::wire::{WireCursor, WireEncoder};
use crate::core::config::DEFAULT_MAX_DEPTH;
use crate::core::{CodecError, Result, Value};
use crate::schema::{Schema, WellKnown};

/// Header that starts every payload.
pub const MAGIC: &[u8; 5] = b"evo\x01\x00";

/// Body plus schema, before encoding or after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Encoded root object
    pub body: Value,
    /// Notations for every described value in the body
    pub schema: Schema,
}

impl Envelope {
    /// Create an envelope.
    pub fn new(body: Value, schema: Schema) -> Self {
        Self { body, schema }
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let framed = WellKnown::Envelope.describe(vec![self.body.clone(), self.schema.to_value()]);
        let mut encoder = WireEncoder::new();
        encoder.write_raw(MAGIC);
        encoder.write_value(&framed)?;
        Ok(encoder.finish())
    }

    /// Parse bytes with the default nesting limit.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with_depth(bytes, DEFAULT_MAX_DEPTH)
    }

    /// Parse bytes, rejecting values nested deeper than `max_depth`.
    pub fn parse_with_depth(bytes: &[u8], max_depth: usize) -> Result<Self> {
        if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
            return Err(CodecError::malformed("missing or unknown payload header"));
        }
        let mut cursor = WireCursor::with_max_depth(&bytes[MAGIC.len()..], max_depth);
        let framed = cursor.read_value()?;
        if !cursor.is_at_end() {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after envelope",
                cursor.remaining()
            )));
        }

        let items = WellKnown::Envelope.undescribe(framed)?;
        if items.len() != 2 {
            return Err(CodecError::malformed(format!(
                "envelope has {} items, expected 2",
                items.len()
            )));
        }
        let mut items = items.into_iter();
        let body = items.next().unwrap_or_default();
        let schema = Schema::from_value(items.next().unwrap_or_default())?;
        Ok(Self { body, schema })
    }
}
