// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-wrapper types written as their raw buffer.

use std::marker::PhantomData;

use super::CustomCodec;
use crate::core::{Result, Value};
use crate::encoding::factory::{ReadContext, WriteContext};
use crate::schema::{SchemaBuilder, TypeNotation};

/// A type that is nothing more than a byte sequence.
pub trait OpaqueBytesLike: Clone + Send + Sync + 'static {
    /// Type name used in schemas.
    const TYPE_NAME: &'static str;

    /// Rebuild from the raw buffer.
    fn from_bytes(bytes: Vec<u8>) -> Self;

    /// The raw buffer.
    fn as_bytes(&self) -> &[u8];
}

/// Plain opaque byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueBytes(pub Vec<u8>);

impl OpaqueBytesLike for OpaqueBytes {
    const TYPE_NAME: &'static str = "evo.OpaqueBytes";

    fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Writes `T` as a binary value and reads it back through
/// [`OpaqueBytesLike::from_bytes`].
pub struct OpaqueBytesCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> OpaqueBytesCodec<T> {
    /// Create the codec.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for OpaqueBytesCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: OpaqueBytesLike> CustomCodec for OpaqueBytesCodec<T> {
    type Target = T;

    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn type_notation(&self, schema: &SchemaBuilder<'_>) -> Result<TypeNotation> {
        schema
            .restricted(T::TYPE_NAME, "binary")
            .map(TypeNotation::Restricted)
    }

    fn write(&self, value: &T, _ctx: &mut WriteContext<'_>) -> Result<Value> {
        Ok(Value::binary(value.as_bytes()))
    }

    fn read(&self, body: Value, _ctx: &mut ReadContext<'_>) -> Result<T> {
        body.into_binary().map(T::from_bytes)
    }
}
