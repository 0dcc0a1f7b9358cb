// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unified codec interface.
//!
//! ## Architecture
//!
//! Every codec the factory hands out implements [`Codec`]:
//!
//! - **Object codecs** ([`ObjectCodec`](super::object::ObjectCodec)) - built
//!   from a registered shape
//! - **Custom codecs** ([`CustomCodec`](super::custom::CustomCodec)) - hand
//!   written, checked before object codecs
//! - **Evolution codecs** ([`EvolutionCodec`](super::evolution::EvolutionCodec)) -
//!   read-only, reconcile an old payload shape with the live one
//!
//! Codecs do not touch bytes. `write` turns a live object into a described
//! [`Value`] and `read` turns the body of a described value back into an
//! [`Instance`]; the envelope encodes the finished value tree in one pass,
//! so a failing write never leaves partial output behind.

use std::any::Any;

use super::factory::{ReadContext, WriteContext};
use crate::core::{Descriptor, Instance, Object, Result, Value};
use crate::schema::TypeNotation;

/// A codec for one type, or for one observed shape of a type.
pub trait Codec: Send + Sync {
    /// Name of the type this codec produces.
    fn type_name(&self) -> &str;

    /// Descriptor tagging the values this codec reads and writes.
    fn descriptor(&self) -> &Descriptor;

    /// Notation embedded in the schema of payloads written by this codec.
    fn type_notation(&self) -> &TypeNotation;

    /// Encode a live object as a described value.
    ///
    /// Nested objects are written through `ctx`, which also collects the
    /// notations the payload schema must carry.
    fn write(&self, object: &Object, ctx: &mut WriteContext<'_>) -> Result<Value>;

    /// Decode the body of a described value into a live object.
    fn read(&self, body: Value, ctx: &mut ReadContext<'_>) -> Result<Instance>;

    /// Downcast support for diagnostics and tests.
    fn as_any(&self) -> &dyn Any;
}
