// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Hand-written codecs that bypass shape resolution.
//!
//! A type with a registered custom codec is always written and read through
//! it, even when a shape is registered for the same type.
//!
//! # Example
//!
//! ```
//! use evocodec::encoding::custom::OpaqueBytesCodec;
//! use evocodec::encoding::CodecFactory;
//! use evocodec::ledger::SecureHash;
//! use evocodec::TypeRegistry;
//! use std::sync::Arc;
//!
//! let factory = CodecFactory::new(Arc::new(TypeRegistry::new()));
//! factory
//!     .register_custom(OpaqueBytesCodec::<SecureHash>::new())
//!     .unwrap();
//!
//! let hash = SecureHash::new(vec![7u8; 32]);
//! let bytes = factory.encode(&hash).unwrap();
//! assert_eq!(factory.decode::<SecureHash>(&bytes).unwrap(), hash);
//! ```

pub mod opaque_bytes;
pub mod wire_transaction;

pub use opaque_bytes::{OpaqueBytes, OpaqueBytesCodec, OpaqueBytesLike};
pub use wire_transaction::WireTransactionCodec;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::codec::Codec;
use super::factory::{ReadContext, WriteContext};
use crate::core::{CodecError, Descriptor, Instance, Object, Result, Value};
use crate::schema::{SchemaBuilder, TypeNotation};

/// Capability set a hand-written codec provides for one Rust type.
pub trait CustomCodec: Send + Sync + 'static {
    /// The Rust type handled by this codec.
    type Target: Any + Send + Sync + Clone;

    /// Type name used in schemas.
    fn type_name(&self) -> &str;

    /// Produce the notation embedded in payload schemas.
    fn type_notation(&self, schema: &SchemaBuilder<'_>) -> Result<TypeNotation>;

    /// Encode the body of the described value.
    fn write(&self, value: &Self::Target, ctx: &mut WriteContext<'_>) -> Result<Value>;

    /// Decode the body of the described value.
    fn read(&self, body: Value, ctx: &mut ReadContext<'_>) -> Result<Self::Target>;
}

/// Wraps a [`CustomCodec`] as a [`Codec`].
pub struct CustomCodecAdapter<C: CustomCodec> {
    inner: C,
    notation: TypeNotation,
}

impl<C: CustomCodec> CustomCodecAdapter<C> {
    /// Build the adapter, producing the codec's notation once.
    pub fn new(inner: C, schema: &SchemaBuilder<'_>) -> Result<Self> {
        let notation = inner.type_notation(schema)?;
        if notation.name() != inner.type_name() {
            return Err(CodecError::Other(format!(
                "custom codec for '{}' produced a notation named '{}'",
                inner.type_name(),
                notation.name()
            )));
        }
        debug!(
            type_name = %inner.type_name(),
            descriptor = %notation.descriptor(),
            "Built custom codec adapter"
        );
        Ok(Self { inner, notation })
    }

    /// The wrapped codec.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: CustomCodec> Codec for CustomCodecAdapter<C> {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn descriptor(&self) -> &Descriptor {
        self.notation.descriptor()
    }

    fn type_notation(&self) -> &TypeNotation {
        &self.notation
    }

    fn write(&self, object: &Object, ctx: &mut WriteContext<'_>) -> Result<Value> {
        let value = object.downcast_ref::<C::Target>().ok_or_else(|| {
            CodecError::type_mismatch(std::any::type_name::<C::Target>(), self.type_name())
        })?;
        let body = self.inner.write(value, ctx)?;
        Ok(self.descriptor().describe(body))
    }

    fn read(&self, body: Value, ctx: &mut ReadContext<'_>) -> Result<Instance> {
        self.inner.read(body, ctx).map(Instance::new)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct CustomCodecRegistryInner {
    codecs: HashMap<String, Arc<dyn Codec>>,
    by_type_id: HashMap<TypeId, String>,
}

/// Registry of custom codecs, keyed by type name and Rust type.
#[derive(Default)]
pub struct CustomCodecRegistry {
    inner: RwLock<CustomCodecRegistryInner>,
}

impl CustomCodecRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec for the Rust type `type_id`.
    ///
    /// Re-registering a name replaces the previous codec. A codec the same
    /// Rust type had under a different name is removed, and that name is
    /// returned.
    pub fn register(&self, type_id: TypeId, codec: Arc<dyn Codec>) -> Result<Option<String>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| CodecError::Other(format!("custom codec registry poisoned: {e}")))?;
        let name = codec.type_name().to_string();
        let replaced = inner
            .by_type_id
            .insert(type_id, name.clone())
            .filter(|previous| previous != &name);
        if let Some(previous) = &replaced {
            inner.codecs.remove(previous);
        }
        inner.codecs.insert(name, codec);
        Ok(replaced)
    }

    /// Check if a type name has a custom codec.
    pub fn has_type(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Codec by type name.
    pub fn get(&self, name: &str) -> Result<Option<Arc<dyn Codec>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| CodecError::Other(format!("custom codec registry poisoned: {e}")))?;
        Ok(inner.codecs.get(name).cloned())
    }

    /// Codec by Rust type.
    pub fn get_by_type_id(&self, type_id: TypeId) -> Result<Option<Arc<dyn Codec>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| CodecError::Other(format!("custom codec registry poisoned: {e}")))?;
        Ok(inner
            .by_type_id
            .get(&type_id)
            .and_then(|name| inner.codecs.get(name))
            .cloned())
    }

    /// Codec whose descriptor matches a wire descriptor value.
    pub fn get_by_descriptor(&self, descriptor: &Value) -> Result<Option<Arc<dyn Codec>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| CodecError::Other(format!("custom codec registry poisoned: {e}")))?;
        Ok(inner
            .codecs
            .values()
            .find(|codec| codec.descriptor().matches(descriptor))
            .cloned())
    }

    /// All registered type names.
    pub fn registered_types(&self) -> Result<Vec<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| CodecError::Other(format!("custom codec registry poisoned: {e}")))?;
        Ok(inner.codecs.keys().cloned().collect())
    }

    /// Number of registered codecs.
    pub fn count(&self) -> Result<usize> {
        Ok(self.registered_types()?.len())
    }
}
