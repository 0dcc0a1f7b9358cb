// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec factory: the single entry point for encode and decode.
//!
//! The factory caches one [`ObjectCodec`] per type name and one
//! [`EvolutionCodec`] per (type name, observed descriptor). Both caches are
//! build-once: concurrent callers asking for the same missing key wait for a
//! single build and all receive the same `Arc`. A failed build removes its
//! slot, so a later call may succeed and unknown names never accumulate.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use evocodec::{CodecFactory, FieldType, Param, TypeRegistry, TypeShape, Value};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry
//!     .register(
//!         TypeShape::concrete::<Point>("demo.Point")
//!             .property("x", FieldType::Int, |p: &Point| Value::Int(p.x))
//!             .property("y", FieldType::Int, |p: &Point| Value::Int(p.y))
//!             .constructor(
//!                 vec![Param::new("x", FieldType::Int), Param::new("y", FieldType::Int)],
//!                 |mut args| Ok(Point { x: args.arg(0)?, y: args.arg(1)? }),
//!             )
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let factory = CodecFactory::new(registry);
//! let bytes = factory.encode(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(factory.decode::<Point>(&bytes).unwrap(), Point { x: 1, y: 2 });
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::trace;

use super::codec::Codec;
use super::custom::{CustomCodec, CustomCodecAdapter, CustomCodecRegistry};
use super::envelope::Envelope;
use super::evolution::EvolutionCodec;
use super::object::ObjectCodec;
use crate::core::{
    CodecConfig, CodecError, DescribedValue, Instance, Object, Result, TypeRegistry, Value,
};
use crate::schema::{fingerprint, CompositeType, Schema, SchemaBuilder, TypeNotation};

type Slot<C> = Arc<OnceCell<Arc<C>>>;

/// Get or build the codec under `key`, dropping the slot again if the build
/// fails and nobody else filled it meanwhile.
fn build_once<K, C, F>(cache: &DashMap<K, Slot<C>>, key: K, build: F) -> Result<Arc<C>>
where
    K: Eq + Hash + Clone,
    F: FnOnce() -> Result<Arc<C>>,
{
    let existing = cache.get(&key).map(|slot| slot.value().clone());
    let slot = match existing {
        Some(slot) => slot,
        None => cache.entry(key.clone()).or_default().clone(),
    };
    let built = slot.get_or_try_init(build).cloned();
    if built.is_err() {
        cache.remove_if(&key, |_, slot| slot.get().is_none());
    }
    built
}

/// Caching dispatcher from types and observed shapes to codecs.
pub struct CodecFactory {
    config: CodecConfig,
    registry: Arc<TypeRegistry>,
    custom: CustomCodecRegistry,
    codecs: DashMap<String, Slot<ObjectCodec>>,
    evolution: DashMap<(String, String), Slot<EvolutionCodec>>,
}

impl CodecFactory {
    /// Create a factory with the default configuration.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            config: CodecConfig::default(),
            registry,
            custom: CustomCodecRegistry::new(),
            codecs: DashMap::new(),
            evolution: DashMap::new(),
        }
    }

    /// Create a factory and apply `config`'s allow-list to the registry.
    pub fn with_config(registry: Arc<TypeRegistry>, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        for name in &config.allow_list {
            registry.allow(name.as_str())?;
        }
        Ok(Self {
            config,
            ..Self::new(registry)
        })
    }

    /// The registry shapes are resolved against.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Registered custom codecs.
    pub fn custom_codecs(&self) -> &CustomCodecRegistry {
        &self.custom
    }

    /// Register a hand-written codec. It takes precedence over any shape
    /// registered for the same type.
    ///
    /// Cached live and evolution codecs for the type name are discarded, as
    /// is a custom codec previously registered for the same Rust type under
    /// another name.
    pub fn register_custom<C: CustomCodec>(&self, codec: C) -> Result<()> {
        let adapter = CustomCodecAdapter::new(codec, &SchemaBuilder::new(&self.registry))?;
        let name = adapter.type_name().to_string();
        let replaced = self
            .custom
            .register(TypeId::of::<C::Target>(), Arc::new(adapter))?;
        for stale in replaced.iter().chain(std::iter::once(&name)) {
            self.codecs.remove(stale);
            self.evolution.retain(|(type_name, _), _| type_name != stale);
        }
        Ok(())
    }

    /// Encode a value into a self-describing payload.
    pub fn encode<T: Any + Send + Sync>(&self, value: &T) -> Result<Vec<u8>> {
        trace!(rust_type = type_name::<T>(), "Encoding value");
        let mut ctx = WriteContext::new(self);
        let body = ctx.write(value)?;
        Envelope::new(body, ctx.into_schema()).to_bytes()
    }

    /// Decode a payload whose root is a `T`.
    pub fn decode<T: Any + Send + Sync + Clone>(&self, bytes: &[u8]) -> Result<T> {
        let expected = self.name_of_type(TypeId::of::<T>(), type_name::<T>())?;
        trace!(type_name = %expected, len = bytes.len(), "Decoding payload");

        let envelope = Envelope::parse_with_depth(bytes, self.config.max_depth)?;
        let found = match &envelope.body {
            Value::Described(described) => envelope
                .schema
                .find_by_descriptor(&described.descriptor)
                .map(|notation| notation.name().to_string())
                .ok_or_else(|| {
                    CodecError::malformed("root descriptor is not listed in the payload schema")
                })?,
            other => {
                return Err(CodecError::malformed(format!(
                    "payload root must be a described value, found {}",
                    other.kind()
                )))
            }
        };
        if found != expected {
            return Err(CodecError::type_mismatch(expected, found));
        }

        let mut ctx = ReadContext::new(self, &envelope.schema);
        ctx.read_object(envelope.body)?.downcast()
    }

    /// Parse a payload's header, raw body and schema without decoding.
    pub fn inspect(bytes: &[u8]) -> Result<Envelope> {
        Envelope::parse(bytes)
    }

    /// Schema notation of a registered type, including abstract and
    /// interface shapes.
    pub fn describe(&self, name: &str) -> Result<TypeNotation> {
        Ok(self.codec_for_name(name)?.type_notation().clone())
    }

    /// Number of live object codecs built so far.
    pub fn cached_codecs(&self) -> usize {
        self.codecs
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// Number of evolution codecs built so far.
    pub fn cached_evolution_codecs(&self) -> usize {
        self.evolution
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// Codec used to write values of Rust type `T`.
    pub fn codec_for<T: Any>(&self) -> Result<Arc<dyn Codec>> {
        self.codec_for_type(TypeId::of::<T>(), type_name::<T>())
    }

    /// Codec for a type name: custom first, then the live object codec.
    pub fn codec_for_name(&self, name: &str) -> Result<Arc<dyn Codec>> {
        if let Some(codec) = self.custom.get(name)? {
            return Ok(codec);
        }
        Ok(self.live_codec(name)?)
    }

    /// Live object codec for a registered shape, built once.
    pub fn live_codec(&self, name: &str) -> Result<Arc<ObjectCodec>> {
        build_once(&self.codecs, name.to_string(), || {
            let shape = self
                .registry
                .get(name)?
                .ok_or_else(|| CodecError::type_not_found(name))?;
            ObjectCodec::build(&shape, &self.registry).map(Arc::new)
        })
    }

    /// Evolution codec reconciling `old` with the live shape of the same
    /// type name, built once per observed field list.
    ///
    /// The cache key is fingerprinted from the fields the payload lists, not
    /// taken from the descriptor it claims.
    pub fn evolution_codec(&self, old: &CompositeType) -> Result<Arc<EvolutionCodec>> {
        let key = (old.name.clone(), fingerprint(&old.name, &old.fields));
        build_once(&self.evolution, key, || {
            let live = self.live_codec(&old.name)?;
            EvolutionCodec::make(old, &live, &self.registry).map(Arc::new)
        })
    }

    fn codec_for_type(&self, type_id: TypeId, rust_type: &str) -> Result<Arc<dyn Codec>> {
        if let Some(codec) = self.custom.get_by_type_id(type_id)? {
            return Ok(codec);
        }
        let name = self
            .registry
            .name_of(type_id)?
            .ok_or_else(|| CodecError::type_not_found(rust_type))?;
        Ok(self.live_codec(&name)?)
    }

    fn name_of_type(&self, type_id: TypeId, rust_type: &str) -> Result<String> {
        if let Some(codec) = self.custom.get_by_type_id(type_id)? {
            return Ok(codec.type_name().to_string());
        }
        self.registry
            .name_of(type_id)?
            .ok_or_else(|| CodecError::type_not_found(rust_type))
    }

    /// Pick the codec that reads values tagged with `descriptor`.
    fn reader_for(&self, descriptor: &Value, schema: &Schema) -> Result<Arc<dyn Codec>> {
        let Some(notation) = schema.find_by_descriptor(descriptor) else {
            return self.custom.get_by_descriptor(descriptor)?.ok_or_else(|| {
                CodecError::malformed(format!(
                    "descriptor {descriptor:?} is not listed in the payload schema"
                ))
            });
        };
        let name = notation.name();
        if let Some(codec) = self.custom.get(name)? {
            return Ok(codec);
        }

        let live = self.live_codec(name)?;
        let same_fields = notation
            .as_composite()
            .map_or(true, |old| old.fields == live.composite().fields);
        if live.descriptor().matches(descriptor) && same_fields {
            return Ok(live);
        }
        let Some(old) = notation.as_composite() else {
            return Err(CodecError::malformed(format!(
                "'{name}' arrived as a restricted type but has no custom codec"
            )));
        };
        if !self.config.evolution {
            return Err(CodecError::incompatible(
                name,
                first_difference(old, &live),
                "payload shape differs from the live shape and evolution is disabled",
            ));
        }
        Ok(self.evolution_codec(old)?)
    }
}

impl fmt::Debug for CodecFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecFactory")
            .field("config", &self.config)
            .field("cached_codecs", &self.cached_codecs())
            .field("cached_evolution_codecs", &self.cached_evolution_codecs())
            .finish()
    }
}

/// Name of the first field where the payload and live shapes disagree.
fn first_difference(old: &CompositeType, live: &ObjectCodec) -> String {
    let live_fields = live.composite().fields.iter();
    old.fields
        .iter()
        .map(Some)
        .chain(std::iter::repeat(None))
        .zip(live_fields.map(Some).chain(std::iter::repeat(None)))
        .take(old.fields.len().max(live.composite().fields.len()))
        .find_map(|(old, live)| match (old, live) {
            (Some(o), Some(l)) if o == l => None,
            (Some(o), _) => Some(o.name.clone()),
            (None, Some(l)) => Some(l.name.clone()),
            (None, None) => None,
        })
        .unwrap_or_default()
}

/// State carried through one encode call.
///
/// Collects every type notation used while writing, each once, in the order
/// the types were first reached.
pub struct WriteContext<'a> {
    factory: &'a CodecFactory,
    notations: Vec<TypeNotation>,
    seen: HashSet<String>,
    stack: Vec<String>,
}

impl<'a> WriteContext<'a> {
    /// Start an encode call.
    pub fn new(factory: &'a CodecFactory) -> Self {
        Self {
            factory,
            notations: Vec::new(),
            seen: HashSet::new(),
            stack: Vec::new(),
        }
    }

    /// Type currently being written.
    pub fn current_type(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or_default()
    }

    /// Write a value through the codec for its Rust type.
    pub fn write<T: Any + Send + Sync>(&mut self, value: &T) -> Result<Value> {
        let codec = self
            .factory
            .codec_for_type(TypeId::of::<T>(), type_name::<T>())?;
        self.write_with(codec, value)
    }

    /// Write a live instance, optionally checking it against a declared type.
    pub fn write_instance(&mut self, instance: &Instance, expected: Option<&str>) -> Result<Value> {
        let codec = self
            .factory
            .codec_for_type(instance.type_id(), instance.rust_type())?;
        if let Some(expected) = expected {
            if !self.factory.registry.is_subtype(codec.type_name(), expected)? {
                return Err(CodecError::type_mismatch(expected, codec.type_name()));
            }
        }
        self.write_with(codec, instance.object())
    }

    /// Write a `*`-typed value; instances anywhere inside are encoded by
    /// their runtime type.
    pub fn write_any(&mut self, value: Value) -> Result<Value> {
        match value {
            Value::Instance(instance) => self.write_instance(&instance, None),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.write_any(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((self.write_any(k)?, self.write_any(v)?)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
            Value::Described(described) => {
                let DescribedValue { descriptor, value } = *described;
                Ok(Value::Described(Box::new(DescribedValue {
                    descriptor,
                    value: self.write_any(value)?,
                })))
            }
            other => Ok(other),
        }
    }

    fn write_with(&mut self, codec: Arc<dyn Codec>, object: &Object) -> Result<Value> {
        if self.stack.len() >= self.factory.config.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.factory.config.max_depth,
            });
        }
        let notation = codec.type_notation();
        if self.seen.insert(notation.name().to_string()) {
            self.notations.push(notation.clone());
        }
        self.stack.push(codec.type_name().to_string());
        let result = codec.write(object, self);
        self.stack.pop();
        result
    }

    /// Finish, producing the payload schema.
    pub fn into_schema(self) -> Schema {
        Schema::new(self.notations)
    }
}

/// State carried through one decode call.
pub struct ReadContext<'a> {
    factory: &'a CodecFactory,
    schema: &'a Schema,
    depth: usize,
}

impl<'a> ReadContext<'a> {
    /// Start a decode call against a payload schema.
    pub fn new(factory: &'a CodecFactory, schema: &'a Schema) -> Self {
        Self {
            factory,
            schema,
            depth: 0,
        }
    }

    /// The payload schema.
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Decode a described value through the codec its descriptor selects.
    pub fn read_object(&mut self, value: Value) -> Result<Instance> {
        let described = match value {
            Value::Described(described) => *described,
            other => {
                return Err(CodecError::malformed(format!(
                    "expected a described object, found {}",
                    other.kind()
                )))
            }
        };
        if self.depth >= self.factory.config.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.factory.config.max_depth,
            });
        }
        let codec = self.factory.reader_for(&described.descriptor, self.schema)?;
        trace!(type_name = %codec.type_name(), depth = self.depth, "Reading object");

        self.depth += 1;
        let result = codec.read(described.value, self);
        self.depth -= 1;
        result
    }

    /// Decode a described value into a `T`.
    pub fn read<T: Any + Send + Sync + Clone>(&mut self, value: Value) -> Result<T> {
        self.read_object(value)?.downcast()
    }

    /// Decode a `*`-typed value. Described values whose descriptor is in the
    /// payload schema become instances; everything else is left as is.
    pub fn read_any(&mut self, value: Value) -> Result<Value> {
        match value {
            Value::Described(described)
                if self.schema.find_by_descriptor(&described.descriptor).is_some() =>
            {
                self.read_object(Value::Described(described))
                    .map(Value::Instance)
            }
            Value::List(items) => items
                .into_iter()
                .map(|item| self.read_any(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((self.read_any(k)?, self.read_any(v)?)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
            other => Ok(other),
        }
    }
}
