// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Default record codec built from a registered shape.

use std::any::{Any, TypeId};

use tracing::debug;

use super::codec::Codec;
use super::factory::{ReadContext, WriteContext};
use super::property::PropertyCodec;
use crate::core::{Args, CodecError, Descriptor, Instance, Object, Result, TypeRegistry, Value};
use crate::schema::{CompositeType, ConstructorShape, SchemaBuilder, TypeNotation, TypeShape};

/// Writes a value as `described(descriptor, list[properties...])` and reads
/// it back through the resolved constructor.
#[derive(Debug)]
pub struct ObjectCodec {
    type_name: String,
    type_id: Option<TypeId>,
    composite: CompositeType,
    notation: TypeNotation,
    properties: Vec<PropertyCodec>,
    constructor: Option<ConstructorShape>,
}

impl ObjectCodec {
    /// Resolve `shape` and build its codec.
    pub fn build(shape: &TypeShape, registry: &TypeRegistry) -> Result<Self> {
        let resolved = shape.resolve(registry)?;
        let composite = SchemaBuilder::new(registry).composite(shape, &resolved.properties)?;
        let properties: Vec<PropertyCodec> = resolved
            .properties
            .iter()
            .map(PropertyCodec::from_shape)
            .collect();

        debug!(
            type_name = %shape.name,
            descriptor = %composite.descriptor,
            fields = properties.len(),
            constructible = resolved.constructor.is_some(),
            "Built object codec"
        );

        Ok(Self {
            type_name: shape.name.clone(),
            type_id: shape.type_id,
            notation: TypeNotation::Composite(composite.clone()),
            composite,
            properties,
            constructor: resolved.constructor,
        })
    }

    /// Rust type backing the shape, if concrete.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Property codecs in positional order.
    pub fn properties(&self) -> &[PropertyCodec] {
        &self.properties
    }

    /// Resolved constructor, absent for abstract and interface shapes.
    pub fn constructor(&self) -> Option<&ConstructorShape> {
        self.constructor.as_ref()
    }

    /// The composite notation embedded in payloads.
    pub fn composite(&self) -> &CompositeType {
        &self.composite
    }

    /// Decode positional values and construct the instance.
    fn construct(&self, values: Vec<Value>, ctx: &mut ReadContext<'_>) -> Result<Instance> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| CodecError::no_constructor(&self.type_name))?;
        if values.len() != self.properties.len() {
            return Err(CodecError::malformed(format!(
                "'{}' expects {} fields, payload has {}",
                self.type_name,
                self.properties.len(),
                values.len()
            )));
        }
        let args = values
            .into_iter()
            .zip(&self.properties)
            .map(|(raw, property)| property.read_property(raw, ctx))
            .collect::<Result<Vec<_>>>()?;
        constructor.construct(Args::new(args))
    }
}

impl Codec for ObjectCodec {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn descriptor(&self) -> &Descriptor {
        self.notation.descriptor()
    }

    fn type_notation(&self) -> &TypeNotation {
        &self.notation
    }

    fn write(&self, object: &Object, ctx: &mut WriteContext<'_>) -> Result<Value> {
        let fields = self
            .properties
            .iter()
            .map(|property| property.write_property(object, ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.descriptor().describe(Value::List(fields)))
    }

    fn read(&self, body: Value, ctx: &mut ReadContext<'_>) -> Result<Instance> {
        match body {
            Value::List(values) => self.construct(values, ctx),
            other => Err(CodecError::malformed(format!(
                "'{}' expects a field list, found {}",
                self.type_name,
                other.kind()
            ))),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
