// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-property codecs.
//!
//! A [`PropertyCodec`] reads and writes a single value of a declared
//! [`FieldType`]. Primitive values are checked against the declared type in
//! both directions; nested objects are handed to the factory contexts, so
//! the runtime type of the value picks its codec.

use std::fmt;

use super::factory::{ReadContext, WriteContext};
use crate::core::{CodecError, Object, Result, Value};
use crate::schema::shape::Getter;
use crate::schema::{Field, FieldType, PropertyShape};

/// Reads and writes one named property.
#[derive(Clone)]
pub struct PropertyCodec {
    /// Property name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Whether null is a legal value
    pub nullable: bool,
    getter: Option<Getter>,
}

impl fmt::Debug for PropertyCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCodec")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl PropertyCodec {
    /// Codec for a resolved property of a live shape.
    pub fn from_shape(property: &PropertyShape) -> Self {
        Self {
            name: property.name.clone(),
            field_type: property.field_type.clone(),
            nullable: property.nullable,
            getter: property.getter.clone(),
        }
    }

    /// Read-only codec for a field declared in a payload schema.
    pub fn from_field(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            field_type: FieldType::parse(&field.type_name),
            nullable: !field.mandatory,
            getter: None,
        }
    }

    /// Schema field for this property.
    pub fn field(&self) -> Field {
        Field {
            name: self.name.clone(),
            type_name: self.field_type.type_name(),
            mandatory: !self.nullable,
        }
    }

    /// Read the property from `object` and encode it.
    pub fn write_property(&self, object: &Object, ctx: &mut WriteContext<'_>) -> Result<Value> {
        let getter = self.getter.as_ref().ok_or_else(|| {
            CodecError::Other(format!("property '{}' has no accessor", self.name))
        })?;
        let value = getter(object)?;
        self.write_value(value, ctx)
    }

    /// Encode an already extracted value.
    pub fn write_value(&self, value: Value, ctx: &mut WriteContext<'_>) -> Result<Value> {
        write_typed(&self.name, &self.field_type, value, ctx)
    }

    /// Decode one raw positional value.
    pub fn read_property(&self, raw: Value, ctx: &mut ReadContext<'_>) -> Result<Value> {
        if raw.is_null() {
            if self.nullable {
                return Ok(Value::Null);
            }
            return Err(CodecError::malformed(format!(
                "null value for non-nullable property '{}'",
                self.name
            )));
        }
        read_typed(&self.name, &self.field_type, raw, ctx)
    }
}

fn write_typed(
    property: &str,
    field_type: &FieldType,
    value: Value,
    ctx: &mut WriteContext<'_>,
) -> Result<Value> {
    // Non-null contract is on the caller; nulls go out as written.
    if value.is_null() {
        return Ok(Value::Null);
    }
    match field_type {
        FieldType::Any => ctx.write_any(value),
        FieldType::Named(name) => match value {
            Value::Instance(instance) => ctx.write_instance(&instance, Some(name)),
            other => Err(CodecError::type_mismatch(name.as_str(), other.kind())),
        },
        FieldType::List(element) => match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| write_typed(property, element, item, ctx))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(CodecError::type_mismatch(field_type.type_name(), other.kind())),
        },
        primitive if primitive.accepts_primitive(&value) => Ok(value),
        primitive => Err(CodecError::property_mismatch(
            ctx.current_type(),
            property,
            format!("getter returned {} for a {primitive} property", value.kind()),
        )),
    }
}

fn read_typed(
    property: &str,
    field_type: &FieldType,
    raw: Value,
    ctx: &mut ReadContext<'_>,
) -> Result<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match field_type {
        FieldType::Any => ctx.read_any(raw),
        FieldType::Named(_) => ctx.read_object(raw).map(Value::Instance),
        FieldType::List(element) => match raw {
            Value::List(items) => items
                .into_iter()
                .map(|item| read_typed(property, element, item, ctx))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(CodecError::malformed(format!(
                "property '{property}' expects a list, found {}",
                other.kind()
            ))),
        },
        primitive if primitive.accepts_primitive(&raw) => Ok(raw),
        primitive => Err(CodecError::malformed(format!(
            "property '{property}' expects {primitive}, found {}",
            raw.kind()
        ))),
    }
}
