// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema types embedded in every payload.
//!
//! A [`Schema`] is the list of type notations referenced by one payload.
//! Each notation is either a [`CompositeType`] (a record with named fields)
//! or a [`RestrictedType`] (a type carried as a primitive or container).
//! All of them are themselves encoded as described lists, so the schema
//! travels through the same value encoder as the data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, DescribedValue, Descriptor, Result, Value};

/// Upper 32 bits shared by all well-known descriptor codes.
pub const DESCRIPTOR_DOMAIN: u64 = 0x0000_e70c << 32;

/// Descriptors of the envelope and schema structures themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnown {
    Envelope = 1,
    Schema = 2,
    ObjectDescriptor = 3,
    Field = 4,
    CompositeType = 5,
    RestrictedType = 6,
}

impl WellKnown {
    /// Numeric code written on the wire.
    pub fn code(self) -> u64 {
        DESCRIPTOR_DOMAIN | self as u64
    }

    /// Symbolic name.
    pub fn name(self) -> &'static str {
        match self {
            WellKnown::Envelope => "evo:envelope",
            WellKnown::Schema => "evo:schema",
            WellKnown::ObjectDescriptor => "evo:object_descriptor",
            WellKnown::Field => "evo:field",
            WellKnown::CompositeType => "evo:composite_type",
            WellKnown::RestrictedType => "evo:restricted_type",
        }
    }

    /// Full descriptor.
    pub fn descriptor(self) -> Descriptor {
        Descriptor::with_code(self.name(), self.code())
    }

    /// Wrap a list body with this descriptor.
    pub fn describe(self, items: Vec<Value>) -> Value {
        self.descriptor().describe(Value::List(items))
    }

    /// Unwrap a described list carrying this descriptor.
    pub fn undescribe(self, value: Value) -> Result<Vec<Value>> {
        let described = expect_described(value, self.name())?;
        if !self.descriptor().matches(&described.descriptor) {
            return Err(CodecError::malformed(format!(
                "expected {} descriptor, found {:?}",
                self.name(),
                described.descriptor
            )));
        }
        expect_list(described.value, self.name())
    }
}

/// One field of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its composite
    pub name: String,
    /// Declared type, in [`FieldType`](super::FieldType) wire form
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the field is non-nullable
    pub mandatory: bool,
}

/// Record-shaped type notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeType {
    /// Type name
    pub name: String,
    /// Optional human-readable label
    pub label: Option<String>,
    /// Opted-in supertypes
    pub provides: Vec<String>,
    /// Identity tag of encoded values
    pub descriptor: Descriptor,
    /// Fields in positional order
    pub fields: Vec<Field>,
}

/// Type carried as a primitive or container on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedType {
    /// Type name
    pub name: String,
    /// Optional human-readable label
    pub label: Option<String>,
    /// Opted-in supertypes
    pub provides: Vec<String>,
    /// Underlying primitive or container type
    pub source: String,
    /// Identity tag of encoded values
    pub descriptor: Descriptor,
}

/// A type notation embedded in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNotation {
    Composite(CompositeType),
    Restricted(RestrictedType),
}

/// All type notations referenced by one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Notations in the order they were first used
    pub types: Vec<TypeNotation>,
}

impl CompositeType {
    /// Field names in positional order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl TypeNotation {
    /// Type name.
    pub fn name(&self) -> &str {
        match self {
            TypeNotation::Composite(c) => &c.name,
            TypeNotation::Restricted(r) => &r.name,
        }
    }

    /// Identity tag.
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            TypeNotation::Composite(c) => &c.descriptor,
            TypeNotation::Restricted(r) => &r.descriptor,
        }
    }

    /// Opted-in supertypes.
    pub fn provides(&self) -> &[String] {
        match self {
            TypeNotation::Composite(c) => &c.provides,
            TypeNotation::Restricted(r) => &r.provides,
        }
    }

    /// The composite notation, if this is one.
    pub fn as_composite(&self) -> Option<&CompositeType> {
        match self {
            TypeNotation::Composite(c) => Some(c),
            TypeNotation::Restricted(_) => None,
        }
    }

    /// Encode as a described value.
    pub fn to_value(&self) -> Value {
        match self {
            TypeNotation::Composite(c) => WellKnown::CompositeType.describe(vec![
                Value::String(c.name.clone()),
                optional_string(&c.label),
                string_list(&c.provides),
                descriptor_to_value(&c.descriptor),
                Value::List(c.fields.iter().map(field_to_value).collect()),
            ]),
            TypeNotation::Restricted(r) => WellKnown::RestrictedType.describe(vec![
                Value::String(r.name.clone()),
                optional_string(&r.label),
                string_list(&r.provides),
                Value::String(r.source.clone()),
                descriptor_to_value(&r.descriptor),
            ]),
        }
    }

    /// Decode from a described value.
    pub fn from_value(value: Value) -> Result<Self> {
        let described = expect_described(value, "type notation")?;
        let composite = WellKnown::CompositeType.descriptor();
        let restricted = WellKnown::RestrictedType.descriptor();

        if composite.matches(&described.descriptor) {
            let mut items = fixed_list(described.value, 5, "composite type")?.into_iter();
            let composite = CompositeType {
                name: next_string(&mut items)?,
                label: next_optional_string(&mut items)?,
                provides: next_string_list(&mut items)?,
                descriptor: descriptor_from_value(next(&mut items)?)?,
                fields: expect_list(next(&mut items)?, "fields")?
                    .into_iter()
                    .map(field_from_value)
                    .collect::<Result<_>>()?,
            };
            let mut seen = HashSet::new();
            if let Some(repeated) = composite.fields.iter().find(|f| !seen.insert(&f.name)) {
                return Err(CodecError::malformed(format!(
                    "composite '{}' lists field '{}' more than once",
                    composite.name, repeated.name
                )));
            }
            Ok(TypeNotation::Composite(composite))
        } else if restricted.matches(&described.descriptor) {
            let mut items = fixed_list(described.value, 5, "restricted type")?.into_iter();
            Ok(TypeNotation::Restricted(RestrictedType {
                name: next_string(&mut items)?,
                label: next_optional_string(&mut items)?,
                provides: next_string_list(&mut items)?,
                source: next_string(&mut items)?,
                descriptor: descriptor_from_value(next(&mut items)?)?,
            }))
        } else {
            Err(CodecError::malformed(format!(
                "unknown type notation descriptor {:?}",
                described.descriptor
            )))
        }
    }
}

impl Schema {
    /// Create from notations.
    pub fn new(types: Vec<TypeNotation>) -> Self {
        Self { types }
    }

    /// Find the notation whose descriptor matches a wire descriptor value.
    pub fn find_by_descriptor(&self, descriptor: &Value) -> Option<&TypeNotation> {
        self.types
            .iter()
            .find(|t| t.descriptor().matches(descriptor))
    }

    /// Find a notation by type name.
    pub fn find_by_name(&self, name: &str) -> Option<&TypeNotation> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// Encode as a described value.
    pub fn to_value(&self) -> Value {
        WellKnown::Schema.describe(vec![Value::List(
            self.types.iter().map(TypeNotation::to_value).collect(),
        )])
    }

    /// Decode from a described value.
    pub fn from_value(value: Value) -> Result<Self> {
        let items = WellKnown::Schema.undescribe(value)?;
        let mut items = items.into_iter();
        let types = expect_list(next(&mut items)?, "schema types")?
            .into_iter()
            .map(TypeNotation::from_value)
            .collect::<Result<_>>()?;
        Ok(Self { types })
    }
}

fn field_to_value(field: &Field) -> Value {
    WellKnown::Field.describe(vec![
        Value::String(field.name.clone()),
        Value::String(field.type_name.clone()),
        Value::Bool(field.mandatory),
    ])
}

fn field_from_value(value: Value) -> Result<Field> {
    let items = WellKnown::Field.undescribe(value)?;
    if items.len() != 3 {
        return Err(CodecError::malformed(format!(
            "field has {} items, expected 3",
            items.len()
        )));
    }
    let mut items = items.into_iter();
    Ok(Field {
        name: next_string(&mut items)?,
        type_name: next_string(&mut items)?,
        mandatory: match next(&mut items)? {
            Value::Bool(b) => b,
            other => {
                return Err(CodecError::malformed(format!(
                    "field mandatory flag is {}",
                    other.kind()
                )))
            }
        },
    })
}

fn descriptor_to_value(descriptor: &Descriptor) -> Value {
    WellKnown::ObjectDescriptor.describe(vec![
        Value::Symbol(descriptor.name.clone()),
        descriptor.code.map(Value::ULong).unwrap_or(Value::Null),
    ])
}

fn descriptor_from_value(value: Value) -> Result<Descriptor> {
    let mut items = WellKnown::ObjectDescriptor.undescribe(value)?.into_iter();
    let name = match next(&mut items)? {
        Value::Symbol(name) => name,
        other => {
            return Err(CodecError::malformed(format!(
                "descriptor name is {}",
                other.kind()
            )))
        }
    };
    let code = match items.next() {
        None | Some(Value::Null) => None,
        Some(Value::ULong(code)) => Some(code),
        Some(other) => {
            return Err(CodecError::malformed(format!(
                "descriptor code is {}",
                other.kind()
            )))
        }
    };
    Ok(Descriptor { name, code })
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn string_list(values: &[String]) -> Value {
    Value::List(values.iter().cloned().map(Value::String).collect())
}

fn expect_described(value: Value, what: &str) -> Result<DescribedValue> {
    match value {
        Value::Described(described) => Ok(*described),
        other => Err(CodecError::malformed(format!(
            "expected described {what}, found {}",
            other.kind()
        ))),
    }
}

fn expect_list(value: Value, what: &str) -> Result<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(CodecError::malformed(format!(
            "expected list for {what}, found {}",
            other.kind()
        ))),
    }
}

fn fixed_list(value: Value, len: usize, what: &str) -> Result<Vec<Value>> {
    let items = expect_list(value, what)?;
    if items.len() != len {
        return Err(CodecError::malformed(format!(
            "{what} has {} items, expected {len}",
            items.len()
        )));
    }
    Ok(items)
}

fn next(items: &mut impl Iterator<Item = Value>) -> Result<Value> {
    items
        .next()
        .ok_or_else(|| CodecError::malformed("schema list is too short"))
}

fn next_string(items: &mut impl Iterator<Item = Value>) -> Result<String> {
    match next(items)? {
        Value::String(s) => Ok(s),
        other => Err(CodecError::malformed(format!(
            "expected string, found {}",
            other.kind()
        ))),
    }
}

fn next_optional_string(items: &mut impl Iterator<Item = Value>) -> Result<Option<String>> {
    match next(items)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(CodecError::malformed(format!(
            "expected string or null, found {}",
            other.kind()
        ))),
    }
}

fn next_string_list(items: &mut impl Iterator<Item = Value>) -> Result<Vec<String>> {
    expect_list(next(items)?, "string list")?
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            other => Err(CodecError::malformed(format!(
                "expected string, found {}",
                other.kind()
            ))),
        })
        .collect()
}
