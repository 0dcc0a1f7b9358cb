// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Read-only codec for payloads written with an older shape of a type.
//!
//! Fields are associated with the live constructor parameters strictly by
//! name. A field that was renamed, or that kept its position under a new
//! name, is treated as removed plus added.

use std::any::Any;

use tracing::{debug, warn};

use super::codec::Codec;
use super::factory::{ReadContext, WriteContext};
use super::object::ObjectCodec;
use super::property::PropertyCodec;
use crate::core::{Args, CodecError, Descriptor, Instance, Object, Result, TypeRegistry, Value};
use crate::schema::{CompositeType, ConstructorShape, FieldType, TypeNotation};

/// A field as it existed when the payload was written.
#[derive(Debug, Clone)]
pub struct OldField {
    /// Field name
    pub name: String,
    /// Declared type as written in the payload schema
    pub wire_type: String,
    /// Declared type resolved against the live registry
    pub field_type: FieldType,
    /// Position in the old payload
    pub index: usize,
    /// Codec built against the old declared type
    pub codec: PropertyCodec,
}

/// Reconciles an old composite with the live constructor.
pub struct EvolutionCodec {
    type_name: String,
    notation: TypeNotation,
    old_fields: Vec<OldField>,
    /// One slot per live parameter: the old field feeding it, or absent.
    mapping: Vec<Option<usize>>,
    constructor: ConstructorShape,
}

impl EvolutionCodec {
    /// Build from the payload's composite and the live codec for the type.
    pub fn make(old: &CompositeType, live: &ObjectCodec, registry: &TypeRegistry) -> Result<Self> {
        let type_name = live.type_name().to_string();
        let constructor = live
            .constructor()
            .cloned()
            .ok_or_else(|| CodecError::no_constructor(&type_name))?;

        let old_fields: Vec<OldField> = old
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let codec = PropertyCodec::from_field(field);
                OldField {
                    name: field.name.clone(),
                    wire_type: field.type_name.clone(),
                    field_type: codec.field_type.clone(),
                    index,
                    codec,
                }
            })
            .collect();

        let mut mapping = Vec::with_capacity(constructor.params.len());
        for param in &constructor.params {
            match old_fields.iter().position(|f| f.name == param.name) {
                Some(position) => {
                    let field = &old_fields[position];
                    let assignable = registry.is_assignable(
                        &field.field_type,
                        field.codec.nullable,
                        &param.field_type,
                        param.nullable,
                    )?;
                    if !assignable {
                        return Err(CodecError::incompatible(
                            &type_name,
                            &param.name,
                            format!(
                                "old type {}{} cannot be passed as {}{}",
                                field.wire_type,
                                if field.codec.nullable { "?" } else { "" },
                                param.field_type,
                                if param.nullable { "?" } else { "" },
                            ),
                        ));
                    }
                    mapping.push(Some(position));
                }
                None if param.nullable => mapping.push(None),
                None => {
                    return Err(CodecError::incompatible(
                        &type_name,
                        &param.name,
                        "field is absent from the payload and not nullable",
                    ))
                }
            }
        }

        for field in &old_fields {
            if !constructor.params.iter().any(|p| p.name == field.name) {
                warn!(
                    type_name = %type_name,
                    field = %field.name,
                    "Payload field no longer exists and will be dropped"
                );
            }
        }

        debug!(
            type_name = %type_name,
            old_descriptor = %old.descriptor,
            old_fields = old_fields.len(),
            live_params = mapping.len(),
            "Built evolution codec"
        );

        Ok(Self {
            type_name,
            notation: TypeNotation::Composite(old.clone()),
            old_fields,
            mapping,
            constructor,
        })
    }

    /// Fields of the old payload shape.
    pub fn old_fields(&self) -> &[OldField] {
        &self.old_fields
    }

    /// For each live parameter, the old field name feeding it.
    pub fn sources(&self) -> Vec<Option<&str>> {
        self.mapping
            .iter()
            .map(|slot| slot.map(|i| self.old_fields[i].name.as_str()))
            .collect()
    }
}

impl Codec for EvolutionCodec {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn descriptor(&self) -> &Descriptor {
        self.notation.descriptor()
    }

    fn type_notation(&self) -> &TypeNotation {
        &self.notation
    }

    fn write(&self, _object: &Object, _ctx: &mut WriteContext<'_>) -> Result<Value> {
        Err(CodecError::unsupported_write(&self.type_name))
    }

    fn read(&self, body: Value, ctx: &mut ReadContext<'_>) -> Result<Instance> {
        let mut values = match body {
            Value::List(values) => values,
            other => {
                return Err(CodecError::malformed(format!(
                    "'{}' expects a field list, found {}",
                    self.type_name,
                    other.kind()
                )))
            }
        };
        if values.len() != self.old_fields.len() {
            return Err(CodecError::malformed(format!(
                "old shape of '{}' has {} fields, payload has {}",
                self.type_name,
                self.old_fields.len(),
                values.len()
            )));
        }

        let mut args = Vec::with_capacity(self.mapping.len());
        for slot in &self.mapping {
            let value = match slot {
                Some(i) => {
                    let field = &self.old_fields[*i];
                    let raw = std::mem::take(&mut values[field.index]);
                    field.codec.read_property(raw, ctx)?
                }
                None => Value::Null,
            };
            args.push(value);
        }
        self.constructor.construct(Args::new(args))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
