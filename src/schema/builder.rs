// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Builds the schema notations for registered shapes.
//!
//! Two jobs live here: walking a type's supertype graph to produce its
//! "provides" list, and fingerprinting a composite's fields to produce the
//! descriptor its values are tagged with.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use super::ast::{CompositeType, Field, RestrictedType};
use super::shape::{PropertyShape, TypeShape};
use crate::core::{Descriptor, Result, TypeRegistry};

/// Prefix of every object descriptor name.
pub const OBJECT_DESCRIPTOR_PREFIX: &str = "evo:";

/// Hex SHA-256 over a type name and its ordered (name, type, mandatory)
/// field triples.
pub fn fingerprint(type_name: &str, fields: &[Field]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(type_name.as_bytes());
    for field in fields {
        hasher.update([0u8]);
        hasher.update(field.name.as_bytes());
        hasher.update([b':']);
        hasher.update(field.type_name.as_bytes());
        hasher.update([if field.mandatory { b'!' } else { b'?' }]);
    }
    hex::encode(hasher.finalize())
}

/// Descriptor for values of a composite with these fields.
pub fn object_descriptor(type_name: &str, fields: &[Field]) -> Descriptor {
    Descriptor::new(format!(
        "{OBJECT_DESCRIPTOR_PREFIX}{}",
        fingerprint(type_name, fields)
    ))
}

/// Produces composite and restricted notations for registered types.
pub struct SchemaBuilder<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> SchemaBuilder<'a> {
    /// Create a builder over a registry.
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Opted-in interfaces reachable from `type_name`, in discovery order.
    ///
    /// Interfaces that are not opted in are neither listed nor descended
    /// into. Abstract and concrete supertypes are descended into but never
    /// listed. Each name is visited at most once, so cyclic graphs terminate.
    pub fn provides(&self, type_name: &str) -> Result<Vec<String>> {
        let mut provides = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![type_name.to_string()];

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(shape) = self.registry.get(&name)? else {
                // Unregistered names carry no supertypes of their own.
                if self.registry.is_opted_in(&name)? {
                    provides.push(name);
                }
                continue;
            };
            if shape.is_interface() {
                if !self.registry.is_opted_in(&name)? {
                    continue;
                }
                provides.push(name);
            }
            // Reverse so the first declared supertype is explored first.
            for supertype in shape.supertypes.iter().rev() {
                if !visited.contains(supertype) {
                    pending.push(supertype.clone());
                }
            }
        }
        Ok(provides)
    }

    /// Composite notation for a shape with its resolved properties.
    pub fn composite(
        &self,
        shape: &TypeShape,
        properties: &[PropertyShape],
    ) -> Result<CompositeType> {
        let fields: Vec<Field> = properties
            .iter()
            .map(|p| Field {
                name: p.name.clone(),
                type_name: p.field_type.type_name(),
                mandatory: !p.nullable,
            })
            .collect();
        Ok(CompositeType {
            name: shape.name.clone(),
            label: None,
            provides: self.provides(&shape.name)?,
            descriptor: object_descriptor(&shape.name, &fields),
            fields,
        })
    }

    /// Restricted notation for a type carried as `source`.
    pub fn restricted(&self, type_name: &str, source: &str) -> Result<RestrictedType> {
        Ok(RestrictedType {
            name: type_name.to_string(),
            label: None,
            provides: self.provides(type_name)?,
            source: source.to_string(),
            descriptor: object_descriptor(type_name, &[]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IntoValue;
    use crate::schema::shape::{FieldType, Param};

    #[derive(Debug, Clone)]
    struct A {
        x: i32,
    }

    fn register_a(registry: &TypeRegistry, supertypes: &[&str]) {
        let mut builder = TypeShape::concrete::<A>("demo.A")
            .property("x", FieldType::Int, |a: &A| a.x.into_value())
            .constructor(vec![Param::new("x", FieldType::Int)], |mut args| {
                Ok(A { x: args.arg(0)? })
            });
        for s in supertypes {
            builder = builder.implements(*s);
        }
        registry.register(builder.build()).unwrap();
    }

    fn interface(registry: &TypeRegistry, name: &str, supertypes: &[&str], opted_in: bool) {
        let mut builder = TypeShape::interface(name);
        for s in supertypes {
            builder = builder.implements(*s);
        }
        if opted_in {
            builder = builder.serializable();
        }
        registry.register(builder.build()).unwrap();
    }

    #[test]
    fn test_provides_lists_opted_in_interfaces() {
        let registry = TypeRegistry::new();
        register_a(&registry, &["demo.I", "demo.J"]);
        interface(&registry, "demo.I", &["demo.Base"], true);
        interface(&registry, "demo.J", &[], true);
        interface(&registry, "demo.Base", &[], true);

        let provides = SchemaBuilder::new(&registry).provides("demo.A").unwrap();
        assert_eq!(provides, vec!["demo.I", "demo.Base", "demo.J"]);
    }

    #[test]
    fn test_provides_stops_at_non_opted_branch() {
        let registry = TypeRegistry::new();
        register_a(&registry, &["demo.Hidden"]);
        interface(&registry, "demo.Hidden", &["demo.Visible"], false);
        interface(&registry, "demo.Visible", &[], true);

        let provides = SchemaBuilder::new(&registry).provides("demo.A").unwrap();
        assert!(provides.is_empty());
    }

    #[test]
    fn test_provides_allow_list() {
        let registry = TypeRegistry::new();
        register_a(&registry, &["demo.Listed", "demo.Unregistered"]);
        interface(&registry, "demo.Listed", &[], false);
        registry.allow("demo.Listed").unwrap();

        let provides = SchemaBuilder::new(&registry).provides("demo.A").unwrap();
        assert_eq!(provides, vec!["demo.Listed"]);
    }

    #[test]
    fn test_provides_terminates_on_cycle() {
        let registry = TypeRegistry::new();
        register_a(&registry, &["demo.I"]);
        interface(&registry, "demo.I", &["demo.J", "demo.A"], true);
        interface(&registry, "demo.J", &["demo.I"], true);

        let provides = SchemaBuilder::new(&registry).provides("demo.A").unwrap();
        assert_eq!(provides, vec!["demo.I", "demo.J"]);
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let a = Field {
            name: "a".into(),
            type_name: "int".into(),
            mandatory: true,
        };
        let b = Field {
            name: "b".into(),
            type_name: "int".into(),
            mandatory: true,
        };
        let ab = fingerprint("demo.C", &[a.clone(), b.clone()]);
        let ba = fingerprint("demo.C", &[b, a]);
        assert_ne!(ab, ba);
        assert_eq!(ab.len(), 64);
    }

    #[test]
    fn test_fingerprint_depends_on_nullability() {
        let field = |mandatory| Field {
            name: "a".into(),
            type_name: "int".into(),
            mandatory,
        };
        assert_ne!(
            fingerprint("demo.C", &[field(true)]),
            fingerprint("demo.C", &[field(false)])
        );
    }

    #[test]
    fn test_composite_fields_and_descriptor() {
        let registry = TypeRegistry::new();
        register_a(&registry, &[]);
        let shape = registry.get("demo.A").unwrap().unwrap();
        let resolved = shape.resolve(&registry).unwrap();

        let composite = SchemaBuilder::new(&registry)
            .composite(&shape, &resolved.properties)
            .unwrap();
        assert_eq!(composite.field_names(), vec!["x"]);
        assert!(composite.fields[0].mandatory);
        assert!(composite.descriptor.name.starts_with(OBJECT_DESCRIPTOR_PREFIX));
        assert_eq!(
            composite.descriptor,
            object_descriptor("demo.A", &composite.fields)
        );
    }
}
