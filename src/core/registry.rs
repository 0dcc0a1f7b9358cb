// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Registry of type shapes.
//!
//! The registry is the registration boundary of the codec: it knows which
//! shape describes each type name and Rust type, and which supertypes are
//! opted in to schema embedding.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::error::{CodecError, Result};
use crate::schema::shape::{FieldType, TypeShape};

/// Thread-safe registry of type shapes.
///
/// Uses RwLock for concurrent read access with exclusive write access.
/// Shapes are validated on registration, so a type whose constructor cannot
/// be resolved never enters the registry.
pub struct TypeRegistry {
    inner: RwLock<TypeRegistryInner>,
}

#[derive(Default)]
struct TypeRegistryInner {
    shapes: HashMap<String, Arc<TypeShape>>,
    by_type_id: HashMap<TypeId, String>,
    allow_list: HashSet<String>,
}

impl TypeRegistry {
    /// Create a new empty type registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(TypeRegistryInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TypeRegistryInner>> {
        self.inner
            .read()
            .map_err(|e| CodecError::Other(format!("Registry lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TypeRegistryInner>> {
        self.inner
            .write()
            .map_err(|e| CodecError::Other(format!("Registry lock poisoned: {e}")))
    }

    /// Register a shape.
    ///
    /// Name checks and constructor resolution run here so that repeated
    /// names and ambiguous or missing constructors fail at registration
    /// rather than at first use.
    /// Registering the same Rust type again under the same name replaces the
    /// shape; a different Rust type under a taken name is rejected.
    pub fn register(&self, shape: TypeShape) -> Result<()> {
        shape.check_unique_names()?;
        shape.resolve_constructor()?;

        let mut inner = self.write()?;
        if let Some(existing) = inner.shapes.get(&shape.name) {
            if existing.type_id != shape.type_id {
                return Err(CodecError::DuplicateType {
                    type_name: shape.name.clone(),
                });
            }
        }
        if let Some(type_id) = shape.type_id {
            if let Some(name) = inner.by_type_id.get(&type_id) {
                if name != &shape.name {
                    return Err(CodecError::DuplicateType {
                        type_name: shape.name.clone(),
                    });
                }
            }
            inner.by_type_id.insert(type_id, shape.name.clone());
        }
        tracing::debug!(type_name = %shape.name, kind = ?shape.kind, "registered type shape");
        inner.shapes.insert(shape.name.clone(), Arc::new(shape));
        Ok(())
    }

    /// Opt a supertype name in to schema embedding.
    pub fn allow(&self, name: impl Into<String>) -> Result<()> {
        self.write()?.allow_list.insert(name.into());
        Ok(())
    }

    /// Get a shape by type name.
    pub fn get(&self, name: &str) -> Result<Option<Arc<TypeShape>>> {
        Ok(self.read()?.shapes.get(name).cloned())
    }

    /// Get the shape registered for a Rust type.
    pub fn get_by_type_id(&self, type_id: TypeId) -> Result<Option<Arc<TypeShape>>> {
        let inner = self.read()?;
        Ok(inner
            .by_type_id
            .get(&type_id)
            .and_then(|name| inner.shapes.get(name))
            .cloned())
    }

    /// Type name registered for a Rust type.
    pub fn name_of(&self, type_id: TypeId) -> Result<Option<String>> {
        Ok(self.read()?.by_type_id.get(&type_id).cloned())
    }

    /// Check if a type name is registered.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.shapes.contains_key(name))
    }

    /// All registered type names.
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.read()?.shapes.keys().cloned().collect())
    }

    /// Number of registered shapes.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.shapes.len())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether a type may appear in a schema's provides list.
    ///
    /// A type is opted in when its shape is marked serializable or its name
    /// is on the allow-list. Unregistered names are opted in only through
    /// the allow-list.
    pub fn is_opted_in(&self, name: &str) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner.allow_list.contains(name)
            || inner.shapes.get(name).is_some_and(|s| s.serializable))
    }

    /// Check whether `sub` is `sup` or reaches it through declared supertypes.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> Result<bool> {
        if sub == sup {
            return Ok(true);
        }
        let inner = self.read()?;
        let mut visited = HashSet::new();
        let mut pending = vec![sub.to_string()];
        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(shape) = inner.shapes.get(&name) else {
                continue;
            };
            for supertype in &shape.supertypes {
                if supertype == sup {
                    return Ok(true);
                }
                pending.push(supertype.clone());
            }
        }
        Ok(false)
    }

    /// Check whether a value declared as `from` can be passed where `to` is
    /// expected.
    pub fn is_assignable(
        &self,
        from: &FieldType,
        from_nullable: bool,
        to: &FieldType,
        to_nullable: bool,
    ) -> Result<bool> {
        if from_nullable && !to_nullable {
            return Ok(false);
        }
        self.is_type_assignable(from, to)
    }

    fn is_type_assignable(&self, from: &FieldType, to: &FieldType) -> Result<bool> {
        match (from, to) {
            (_, FieldType::Any) => Ok(true),
            (FieldType::List(a), FieldType::List(b)) => self.is_type_assignable(a, b),
            (FieldType::Named(a), FieldType::Named(b)) => self.is_subtype(a, b),
            (a, b) => Ok(a == b),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::schema::shape::Param;

    #[derive(Debug, Clone)]
    struct Unit;

    #[derive(Debug, Clone)]
    struct Other;

    fn unit_shape(name: &str) -> TypeShape {
        TypeShape::concrete::<Unit>(name)
            .constructor(Vec::new(), |_| Ok(Unit))
            .implements("demo.I")
            .build()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        registry.register(unit_shape("demo.Unit")).unwrap();

        assert!(registry.contains("demo.Unit").unwrap());
        assert_eq!(registry.len().unwrap(), 1);
        assert!(!registry.is_empty().unwrap());
        assert_eq!(
            registry.name_of(TypeId::of::<Unit>()).unwrap().as_deref(),
            Some("demo.Unit")
        );
        assert!(registry
            .get_by_type_id(TypeId::of::<Unit>())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_register_same_type_twice_replaces() {
        let registry = TypeRegistry::new();
        registry.register(unit_shape("demo.Unit")).unwrap();
        registry.register(unit_shape("demo.Unit")).unwrap();
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_register_conflicting_type_rejected() {
        let registry = TypeRegistry::new();
        registry.register(unit_shape("demo.Unit")).unwrap();
        let other = TypeShape::concrete::<Other>("demo.Unit")
            .constructor(Vec::new(), |_| Ok(Other))
            .build();
        assert!(matches!(
            registry.register(other),
            Err(CodecError::DuplicateType { .. })
        ));
        assert!(matches!(
            registry.register(unit_shape("demo.Renamed")),
            Err(CodecError::DuplicateType { .. })
        ));
    }

    #[test]
    fn test_register_fails_fast_on_ambiguity() {
        let registry = TypeRegistry::new();
        let shape = TypeShape::concrete::<Unit>("demo.Unit")
            .marked_constructor(Vec::new(), |_| Ok(Unit))
            .marked_constructor(vec![Param::new("x", FieldType::Int)], |_| Ok(Unit))
            .build();
        assert!(matches!(
            registry.register(shape),
            Err(CodecError::AmbiguousConstructor { .. })
        ));
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn test_register_rejects_repeated_param() {
        #[derive(Debug, Clone)]
        struct Dup {
            a: i32,
        }

        let registry = TypeRegistry::new();
        let shape = TypeShape::concrete::<Dup>("demo.Dup")
            .property("a", FieldType::Int, |d: &Dup| Value::Int(d.a))
            .constructor(
                vec![Param::new("a", FieldType::Int), Param::new("a", FieldType::Int)],
                |mut args| Ok(Dup { a: args.arg(0)? }),
            )
            .build();
        assert!(matches!(
            registry.register(shape),
            Err(CodecError::PropertyMismatch { .. })
        ));
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn test_opt_in() {
        let registry = TypeRegistry::new();
        registry
            .register(TypeShape::interface("demo.Marked").serializable().build())
            .unwrap();
        registry
            .register(TypeShape::interface("demo.Plain").build())
            .unwrap();
        registry.allow("demo.Listed").unwrap();

        assert!(registry.is_opted_in("demo.Marked").unwrap());
        assert!(!registry.is_opted_in("demo.Plain").unwrap());
        assert!(registry.is_opted_in("demo.Listed").unwrap());
        assert!(!registry.is_opted_in("demo.Unknown").unwrap());
    }

    #[test]
    fn test_subtype_through_cycle_terminates() {
        let registry = TypeRegistry::new();
        registry.register(unit_shape("demo.Unit")).unwrap();
        registry
            .register(TypeShape::interface("demo.I").implements("demo.J").build())
            .unwrap();
        registry
            .register(TypeShape::interface("demo.J").implements("demo.I").build())
            .unwrap();

        assert!(registry.is_subtype("demo.Unit", "demo.J").unwrap());
        assert!(!registry.is_subtype("demo.Unit", "demo.K").unwrap());
    }

    #[test]
    fn test_assignability() {
        let registry = TypeRegistry::new();
        registry.register(unit_shape("demo.Unit")).unwrap();

        let unit = FieldType::named("demo.Unit");
        let iface = FieldType::named("demo.I");
        assert!(registry.is_assignable(&unit, false, &iface, false).unwrap());
        assert!(!registry.is_assignable(&iface, false, &unit, false).unwrap());
        assert!(registry
            .is_assignable(&FieldType::Int, false, &FieldType::Any, false)
            .unwrap());
        assert!(registry
            .is_assignable(&FieldType::Int, false, &FieldType::Int, true)
            .unwrap());
        assert!(!registry
            .is_assignable(&FieldType::Int, true, &FieldType::Int, false)
            .unwrap());
        assert!(registry
            .is_assignable(
                &FieldType::list(unit.clone()),
                false,
                &FieldType::list(iface),
                false
            )
            .unwrap());
        assert!(!registry
            .is_assignable(&FieldType::Int, false, &FieldType::Long, false)
            .unwrap());
    }
}
