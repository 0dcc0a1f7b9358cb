// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type shapes: the registered description of how a type is taken apart
//! and rebuilt.
//!
//! A [`TypeShape`] lists a type's readable properties, its constructors and
//! its declared supertypes. Shapes are built once with [`ShapeBuilder`] and
//! registered with the [`TypeRegistry`](crate::core::TypeRegistry).
//!
//! # Example
//!
//! ```
//! use evocodec::schema::{FieldType, Param, TypeShape};
//! use evocodec::IntoValue;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: Option<i32>,
//! }
//!
//! let shape = TypeShape::concrete::<Point>("demo.Point")
//!     .property("x", FieldType::Int, |p: &Point| p.x.into_value())
//!     .nullable_property("y", FieldType::Int, |p: &Point| p.y.into_value())
//!     .constructor(
//!         vec![Param::new("x", FieldType::Int), Param::nullable("y", FieldType::Int)],
//!         |mut args| Ok(Point { x: args.arg(0)?, y: args.arg(1)? }),
//!     )
//!     .build();
//! assert!(shape.resolve_constructor().unwrap().is_some());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::{Args, CodecError, Instance, Object, Result, TypeRegistry, Value};

/// Reads one property value from a live object.
pub type Getter = Arc<dyn Fn(&Object) -> Result<Value> + Send + Sync>;

/// Builds a live object from ordered arguments.
pub type Builder = Arc<dyn Fn(Args) -> Result<Instance> + Send + Sync>;

/// Declared type of a field, property or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    UByte,
    UShort,
    UInt,
    ULong,
    Float,
    Double,
    Char,
    Timestamp,
    String,
    Symbol,
    Binary,
    /// Homogeneous list
    List(Box<FieldType>),
    /// Any value; the runtime type decides the encoding
    Any,
    /// A registered type, by name
    Named(String),
}

impl FieldType {
    /// A registered type.
    pub fn named(name: impl Into<String>) -> Self {
        FieldType::Named(name.into())
    }

    /// A list of `element`.
    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    /// Parse the wire form produced by [`FieldType::type_name`].
    ///
    /// Names that are not primitives, lists or `*` are taken as registered
    /// type names.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name == "*" {
            return FieldType::Any;
        }
        if let Some(inner) = name
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return FieldType::list(FieldType::parse(inner));
        }
        match name {
            "boolean" => FieldType::Boolean,
            "byte" => FieldType::Byte,
            "short" => FieldType::Short,
            "int" => FieldType::Int,
            "long" => FieldType::Long,
            "ubyte" => FieldType::UByte,
            "ushort" => FieldType::UShort,
            "uint" => FieldType::UInt,
            "ulong" => FieldType::ULong,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "char" => FieldType::Char,
            "timestamp" => FieldType::Timestamp,
            "string" => FieldType::String,
            "symbol" => FieldType::Symbol,
            "binary" => FieldType::Binary,
            other => FieldType::Named(other.to_string()),
        }
    }

    /// Wire form of this type, as recorded in a schema field.
    pub fn type_name(&self) -> String {
        let primitive = match self {
            FieldType::List(element) => return format!("list<{}>", element.type_name()),
            FieldType::Any => "*",
            FieldType::Named(name) => return name.clone(),
            FieldType::Boolean => "boolean",
            FieldType::Byte => "byte",
            FieldType::Short => "short",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::UByte => "ubyte",
            FieldType::UShort => "ushort",
            FieldType::UInt => "uint",
            FieldType::ULong => "ulong",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Char => "char",
            FieldType::Timestamp => "timestamp",
            FieldType::String => "string",
            FieldType::Symbol => "symbol",
            FieldType::Binary => "binary",
        };
        primitive.to_string()
    }

    /// True for the fixed primitive types.
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            FieldType::List(_) | FieldType::Any | FieldType::Named(_)
        )
    }

    /// Check whether a wire value has this primitive type.
    pub fn accepts_primitive(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::Boolean, Value::Bool(_))
                | (FieldType::Byte, Value::Byte(_))
                | (FieldType::Short, Value::Short(_))
                | (FieldType::Int, Value::Int(_))
                | (FieldType::Long, Value::Long(_))
                | (FieldType::UByte, Value::UByte(_))
                | (FieldType::UShort, Value::UShort(_))
                | (FieldType::UInt, Value::UInt(_))
                | (FieldType::ULong, Value::ULong(_))
                | (FieldType::Float, Value::Float(_))
                | (FieldType::Double, Value::Double(_))
                | (FieldType::Char, Value::Char(_))
                | (FieldType::Timestamp, Value::Timestamp(_))
                | (FieldType::String, Value::String(_))
                | (FieldType::Symbol, Value::Symbol(_))
                | (FieldType::Binary, Value::Binary(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name, matched against property names
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Whether the parameter accepts absence
    pub nullable: bool,
}

impl Param {
    /// A non-nullable parameter.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    /// A nullable parameter.
    pub fn nullable(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }
}

/// A readable property.
#[derive(Clone)]
pub struct PropertyShape {
    /// Property name
    pub name: String,
    /// Declared type of the property
    pub field_type: FieldType,
    /// Whether the property may be null
    pub nullable: bool,
    /// Accessor; abstract shapes may declare properties without one
    pub getter: Option<Getter>,
}

impl fmt::Debug for PropertyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyShape")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("nullable", &self.nullable)
            .field("readable", &self.getter.is_some())
            .finish()
    }
}

/// One way of building an instance.
#[derive(Clone)]
pub struct ConstructorShape {
    /// Parameters in call order
    pub params: Vec<Param>,
    /// Explicitly marked for use by deserialization
    pub marked: bool,
    /// The type's canonical constructor
    pub primary: bool,
    build: Builder,
}

impl ConstructorShape {
    /// Invoke with arguments in parameter order.
    pub fn construct(&self, args: Args) -> Result<Instance> {
        (self.build)(args)
    }
}

impl fmt::Debug for ConstructorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorShape")
            .field("params", &self.params)
            .field("marked", &self.marked)
            .field("primary", &self.primary)
            .finish()
    }
}

/// What kind of type a shape describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Instantiable type with constructors
    Concrete,
    /// Abstract base, never constructed directly
    Abstract,
    /// Interface, never constructed directly
    Interface,
}

/// Registered shape of one type.
#[derive(Debug, Clone)]
pub struct TypeShape {
    /// Type name used in schemas
    pub name: String,
    /// Concrete, abstract or interface
    pub kind: ShapeKind,
    /// Rust type backing a concrete shape
    pub type_id: Option<TypeId>,
    /// Readable properties in declaration order
    pub properties: Vec<PropertyShape>,
    /// Constructors in declaration order
    pub constructors: Vec<ConstructorShape>,
    /// Declared supertypes (interfaces and base class) by name
    pub supertypes: Vec<String>,
    /// The type opts itself in to schema embedding
    pub serializable: bool,
}

/// The properties and constructor a codec is built from.
#[derive(Debug, Clone)]
pub struct ResolvedShape {
    /// Constructor, absent for abstract and interface shapes
    pub constructor: Option<ConstructorShape>,
    /// Properties in codec order
    pub properties: Vec<PropertyShape>,
}

impl TypeShape {
    /// Start a concrete shape backed by `T`.
    pub fn concrete<T: Any + Send + Sync>(name: impl Into<String>) -> ShapeBuilder<T> {
        ShapeBuilder::start(name.into(), ShapeKind::Concrete, Some(TypeId::of::<T>()))
    }

    /// Start an interface shape.
    pub fn interface(name: impl Into<String>) -> ShapeBuilder<()> {
        ShapeBuilder::start(name.into(), ShapeKind::Interface, None)
    }

    /// Start an abstract base shape.
    pub fn abstract_class(name: impl Into<String>) -> ShapeBuilder<()> {
        ShapeBuilder::start(name.into(), ShapeKind::Abstract, None)
    }

    /// True if instances can be built.
    pub fn is_concrete(&self) -> bool {
        self.kind == ShapeKind::Concrete
    }

    /// True for interface shapes.
    pub fn is_interface(&self) -> bool {
        self.kind == ShapeKind::Interface
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyShape> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Reject repeated property names, and repeated parameter names within
    /// any constructor. Field names must be unique within a composite.
    pub fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(CodecError::property_mismatch(
                    &self.name,
                    &property.name,
                    "property is declared more than once",
                ));
            }
        }
        for constructor in &self.constructors {
            let mut seen = HashSet::new();
            for param in &constructor.params {
                if !seen.insert(param.name.as_str()) {
                    return Err(CodecError::property_mismatch(
                        &self.name,
                        &param.name,
                        "constructor parameter is declared more than once",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Select the constructor used for deserialization.
    ///
    /// Precedence: the only constructor; the non-empty one of exactly two
    /// when the other takes no arguments; the single marked constructor;
    /// the primary constructor. Two or more marked constructors are
    /// ambiguous. Abstract and interface shapes resolve to `None`.
    pub fn resolve_constructor(&self) -> Result<Option<&ConstructorShape>> {
        if !self.is_concrete() {
            return Ok(None);
        }

        let marked: Vec<&ConstructorShape> =
            self.constructors.iter().filter(|c| c.marked).collect();
        if marked.len() > 1 {
            return Err(CodecError::ambiguous_constructor(&self.name, marked.len()));
        }

        let selected = match self.constructors.as_slice() {
            [only] => Some(only),
            [first, second] if first.params.is_empty() != second.params.is_empty() => {
                Some(if first.params.is_empty() { second } else { first })
            }
            _ => marked
                .first()
                .copied()
                .or_else(|| self.constructors.iter().find(|c| c.primary)),
        };

        selected
            .map(Some)
            .ok_or_else(|| CodecError::no_constructor(&self.name))
    }

    /// Resolve the constructor and the properties that feed it.
    ///
    /// For a concrete shape every parameter must have a readable property of
    /// the same name whose type is assignable to the parameter's type. For
    /// abstract and interface shapes all properties are returned, sorted by
    /// name.
    pub fn resolve(&self, registry: &TypeRegistry) -> Result<ResolvedShape> {
        self.check_unique_names()?;
        let Some(constructor) = self.resolve_constructor()? else {
            let mut properties = self.properties.clone();
            properties.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(ResolvedShape {
                constructor: None,
                properties,
            });
        };

        let mut properties = Vec::with_capacity(constructor.params.len());
        for param in &constructor.params {
            let property = self.property(&param.name).ok_or_else(|| {
                CodecError::property_mismatch(
                    &self.name,
                    &param.name,
                    "no property matches the constructor parameter",
                )
            })?;
            if property.getter.is_none() {
                return Err(CodecError::property_mismatch(
                    &self.name,
                    &param.name,
                    "property is not readable",
                ));
            }
            let assignable = registry.is_assignable(
                &property.field_type,
                property.nullable,
                &param.field_type,
                param.nullable,
            )?;
            if !assignable {
                return Err(CodecError::property_mismatch(
                    &self.name,
                    &param.name,
                    format!(
                        "property type {}{} differs from constructor parameter type {}{}",
                        property.field_type,
                        if property.nullable { "?" } else { "" },
                        param.field_type,
                        if param.nullable { "?" } else { "" },
                    ),
                ));
            }
            properties.push(property.clone());
        }

        Ok(ResolvedShape {
            constructor: Some(constructor.clone()),
            properties,
        })
    }
}

/// Builder for [`TypeShape`].
pub struct ShapeBuilder<T> {
    shape: TypeShape,
    _marker: PhantomData<fn(&T)>,
}

impl<T> ShapeBuilder<T> {
    fn start(name: String, kind: ShapeKind, type_id: Option<TypeId>) -> Self {
        Self {
            shape: TypeShape {
                name,
                kind,
                type_id,
                properties: Vec::new(),
                constructors: Vec::new(),
                supertypes: Vec::new(),
                serializable: false,
            },
            _marker: PhantomData,
        }
    }

    /// Declare a property without an accessor (abstract shapes).
    pub fn declared_property(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        nullable: bool,
    ) -> Self {
        self.shape.properties.push(PropertyShape {
            name: name.into(),
            field_type,
            nullable,
            getter: None,
        });
        self
    }

    /// Declare a supertype (interface or base class).
    pub fn implements(mut self, supertype: impl Into<String>) -> Self {
        self.shape.supertypes.push(supertype.into());
        self
    }

    /// Opt this type in to schema embedding.
    pub fn serializable(mut self) -> Self {
        self.shape.serializable = true;
        self
    }

    /// Finish the shape.
    pub fn build(self) -> TypeShape {
        self.shape
    }
}

impl<T: Any + Send + Sync> ShapeBuilder<T> {
    /// Declare a non-nullable readable property.
    pub fn property<F>(self, name: impl Into<String>, field_type: FieldType, getter: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.readable(name.into(), field_type, false, getter)
    }

    /// Declare a nullable readable property.
    pub fn nullable_property<F>(
        self,
        name: impl Into<String>,
        field_type: FieldType,
        getter: F,
    ) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.readable(name.into(), field_type, true, getter)
    }

    fn readable<F>(mut self, name: String, field_type: FieldType, nullable: bool, getter: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let type_name = self.shape.name.clone();
        let getter: Getter = Arc::new(move |object: &Object| {
            object
                .downcast_ref::<T>()
                .map(&getter)
                .ok_or_else(|| CodecError::type_mismatch(&type_name, "foreign object"))
        });
        self.shape.properties.push(PropertyShape {
            name,
            field_type,
            nullable,
            getter: Some(getter),
        });
        self
    }

    /// Declare a constructor.
    pub fn constructor<F>(self, params: Vec<Param>, build: F) -> Self
    where
        F: Fn(Args) -> Result<T> + Send + Sync + 'static,
    {
        self.push_constructor(params, false, false, build)
    }

    /// Declare a constructor marked for deserialization.
    pub fn marked_constructor<F>(self, params: Vec<Param>, build: F) -> Self
    where
        F: Fn(Args) -> Result<T> + Send + Sync + 'static,
    {
        self.push_constructor(params, true, false, build)
    }

    /// Declare the type's primary constructor.
    pub fn primary_constructor<F>(self, params: Vec<Param>, build: F) -> Self
    where
        F: Fn(Args) -> Result<T> + Send + Sync + 'static,
    {
        self.push_constructor(params, false, true, build)
    }

    fn push_constructor<F>(mut self, params: Vec<Param>, marked: bool, primary: bool, build: F) -> Self
    where
        F: Fn(Args) -> Result<T> + Send + Sync + 'static,
    {
        let build: Builder = Arc::new(move |args| build(args).map(Instance::new));
        self.shape.constructors.push(ConstructorShape {
            params,
            marked,
            primary,
            build,
        });
        self
    }
}
