// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Value model shared by the wire format and the codecs.
//!
//! [`Value`] is what travels on the wire: primitives, lists, maps and
//! described values. While a value is being written or read it may also
//! carry an [`Instance`], a type-erased live object that a codec turns into
//! (or builds from) a described value.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{CodecError, Result};

/// A live object of any registered type.
pub type Object = dyn Any + Send + Sync;

/// Unified value type for encoded data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,

    // Boolean
    Bool(bool),

    // Unsigned integers
    UByte(u8),
    UShort(u16),
    UInt(u32),
    ULong(u64),

    // Signed integers
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),

    // Floating point
    Float(f32),
    Double(f64),

    /// Unicode scalar value
    Char(char),

    /// Milliseconds since the Unix epoch
    Timestamp(i64),

    /// Opaque bytes
    Binary(Vec<u8>),

    /// UTF-8 string
    String(String),

    /// Symbolic constant (ASCII), used for descriptors
    Symbol(String),

    /// Ordered sequence
    List(Vec<Value>),

    /// Ordered key/value pairs
    Map(Vec<(Value, Value)>),

    /// A value tagged with a descriptor
    Described(Box<DescribedValue>),

    /// A live object, only present before writing and after reading
    Instance(Instance),
}

/// A value together with the descriptor that identifies its type.
#[derive(Debug, Clone, PartialEq)]
pub struct DescribedValue {
    /// Symbol or numeric code
    pub descriptor: Value,
    /// The described body
    pub value: Value,
}

/// Identity tag of a type on the wire.
///
/// The numeric code, when present, is written in place of the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    /// Symbolic name
    pub name: String,
    /// Optional numeric code
    pub code: Option<u64>,
}

impl Descriptor {
    /// Create a symbolic descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
        }
    }

    /// Create a descriptor with a numeric code.
    pub fn with_code(name: impl Into<String>, code: u64) -> Self {
        Self {
            name: name.into(),
            code: Some(code),
        }
    }

    /// The value written in front of a described body.
    pub fn to_value(&self) -> Value {
        match self.code {
            Some(code) => Value::ULong(code),
            None => Value::Symbol(self.name.clone()),
        }
    }

    /// Check whether a wire descriptor value refers to this descriptor.
    pub fn matches(&self, value: &Value) -> bool {
        match value {
            Value::ULong(code) => self.code == Some(*code),
            Value::Symbol(name) => &self.name == name,
            _ => false,
        }
    }

    /// Wrap a body with this descriptor.
    pub fn describe(&self, value: Value) -> Value {
        Value::Described(Box::new(DescribedValue {
            descriptor: self.to_value(),
            value,
        }))
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}({code:#x})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Type-erased, shared live object.
#[derive(Clone)]
pub struct Instance {
    object: Arc<Object>,
    rust_type: &'static str,
}

impl Instance {
    /// Wrap a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            object: Arc::new(value),
            rust_type: std::any::type_name::<T>(),
        }
    }

    /// Borrow the wrapped object.
    pub fn object(&self) -> &Object {
        self.object.as_ref()
    }

    /// Runtime type of the wrapped object.
    pub fn type_id(&self) -> TypeId {
        Any::type_id(self.object.as_ref())
    }

    /// Rust type name of the wrapped object, for diagnostics.
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Borrow the wrapped object as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// Take the wrapped object as `T`, cloning only if it is shared.
    pub fn downcast<T: Any + Send + Sync + Clone>(self) -> Result<T> {
        let Instance { object, rust_type } = self;
        match object.downcast::<T>() {
            Ok(arc) => Ok(Arc::try_unwrap(arc).unwrap_or_else(|shared| (*shared).clone())),
            Err(_) => Err(CodecError::type_mismatch(
                std::any::type_name::<T>(),
                rust_type,
            )),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.rust_type)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::UByte(_) => "ubyte",
            Value::UShort(_) => "ushort",
            Value::UInt(_) => "uint",
            Value::ULong(_) => "ulong",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Char(_) => "char",
            Value::Timestamp(_) => "timestamp",
            Value::Binary(_) => "binary",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Described(_) => "described",
            Value::Instance(_) => "instance",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wrap a live object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Instance(Instance::new(value))
    }

    /// Wrap a live object, or null.
    pub fn optional_object<T: Any + Send + Sync>(value: Option<T>) -> Self {
        value.map(Value::object).unwrap_or(Value::Null)
    }

    /// Wrap a sequence of live objects as a list.
    pub fn objects<T, I>(values: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        Value::List(values.into_iter().map(Value::object).collect())
    }

    /// Wrap raw bytes.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Binary(bytes.into())
    }

    /// Take raw bytes out of a binary value.
    pub fn into_binary(self) -> Result<Vec<u8>> {
        match self {
            Value::Binary(bytes) => Ok(bytes),
            other => Err(unexpected("binary", &other)),
        }
    }

    /// Take a live object out of an instance value.
    pub fn into_object<T: Any + Send + Sync + Clone>(self) -> Result<T> {
        match self {
            Value::Instance(instance) => instance.downcast(),
            other => Err(unexpected(std::any::type_name::<T>(), &other)),
        }
    }

    /// Like [`Value::into_object`], mapping null to `None`.
    pub fn into_optional_object<T: Any + Send + Sync + Clone>(self) -> Result<Option<T>> {
        match self {
            Value::Null => Ok(None),
            other => other.into_object().map(Some),
        }
    }

    /// Take a list of live objects.
    pub fn into_objects<T: Any + Send + Sync + Clone>(self) -> Result<Vec<T>> {
        match self {
            Value::List(items) => items.into_iter().map(Value::into_object).collect(),
            other => Err(unexpected("list", &other)),
        }
    }

    /// Convert to JSON for display.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value as Json};
        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => json!(v),
            Value::UByte(v) => json!(v),
            Value::UShort(v) => json!(v),
            Value::UInt(v) => json!(v),
            Value::ULong(v) => json!(v),
            Value::Byte(v) => json!(v),
            Value::Short(v) => json!(v),
            Value::Int(v) => json!(v),
            Value::Long(v) => json!(v),
            Value::Float(v) => json!(v),
            Value::Double(v) => json!(v),
            Value::Char(v) => json!(v.to_string()),
            Value::Timestamp(v) => json!({ "timestamp": v }),
            Value::Binary(bytes) => json!({ "binary": hex::encode(bytes) }),
            Value::String(s) => json!(s),
            Value::Symbol(s) => json!({ "symbol": s }),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => Json::Array(
                entries
                    .iter()
                    .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                    .collect(),
            ),
            Value::Described(described) => json!({
                "descriptor": described.descriptor.to_json(),
                "value": described.value.to_json(),
            }),
            Value::Instance(instance) => json!({ "instance": instance.rust_type() }),
        }
    }
}

fn unexpected(expected: &str, found: &Value) -> CodecError {
    CodecError::malformed(format!("expected {expected}, found {}", found.kind()))
}

/// Conversion of a Rust value into a [`Value`].
pub trait IntoValue {
    /// Perform the conversion.
    fn into_value(self) -> Value;
}

/// Conversion of a [`Value`] back into a Rust value.
pub trait FromValue: Sized {
    /// Perform the conversion.
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! primitive_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(unexpected($name, &other)),
                }
            }
        }
    };
}

primitive_value!(bool, Bool, "boolean");
primitive_value!(u8, UByte, "ubyte");
primitive_value!(u16, UShort, "ushort");
primitive_value!(u32, UInt, "uint");
primitive_value!(u64, ULong, "ulong");
primitive_value!(i8, Byte, "byte");
primitive_value!(i16, Short, "short");
primitive_value!(i32, Int, "int");
primitive_value!(i64, Long, "long");
primitive_value!(f32, Float, "float");
primitive_value!(f64, Double, "double");
primitive_value!(char, Char, "char");
primitive_value!(String, String, "string");

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(unexpected("list", &other)),
        }
    }
}

/// Ordered constructor arguments.
///
/// Arguments are taken by position; a taken slot is left null.
#[derive(Debug, Default)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    /// Create from decoded values in constructor order.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow an argument.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Take the raw value at `index`.
    pub fn take(&mut self, index: usize) -> Result<Value> {
        let len = self.values.len();
        self.values
            .get_mut(index)
            .map(std::mem::take)
            .ok_or_else(|| {
                CodecError::malformed(format!("argument {index} out of range ({len} arguments)"))
            })
    }

    /// Take and convert the argument at `index`.
    pub fn arg<T: FromValue>(&mut self, index: usize) -> Result<T> {
        T::from_value(self.take(index)?)
    }

    /// Take a live object.
    pub fn object<T: Any + Send + Sync + Clone>(&mut self, index: usize) -> Result<T> {
        self.take(index)?.into_object()
    }

    /// Take a nullable live object.
    pub fn optional_object<T: Any + Send + Sync + Clone>(
        &mut self,
        index: usize,
    ) -> Result<Option<T>> {
        self.take(index)?.into_optional_object()
    }

    /// Take a list of live objects.
    pub fn objects<T: Any + Send + Sync + Clone>(&mut self, index: usize) -> Result<Vec<T>> {
        self.take(index)?.into_objects()
    }

    /// Take raw bytes.
    pub fn binary(&mut self, index: usize) -> Result<Vec<u8>> {
        self.take(index)?.into_binary()
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}
