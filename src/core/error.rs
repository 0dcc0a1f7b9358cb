// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for evocodec.
//!
//! Errors fall into a few groups:
//! - Shape resolution (constructor selection, property matching)
//! - Envelope and wire format problems
//! - Schema evolution failures
//! - Registry and configuration problems

use thiserror::Error;

/// Errors that can occur while building or using a codec.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// No constructor could be selected for a concrete type.
    #[error("No constructor for deserialization found for '{type_name}'")]
    NoConstructorFound {
        /// Type being resolved
        type_name: String,
    },

    /// More than one constructor is marked for deserialization.
    #[error("{count} constructors of '{type_name}' are marked for deserialization, expected at most one")]
    AmbiguousConstructor {
        /// Type being resolved
        type_name: String,
        /// Number of marked constructors
        count: usize,
    },

    /// A constructor parameter has no matching readable property.
    #[error("Property mismatch on '{type_name}.{property}': {reason}")]
    PropertyMismatch {
        /// Type being resolved
        type_name: String,
        /// Parameter or property name
        property: String,
        /// What did not match
        reason: String,
    },

    /// The payload does not have the structure the codec expects.
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Description of the problem
        reason: String,
    },

    /// An old payload cannot be reconciled with the live shape.
    #[error("Incompatible schema change for '{type_name}' field '{field}': {reason}")]
    IncompatibleSchemaChange {
        /// Live type name
        type_name: String,
        /// Field that cannot be supplied
        field: String,
        /// Why the field cannot be supplied
        reason: String,
    },

    /// Write attempted through a read-only codec.
    #[error("Codec for '{type_name}' is read-only and cannot write")]
    UnsupportedWrite {
        /// Type the codec was built for
        type_name: String,
    },

    /// No shape or codec is registered for a type.
    #[error("Type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name or Rust type that was not found
        type_name: String,
    },

    /// The payload holds a different type than the caller asked for.
    #[error("Type mismatch: expected '{expected}', payload holds '{found}'")]
    TypeMismatch {
        /// Requested type
        expected: String,
        /// Type found in the payload
        found: String,
    },

    /// A type name is already registered for a different Rust type.
    #[error("Type '{type_name}' is already registered")]
    DuplicateType {
        /// Conflicting type name
        type_name: String,
    },

    /// Buffer too short for requested read
    #[error("Buffer too short: requested {requested} bytes at position {position}, but only {available} bytes available")]
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        position: usize,
    },

    /// Unknown format code in the value stream.
    #[error("Invalid format code 0x{code:02x} at position {position}")]
    InvalidFormatCode {
        /// The offending code
        code: u8,
        /// Cursor position of the code
        position: usize,
    },

    /// Nesting deeper than the configured limit.
    #[error("Nesting depth exceeds limit of {limit}")]
    DepthExceeded {
        /// Configured limit
        limit: usize,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl CodecError {
    /// Create a "no constructor" error.
    pub fn no_constructor(type_name: impl Into<String>) -> Self {
        CodecError::NoConstructorFound {
            type_name: type_name.into(),
        }
    }

    /// Create an ambiguous constructor error.
    pub fn ambiguous_constructor(type_name: impl Into<String>, count: usize) -> Self {
        CodecError::AmbiguousConstructor {
            type_name: type_name.into(),
            count,
        }
    }

    /// Create a property mismatch error.
    pub fn property_mismatch(
        type_name: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CodecError::PropertyMismatch {
            type_name: type_name.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed envelope error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    /// Create an incompatible schema change error.
    pub fn incompatible(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CodecError::IncompatibleSchemaChange {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported write error.
    pub fn unsupported_write(type_name: impl Into<String>) -> Self {
        CodecError::UnsupportedWrite {
            type_name: type_name.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        CodecError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, position: usize) -> Self {
        CodecError::BufferTooShort {
            requested,
            available,
            position,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        CodecError::Config {
            message: message.into(),
        }
    }

    /// True for errors raised while resolving a type's shape.
    ///
    /// These are permanent until the type definition changes.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            CodecError::NoConstructorFound { .. }
                | CodecError::AmbiguousConstructor { .. }
                | CodecError::PropertyMismatch { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::NoConstructorFound { type_name }
            | CodecError::UnsupportedWrite { type_name }
            | CodecError::TypeNotFound { type_name }
            | CodecError::DuplicateType { type_name } => vec![("type", type_name.clone())],
            CodecError::AmbiguousConstructor { type_name, count } => {
                vec![("type", type_name.clone()), ("count", count.to_string())]
            }
            CodecError::PropertyMismatch {
                type_name,
                property,
                reason,
            } => vec![
                ("type", type_name.clone()),
                ("property", property.clone()),
                ("reason", reason.clone()),
            ],
            CodecError::MalformedEnvelope { reason } => vec![("reason", reason.clone())],
            CodecError::IncompatibleSchemaChange {
                type_name,
                field,
                reason,
            } => vec![
                ("type", type_name.clone()),
                ("field", field.clone()),
                ("reason", reason.clone()),
            ],
            CodecError::TypeMismatch { expected, found } => {
                vec![("expected", expected.clone()), ("found", found.clone())]
            }
            CodecError::BufferTooShort {
                requested,
                available,
                position,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::InvalidFormatCode { code, position } => vec![
                ("code", format!("0x{code:02x}")),
                ("position", position.to_string()),
            ],
            CodecError::DepthExceeded { limit } => vec![("limit", limit.to_string())],
            CodecError::Config { message } => vec![("message", message.clone())],
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Other(format!("IO error: {err}"))
    }
}

/// Result type for evocodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_constructor_error() {
        let err = CodecError::no_constructor("demo.C");
        assert!(matches!(err, CodecError::NoConstructorFound { .. }));
        assert_eq!(
            err.to_string(),
            "No constructor for deserialization found for 'demo.C'"
        );
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_ambiguous_constructor_error() {
        let err = CodecError::ambiguous_constructor("demo.C", 2);
        assert_eq!(
            err.to_string(),
            "2 constructors of 'demo.C' are marked for deserialization, expected at most one"
        );
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_property_mismatch_error() {
        let err = CodecError::property_mismatch("demo.C", "a", "no readable property");
        assert_eq!(
            err.to_string(),
            "Property mismatch on 'demo.C.a': no readable property"
        );
    }

    #[test]
    fn test_incompatible_error() {
        let err = CodecError::incompatible("demo.C", "b", "not nullable");
        assert!(!err.is_shape_error());
        assert_eq!(
            err.to_string(),
            "Incompatible schema change for 'demo.C' field 'b': not nullable"
        );
    }

    #[test]
    fn test_unsupported_write_error() {
        let err = CodecError::unsupported_write("demo.C");
        assert_eq!(
            err.to_string(),
            "Codec for 'demo.C' is read-only and cannot write"
        );
    }

    #[test]
    fn test_buffer_too_short_error() {
        let err = CodecError::buffer_too_short(8, 3, 10);
        assert_eq!(
            err.to_string(),
            "Buffer too short: requested 8 bytes at position 10, but only 3 bytes available"
        );
    }

    #[test]
    fn test_invalid_format_code_error() {
        let err = CodecError::InvalidFormatCode {
            code: 0xfe,
            position: 4,
        };
        assert_eq!(err.to_string(), "Invalid format code 0xfe at position 4");
    }

    #[test]
    fn test_log_fields_property_mismatch() {
        let err = CodecError::property_mismatch("T", "p", "r");
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], ("type", "T".to_string()));
        assert_eq!(fields[1], ("property", "p".to_string()));
        assert_eq!(fields[2], ("reason", "r".to_string()));
    }

    #[test]
    fn test_log_fields_buffer_too_short() {
        let err = CodecError::buffer_too_short(100, 50, 10);
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].1, "100");
        assert_eq!(fields[1].1, "50");
        assert_eq!(fields[2].1, "10");
    }

    #[test]
    fn test_log_fields_invalid_format_code() {
        let err = CodecError::InvalidFormatCode {
            code: 0x0a,
            position: 1,
        };
        assert_eq!(err.log_fields()[0].1, "0x0a");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let codec_err: CodecError = io_err.into();
        assert_eq!(codec_err.to_string(), "Other error: IO error: file not found");
    }

    #[test]
    fn test_error_clone() {
        let err1 = CodecError::malformed("bad");
        let err2 = err1.clone();
        assert_eq!(err1.to_string(), err2.to_string());
    }
}
