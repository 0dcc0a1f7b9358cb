// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # evocodec
//!
//! Self-describing object serialization with schema evolution.
//!
//! Every payload carries the schema of the types it contains. When a payload
//! written with an older shape of a type is read, its fields are matched to
//! the live constructor by name: reordered fields land in the right place,
//! removed fields are dropped and added nullable fields read as absent.
//!
//! ## Architecture
//!
//! - `core/` - errors, the wire value model, type registry, configuration
//! - `schema/` - type shapes, constructor resolution, schema notations
//! - `encoding/` - wire format, envelope, object/custom/evolution codecs and
//!   the [`CodecFactory`]
//! - `ledger` - ledger transaction types served by custom codecs
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use evocodec::{CodecFactory, FieldType, Param, TypeRegistry, TypeShape, Value};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Account {
//!     owner: String,
//!     balance: i64,
//! }
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register(
//!     TypeShape::concrete::<Account>("bank.Account")
//!         .property("owner", FieldType::String, |a: &Account| Value::String(a.owner.clone()))
//!         .property("balance", FieldType::Long, |a: &Account| Value::Long(a.balance))
//!         .constructor(
//!             vec![
//!                 Param::new("owner", FieldType::String),
//!                 Param::new("balance", FieldType::Long),
//!             ],
//!             |mut args| Ok(Account { owner: args.arg(0)?, balance: args.arg(1)? }),
//!         )
//!         .build(),
//! )?;
//!
//! let factory = CodecFactory::new(registry);
//! let account = Account { owner: "alice".into(), balance: 100 };
//! let bytes = factory.encode(&account)?;
//! assert_eq!(factory.decode::<Account>(&bytes)?, account);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    Args, CodecConfig, CodecError, Descriptor, FromValue, Instance, IntoValue, Result,
    TypeRegistry, Value,
};

// Schema shapes and notations
pub mod schema;

pub use schema::{
    CompositeType, Field, FieldType, Param, RestrictedType, Schema, ShapeKind, TypeNotation,
    TypeShape,
};

// Encoding/decoding
pub mod encoding;

pub use encoding::{Codec, CodecFactory, CustomCodec, Envelope};

// Ledger aggregate
pub mod ledger;
