// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type shapes and the schemas derived from them.
//!
//! - [`shape`] - registered type shapes, constructor and property resolution
//! - [`ast`] - schema notations embedded in payloads
//! - [`builder`] - provides-list walk and descriptor fingerprints

pub mod ast;
pub mod builder;
pub mod shape;

pub use ast::{
    CompositeType, Field, RestrictedType, Schema, TypeNotation, WellKnown, DESCRIPTOR_DOMAIN,
};
pub use builder::{fingerprint, object_descriptor, SchemaBuilder, OBJECT_DESCRIPTOR_PREFIX};
pub use shape::{
    ConstructorShape, FieldType, Param, PropertyShape, ResolvedShape, ShapeBuilder, ShapeKind,
    TypeShape,
};
