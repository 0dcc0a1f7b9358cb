// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout evocodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error handling
//! - [`Value`] - Wire value representation
//! - [`TypeRegistry`] - Registered type shapes
//! - [`CodecConfig`] - Factory configuration

pub mod config;
pub mod error;
pub mod registry;
pub mod value;

pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use registry::TypeRegistry;
pub use value::{
    Args, DescribedValue, Descriptor, FromValue, Instance, IntoValue, Object, Value,
};
