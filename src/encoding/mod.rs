// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Payload encoding and decoding.
//!
//! - [`wire`] - binary value encoder and cursor
//! - [`envelope`] - header and envelope framing
//! - [`codec`] - the [`Codec`] trait shared by all codecs
//! - [`property`] - per-property codecs
//! - [`object`] - default record codec
//! - [`evolution`] - read-only codec for older payload shapes
//! - [`custom`] - hand-written codecs and their registry
//! - [`factory`] - caching dispatcher and the encode/decode entry points

pub mod codec;
pub mod custom;
pub mod envelope;
pub mod evolution;
pub mod factory;
pub mod object;
pub mod property;
pub mod wire;

pub use codec::Codec;
pub use custom::{CustomCodec, CustomCodecAdapter, CustomCodecRegistry};
pub use envelope::{Envelope, MAGIC};
pub use evolution::{EvolutionCodec, OldField};
pub use factory::{CodecFactory, ReadContext, WriteContext};
pub use object::ObjectCodec;
pub use property::PropertyCodec;
