// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec configuration.
//!
//! ```toml
//! allow_list = ["ledger.ContractState"]
//! max_depth = 32
//! evolution = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{CodecError, Result};

/// Default decode nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for a [`CodecFactory`](crate::encoding::CodecFactory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Supertype names opted in to schema embedding
    pub allow_list: Vec<String>,
    /// Maximum nesting of described values accepted on decode
    pub max_depth: usize,
    /// Reconcile payloads written with an older shape
    pub evolution: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            allow_list: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            evolution: true,
        }
    }
}

impl CodecConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| CodecError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CodecError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(CodecError::config("max_depth must be at least 1"));
        }
        Ok(())
    }
}
