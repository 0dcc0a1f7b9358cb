// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::Path;

use anyhow::Context as _;
use evocodec::{CodecFactory, Envelope};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Read and parse a payload file.
pub fn open_payload(path: &Path) -> Result<(usize, Envelope)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let envelope = CodecFactory::inspect(&bytes)
        .with_context(|| format!("{} is not an evocodec payload", path.display()))?;
    Ok((bytes.len(), envelope))
}

/// Format a byte count to human-readable string.
pub fn format_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;

    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
