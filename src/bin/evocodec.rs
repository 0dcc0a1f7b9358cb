// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # evocodec CLI
//!
//! Inspect self-describing payloads without the types that wrote them.
//!
//! ## Usage
//!
//! ```sh
//! # Show header and root type
//! evocodec inspect info payload.bin
//!
//! # List the embedded type notations
//! evocodec inspect schema payload.bin
//!
//! # Dump the raw positional body
//! evocodec inspect body payload.bin
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::InspectCmd;
use common::Result;

/// evocodec - self-describing payload toolkit
#[derive(Parser, Clone)]
#[command(name = "evocodec")]
#[command(about = "Inspect self-describing evocodec payloads", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect payload contents (info, schema, body)
    #[command(subcommand)]
    Inspect(InspectCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
