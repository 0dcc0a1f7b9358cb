// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show payload header, schema and raw body.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{format_size, open_payload, Result};
use evocodec::{TypeNotation, Value};

/// Inspect payload contents.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show size, root type and schema summary
    Info {
        /// Input payload
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List the embedded type notations
    Schema {
        /// Input payload
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the raw positional body as JSON
    Body {
        /// Input payload
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Info { input } => cmd_info(input),
            InspectCmd::Schema { input, json } => cmd_schema(input, json),
            InspectCmd::Body { input } => cmd_body(input),
        }
    }
}

/// Cmd: Show payload info
fn cmd_info(input: PathBuf) -> Result<()> {
    let (size, envelope) = open_payload(&input)?;

    let root = match &envelope.body {
        Value::Described(described) => envelope
            .schema
            .find_by_descriptor(&described.descriptor)
            .map(|notation| notation.name().to_string())
            .unwrap_or_else(|| "<unlisted>".to_string()),
        other => format!("<{}>", other.kind()),
    };

    println!("=== {} ===", input.display());
    println!("Size: {}", format_size(size));
    println!("Root type: {root}");
    println!("Types: {}", envelope.schema.types.len());

    Ok(())
}

/// Cmd: Show schema
fn cmd_schema(input: PathBuf, json: bool) -> Result<()> {
    let (_, envelope) = open_payload(&input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&envelope.schema)?);
        return Ok(());
    }

    for notation in &envelope.schema.types {
        match notation {
            TypeNotation::Composite(composite) => {
                println!("composite {}", composite.name);
                println!("  descriptor: {}", composite.descriptor);
                if !composite.provides.is_empty() {
                    println!("  provides: {}", composite.provides.join(", "));
                }
                for field in &composite.fields {
                    let marker = if field.mandatory { "" } else { "?" };
                    println!("  {}: {}{marker}", field.name, field.type_name);
                }
            }
            TypeNotation::Restricted(restricted) => {
                println!("restricted {} = {}", restricted.name, restricted.source);
                println!("  descriptor: {}", restricted.descriptor);
                if !restricted.provides.is_empty() {
                    println!("  provides: {}", restricted.provides.join(", "));
                }
            }
        }
        println!();
    }

    Ok(())
}

/// Cmd: Dump raw body
fn cmd_body(input: PathBuf) -> Result<()> {
    let (_, envelope) = open_payload(&input)?;
    println!("{}", serde_json::to_string_pretty(&envelope.body.to_json())?);
    Ok(())
}
