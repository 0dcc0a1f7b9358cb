// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Custom codec for the ledger transaction aggregate.
//!
//! The body is a fixed seven element list:
//! `[inputs, attachments, outputs, commands, notary?, time_window?, privacy_salt]`.
//! Every element is written through the factory, so the component types
//! carry their own codecs and schema entries.

use super::CustomCodec;
use crate::core::{CodecError, Result, Value};
use crate::encoding::factory::{ReadContext, WriteContext};
use crate::ledger::{
    Command, Party, PrivacySalt, SecureHash, StateRef, TimeWindow, TransactionState,
    WireTransaction,
};
use crate::schema::{object_descriptor, CompositeType, Field, SchemaBuilder, TypeNotation};

use super::OpaqueBytesLike;

/// Number of elements in an encoded transaction body.
const BODY_LEN: usize = 7;

/// Writes and reads [`WireTransaction`] in its fixed component order.
#[derive(Debug, Default)]
pub struct WireTransactionCodec;

impl WireTransactionCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }

    fn fields() -> Vec<Field> {
        let field = |name: &str, type_name: String, mandatory: bool| Field {
            name: name.to_string(),
            type_name,
            mandatory,
        };
        vec![
            field("inputs", format!("list<{}>", StateRef::TYPE_NAME), true),
            field("attachments", format!("list<{}>", SecureHash::TYPE_NAME), true),
            field("outputs", format!("list<{}>", TransactionState::TYPE_NAME), true),
            field("commands", format!("list<{}>", Command::TYPE_NAME), true),
            field("notary", Party::TYPE_NAME.to_string(), false),
            field("time_window", TimeWindow::TYPE_NAME.to_string(), false),
            field("privacy_salt", PrivacySalt::TYPE_NAME.to_string(), true),
        ]
    }
}

fn write_all<T: std::any::Any + Send + Sync>(
    items: &[T],
    ctx: &mut WriteContext<'_>,
) -> Result<Value> {
    items
        .iter()
        .map(|item| ctx.write(item))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

fn read_all<T: std::any::Any + Send + Sync + Clone>(
    value: Value,
    what: &str,
    ctx: &mut ReadContext<'_>,
) -> Result<Vec<T>> {
    match value {
        Value::List(items) => items.into_iter().map(|item| ctx.read(item)).collect(),
        other => Err(CodecError::malformed(format!(
            "transaction {what} must be a list, found {}",
            other.kind()
        ))),
    }
}

impl CustomCodec for WireTransactionCodec {
    type Target = WireTransaction;

    fn type_name(&self) -> &str {
        WireTransaction::TYPE_NAME
    }

    fn type_notation(&self, schema: &SchemaBuilder<'_>) -> Result<TypeNotation> {
        let fields = Self::fields();
        Ok(TypeNotation::Composite(CompositeType {
            name: WireTransaction::TYPE_NAME.to_string(),
            label: None,
            provides: schema.provides(WireTransaction::TYPE_NAME)?,
            descriptor: object_descriptor(WireTransaction::TYPE_NAME, &fields),
            fields,
        }))
    }

    fn write(&self, tx: &WireTransaction, ctx: &mut WriteContext<'_>) -> Result<Value> {
        let notary = match &tx.notary {
            Some(party) => ctx.write(party)?,
            None => Value::Null,
        };
        let time_window = match &tx.time_window {
            Some(window) => ctx.write(window)?,
            None => Value::Null,
        };
        Ok(Value::List(vec![
            write_all(&tx.inputs, ctx)?,
            write_all(&tx.attachments, ctx)?,
            write_all(&tx.outputs, ctx)?,
            write_all(&tx.commands, ctx)?,
            notary,
            time_window,
            ctx.write(&tx.privacy_salt)?,
        ]))
    }

    fn read(&self, body: Value, ctx: &mut ReadContext<'_>) -> Result<WireTransaction> {
        let items = match body {
            Value::List(items) if items.len() == BODY_LEN => items,
            Value::List(items) => {
                return Err(CodecError::malformed(format!(
                    "transaction body has {} elements, expected {BODY_LEN}",
                    items.len()
                )))
            }
            other => {
                return Err(CodecError::malformed(format!(
                    "transaction body must be a list, found {}",
                    other.kind()
                )))
            }
        };
        let mut items = items.into_iter();
        let mut next = || items.next().unwrap_or_default();

        let inputs = read_all(next(), "inputs", ctx)?;
        let attachments = read_all(next(), "attachments", ctx)?;
        let outputs = read_all(next(), "outputs", ctx)?;
        let commands = read_all(next(), "commands", ctx)?;
        let notary = match next() {
            Value::Null => None,
            value => Some(ctx.read(value)?),
        };
        let time_window = match next() {
            Value::Null => None,
            value => Some(ctx.read(value)?),
        };
        let privacy_salt = ctx.read(next())?;

        Ok(WireTransaction {
            inputs,
            attachments,
            outputs,
            commands,
            notary,
            time_window,
            privacy_salt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TypeRegistry;

    #[test]
    fn test_notation_field_order() {
        let registry = TypeRegistry::new();
        let notation = WireTransactionCodec::new()
            .type_notation(&SchemaBuilder::new(&registry))
            .unwrap();
        let composite = notation.as_composite().unwrap();
        assert_eq!(
            composite.field_names(),
            vec![
                "inputs",
                "attachments",
                "outputs",
                "commands",
                "notary",
                "time_window",
                "privacy_salt"
            ]
        );
        assert!(!composite.field("notary").unwrap().mandatory);
        assert!(composite.field("privacy_salt").unwrap().mandatory);
    }
}
