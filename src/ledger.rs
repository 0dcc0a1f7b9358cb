// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Minimal ledger types carried by the transaction codec.
//!
//! Only the shapes the aggregate needs are modelled here; contract state
//! payloads and command values are `*`-typed and may be any registered
//! object or primitive.

use crate::core::{CodecError, Result, Value};
use crate::encoding::custom::{OpaqueBytesCodec, OpaqueBytesLike, WireTransactionCodec};
use crate::encoding::factory::CodecFactory;
use crate::schema::{FieldType, Param, TypeShape};

/// Hash of a transaction or attachment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecureHash(Vec<u8>);

impl SecureHash {
    /// Wrap hash bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl OpaqueBytesLike for SecureHash {
    const TYPE_NAME: &'static str = "ledger.SecureHash";

    fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Salt mixed into a transaction's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacySalt(Vec<u8>);

impl PrivacySalt {
    /// Wrap salt bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl OpaqueBytesLike for PrivacySalt {
    const TYPE_NAME: &'static str = "ledger.PrivacySalt";

    fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Pointer to an output of an earlier transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRef {
    pub txhash: SecureHash,
    pub index: i32,
}

impl StateRef {
    pub const TYPE_NAME: &'static str = "ledger.StateRef";

    fn shape() -> TypeShape {
        TypeShape::concrete::<StateRef>(Self::TYPE_NAME)
            .property(
                "txhash",
                FieldType::named(SecureHash::TYPE_NAME),
                |s: &StateRef| Value::object(s.txhash.clone()),
            )
            .property("index", FieldType::Int, |s: &StateRef| Value::Int(s.index))
            .constructor(
                vec![
                    Param::new("txhash", FieldType::named(SecureHash::TYPE_NAME)),
                    Param::new("index", FieldType::Int),
                ],
                |mut args| {
                    Ok(StateRef {
                        txhash: args.object(0)?,
                        index: args.arg(1)?,
                    })
                },
            )
            .build()
    }
}

/// A named network participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub name: String,
    pub owning_key: Vec<u8>,
}

impl Party {
    pub const TYPE_NAME: &'static str = "ledger.Party";

    fn shape() -> TypeShape {
        TypeShape::concrete::<Party>(Self::TYPE_NAME)
            .property("name", FieldType::String, |p: &Party| {
                Value::String(p.name.clone())
            })
            .property("owning_key", FieldType::Binary, |p: &Party| {
                Value::binary(p.owning_key.clone())
            })
            .constructor(
                vec![
                    Param::new("name", FieldType::String),
                    Param::new("owning_key", FieldType::Binary),
                ],
                |mut args| {
                    Ok(Party {
                        name: args.arg(0)?,
                        owning_key: args.binary(1)?,
                    })
                },
            )
            .build()
    }
}

/// Validity interval in milliseconds since the epoch; either bound may be open.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub from_time: Option<i64>,
    pub until_time: Option<i64>,
}

impl TimeWindow {
    pub const TYPE_NAME: &'static str = "ledger.TimeWindow";

    fn shape() -> TypeShape {
        TypeShape::concrete::<TimeWindow>(Self::TYPE_NAME)
            .nullable_property("from_time", FieldType::Timestamp, |w: &TimeWindow| {
                w.from_time.map(Value::Timestamp).unwrap_or(Value::Null)
            })
            .nullable_property("until_time", FieldType::Timestamp, |w: &TimeWindow| {
                w.until_time.map(Value::Timestamp).unwrap_or(Value::Null)
            })
            .constructor(
                vec![
                    Param::nullable("from_time", FieldType::Timestamp),
                    Param::nullable("until_time", FieldType::Timestamp),
                ],
                |mut args| {
                    Ok(TimeWindow {
                        from_time: timestamp(args.take(0)?)?,
                        until_time: timestamp(args.take(1)?)?,
                    })
                },
            )
            .build()
    }
}

fn timestamp(value: Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Timestamp(ms) => Ok(Some(ms)),
        other => Err(CodecError::type_mismatch("timestamp", other.kind())),
    }
}

/// An output state and the notary responsible for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionState {
    pub data: Value,
    pub notary: Party,
}

impl TransactionState {
    pub const TYPE_NAME: &'static str = "ledger.TransactionState";

    fn shape() -> TypeShape {
        TypeShape::concrete::<TransactionState>(Self::TYPE_NAME)
            .property("data", FieldType::Any, |s: &TransactionState| s.data.clone())
            .property(
                "notary",
                FieldType::named(Party::TYPE_NAME),
                |s: &TransactionState| Value::object(s.notary.clone()),
            )
            .constructor(
                vec![
                    Param::new("data", FieldType::Any),
                    Param::new("notary", FieldType::named(Party::TYPE_NAME)),
                ],
                |mut args| {
                    Ok(TransactionState {
                        data: args.take(0)?,
                        notary: args.object(1)?,
                    })
                },
            )
            .build()
    }
}

/// A command and the keys that must sign it.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub value: Value,
    pub signers: Vec<Vec<u8>>,
}

impl Command {
    pub const TYPE_NAME: &'static str = "ledger.Command";

    fn shape() -> TypeShape {
        TypeShape::concrete::<Command>(Self::TYPE_NAME)
            .property("value", FieldType::Any, |c: &Command| c.value.clone())
            .property(
                "signers",
                FieldType::list(FieldType::Binary),
                |c: &Command| Value::List(c.signers.iter().cloned().map(Value::Binary).collect()),
            )
            .constructor(
                vec![
                    Param::new("value", FieldType::Any),
                    Param::new("signers", FieldType::list(FieldType::Binary)),
                ],
                |mut args| {
                    let signers = match args.take(1)? {
                        Value::List(items) => items
                            .into_iter()
                            .map(Value::into_binary)
                            .collect::<Result<Vec<_>>>()?,
                        other => {
                            return Err(CodecError::type_mismatch(
                                "list<binary>",
                                other.kind(),
                            ))
                        }
                    };
                    Ok(Command {
                        value: args.take(0)?,
                        signers,
                    })
                },
            )
            .build()
    }
}

/// A transaction in its wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct WireTransaction {
    pub inputs: Vec<StateRef>,
    pub attachments: Vec<SecureHash>,
    pub outputs: Vec<TransactionState>,
    pub commands: Vec<Command>,
    pub notary: Option<Party>,
    pub time_window: Option<TimeWindow>,
    pub privacy_salt: PrivacySalt,
}

impl WireTransaction {
    pub const TYPE_NAME: &'static str = "ledger.WireTransaction";
}

/// Register the ledger shapes and custom codecs with a factory.
pub fn register_ledger_types(factory: &CodecFactory) -> Result<()> {
    let registry = factory.registry();
    registry.register(StateRef::shape())?;
    registry.register(Party::shape())?;
    registry.register(TimeWindow::shape())?;
    registry.register(TransactionState::shape())?;
    registry.register(Command::shape())?;

    factory.register_custom(OpaqueBytesCodec::<SecureHash>::new())?;
    factory.register_custom(OpaqueBytesCodec::<PrivacySalt>::new())?;
    factory.register_custom(WireTransactionCodec::new())?;
    Ok(())
}
