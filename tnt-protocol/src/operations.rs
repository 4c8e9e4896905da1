//! Ledger operations touching tanks and taps
//!
//! Each operation carries a fee and names the account paying it. The
//! [`Reflect`] impls expose the fields restrictions may inspect; collections
//! of taps and attachments are not restrictable.

use crate::asset::{Asset, ShareType};
use crate::reflect::{FieldDef, FieldType, Reflect, ScalarType, Schema, Value};
use crate::tank::{Tap, TankAttachment};
use crate::types::{AccountId, AssetId, IndexType, Sink, TankId, TapId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Move an asset between accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOperation {
    /// Fee paid by `from`
    #[serde(default)]
    pub fee: Asset,
    /// Sending account
    pub from: AccountId,
    /// Receiving account
    pub to: AccountId,
    /// Amount moved
    pub amount: Asset,
    /// Free-form note
    #[serde(default)]
    pub memo: Option<String>,
}

/// Pay from an account into any sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFundSinkOperation {
    /// Fee paid by the funding account
    #[serde(default)]
    pub fee: Asset,
    /// Paying account
    pub funding_account: AccountId,
    /// Amount paid
    pub funding_amount: Asset,
    /// Where the payment goes
    pub destination_sink: Sink,
}

/// Create a tank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankCreateOperation {
    /// Fee paid by `payer`
    #[serde(default)]
    pub fee: Asset,
    /// Account paying the fee and deposit; becomes the tank's owner
    pub payer: AccountId,
    /// Core asset escrowed for the tank's lifetime
    pub deposit_amount: ShareType,
    /// Asset held by the tank
    pub contained_asset: AssetId,
    /// Initial taps
    #[serde(default)]
    pub taps: Vec<Tap>,
    /// Initial attachments
    #[serde(default)]
    pub attachments: Vec<TankAttachment>,
}

/// Change a tank's taps and attachments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankUpdateOperation {
    /// Fee paid by `payer`
    pub fee: Asset,
    /// Tank owner
    pub payer: AccountId,
    /// Tank to change
    pub tank_to_update: TankId,
    /// Change to the escrowed deposit
    pub deposit_delta: ShareType,
    /// Taps to remove
    pub taps_to_remove: BTreeSet<IndexType>,
    /// Taps to replace in place
    pub taps_to_replace: BTreeMap<IndexType, Tap>,
    /// Taps to add under fresh indices
    pub taps_to_add: Vec<Tap>,
    /// Attachments to remove
    pub attachments_to_remove: BTreeSet<IndexType>,
    /// Attachments to replace in place
    pub attachments_to_replace: BTreeMap<IndexType, TankAttachment>,
    /// Attachments to add under fresh indices
    pub attachments_to_add: Vec<TankAttachment>,
}

/// Delete an empty tank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankDeleteOperation {
    /// Fee paid by `payer`
    #[serde(default)]
    pub fee: Asset,
    /// Tank owner
    pub payer: AccountId,
    /// Tank to delete
    pub tank_to_delete: TankId,
    /// Deposit the owner expects back
    pub deposit_claimed: ShareType,
}

/// Release value through a tap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapOpenOperation {
    /// Fee paid by `payer`
    #[serde(default)]
    pub fee: Asset,
    /// Account opening the tap
    pub payer: AccountId,
    /// Tap to open; the tank id is required
    pub tap_to_open: TapId,
    /// Amount to release
    pub release_amount: ShareType,
}

/// Point a tap at a different sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapConnectOperation {
    /// Fee paid by `payer`
    #[serde(default)]
    pub fee: Asset,
    /// Account connecting the tap
    pub payer: AccountId,
    /// Tap to connect; the tank id is required
    pub tap_to_connect: TapId,
    /// New sink; `None` disconnects the tap
    #[serde(default)]
    pub new_sink: Option<Sink>,
    /// Drop the tap's connect authority after connecting
    #[serde(default)]
    pub clear_connect_authority: bool,
}

/// Ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Account to account transfer
    Transfer(TransferOperation),
    /// Account to sink payment
    AccountFundSink(AccountFundSinkOperation),
    /// Tank creation
    TankCreate(TankCreateOperation),
    /// Tank update
    TankUpdate(TankUpdateOperation),
    /// Tank deletion
    TankDelete(TankDeleteOperation),
    /// Tap opening
    TapOpen(TapOpenOperation),
    /// Tap connection
    TapConnect(TapConnectOperation),
}

/// Operation variant without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationTag {
    /// [`Operation::Transfer`]
    Transfer,
    /// [`Operation::AccountFundSink`]
    AccountFundSink,
    /// [`Operation::TankCreate`]
    TankCreate,
    /// [`Operation::TankUpdate`]
    TankUpdate,
    /// [`Operation::TankDelete`]
    TankDelete,
    /// [`Operation::TapOpen`]
    TapOpen,
    /// [`Operation::TapConnect`]
    TapConnect,
}

impl OperationTag {
    /// Schema of the operation variant
    pub fn schema(&self) -> &'static Schema {
        match self {
            OperationTag::Transfer => &TRANSFER_SCHEMA,
            OperationTag::AccountFundSink => &ACCOUNT_FUND_SINK_SCHEMA,
            OperationTag::TankCreate => &TANK_CREATE_SCHEMA,
            OperationTag::TankUpdate => &TANK_UPDATE_SCHEMA,
            OperationTag::TankDelete => &TANK_DELETE_SCHEMA,
            OperationTag::TapOpen => &TAP_OPEN_SCHEMA,
            OperationTag::TapConnect => &TAP_CONNECT_SCHEMA,
        }
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().name)
    }
}

impl Operation {
    /// Variant of this operation
    pub fn tag(&self) -> OperationTag {
        match self {
            Operation::Transfer(_) => OperationTag::Transfer,
            Operation::AccountFundSink(_) => OperationTag::AccountFundSink,
            Operation::TankCreate(_) => OperationTag::TankCreate,
            Operation::TankUpdate(_) => OperationTag::TankUpdate,
            Operation::TankDelete(_) => OperationTag::TankDelete,
            Operation::TapOpen(_) => OperationTag::TapOpen,
            Operation::TapConnect(_) => OperationTag::TapConnect,
        }
    }

    /// Fee charged for the operation
    pub fn fee(&self) -> Asset {
        match self {
            Operation::Transfer(op) => op.fee,
            Operation::AccountFundSink(op) => op.fee,
            Operation::TankCreate(op) => op.fee,
            Operation::TankUpdate(op) => op.fee,
            Operation::TankDelete(op) => op.fee,
            Operation::TapOpen(op) => op.fee,
            Operation::TapConnect(op) => op.fee,
        }
    }

    /// Account paying the fee, whose authority the operation requires
    pub fn fee_payer(&self) -> AccountId {
        match self {
            Operation::Transfer(op) => op.from,
            Operation::AccountFundSink(op) => op.funding_account,
            Operation::TankCreate(op) => op.payer,
            Operation::TankUpdate(op) => op.payer,
            Operation::TankDelete(op) => op.payer,
            Operation::TapOpen(op) => op.payer,
            Operation::TapConnect(op) => op.payer,
        }
    }

    /// Reflected view of the payload
    pub fn as_reflect(&self) -> &dyn Reflect {
        match self {
            Operation::Transfer(op) => op,
            Operation::AccountFundSink(op) => op,
            Operation::TankCreate(op) => op,
            Operation::TankUpdate(op) => op,
            Operation::TankDelete(op) => op,
            Operation::TapOpen(op) => op,
            Operation::TapConnect(op) => op,
        }
    }
}

macro_rules! impl_from_operation {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Operation {
                fn from(op: $ty) -> Self {
                    Operation::$variant(op)
                }
            }
        )*
    };
}

impl_from_operation!(
    Transfer(TransferOperation),
    AccountFundSink(AccountFundSinkOperation),
    TankCreate(TankCreateOperation),
    TankUpdate(TankUpdateOperation),
    TankDelete(TankDeleteOperation),
    TapOpen(TapOpenOperation),
    TapConnect(TapConnectOperation),
);

const ACCOUNT: FieldType = FieldType::Scalar(ScalarType::Account);
const INT: FieldType = FieldType::Scalar(ScalarType::Int);
const TANK: FieldType = FieldType::Scalar(ScalarType::Tank);

/// Fields of [`Asset`]
pub static ASSET_SCHEMA: Schema = Schema {
    name: "asset",
    fields: &[
        FieldDef::new("amount", INT),
        FieldDef::new("asset_id", FieldType::Scalar(ScalarType::AssetId)),
    ],
};

/// Fields of [`TapId`]
pub static TAP_ID_SCHEMA: Schema = Schema {
    name: "tap_id",
    fields: &[
        FieldDef::new("tank_id", FieldType::Optional(&TANK)),
        FieldDef::new("tap_index", INT),
    ],
};

static TRANSFER_SCHEMA: Schema = Schema {
    name: "transfer",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("from", ACCOUNT),
        FieldDef::new("to", ACCOUNT),
        FieldDef::new("amount", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new(
            "memo",
            FieldType::Optional(&FieldType::Scalar(ScalarType::String)),
        ),
    ],
};

static ACCOUNT_FUND_SINK_SCHEMA: Schema = Schema {
    name: "account_fund_sink",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("funding_account", ACCOUNT),
        FieldDef::new("funding_amount", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("destination_sink", FieldType::Scalar(ScalarType::Sink)),
    ],
};

static TANK_CREATE_SCHEMA: Schema = Schema {
    name: "tank_create",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("payer", ACCOUNT),
        FieldDef::new("deposit_amount", INT),
        FieldDef::new("contained_asset", FieldType::Scalar(ScalarType::AssetId)),
    ],
};

static TANK_UPDATE_SCHEMA: Schema = Schema {
    name: "tank_update",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("payer", ACCOUNT),
        FieldDef::new("tank_to_update", TANK),
        FieldDef::new("deposit_delta", INT),
        FieldDef::new("taps_to_remove", FieldType::Set(ScalarType::Int)),
        FieldDef::new("attachments_to_remove", FieldType::Set(ScalarType::Int)),
    ],
};

static TANK_DELETE_SCHEMA: Schema = Schema {
    name: "tank_delete",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("payer", ACCOUNT),
        FieldDef::new("tank_to_delete", TANK),
        FieldDef::new("deposit_claimed", INT),
    ],
};

static TAP_OPEN_SCHEMA: Schema = Schema {
    name: "tap_open",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("payer", ACCOUNT),
        FieldDef::new("tap_to_open", FieldType::Object(&TAP_ID_SCHEMA)),
        FieldDef::new("release_amount", INT),
    ],
};

static TAP_CONNECT_SCHEMA: Schema = Schema {
    name: "tap_connect",
    fields: &[
        FieldDef::new("fee", FieldType::Object(&ASSET_SCHEMA)),
        FieldDef::new("payer", ACCOUNT),
        FieldDef::new("tap_to_connect", FieldType::Object(&TAP_ID_SCHEMA)),
        FieldDef::new(
            "new_sink",
            FieldType::Optional(&FieldType::Scalar(ScalarType::Sink)),
        ),
        FieldDef::new("clear_connect_authority", FieldType::Scalar(ScalarType::Bool)),
    ],
};

fn index_set(indices: &BTreeSet<IndexType>) -> Value<'_> {
    Value::Set(indices.iter().map(|i| Value::Int(i64::from(*i))).collect())
}

impl Reflect for Asset {
    fn schema(&self) -> &'static Schema {
        &ASSET_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Int(self.amount),
            1 => Value::AssetId(self.asset_id),
            _ => Value::Null,
        }
    }
}

impl Reflect for TapId {
    fn schema(&self) -> &'static Schema {
        &TAP_ID_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => self.tank_id.map_or(Value::Null, Value::Tank),
            1 => Value::Int(i64::from(self.tap_index)),
            _ => Value::Null,
        }
    }
}

impl Reflect for TransferOperation {
    fn schema(&self) -> &'static Schema {
        &TRANSFER_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.from),
            2 => Value::Account(self.to),
            3 => Value::Object(&self.amount),
            4 => self.memo.as_deref().map_or(Value::Null, Value::Str),
            _ => Value::Null,
        }
    }
}

impl Reflect for AccountFundSinkOperation {
    fn schema(&self) -> &'static Schema {
        &ACCOUNT_FUND_SINK_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.funding_account),
            2 => Value::Object(&self.funding_amount),
            3 => Value::Sink(self.destination_sink),
            _ => Value::Null,
        }
    }
}

impl Reflect for TankCreateOperation {
    fn schema(&self) -> &'static Schema {
        &TANK_CREATE_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.payer),
            2 => Value::Int(self.deposit_amount),
            3 => Value::AssetId(self.contained_asset),
            _ => Value::Null,
        }
    }
}

impl Reflect for TankUpdateOperation {
    fn schema(&self) -> &'static Schema {
        &TANK_UPDATE_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.payer),
            2 => Value::Tank(self.tank_to_update),
            3 => Value::Int(self.deposit_delta),
            4 => index_set(&self.taps_to_remove),
            5 => index_set(&self.attachments_to_remove),
            _ => Value::Null,
        }
    }
}

impl Reflect for TankDeleteOperation {
    fn schema(&self) -> &'static Schema {
        &TANK_DELETE_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.payer),
            2 => Value::Tank(self.tank_to_delete),
            3 => Value::Int(self.deposit_claimed),
            _ => Value::Null,
        }
    }
}

impl Reflect for TapOpenOperation {
    fn schema(&self) -> &'static Schema {
        &TAP_OPEN_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.payer),
            2 => Value::Object(&self.tap_to_open),
            3 => Value::Int(self.release_amount),
            _ => Value::Null,
        }
    }
}

impl Reflect for TapConnectOperation {
    fn schema(&self) -> &'static Schema {
        &TAP_CONNECT_SCHEMA
    }

    fn field(&self, index: usize) -> Value<'_> {
        match index {
            0 => Value::Object(&self.fee),
            1 => Value::Account(self.payer),
            2 => Value::Object(&self.tap_to_connect),
            3 => self.new_sink.map_or(Value::Null, Value::Sink),
            4 => Value::Bool(self.clear_connect_authority),
            _ => Value::Null,
        }
    }
}
