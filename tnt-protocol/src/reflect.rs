//! Static field reflection for ledger operations
//!
//! Every restrictable object publishes a [`Schema`]: an ordered list of named
//! fields with their types. The predicate compiler resolves field names to
//! indices against the schema once, then reads values by index through
//! [`Reflect::field`] on every evaluation.

use crate::types::{AccountId, AssetId, Sink, TankId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Type of a single comparable value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// Boolean flag
    Bool,
    /// Signed integer, including share amounts and indices
    Int,
    /// Text
    String,
    /// Account id
    Account,
    /// Asset id
    AssetId,
    /// Tank id
    Tank,
    /// Sink
    Sink,
}

impl ScalarType {
    /// Whether `<`, `<=`, `>` and `>=` are defined
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ScalarType::Bool | ScalarType::Sink)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::String => "string",
            ScalarType::Account => "account",
            ScalarType::AssetId => "asset_id",
            ScalarType::Tank => "tank",
            ScalarType::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// Static type of a field
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    /// Single value
    Scalar(ScalarType),
    /// Collection of values
    Set(ScalarType),
    /// Nested object with its own schema
    Object(&'static Schema),
    /// Value that may be absent
    Optional(&'static FieldType),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => write!(f, "{}", scalar),
            FieldType::Set(scalar) => write!(f, "set<{}>", scalar),
            FieldType::Object(schema) => write!(f, "{}", schema.name),
            FieldType::Optional(inner) => write!(f, "optional<{}>", inner),
        }
    }
}

/// Named field
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field name
    pub name: &'static str,
    /// Field type
    pub ty: FieldType,
}

impl FieldDef {
    /// Define a field
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// Fields of a reflectable object
#[derive(Debug)]
pub struct Schema {
    /// Object name, for error messages
    pub name: &'static str,
    /// Fields in index order
    pub fields: &'static [FieldDef],
}

impl Schema {
    /// Index of the named field
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// Object whose fields can be read by index
pub trait Reflect {
    /// Static schema of the object
    fn schema(&self) -> &'static Schema;

    /// Value of the field at `index` in [`Reflect::schema`]
    fn field(&self, index: usize) -> Value<'_>;
}

/// Borrowed field value
#[derive(Clone)]
pub enum Value<'a> {
    /// Absent optional value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Text
    Str(&'a str),
    /// Account id
    Account(AccountId),
    /// Asset id
    AssetId(AssetId),
    /// Tank id
    Tank(TankId),
    /// Sink
    Sink(Sink),
    /// Collection
    Set(Vec<Value<'a>>),
    /// Nested object
    Object(&'a dyn Reflect),
}

impl Value<'_> {
    /// Whether this value equals `scalar`
    pub fn matches(&self, scalar: &Scalar) -> bool {
        match (self, scalar) {
            (Value::Bool(a), Scalar::Bool(b)) => a == b,
            (Value::Int(a), Scalar::Int(b)) => a == b,
            (Value::Str(a), Scalar::String(b)) => *a == b.as_str(),
            (Value::Account(a), Scalar::Account(b)) => a == b,
            (Value::AssetId(a), Scalar::AssetId(b)) => a == b,
            (Value::Tank(a), Scalar::Tank(b)) => a == b,
            (Value::Sink(a), Scalar::Sink(b)) => a == b,
            _ => false,
        }
    }

    /// Order of this value relative to `scalar`, if both are ordered and alike
    pub fn compare(&self, scalar: &Scalar) -> Option<Ordering> {
        match (self, scalar) {
            (Value::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Scalar::String(b)) => Some((*a).cmp(b.as_str())),
            (Value::Account(a), Scalar::Account(b)) => Some(a.cmp(b)),
            (Value::AssetId(a), Scalar::AssetId(b)) => Some(a.cmp(b)),
            (Value::Tank(a), Scalar::Tank(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Whether this is a set containing `scalar`
    pub fn contains(&self, scalar: &Scalar) -> bool {
        match self {
            Value::Set(items) => items.iter().any(|item| item.matches(scalar)),
            _ => false,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Str(v) => write!(f, "Str({:?})", v),
            Value::Account(v) => write!(f, "Account({})", v),
            Value::AssetId(v) => write!(f, "AssetId({})", v),
            Value::Tank(v) => write!(f, "Tank({})", v),
            Value::Sink(v) => write!(f, "Sink({})", v),
            Value::Set(items) => f.debug_list().entries(items).finish(),
            Value::Object(object) => write!(f, "Object({})", object.schema().name),
        }
    }
}

/// Owned comparison operand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Text
    String(String),
    /// Account id
    Account(AccountId),
    /// Asset id
    AssetId(AssetId),
    /// Tank id
    Tank(TankId),
    /// Sink
    Sink(Sink),
}

impl Scalar {
    /// Type of this operand
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Bool(_) => ScalarType::Bool,
            Scalar::Int(_) => ScalarType::Int,
            Scalar::String(_) => ScalarType::String,
            Scalar::Account(_) => ScalarType::Account,
            Scalar::AssetId(_) => ScalarType::AssetId,
            Scalar::Tank(_) => ScalarType::Tank,
            Scalar::Sink(_) => ScalarType::Sink,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<AccountId> for Scalar {
    fn from(v: AccountId) -> Self {
        Scalar::Account(v)
    }
}

impl From<AssetId> for Scalar {
    fn from(v: AssetId) -> Self {
        Scalar::AssetId(v)
    }
}

impl From<TankId> for Scalar {
    fn from(v: TankId) -> Self {
        Scalar::Tank(v)
    }
}

impl From<Sink> for Scalar {
    fn from(v: Sink) -> Self {
        Scalar::Sink(v)
    }
}
