//! Declarative restrictions over operation fields
//!
//! A restriction names a member of an operation, a function and an argument.
//! Restrictions in a list are combined with AND; `LogicalOr` combines lists
//! with OR and `Attr` descends into a nested object. Members may also be
//! dotted paths such as `amount.asset_id`.

use crate::reflect::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison or combinator applied by a restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionFunction {
    /// Equal to the argument
    Eq,
    /// Not equal to the argument
    Ne,
    /// Less than the argument
    Lt,
    /// Less than or equal to the argument
    Le,
    /// Greater than the argument
    Gt,
    /// Greater than or equal to the argument
    Ge,
    /// One of the argument's values
    In,
    /// None of the argument's values
    NotIn,
    /// Set field containing every argument value
    HasAll,
    /// Set field containing no argument value
    HasNone,
    /// Nested restrictions on an object field
    Attr,
    /// Any of several restriction lists
    LogicalOr,
}

impl fmt::Display for RestrictionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestrictionFunction::Eq => "eq",
            RestrictionFunction::Ne => "ne",
            RestrictionFunction::Lt => "lt",
            RestrictionFunction::Le => "le",
            RestrictionFunction::Gt => "gt",
            RestrictionFunction::Ge => "ge",
            RestrictionFunction::In => "in",
            RestrictionFunction::NotIn => "not_in",
            RestrictionFunction::HasAll => "has_all",
            RestrictionFunction::HasNone => "has_none",
            RestrictionFunction::Attr => "attr",
            RestrictionFunction::LogicalOr => "logical_or",
        };
        f.write_str(name)
    }
}

/// Restriction argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// No value; with `Eq`/`Ne` on an optional field, tests absence
    Void,
    /// Single value
    Scalar(Scalar),
    /// Collection of values
    Set(Vec<Scalar>),
    /// Restrictions on a nested object
    Restrictions(Vec<Restriction>),
    /// Alternative restriction lists
    Branches(Vec<Vec<Restriction>>),
}

impl Argument {
    /// Single-value argument
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Argument::Scalar(value.into())
    }

    /// Set argument
    pub fn set<T: Into<Scalar>>(values: impl IntoIterator<Item = T>) -> Self {
        Argument::Set(values.into_iter().map(Into::into).collect())
    }

    /// Short description of the argument's shape
    pub fn describe(&self) -> String {
        match self {
            Argument::Void => "void".to_string(),
            Argument::Scalar(scalar) => scalar.scalar_type().to_string(),
            Argument::Set(_) => "set".to_string(),
            Argument::Restrictions(_) => "restrictions".to_string(),
            Argument::Branches(_) => "branches".to_string(),
        }
    }
}

impl From<Scalar> for Argument {
    fn from(scalar: Scalar) -> Self {
        Argument::Scalar(scalar)
    }
}

/// Condition over one member of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Field name or dotted path; unused by `LogicalOr`
    #[serde(default)]
    pub member: String,
    /// Function applied to the member
    pub function: RestrictionFunction,
    /// Function argument
    pub argument: Argument,
}

impl Restriction {
    /// Build a restriction
    pub fn new(member: impl Into<String>, function: RestrictionFunction, argument: Argument) -> Self {
        Self {
            member: member.into(),
            function,
            argument,
        }
    }

    /// Restrict fields of a nested object
    pub fn attr(member: impl Into<String>, restrictions: Vec<Restriction>) -> Self {
        Self::new(
            member,
            RestrictionFunction::Attr,
            Argument::Restrictions(restrictions),
        )
    }

    /// Accept when any branch accepts
    pub fn any_of(branches: Vec<Vec<Restriction>>) -> Self {
        Self::new(
            String::new(),
            RestrictionFunction::LogicalOr,
            Argument::Branches(branches),
        )
    }

    /// Number of restriction nodes in `restrictions`, counting nested ones
    pub fn restriction_count(restrictions: &[Restriction]) -> usize {
        restrictions.iter().map(Restriction::node_count).sum()
    }

    fn node_count(&self) -> usize {
        let nested = match &self.argument {
            Argument::Restrictions(inner) => Self::restriction_count(inner),
            Argument::Branches(branches) => branches
                .iter()
                .map(|branch| Self::restriction_count(branch))
                .sum(),
            Argument::Void | Argument::Scalar(_) | Argument::Set(_) => 0,
        };
        1 + nested
    }
}
