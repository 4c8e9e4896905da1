//! Restriction predicate compiler
//!
//! Compilation resolves every member path to field indices and type-checks
//! every function and argument against the operation's schema. The result
//! is a tree of boxed closures that reads fields by index and never fails.

use crate::error::RestrictionError;
use crate::operations::{Operation, OperationTag};
use crate::reflect::{FieldType, Reflect, Scalar, ScalarType, Schema, Value};
use crate::restriction::{Argument, Restriction, RestrictionFunction};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

type ObjectCheck = Box<dyn Fn(&dyn Reflect) -> bool + Send + Sync>;
type ValueCheck = Box<dyn Fn(&Value<'_>) -> bool + Send + Sync>;

/// Compiled restriction list for one operation variant
pub struct RestrictionPredicate {
    tag: OperationTag,
    checks: Vec<ObjectCheck>,
}

impl RestrictionPredicate {
    /// Operation variant the predicate was compiled for
    pub fn tag(&self) -> OperationTag {
        self.tag
    }

    /// Whether every restriction accepts `op`
    ///
    /// Operations of another variant are rejected.
    pub fn evaluate(&self, op: &Operation) -> bool {
        if op.tag() != self.tag {
            return false;
        }
        let object = op.as_reflect();
        self.checks.iter().all(|check| check(object))
    }
}

impl fmt::Debug for RestrictionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestrictionPredicate")
            .field("tag", &self.tag)
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Compile `restrictions` against the operation variant `tag`
pub fn get_restriction_predicate(
    restrictions: &[Restriction],
    tag: OperationTag,
) -> Result<RestrictionPredicate, RestrictionError> {
    let checks = compile_list(restrictions, tag.schema())?;
    debug!(
        operation = %tag,
        nodes = Restriction::restriction_count(restrictions),
        "Compiled restriction predicate"
    );
    Ok(RestrictionPredicate { tag, checks })
}

fn compile_list(
    restrictions: &[Restriction],
    schema: &'static Schema,
) -> Result<Vec<ObjectCheck>, RestrictionError> {
    restrictions
        .iter()
        .map(|restriction| compile_restriction(restriction, schema))
        .collect()
}

fn compile_restriction(
    restriction: &Restriction,
    schema: &'static Schema,
) -> Result<ObjectCheck, RestrictionError> {
    if restriction.function == RestrictionFunction::LogicalOr {
        return compile_logical_or(restriction, schema);
    }

    let (path, field_type) = resolve_member(schema, &restriction.member)?;
    let test = compile_value_check(
        &restriction.member,
        field_type,
        restriction.function,
        &restriction.argument,
    )?;
    Ok(Box::new(move |object: &dyn Reflect| {
        test(&read_path(object, &path))
    }))
}

fn compile_logical_or(
    restriction: &Restriction,
    schema: &'static Schema,
) -> Result<ObjectCheck, RestrictionError> {
    let branches = match &restriction.argument {
        Argument::Branches(branches) if branches.len() >= 2 => branches,
        other => {
            return Err(mismatch(
                restriction,
                "at least two branches",
                &other.describe(),
            ))
        }
    };
    let compiled = branches
        .iter()
        .map(|branch| compile_list(branch, schema))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Box::new(move |object: &dyn Reflect| {
        compiled
            .iter()
            .any(|branch| branch.iter().all(|check| check(object)))
    }))
}

/// Field indices along a dotted member path, and the final field's type
fn resolve_member(
    schema: &'static Schema,
    member: &str,
) -> Result<(Vec<usize>, FieldType), RestrictionError> {
    let mut path = Vec::new();
    let mut current = schema;
    let mut segments = member.split('.').peekable();

    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            return Err(RestrictionError::MalformedPath {
                field: member.to_string(),
                reason: "empty path segment".to_string(),
            });
        }
        let index = current
            .field_index(segment)
            .ok_or_else(|| RestrictionError::UnknownField {
                object: current.name,
                field: segment.to_string(),
            })?;
        path.push(index);

        let field_type = current.fields[index].ty;
        if segments.peek().is_none() {
            return Ok((path, field_type));
        }
        current = match field_type {
            FieldType::Object(next) => next,
            other => {
                return Err(RestrictionError::MalformedPath {
                    field: member.to_string(),
                    reason: format!("`{}` is {}, not an object", segment, other),
                })
            }
        };
    }

    // `split` always yields at least one segment
    Err(RestrictionError::MalformedPath {
        field: member.to_string(),
        reason: "empty path".to_string(),
    })
}

fn read_path<'a>(object: &'a dyn Reflect, path: &[usize]) -> Value<'a> {
    let Some((last, parents)) = path.split_last() else {
        return Value::Null;
    };
    let mut current = object;
    for index in parents {
        match current.field(*index) {
            Value::Object(next) => current = next,
            _ => return Value::Null,
        }
    }
    current.field(*last)
}

fn compile_value_check(
    field: &str,
    field_type: FieldType,
    function: RestrictionFunction,
    argument: &Argument,
) -> Result<ValueCheck, RestrictionError> {
    match field_type {
        FieldType::Optional(inner) => compile_optional(field, *inner, function, argument),
        FieldType::Scalar(scalar) => compile_scalar(field, scalar, function, argument),
        FieldType::Set(scalar) => compile_set(field, scalar, function, argument),
        FieldType::Object(schema) => compile_object(field, schema, function, argument),
    }
}

fn compile_optional(
    field: &str,
    inner: FieldType,
    function: RestrictionFunction,
    argument: &Argument,
) -> Result<ValueCheck, RestrictionError> {
    match (function, argument) {
        (RestrictionFunction::Eq, Argument::Void) => {
            Ok(Box::new(|value: &Value<'_>| matches!(value, Value::Null)))
        }
        (RestrictionFunction::Ne, Argument::Void) => {
            Ok(Box::new(|value: &Value<'_>| !matches!(value, Value::Null)))
        }
        _ => {
            let test = compile_value_check(field, inner, function, argument)?;
            Ok(Box::new(move |value: &Value<'_>| {
                !matches!(value, Value::Null) && test(value)
            }))
        }
    }
}

fn compile_scalar(
    field: &str,
    scalar: ScalarType,
    function: RestrictionFunction,
    argument: &Argument,
) -> Result<ValueCheck, RestrictionError> {
    let field_type = FieldType::Scalar(scalar);
    match function {
        RestrictionFunction::Eq => {
            let expected = scalar_argument(field, function, scalar, argument)?;
            Ok(Box::new(move |value: &Value<'_>| value.matches(&expected)))
        }
        RestrictionFunction::Ne => {
            let expected = scalar_argument(field, function, scalar, argument)?;
            Ok(Box::new(move |value: &Value<'_>| !value.matches(&expected)))
        }
        RestrictionFunction::Lt
        | RestrictionFunction::Le
        | RestrictionFunction::Gt
        | RestrictionFunction::Ge => {
            if !scalar.is_ordered() {
                return Err(unsupported(field, function, field_type));
            }
            let expected = scalar_argument(field, function, scalar, argument)?;
            let accepts = move |ordering: Ordering| match function {
                RestrictionFunction::Lt => ordering == Ordering::Less,
                RestrictionFunction::Le => ordering != Ordering::Greater,
                RestrictionFunction::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Box::new(move |value: &Value<'_>| {
                value.compare(&expected).map_or(false, accepts)
            }))
        }
        RestrictionFunction::In => {
            let allowed = set_argument(field, function, scalar, argument)?;
            Ok(Box::new(move |value: &Value<'_>| {
                allowed.iter().any(|candidate| value.matches(candidate))
            }))
        }
        RestrictionFunction::NotIn => {
            let denied = set_argument(field, function, scalar, argument)?;
            Ok(Box::new(move |value: &Value<'_>| {
                !denied.iter().any(|candidate| value.matches(candidate))
            }))
        }
        RestrictionFunction::HasAll
        | RestrictionFunction::HasNone
        | RestrictionFunction::Attr
        | RestrictionFunction::LogicalOr => Err(unsupported(field, function, field_type)),
    }
}

fn compile_set(
    field: &str,
    scalar: ScalarType,
    function: RestrictionFunction,
    argument: &Argument,
) -> Result<ValueCheck, RestrictionError> {
    match function {
        RestrictionFunction::HasAll => {
            let required = set_argument(field, function, scalar, argument)?;
            Ok(Box::new(move |value: &Value<'_>| {
                required.iter().all(|item| value.contains(item))
            }))
        }
        RestrictionFunction::HasNone => {
            let forbidden = set_argument(field, function, scalar, argument)?;
            Ok(Box::new(move |value: &Value<'_>| {
                matches!(value, Value::Set(_)) && !forbidden.iter().any(|item| value.contains(item))
            }))
        }
        _ => Err(unsupported(field, function, FieldType::Set(scalar))),
    }
}

fn compile_object(
    field: &str,
    schema: &'static Schema,
    function: RestrictionFunction,
    argument: &Argument,
) -> Result<ValueCheck, RestrictionError> {
    if function != RestrictionFunction::Attr {
        return Err(unsupported(field, function, FieldType::Object(schema)));
    }
    let nested = match argument {
        Argument::Restrictions(nested) => nested,
        other => {
            return Err(RestrictionError::ArgumentMismatch {
                field: field.to_string(),
                function: function.to_string(),
                expected: "restrictions".to_string(),
                found: other.describe(),
            })
        }
    };
    let checks = compile_list(nested, schema)?;
    Ok(Box::new(move |value: &Value<'_>| match value {
        Value::Object(object) => checks.iter().all(|check| check(*object)),
        _ => false,
    }))
}

fn scalar_argument(
    field: &str,
    function: RestrictionFunction,
    expected: ScalarType,
    argument: &Argument,
) -> Result<Scalar, RestrictionError> {
    match argument {
        Argument::Scalar(scalar) if scalar.scalar_type() == expected => Ok(scalar.clone()),
        other => Err(RestrictionError::ArgumentMismatch {
            field: field.to_string(),
            function: function.to_string(),
            expected: expected.to_string(),
            found: other.describe(),
        }),
    }
}

fn set_argument(
    field: &str,
    function: RestrictionFunction,
    expected: ScalarType,
    argument: &Argument,
) -> Result<Vec<Scalar>, RestrictionError> {
    match argument {
        Argument::Set(items) if items.iter().all(|item| item.scalar_type() == expected) => {
            Ok(items.clone())
        }
        other => Err(RestrictionError::ArgumentMismatch {
            field: field.to_string(),
            function: function.to_string(),
            expected: format!("set<{}>", expected),
            found: other.describe(),
        }),
    }
}

fn unsupported(field: &str, function: RestrictionFunction, field_type: FieldType) -> RestrictionError {
    RestrictionError::UnsupportedFunction {
        field: field.to_string(),
        function: function.to_string(),
        field_type: field_type.to_string(),
    }
}

fn mismatch(restriction: &Restriction, expected: &str, found: &str) -> RestrictionError {
    RestrictionError::ArgumentMismatch {
        field: restriction.member.clone(),
        function: restriction.function.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}
