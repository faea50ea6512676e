//! Filter-expression evaluation over stored JSON records.
//!
//! The backend stores records as [`Value`] objects; this module walks a
//! [`Expr`](recstore_core::query::Expr) against one record at a time and
//! decides whether it matches. It also supplies the comparison key used for
//! sorting.

use serde_json::Value;
use std::{cmp::Ordering, collections::HashMap};

use recstore_core::{
    error::{RegistryError, RegistryResult},
    query::{Expr, FieldOp, QueryVisitor},
};

/// Borrowed, comparable view of a JSON value.
///
/// Numbers are normalized to f64 so integer and float fields compare
/// uniformly. Values of different kinds are never ordered relative to each
/// other; a comparison between them simply doesn't match.
#[derive(Debug)]
pub(crate) enum Scalar<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (integers and floats normalized to f64)
    Number(f64),
    /// String value
    String(&'a str),
    /// Array of scalar values
    Array(Vec<Scalar<'a>>),
    /// Object of scalar values
    Map(HashMap<&'a str, Scalar<'a>>),
}

impl<'a> From<&'a Value> for Scalar<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => Scalar::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Scalar::String(s),
            Value::Array(items) => Scalar::Array(items.iter().map(Scalar::from).collect()),
            Value::Object(map) => Scalar::Map(
                map.iter()
                    .map(|(k, v)| (k.as_str(), Scalar::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'a> PartialEq for Scalar<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::String(a), Scalar::String(b)) => a == b,
            (Scalar::Array(a), Scalar::Array(b)) => a == b,
            (Scalar::Map(a), Scalar::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Scalar<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.partial_cmp(b),
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b),
            (Scalar::String(a), Scalar::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Extracts the sort key for `field` from a stored record.
///
/// A missing field (or a non-object record) sorts as null, which groups
/// such records together rather than failing the sort.
pub(crate) fn sort_key<'v>(record: &'v Value, field: &str) -> Scalar<'v> {
    record
        .as_object()
        .and_then(|map| map.get(field))
        .map(Scalar::from)
        .unwrap_or(Scalar::Null)
}

/// Evaluates a filter expression against one stored record.
pub(crate) struct ExprEvaluator<'a> {
    record: &'a Value,
}

impl<'a> ExprEvaluator<'a> {
    pub fn new(record: &'a Value) -> Self {
        Self { record }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> RegistryResult<bool> {
        self.visit_expr(expr)
    }

    /// Filters an iterator of stored records down to those matching `expr`.
    ///
    /// A record that fails evaluation is excluded rather than failing the
    /// whole query.
    pub fn filter_records(
        records: impl IntoIterator<Item = &'a Value>,
        expr: &Expr,
    ) -> Vec<Value> {
        records
            .into_iter()
            .filter(|record| {
                ExprEvaluator::new(record)
                    .evaluate(expr)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    fn field_value(&self, field: &str) -> Option<&'a Value> {
        self.record
            .as_object()
            .and_then(|map| map.get(field))
    }
}

impl<'a> QueryVisitor for ExprEvaluator<'a> {
    type Output = bool;
    type Error = RegistryError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error> {
        Ok(self.field_value(field).is_some() == should_exist)
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Value,
    ) -> Result<Self::Output, Self::Error> {
        // An absent field matches nothing, including Ne.
        let Some(field_value) = self.field_value(field) else {
            return Ok(false);
        };

        let left = Scalar::from(field_value);
        let right = Scalar::from(value);

        match op {
            FieldOp::Eq => Ok(left == right),
            FieldOp::Ne => Ok(left != right),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                match left.partial_cmp(&right) {
                    Some(ordering) => Ok(match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        FieldOp::Lte => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    }),
                    None => Ok(false),
                }
            }
            FieldOp::Contains => match left {
                Scalar::Array(items) => Ok(items.iter().any(|item| item == &right)),
                Scalar::String(haystack) => match right {
                    Scalar::String(needle) => Ok(haystack.contains(needle)),
                    _ => Ok(false),
                },
                _ => Ok(false),
            },
            FieldOp::StartsWith => match (left, right) {
                (Scalar::String(s), Scalar::String(prefix)) => Ok(s.starts_with(prefix)),
                _ => Ok(false),
            },
            FieldOp::EndsWith => match (left, right) {
                (Scalar::String(s), Scalar::String(suffix)) => Ok(s.ends_with(suffix)),
                _ => Ok(false),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recstore_core::query::Cond;
    use serde_json::json;

    fn matches(record: &Value, expr: &Expr) -> bool {
        ExprEvaluator::new(record).evaluate(expr).unwrap()
    }

    #[test]
    fn equality_and_range() {
        let record = json!({"name": "alice", "age": 30});

        assert!(matches(&record, &Cond::eq("name", "alice")));
        assert!(!matches(&record, &Cond::eq("name", "bob")));
        assert!(matches(&record, &Cond::gt("age", 18)));
        assert!(matches(&record, &Cond::lte("age", 30)));
        assert!(!matches(&record, &Cond::lt("age", 30)));
    }

    #[test]
    fn absent_field_never_matches() {
        let record = json!({"name": "alice"});

        assert!(!matches(&record, &Cond::eq("missing", 1)));
        assert!(!matches(&record, &Cond::ne("missing", 1)));
        assert!(matches(&record, &Cond::not_exists("missing")));
    }

    #[test]
    fn string_and_array_shapes() {
        let record = json!({"title": "hello world", "tags": ["a", "b"]});

        assert!(matches(&record, &Cond::contains("title", "lo wo")));
        assert!(matches(&record, &Cond::contains("tags", "b")));
        assert!(!matches(&record, &Cond::contains("tags", "c")));
        assert!(matches(&record, &Cond::starts_with("title", "hello")));
        assert!(matches(&record, &Cond::ends_with("title", "world")));
    }

    #[test]
    fn logical_composition() {
        let record = json!({"name": "alice", "age": 30});

        let expr = Cond::eq("name", "alice").and(Cond::gte("age", 21));
        assert!(matches(&record, &expr));

        let expr = Cond::eq("name", "bob").or(Cond::eq("name", "alice"));
        assert!(matches(&record, &expr));

        assert!(!matches(&record, &Cond::eq("name", "alice").not()));
    }

    #[test]
    fn mixed_kinds_do_not_order() {
        let record = json!({"age": "thirty"});

        assert!(!matches(&record, &Cond::gt("age", 18)));
        assert!(!matches(&record, &Cond::lte("age", 18)));
    }
}
