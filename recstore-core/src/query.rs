//! Query construction for listing records.
//!
//! A [`Query`] bundles an optional filter expression, an optional sort, and a
//! pagination window. Backends apply the three in a fixed order: filter, then
//! sort, then slice.
//!
//! Filters are built from the [`Cond`] constructors and combined with the
//! chainable [`Expr`] methods:
//!
//! ```ignore
//! use recstore_core::query::{Query, Cond, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Cond::eq("author", "alice").and(Cond::gte("created", "2026-01-01")))
//!     .sort("created", SortDirection::Desc)
//!     .offset(0)
//!     .limit(25)
//!     .build();
//! ```
//!
//! Field conditions cover equality (`eq`, `ne`), range (`gt`, `gte`, `lt`,
//! `lte`), string shape (`contains`, `starts_with`, `ends_with`) and
//! existence (`exists`, `not_exists`). How an expression is executed is up to
//! each backend, via the [`QueryVisitor`] walk.

use serde_json::Value;

use crate::{error::RegistryError, page::PageRequest};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification: which field to order by, and in which direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Field comparison operators usable in filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to. The field must exist for this to match.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// String or array contains the value.
    Contains,
    /// String starts with the value.
    StartsWith,
    /// String ends with the value.
    EndsWith,
}

/// A filter expression over record fields.
///
/// Leaf expressions compare a single field; [`Expr::And`], [`Expr::Or`] and
/// [`Expr::Not`] compose them into arbitrary predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Checks whether a field is present (`true`) or absent (`false`).
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Value,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Value) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to its operand list rather than nesting.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    ///
    /// If this expression is already an OR, the other expression is appended
    /// to its operand list rather than nesting.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// Helper for constructing filter conditions.
///
/// All constructors accept the field name as `impl Into<String>` and the
/// comparison value as `impl Into<Value>`, so string literals and numbers work
/// directly.
pub struct Cond;

impl Cond {
    /// Matches records where the field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches records where the field exists and does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Matches records where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Matches records where the field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Matches records where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Matches records where the field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches records where the string (or array) field contains the value.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    /// Matches records where the string field starts with the value.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::StartsWith, value.into())
    }

    /// Matches records where the string field ends with the value.
    pub fn ends_with(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::field(field.into(), FieldOp::EndsWith, value.into())
    }

    /// Matches records where the field is present.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Matches records where the field is absent.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    /// Logical AND of several expressions.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Logical OR of several expressions.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

/// A structured query for listing records.
///
/// The default query has no filter, no sort (insertion order), and the
/// default pagination window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Optional filter expression; absent means "match everything".
    pub filter: Option<Expr>,
    /// Optional sort; absent means insertion order.
    pub sort: Option<Sort>,
    /// Pagination window, normalized by the backend against its limits.
    pub page: PageRequest,
}

impl Query {
    /// Creates an empty query: match everything, insertion order, first page.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a builder for fluent query construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the sort field and direction for this query.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Sets the number of records to skip. Negative values are clamped to 0
    /// by the backend.
    pub fn offset(mut self, offset: i64) -> Self {
        self.query.page.offset = offset;
        self
    }

    /// Sets the maximum number of records to return. Zero or negative means
    /// "use the backend's default limit".
    pub fn limit(mut self, limit: i64) -> Self {
        self.query.page.limit = limit;
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

/// Visitor for walking a filter expression tree.
///
/// Backends implement this to translate or evaluate expressions their own
/// way; [`visit_expr`](QueryVisitor::visit_expr) dispatches on the node kind.
pub trait QueryVisitor {
    type Output;
    type Error: Into<RegistryError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Value,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, *op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_all_parts() {
        let query = Query::builder()
            .filter(Cond::eq("author", "alice"))
            .sort("created", SortDirection::Desc)
            .offset(20)
            .limit(5)
            .build();

        assert_eq!(query.filter, Some(Cond::eq("author", "alice")));
        assert_eq!(
            query.sort,
            Some(Sort { field: "created".into(), direction: SortDirection::Desc })
        );
        assert_eq!(query.page, PageRequest::new(20, 5));
    }

    #[test]
    fn and_chains_flatten() {
        let expr = Cond::eq("a", 1).and(Cond::eq("b", 2)).and(Cond::eq("c", 3));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected flat And, got {other:?}"),
        }
    }

    #[test]
    fn default_query_matches_everything() {
        let query = Query::new();
        assert!(query.filter.is_none());
        assert!(query.sort.is_none());
        assert_eq!(query.page, PageRequest::default());
    }
}
