//! Backends that turn evaluated operands into a target representation.
//!
//! A backend implements [`ExpressionBackend`], one operation per node kind.
//! Backends never walk the tree themselves; the evaluator hands them operands
//! that are already translated.

pub mod compiled;
pub mod predicate;
pub mod sql;

pub use compiled::{expression_to_predicate, CompiledExpr, CompiledPredicate, Predicate, Record};
pub use predicate::PredicateExpression;
pub use sql::{SqlConfig, SqlDialect, SqlExpression};

use crate::expression::{ExprKind, ExpressionError};

/// Capability interface the evaluator dispatches into.
///
/// `Output` is the backend-native result produced for every node and
/// `Literal` is the payload type of `Value` leaves. Errors the evaluator
/// raises itself are converted through `From<ExpressionError>`; errors a
/// backend returns are passed back to the caller untouched.
pub trait ExpressionBackend {
    type Output;
    type Literal;
    type Error: From<ExpressionError>;

    /// Whether this backend registers an operation for `kind`.
    ///
    /// The evaluator fails with `UnsupportedOperation` for any kind this
    /// returns false for, before evaluating the node's operands.
    fn supports(&self, _kind: ExprKind) -> bool {
        true
    }

    // Leaves
    fn field(&self, name: &str) -> Result<Self::Output, Self::Error>;
    fn value(&self, literal: &Self::Literal) -> Result<Self::Output, Self::Error>;

    // Unary
    fn not(&self, operand: Self::Output) -> Result<Self::Output, Self::Error>;
    fn likely(&self, operand: Self::Output) -> Result<Self::Output, Self::Error>;
    fn not_likely(&self, operand: Self::Output) -> Result<Self::Output, Self::Error>;

    // Binary
    fn equal(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn not_equal(&self, left: Self::Output, right: Self::Output)
        -> Result<Self::Output, Self::Error>;
    fn exactly(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn not_exactly(
        &self,
        left: Self::Output,
        right: Self::Output,
    ) -> Result<Self::Output, Self::Error>;
    fn is_in(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn not_in(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn gt(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn lt(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn gte(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn lte(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output, Self::Error>;
    fn like(&self, left: Self::Output, pattern: Self::Output)
        -> Result<Self::Output, Self::Error>;
    fn not_like(
        &self,
        left: Self::Output,
        pattern: Self::Output,
    ) -> Result<Self::Output, Self::Error>;

    // Ternary
    fn between(
        &self,
        expr: Self::Output,
        low: Self::Output,
        high: Self::Output,
    ) -> Result<Self::Output, Self::Error>;
    fn not_between(
        &self,
        expr: Self::Output,
        low: Self::Output,
        high: Self::Output,
    ) -> Result<Self::Output, Self::Error>;
    fn if_else(
        &self,
        condition: Self::Output,
        then_result: Self::Output,
        else_result: Self::Output,
    ) -> Result<Self::Output, Self::Error>;

    // N-ary
    fn and(&self, operands: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;
    fn or(&self, operands: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;
}
