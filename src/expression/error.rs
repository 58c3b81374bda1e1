//! Error types for building and evaluating expressions.

use crate::expression::operator::{Arity, ExprKind};
use thiserror::Error;

/// Errors that can occur while building or evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Wrong number of operands for a fixed-arity kind
    #[error("{kind} is {expected} and expects {}, got {actual}", expected_operands(.expected))]
    Arity {
        kind: ExprKind,
        expected: Arity,
        actual: usize,
    },

    /// The backend has no operation registered for this kind
    #[error("Unsupported operation: {kind}")]
    UnsupportedOperation { kind: ExprKind },

    #[error("Expression depth exceeds maximum of {max_depth}")]
    DepthLimitExceeded { max_depth: usize },

    #[error("Invalid field name '{name}': {reason}")]
    InvalidField { name: String, reason: String },

    #[error("Invalid literal {literal}: {reason}")]
    InvalidLiteral { literal: String, reason: String },

    /// Operand types cannot be combined by the operator
    #[error("Type mismatch for operator {operator}: left={left}, right={right}")]
    TypeMismatch {
        operator: ExprKind,
        left: String,
        right: String,
    },
}

fn expected_operands(arity: &Arity) -> String {
    match (arity, arity.operand_count()) {
        (Arity::Leaf, _) => "a single payload operand".to_string(),
        (_, Some(1)) => "1 operand".to_string(),
        (_, Some(n)) => format!("{} operands", n),
        (_, None) => "any number of operands".to_string(),
    }
}

impl ExpressionError {
    pub fn unsupported(kind: ExprKind) -> Self {
        ExpressionError::UnsupportedOperation { kind }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
