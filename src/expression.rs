//! Predicate expression trees and the engine that translates them.
//!
//! This module provides:
//! - Expression AST representation
//! - Literal values carried by leaf nodes
//! - Evaluation of a tree through a pluggable backend
//! - Engine configuration

pub mod config;
pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod value;

pub use config::EvaluatorConfig;
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate, Evaluator, Expressioner};
pub use expr::{Expression, Operand};
pub use operator::{
    Arity, BinaryOperator, ExprKind, NaryOperator, Operator, TernaryOperator, UnaryOperator,
};
pub use value::Value;
