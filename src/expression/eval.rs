//! Expression evaluation through a backend.

use crate::backend::ExpressionBackend;
use crate::expression::{
    BinaryOperator, EvaluatorConfig, Expression, ExpressionError, NaryOperator, TernaryOperator,
    UnaryOperator,
};

type BackendResult<B> =
    Result<<B as ExpressionBackend>::Output, <B as ExpressionBackend>::Error>;

/// Post-order walker that reduces a tree to one backend result.
///
/// Children are always evaluated left to right, and each node's operation is
/// called only after all of its children succeeded. The first error stops the
/// walk and is returned as is.
pub struct Evaluator<'a, B: ExpressionBackend> {
    backend: &'a B,
    config: EvaluatorConfig,
}

impl<'a, B: ExpressionBackend> Evaluator<'a, B> {
    /// Create a new evaluator with the default configuration
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            config: EvaluatorConfig::default(),
        }
    }

    /// Create a new evaluator with an explicit configuration
    pub fn with_config(backend: &'a B, config: EvaluatorConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate an expression and return the backend's result for its root
    pub fn evaluate(&self, expr: &Expression<B::Literal>) -> BackendResult<B> {
        self.evaluate_at(expr, 1)
    }

    fn evaluate_at(&self, expr: &Expression<B::Literal>, depth: usize) -> BackendResult<B> {
        if depth > self.config.max_depth {
            return Err(ExpressionError::DepthLimitExceeded {
                max_depth: self.config.max_depth,
            }
            .into());
        }

        let kind = expr.kind();
        if !self.backend.supports(kind) {
            return Err(ExpressionError::unsupported(kind).into());
        }
        log::trace!("evaluating {} at depth {}", kind, depth);

        match expr {
            Expression::Field(name) => self.backend.field(name),

            Expression::Value(literal) => self.backend.value(literal),

            Expression::UnaryOp { op, operand } => {
                let operand = self.evaluate_at(operand, depth + 1)?;
                self.evaluate_unary_op(*op, operand)
            }

            Expression::BinaryOp { op, left, right } => {
                let left = self.evaluate_at(left, depth + 1)?;
                let right = self.evaluate_at(right, depth + 1)?;
                self.evaluate_binary_op(*op, left, right)
            }

            Expression::TernaryOp {
                op,
                first,
                second,
                third,
            } => {
                let first = self.evaluate_at(first, depth + 1)?;
                let second = self.evaluate_at(second, depth + 1)?;
                let third = self.evaluate_at(third, depth + 1)?;
                self.evaluate_ternary_op(*op, first, second, third)
            }

            Expression::NaryOp { op, operands } => {
                let operands = operands
                    .iter()
                    .map(|operand| self.evaluate_at(operand, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                self.evaluate_nary_op(*op, operands)
            }
        }
    }

    fn evaluate_unary_op(&self, op: UnaryOperator, operand: B::Output) -> BackendResult<B> {
        match op {
            UnaryOperator::Not => self.backend.not(operand),
            UnaryOperator::Likely => self.backend.likely(operand),
            UnaryOperator::NotLikely => self.backend.not_likely(operand),
        }
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: B::Output,
        right: B::Output,
    ) -> BackendResult<B> {
        match op {
            BinaryOperator::Equal => self.backend.equal(left, right),
            BinaryOperator::NotEqual => self.backend.not_equal(left, right),
            BinaryOperator::Exactly => self.backend.exactly(left, right),
            BinaryOperator::NotExactly => self.backend.not_exactly(left, right),
            BinaryOperator::In => self.backend.is_in(left, right),
            BinaryOperator::NotIn => self.backend.not_in(left, right),
            BinaryOperator::Gt => self.backend.gt(left, right),
            BinaryOperator::Lt => self.backend.lt(left, right),
            BinaryOperator::Gte => self.backend.gte(left, right),
            BinaryOperator::Lte => self.backend.lte(left, right),
            BinaryOperator::Like => self.backend.like(left, right),
            BinaryOperator::NotLike => self.backend.not_like(left, right),
        }
    }

    fn evaluate_ternary_op(
        &self,
        op: TernaryOperator,
        first: B::Output,
        second: B::Output,
        third: B::Output,
    ) -> BackendResult<B> {
        match op {
            TernaryOperator::Between => self.backend.between(first, second, third),
            TernaryOperator::NotBetween => self.backend.not_between(first, second, third),
            TernaryOperator::IfElse => self.backend.if_else(first, second, third),
        }
    }

    fn evaluate_nary_op(&self, op: NaryOperator, operands: Vec<B::Output>) -> BackendResult<B> {
        match op {
            NaryOperator::And => self.backend.and(operands),
            NaryOperator::Or => self.backend.or(operands),
        }
    }
}

/// Helper function to evaluate an expression with the default configuration
pub fn evaluate<B: ExpressionBackend>(
    expr: &Expression<B::Literal>,
    backend: &B,
) -> BackendResult<B> {
    Evaluator::new(backend).evaluate(expr)
}

/// Owns a backend and generates its representation for any number of trees
pub struct Expressioner<B: ExpressionBackend> {
    backend: B,
    config: EvaluatorConfig,
}

impl<B: ExpressionBackend> Expressioner<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: EvaluatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Translate `expr` into the backend's representation
    pub fn generate(&self, expr: &Expression<B::Literal>) -> BackendResult<B> {
        log::debug!(
            "generating {} expression of depth {}",
            expr.kind(),
            expr.depth()
        );
        Evaluator::with_config(&self.backend, self.config).evaluate(expr)
    }
}
