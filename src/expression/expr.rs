//! Expression AST definitions.

use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::expression::operator::{
    Arity, BinaryOperator, ExprKind, NaryOperator, Operator, TernaryOperator, UnaryOperator,
};
use crate::expression::value::Value;
use std::mem;

/// Expression tree node.
///
/// Every variant is one arity shape; the operator tag picks the kind within
/// the shape. Children are owned by their parent, so a tree is always
/// acyclic and every node is reachable exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<L = Value> {
    /// Reference to a named field
    Field(String),

    /// Literal constant value
    Value(L),

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression<L>>,
    },

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression<L>>,
        right: Box<Expression<L>>,
    },

    /// Ternary operation, operands kept in positional order
    TernaryOp {
        op: TernaryOperator,
        first: Box<Expression<L>>,
        second: Box<Expression<L>>,
        third: Box<Expression<L>>,
    },

    /// AND / OR over any number of operands
    NaryOp {
        op: NaryOperator,
        operands: Vec<Expression<L>>,
    },
}

/// One operand of a node, as returned by [`Expression::operands`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<'a, L> {
    Field(&'a str),
    Value(&'a L),
    Expr(&'a Expression<L>),
}

impl<L> Expression<L> {
    /// Create a field reference expression
    pub fn field(name: impl Into<String>) -> Self {
        Expression::Field(name.into())
    }

    /// Create a literal expression
    pub fn value(literal: impl Into<L>) -> Self {
        Expression::Value(literal.into())
    }

    /// Create a unary operation expression
    pub fn unary_op(op: UnaryOperator, operand: Expression<L>) -> Self {
        Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: Expression<L>, right: Expression<L>) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a ternary operation expression
    pub fn ternary_op(
        op: TernaryOperator,
        first: Expression<L>,
        second: Expression<L>,
        third: Expression<L>,
    ) -> Self {
        Expression::TernaryOp {
            op,
            first: Box::new(first),
            second: Box::new(second),
            third: Box::new(third),
        }
    }

    /// Create an AND / OR expression, preserving operand order
    pub fn nary_op(op: NaryOperator, operands: impl IntoIterator<Item = Expression<L>>) -> Self {
        Expression::NaryOp {
            op,
            operands: operands.into_iter().collect(),
        }
    }

    /// Build a node of `kind` from sub-expressions, checking the operand count.
    ///
    /// Leaf kinds carry a payload rather than sub-expressions and are always
    /// rejected here; use [`Expression::field`] or [`Expression::value`].
    pub fn from_operands(kind: ExprKind, operands: Vec<Expression<L>>) -> ExpressionResult<Self> {
        let arity_error = ExpressionError::Arity {
            kind,
            expected: kind.arity(),
            actual: operands.len(),
        };

        match kind.operator() {
            Operator::Field | Operator::Value => Err(arity_error),
            Operator::Unary(op) => {
                let [operand] = <[Expression<L>; 1]>::try_from(operands).map_err(|_| arity_error)?;
                Ok(Self::unary_op(op, operand))
            }
            Operator::Binary(op) => {
                let [left, right] =
                    <[Expression<L>; 2]>::try_from(operands).map_err(|_| arity_error)?;
                Ok(Self::binary_op(op, left, right))
            }
            Operator::Ternary(op) => {
                let [first, second, third] =
                    <[Expression<L>; 3]>::try_from(operands).map_err(|_| arity_error)?;
                Ok(Self::ternary_op(op, first, second, third))
            }
            Operator::Nary(op) => Ok(Self::nary_op(op, operands)),
        }
    }

    /// Create an AND expression
    pub fn and(operands: impl IntoIterator<Item = Expression<L>>) -> Self {
        Self::nary_op(NaryOperator::And, operands)
    }

    /// Create an OR expression
    pub fn or(operands: impl IntoIterator<Item = Expression<L>>) -> Self {
        Self::nary_op(NaryOperator::Or, operands)
    }

    /// Create a NOT expression
    pub fn not_expr(operand: Expression<L>) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    pub fn likely(operand: Expression<L>) -> Self {
        Self::unary_op(UnaryOperator::Likely, operand)
    }

    pub fn not_likely(operand: Expression<L>) -> Self {
        Self::unary_op(UnaryOperator::NotLikely, operand)
    }

    /// Create an equality expression
    pub fn equal(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Equal, left, right)
    }

    /// Create a not-equal expression
    pub fn not_equal(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::NotEqual, left, right)
    }

    /// Create a null-safe equality expression
    pub fn exactly(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Exactly, left, right)
    }

    pub fn not_exactly(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::NotExactly, left, right)
    }

    /// Create a membership expression (`left IN right`)
    pub fn is_in(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::In, left, right)
    }

    pub fn not_in(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::NotIn, left, right)
    }

    /// Create a greater-than expression
    pub fn gt(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    /// Create a less-than expression
    pub fn lt(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    /// Create a greater-than-or-equal expression
    pub fn gte(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Gte, left, right)
    }

    /// Create a less-than-or-equal expression
    pub fn lte(left: Expression<L>, right: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Lte, left, right)
    }

    /// Create a pattern match expression
    pub fn like(left: Expression<L>, pattern: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::Like, left, pattern)
    }

    pub fn not_like(left: Expression<L>, pattern: Expression<L>) -> Self {
        Self::binary_op(BinaryOperator::NotLike, left, pattern)
    }

    /// Create an inclusive range expression (`expr BETWEEN low AND high`)
    pub fn between(expr: Expression<L>, low: Expression<L>, high: Expression<L>) -> Self {
        Self::ternary_op(TernaryOperator::Between, expr, low, high)
    }

    pub fn not_between(expr: Expression<L>, low: Expression<L>, high: Expression<L>) -> Self {
        Self::ternary_op(TernaryOperator::NotBetween, expr, low, high)
    }

    /// Create a conditional expression
    pub fn if_else(
        condition: Expression<L>,
        then_expr: Expression<L>,
        else_expr: Expression<L>,
    ) -> Self {
        Self::ternary_op(TernaryOperator::IfElse, condition, then_expr, else_expr)
    }

    /// Get the operator this node holds
    pub fn operator(&self) -> Operator {
        match self {
            Expression::Field(_) => Operator::Field,
            Expression::Value(_) => Operator::Value,
            Expression::UnaryOp { op, .. } => Operator::Unary(*op),
            Expression::BinaryOp { op, .. } => Operator::Binary(*op),
            Expression::TernaryOp { op, .. } => Operator::Ternary(*op),
            Expression::NaryOp { op, .. } => Operator::Nary(*op),
        }
    }

    pub fn kind(&self) -> ExprKind {
        self.operator().kind()
    }

    pub fn arity(&self) -> Arity {
        self.operator().arity()
    }

    /// Ordered operands of this node: the payload for leaves, the
    /// sub-expressions otherwise.
    pub fn operands(&self) -> Vec<Operand<'_, L>> {
        match self {
            Expression::Field(name) => vec![Operand::Field(name)],
            Expression::Value(literal) => vec![Operand::Value(literal)],
            _ => self.children().into_iter().map(Operand::Expr).collect(),
        }
    }

    /// Ordered sub-expressions of this node (empty for leaves)
    pub fn children(&self) -> Vec<&Expression<L>> {
        match self {
            Expression::Field(_) | Expression::Value(_) => Vec::new(),
            Expression::UnaryOp { operand, .. } => vec![operand.as_ref()],
            Expression::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::TernaryOp {
                first,
                second,
                third,
                ..
            } => vec![first.as_ref(), second.as_ref(), third.as_ref()],
            Expression::NaryOp { operands, .. } => operands.iter().collect(),
        }
    }

    /// Number of nodes on the longest root-to-leaf path. A leaf has depth 1
    /// and so does an empty AND / OR.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1)];
        while let Some((expr, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(expr.children().into_iter().map(|child| (child, depth + 1)));
        }
        max_depth
    }

    /// Field names referenced by this tree, in left-to-right order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            if let Expression::Field(name) = expr {
                fields.push(name.as_str());
            }
            stack.extend(expr.children().into_iter().rev());
        }
        fields
    }

    /// Move this node's sub-expressions onto `stack`, leaving empty leaves
    fn detach_children(&mut self, stack: &mut Vec<Expression<L>>) {
        match self {
            Expression::Field(_) | Expression::Value(_) => {}
            Expression::UnaryOp { operand, .. } => stack.push(detach(operand)),
            Expression::BinaryOp { left, right, .. } => {
                stack.push(detach(left));
                stack.push(detach(right));
            }
            Expression::TernaryOp {
                first,
                second,
                third,
                ..
            } => {
                stack.push(detach(first));
                stack.push(detach(second));
                stack.push(detach(third));
            }
            Expression::NaryOp { operands, .. } => stack.append(operands),
        }
    }
}

fn detach<L>(child: &mut Expression<L>) -> Expression<L> {
    mem::replace(child, Expression::Field(String::new()))
}

// Dropping never recurses, whatever the depth of the tree.
impl<L> Drop for Expression<L> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut expr) = stack.pop() {
            expr.detach_children(&mut stack);
        }
    }
}
