//! Operator definitions for expressions.

use std::fmt;

/// Arity shape of an expression kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly one opaque payload (field name or literal)
    Leaf,
    Unary,
    Binary,
    Ternary,
    /// Any number of sub-expressions, including none
    Nary,
}

impl Arity {
    /// Fixed operand count, or `None` for n-ary shapes
    pub fn operand_count(&self) -> Option<usize> {
        match self {
            Arity::Leaf | Arity::Unary => Some(1),
            Arity::Binary => Some(2),
            Arity::Ternary => Some(3),
            Arity::Nary => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arity::Leaf => "leaf",
            Arity::Unary => "unary",
            Arity::Binary => "binary",
            Arity::Ternary => "ternary",
            Arity::Nary => "n-ary",
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat tag naming every node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Field,
    Value,
    Not,
    Likely,
    NotLikely,
    Equal,
    NotEqual,
    Exactly,
    NotExactly,
    In,
    NotIn,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    NotLike,
    Between,
    NotBetween,
    IfElse,
    And,
    Or,
}

impl ExprKind {
    pub const ALL: [ExprKind; 22] = [
        ExprKind::Field,
        ExprKind::Value,
        ExprKind::Not,
        ExprKind::Likely,
        ExprKind::NotLikely,
        ExprKind::Equal,
        ExprKind::NotEqual,
        ExprKind::Exactly,
        ExprKind::NotExactly,
        ExprKind::In,
        ExprKind::NotIn,
        ExprKind::Gt,
        ExprKind::Lt,
        ExprKind::Gte,
        ExprKind::Lte,
        ExprKind::Like,
        ExprKind::NotLike,
        ExprKind::Between,
        ExprKind::NotBetween,
        ExprKind::IfElse,
        ExprKind::And,
        ExprKind::Or,
    ];

    /// Get the operator this kind maps to, grouped by arity shape
    pub fn operator(&self) -> Operator {
        match self {
            ExprKind::Field => Operator::Field,
            ExprKind::Value => Operator::Value,
            ExprKind::Not => Operator::Unary(UnaryOperator::Not),
            ExprKind::Likely => Operator::Unary(UnaryOperator::Likely),
            ExprKind::NotLikely => Operator::Unary(UnaryOperator::NotLikely),
            ExprKind::Equal => Operator::Binary(BinaryOperator::Equal),
            ExprKind::NotEqual => Operator::Binary(BinaryOperator::NotEqual),
            ExprKind::Exactly => Operator::Binary(BinaryOperator::Exactly),
            ExprKind::NotExactly => Operator::Binary(BinaryOperator::NotExactly),
            ExprKind::In => Operator::Binary(BinaryOperator::In),
            ExprKind::NotIn => Operator::Binary(BinaryOperator::NotIn),
            ExprKind::Gt => Operator::Binary(BinaryOperator::Gt),
            ExprKind::Lt => Operator::Binary(BinaryOperator::Lt),
            ExprKind::Gte => Operator::Binary(BinaryOperator::Gte),
            ExprKind::Lte => Operator::Binary(BinaryOperator::Lte),
            ExprKind::Like => Operator::Binary(BinaryOperator::Like),
            ExprKind::NotLike => Operator::Binary(BinaryOperator::NotLike),
            ExprKind::Between => Operator::Ternary(TernaryOperator::Between),
            ExprKind::NotBetween => Operator::Ternary(TernaryOperator::NotBetween),
            ExprKind::IfElse => Operator::Ternary(TernaryOperator::IfElse),
            ExprKind::And => Operator::Nary(NaryOperator::And),
            ExprKind::Or => Operator::Nary(NaryOperator::Or),
        }
    }

    /// Get the arity shape of this kind
    pub fn arity(&self) -> Arity {
        self.operator().arity()
    }

    /// Get the display name for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ExprKind::Field => "field",
            ExprKind::Value => "value",
            ExprKind::Not => "not",
            ExprKind::Likely => "likely",
            ExprKind::NotLikely => "notLikely",
            ExprKind::Equal => "equal",
            ExprKind::NotEqual => "notEqual",
            ExprKind::Exactly => "exactly",
            ExprKind::NotExactly => "notExactly",
            ExprKind::In => "in",
            ExprKind::NotIn => "notIn",
            ExprKind::Gt => "gt",
            ExprKind::Lt => "lt",
            ExprKind::Gte => "gte",
            ExprKind::Lte => "lte",
            ExprKind::Like => "like",
            ExprKind::NotLike => "notLike",
            ExprKind::Between => "between",
            ExprKind::NotBetween => "notBetween",
            ExprKind::IfElse => "ifElse",
            ExprKind::And => "and",
            ExprKind::Or => "or",
        }
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator tag grouped by arity shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Field,
    Value,
    Unary(UnaryOperator),
    Binary(BinaryOperator),
    Ternary(TernaryOperator),
    Nary(NaryOperator),
}

impl Operator {
    pub fn arity(&self) -> Arity {
        match self {
            Operator::Field | Operator::Value => Arity::Leaf,
            Operator::Unary(_) => Arity::Unary,
            Operator::Binary(_) => Arity::Binary,
            Operator::Ternary(_) => Arity::Ternary,
            Operator::Nary(_) => Arity::Nary,
        }
    }

    pub fn kind(&self) -> ExprKind {
        match self {
            Operator::Field => ExprKind::Field,
            Operator::Value => ExprKind::Value,
            Operator::Unary(op) => op.kind(),
            Operator::Binary(op) => op.kind(),
            Operator::Ternary(op) => op.kind(),
            Operator::Nary(op) => op.kind(),
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Likely,
    NotLikely,
}

impl UnaryOperator {
    pub fn kind(&self) -> ExprKind {
        match self {
            UnaryOperator::Not => ExprKind::Not,
            UnaryOperator::Likely => ExprKind::Likely,
            UnaryOperator::NotLikely => ExprKind::NotLikely,
        }
    }
}

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Equality
    Equal,
    NotEqual,
    Exactly,
    NotExactly,

    // Membership
    In,
    NotIn,

    // Ordering
    Gt,
    Lt,
    Gte,
    Lte,

    // Pattern matching
    Like,
    NotLike,
}

impl BinaryOperator {
    pub fn kind(&self) -> ExprKind {
        match self {
            BinaryOperator::Equal => ExprKind::Equal,
            BinaryOperator::NotEqual => ExprKind::NotEqual,
            BinaryOperator::Exactly => ExprKind::Exactly,
            BinaryOperator::NotExactly => ExprKind::NotExactly,
            BinaryOperator::In => ExprKind::In,
            BinaryOperator::NotIn => ExprKind::NotIn,
            BinaryOperator::Gt => ExprKind::Gt,
            BinaryOperator::Lt => ExprKind::Lt,
            BinaryOperator::Gte => ExprKind::Gte,
            BinaryOperator::Lte => ExprKind::Lte,
            BinaryOperator::Like => ExprKind::Like,
            BinaryOperator::NotLike => ExprKind::NotLike,
        }
    }
}

/// Ternary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TernaryOperator {
    Between,
    NotBetween,
    IfElse,
}

impl TernaryOperator {
    pub fn kind(&self) -> ExprKind {
        match self {
            TernaryOperator::Between => ExprKind::Between,
            TernaryOperator::NotBetween => ExprKind::NotBetween,
            TernaryOperator::IfElse => ExprKind::IfElse,
        }
    }
}

/// Variadic connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaryOperator {
    And,
    Or,
}

impl NaryOperator {
    pub fn kind(&self) -> ExprKind {
        match self {
            NaryOperator::And => ExprKind::And,
            NaryOperator::Or => ExprKind::Or,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_arity() {
        assert_eq!(ExprKind::Field.arity(), Arity::Leaf);
        assert_eq!(ExprKind::Value.arity(), Arity::Leaf);
        assert_eq!(ExprKind::NotLikely.arity(), Arity::Unary);
        assert_eq!(ExprKind::NotIn.arity(), Arity::Binary);
        assert_eq!(ExprKind::Lt.arity(), Arity::Binary);
        assert_eq!(ExprKind::IfElse.arity(), Arity::Ternary);
        assert_eq!(ExprKind::Or.arity(), Arity::Nary);

        assert_eq!(Arity::Leaf.operand_count(), Some(1));
        assert_eq!(Arity::Ternary.operand_count(), Some(3));
        assert_eq!(Arity::Nary.operand_count(), None);
    }

    #[test]
    fn test_operator_kinds_are_consistent() {
        let unary = [
            UnaryOperator::Not,
            UnaryOperator::Likely,
            UnaryOperator::NotLikely,
        ];
        for op in unary {
            assert_eq!(op.kind().arity(), Arity::Unary);
        }

        let binary = [
            BinaryOperator::Equal,
            BinaryOperator::NotEqual,
            BinaryOperator::Exactly,
            BinaryOperator::NotExactly,
            BinaryOperator::In,
            BinaryOperator::NotIn,
            BinaryOperator::Gt,
            BinaryOperator::Lt,
            BinaryOperator::Gte,
            BinaryOperator::Lte,
            BinaryOperator::Like,
            BinaryOperator::NotLike,
        ];
        for op in binary {
            assert_eq!(op.kind().arity(), Arity::Binary);
        }

        for op in [
            TernaryOperator::Between,
            TernaryOperator::NotBetween,
            TernaryOperator::IfElse,
        ] {
            assert_eq!(op.kind().arity(), Arity::Ternary);
        }

        assert_eq!(NaryOperator::And.kind(), ExprKind::And);
        assert_eq!(NaryOperator::Or.kind(), ExprKind::Or);
    }

    #[test]
    fn test_kind_operator_mapping() {
        for kind in ExprKind::ALL {
            assert_eq!(kind.operator().kind(), kind);
        }
        assert_eq!(
            ExprKind::Lt.operator(),
            Operator::Binary(BinaryOperator::Lt)
        );
        assert_eq!(
            ExprKind::IfElse.operator(),
            Operator::Ternary(TernaryOperator::IfElse)
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ExprKind::NotExactly.to_string(), "notExactly");
        assert_eq!(ExprKind::IfElse.to_string(), "ifElse");
        assert_eq!(Arity::Nary.to_string(), "n-ary");

        let mut names: Vec<_> = ExprKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ExprKind::ALL.len());
    }
}
