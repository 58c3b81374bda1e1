//! SQL WHERE-fragment backend.

use crate::backend::ExpressionBackend;
use crate::expression::{ExprKind, ExpressionError, ExpressionResult, Value};
use serde::Deserialize;

/// SQL dialects understood by [`SqlExpression`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// Backtick-quoted identifiers, backslash escapes in strings
    #[default]
    MySql,
    Postgres,
    /// Also provides the `likely()` / `unlikely()` planner hints
    Sqlite,
}

impl SqlDialect {
    fn identifier_quote(&self) -> char {
        match self {
            SqlDialect::MySql => '`',
            SqlDialect::Postgres | SqlDialect::Sqlite => '"',
        }
    }

    fn escapes_backslash(&self) -> bool {
        matches!(self, SqlDialect::MySql)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    pub dialect: SqlDialect,
}

/// Renders a predicate as a parenthesised SQL boolean expression
#[derive(Debug, Clone, Default)]
pub struct SqlExpression {
    config: SqlConfig,
}

impl SqlExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self::from_config(SqlConfig { dialect })
    }

    pub fn from_config(config: SqlConfig) -> Self {
        Self { config }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.config.dialect
    }

    /// Quote a possibly dotted field name, one segment at a time
    fn quote_identifier(&self, name: &str) -> ExpressionResult<String> {
        if name.is_empty() {
            return Err(invalid_field(name, "field name is empty"));
        }

        let quote = self.config.dialect.identifier_quote();
        let escaped = format!("{}{}", quote, quote);
        let mut segments = Vec::new();
        for segment in name.split('.') {
            if segment.is_empty() {
                return Err(invalid_field(name, "field path has an empty segment"));
            }
            segments.push(format!(
                "{}{}{}",
                quote,
                segment.replace(quote, &escaped),
                quote
            ));
        }
        Ok(segments.join("."))
    }

    fn quote_string(&self, s: &str) -> String {
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('\'');
        for c in s.chars() {
            match c {
                '\'' => quoted.push_str("''"),
                '\\' if self.config.dialect.escapes_backslash() => quoted.push_str("\\\\"),
                c => quoted.push(c),
            }
        }
        quoted.push('\'');
        quoted
    }

    fn render_literal(&self, literal: &Value) -> ExpressionResult<String> {
        match literal {
            Value::Null => Ok("NULL".to_string()),
            Value::Boolean(true) => Ok("TRUE".to_string()),
            Value::Boolean(false) => Ok("FALSE".to_string()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(x) if x.is_finite() => Ok(format!("{:?}", x)),
            Value::Float(_) => Err(invalid_literal(literal, "non-finite float")),
            Value::String(s) => Ok(self.quote_string(s)),
            Value::List(items) if items.is_empty() => {
                Err(invalid_literal(literal, "empty list has no SQL form"))
            }
            Value::List(items) => {
                let rendered = items
                    .iter()
                    .map(|item| match item {
                        Value::List(_) => Err(invalid_literal(literal, "nested list")),
                        item => self.render_literal(item),
                    })
                    .collect::<ExpressionResult<Vec<_>>>()?;
                Ok(format!("({})", rendered.join(", ")))
            }
        }
    }
}

fn invalid_field(name: &str, reason: &str) -> ExpressionError {
    ExpressionError::InvalidField {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn invalid_literal(literal: &Value, reason: &str) -> ExpressionError {
    ExpressionError::InvalidLiteral {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}

fn infix(left: &str, op: &str, right: &str) -> ExpressionResult<String> {
    Ok(format!("({} {} {})", left, op, right))
}

fn connective(operands: &[String], op: &str, identity: &str) -> ExpressionResult<String> {
    if operands.is_empty() {
        return Ok(identity.to_string());
    }
    Ok(format!("({})", operands.join(op)))
}

impl ExpressionBackend for SqlExpression {
    type Output = String;
    type Literal = Value;
    type Error = ExpressionError;

    fn supports(&self, kind: ExprKind) -> bool {
        match kind {
            ExprKind::Likely | ExprKind::NotLikely => self.config.dialect == SqlDialect::Sqlite,
            _ => true,
        }
    }

    fn field(&self, name: &str) -> ExpressionResult<String> {
        self.quote_identifier(name)
    }

    fn value(&self, literal: &Value) -> ExpressionResult<String> {
        self.render_literal(literal)
    }

    fn not(&self, operand: String) -> ExpressionResult<String> {
        Ok(format!("(NOT {})", operand))
    }

    fn likely(&self, operand: String) -> ExpressionResult<String> {
        Ok(format!("likely({})", operand))
    }

    fn not_likely(&self, operand: String) -> ExpressionResult<String> {
        Ok(format!("unlikely({})", operand))
    }

    fn equal(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "=", &right)
    }

    fn not_equal(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "<>", &right)
    }

    fn exactly(&self, left: String, right: String) -> ExpressionResult<String> {
        Ok(format!("(({}) IS NOT NULL AND ({} = {}))", left, left, right))
    }

    fn not_exactly(&self, left: String, right: String) -> ExpressionResult<String> {
        Ok(format!("(({}) IS NULL OR ({} <> {}))", left, left, right))
    }

    fn is_in(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "IN", &right)
    }

    fn not_in(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "NOT IN", &right)
    }

    fn gt(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, ">", &right)
    }

    fn lt(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "<", &right)
    }

    fn gte(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, ">=", &right)
    }

    fn lte(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "<=", &right)
    }

    fn like(&self, left: String, pattern: String) -> ExpressionResult<String> {
        infix(&left, "LIKE", &pattern)
    }

    fn not_like(&self, left: String, pattern: String) -> ExpressionResult<String> {
        infix(&left, "NOT LIKE", &pattern)
    }

    fn between(&self, expr: String, low: String, high: String) -> ExpressionResult<String> {
        Ok(format!("({} BETWEEN {} AND {})", expr, low, high))
    }

    fn not_between(&self, expr: String, low: String, high: String) -> ExpressionResult<String> {
        Ok(format!("({} NOT BETWEEN {} AND {})", expr, low, high))
    }

    fn if_else(
        &self,
        condition: String,
        then_result: String,
        else_result: String,
    ) -> ExpressionResult<String> {
        Ok(format!(
            "(CASE WHEN {} THEN {} ELSE {} END)",
            condition, then_result, else_result
        ))
    }

    fn and(&self, operands: Vec<String>) -> ExpressionResult<String> {
        connective(&operands, " AND ", "(1 = 1)")
    }

    fn or(&self, operands: Vec<String>) -> ExpressionResult<String> {
        connective(&operands, " OR ", "(1 = 0)")
    }
}
