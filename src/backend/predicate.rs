//! In-process predicate expression backend.
//!
//! Produces the source text of a boolean expression over a `row` map, e.g.
//! `((row['age'] > 18) && (row['name'] != 'bob'))`.

use crate::backend::ExpressionBackend;
use crate::expression::{ExpressionError, ExpressionResult, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateExpression;

impl PredicateExpression {
    pub fn new() -> Self {
        Self
    }

    fn render_literal(&self, literal: &Value) -> ExpressionResult<String> {
        match literal {
            Value::Null => Ok("null".to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(x) if x.is_finite() => Ok(format!("{:?}", x)),
            Value::Float(_) => Err(ExpressionError::InvalidLiteral {
                literal: literal.to_string(),
                reason: "non-finite float".to_string(),
            }),
            Value::String(s) => Ok(quote(s)),
            Value::List(items) => {
                let rendered = items
                    .iter()
                    .map(|item| self.render_literal(item))
                    .collect::<ExpressionResult<Vec<_>>>()?;
                Ok(format!("[{}]", rendered.join(", ")))
            }
        }
    }
}

/// Single-quote `s`, escaping backslashes and quotes
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

fn infix(left: &str, op: &str, right: &str) -> ExpressionResult<String> {
    Ok(format!("({} {} {})", left, op, right))
}

impl ExpressionBackend for PredicateExpression {
    type Output = String;
    type Literal = Value;
    type Error = ExpressionError;

    fn field(&self, name: &str) -> ExpressionResult<String> {
        if name.is_empty() {
            return Err(ExpressionError::InvalidField {
                name: name.to_string(),
                reason: "field name is empty".to_string(),
            });
        }
        Ok(format!("row[{}]", quote(name)))
    }

    fn value(&self, literal: &Value) -> ExpressionResult<String> {
        self.render_literal(literal)
    }

    fn not(&self, operand: String) -> ExpressionResult<String> {
        Ok(format!("(!{})", operand))
    }

    fn likely(&self, operand: String) -> ExpressionResult<String> {
        Ok(format!("likely({})", operand))
    }

    fn not_likely(&self, operand: String) -> ExpressionResult<String> {
        Ok(format!("unlikely({})", operand))
    }

    fn equal(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "==", &right)
    }

    fn not_equal(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "!=", &right)
    }

    fn exactly(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "===", &right)
    }

    fn not_exactly(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "!==", &right)
    }

    fn is_in(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "in", &right)
    }

    fn not_in(&self, left: String, right: String) -> ExpressionResult<String> {
        infix(&left, "not in", &right)
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
        Ok(format!("like({}, {})", left, pattern))
    }

    fn not_like(&self, left: String, pattern: String) -> ExpressionResult<String> {
        Ok(format!("!like({}, {})", left, pattern))
    }

    fn between(&self, expr: String, low: String, high: String) -> ExpressionResult<String> {
        Ok(format!("({} <= {} && {} <= {})", low, expr, expr, high))
    }

    fn not_between(&self, expr: String, low: String, high: String) -> ExpressionResult<String> {
        Ok(format!("({} < {} || {} < {})", expr, low, high, expr))
    }

    fn if_else(
        &self,
        condition: String,
        then_result: String,
        else_result: String,
    ) -> ExpressionResult<String> {
        Ok(format!("({} ? {} : {})", condition, then_result, else_result))
    }

    fn and(&self, operands: Vec<String>) -> ExpressionResult<String> {
        if operands.is_empty() {
            return Ok("true".to_string());
        }
        Ok(format!("({})", operands.join(" && ")))
    }

    fn or(&self, operands: Vec<String>) -> ExpressionResult<String> {
        if operands.is_empty() {
            return Ok("false".to_string());
        }
        Ok(format!("({})", operands.join(" || ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{evaluate, Expression};

    fn render(expr: &Expression) -> ExpressionResult<String> {
        evaluate(expr, &PredicateExpression::new())
    }

    fn field(name: &str) -> Expression {
        Expression::field(name)
    }

    #[test]
    fn test_or_of_comparisons() {
        let expr = Expression::or(vec![
            Expression::equal(field("hello"), Expression::value("value")),
            Expression::not_equal(field("age"), Expression::value(55)),
            Expression::equal(field("hair"), Expression::value("black")),
        ]);
        assert_eq!(
            render(&expr).unwrap(),
            "((row['hello'] == 'value') || (row['age'] != 55) || (row['hair'] == 'black'))"
        );
    }

    #[test]
    fn test_operators() {
        let expr = Expression::and(vec![
            Expression::not_expr(field("banned")),
            Expression::exactly(field("role"), Expression::value("admin")),
            Expression::not_exactly(field("role"), Expression::value(Value::Null)),
            Expression::lt(field("age"), Expression::value(65)),
            Expression::is_in(field("id"), Expression::value(vec![1, 2])),
            Expression::like(field("name"), Expression::value("j%")),
        ]);
        assert_eq!(
            render(&expr).unwrap(),
            "((!row['banned']) && (row['role'] === 'admin') && (row['role'] !== null) && \
             (row['age'] < 65) && (row['id'] in [1, 2]) && like(row['name'], 'j%'))"
        );

        let expr = Expression::between(field("x"), Expression::value(1), Expression::value(9));
        assert_eq!(render(&expr).unwrap(), "(1 <= row['x'] && row['x'] <= 9)");

        let expr = Expression::not_between(field("x"), Expression::value(1), Expression::value(9));
        assert_eq!(render(&expr).unwrap(), "(row['x'] < 1 || 9 < row['x'])");

        let expr = Expression::if_else(field("a"), Expression::value(true), field("b"));
        assert_eq!(render(&expr).unwrap(), "(row['a'] ? true : row['b'])");

        let expr = Expression::not_likely(Expression::not_like(field("a"), Expression::value("%")));
        assert_eq!(render(&expr).unwrap(), "unlikely(!like(row['a'], '%'))");
    }

    #[test]
    fn test_empty_connectives() {
        let expr: Expression = Expression::and(Vec::new());
        assert_eq!(render(&expr).unwrap(), "true");
        let expr: Expression = Expression::or(Vec::new());
        assert_eq!(render(&expr).unwrap(), "false");
    }

    #[test]
    fn test_escaping() {
        let backend = PredicateExpression::new();
        assert_eq!(backend.field("o'neil").unwrap(), "row['o\\'neil']");
        assert_eq!(backend.value(&Value::from("a\\b")).unwrap(), "'a\\\\b'");
        assert_eq!(backend.value(&Value::List(Vec::new())).unwrap(), "[]");
        assert!(matches!(
            backend.field(""),
            Err(ExpressionError::InvalidField { .. })
        ));
        assert!(matches!(
            backend.value(&Value::Float(f64::INFINITY)),
            Err(ExpressionError::InvalidLiteral { .. })
        ));
    }
}
