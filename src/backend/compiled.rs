//! Backend that compiles a tree into a closure evaluated against records.
//!
//! Evaluation follows SQL three-valued logic: comparisons involving NULL
//! yield NULL, `AND` is false as soon as one operand is false and `OR` is
//! true as soon as one operand is true. A missing field reads as NULL.

use crate::backend::ExpressionBackend;
use crate::expression::{evaluate, ExprKind, Expression, ExpressionError, ExpressionResult, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Source of field values for a compiled expression
pub trait Record {
    fn get(&self, field: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn get(&self, field: &str) -> Option<&Value> {
        HashMap::get(self, field)
    }
}

impl Record for BTreeMap<String, Value> {
    fn get(&self, field: &str) -> Option<&Value> {
        BTreeMap::get(self, field)
    }
}

/// A compiled node: computes the node's value for one record
pub type CompiledExpr = Box<dyn Fn(&dyn Record) -> ExpressionResult<Value> + Send + Sync>;

/// Type alias for predicate functions
pub type Predicate = Box<dyn Fn(&dyn Record) -> bool + Send + Sync>;

/// Compiles expressions into [`CompiledExpr`] closures
#[derive(Debug, Clone, Copy, Default)]
pub struct CompiledPredicate;

impl CompiledPredicate {
    pub fn new() -> Self {
        Self
    }

    /// Compile `expr` into a closure returning the root's value
    pub fn compile(&self, expr: &Expression) -> ExpressionResult<CompiledExpr> {
        evaluate(expr, self)
    }
}

/// Helper function to create a predicate function from an expression.
///
/// The predicate accepts a record only when the expression evaluates to
/// `true`; NULL and evaluation errors reject it, as in a WHERE clause.
pub fn expression_to_predicate(expr: &Expression) -> ExpressionResult<Predicate> {
    let root = CompiledPredicate.compile(expr)?;
    Ok(Box::new(move |record: &dyn Record| {
        matches!(root(record), Ok(Value::Boolean(true)))
    }))
}

fn compiled<F>(f: F) -> CompiledExpr
where
    F: Fn(&dyn Record) -> ExpressionResult<Value> + Send + Sync + 'static,
{
    Box::new(f)
}

fn type_mismatch(kind: ExprKind, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::TypeMismatch {
        operator: kind,
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    }
}

/// Interpret a value as a three-valued boolean
fn truth(kind: ExprKind, value: Value) -> ExpressionResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(b)),
        other => Err(type_mismatch(kind, &other, &Value::Boolean(true))),
    }
}

fn from_truth(truth: Option<bool>) -> Value {
    truth.map_or(Value::Null, Value::Boolean)
}

fn and3(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

/// Order two values, `None` when either side is NULL or NaN
fn compare(kind: ExprKind, left: &Value, right: &Value) -> ExpressionResult<Option<Ordering>> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Float(b)) => compare_int_float(*a, *b),
        (Value::Float(a), Value::Integer(b)) => compare_int_float(*b, *a).map(Ordering::reverse),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => return Err(type_mismatch(kind, left, right)),
    };
    Ok(ordering)
}

/// Exact ordering of an integer against a float, without rounding the
/// integer through `f64`
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float.is_infinite() {
        return Some(if float > 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    let whole = float.trunc();
    // Saturates outside the i128 range, which is still beyond any i64
    match i128::from(int).cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        ordering => Some(ordering),
    }
}

fn comparison(
    kind: ExprKind,
    left: CompiledExpr,
    right: CompiledExpr,
    test: fn(Ordering) -> bool,
) -> CompiledExpr {
    compiled(move |record| {
        let left = left(record)?;
        let right = right(record)?;
        Ok(from_truth(compare(kind, &left, &right)?.map(test)))
    })
}

fn contains(kind: ExprKind, needle: &Value, haystack: &Value) -> ExpressionResult<Option<bool>> {
    let items = match haystack {
        Value::List(items) => items,
        Value::Null => return Ok(None),
        other => return Err(type_mismatch(kind, needle, other)),
    };
    if needle.is_null() {
        return Ok(None);
    }

    let mut unknown = false;
    for item in items {
        match compare(kind, needle, item)? {
            Some(Ordering::Equal) => return Ok(Some(true)),
            Some(_) => {}
            None => unknown = true,
        }
    }
    Ok(if unknown { None } else { Some(false) })
}

fn membership(
    kind: ExprKind,
    left: CompiledExpr,
    right: CompiledExpr,
    negated: bool,
) -> CompiledExpr {
    compiled(move |record| {
        let left = left(record)?;
        let right = right(record)?;
        let found = contains(kind, &left, &right)?;
        Ok(from_truth(found.map(|found| found != negated)))
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    /// `%`
    AnySequence,
    /// `_`
    AnyChar,
    Char(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnySequence,
            '_' => LikeToken::AnyChar,
            '\\' => LikeToken::Char(chars.next().unwrap_or('\\')),
            c => LikeToken::Char(c),
        });
    }
    tokens
}

/// Case-sensitive SQL LIKE with `\` as the escape character
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let tokens = like_tokens(pattern);

    let (mut t, mut p) = (0, 0);
    // Token index after the last `%` and the text index it is matched up to
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(LikeToken::AnySequence) => {
                backtrack = Some((p + 1, t));
                p += 1;
            }
            Some(LikeToken::AnyChar) => {
                t += 1;
                p += 1;
            }
            Some(LikeToken::Char(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, t));
                }
                None => return false,
            },
        }
    }
    tokens[p..]
        .iter()
        .all(|token| *token == LikeToken::AnySequence)
}

fn pattern_match(
    kind: ExprKind,
    left: CompiledExpr,
    pattern: CompiledExpr,
    negated: bool,
) -> CompiledExpr {
    compiled(move |record| {
        let left = left(record)?;
        let pattern = pattern(record)?;
        let matched = match (&left, &pattern) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::String(text), Value::String(pattern)) => Some(like_match(text, pattern)),
            _ => return Err(type_mismatch(kind, &left, &pattern)),
        };
        Ok(from_truth(matched.map(|matched| matched != negated)))
    })
}

fn range(
    kind: ExprKind,
    expr: CompiledExpr,
    low: CompiledExpr,
    high: CompiledExpr,
    negated: bool,
) -> CompiledExpr {
    compiled(move |record| {
        let value = expr(record)?;
        let low = low(record)?;
        let high = high(record)?;
        let above_low = compare(kind, &value, &low)?.map(Ordering::is_ge);
        let below_high = compare(kind, &value, &high)?.map(Ordering::is_le);
        let inside = and3(above_low, below_high);
        Ok(from_truth(inside.map(|inside| inside != negated)))
    })
}

impl ExpressionBackend for CompiledPredicate {
    type Output = CompiledExpr;
    type Literal = Value;
    type Error = ExpressionError;

    fn field(&self, name: &str) -> ExpressionResult<CompiledExpr> {
        let name = name.to_string();
        Ok(compiled(move |record| {
            Ok(record.get(&name).cloned().unwrap_or(Value::Null))
        }))
    }

    fn value(&self, literal: &Value) -> ExpressionResult<CompiledExpr> {
        let literal = literal.clone();
        Ok(compiled(move |_| Ok(literal.clone())))
    }

    fn not(&self, operand: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(compiled(move |record| {
            let operand = truth(ExprKind::Not, operand(record)?)?;
            Ok(from_truth(operand.map(|b| !b)))
        }))
    }

    // Planner hints carry no meaning in process
    fn likely(&self, operand: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(operand)
    }

    fn not_likely(&self, operand: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(operand)
    }

    fn equal(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(comparison(ExprKind::Equal, left, right, Ordering::is_eq))
    }

    fn not_equal(
        &self,
        left: CompiledExpr,
        right: CompiledExpr,
    ) -> ExpressionResult<CompiledExpr> {
        Ok(comparison(ExprKind::NotEqual, left, right, Ordering::is_ne))
    }

    /// Equality that is false, not NULL, when the left operand is NULL
    fn exactly(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(compiled(move |record| {
            let left = left(record)?;
            let right = right(record)?;
            if left.is_null() {
                return Ok(Value::Boolean(false));
            }
            let ordering = compare(ExprKind::Exactly, &left, &right)?;
            Ok(from_truth(ordering.map(Ordering::is_eq)))
        }))
    }

    fn not_exactly(
        &self,
        left: CompiledExpr,
        right: CompiledExpr,
    ) -> ExpressionResult<CompiledExpr> {
        Ok(compiled(move |record| {
            let left = left(record)?;
            let right = right(record)?;
            if left.is_null() {
                return Ok(Value::Boolean(true));
            }
            let ordering = compare(ExprKind::NotExactly, &left, &right)?;
            Ok(from_truth(ordering.map(Ordering::is_ne)))
        }))
    }

    fn is_in(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(membership(ExprKind::In, left, right, false))
    }

    fn not_in(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(membership(ExprKind::NotIn, left, right, true))
    }

    fn gt(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(comparison(ExprKind::Gt, left, right, Ordering::is_gt))
    }

    fn lt(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(comparison(ExprKind::Lt, left, right, Ordering::is_lt))
    }

    fn gte(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(comparison(ExprKind::Gte, left, right, Ordering::is_ge))
    }

    fn lte(&self, left: CompiledExpr, right: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(comparison(ExprKind::Lte, left, right, Ordering::is_le))
    }

    fn like(&self, left: CompiledExpr, pattern: CompiledExpr) -> ExpressionResult<CompiledExpr> {
        Ok(pattern_match(ExprKind::Like, left, pattern, false))
    }

    fn not_like(
        &self,
        left: CompiledExpr,
        pattern: CompiledExpr,
    ) -> ExpressionResult<CompiledExpr> {
        Ok(pattern_match(ExprKind::NotLike, left, pattern, true))
    }

    fn between(
        &self,
        expr: CompiledExpr,
        low: CompiledExpr,
        high: CompiledExpr,
    ) -> ExpressionResult<CompiledExpr> {
        Ok(range(ExprKind::Between, expr, low, high, false))
    }

    fn not_between(
        &self,
        expr: CompiledExpr,
        low: CompiledExpr,
        high: CompiledExpr,
    ) -> ExpressionResult<CompiledExpr> {
        Ok(range(ExprKind::NotBetween, expr, low, high, true))
    }

    /// NULL conditions take the else branch
    fn if_else(
        &self,
        condition: CompiledExpr,
        then_result: CompiledExpr,
        else_result: CompiledExpr,
    ) -> ExpressionResult<CompiledExpr> {
        Ok(compiled(move |record| {
            match truth(ExprKind::IfElse, condition(record)?)? {
                Some(true) => then_result(record),
                Some(false) | None => else_result(record),
            }
        }))
    }

    fn and(&self, operands: Vec<CompiledExpr>) -> ExpressionResult<CompiledExpr> {
        Ok(compiled(move |record| {
            let mut unknown = false;
            for operand in &operands {
                match truth(ExprKind::And, operand(record)?)? {
                    Some(false) => return Ok(Value::Boolean(false)),
                    Some(true) => {}
                    None => unknown = true,
                }
            }
            Ok(if unknown {
                Value::Null
            } else {
                Value::Boolean(true)
            })
        }))
    }

    fn or(&self, operands: Vec<CompiledExpr>) -> ExpressionResult<CompiledExpr> {
        Ok(compiled(move |record| {
            let mut unknown = false;
            for operand in &operands {
                match truth(ExprKind::Or, operand(record)?)? {
                    Some(true) => return Ok(Value::Boolean(true)),
                    Some(false) => {}
                    None => unknown = true,
                }
            }
            Ok(if unknown {
                Value::Null
            } else {
                Value::Boolean(false)
            })
        }))
    }
}
