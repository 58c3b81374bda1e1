use anyhow::Result;
use expressioner::backend::{
    expression_to_predicate, CompiledPredicate, ExpressionBackend, PredicateExpression, Record,
    SqlConfig, SqlDialect, SqlExpression,
};
use expressioner::expression::{
    evaluate, EvaluatorConfig, ExprKind, Expression, ExpressionError, Expressioner, Value,
};
use std::collections::HashMap;
use thiserror::Error;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sample_filter() -> Expression {
    Expression::or(vec![
        Expression::equal(Expression::field("hello"), Expression::value("value")),
        Expression::not_equal(Expression::field("age"), Expression::value(55)),
        Expression::equal(Expression::field("hair"), Expression::value("black")),
    ])
}

fn record(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[test]
fn test_sql_generation() -> Result<()> {
    init_logging();

    let expressioner = Expressioner::new(SqlExpression::new());
    assert_eq!(
        expressioner.generate(&sample_filter())?,
        "((`hello` = 'value') OR (`age` <> 55) OR (`hair` = 'black'))"
    );

    let config: SqlConfig = serde_json::from_str(r#"{"dialect": "postgres"}"#)?;
    let expressioner = Expressioner::new(SqlExpression::from_config(config));
    assert_eq!(
        expressioner.generate(&sample_filter())?,
        r#"(("hello" = 'value') OR ("age" <> 55) OR ("hair" = 'black'))"#
    );
    Ok(())
}

#[test]
fn test_predicate_generation() -> Result<()> {
    init_logging();

    let rendered = evaluate(&sample_filter(), &PredicateExpression::new())?;
    assert_eq!(
        rendered,
        "((row['hello'] == 'value') || (row['age'] != 55) || (row['hair'] == 'black'))"
    );
    Ok(())
}

#[test]
fn test_compiled_filter() -> Result<()> {
    init_logging();

    let accept = expression_to_predicate(&sample_filter())?;
    assert!(accept(&record(&[("age", Value::Integer(30))])));
    assert!(accept(&record(&[
        ("age", Value::Integer(55)),
        ("hair", Value::from("black")),
    ])));
    assert!(!accept(&record(&[
        ("hello", Value::from("other")),
        ("age", Value::Integer(55)),
        ("hair", Value::from("red")),
    ])));
    // Every comparison is NULL, so the OR is NULL and the record is rejected
    assert!(!accept(&record(&[])));

    let root = CompiledPredicate::new().compile(&sample_filter())?;
    assert_eq!(root(&record(&[]))?, Value::Null);
    Ok(())
}

#[test]
fn test_generation_is_deterministic() -> Result<()> {
    let filter = Expression::and(vec![
        sample_filter(),
        Expression::between(
            Expression::field("score"),
            Expression::value(1.5),
            Expression::value(9),
        ),
        Expression::not_in(Expression::field("id"), Expression::value(vec![3, 4])),
    ]);

    let backend = SqlExpression::with_dialect(SqlDialect::Sqlite);
    let first = evaluate(&filter, &backend)?;
    let second = evaluate(&filter, &backend)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_shared_backend_across_threads() {
    let filter = sample_filter();
    let backend = SqlExpression::new();
    let expected = evaluate(&filter, &backend).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| evaluate(&filter, &backend)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}

#[test]
fn test_depth_limit_from_config() -> Result<()> {
    let config: EvaluatorConfig = serde_json::from_str(r#"{"max_depth": 2}"#)?;
    let expressioner = Expressioner::new(SqlExpression::new()).with_config(config);

    let shallow = Expression::equal(Expression::field("a"), Expression::value(1));
    assert_eq!(expressioner.generate(&shallow)?, "(`a` = 1)");

    assert_eq!(
        expressioner.generate(&sample_filter()),
        Err(ExpressionError::DepthLimitExceeded { max_depth: 2 })
    );
    Ok(())
}

#[derive(Error, Debug, PartialEq)]
enum CostError {
    #[error("engine error: {0}")]
    Engine(#[from] ExpressionError),
    #[error("field {0} is not indexed")]
    NotIndexed(String),
}

/// Estimates the number of comparisons a filter costs, refusing
/// unindexed fields and LIKE patterns
struct CostBackend {
    indexed: Vec<&'static str>,
}

impl CostBackend {
    fn combine(&self, operands: &[u32]) -> Result<u32, CostError> {
        Ok(1 + operands.iter().sum::<u32>())
    }
}

impl ExpressionBackend for CostBackend {
    type Output = u32;
    type Literal = Value;
    type Error = CostError;

    fn supports(&self, kind: ExprKind) -> bool {
        !matches!(kind, ExprKind::Like | ExprKind::NotLike)
    }

    fn field(&self, name: &str) -> Result<u32, CostError> {
        if self.indexed.iter().any(|indexed| *indexed == name) {
            Ok(0)
        } else {
            Err(CostError::NotIndexed(name.to_string()))
        }
    }

    fn value(&self, _literal: &Value) -> Result<u32, CostError> {
        Ok(0)
    }

    fn not(&self, a: u32) -> Result<u32, CostError> {
        self.combine(&[a])
    }

    fn likely(&self, a: u32) -> Result<u32, CostError> {
        Ok(a)
    }

    fn not_likely(&self, a: u32) -> Result<u32, CostError> {
        Ok(a)
    }

    fn equal(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn not_equal(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn exactly(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b, 1])
    }

    fn not_exactly(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b, 1])
    }

    fn is_in(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn not_in(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn gt(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn lt(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn gte(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn lte(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn like(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn not_like(&self, a: u32, b: u32) -> Result<u32, CostError> {
        self.combine(&[a, b])
    }

    fn between(&self, a: u32, b: u32, c: u32) -> Result<u32, CostError> {
        self.combine(&[a, b, c, 1])
    }

    fn not_between(&self, a: u32, b: u32, c: u32) -> Result<u32, CostError> {
        self.combine(&[a, b, c, 1])
    }

    fn if_else(&self, a: u32, b: u32, c: u32) -> Result<u32, CostError> {
        Ok(a + b.max(c))
    }

    fn and(&self, operands: Vec<u32>) -> Result<u32, CostError> {
        Ok(operands.iter().sum())
    }

    fn or(&self, operands: Vec<u32>) -> Result<u32, CostError> {
        Ok(operands.iter().sum())
    }
}

#[test]
fn test_custom_backend_errors() {
    init_logging();

    let backend = CostBackend {
        indexed: vec!["hello", "age", "hair"],
    };
    assert_eq!(evaluate(&sample_filter(), &backend), Ok(3));

    // Backend errors come back exactly as the backend produced them
    let filter = Expression::and(vec![
        sample_filter(),
        Expression::gt(Expression::field("salary"), Expression::value(10)),
    ]);
    assert_eq!(
        evaluate(&filter, &backend),
        Err(CostError::NotIndexed("salary".to_string()))
    );

    // Engine errors are converted into the backend's error type
    let filter = Expression::like(Expression::field("hello"), Expression::value("h%"));
    assert_eq!(
        evaluate(&filter, &backend),
        Err(CostError::Engine(ExpressionError::UnsupportedOperation {
            kind: ExprKind::Like
        }))
    );
}

#[test]
fn test_dynamic_construction() -> Result<()> {
    let operands = vec![
        Expression::field("age"),
        Expression::value(18),
        Expression::value(65),
    ];
    let filter: Expression = Expression::from_operands(ExprKind::Between, operands)?;
    assert_eq!(
        evaluate(&filter, &SqlExpression::new())?,
        "(`age` BETWEEN 18 AND 65)"
    );

    let result: Result<Expression, _> =
        Expression::from_operands(ExprKind::Gt, vec![Expression::field("age")]);
    assert!(matches!(
        result,
        Err(ExpressionError::Arity {
            kind: ExprKind::Gt,
            actual: 1,
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_record_trait_objects() {
    let row = record(&[("age", Value::Integer(40))]);
    let as_record: &dyn Record = &row;
    assert_eq!(as_record.get("age"), Some(&Value::Integer(40)));
    assert_eq!(as_record.get("name"), None);
}
