//! Rule Expression Engine
//!
//! Conditions may carry a boolean rule expression stored as JSON. The
//! expression is parsed into a `RuleExpression` tree and evaluated against a
//! flat `FeatureContext` built from the employee and item.
//!
//! # Stored format
//!
//! ```json
//! {
//!   "combinator": "AND",
//!   "children": [
//!     { "variable": "age", "operator": ">=", "value": 18 },
//!     { "combinator": "OR", "children": [
//!         { "variable": "relation_type", "operator": "=", "value": "self" },
//!         { "variable": "is_head_of_family", "operator": "=", "value": true }
//!     ]}
//!   ]
//! }
//! ```
//!
//! # Failure posture
//!
//! Parsing and evaluation report problems as `RulesError`. The
//! `RuleEngineAdapter` collapses any error to a pass: a rule that cannot be
//! understood must not deny coverage to everyone matching its condition.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{trace, warn};

use crate::catalog::Item;
use crate::condition::PriceCondition;
use crate::employee::Employee;

/// Errors that can occur while parsing or evaluating a rule expression
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RulesError {
    /// Node is neither a leaf nor a compound node
    #[error("Invalid rule format: {0}")]
    InvalidFormat(String),

    /// Comparison operator not supported
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Combinator other than AND/OR
    #[error("Unknown combinator: {0}")]
    UnknownCombinator(String),

    /// Leaf refers to a feature missing from the context
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    /// Ordering comparison between text and number
    #[error("Cannot compare {variable} ({actual}) with {expected}")]
    TypeMismatch {
        variable: String,
        actual: String,
        expected: String,
    },
}

/// A single feature value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(Decimal),
    Text(String),
}

impl FeatureValue {
    pub fn flag(value: bool) -> Self {
        FeatureValue::Number(if value { Decimal::ONE } else { Decimal::ZERO })
    }

    /// Converts a stored JSON literal
    pub fn from_json(value: &Value) -> Result<Self, RulesError> {
        match value {
            Value::Number(n) => {
                let raw = n.to_string();
                Decimal::from_str(&raw)
                    .or_else(|_| Decimal::from_scientific(&raw))
                    .map(FeatureValue::Number)
                    .map_err(|_| RulesError::InvalidFormat(format!("Unsupported number literal {}", raw)))
            }
            Value::String(s) => Ok(FeatureValue::Text(s.clone())),
            Value::Bool(b) => Ok(FeatureValue::flag(*b)),
            other => Err(RulesError::InvalidFormat(format!("Unsupported literal {}", other))),
        }
    }

    fn as_number(&self) -> Option<Decimal> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }
}

impl From<Decimal> for FeatureValue {
    fn from(value: Decimal) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Number(Decimal::from(value))
    }
}

impl From<u32> for FeatureValue {
    fn from(value: u32) -> Self {
        FeatureValue::Number(Decimal::from(value))
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Named features a rule expression is evaluated against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureContext {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    /// Adds every entry of `other`, overriding existing names
    pub fn merge(&mut self, other: &FeatureContext) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Comparison operator of a leaf node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl ComparisonOperator {
    pub fn parse(raw: &str) -> Result<Self, RulesError> {
        match raw.trim() {
            "=" | "==" => Ok(ComparisonOperator::Eq),
            "!=" => Ok(ComparisonOperator::Ne),
            ">" => Ok(ComparisonOperator::Gt),
            ">=" => Ok(ComparisonOperator::Ge),
            "<" => Ok(ComparisonOperator::Lt),
            "<=" => Ok(ComparisonOperator::Le),
            other => Err(RulesError::UnknownOperator(other.to_string())),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
        }
    }

    fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            ComparisonOperator::Eq => ordering == Equal,
            ComparisonOperator::Ne => ordering != Equal,
            ComparisonOperator::Gt => ordering == Greater,
            ComparisonOperator::Ge => ordering != Less,
            ComparisonOperator::Lt => ordering == Less,
            ComparisonOperator::Le => ordering != Greater,
        }
    }
}

/// Boolean combinator of a compound node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn parse(raw: &str) -> Result<Self, RulesError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Combinator::And),
            "OR" => Ok(Combinator::Or),
            _ => Err(RulesError::UnknownCombinator(raw.to_string())),
        }
    }
}

/// A parsed rule expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum RuleExpression {
    Leaf {
        variable: String,
        operator: ComparisonOperator,
        value: FeatureValue,
    },
    Compound {
        combinator: Combinator,
        children: Vec<RuleExpression>,
    },
}

impl RuleExpression {
    /// Parses a stored JSON expression
    pub fn parse(raw: &Value) -> Result<Self, RulesError> {
        let node = raw
            .as_object()
            .ok_or_else(|| RulesError::InvalidFormat(format!("Expected object node, got {}", raw)))?;

        if let (Some(variable), Some(operator)) = (node.get("variable"), node.get("operator")) {
            let variable = variable
                .as_str()
                .ok_or_else(|| RulesError::InvalidFormat("Variable must be a string".to_string()))?;
            let operator = operator
                .as_str()
                .ok_or_else(|| RulesError::InvalidFormat("Operator must be a string".to_string()))?;
            let value = node
                .get("value")
                .ok_or_else(|| RulesError::InvalidFormat(format!("Leaf {} has no value", variable)))?;

            return Ok(RuleExpression::Leaf {
                variable: variable.to_string(),
                operator: ComparisonOperator::parse(operator)?,
                value: FeatureValue::from_json(value)?,
            });
        }

        if let (Some(combinator), Some(children)) = (node.get("combinator"), node.get("children")) {
            let combinator = combinator
                .as_str()
                .ok_or_else(|| RulesError::InvalidFormat("Combinator must be a string".to_string()))?;
            let combinator = Combinator::parse(combinator)?;
            let children = children
                .as_array()
                .filter(|children| !children.is_empty())
                .ok_or_else(|| RulesError::InvalidFormat("Children must be a non-empty array".to_string()))?;

            let children = children
                .iter()
                .map(RuleExpression::parse)
                .collect::<Result<Vec<_>, _>>()?;

            return Ok(RuleExpression::Compound { combinator, children });
        }

        Err(RulesError::InvalidFormat(
            "Node has neither variable/operator nor combinator/children".to_string(),
        ))
    }

    /// Evaluates the expression against a feature context
    ///
    /// Every child of a compound node is evaluated, so an error anywhere in
    /// the tree is reported regardless of short-circuit order. Results are
    /// folded left to right with the combinator.
    pub fn evaluate(&self, ctx: &FeatureContext) -> Result<bool, RulesError> {
        match self {
            RuleExpression::Leaf {
                variable,
                operator,
                value,
            } => {
                let actual = ctx
                    .get(variable)
                    .ok_or_else(|| RulesError::UndefinedVariable(variable.clone()))?;
                compare(variable, actual, *operator, value)
            }
            RuleExpression::Compound { combinator, children } => {
                let results = children
                    .iter()
                    .map(|child| child.evaluate(ctx))
                    .collect::<Result<Vec<bool>, _>>()?;

                let mut iter = results.into_iter();
                let seed = iter
                    .next()
                    .ok_or_else(|| RulesError::InvalidFormat("Compound node without children".to_string()))?;
                Ok(iter.fold(seed, |acc, next| match combinator {
                    Combinator::And => acc && next,
                    Combinator::Or => acc || next,
                }))
            }
        }
    }
}

/// Compares a context feature with a literal
fn compare(
    variable: &str,
    actual: &FeatureValue,
    operator: ComparisonOperator,
    expected: &FeatureValue,
) -> Result<bool, RulesError> {
    if let (FeatureValue::Text(a), FeatureValue::Text(b)) = (actual, expected) {
        return Ok(operator.holds(a.as_str().cmp(b.as_str())));
    }

    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => Ok(operator.holds(a.cmp(&b))),
        _ => match operator {
            ComparisonOperator::Eq => Ok(false),
            ComparisonOperator::Ne => Ok(true),
            _ => Err(RulesError::TypeMismatch {
                variable: variable.to_string(),
                actual: actual.to_string(),
                expected: format!("{} {}", operator.symbol(), expected),
            }),
        },
    }
}

/// Evaluates the optional rule expression attached to a condition
///
/// Builds the feature context from employee and item data. A condition
/// without an expression, or with one that cannot be parsed or evaluated,
/// passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngineAdapter;

impl RuleEngineAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Features derived from the employee and item on `as_of`
    pub fn build_context(&self, employee: &Employee, item: &Item, as_of: NaiveDate) -> FeatureContext {
        let id_or_zero = |id: Option<i64>| FeatureValue::from(id.unwrap_or(0));

        let mut ctx = FeatureContext::new();
        ctx.insert("age", employee.age_on(as_of).unwrap_or(0));
        ctx.insert("gender", employee.gender.map(|g| g.code()).unwrap_or(""));
        ctx.insert("status", employee.status.clone().unwrap_or_default());
        ctx.insert("tenure_years", employee.tenure_years_on(as_of));
        ctx.insert("province_id", id_or_zero(employee.province_id.map(i64::from)));
        ctx.insert("location_id", id_or_zero(employee.location_id.map(i64::from)));
        ctx.insert(
            "custom_employee_code_id",
            id_or_zero(employee.custom_employee_code_id.map(i64::from)),
        );
        ctx.insert(
            "special_employee_type_id",
            id_or_zero(employee.special_employee_type_id.map(i64::from)),
        );
        ctx.insert("is_head_of_family", FeatureValue::flag(employee.is_head_of_family));
        ctx.insert("relation_type", employee.relation_code());
        ctx.insert("item_type", item.item_type.clone());
        ctx.insert("category_id", id_or_zero(item.category_id.map(i64::from)));
        ctx.insert("sub_category_id", id_or_zero(item.sub_category_id.map(i64::from)));
        ctx.insert("group_id", id_or_zero(item.group_id.map(i64::from)));
        ctx.insert("is_otc", FeatureValue::flag(item.is_otc));
        ctx
    }

    /// Feature context for an employee/item pair, logged at trace level
    pub fn explain(&self, employee: &Employee, item: &Item, as_of: NaiveDate) -> FeatureContext {
        let ctx = self.build_context(employee, item, as_of);
        trace!(employee = %employee.id, item = %item.id, features = ?ctx, "Rule feature context");
        ctx
    }

    /// Returns whether the condition's rule expression admits this line
    pub fn evaluate(
        &self,
        condition: &PriceCondition,
        employee: &Employee,
        item: &Item,
        as_of: NaiveDate,
        extra: &FeatureContext,
    ) -> bool {
        let Some(raw) = condition.rule_expression.as_ref() else {
            return true;
        };

        let mut ctx = self.build_context(employee, item, as_of);
        ctx.merge(extra);
        trace!(condition = %condition.id, features = ?ctx, "Evaluating rule expression");

        match RuleExpression::parse(raw).and_then(|expr| expr.evaluate(&ctx)) {
            Ok(passed) => passed,
            Err(err) => {
                warn!(condition = %condition.id, error = %err, "Rule expression unusable, treating as pass");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn ctx() -> FeatureContext {
        FeatureContext::new()
            .with("age", 35u32)
            .with("relation_type", "self")
            .with("is_otc", FeatureValue::flag(false))
    }

    #[test]
    fn test_parse_leaf() {
        let expr = RuleExpression::parse(&json!({"variable": "age", "operator": ">=", "value": 18})).unwrap();
        assert_eq!(
            expr,
            RuleExpression::Leaf {
                variable: "age".to_string(),
                operator: ComparisonOperator::Ge,
                value: FeatureValue::Number(dec!(18)),
            }
        );
    }

    #[test]
    fn test_nested_compound() {
        let expr = RuleExpression::parse(&json!({
            "combinator": "and",
            "children": [
                {"variable": "age", "operator": ">", "value": 30},
                {"combinator": "OR", "children": [
                    {"variable": "relation_type", "operator": "=", "value": "spouse"},
                    {"variable": "is_otc", "operator": "==", "value": false}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(expr.evaluate(&ctx()), Ok(true));
        assert_eq!(expr.evaluate(&ctx().with("age", 30u32)), Ok(false));
    }

    #[test]
    fn test_malformed_nodes_are_rejected() {
        assert!(matches!(
            RuleExpression::parse(&json!({"combinator": "XOR", "children": [{"variable": "age", "operator": "=", "value": 1}]})),
            Err(RulesError::UnknownCombinator(_))
        ));
        assert!(matches!(
            RuleExpression::parse(&json!({"variable": "age", "operator": "~", "value": 1})),
            Err(RulesError::UnknownOperator(_))
        ));
        assert!(matches!(
            RuleExpression::parse(&json!({"combinator": "AND", "children": []})),
            Err(RulesError::InvalidFormat(_))
        ));
        assert!(matches!(
            RuleExpression::parse(&json!({"name": "orphan"})),
            Err(RulesError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_undefined_variable_surfaces_even_after_false_child() {
        let expr = RuleExpression::parse(&json!({
            "combinator": "AND",
            "children": [
                {"variable": "age", "operator": "<", "value": 0},
                {"variable": "salary", "operator": ">", "value": 1000}
            ]
        }))
        .unwrap();

        assert_eq!(
            expr.evaluate(&ctx()),
            Err(RulesError::UndefinedVariable("salary".to_string()))
        );
    }

    #[test]
    fn test_text_and_number_comparisons() {
        let ctx = ctx().with("code", "42");
        let numeric_text = RuleExpression::parse(&json!({"variable": "code", "operator": ">", "value": 40})).unwrap();
        assert_eq!(numeric_text.evaluate(&ctx), Ok(true));

        let mismatch = RuleExpression::parse(&json!({"variable": "relation_type", "operator": ">", "value": 3})).unwrap();
        assert!(matches!(mismatch.evaluate(&ctx), Err(RulesError::TypeMismatch { .. })));

        let inequality = RuleExpression::parse(&json!({"variable": "relation_type", "operator": "!=", "value": 3})).unwrap();
        assert_eq!(inequality.evaluate(&ctx), Ok(true));
    }
}
