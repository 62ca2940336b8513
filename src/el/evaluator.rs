//! Expression evaluation against a variable resolver

use serde_json::Value;

use super::expression::{Accessor, ExpressionError, Operand, Segment, ValueExpression};

/// Source of variable values for an evaluation
pub trait VariableResolver {
    /// Look up `name`; `Ok(None)` means the name is not bound
    fn resolve_variable(&self, name: &str) -> Result<Option<Value>, ExpressionError>;
}

/// Evaluates parsed expressions
pub trait ExpressionEvaluator: std::fmt::Debug + Send + Sync {
    fn evaluate(
        &self,
        expression: &ValueExpression,
        variables: &dyn VariableResolver,
    ) -> Result<Value, ExpressionError>;

    /// Evaluate and coerce the result to text
    fn evaluate_string(
        &self,
        expression: &ValueExpression,
        variables: &dyn VariableResolver,
    ) -> Result<String, ExpressionError> {
        self.evaluate(expression, variables)
            .map(|v| coerce_to_string(&v))
    }
}

/// Text form of a value; null becomes the empty string
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Path lookups over JSON values
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEvaluator;

impl DefaultEvaluator {
    fn evaluate_operand(
        &self,
        operand: &Operand,
        expression: &ValueExpression,
        variables: &dyn VariableResolver,
    ) -> Result<Value, ExpressionError> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Path { root, accessors } => {
                let mut value = variables.resolve_variable(root)?.unwrap_or(Value::Null);
                for accessor in accessors {
                    value = access(value, accessor, expression)?;
                }
                Ok(value)
            }
        }
    }
}

impl ExpressionEvaluator for DefaultEvaluator {
    fn evaluate(
        &self,
        expression: &ValueExpression,
        variables: &dyn VariableResolver,
    ) -> Result<Value, ExpressionError> {
        match expression.segments() {
            [] => Ok(Value::String(String::new())),
            [Segment::Text(text)] => Ok(Value::String(text.clone())),
            // A lone expression keeps its type
            [Segment::Eval(operand)] => self.evaluate_operand(operand, expression, variables),
            segments => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Text(text) => out.push_str(text),
                        Segment::Eval(operand) => {
                            let value = self.evaluate_operand(operand, expression, variables)?;
                            out.push_str(&coerce_to_string(&value));
                        }
                    }
                }
                Ok(Value::String(out))
            }
        }
    }
}

fn access(
    value: Value,
    accessor: &Accessor,
    expression: &ValueExpression,
) -> Result<Value, ExpressionError> {
    let found = match (value, accessor) {
        (Value::Null, _) => None,
        (Value::Object(mut map), Accessor::Property(name)) => map.remove(name),
        (Value::Object(mut map), Accessor::Index(i)) => map.remove(&i.to_string()),
        (Value::Array(mut items), Accessor::Index(i)) if *i < items.len() => {
            Some(items.swap_remove(*i))
        }
        (Value::Array(_), Accessor::Index(_)) => None,
        (other, accessor) => {
            return Err(ExpressionError::PropertyNotFound {
                expression: expression.source().to_string(),
                property: accessor.to_string(),
                kind: kind_of(&other),
            })
        }
    };
    Ok(found.unwrap_or(Value::Null))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Vars(Value);

    impl VariableResolver for Vars {
        fn resolve_variable(&self, name: &str) -> Result<Option<Value>, ExpressionError> {
            Ok(self.0.get(name).cloned())
        }
    }

    fn eval(source: &str, vars: Value) -> Result<Value, ExpressionError> {
        let expr = ValueExpression::parse(source).unwrap();
        DefaultEvaluator.evaluate(&expr, &Vars(vars))
    }

    #[test]
    fn test_single_expression_keeps_type() {
        let v = eval("#{user.age}", json!({"user": {"age": 36}})).unwrap();
        assert_eq!(v, json!(36));
    }

    #[test]
    fn test_mixed_text_concatenates() {
        let v = eval("#{a}-#{b}", json!({"a": 1, "b": true})).unwrap();
        assert_eq!(v, json!("1-true"));
    }

    #[test]
    fn test_unknown_variable_is_null() {
        assert_eq!(eval("#{missing.deep}", json!({})).unwrap(), Value::Null);
        assert_eq!(eval("[#{missing}]", json!({})).unwrap(), json!("[]"));
    }

    #[test]
    fn test_array_index() {
        let vars = json!({"items": ["a", "b"]});
        assert_eq!(eval("#{items[1]}", vars.clone()).unwrap(), json!("b"));
        assert_eq!(eval("#{items[5]}", vars).unwrap(), Value::Null);
    }

    #[test]
    fn test_property_of_scalar_is_error() {
        let err = eval("#{name.first}", json!({"name": "Ada"})).unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::PropertyNotFound { kind: "string", .. }
        ));
    }

    #[test]
    fn test_evaluate_string_coerces_null() {
        let expr = ValueExpression::parse("#{nothing}").unwrap();
        let s = DefaultEvaluator
            .evaluate_string(&expr, &Vars(json!({})))
            .unwrap();
        assert_eq!(s, "");
    }
}
