//! Expression language used in attribute values and text
//!
//! Attribute values and text nodes may embed `#{...}` (or `${...}`) expressions.
//! A [`ValueExpression`] is parsed once when a fragment is compiled and evaluated
//! on every traversal through an [`ExpressionEvaluator`], which looks names up
//! through a [`VariableResolver`].
//!
//! ```
//! use facelet_compose::el::{DefaultEvaluator, ExpressionEvaluator, ValueExpression, VariableResolver};
//! use facelet_compose::el::ExpressionError;
//! use serde_json::{json, Value};
//!
//! struct One;
//! impl VariableResolver for One {
//!     fn resolve_variable(&self, name: &str) -> Result<Option<Value>, ExpressionError> {
//!         Ok((name == "user").then(|| json!({"name": "Ada"})))
//!     }
//! }
//!
//! let expr = ValueExpression::parse("Hello #{user.name}!").unwrap();
//! let text = DefaultEvaluator.evaluate_string(&expr, &One).unwrap();
//! assert_eq!(text, "Hello Ada!");
//! ```

mod evaluator;
mod expression;
mod lexer;

pub use evaluator::{coerce_to_string, DefaultEvaluator, ExpressionEvaluator, VariableResolver};
pub use expression::{Accessor, ExpressionError, Operand, Segment, ValueExpression};

/// Application objects visible to expressions by name
pub type Beans = serde_json::Map<String, serde_json::Value>;
