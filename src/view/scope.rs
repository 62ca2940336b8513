//! Layered variable scopes and deferred parameter bindings
//!
//! A [`VariableScope`] is one writable layer over an optional, shared parent.
//! Lookups read through the parent chain; writes touch only the local layer.
//! The active scope lives in the traversal context as an `Arc`, so a handler
//! that layers a new scope can restore the exact previous one afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::el::{Beans, ExpressionError, ExpressionEvaluator, ValueExpression, VariableResolver};

/// Value producer bound to a variable name
#[derive(Debug, Clone)]
pub enum ValueBinding {
    /// Already computed
    Value(Value),
    /// Evaluated on every read, against the environment captured at binding time
    Deferred(Arc<DeferredValue>),
}

/// Expression plus the environment it was written in
#[derive(Debug)]
pub struct DeferredValue {
    pub expression: ValueExpression,
    pub environment: Environment,
}

impl ValueBinding {
    pub fn deferred(expression: ValueExpression, environment: Environment) -> Self {
        ValueBinding::Deferred(Arc::new(DeferredValue {
            expression,
            environment,
        }))
    }

    /// Produce the current value
    pub fn resolve(&self, evaluator: &dyn ExpressionEvaluator) -> Result<Value, ExpressionError> {
        match self {
            ValueBinding::Value(value) => Ok(value.clone()),
            ValueBinding::Deferred(deferred) => evaluator.evaluate(
                &deferred.expression,
                &deferred.environment.resolver(evaluator),
            ),
        }
    }
}

/// One layer of variables over an immutable parent
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    bindings: HashMap<String, ValueBinding>,
    parent: Option<Arc<VariableScope>>,
}

impl VariableScope {
    /// Empty root scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty writable layer reading through to `parent`
    pub fn extend(parent: Arc<VariableScope>) -> Self {
        Self {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Nearest binding for `name`, local layer first
    pub fn get(&self, name: &str) -> Option<&ValueBinding> {
        let mut current = self;
        loop {
            if let Some(binding) = current.bindings.get(name) {
                return Some(binding);
            }
            current = current.parent.as_deref()?;
        }
    }

    /// Bind `name` in this layer only
    pub fn set(&mut self, name: impl Into<String>, binding: ValueBinding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn parent(&self) -> Option<&Arc<VariableScope>> {
        self.parent.as_ref()
    }

    /// Number of layers, this one included
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }
}

/// Parameters a composition publishes for the duration of its template
#[derive(Debug, Clone)]
pub struct ParameterSet {
    id: String,
    bindings: HashMap<String, ValueBinding>,
}

impl ParameterSet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bindings: HashMap::new(),
        }
    }

    /// Unique id of the publishing tag instance
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set(&mut self, name: impl Into<String>, binding: ValueBinding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&ValueBinding> {
        self.bindings.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Everything a name can resolve against, frozen at one point of a traversal
#[derive(Debug, Clone)]
pub struct Environment {
    pub scope: Arc<VariableScope>,
    pub parameters: Vec<Arc<ParameterSet>>,
    pub beans: Arc<Beans>,
}

impl Environment {
    pub fn resolver<'r>(&'r self, evaluator: &'r dyn ExpressionEvaluator) -> ScopeResolver<'r> {
        ScopeResolver {
            scope: &self.scope,
            parameters: &self.parameters,
            beans: &self.beans,
            evaluator,
        }
    }
}

/// Name lookup: scope chain, then published parameters (innermost first), then beans
pub struct ScopeResolver<'r> {
    pub scope: &'r VariableScope,
    pub parameters: &'r [Arc<ParameterSet>],
    pub beans: &'r Beans,
    pub evaluator: &'r dyn ExpressionEvaluator,
}

impl VariableResolver for ScopeResolver<'_> {
    fn resolve_variable(&self, name: &str) -> Result<Option<Value>, ExpressionError> {
        if let Some(binding) = self.scope.get(name) {
            return binding.resolve(self.evaluator).map(Some);
        }
        if let Some(binding) = self.parameters.iter().rev().find_map(|set| set.get(name)) {
            return binding.resolve(self.evaluator).map(Some);
        }
        Ok(self.beans.get(name).cloned())
    }
}
