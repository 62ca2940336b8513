//! Per-traversal state for building a view

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::el::{Beans, ExpressionError, ExpressionEvaluator, ValueExpression};
use crate::template::{ClientMode, ClientToken, TemplateClient, TemplateClientStack};

use super::component::Component;
use super::config::{ProjectStage, ViewConfig};
use super::error::FaceletError;
use super::fragment::PageIncluder;
use super::scope::{Environment, ParameterSet, ScopeResolver, ValueBinding, VariableScope};
use super::state::StateCoordinator;

/// Everything one traversal of a view carries through its handlers.
///
/// A context is owned by a single traversal and never shared. Every operation
/// that layers state (a variable scope, a parameter set, a template client, a
/// fragment) takes a closure and restores the previous state once it returns,
/// whether it returned `Ok` or `Err`.
pub struct FaceletContext<'a> {
    evaluator: &'a dyn ExpressionEvaluator,
    includer: &'a dyn PageIncluder,
    state: Option<&'a mut dyn StateCoordinator>,
    config: &'a ViewConfig,
    beans: Arc<Beans>,
    scope: Arc<VariableScope>,
    parameters: Vec<Arc<ParameterSet>>,
    published: HashMap<String, Arc<ParameterSet>>,
    clients: TemplateClientStack,
    current_fragment: Option<Arc<str>>,
    include_chain: Vec<Arc<str>>,
    active_definitions: Vec<(ClientToken, Option<String>)>,
    unique_ids: HashMap<String, usize>,
}

impl<'a> FaceletContext<'a> {
    pub fn new(
        evaluator: &'a dyn ExpressionEvaluator,
        includer: &'a dyn PageIncluder,
        config: &'a ViewConfig,
    ) -> Self {
        Self {
            evaluator,
            includer,
            state: None,
            config,
            beans: Arc::new(Beans::new()),
            scope: Arc::new(VariableScope::new()),
            parameters: Vec::new(),
            published: HashMap::new(),
            clients: TemplateClientStack::new(),
            current_fragment: None,
            include_chain: Vec::new(),
            active_definitions: Vec::new(),
            unique_ids: HashMap::new(),
        }
    }

    pub fn with_beans(mut self, beans: Beans) -> Self {
        self.beans = Arc::new(beans);
        self
    }

    /// Attach the partial-state coordinator used by legacy decorations
    pub fn with_state(mut self, state: &'a mut dyn StateCoordinator) -> Self {
        self.state = Some(state);
        self
    }

    pub fn config(&self) -> &ViewConfig {
        self.config
    }

    pub fn project_stage(&self) -> ProjectStage {
        self.config.project_stage
    }

    /// Snapshot of the current name bindings, for deferred values
    pub fn environment(&self) -> Environment {
        Environment {
            scope: self.scope.clone(),
            parameters: self.parameters.clone(),
            beans: self.beans.clone(),
        }
    }

    fn resolver(&self) -> ScopeResolver<'_> {
        ScopeResolver {
            scope: &self.scope,
            parameters: &self.parameters,
            beans: &self.beans,
            evaluator: self.evaluator,
        }
    }

    pub fn evaluate(&self, expression: &ValueExpression) -> Result<Value, ExpressionError> {
        self.evaluator.evaluate(expression, &self.resolver())
    }

    pub fn evaluate_string(&self, expression: &ValueExpression) -> Result<String, ExpressionError> {
        self.evaluator.evaluate_string(expression, &self.resolver())
    }

    /// Current value of `name`, or `None` if nothing binds it
    pub fn variable(&self, name: &str) -> Result<Option<Value>, ExpressionError> {
        use crate::el::VariableResolver;
        self.resolver().resolve_variable(name)
    }

    pub fn scope(&self) -> &Arc<VariableScope> {
        &self.scope
    }

    /// Bind `name` in the innermost scope layer
    pub fn set_variable(&mut self, name: impl Into<String>, binding: ValueBinding) {
        Arc::make_mut(&mut self.scope).set(name, binding);
    }

    /// Run `f` in a fresh scope layer, then restore the current scope
    pub fn with_scope<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, FaceletError>,
    ) -> Result<R, FaceletError> {
        let previous = self.scope.clone();
        self.scope = Arc::new(VariableScope::extend(previous.clone()));
        let result = f(self);
        self.scope = previous;
        result
    }

    /// Publish `parameters` for the duration of `f`
    pub fn with_parameters<R>(
        &mut self,
        parameters: ParameterSet,
        f: impl FnOnce(&mut Self) -> Result<R, FaceletError>,
    ) -> Result<R, FaceletError> {
        let parameters = Arc::new(parameters);
        tracing::trace!(id = parameters.id(), "publishing parameters");
        self.published
            .insert(parameters.id().to_string(), parameters.clone());
        self.parameters.push(parameters);
        let result = f(self);
        self.parameters.pop();
        result
    }

    /// Number of parameter sets currently in effect
    pub fn parameter_depth(&self) -> usize {
        self.parameters.len()
    }

    /// Parameter set published under `id` during this traversal
    pub fn published_parameters(&self, id: &str) -> Option<&ParameterSet> {
        self.published.get(id).map(|p| p.as_ref())
    }

    pub fn template_clients(&self) -> &TemplateClientStack {
        &self.clients
    }

    /// Register `client` for the duration of `f`
    pub fn with_template_client<R>(
        &mut self,
        client: Arc<dyn TemplateClient>,
        mode: ClientMode,
        f: impl FnOnce(&mut Self) -> Result<R, FaceletError>,
    ) -> Result<R, FaceletError> {
        let token = self
            .clients
            .register(client, mode, self.current_fragment.clone());
        tracing::trace!(?mode, depth = self.clients.len(), "template client registered");

        let result = f(self);

        self.clients.pop(token);
        tracing::trace!(?mode, depth = self.clients.len(), "template client removed");
        result
    }

    /// Fill slot `name` from the registered template clients.
    ///
    /// Clients are asked most recent first. Each one runs as if its own
    /// fragment were being applied, so definitions resolve nested slots and
    /// relative paths against the page that declared them. Returns `false`
    /// when no client supplied content.
    ///
    /// Asking a client for a slot it is already filling is an
    /// [`FaceletError::IncludeCycle`].
    pub fn include_definition(
        &mut self,
        parent: &mut Component,
        name: Option<&str>,
    ) -> Result<bool, FaceletError> {
        let candidates = self.clients.candidates(self.current_fragment.as_deref());
        for candidate in candidates {
            let key = (candidate.token, name.map(str::to_string));
            if self.active_definitions.contains(&key) {
                let mut chain: Vec<String> = self.include_chain.iter().map(|p| p.to_string()).collect();
                if let Some(owner) = &candidate.owner {
                    chain.push(owner.to_string());
                }
                return Err(FaceletError::IncludeCycle { chain });
            }

            let chain = candidate
                .owner
                .as_ref()
                .and_then(|owner| self.include_chain.iter().rposition(|p| p == owner))
                .map(|index| self.include_chain[..=index].to_vec());

            let previous_fragment =
                std::mem::replace(&mut self.current_fragment, candidate.owner.clone());
            let previous_chain = chain.map(|chain| std::mem::replace(&mut self.include_chain, chain));
            self.active_definitions.push(key);

            let result = candidate.client.apply_client(self, parent, name);

            self.active_definitions.pop();
            self.current_fragment = previous_fragment;
            if let Some(previous_chain) = previous_chain {
                self.include_chain = previous_chain;
            }

            if result? {
                tracing::debug!(slot = name.unwrap_or("<default>"), "slot filled");
                return Ok(true);
            }
        }
        tracing::debug!(slot = name.unwrap_or("<default>"), "slot not resolved");
        Ok(false)
    }

    /// Apply the fragment at `path` into `parent` through the page includer
    pub fn include_fragment(&mut self, parent: &mut Component, path: &str) -> Result<(), FaceletError> {
        let includer = self.includer;
        includer.include_fragment(self, parent, path)
    }

    /// Path of the fragment whose handlers are being applied
    pub fn current_fragment(&self) -> Option<&str> {
        self.current_fragment.as_deref()
    }

    /// Run `f` with `path` as the current fragment.
    ///
    /// Fails with [`FaceletError::IncludeCycle`] if `path` is already being
    /// applied further up the include chain.
    pub fn with_fragment<R>(
        &mut self,
        path: Arc<str>,
        f: impl FnOnce(&mut Self) -> Result<R, FaceletError>,
    ) -> Result<R, FaceletError> {
        if self.include_chain.contains(&path) {
            let mut chain: Vec<String> = self.include_chain.iter().map(|p| p.to_string()).collect();
            chain.push(path.to_string());
            return Err(FaceletError::IncludeCycle { chain });
        }

        tracing::debug!(fragment = %path, depth = self.include_chain.len(), "including fragment");
        self.include_chain.push(path.clone());
        let previous = self.current_fragment.replace(path);

        let result = f(self);

        self.current_fragment = previous;
        self.include_chain.pop();
        result
    }

    /// `base` the first time it is asked for, then `base_1`, `base_2`, ...
    pub fn generate_unique_id(&mut self, base: &str) -> String {
        let count = self.unique_ids.entry(base.to_string()).or_insert(0);
        let id = match *count {
            0 => base.to_string(),
            n => format!("{}_{}", base, n),
        };
        *count += 1;
        id
    }

    pub fn state_coordinator(&mut self) -> Option<&mut (dyn StateCoordinator + 'a)> {
        self.state.as_deref_mut()
    }
}

impl std::fmt::Debug for FaceletContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceletContext")
            .field("config", &self.config)
            .field("current_fragment", &self.current_fragment)
            .field("include_chain", &self.include_chain)
            .field("active_definitions", &self.active_definitions.len())
            .field("clients", &self.clients.len())
            .field("scope_depth", &self.scope.depth())
            .field("parameters", &self.parameters.len())
            .finish()
    }
}
