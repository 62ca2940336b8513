//! Template client contract and the per-traversal client stack

use std::sync::Arc;

use crate::view::{Component, FaceletContext, FaceletError};

/// Something that can fill a named slot
pub trait TemplateClient: std::fmt::Debug + Send + Sync {
    /// Try to fill `name` into `parent`; `None` asks for the client's own body.
    ///
    /// Returns `Ok(false)` when this client has nothing for `name`.
    fn apply_client(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
        name: Option<&str>,
    ) -> Result<bool, FaceletError>;
}

/// How a client takes part in resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// Top of the stack; resolution stops after consulting it (`ui:decorate`)
    Push,
    /// Top of the stack; unresolved names continue to older clients (`ui:composition`)
    Extend,
    /// Bottom of the stack, consulted last (`ui:insert` default content)
    Fallback,
}

/// Handle returned by registration, required to remove the same entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientToken(u64);

#[derive(Debug, Clone)]
struct ClientEntry {
    token: ClientToken,
    mode: ClientMode,
    owner: Option<Arc<str>>,
    client: Arc<dyn TemplateClient>,
}

/// A client selected for a resolution attempt, with the fragment that registered it
#[derive(Debug, Clone)]
pub struct Candidate {
    pub token: ClientToken,
    pub client: Arc<dyn TemplateClient>,
    pub owner: Option<Arc<str>>,
}

/// Ordered template clients of one traversal; the last entry is the most recent
#[derive(Debug, Default)]
pub struct TemplateClientStack {
    entries: Vec<ClientEntry>,
    next_token: u64,
}

impl TemplateClientStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client that hides everything older than itself
    pub fn push(&mut self, client: Arc<dyn TemplateClient>, owner: Option<Arc<str>>) -> ClientToken {
        self.register(client, ClientMode::Push, owner)
    }

    /// Register a client layered over the older ones
    pub fn extend(
        &mut self,
        client: Arc<dyn TemplateClient>,
        owner: Option<Arc<str>>,
    ) -> ClientToken {
        self.register(client, ClientMode::Extend, owner)
    }

    /// Register a client below every other one
    pub fn push_fallback(
        &mut self,
        client: Arc<dyn TemplateClient>,
        owner: Option<Arc<str>>,
    ) -> ClientToken {
        self.register(client, ClientMode::Fallback, owner)
    }

    pub fn register(
        &mut self,
        client: Arc<dyn TemplateClient>,
        mode: ClientMode,
        owner: Option<Arc<str>>,
    ) -> ClientToken {
        let token = ClientToken(self.next_token);
        self.next_token += 1;
        let entry = ClientEntry {
            token,
            mode,
            owner,
            client,
        };
        match mode {
            ClientMode::Fallback => self.entries.insert(0, entry),
            ClientMode::Push | ClientMode::Extend => self.entries.push(entry),
        }
        token
    }

    /// Remove the entry registered under `token`; false if it is already gone
    pub fn pop(&mut self, token: ClientToken) -> bool {
        match self.entries.iter().rposition(|e| e.token == token) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clients to ask, in order, while `current` is the fragment being applied.
    ///
    /// Clients registered by `current` itself are skipped. The walk ends after
    /// the first consulted `Push` client.
    pub fn candidates(&self, current: Option<&str>) -> Vec<Candidate> {
        let mut out = Vec::new();
        for entry in self.entries.iter().rev() {
            let registered_here = matches!(
                (entry.owner.as_deref(), current),
                (Some(owner), Some(current)) if owner == current
            );
            if registered_here {
                continue;
            }
            out.push(Candidate {
                token: entry.token,
                client: entry.client.clone(),
                owner: entry.owner.clone(),
            });
            if entry.mode == ClientMode::Push {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl TemplateClient for Named {
        fn apply_client(
            &self,
            _ctx: &mut FaceletContext<'_>,
            _parent: &mut Component,
            _name: Option<&str>,
        ) -> Result<bool, FaceletError> {
            Ok(false)
        }
    }

    fn client(name: &'static str) -> Arc<dyn TemplateClient> {
        Arc::new(Named(name))
    }

    fn owner(path: &str) -> Option<Arc<str>> {
        Some(Arc::from(path))
    }

    fn names(candidates: &[Candidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| format!("{:?}", c.client))
            .collect()
    }

    #[test]
    fn test_candidates_most_recent_first() {
        let mut stack = TemplateClientStack::new();
        stack.extend(client("a"), owner("/p.view"));
        stack.extend(client("b"), owner("/t1.view"));

        let found = stack.candidates(Some("/t2.view"));
        assert_eq!(names(&found), vec!["Named(\"b\")", "Named(\"a\")"]);
    }

    #[test]
    fn test_push_stops_the_walk() {
        let mut stack = TemplateClientStack::new();
        stack.extend(client("outer"), owner("/p.view"));
        stack.push(client("decor"), owner("/t1.view"));

        let found = stack.candidates(Some("/t2.view"));
        assert_eq!(names(&found), vec!["Named(\"decor\")"]);
    }

    #[test]
    fn test_own_clients_are_skipped_and_not_boundaries() {
        let mut stack = TemplateClientStack::new();
        stack.extend(client("outer"), owner("/p.view"));
        stack.push(client("decor"), owner("/t1.view"));

        let found = stack.candidates(Some("/t1.view"));
        assert_eq!(names(&found), vec!["Named(\"outer\")"]);
    }

    #[test]
    fn test_fallback_goes_to_bottom() {
        let mut stack = TemplateClientStack::new();
        stack.extend(client("comp"), owner("/p.view"));
        stack.push_fallback(client("insert"), owner("/t.view"));

        let found = stack.candidates(None);
        assert_eq!(names(&found), vec!["Named(\"comp\")", "Named(\"insert\")"]);
    }

    #[test]
    fn test_pop_by_token() {
        let mut stack = TemplateClientStack::new();
        let a = stack.extend(client("a"), None);
        let b = stack.push_fallback(client("b"), None);
        assert_eq!(stack.len(), 2);

        assert!(stack.pop(b));
        assert!(!stack.pop(b));
        assert!(stack.pop(a));
        assert!(stack.is_empty());
    }
}
