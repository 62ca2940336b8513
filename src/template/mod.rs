//! Template clients and named slots
//!
//! A composition or decoration tag registers a [`TemplateClient`] on the
//! traversal's [`TemplateClientStack`] while its template is processed. Each
//! `ui:insert` in that template asks the stack to fill its slot; the stack asks
//! clients from the most recently registered down until one of them answers.
//!
//! # Example
//!
//! ```text
//! // page.view
//! ui:composition [template: "/layout.view"] {
//!     ui:define [name: "title"] { "Welcome" }
//! }
//!
//! // layout.view
//! h1 { ui:insert [name: "title"] { "Untitled" } }
//! ```

mod client;
mod registry;

pub use client::{Candidate, ClientMode, ClientToken, TemplateClient, TemplateClientStack};
pub use registry::{DefinitionClient, SlotRegistry};
