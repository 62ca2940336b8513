//! Error types for building views

use thiserror::Error;

use crate::el::ExpressionError;
use crate::tag::Location;
use crate::ParseError;

/// Errors that can occur while compiling or applying view fragments
#[derive(Debug, Error)]
pub enum FaceletError {
    /// A required attribute is absent
    #[error("<{tag}> at {location}: missing required attribute '{attribute}'")]
    MissingAttribute {
        tag: String,
        attribute: String,
        location: Location,
    },

    /// An attribute that must be plain text contains an expression
    #[error("<{tag}> at {location}: attribute '{attribute}' must be a literal")]
    NonLiteralAttribute {
        tag: String,
        attribute: String,
        location: Location,
    },

    /// An attribute evaluated to an unusable value
    #[error("<{tag}> at {location}: invalid '{attribute}': {reason}")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        location: Location,
        reason: String,
    },

    /// A `ui:` tag this library does not provide
    #[error("unknown tag <{tag}> at {location}")]
    UnknownTag { tag: String, location: Location },

    /// No fragment exists at the resolved path
    #[error("fragment not found: {path}")]
    ResourceNotFound { path: String },

    /// The fragment source failed to parse
    #[error("malformed template {path}: {}", format_parse_errors(.errors))]
    MalformedTemplate {
        path: String,
        source_text: String,
        errors: Vec<ParseError>,
    },

    /// The fragment source could not be read
    #[error("error reading fragment {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A fragment includes itself, directly or through other fragments
    #[error("recursive include detected: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    /// Expression parsing or evaluation failed
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

impl FaceletError {
    /// Render parse diagnostics with source context, or the plain message
    pub fn report(&self) -> String {
        match self {
            FaceletError::MalformedTemplate {
                path,
                source_text,
                errors,
            } => errors
                .iter()
                .map(|e| e.format(source_text, path))
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
