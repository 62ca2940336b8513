//! Parsing of `#{...}` value expressions

use chumsky::error::RichReason;
use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use logos::{Lexer, Logos};
use serde_json::Value;
use thiserror::Error;

use super::lexer::{describe, ExprToken, Piece};

/// Errors raised while parsing or evaluating an expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    /// The expression body could not be parsed
    #[error("malformed expression '{expression}': {message}")]
    Syntax { expression: String, message: String },

    /// `#{` without a closing brace
    #[error("unterminated expression in '{expression}'")]
    Unterminated { expression: String },

    /// Property access on a value that has no properties
    #[error("cannot read '{property}' of a {kind} value in '{expression}'")]
    PropertyNotFound {
        expression: String,
        property: String,
        kind: &'static str,
    },
}

/// Step applied to a value: `.name`, `['name']` or `[0]`
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    Property(String),
    Index(usize),
}

impl std::fmt::Display for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accessor::Property(name) => write!(f, "{}", name),
            Accessor::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Body of a single `#{...}`
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Variable lookup followed by accessors
    Path {
        root: String,
        accessors: Vec<Accessor>,
    },
    /// Quoted string, number, boolean or null
    Literal(Value),
}

/// Piece of an attribute value or text node
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Eval(Operand),
}

/// A parsed attribute value: literal text mixed with expressions
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpression {
    source: String,
    segments: Vec<Segment>,
}

impl ValueExpression {
    /// Parse `source`, splitting literal text from `#{...}`/`${...}` bodies
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut outer = Piece::lexer(source);

        while let Some(piece) = outer.next() {
            match piece {
                Ok(Piece::Open) => {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    let mut body = outer.morph::<ExprToken>();
                    segments.push(Segment::Eval(parse_body(&mut body, source)?));
                    outer = body.morph();
                }
                Ok(Piece::Text | Piece::Sigil) | Err(()) => text.push_str(outer.slice()),
            }
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Expression that always yields `text`
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Text(text.clone())]
        };
        Self {
            source: text,
            segments,
        }
    }

    /// True when no part of the value needs evaluation
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Text(_)))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl std::fmt::Display for ValueExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Lex one expression body up to its closing brace and parse it
fn parse_body(body: &mut Lexer<'_, ExprToken>, source: &str) -> Result<Operand, ExpressionError> {
    let mut tokens = Vec::new();
    let close = loop {
        match body.next() {
            Some(Ok(ExprToken::BraceClose)) => break body.span().start,
            Some(Ok(token)) => tokens.push((token, SimpleSpan::from(body.span()))),
            Some(Err(())) => {
                return Err(ExpressionError::Syntax {
                    expression: source.to_string(),
                    message: format!("unexpected character '{}'", body.slice()),
                })
            }
            None => {
                return Err(ExpressionError::Unterminated {
                    expression: source.to_string(),
                })
            }
        }
    };

    let token_stream = Stream::from_iter(tokens).map((close..close).into(), |(t, s): (_, _)| (t, s));

    operand_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| syntax_error(source, errs.into_iter().next()))
}

fn operand_parser<'a, I>() -> impl Parser<'a, I, Operand, extra::Err<Rich<'a, ExprToken>>> + Clone
where
    I: ValueInput<'a, Token = ExprToken, Span = SimpleSpan>,
{
    let literal = select! {
        ExprToken::Str(s) => Value::String(s),
        ExprToken::Integer(i) => Value::from(i),
        ExprToken::Float(n) => Value::Number(n),
        ExprToken::True => Value::Bool(true),
        ExprToken::False => Value::Bool(false),
        ExprToken::Null => Value::Null,
    }
    .map(Operand::Literal);

    // Keywords are ordinary names after a dot: `#{flags.null}`
    let property_name = select! {
        ExprToken::Ident(s) => s,
        ExprToken::True => "true".to_string(),
        ExprToken::False => "false".to_string(),
        ExprToken::Null => "null".to_string(),
    };

    let dotted = just(ExprToken::Dot)
        .ignore_then(property_name)
        .map(Accessor::Property);

    let index = select! { ExprToken::Integer(i) => i }.try_map(|i, span| {
        usize::try_from(i)
            .map(Accessor::Index)
            .map_err(|_| Rich::custom(span, "index must not be negative"))
    });
    let key = select! { ExprToken::Str(s) => Accessor::Property(s) };
    let bracketed = key
        .or(index)
        .delimited_by(just(ExprToken::BracketOpen), just(ExprToken::BracketClose));

    let path = select! { ExprToken::Ident(s) => s }
        .then(dotted.or(bracketed).repeated().collect::<Vec<_>>())
        .map(|(root, accessors)| Operand::Path { root, accessors });

    choice((literal, path)).then_ignore(end())
}

fn syntax_error(source: &str, err: Option<Rich<'_, ExprToken>>) -> ExpressionError {
    let message = match err.as_ref().map(|e| e.reason()) {
        Some(RichReason::ExpectedFound { found: Some(tok), .. }) => {
            format!("unexpected {}", describe(tok))
        }
        Some(RichReason::ExpectedFound { found: None, .. }) => "unexpected end of expression".to_string(),
        Some(RichReason::Custom(msg)) => msg.to_string(),
        None => "invalid expression".to_string(),
    };
    ExpressionError::Syntax {
        expression: source.to_string(),
        message,
    }
}
