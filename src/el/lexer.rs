//! Lexers for text with embedded expressions

use logos::Logos;
use serde_json::Number;

/// Top level of an attribute value or text node
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Piece {
    /// `#{` or `${`, switching to [`ExprToken`]
    #[regex(r"[#$]\{")]
    Open,

    #[regex(r"[^#$]+")]
    Text,

    /// `#` or `$` not followed by a brace
    #[regex(r"[#$]")]
    Sigil,
}

/// Tokens inside `#{...}`
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum ExprToken {
    #[token(".")]
    Dot,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    /// Ends the expression
    #[token("}")]
    BraceClose,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| {
        lex.slice().parse::<f64>().ok().and_then(Number::from_f64)
    })]
    Float(Number),

    #[regex(r#"'[^']*'"#, |lex| unquote(lex.slice()))]
    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    Str(String),
}

fn unquote(quoted: &str) -> String {
    quoted[1..quoted.len() - 1].to_string()
}

/// Human-readable token name for error messages
pub fn describe(token: &ExprToken) -> String {
    match token {
        ExprToken::Dot => "'.'".to_string(),
        ExprToken::BracketOpen => "'['".to_string(),
        ExprToken::BracketClose => "']'".to_string(),
        ExprToken::BraceClose => "'}'".to_string(),
        ExprToken::True => "'true'".to_string(),
        ExprToken::False => "'false'".to_string(),
        ExprToken::Null => "'null'".to_string(),
        ExprToken::Ident(s) => format!("name '{}'", s),
        ExprToken::Integer(i) => format!("number {}", i),
        ExprToken::Float(n) => format!("number {}", n),
        ExprToken::Str(s) => format!("string '{}'", s),
    }
}
