//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse view markup into an AST
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Basic token parsers
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let string_literal = select! {
        Token::String(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    // `ui:insert` or `div`
    let qname = identifier
        .clone()
        .then(just(Token::Colon).ignore_then(identifier.clone()).or_not())
        .map_with(|(first, second), e| {
            let name = match second {
                Some(local) => QName {
                    prefix: Some(first.node),
                    local: local.node,
                },
                None => QName {
                    prefix: None,
                    local: first.node,
                },
            };
            Spanned::new(name, span_range(&e.span()))
        });

    let attribute = identifier
        .clone()
        .then_ignore(just(Token::Colon))
        .then(string_literal.clone())
        .map(|(name, value)| Attribute { name, value });

    let attribute_block = attribute
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose));

    // Recursive node parser
    let node = recursive(|node| {
        let element = qname
            .clone()
            .then(attribute_block.clone().or_not())
            .then(
                node.clone()
                    .repeated()
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
                    .or_not(),
            )
            .map(|((name, attributes), children)| {
                Node::Element(Element {
                    name,
                    attributes: attributes.unwrap_or_default(),
                    children: children.unwrap_or_default(),
                })
            });

        let text = string_literal.clone().map(|s| Node::Text(s.node));

        choice((element, text))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    // Document is a list of nodes
    node.repeated()
        .collect()
        .then_ignore(end())
        .map(|nodes| Document { nodes })
}
