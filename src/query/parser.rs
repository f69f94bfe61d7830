//! Recursive-descent parser for boolean queries.
//!
//! Grammar, with OR binding loosest and both operators
//! left-associative:
//!
//! ```text
//! expression := orOperand ( '|' orOperand )*
//! orOperand  := andOperand ( '&' andOperand )*
//! andOperand := '(' expression ')' | LITERAL
//! ```
//!
//! [`tree`] accepts an empty token stream (yielding an empty tree) and
//! otherwise requires exactly one expression followed by end of input.

use thiserror::Error;

use super::lexer::Token;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn literal(q: &str) -> Expr {
        Expr::Literal(q.to_owned())
    }
}

/// A token appeared where the grammar required something else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {}, found {found}", .expected.join(" or "))]
pub struct SyntaxError {
    pub expected: Vec<&'static str>,
    pub found: Token,
}

/// A [`SyntaxError`] wrapped with the full token stream and how far
/// parsing advanced before failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("when parsing {}, after {}: {source}", render(.tokens), consumed(.tokens, .remaining))]
pub struct ParseError {
    pub tokens: Vec<Token>,
    pub remaining: Vec<Token>,
    #[source]
    pub source: SyntaxError,
}

fn render(tokens: &[Token]) -> String {
    let words: Vec<String> = tokens
        .iter()
        .filter(|t| **t != Token::Eof)
        .map(ToString::to_string)
        .collect();
    words.join(" ")
}

/// The token prefix that parsed cleanly before the failure.
fn consumed(tokens: &[Token], remaining: &[Token]) -> String {
    render(&tokens[..tokens.len() - remaining.len()])
}

struct Failure<'a> {
    err: SyntaxError,
    rest: &'a [Token],
}

impl<'a> Failure<'a> {
    fn new(expected: Vec<&'static str>, rest: &'a [Token]) -> Self {
        let found = rest.first().cloned().unwrap_or(Token::Eof);
        Failure {
            err: SyntaxError { expected, found },
            rest,
        }
    }
}

type Parsed<'a> = Result<(Expr, &'a [Token]), Failure<'a>>;

/// Parse a full token stream into an expression tree.
///
/// An empty stream (or a lone EOF) yields `Ok(None)`. Anything left
/// over after one expression is a syntax error.
pub fn tree(tokens: &[Token]) -> Result<Option<Expr>, ParseError> {
    if matches!(tokens, [] | [Token::Eof]) {
        return Ok(None);
    }

    let wrap = |f: Failure<'_>| ParseError {
        tokens: tokens.to_vec(),
        remaining: f.rest.to_vec(),
        source: f.err,
    };

    let (expr, rest) = expression(tokens).map_err(wrap)?;
    match rest.first() {
        Some(Token::Eof) => Ok(Some(expr)),
        _ => Err(wrap(Failure::new(vec!["operator"], rest))),
    }
}

fn expression(tokens: &[Token]) -> Parsed<'_> {
    let (mut expr, mut rest) = or_operand(tokens)?;
    while rest.first() == Some(&Token::Or) {
        match or_operand(&rest[1..]) {
            Ok((rhs, rem)) => {
                expr = Expr::or(expr, rhs);
                rest = rem;
            }
            // report the remainder from the operator onward
            Err(f) => return Err(Failure { err: f.err, rest }),
        }
    }
    Ok((expr, rest))
}

fn or_operand(tokens: &[Token]) -> Parsed<'_> {
    let (mut expr, mut rest) = and_operand(tokens)?;
    while rest.first() == Some(&Token::And) {
        match and_operand(&rest[1..]) {
            Ok((rhs, rem)) => {
                expr = Expr::and(expr, rhs);
                rest = rem;
            }
            Err(f) => return Err(Failure { err: f.err, rest }),
        }
    }
    Ok((expr, rest))
}

fn and_operand(tokens: &[Token]) -> Parsed<'_> {
    match tokens.first() {
        Some(Token::LParen) => {
            let (expr, rest) = expression(&tokens[1..])?;
            match rest.first() {
                Some(Token::RParen) => Ok((expr, &rest[1..])),
                _ => Err(Failure::new(vec!["closing parenthesis", "operator"], rest)),
            }
        }
        Some(Token::Literal(q)) => Ok((Expr::Literal(q.clone()), &tokens[1..])),
        _ => Err(Failure::new(vec!["expression"], tokens)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::lexer::tokenize;

    fn lit(q: &str) -> Expr {
        Expr::literal(q)
    }

    #[test]
    fn empty_input_is_an_empty_tree() {
        assert_eq!(tree(&[]).unwrap(), None);
        assert_eq!(tree(&[Token::Eof]).unwrap(), None);
    }

    #[test]
    fn single_literal() {
        assert_eq!(tree(&tokenize("alice")).unwrap(), Some(lit("alice")));
        assert_eq!(tree(&tokenize("alice:*")).unwrap(), Some(lit("alice:*")));
    }

    #[test]
    fn and_is_left_associative() {
        let got = tree(&tokenize("alice & bob & eve & filippa")).unwrap();
        let want = Expr::and(
            Expr::and(Expr::and(lit("alice"), lit("bob")), lit("eve")),
            lit("filippa"),
        );
        assert_eq!(got, Some(want));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let got = tree(&tokenize("alice | bob & eve | filippa")).unwrap();
        let want = Expr::or(
            Expr::or(lit("alice"), Expr::and(lit("bob"), lit("eve"))),
            lit("filippa"),
        );
        assert_eq!(got, Some(want));
    }

    #[test]
    fn parentheses_override_precedence() {
        let got = tree(&tokenize("(alice | bob) & eve")).unwrap();
        let want = Expr::and(Expr::or(lit("alice"), lit("bob")), lit("eve"));
        assert_eq!(got, Some(want));

        let got = tree(&tokenize("alice | (bob | (eve | filippa))")).unwrap();
        let want = Expr::or(
            lit("alice"),
            Expr::or(lit("bob"), Expr::or(lit("eve"), lit("filippa"))),
        );
        assert_eq!(got, Some(want));
    }

    #[test]
    fn missing_operand_after_operator() {
        let err = tree(&tokenize("alice &")).unwrap_err();
        assert!(err.source.expected.contains(&"expression"));
        assert_eq!(err.source.found, Token::Eof);
        assert_eq!(err.remaining, vec![Token::And, Token::Eof]);
    }

    #[test]
    fn missing_operator_between_literals() {
        let err = tree(&tokenize("alice bob")).unwrap_err();
        assert!(err.source.expected.contains(&"operator"));
        assert_eq!(err.remaining, vec![Token::literal("bob"), Token::Eof]);
    }

    #[test]
    fn unclosed_parenthesis() {
        let err = tree(&tokenize("(alice & bob")).unwrap_err();
        assert!(err.source.expected.contains(&"closing parenthesis"));
        assert_eq!(err.source.found, Token::Eof);
    }

    #[test]
    fn double_operator() {
        let err = tree(&tokenize("(alice & & bob)")).unwrap_err();
        assert!(err.source.expected.contains(&"expression"));
        assert_eq!(err.source.found, Token::And);
    }

    #[test]
    fn dangling_close_paren() {
        let err = tree(&tokenize(") & bob")).unwrap_err();
        assert!(err.source.expected.contains(&"expression"));
        assert_eq!(err.source.found, Token::RParen);
    }

    #[test]
    fn parse_error_display_names_the_failure_point() {
        let err = tree(&tokenize("alice &")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("when parsing alice &"), "{msg}");
        assert!(msg.contains("after alice"), "{msg}");
        assert!(msg.contains("expected expression"), "{msg}");
    }
}
