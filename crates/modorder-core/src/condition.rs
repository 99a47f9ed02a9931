//! Activation conditions: boolean formulas over "module X is active".
//!
//! Loaders may hand over a structured [`ConditionExpr`] or the raw text found
//! in a descriptor, e.g. `ifhas('2701251094') & !ifhas("Old Patch")`. Text is
//! parsed with a small recursive-descent parser:
//!
//! ```text
//! or    := and (('|' | '||') and)*
//! and   := unary (('&' | '&&') unary)*
//! unary := '!' unary | '(' or ')' | 'ifhas(' ident ')'
//! ident := quoted string with '\' escapes | bare text up to ')'
//! ```
//!
//! Text that does not parse is kept as [`Condition::Unparsed`]; evaluating it
//! fails with a [`ConditionSyntaxError`] every time instead of silently
//! passing.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nesting depth past which a condition is rejected.
pub const MAX_NESTING: usize = 64;

const HAS_KEYWORD: &str = "ifhas";

/// Snapshot of active module identifiers a condition is evaluated against.
pub trait ActiveSet {
    fn contains_id(&self, id: &str) -> bool;
}

impl<S: BuildHasher> ActiveSet for HashSet<String, S> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl<S: BuildHasher> ActiveSet for HashSet<&str, S> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl ActiveSet for BTreeSet<String> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// A malformed condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid condition '{source_text}' at offset {position}: {reason}")]
pub struct ConditionSyntaxError {
    pub source_text: String,
    pub position: usize,
    pub reason: String,
}

/// A parsed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionExpr {
    /// True when the module with this identifier is active.
    Active(String),
    Not(Box<ConditionExpr>),
    And(Vec<ConditionExpr>),
    Or(Vec<ConditionExpr>),
}

impl ConditionExpr {
    pub fn active(id: impl Into<String>) -> Self {
        Self::Active(id.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: ConditionExpr) -> Self {
        Self::Not(Box::new(expr))
    }

    /// Evaluate against the given active set. Pure; an empty `And` is true
    /// and an empty `Or` is false.
    pub fn evaluate<A: ActiveSet + ?Sized>(&self, active: &A) -> bool {
        match self {
            Self::Active(id) => active.contains_id(id),
            Self::Not(inner) => !inner.evaluate(active),
            Self::And(items) => items.iter().all(|e| e.evaluate(active)),
            Self::Or(items) => items.iter().any(|e| e.evaluate(active)),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active(id) => {
                write!(f, "{HAS_KEYWORD}('")?;
                for ch in id.chars() {
                    if matches!(ch, '\'' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                f.write_str("')")
            }
            Self::Not(inner) if inner.is_compound() => write!(f, "!({inner})"),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::And(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    if matches!(item, Self::Or(_)) {
                        write!(f, "({item})")?;
                    } else {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Self::Or(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// The condition attached to a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Expr(ConditionExpr),
    /// Source text that failed to parse.
    Unparsed(String),
}

impl Condition {
    /// Shorthand for `ifhas(id)`.
    pub fn has(id: impl Into<String>) -> Self {
        Self::Expr(ConditionExpr::active(id))
    }

    /// Parse condition text, failing on malformed input.
    pub fn parse(source: &str) -> Result<Self, ConditionSyntaxError> {
        Parser::new(source).parse().map(Self::Expr)
    }

    /// Parse condition text, keeping malformed input as [`Condition::Unparsed`]
    /// so the error can be reported against the owning module later.
    pub fn from_source(source: &str) -> Self {
        match Self::parse(source) {
            Ok(cond) => cond,
            Err(e) => {
                tracing::debug!("{e}");
                Self::Unparsed(source.to_string())
            }
        }
    }

    pub fn evaluate<A: ActiveSet + ?Sized>(&self, active: &A) -> Result<bool, ConditionSyntaxError> {
        match self {
            Self::Expr(expr) => Ok(expr.evaluate(active)),
            Self::Unparsed(source) => Parser::new(source).parse().map(|e| e.evaluate(active)),
        }
    }
}

impl From<ConditionExpr> for Condition {
    fn from(expr: ConditionExpr) -> Self {
        Self::Expr(expr)
    }
}

impl From<String> for Condition {
    fn from(source: String) -> Self {
        Self::from_source(&source)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(expr) => write!(f, "{expr}"),
            Self::Unparsed(source) => f.write_str(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Has(String),
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<ConditionExpr, ConditionSyntaxError> {
        self.tokens = self.tokenize()?;
        if self.tokens.is_empty() {
            return Err(self.error_at(0, "empty condition"));
        }
        let expr = self.parse_or()?;
        if let Some((offset, token)) = self.tokens.get(self.pos) {
            return Err(self.error_at(*offset, &format!("unexpected {token:?}")));
        }
        Ok(expr)
    }

    fn error_at(&self, position: usize, reason: &str) -> ConditionSyntaxError {
        ConditionSyntaxError {
            source_text: self.source.to_string(),
            position,
            reason: reason.to_string(),
        }
    }

    fn tokenize(&self) -> Result<Vec<(usize, Token)>, ConditionSyntaxError> {
        let bytes = self.source.as_bytes();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b'(' => {
                    tokens.push((i, Token::LParen));
                    i += 1;
                }
                b')' => {
                    tokens.push((i, Token::RParen));
                    i += 1;
                }
                b'!' => {
                    tokens.push((i, Token::Not));
                    i += 1;
                }
                b'&' | b'|' => {
                    let token = if c == b'&' { Token::And } else { Token::Or };
                    tokens.push((i, token));
                    i += if bytes.get(i + 1) == Some(&c) { 2 } else { 1 };
                }
                _ if self.source[i..].starts_with(HAS_KEYWORD) => {
                    let start = i;
                    i += HAS_KEYWORD.len();
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    if bytes.get(i) != Some(&b'(') {
                        return Err(self.error_at(i, "expected '(' after ifhas"));
                    }
                    let (id, next) = self.scan_argument(i + 1, start)?;
                    tokens.push((start, Token::Has(id)));
                    i = next;
                }
                _ => {
                    let ch = self.source[i..].chars().next().unwrap_or('?');
                    return Err(self.error_at(i, &format!("unexpected character '{ch}'")));
                }
            }
        }
        Ok(tokens)
    }

    /// Read the argument of `ifhas(` starting at `arg_start`, returning the
    /// identifier and the offset just past the closing parenthesis.
    ///
    /// A quoted argument runs to its matching quote and may contain `)`;
    /// a backslash escapes the next character. A bare argument runs to the
    /// first `)` and is trimmed.
    fn scan_argument(
        &self,
        arg_start: usize,
        keyword_at: usize,
    ) -> Result<(String, usize), ConditionSyntaxError> {
        let rest = &self.source[arg_start..];
        let body = rest.trim_start();
        let body_at = arg_start + (rest.len() - body.len());

        let (id, next) = match body.chars().next() {
            Some(quote @ ('\'' | '"')) => {
                let mut id = String::new();
                let mut escaped = false;
                let mut end = None;
                for (at, ch) in body.char_indices().skip(1) {
                    if escaped {
                        id.push(ch);
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == quote {
                        end = Some(at + ch.len_utf8());
                        break;
                    } else {
                        id.push(ch);
                    }
                }
                let Some(end) = end else {
                    return Err(self.error_at(body_at, "unterminated quoted identifier"));
                };
                let tail = &body[end..];
                let close_at = body_at + end + (tail.len() - tail.trim_start().len());
                if self.source.as_bytes().get(close_at) != Some(&b')') {
                    return Err(self.error_at(close_at, "expected ')' after identifier"));
                }
                (id, close_at + 1)
            }
            _ => {
                let Some(close) = rest.find(')') else {
                    return Err(self.error_at(keyword_at, "unterminated ifhas("));
                };
                (rest[..close].trim().to_string(), arg_start + close + 1)
            }
        };
        if id.is_empty() {
            return Err(self.error_at(arg_start, "empty module identifier"));
        }
        Ok((id, next))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.source.len())
    }

    fn parse_or(&mut self) -> Result<ConditionExpr, ConditionSyntaxError> {
        let mut items = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            items.push(self.parse_and()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            ConditionExpr::Or(items)
        })
    }

    fn parse_and(&mut self) -> Result<ConditionExpr, ConditionSyntaxError> {
        let mut items = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            items.push(self.parse_unary()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            ConditionExpr::And(items)
        })
    }

    fn parse_unary(&mut self) -> Result<ConditionExpr, ConditionSyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error_at(self.offset(), "condition nested too deeply"));
        }
        let offset = self.offset();
        let expr = match self.tokens.get(self.pos).map(|(_, t)| t.clone()) {
            Some(Token::Not) => {
                self.pos += 1;
                ConditionExpr::not(self.parse_unary()?)
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(self.error_at(self.offset(), "expected ')'"));
                }
                self.pos += 1;
                inner
            }
            Some(Token::Has(id)) => {
                self.pos += 1;
                ConditionExpr::Active(id)
            }
            Some(token) => return Err(self.error_at(offset, &format!("unexpected {token:?}"))),
            None => return Err(self.error_at(offset, "unexpected end of condition")),
        };
        self.depth -= 1;
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_single_predicate() {
        let cond = Condition::parse("ifhas('123')").unwrap();
        assert_eq!(cond, Condition::has("123"));
    }

    #[test]
    fn accepts_quote_styles_and_whitespace() {
        let a = Condition::parse(" ifhas ( \"Some Mod\" ) ").unwrap();
        let b = Condition::parse("ifhas(Some Mod)").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Condition::has("Some Mod"));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let cond = Condition::parse("ifhas(a) | ifhas(b) & ifhas(c)").unwrap();
        assert!(cond.evaluate(&active(&["a"])).unwrap());
        assert!(!cond.evaluate(&active(&["b"])).unwrap());
        assert!(cond.evaluate(&active(&["b", "c"])).unwrap());
    }

    #[test]
    fn grouping_overrides_precedence() {
        let cond = Condition::parse("(ifhas(a) | ifhas(b)) & ifhas(c)").unwrap();
        assert!(!cond.evaluate(&active(&["a"])).unwrap());
        assert!(cond.evaluate(&active(&["a", "c"])).unwrap());
    }

    #[test]
    fn negation() {
        let cond = Condition::parse("!ifhas(a) && !(ifhas(b) || ifhas(c))").unwrap();
        assert!(cond.evaluate(&active(&[])).unwrap());
        assert!(!cond.evaluate(&active(&["a"])).unwrap());
        assert!(!cond.evaluate(&active(&["c"])).unwrap());
    }

    #[test]
    fn malformed_text_is_kept_and_fails_on_evaluate() {
        let cond = Condition::from_source("ifhas(a) &");
        assert!(matches!(cond, Condition::Unparsed(_)));
        let err = cond.evaluate(&active(&["a"])).unwrap_err();
        assert_eq!(err.source_text, "ifhas(a) &");
        assert!(err.reason.contains("end of condition"), "got: {err}");
    }

    #[test]
    fn rejects_unknown_predicate() {
        let err = Condition::parse("ifmissing(a)").unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(Condition::parse("(ifhas(a)").is_err());
        assert!(Condition::parse("ifhas(a))").is_err());
        assert!(Condition::parse("").is_err());
        assert!(Condition::parse("ifhas()").is_err());
    }

    #[test]
    fn rejects_excessive_nesting() {
        let src = format!("{}ifhas(a){}", "(".repeat(100), ")".repeat(100));
        let err = Condition::parse(&src).unwrap_err();
        assert!(err.reason.contains("nested"), "got: {err}");
    }

    #[test]
    fn display_round_trips_through_parser() {
        let src = "!ifhas('a') & (ifhas('b') | ifhas('c'))";
        let cond = Condition::parse(src).unwrap();
        assert_eq!(cond.to_string(), src);
        assert_eq!(Condition::parse(&cond.to_string()).unwrap(), cond);
    }

    #[test]
    fn empty_connectives() {
        let set = active(&[]);
        assert!(ConditionExpr::And(vec![]).evaluate(&set));
        assert!(!ConditionExpr::Or(vec![]).evaluate(&set));
    }

    #[test]
    fn quoted_identifiers_survive_display() {
        for id in ["a)b", "it's", "back\\slash", "(x)"] {
            let cond = Condition::has(id);
            let text = cond.to_string();
            assert_eq!(Condition::parse(&text).unwrap(), cond, "via {text}");
        }
        assert_eq!(Condition::has("a)b").to_string(), "ifhas('a)b')");
        assert_eq!(Condition::has("it's").to_string(), "ifhas('it\\'s')");
    }

    #[test]
    fn quoted_identifier_errors() {
        let err = Condition::parse("ifhas('abc)").unwrap_err();
        assert!(err.reason.contains("unterminated"), "got: {err}");
        let err = Condition::parse("ifhas('a' b)").unwrap_err();
        assert!(err.reason.contains("expected ')'"), "got: {err}");
        assert!(Condition::parse("ifhas('')").is_err());
    }
}
