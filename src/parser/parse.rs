//! Parser state, entry points, and error type
//!
//! The parser owns the lexing cursor, a two-slot token pushback stack, the
//! active type-name-starter set, and the node arena. On success the arena
//! moves into the returned [`ExprTree`]; on any failure it is dropped before
//! the error is returned, so a failed parse never leaks a partial tree.

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::parser::ast::{ExprNode, ExprTree, NodeId};
use crate::parser::lexer::{LexBuf, Token, TokenKind};

/// All user-facing parse failures; each renders as a single-line diagnostic.
///
/// Lexical problems surface here as [`ParseError::BogusToken`] because the
/// lexer reports malformed input through a token, not an error channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Bogus token '{0}'")]
    BogusToken(String),
    #[error("Unexpected {0}")]
    Unexpected(&'static str),
    #[error("Unexpected {0} at end of input")]
    TrailingInput(&'static str),
    #[error("Unexpected {0} while parsing function call")]
    UnexpectedInCall(&'static str),
    #[error("Missing ) parsing parenthesized expression")]
    MissingCloseParen,
    #[error("Missing ) while parsing function call")]
    MissingCallParen,
    #[error("Missing ) in sizeof")]
    MissingSizeofParen,
    #[error("Missing ) in (assumed) typecast")]
    MissingCastParen,
    #[error("Missing ] at end of input")]
    MissingBracketAtEnd,
    #[error("Missing ]")]
    MissingBracket,
    #[error("Missing : in ?: ternary op (found {0})")]
    MissingColon(&'static str),
    #[error("Expected identifier before {0} token")]
    ExpectedIdentifier(&'static str),
    #[error("Expression nested too deeply")]
    TooDeeplyNested,
}

/// At most two tokens may ever be pushed back (the typecast heuristic needs
/// both of its peeked tokens returned). Overflow is a parser defect, not bad
/// input.
const PUSHBACK_BUF_SIZE: usize = 2;

/// Grammar recursion bound; past this the parser reports a structural error
/// instead of risking stack exhaustion.
const MAX_NESTING_DEPTH: usize = 256;

/// First words of C's built-in type names, used by the cast heuristic.
const BUILTIN_TYPENAME_STARTERS: &[&str] = &[
    "bool", "char", "double", "float", "int", "long", "off_t", "ptrdiff_t", "signed", "short",
    "size_t", "struct", "time_t", "unsigned",
];

/// Recursive descent parser for C expressions.
///
/// Private to one parse call; every public entry point constructs a fresh
/// parser, so concurrent parses share nothing but the lexer's operator trie.
pub struct Parser {
    lexer: LexBuf,
    push_back: [Option<Token>; PUSHBACK_BUF_SIZE],
    typename_starters: FxHashSet<String>,
    nodes: Vec<ExprNode>,
    depth: usize,
}

impl Parser {
    /// Create a parser over `expr`. `typenames` extends the built-in
    /// type-name-starter set and only affects cast disambiguation.
    pub fn new(expr: &str, typenames: &[&str]) -> Self {
        let mut typename_starters: FxHashSet<String> = BUILTIN_TYPENAME_STARTERS
            .iter()
            .map(|s| s.to_string())
            .collect();
        typename_starters.extend(typenames.iter().map(|s| s.to_string()));

        Parser {
            lexer: LexBuf::new(expr),
            push_back: [None, None],
            typename_starters,
            nodes: Vec::new(),
            depth: 0,
        }
    }

    /// Parse one complete expression and hand the tree (with its arena) to
    /// the caller. Trailing tokens after the expression are an error.
    pub fn run(mut self) -> Result<ExprTree, ParseError> {
        let first = self.next_token();
        if first.kind == TokenKind::EndOfExpression {
            return Err(ParseError::EmptyExpression);
        }
        self.push_back(first);

        let root = self.parse_comma()?;

        let tok = self.next_token();
        if tok.kind != TokenKind::EndOfExpression {
            return Err(ParseError::TrailingInput(tok.kind.name()));
        }
        Ok(ExprTree::new(self.nodes, root))
    }

    /// Next token, draining the pushback stack newest-first before touching
    /// the lexer.
    pub(crate) fn next_token(&mut self) -> Token {
        for slot in self.push_back.iter_mut().rev() {
            if let Some(tok) = slot.take() {
                return tok;
            }
        }
        self.lexer.next_token()
    }

    /// Like [`next_token`](Self::next_token) but turns a malformed token
    /// into the terminal diagnostic for this parse.
    pub(crate) fn next_checked(&mut self) -> Result<Token, ParseError> {
        let tok = self.next_token();
        if tok.kind == TokenKind::Bogus {
            return Err(ParseError::BogusToken(tok.text.unwrap_or_default()));
        }
        Ok(tok)
    }

    /// Return a token to the stream. Panics on overflow: only an internal
    /// logic defect can push more than two tokens, and continuing would run
    /// on corrupted state.
    pub(crate) fn push_back(&mut self, tok: Token) {
        for slot in self.push_back.iter_mut() {
            if slot.is_none() {
                *slot = Some(tok);
                return;
            }
        }
        panic!("parser bug: pushed back too many tokens");
    }

    pub(crate) fn add(&mut self, node: ExprNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Run `f` one nesting level deeper, failing once the bound is hit.
    /// Every recursive grammar production goes through here, so only the
    /// bounded depth ever reaches the call stack; flat chains of any length
    /// iterate instead.
    pub(crate) fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeeplyNested);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Whether `tok` is an identifier that can open a type name.
    pub(crate) fn is_typename_first_word(&self, tok: &Token) -> bool {
        tok.kind == TokenKind::LiteralOrId
            && tok
                .text
                .as_deref()
                .is_some_and(|text| self.typename_starters.contains(text))
    }
}

/// Parse `expr` with only the built-in type names active.
pub fn parse(expr: &str) -> Result<ExprTree, ParseError> {
    parse_with_typenames(expr, &[])
}

/// Parse `expr`, treating each name in `typenames` as a possible first word
/// of a type for cast disambiguation.
pub fn parse_with_typenames(expr: &str, typenames: &[&str]) -> Result<ExprTree, ParseError> {
    let result = Parser::new(expr, typenames).run();
    match &result {
        Ok(tree) => debug!(nodes = tree.len(), "parse succeeded"),
        Err(err) => debug!(%err, "parse failed"),
    }
    result
}
