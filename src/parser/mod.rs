//! C expression parser
//!
//! Transforms an expression string into an arena-backed AST:
//! - [`lexer`]: tokenization (source text → tokens, pulled lazily)
//! - [`parse`]: parser state, entry points, and the error type
//! - [`expressions`]: the precedence grammar itself
//! - [`ast`]: node definitions and canonical serialization
//!
//! Hand-written recursive descent with a two-token pushback stack; the only
//! lookahead beyond one token is the typecast heuristic's extra peek.

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod parse;

pub use ast::{ExprNode, ExprTree, NodeId, PostfixOp, UnaryOp};
pub use lexer::{LexBuf, Token, TokenKind};
pub use parse::{parse, parse_with_typenames, ParseError, Parser};
