//! # Introduction
//!
//! exprtree parses a single C expression, lays the resulting tree out with a
//! linear-time tidy-tree algorithm, and renders the drawing as SVG.
//!
//! ## Pipeline
//!
//! ```text
//! Expression → Lexer → Parser → ExprTree → LabelTree → Layout → SVG
//! ```
//!
//! 1. [`parser`] — tokenises the expression and builds an arena-backed AST
//!    covering the full C expression grammar (assignments, ternary, the
//!    binary precedence ladder, unary and postfix operators, calls,
//!    subscripts, `sizeof`, and heuristic typecasts).
//! 2. [`layout`] — a generic variable-width tidy-tree engine
//!    (Buchheim–Jünger–Leipert); it knows nothing about expressions.
//! 3. [`render`] — turns the AST into labeled boxes and emits the laid-out
//!    tree as an SVG document.
//!
//! The quickest path from string to picture:
//!
//! ```
//! let tree = exprtree::parser::parse("a ? f(b) : c[0]")?;
//! let svg = exprtree::render::expr_to_svg(&tree);
//! assert!(svg.ends_with("</svg>"));
//! # Ok::<(), exprtree::parser::ParseError>(())
//! ```

pub mod layout;
pub mod parser;
pub mod render;
