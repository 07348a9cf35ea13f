//! Expression drawing
//!
//! - [`labels`]: parse tree → label tree adapter (display strings, widths)
//! - [`svg`]: laid-out label tree → SVG document

pub mod labels;
pub mod svg;

pub use labels::{LabeledTree, BOX_HEIGHT, CHAR_HEIGHT, CHAR_WIDTH};
pub use svg::{SvgDocument, RULES};

use crate::parser::ExprTree;

/// Lay out `expr` and render it as an SVG document string.
pub fn expr_to_svg(expr: &ExprTree) -> String {
    let mut labeled = LabeledTree::from_expr(expr);
    labeled.tree.layout(labeled.root, &RULES);
    SvgDocument::new(&labeled).to_string()
}
