//! Parse tree → label tree adapter
//!
//! Flattens an [`ExprTree`] into the layout engine's [`LabelTree`], choosing
//! a display string for every node and sizing each box from that string in
//! a fixed-width font. The layout engine never sees the expression; only
//! widths and structure cross this boundary.

use crate::layout::{LabelId, LabelTree};
use crate::parser::{ExprNode, ExprTree, NodeId};

/// Advance per character of 12px Courier.
pub const CHAR_WIDTH: f64 = 7.0;
/// Text baseline offset inside a box.
pub const CHAR_HEIGHT: f64 = 11.0;
/// Height of every label box.
pub const BOX_HEIGHT: f64 = 14.0;

/// Where the root box center lands on the canvas.
pub const ROOT_X: f64 = 500.0;
pub const ROOT_Y: f64 = 0.0;

/// A [`LabelTree`] plus the display text for each of its labels, indexed by
/// [`LabelId`].
pub struct LabeledTree {
    pub tree: LabelTree,
    pub texts: Vec<String>,
    pub root: LabelId,
}

impl LabeledTree {
    /// Build the label tree for `expr`, one label per node in the same
    /// parent/child shape. Coordinates are meaningless until the caller runs
    /// the layout.
    pub fn from_expr(expr: &ExprTree) -> LabeledTree {
        let mut tree = LabelTree::new();
        let mut texts = Vec::with_capacity(expr.len());

        let text = node_text(expr, expr.root());
        let root = tree.add_root(box_width(&text), ROOT_X, ROOT_Y);
        texts.push(text);

        // Explicit stack; operator chains make the tree as deep as it is
        // large.
        let mut stack: Vec<(NodeId, LabelId)> = vec![(expr.root(), root)];
        while let Some((node, label)) = stack.pop() {
            for child in expr.node(node).children() {
                let text = node_text(expr, child);
                let child_label = tree.add_child(label, box_width(&text));
                // Labels are allocated in step with texts, so ids index it.
                debug_assert_eq!(child_label, texts.len());
                texts.push(text);
                stack.push((child, child_label));
            }
        }

        LabeledTree { tree, texts, root }
    }
}

/// Box width for a label string, with one character of padding per side.
fn box_width(text: &str) -> f64 {
    (text.chars().count() + 2) as f64 * CHAR_WIDTH
}

/// The string shown inside a node's box.
fn node_text(expr: &ExprTree, id: NodeId) -> String {
    match expr.node(id) {
        ExprNode::Leaf(text) => text.clone(),
        ExprNode::Sizeof(text) => format!("sizeof({text})"),
        ExprNode::Cast { type_name, .. } => format!("({type_name})"),
        ExprNode::Unary { op, .. } => op.sigil().to_string(),
        ExprNode::Postfix { op, .. } => op.sigil().to_string(),
        ExprNode::Binary { op, .. } => op.name().to_string(),
        ExprNode::Call { .. } => "function call".to_string(),
        ExprNode::Subscript { .. } => "subscript".to_string(),
    }
}
