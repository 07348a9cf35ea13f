//! AST definitions for parsed C expressions
//!
//! Every node lives in a flat arena owned by the [`ExprTree`]; nodes refer to
//! each other by [`NodeId`] and nothing is freed individually. Dropping the
//! tree releases the whole parse in one step, which is also what happens on
//! every error path before the tree escapes the parser.

use crate::parser::lexer::TokenKind;

/// Index of a node in the tree's arena.
pub type NodeId = usize;

/// Prefix operators that never occur as raw tokens with this meaning; the
/// parser rewrites the ambiguous token (`&`, `*`, `-`, `++`, ...) into one of
/// these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    AddressOf,    // &x
    Dereference,  // *x
    Negate,       // -x
    Plus,         // +x
    Not,          // !x
    BitNot,       // ~x
    PreIncrement, // ++x
    PreDecrement, // --x
}

impl UnaryOp {
    pub fn sigil(&self) -> &'static str {
        match self {
            UnaryOp::AddressOf => "&",
            UnaryOp::Dereference => "*",
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreIncrement => "++",
            UnaryOp::PreDecrement => "--",
        }
    }
}

/// Postfix `++`/`--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    pub fn sigil(&self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

/// One expression node. Each variant carries exactly the children its kind
/// requires; binary operators reuse the lexical tag space for their `op`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode {
    /// Identifier or literal, spelling verbatim.
    Leaf(String),
    /// `sizeof(type)` or `sizeof tok`; the captured text, never a subtree.
    Sizeof(String),
    /// `(typename)operand` with the reconstructed type-name string.
    Cast { type_name: String, operand: NodeId },
    Unary { op: UnaryOp, operand: NodeId },
    Postfix { op: PostfixOp, operand: NodeId },
    /// Any binary application, including `,`, assignments, `?` and its
    /// nested `:` pair, and `.`/`->` member access.
    Binary {
        op: TokenKind,
        left: NodeId,
        right: NodeId,
    },
    /// Callee plus arguments in left-to-right order; zero arguments is
    /// legal.
    Call { callee: NodeId, args: Vec<NodeId> },
    Subscript { base: NodeId, index: NodeId },
}

impl ExprNode {
    /// Ordered children, for generic traversal (e.g. by the renderer).
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            ExprNode::Leaf(_) | ExprNode::Sizeof(_) => Vec::new(),
            ExprNode::Cast { operand, .. }
            | ExprNode::Unary { operand, .. }
            | ExprNode::Postfix { operand, .. } => vec![*operand],
            ExprNode::Binary { left, right, .. } => vec![*left, *right],
            ExprNode::Subscript { base, index } => vec![*base, *index],
            ExprNode::Call { callee, args } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(*callee);
                out.extend_from_slice(args);
                out
            }
        }
    }
}

/// A parsed expression: the node arena plus the root id.
///
/// Returned by value on success, so the caller owns the arena; dropping the
/// tree releases every node and text payload at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprTree {
    nodes: Vec<ExprNode>,
    root: NodeId,
}

impl ExprTree {
    pub(crate) fn new(nodes: Vec<ExprNode>, root: NodeId) -> Self {
        ExprTree { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ExprNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fully parenthesized infix rendering, used by the tests to pin down
    /// the parse shape. Grouping parentheses from the source do not survive;
    /// every operator application adds exactly one pair.
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root, &mut out);
        out
    }

    // A flat operator chain nests one level per application, so the walk
    // runs on an explicit stack rather than the call stack.
    fn write_node(&self, root: NodeId, out: &mut String) {
        enum Step<'a> {
            Node(NodeId),
            Text(&'a str),
            Ch(char),
        }

        let mut stack = vec![Step::Node(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Text(text) => out.push_str(text),
                Step::Ch(ch) => out.push(ch),
                Step::Node(id) => match self.node(id) {
                    ExprNode::Leaf(text) => out.push_str(text),
                    ExprNode::Sizeof(text) => {
                        out.push_str("sizeof(");
                        out.push_str(text);
                        out.push(')');
                    }
                    ExprNode::Cast { type_name, operand } => {
                        out.push_str("((");
                        out.push_str(type_name);
                        out.push(')');
                        stack.push(Step::Ch(')'));
                        stack.push(Step::Node(*operand));
                    }
                    ExprNode::Unary { op, operand } => {
                        out.push_str(op.sigil());
                        out.push('(');
                        stack.push(Step::Ch(')'));
                        stack.push(Step::Node(*operand));
                    }
                    ExprNode::Postfix { op, operand } => {
                        out.push('(');
                        stack.push(Step::Ch(')'));
                        stack.push(Step::Text(op.sigil()));
                        stack.push(Step::Node(*operand));
                    }
                    ExprNode::Binary { op, left, right } => {
                        out.push('(');
                        stack.push(Step::Ch(')'));
                        stack.push(Step::Node(*right));
                        stack.push(Step::Text(op.name()));
                        stack.push(Step::Node(*left));
                    }
                    ExprNode::Call { callee, args } => {
                        stack.push(Step::Ch(')'));
                        for (i, arg) in args.iter().enumerate().rev() {
                            stack.push(Step::Node(*arg));
                            if i > 0 {
                                stack.push(Step::Ch(','));
                            }
                        }
                        stack.push(Step::Ch('('));
                        stack.push(Step::Node(*callee));
                    }
                    ExprNode::Subscript { base, index } => {
                        stack.push(Step::Ch(']'));
                        stack.push(Step::Node(*index));
                        stack.push(Step::Ch('['));
                        stack.push(Step::Node(*base));
                    }
                },
            }
        }
    }
}
