//! Tidy tree layout for variable-width boxes
//!
//! Implements the linear-time refinement of Walker's tree-drawing algorithm
//! from Buchheim, Jünger and Leipert, "Improving Walker's Algorithm to Run
//! in Linear Time" (2002), adapted for variable-width nodes: the constant
//! node-separation term becomes `base + (width(a) + width(b)) / 2`, with a
//! different `base` for adjacent siblings than for the non-sibling contour
//! pairs met during conflict resolution.
//!
//! The engine is independent of the expression parser. It works on a
//! [`LabelTree`] arena of boxes that only know their child/sibling structure
//! and a pixel width; any ordered tree can be laid out. Two passes: a
//! post-order walk computes preliminary positions and resolves subtree
//! overlaps along contours (threaded past childless subtrees), then a
//! pre-order walk accumulates modifiers into final coordinates. Layout
//! always succeeds for any finite tree and is deterministic in its inputs.

use tracing::debug;

/// Index of a label in the tree's arena.
pub type LabelId = usize;

/// Separation configuration, in pixels.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRules {
    /// Base gap between adjacent siblings.
    pub sibling_separation: f64,
    /// Base gap enforced between non-sibling subtree contours.
    pub subtree_separation: f64,
    /// Vertical distance between tree levels.
    pub level_separation: f64,
}

/// One positionable box.
///
/// `thread` and `ancestor` are non-owning contour bookkeeping: a thread
/// points at "the next node along the contour as if this one had a child",
/// never at anything this label owns.
#[derive(Debug, Clone)]
struct Label {
    parent: Option<LabelId>,
    first_child: Option<LabelId>,
    prev_sibling: Option<LabelId>,
    next_sibling: Option<LabelId>,
    thread: Option<LabelId>,
    ancestor: LabelId,
    /// Which number child of the parent this is.
    number: usize,
    width: f64,
    x: f64,
    y: f64,
    modifier: f64,
    shift: f64,
    change: f64,
}

/// Arena of labels forming one ordered tree (or forest of roots).
///
/// Build with [`add_root`](Self::add_root) and
/// [`add_child`](Self::add_child), then call [`layout`](Self::layout); the
/// final coordinates are read back through [`x`](Self::x) and
/// [`y`](Self::y). Each tree instance is private to one layout call chain;
/// nothing is shared between concurrent layouts.
#[derive(Debug, Default)]
pub struct LabelTree {
    labels: Vec<Label>,
}

impl LabelTree {
    pub fn new() -> Self {
        LabelTree { labels: Vec::new() }
    }

    /// Add a root label anchored at (`x`, `y`); layout keeps the root
    /// there.
    pub fn add_root(&mut self, width: f64, x: f64, y: f64) -> LabelId {
        let id = self.labels.len();
        self.labels.push(Label {
            parent: None,
            first_child: None,
            prev_sibling: None,
            next_sibling: None,
            thread: None,
            ancestor: id,
            number: 0,
            width,
            x,
            y,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
        });
        id
    }

    /// Append a child to `parent`'s ordered child list.
    pub fn add_child(&mut self, parent: LabelId, width: f64) -> LabelId {
        let id = self.labels.len();
        let mut number = 0;
        let mut prev_sibling = None;
        match self.labels[parent].first_child {
            None => self.labels[parent].first_child = Some(id),
            Some(first) => {
                let mut last = first;
                number = 1;
                while let Some(next) = self.labels[last].next_sibling {
                    last = next;
                    number += 1;
                }
                self.labels[last].next_sibling = Some(id);
                prev_sibling = Some(last);
            }
        }
        self.labels.push(Label {
            parent: Some(parent),
            first_child: None,
            prev_sibling,
            next_sibling: None,
            thread: None,
            ancestor: id,
            number,
            width,
            x: 0.0,
            y: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn x(&self, id: LabelId) -> f64 {
        self.labels[id].x
    }

    pub fn y(&self, id: LabelId) -> f64 {
        self.labels[id].y
    }

    pub fn width(&self, id: LabelId) -> f64 {
        self.labels[id].width
    }

    pub fn parent(&self, id: LabelId) -> Option<LabelId> {
        self.labels[id].parent
    }

    /// Ordered children of `id`.
    pub fn children(&self, id: LabelId) -> Vec<LabelId> {
        let mut out = Vec::new();
        let mut cur = self.labels[id].first_child;
        while let Some(c) = cur {
            out.push(c);
            cur = self.labels[c].next_sibling;
        }
        out
    }

    /// Lay out the tree rooted at `root`, mutating every label's
    /// coordinates in place. The root stays at its anchor; every other
    /// label gets `y = anchor_y + depth * level_separation` and an `x`
    /// that keeps sibling subtrees from overlapping.
    pub fn layout(&mut self, root: LabelId, rules: &LayoutRules) {
        // Clear bookkeeping so repeated layouts are deterministic.
        for (id, label) in self.labels.iter_mut().enumerate() {
            label.thread = None;
            label.ancestor = id;
            label.modifier = 0.0;
            label.shift = 0.0;
            label.change = 0.0;
        }

        let x_anchor = self.labels[root].x;
        let y_anchor = self.labels[root].y;

        self.first_walk(root, rules);
        let root_prelim = self.labels[root].x;
        self.second_walk(root, -root_prelim, rules, x_anchor, y_anchor);

        debug!(labels = self.labels.len(), "layout complete");
    }

    /// Post-order pass: children first, then resolve overlaps between each
    /// child subtree and its earlier siblings, and finally position this
    /// node relative to its children or previous sibling. Chain-shaped
    /// trees are as deep as they are large, so the walk keeps its own frame
    /// stack instead of recursing.
    fn first_walk(&mut self, root: LabelId, rules: &LayoutRules) {
        struct Frame {
            node: LabelId,
            next_child: Option<LabelId>,
            default_ancestor: LabelId,
        }
        fn frame(tree: &LabelTree, node: LabelId) -> Frame {
            let first = tree.labels[node].first_child;
            Frame {
                node,
                next_child: first,
                default_ancestor: first.unwrap_or(node),
            }
        }

        let mut stack = vec![frame(self, root)];
        loop {
            let descend = match stack.last_mut() {
                Some(top) => match top.next_child {
                    Some(child) => {
                        top.next_child = self.labels[child].next_sibling;
                        Some(child)
                    }
                    None => None,
                },
                None => break,
            };
            match descend {
                Some(child) => stack.push(frame(self, child)),
                None => {
                    let Some(finished) = stack.pop() else { break };
                    self.place(finished.node, rules);
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.default_ancestor =
                                self.apportion(finished.node, parent.default_ancestor, rules);
                        }
                        None => break,
                    }
                }
            }
        }
    }

    /// Give a node its preliminary x once its whole subtree is done:
    /// centered over its outermost children, or adjacent to its previous
    /// sibling.
    fn place(&mut self, node: LabelId, rules: &LayoutRules) {
        match self.labels[node].first_child {
            Some(first) => {
                self.execute_shifts(node);

                let mut last = first;
                while let Some(next) = self.labels[last].next_sibling {
                    last = next;
                }
                let midpoint = (self.labels[first].x + self.labels[last].x) / 2.0;
                match self.labels[node].prev_sibling {
                    Some(prev) => {
                        let x = self.labels[prev].x + self.spacing(prev, node, true, rules);
                        self.labels[node].x = x;
                        self.labels[node].modifier = x - midpoint;
                    }
                    None => self.labels[node].x = midpoint,
                }
            }
            None => match self.labels[node].prev_sibling {
                Some(prev) => {
                    self.labels[node].x = self.labels[prev].x + self.spacing(node, prev, true, rules);
                }
                None => self.labels[node].x = 0.0,
            },
        }
    }

    /// Pre-order pass: fold the accumulated modifiers into absolute
    /// coordinates. Also stack-based; visit order does not matter here.
    fn second_walk(
        &mut self,
        root: LabelId,
        root_modsum: f64,
        rules: &LayoutRules,
        x_anchor: f64,
        y_anchor: f64,
    ) {
        let mut stack = vec![(root, 0usize, root_modsum)];
        while let Some((node, level, modsum)) = stack.pop() {
            let label = &mut self.labels[node];
            label.x = x_anchor + label.x + modsum;
            label.y = y_anchor + level as f64 * rules.level_separation;
            let child_modsum = modsum + label.modifier;

            let mut cur = label.first_child;
            while let Some(child) = cur {
                stack.push((child, level + 1, child_modsum));
                cur = self.labels[child].next_sibling;
            }
        }
    }

    /// Compare the right contour of `node`'s left siblings with `node`'s
    /// left contour and shift `node`'s slice right just enough to restore
    /// the required separation, distributing the shift across the subtrees
    /// in between. Amortized linear over the whole tree.
    fn apportion(
        &mut self,
        node: LabelId,
        mut default_ancestor: LabelId,
        rules: &LayoutRules,
    ) -> LabelId {
        let Some(prev) = self.labels[node].prev_sibling else {
            return default_ancestor;
        };

        // The leftmost sibling opens the outer left contour.
        let mut outer_left = node;
        while let Some(p) = self.labels[outer_left].prev_sibling {
            outer_left = p;
        }

        let mut inner_right = node;
        let mut outer_right = node;
        let mut inner_left = prev;

        let mut shift_inner_right = self.labels[inner_right].modifier;
        let mut shift_outer_right = self.labels[outer_right].modifier;
        let mut shift_inner_left = self.labels[inner_left].modifier;
        let mut shift_outer_left = self.labels[outer_left].modifier;

        while let (Some(next_il), Some(next_ir)) =
            (self.next_right(inner_left), self.next_left(inner_right))
        {
            inner_left = next_il;
            inner_right = next_ir;
            // The outer contours are threaded and never end before the
            // inner ones.
            outer_left = self
                .next_left(outer_left)
                .expect("left contour ended before inner contour");
            outer_right = self
                .next_right(outer_right)
                .expect("right contour ended before inner contour");

            self.labels[outer_right].ancestor = node;

            let shift = self.spacing(inner_left, inner_right, false, rules)
                + self.labels[inner_left].x
                + shift_inner_left
                - (self.labels[inner_right].x + shift_inner_right);
            if shift > 0.0 {
                let moved = self.conflict_ancestor(inner_left, node, default_ancestor);
                self.move_subtree(moved, node, shift);
                shift_inner_right += shift;
                shift_outer_right += shift;
            }

            shift_inner_left += self.labels[inner_left].modifier;
            shift_inner_right += self.labels[inner_right].modifier;
            shift_outer_left += self.labels[outer_left].modifier;
            shift_outer_right += self.labels[outer_right].modifier;
        }

        if self.next_right(inner_left).is_some() && self.next_right(outer_right).is_none() {
            self.labels[outer_right].thread = self.next_right(inner_left);
            self.labels[outer_right].modifier += shift_inner_left - shift_outer_right;
        } else {
            if self.next_left(inner_right).is_some() && self.next_left(outer_left).is_none() {
                self.labels[outer_left].thread = self.next_left(inner_right);
                self.labels[outer_left].modifier += shift_inner_right - shift_outer_left;
            }
            default_ancestor = node;
        }

        default_ancestor
    }

    /// The ancestor of `left` that is a sibling of `node`, falling back to
    /// the default when the recorded ancestor belongs to another parent.
    fn conflict_ancestor(
        &self,
        left: LabelId,
        node: LabelId,
        default_ancestor: LabelId,
    ) -> LabelId {
        let ancestor = self.labels[left].ancestor;
        if self.labels[ancestor].parent == self.labels[node].parent {
            ancestor
        } else {
            default_ancestor
        }
    }

    /// Shift the subtree rooted at `right` by `shift`, spreading the change
    /// over the `right.number - left.number` subtrees in between.
    fn move_subtree(&mut self, left: LabelId, right: LabelId, shift: f64) {
        let subtrees = (self.labels[right].number - self.labels[left].number) as f64;
        self.labels[right].change -= shift / subtrees;
        self.labels[right].shift += shift;
        self.labels[left].change += shift / subtrees;
        self.labels[right].x += shift;
        self.labels[right].modifier += shift;
    }

    /// Apply the shifts recorded by [`move_subtree`](Self::move_subtree) to
    /// `node`'s children, walking them right to left.
    fn execute_shifts(&mut self, node: LabelId) {
        let mut child = self.labels[node].first_child;
        if let Some(first) = child {
            let mut last = first;
            while let Some(next) = self.labels[last].next_sibling {
                last = next;
            }
            child = Some(last);
        }

        let mut shift = 0.0;
        let mut change = 0.0;
        while let Some(c) = child {
            let label = &mut self.labels[c];
            label.x += shift;
            label.modifier += shift;
            change += label.change;
            shift += label.shift + change;
            child = label.prev_sibling;
        }
    }

    /// Next node down the left contour: first child, or the thread if the
    /// subtree has no further children.
    fn next_left(&self, node: LabelId) -> Option<LabelId> {
        match self.labels[node].first_child {
            Some(child) => Some(child),
            None => self.labels[node].thread,
        }
    }

    /// Next node down the right contour: last child, or the thread.
    fn next_right(&self, node: LabelId) -> Option<LabelId> {
        match self.labels[node].first_child {
            Some(child) => {
                let mut last = child;
                while let Some(next) = self.labels[last].next_sibling {
                    last = next;
                }
                Some(last)
            }
            None => self.labels[node].thread,
        }
    }

    /// Minimum center-to-center distance between two boxes.
    fn spacing(&self, a: LabelId, b: LabelId, siblings: bool, rules: &LayoutRules) -> f64 {
        let base = if siblings {
            rules.sibling_separation
        } else {
            rules.subtree_separation
        };
        base + 0.5 * (self.labels[a].width + self.labels[b].width)
    }
}
