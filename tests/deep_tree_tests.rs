//! Long flat operator chains build trees whose depth equals their size;
//! every pipeline stage has to survive them.

use std::fmt::{self, Write as _};

use exprtree::parser::parse;
use exprtree::render::{LabeledTree, SvgDocument, RULES};

/// Discards rendered output, keeping only its length; lets the emitter run
/// at full scale without holding the document in memory.
struct ByteCounter(usize);

impl fmt::Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

fn chain(op: char, terms: usize) -> String {
    let mut expr = String::with_capacity(2 * terms + 1);
    expr.push('a');
    for _ in 0..terms {
        expr.push(op);
        expr.push('a');
    }
    expr
}

#[test]
fn test_long_addition_chain_parses_lays_out_and_renders() {
    let terms = 200_000;
    let tree = parse(&chain('+', terms)).expect("flat chain is valid input");
    // One leaf per term plus one binary node per fold.
    assert_eq!(tree.len(), 2 * terms + 1);

    let canon = tree.canonical_string();
    assert_eq!(canon.len(), 4 * terms + 1);
    assert!(canon.starts_with("((((") && canon.ends_with("+a)"));

    let mut labeled = LabeledTree::from_expr(&tree);
    labeled.tree.layout(labeled.root, &RULES);
    assert_eq!(labeled.tree.x(labeled.root), 500.0);

    // The left-deep fold puts the first leaf `terms` levels down.
    let deepest = (0..labeled.tree.len())
        .map(|id| labeled.tree.y(id))
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(deepest, terms as f64 * RULES.level_separation);

    let mut sink = ByteCounter(0);
    write!(sink, "{}", SvgDocument::new(&labeled)).expect("rendering never fails");
    assert!(sink.0 > labeled.tree.len() * 100);
}

#[test]
fn test_long_comma_chain_round_trips() {
    let terms = 100_000;
    let tree = parse(&chain(',', terms)).expect("flat chain is valid input");
    assert_eq!(tree.len(), 2 * terms + 1);
    let canon = tree.canonical_string();
    assert!(canon.starts_with("((((") && canon.ends_with(",a)"));
}
