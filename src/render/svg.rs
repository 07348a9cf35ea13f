//! SVG emission
//!
//! Renders a laid-out [`LabeledTree`] as a standalone SVG document: one
//! outlined box and one Courier text run per label, plus a red line from
//! each box's top center to the bottom center of its parent. Boxes are
//! emitted in preorder so a parent's outline is drawn before its children's
//! connector lines cross it.

use std::fmt;

use crate::layout::{LabelId, LayoutRules};
use crate::render::labels::{LabeledTree, BOX_HEIGHT, CHAR_HEIGHT, CHAR_WIDTH};

/// Separations used for expression drawings.
pub const RULES: LayoutRules = LayoutRules {
    sibling_separation: 10.0,
    subtree_separation: 20.0,
    level_separation: 30.0,
};

const SVG_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\
<svg\
   xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"\
   xmlns:svg=\"http://www.w3.org/2000/svg\"\
   xmlns=\"http://www.w3.org/2000/svg\"\
   width=\"1000\"\
   height=\"1000\"\
   id=\"svg2\"\
   version=\"1.1\">";

const SVG_FOOTER: &str = "</svg>";

/// A laid-out tree wrapped for display; `to_string()` yields the document.
pub struct SvgDocument<'a> {
    labeled: &'a LabeledTree,
}

impl<'a> SvgDocument<'a> {
    pub fn new(labeled: &'a LabeledTree) -> Self {
        SvgDocument { labeled }
    }

    fn write_label(&self, f: &mut fmt::Formatter<'_>, id: LabelId) -> fmt::Result {
        let tree = &self.labeled.tree;
        let width = tree.width(id);
        let x = tree.x(id) - width / 2.0;
        let y = tree.y(id);

        if let Some(parent) = tree.parent(id) {
            write!(
                f,
                "    <line style=\"stroke:rgb(255,0,0);stroke-width:2\"\
       x1=\"{:.6}\"\
       y1=\"{:.6}\"\
       x2=\"{:.6}\"\
       y2=\"{:.6}\" />",
                x + width / 2.0,
                y,
                tree.x(parent),
                tree.y(parent) + BOX_HEIGHT,
            )?;
        }

        write!(
            f,
            "    <rect\
       style=\"color:#000000;fill:none;stroke:#000000;stroke-width:1;\"\
       width=\"{width:.6}\"\
       height=\"{BOX_HEIGHT:.6}\"\
       x=\"{x:.6}\"\
       y=\"{y:.6}\" />",
        )?;

        let text_x = x + CHAR_WIDTH;
        let text_y = y + CHAR_HEIGHT;
        write!(
            f,
            "    <text\
       xml:space=\"preserve\"\
       style=\"font-size:12px;color:#000000;fill:#000000;stroke:none;font-family:Courier;\"\
       x=\"{text_x:.6}\"\
       y=\"{text_y:.6}\">\
<tspan\
         x=\"{text_x:.6}\"\
         y=\"{text_y:.6}\">{}</tspan></text>",
            self.labeled.texts[id],
        )?;
        Ok(())
    }
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SVG_HEADER)?;
        // Preorder on an explicit stack; deep chains must not recurse.
        let mut stack = vec![self.labeled.root];
        while let Some(id) = stack.pop() {
            self.write_label(f, id)?;
            let children = self.labeled.tree.children(id);
            for &child in children.iter().rev() {
                stack.push(child);
            }
        }
        f.write_str(SVG_FOOTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::render::labels::LabeledTree;

    fn render(expr: &str) -> String {
        let tree = parse(expr).unwrap();
        let mut labeled = LabeledTree::from_expr(&tree);
        labeled.tree.layout(labeled.root, &RULES);
        SvgDocument::new(&labeled).to_string()
    }

    #[test]
    fn test_document_shell() {
        let svg = render("a");
        assert!(svg.starts_with("<?xml version=\"1.0\""));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 1);
        assert_eq!(svg.matches("<line").count(), 0);
    }

    #[test]
    fn test_one_line_per_non_root_label() {
        let svg = render("a + b * c");
        // Five nodes, four of them with parents.
        assert_eq!(svg.matches("<rect").count(), 5);
        assert_eq!(svg.matches("<line").count(), 4);
        assert_eq!(svg.matches("<text").count(), 5);
    }

    #[test]
    fn test_labels_appear_in_text_runs() {
        let svg = render("x->len");
        assert!(svg.contains(">x</tspan>"));
        assert!(svg.contains(">len</tspan>"));
        assert!(svg.contains(">-></tspan>"));
    }
}
