//! Depth-first traversal over the parsed tree.
//!
//! [`walk`] is the generic pre-order visitor; [`Walker`] additionally
//! renders the tree as an indented dump, which the tests lean on
//! heavily.

use crate::node::{Node, NodeKind};
use std::io::Write;

/// Visits `node` and all of its descendants in pre-order, invoking `f`
/// with each node and its depth (the root is depth 0).
pub fn walk<'doc, F>(node: Node<'doc>, f: &mut F)
where
    F: FnMut(Node<'doc>, usize),
{
    walk_at(node, 0, f);
}

fn walk_at<'doc, F>(node: Node<'doc>, depth: usize, f: &mut F)
where
    F: FnMut(Node<'doc>, usize),
{
    f(node, depth);
    let mut child = node.first_child();
    while let Some(c) = child {
        walk_at(c, depth + 1, f);
        child = c.next_sibling();
    }
}

/// The walker is used to walk the AST and print it to stdout.
pub struct Walker<'doc> {
    root: Node<'doc>,
}

impl<'doc> Walker<'doc> {
    #[must_use]
    pub fn new(root: Node<'doc>) -> Self {
        Self { root }
    }

    pub fn walk_stdout(&self) {
        let _ = inner_walk(self.root, 0, &mut std::io::stdout());
    }

    #[must_use]
    pub fn walk_to_string(&self) -> String {
        let mut output: Vec<u8> = Vec::new();
        let _ = inner_walk(self.root, 0, &mut output);
        String::from_utf8_lossy(&output).into_owned()
    }
}

fn inner_walk(node: Node, depth: usize, f: &mut dyn Write) -> Result<(), std::io::Error> {
    let prefix = " ".repeat(depth * 2);

    match node.kind() {
        NodeKind::Stylesheet => {
            writeln!(f, "{}[Stylesheet ({})]", prefix, node.child_count())?;
        }
        NodeKind::StyleRule => {
            writeln!(f, "{prefix}[StyleRule]")?;
        }
        NodeKind::AtRule => {
            writeln!(f, "{}[AtRule] name: {}", prefix, node.name())?;
        }
        NodeKind::Declaration => {
            writeln!(
                f,
                "{}[Declaration] property: {} important: {}",
                prefix,
                node.name(),
                node.is_important()
            )?;
        }
        NodeKind::Block => {
            writeln!(f, "{prefix}[Block]")?;
        }
        NodeKind::Comment => {
            writeln!(f, "{prefix}[Comment]")?;
        }
        NodeKind::Ident => {
            writeln!(f, "{}[Ident] {}", prefix, node.text())?;
        }
        NodeKind::Number => {
            writeln!(f, "{}[Number] {}", prefix, node.text())?;
        }
        NodeKind::Dimension => {
            writeln!(f, "{}[Dimension] {}", prefix, node.text())?;
        }
        NodeKind::String => {
            writeln!(f, "{}[String] {}", prefix, node.text())?;
        }
        NodeKind::Hash => {
            writeln!(f, "{}[Hash] {}", prefix, node.text())?;
        }
        NodeKind::Function => {
            writeln!(f, "{}[Function] {}", prefix, node.name())?;
        }
        NodeKind::Operator => {
            writeln!(f, "{}[Operator] {}", prefix, node.text())?;
        }
        NodeKind::Parenthesis => {
            writeln!(f, "{prefix}[Parenthesis]")?;
        }
        NodeKind::SelectorList => {
            writeln!(f, "{}[SelectorList ({})]", prefix, node.child_count())?;
        }
        NodeKind::Selector => {
            writeln!(f, "{prefix}[Selector]")?;
        }
        NodeKind::TypeSelector => {
            writeln!(f, "{}[TypeSelector] {}", prefix, node.text())?;
        }
        NodeKind::ClassSelector => {
            writeln!(f, "{}[ClassSelector] {}", prefix, node.name())?;
        }
        NodeKind::IdSelector => {
            writeln!(f, "{}[IdSelector] {}", prefix, node.name())?;
        }
        NodeKind::Universal => {
            writeln!(f, "{}[Universal] {}", prefix, node.text())?;
        }
        NodeKind::Nesting => {
            writeln!(f, "{prefix}[Nesting]")?;
        }
        NodeKind::Attribute => {
            writeln!(
                f,
                "{}[Attribute] name: {} op: {} value: {}",
                prefix,
                node.name(),
                node.attribute_operator().symbol(),
                node.value()
            )?;
        }
        NodeKind::PseudoClass => {
            writeln!(f, "{}[PseudoClass] {}", prefix, node.name())?;
        }
        NodeKind::PseudoElement => {
            writeln!(f, "{}[PseudoElement] {}", prefix, node.name())?;
        }
        NodeKind::Combinator => {
            let text = node.text().trim();
            let text = if text.is_empty() { " " } else { text };
            writeln!(f, "{prefix}[Combinator] {text}")?;
        }
        NodeKind::Nth => {
            writeln!(f, "{}[Nth] a: {} b: {}", prefix, node.nth_a(), node.nth_b())?;
        }
        NodeKind::NthOf => {
            writeln!(f, "{prefix}[NthOf]")?;
        }
        NodeKind::Lang => {
            writeln!(f, "{}[Lang] {}", prefix, node.name())?;
        }
        NodeKind::MediaQuery => {
            writeln!(f, "{}[MediaQuery] modifier: {}", prefix, node.name())?;
        }
        NodeKind::MediaFeature => {
            writeln!(f, "{}[MediaFeature] {}", prefix, node.value())?;
        }
        NodeKind::MediaType => {
            writeln!(f, "{}[MediaType] {}", prefix, node.text())?;
        }
        NodeKind::ContainerQuery => {
            writeln!(f, "{prefix}[ContainerQuery]")?;
        }
        NodeKind::SupportsQuery => {
            writeln!(f, "{prefix}[SupportsQuery]")?;
        }
        NodeKind::LayerName => {
            writeln!(f, "{}[LayerName] {}", prefix, node.text())?;
        }
        NodeKind::PreludeIdent => {
            writeln!(f, "{}[PreludeIdent] {}", prefix, node.text())?;
        }
        NodeKind::PreludeOperator => {
            writeln!(f, "{}[PreludeOperator] {}", prefix, node.text())?;
        }
        NodeKind::ImportUrl => {
            writeln!(f, "{}[ImportUrl] {}", prefix, node.value())?;
        }
        NodeKind::ImportLayer => {
            writeln!(f, "{}[ImportLayer] {}", prefix, node.name())?;
        }
    }

    let mut child = node.first_child();
    while let Some(c) = child {
        inner_walk(c, depth + 1, f)?;
        child = c.next_sibling();
    }

    Ok(())
}
