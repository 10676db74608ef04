//! Node kinds, flags and the typed read-only projection of arena
//! records.
//!
//! A [`Node`] is a value-typed handle carrying `(arena, source, index)`.
//! Every string projection borrows the original source; nothing here
//! allocates except [`Node::to_owned`], which materializes a detached
//! copy for callers that must outlive the parse.

use crate::arena::{flags, Arena, NodeId};
use crate::location::Location;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

/// Closed set of node kinds; the one-byte discriminator stored in the
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum NodeKind {
    // structural
    Stylesheet = 1,
    StyleRule,
    AtRule,
    Declaration,
    Block,
    Comment,
    // value sub-tree
    Ident,
    Number,
    Dimension,
    String,
    Hash,
    Function,
    Operator,
    Parenthesis,
    // selector sub-tree
    SelectorList,
    Selector,
    TypeSelector,
    ClassSelector,
    IdSelector,
    Universal,
    Nesting,
    Attribute,
    PseudoClass,
    PseudoElement,
    Combinator,
    Nth,
    NthOf,
    Lang,
    // at-rule prelude sub-tree
    MediaQuery,
    MediaFeature,
    MediaType,
    ContainerQuery,
    SupportsQuery,
    LayerName,
    PreludeIdent,
    PreludeOperator,
    ImportUrl,
    ImportLayer,
}

impl NodeKind {
    /// Maps a record byte back to its kind. Only bytes written through
    /// [`Arena::create_node`] occur in practice; anything else falls
    /// back to `Stylesheet`.
    #[must_use]
    pub fn from_u8(b: u8) -> NodeKind {
        match b {
            2 => NodeKind::StyleRule,
            3 => NodeKind::AtRule,
            4 => NodeKind::Declaration,
            5 => NodeKind::Block,
            6 => NodeKind::Comment,
            7 => NodeKind::Ident,
            8 => NodeKind::Number,
            9 => NodeKind::Dimension,
            10 => NodeKind::String,
            11 => NodeKind::Hash,
            12 => NodeKind::Function,
            13 => NodeKind::Operator,
            14 => NodeKind::Parenthesis,
            15 => NodeKind::SelectorList,
            16 => NodeKind::Selector,
            17 => NodeKind::TypeSelector,
            18 => NodeKind::ClassSelector,
            19 => NodeKind::IdSelector,
            20 => NodeKind::Universal,
            21 => NodeKind::Nesting,
            22 => NodeKind::Attribute,
            23 => NodeKind::PseudoClass,
            24 => NodeKind::PseudoElement,
            25 => NodeKind::Combinator,
            26 => NodeKind::Nth,
            27 => NodeKind::NthOf,
            28 => NodeKind::Lang,
            29 => NodeKind::MediaQuery,
            30 => NodeKind::MediaFeature,
            31 => NodeKind::MediaType,
            32 => NodeKind::ContainerQuery,
            33 => NodeKind::SupportsQuery,
            34 => NodeKind::LayerName,
            35 => NodeKind::PreludeIdent,
            36 => NodeKind::PreludeOperator,
            37 => NodeKind::ImportUrl,
            38 => NodeKind::ImportLayer,
            _ => NodeKind::Stylesheet,
        }
    }
}

/// Attribute selector operator, stored in the dedicated record byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum AttrOperator {
    None = 0,
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttrOperator {
    #[must_use]
    pub fn from_u8(b: u8) -> AttrOperator {
        match b {
            1 => AttrOperator::Equals,
            2 => AttrOperator::Includes,
            3 => AttrOperator::DashMatch,
            4 => AttrOperator::Prefix,
            5 => AttrOperator::Suffix,
            6 => AttrOperator::Substring,
            _ => AttrOperator::None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            AttrOperator::None => "",
            AttrOperator::Equals => "=",
            AttrOperator::Includes => "~=",
            AttrOperator::DashMatch => "|=",
            AttrOperator::Prefix => "^=",
            AttrOperator::Suffix => "$=",
            AttrOperator::Substring => "*=",
        }
    }
}

/// Attribute selector case-sensitivity flag (`i` / `s`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum AttrCase {
    None = 0,
    Insensitive,
    Sensitive,
}

impl AttrCase {
    #[must_use]
    pub fn from_u8(b: u8) -> AttrCase {
        match b {
            1 => AttrCase::Insensitive,
            2 => AttrCase::Sensitive,
            _ => AttrCase::None,
        }
    }
}

/// Read-only projection of one arena record. Copy-cheap; borrows both
/// the arena and the source for its lifetime.
#[derive(Clone, Copy)]
pub struct Node<'doc> {
    arena: &'doc Arena,
    source: &'doc str,
    id: NodeId,
}

impl<'doc> Node<'doc> {
    #[must_use]
    pub fn new(arena: &'doc Arena, source: &'doc str, id: NodeId) -> Self {
        Self { arena, source, id }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.arena.kind(self.id)
    }

    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.arena.start_offset(self.id)
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.arena.length(self.id)
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.arena.line(self.id)
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.arena.column(self.id)
    }

    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(self.line(), self.column(), self.start_offset())
    }

    /// The full source slice of this node. Truncated (not absent) when
    /// the node was flagged with a length overflow.
    #[must_use]
    pub fn text(&self) -> &'doc str {
        let start = self.start_offset();
        self.source.get(start..start + self.length()).unwrap_or("")
    }

    /// The name slice: property name, at-rule name, pseudo name, class
    /// name, attribute name, An+B `A` part. Empty when absent.
    #[must_use]
    pub fn name(&self) -> &'doc str {
        let (start, len) = self.arena.content_slice(self.id);
        self.source.get(start..start + len).unwrap_or("")
    }

    /// The value slice: declaration value, at-rule prelude, attribute
    /// value, An+B `B` part. Empty when absent.
    #[must_use]
    pub fn value(&self) -> &'doc str {
        let (start, len) = self.arena.value_slice(self.id);
        self.source.get(start..start + len).unwrap_or("")
    }

    /// Alias of [`Node::value`] for at-rules.
    #[must_use]
    pub fn prelude(&self) -> &'doc str {
        self.value()
    }

    #[must_use]
    pub fn is_important(&self) -> bool {
        self.arena.has_flag(self.id, flags::IMPORTANT)
    }

    #[must_use]
    pub fn is_vendor_prefixed(&self) -> bool {
        self.arena.has_flag(self.id, flags::VENDOR_PREFIXED)
    }

    #[must_use]
    pub fn has_block(&self) -> bool {
        self.arena.has_flag(self.id, flags::HAS_BLOCK)
    }

    #[must_use]
    pub fn has_declarations(&self) -> bool {
        self.arena.has_flag(self.id, flags::HAS_DECLARATIONS)
    }

    #[must_use]
    pub fn has_parens(&self) -> bool {
        self.arena.has_flag(self.id, flags::HAS_PARENS)
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.arena.has_flag(self.id, flags::ERROR)
    }

    /// True when the stored length or a slice was clamped to 16 bits.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.arena.has_flag(self.id, flags::LENGTH_OVERFLOW)
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        self.arena.first_child(self.id).is_some()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Node<'doc>> {
        self.arena.first_child(self.id).map(|id| self.at(id))
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'doc>> {
        self.arena.next_sibling(self.id).map(|id| self.at(id))
    }

    #[must_use]
    pub fn children(&self) -> Children<'doc> {
        Children {
            arena: self.arena,
            source: self.source,
            next: self.arena.first_child(self.id),
        }
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    fn at(&self, id: NodeId) -> Node<'doc> {
        Node::new(self.arena, self.source, id)
    }

    // -- kind predicates, in the spirit of the usual as_/is_ accessors --

    #[must_use]
    pub fn is_stylesheet(&self) -> bool {
        self.kind() == NodeKind::Stylesheet
    }

    #[must_use]
    pub fn is_style_rule(&self) -> bool {
        self.kind() == NodeKind::StyleRule
    }

    #[must_use]
    pub fn is_at_rule(&self) -> bool {
        self.kind() == NodeKind::AtRule
    }

    #[must_use]
    pub fn is_declaration(&self) -> bool {
        self.kind() == NodeKind::Declaration
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.kind() == NodeKind::Block
    }

    #[must_use]
    pub fn is_selector_list(&self) -> bool {
        self.kind() == NodeKind::SelectorList
    }

    #[must_use]
    pub fn is_selector(&self) -> bool {
        self.kind() == NodeKind::Selector
    }

    #[must_use]
    pub fn is_combinator(&self) -> bool {
        self.kind() == NodeKind::Combinator
    }

    // -- attribute selector projections ------------------------------------

    #[must_use]
    pub fn attribute_operator(&self) -> AttrOperator {
        AttrOperator::from_u8(self.arena.attr_op(self.id))
    }

    #[must_use]
    pub fn attribute_case(&self) -> AttrCase {
        AttrCase::from_u8(self.arena.attr_flags(self.id))
    }

    // -- selector projections ----------------------------------------------

    /// The inner selector list of a pseudo-class function or nth-of
    /// node, when one was parsed.
    #[must_use]
    pub fn selector_list(&self) -> Option<Node<'doc>> {
        self.children().find(|c| c.kind() == NodeKind::SelectorList)
    }

    /// Iterates the compounds of a selector: maximal runs of simple
    /// selectors between combinators.
    #[must_use]
    pub fn compounds(&self) -> Compounds<'doc> {
        Compounds {
            cursor: self.first_child(),
        }
    }

    // -- An+B projections ---------------------------------------------------

    /// The `A` coefficient of an nth node (`2n+1` → 2, `odd` → 2,
    /// `-n` → -1, plain `5` → 0).
    #[must_use]
    pub fn nth_a(&self) -> i32 {
        let a = self.name().trim();
        if a.is_empty() {
            return 0;
        }
        if a.eq_ignore_ascii_case("odd") || a.eq_ignore_ascii_case("even") {
            return 2;
        }
        let body = a.strip_suffix(['n', 'N']).unwrap_or(a);
        match body {
            "" | "+" => 1,
            "-" => -1,
            s => s.parse().unwrap_or(0),
        }
    }

    /// The `B` offset of an nth node (`2n+1` → 1, `odd` → 1,
    /// `3n - 2` → -2).
    #[must_use]
    pub fn nth_b(&self) -> i32 {
        let a = self.name().trim();
        if a.eq_ignore_ascii_case("odd") {
            return 1;
        }
        if a.eq_ignore_ascii_case("even") {
            return 0;
        }
        // the slice may span `- 5`; whitespace between sign and digits
        // is tolerated by the An+B grammar
        let compact: String = self.value().chars().filter(|c| !c.is_whitespace()).collect();
        let compact = compact.strip_prefix('+').unwrap_or(&compact);
        compact.parse().unwrap_or(0)
    }

    // -- numeric projections ------------------------------------------------

    /// Numeric value of a number or dimension node.
    #[must_use]
    pub fn numeric_value(&self) -> Option<f32> {
        match self.kind() {
            NodeKind::Number | NodeKind::Dimension => {
                let text = self.text();
                let split = split_number(text);
                text.get(..split)?.parse().ok()
            }
            _ => None,
        }
    }

    /// Unit of a dimension node (`%` for percentages), decomposed from
    /// the source slice on demand.
    #[must_use]
    pub fn unit(&self) -> Option<&'doc str> {
        if self.kind() != NodeKind::Dimension {
            return None;
        }
        let text = self.text();
        text.get(split_number(text)..)
    }

    // -- detaching ----------------------------------------------------------

    /// Plain structural copy for consumers that must detach from the
    /// source lifetime. `deep` controls child materialization,
    /// `with_locations` the line/column fields.
    #[must_use]
    pub fn to_owned(&self, deep: bool, with_locations: bool) -> OwnedNode {
        let name = self.name();
        let value = self.value();
        OwnedNode {
            kind: self.kind(),
            text: self.text().to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
            value: (!value.is_empty()).then(|| value.to_string()),
            important: self.is_important(),
            numeric: self.numeric_value(),
            unit: self.unit().map(str::to_string),
            line: with_locations.then(|| self.line()),
            column: with_locations.then(|| self.column()),
            children: if deep {
                self.children().map(|c| c.to_owned(true, with_locations)).collect()
            } else {
                Vec::new()
            },
        }
    }
}

/// The length of the numeric prefix of a number/dimension slice.
pub(crate) fn split_number(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
        i += 2;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            i = j + 1;
            while bytes.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
        }
    }
    i
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::SelectorList if self.has_children() => {
                write!(f, "{}", self.children().map(|c| c.text()).format(", "))
            }
            _ => write!(f, "{}", self.text()),
        }
    }
}

/// Iterator over a node's children, following first-child/next-sibling
/// links.
pub struct Children<'doc> {
    arena: &'doc Arena,
    source: &'doc str,
    next: Option<NodeId>,
}

impl<'doc> Iterator for Children<'doc> {
    type Item = Node<'doc>;

    fn next(&mut self) -> Option<Node<'doc>> {
        let id = self.next?;
        self.next = self.arena.next_sibling(id);
        Some(Node::new(self.arena, self.source, id))
    }
}

/// Iterator over the compounds of a selector node.
pub struct Compounds<'doc> {
    cursor: Option<Node<'doc>>,
}

impl<'doc> Iterator for Compounds<'doc> {
    type Item = Vec<Node<'doc>>;

    fn next(&mut self) -> Option<Vec<Node<'doc>>> {
        // skip combinators separating compounds
        while let Some(node) = self.cursor {
            if node.is_combinator() {
                self.cursor = node.next_sibling();
            } else {
                break;
            }
        }
        let mut compound = Vec::new();
        while let Some(node) = self.cursor {
            if node.is_combinator() {
                break;
            }
            compound.push(node);
            self.cursor = node.next_sibling();
        }
        if compound.is_empty() {
            None
        } else {
            Some(compound)
        }
    }
}

/// A detached, owned copy of a node sub-tree. Serializable; used by
/// consumers that cannot hold the source borrow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedNode {
    pub kind: NodeKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub children: Vec<OwnedNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_number_handles_every_shape() {
        assert_eq!(split_number("12px"), 2);
        assert_eq!(split_number("-4.5em"), 4);
        assert_eq!(split_number("+.5%"), 3);
        assert_eq!(split_number("1e-1x"), 4);
        assert_eq!(split_number("1e"), 1); // `e` starts the unit
        assert_eq!(split_number("2n-5"), 1);
    }

    #[test]
    fn node_kind_round_trips_through_u8() {
        for kind in [
            NodeKind::Stylesheet,
            NodeKind::StyleRule,
            NodeKind::Declaration,
            NodeKind::Nth,
            NodeKind::ImportLayer,
        ] {
            assert_eq!(NodeKind::from_u8(kind as u8), kind);
        }
    }

    #[test]
    fn attr_operator_symbols() {
        assert_eq!(AttrOperator::from_u8(2).symbol(), "~=");
        assert_eq!(AttrOperator::from_u8(6).symbol(), "*=");
        assert_eq!(AttrOperator::from_u8(0), AttrOperator::None);
    }

    #[test]
    fn nth_projection_from_slices() {
        let source = "2n + 1";
        let mut arena = Arena::new();
        let nth = arena.create_node(NodeKind::Nth, 0, source.len(), 1, 1);
        arena.set_content_slice(nth, 0, 2);
        arena.set_value_slice(nth, 5, 1);
        let node = Node::new(&arena, source, nth);
        assert_eq!(node.nth_a(), 2);
        assert_eq!(node.nth_b(), 1);
    }

    #[test]
    fn nth_projection_odd_even() {
        let source = "odd";
        let mut arena = Arena::new();
        let nth = arena.create_node(NodeKind::Nth, 0, 3, 1, 1);
        arena.set_content_slice(nth, 0, 3);
        let node = Node::new(&arena, source, nth);
        assert_eq!((node.nth_a(), node.nth_b()), (2, 1));
    }

    #[test]
    fn nth_projection_negative_spaced_b() {
        let source = "3n - 2";
        let mut arena = Arena::new();
        let nth = arena.create_node(NodeKind::Nth, 0, source.len(), 1, 1);
        arena.set_content_slice(nth, 0, 2);
        arena.set_value_slice(nth, 3, 3); // "- 2"
        let node = Node::new(&arena, source, nth);
        assert_eq!(node.nth_b(), -2);
    }

    #[test]
    fn dimension_decomposition() {
        let source = "1.5rem";
        let mut arena = Arena::new();
        let dim = arena.create_node(NodeKind::Dimension, 0, 6, 1, 1);
        let node = Node::new(&arena, source, dim);
        assert_eq!(node.numeric_value(), Some(1.5));
        assert_eq!(node.unit(), Some("rem"));
    }

    #[test]
    fn owned_node_serializes_kebab_kinds() {
        let source = "red";
        let mut arena = Arena::new();
        let id = arena.create_node(NodeKind::Ident, 0, 3, 1, 1);
        let owned = Node::new(&arena, source, id).to_owned(true, false);
        let json = serde_json::to_value(&owned).unwrap();
        assert_eq!(json["kind"], "ident");
        assert_eq!(json["text"], "red");
        assert!(json.get("name").is_none());
        assert!(json.get("important").is_none());
    }
}
