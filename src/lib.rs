//! flatcss is a CSS3 parser tuned for production stylesheets: a
//! byte-offset tokenizer drives a layered recursive-descent parser that
//! writes fixed-width node records into one contiguous arena buffer,
//! and the resulting tree is read through a zero-copy typed view over
//! the borrowed source.
//!
//! ```
//! let doc = flatcss::parse("body { color: red }");
//! let rule = doc.root().first_child().unwrap();
//! assert_eq!(rule.kind(), flatcss::NodeKind::StyleRule);
//! ```

pub mod arena;
mod charclass;
pub mod errors;
pub mod location;
pub mod node;
mod parser;
pub mod parser_config;
pub mod tokenizer;
pub mod walker;

pub use crate::node::{AttrCase, AttrOperator, Node, NodeKind, OwnedNode};
pub use crate::parser_config::ParserConfig;
pub use crate::tokenizer::{Comment, Token, TokenKind, TokenStream};

use crate::arena::{flags, Arena, NodeId};
use crate::tokenizer::Tokenizer;
use cow_utils::CowUtils;

/// The parser owns the tokenizer and the arena for the duration of one
/// parse; sub-parsers share the tokenizer through cursor save/restore.
pub struct CssParser<'s> {
    pub(crate) tokenizer: Tokenizer<'s>,
    pub(crate) arena: Arena,
    pub(crate) config: ParserConfig,
    pub(crate) source: &'s str,
}

impl<'s> CssParser<'s> {
    fn new(source: &'s str, config: ParserConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
            arena: Arena::for_source_len(source.len()),
            config,
            source,
        }
    }

    fn into_document(self, root: NodeId) -> CssDocument<'s> {
        CssDocument {
            arena: self.arena,
            source: self.source,
            root,
        }
    }
}

/// The result of a parse: owns the arena, borrows the source. Read-only
/// once built; views may be shared across threads for as long as the
/// document and source live.
pub struct CssDocument<'s> {
    arena: Arena,
    source: &'s str,
    root: NodeId,
}

impl<'s> CssDocument<'s> {
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node::new(&self.arena, self.source, self.root)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node::new(&self.arena, self.source, id)
    }

    #[must_use]
    pub fn source(&self) -> &'s str {
        self.source
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }
}

/// Parses a stylesheet with the default configuration.
#[must_use]
pub fn parse(source: &str) -> CssDocument<'_> {
    parse_with_config(source, ParserConfig::default())
}

/// Parses a stylesheet. Ill-formed input never aborts: the tree may
/// omit malformed fragments but is always walkable.
#[must_use]
pub fn parse_with_config(source: &str, config: ParserConfig) -> CssDocument<'_> {
    let mut parser = CssParser::new(source, config);
    let root = parser.parse_stylesheet();
    parser.into_document(root)
}

/// Parses a stylesheet, delivering every comment to `observer` when
/// `config.skip_comments` is false. Comments never become tree nodes
/// either way.
#[must_use]
pub fn parse_with_comment_observer<'s, F>(source: &'s str, config: ParserConfig, observer: F) -> CssDocument<'s>
where
    F: FnMut(Comment) + 's,
{
    let mut parser = CssParser::new(source, config);
    if !config.skip_comments {
        parser.tokenizer.set_comment_observer(Box::new(observer));
    }
    let root = parser.parse_stylesheet();
    parser.into_document(root)
}

/// Lazy token sequence over `source`, including whitespace and comment
/// tokens; the concatenated token ranges partition the source.
#[must_use]
pub fn tokenize(source: &str) -> TokenStream<'_> {
    TokenStream::new(source)
}

/// Parses `source` as a selector. The root is always a selector-list
/// node; empty input yields an empty list.
#[must_use]
pub fn parse_selector(source: &str) -> CssDocument<'_> {
    let mut parser = CssParser::new(source, ParserConfig::default());
    let root = match parser.parse_selector_list(false) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Ignoring error in parse_selector: {e}");
            parser.arena.create_node(NodeKind::SelectorList, 0, 0, 1, 1)
        }
    };
    parser.into_document(root)
}

/// Parses `source` as an `An+B` expression. Invalid input yields an
/// error-flagged nth node covering the whole source.
#[must_use]
pub fn parse_anplusb(source: &str) -> CssDocument<'_> {
    let mut parser = CssParser::new(source, ParserConfig::default());
    let root = match parser.parse_anplusb() {
        Ok(nth) => nth,
        Err(e) => {
            log::warn!("Ignoring error in parse_anplusb: {e}");
            let node = parser.arena.create_node(NodeKind::Nth, 0, source.len(), 1, 1);
            parser.arena.set_flag(node, flags::ERROR);
            node
        }
    };
    parser.into_document(root)
}

/// Parses an at-rule prelude. `name` (without the `@`) only selects the
/// grammar; all offsets refer to `prelude`. The root is an at-rule node
/// whose children are the prelude nodes.
#[must_use]
pub fn parse_atrule_prelude<'s>(name: &str, prelude: &'s str) -> CssDocument<'s> {
    let mut parser = CssParser::new(prelude, ParserConfig::default());
    let root = parser.arena.create_node(NodeKind::AtRule, 0, prelude.len(), 1, 1);

    let trimmed = prelude.trim();
    if !trimmed.is_empty() {
        let leading = prelude.len() - prelude.trim_start().len();
        parser.arena.set_value_slice(root, leading, trimmed.len());

        let (line, column) = position_after(prelude, leading);
        let saved = parser.tokenizer.enter_window(leading, leading + trimmed.len(), line, column);
        let name = name.cow_to_ascii_lowercase();
        let name = crate::parser::strip_vendor_prefix(name.as_ref());
        if let Err(e) = parser.parse_prelude_dispatch(name, root) {
            log::warn!("Ignoring error in parse_atrule_prelude: {e}");
        }
        parser.tokenizer.restore(saved);
    }

    parser.into_document(root)
}

/// Line/column of the byte at `offset`, counting CR+LF once.
fn position_after(source: &str, offset: usize) -> (u32, u32) {
    let bytes = source.as_bytes();
    let mut line = 1u32;
    let mut column = 1u32;
    for i in 0..offset.min(bytes.len()) {
        match bytes[i] {
            b'\n' => {
                if i == 0 || bytes[i - 1] != b'\r' {
                    line += 1;
                }
                column = 1;
            }
            b'\r' | 0x0C => {
                line += 1;
                column = 1;
            }
            _ => column += 1,
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::{walk, Walker};
    use simple_logger::SimpleLogger;

    #[test]
    fn scenario_simple_rule() {
        // `body { color: red; }`
        let source = "body { color: red; }";
        let doc = parse(source);

        let sheet = doc.root();
        assert_eq!(sheet.kind(), NodeKind::Stylesheet);
        assert_eq!(sheet.length(), 20);

        let rule = sheet.first_child().unwrap();
        assert_eq!(rule.kind(), NodeKind::StyleRule);
        assert_eq!((rule.line(), rule.column()), (1, 1));

        let list = rule.first_child().unwrap();
        assert_eq!(list.kind(), NodeKind::SelectorList);
        assert_eq!(list.text(), "body");

        let block = list.next_sibling().unwrap();
        assert_eq!(block.kind(), NodeKind::Block);
        let decl = block.first_child().unwrap();
        assert_eq!(decl.name(), "color");
        assert_eq!(decl.value(), "red");
        assert!(!decl.is_important());
    }

    #[test]
    fn scenario_selector_list_and_important() {
        let source = ".a, .b > span { margin: 0 !important; }";
        let doc = parse(source);

        let rule = doc.root().first_child().unwrap();
        let list = rule.first_child().unwrap();
        assert_eq!(list.child_count(), 2);

        let second = list.children().nth(1).unwrap();
        let kinds: Vec<_> = second.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::ClassSelector, NodeKind::Combinator, NodeKind::TypeSelector]
        );

        let decl = rule.children().nth(1).unwrap().first_child().unwrap();
        assert_eq!(decl.name(), "margin");
        assert_eq!(decl.value(), "0");
        assert!(decl.is_important());
    }

    #[test]
    fn scenario_media_rule() {
        let source = "@media (min-width: 768px) { body { color: red; } }";
        let doc = parse(source);

        let at = doc.root().first_child().unwrap();
        assert_eq!(at.kind(), NodeKind::AtRule);
        assert_eq!(at.name(), "media");
        assert_eq!(at.prelude(), "(min-width: 768px)");
        assert!(at.has_block());

        let block = at.children().last().unwrap();
        assert_eq!(block.first_child().unwrap().kind(), NodeKind::StyleRule);
    }

    #[test]
    fn scenario_nth_of() {
        let doc = parse_selector(":nth-child(2n+1 of .item)");
        let pseudo = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(pseudo.kind(), NodeKind::PseudoClass);
        assert_eq!(pseudo.name(), "nth-child");

        let nth_of = pseudo.first_child().unwrap();
        assert_eq!(nth_of.kind(), NodeKind::NthOf);
        let nth = nth_of.first_child().unwrap();
        assert_eq!(nth.name(), "2n");
        assert_eq!(nth.value(), "1");

        let inner = nth_of.children().nth(1).unwrap();
        assert_eq!(inner.kind(), NodeKind::SelectorList);
        assert_eq!(inner.child_count(), 1);
    }

    #[test]
    fn scenario_data_uri() {
        let source = "body { background: url(data:image/png;base64,ABC==); }";
        let doc = parse(source);
        let decl = doc
            .root()
            .first_child()
            .unwrap()
            .children()
            .nth(1)
            .unwrap()
            .first_child()
            .unwrap();
        let url = decl.first_child().unwrap();
        assert_eq!(url.kind(), NodeKind::Function);
        assert_eq!(url.name(), "url");
        assert_eq!(url.value(), "data:image/png;base64,ABC==");
        assert!(!url.has_children());
        assert!(decl.first_child().unwrap().next_sibling().is_none());
    }

    #[test]
    fn scenario_nesting() {
        let source = ".parent { color: red; & .child { color: blue; } }";
        let doc = parse(source);
        let block = doc.root().first_child().unwrap().children().nth(1).unwrap();
        let kinds: Vec<_> = block.children().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Declaration, NodeKind::StyleRule]);
        let nested = block.children().nth(1).unwrap();
        assert_eq!(nested.first_child().unwrap().text(), "& .child");
    }

    #[test]
    fn node_ranges_contain_descendants() {
        let source = "@media screen and (a:1) { .x > [b=c] { p: url(q) 1px calc(2em + 5%); } }\n#id:is(a, b)::after { q: \"s\" }";
        let doc = parse(source);
        walk(doc.root(), &mut |node, _| {
            let (start, end) = (node.start_offset(), node.start_offset() + node.length());
            let mut child = node.first_child();
            while let Some(c) = child {
                assert!(c.start_offset() >= start, "{:?} starts before parent", c);
                assert!(c.start_offset() + c.length() <= end, "{:?} ends after parent {:?}", c, node);
                child = c.next_sibling();
            }
        });
    }

    #[test]
    fn sibling_chains_terminate_at_last_child() {
        let source = "a{p:1;q:2;r:3} @media x{b{s:4}}";
        let doc = parse(source);
        walk(doc.root(), &mut |node, _| {
            let mut count = 0usize;
            let mut last = None;
            let mut child = node.first_child();
            while let Some(c) = child {
                count += 1;
                last = Some(c.id());
                child = c.next_sibling();
            }
            assert_eq!(node.child_count(), count);
            let arena = doc.arena();
            assert_eq!(arena.last_child(node.id()), last);
            assert_eq!(arena.first_child(node.id()).is_some(), last.is_some());
        });
    }

    #[test]
    fn comments_do_not_change_tree_shape() {
        let plain = parse("a > b { color: red; }");
        let commented = parse("a/*x*/ > /*y*/b { /*z*/color/*w*/: red/*v*/; }");
        assert_eq!(
            Walker::new(plain.root()).walk_to_string(),
            Walker::new(commented.root()).walk_to_string()
        );
    }

    #[test]
    fn comment_observer_receives_positions() {
        let source = "/* head */ a { x: 1 } /* tail */";
        let mut seen: Vec<(usize, usize, u32, u32)> = Vec::new();
        let config = ParserConfig {
            skip_comments: false,
            ..Default::default()
        };
        let doc = parse_with_comment_observer(source, config, |c: Comment| {
            seen.push((c.start, c.end, c.line, c.column));
        });
        assert!(doc.root().has_children());
        drop(doc);
        assert_eq!(seen, vec![(0, 10, 1, 1), (22, 32, 1, 23)]);
    }

    #[test]
    fn walk_visits_pre_order_with_depths() {
        let doc = parse("a { b: 1 }");
        let mut trace: Vec<(NodeKind, usize)> = Vec::new();
        walk(doc.root(), &mut |node, depth| trace.push((node.kind(), depth)));
        assert_eq!(
            trace,
            vec![
                (NodeKind::Stylesheet, 0),
                (NodeKind::StyleRule, 1),
                (NodeKind::SelectorList, 2),
                (NodeKind::Selector, 3),
                (NodeKind::TypeSelector, 4),
                (NodeKind::Block, 2),
                (NodeKind::Declaration, 3),
                (NodeKind::Number, 4),
            ]
        );
    }

    #[test]
    fn standalone_prelude_entry() {
        let doc = parse_atrule_prelude("media", "screen and (color)");
        let at = doc.root();
        assert_eq!(at.kind(), NodeKind::AtRule);
        assert_eq!(at.prelude(), "screen and (color)");
        let query = at.first_child().unwrap();
        assert_eq!(query.kind(), NodeKind::MediaQuery);
        let kinds: Vec<_> = query.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::MediaType, NodeKind::PreludeOperator, NodeKind::MediaFeature]
        );
    }

    #[test]
    fn reparse_round_trips_selector_text() {
        let doc = parse(".a > .b:hover, #c { x: 1 }");
        let list = doc.root().first_child().unwrap().first_child().unwrap();
        let reparsed = parse_selector(list.text());
        assert_eq!(reparsed.root().kind(), list.kind());
        assert_eq!(reparsed.root().length(), list.length());
        assert_eq!(reparsed.root().child_count(), list.child_count());
    }

    #[test]
    fn reparse_round_trips_prelude_text() {
        let doc = parse("@media only screen and (min-width: 10em) { }");
        let at = doc.root().first_child().unwrap();
        let reparsed = parse_atrule_prelude("media", at.prelude());
        let original: Vec<_> = at
            .children()
            .filter(|c| c.kind() != NodeKind::Block)
            .map(|c| c.kind())
            .collect();
        let round: Vec<_> = reparsed.root().children().map(|c| c.kind()).collect();
        assert_eq!(original, round);
    }

    #[test]
    fn reparse_round_trips_value_text() {
        let doc = parse("a { grid: auto-flow dense / repeat(3, 1fr) }");
        let decl = doc.root().first_child().unwrap().children().nth(1).unwrap().first_child().unwrap();
        let kinds: Vec<_> = decl.children().map(|c| c.kind()).collect();

        let synthesized = format!("a {{ grid: {} }}", decl.value());
        let reparsed = parse(&synthesized);
        let redecl = reparsed
            .root()
            .first_child()
            .unwrap()
            .children()
            .nth(1)
            .unwrap()
            .first_child()
            .unwrap();
        let rekinds: Vec<_> = redecl.children().map(|c| c.kind()).collect();
        assert_eq!(kinds, rekinds);
        assert_eq!(decl.value(), redecl.value());
    }

    #[test]
    fn detached_clone_survives_the_source() {
        let owned = {
            let source = String::from("a { width: 1.5rem }");
            let doc = parse(&source);
            doc.root().to_owned(true, true)
        };
        assert_eq!(owned.kind, NodeKind::Stylesheet);
        let decl = &owned.children[0].children[1].children[0];
        assert_eq!(decl.name.as_deref(), Some("width"));
        let dim = &decl.children[0];
        assert_eq!(dim.numeric, Some(1.5));
        assert_eq!(dim.unit.as_deref(), Some("rem"));
        assert_eq!(dim.line, Some(1));
    }

    #[test]
    fn parser_smoke_test_on_framework_like_css() {
        let _ = SimpleLogger::new().init();

        let source = r#"
@layer reset, base;
@import url("reset.css") layer(reset);

:root {
    --brand: #336699;
    --gap: calc(1rem + 2px);
}

@media screen and (min-width: 48em), print {
    .grid > .cell:nth-child(2n+1 of .odd) {
        margin: 0 auto !important;
        background: url(data:image/svg+xml;base64,PHN2Zz4=) no-repeat;
    }
    .grid:has(> img)::after { content: "»"; }
}

@supports (display: grid) and (gap: 1em) {
    @keyframes slide { from { left: 0 } to { left: 100% } }
}
"#;
        let doc = parse(source);
        assert!(doc.root().has_children());
        assert!(doc.node_count() > 30);

        // the tree is fully walkable and every node text is in bounds
        let mut nodes = 0usize;
        walk(doc.root(), &mut |node, _| {
            let _ = node.text();
            nodes += 1;
        });
        assert!(nodes > 30);
    }
}
