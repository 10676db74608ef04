use crate::arena::{flags, NodeId};
use crate::node::NodeKind;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

impl CssParser<'_> {
    /// Parses the current window into a flat sequence of value nodes
    /// appended to `parent`, recursing into functions and parenthesized
    /// groups. Never fails: unexpected tokens end the sequence.
    pub(crate) fn parse_values_into(&mut self, parent: NodeId) {
        log::trace!("parse_value_sequence");

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            let child = match t.kind {
                TokenKind::Eof => break,
                TokenKind::RParen => {
                    self.tokenizer.restore(saved);
                    break;
                }
                TokenKind::Ident => self.node_at(NodeKind::Ident, t),
                TokenKind::Number => self.node_at(NodeKind::Number, t),
                TokenKind::Percentage | TokenKind::Dimension => self.node_at(NodeKind::Dimension, t),
                // unicode ranges surface as plain value identifiers
                TokenKind::UnicodeRange => self.node_at(NodeKind::Ident, t),
                TokenKind::QuotedString | TokenKind::BadString => {
                    let node = self.node_at(NodeKind::String, t);
                    let (s, e) = self.string_inner(t);
                    self.arena.set_content_slice(node, s, e - s);
                    if t.kind == TokenKind::BadString {
                        self.arena.set_flag(node, flags::ERROR);
                    }
                    node
                }
                TokenKind::Hash => {
                    let node = self.node_at(NodeKind::Hash, t);
                    self.arena.set_content_slice(node, t.start + 1, t.end - t.start - 1);
                    node
                }
                TokenKind::Url | TokenKind::BadUrl => self.url_value_node(t),
                TokenKind::Function => {
                    if self.function_is(t, "url") || self.function_is(t, "src") {
                        self.parse_raw_function(t)
                    } else {
                        self.parse_value_function(t)
                    }
                }
                TokenKind::LParen => self.parse_value_group(t),
                TokenKind::Comma => self.node_at(NodeKind::Operator, t),
                TokenKind::Delim(b'+' | b'-' | b'*' | b'/') => self.node_at(NodeKind::Operator, t),
                _ => {
                    self.tokenizer.restore(saved);
                    break;
                }
            };
            self.arena.append_child(parent, child);
        }
    }

    /// A function whose arguments are themselves a value sequence
    /// (`calc(...)`, `rgb(...)`, `var(...)`).
    fn parse_value_function(&mut self, func: Token) -> NodeId {
        log::trace!("parse_value_function");

        let node = self.node_from(NodeKind::Function, func);
        let (name_start, name_end) = func.function_name();
        self.arena.set_content_slice(node, name_start, name_end - name_start);
        self.arena.set_flag(node, flags::HAS_PARENS);

        self.parse_values_into(node);
        self.close_group(node)
    }

    /// `( ... )` outside a function, as used by bare-paren `calc()`
    /// math.
    fn parse_value_group(&mut self, open: Token) -> NodeId {
        log::trace!("parse_value_group");

        let node = self.node_from(NodeKind::Parenthesis, open);
        self.arena.set_flag(node, flags::HAS_PARENS);
        self.parse_values_into(node);
        self.close_group(node)
    }

    fn close_group(&mut self, node: NodeId) -> NodeId {
        let t = self.tokenizer.next();
        if t.kind == TokenKind::RParen {
            self.arena.set_end_offset(node, t.end);
        } else {
            // unterminated group; keep what was parsed
            self.arena.set_flag(node, flags::ERROR);
            self.arena.set_end_offset(node, t.start);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeKind;

    fn value_kinds(css_value: &str) -> Vec<NodeKind> {
        let source = format!("a {{ p: {css_value} }}");
        let doc = crate::parse(&source);
        let rule = doc.root().first_child().unwrap();
        let block = rule.children().nth(1).unwrap();
        let decl = block.first_child().unwrap();
        decl.children().map(|c| c.kind()).collect()
    }

    #[test]
    fn flat_token_values() {
        assert_eq!(
            value_kinds("1px solid #ccc"),
            vec![NodeKind::Dimension, NodeKind::Ident, NodeKind::Hash]
        );
        assert_eq!(
            value_kinds("0, 50%, \"x\""),
            vec![
                NodeKind::Number,
                NodeKind::Operator,
                NodeKind::Dimension,
                NodeKind::Operator,
                NodeKind::String,
            ]
        );
    }

    #[test]
    fn function_values_recurse() {
        let source = "a { width: calc(100% - 2em) }";
        let doc = crate::parse(source);
        let rule = doc.root().first_child().unwrap();
        let decl = rule.children().nth(1).unwrap().first_child().unwrap();
        let calc = decl.first_child().unwrap();
        assert_eq!(calc.kind(), NodeKind::Function);
        assert_eq!(calc.name(), "calc");
        assert!(calc.has_parens());

        let kinds: Vec<_> = calc.children().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Dimension, NodeKind::Operator, NodeKind::Dimension]);
        assert_eq!(calc.text(), "calc(100% - 2em)");
    }

    #[test]
    fn nested_functions() {
        let source = "a { width: min(10px, max(5px, 2vw)) }";
        let doc = crate::parse(source);
        let decl = doc
            .root()
            .first_child()
            .unwrap()
            .children()
            .nth(1)
            .unwrap()
            .first_child()
            .unwrap();
        let min = decl.first_child().unwrap();
        let max = min.children().last().unwrap();
        assert_eq!(max.name(), "max");
        assert_eq!(max.child_count(), 3);
    }

    #[test]
    fn parenthesized_group() {
        let kinds = value_kinds("(1 + 2) * 3");
        assert_eq!(kinds, vec![NodeKind::Parenthesis, NodeKind::Operator, NodeKind::Number]);
    }

    #[test]
    fn url_function_keeps_raw_value() {
        let source = "body { background: url(data:image/png;base64,ABC==); }";
        let doc = crate::parse(source);
        let decl = doc
            .root()
            .first_child()
            .unwrap()
            .children()
            .nth(1)
            .unwrap()
            .first_child()
            .unwrap();
        assert_eq!(decl.child_count(), 1);
        let url = decl.first_child().unwrap();
        assert_eq!(url.kind(), NodeKind::Function);
        assert_eq!(url.name(), "url");
        assert_eq!(url.value(), "data:image/png;base64,ABC==");
        assert!(!url.has_children());
    }

    #[test]
    fn quoted_url_keeps_quotes_verbatim() {
        let source = "a { background: url(\"img.png\") }";
        let doc = crate::parse(source);
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
        assert_eq!(url.value(), "\"img.png\"");
        assert!(!url.has_children());
    }

    #[test]
    fn src_function_is_raw_like_url() {
        let source = "@font-face { src: src(\"a.woff\") format(\"woff\"); }";
        let doc = crate::parse(source);
        let decl = doc
            .root()
            .first_child()
            .unwrap()
            .children()
            .last()
            .unwrap()
            .first_child()
            .unwrap();
        let src = decl.first_child().unwrap();
        assert_eq!(src.name(), "src");
        assert!(!src.has_children());
        let format = decl.children().nth(1).unwrap();
        assert_eq!(format.name(), "format");
        assert!(format.has_children());
    }

    #[test]
    fn unicode_range_value() {
        let kinds = value_kinds("U+0-7F");
        assert_eq!(kinds, vec![NodeKind::Ident]);
    }

    #[test]
    fn unterminated_function_sets_error() {
        let source = "a { width: calc(1px + ; }";
        let doc = crate::parse(source);
        let decl = doc
            .root()
            .first_child()
            .unwrap()
            .children()
            .nth(1)
            .unwrap()
            .first_child()
            .unwrap();
        let calc = decl.first_child().unwrap();
        assert!(calc.has_error());
    }
}
