use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::{AttrCase, AttrOperator, NodeKind};
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

impl CssParser<'_> {
    /// One compound/complex selector. Components are appended in
    /// source order, interleaved with combinator nodes; a run of
    /// whitespace between compounds becomes a descendant combinator.
    /// Returns `None` when no component was found; junk ends the
    /// selector at the last good component.
    pub(crate) fn parse_selector(&mut self, relative: bool) -> Option<NodeId> {
        log::trace!("parse_selector");

        let mut selector: Option<NodeId> = None;
        let mut pending_ws: Option<Token> = None;
        let mut after_combinator = false;
        let mut end = 0usize;

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next_spaced();
            match t.kind {
                TokenKind::Whitespace => {
                    // whitespace next to an explicit combinator is not
                    // a descendant combinator
                    if selector.is_some() && !after_combinator {
                        pending_ws = Some(t);
                    }
                }
                TokenKind::Eof => break,
                TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::LCurly
                | TokenKind::RCurly
                | TokenKind::Semicolon => {
                    self.tokenizer.restore(saved);
                    break;
                }
                TokenKind::Delim(b'>' | b'+' | b'~') => {
                    if selector.is_none() && !relative {
                        // a leading combinator is only valid in a
                        // relative-selector context (`:has()`)
                        self.tokenizer.restore(saved);
                        break;
                    }
                    if selector.is_none() {
                        selector = Some(self.arena.create_node(NodeKind::Selector, t.start, 0, t.line, t.column));
                    }
                    pending_ws = None;
                    after_combinator = true;
                    let combinator = self.node_at(NodeKind::Combinator, t);
                    if let Some(s) = selector {
                        self.arena.append_child(s, combinator);
                    }
                    end = t.end;
                }
                _ => {
                    self.tokenizer.restore(saved);
                    let component = match self.parse_simple_selector() {
                        Ok(component) => component,
                        Err(_) => {
                            self.tokenizer.restore(saved);
                            break;
                        }
                    };
                    if selector.is_none() {
                        let start = self.arena.start_offset(component);
                        let line = self.arena.line(component);
                        let column = self.arena.column(component);
                        selector = Some(self.arena.create_node(NodeKind::Selector, start, 0, line, column));
                    }
                    if let Some(s) = selector {
                        if let Some(ws) = pending_ws.take() {
                            let combinator = self.node_at(NodeKind::Combinator, ws);
                            self.arena.append_child(s, combinator);
                        }
                        self.arena.append_child(s, component);
                    }
                    after_combinator = false;
                    end = self.node_end(component);
                }
            }
        }

        if let Some(s) = selector {
            self.arena.set_end_offset(s, end);
        }
        selector
    }

    /// Dispatches on the first token of a simple selector.
    fn parse_simple_selector(&mut self) -> CssResult<NodeId> {
        let t = self.tokenizer.next();
        match t.kind {
            TokenKind::Ident => self.parse_type_selector(t),
            TokenKind::Delim(b'*') => self.parse_universal_selector(t),
            TokenKind::Delim(b'|') => self.parse_bare_namespace_selector(t),
            TokenKind::Delim(b'.') => self.parse_class_selector(t),
            TokenKind::Hash => {
                let node = self.node_at(NodeKind::IdSelector, t);
                self.arena.set_content_slice(node, t.start + 1, t.end - t.start - 1);
                Ok(node)
            }
            TokenKind::Delim(b'&') => Ok(self.node_at(NodeKind::Nesting, t)),
            TokenKind::LBracket => self.parse_attribute_selector(t),
            TokenKind::Colon => self.parse_pseudo_selector(t),
            // keyframe selectors (`0%`, `100%`) ride the type-selector
            // kind: the selector grammar has no numeric kinds
            TokenKind::Number | TokenKind::Percentage | TokenKind::Dimension => {
                Ok(self.node_with_content(NodeKind::TypeSelector, t))
            }
            _ => Err(self.unexpected("simple selector", t)),
        }
    }

    /// `span`, or `svg|circle` where the identifier turns out to be a
    /// namespace prefix. The local name lands in the content slice and
    /// the namespace in the value slice.
    fn parse_type_selector(&mut self, t: Token) -> CssResult<NodeId> {
        if let Some(local) = self.namespace_local(t.end) {
            let node = if local.kind == TokenKind::Ident {
                let node = self.node_from(NodeKind::TypeSelector, t);
                self.arena.set_content_slice(node, local.start, local.end - local.start);
                node
            } else {
                self.node_from(NodeKind::Universal, t)
            };
            self.arena.set_value_slice(node, t.start, t.end - t.start);
            self.arena.set_end_offset(node, local.end);
            return Ok(node);
        }
        Ok(self.node_with_content(NodeKind::TypeSelector, t))
    }

    /// `*`, or `*|span` (any-namespace selector).
    fn parse_universal_selector(&mut self, t: Token) -> CssResult<NodeId> {
        if let Some(local) = self.namespace_local(t.end) {
            let node = if local.kind == TokenKind::Ident {
                let node = self.node_from(NodeKind::TypeSelector, t);
                self.arena.set_content_slice(node, local.start, local.end - local.start);
                node
            } else {
                self.node_from(NodeKind::Universal, t)
            };
            self.arena.set_value_slice(node, t.start, t.end - t.start);
            self.arena.set_end_offset(node, local.end);
            return Ok(node);
        }
        Ok(self.node_at(NodeKind::Universal, t))
    }

    /// `|span`: empty namespace plus local name.
    fn parse_bare_namespace_selector(&mut self, bar: Token) -> CssResult<NodeId> {
        let local = self.tokenizer.next();
        if local.start != bar.end {
            return Err(self.unexpected("type after '|'", local));
        }
        match local.kind {
            TokenKind::Ident => {
                let node = self.node_from(NodeKind::TypeSelector, bar);
                self.arena.set_content_slice(node, local.start, local.end - local.start);
                self.arena.set_value_slice(node, bar.start, 0);
                self.arena.set_end_offset(node, local.end);
                Ok(node)
            }
            TokenKind::Delim(b'*') => {
                let node = self.node_from(NodeKind::Universal, bar);
                self.arena.set_value_slice(node, bar.start, 0);
                self.arena.set_end_offset(node, local.end);
                Ok(node)
            }
            _ => Err(self.unexpected("type after '|'", local)),
        }
    }

    /// When the token ending at `after` is immediately followed by `|`
    /// and a local name, consumes both and returns the local-name
    /// token.
    fn namespace_local(&mut self, after: usize) -> Option<Token> {
        let saved = self.tokenizer.state();
        let bar = self.tokenizer.next();
        if bar.is_delim(b'|') && bar.start == after {
            let local = self.tokenizer.next();
            if (local.kind == TokenKind::Ident || local.is_delim(b'*')) && local.start == bar.end {
                return Some(local);
            }
        }
        self.tokenizer.restore(saved);
        None
    }

    fn parse_class_selector(&mut self, dot: Token) -> CssResult<NodeId> {
        log::trace!("parse_class_selector");

        let name = self.tokenizer.next();
        if name.kind != TokenKind::Ident || name.start != dot.end {
            return Err(self.unexpected("class name", name));
        }
        let node = self.node_from(NodeKind::ClassSelector, dot);
        self.arena.set_content_slice(node, name.start, name.end - name.start);
        self.arena.set_end_offset(node, name.end);
        Ok(node)
    }

    /// `[attr]`, `[attr=value]`, `[attr~="value" i]` and the other
    /// operator forms. Operator and case flags live in the dedicated
    /// record bytes.
    fn parse_attribute_selector(&mut self, open: Token) -> CssResult<NodeId> {
        log::trace!("parse_attribute_selector");

        let name = self.tokenizer.next();
        if name.kind != TokenKind::Ident {
            return Err(self.unexpected("attribute name", name));
        }
        let node = self.node_from(NodeKind::Attribute, open);
        self.arena.set_content_slice(node, name.start, name.end - name.start);

        let mut t = self.tokenizer.next();
        if let TokenKind::Delim(op @ (b'=' | b'~' | b'|' | b'^' | b'$' | b'*')) = t.kind {
            let operator = match op {
                b'=' => AttrOperator::Equals,
                b'~' => AttrOperator::Includes,
                b'|' => AttrOperator::DashMatch,
                b'^' => AttrOperator::Prefix,
                b'$' => AttrOperator::Suffix,
                _ => AttrOperator::Substring,
            };
            if op != b'=' {
                let eq = self.tokenizer.next();
                if !eq.is_delim(b'=') || eq.start != t.end {
                    return Err(self.unexpected("'='", eq));
                }
            }
            self.arena.set_attr_op(node, operator as u8);

            let value = self.tokenizer.next();
            match value.kind {
                TokenKind::QuotedString => {
                    let (s, e) = self.string_inner(value);
                    self.arena.set_value_slice(node, s, e - s);
                }
                TokenKind::Ident => {
                    self.arena.set_value_slice(node, value.start, value.end - value.start);
                }
                _ => return Err(self.unexpected("attribute value", value)),
            }
            t = self.tokenizer.next();
        }

        if t.kind == TokenKind::Ident {
            let case = match self.token_text(t) {
                "i" | "I" => AttrCase::Insensitive,
                "s" | "S" => AttrCase::Sensitive,
                _ => AttrCase::None,
            };
            if case == AttrCase::None {
                return Err(self.unexpected("'i' or 's' flag", t));
            }
            self.arena.set_attr_flags(node, case as u8);
            t = self.tokenizer.next();
        }

        if t.kind != TokenKind::RBracket {
            return Err(self.unexpected("']'", t));
        }
        self.arena.set_end_offset(node, t.end);
        Ok(node)
    }

    /// `:pseudo`, `::pseudo` and the functional forms.
    fn parse_pseudo_selector(&mut self, colon: Token) -> CssResult<NodeId> {
        log::trace!("parse_pseudo_selector");

        let t = self.tokenizer.next();
        if t.start != colon.end {
            return Err(self.unexpected("pseudo-class name", t));
        }
        match t.kind {
            TokenKind::Colon => {
                let name = self.tokenizer.next();
                if name.start != t.end {
                    return Err(self.unexpected("pseudo-element name", name));
                }
                match name.kind {
                    TokenKind::Ident => {
                        let node = self.node_from(NodeKind::PseudoElement, colon);
                        self.arena.set_content_slice(node, name.start, name.end - name.start);
                        self.arena.set_end_offset(node, name.end);
                        Ok(node)
                    }
                    TokenKind::Function => self.parse_pseudo_function(colon, name, NodeKind::PseudoElement),
                    _ => Err(self.unexpected("pseudo-element name", name)),
                }
            }
            TokenKind::Ident => {
                let node = self.node_from(NodeKind::PseudoClass, colon);
                self.arena.set_content_slice(node, t.start, t.end - t.start);
                self.arena.set_end_offset(node, t.end);
                Ok(node)
            }
            TokenKind::Function => self.parse_pseudo_function(colon, t, NodeKind::PseudoClass),
            _ => Err(self.unexpected("pseudo-class name", t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{AttrCase, AttrOperator, NodeKind};
    use crate::walker::Walker;

    macro_rules! test {
        ($input:expr, $expected:expr) => {
            let doc = crate::parse_selector($input);
            let w = Walker::new(doc.root());
            assert_eq!(w.walk_to_string(), $expected);
        };
    }

    #[test]
    fn simple_components() {
        test!(
            "div.foo#bar",
            "[SelectorList (1)]\n  [Selector]\n    [TypeSelector] div\n    [ClassSelector] foo\n    [IdSelector] bar\n"
        );
        test!(
            "*",
            "[SelectorList (1)]\n  [Selector]\n    [Universal] *\n"
        );
        test!(
            "&:hover",
            "[SelectorList (1)]\n  [Selector]\n    [Nesting]\n    [PseudoClass] hover\n"
        );
    }

    #[test]
    fn combinators() {
        test!(
            "a > b + c ~ d e",
            "[SelectorList (1)]\n  [Selector]\n    [TypeSelector] a\n    [Combinator] >\n    [TypeSelector] b\n    [Combinator] +\n    [TypeSelector] c\n    [Combinator] ~\n    [TypeSelector] d\n    [Combinator]  \n    [TypeSelector] e\n"
        );
    }

    #[test]
    fn descendant_combinator_spans_the_whitespace() {
        let doc = crate::parse_selector("a  b");
        let selector = doc.root().first_child().unwrap();
        let combinator = selector.children().nth(1).unwrap();
        assert_eq!(combinator.kind(), NodeKind::Combinator);
        assert_eq!(combinator.text(), "  ");
    }

    #[test]
    fn namespaced_type_selectors() {
        let doc = crate::parse_selector("svg|circle");
        let ty = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(ty.kind(), NodeKind::TypeSelector);
        assert_eq!(ty.name(), "circle");
        assert_eq!(ty.value(), "svg");
        assert_eq!(ty.text(), "svg|circle");

        let doc = crate::parse_selector("*|span");
        let ty = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(ty.name(), "span");
        assert_eq!(ty.value(), "*");

        let doc = crate::parse_selector("|span");
        let ty = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(ty.name(), "span");
        assert_eq!(ty.value(), "");

        let doc = crate::parse_selector("svg|*");
        let any = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(any.kind(), NodeKind::Universal);
        assert_eq!(any.value(), "svg");
    }

    #[test]
    fn pseudo_elements() {
        test!(
            "p::first-line",
            "[SelectorList (1)]\n  [Selector]\n    [TypeSelector] p\n    [PseudoElement] first-line\n"
        );
    }

    #[test]
    fn attribute_selector_forms() {
        let doc = crate::parse_selector("[disabled]");
        let attr = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(attr.kind(), NodeKind::Attribute);
        assert_eq!(attr.name(), "disabled");
        assert_eq!(attr.attribute_operator(), AttrOperator::None);
        assert_eq!(attr.value(), "");

        let doc = crate::parse_selector("[href^=\"https\"]");
        let attr = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(attr.attribute_operator(), AttrOperator::Prefix);
        assert_eq!(attr.value(), "https");

        let doc = crate::parse_selector("[lang|=en]");
        let attr = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(attr.attribute_operator(), AttrOperator::DashMatch);
        assert_eq!(attr.value(), "en");

        let doc = crate::parse_selector("[title~=\"hello\" i]");
        let attr = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(attr.attribute_operator(), AttrOperator::Includes);
        assert_eq!(attr.attribute_case(), AttrCase::Insensitive);

        let doc = crate::parse_selector("[data-x$=y s]");
        let attr = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(attr.attribute_operator(), AttrOperator::Suffix);
        assert_eq!(attr.attribute_case(), AttrCase::Sensitive);
    }

    #[test]
    fn attribute_with_inner_whitespace_and_comments() {
        let doc = crate::parse_selector("[ data-kind /* k */ = card ]");
        let attr = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(attr.name(), "data-kind");
        assert_eq!(attr.value(), "card");
    }

    #[test]
    fn leading_combinator_is_end_of_input_outside_has() {
        let doc = crate::parse_selector("> a");
        assert!(!doc.root().has_children());
    }

    #[test]
    fn compound_iteration() {
        let doc = crate::parse_selector("div.foo > span, b");
        let selector = doc.root().first_child().unwrap();
        let compounds: Vec<Vec<_>> = selector.compounds().collect();
        assert_eq!(compounds.len(), 2);
        assert_eq!(compounds[0].len(), 2);
        assert_eq!(compounds[1].len(), 1);
        assert_eq!(compounds[1][0].text(), "span");
    }

    #[test]
    fn selector_subtree_disabled_keeps_raw_slice() {
        let config = crate::ParserConfig {
            parse_selectors: false,
            ..Default::default()
        };
        let doc = crate::parse_with_config(".a > .b { x: 1 }", config);
        let rule = doc.root().first_child().unwrap();
        let list = rule.first_child().unwrap();
        assert_eq!(list.kind(), NodeKind::SelectorList);
        assert_eq!(list.text(), ".a > .b");
        assert!(!list.has_children());
    }
}
