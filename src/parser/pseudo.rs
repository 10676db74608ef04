use crate::arena::{flags, NodeId};
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;
use cow_utils::CowUtils;

impl CssParser<'_> {
    /// Functional pseudo (`:nth-child(...)`, `:is(...)`, `::part(...)`).
    /// `colon` is the leading `:`, `func` the function token; `kind`
    /// distinguishes pseudo-classes from functional pseudo-elements.
    pub(crate) fn parse_pseudo_function(&mut self, colon: Token, func: Token, kind: NodeKind) -> CssResult<NodeId> {
        log::trace!("parse_pseudo_function");

        let node = self.node_from(kind, colon);
        let (name_start, name_end) = func.function_name();
        self.arena.set_content_slice(node, name_start, name_end - name_start);

        let name = self.source.get(name_start..name_end).unwrap_or("");
        let name = name.cow_to_ascii_lowercase();
        match name.as_ref() {
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" | "nth-col" | "nth-last-col" => {
                self.parse_nth_argument(node)?;
            }
            "lang" => self.parse_lang_arguments(node),
            "has" => {
                // relative-selector mode allows a leading combinator
                let list = self.parse_selector_list(true)?;
                self.arena.append_child(node, list);
            }
            _ => {
                // `:is()`, `:where()`, `:not()` and anything unknown:
                // the argument is a selector list, with the raw text
                // kept in the value slice either way
                let arg = self.tokenizer.peek();
                let list = self.parse_selector_list(false)?;
                self.arena.append_child(node, list);
                if arg.kind != TokenKind::RParen && arg.kind != TokenKind::Eof {
                    self.arena.set_value_slice(node, arg.start, self.node_end(list).saturating_sub(arg.start));
                }
            }
        }

        // tolerate an unparsed argument remainder up to the closing `)`
        let mut depth = 0usize;
        loop {
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::RParen => {
                    if depth == 0 {
                        self.arena.set_end_offset(node, t.end);
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Eof => {
                    self.arena.set_flag(node, flags::ERROR);
                    self.arena.set_end_offset(node, t.start);
                    break;
                }
                TokenKind::LParen | TokenKind::Function => depth += 1,
                _ => {}
            }
        }

        Ok(node)
    }

    /// `An+B`, optionally followed by `of <selector-list>`; the latter
    /// wraps both in an nth-of node.
    fn parse_nth_argument(&mut self, node: NodeId) -> CssResult<()> {
        log::trace!("parse_nth_argument");

        let nth = self.parse_anplusb()?;

        let saved = self.tokenizer.state();
        let t = self.tokenizer.next();
        if t.kind == TokenKind::Ident && self.token_text(t).eq_ignore_ascii_case("of") {
            let list = self.parse_selector_list(false)?;

            let start = self.arena.start_offset(nth);
            let line = self.arena.line(nth);
            let column = self.arena.column(nth);
            let nth_of = self.arena.create_node(NodeKind::NthOf, start, 0, line, column);
            self.arena.set_end_offset(nth_of, self.node_end(list));
            self.arena.append_child(nth_of, nth);
            self.arena.append_child(nth_of, list);
            self.arena.append_child(node, nth_of);
        } else {
            self.tokenizer.restore(saved);
            self.arena.append_child(node, nth);
        }
        Ok(())
    }

    /// `:lang(en, "de-DE")`: comma-separated identifiers or strings,
    /// each its own lang node.
    fn parse_lang_arguments(&mut self, node: NodeId) {
        log::trace!("parse_lang_arguments");

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Ident => {
                    let lang = self.node_with_content(NodeKind::Lang, t);
                    self.arena.append_child(node, lang);
                }
                TokenKind::QuotedString => {
                    let lang = self.node_at(NodeKind::Lang, t);
                    let (s, e) = self.string_inner(t);
                    self.arena.set_content_slice(lang, s, e - s);
                    self.arena.append_child(node, lang);
                }
                TokenKind::Comma => {}
                _ => {
                    self.tokenizer.restore(saved);
                    break;
                }
            }
        }
    }
}
