use crate::arena::{flags, NodeId};
use crate::node::NodeKind;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

impl CssParser<'_> {
    /// An unquoted `url(...)` token becomes a function node whose value
    /// slice holds the inner bytes verbatim and which has no children.
    /// Data URIs and URLs with characters the tokenizer would otherwise
    /// split survive untouched.
    pub(crate) fn url_value_node(&mut self, t: Token) -> NodeId {
        log::trace!("parse_url");

        let node = self.node_at(NodeKind::Function, t);
        let text = self.token_text(t);
        let name_len = text.find('(').unwrap_or(0);
        self.arena.set_content_slice(node, t.start, name_len);

        let (s, e) = self.url_token_inner(t);
        self.arena.set_value_slice(node, s, e - s);

        if t.kind == TokenKind::BadUrl {
            self.arena.set_flag(node, flags::ERROR);
        }
        node
    }

    /// Inner byte range of a `url(...)` token, with the parens and the
    /// surrounding whitespace stripped.
    pub(crate) fn url_token_inner(&self, t: Token) -> (usize, usize) {
        let text = self.token_text(t);
        let open = text.find('(').map_or(text.len(), |i| i + 1);
        let closed = text.ends_with(')') && text.len() > open;
        let inner = &text[open..text.len() - usize::from(closed)];

        let trimmed = inner.trim();
        if trimmed.is_empty() {
            return (t.start + open, t.start + open);
        }
        let leading = inner.len() - inner.trim_start().len();
        let start = t.start + open + leading;
        (start, start + trimmed.len())
    }

    /// A `url("...")` / `src(...)` function token: the argument list is
    /// captured verbatim into the value slice instead of being parsed
    /// into children.
    pub(crate) fn parse_raw_function(&mut self, func: Token) -> NodeId {
        log::trace!("parse_raw_function");

        let node = self.node_from(NodeKind::Function, func);
        let (name_start, name_end) = func.function_name();
        self.arena.set_content_slice(node, name_start, name_end - name_start);

        let mut depth = 1usize;
        let mut inner_first: Option<Token> = None;
        let mut inner_end = func.end;
        loop {
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Eof => {
                    self.arena.set_flag(node, flags::ERROR);
                    self.arena.set_end_offset(node, t.start);
                    break;
                }
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.arena.set_end_offset(node, t.end);
                        break;
                    }
                    inner_end = t.end;
                }
                TokenKind::LParen | TokenKind::Function => {
                    depth += 1;
                    if inner_first.is_none() {
                        inner_first = Some(t);
                    }
                    inner_end = t.end;
                }
                _ => {
                    if inner_first.is_none() {
                        inner_first = Some(t);
                    }
                    inner_end = t.end;
                }
            }
        }
        if let Some(first) = inner_first {
            self.arena.set_value_slice(node, first.start, inner_end - first.start);
        }
        node
    }
}
