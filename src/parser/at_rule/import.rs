use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::tokenizer::TokenKind;
use crate::CssParser;

impl CssParser<'_> {
    /// `@import` prelude: a string or `url(...)` target, an optional
    /// `layer`/`layer(name)`, an optional `supports(...)` condition and
    /// trailing media queries.
    pub(crate) fn parse_import_prelude(&mut self, rule: NodeId) -> CssResult<()> {
        log::trace!("parse_import_prelude");

        let t = self.tokenizer.next();
        let target = match t.kind {
            TokenKind::QuotedString => {
                let node = self.node_at(NodeKind::ImportUrl, t);
                let (s, e) = self.string_inner(t);
                self.arena.set_value_slice(node, s, e - s);
                node
            }
            TokenKind::Url | TokenKind::BadUrl => self.import_url_node(t),
            TokenKind::Function if self.function_is(t, "url") => {
                // `url("...")` with a quoted argument
                let node = self.node_from(NodeKind::ImportUrl, t);
                let inner = self.tokenizer.next();
                if inner.kind != TokenKind::QuotedString {
                    return Err(self.unexpected("quoted url", inner));
                }
                let (s, e) = self.string_inner(inner);
                self.arena.set_value_slice(node, s, e - s);
                let close = self.tokenizer.next();
                if close.kind != TokenKind::RParen {
                    return Err(self.unexpected("')'", close));
                }
                self.arena.set_end_offset(node, close.end);
                node
            }
            _ => return Err(self.unexpected("string or url()", t)),
        };
        self.arena.append_child(rule, target);

        // optional cascade layer
        let saved = self.tokenizer.state();
        let t = self.tokenizer.next();
        match t.kind {
            TokenKind::Ident if self.token_text(t).eq_ignore_ascii_case("layer") => {
                let node = self.node_at(NodeKind::ImportLayer, t);
                self.arena.append_child(rule, node);
            }
            TokenKind::Function if self.function_is(t, "layer") => {
                let node = self.node_from(NodeKind::ImportLayer, t);
                let name = self.tokenizer.next();
                if name.kind != TokenKind::Ident {
                    return Err(self.unexpected("layer name", name));
                }
                self.arena.set_content_slice(node, name.start, name.end - name.start);
                let close = self.tokenizer.next();
                if close.kind != TokenKind::RParen {
                    return Err(self.unexpected("')'", close));
                }
                self.arena.set_end_offset(node, close.end);
                self.arena.append_child(rule, node);
            }
            _ => self.tokenizer.restore(saved),
        }

        // optional supports(...) condition
        let saved = self.tokenizer.state();
        let t = self.tokenizer.next();
        if t.kind == TokenKind::Function && self.function_is(t, "supports") {
            let feature = self.parse_function_feature(t)?;
            self.arena.append_child(rule, feature);
        } else {
            self.tokenizer.restore(saved);
        }

        // whatever follows is a media query list
        loop {
            let t = self.tokenizer.peek();
            match t.kind {
                TokenKind::Ident | TokenKind::LParen => {
                    let query = self.parse_media_query()?;
                    self.arena.append_child(rule, query);
                    let t = self.tokenizer.next();
                    if t.kind != TokenKind::Comma {
                        break;
                    }
                }
                _ => break,
            }
        }

        Ok(())
    }

    pub(crate) fn function_is(&self, t: crate::tokenizer::Token, name: &str) -> bool {
        let (s, e) = t.function_name();
        self.source.get(s..e).is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// An unquoted `url(...)` token becomes an import-url node whose
    /// value slice is the inner text.
    fn import_url_node(&mut self, t: crate::tokenizer::Token) -> NodeId {
        let node = self.node_at(NodeKind::ImportUrl, t);
        let (s, e) = self.url_token_inner(t);
        self.arena.set_value_slice(node, s, e - s);
        if t.kind == TokenKind::BadUrl {
            self.arena.set_flag(node, crate::arena::flags::ERROR);
        }
        node
    }
}
