use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::{split_number, NodeKind};
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

impl CssParser<'_> {
    /// The `An+B` microsyntax used inside `:nth-*()`. The `A` part
    /// lands in the content slice and the `B` part in the value slice;
    /// either may be empty. Handles the spellings where sign and digit
    /// fuse into one token (`n-5`, `-n-5`, `2n-5`) as well as detached
    /// signs with whitespace on both sides (`2n + 1`).
    pub(crate) fn parse_anplusb(&mut self) -> CssResult<NodeId> {
        log::trace!("parse_anplusb");

        let saved = self.tokenizer.state();
        match self.parse_anplusb_internal() {
            Ok(nth) => Ok(nth),
            Err(e) => {
                self.tokenizer.restore(saved);
                Err(e)
            }
        }
    }

    fn parse_anplusb_internal(&mut self) -> CssResult<NodeId> {
        let t = self.tokenizer.next();
        match t.kind {
            // plain integer: `:nth-child(5)`, `:nth-child(+5)`
            TokenKind::Number => {
                let node = self.node_at(NodeKind::Nth, t);
                let start = if self.token_text(t).starts_with('+') { t.start + 1 } else { t.start };
                self.arena.set_value_slice(node, start, t.end - start);
                Ok(node)
            }
            // `odd`, `even`, `n`, `-n`, `n-5`, `-n-5`
            TokenKind::Ident => self.finish_ident_form(t, t),
            // `+n`, `+n-5`: the sign and the ident are separate tokens
            TokenKind::Delim(b'+') => {
                let ident = self.tokenizer.next();
                if ident.kind == TokenKind::Ident && ident.start == t.end {
                    self.finish_ident_form(ident, t)
                } else {
                    Err(self.unexpected("An+B expression", ident))
                }
            }
            // `2n`, `2n-5`, `-3n`: number plus an n-leading unit
            TokenKind::Dimension => self.finish_dimension_form(t),
            _ => Err(self.unexpected("An+B expression", t)),
        }
    }

    fn finish_ident_form(&mut self, ident: Token, first: Token) -> CssResult<NodeId> {
        let text = self.token_text(ident);

        if text.eq_ignore_ascii_case("odd") || text.eq_ignore_ascii_case("even") {
            let node = self.node_from(NodeKind::Nth, first);
            self.arena.set_content_slice(node, ident.start, ident.end - ident.start);
            self.arena.set_end_offset(node, ident.end);
            return Ok(node);
        }

        let bytes = text.as_bytes();
        let n_at = usize::from(bytes.first() == Some(&b'-'));
        if !matches!(bytes.get(n_at), Some(b'n' | b'N')) {
            return Err(self.unexpected("An+B expression", ident));
        }

        let node = self.node_from(NodeKind::Nth, first);
        let content_end = ident.start + n_at + 1;
        self.arena.set_content_slice(node, first.start, content_end - first.start);
        self.finish_b_part(node, ident, content_end)
    }

    fn finish_dimension_form(&mut self, t: Token) -> CssResult<NodeId> {
        let text = self.token_text(t);
        let number_len = split_number(text);
        let unit = &text[number_len..];
        if !unit.starts_with(['n', 'N']) {
            return Err(self.unexpected("An+B expression", t));
        }

        let node = self.node_from(NodeKind::Nth, t);
        let content_end = t.start + number_len + 1;
        self.arena.set_content_slice(node, t.start, content_end - t.start);
        self.finish_b_part(node, t, content_end)
    }

    /// The remainder after the `n`: either fused into the same token
    /// (`-5` in `2n-5`), a dangling `-` whose integer follows (`n- 5`),
    /// or empty with a detached `± B` ahead in the stream.
    fn finish_b_part(&mut self, node: NodeId, token: Token, content_end: usize) -> CssResult<NodeId> {
        let rest = self.source.get(content_end..token.end).unwrap_or("");

        if rest.is_empty() {
            self.parse_detached_b(node, token.end);
            return Ok(node);
        }

        if rest == "-" {
            // `n- 5`: the sign belongs to the B part, the integer is
            // the next token
            let num = self.tokenizer.next();
            if num.kind != TokenKind::Number || self.token_text(num).starts_with(['+', '-']) {
                return Err(self.unexpected("integer after 'n-'", num));
            }
            self.arena.set_value_slice(node, content_end, num.end - content_end);
            self.arena.set_end_offset(node, num.end);
            return Ok(node);
        }

        let fused_ok = rest.starts_with('-') && rest.len() > 1 && rest.as_bytes()[1..].iter().all(u8::is_ascii_digit);
        if !fused_ok {
            return Err(self.unexpected("An+B expression", token));
        }
        self.arena.set_value_slice(node, content_end, token.end - content_end);
        self.arena.set_end_offset(node, token.end);
        Ok(node)
    }

    /// Optional detached `B`: a signed number token (`+1` in `2n+1`) or
    /// a sign delimiter followed by an unsigned number (`- 5`).
    /// Whitespace is tolerated between the `A` part, the sign and `B`.
    fn parse_detached_b(&mut self, node: NodeId, a_end: usize) {
        let saved = self.tokenizer.state();
        let t = self.tokenizer.next();
        match t.kind {
            TokenKind::Number => {
                let text = self.token_text(t);
                if text.starts_with('+') {
                    // a leading plus adds nothing; keep the slice bare
                    self.arena.set_value_slice(node, t.start + 1, t.end - t.start - 1);
                } else if text.starts_with('-') {
                    self.arena.set_value_slice(node, t.start, t.end - t.start);
                } else {
                    // `2n 5` is not An+B; the number is someone else's
                    self.tokenizer.restore(saved);
                    self.arena.set_end_offset(node, a_end);
                    return;
                }
                self.arena.set_end_offset(node, t.end);
            }
            TokenKind::Delim(sign @ (b'+' | b'-')) => {
                let num = self.tokenizer.next();
                if num.kind == TokenKind::Number && !self.token_text(num).starts_with(['+', '-']) {
                    if sign == b'+' {
                        self.arena.set_value_slice(node, num.start, num.end - num.start);
                    } else {
                        // keep the sign in the slice; it may span
                        // whitespace (`- 5`), which the coefficient
                        // projection tolerates
                        self.arena.set_value_slice(node, t.start, num.end - t.start);
                    }
                    self.arena.set_end_offset(node, num.end);
                } else {
                    self.tokenizer.restore(saved);
                    self.arena.set_end_offset(node, a_end);
                }
            }
            _ => {
                self.tokenizer.restore(saved);
                self.arena.set_end_offset(node, a_end);
            }
        }
    }
}
