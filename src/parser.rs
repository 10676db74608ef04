//! Shared token-consumption helpers for the layered recursive-descent
//! parsers.
//!
//! Every trial parser follows the same discipline: save the tokenizer
//! cursor, try to build a node, and on mismatch restore the cursor and
//! return an error the caller treats as "did not match". No error ever
//! escapes the public parse API.

use crate::arena::NodeId;
use crate::errors::CssError;
use crate::node::NodeKind;
use crate::tokenizer::Token;
use crate::CssParser;

mod anplusb;
mod at_rule;
mod block;
mod declaration;
mod pseudo;
mod rule;
mod selector;
mod selector_list;
mod stylesheet;
mod url;
mod value;

pub(crate) use at_rule::strip_vendor_prefix;

pub(crate) const VENDOR_PREFIXES: [&str; 4] = ["-webkit-", "-moz-", "-ms-", "-o-"];

impl<'s> CssParser<'s> {
    pub(crate) fn token_text(&self, t: Token) -> &'s str {
        t.text(self.source)
    }

    /// Creates a node spanning exactly one token.
    pub(crate) fn node_at(&mut self, kind: NodeKind, t: Token) -> NodeId {
        self.arena.create_node(kind, t.start, t.end - t.start, t.line, t.column)
    }

    /// Creates a node starting at a token; the length is back-filled
    /// once the closing token is consumed.
    pub(crate) fn node_from(&mut self, kind: NodeKind, t: Token) -> NodeId {
        self.arena.create_node(kind, t.start, 0, t.line, t.column)
    }

    /// A node spanning one token whose name slice is the token itself.
    pub(crate) fn node_with_content(&mut self, kind: NodeKind, t: Token) -> NodeId {
        let id = self.node_at(kind, t);
        self.arena.set_content_slice(id, t.start, t.end - t.start);
        id
    }

    pub(crate) fn unexpected(&self, what: &str, t: Token) -> CssError {
        CssError::with_location(&format!("Expected {what}, got {}", t.kind), t.location())
    }

    /// Inner byte range of a string token, without the quotes. An
    /// unterminated string keeps everything after the opening quote.
    pub(crate) fn string_inner(&self, t: Token) -> (usize, usize) {
        let bytes = self.token_text(t).as_bytes();
        let closed = bytes.len() >= 2 && bytes.last() == bytes.first();
        let end = if closed { t.end - 1 } else { t.end };
        ((t.start + 1).min(end), end)
    }

    /// End of a node as recorded in the arena.
    pub(crate) fn node_end(&self, id: NodeId) -> usize {
        self.arena.start_offset(id) + self.arena.length(id)
    }
}
