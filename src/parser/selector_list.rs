use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::tokenizer::TokenKind;
use crate::CssParser;

impl CssParser<'_> {
    /// A selector list starting at the current token, used inside
    /// pseudo-class functions and by the standalone entry. Empty input
    /// yields an empty selector-list node, never a null root.
    pub(crate) fn parse_selector_list(&mut self, relative: bool) -> CssResult<NodeId> {
        log::trace!("parse_selector_list");

        let first = self.tokenizer.peek();
        let list = self
            .arena
            .create_node(NodeKind::SelectorList, first.start, 0, first.line, first.column);
        self.parse_selectors_into(list, relative);

        let end = self
            .arena
            .last_child(list)
            .map_or(first.start, |child| self.node_end(child));
        self.arena.set_end_offset(list, end);
        Ok(list)
    }

    /// Appends comma-separated selectors to `list`. Commas nested in
    /// parentheses or brackets never split: the component parsers
    /// consume their delimiters pairwise.
    pub(crate) fn parse_selectors_into(&mut self, list: NodeId, relative: bool) {
        loop {
            if let Some(selector) = self.parse_selector(relative) {
                self.arena.append_child(list, selector);
            }

            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            if t.kind != TokenKind::Comma {
                self.tokenizer.restore(saved);
                break;
            }
        }
    }
}
