use crate::arena::{flags, NodeId};
use crate::errors::{CssError, CssResult};
use crate::node::NodeKind;
use crate::parser::block::BlockMode;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

impl CssParser<'_> {
    /// Either the rule parses as a whole or the cursor is rewound to
    /// where it started, letting the caller advance one token.
    pub(crate) fn parse_style_rule(&mut self) -> CssResult<NodeId> {
        log::trace!("parse_style_rule");

        let saved = self.tokenizer.state();
        match self.parse_style_rule_internal() {
            Ok(rule) => Ok(rule),
            Err(e) => {
                self.tokenizer.restore(saved);
                Err(e)
            }
        }
    }

    fn parse_style_rule_internal(&mut self) -> CssResult<NodeId> {
        // the rule position is the first selector token, not the brace
        let first = self.tokenizer.peek();
        if first.kind == TokenKind::Eof {
            return Err(CssError::with_location("unexpected end of input", first.location()));
        }

        // the selector source range runs from the rule start to the
        // last non-whitespace end before the `{`
        let mut sel_end = first.start;
        let lcurly = loop {
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::LCurly => break t,
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::RCurly => {
                    return Err(self.unexpected("'{' after selector", t));
                }
                _ => sel_end = t.end,
            }
        };

        let rule = self.arena.create_node(NodeKind::StyleRule, first.start, 0, first.line, first.column);

        let selector_list = self.parse_selector_region(first, sel_end);
        self.arena.append_child(rule, selector_list);

        self.arena.set_flag(rule, flags::HAS_BLOCK);
        let block = self.parse_block(lcurly, BlockMode::Mixed, rule)?;
        self.arena.append_child(rule, block);

        let end = self.tokenizer.current().end;
        self.arena.set_end_offset(rule, end);

        Ok(rule)
    }

    /// Builds the selector-list node spanning `[first.start, sel_end)`.
    /// When selector parsing is disabled the node stays flat, carrying
    /// only the text range.
    pub(crate) fn parse_selector_region(&mut self, first: Token, sel_end: usize) -> NodeId {
        let len = sel_end.saturating_sub(first.start);
        let list = self
            .arena
            .create_node(NodeKind::SelectorList, first.start, len, first.line, first.column);

        if self.config.parse_selectors && len > 0 {
            let saved = self.tokenizer.enter_window(first.start, sel_end, first.line, first.column);
            self.parse_selectors_into(list, false);
            self.tokenizer.restore(saved);
        }

        list
    }
}
