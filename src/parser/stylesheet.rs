use crate::arena::NodeId;
use crate::node::NodeKind;
use crate::tokenizer::TokenKind;
use crate::CssParser;

impl CssParser<'_> {
    /// Top-level driver: consumes tokens until EOF, parsing at-rules
    /// and style rules. A failed rule costs exactly one token.
    pub(crate) fn parse_stylesheet(&mut self) -> NodeId {
        log::trace!("parse_stylesheet");

        let root = self.arena.create_node(NodeKind::Stylesheet, 0, 0, 1, 1);

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();

            match t.kind {
                TokenKind::Eof => break,
                TokenKind::Cdo | TokenKind::Cdc => {
                    // legacy SGML comment guards, not part of the tree
                }
                TokenKind::AtKeyword => {
                    self.tokenizer.restore(saved);
                    match self.parse_at_rule() {
                        Ok(at_rule) => self.arena.append_child(root, at_rule),
                        Err(e) => {
                            log::warn!("Ignoring error in parse_at_rule: {e}");
                            self.skip_to_rule_end();
                        }
                    }
                }
                _ => {
                    self.tokenizer.restore(saved);
                    match self.parse_style_rule() {
                        Ok(rule) => self.arena.append_child(root, rule),
                        Err(e) => {
                            // no opening brace found; advance one token
                            log::warn!("Ignoring error in parse_style_rule: {e}");
                            let _ = self.tokenizer.next();
                        }
                    }
                }
            }
        }

        self.arena.set_length(root, self.source.len());
        root
    }
}
