use crate::arena::{flags, NodeId};
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

/// What a block may contain, decided by the owning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockMode {
    /// Only declarations (`@font-face`, `@property`, ...).
    Declarations,
    /// Declarations and/or nested rules (style rules and conditional
    /// at-rules, per CSS Nesting).
    Mixed,
    /// Nested rules only (`@keyframes`, unknown at-rules).
    Rules,
}

impl CssParser<'_> {
    /// Parses a block whose `{` was already consumed. The block node is
    /// positioned immediately after the brace and its length runs to
    /// the byte preceding the matching `}`. Never fails wholesale:
    /// malformed content costs one token per recovery step.
    pub(crate) fn parse_block(&mut self, lcurly: Token, mode: BlockMode, owner: NodeId) -> CssResult<NodeId> {
        log::trace!("parse_block with parse mode: {:?}", mode);

        let block = self
            .arena
            .create_node(NodeKind::Block, lcurly.end, 0, lcurly.line, lcurly.column + 1);

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::RCurly | TokenKind::Eof => {
                    self.arena.set_end_offset(block, t.start);
                    break;
                }
                TokenKind::Semicolon => {
                    // stray separator
                }
                TokenKind::AtKeyword if mode != BlockMode::Declarations => {
                    self.tokenizer.restore(saved);
                    match self.parse_at_rule() {
                        Ok(at_rule) => self.arena.append_child(block, at_rule),
                        Err(e) => {
                            log::warn!("Ignoring error in parse_at_rule: {e}");
                            self.skip_to_rule_end();
                        }
                    }
                }
                _ => {
                    self.tokenizer.restore(saved);
                    match mode {
                        BlockMode::Declarations => {
                            if let Ok(declaration) = self.parse_declaration() {
                                self.arena.set_flag(owner, flags::HAS_DECLARATIONS);
                                self.arena.append_child(block, declaration);
                            } else {
                                let _ = self.tokenizer.next();
                            }
                        }
                        BlockMode::Mixed => {
                            if let Ok(declaration) = self.parse_declaration() {
                                self.arena.set_flag(owner, flags::HAS_DECLARATIONS);
                                self.arena.append_child(block, declaration);
                            } else if let Ok(rule) = self.parse_style_rule() {
                                self.arena.append_child(block, rule);
                            } else {
                                let _ = self.tokenizer.next();
                            }
                        }
                        BlockMode::Rules => {
                            if let Ok(rule) = self.parse_style_rule() {
                                self.arena.append_child(block, rule);
                            } else {
                                let _ = self.tokenizer.next();
                            }
                        }
                    }
                }
            }
        }

        Ok(block)
    }

    /// Reads until the end of a malformed rule so parsing can resume:
    /// past the next `;`, or up to (not including) a closing `}`.
    pub(crate) fn skip_to_rule_end(&mut self) {
        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Semicolon | TokenKind::Eof => break,
                TokenKind::RCurly => {
                    self.tokenizer.restore(saved);
                    break;
                }
                _ => {}
            }
        }
    }
}
