use crate::arena::{flags, NodeId};
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::parser::VENDOR_PREFIXES;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;

impl CssParser<'_> {
    /// Tentative declaration parse: fails without consuming when the
    /// next token is not an identifier, when the identifier is not
    /// followed by `:`, or when a `{` shows up in the value (which
    /// means the caller is looking at a nested selector instead).
    pub(crate) fn parse_declaration(&mut self) -> CssResult<NodeId> {
        log::trace!("parse_declaration");

        let saved = self.tokenizer.state();
        match self.parse_declaration_internal() {
            Ok(declaration) => Ok(declaration),
            Err(e) => {
                self.tokenizer.restore(saved);
                Err(e)
            }
        }
    }

    fn parse_declaration_internal(&mut self) -> CssResult<NodeId> {
        let name = self.tokenizer.next();
        if name.kind != TokenKind::Ident {
            return Err(self.unexpected("property name", name));
        }

        let colon = self.tokenizer.next();
        if colon.kind != TokenKind::Colon {
            return Err(self.unexpected("':' after property name", colon));
        }

        let mut value_first: Option<Token> = None;
        let mut value_end = colon.end;
        let mut decl_end = colon.end;
        let mut important = false;

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Semicolon | TokenKind::Eof => break,
                TokenKind::RCurly => {
                    self.tokenizer.restore(saved);
                    break;
                }
                TokenKind::LCurly => {
                    return Err(self.unexpected("value", t));
                }
                TokenKind::Delim(b'!') if !important => {
                    let after_bang = self.tokenizer.state();
                    let ident = self.tokenizer.next();
                    if ident.kind == TokenKind::Ident {
                        // permissive on purpose: any identifier after the
                        // `!` marks the declaration important, which keeps
                        // historical hacks like `!ie` walkable. The value
                        // range stops before the `!`.
                        important = true;
                        decl_end = ident.end;
                    } else {
                        self.tokenizer.restore(after_bang);
                        if value_first.is_none() {
                            value_first = Some(t);
                        }
                        value_end = t.end;
                        decl_end = t.end;
                    }
                }
                _ => {
                    if !important {
                        if value_first.is_none() {
                            value_first = Some(t);
                        }
                        value_end = t.end;
                    }
                    decl_end = t.end;
                }
            }
        }

        let declaration = self
            .arena
            .create_node(NodeKind::Declaration, name.start, 0, name.line, name.column);
        self.arena.set_content_slice(declaration, name.start, name.end - name.start);

        if important {
            self.arena.set_flag(declaration, flags::IMPORTANT);
        }
        if is_vendor_prefixed(self.token_text(name)) {
            self.arena.set_flag(declaration, flags::VENDOR_PREFIXED);
        }

        if let Some(first) = value_first {
            self.arena.set_value_slice(declaration, first.start, value_end - first.start);
            if self.config.parse_values {
                let saved = self.tokenizer.enter_window(first.start, value_end, first.line, first.column);
                self.parse_values_into(declaration);
                self.tokenizer.restore(saved);
            }
        }

        self.arena.set_end_offset(declaration, decl_end);
        Ok(declaration)
    }
}

fn is_vendor_prefixed(name: &str) -> bool {
    VENDOR_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
