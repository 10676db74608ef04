use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::tokenizer::TokenKind;
use crate::CssParser;

/// Logical connectors allowed between media features.
pub(crate) fn is_query_operator(word: &str) -> bool {
    word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or") || word.eq_ignore_ascii_case("not")
}

impl CssParser<'_> {
    /// `@media` prelude: a comma-separated list of media queries
    /// appended as children of the at-rule.
    pub(crate) fn parse_media_prelude(&mut self, rule: NodeId) -> CssResult<()> {
        log::trace!("parse_media_prelude");

        loop {
            if self.tokenizer.peek().kind == TokenKind::Eof {
                break;
            }
            let query = self.parse_media_query()?;
            self.arena.append_child(rule, query);

            let t = self.tokenizer.next();
            if t.kind != TokenKind::Comma {
                break;
            }
        }

        Ok(())
    }

    /// One media query: an optional `only`/`not` modifier (stored in
    /// the query's content slice), a media type, and features joined by
    /// logical operators.
    pub(crate) fn parse_media_query(&mut self) -> CssResult<NodeId> {
        log::trace!("parse_media_query");

        let first = self.tokenizer.peek();
        if first.kind == TokenKind::Eof {
            return Err(self.unexpected("media query", first));
        }
        let query = self.node_from(NodeKind::MediaQuery, first);

        let mut end = first.start;
        let mut has_type = false;
        let mut has_modifier = false;

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Eof => break,
                TokenKind::Comma => {
                    self.tokenizer.restore(saved);
                    break;
                }
                TokenKind::Ident => {
                    let word = self.token_text(t);
                    let next_is_ident = self.tokenizer.peek().is_ident();
                    if !has_modifier
                        && !has_type
                        && next_is_ident
                        && (word.eq_ignore_ascii_case("only") || word.eq_ignore_ascii_case("not"))
                    {
                        has_modifier = true;
                        self.arena.set_content_slice(query, t.start, t.end - t.start);
                    } else if is_query_operator(word) {
                        let op = self.node_at(NodeKind::PreludeOperator, t);
                        self.arena.append_child(query, op);
                    } else if has_type {
                        let ident = self.node_with_content(NodeKind::PreludeIdent, t);
                        self.arena.append_child(query, ident);
                    } else {
                        has_type = true;
                        let media_type = self.node_with_content(NodeKind::MediaType, t);
                        self.arena.append_child(query, media_type);
                    }
                    end = t.end;
                }
                TokenKind::LParen => {
                    let feature = self.parse_paren_feature(t)?;
                    end = self.node_end(feature);
                    self.arena.append_child(query, feature);
                }
                TokenKind::Function => {
                    let feature = self.parse_function_feature(t)?;
                    end = self.node_end(feature);
                    self.arena.append_child(query, feature);
                }
                _ => {
                    self.tokenizer.restore(saved);
                    break;
                }
            }
        }

        if end <= first.start {
            return Err(self.unexpected("media query", first));
        }
        self.arena.set_end_offset(query, end);
        Ok(query)
    }
}
