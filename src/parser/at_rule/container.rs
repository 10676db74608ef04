use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::parser::at_rule::media::is_query_operator;
use crate::tokenizer::TokenKind;
use crate::CssParser;

impl CssParser<'_> {
    /// `@container` prelude: an optional container name followed by the
    /// same operator/feature grammar media queries use. One
    /// container-query node wraps the whole prelude.
    pub(crate) fn parse_container_prelude(&mut self, rule: NodeId) -> CssResult<()> {
        log::trace!("parse_container_prelude");

        let first = self.tokenizer.peek();
        if first.kind == TokenKind::Eof {
            return Err(self.unexpected("container query", first));
        }
        let query = self.node_from(NodeKind::ContainerQuery, first);
        let mut end = first.start;

        // optional container name
        let saved = self.tokenizer.state();
        let t = self.tokenizer.next();
        if t.kind == TokenKind::Ident && !is_query_operator(self.token_text(t)) {
            let name = self.node_with_content(NodeKind::PreludeIdent, t);
            self.arena.append_child(query, name);
            end = t.end;
        } else {
            self.tokenizer.restore(saved);
        }

        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Eof => break,
                TokenKind::Ident if is_query_operator(self.token_text(t)) => {
                    let op = self.node_at(NodeKind::PreludeOperator, t);
                    self.arena.append_child(query, op);
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
            return Err(self.unexpected("container query", first));
        }
        self.arena.set_end_offset(query, end);
        self.arena.append_child(rule, query);
        Ok(())
    }
}
