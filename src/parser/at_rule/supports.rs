use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::parser::at_rule::media::is_query_operator;
use crate::tokenizer::TokenKind;
use crate::CssParser;

impl CssParser<'_> {
    /// `@supports` prelude: parenthesized feature groups connected by
    /// `and`/`or`/`not`, wrapped in one supports-query node. Groups are
    /// not tokenized further; nested conditions stay raw in the value
    /// slice.
    pub(crate) fn parse_supports_prelude(&mut self, rule: NodeId) -> CssResult<()> {
        log::trace!("parse_supports_prelude");

        let first = self.tokenizer.peek();
        if first.kind == TokenKind::Eof {
            return Err(self.unexpected("supports condition", first));
        }
        let query = self.node_from(NodeKind::SupportsQuery, first);
        let mut end = first.start;

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
            return Err(self.unexpected("supports condition", first));
        }
        self.arena.set_end_offset(query, end);
        self.arena.append_child(rule, query);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeKind;

    #[test]
    fn feature_groups_and_operators() {
        let doc = crate::parse("@supports (display: grid) and (gap: 1em) {}");
        let at = doc.root().first_child().unwrap();
        let query = at.first_child().unwrap();
        assert_eq!(query.kind(), NodeKind::SupportsQuery);

        let kinds: Vec<_> = query.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::MediaFeature, NodeKind::PreludeOperator, NodeKind::MediaFeature]
        );
        assert_eq!(query.first_child().unwrap().value(), "display: grid");
    }

    #[test]
    fn negated_nested_group_stays_raw() {
        let doc = crate::parse("@supports not ((a: 1) or (b: 2)) {}");
        let at = doc.root().first_child().unwrap();
        let query = at.first_child().unwrap();
        let children: Vec<_> = query.children().collect();
        assert_eq!(children[0].kind(), NodeKind::PreludeOperator);
        assert_eq!(children[0].text(), "not");
        assert_eq!(children[1].value(), "(a: 1) or (b: 2)");
    }

    #[test]
    fn selector_function_feature() {
        let doc = crate::parse("@supports selector(h2 > p) {}");
        let at = doc.root().first_child().unwrap();
        let feature = at.first_child().unwrap().first_child().unwrap();
        assert_eq!(feature.name(), "selector");
        assert_eq!(feature.value(), "h2 > p");
    }
}
