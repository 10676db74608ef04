use crate::arena::NodeId;
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::tokenizer::TokenKind;
use crate::CssParser;

impl CssParser<'_> {
    /// `@layer` prelude: comma-separated layer names. Dotted names
    /// (`base.utils`) span one layer-name node.
    pub(crate) fn parse_layer_prelude(&mut self, rule: NodeId) -> CssResult<()> {
        log::trace!("parse_layer_prelude");

        loop {
            let t = self.tokenizer.next();
            if t.kind != TokenKind::Ident {
                return Err(self.unexpected("layer name", t));
            }

            let layer = self.node_from(NodeKind::LayerName, t);
            let mut end = t.end;
            // segments must be glued together: ident `.` ident
            loop {
                let saved = self.tokenizer.state();
                let dot = self.tokenizer.next();
                if dot.is_delim(b'.') && dot.start == end {
                    let segment = self.tokenizer.next();
                    if segment.kind == TokenKind::Ident && segment.start == dot.end {
                        end = segment.end;
                        continue;
                    }
                }
                self.tokenizer.restore(saved);
                break;
            }
            self.arena.set_end_offset(layer, end);
            self.arena.set_content_slice(layer, t.start, end - t.start);
            self.arena.append_child(rule, layer);

            let t = self.tokenizer.next();
            if t.kind != TokenKind::Comma {
                break;
            }
        }

        Ok(())
    }
}
