mod container;
mod import;
mod layer;
mod media;
mod supports;

use crate::arena::{flags, NodeId};
use crate::errors::CssResult;
use crate::node::NodeKind;
use crate::parser::block::BlockMode;
use crate::parser::VENDOR_PREFIXES;
use crate::tokenizer::{Token, TokenKind};
use crate::CssParser;
use cow_utils::CowUtils;
use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// At-rules whose block contains only declarations.
    static ref DECLARATION_AT_RULES: HashSet<&'static str> = HashSet::from([
        "font-face",
        "font-feature-values",
        "page",
        "property",
        "counter-style",
    ]);

    /// At-rules whose block may contain declarations and/or nested
    /// rules (CSS Nesting).
    static ref CONDITIONAL_AT_RULES: HashSet<&'static str> = HashSet::from([
        "media",
        "supports",
        "container",
        "layer",
        "nest",
    ]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtRuleClass {
    Declarations,
    Conditional,
    Other,
}

/// Classifies a lowercased at-rule name (no `@`). Unknown names fall
/// back to the rule-list class.
fn at_rule_class(name: &str) -> AtRuleClass {
    if DECLARATION_AT_RULES.contains(name) {
        AtRuleClass::Declarations
    } else if CONDITIONAL_AT_RULES.contains(name) {
        AtRuleClass::Conditional
    } else {
        AtRuleClass::Other
    }
}

/// `@-webkit-keyframes` and friends dispatch like their unprefixed
/// counterparts.
pub(crate) fn strip_vendor_prefix(name: &str) -> &str {
    for prefix in VENDOR_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest;
        }
    }
    name
}

impl CssParser<'_> {
    pub(crate) fn parse_at_rule(&mut self) -> CssResult<NodeId> {
        log::trace!("parse_at_rule");

        let saved = self.tokenizer.state();
        match self.parse_at_rule_internal() {
            Ok(rule) => Ok(rule),
            Err(e) => {
                self.tokenizer.restore(saved);
                Err(e)
            }
        }
    }

    fn parse_at_rule_internal(&mut self) -> CssResult<NodeId> {
        let at = self.tokenizer.next();
        if at.kind != TokenKind::AtKeyword {
            return Err(self.unexpected("at-keyword", at));
        }

        // prelude: everything up to the next `{` or `;`, trimmed of
        // whitespace and comments at the boundaries
        let mut prelude_first: Option<Token> = None;
        let mut prelude_end = at.end;
        let mut lcurly: Option<Token> = None;
        let mut end = at.end;
        loop {
            let saved = self.tokenizer.state();
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::LCurly => {
                    lcurly = Some(t);
                    break;
                }
                TokenKind::Semicolon => {
                    end = t.end;
                    break;
                }
                TokenKind::Eof => {
                    end = prelude_end.max(at.end);
                    break;
                }
                TokenKind::RCurly => {
                    // the at-rule is nested and ran into the enclosing
                    // block end
                    self.tokenizer.restore(saved);
                    end = prelude_end.max(at.end);
                    break;
                }
                _ => {
                    if prelude_first.is_none() {
                        prelude_first = Some(t);
                    }
                    prelude_end = t.end;
                    end = t.end;
                }
            }
        }

        let rule = self.arena.create_node(NodeKind::AtRule, at.start, 0, at.line, at.column);
        self.arena.set_content_slice(rule, at.start + 1, at.end - at.start - 1);

        let name = self.source.get(at.start + 1..at.end).unwrap_or("");
        let name = name.cow_to_ascii_lowercase();
        let name = strip_vendor_prefix(name.as_ref());

        if let Some(first) = prelude_first {
            self.arena.set_value_slice(rule, first.start, prelude_end - first.start);
            if self.config.parse_atrule_preludes {
                let saved = self.tokenizer.enter_window(first.start, prelude_end, first.line, first.column);
                let parsed = self.parse_prelude_dispatch(name, rule);
                self.tokenizer.restore(saved);
                if let Err(e) = parsed {
                    log::warn!("Ignoring error in at-rule prelude: {e}");
                }
            }
        }

        if let Some(open) = lcurly {
            self.arena.set_flag(rule, flags::HAS_BLOCK);
            let mode = match at_rule_class(name) {
                AtRuleClass::Declarations => BlockMode::Declarations,
                AtRuleClass::Conditional => BlockMode::Mixed,
                AtRuleClass::Other => BlockMode::Rules,
            };
            let block = self.parse_block(open, mode, rule)?;
            self.arena.append_child(rule, block);
            end = self.tokenizer.current().end;
        }

        self.arena.set_end_offset(rule, end);
        Ok(rule)
    }

    pub(crate) fn parse_prelude_dispatch(&mut self, name: &str, rule: NodeId) -> CssResult<()> {
        log::trace!("parse_at_rule_prelude: {name}");
        match name {
            "media" => self.parse_media_prelude(rule),
            "container" => self.parse_container_prelude(rule),
            "supports" => self.parse_supports_prelude(rule),
            "layer" => self.parse_layer_prelude(rule),
            "import" => self.parse_import_prelude(rule),
            "keyframes" | "property" => self.parse_name_prelude(rule),
            // unknown at-rules keep the raw prelude slice only
            _ => Ok(()),
        }
    }

    /// `@keyframes spin`, `@property --x`: the prelude is one
    /// identifier.
    fn parse_name_prelude(&mut self, rule: NodeId) -> CssResult<()> {
        let t = self.tokenizer.next();
        let node = match t.kind {
            TokenKind::Ident => self.node_with_content(NodeKind::PreludeIdent, t),
            TokenKind::QuotedString => {
                let node = self.node_at(NodeKind::PreludeIdent, t);
                let (s, e) = self.string_inner(t);
                self.arena.set_content_slice(node, s, e - s);
                node
            }
            _ => return Err(self.unexpected("name", t)),
        };
        self.arena.append_child(rule, node);
        Ok(())
    }

    /// Parenthesized feature: depth-counted scan to the matching `)`;
    /// the inner text lands in the value slice untokenized. Unbalanced
    /// parens abort the feature (error flag) without consuming the rest
    /// of the prelude.
    pub(crate) fn parse_paren_feature(&mut self, open: Token) -> CssResult<NodeId> {
        let feature = self.node_from(NodeKind::MediaFeature, open);
        let mut depth = 1usize;
        let mut inner_first: Option<Token> = None;
        let mut inner_end = open.end;
        loop {
            let t = self.tokenizer.next();
            match t.kind {
                TokenKind::Eof => {
                    self.arena.set_flag(feature, flags::ERROR);
                    self.arena.set_end_offset(feature, t.start);
                    break;
                }
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.arena.set_end_offset(feature, t.end);
                        break;
                    }
                    inner_end = t.end;
                }
                TokenKind::LParen | TokenKind::Function => {
                    depth += 1;
                    if inner_first.is_none() {
                        inner_first = Some(t);
                    }
                    inner_end = t.end;
                }
                _ => {
                    if inner_first.is_none() {
                        inner_first = Some(t);
                    }
                    inner_end = t.end;
                }
            }
        }
        if let Some(first) = inner_first {
            self.arena.set_value_slice(feature, first.start, inner_end - first.start);
        }
        Ok(feature)
    }

    /// Function-shaped feature such as `selector(...)` or
    /// `style(--x: a)`: like a parenthesized feature, with the function
    /// name in the content slice.
    pub(crate) fn parse_function_feature(&mut self, func: Token) -> CssResult<NodeId> {
        let feature = self.parse_paren_feature(func)?;
        let (s, e) = func.function_name();
        self.arena.set_content_slice(feature, s, e - s);
        Ok(feature)
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeKind;

    #[test]
    fn media_at_rule_with_block() {
        let doc = crate::parse("@media (min-width: 768px) { body { color: red; } }");
        let at = doc.root().first_child().unwrap();
        assert_eq!(at.kind(), NodeKind::AtRule);
        assert_eq!(at.name(), "media");
        assert_eq!(at.prelude(), "(min-width: 768px)");
        assert!(at.has_block());

        let block = at.children().last().unwrap();
        assert_eq!(block.kind(), NodeKind::Block);
        assert_eq!(block.first_child().unwrap().kind(), NodeKind::StyleRule);
    }

    #[test]
    fn statement_at_rule_without_block() {
        let doc = crate::parse("@import \"theme.css\";");
        let at = doc.root().first_child().unwrap();
        assert_eq!(at.name(), "import");
        assert!(!at.has_block());
        assert_eq!(at.text(), "@import \"theme.css\";");
    }

    #[test]
    fn font_face_block_contains_declarations() {
        let doc = crate::parse("@font-face { font-family: A; src: url(a.woff2); }");
        let at = doc.root().first_child().unwrap();
        assert!(at.has_declarations());
        let block = at.children().last().unwrap();
        let kinds: Vec<_> = block.children().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Declaration, NodeKind::Declaration]);
    }

    #[test]
    fn keyframes_block_contains_rules() {
        let doc = crate::parse("@keyframes spin { from { x: 0 } to { x: 1 } }");
        let at = doc.root().first_child().unwrap();
        let ident = at.first_child().unwrap();
        assert_eq!(ident.kind(), NodeKind::PreludeIdent);
        assert_eq!(ident.text(), "spin");

        let block = at.children().last().unwrap();
        let kinds: Vec<_> = block.children().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::StyleRule, NodeKind::StyleRule]);
    }

    #[test]
    fn vendor_prefixed_keyframes_dispatch_alike() {
        let doc = crate::parse("@-webkit-keyframes spin { from { x: 0 } }");
        let at = doc.root().first_child().unwrap();
        assert_eq!(at.name(), "-webkit-keyframes");
        assert_eq!(at.first_child().unwrap().kind(), NodeKind::PreludeIdent);
    }

    #[test]
    fn unknown_at_rule_keeps_raw_prelude() {
        let doc = crate::parse("@bogus one (two) { a { x: 1 } }");
        let at = doc.root().first_child().unwrap();
        assert_eq!(at.prelude(), "one (two)");
        // no prelude sub-tree, only the block
        assert_eq!(at.child_count(), 1);
        assert_eq!(at.first_child().unwrap().kind(), NodeKind::Block);
    }

    #[test]
    fn prelude_subtree_disabled_keeps_raw_slice() {
        let config = crate::ParserConfig {
            parse_atrule_preludes: false,
            ..Default::default()
        };
        let doc = crate::parse_with_config("@media screen and (color) {}", config);
        let at = doc.root().first_child().unwrap();
        assert_eq!(at.prelude(), "screen and (color)");
        assert_eq!(at.child_count(), 1); // the block only
    }

    #[test]
    fn property_at_rule() {
        let doc = crate::parse("@property --angle { syntax: \"<angle>\"; inherits: false; }");
        let at = doc.root().first_child().unwrap();
        assert_eq!(at.first_child().unwrap().text(), "--angle");
        assert!(at.has_declarations());
    }
}
