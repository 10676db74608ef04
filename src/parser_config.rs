/// ParserConfig holds the configuration for the parser.
///
/// Each `parse_*` switch disables one lazily-invoked sub-parser; the
/// raw text slices stay available on the flat nodes either way.
#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    /// When true, the tokenizer silently discards comment tokens; when
    /// false, a caller-supplied comment observer receives each comment.
    pub skip_comments: bool,
    /// Build value sub-trees under declarations.
    pub parse_values: bool,
    /// Build selector sub-trees under style rules.
    pub parse_selectors: bool,
    /// Build prelude sub-trees under at-rules.
    pub parse_atrule_preludes: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            skip_comments: true,
            parse_values: true,
            parse_selectors: true,
            parse_atrule_preludes: true,
        }
    }
}
