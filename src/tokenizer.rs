//! CSS tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Unlike most textbook tokenizers this one never materializes token
//! text: a [`Token`] is a kind plus a byte range into the source, and
//! every string projection happens lazily against the original buffer.
//! Backtracking is a pure value copy of the cursor ([`TokenizerState`]),
//! which is the exclusive primitive the parsers use for trial parsing.

use crate::charclass;
use crate::location::Location;
use std::fmt;

/// Closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram);
    /// the range includes the `@` marker.
    AtKeyword,
    Ident,
    /// An identifier immediately followed by `(`; the range includes the `(`.
    Function,
    /// A `<url-token>`, range covering the whole `url(...)` form.
    Url,
    BadUrl,
    Dimension,
    Percentage,
    Number,
    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram);
    /// the range includes the quotes.
    QuotedString,
    /// A `<bad-string-token>`. Always indicates a parse error.
    BadString,
    Whitespace,
    /// A `<hash-token>`; the range includes the `#` marker.
    Hash,
    /// A `<delim-token>` carrying its byte.
    Delim(u8),
    LCurly,
    RCurly,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    /// A `<!--` `<CDO-token>`
    Cdo,
    /// A `-->` `<CDC-token>`
    Cdc,
    Comment,
    /// A `<unicode-range-token>` such as `U+26` or `U+0-7F`.
    UnicodeRange,
    Eof,
}

/// A token is a kind plus the byte range it occupies in the source,
/// annotated with the 1-based line/column where it began. Tokens are
/// transient values; they are never stored in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize, line: u32, column: u32) -> Token {
        Token {
            kind,
            start,
            end,
            line,
            column,
        }
    }

    /// The source slice this token covers.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }

    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column, self.start)
    }

    pub(crate) fn is_delim(&self, b: u8) -> bool {
        self.kind == TokenKind::Delim(b)
    }

    pub(crate) fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    /// Name range of a function token, i.e. the range without the `(`.
    pub(crate) fn function_name(&self) -> (usize, usize) {
        (self.start, self.end.saturating_sub(1))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::AtKeyword => "at-keyword",
            TokenKind::Ident => "ident",
            TokenKind::Function => "function",
            TokenKind::Url => "url",
            TokenKind::BadUrl => "bad-url",
            TokenKind::Dimension => "dimension",
            TokenKind::Percentage => "percentage",
            TokenKind::Number => "number",
            TokenKind::QuotedString => "string",
            TokenKind::BadString => "bad-string",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Hash => "hash",
            TokenKind::Delim(_) => "delim",
            TokenKind::LCurly => "{",
            TokenKind::RCurly => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Cdo => "<!--",
            TokenKind::Cdc => "-->",
            TokenKind::Comment => "comment",
            TokenKind::UnicodeRange => "unicode-range",
            TokenKind::Eof => "eof",
        };
        write!(f, "{s}")
    }
}

/// A comment reported to the observer callback when comment skipping is
/// disabled; carries the byte range (including the `/*` and `*/`
/// markers) and the position where the comment began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

/// A snapshot of the tokenizer cursor. Restoring one is a pure value
/// copy; no token buffer exists, so restored tokens are re-lexed.
#[derive(Debug, Clone, Copy)]
pub struct TokenizerState {
    pos: usize,
    limit: usize,
    line: u32,
    column: u32,
    current: Token,
}

type CommentObserver<'s> = Box<dyn FnMut(Comment) + 's>;

pub struct Tokenizer<'s> {
    source: &'s [u8],
    /// Position of the NEXT byte to consume.
    pos: usize,
    /// Tokenization stops at this byte; sub-parsers narrow it to run
    /// over a window of the source.
    limit: usize,
    line: u32,
    column: u32,
    /// The most recently produced token.
    current: Token,
    on_comment: Option<CommentObserver<'s>>,
    /// High-water mark of reported comments, so that re-lexing after a
    /// cursor restore does not notify the observer twice.
    reported_up_to: usize,
}

impl<'s> Tokenizer<'s> {
    #[must_use]
    pub fn new(source: &'s str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            limit: source.len(),
            line: 1,
            column: 1,
            current: Token::new(TokenKind::Eof, 0, 0, 1, 1),
            on_comment: None,
            reported_up_to: 0,
        }
    }

    pub fn set_comment_observer(&mut self, observer: CommentObserver<'s>) {
        self.on_comment = Some(observer);
    }

    /// Returns the current location of the cursor.
    #[must_use]
    pub fn current_location(&self) -> Location {
        Location::new(self.line, self.column, self.pos)
    }

    /// The most recently consumed token (EOF before the first consume).
    #[must_use]
    pub fn current(&self) -> Token {
        self.current
    }

    #[must_use]
    pub fn eof(&self) -> bool {
        self.pos >= self.limit
    }

    /// End of the active tokenization window.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn state(&self) -> TokenizerState {
        TokenizerState {
            pos: self.pos,
            limit: self.limit,
            line: self.line,
            column: self.column,
            current: self.current,
        }
    }

    pub fn restore(&mut self, state: TokenizerState) {
        self.pos = state.pos;
        self.limit = state.limit;
        self.line = state.line;
        self.column = state.column;
        self.current = state.current;
    }

    /// Narrows tokenization to `[start, end)` so a sub-parser can run
    /// over a slice of the source without copying it. Returns the state
    /// to restore once the sub-parse is done.
    pub fn enter_window(&mut self, start: usize, end: usize, line: u32, column: u32) -> TokenizerState {
        let saved = self.state();
        self.pos = start;
        self.limit = end.min(self.source.len());
        self.line = line;
        self.column = column;
        self.current = Token::new(TokenKind::Eof, start, start, line, column);
        saved
    }

    /// Produces the next token, skipping whitespace and comments.
    pub fn next(&mut self) -> Token {
        loop {
            let t = self.next_spaced();
            if t.kind != TokenKind::Whitespace {
                return t;
            }
        }
    }

    /// Produces the next token, keeping whitespace but consuming
    /// comments (notifying the observer, if any).
    pub fn next_spaced(&mut self) -> Token {
        loop {
            let t = self.consume_token();
            if t.kind == TokenKind::Comment {
                self.report_comment(t);
                continue;
            }
            self.current = t;
            return t;
        }
    }

    /// Produces every token, including whitespace and comments. Used by
    /// the standalone token stream.
    pub fn next_raw(&mut self) -> Token {
        let t = self.consume_token();
        self.current = t;
        t
    }

    /// Looks at the next non-whitespace token without consuming it.
    pub fn peek(&mut self) -> Token {
        let saved = self.state();
        let observer = self.on_comment.take();
        let t = self.next();
        self.on_comment = observer;
        self.restore(saved);
        t
    }

    /// Looks at the next token (whitespace included) without consuming it.
    pub fn peek_spaced(&mut self) -> Token {
        let saved = self.state();
        let observer = self.on_comment.take();
        let t = self.next_spaced();
        self.on_comment = observer;
        self.restore(saved);
        t
    }

    fn report_comment(&mut self, t: Token) {
        if t.start < self.reported_up_to {
            // already reported before a cursor restore
            return;
        }
        self.reported_up_to = t.end;
        if let Some(observer) = self.on_comment.as_mut() {
            observer(Comment {
                start: t.start,
                end: t.end,
                line: t.line,
                column: t.column,
            });
        }
    }

    // -- byte-level helpers -------------------------------------------------

    #[inline]
    fn byte(&self, offset: usize) -> u8 {
        let i = self.pos + offset;
        if i < self.limit {
            self.source[i]
        } else {
            0
        }
    }

    #[inline]
    fn has(&self, offset: usize) -> bool {
        self.pos + offset < self.limit
    }

    /// Advances one byte, tracking line/column. CR+LF counts as one line
    /// terminator but advances two bytes.
    fn advance(&mut self) {
        if self.pos >= self.limit {
            return;
        }
        let b = self.source[self.pos];
        self.pos += 1;
        match b {
            b'\n' => {
                if self.pos >= 2 && self.source[self.pos - 2] == b'\r' {
                    // second half of CR+LF, line already counted
                    self.column = 1;
                } else {
                    self.line += 1;
                    self.column = 1;
                }
            }
            b'\r' | 0x0C => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    // -- token dispatch -----------------------------------------------------

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Token {
        let start = self.pos;
        let line = self.line;
        let column = self.column;

        if self.pos >= self.limit {
            return Token::new(TokenKind::Eof, start, start, line, column);
        }

        let b = self.source[self.pos];
        let kind = match b {
            b'{' | b'}' | b':' | b';' | b',' | b'[' | b']' | b'(' | b')' => {
                self.advance();
                match b {
                    b'{' => TokenKind::LCurly,
                    b'}' => TokenKind::RCurly,
                    b':' => TokenKind::Colon,
                    b';' => TokenKind::Semicolon,
                    b',' => TokenKind::Comma,
                    b'[' => TokenKind::LBracket,
                    b']' => TokenKind::RBracket,
                    b'(' => TokenKind::LParen,
                    _ => TokenKind::RParen,
                }
            }
            _ if charclass::is_whitespace(b) => {
                while self.has(0) && charclass::is_whitespace(self.byte(0)) {
                    self.advance();
                }
                TokenKind::Whitespace
            }
            b'/' if self.byte(1) == b'*' && self.has(1) => self.consume_comment(),
            b'"' | b'\'' => self.consume_string(b),
            _ if charclass::is_digit(b) => self.consume_numeric(),
            b'.' | b'+' => {
                if self.starts_number() {
                    self.consume_numeric()
                } else {
                    self.advance();
                    TokenKind::Delim(b)
                }
            }
            b'-' => {
                if self.starts_number() {
                    self.consume_numeric()
                } else if self.byte(1) == b'-' && self.byte(2) == b'>' && self.has(2) {
                    self.advance_by(3);
                    TokenKind::Cdc
                } else if self.starts_ident_sequence(0) {
                    self.consume_ident_like(start)
                } else {
                    self.advance();
                    TokenKind::Delim(b)
                }
            }
            b'<' => {
                if self.byte(1) == b'!' && self.byte(2) == b'-' && self.byte(3) == b'-' && self.has(3) {
                    self.advance_by(4);
                    TokenKind::Cdo
                } else {
                    self.advance();
                    TokenKind::Delim(b)
                }
            }
            b'@' => {
                if self.starts_ident_sequence(1) {
                    self.advance();
                    self.consume_ident_sequence();
                    TokenKind::AtKeyword
                } else {
                    self.advance();
                    TokenKind::Delim(b)
                }
            }
            b'#' => {
                if charclass::is_ident_char(self.byte(1)) || self.is_valid_escape(1) {
                    self.advance();
                    self.consume_ident_sequence();
                    TokenKind::Hash
                } else {
                    self.advance();
                    TokenKind::Delim(b)
                }
            }
            b'\\' => {
                if self.is_valid_escape(0) {
                    self.consume_ident_like(start)
                } else {
                    // parse error; lone backslash
                    self.advance();
                    TokenKind::Delim(b)
                }
            }
            b'u' | b'U' if self.starts_unicode_range() => self.consume_unicode_range(),
            _ if charclass::is_ident_start(b) => self.consume_ident_like(start),
            _ => {
                self.advance();
                TokenKind::Delim(b)
            }
        };

        Token::new(kind, start, self.pos, line, column)
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// An unclosed comment still yields a valid comment token.
    fn consume_comment(&mut self) -> TokenKind {
        self.advance_by(2);
        while self.has(0) {
            if self.byte(0) == b'*' && self.byte(1) == b'/' {
                self.advance_by(2);
                return TokenKind::Comment;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string(&mut self, quote: u8) -> TokenKind {
        self.advance(); // opening quote
        loop {
            if !self.has(0) {
                // EOF before the closing quote
                return TokenKind::BadString;
            }
            let b = self.byte(0);
            if b == quote {
                self.advance();
                return TokenKind::QuotedString;
            }
            if charclass::is_newline(b) {
                // unescaped newline aborts; the newline is not consumed
                return TokenKind::BadString;
            }
            if b == b'\\' {
                if !self.has(1) {
                    self.advance();
                    continue;
                }
                if charclass::is_newline(self.byte(1)) {
                    // escaped newline
                    self.advance();
                    self.consume_newline();
                    continue;
                }
                self.consume_escape();
                continue;
            }
            self.advance();
        }
    }

    /// Consumes one line terminator, treating CR+LF as a single unit.
    fn consume_newline(&mut self) {
        if self.byte(0) == b'\r' && self.byte(1) == b'\n' {
            self.advance_by(2);
        } else {
            self.advance();
        }
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-an-escaped-code-point)
    ///
    /// Only moves the cursor; escape decoding is not needed for
    /// range-based tokens.
    fn consume_escape(&mut self) {
        self.advance(); // backslash
        if !self.has(0) {
            return;
        }
        if charclass::is_hex_digit(self.byte(0)) {
            let mut digits = 0;
            while digits < 6 && self.has(0) && charclass::is_hex_digit(self.byte(0)) {
                self.advance();
                digits += 1;
            }
            if self.has(0) && charclass::is_whitespace(self.byte(0)) {
                self.consume_newline_or_space();
            }
        } else {
            self.advance_code_point();
        }
    }

    fn consume_newline_or_space(&mut self) {
        if charclass::is_newline(self.byte(0)) {
            self.consume_newline();
        } else {
            self.advance();
        }
    }

    /// Advances past one UTF-8 code point.
    fn advance_code_point(&mut self) {
        self.advance();
        while self.has(0) && self.byte(0) & 0xC0 == 0x80 {
            self.advance();
        }
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric(&mut self) -> TokenKind {
        self.consume_number();
        if self.starts_ident_sequence(0) {
            self.consume_ident_sequence();
            return TokenKind::Dimension;
        }
        if self.byte(0) == b'%' && self.has(0) {
            self.advance();
            return TokenKind::Percentage;
        }
        TokenKind::Number
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) {
        if matches!(self.byte(0), b'+' | b'-') {
            self.advance();
        }
        while charclass::is_digit(self.byte(0)) && self.has(0) {
            self.advance();
        }
        if self.byte(0) == b'.' && charclass::is_digit(self.byte(1)) {
            self.advance_by(2);
            while charclass::is_digit(self.byte(0)) && self.has(0) {
                self.advance();
            }
        }
        // an exponent is consumed only when a digit follows the
        // optional sign; otherwise `e` starts the unit
        if matches!(self.byte(0), b'e' | b'E') {
            let sign = matches!(self.byte(1), b'+' | b'-');
            let digit_at = if sign { 2 } else { 1 };
            if charclass::is_digit(self.byte(digit_at)) {
                self.advance_by(digit_at + 1);
                while charclass::is_digit(self.byte(0)) && self.has(0) {
                    self.advance();
                }
            }
        }
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like(&mut self, start: usize) -> TokenKind {
        self.consume_ident_sequence();

        if self.byte(0) != b'(' || !self.has(0) {
            return TokenKind::Ident;
        }

        let is_url = self.pos - start == 3
            && self.source[start..self.pos].eq_ignore_ascii_case(b"url");
        self.advance(); // '('

        if !is_url {
            return TokenKind::Function;
        }

        // `url(` followed by a quote (after optional whitespace) is a
        // function token; the whitespace stays in the stream
        let mut ahead = 0;
        while self.has(ahead) && charclass::is_whitespace(self.byte(ahead)) {
            ahead += 1;
        }
        if matches!(self.byte(ahead), b'"' | b'\'') && self.has(ahead) {
            return TokenKind::Function;
        }

        self.consume_url_remainder()
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-a-url-token)
    ///
    /// Called with the cursor just past `url(`.
    fn consume_url_remainder(&mut self) -> TokenKind {
        while self.has(0) && charclass::is_whitespace(self.byte(0)) {
            self.advance();
        }
        loop {
            if !self.has(0) {
                // parse error, unclosed url; still a url token
                return TokenKind::Url;
            }
            let b = self.byte(0);
            if b == b')' {
                self.advance();
                return TokenKind::Url;
            }
            if charclass::is_whitespace(b) {
                while self.has(0) && charclass::is_whitespace(self.byte(0)) {
                    self.advance();
                }
                if !self.has(0) || self.byte(0) == b')' {
                    continue;
                }
                return self.consume_bad_url_remnants();
            }
            if matches!(b, b'"' | b'\'' | b'(') || self.is_non_printable(b) {
                return self.consume_bad_url_remnants();
            }
            if b == b'\\' {
                if self.is_valid_escape(0) {
                    self.consume_escape();
                    continue;
                }
                return self.consume_bad_url_remnants();
            }
            self.advance();
        }
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) -> TokenKind {
        loop {
            if !self.has(0) {
                return TokenKind::BadUrl;
            }
            if self.byte(0) == b')' {
                self.advance();
                return TokenKind::BadUrl;
            }
            if self.is_valid_escape(0) {
                self.consume_escape();
            } else {
                self.advance();
            }
        }
    }

    /// 4.3.11. [Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) {
        loop {
            if !self.has(0) {
                return;
            }
            let b = self.byte(0);
            if charclass::is_ident_char(b) {
                self.advance();
            } else if self.is_valid_escape(0) {
                self.consume_escape();
            } else {
                return;
            }
        }
    }

    /// A single `u`/`U` immediately followed by `+` and a hex digit or
    /// `?` begins a unicode-range token.
    fn starts_unicode_range(&self) -> bool {
        self.byte(1) == b'+' && (charclass::is_hex_digit(self.byte(2)) || self.byte(2) == b'?')
    }

    fn consume_unicode_range(&mut self) -> TokenKind {
        self.advance_by(2); // u+
        let mut digits = 0;
        while digits < 6 && self.has(0) && (charclass::is_hex_digit(self.byte(0)) || self.byte(0) == b'?') {
            self.advance();
            digits += 1;
        }
        if self.byte(0) == b'-' && charclass::is_hex_digit(self.byte(1)) {
            self.advance();
            let mut digits = 0;
            while digits < 6 && self.has(0) && charclass::is_hex_digit(self.byte(0)) {
                self.advance();
                digits += 1;
            }
        }
        TokenKind::UnicodeRange
    }

    // -- lookahead predicates ----------------------------------------------

    /// 4.3.8. [Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_valid_escape(&self, offset: usize) -> bool {
        self.byte(offset) == b'\\' && self.has(offset + 1) && !charclass::is_newline(self.byte(offset + 1))
    }

    /// 4.3.9. [Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
    fn starts_ident_sequence(&self, offset: usize) -> bool {
        let first = self.byte(offset);
        if first == b'-' {
            return charclass::is_ident_start(self.byte(offset + 1))
                || self.byte(offset + 1) == b'-'
                || self.is_valid_escape(offset + 1);
        }
        if first == b'\\' {
            return self.is_valid_escape(offset);
        }
        charclass::is_ident_start(first)
    }

    /// True when the cursor sits on `+1`, `-1`, `.5`, `+.5` and friends.
    fn starts_number(&self) -> bool {
        match self.byte(0) {
            b'+' | b'-' => {
                charclass::is_digit(self.byte(1))
                    || (self.byte(1) == b'.' && charclass::is_digit(self.byte(2)))
            }
            b'.' => charclass::is_digit(self.byte(1)),
            b => charclass::is_digit(b),
        }
    }

    /// [non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
    fn is_non_printable(&self, b: u8) -> bool {
        b <= 0x08 || b == 0x0B || (0x0E..=0x1F).contains(&b) || b == 0x7F
    }
}

/// Lazy token sequence over a source string, yielding every token
/// including whitespace and comments. Ends before the EOF token, so the
/// concatenated token ranges exactly partition the source.
pub struct TokenStream<'s> {
    tokenizer: Tokenizer<'s>,
}

impl<'s> TokenStream<'s> {
    #[must_use]
    pub fn new(source: &'s str) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
        }
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let t = self.tokenizer.next_raw();
        if t.kind == TokenKind::Eof {
            None
        } else {
            Some(t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kinds(source: &str) -> Vec<TokenKind> {
        TokenStream::new(source).map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        TokenStream::new(source)
            .map(|t| t.text(source).to_string())
            .collect()
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("{}:;,[]()"),
            vec![
                TokenKind::LCurly,
                TokenKind::RCurly,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LParen,
                TokenKind::RParen,
            ]
        );
    }

    #[test_case("body", TokenKind::Ident; "plain ident")]
    #[test_case("-ident", TokenKind::Ident; "dash ident")]
    #[test_case("--custom-prop", TokenKind::Ident; "custom property")]
    #[test_case("_under", TokenKind::Ident; "underscore start")]
    #[test_case("\\66 oo", TokenKind::Ident; "escape start")]
    #[test_case("bÿte", TokenKind::Ident; "non-ascii")]
    #[test_case("rgb(", TokenKind::Function; "function")]
    #[test_case("@media", TokenKind::AtKeyword; "at keyword")]
    #[test_case("#hash", TokenKind::Hash; "hash")]
    #[test_case("#-dash", TokenKind::Hash; "hash dash")]
    #[test_case("12", TokenKind::Number; "integer")]
    #[test_case("-4.5", TokenKind::Number; "negative fraction")]
    #[test_case("+.5", TokenKind::Number; "signed leading dot")]
    #[test_case("1e-1", TokenKind::Number; "exponent")]
    #[test_case("100%", TokenKind::Percentage; "percentage")]
    #[test_case("1.1rem", TokenKind::Dimension; "dimension")]
    #[test_case("1e", TokenKind::Dimension; "e unit not exponent")]
    #[test_case("2n", TokenKind::Dimension; "nth dimension")]
    #[test_case("\"str\"", TokenKind::QuotedString; "double quoted")]
    #[test_case("'str'", TokenKind::QuotedString; "single quoted")]
    #[test_case("<!--", TokenKind::Cdo; "cdo")]
    #[test_case("-->", TokenKind::Cdc; "cdc")]
    #[test_case("/* c */", TokenKind::Comment; "comment")]
    #[test_case("/* open", TokenKind::Comment; "unclosed comment")]
    #[test_case("url(foo.png)", TokenKind::Url; "unquoted url")]
    #[test_case("U+26", TokenKind::UnicodeRange; "unicode range")]
    #[test_case("u+0-7f", TokenKind::UnicodeRange; "unicode range span")]
    #[test_case("u+4??", TokenKind::UnicodeRange; "unicode range wildcard")]
    fn first_token_kind(source: &str, expected: TokenKind) {
        let t = Tokenizer::new(source).next_raw();
        assert_eq!(t.kind, expected, "for input {source:?}");
    }

    #[test]
    fn ident_stops_at_space() {
        assert_eq!(texts("ide nt"), vec!["ide", " ", "nt"]);
    }

    #[test]
    fn number_then_space_then_unit_is_not_a_dimension() {
        assert_eq!(
            kinds("1 em"),
            vec![TokenKind::Number, TokenKind::Whitespace, TokenKind::Ident]
        );
    }

    #[test]
    fn url_with_quote_is_a_function() {
        assert_eq!(kinds("url(\"x\")")[0], TokenKind::Function);
        assert_eq!(kinds("url(  'x')")[0], TokenKind::Function);
        // but a bare url keeps scanning
        assert_eq!(kinds("url(  x  )"), vec![TokenKind::Url]);
    }

    #[test]
    fn url_token_covers_data_uri() {
        let source = "url(data:image/png;base64,ABC==)";
        let t = Tokenizer::new(source).next_raw();
        assert_eq!(t.kind, TokenKind::Url);
        assert_eq!(t.text(source), source);
    }

    #[test]
    fn bad_url_on_inner_quote() {
        assert_eq!(kinds("url(f'oo)"), vec![TokenKind::BadUrl]);
    }

    #[test]
    fn bad_string_on_newline() {
        let source = "'line\nnewline'";
        let mut tz = Tokenizer::new(source);
        let t = tz.next_raw();
        assert_eq!(t.kind, TokenKind::BadString);
        assert_eq!(t.text(source), "'line");
        // the newline is not consumed
        assert_eq!(tz.next_raw().kind, TokenKind::Whitespace);
    }

    #[test]
    fn bad_string_on_eof() {
        assert_eq!(kinds("\"open"), vec![TokenKind::BadString]);
    }

    #[test]
    fn string_with_escaped_newline() {
        assert_eq!(kinds("'a\\\nb'"), vec![TokenKind::QuotedString]);
    }

    #[test]
    fn function_name_excludes_paren() {
        let source = "rgb(0)";
        let t = Tokenizer::new(source).next_raw();
        let (s, e) = t.function_name();
        assert_eq!(&source[s..e], "rgb");
        assert_eq!(t.text(source), "rgb(");
    }

    #[test]
    fn hyphen_math_is_delim() {
        assert_eq!(
            kinds("a-b - c"),
            vec![
                TokenKind::Ident, // a-b is one ident
                TokenKind::Whitespace,
                TokenKind::Delim(b'-'),
                TokenKind::Whitespace,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn token_ranges_partition_the_source() {
        let source = "body { color: #fff; /* done */ margin: 1px 2em .5% }\n@media (a:1){}";
        let mut next_start = 0;
        for t in TokenStream::new(source) {
            assert_eq!(t.start, next_start, "gap before {:?}", t.kind);
            assert!(t.end > t.start);
            next_start = t.end;
        }
        assert_eq!(next_start, source.len());
    }

    #[test]
    fn line_and_column_tracking() {
        let source = "a\nbb\r\nccc";
        let tokens: Vec<Token> = TokenStream::new(source).collect();
        let idents: Vec<&Token> = tokens.iter().filter(|t| t.kind == TokenKind::Ident).collect();
        assert_eq!((idents[0].line, idents[0].column), (1, 1));
        assert_eq!((idents[1].line, idents[1].column), (2, 1));
        // CR+LF counts as a single terminator
        assert_eq!((idents[2].line, idents[2].column), (3, 1));
    }

    #[test]
    fn column_resets_after_crlf_only_once() {
        let source = "a\r\nb";
        let tokens: Vec<Token> = TokenStream::new(source).collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[2].line, tokens[2].column), (2, 1));
    }

    #[test]
    fn save_restore_replays_the_same_token() {
        let source = ".a { color : red }";
        let mut tz = Tokenizer::new(source);
        tz.next();
        let saved = tz.state();
        let first = tz.next();
        tz.next();
        tz.next();
        tz.restore(saved);
        let replay = tz.next();
        assert_eq!(first, replay);
    }

    #[test]
    fn window_narrows_tokenization() {
        let source = "abc def ghi";
        let mut tz = Tokenizer::new(source);
        let saved = tz.enter_window(4, 7, 1, 5);
        let t = tz.next();
        assert_eq!(t.text(source), "def");
        assert_eq!(t.column, 5);
        assert_eq!(tz.next().kind, TokenKind::Eof);
        tz.restore(saved);
        assert_eq!(tz.next().text(source), "abc");
    }

    #[test]
    fn comment_observer_sees_each_comment_once() {
        let source = "/* a */ b /* c */";
        let mut seen: Vec<(usize, usize)> = Vec::new();
        let mut tz = Tokenizer::new(source);
        tz.set_comment_observer(Box::new(|c: Comment| seen.push((c.start, c.end))));
        // first read, then rewind and read again: no duplicate reports
        let saved = tz.state();
        while tz.next().kind != TokenKind::Eof {}
        tz.restore(saved);
        while tz.next().kind != TokenKind::Eof {}
        drop(tz);
        assert_eq!(seen, vec![(0, 7), (10, 17)]);
    }

    #[test]
    fn escaped_ident_single_token() {
        // `-\-` lexes to a single ident token
        let source = "-\\-rgba";
        assert_eq!(kinds(source), vec![TokenKind::Ident]);
    }
}
