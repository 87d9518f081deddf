//! Token scanner for JavaScript and TypeScript source.
//!
//! The scanner is positional: callers ask for the token at a byte offset and
//! say whether a `/` there would start a regular expression. It never builds a
//! token list, because JSX text and template chunks are not tokens and the
//! caller decides when to leave token mode.
//!
//! `>` is always a single-character token so that closing type-argument lists
//! never merge with shift or comparison operators. Output is produced by
//! slicing the source, so token granularity never changes emitted bytes.

use std::fmt;

/// Token classes the transformer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Identifier, keyword, or `#private` name.
    Ident,
    Number,
    String,
    /// The opening backtick of a template literal.
    Template,
    Regex,
    Punct,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// A line break occurs between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn is(&self, src: &str, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text(src) == text
    }

    pub fn is_punct(&self, src: &str, text: &str) -> bool {
        self.is(src, TokenKind::Punct, text)
    }

    pub fn is_ident(&self, src: &str, text: &str) -> bool {
        self.is(src, TokenKind::Ident, text)
    }
}

/// A scan failure at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (offset {})", self.message, self.offset)
    }
}

pub(crate) type ScanResult<T> = Result<T, SyntaxError>;

/// Where a template chunk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateStop {
    /// At `${`; the offset is of the `$`.
    Substitution(usize),
    /// After the closing backtick.
    End(usize),
}

/// Keywords that are complete operands.
const OPERAND_KEYWORDS: &[&str] = &["this", "super", "null", "true", "false"];

/// Keywords after which a `{` opens a block.
const BLOCK_KEYWORDS: &[&str] = &["else", "do", "try", "finally", "static"];

/// Reserved words; anything else is an ordinary identifier.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "finally", "for", "function", "if", "import", "in",
    "instanceof", "let", "new", "return", "switch", "throw", "try", "typeof", "var", "void",
    "while", "with", "yield", "await", "of", "this", "super", "null", "true", "false", "static",
];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

pub(crate) fn is_operand_keyword(word: &str) -> bool {
    OPERAND_KEYWORDS.contains(&word)
}

pub(crate) fn is_block_keyword(word: &str) -> bool {
    BLOCK_KEYWORDS.contains(&word)
}

/// Whether a `/` after `prev` starts a regular expression.
pub(crate) fn regex_allowed_after(src: &str, prev: Option<Token>) -> bool {
    let Some(prev) = prev else { return true };
    let text = prev.text(src);
    match prev.kind {
        TokenKind::Punct => !matches!(text, ")" | "]" | "}" | "++" | "--"),
        TokenKind::Ident => is_reserved(text) && !is_operand_keyword(text),
        _ => false,
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}

/// Whether `word` can be written as a bare property name.
pub(crate) fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if is_ident_start(c)) && chars.all(is_ident_char)
}

const PUNCTUATORS: &[&str] = &[
    "...", "===", "!==", "**=", "<<=", "&&=", "||=", "??=", "=>", "==", "!=", "<=", "**", "++",
    "--", "<<", "&&", "||", "??", "?.", "+=", "-=", "*=", "%=", "&=", "|=", "^=",
];

pub(crate) struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn byte(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.src.get(pos..).and_then(|s| s.chars().next())
    }

    pub fn starts_with(&self, pos: usize, text: &str) -> bool {
        self.src.get(pos..).is_some_and(|s| s.starts_with(text))
    }

    /// Skip whitespace and comments. Returns the new offset and whether a line
    /// break was crossed.
    pub fn skip_trivia(&self, mut pos: usize) -> ScanResult<(usize, bool)> {
        let mut newline = false;
        while let Some(c) = self.char_at(pos) {
            if c == '\n' || c == '\r' || c == '\u{2028}' || c == '\u{2029}' {
                newline = true;
                pos += c.len_utf8();
            } else if c.is_whitespace() || c == '\u{feff}' {
                pos += c.len_utf8();
            } else if self.starts_with(pos, "//") {
                pos = self.src[pos..].find('\n').map_or(self.len(), |i| pos + i);
            } else if self.starts_with(pos, "/*") {
                let Some(end) = self.src[pos + 2..].find("*/") else {
                    return Err(SyntaxError::new(pos, "Unterminated comment"));
                };
                if self.src[pos..pos + 2 + end].contains('\n') {
                    newline = true;
                }
                pos += end + 4;
            } else {
                break;
            }
        }
        Ok((pos, newline))
    }

    /// The token at or after `pos`.
    pub fn next(&self, pos: usize, regex_ok: bool) -> ScanResult<Token> {
        let (start, newline_before) = self.skip_trivia(pos)?;
        let token = |kind, end| Token {
            kind,
            start,
            end,
            newline_before,
        };

        let Some(c) = self.char_at(start) else {
            return Ok(token(TokenKind::Eof, start));
        };

        if is_ident_start(c) || c == '\\' {
            return Ok(token(TokenKind::Ident, self.scan_ident(start)));
        }
        if c == '#' && self.char_at(start + 1).is_some_and(is_ident_start) {
            return Ok(token(TokenKind::Ident, self.scan_ident(start + 1)));
        }
        if c.is_ascii_digit()
            || (c == '.' && self.byte(start + 1).is_some_and(|b| b.is_ascii_digit()))
        {
            return Ok(token(TokenKind::Number, self.scan_number(start)));
        }
        match c {
            '"' | '\'' => Ok(token(TokenKind::String, self.scan_string(start)?)),
            '`' => Ok(token(TokenKind::Template, start + 1)),
            '/' if regex_ok => Ok(token(TokenKind::Regex, self.scan_regex(start)?)),
            _ => Ok(token(TokenKind::Punct, self.scan_punct(start))),
        }
    }

    fn scan_ident(&self, mut pos: usize) -> usize {
        while let Some(c) = self.char_at(pos) {
            if c == '\\' {
                // \uXXXX or \u{...}
                pos += 2;
                if self.byte(pos) == Some(b'{') {
                    pos = self.src[pos..].find('}').map_or(self.len(), |i| pos + i + 1);
                } else {
                    pos = (pos + 4).min(self.len());
                }
            } else if is_ident_char(c) {
                pos += c.len_utf8();
            } else {
                break;
            }
        }
        pos
    }

    fn scan_number(&self, start: usize) -> usize {
        let mut pos = start;
        let mut seen_dot = false;
        let radix_prefix = self.byte(start) == Some(b'0')
            && matches!(self.byte(start + 1), Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B'));
        while let Some(b) = self.byte(pos) {
            match b {
                b'0'..=b'9' | b'_' => pos += 1,
                b'.' if !seen_dot && !radix_prefix => {
                    seen_dot = true;
                    pos += 1;
                }
                b'e' | b'E' if !radix_prefix => {
                    pos += 1;
                    if matches!(self.byte(pos), Some(b'+' | b'-')) {
                        pos += 1;
                    }
                }
                b if b.is_ascii_alphanumeric() => pos += 1,
                _ => break,
            }
        }
        pos
    }

    fn scan_string(&self, start: usize) -> ScanResult<usize> {
        let quote = self.bytes[start];
        let mut pos = start + 1;
        while let Some(b) = self.byte(pos) {
            match b {
                b'\\' => {
                    pos += 1;
                    pos += self.char_at(pos).map_or(0, char::len_utf8);
                }
                b'\n' | b'\r' => break,
                b if b == quote => return Ok(pos + 1),
                _ => pos += 1,
            }
        }
        Err(SyntaxError::new(start, "Unterminated string constant"))
    }

    fn scan_regex(&self, start: usize) -> ScanResult<usize> {
        let mut pos = start + 1;
        let mut in_class = false;
        loop {
            match self.byte(pos) {
                None | Some(b'\n' | b'\r') => {
                    return Err(SyntaxError::new(start, "Unterminated regular expression"));
                }
                Some(b'\\') => {
                    pos += 1;
                    pos += self.char_at(pos).map_or(0, char::len_utf8);
                }
                Some(b'[') => {
                    in_class = true;
                    pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    pos += 1;
                }
                Some(b'/') if !in_class => {
                    pos += 1;
                    break;
                }
                Some(_) => pos += self.char_at(pos).map_or(1, char::len_utf8),
            }
        }
        while self.char_at(pos).is_some_and(is_ident_char) {
            pos += 1;
        }
        Ok(pos)
    }

    fn scan_punct(&self, start: usize) -> usize {
        if self.byte(start) == Some(b'>') {
            return start + 1;
        }
        for p in PUNCTUATORS {
            if self.starts_with(start, p) {
                // `a?.5:b` is a conditional, not optional chaining.
                if *p == "?." && self.byte(start + 2).is_some_and(|b| b.is_ascii_digit()) {
                    continue;
                }
                return start + p.len();
            }
        }
        start + self.char_at(start).map_or(1, char::len_utf8)
    }

    /// Scan template text from `pos` (just after the backtick or a closing
    /// `}` of a substitution) to the next substitution or the end.
    pub fn scan_template_chunk(&self, open: usize, mut pos: usize) -> ScanResult<TemplateStop> {
        while let Some(b) = self.byte(pos) {
            match b {
                b'\\' => {
                    pos += 1;
                    pos += self.char_at(pos).map_or(0, char::len_utf8);
                }
                b'`' => return Ok(TemplateStop::End(pos + 1)),
                b'$' if self.byte(pos + 1) == Some(b'{') => {
                    return Ok(TemplateStop::Substitution(pos));
                }
                _ => pos += 1,
            }
        }
        Err(SyntaxError::new(open, "Unterminated template"))
    }

    /// Skip a whole template literal starting at its backtick, nested
    /// substitutions included. Returns the offset after the closing backtick.
    pub fn skip_template(&self, open: usize) -> ScanResult<usize> {
        let mut pos = open + 1;
        loop {
            match self.scan_template_chunk(open, pos)? {
                TemplateStop::End(end) => return Ok(end),
                TemplateStop::Substitution(at) => {
                    pos = self.skip_to_close_brace(at + 2)?;
                }
            }
        }
    }

    /// Skip expression tokens until the `}` that closes an already-open
    /// brace. Returns the offset after that `}`.
    pub fn skip_to_close_brace(&self, mut pos: usize) -> ScanResult<usize> {
        let mut depth = 0usize;
        let mut prev: Option<Token> = None;
        loop {
            let tok = self.next(pos, regex_allowed_after(self.src, prev))?;
            pos = tok.end;
            match tok.kind {
                TokenKind::Eof => {
                    return Err(SyntaxError::new(tok.start, "Unexpected end of input"));
                }
                TokenKind::Template => {
                    pos = self.skip_template(tok.start)?;
                    prev = Some(Token {
                        kind: TokenKind::String,
                        end: pos,
                        ..tok
                    });
                    continue;
                }
                TokenKind::Punct => match tok.text(self.src) {
                    "{" | "(" | "[" => depth += 1,
                    "}" if depth == 0 => return Ok(tok.end),
                    "}" | ")" | "]" => depth = depth.saturating_sub(1),
                    _ => {}
                },
                _ => {}
            }
            prev = Some(tok);
        }
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub(crate) fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Value of a quoted string literal. Escapes other than the common ones are
/// kept verbatim, which is enough for module specifiers.
pub(crate) fn string_value(literal: &str) -> String {
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
