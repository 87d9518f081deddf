//! JSX lowering.
//!
//! Elements become runtime calls: `_jsx`/`_jsxs` from the automatic runtime,
//! or `pragma(type, props, ...children)` in classic mode. Text children are
//! cleaned the way React's compilers do it: lines are trimmed, lines that
//! hold only whitespace vanish, and the remaining lines join with one space.

use std::borrow::Cow;

use super::super::config::JsxRuntime;
use super::super::lexer::{ScanResult, SyntaxError, is_ident_char, is_ident_start, is_identifier};
use super::{FrameKind, Prev, Stop, Transpiler};

enum Prop {
    Attr { name: String, value: String },
    Spread(String),
}

enum ElementType<'s> {
    Fragment,
    Tag(&'s str),
}

impl<'a> Transpiler<'a> {
    /// Parse the element or fragment whose `<` is at `lt` and return its
    /// lowered call together with the offset after it.
    pub(super) fn jsx_element(&mut self, lt: usize) -> ScanResult<(String, usize)> {
        self.helpers.any = true;
        let mut pos = self.jsx_space(lt + 1)?;

        if self.lex.byte(pos) == Some(b'>') {
            let (children, end) = self.jsx_children(lt, pos + 1, None)?;
            return Ok((self.emit(ElementType::Fragment, Vec::new(), None, children), end));
        }

        let (name, after) = self.jsx_name(pos, "tag name")?;
        pos = after;
        let mut props = Vec::new();
        let mut key = None;

        loop {
            pos = self.jsx_space(pos)?;
            match self.lex.byte(pos) {
                Some(b'/') => {
                    let close = self.jsx_space(pos + 1)?;
                    if self.lex.byte(close) != Some(b'>') {
                        return Err(SyntaxError::new(close, "Expected `>` after `/`"));
                    }
                    let code = self.emit(ElementType::Tag(name), props, key, Vec::new());
                    return Ok((code, close + 1));
                }
                Some(b'>') => {
                    let (children, end) = self.jsx_children(lt, pos + 1, Some(name))?;
                    let code = self.emit(ElementType::Tag(name), props, key, children);
                    return Ok((code, end));
                }
                Some(b'{') => {
                    let inner = self.jsx_space(pos + 1)?;
                    if !self.lex.starts_with(inner, "...") {
                        return Err(SyntaxError::new(
                            inner,
                            "Expected `...` in JSX spread attribute",
                        ));
                    }
                    let (code, end) = self.expression(inner + 3)?;
                    props.push(Prop::Spread(code));
                    pos = end;
                }
                Some(_) => {
                    let (attr, after) = self.jsx_name(pos, "attribute name")?;
                    let after = self.jsx_space(after)?;
                    let (value, end) = if self.lex.byte(after) == Some(b'=') {
                        self.jsx_attr_value(self.jsx_space(after + 1)?)?
                    } else {
                        ("true".to_string(), after)
                    };
                    let automatic = matches!(self.runtime, JsxRuntime::Automatic { .. });
                    if attr == "key" && automatic {
                        key = Some(value);
                    } else {
                        props.push(Prop::Attr {
                            name: attr.to_string(),
                            value,
                        });
                    }
                    pos = end;
                }
                None => return Err(SyntaxError::new(lt, "Unterminated JSX element")),
            }
        }
    }

    fn jsx_space(&self, pos: usize) -> ScanResult<usize> {
        Ok(self.lex.skip_trivia(pos)?.0)
    }

    /// Tag or attribute name: identifier characters plus `-`, `.` and `:`.
    fn jsx_name(&self, start: usize, what: &str) -> ScanResult<(&'a str, usize)> {
        if !self.lex.char_at(start).is_some_and(is_ident_start) {
            let found = self.lex.char_at(start).map_or("end of input".to_string(), |c| format!("`{c}`"));
            return Err(SyntaxError::new(start, format!("Expected JSX {what}, found {found}")));
        }
        let src = self.src;
        let mut pos = start;
        while let Some(c) = self.lex.char_at(pos) {
            if is_ident_char(c) || matches!(c, '-' | '.' | ':') {
                pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok((&src[start..pos], pos))
    }

    fn jsx_attr_value(&mut self, pos: usize) -> ScanResult<(String, usize)> {
        match self.lex.byte(pos) {
            Some(quote @ (b'"' | b'\'')) => {
                let body = pos + 1;
                let Some(len) = self.src[body..].find(quote as char) else {
                    return Err(SyntaxError::new(pos, "Unterminated string constant"));
                };
                let text = decode_entities(&self.src[body..body + len]);
                Ok((string_literal(&text), body + len + 1))
            }
            Some(b'{') => {
                let (code, end) = self.expression(pos + 1)?;
                if code.trim().is_empty() {
                    return Err(SyntaxError::new(
                        pos,
                        "JSX attributes must only be assigned a non-empty expression",
                    ));
                }
                Ok((code, end))
            }
            Some(b'<') => self.jsx_element(pos),
            _ => Err(SyntaxError::new(
                pos,
                "JSX value should be either an expression or a quoted JSX text",
            )),
        }
    }

    /// Transform the expression after a `{` through its closing `}`.
    fn expression(&mut self, pos: usize) -> ScanResult<(String, usize)> {
        let (code, end) = self.region(pos, Stop::CloseBrace, FrameKind::Expr, Prev::Op)?;
        Ok((code.trim().to_string(), end))
    }

    /// Children up to and including the closing tag. `lt` is the opening
    /// element's `<`, for error positions.
    fn jsx_children(
        &mut self,
        lt: usize,
        mut pos: usize,
        name: Option<&str>,
    ) -> ScanResult<(Vec<String>, usize)> {
        let mut children = Vec::new();
        loop {
            let text_end = self.src[pos..]
                .find(['<', '{', '>', '}'])
                .map_or(self.lex.len(), |i| pos + i);
            if let Some(text) = clean_text(&decode_entities(&self.src[pos..text_end])) {
                children.push(string_literal(&text));
            }
            pos = text_end;

            match self.lex.byte(pos) {
                None => {
                    let what = name.map_or("fragment".to_string(), |n| format!("<{n}>"));
                    return Err(SyntaxError::new(lt, format!("Unterminated JSX contents in {what}")));
                }
                Some(b @ (b'>' | b'}')) => {
                    let c = b as char;
                    let entity = if c == '>' { "&gt;" } else { "&rbrace;" };
                    return Err(SyntaxError::new(
                        pos,
                        format!("Unexpected token `{c}`. Did you mean `{entity}` or `{{'{c}'}}`?"),
                    ));
                }
                Some(b'{') => {
                    let inner = self.jsx_space(pos + 1)?;
                    if self.lex.byte(inner) == Some(b'}') {
                        pos = inner + 1;
                        continue;
                    }
                    let (code, end) = self.expression(pos + 1)?;
                    children.push(code);
                    pos = end;
                }
                Some(_) => {
                    let after = self.jsx_space(pos + 1)?;
                    if self.lex.byte(after) != Some(b'/') {
                        let (code, end) = self.jsx_element(pos)?;
                        children.push(code);
                        pos = end;
                        continue;
                    }

                    let close_start = pos;
                    let mut at = self.jsx_space(after + 1)?;
                    let closing = if self.lex.byte(at) == Some(b'>') {
                        None
                    } else {
                        let (closing, end) = self.jsx_name(at, "closing tag name")?;
                        at = self.jsx_space(end)?;
                        Some(closing)
                    };
                    if closing != name {
                        let expected = name.map_or("<>".to_string(), |n| format!("<{n}>"));
                        return Err(SyntaxError::new(
                            close_start,
                            format!("Expected corresponding JSX closing tag for {expected}"),
                        ));
                    }
                    if self.lex.byte(at) != Some(b'>') {
                        return Err(SyntaxError::new(at, "Expected `>` in closing tag"));
                    }
                    return Ok((children, at + 1));
                }
            }
        }
    }

    fn element_type(&mut self, ty: ElementType<'_>) -> String {
        match (ty, self.runtime) {
            (ElementType::Fragment, JsxRuntime::Automatic { .. }) => {
                self.helpers.fragment = true;
                "_Fragment".to_string()
            }
            (ElementType::Fragment, JsxRuntime::Classic { pragma_frag, .. }) => {
                pragma_frag.clone()
            }
            (ElementType::Tag(name), _) => {
                let intrinsic = name
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_lowercase())
                    || name.contains('-')
                    || name.contains(':');
                if name.contains('.') && !name.contains(':') {
                    name.to_string()
                } else if intrinsic {
                    string_literal(name)
                } else {
                    name.to_string()
                }
            }
        }
    }

    fn emit(
        &mut self,
        ty: ElementType<'_>,
        props: Vec<Prop>,
        key: Option<String>,
        children: Vec<String>,
    ) -> String {
        let ty = self.element_type(ty);
        let mut entries: Vec<String> = props
            .into_iter()
            .map(|prop| match prop {
                Prop::Attr { name, value } => format!("{}: {value}", property_key(&name)),
                Prop::Spread(code) => format!("...{code}"),
            })
            .collect();

        match self.runtime {
            JsxRuntime::Automatic { .. } => {
                let many = children.len() > 1;
                match children.len() {
                    0 => {}
                    1 => entries.push(format!("children: {}", children[0])),
                    _ => entries.push(format!("children: [{}]", children.join(", "))),
                }
                let callee = if many {
                    self.helpers.jsxs = true;
                    "_jsxs"
                } else {
                    self.helpers.jsx = true;
                    "_jsx"
                };
                let props = object_literal(&entries).unwrap_or_else(|| "{}".to_string());
                match key {
                    Some(key) => format!("{callee}({ty}, {props}, {key})"),
                    None => format!("{callee}({ty}, {props})"),
                }
            }
            JsxRuntime::Classic { pragma, .. } => {
                let props = object_literal(&entries).unwrap_or_else(|| "null".to_string());
                let mut args = vec![ty, props];
                args.extend(children);
                format!("{pragma}({})", args.join(", "))
            }
        }
    }
}

fn object_literal(entries: &[String]) -> Option<String> {
    (!entries.is_empty()).then(|| format!("{{ {} }}", entries.join(", ")))
}

fn property_key(name: &str) -> Cow<'_, str> {
    if is_identifier(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(string_literal(name))
    }
}

/// A JavaScript string literal with JSON escaping.
fn string_literal(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// Collapse JSX text the way React expects: per line, tabs become spaces,
/// leading space is trimmed except on the first line, trailing space except
/// on the last; blank lines vanish; survivors join with a single space.
pub(crate) fn clean_text(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.split("\r\n").flat_map(|l| l.split(['\n', '\r'])).collect();
    let last_non_empty = lines
        .iter()
        .rposition(|l| l.chars().any(|c| c != ' ' && c != '\t'))?;

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut trimmed: Cow<'_, str> = if line.contains('\t') {
            Cow::Owned(line.replace('\t', " "))
        } else {
            Cow::Borrowed(line)
        };
        if i != 0 {
            trimmed = Cow::Owned(trimmed.trim_start_matches(' ').to_string());
        }
        if i != lines.len() - 1 {
            trimmed = Cow::Owned(trimmed.trim_end_matches(' ').to_string());
        }
        if !trimmed.is_empty() {
            out.push_str(&trimmed);
            if i != last_non_empty {
                out.push(' ');
            }
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Named entities React projects actually use, plus numeric references.
fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "middot" => '·',
        "bull" => '•',
        "times" => '×',
        "divide" => '÷',
        "deg" => '°',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "sect" => '§',
        "para" => '¶',
        "larr" => '←',
        "rarr" => '→',
        "uarr" => '↑',
        "darr" => '↓',
        "harr" => '↔',
        "lbrace" => '{',
        "rbrace" => '}',
        "star" => '☆',
        "check" => '✓',
        "hearts" => '♥',
        _ => return None,
    })
}

/// Decode HTML character references in JSX text and attribute strings.
/// Unknown references stay as written.
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest[1..].find(';').filter(|&i| i > 0 && i <= 10).and_then(|i| {
            let name = &rest[1..1 + i];
            let c = if let Some(num) = name.strip_prefix('#') {
                let value = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                value.and_then(char::from_u32)
            } else {
                named_entity(name)
            };
            c.map(|c| (c, i + 2))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
