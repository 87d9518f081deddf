//! TypeScript erasure.
//!
//! Type syntax is removed, never checked. Declarations that only exist at the
//! type level (interfaces, aliases, `declare`, type-only imports and exports)
//! disappear whole; `enum` is the one construct that produces runtime code.

use super::super::lexer::{ScanResult, SyntaxError, Token, TokenKind};
use super::{FrameKind, PendingProps, Prev, Region, Transpiler};

/// Identifiers that prefix another type operand.
const TYPE_PREFIXES: &[&str] = &[
    "keyof", "typeof", "readonly", "unique", "infer", "new", "asserts", "abstract",
];

/// Class member and parameter-property modifiers. `abstract` and `declare`
/// members have no runtime code and are dropped whole.
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "readonly",
    "override",
    "declare",
    "abstract",
];

/// Punctuation that may appear inside type arguments.
const TYPE_PUNCT: &[&str] = &[
    ",", ".", "|", "&", "?", ":", "=>", "[", "]", "(", ")", "{", "}", "<", ">", "=", ";", "...",
    "-",
];

/// Words after `declare` that make it a declaration.
const DECLARABLE: &[&str] = &[
    "const",
    "let",
    "var",
    "function",
    "class",
    "abstract",
    "enum",
    "module",
    "namespace",
    "global",
    "type",
    "interface",
    "async",
];

fn closer_of(open: &str) -> &'static str {
    match open {
        "(" => ")",
        "[" => "]",
        "{" => "}",
        _ => ">",
    }
}

impl<'a> Transpiler<'a> {
    /// Statement-level handling: type-only declarations, `import type`,
    /// `enum`, `abstract class`. Returns the offset to resume at when the
    /// token was consumed.
    pub(super) fn ts_statement(
        &mut self,
        r: &mut Region,
        tok: Token,
        statement: bool,
    ) -> ScanResult<Option<usize>> {
        let src = self.src;
        let text = tok.text(src);

        match text {
            "export" if statement => {
                let mut next = self.peek(tok.end)?;
                if next.is_ident(src, "default") {
                    next = self.peek(next.end)?;
                    if !next.is_ident(src, "interface") {
                        return Ok(None);
                    }
                }
                if let Some(end) = self.type_only_declaration(next, true)? {
                    r.skip(src, tok.start, end);
                    r.statement_removed();
                    return Ok(Some(end));
                }
            }
            "import" if statement => {
                let next = self.peek(tok.end)?;
                if next.is_ident(src, "type") {
                    let after = self.peek(next.end)?;
                    // `import type from "x"` and `import type, {..}` bind a
                    // default import named `type`.
                    let default_named_type = after.is_punct(src, ",")
                        || (after.is_ident(src, "from")
                            && self.peek(after.end)?.kind == TokenKind::String);
                    if !default_named_type {
                        let end = self.skip_module_clause(next.end)?;
                        r.skip(src, tok.start, end);
                        r.statement_removed();
                        return Ok(Some(end));
                    }
                }
            }
            "enum" => {
                let after_keyword = r.last.is_some_and(|l| {
                    l.is_ident(src, "export") || l.is_ident(src, "const")
                });
                if statement || after_keyword {
                    return self.lower_enum(r, tok);
                }
            }
            "abstract" => {
                let next = self.peek(tok.end)?;
                if next.is_ident(src, "class") && !next.newline_before {
                    r.skip(src, tok.start, next.start);
                    return Ok(Some(tok.end));
                }
            }
            _ if statement => {
                if let Some(end) = self.type_only_declaration(tok, false)? {
                    r.skip(src, tok.start, end);
                    r.statement_removed();
                    return Ok(Some(end));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    /// Expression- and member-level erasure: `as`, `satisfies`, modifiers,
    /// `implements`, inline `type` specifiers.
    pub(super) fn ts_ident(&mut self, r: &mut Region, tok: Token) -> ScanResult<Option<usize>> {
        let src = self.src;
        let text = tok.text(src);
        let frame = *r.frame();

        match text {
            "as" | "satisfies"
                if r.prev == Prev::Operand
                    && frame.kind != FrameKind::ModuleClause
                    && !frame.in_import =>
            {
                let end = self.skip_type(tok.end, false)?;
                let start = r.last.map_or(tok.start, |l| l.end);
                r.skip(src, start, end);
                Ok(Some(end))
            }
            "implements" if frame.class_pending => {
                let mut end = tok.end;
                loop {
                    end = self.skip_type(end, false)?;
                    let next = self.peek(end)?;
                    if !next.is_punct(src, ",") {
                        break;
                    }
                    end = next.end;
                }
                let start = r.last.map_or(tok.start, |l| l.end);
                r.skip(src, start, end);
                Ok(Some(end))
            }
            "type" if frame.kind == FrameKind::ModuleClause => {
                let next = self.peek(tok.end)?;
                if next.kind != TokenKind::Ident || next.is_ident(src, "as") {
                    return Ok(None);
                }
                let mut end = next.end;
                let after = self.peek(end)?;
                if after.is_ident(src, "as") {
                    end = self.peek(after.end)?.end;
                }
                let after = self.peek(end)?;
                if after.is_punct(src, ",") {
                    end = after.end;
                }
                let resume = self.lex.skip_trivia(end)?.0;
                r.skip(src, tok.start, resume);
                Ok(Some(resume))
            }
            "this"
                if frame.kind == FrameKind::Paren
                    && r.last.is_some_and(|l| l.start == frame.open) =>
            {
                // `function f(this: Window, ...)`
                let colon = self.peek(tok.end)?;
                if !colon.is_punct(src, ":") {
                    return Ok(None);
                }
                let mut end = self.skip_type(colon.end, true)?;
                let next = self.peek(end)?;
                if next.is_punct(src, ",") {
                    end = next.end;
                }
                let resume = self.lex.skip_trivia(end)?.0;
                r.skip(src, tok.start, resume);
                Ok(Some(resume))
            }
            _ if MODIFIERS.contains(&text)
                && matches!(frame.kind, FrameKind::ClassBody | FrameKind::Paren) =>
            {
                let next = self.peek(tok.end)?;
                let names_member = !next.newline_before
                    && (next.kind == TokenKind::Ident
                        || next.kind == TokenKind::String
                        || next.is_punct(src, "[")
                        || next.is_punct(src, "*"));
                if !names_member {
                    return Ok(None);
                }
                if frame.kind == FrameKind::ClassBody && matches!(text, "abstract" | "declare") {
                    let end = self.skip_ambient(tok, false)?;
                    r.skip(src, tok.start, end);
                    r.statement_removed();
                    return Ok(Some(end));
                }
                let parameter_property = frame.kind == FrameKind::Paren
                    && r.parent().is_some_and(|p| p.kind == FrameKind::ClassBody)
                    && next.kind == TokenKind::Ident
                    && !MODIFIERS.contains(&next.text(src));
                if parameter_property {
                    self.param_props.push(next.text(src).to_string());
                }
                r.skip(src, tok.start, next.start);
                Ok(Some(tok.end))
            }
            _ => Ok(None),
        }
    }

    /// Whether this `?` marks an optional parameter or member rather than
    /// starting a conditional expression.
    pub(super) fn optional_marker(&self, r: &Region, tok: Token) -> ScanResult<bool> {
        let src = self.src;
        let frame = r.frame();
        let after_name =
            r.prev == Prev::Operand && r.last.is_some_and(|l| l.kind == TokenKind::Ident);
        if !after_name {
            return Ok(false);
        }
        let next = self.peek(tok.end)?;
        let next_text = next.text(src);
        Ok(match frame.kind {
            FrameKind::Paren => matches!(next_text, ":" | "," | ")" | "="),
            FrameKind::ClassBody => {
                let member_start = r.prev_before == Prev::Start
                    || r.last.is_some_and(|l| l.newline_before);
                member_start
                    && (next.newline_before || matches!(next_text, ":" | "(" | ";" | "="))
            }
            _ => false,
        })
    }

    /// `<T,>` or `<T extends U>` at expression start in TSX.
    pub(super) fn is_generic_arrow(&self, lt: Token) -> ScanResult<bool> {
        let src = self.src;
        let first = self.peek(lt.end)?;
        if first.kind != TokenKind::Ident {
            return Ok(false);
        }
        let second = self.peek(first.end)?;
        Ok(second.is_punct(src, ",") || second.is_punct(src, "=") || second.is_ident(src, "extends"))
    }

    /// End of a type starting at `pos`. With `allow_arrow` false a `=>` ends
    /// the type instead of continuing a function type (arrow return types).
    pub(super) fn skip_type(&self, pos: usize, allow_arrow: bool) -> ScanResult<usize> {
        let src = self.src;
        let mut end = pos;
        let mut expect_operand = true;
        let mut conditionals = 0u32;
        let mut branches = 0u32;

        loop {
            let tok = self.peek(end)?;
            let text = tok.text(src);

            if expect_operand {
                match tok.kind {
                    TokenKind::Ident => {
                        if TYPE_PREFIXES.contains(&text) && self.prefixes_operand(tok)? {
                            end = tok.end;
                            continue;
                        }
                        end = tok.end;
                        expect_operand = false;
                        let next = self.peek(end)?;
                        if next.is_punct(src, "<") && !next.newline_before {
                            end = self.skip_group(next)?;
                        }
                    }
                    TokenKind::String | TokenKind::Number => {
                        end = tok.end;
                        expect_operand = false;
                    }
                    TokenKind::Template => {
                        end = self.lex.skip_template(tok.start)?;
                        expect_operand = false;
                    }
                    TokenKind::Punct => match text {
                        "(" | "[" | "{" => {
                            end = self.skip_group(tok)?;
                            expect_operand = false;
                        }
                        "<" => end = self.skip_group(tok)?,
                        "|" | "&" | "-" | "+" => end = tok.end,
                        _ => return Ok(end),
                    },
                    _ => return Ok(end),
                }
                continue;
            }

            if tok.newline_before && !matches!(text, "|" | "&") {
                return Ok(end);
            }
            match (tok.kind, text) {
                (TokenKind::Punct, "[" | "<") => end = self.skip_group(tok)?,
                (TokenKind::Punct, "." | "|" | "&") => {
                    end = tok.end;
                    expect_operand = true;
                }
                (TokenKind::Punct, "=>") if allow_arrow => {
                    end = tok.end;
                    expect_operand = true;
                }
                (TokenKind::Ident, "extends") => {
                    end = tok.end;
                    expect_operand = true;
                    conditionals += 1;
                }
                (TokenKind::Ident, "is") => {
                    end = tok.end;
                    expect_operand = true;
                }
                (TokenKind::Punct, "?") if conditionals > 0 => {
                    conditionals -= 1;
                    branches += 1;
                    end = tok.end;
                    expect_operand = true;
                }
                (TokenKind::Punct, ":") if branches > 0 => {
                    branches -= 1;
                    end = tok.end;
                    expect_operand = true;
                }
                _ => return Ok(end),
            }
        }
    }

    fn prefixes_operand(&self, tok: Token) -> ScanResult<bool> {
        let next = self.peek(tok.end)?;
        let text = next.text(self.src);
        Ok(!next.newline_before
            && (matches!(
                next.kind,
                TokenKind::Ident | TokenKind::String | TokenKind::Number
            ) || matches!(text, "(" | "[" | "{")))
    }

    /// Skip a bracketed group in type position. All brackets nest, `<` too.
    pub(super) fn skip_group(&self, open: Token) -> ScanResult<usize> {
        match self.scan_group(open, true)? {
            Some(end) => Ok(end),
            None => Err(SyntaxError::new(open.start, "Malformed type")),
        }
    }

    /// Offset after `<...>` if it reads as type arguments: only type-ish
    /// tokens inside and a call, tagged template, or class heritage after.
    pub(super) fn type_arguments_end(
        &self,
        open: Token,
        in_class_heritage: bool,
    ) -> ScanResult<Option<usize>> {
        let src = self.src;
        let Some(end) = self.scan_group(open, false).ok().flatten() else {
            return Ok(None);
        };
        let Ok(next) = self.peek(end) else {
            return Ok(None);
        };
        let call_like = next.is_punct(src, "(") || next.kind == TokenKind::Template;
        let heritage = in_class_heritage
            && (next.is_punct(src, "{")
                || next.is_ident(src, "extends")
                || next.is_ident(src, "implements"));
        Ok((call_like || heritage).then_some(end))
    }

    /// Balanced scan from `open`. In non-strict mode anything that does not
    /// look like type syntax yields `None`.
    fn scan_group(&self, open: Token, strict: bool) -> ScanResult<Option<usize>> {
        let src = self.src;
        let mut expected = vec![closer_of(open.text(src))];
        let mut pos = open.end;

        while let Some(&closer) = expected.last() {
            let tok = self.peek(pos)?;
            pos = tok.end;
            let text = tok.text(src);
            match tok.kind {
                TokenKind::Eof => {
                    return if strict {
                        Err(SyntaxError::new(open.start, "Unexpected end of input in type"))
                    } else {
                        Ok(None)
                    };
                }
                TokenKind::Template => pos = self.lex.skip_template(tok.start)?,
                TokenKind::Punct => match text {
                    "(" | "[" | "{" | "<" => expected.push(closer_of(text)),
                    ")" | "]" | "}" | ">" if text == closer => {
                        expected.pop();
                    }
                    ")" | "]" | "}" | ">" => {
                        return if strict {
                            Err(SyntaxError::new(
                                tok.start,
                                format!("Unexpected token `{text}` in type; expected `{closer}`"),
                            ))
                        } else {
                            Ok(None)
                        };
                    }
                    _ if !strict && !TYPE_PUNCT.contains(&text) => return Ok(None),
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(Some(pos))
    }

    /// End of a declaration that exists only at the type level, if `tok`
    /// starts one.
    fn type_only_declaration(&self, tok: Token, after_export: bool) -> ScanResult<Option<usize>> {
        let src = self.src;
        if tok.kind != TokenKind::Ident {
            return Ok(None);
        }
        let next = self.peek(tok.end)?;
        match tok.text(src) {
            "interface" if next.kind == TokenKind::Ident && !next.newline_before => {
                let mut pos = next.end;
                loop {
                    let t = self.peek(pos)?;
                    match t.kind {
                        TokenKind::Eof => {
                            return Err(SyntaxError::new(tok.start, "Unterminated interface"));
                        }
                        TokenKind::Punct if t.is_punct(src, "{") => {
                            return Ok(Some(self.skip_group(t)?));
                        }
                        TokenKind::Punct if t.is_punct(src, "<") => pos = self.skip_group(t)?,
                        _ => pos = t.end,
                    }
                }
            }
            "type" if next.kind == TokenKind::Ident && !next.newline_before => {
                let mut after = self.peek(next.end)?;
                if after.is_punct(src, "<") {
                    let end = self.skip_group(after)?;
                    after = self.peek(end)?;
                }
                if !after.is_punct(src, "=") {
                    return Ok(None);
                }
                let end = self.skip_type(after.end, true)?;
                Ok(Some(self.include_semicolon(end)?))
            }
            "type" if after_export && (next.is_punct(src, "{") || next.is_punct(src, "*")) => {
                Ok(Some(self.skip_module_clause(tok.end)?))
            }
            "declare"
                if !next.newline_before
                    && next.kind == TokenKind::Ident
                    && DECLARABLE.contains(&next.text(src)) =>
            {
                self.skip_declare(next).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn include_semicolon(&self, end: usize) -> ScanResult<usize> {
        let next = self.peek(end)?;
        Ok(if next.is_punct(self.src, ";") {
            next.end
        } else {
            end
        })
    }

    /// Skip the clause of a type-only import or export starting at `pos`
    /// (just after `type`), through `from "x"` and `;` when present.
    fn skip_module_clause(&self, pos: usize) -> ScanResult<usize> {
        let src = self.src;
        let first = self.peek(pos)?;
        let mut end = if first.is_punct(src, "{") {
            self.skip_group(first)?
        } else if first.is_punct(src, "*") {
            let after = self.peek(first.end)?;
            if after.is_ident(src, "as") {
                self.peek(after.end)?.end
            } else {
                first.end
            }
        } else {
            first.end
        };

        let next = self.peek(end)?;
        if next.is_ident(src, "from") {
            let specifier = self.peek(next.end)?;
            if specifier.kind != TokenKind::String {
                return Err(SyntaxError::new(specifier.start, "Expected module specifier"));
            }
            end = specifier.end;
        }
        self.include_semicolon(end)
    }

    /// Skip an ambient declaration; `keyword` is the word after `declare`.
    fn skip_declare(&self, keyword: Token) -> ScanResult<usize> {
        let block_form = matches!(
            keyword.text(self.src),
            "module" | "namespace" | "global" | "class" | "abstract" | "enum" | "interface"
        );
        self.skip_ambient(keyword, block_form)
    }

    /// End of a declaration with no runtime code, starting after `keyword`.
    /// Ends at `;`, before a closing `}`, at a line break that does not
    /// continue the type, or after the body when `block_form`.
    fn skip_ambient(&self, keyword: Token, block_form: bool) -> ScanResult<usize> {
        let src = self.src;
        let mut pos = keyword.end;
        let mut last = keyword;
        loop {
            let tok = self.peek(pos)?;
            let text = tok.text(src);
            match tok.kind {
                TokenKind::Eof => return Ok(last.end),
                TokenKind::Punct if text == ";" => return Ok(tok.end),
                TokenKind::Punct if text == "}" => return Ok(last.end),
                TokenKind::Punct if text == "{" && block_form => {
                    let end = self.skip_group(tok)?;
                    return self.include_semicolon(end);
                }
                TokenKind::Punct if matches!(text, "(" | "[" | "{" | "<") => {
                    pos = self.skip_group(tok)?;
                    last = Token { end: pos, ..tok };
                    continue;
                }
                _ => {}
            }
            let continues = matches!(
                last.text(src),
                ":" | "|" | "&" | "=" | "," | "=>" | "."
            ) || matches!(text, "|" | "&" | "." | "=>" | ":" | "=");
            if tok.newline_before && !continues && last.start != keyword.start {
                return Ok(last.end);
            }
            pos = tok.end;
            last = tok;
        }
    }

    /// At the `{` of a constructor body: emit `this.x = x;` for each
    /// parameter property, after a leading `super(...)` call when present.
    pub(super) fn assign_param_props(&mut self, r: &mut Region, open: Token) -> ScanResult<()> {
        let src = self.src;
        let text: String = self
            .param_props
            .drain(..)
            .map(|name| format!(" this.{name} = {name};"))
            .collect();
        let first = self.peek(open.end)?;
        if first.is_ident(src, "super") && self.peek(first.end)?.is_punct(src, "(") {
            r.props = Some(PendingProps {
                depth: r.stack.len(),
                text,
                after_super: true,
            });
        } else {
            r.flush(src, open.end);
            r.out.push_str(&text);
        }
        Ok(())
    }

    /// Lower `enum Name { ... }` to a frozen object.
    fn lower_enum(&mut self, r: &mut Region, tok: Token) -> ScanResult<Option<usize>> {
        let src = self.src;
        let name = self.peek(tok.end)?;
        if name.kind != TokenKind::Ident {
            return Ok(None);
        }
        let open = self.peek(name.end)?;
        if !open.is_punct(src, "{") {
            return Ok(None);
        }
        let start = match r.last {
            Some(l) if l.is_ident(src, "const") => l.start,
            _ => tok.start,
        };

        let mut entries = Vec::new();
        let mut next_value: Option<i64> = Some(0);
        let mut pos = open.end;
        let close = loop {
            let member = self.peek(pos)?;
            if member.is_punct(src, "}") {
                break member;
            }
            if !matches!(member.kind, TokenKind::Ident | TokenKind::String) {
                return Err(SyntaxError::new(member.start, "Unexpected token in enum"));
            }
            pos = member.end;

            let after = self.peek(pos)?;
            let value = if after.is_punct(src, "=") {
                let init_end = self.skip_initializer(after.end)?;
                let init = src[after.end..init_end].trim();
                next_value = init.parse::<i64>().ok().and_then(|v| v.checked_add(1));
                pos = init_end;
                init.to_string()
            } else {
                let Some(value) = next_value else {
                    return Err(SyntaxError::new(
                        member.start,
                        "Enum member must have initializer",
                    ));
                };
                next_value = value.checked_add(1);
                value.to_string()
            };
            entries.push(format!("{}: {value}", member.text(src)));

            let sep = self.peek(pos)?;
            if sep.is_punct(src, ",") {
                pos = sep.end;
            } else if !sep.is_punct(src, "}") {
                return Err(SyntaxError::new(sep.start, "Expected `,` in enum"));
            }
        };

        let end = self.include_semicolon(close.end)?;
        let body = if entries.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", entries.join(", "))
        };
        let code = format!("const {} = Object.freeze({body});", name.text(src));
        r.replace(src, start, end, &code);
        r.statement_removed();
        Ok(Some(end))
    }

    /// End of an expression that stops at `,` or a closing bracket.
    fn skip_initializer(&self, mut pos: usize) -> ScanResult<usize> {
        let src = self.src;
        let mut depth = 0usize;
        let mut end = pos;
        let mut prev: Option<Token> = None;
        loop {
            let regex_ok = super::super::lexer::regex_allowed_after(src, prev);
            let tok = self.lex.next(pos, regex_ok)?;
            let text = tok.text(src);
            match tok.kind {
                TokenKind::Eof => return Ok(end),
                TokenKind::Template => {
                    pos = self.lex.skip_template(tok.start)?;
                    end = pos;
                    prev = Some(Token {
                        kind: TokenKind::String,
                        end: pos,
                        ..tok
                    });
                    continue;
                }
                TokenKind::Punct => match text {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" if depth == 0 => return Ok(end),
                    ")" | "]" | "}" => depth -= 1,
                    "," if depth == 0 => return Ok(end),
                    _ => {}
                },
                _ => {}
            }
            pos = tok.end;
            end = tok.end;
            prev = Some(tok);
        }
    }
}
