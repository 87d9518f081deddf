//! Import discovery and specifier rewriting in transpiled modules.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::lexer::{Lexer, ScanResult, Token, TokenKind, regex_allowed_after, string_value};

/// How a module refers to a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from "s"`, `import { a } from "s"`, `import * as n from "s"`.
    Static,
    /// `import "s"`.
    SideEffect,
    /// `export { a } from "s"`, `export * from "s"`.
    ReExport,
    /// `import("s")` with a literal argument.
    Dynamic,
    /// `require("s")`.
    Require,
}

impl ImportKind {
    /// Static imports and re-exports are linked before the module runs.
    pub fn is_static(self) -> bool {
        matches!(self, Self::Static | Self::SideEffect | Self::ReExport)
    }
}

/// One dependency reference found in module code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    pub kind: ImportKind,
    /// Byte range of the quoted specifier literal.
    pub literal: Range<usize>,
    /// Byte range of the whole statement or call, including a trailing `;`.
    pub statement: Range<usize>,
}

/// A text replacement over a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

struct Scanner<'a> {
    src: &'a str,
    lex: Lexer<'a>,
}

impl<'a> Scanner<'a> {
    fn peek(&self, pos: usize) -> ScanResult<Token> {
        self.lex.next(pos, false)
    }

    /// `; ` after a specifier, when present.
    fn statement_end(&self, after: usize) -> ScanResult<usize> {
        let tok = self.peek(after)?;
        Ok(if tok.is_punct(self.src, ";") { tok.end } else { after })
    }

    /// `from "s"` at `pos`.
    fn from_clause(&self, pos: usize) -> ScanResult<Option<Token>> {
        let tok = self.peek(pos)?;
        if !tok.is_ident(self.src, "from") {
            return Ok(None);
        }
        let lit = self.peek(tok.end)?;
        Ok((lit.kind == TokenKind::String).then_some(lit))
    }

    /// `( "s" )` at `pos`: returns the literal and the closing paren.
    fn call_argument(&self, pos: usize) -> ScanResult<Option<(Token, Token)>> {
        let open = self.peek(pos)?;
        if !open.is_punct(self.src, "(") {
            return Ok(None);
        }
        let lit = self.peek(open.end)?;
        if lit.kind != TokenKind::String {
            return Ok(None);
        }
        let close = self.peek(lit.end)?;
        Ok(close.is_punct(self.src, ")").then_some((lit, close)))
    }

    fn record(&self, kind: ImportKind, lit: Token, statement: Range<usize>) -> ImportRef {
        ImportRef {
            specifier: string_value(lit.text(self.src)),
            kind,
            literal: lit.start..lit.end,
            statement,
        }
    }

    fn import(&self, tok: Token) -> ScanResult<Option<ImportRef>> {
        let src = self.src;
        let next = self.peek(tok.end)?;

        if next.is_punct(src, "(") {
            return Ok(self
                .call_argument(tok.end)?
                .map(|(lit, close)| self.record(ImportKind::Dynamic, lit, tok.start..close.end)));
        }
        if next.kind == TokenKind::String {
            let end = self.statement_end(next.end)?;
            return Ok(Some(self.record(ImportKind::SideEffect, next, tok.start..end)));
        }
        if next.is_punct(src, ".") {
            return Ok(None);
        }

        // Bindings run up to `from "s"`; they never contain strings other
        // than the specifier, so the first `from` + string pair ends them.
        let mut pos = next.start;
        loop {
            let t = self.peek(pos)?;
            match t.kind {
                TokenKind::Eof => return Ok(None),
                TokenKind::Punct if t.is_punct(src, ";") || t.is_punct(src, "=") => {
                    return Ok(None);
                }
                _ => {}
            }
            if let Some(lit) = self.from_clause(t.start)? {
                let end = self.statement_end(lit.end)?;
                return Ok(Some(self.record(ImportKind::Static, lit, tok.start..end)));
            }
            pos = t.end;
        }
    }

    fn export(&self, tok: Token) -> ScanResult<Option<ImportRef>> {
        let src = self.src;
        let next = self.peek(tok.end)?;

        let after_clause = if next.is_punct(src, "*") {
            let t = self.peek(next.end)?;
            if t.is_ident(src, "as") {
                self.peek(t.end)?.end
            } else {
                next.end
            }
        } else if next.is_punct(src, "{") {
            let mut pos = next.end;
            loop {
                let t = self.peek(pos)?;
                if t.kind == TokenKind::Eof {
                    return Ok(None);
                }
                pos = t.end;
                if t.is_punct(src, "}") {
                    break pos;
                }
            }
        } else {
            return Ok(None);
        };

        Ok(match self.from_clause(after_clause)? {
            Some(lit) => {
                let end = self.statement_end(lit.end)?;
                Some(self.record(ImportKind::ReExport, lit, tok.start..end))
            }
            None => None,
        })
    }

    fn require(&self, tok: Token) -> ScanResult<Option<ImportRef>> {
        Ok(self
            .call_argument(tok.end)?
            .map(|(lit, close)| self.record(ImportKind::Require, lit, tok.start..close.end)))
    }
}

/// Every dependency reference in `code`, in source order.
pub(crate) fn scan_imports(code: &str) -> ScanResult<Vec<ImportRef>> {
    let scanner = Scanner {
        src: code,
        lex: Lexer::new(code),
    };
    let mut found = Vec::new();
    let mut prev: Option<Token> = None;
    let mut pos = 0;

    loop {
        let tok = scanner.lex.next(pos, regex_allowed_after(code, prev))?;
        pos = tok.end;
        match tok.kind {
            TokenKind::Eof => break,
            TokenKind::Template => {
                pos = scanner.lex.skip_template(tok.start)?;
                prev = Some(Token {
                    kind: TokenKind::String,
                    end: pos,
                    ..tok
                });
                continue;
            }
            TokenKind::Ident => {
                let member = prev.is_some_and(|p| p.is_punct(code, ".") || p.is_punct(code, "?."));
                let found_ref = match tok.text(code) {
                    _ if member => None,
                    "import" => scanner.import(tok)?,
                    "export" => scanner.export(tok)?,
                    "require" => scanner.require(tok)?,
                    _ => None,
                };
                if let Some(import) = found_ref {
                    // Resume after the specifier so nested calls keep scanning.
                    pos = import.literal.end;
                    prev = Some(Token {
                        kind: TokenKind::String,
                        start: import.literal.start,
                        end: import.literal.end,
                        newline_before: false,
                    });
                    found.push(import);
                    continue;
                }
            }
            _ => {}
        }
        prev = Some(tok);
    }
    Ok(found)
}

static SIDE_EFFECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*import\s*["']([^"'\n]+)["']"#).expect("side-effect import pattern"));
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import|export)\s+([^;'"]*?)\bfrom\s*["']([^"'\n]+)["']"#).expect("from clause pattern")
});
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:import|require)\s*\(\s*["']([^"'\n]+)["']\s*\)"#).expect("import call pattern")
});

/// Specifiers in source that may not parse, found by line-oriented patterns.
///
/// Used to keep walking the graph past a file that fails to transform.
/// Type-only imports are skipped. Results are in source order, deduplicated.
pub(crate) fn sniff_specifiers(source: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();
    for caps in SIDE_EFFECT.captures_iter(source) {
        found.push((caps.get(0).map_or(0, |m| m.start()), caps[1].to_string()));
    }
    for caps in FROM_CLAUSE.captures_iter(source) {
        let clause = caps[1].trim_start();
        let type_only = clause.strip_prefix("type").is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '*') && !rest.trim().is_empty()
        });
        if !type_only {
            found.push((caps.get(0).map_or(0, |m| m.start()), caps[2].to_string()));
        }
    }
    for caps in CALL.captures_iter(source) {
        found.push((caps.get(0).map_or(0, |m| m.start()), caps[1].to_string()));
    }
    found.sort_by_key(|(offset, _)| *offset);

    let mut out: Vec<String> = Vec::with_capacity(found.len());
    for (_, specifier) in found {
        if !out.contains(&specifier) {
            out.push(specifier);
        }
    }
    out
}

/// Apply non-overlapping edits.
pub fn apply_edits(code: &str, edits: &mut [Edit]) -> String {
    edits.sort_by_key(|e| e.range.start);
    let mut out = String::with_capacity(code.len());
    let mut cursor = 0;
    for edit in edits.iter() {
        if edit.range.start < cursor {
            continue;
        }
        out.push_str(&code[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&code[cursor..]);
    out
}

/// A JavaScript string literal for a specifier.
pub fn quote(specifier: &str) -> String {
    serde_json::Value::from(specifier).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(code: &str) -> Vec<(String, ImportKind)> {
        scan_imports(code)
            .unwrap()
            .into_iter()
            .map(|i| (i.specifier, i.kind))
            .collect()
    }

    #[test]
    fn test_static_forms() {
        let code = r#"import React, { useState as s } from "react";
import * as U from './utils';
import './styles.css';
export { Button } from "./Button";
export * as icons from "lucide-react";
export * from './all';
"#;
        assert_eq!(
            specs(code),
            vec![
                ("react".into(), ImportKind::Static),
                ("./utils".into(), ImportKind::Static),
                ("./styles.css".into(), ImportKind::SideEffect),
                ("./Button".into(), ImportKind::ReExport),
                ("lucide-react".into(), ImportKind::ReExport),
                ("./all".into(), ImportKind::ReExport),
            ]
        );
    }

    #[test]
    fn test_dynamic_and_require() {
        let code = "const m = await import('./lazy'); const x = require(\"./cjs\"); import(name);";
        assert_eq!(
            specs(code),
            vec![
                ("./lazy".into(), ImportKind::Dynamic),
                ("./cjs".into(), ImportKind::Require),
            ]
        );
    }

    #[test]
    fn test_ignores_non_imports() {
        let code = "const s = 'import x from \"y\"'; obj.import('z'); const t = `${require}`; export const a = 1; export { a };";
        assert!(specs(code).is_empty());
        assert!(specs("const r = /import \"q\"/; import.meta.url;").is_empty());
    }

    #[test]
    fn test_statement_ranges() {
        let code = "import './a.css';\nimport b from \"./b\"\nb();";
        let found = scan_imports(code).unwrap();
        assert_eq!(&code[found[0].statement.clone()], "import './a.css';");
        assert_eq!(&code[found[1].statement.clone()], "import b from \"./b\"");
        assert_eq!(&code[found[1].literal.clone()], "\"./b\"");
    }

    #[test]
    fn test_sniff_broken_source() {
        let source = r#"import React from 'react';
import type { Props } from './types';
import type from './typeDefault';
import './app.css';
export { Card } from "./Card";
const Lazy = lazy(() => import('./Lazy'));
import Again from 'react';
export default () => <div>{</div>;
"#;
        assert_eq!(
            sniff_specifiers(source),
            vec!["react", "./typeDefault", "./app.css", "./Card", "./Lazy"]
        );
        assert!(sniff_specifiers("const s = 'from \"x\"';").is_empty());
    }

    #[test]
    fn test_apply_edits() {
        let code = "import a from './a';\nimport './x.css';\n";
        let found = scan_imports(code).unwrap();
        let mut edits = vec![
            Edit::new(found[1].statement.clone(), ""),
            Edit::new(found[0].literal.clone(), quote("/a.jsx")),
        ];
        assert_eq!(apply_edits(code, &mut edits), "import a from \"/a.jsx\";\n\n");
    }
}
