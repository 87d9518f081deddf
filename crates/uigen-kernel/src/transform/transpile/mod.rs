//! Source-to-source transpiler: TypeScript erasure and JSX lowering.
//!
//! The transpiler walks the source once, copying it through untouched except
//! for the ranges it removes (type syntax) or replaces (JSX elements, enums).
//! Everything that is not TypeScript or JSX passes through byte for byte, so
//! modern JavaScript syntax needs no support here beyond tokenizing it.
//!
//! Expression containers inside JSX and template substitutions are walked as
//! nested regions with the same rules, so JSX and types may nest freely.

mod jsx;
mod typescript;

use std::fmt;

use super::config::JsxRuntime;
use super::lexer::{
    Lexer, ScanResult, SyntaxError, TemplateStop, Token, TokenKind, is_block_keyword,
    is_operand_keyword, is_reserved, line_col,
};

/// Source dialect, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `.js` / `.mjs`; JSX is accepted.
    Js,
    Jsx,
    Ts,
    Tsx,
}

impl SourceKind {
    pub fn from_path(path: &str) -> Option<Self> {
        match crate::vfs::path::extension(path)? {
            ".js" | ".mjs" | ".cjs" => Some(Self::Js),
            ".jsx" => Some(Self::Jsx),
            ".ts" | ".mts" | ".cts" => Some(Self::Ts),
            ".tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }

    pub fn allows_jsx(self) -> bool {
        !matches!(self, Self::Ts)
    }
}

/// Transpiled module code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpiled {
    pub code: String,
    /// The source contained JSX.
    pub has_jsx: bool,
}

/// A syntax error found while transpiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileError {
    pub message: String,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
}

impl fmt::Display for TranspileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.line, self.column)
    }
}

impl std::error::Error for TranspileError {}

/// Transpile one source file into browser-executable JavaScript.
pub fn transpile(
    source: &str,
    kind: SourceKind,
    runtime: &JsxRuntime,
) -> Result<Transpiled, TranspileError> {
    let mut transpiler = Transpiler {
        src: source,
        lex: Lexer::new(source),
        ts: kind.is_typescript(),
        jsx: kind.allows_jsx(),
        runtime,
        helpers: Helpers::default(),
        param_props: Vec::new(),
    };

    let (body, _) = transpiler
        .region(0, Stop::Eof, FrameKind::Root, Prev::Start)
        .map_err(|e| {
            let (line, column) = line_col(source, e.offset);
            TranspileError {
                message: e.message,
                line,
                column,
            }
        })?;

    let has_jsx = transpiler.helpers.any;
    let code = match transpiler.runtime_import() {
        Some(import) => format!("{import}\n{body}"),
        None => body,
    };
    Ok(Transpiled { code, has_jsx })
}

/// JSX runtime helpers referenced by generated code.
#[derive(Debug, Default)]
struct Helpers {
    any: bool,
    jsx: bool,
    jsxs: bool,
    fragment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    /// The `}` closing an already-open brace.
    CloseBrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    /// Body of a JSX container or template substitution.
    Expr,
    Paren,
    Bracket,
    Block,
    Object,
    ClassBody,
    /// `{ a, b as c }` after `import` / `export`.
    ModuleClause,
}

impl FrameKind {
    fn closer(self) -> &'static str {
        match self {
            Self::Paren => ")",
            Self::Bracket => "]",
            _ => "}",
        }
    }
}

/// Where we are inside a `let`/`const`/`var` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decl {
    None,
    Binding,
    AfterBinding,
    Init,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    open: usize,
    ternary: u32,
    case_pending: bool,
    class_pending: bool,
    in_import: bool,
    decl: Decl,
}

impl Frame {
    fn new(kind: FrameKind, open: usize) -> Self {
        Self {
            kind,
            open,
            ternary: 0,
            case_pending: false,
            class_pending: false,
            in_import: false,
            decl: Decl::None,
        }
    }

    fn is_statement_list(&self) -> bool {
        matches!(self.kind, FrameKind::Root | FrameKind::Block)
    }
}

/// What the previous significant token allows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    /// Start of a statement.
    Start,
    /// A complete operand: `/` divides, `{` opens a block.
    Operand,
    /// An operator or opening bracket.
    Op,
    Arrow,
    Keyword,
}

fn classify(src: &str, tok: Token) -> Prev {
    let text = tok.text(src);
    match tok.kind {
        TokenKind::Ident if !is_reserved(text) || is_operand_keyword(text) => Prev::Operand,
        TokenKind::Ident if is_block_keyword(text) => Prev::Start,
        TokenKind::Ident => Prev::Keyword,
        TokenKind::Punct => match text {
            ")" | "]" | "++" | "--" => Prev::Operand,
            "=>" => Prev::Arrow,
            ";" => Prev::Start,
            _ => Prev::Op,
        },
        TokenKind::Eof => Prev::Start,
        _ => Prev::Operand,
    }
}

/// Parameter-property assignments waiting for the `super(...)` call that
/// opens a constructor body.
struct PendingProps {
    /// Stack depth of the constructor body.
    depth: usize,
    text: String,
    after_super: bool,
}

/// Output state of one region.
struct Region {
    out: String,
    cursor: usize,
    root: Frame,
    stack: Vec<Frame>,
    prev: Prev,
    prev_before: Prev,
    last: Option<Token>,
    props: Option<PendingProps>,
}

impl Region {
    fn new(start: usize, root: FrameKind, prev: Prev) -> Self {
        Self {
            out: String::new(),
            cursor: start,
            root: Frame::new(root, start),
            stack: Vec::new(),
            prev,
            prev_before: prev,
            last: None,
            props: None,
        }
    }

    fn frame(&self) -> &Frame {
        self.stack.last().unwrap_or(&self.root)
    }

    fn frame_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    /// The frame enclosing the current one.
    fn parent(&self) -> Option<&Frame> {
        match self.stack.len() {
            0 => None,
            1 => Some(&self.root),
            n => Some(&self.stack[n - 2]),
        }
    }

    /// Whether pending assignments wait at the current depth.
    fn props_waiting(&self, after_super: bool) -> bool {
        self.props
            .as_ref()
            .is_some_and(|p| p.after_super == after_super && p.depth == self.stack.len())
    }

    fn place_props(&mut self, src: &str, at: usize) {
        if let Some(props) = self.props.take() {
            self.flush(src, at);
            self.out.push_str(&props.text);
        }
    }

    fn expression_allowed(&self) -> bool {
        matches!(
            self.prev,
            Prev::Start | Prev::Op | Prev::Arrow | Prev::Keyword
        )
    }

    fn note(&mut self, tok: Token, prev: Prev) {
        self.prev_before = self.prev;
        self.prev = prev;
        self.last = Some(tok);
    }

    /// A whole statement was dropped or rewritten.
    fn statement_removed(&mut self) {
        self.prev_before = self.prev;
        self.prev = Prev::Start;
        self.last = None;
    }

    fn last_is(&self, src: &str, kind: TokenKind, text: &str) -> bool {
        self.last.is_some_and(|t| t.is(src, kind, text))
    }

    fn flush(&mut self, src: &str, upto: usize) {
        if upto > self.cursor {
            self.out.push_str(&src[self.cursor..upto]);
            self.cursor = upto;
        }
    }

    /// Drop `start..end` from the output.
    fn skip(&mut self, src: &str, start: usize, end: usize) {
        self.flush(src, start);
        self.cursor = self.cursor.max(end);
    }

    /// Emit `text` in place of `start..end`.
    fn replace(&mut self, src: &str, start: usize, end: usize, text: &str) {
        self.flush(src, start);
        self.out.push_str(text);
        self.cursor = self.cursor.max(end);
    }
}

struct Transpiler<'a> {
    src: &'a str,
    lex: Lexer<'a>,
    ts: bool,
    jsx: bool,
    runtime: &'a JsxRuntime,
    helpers: Helpers,
    /// Constructor parameter properties seen since the last constructor body.
    param_props: Vec<String>,
}

impl<'a> Transpiler<'a> {
    fn peek(&self, pos: usize) -> ScanResult<Token> {
        self.lex.next(pos, false)
    }

    /// Walk from `start` until `stop`; returns the region's output and the
    /// offset after the stop token.
    fn region(
        &mut self,
        start: usize,
        stop: Stop,
        root: FrameKind,
        prev: Prev,
    ) -> ScanResult<(String, usize)> {
        let src = self.src;
        let mut r = Region::new(start, root, prev);
        let mut pos = start;

        loop {
            let tok = self.lex.next(pos, r.expression_allowed())?;
            pos = match tok.kind {
                TokenKind::Eof => {
                    if let Some(open) = r.stack.last() {
                        return Err(SyntaxError::new(
                            open.open,
                            format!(
                                "Unexpected end of input; expected `{}`",
                                open.kind.closer()
                            ),
                        ));
                    }
                    if stop == Stop::CloseBrace {
                        return Err(SyntaxError::new(tok.start, "Unexpected end of input"));
                    }
                    r.flush(src, tok.start);
                    return Ok((r.out, tok.start));
                }
                TokenKind::Template => {
                    let end = self.template(&mut r, tok.start)?;
                    r.note(
                        Token {
                            kind: TokenKind::String,
                            end,
                            ..tok
                        },
                        Prev::Operand,
                    );
                    end
                }
                TokenKind::String => {
                    r.frame_mut().in_import = false;
                    r.note(tok, Prev::Operand);
                    tok.end
                }
                TokenKind::Number | TokenKind::Regex => {
                    r.note(tok, Prev::Operand);
                    tok.end
                }
                TokenKind::Ident => self.ident(&mut r, tok)?,
                TokenKind::Punct => {
                    if tok.is_punct(src, "}") && r.stack.is_empty() && stop == Stop::CloseBrace {
                        r.flush(src, tok.start);
                        return Ok((r.out, tok.end));
                    }
                    self.punct(&mut r, tok)?
                }
            };
        }
    }

    /// Copy a template literal, transforming its substitutions.
    fn template(&mut self, r: &mut Region, open: usize) -> ScanResult<usize> {
        let mut pos = open + 1;
        loop {
            match self.lex.scan_template_chunk(open, pos)? {
                TemplateStop::End(end) => return Ok(end),
                TemplateStop::Substitution(at) => {
                    let body = at + 2;
                    let (code, end) = self.region(body, Stop::CloseBrace, FrameKind::Expr, Prev::Op)?;
                    r.replace(self.src, body, end - 1, &code);
                    pos = end;
                }
            }
        }
    }

    fn at_statement_start(&self, r: &Region, tok: Token) -> bool {
        r.frame().is_statement_list()
            && (r.prev == Prev::Start || (tok.newline_before && r.prev == Prev::Operand))
    }

    fn ident(&mut self, r: &mut Region, tok: Token) -> ScanResult<usize> {
        let src = self.src;
        let text = tok.text(src);

        if self.ts {
            let statement = self.at_statement_start(r, tok);
            if let Some(end) = self.ts_statement(r, tok, statement)? {
                return Ok(end);
            }
            if let Some(end) = self.ts_ident(r, tok)? {
                return Ok(end);
            }
        }

        match text {
            "class" => r.frame_mut().class_pending = true,
            "let" | "const" | "var" => r.frame_mut().decl = Decl::Binding,
            "case" => r.frame_mut().case_pending = true,
            "default" => {
                if self.peek(tok.end)?.is_punct(src, ":") {
                    r.frame_mut().case_pending = true;
                }
            }
            "import" => {
                let next = self.peek(tok.end)?;
                if !next.is_punct(src, "(") && !next.is_punct(src, ".") {
                    r.frame_mut().in_import = true;
                }
            }
            _ => {
                let frame = r.frame_mut();
                frame.decl = match frame.decl {
                    Decl::Binding => Decl::AfterBinding,
                    Decl::AfterBinding => Decl::Init,
                    other => other,
                };
            }
        }

        r.note(tok, classify(src, tok));
        Ok(tok.end)
    }

    fn brace_kind(&self, r: &Region) -> FrameKind {
        let frame = r.frame();
        if frame.class_pending {
            return FrameKind::ClassBody;
        }
        if frame.in_import || r.last_is(self.src, TokenKind::Ident, "export") {
            return FrameKind::ModuleClause;
        }
        match r.prev {
            Prev::Start | Prev::Arrow | Prev::Operand => FrameKind::Block,
            Prev::Op | Prev::Keyword => FrameKind::Object,
        }
    }

    fn punct(&mut self, r: &mut Region, tok: Token) -> ScanResult<usize> {
        let src = self.src;
        let text = tok.text(src);
        match text {
            "(" => {
                r.stack.push(Frame::new(FrameKind::Paren, tok.start));
                r.note(tok, Prev::Op);
            }
            "[" => {
                r.stack.push(Frame::new(FrameKind::Bracket, tok.start));
                r.note(tok, Prev::Op);
            }
            "{" => {
                let kind = self.brace_kind(r);
                if kind == FrameKind::ClassBody {
                    r.frame_mut().class_pending = false;
                }
                let constructor_body = kind == FrameKind::Block
                    && r.frame().kind == FrameKind::ClassBody
                    && !self.param_props.is_empty();
                r.stack.push(Frame::new(kind, tok.start));
                let prev = match kind {
                    FrameKind::Block | FrameKind::ClassBody => Prev::Start,
                    _ => Prev::Op,
                };
                r.note(tok, prev);
                if constructor_body {
                    self.assign_param_props(r, tok)?;
                }
            }
            ")" | "]" | "}" => {
                let Some(frame) = r.stack.pop() else {
                    return Err(SyntaxError::new(
                        tok.start,
                        format!("Unexpected token `{text}`"),
                    ));
                };
                if frame.kind.closer() != text {
                    return Err(SyntaxError::new(
                        tok.start,
                        format!(
                            "Unexpected token `{text}`; expected `{}`",
                            frame.kind.closer()
                        ),
                    ));
                }
                let prev = match frame.kind {
                    FrameKind::Paren | FrameKind::Bracket | FrameKind::Object => Prev::Operand,
                    _ => Prev::Start,
                };
                let parent = r.frame_mut();
                if parent.decl == Decl::Binding {
                    parent.decl = Decl::AfterBinding;
                }
                r.note(tok, prev);
                if text == ")" && r.props_waiting(true) {
                    if self.peek(tok.end)?.is_punct(src, ";") {
                        if let Some(props) = r.props.as_mut() {
                            props.after_super = false;
                        }
                    } else {
                        r.place_props(src, tok.end);
                    }
                }
            }
            ";" => {
                let frame = r.frame_mut();
                frame.decl = Decl::None;
                frame.in_import = false;
                frame.ternary = 0;
                r.note(tok, Prev::Start);
                if r.props_waiting(false) {
                    r.place_props(src, tok.end);
                }
            }
            "," => {
                let frame = r.frame_mut();
                if matches!(frame.decl, Decl::Init | Decl::AfterBinding) {
                    frame.decl = Decl::Binding;
                }
                r.note(tok, Prev::Op);
            }
            "=" => {
                let frame = r.frame_mut();
                if matches!(frame.decl, Decl::Binding | Decl::AfterBinding) {
                    frame.decl = Decl::Init;
                }
                r.note(tok, Prev::Op);
            }
            "?" => {
                if self.ts && self.optional_marker(r, tok)? {
                    r.skip(src, tok.start, tok.end);
                } else {
                    r.frame_mut().ternary += 1;
                    r.note(tok, Prev::Op);
                }
            }
            ":" => return self.colon(r, tok),
            "!" if self.ts && r.prev == Prev::Operand && !tok.newline_before => {
                // Non-null assertion.
                r.skip(src, tok.start, tok.end);
            }
            "<" => return self.less_than(r, tok),
            _ => r.note(tok, classify(src, tok)),
        }
        Ok(tok.end)
    }

    fn colon(&mut self, r: &mut Region, tok: Token) -> ScanResult<usize> {
        let src = self.src;
        let frame = r.frame_mut();
        if frame.ternary > 0 {
            frame.ternary -= 1;
            r.note(tok, Prev::Op);
            return Ok(tok.end);
        }
        if frame.case_pending {
            frame.case_pending = false;
            r.note(tok, Prev::Start);
            return Ok(tok.end);
        }

        if self.ts {
            let frame = *r.frame();
            let after_params = r.last_is(src, TokenKind::Punct, ")");
            let annotation = after_params
                || frame.kind == FrameKind::Paren
                || frame.kind == FrameKind::ClassBody
                || frame.decl == Decl::AfterBinding;
            if annotation {
                let end = self.skip_type(tok.end, !after_params)?;
                r.skip(src, tok.start, end);
                return Ok(end);
            }
        }

        r.note(tok, Prev::Op);
        Ok(tok.end)
    }

    fn less_than(&mut self, r: &mut Region, tok: Token) -> ScanResult<usize> {
        let src = self.src;

        if r.expression_allowed() {
            if self.ts && (!self.jsx || self.is_generic_arrow(tok)?) {
                // `<T>(x: T) => x`, or a `<T>value` assertion in `.ts`.
                let end = self.skip_group(tok)?;
                r.skip(src, tok.start, end);
                return Ok(end);
            }
            if self.jsx && self.starts_jsx(tok.end)? {
                let (code, end) = self.jsx_element(tok.start)?;
                r.replace(src, tok.start, end, &code);
                r.note(
                    Token {
                        kind: TokenKind::String,
                        end,
                        ..tok
                    },
                    Prev::Operand,
                );
                return Ok(end);
            }
        } else if self.ts
            && r.prev == Prev::Operand
            && r.last.is_some_and(|t| t.kind == TokenKind::Ident)
        {
            if let Some(end) = self.type_arguments_end(tok, r.frame().class_pending)? {
                r.skip(src, tok.start, end);
                return Ok(end);
            }
        }

        r.note(tok, Prev::Op);
        Ok(tok.end)
    }

    fn starts_jsx(&self, pos: usize) -> ScanResult<bool> {
        let (pos, _) = self.lex.skip_trivia(pos)?;
        Ok(self
            .lex
            .char_at(pos)
            .is_some_and(|c| c == '>' || super::lexer::is_ident_start(c)))
    }

    /// Import line for the automatic runtime helpers used by this module.
    fn runtime_import(&self) -> Option<String> {
        let JsxRuntime::Automatic { import_source } = self.runtime else {
            return None;
        };
        let mut names = Vec::new();
        if self.helpers.jsx {
            names.push("jsx as _jsx");
        }
        if self.helpers.jsxs {
            names.push("jsxs as _jsxs");
        }
        if self.helpers.fragment {
            names.push("Fragment as _Fragment");
        }
        if names.is_empty() {
            return None;
        }
        Some(format!(
            "import {{ {} }} from \"{import_source}/jsx-runtime\";",
            names.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automatic() -> JsxRuntime {
        JsxRuntime::default()
    }

    fn js(src: &str) -> String {
        transpile(src, SourceKind::Jsx, &automatic()).unwrap().code
    }

    fn ts(src: &str) -> String {
        transpile(src, SourceKind::Ts, &automatic()).unwrap().code
    }

    fn tsx(src: &str) -> String {
        transpile(src, SourceKind::Tsx, &automatic()).unwrap().code
    }

    #[test]
    fn test_plain_js_passes_through() {
        let src = "const a = b / c; const re = /x+/g;\nexport default function f() { return `t ${a}`; }\n";
        assert_eq!(js(src), src);
    }

    #[test]
    fn test_simple_element() {
        let out = js("const a = <div className=\"box\">Hi</div>;");
        assert_eq!(
            out,
            "import { jsx as _jsx } from \"react/jsx-runtime\";\nconst a = _jsx(\"div\", { className: \"box\", children: \"Hi\" });"
        );
    }

    #[test]
    fn test_nested_and_components() {
        let out = js("export default () => <Card title={t}><Button onClick={go} />{n}</Card>;");
        assert!(out.starts_with(
            "import { jsx as _jsx, jsxs as _jsxs } from \"react/jsx-runtime\";\n"
        ));
        assert!(out.contains(
            "_jsxs(Card, { title: t, children: [_jsx(Button, { onClick: go }), n] })"
        ));
    }

    #[test]
    fn test_fragment_and_key() {
        let out = js("const l = items.map(i => <><li key={i.id}>{i.name}</li></>);");
        assert!(out.contains("_jsx(_Fragment, { children: _jsx(\"li\", { children: i.name }, i.id) })"));
        assert!(out.contains("Fragment as _Fragment"));
    }

    #[test]
    fn test_text_whitespace_cleaning() {
        let out = js("const a = <p>\n  Hello,\n  world &amp; you\n</p>;");
        assert!(out.contains("children: \"Hello, world & you\""), "{out}");
    }

    #[test]
    fn test_attribute_forms() {
        let out = js("const a = <input disabled aria-label='x' {...rest} />;");
        assert!(out.contains("_jsx(\"input\", { disabled: true, \"aria-label\": \"x\", ...rest })"));
    }

    #[test]
    fn test_jsx_inside_template_and_ternary() {
        let out = js("const a = ok ? <A /> : <B x={`${<C />}`} />;");
        assert!(out.contains("ok ? _jsx(A, {}) : _jsx(B, { x: `${_jsx(C, {})}` })"), "{out}");
    }

    #[test]
    fn test_comparison_is_not_jsx() {
        let src = "if (a < b && c > d) { x = a <b; }";
        assert_eq!(js(src), src);
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = transpile("const a = <div>\n</span>;", SourceKind::Jsx, &automatic()).unwrap_err();
        assert!(err.message.contains("<div>"), "{err}");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_unclosed_brace() {
        let err = transpile("function f() {\n  return 1;\n", SourceKind::Js, &automatic()).unwrap_err();
        assert_eq!((err.line, err.column), (1, 14));
    }

    #[test]
    fn test_classic_runtime() {
        let runtime = JsxRuntime::Classic {
            pragma: "React.createElement".into(),
            pragma_frag: "React.Fragment".into(),
        };
        let out = transpile("const a = <div id=\"x\" key=\"k\">a{b}</div>;", SourceKind::Jsx, &runtime)
            .unwrap()
            .code;
        assert_eq!(
            out,
            "const a = React.createElement(\"div\", { id: \"x\", key: \"k\" }, \"a\", b);"
        );
    }

    #[test]
    fn test_ts_annotations() {
        assert_eq!(
            ts("function add(a: number, b?: number): number { return a + (b ?? 0); }"),
            "function add(a, b) { return a + (b ?? 0); }"
        );
        assert_eq!(ts("let x: Map<string, number[]> = new Map();"), "let x = new Map();");
        assert_eq!(
            ts("const f = (e: React.ChangeEvent<HTMLInputElement>): void => set(e.target.value);"),
            "const f = (e) => set(e.target.value);"
        );
    }

    #[test]
    fn test_ts_declarations_removed() {
        let out = ts("interface Props {\n  a: string;\n}\ntype Id = string | number;\nexport type { Props };\nconst x = 1;\n");
        assert_eq!(out.trim(), "const x = 1;");
    }

    #[test]
    fn test_ts_type_imports() {
        assert_eq!(ts("import type { A } from './a';\nimport b from './b';"), "\nimport b from './b';");
        assert_eq!(ts("import { type A, b } from './a';"), "import { b } from './a';");
    }

    #[test]
    fn test_ts_expressions() {
        assert_eq!(ts("const el = ref.current!;"), "const el = ref.current;");
        assert_eq!(ts("const n = (v as unknown as number) + 1;"), "const n = (v) + 1;");
        assert_eq!(ts("const c = { a: 1 } satisfies Config;"), "const c = { a: 1 };");
        assert_eq!(ts("const [s, set] = useState<string | null>(null);"), "const [s, set] = useState(null);");
    }

    #[test]
    fn test_ts_class() {
        let out = ts("class Store<T> implements Base {\n  private items: T[] = [];\n  get(i: number): T { return this.items[i]; }\n}");
        assert_eq!(out, "class Store {\n  items = [];\n  get(i) { return this.items[i]; }\n}");
    }

    #[test]
    fn test_ts_this_parameter() {
        assert_eq!(ts("function f(this: Window, a?: number) {}"), "function f(a) {}");
        assert_eq!(ts("function g(this: Window) {}"), "function g() {}");
        assert_eq!(ts("f(this, x);"), "f(this, x);");
    }

    #[test]
    fn test_ts_ambient_members() {
        assert_eq!(
            ts("abstract class K {\n  abstract m(): void;\n  protected abstract n: string\n  x = 1;\n}"),
            "class K {\n  \n  \n  x = 1;\n}"
        );
        assert_eq!(ts("class C { declare y: string; z = 2; }"), "class C {  z = 2; }");
        assert_eq!(ts("class D { abstract m(): void }"), "class D {  }");
    }

    #[test]
    fn test_ts_parameter_properties() {
        assert_eq!(
            ts("class A { constructor(public y: string) {} }"),
            "class A { constructor(y) { this.y = y;} }"
        );
        assert_eq!(
            ts("class B extends A { constructor(private readonly z: number, w) { super(w); this.run(); } }"),
            "class B extends A { constructor(z, w) { super(w); this.z = z; this.run(); } }"
        );
        // A plain method after the constructor is untouched.
        assert_eq!(
            ts("class E { constructor(public a) {} m(b) { return b; } }"),
            "class E { constructor(a) { this.a = a;} m(b) { return b; } }"
        );
    }

    #[test]
    fn test_ts_enum() {
        assert_eq!(
            ts("export enum Color { Red, Green = 5, Blue }"),
            "export const Color = Object.freeze({ Red: 0, Green: 5, Blue: 6 });"
        );
        let err = transpile("enum E { A = 'a', B }", SourceKind::Ts, &automatic()).unwrap_err();
        assert!(err.message.contains("initializer"));
    }

    #[test]
    fn test_tsx_component() {
        let out = tsx("interface P { label: string }\nexport function B({ label }: P) {\n  return <button>{label}</button>;\n}\n");
        assert!(out.contains("export function B({ label }) {"), "{out}");
        assert!(out.contains("_jsx(\"button\", { children: label })"));
        assert!(!out.contains("interface"));
    }

    #[test]
    fn test_tsx_generic_arrow() {
        let out = tsx("const id = <T,>(x: T) => x;");
        assert_eq!(out, "const id = (x) => x;");
    }

    #[test]
    fn test_ts_ternary_in_parens_kept() {
        assert_eq!(ts("f(a ? b : c);"), "f(a ? b : c);");
        assert_eq!(ts("switch (x) { case 1: break; default: y(); }"), "switch (x) { case 1: break; default: y(); }");
    }

    #[test]
    fn test_has_jsx_flag() {
        assert!(!transpile("const a = 1;", SourceKind::Jsx, &automatic()).unwrap().has_jsx);
        assert!(transpile("const a = <b />;", SourceKind::Jsx, &automatic()).unwrap().has_jsx);
    }
}
