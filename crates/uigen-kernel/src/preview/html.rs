//! HTML for preview documents and the build error surface.

use std::sync::LazyLock;

use regex::Regex;
use uigen_types::ImportMap;

use crate::transform::BundleFailure;

use super::config::PreviewConfig;

static SCRIPT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").expect("script closer pattern"));
static STYLE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(style)").expect("style closer pattern"));

/// Escape text for element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_raw(text: &str, closer: &Regex) -> String {
    closer.replace_all(text, r"<\/$1").into_owned()
}

/// Make text safe inside an inline `<script>`.
pub fn escape_script(text: &str) -> String {
    escape_raw(text, &SCRIPT_CLOSE)
}

/// Make text safe inside an inline `<style>`.
pub fn escape_style(text: &str) -> String {
    escape_raw(text, &STYLE_CLOSE)
}

/// Module that mounts the entry's default export into the root element.
pub fn bootstrap_module(entry_url: &str, root_element_id: &str) -> String {
    let entry = serde_json::Value::from(entry_url);
    let root = serde_json::Value::from(root_element_id);
    format!(
        r#"import React from "react";
import {{ createRoot }} from "react-dom/client";
import * as entry from {entry};

const App = entry.default ?? entry.App;
const container = document.getElementById({root});
if (typeof App !== "function" && typeof App !== "object") {{
  container.textContent = "The entry module has no default export to render.";
}} else {{
  createRoot(container).render(React.createElement(App));
}}
"#
    )
}

/// Pieces of a runnable preview document.
pub struct Document<'a> {
    pub import_map: &'a ImportMap,
    pub styles: &'a [String],
    pub bootstrap: &'a str,
}

fn head(title: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\" />\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out
}

pub fn render_document(config: &PreviewConfig, doc: &Document<'_>) -> String {
    let mut out = head(&config.title);
    for src in &config.scripts {
        out.push_str(&format!("<script src=\"{}\"></script>\n", escape_html(src)));
    }
    for href in &config.stylesheets {
        out.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\" />\n", escape_html(href)));
    }
    if !doc.styles.is_empty() {
        out.push_str("<style>\n");
        for style in doc.styles {
            out.push_str(&escape_style(style));
            out.push('\n');
        }
        out.push_str("</style>\n");
    }
    out.push_str("<script type=\"importmap\">\n");
    out.push_str(&escape_script(&doc.import_map.to_json()));
    out.push_str("\n</script>\n</head>\n<body>\n");
    out.push_str(&format!("<div id=\"{}\"></div>\n", escape_html(&config.root_element_id)));
    out.push_str("<script type=\"module\">\n");
    out.push_str(&escape_script(doc.bootstrap));
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

/// The page shown instead of a preview when the build was rejected.
pub fn render_error(config: &PreviewConfig, failure: &BundleFailure) -> String {
    let mut out = head("Preview error");
    for href in &config.stylesheets {
        out.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\" />\n", escape_html(href)));
    }
    out.push_str(
        "<style>\nbody { font-family: ui-monospace, monospace; margin: 2rem; color: #7f1d1d; }\n\
         li { margin: 0.75rem 0; white-space: pre-wrap; }\n.kind { font-weight: bold; }\n</style>\n",
    );
    out.push_str("</head>\n<body>\n");
    let count = failure.errors.len();
    let noun = if count == 1 { "error" } else { "errors" };
    out.push_str(&format!("<h1>Build failed: {count} {noun}</h1>\n<ul>\n"));
    for error in &failure.errors {
        out.push_str(&format!(
            "<li data-kind=\"{kind}\"><span class=\"kind\">{kind}</span> {message}</li>\n",
            kind = error.kind(),
            message = escape_html(&error.to_string()),
        ));
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}
