//! Pure text helpers behind the file-edit commands.
//!
//! Line numbers shown to the model are 1-based and rendered as
//! `{n:>width}→ {line}`, with the width at least four columns.

use super::error::{Result, ToolError};

/// Count occurrences of `needle`, overlapping ones included.
///
/// `"aaa"` contains `"aa"` twice; a replacement target that overlaps itself is
/// as ambiguous as one that repeats.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut from = 0;
    while let Some(idx) = haystack[from..].find(needle) {
        count += 1;
        let start = from + idx;
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    count
}

/// Replace the single occurrence of `old` with `new`.
///
/// Returns the new content and the byte offset of the replacement.
pub fn replace_unique(content: &str, old: &str, new: &str, path: &str) -> Result<(String, usize)> {
    if old.is_empty() {
        return Err(ToolError::invalid("old_str must not be empty"));
    }
    match count_occurrences(content, old) {
        0 => Err(ToolError::NoMatch {
            path: path.to_string(),
        }),
        1 => {
            let pos = content.find(old).unwrap_or_default();
            let mut out = String::with_capacity(content.len() - old.len() + new.len());
            out.push_str(&content[..pos]);
            out.push_str(new);
            out.push_str(&content[pos + old.len()..]);
            Ok((out, pos))
        }
        count => Err(ToolError::AmbiguousMatch {
            path: path.to_string(),
            count,
        }),
    }
}

/// Insert `text` so that it starts on 1-based line `line`.
///
/// The line is clamped to `[1, line_count + 1]`. The inserted text always ends
/// up on lines of its own. Returns the new content and the line actually used.
pub fn insert_at_line(content: &str, line: i64, text: &str) -> (String, usize) {
    let pieces: Vec<&str> = content.split_inclusive('\n').collect();
    let target = line.clamp(1, pieces.len() as i64 + 1) as usize;
    let offset: usize = pieces[..target - 1].iter().map(|p| p.len()).sum();

    let mut out = String::with_capacity(content.len() + text.len() + 2);
    out.push_str(&content[..offset]);
    if offset > 0 && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(text);
    let at_eof = offset == content.len();
    if !text.ends_with('\n') && !(at_eof && offset > 0 && !content.ends_with('\n')) {
        out.push('\n');
    }
    out.push_str(&content[offset..]);
    (out, target)
}

fn number_width(last_line: usize) -> usize {
    last_line.to_string().len().max(4)
}

/// Render the whole content with 1-based line numbers.
pub fn content_with_line_numbers(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let width = number_width(lines.len());

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}→ {}", i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an inclusive 1-based line range. `-1` as the end means the last
/// line.
pub fn extract_lines(content: &str, start: i64, end: i64) -> Result<String> {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len() as i64;
    if start < 1 {
        return Err(ToolError::invalid(format!(
            "view_range start {start} is outside the file (1..={total})"
        )));
    }
    if total == 0 {
        return Ok(String::new());
    }
    let end = if end == -1 { total } else { end };

    if start > total {
        return Err(ToolError::invalid(format!(
            "view_range start {start} is outside the file (1..={total})"
        )));
    }
    if end < start {
        return Err(ToolError::invalid(format!(
            "view_range end {end} is before start {start}"
        )));
    }
    let end = end.min(total);

    let width = number_width(end as usize);
    Ok(lines[(start - 1) as usize..end as usize]
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}→ {}", start as usize + i, line, width = width))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// A few numbered lines of context around a byte range, shown after an edit.
pub fn extract_context(content: &str, pos: usize, len: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let line_of = |byte: usize| content[..byte.min(content.len())].matches('\n').count();
    let first = line_of(pos).min(lines.len() - 1);
    let last = line_of(pos + len).min(lines.len() - 1).max(first);

    let start = first.saturating_sub(2);
    let end = (last + 3).min(lines.len());
    let width = number_width(end);

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}→ {}", start + i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uigen_types::ErrorKind;

    #[test]
    fn test_count_occurrences() {
        assert_eq!(count_occurrences("abcabc", "abc"), 2);
        assert_eq!(count_occurrences("aaa", "aa"), 2);
        assert_eq!(count_occurrences("héllo héllo", "é"), 2);
        assert_eq!(count_occurrences("abc", "x"), 0);
        assert_eq!(count_occurrences("abc", ""), 0);
    }

    #[test]
    fn test_replace_unique() {
        let (out, pos) = replace_unique("let a = 1;\nlet b = 2;", "b = 2", "b = 3", "/x.js").unwrap();
        assert_eq!(out, "let a = 1;\nlet b = 3;");
        assert_eq!(pos, 15);
    }

    #[test]
    fn test_replace_failures() {
        let err = replace_unique("x x", "x", "y", "/a.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousMatch);

        let err = replace_unique("x", "z", "y", "/a.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = replace_unique("x", "", "y", "/a.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_replace_is_exact() {
        // No whitespace normalization.
        let err = replace_unique("a  b", "a b", "c", "/a.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_insert_middle() {
        let (out, line) = insert_at_line("a\nb\nc\n", 2, "x");
        assert_eq!(out, "a\nx\nb\nc\n");
        assert_eq!(line, 2);
    }

    #[test]
    fn test_insert_clamped() {
        let (out, line) = insert_at_line("a\nb\n", 99, "x");
        assert_eq!(out, "a\nb\nx\n");
        assert_eq!(line, 3);

        let (out, line) = insert_at_line("a\nb\n", -5, "x");
        assert_eq!(out, "x\na\nb\n");
        assert_eq!(line, 1);
    }

    #[test]
    fn test_insert_without_trailing_newline() {
        let (out, _) = insert_at_line("a\nb", 3, "x");
        assert_eq!(out, "a\nb\nx");
    }

    #[test]
    fn test_insert_empty() {
        let (out, line) = insert_at_line("", 1, "x");
        assert_eq!(out, "x\n");
        assert_eq!(line, 1);
    }

    #[test]
    fn test_line_numbers() {
        assert_eq!(content_with_line_numbers("a\nb"), "   1→ a\n   2→ b");
    }

    #[test]
    fn test_extract_lines() {
        let content = "one\ntwo\nthree\nfour";
        assert_eq!(extract_lines(content, 2, 3).unwrap(), "   2→ two\n   3→ three");
        assert_eq!(extract_lines(content, 4, -1).unwrap(), "   4→ four");
        assert_eq!(extract_lines(content, 3, 99).unwrap(), "   3→ three\n   4→ four");
        assert!(extract_lines(content, 0, 2).is_err());
        assert!(extract_lines(content, 5, -1).is_err());
        assert!(extract_lines(content, 3, 2).is_err());
    }

    #[test]
    fn test_extract_lines_empty_file() {
        assert_eq!(extract_lines("", 1, -1).unwrap(), "");
        assert_eq!(extract_lines("", 1, 5).unwrap(), "");
        assert!(extract_lines("", 0, -1).is_err());
    }

    #[test]
    fn test_extract_context() {
        let content = "1\n2\n3\n4\n5\n6\n7\n8";
        let pos = content.find('5').unwrap();
        let context = extract_context(content, pos, 1);
        assert_eq!(context, "   3→ 3\n   4→ 4\n   5→ 5\n   6→ 6\n   7→ 7");
    }
}
