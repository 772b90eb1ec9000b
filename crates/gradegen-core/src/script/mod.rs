//! Line-oriented view of generated test modules.
//!
//! Generated artifacts only ever take a narrow, template-shaped form:
//! a framework import, a shared `testResults` store, one `test.describe`
//! group of `test(...)` registrations, and one `test.afterAll` summary hook.
//! This module recognises those pieces line by line; it does not parse
//! JavaScript in general.
//!
//! # Modules
//!
//! - [`lexer`]: brace scanner aware of strings, templates and comments
//! - [`blocks`]: balanced extents of registrations, hooks and groups
//! - [`templates`]: canonical snippets emitted by the combiner, repair
//!   engine and placeholder generator

pub mod blocks;
pub mod lexer;
pub mod templates;

use std::sync::OnceLock;

use regex::Regex;

pub use blocks::{block_extent, find_blocks, outer_group, BlockExtent, BlockKind};
pub use lexer::{brace_counts, paren_counts, scan_lines, Delim, OpenKind, ScannedLine};

/// Name of the shared result store every scaffold writes into.
pub const RESULT_STORE: &str = "testResults";

/// Module specifier of the test framework.
pub const FRAMEWORK_MODULE: &str = "@playwright/test";

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> Option<&'static Regex> {
            static RE: OnceLock<Option<Regex>> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).ok()).as_ref()
        }
    };
}

cached_regex!(
    registration_re,
    r#"^\s*test(?:\.only|\.skip|\.fixme)?\s*\(\s*['"`]"#
);
cached_regex!(hook_re, r"^\s*test\.afterAll\s*\(");
cached_regex!(
    group_re,
    r"^\s*test\.describe(?:\.serial|\.parallel|\.only)?\s*\("
);
cached_regex!(recording_re, r"\btestResults\s*\.\s*push\s*\(");
cached_regex!(
    store_decl_re,
    r"^\s*(?:const|let|var)\s+testResults\b\s*(?::[^=]*)?="
);
cached_regex!(
    title_re,
    r#"^\s*test(?:\.only|\.skip|\.fixme)?\s*\(\s*('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|`[^`]*`)"#
);

/// `test('name', ...)` and its `.only` / `.skip` / `.fixme` variants.
pub fn is_registration_start(line: &str) -> bool {
    registration_re().is_some_and(|re| re.is_match(line))
}

/// `test.afterAll(...)`, the finalization hook.
pub fn is_hook_start(line: &str) -> bool {
    hook_re().is_some_and(|re| re.is_match(line))
}

/// `test.describe(...)`, the grouping wrapper.
pub fn is_group_start(line: &str) -> bool {
    group_re().is_some_and(|re| re.is_match(line))
}

/// A `testResults.push(...)` result-recording call.
pub fn is_recording_call(line: &str) -> bool {
    recording_re().is_some_and(|re| re.is_match(line))
}

/// A declaration of the shared result store.
pub fn is_result_store_decl(line: &str) -> bool {
    store_decl_re().is_some_and(|re| re.is_match(line))
}

/// A top-level declaration of `name` (`const NAME = ...`).
pub fn declares(line: &str, name: &str) -> bool {
    let trimmed = line.trim_start();
    ["const ", "let ", "var "].iter().any(|kw| {
        trimmed
            .strip_prefix(kw)
            .and_then(|rest| rest.trim_start().strip_prefix(name))
            .is_some_and(|rest| {
                let rest = rest.trim_start();
                rest.starts_with('=') || rest.starts_with(':')
            })
    })
}

/// Leading whitespace width, tabs counted as two columns.
pub fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum()
}

/// The title literal of a registration line, quotes included.
pub fn registration_title_literal(line: &str) -> Option<&str> {
    title_re()?
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The unescaped title of a registration line.
pub fn registration_title(line: &str) -> Option<String> {
    let literal = registration_title_literal(line)?;
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Lines of an import statement starting at `start`, or `None` when the
/// line does not begin one. Multi-line `import { a,\n b } from '...'`
/// statements are followed to their `from` clause.
pub fn import_statement_end<S: AsRef<str>>(lines: &[S], start: usize) -> Option<usize> {
    let first = lines[start].as_ref().trim_start();
    let is_require = (first.starts_with("const ") || first.starts_with("let "))
        && first.contains("require(");
    if is_require {
        return Some(start + 1);
    }
    if !first.starts_with("import ") && !first.starts_with("import{") {
        return None;
    }
    for (idx, line) in lines.iter().enumerate().skip(start) {
        let line = line.as_ref();
        let trimmed = line.trim_end();
        let side_effect = idx == start && (first.starts_with("import '") || first.starts_with("import \""));
        if side_effect
            || line.contains(" from ")
            || line.contains("}from")
            || trimmed.ends_with(';')
        {
            return Some(idx + 1);
        }
    }
    Some(lines.len())
}

/// Split text into owned lines (`\r\n` tolerant).
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Join lines with `\n` and a single trailing newline.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out
}

/// Quote `value` as a single-quoted JavaScript string literal.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}
