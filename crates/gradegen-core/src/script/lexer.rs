//! Line-oriented brace scanner for generated JavaScript test modules.
//!
//! Not a parser: it only tracks string, template and regex literals and
//! comments well enough to report which braces and parens are code, and
//! what kind of construct each `{` opens.

/// What an opening delimiter opens, judged from the code immediately before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenKind {
    /// `try {`
    Try,
    /// `catch {` / `catch (error) {`
    Catch,
    /// Function body: `=> {` or `function (...) {`
    Callback,
    /// Any other `{` (object literals, `if`, destructuring, ...)
    Plain,
    /// `(`
    Paren,
}

impl OpenKind {
    pub fn is_brace(self) -> bool {
        self != OpenKind::Paren
    }
}

/// A code delimiter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Open(OpenKind),
    CloseBrace,
    CloseParen,
}

/// One scanned line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedLine {
    /// Brace and paren events in source order.
    pub delims: Vec<Delim>,
    /// The line with string, template, regex and comment contents removed.
    pub code: String,
}

impl ScannedLine {
    pub fn opens(&self) -> usize {
        self.delims
            .iter()
            .filter(|d| matches!(d, Delim::Open(kind) if kind.is_brace()))
            .count()
    }

    pub fn closes(&self) -> usize {
        self.delims.iter().filter(|d| **d == Delim::CloseBrace).count()
    }

    pub fn paren_opens(&self) -> usize {
        self.delims
            .iter()
            .filter(|d| **d == Delim::Open(OpenKind::Paren))
            .count()
    }

    pub fn paren_closes(&self) -> usize {
        self.delims.iter().filter(|d| **d == Delim::CloseParen).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Single,
    Double,
    Template,
    Regex,
    RegexClass,
    BlockComment,
}

/// Scan every line, carrying template-literal and block-comment state
/// across line breaks. Unterminated quotes and regex literals end at the
/// line break.
pub fn scan_lines<S: AsRef<str>>(lines: &[S]) -> Vec<ScannedLine> {
    let mut mode = Mode::Code;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let mut scanned = ScannedLine::default();
        let mut chars = line.as_ref().chars().peekable();

        while let Some(c) = chars.next() {
            match mode {
                Mode::Code => match c {
                    '\'' => {
                        mode = Mode::Single;
                        scanned.code.push_str("''");
                    }
                    '"' => {
                        mode = Mode::Double;
                        scanned.code.push_str("\"\"");
                    }
                    '`' => {
                        mode = Mode::Template;
                        scanned.code.push_str("``");
                    }
                    '/' if chars.peek() == Some(&'/') => break,
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        mode = Mode::BlockComment;
                    }
                    '/' if regex_allowed(&scanned.code) => {
                        mode = Mode::Regex;
                        scanned.code.push_str("/ /");
                    }
                    '{' => {
                        let kind = opener_kind(&scanned.code);
                        scanned.delims.push(Delim::Open(kind));
                        scanned.code.push('{');
                    }
                    '}' => {
                        scanned.delims.push(Delim::CloseBrace);
                        scanned.code.push('}');
                    }
                    '(' => {
                        scanned.delims.push(Delim::Open(OpenKind::Paren));
                        scanned.code.push('(');
                    }
                    ')' => {
                        scanned.delims.push(Delim::CloseParen);
                        scanned.code.push(')');
                    }
                    other => scanned.code.push(other),
                },
                Mode::Single | Mode::Double => match c {
                    '\\' => {
                        chars.next();
                    }
                    '\'' if mode == Mode::Single => mode = Mode::Code,
                    '"' if mode == Mode::Double => mode = Mode::Code,
                    _ => {}
                },
                Mode::Template => match c {
                    '\\' => {
                        chars.next();
                    }
                    '`' => mode = Mode::Code,
                    _ => {}
                },
                Mode::Regex => match c {
                    '\\' => {
                        chars.next();
                    }
                    '[' => mode = Mode::RegexClass,
                    '/' => mode = Mode::Code,
                    _ => {}
                },
                Mode::RegexClass => match c {
                    '\\' => {
                        chars.next();
                    }
                    ']' => mode = Mode::Regex,
                    _ => {}
                },
                Mode::BlockComment => {
                    if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        mode = Mode::Code;
                    }
                }
            }
        }

        if matches!(
            mode,
            Mode::Single | Mode::Double | Mode::Regex | Mode::RegexClass
        ) {
            mode = Mode::Code;
        }
        out.push(scanned);
    }

    out
}

/// A `/` starts a regex literal when it sits where an expression may begin.
fn regex_allowed(code_before: &str) -> bool {
    let p = code_before.trim_end();
    match p.chars().next_back() {
        None => true,
        Some(c) if "(,=:[!&|?{};+-*%<>~^".contains(c) => true,
        Some(_) => ["return", "typeof", "case", "void", "in", "of"]
            .iter()
            .any(|kw| ends_with_word(p, kw)),
    }
}

/// Count code braces over a whole text: `(opens, closes)`.
pub fn brace_counts<S: AsRef<str>>(lines: &[S]) -> (usize, usize) {
    scan_lines(lines)
        .iter()
        .fold((0, 0), |(o, c), line| (o + line.opens(), c + line.closes()))
}

/// Count code parens over a whole text: `(opens, closes)`.
pub fn paren_counts<S: AsRef<str>>(lines: &[S]) -> (usize, usize) {
    scan_lines(lines).iter().fold((0, 0), |(o, c), line| {
        (o + line.paren_opens(), c + line.paren_closes())
    })
}

fn opener_kind(prefix: &str) -> OpenKind {
    let p = prefix.trim_end();
    if ends_with_word(p, "try") {
        return OpenKind::Try;
    }
    if p.ends_with("=>") {
        return OpenKind::Callback;
    }
    if ends_with_word(p, "catch") {
        return OpenKind::Catch;
    }
    if let Some(before) = before_trailing_parens(p) {
        if ends_with_word(before, "catch") {
            return OpenKind::Catch;
        }
        let without_name = before.trim_end_matches(is_ident_char).trim_end();
        if ends_with_word(without_name, "function") || ends_with_word(before, "function") {
            return OpenKind::Callback;
        }
    }
    OpenKind::Plain
}

/// For text ending in `)`, the trimmed text before the matching `(`.
fn before_trailing_parens(p: &str) -> Option<&str> {
    if !p.ends_with(')') {
        return None;
    }
    let mut depth = 0usize;
    for (idx, c) in p.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(p[..idx].trim_end());
                }
            }
            _ => {}
        }
    }
    None
}

fn ends_with_word(text: &str, word: &str) -> bool {
    match text.strip_suffix(word) {
        Some(rest) => !rest.chars().next_back().is_some_and(is_ident_char),
        None => false,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
