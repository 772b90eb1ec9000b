//! The ordered, idempotent rewrite passes of the repair engine.
//!
//! Each pass takes the current lines, scans them once, and returns new
//! lines. A pass is a no-op on input that already satisfies its invariant.
//! Later passes rely on earlier ones: hook placement and group closing
//! assume registration blocks have already been closed.

use tracing::{debug, warn};

use super::diagnostics::RepairDiagnostics;
use super::RepairOptions;
use crate::script::templates::{
    existence_check, failure_recording, finalization_hook, group_open, indent_lines,
    recording_scaffold, success_recording, DEFAULT_SUITE_TITLE, FRAMEWORK_IMPORT,
    RESULT_STORE_DECL, ROUTE_CONSTANTS,
};
use crate::script::{
    brace_counts, declares, find_blocks, import_statement_end, indent_of, is_group_start,
    is_hook_start, is_recording_call, is_registration_start, is_result_store_decl, js_string,
    outer_group, paren_counts, registration_title, registration_title_literal, scan_lines,
    BlockExtent, BlockKind, Delim, OpenKind, ScannedLine, FRAMEWORK_MODULE, RESULT_STORE,
};

/// Replace `range` of `lines` with `replacement`.
struct Edit {
    start: usize,
    end: usize,
    replacement: Vec<String>,
}

impl Edit {
    fn insert(at: usize, replacement: Vec<String>) -> Self {
        Self {
            start: at,
            end: at,
            replacement,
        }
    }

    fn remove(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            replacement: Vec::new(),
        }
    }
}

/// Apply non-overlapping edits, last position first.
fn apply_edits(mut lines: Vec<String>, mut edits: Vec<Edit>) -> Vec<String> {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));
    for edit in edits {
        lines.splice(edit.start..edit.end, edit.replacement);
    }
    lines
}

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

fn first_body_line(lines: &[String]) -> usize {
    lines
        .iter()
        .position(|l| is_registration_start(l) || is_group_start(l) || is_hook_start(l))
        .unwrap_or(lines.len())
}

/// Indices of the lines ahead of the first test construct that start at
/// brace depth 0.
fn prelude_lines(lines: &[String]) -> Vec<usize> {
    let limit = first_body_line(lines);
    let scanned = scan_lines(&lines[..limit]);
    let mut depth = 0usize;
    let mut out = Vec::new();
    for (idx, line) in scanned.iter().enumerate() {
        if depth == 0 {
            out.push(idx);
        }
        for delim in &line.delims {
            match delim {
                Delim::Open(kind) if kind.is_brace() => depth += 1,
                Delim::CloseBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }
    out
}

/// Index just past the last top-level import statement of the prelude, or 0.
fn imports_end(lines: &[String]) -> usize {
    let limit = first_body_line(lines);
    let mut end = 0;
    for idx in prelude_lines(lines) {
        if idx < end {
            continue;
        }
        if let Some(stmt_end) = import_statement_end(lines, idx) {
            end = stmt_end.min(limit);
        }
    }
    end
}

/// Insertion point at the end of a block, before any trailing blank lines.
fn end_before_blanks(lines: &[String], extent: &BlockExtent) -> usize {
    let mut at = extent.end;
    while at > extent.start + 1 && lines[at - 1].trim().is_empty() {
        at -= 1;
    }
    at
}

// ---------------------------------------------------------------------------
// framework import
// ---------------------------------------------------------------------------

/// Exactly one import of the test-framework symbols.
pub fn ensure_single_framework_import(
    lines: Vec<String>,
    diag: &mut RepairDiagnostics,
) -> Vec<String> {
    let mut statements = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        match import_statement_end(&lines, idx) {
            Some(end) => {
                if lines[idx..end].iter().any(|l| l.contains(FRAMEWORK_MODULE)) {
                    statements.push(idx..end);
                }
                idx = end.max(idx + 1);
            }
            None => idx += 1,
        }
    }

    let Some(first) = statements.first().cloned() else {
        diag.import_inserted = true;
        let mut out = Vec::with_capacity(lines.len() + 1);
        out.push(FRAMEWORK_IMPORT.to_string());
        out.extend(lines);
        return out;
    };

    let mut edits = Vec::new();
    let canonical = first.len() == 1 && lines[first.start] == FRAMEWORK_IMPORT;
    if !canonical {
        diag.imports_removed += 1;
        diag.import_inserted = true;
        edits.push(Edit {
            start: first.start,
            end: first.end,
            replacement: vec![FRAMEWORK_IMPORT.to_string()],
        });
    }
    for extra in statements.iter().skip(1) {
        diag.imports_removed += 1;
        edits.push(Edit::remove(extra.start, extra.end));
    }

    debug!(pass = "framework_import", statements = statements.len(), "framework import normalized");
    apply_edits(lines, edits)
}

// ---------------------------------------------------------------------------
// shared result store
// ---------------------------------------------------------------------------

/// Exactly one top-level `const testResults = [];`, directly after the imports.
pub fn ensure_single_result_store(
    lines: Vec<String>,
    diag: &mut RepairDiagnostics,
) -> Vec<String> {
    let decls: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| is_result_store_decl(l))
        .map(|(i, _)| i)
        .collect();

    if let [only] = decls.as_slice() {
        if lines[*only] == RESULT_STORE_DECL
            && *only >= imports_end(&lines)
            && *only < first_body_line(&lines)
        {
            return lines;
        }
    }

    let mut out = Vec::with_capacity(lines.len() + 1);
    let mut skipping_literal = false;
    for line in lines {
        if skipping_literal {
            if line.contains(']') {
                skipping_literal = false;
            }
            continue;
        }
        if is_result_store_decl(&line) {
            diag.result_stores_removed += 1;
            skipping_literal = line.contains('[') && !line.contains(']');
            continue;
        }
        out.push(line);
    }

    let at = imports_end(&out);
    out.insert(at, RESULT_STORE_DECL.to_string());
    diag.result_store_inserted = true;
    debug!(pass = "result_store", removed = diag.result_stores_removed, "result store normalized");
    out
}

// ---------------------------------------------------------------------------
// route constants
// ---------------------------------------------------------------------------

/// `COURSE_ID` and `ASSIGNMENT_ID` declared exactly once at top level.
/// Declarations inside test bodies are local shadows and left alone.
pub fn ensure_route_constants(lines: Vec<String>, diag: &mut RepairDiagnostics) -> Vec<String> {
    let mut lines = lines;
    for (name, declaration) in ROUTE_CONSTANTS {
        let found: Vec<usize> = prelude_lines(&lines)
            .into_iter()
            .filter(|&i| declares(&lines[i], name))
            .collect();

        if found.is_empty() {
            let mut at = lines
                .iter()
                .position(|l| is_result_store_decl(l))
                .map(|i| i + 1)
                .unwrap_or_else(|| imports_end(&lines));
            while at < lines.len()
                && ROUTE_CONSTANTS
                    .iter()
                    .any(|(other, _)| declares(&lines[at], other))
            {
                at += 1;
            }
            lines.insert(at, declaration.to_string());
            diag.constants_inserted += 1;
        } else if found.len() > 1 {
            let edits = found[1..]
                .iter()
                .map(|&i| Edit::remove(i, i + 1))
                .collect();
            diag.constants_removed += found.len() - 1;
            lines = apply_edits(lines, edits);
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// empty try bodies
// ---------------------------------------------------------------------------

fn is_navigation_or_trivial(line: &str) -> bool {
    let t = line.trim();
    t.is_empty()
        || t.starts_with("//")
        || t.starts_with("/*")
        || t.starts_with('*')
        || t.contains("page.goto(")
        || t.contains("waitForLoadState(")
        || t.contains("waitForURL(")
}

/// A try body that only navigates before recording gets a generic
/// existence check ahead of the recording call.
pub fn fill_empty_try_bodies(lines: Vec<String>, diag: &mut RepairDiagnostics) -> Vec<String> {
    let scanned = scan_lines(&lines);
    let mut edits = Vec::new();

    for block in find_blocks(&lines, &scanned, BlockKind::Registration) {
        let mut depth = 0usize;
        // (depth of the try body, body so far is trivial)
        let mut open_try: Option<(usize, bool)> = None;

        for idx in block.lines() {
            let line = &lines[idx];
            if let Some((try_depth, trivial)) = open_try {
                if is_recording_call(line) {
                    if trivial {
                        edits.push(Edit::insert(
                            idx,
                            indent_lines(&existence_check(), indent_of(line)),
                        ));
                        diag.bodies_filled += 1;
                    }
                    open_try = None;
                } else if !is_navigation_or_trivial(line) {
                    open_try = Some((try_depth, false));
                }
            }

            for delim in &scanned[idx].delims {
                match delim {
                    Delim::Open(kind) if kind.is_brace() => {
                        depth += 1;
                        if *kind == OpenKind::Try && open_try.is_none() {
                            open_try = Some((depth, true));
                        }
                    }
                    Delim::CloseBrace => {
                        if matches!(open_try, Some((d, _)) if d == depth) {
                            open_try = None;
                        }
                        depth = depth.saturating_sub(1);
                    }
                    _ => {}
                }
            }
        }
    }

    debug!(pass = "empty_try_bodies", filled = diag.bodies_filled, "empty try bodies checked");
    apply_edits(lines, edits)
}

// ---------------------------------------------------------------------------
// unclosed registration blocks
// ---------------------------------------------------------------------------

/// Close every registration block that stops before its delimiters balance,
/// adding a recording call first when the block never completed one. A
/// recording call cut off mid-statement is dropped and synthesized anew.
pub fn close_registration_blocks(
    lines: Vec<String>,
    options: &RepairOptions,
    diag: &mut RepairDiagnostics,
) -> Vec<String> {
    let scanned = scan_lines(&lines);
    let mut edits = Vec::new();

    for block in find_blocks(&lines, &scanned, BlockKind::Registration) {
        if block.closed {
            continue;
        }
        if !block.has_body() {
            warn!(line = block.start + 1, "dropping registration fragment without a body");
            diag.fragments_dropped += 1;
            edits.push(Edit::remove(block.start, block.end));
            continue;
        }

        let mut stack = block.open_stack.as_slice();
        let mut cut = end_before_blanks(&lines, &block);
        let partial = partial_recording(&lines, &block);
        if let Some(pos) = partial {
            warn!(
                line = block.open_lines[pos] + 1,
                "dropping truncated recording call"
            );
            diag.recordings_dropped += 1;
            stack = &block.open_stack[..pos];
            cut = block.open_lines[pos];
        }

        let header = &lines[block.start];
        let literal = registration_title_literal(header)
            .map(str::to_string)
            .unwrap_or_else(|| js_string("Unnamed test"));
        let possible = options.possible_for(&registration_title(header).unwrap_or_default());
        let needs_recording =
            partial.is_some() || !lines[block.start..cut].iter().any(|l| is_recording_call(l));

        let closing = closing_lines(
            stack,
            indent_of(header),
            Some((&literal, possible)),
            needs_recording,
            diag,
        );
        diag.blocks_closed += 1;
        edits.push(Edit {
            start: cut,
            end: end_before_blanks(&lines, &block),
            replacement: closing,
        });
    }

    debug!(pass = "registration_blocks", closed = diag.blocks_closed, "registration blocks checked");
    apply_edits(lines, edits)
}

/// Position in `open_stack` of the outermost paren left open by a recording
/// call inside the test body.
fn partial_recording(lines: &[String], block: &BlockExtent) -> Option<usize> {
    let body = block
        .open_stack
        .iter()
        .position(|k| *k == OpenKind::Callback)?;
    block
        .open_stack
        .iter()
        .zip(&block.open_lines)
        .enumerate()
        .skip(body + 1)
        .find(|(_, (kind, line))| **kind == OpenKind::Paren && is_recording_call(&lines[**line]))
        .map(|(pos, _)| pos)
}

/// Unwind an open-delimiter stack, innermost first. Parens close onto the
/// previous closer, with a `;` once the statement is complete. When
/// `recording` is given, open `try` blocks get a failure recording in their
/// synthesized `catch`, and with `needs_recording` set the first try, catch,
/// or test-body level reached also receives a recording call.
fn closing_lines(
    stack: &[OpenKind],
    base_indent: usize,
    recording: Option<(&str, f64)>,
    mut needs_recording: bool,
    diag: &mut RepairDiagnostics,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for pos in (0..stack.len()).rev() {
        let depth = stack[..pos].iter().filter(|k| k.is_brace()).count();
        let outer = base_indent + 2 * depth;
        let inner = outer + 2;
        let pending = recording.filter(|_| needs_recording);
        match stack[pos] {
            OpenKind::Paren => {
                let ends_statement = pos == 0 || stack[pos - 1].is_brace();
                let close = if ends_statement { ");" } else { ")" };
                match out.last_mut() {
                    Some(last) => last.push_str(close),
                    None => out.push(format!("{}{}", pad(outer), close)),
                }
            }
            OpenKind::Try => {
                if let Some((literal, possible)) = pending {
                    out.extend(indent_lines(&success_recording(literal, possible), inner));
                    diag.recordings_added += 1;
                    needs_recording = false;
                }
                out.push(format!("{}}} catch (error) {{", pad(outer)));
                if let Some((literal, possible)) = recording {
                    out.push(format!("{}{}", pad(inner), failure_recording(literal, possible)));
                }
                out.push(format!("{}}}", pad(outer)));
            }
            OpenKind::Catch => {
                if let Some((literal, possible)) = pending {
                    out.push(format!("{}{}", pad(inner), failure_recording(literal, possible)));
                    diag.recordings_added += 1;
                    needs_recording = false;
                }
                out.push(format!("{}}}", pad(outer)));
            }
            OpenKind::Callback if depth == 0 => {
                if let Some((literal, possible)) = pending {
                    out.extend(indent_lines(&recording_scaffold(literal, possible), inner));
                    diag.recordings_added += 1;
                    needs_recording = false;
                }
                out.push(format!("{}}}", pad(outer)));
            }
            OpenKind::Callback | OpenKind::Plain => out.push(format!("{}}}", pad(outer))),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// finalization hook
// ---------------------------------------------------------------------------

fn hook_reads_store(lines: &[String], extent: &BlockExtent) -> bool {
    lines[extent.lines()].iter().any(|l| l.contains(RESULT_STORE))
}

/// Exactly one finalization hook, inside the grouping wrapper when there is
/// one. The last hook wins; it is replaced with the canonical hook when it
/// is truncated or never reads the result store.
pub fn ensure_single_finalization_hook(
    lines: Vec<String>,
    diag: &mut RepairDiagnostics,
) -> Vec<String> {
    let scanned = scan_lines(&lines);
    let hooks = find_blocks(&lines, &scanned, BlockKind::Hook);

    let Some((keep, extra)) = hooks.split_last() else {
        return synthesize_hook(lines, &scanned, diag);
    };

    let mut edits = Vec::new();
    if !keep.closed || !hook_reads_store(&lines, keep) {
        let indent = indent_of(&lines[keep.start]);
        warn!(line = keep.start + 1, closed = keep.closed, "replacing finalization hook");
        edits.push(Edit {
            start: keep.start,
            end: end_before_blanks(&lines, keep),
            replacement: indent_lines(&finalization_hook(), indent),
        });
        diag.hook_replaced = true;
    }
    for hook in extra {
        let start = if hook.start > 0 && lines[hook.start - 1].trim().is_empty() {
            hook.start - 1
        } else {
            hook.start
        };
        edits.push(Edit::remove(start, end_before_blanks(&lines, hook)));
        diag.hooks_removed += 1;
    }

    if diag.hooks_removed > 0 {
        debug!(pass = "finalization_hook", removed = diag.hooks_removed, "duplicate hooks removed");
    }
    apply_edits(lines, edits)
}

fn synthesize_hook(
    mut lines: Vec<String>,
    scanned: &[ScannedLine],
    diag: &mut RepairDiagnostics,
) -> Vec<String> {
    diag.hook_synthesized = true;
    match outer_group(&lines, scanned) {
        Some(group) if group.closed => {
            let indent = indent_of(&lines[group.start]) + 2;
            let mut insert = vec![String::new()];
            insert.extend(indent_lines(&finalization_hook(), indent));
            let at = group.last_line();
            lines.splice(at..at, insert);
        }
        Some(group) => {
            let indent = indent_of(&lines[group.start]) + 2;
            let at = end_before_blanks(&lines, &group);
            let mut insert = vec![String::new()];
            insert.extend(indent_lines(&finalization_hook(), indent));
            lines.splice(at..at, insert);
        }
        None => {
            let indent = lines
                .iter()
                .find(|l| is_registration_start(l))
                .map(|l| indent_of(l))
                .unwrap_or(0);
            while lines.last().is_some_and(|l| l.trim().is_empty()) {
                lines.pop();
            }
            lines.push(String::new());
            lines.extend(indent_lines(&finalization_hook(), indent));
        }
    }
    debug!(pass = "finalization_hook", "finalization hook synthesized");
    lines
}

// ---------------------------------------------------------------------------
// grouping wrapper
// ---------------------------------------------------------------------------

/// Close every truncated top-level grouping wrapper, or wrap every block in
/// one when the module has none.
pub fn close_outer_group(lines: Vec<String>, diag: &mut RepairDiagnostics) -> Vec<String> {
    let scanned = scan_lines(&lines);
    let groups = find_blocks(&lines, &scanned, BlockKind::Group);

    if groups.is_empty() {
        let Some(first) = lines.iter().position(|l| is_registration_start(l)) else {
            return lines;
        };
        let mut lines = lines;
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        lines.push("});".to_string());
        lines.insert(first, group_open(DEFAULT_SUITE_TITLE));
        diag.group_wrapped = true;
        debug!(pass = "outer_group", "registration blocks wrapped in a group");
        return lines;
    }

    let mut edits = Vec::new();
    for group in groups.iter().filter(|g| !g.closed) {
        warn!(line = group.start + 1, open = group.open_stack.len(), "closing truncated group");
        let closers = closing_lines(
            &group.open_stack,
            indent_of(&lines[group.start]),
            None,
            false,
            diag,
        );
        edits.push(Edit::insert(end_before_blanks(&lines, group), closers));
        diag.group_closed = true;
    }
    apply_edits(lines, edits)
}

// ---------------------------------------------------------------------------
// brace balance
// ---------------------------------------------------------------------------

/// Record the structural brace and paren counts. Never modifies the text.
pub fn check_brace_balance(lines: &[String], diag: &mut RepairDiagnostics) {
    let (open, close) = brace_counts(lines);
    let (open_parens, close_parens) = paren_counts(lines);
    diag.open_braces = open;
    diag.close_braces = close;
    diag.open_parens = open_parens;
    diag.close_parens = close_parens;
    diag.balanced = open == close && open_parens == close_parens;
    if !diag.balanced {
        warn!(
            open,
            close, open_parens, close_parens, "repaired artifact has unbalanced delimiters"
        );
    }
}
