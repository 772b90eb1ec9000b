//! Balanced, line-aware extents of registration blocks, hooks and groups.

use super::lexer::{Delim, OpenKind, ScannedLine};
use super::{indent_of, is_group_start, is_hook_start, is_registration_start};

/// Which kind of construct an extent starts at. Controls which following
/// lines count as the start of a sibling (and therefore end an unclosed block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Registration,
    Hook,
    Group,
}

/// Line range `[start, end)` covered by one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockExtent {
    pub start: usize,
    pub end: usize,
    /// `true` when the block's delimiters balance out before `end`.
    pub closed: bool,
    /// Braces and parens still open at `end`, outermost first. Empty when closed.
    pub open_stack: Vec<OpenKind>,
    /// Line each `open_stack` entry was opened on.
    pub open_lines: Vec<usize>,
}

impl BlockExtent {
    pub fn lines(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Index of the block's last line.
    pub fn last_line(&self) -> usize {
        self.end.saturating_sub(1)
    }

    /// `true` when the block's function body was opened.
    pub fn has_body(&self) -> bool {
        self.closed || self.open_stack.contains(&OpenKind::Callback)
    }

    fn open(start: usize, end: usize, stack: Vec<(OpenKind, usize)>) -> Self {
        let (open_stack, open_lines) = stack.into_iter().unzip();
        Self {
            start,
            end,
            closed: false,
            open_stack,
            open_lines,
        }
    }
}

fn is_sibling_start(kind: BlockKind, line: &str) -> bool {
    match kind {
        BlockKind::Registration | BlockKind::Hook => {
            is_registration_start(line) || is_hook_start(line) || is_group_start(line)
        }
        BlockKind::Group => is_group_start(line),
    }
}

/// Compute the extent of the block starting at `start`.
///
/// A block is closed once its callback body has opened and every brace and
/// paren has been balanced. An open block ends early at a sibling start with
/// no deeper indentation, or at a closing line dedented below both the
/// block's start and every body line seen so far, since such a line belongs
/// to the enclosing scope.
pub fn block_extent<S: AsRef<str>>(
    lines: &[S],
    scanned: &[ScannedLine],
    start: usize,
    kind: BlockKind,
) -> BlockExtent {
    let base_indent = indent_of(lines[start].as_ref());
    let mut cutoff = base_indent;
    let mut stack: Vec<(OpenKind, usize)> = Vec::new();
    let mut saw_callback = false;

    for idx in start..lines.len() {
        let line = lines[idx].as_ref();
        if idx > start {
            let indent = indent_of(line);
            let sibling = indent <= base_indent && is_sibling_start(kind, line);
            let dedented_close = !stack.is_empty()
                && indent < cutoff
                && scanned[idx].code.trim_start().starts_with('}');
            if sibling || dedented_close {
                return BlockExtent::open(start, idx, stack);
            }
            if !line.trim().is_empty() {
                cutoff = cutoff.min(indent);
            }
        }

        for delim in &scanned[idx].delims {
            match delim {
                Delim::Open(open) => {
                    if *open == OpenKind::Callback {
                        saw_callback = true;
                    }
                    stack.push((*open, idx));
                }
                Delim::CloseBrace => {
                    while stack.last().is_some_and(|(k, _)| *k == OpenKind::Paren) {
                        stack.pop();
                    }
                    stack.pop();
                }
                Delim::CloseParen => {
                    if stack.last().is_some_and(|(k, _)| *k == OpenKind::Paren) {
                        stack.pop();
                    }
                }
            }
        }

        let statement_ended = scanned[idx].code.trim_end().ends_with(';');
        if stack.is_empty() && (saw_callback || statement_ended) {
            return BlockExtent {
                start,
                end: idx + 1,
                closed: true,
                open_stack: Vec::new(),
                open_lines: Vec::new(),
            };
        }
    }

    BlockExtent::open(start, lines.len(), stack)
}

/// Extents of every block of `kind` in the text, in order.
///
/// Starts nested inside an earlier extent of the same kind are skipped.
pub fn find_blocks<S: AsRef<str>>(
    lines: &[S],
    scanned: &[ScannedLine],
    kind: BlockKind,
) -> Vec<BlockExtent> {
    let is_start: fn(&str) -> bool = match kind {
        BlockKind::Registration => is_registration_start,
        BlockKind::Hook => is_hook_start,
        BlockKind::Group => is_group_start,
    };

    let mut blocks = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        if is_start(lines[idx].as_ref()) {
            let extent = block_extent(lines, scanned, idx, kind);
            idx = extent.end.max(idx + 1);
            blocks.push(extent);
        } else {
            idx += 1;
        }
    }
    blocks
}

/// The outermost grouping block: the first group start with the smallest
/// indentation.
pub fn outer_group<S: AsRef<str>>(lines: &[S], scanned: &[ScannedLine]) -> Option<BlockExtent> {
    let start = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_group_start(line.as_ref()))
        .min_by_key(|(idx, line)| (indent_of(line.as_ref()), *idx))
        .map(|(idx, _)| idx)?;
    Some(block_extent(lines, scanned, start, BlockKind::Group))
}
