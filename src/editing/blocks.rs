//! Line-level toggles
//!
//! Headings, quotes and list markers are edited per selected line. Every
//! edit touches only the marker at the start of a line, so the rest of the
//! line and the selection inside it are left alone. Code toggles either
//! strip inline backticks or add/remove fence lines.

use regex::Regex;
use std::sync::OnceLock;

use crate::buffer::{Change, Position, SelectionRange, Transaction};
use crate::config::UnorderedListStyle;
use crate::editing::commands::{HeadingStep, LineStyle};
use crate::editing::context::EditContext;
use crate::error::Result;
use crate::markdown::{HeadingLevel, NodeKind, ProbeSide, SyntaxTree};
use crate::string_utils::leading_indent;

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

static QUOTE_MARKER: OnceLock<Regex> = OnceLock::new();
static BULLET_MARKER: OnceLock<Regex> = OnceLock::new();
static ORDERED_MARKER: OnceLock<Regex> = OnceLock::new();
static BLOCK_MARKUP: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("valid marker pattern"))
}

/// Marker stripped when a line style is removed. Group 1 is the indentation
/// that stays.
fn marker_pattern(style: LineStyle) -> &'static Regex {
    match style {
        LineStyle::Quote => pattern(&QUOTE_MARKER, r"^([ \t]*)>[ \t]?"),
        LineStyle::UnorderedList => pattern(&BULLET_MARKER, r"^([ \t]*)[*+-](?:[ \t]+|$)"),
        LineStyle::OrderedList => pattern(&ORDERED_MARKER, r"^([ \t]*)\d+\.(?:[ \t]+|$)"),
    }
}

fn block_markup() -> &'static Regex {
    pattern(
        &BLOCK_MARKUP,
        r"^[ ]*(?:[# ]+|[*+-](?:[ ]+|$)|[> ]+|[0-9]+[.)])[ ]*",
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Headings
// ─────────────────────────────────────────────────────────────────────────────

/// Level and marker length of an ATX heading line, `(0, 0)` for none.
///
/// The marker is 1 to 6 `#` followed by a space, a tab or the end of the
/// line; the following space belongs to the marker.
fn heading_marker(line: &str) -> (usize, usize) {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return (0, 0);
    }
    match line.as_bytes().get(hashes) {
        None => (hashes, hashes),
        Some(b' ') | Some(b'\t') => (hashes, hashes + 1),
        Some(_) => (0, 0),
    }
}

/// Step every selected line one heading level.
pub(crate) fn toggle_heading_step(ctx: &EditContext, step: HeadingStep) -> Result<Transaction> {
    let (first, last) = ctx.selected_lines();
    let mut changes = Vec::with_capacity(last - first + 1);
    for line in first..=last {
        let start = ctx.line_start(line)?;
        let (level, marker) = heading_marker(ctx.line(line));
        changes.push(match (level, step) {
            (0, HeadingStep::Bigger) => Change::insert(start, "###### "),
            (0, HeadingStep::Smaller) => Change::insert(start, "# "),
            (6, HeadingStep::Smaller) | (1, HeadingStep::Bigger) => {
                Change::delete(start, start + marker)
            }
            (_, HeadingStep::Bigger) => Change::delete(start, start + 1),
            (_, HeadingStep::Smaller) => Change::insert(start, "#"),
        });
    }
    ctx.transaction(changes)
}

/// Set every selected line to `level`, or clear lines already at it.
pub(crate) fn toggle_heading(ctx: &EditContext, level: HeadingLevel) -> Result<Transaction> {
    let target = level.level() as usize;
    let marker_text = format!("{} ", "#".repeat(target));
    let (first, last) = ctx.selected_lines();
    let mut changes = Vec::with_capacity(last - first + 1);
    for line in first..=last {
        let start = ctx.line_start(line)?;
        let (current, marker) = heading_marker(ctx.line(line));
        changes.push(if current == 0 {
            Change::insert(start, marker_text.as_str())
        } else if current == target {
            Change::delete(start, start + marker)
        } else {
            Change::replace(start, start + marker, marker_text.as_str())
        });
    }
    ctx.transaction(changes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Quotes and Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Add or strip a line marker on every selected line.
pub(crate) fn toggle_line(
    ctx: &EditContext,
    style: LineStyle,
    active: bool,
    bullet: UnorderedListStyle,
) -> Result<Transaction> {
    let (first, last) = ctx.selected_lines();
    let prefix = style.prefix(bullet);
    let mut changes = Vec::new();
    for line in first..=last {
        let start = ctx.line_start(line)?;
        if !active {
            changes.push(Change::insert(start, prefix.as_str()));
            continue;
        }
        if let Some(caps) = marker_pattern(style).captures(ctx.line(line)) {
            let indent = caps.get(1).map_or(0, |m| m.end());
            let end = caps.get(0).map_or(0, |m| m.end());
            changes.push(Change::delete(start + indent, start + end));
        }
    }
    ctx.transaction(changes)
}

/// Strip heading, list and quote markers from the selected lines.
pub(crate) fn clean_block(ctx: &EditContext) -> Result<Transaction> {
    let (first, last) = ctx.selected_lines();
    let mut changes = Vec::new();
    for line in first..=last {
        if let Some(m) = block_markup().find(ctx.line(line)) {
            let start = ctx.line_start(line)?;
            changes.push(Change::delete(start, start + m.end()));
        }
    }
    ctx.transaction(changes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Code
// ─────────────────────────────────────────────────────────────────────────────

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Whether the lines directly above `first` and below `last` are fences.
fn fenced(ctx: &EditContext, first: usize, last: usize) -> bool {
    first > 0
        && last < ctx.lines.last_line()
        && is_fence(ctx.line(first - 1))
        && is_fence(ctx.line(last + 1))
}

/// Delete the fence lines around `first..=last`.
fn remove_fences(ctx: &EditContext, first: usize, last: usize) -> Result<Transaction> {
    let opening = Change::delete(ctx.line_start(first - 1)?, ctx.line_start(first)?);
    let closing_line = last + 1;
    let closing = if closing_line < ctx.lines.last_line() {
        Change::delete(ctx.line_start(closing_line)?, ctx.line_start(closing_line + 1)?)
    } else {
        Change::delete(ctx.line_end(last)?, ctx.line_end(closing_line)?)
    };
    ctx.transaction(vec![opening, closing])
}

/// Inline code spans on `line` as `(open, close, ticks)`: the byte offsets
/// of the opening and closing backtick runs and their shared length.
///
/// An opening run pairs with the next run of the same length; a run with no
/// partner is literal text.
fn code_spans(line: &str) -> Vec<(usize, usize, usize)> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let start = i;
                while i < bytes.len() && bytes[i] == b'`' {
                    i += 1;
                }
                runs.push((start, i - start));
            }
            _ => i += 1,
        }
    }

    let mut spans = Vec::new();
    let mut k = 0;
    while k < runs.len() {
        let (open, ticks) = runs[k];
        match runs[k + 1..].iter().position(|&(_, len)| len == ticks) {
            Some(offset) => {
                spans.push((open, runs[k + 1 + offset].0, ticks));
                k += offset + 2;
            }
            None => k += 1,
        }
    }
    spans
}

fn in_fenced_code(
    tree: &dyn SyntaxTree,
    ctx: &EditContext,
    pos: Position,
    side: ProbeSide,
) -> bool {
    tree.ancestors(ctx.text, pos, side)
        .contains(&NodeKind::FencedCode)
}

/// Toggle inline code or a fenced block at the selection.
///
/// Markup is only removed where `tree` places the caret inside code; fence
/// lines that merely border the caret's line belong to other blocks.
pub(crate) fn toggle_code(
    ctx: &EditContext,
    fence: &str,
    tree: &dyn SyntaxTree,
) -> Result<Transaction> {
    if ctx.selection.is_empty() {
        code_at_caret(ctx, fence, tree)
    } else {
        code_around_selection(ctx, fence, tree)
    }
}

fn code_at_caret(ctx: &EditContext, fence: &str, tree: &dyn SyntaxTree) -> Result<Transaction> {
    let head = ctx.head();
    let line = ctx.line(head.line);
    let line_start = ctx.line_start(head.line)?;
    let kinds = tree.ancestors(ctx.text, head, ProbeSide::After);

    if kinds.contains(&NodeKind::InlineCode) && !is_fence(line) {
        let span = code_spans(line)
            .into_iter()
            .find(|&(open, close, ticks)| open <= head.ch && head.ch <= close + ticks);
        if let Some((open, close, ticks)) = span {
            return ctx.transaction(vec![
                Change::delete(line_start + open, line_start + open + ticks),
                Change::delete(line_start + close, line_start + close + ticks),
            ]);
        }
    }

    if kinds.contains(&NodeKind::FencedCode) && fenced(ctx, head.line, head.line) {
        if !line.trim().is_empty() {
            return remove_fences(ctx, head.line, head.line);
        }
        // Empty block: drop it together with the newline that introduced it.
        let (from, to) = if head.line >= 2 {
            (ctx.line_end(head.line - 2)?, ctx.line_end(head.line + 1)?)
        } else if head.line + 2 <= ctx.lines.last_line() {
            (0, ctx.line_start(head.line + 2)?)
        } else {
            (0, ctx.text.len())
        };
        return ctx.transaction(vec![Change::delete(from, to)]);
    }

    let indent = leading_indent(line);
    let end = ctx.line_end(head.line)?;
    let block = format!("\n{i}{f}\n{i}\n{i}{f}", i = indent, f = fence);
    let caret = end + 1 + indent.len() + fence.len() + 1 + indent.len();
    let tx = ctx.transaction(vec![Change::insert(end, block)])?;
    Ok(tx.with_selection(SelectionRange::caret(caret)))
}

fn code_around_selection(
    ctx: &EditContext,
    fence: &str,
    tree: &dyn SyntaxTree,
) -> Result<Transaction> {
    let (first, last) = ctx.selected_lines();
    let inside = in_fenced_code(tree, ctx, ctx.start(), ProbeSide::After)
        && in_fenced_code(tree, ctx, ctx.end(), ProbeSide::Before);
    if inside && fenced(ctx, first, last) {
        return remove_fences(ctx, first, last);
    }
    let indent = leading_indent(ctx.line(first));
    ctx.transaction(vec![
        Change::insert(ctx.line_start(first)?, format!("{}{}\n", indent, fence)),
        Change::insert(ctx.line_end(last)?, format!("\n{}{}", indent, fence)),
    ])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::ComrakSyntax;

    fn run(
        text: &str,
        selection: SelectionRange,
        build: impl Fn(&EditContext) -> Result<Transaction>,
    ) -> (String, SelectionRange) {
        let ctx = EditContext::new(text, selection);
        let tx = build(&ctx).unwrap();
        ctx.outcome(&tx)
    }

    fn step(text: &str, caret: usize, step: HeadingStep) -> (String, SelectionRange) {
        run(text, SelectionRange::caret(caret), |ctx| {
            toggle_heading_step(ctx, step)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Headings
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_marker() {
        assert_eq!(heading_marker("## a"), (2, 3));
        assert_eq!(heading_marker("###"), (3, 3));
        assert_eq!(heading_marker("#tag"), (0, 0));
        assert_eq!(heading_marker("####### x"), (0, 0));
        assert_eq!(heading_marker("text"), (0, 0));
    }

    #[test]
    fn test_bigger_cycles_back_to_plain() {
        let mut text = String::from("title");
        let mut seen = Vec::new();
        for _ in 0..7 {
            text = step(&text, 0, HeadingStep::Bigger).0;
            seen.push(heading_marker(&text).0);
        }
        assert_eq!(seen, vec![6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(text, "title");
    }

    #[test]
    fn test_smaller_cycles_back_to_plain() {
        let mut text = String::from("title");
        for _ in 0..7 {
            text = step(&text, 0, HeadingStep::Smaller).0;
        }
        assert_eq!(text, "title");
    }

    #[test]
    fn test_heading_step_keeps_caret_on_text() {
        let (text, sel) = step("## abc", 4, HeadingStep::Smaller);
        assert_eq!(text, "### abc");
        assert_eq!(sel, SelectionRange::caret(5));
    }

    #[test]
    fn test_absolute_heading() {
        let set = |text: &str, level: u8| {
            run(text, SelectionRange::caret(0), |ctx| {
                toggle_heading(ctx, HeadingLevel::from(level))
            })
            .0
        };
        assert_eq!(set("abc", 2), "## abc");
        assert_eq!(set("## abc", 2), "abc");
        assert_eq!(set("# abc", 3), "### abc");
        assert_eq!(set("###### abc", 1), "# abc");
    }

    #[test]
    fn test_heading_applies_per_line() {
        let (text, _) = run("a\n# b\nc", SelectionRange::new(0, 7), |ctx| {
            toggle_heading(ctx, HeadingLevel::H1)
        });
        assert_eq!(text, "# a\nb\n# c");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Quotes and Lists
    // ─────────────────────────────────────────────────────────────────────────

    fn line(text: &str, sel: SelectionRange, style: LineStyle, active: bool) -> String {
        run(text, sel, |ctx| {
            toggle_line(ctx, style, active, UnorderedListStyle::Dash)
        })
        .0
    }

    #[test]
    fn test_quote_round_trip() {
        let quoted = line("a\nb", SelectionRange::new(0, 3), LineStyle::Quote, false);
        assert_eq!(quoted, "> a\n> b");
        let plain = line(&quoted, SelectionRange::new(0, 7), LineStyle::Quote, true);
        assert_eq!(plain, "a\nb");
    }

    #[test]
    fn test_unordered_uses_configured_bullet() {
        let text = line("item", SelectionRange::caret(0), LineStyle::UnorderedList, false);
        assert_eq!(text, "- item");
    }

    #[test]
    fn test_strip_keeps_indentation() {
        let text = line("  * x\n  + y", SelectionRange::new(0, 11), LineStyle::UnorderedList, true);
        assert_eq!(text, "  x\n  y");
        let text = line("  12. x", SelectionRange::caret(4), LineStyle::OrderedList, true);
        assert_eq!(text, "  x");
    }

    #[test]
    fn test_ordered_prefix_every_line() {
        let text = line("a\nb\nc", SelectionRange::new(0, 5), LineStyle::OrderedList, false);
        assert_eq!(text, "1. a\n1. b\n1. c");
    }

    #[test]
    fn test_unmarked_lines_produce_no_edits() {
        let ctx = EditContext::new("plain", SelectionRange::caret(0));
        let tx = toggle_line(&ctx, LineStyle::Quote, true, UnorderedListStyle::Asterisk).unwrap();
        assert!(tx.changes.is_empty());
    }

    #[test]
    fn test_clean_block() {
        let text = "# a\n- b\n> c\n3. d\n3) e\nplain\n**bold**";
        let (out, _) = run(text, SelectionRange::new(0, text.len()), clean_block);
        assert_eq!(out, "a\nb\nc\nd\ne\nplain\n**bold**");
    }

    #[test]
    fn test_clean_block_keeps_years() {
        let (out, _) = run("2024 was", SelectionRange::caret(0), clean_block);
        assert_eq!(out, "2024 was");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Code
    // ─────────────────────────────────────────────────────────────────────────

    fn code(text: &str, selection: SelectionRange) -> (String, SelectionRange) {
        let tree = ComrakSyntax::default();
        run(text, selection, |ctx| toggle_code(ctx, "```", &tree))
    }

    #[test]
    fn test_strip_inline_code() {
        let (text, sel) = code("a `code` b", SelectionRange::caret(5));
        assert_eq!(text, "a code b");
        assert_eq!(sel, SelectionRange::caret(4));
    }

    #[test]
    fn test_insert_empty_block_and_remove_it() {
        let (text, sel) = code("  line", SelectionRange::caret(6));
        assert_eq!(text, "  line\n  ```\n  \n  ```");
        assert_eq!(sel, SelectionRange::caret(15));

        let (text, sel) = code(&text, sel);
        assert_eq!(text, "  line");
        assert_eq!(sel, SelectionRange::caret(6));
    }

    #[test]
    fn test_remove_fences_around_caret_line() {
        let (text, _) = code("```\nlet x;\n```\nafter", SelectionRange::caret(6));
        assert_eq!(text, "let x;\nafter");
    }

    #[test]
    fn test_fence_round_trip() {
        let (text, sel) = code("one\ntwo", SelectionRange::new(0, 7));
        assert_eq!(text, "```\none\ntwo\n```");
        assert_eq!(&text[sel.from()..sel.to()], "one\ntwo");

        let (text, sel) = code(&text, sel);
        assert_eq!(text, "one\ntwo");
        assert_eq!(sel, SelectionRange::new(0, 7));
    }

    #[test]
    fn test_wrap_keeps_first_line_indent() {
        let (text, _) = code("x\n    a\n    b\ny", SelectionRange::new(2, 13));
        assert_eq!(text, "x\n    ```\n    a\n    b\n    ```\ny");
    }

    #[test]
    fn test_caret_between_blocks_inserts() {
        let text = "```\na\n```\nmiddle\n```\nb\n```";
        let (out, sel) = code(text, SelectionRange::caret(12));
        assert_eq!(out, "```\na\n```\nmiddle\n```\n\n```\n```\nb\n```");
        assert_eq!(sel, SelectionRange::caret(21));

        let (out, _) = code(&out, sel);
        assert_eq!(out, text);
    }

    #[test]
    fn test_selection_between_blocks_wraps() {
        let text = "```\na\n```\nmiddle\n```\nb\n```";
        let (out, _) = code(text, SelectionRange::new(10, 16));
        assert_eq!(out, "```\na\n```\n```\nmiddle\n```\n```\nb\n```");
    }

    #[test]
    fn test_caret_between_code_spans_is_not_inline_code() {
        let (out, _) = code("a `x` b `y` c", SelectionRange::caret(6));
        assert_eq!(out, "a `x` b `y` c\n```\n\n```");
    }

    #[test]
    fn test_strip_code_span_next_to_opening_ticks() {
        let (out, sel) = code("a `x` b", SelectionRange::caret(3));
        assert_eq!(out, "a x b");
        assert_eq!(sel, SelectionRange::caret(2));

        let (out, _) = code("a ``x ` y``", SelectionRange::caret(4));
        assert_eq!(out, "a x ` y");
    }

    #[test]
    fn test_code_spans_pair_equal_runs() {
        assert_eq!(code_spans("a `x` b `y`"), vec![(2, 4, 1), (8, 10, 1)]);
        assert_eq!(code_spans("``a ` b``"), vec![(0, 7, 2)]);
        assert_eq!(code_spans("` lone"), vec![]);
        assert_eq!(code_spans(r"\` no `yes`"), vec![(6, 10, 1)]);
    }

    #[test]
    fn test_fence_line_is_not_inline_code() {
        let (text, _) = code("```rust", SelectionRange::caret(2));
        assert_eq!(text, "```rust\n```\n\n```");
    }
}
