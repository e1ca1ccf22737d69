//! List continuation and indentation
//!
//! Enter, Tab and Shift-Tab inside lists. Nothing is remembered between key
//! presses; every decision is made from the current line text and the
//! syntax tree.

use log::warn;
use regex::Regex;
use std::sync::OnceLock;

use crate::buffer::{Change, SelectionRange, Transaction};
use crate::editing::context::EditContext;
use crate::error::Result;
use crate::markdown::{ProbeSide, SyntaxTree};
use crate::string_utils::leading_indent;

static BULLET_ITEM: OnceLock<Regex> = OnceLock::new();
static ORDERED_ITEM: OnceLock<Regex> = OnceLock::new();

fn bullet_item() -> &'static Regex {
    BULLET_ITEM.get_or_init(|| Regex::new(r"^([ \t]*)([-*+])[ \t]+").expect("valid bullet regex"))
}

fn ordered_item() -> &'static Regex {
    ORDERED_ITEM
        .get_or_init(|| Regex::new(r"^([ \t]*)(\d+)\.[ \t]+").expect("valid ordered regex"))
}

// ─────────────────────────────────────────────────────────────────────────────
// List Marker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// The marker at the start of a list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker<'a> {
    pub indent: &'a str,
    /// Bullet character or the item number
    pub marker: &'a str,
    pub kind: ListKind,
    /// Bytes taken by indent, marker and the whitespace after it
    pub len: usize,
}

impl<'a> ListMarker<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let (caps, kind) = match bullet_item().captures(line) {
            Some(caps) => (caps, ListKind::Unordered),
            None => (ordered_item().captures(line)?, ListKind::Ordered),
        };
        Some(Self {
            indent: caps.get(1)?.as_str(),
            marker: caps.get(2)?.as_str(),
            kind,
            len: caps.get(0)?.end(),
        })
    }

    /// Marker for the following item: bullets repeat, numbers increment.
    pub fn next(&self) -> Option<String> {
        match self.kind {
            ListKind::Unordered => Some(format!("{} ", self.marker)),
            ListKind::Ordered => {
                let number: u64 = self.marker.parse().ok()?;
                Some(format!("{}. ", number.checked_add(1)?))
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Enter
// ─────────────────────────────────────────────────────────────────────────────

/// Continue or end the list at the caret. `None` leaves Enter to the host.
pub(crate) fn continue_list(ctx: &EditContext) -> Result<Option<Transaction>> {
    if !ctx.selection.is_empty() {
        return Ok(None);
    }
    let head = ctx.head();
    let line = ctx.line(head.line);
    let Some(marker) = ListMarker::parse(line) else {
        return Ok(None);
    };
    if head.ch < marker.len {
        return Ok(None);
    }
    let line_start = ctx.line_start(head.line)?;

    if line[marker.len..].trim().is_empty() {
        let tx = ctx.transaction(vec![Change::delete(line_start, ctx.line_end(head.line)?)])?;
        return Ok(Some(tx.with_selection(SelectionRange::caret(line_start))));
    }

    let Some(next) = marker.next() else {
        warn!("list number {} cannot be incremented", marker.marker);
        return Ok(None);
    };
    let at = line_start + head.ch;
    let insert = format!("\n{}{}", marker.indent, next);
    let caret = at + insert.len();
    let tx = ctx.transaction(vec![Change::insert(at, insert)])?;
    Ok(Some(tx.with_selection(SelectionRange::caret(caret))))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab / Shift-Tab
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the caret sits inside a list, judged by the character before it.
pub(crate) fn in_list(tree: &dyn SyntaxTree, ctx: &EditContext) -> bool {
    tree.ancestors(ctx.text, ctx.head(), ProbeSide::Before)
        .into_iter()
        .any(|kind| kind.is_list())
}

/// Indent the covered lines inside a list, otherwise type `unit`.
pub(crate) fn tab_indent(ctx: &EditContext, in_list: bool, unit: &str) -> Result<Transaction> {
    if in_list {
        return indent_more(ctx, unit);
    }
    let (from, to) = (ctx.selection.from(), ctx.selection.to());
    let tx = ctx.transaction(vec![Change::replace(from, to, unit)])?;
    Ok(tx.with_selection(SelectionRange::caret(from + unit.len())))
}

/// Add one indent unit to the start of each covered line.
pub(crate) fn indent_more(ctx: &EditContext, unit: &str) -> Result<Transaction> {
    let (first, last) = ctx.covered_lines();
    let mut changes = Vec::new();
    for line in first..=last {
        if first != last && ctx.line(line).trim().is_empty() {
            continue;
        }
        changes.push(Change::insert(ctx.line_start(line)?, unit));
    }
    ctx.transaction(changes)
}

/// Remove up to one indent unit from the start of each covered line.
pub(crate) fn indent_less(ctx: &EditContext, tab_size: usize) -> Result<Transaction> {
    let (first, last) = ctx.covered_lines();
    let mut changes = Vec::new();
    for line in first..=last {
        let indent = leading_indent(ctx.line(line));
        let width = if indent.starts_with('\t') {
            1
        } else {
            indent.bytes().take_while(|&b| b == b' ').count().min(tab_size)
        };
        if width > 0 {
            let start = ctx.line_start(line)?;
            changes.push(Change::delete(start, start + width));
        }
    }
    ctx.transaction(changes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
