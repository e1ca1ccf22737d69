//! Inline toggles: emphasis spans, links, images and insert templates.
//!
//! Removal works on the caret's line only. A construct whose markup cannot
//! be located there is treated as inactive and the toggle inserts instead.

use log::warn;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::buffer::{Change, SelectionRange, Transaction};
use crate::config::InsertTexts;
use crate::editing::commands::InlineStyle;
use crate::editing::context::EditContext;
use crate::error::Result;
use crate::string_utils::{find_token, find_unescaped, is_token_at, rfind_token};

// ─────────────────────────────────────────────────────────────────────────────
// Emphasis
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle an emphasis span around the selection.
///
/// `token` is inserted when the style is applied; any of the style's removal
/// tokens is recognised when it is stripped.
pub(crate) fn toggle_inline(
    ctx: &EditContext,
    style: InlineStyle,
    token: &str,
    active: bool,
) -> Result<Transaction> {
    if let Some(changes) = selected_pair(ctx, style) {
        return ctx.transaction(changes);
    }

    let start = ctx.start();
    let line = ctx.line(start.line);
    let line_start = ctx.line_start(start.line)?;

    if ctx.selection.is_empty() {
        if let Some(len) = empty_pair(line, start.ch, style, active) {
            let at = line_start + start.ch;
            return ctx.transaction(vec![Change::delete(at - len, at + len)]);
        }
    }

    if active {
        let end = ctx.end();
        let after_from = if end.line == start.line { end.ch } else { start.ch };
        let pair = if ctx.selection.is_empty() {
            opening_edge_pair(line, start.ch, style)
                .or_else(|| surrounding_pair(line, start.ch, after_from, style))
                .or_else(|| closing_edge_pair(line, start.ch, style))
        } else {
            surrounding_pair(line, start.ch, after_from, style)
        };
        if let Some((open, close, len)) = pair {
            return ctx.transaction(vec![
                Change::delete(line_start + open, line_start + open + len),
                Change::delete(line_start + close, line_start + close + len),
            ]);
        }
        warn!(
            "{:?} is active at line {} but its tokens were not found, inserting",
            style, start.line
        );
    }

    wrap(ctx, token, token)
}

/// A selection that itself starts and ends with the same token loses both.
fn selected_pair(ctx: &EditContext, style: InlineStyle) -> Option<Vec<Change>> {
    let (from, to) = (ctx.selection.from(), ctx.selection.to());
    let selected = ctx.text.get(from..to)?;
    style.removal_tokens().iter().find_map(|token| {
        let len = token.len();
        if selected.len() < 2 * len || !selected.starts_with(token) || !selected.ends_with(token)
        {
            return None;
        }
        let inner = &selected[len..selected.len() - len];
        if inner.contains(token) || inner.starts_with(&token[..1]) || inner.ends_with(&token[..1])
        {
            return None;
        }
        Some(vec![Change::delete(from, from + len), Change::delete(to - len, to)])
    })
}

/// Token length of an empty pair the caret sits in, e.g. `**|**`.
///
/// The runs of the token character on both sides must be equal; a run of
/// exactly two is a bold pair and never an empty italic pair. While the style
/// is inactive the pair may also sit against a neighbouring span, as in
/// `**a****|** b`, where exactly one token remains on the shorter side.
fn empty_pair(line: &str, ch: usize, style: InlineStyle, active: bool) -> Option<usize> {
    let (before, after) = line.split_at(ch);
    style.removal_tokens().iter().find_map(|token| {
        if !before.ends_with(token) || !after.starts_with(token) {
            return None;
        }
        let c = token.as_bytes()[0];
        let left = before.bytes().rev().take_while(|&b| b == c).count();
        let right = after.bytes().take_while(|&b| b == c).count();
        let balanced = left == right && !(token.len() == 1 && left == 2);
        let against_span = !active && left != right && left.min(right) == token.len();
        if !balanced && !against_span {
            return None;
        }
        Some(token.len())
    })
}

fn token_char(token: &str) -> char {
    token.chars().next().unwrap_or('*')
}

/// A token run starting at `ch` that opens a span: nothing word-like or of
/// the same character directly before it, and text directly after the run.
fn opens_at(line: &str, ch: usize, token: &str) -> bool {
    let c = token_char(token);
    is_token_at(line, ch, token)
        && line[..ch]
            .chars()
            .next_back()
            .map_or(true, |prev| prev != c && !prev.is_alphanumeric())
        && line[ch..]
            .trim_start_matches(c)
            .chars()
            .next()
            .map_or(false, |next| !next.is_whitespace())
}

/// A token run ending at `ch` that closes a span, the mirror of `opens_at`.
fn closes_at(line: &str, ch: usize, token: &str) -> bool {
    let c = token_char(token);
    line[..ch].ends_with(token)
        && is_token_at(line, ch - token.len(), token)
        && line[ch..]
            .chars()
            .next()
            .map_or(true, |next| next != c && !next.is_alphanumeric())
        && line[..ch]
            .trim_end_matches(c)
            .chars()
            .next_back()
            .map_or(false, |prev| !prev.is_whitespace())
}

/// Span whose opening token starts at the caret, e.g. `|**bold**`.
fn opening_edge_pair(line: &str, ch: usize, style: InlineStyle) -> Option<(usize, usize, usize)> {
    style.removal_tokens().iter().find_map(|token| {
        if !opens_at(line, ch, token) {
            return None;
        }
        let from = ch + token.len();
        let close = find_token(&line[from..], token)?;
        Some((ch, from + close, token.len()))
    })
}

/// Span whose closing token ends at the caret, e.g. `**bold**|`.
fn closing_edge_pair(line: &str, ch: usize, style: InlineStyle) -> Option<(usize, usize, usize)> {
    style.removal_tokens().iter().find_map(|token| {
        if !closes_at(line, ch, token) {
            return None;
        }
        let close = ch - token.len();
        let open = rfind_token(&line[..close], token)?;
        Some((open, close, token.len()))
    })
}

/// Closest opening token before `ch` and closing token at or after
/// `after_from`, as `(open, close, token_len)`.
fn surrounding_pair(
    line: &str,
    ch: usize,
    after_from: usize,
    style: InlineStyle,
) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for token in style.removal_tokens() {
        let Some(open) = rfind_token(&line[..ch], token) else {
            continue;
        };
        let Some(close) = find_token(&line[after_from..], token) else {
            continue;
        };
        if best.map_or(true, |(o, _, _)| open > o) {
            best = Some((open, after_from + close, token.len()));
        }
    }
    best
}

// ─────────────────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────────────────

/// Insert `start` before and `end` after the selection.
///
/// A caret lands after `start`; a selection keeps covering the original text.
pub(crate) fn wrap(ctx: &EditContext, start: &str, end: &str) -> Result<Transaction> {
    let (from, to) = (ctx.selection.from(), ctx.selection.to());
    if from == to {
        let tx = ctx.transaction(vec![Change::insert(from, format!("{}{}", start, end))])?;
        return Ok(tx.with_selection(SelectionRange::caret(from + start.len())));
    }
    ctx.transaction(vec![Change::insert(from, start), Change::insert(to, end)])
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "apng", "avif", "webp"];

/// Template for a freshly uploaded file: an image embed for image
/// extensions, otherwise a link named after the last path segment.
pub(crate) fn uploaded_template(url: &str, texts: &InsertTexts) -> (String, String) {
    let name = url.rsplit('/').next().unwrap_or(url);
    let extension = url
        .rsplit('.')
        .next()
        .and_then(|ext| ext.split('?').next())
        .unwrap_or("")
        .to_lowercase();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        texts.uploaded_image.with_url(url)
    } else {
        let (start, end) = texts.link.with_url(url);
        (format!("{}{}", start, name), end)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Links and Images
// ─────────────────────────────────────────────────────────────────────────────

/// Characters percent-encoded in URLs, matching a browser's `encodeURI`.
const URI_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Escape a user-supplied URL for use inside `(...)` link markup.
pub fn escape_url(url: &str) -> String {
    let encoded = utf8_percent_encode(url, URI_ESCAPE).to_string();
    let mut escaped = String::with_capacity(encoded.len());
    for c in encoded.chars() {
        if matches!(c, '\\' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Byte ranges of one `[text](url)` or `![alt](url)` on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinkSpan {
    /// Start of `[` or `![`
    start: usize,
    /// First byte of the link text
    text_start: usize,
    /// The closing `]`
    text_end: usize,
    /// One past the closing `)`
    end: usize,
}

fn is_escaped(bytes: &[u8], at: usize) -> bool {
    at > 0 && bytes[at - 1] == b'\\'
}

/// Index of the `]` closing a bracket opened before `from`.
fn closing_bracket(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(i),
            b']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn link_spans(line: &str, image: bool) -> Vec<LinkSpan> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'[' || is_escaped(bytes, i) {
            continue;
        }
        let is_image = i > 0 && bytes[i - 1] == b'!';
        if is_image != image {
            continue;
        }
        let Some(text_end) = closing_bracket(bytes, i + 1) else {
            continue;
        };
        if bytes.get(text_end + 1) != Some(&b'(') {
            continue;
        }
        let Some(paren) = find_unescaped(line, b')', text_end + 2) else {
            continue;
        };
        spans.push(LinkSpan {
            start: if image { i - 1 } else { i },
            text_start: i + 1,
            text_end,
            end: paren + 1,
        });
    }
    spans
}

/// Innermost link (or image) span on `line` containing column `ch`.
fn enclosing_link(line: &str, ch: usize, image: bool) -> Option<LinkSpan> {
    link_spans(line, image)
        .into_iter()
        .filter(|span| span.start <= ch && ch <= span.end)
        .max_by_key(|span| span.start)
}

/// Toggle a link or image at the selection.
///
/// Removal keeps the link text and drops the markup around it; insertion
/// wraps the selection in `template`.
pub(crate) fn toggle_link(
    ctx: &EditContext,
    image: bool,
    active: bool,
    template: (String, String),
) -> Result<Transaction> {
    if active {
        let start = ctx.start();
        let line = ctx.line(start.line);
        let line_start = ctx.line_start(start.line)?;
        if let Some(span) = enclosing_link(line, start.ch, image) {
            return ctx.transaction(vec![
                Change::delete(line_start + span.start, line_start + span.text_start),
                Change::delete(line_start + span.text_end, line_start + span.end),
            ]);
        }
        warn!(
            "{} is active at line {} but its markup was not found, inserting",
            if image { "image" } else { "link" },
            start.line
        );
    }
    wrap(ctx, &template.0, &template.1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
