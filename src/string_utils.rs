//! UTF-8 Safe String Utilities
//!
//! Buffer coordinates are byte offsets, and markdown tokens are ASCII, so
//! every scan in the editing engine works on bytes. These helpers keep the
//! resulting indices on character boundaries and provide the small token
//! searches the toggle operations share.
//!
//! # Problem
//! Characters like `ø`, `æ`, `å`, `中`, `🎉` are multi-byte in UTF-8.
//! If a caller hands us a column that falls inside one of them, slicing
//! at it would panic.
//!
//! # Solution
//! Snap indices with `floor_char_boundary()` / `ceil_char_boundary()`
//! before slicing.

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the largest index that is less than or equal to `index`
/// and is on a UTF-8 character boundary.
///
/// If `index` is greater than the string length, returns the string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Returns the smallest index that is greater than or equal to `index`
/// and is on a UTF-8 character boundary.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// The leading run of spaces and tabs of a line.
#[inline]
pub fn leading_indent(line: &str) -> &str {
    let end = line
        .bytes()
        .position(|b| b != b' ' && b != b'\t')
        .unwrap_or(line.len());
    &line[..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Token Search
// ─────────────────────────────────────────────────────────────────────────────

/// Length of the run of `byte` that contains index `at`.
fn run_length(bytes: &[u8], at: usize, byte: u8) -> usize {
    let mut start = at;
    while start > 0 && bytes[start - 1] == byte {
        start -= 1;
    }
    let mut end = at;
    while end < bytes.len() && bytes[end] == byte {
        end += 1;
    }
    end - start
}

/// Whether an occurrence of `token` at `at` may close or open a span of
/// that token.
///
/// A single-character token that sits in a run of exactly two of the same
/// character belongs to the doubled token (`*` inside `**`), so it is not a
/// match for the single token.
pub fn is_token_at(haystack: &str, at: usize, token: &str) -> bool {
    if !haystack[at..].starts_with(token) {
        return false;
    }
    let bytes = haystack.as_bytes();
    if token.len() == 1 {
        return run_length(bytes, at, token.as_bytes()[0]) != 2;
    }
    true
}

/// Find the closest occurrence of `token` that ends at or before the end of
/// `haystack`, scanning backwards.
pub fn rfind_token(haystack: &str, token: &str) -> Option<usize> {
    if token.is_empty() || token.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - token.len())
        .rev()
        .find(|&at| haystack.is_char_boundary(at) && is_token_at(haystack, at, token))
}

/// Find the closest occurrence of `token` from the start of `haystack`.
pub fn find_token(haystack: &str, token: &str) -> Option<usize> {
    if token.is_empty() || token.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - token.len())
        .find(|&at| haystack.is_char_boundary(at) && is_token_at(haystack, at, token))
}

/// Index of the first `target` byte at or after `from` that is not escaped
/// by a backslash.
pub fn find_unescaped(s: &str, target: u8, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == target => return Some(i),
            _ => i += 1,
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
