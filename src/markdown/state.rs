//! Construct state detection
//!
//! Answers "which markdown constructs are active here?" for toolbar state and
//! for the toggles deciding between apply and remove. The syntax tree is
//! consulted first; line-level regexes only fill flags the tree left unset,
//! which covers headings, quotes and lists the parser has not settled yet.

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::OnceLock;

use crate::buffer::{Position, TextLines};
use crate::markdown::parser::{HeadingLevel, NodeKind, ProbeSide, SyntaxTree};

// ─────────────────────────────────────────────────────────────────────────────
// Construct State
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown constructs active at a position. Computed fresh per query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstructState {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    /// Inline code, fenced or indented code block
    pub code: bool,
    pub link: bool,
    pub image: bool,
    pub quote: bool,
    /// Level of the enclosing ATX heading
    pub heading: Option<HeadingLevel>,
    pub ordered_list: bool,
    pub unordered_list: bool,
}

impl ConstructState {
    pub fn is_heading(&self) -> bool {
        self.heading.is_some()
    }

    /// Names of the active constructs, e.g. `["bold", "heading", "heading-2"]`.
    pub fn active_names(&self) -> Vec<String> {
        let flags = [
            ("bold", self.bold),
            ("italic", self.italic),
            ("strikethrough", self.strikethrough),
            ("code", self.code),
            ("link", self.link),
            ("image", self.image),
            ("quote", self.quote),
        ];
        let mut names: Vec<String> = flags
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name.to_string())
            .collect();
        if let Some(level) = self.heading {
            names.push("heading".to_string());
            names.push(format!("heading-{}", level.level()));
        }
        if self.ordered_list {
            names.push("ordered-list".to_string());
        }
        if self.unordered_list {
            names.push("unordered-list".to_string());
        }
        names
    }

    /// Whether the construct called `name` is active.
    pub fn is_active(&self, name: &str) -> bool {
        self.active_names().iter().any(|n| n == name)
    }
}

/// Serialized as a map of active construct names to `true`.
impl Serialize for ConstructState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.active_names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in &names {
            map.serialize_entry(name, &true)?;
        }
        map.end()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Patterns
// ─────────────────────────────────────────────────────────────────────────────

static HEADING_LINE: OnceLock<Regex> = OnceLock::new();
static QUOTE_LINE: OnceLock<Regex> = OnceLock::new();
static BULLET_LINE: OnceLock<Regex> = OnceLock::new();
static ORDERED_LINE: OnceLock<Regex> = OnceLock::new();
static ORDERED_START: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid line pattern"))
}

fn heading_line() -> &'static Regex {
    cached(&HEADING_LINE, r"^(#{1,6})\s")
}

fn quote_line() -> &'static Regex {
    cached(&QUOTE_LINE, r"^\s*>")
}

fn bullet_line() -> &'static Regex {
    cached(&BULLET_LINE, r"^\s*[-*+]\s")
}

fn ordered_line() -> &'static Regex {
    cached(&ORDERED_LINE, r"^\s*\d+\.\s")
}

fn ordered_start() -> &'static Regex {
    cached(&ORDERED_START, r"^\s*\d+\.")
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Detect the constructs active at `pos` in `text`.
pub fn detect_state(tree: &dyn SyntaxTree, text: &str, pos: Position) -> ConstructState {
    let lines = TextLines::new(text);
    let line = pos.line.min(lines.last_line());
    let line_text = lines.line_text(line).unwrap_or("");

    let mut state = ConstructState::default();

    for kind in tree.ancestors(text, pos, ProbeSide::After) {
        match kind {
            NodeKind::StrongEmphasis => state.bold = true,
            NodeKind::Emphasis => state.italic = true,
            NodeKind::Strikethrough => state.strikethrough = true,
            NodeKind::InlineCode | NodeKind::FencedCode | NodeKind::IndentedCode => {
                state.code = true
            }
            NodeKind::Link => state.link = true,
            NodeKind::Image => state.image = true,
            NodeKind::BlockQuote => state.quote = true,
            NodeKind::Heading(level) => {
                state.heading.get_or_insert(level);
            }
            // Container kinds do not say which list the line belongs to.
            NodeKind::OrderedList | NodeKind::ListItem => {
                if ordered_start().is_match(line_text) {
                    state.ordered_list = true;
                } else {
                    state.unordered_list = true;
                }
            }
            NodeKind::BulletList => state.unordered_list = true,
            _ => {}
        }
    }

    apply_line_fallbacks(&mut state, line_text);
    state
}

/// Fill line-level flags the tree did not set. Never clears a flag.
fn apply_line_fallbacks(state: &mut ConstructState, line_text: &str) {
    if state.heading.is_none() {
        if let Some(caps) = heading_line().captures(line_text) {
            state.heading = HeadingLevel::from_count(caps[1].len());
        }
    }

    if !state.quote && quote_line().is_match(line_text) {
        state.quote = true;
    }

    if !state.unordered_list && !state.ordered_list {
        if bullet_line().is_match(line_text) {
            state.unordered_list = true;
        } else if ordered_line().is_match(line_text) {
            state.ordered_list = true;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::ComrakSyntax;

    /// Tree stub returning a fixed chain.
    struct FixedTree(Vec<NodeKind>);

    impl SyntaxTree for FixedTree {
        fn ancestors(&self, _text: &str, _pos: Position, _side: ProbeSide) -> Vec<NodeKind> {
            self.0.clone()
        }
    }

    fn detect(text: &str, line: usize, ch: usize) -> ConstructState {
        detect_state(&ComrakSyntax::default(), text, Position::new(line, ch))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tree-derived state
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_detect_bold_and_italic() {
        let state = detect("a **b *c* d** e", 0, 7);
        assert!(state.bold);
        assert!(state.italic);
        assert!(!detect("a **b** c", 0, 8).bold);
    }

    #[test]
    fn test_detect_heading_level() {
        let state = detect("### Title", 0, 5);
        assert_eq!(state.heading, Some(HeadingLevel::H3));
        assert!(state.is_active("heading-3"));
        assert!(!state.is_active("heading-2"));
    }

    #[test]
    fn test_detect_code_block() {
        let state = detect("```\nlet x = 1;\n```", 1, 2);
        assert!(state.code);
    }

    #[test]
    fn test_detect_ordered_list_by_line_text() {
        let state = detect("1. one\n2. two", 1, 4);
        assert!(state.ordered_list);
        assert!(!state.unordered_list);

        let state = detect("- one\n- two", 0, 3);
        assert!(state.unordered_list);
        assert!(!state.ordered_list);
    }

    #[test]
    fn test_detect_quote_and_link() {
        assert!(detect("> quoted", 0, 4).quote);
        assert!(detect("see [x](http://y)", 0, 5).link);
    }

    #[test]
    fn test_plain_text_has_no_state() {
        assert_eq!(detect("plain words", 0, 3), ConstructState::default());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fallback ordering
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_fallback_fills_unset_flags() {
        let tree = FixedTree(vec![NodeKind::Document]);
        let state = detect_state(&tree, "## Partial", Position::new(0, 3));
        assert_eq!(state.heading, Some(HeadingLevel::H2));

        let state = detect_state(&tree, "  > q", Position::new(0, 3));
        assert!(state.quote);

        let state = detect_state(&tree, "7. item", Position::new(0, 3));
        assert!(state.ordered_list);
    }

    #[test]
    fn test_tree_wins_over_fallback() {
        // The tree says H4 even though the line reads as H2.
        let tree = FixedTree(vec![
            NodeKind::Heading(HeadingLevel::H4),
            NodeKind::Document,
        ]);
        let state = detect_state(&tree, "## Text", Position::new(0, 3));
        assert_eq!(state.heading, Some(HeadingLevel::H4));
    }

    #[test]
    fn test_tree_list_type_blocks_fallback() {
        // A continuation line inside an ordered list item reads as unordered.
        let tree = FixedTree(vec![NodeKind::ListItem, NodeKind::OrderedList]);
        let state = detect_state(&tree, "   continued", Position::new(0, 4));
        assert!(state.unordered_list);
        assert!(!state.ordered_list);
    }

    #[test]
    fn test_fallback_requires_space_after_hashes() {
        let tree = FixedTree(vec![NodeKind::Document]);
        assert!(!detect_state(&tree, "#tag", Position::new(0, 1)).is_heading());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_state_serializes_active_names() {
        let state = ConstructState {
            bold: true,
            heading: Some(HeadingLevel::H1),
            ..ConstructState::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"bold":true,"heading":true,"heading-1":true}"#);
    }
}
