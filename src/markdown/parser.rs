//! Syntax classification using comrak
//!
//! This module wraps comrak's parser to answer one question: which markdown
//! constructs enclose a given position? The answer is an owned ancestor chain
//! of node kinds, innermost first, built fresh on every query.

use comrak::{
    nodes::{AstNode, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};
use serde::Serialize;

use crate::buffer::{Position, TextLines};
use crate::config::RenderingConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing and rendering.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Render soft line breaks as hard breaks
    pub hardbreaks: bool,
    /// Pass raw HTML through to the output
    pub unsafe_html: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::from(&RenderingConfig::default())
    }
}

impl From<&RenderingConfig> for MarkdownOptions {
    fn from(config: &RenderingConfig) -> Self {
        Self {
            tables: config.tables,
            strikethrough: config.strikethrough,
            autolink: config.autolink,
            tasklist: config.tasklist,
            footnotes: config.footnotes,
            hardbreaks: config.single_line_breaks,
            unsafe_html: config.allow_raw_html,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    pub(crate) fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        // Extension options
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;

        // Render options
        options.render.hardbreaks = self.hardbreaks;
        options.render.unsafe_ = self.unsafe_html;

        options
    }
}

/// Heading level (H1-H6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl HeadingLevel {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Heading for a `#` count; `None` outside 1..=6.
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1..=6 => Some(Self::from(count as u8)),
            _ => None,
        }
    }
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        match level {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            _ => HeadingLevel::H6,
        }
    }
}

/// Kind of a syntax node enclosing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Paragraph,
    /// ATX (`#`) heading
    Heading(HeadingLevel),
    /// Underlined heading; never reported as a heading construct
    SetextHeading(HeadingLevel),
    BlockQuote,
    BulletList,
    OrderedList,
    ListItem,
    FencedCode,
    IndentedCode,
    Table,
    Emphasis,
    StrongEmphasis,
    Strikethrough,
    InlineCode,
    Link,
    Image,
    Other,
}

impl NodeKind {
    pub fn is_list(self) -> bool {
        matches!(
            self,
            NodeKind::ListItem | NodeKind::BulletList | NodeKind::OrderedList
        )
    }
}

/// Which character a position is resolved against.
///
/// A position sits between two characters; `After` classifies the character
/// following it and `Before` the one preceding it. Both fall back to the
/// other side at line edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSide {
    Before,
    After,
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Tree Seam
// ─────────────────────────────────────────────────────────────────────────────

/// Classifies positions into an ancestor chain of node kinds.
pub trait SyntaxTree {
    /// Node kinds enclosing `pos`, innermost first, ending with `Document`.
    /// Leaf text nodes are not reported.
    fn ancestors(&self, text: &str, pos: Position, side: ProbeSide) -> Vec<NodeKind>;
}

/// `SyntaxTree` backed by a fresh comrak parse per query.
#[derive(Debug, Clone, Default)]
pub struct ComrakSyntax {
    options: MarkdownOptions,
}

impl ComrakSyntax {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl SyntaxTree for ComrakSyntax {
    fn ancestors(&self, text: &str, pos: Position, side: ProbeSide) -> Vec<NodeKind> {
        let lines = TextLines::new(text);
        let line = pos.line.min(lines.last_line());
        let line_len = lines.line_text(line).map(str::len).unwrap_or(0);
        let ch = pos.ch.min(line_len);

        // comrak positions are 1-based; a probe names the byte it classifies.
        let column = match side {
            ProbeSide::After if ch < line_len => ch + 1,
            ProbeSide::Before if ch > 0 => ch,
            _ if ch < line_len => ch + 1,
            _ => ch.max(1),
        };
        let probe = (line + 1, column);

        let arena = Arena::new();
        let root = parse_document(&arena, text, &self.options.to_comrak_options());

        let mut chain = vec![classify(&root.data.borrow().value)];
        collect_enclosing(root, probe, &mut chain);
        chain.reverse();
        chain
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Tree Walk
// ─────────────────────────────────────────────────────────────────────────────

/// Descend into the child containing `probe` at every level.
fn collect_enclosing<'a>(node: &'a AstNode<'a>, probe: (usize, usize), chain: &mut Vec<NodeKind>) {
    for child in node.children() {
        let ast = child.data.borrow();
        let sp = ast.sourcepos;
        let start = (sp.start.line, sp.start.column);
        let end = (sp.end.line, sp.end.column);
        let contains = if probe.0 > start.0 && probe.0 < end.0 {
            true
        } else {
            start <= probe && probe <= end
        };
        if contains {
            let kind = classify(&ast.value);
            if kind != NodeKind::Other {
                chain.push(kind);
            }
            drop(ast);
            collect_enclosing(child, probe, chain);
            return;
        }
    }
}

fn classify(value: &NodeValue) -> NodeKind {
    match value {
        NodeValue::Document => NodeKind::Document,
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) if heading.setext => {
            NodeKind::SetextHeading(HeadingLevel::from(heading.level))
        }
        NodeValue::Heading(heading) => NodeKind::Heading(HeadingLevel::from(heading.level)),
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => match list.list_type {
            ComrakListType::Bullet => NodeKind::BulletList,
            ComrakListType::Ordered => NodeKind::OrderedList,
        },
        NodeValue::Item(_) | NodeValue::TaskItem(_) => NodeKind::ListItem,
        NodeValue::CodeBlock(code) if code.fenced => NodeKind::FencedCode,
        NodeValue::CodeBlock(_) => NodeKind::IndentedCode,
        NodeValue::Table(_) => NodeKind::Table,
        NodeValue::Emph => NodeKind::Emphasis,
        NodeValue::Strong => NodeKind::StrongEmphasis,
        NodeValue::Strikethrough => NodeKind::Strikethrough,
        NodeValue::Code(_) => NodeKind::InlineCode,
        NodeValue::Link(_) => NodeKind::Link,
        NodeValue::Image(_) => NodeKind::Image,
        _ => NodeKind::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(text: &str, line: usize, ch: usize) -> Vec<NodeKind> {
        ComrakSyntax::default().ancestors(text, Position::new(line, ch), ProbeSide::After)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document() {
        assert_eq!(chain("", 0, 0), vec![NodeKind::Document]);
    }

    #[test]
    fn test_heading_levels() {
        let kinds = chain("## Title", 0, 4);
        assert_eq!(kinds.last(), Some(&NodeKind::Document));
        assert!(kinds.contains(&NodeKind::Heading(HeadingLevel::H2)));
    }

    #[test]
    fn test_setext_heading_is_distinct() {
        let kinds = chain("Title\n=====", 0, 1);
        assert!(kinds.contains(&NodeKind::SetextHeading(HeadingLevel::H1)));
        assert!(!kinds.iter().any(|k| matches!(k, NodeKind::Heading(_))));
    }

    #[test]
    fn test_blockquote() {
        let kinds = chain("> quoted", 0, 3);
        assert!(kinds.contains(&NodeKind::BlockQuote));
    }

    #[test]
    fn test_bullet_and_ordered_lists() {
        let kinds = chain("- one\n- two", 1, 3);
        assert!(kinds.contains(&NodeKind::ListItem));
        assert!(kinds.contains(&NodeKind::BulletList));

        let kinds = chain("1. one\n2. two", 1, 4);
        assert!(kinds.contains(&NodeKind::OrderedList));
    }

    #[test]
    fn test_fenced_code_inner_empty_line() {
        let kinds = chain("```\n\n```", 1, 0);
        assert!(kinds.contains(&NodeKind::FencedCode));
    }

    #[test]
    fn test_plain_paragraph() {
        let kinds = chain("just text", 0, 2);
        assert_eq!(kinds, vec![NodeKind::Paragraph, NodeKind::Document]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_strong_and_emphasis() {
        let text = "a **b *c* d** e";
        assert!(chain(text, 0, 4).contains(&NodeKind::StrongEmphasis));
        let inner = chain(text, 0, 7);
        assert!(inner.contains(&NodeKind::Emphasis));
        assert!(inner.contains(&NodeKind::StrongEmphasis));
        assert!(!chain(text, 0, 14).contains(&NodeKind::StrongEmphasis));
    }

    #[test]
    fn test_inline_code_and_link() {
        assert!(chain("use `code` here", 0, 6).contains(&NodeKind::InlineCode));
        assert!(chain("see [docs](http://x) now", 0, 6).contains(&NodeKind::Link));
        assert!(chain("an ![pic](a.png)", 0, 6).contains(&NodeKind::Image));
    }

    #[test]
    fn test_strikethrough_extension() {
        assert!(chain("a ~~gone~~ b", 0, 5).contains(&NodeKind::Strikethrough));
    }

    #[test]
    fn test_probe_side_at_line_end() {
        let syntax = ComrakSyntax::default();
        // At the end of a line both sides classify the last character.
        let kinds = syntax.ancestors("x **b**", Position::new(0, 7), ProbeSide::After);
        assert!(kinds.contains(&NodeKind::StrongEmphasis));
        // Before the first character of a line both sides classify it.
        let kinds = syntax.ancestors("- a\n- b", Position::new(1, 0), ProbeSide::Before);
        assert!(kinds.iter().any(|k| k.is_list()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Heading Level Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_level_from_count() {
        assert_eq!(HeadingLevel::from_count(3), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::from_count(0), None);
        assert_eq!(HeadingLevel::from_count(7), None);
        assert_eq!(HeadingLevel::H5.level(), 5);
    }
}
