//! Editor settings and markdown conventions
//!
//! This module defines the `EditorSettings` struct that holds every
//! user-configurable convention the editing commands follow (tokens, list
//! markers, insert templates, indentation) plus the rendering options, with
//! serde support for JSON persistence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Token Pairs
// ─────────────────────────────────────────────────────────────────────────────

/// A `[start, end]` markup pair, serialized as a two-element JSON array.
///
/// Templates may contain the `#url#` placeholder, which is replaced with the
/// literal URL when the pair is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair(pub String, pub String);

impl TokenPair {
    /// Placeholder substituted with a URL on insertion.
    pub const URL_PLACEHOLDER: &'static str = "#url#";

    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self(start.into(), end.into())
    }

    pub fn start(&self) -> &str {
        &self.0
    }

    pub fn end(&self) -> &str {
        &self.1
    }

    /// Both halves with `#url#` replaced by `url`.
    pub fn with_url(&self, url: &str) -> (String, String) {
        (
            self.0.replace(Self::URL_PLACEHOLDER, url),
            self.1.replace(Self::URL_PLACEHOLDER, url),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unordered List Style
// ─────────────────────────────────────────────────────────────────────────────

/// Bullet character used when creating unordered list items.
///
/// Deserializes from any string; values other than `*`, `-` and `+` fall
/// back to `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnorderedListStyle {
    #[default]
    Asterisk,
    Dash,
    Plus,
}

impl UnorderedListStyle {
    pub fn marker(&self) -> char {
        match self {
            UnorderedListStyle::Asterisk => '*',
            UnorderedListStyle::Dash => '-',
            UnorderedListStyle::Plus => '+',
        }
    }

    /// Line prefix for a new list item, e.g. `"* "`.
    pub fn prefix(&self) -> String {
        format!("{} ", self.marker())
    }
}

impl From<String> for UnorderedListStyle {
    fn from(value: String) -> Self {
        match value.trim() {
            "-" => UnorderedListStyle::Dash,
            "+" => UnorderedListStyle::Plus,
            _ => UnorderedListStyle::Asterisk,
        }
    }
}

impl From<UnorderedListStyle> for String {
    fn from(style: UnorderedListStyle) -> Self {
        style.marker().to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Styles
// ─────────────────────────────────────────────────────────────────────────────

/// Tokens used when inserting inline emphasis and code fences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStyles {
    /// `**` or `__`
    pub bold: String,
    /// `*` or `_`
    pub italic: String,
    /// Fence used for code blocks
    pub code: String,
}

impl Default for BlockStyles {
    fn default() -> Self {
        Self {
            bold: String::from("**"),
            italic: String::from("*"),
            code: String::from("```"),
        }
    }
}

impl BlockStyles {
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.bold != "**" && self.bold != "__" {
            self.bold = defaults.bold;
        }
        if self.italic != "*" && self.italic != "_" {
            self.italic = defaults.italic;
        }
        let fence_char = self.code.chars().next().unwrap_or('`');
        let valid_fence = self.code.len() >= 3
            && (fence_char == '`' || fence_char == '~')
            && self.code.chars().all(|c| c == fence_char);
        if !valid_fence {
            self.code = defaults.code;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Insert Templates
// ─────────────────────────────────────────────────────────────────────────────

/// Templates inserted around the selection by the draw commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertTexts {
    pub link: TokenPair,
    pub image: TokenPair,
    pub uploaded_image: TokenPair,
    pub table: TokenPair,
    pub horizontal_rule: TokenPair,
}

impl Default for InsertTexts {
    fn default() -> Self {
        Self {
            link: TokenPair::new("[", "](#url#)"),
            image: TokenPair::new("![", "](#url#)"),
            uploaded_image: TokenPair::new("![](#url#)", ""),
            table: TokenPair::new(
                "",
                "\n\n| Column 1 | Column 2 | Column 3 |\n| -------- | -------- | -------- |\n| Text     | Text     | Text     |\n\n",
            ),
            horizontal_rule: TokenPair::new("", "\n\n-----\n\n"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering Options
// ─────────────────────────────────────────────────────────────────────────────

/// Options for the preview renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Render single newlines as `<br>`
    pub single_line_breaks: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub autolink: bool,
    pub tasklist: bool,
    pub footnotes: bool,
    /// Open external links in a new window
    pub link_target_blank: bool,
    /// Pass raw HTML through instead of escaping it
    pub allow_raw_html: bool,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            single_line_breaks: true,
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: false,
            link_target_blank: true,
            allow_raw_html: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Editing conventions and preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Indentation
    // ─────────────────────────────────────────────────────────────────────────
    /// Tab size (number of spaces)
    pub tab_size: u8,

    /// Whether to use spaces instead of tabs
    pub use_spaces: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Markdown Conventions
    // ─────────────────────────────────────────────────────────────────────────
    /// Bullet used by the unordered list toggle
    pub unordered_list_style: UnorderedListStyle,

    /// Emphasis tokens and code fence
    pub block_styles: BlockStyles,

    /// Templates for links, images, tables and rules
    pub insert_texts: InsertTexts,

    /// URL substituted when a link or image is drawn without one
    pub default_url: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────────
    pub rendering: RenderingConfig,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_size: 4,
            use_spaces: true,
            unordered_list_style: UnorderedListStyle::default(),
            block_styles: BlockStyles::default(),
            insert_texts: InsertTexts::default(),
            default_url: String::from("https://"),
            rendering: RenderingConfig::default(),
        }
    }
}

impl EditorSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed tab size.
    pub const MIN_TAB_SIZE: u8 = 1;
    /// Maximum allowed tab size.
    pub const MAX_TAB_SIZE: u8 = 8;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.tab_size = self.tab_size.clamp(Self::MIN_TAB_SIZE, Self::MAX_TAB_SIZE);
        self.block_styles.sanitize();
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Text added to a list line by one indent step.
    pub fn indent_unit(&self) -> String {
        if self.use_spaces {
            " ".repeat(self.tab_size as usize)
        } else {
            String::from("\t")
        }
    }

    /// Spaces typed by Tab outside a list, one tab width regardless of
    /// `use_spaces`.
    pub fn tab_spaces(&self) -> String {
        " ".repeat(self.tab_size as usize)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
