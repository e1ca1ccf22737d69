//! Editor commands
//!
//! Every operation the editor exposes to toolbars, key bindings and the host
//! API is a variant of `EditorCommand`. Inline and line constructs carry a
//! style descriptor naming the markup they toggle.

use std::fmt;
use std::str::FromStr;

use crate::config::{BlockStyles, UnorderedListStyle};
use crate::error::Error;
use crate::markdown::{ConstructState, HeadingLevel};

// ─────────────────────────────────────────────────────────────────────────────
// Inline Styles
// ─────────────────────────────────────────────────────────────────────────────

/// Emphasis constructs toggled by wrapping text in a token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Strikethrough,
}

impl InlineStyle {
    /// Token inserted when the style is applied.
    pub fn token(self, styles: &BlockStyles) -> &str {
        match self {
            InlineStyle::Bold => &styles.bold,
            InlineStyle::Italic => &styles.italic,
            InlineStyle::Strikethrough => "~~",
        }
    }

    /// Tokens recognised when the style is removed.
    pub fn removal_tokens(self) -> &'static [&'static str] {
        match self {
            InlineStyle::Bold => &["**", "__"],
            InlineStyle::Italic => &["*", "_"],
            InlineStyle::Strikethrough => &["~~"],
        }
    }

    pub fn is_active(self, state: &ConstructState) -> bool {
        match self {
            InlineStyle::Bold => state.bold,
            InlineStyle::Italic => state.italic,
            InlineStyle::Strikethrough => state.strikethrough,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Styles
// ─────────────────────────────────────────────────────────────────────────────

/// Constructs toggled by a marker at the start of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Quote,
    UnorderedList,
    OrderedList,
}

impl LineStyle {
    /// Marker prepended when the style is applied.
    pub fn prefix(self, bullet: UnorderedListStyle) -> String {
        match self {
            LineStyle::Quote => String::from("> "),
            LineStyle::UnorderedList => bullet.prefix(),
            LineStyle::OrderedList => String::from("1. "),
        }
    }

    pub fn is_active(self, state: &ConstructState) -> bool {
        match self {
            LineStyle::Quote => state.quote,
            LineStyle::UnorderedList => state.unordered_list,
            LineStyle::OrderedList => state.ordered_list,
        }
    }
}

/// Direction of a relative heading change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingStep {
    /// One more `#`; level 6 becomes plain text
    Smaller,
    /// One less `#`; level 1 becomes plain text
    Bigger,
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Every command the editor can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    ToggleInline(InlineStyle),
    ToggleHeadingStep(HeadingStep),
    ToggleHeading(HeadingLevel),
    ToggleLine(LineStyle),
    ToggleCodeBlock,
    CleanBlock,
    DrawLink,
    DrawImage,
    DrawTable,
    DrawHorizontalRule,
    InsertUploadedImage,
    ContinueList,
    TabIndent,
    ShiftTabOutdent,
    Undo,
    Redo,
    TogglePreview,
}

impl EditorCommand {
    /// All commands, in toolbar order.
    pub fn all() -> Vec<EditorCommand> {
        use EditorCommand::*;
        let mut commands = vec![
            ToggleInline(InlineStyle::Bold),
            ToggleInline(InlineStyle::Italic),
            ToggleInline(InlineStyle::Strikethrough),
            ToggleHeadingStep(HeadingStep::Smaller),
            ToggleHeadingStep(HeadingStep::Bigger),
        ];
        commands.extend((1..=6).map(|n| ToggleHeading(HeadingLevel::from(n))));
        commands.extend([
            ToggleLine(LineStyle::Quote),
            ToggleLine(LineStyle::UnorderedList),
            ToggleLine(LineStyle::OrderedList),
            ToggleCodeBlock,
            CleanBlock,
            DrawLink,
            DrawImage,
            DrawTable,
            DrawHorizontalRule,
            InsertUploadedImage,
            ContinueList,
            TabIndent,
            ShiftTabOutdent,
            Undo,
            Redo,
            TogglePreview,
        ]);
        commands
    }

    /// Host API name, e.g. `toggleBold` or `toggleHeading3`.
    pub fn name(&self) -> &'static str {
        use EditorCommand::*;
        match self {
            ToggleInline(InlineStyle::Bold) => "toggleBold",
            ToggleInline(InlineStyle::Italic) => "toggleItalic",
            ToggleInline(InlineStyle::Strikethrough) => "toggleStrikethrough",
            ToggleHeadingStep(HeadingStep::Smaller) => "toggleHeadingSmaller",
            ToggleHeadingStep(HeadingStep::Bigger) => "toggleHeadingBigger",
            ToggleHeading(HeadingLevel::H1) => "toggleHeading1",
            ToggleHeading(HeadingLevel::H2) => "toggleHeading2",
            ToggleHeading(HeadingLevel::H3) => "toggleHeading3",
            ToggleHeading(HeadingLevel::H4) => "toggleHeading4",
            ToggleHeading(HeadingLevel::H5) => "toggleHeading5",
            ToggleHeading(HeadingLevel::H6) => "toggleHeading6",
            ToggleLine(LineStyle::Quote) => "toggleBlockquote",
            ToggleLine(LineStyle::UnorderedList) => "toggleUnorderedList",
            ToggleLine(LineStyle::OrderedList) => "toggleOrderedList",
            ToggleCodeBlock => "toggleCodeBlock",
            CleanBlock => "cleanBlock",
            DrawLink => "drawLink",
            DrawImage => "drawImage",
            DrawTable => "drawTable",
            DrawHorizontalRule => "drawHorizontalRule",
            InsertUploadedImage => "insertUploadedImage",
            ContinueList => "continueList",
            TabIndent => "tabIndent",
            ShiftTabOutdent => "shiftTabOutdent",
            Undo => "undo",
            Redo => "redo",
            TogglePreview => "togglePreview",
        }
    }

    /// Kebab-case form of `name()`, e.g. `toggle-heading-3`.
    pub fn kebab_name(&self) -> String {
        let mut out = String::new();
        for c in self.name().chars() {
            if c.is_ascii_uppercase() || (c.is_ascii_digit() && !out.is_empty()) {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        }
        out
    }

    /// Whether the command changes the text.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, EditorCommand::TogglePreview)
    }

    /// Default key binding, written with `Cmd` for the primary modifier.
    pub fn shortcut(&self) -> Option<&'static str> {
        use EditorCommand::*;
        Some(match self {
            ToggleInline(InlineStyle::Bold) => "Cmd-B",
            ToggleInline(InlineStyle::Italic) => "Cmd-I",
            DrawLink => "Cmd-K",
            ToggleHeadingStep(HeadingStep::Smaller) => "Cmd-H",
            ToggleHeadingStep(HeadingStep::Bigger) => "Shift-Cmd-H",
            ToggleHeading(HeadingLevel::H1) => "Ctrl+Alt+1",
            ToggleHeading(HeadingLevel::H2) => "Ctrl+Alt+2",
            ToggleHeading(HeadingLevel::H3) => "Ctrl+Alt+3",
            ToggleHeading(HeadingLevel::H4) => "Ctrl+Alt+4",
            ToggleHeading(HeadingLevel::H5) => "Ctrl+Alt+5",
            ToggleHeading(HeadingLevel::H6) => "Ctrl+Alt+6",
            CleanBlock => "Cmd-E",
            DrawImage => "Cmd-Alt-I",
            ToggleLine(LineStyle::Quote) => "Cmd-'",
            ToggleLine(LineStyle::OrderedList) => "Cmd-Alt-L",
            ToggleLine(LineStyle::UnorderedList) => "Cmd-L",
            ToggleCodeBlock => "Cmd-Alt-C",
            TogglePreview => "Cmd-P",
            ContinueList => "Enter",
            TabIndent => "Tab",
            ShiftTabOutdent => "Shift-Tab",
            _ => return None,
        })
    }

    /// Key binding label for the given platform: `Cmd` on macOS, `Ctrl`
    /// elsewhere.
    pub fn shortcut_label(&self, mac: bool) -> Option<String> {
        self.shortcut().map(|s| fix_shortcut(s, mac))
    }
}

/// Swap the first `Cmd`/`Ctrl` modifier for the platform's primary modifier.
pub fn fix_shortcut(shortcut: &str, mac: bool) -> String {
    if mac {
        shortcut.replacen("Ctrl", "Cmd", 1)
    } else {
        shortcut.replacen("Cmd", "Ctrl", 1)
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorCommand {
    type Err = Error;

    /// Accepts host API names (`toggleBold`) and kebab-case (`toggle-bold`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EditorCommand::all()
            .into_iter()
            .find(|c| c.name() == wanted || c.kebab_name() == wanted)
            .ok_or_else(|| Error::UnknownCommand(wanted.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
