//! Structural editing commands
//!
//! Toggles for inline and block constructs, list continuation and
//! indentation, all dispatched through `MarkdownEditor`. The builders in the
//! submodules are pure: they read a text and selection and return a
//! `Transaction` for the buffer to apply.

mod blocks;
mod commands;
mod context;
mod editor;
mod inline;
mod lists;

pub use commands::{fix_shortcut, EditorCommand, HeadingStep, InlineStyle, LineStyle};
pub use editor::MarkdownEditor;
pub use inline::escape_url;
pub use lists::{ListKind, ListMarker};
