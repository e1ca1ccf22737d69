//! Markdown syntax classification, state detection and preview rendering
//!
//! This module wraps the comrak library, a CommonMark + GFM compatible
//! parser, behind the `SyntaxTree` seam used by the editing commands.
//!
//! # Example
//! ```
//! use tidemark::buffer::Position;
//! use tidemark::markdown::{detect_state, ComrakSyntax};
//!
//! let state = detect_state(&ComrakSyntax::default(), "## Title", Position::new(0, 4));
//! assert!(state.is_active("heading-2"));
//! ```

mod parser;
mod render;
mod state;

pub use parser::{ComrakSyntax, HeadingLevel, MarkdownOptions, NodeKind, ProbeSide, SyntaxTree};
pub use render::{add_anchor_target_blank, remove_list_style_when_checkbox, render_html};
pub use state::{detect_state, ConstructState};
