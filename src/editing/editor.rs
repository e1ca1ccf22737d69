//! Markdown editor
//!
//! `MarkdownEditor` binds a `TextBuffer`, the editor settings and a syntax
//! tree together and exposes one method per command. Every method reports
//! whether it handled the input; failures are logged and reported as
//! "not handled" so a key binding can fall through to the host.

use log::{debug, warn};

use crate::buffer::{Document, Position, TextBuffer, TextLines, Transaction, END_OF_LINE};
use crate::config::EditorSettings;
use crate::editing::blocks;
use crate::editing::commands::{EditorCommand, HeadingStep, InlineStyle, LineStyle};
use crate::editing::context::EditContext;
use crate::editing::inline;
use crate::editing::lists;
use crate::error::Result;
use crate::markdown::{
    detect_state, render_html, ComrakSyntax, ConstructState, HeadingLevel, MarkdownOptions,
    SyntaxTree,
};

/// Structural markdown editor over a host buffer.
pub struct MarkdownEditor<B: TextBuffer = Document> {
    buffer: B,
    settings: EditorSettings,
    syntax: Box<dyn SyntaxTree>,
    /// Read-only preview; mutating commands are ignored while set
    preview: bool,
}

impl MarkdownEditor<Document> {
    /// Editor over a fresh `Document` holding `text`.
    pub fn from_text(text: impl Into<String>, settings: EditorSettings) -> Self {
        Self::new(Document::new(text), settings)
    }
}

impl<B: TextBuffer> MarkdownEditor<B> {
    pub fn new(buffer: B, mut settings: EditorSettings) -> Self {
        settings.sanitize();
        let syntax = ComrakSyntax::new(MarkdownOptions::from(&settings.rendering));
        Self {
            buffer,
            settings,
            syntax: Box::new(syntax),
            preview: false,
        }
    }

    /// Replace the syntax classifier.
    pub fn with_syntax(mut self, syntax: Box<dyn SyntaxTree>) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn is_preview_active(&self) -> bool {
        self.preview
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Constructs active at `pos`, or at the selection head.
    pub fn get_state(&self, pos: Option<Position>) -> ConstructState {
        let text = self.buffer.text();
        let lines = TextLines::new(text);
        let pos = match pos {
            Some(pos) => {
                let clamped = lines.clamp_pos(lines.clamp_offset(pos));
                if clamped != pos && pos.ch != END_OF_LINE {
                    warn!("State query at {} clamped to {}", pos, clamped);
                }
                clamped
            }
            None => lines.clamp_pos(self.buffer.selection().head),
        };
        detect_state(self.syntax.as_ref(), text, pos)
    }

    /// The document rendered to HTML.
    pub fn preview_html(&self) -> String {
        render_html(self.buffer.text(), &self.settings.rendering)
    }

    fn state_at_head(&self, ctx: &EditContext) -> ConstructState {
        detect_state(self.syntax.as_ref(), ctx.text, ctx.head())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `command` with a URL for the commands that take one.
    pub fn execute_with_url(&mut self, command: EditorCommand, url: Option<&str>) -> bool {
        match command {
            EditorCommand::ToggleInline(InlineStyle::Bold) => self.toggle_bold(),
            EditorCommand::ToggleInline(InlineStyle::Italic) => self.toggle_italic(),
            EditorCommand::ToggleInline(InlineStyle::Strikethrough) => self.toggle_strikethrough(),
            EditorCommand::ToggleHeadingStep(HeadingStep::Smaller) => self.toggle_heading_smaller(),
            EditorCommand::ToggleHeadingStep(HeadingStep::Bigger) => self.toggle_heading_bigger(),
            EditorCommand::ToggleHeading(level) => self.toggle_heading(level),
            EditorCommand::ToggleLine(LineStyle::Quote) => self.toggle_blockquote(),
            EditorCommand::ToggleLine(LineStyle::UnorderedList) => self.toggle_unordered_list(),
            EditorCommand::ToggleLine(LineStyle::OrderedList) => self.toggle_ordered_list(),
            EditorCommand::ToggleCodeBlock => self.toggle_code_block(),
            EditorCommand::CleanBlock => self.clean_block(),
            EditorCommand::DrawLink => self.draw_link(url),
            EditorCommand::DrawImage => self.draw_image(url),
            EditorCommand::DrawTable => self.draw_table(),
            EditorCommand::DrawHorizontalRule => self.draw_horizontal_rule(),
            EditorCommand::InsertUploadedImage => match url {
                Some(url) => self.insert_uploaded_image(url),
                None => {
                    warn!("{} needs a URL", command);
                    false
                }
            },
            EditorCommand::ContinueList => self.continue_list(),
            EditorCommand::TabIndent => self.tab_indent(),
            EditorCommand::ShiftTabOutdent => self.shift_tab_outdent(),
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::TogglePreview => self.toggle_preview(),
        }
    }

    pub fn execute(&mut self, command: EditorCommand) -> bool {
        self.execute_with_url(command, None)
    }

    /// Build a transaction against the current text and apply it.
    ///
    /// `Ok(None)` from `build` means the command does not apply here.
    fn run<F>(&mut self, command: EditorCommand, build: F) -> bool
    where
        F: FnOnce(&EditContext, &Self) -> Result<Option<Transaction>>,
    {
        if self.preview {
            debug!("{} ignored while preview is active", command);
            return false;
        }

        let (result, lines) = {
            let ctx = EditContext::new(self.buffer.text(), self.buffer.selection());
            (build(&ctx, &*self), ctx.selected_lines())
        };

        let tx = match result {
            Ok(Some(tx)) => tx,
            Ok(None) => return false,
            Err(err) => {
                warn!("{} failed: {}", command, err);
                return false;
            }
        };

        if tx.changes.is_empty() {
            debug!("{} on lines {}..={}: nothing to change", command, lines.0, lines.1);
            return true;
        }
        let edits = tx.changes.len();
        match self.buffer.dispatch(tx) {
            Ok(()) => {
                debug!(
                    "{} on lines {}..={}: {} edit(s)",
                    command, lines.0, lines.1, edits
                );
                true
            }
            Err(err) => {
                warn!("{} rejected by the buffer: {}", command, err);
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline
    // ─────────────────────────────────────────────────────────────────────────

    fn toggle_inline(&mut self, style: InlineStyle) -> bool {
        self.run(EditorCommand::ToggleInline(style), |ctx, editor| {
            let active = style.is_active(&editor.state_at_head(ctx));
            let token = style.token(&editor.settings.block_styles);
            inline::toggle_inline(ctx, style, token, active).map(Some)
        })
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.toggle_inline(InlineStyle::Bold)
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.toggle_inline(InlineStyle::Italic)
    }

    pub fn toggle_strikethrough(&mut self) -> bool {
        self.toggle_inline(InlineStyle::Strikethrough)
    }

    /// Toggle a link. `url` is escaped; without one the configured default
    /// URL is used.
    pub fn draw_link(&mut self, url: Option<&str>) -> bool {
        self.draw_reference(EditorCommand::DrawLink, false, url)
    }

    /// Toggle an image. `url` is escaped like for links.
    pub fn draw_image(&mut self, url: Option<&str>) -> bool {
        self.draw_reference(EditorCommand::DrawImage, true, url)
    }

    fn draw_reference(&mut self, command: EditorCommand, image: bool, url: Option<&str>) -> bool {
        let url = match url {
            Some(url) => inline::escape_url(url),
            None => self.settings.default_url.clone(),
        };
        self.run(command, |ctx, editor| {
            let state = editor.state_at_head(ctx);
            let texts = &editor.settings.insert_texts;
            let (active, template) = if image {
                (state.image, texts.image.with_url(&url))
            } else {
                (state.link, texts.link.with_url(&url))
            };
            inline::toggle_link(ctx, image, active, template).map(Some)
        })
    }

    pub fn draw_table(&mut self) -> bool {
        self.run(EditorCommand::DrawTable, |ctx, editor| {
            let table = &editor.settings.insert_texts.table;
            inline::wrap(ctx, table.start(), table.end()).map(Some)
        })
    }

    pub fn draw_horizontal_rule(&mut self) -> bool {
        self.run(EditorCommand::DrawHorizontalRule, |ctx, editor| {
            let rule = &editor.settings.insert_texts.horizontal_rule;
            inline::wrap(ctx, rule.start(), rule.end()).map(Some)
        })
    }

    /// Insert a reference to an uploaded file: an image embed for image
    /// extensions, a link otherwise. Nothing happens inside an existing
    /// image or link.
    pub fn insert_uploaded_image(&mut self, url: &str) -> bool {
        self.run(EditorCommand::InsertUploadedImage, |ctx, editor| {
            let state = editor.state_at_head(ctx);
            if state.image || state.link {
                debug!("Upload reference skipped inside an existing image or link");
                return Ok(None);
            }
            let (start, end) = inline::uploaded_template(url, &editor.settings.insert_texts);
            inline::wrap(ctx, &start, &end).map(Some)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blocks
    // ─────────────────────────────────────────────────────────────────────────

    pub fn toggle_heading_smaller(&mut self) -> bool {
        self.heading_step(HeadingStep::Smaller)
    }

    pub fn toggle_heading_bigger(&mut self) -> bool {
        self.heading_step(HeadingStep::Bigger)
    }

    fn heading_step(&mut self, step: HeadingStep) -> bool {
        self.run(EditorCommand::ToggleHeadingStep(step), |ctx, _| {
            blocks::toggle_heading_step(ctx, step).map(Some)
        })
    }

    /// Set the selected lines to `level`, or clear lines already at it.
    pub fn toggle_heading(&mut self, level: HeadingLevel) -> bool {
        self.run(EditorCommand::ToggleHeading(level), |ctx, _| {
            blocks::toggle_heading(ctx, level).map(Some)
        })
    }

    fn toggle_line(&mut self, style: LineStyle) -> bool {
        self.run(EditorCommand::ToggleLine(style), |ctx, editor| {
            let active = style.is_active(&editor.state_at_head(ctx));
            let bullet = editor.settings.unordered_list_style;
            blocks::toggle_line(ctx, style, active, bullet).map(Some)
        })
    }

    pub fn toggle_blockquote(&mut self) -> bool {
        self.toggle_line(LineStyle::Quote)
    }

    pub fn toggle_unordered_list(&mut self) -> bool {
        self.toggle_line(LineStyle::UnorderedList)
    }

    pub fn toggle_ordered_list(&mut self) -> bool {
        self.toggle_line(LineStyle::OrderedList)
    }

    pub fn toggle_code_block(&mut self) -> bool {
        self.run(EditorCommand::ToggleCodeBlock, |ctx, editor| {
            blocks::toggle_code(ctx, &editor.settings.block_styles.code, editor.syntax.as_ref())
                .map(Some)
        })
    }

    pub fn clean_block(&mut self) -> bool {
        self.run(EditorCommand::CleanBlock, |ctx, _| {
            blocks::clean_block(ctx).map(Some)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lists
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter inside a list. Not handled outside lists or with a selection.
    pub fn continue_list(&mut self) -> bool {
        self.run(EditorCommand::ContinueList, |ctx, _| lists::continue_list(ctx))
    }

    /// Tab: indent list lines, otherwise type one indent unit.
    pub fn tab_indent(&mut self) -> bool {
        self.run(EditorCommand::TabIndent, |ctx, editor| {
            let in_list = lists::in_list(editor.syntax.as_ref(), ctx);
            let unit = if in_list {
                editor.settings.indent_unit()
            } else {
                editor.settings.tab_spaces()
            };
            lists::tab_indent(ctx, in_list, &unit).map(Some)
        })
    }

    /// Shift-Tab: outdent list lines. Not handled outside lists.
    pub fn shift_tab_outdent(&mut self) -> bool {
        self.run(EditorCommand::ShiftTabOutdent, |ctx, editor| {
            if !lists::in_list(editor.syntax.as_ref(), ctx) {
                return Ok(None);
            }
            let tab_size = usize::from(editor.settings.tab_size);
            lists::indent_less(ctx, tab_size).map(Some)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History and Preview
    // ─────────────────────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if self.preview {
            return false;
        }
        self.buffer.undo()
    }

    pub fn redo(&mut self) -> bool {
        if self.preview {
            return false;
        }
        self.buffer.redo()
    }

    /// Flip the read-only preview.
    pub fn toggle_preview(&mut self) -> bool {
        self.preview = !self.preview;
        debug!("Preview {}", if self.preview { "on" } else { "off" });
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
