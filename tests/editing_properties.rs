use tidemark::buffer::{Document, SelectionRange, TextBuffer, Transaction};
use tidemark::config::EditorSettings;
use tidemark::editing::{EditorCommand, InlineStyle, MarkdownEditor};
use tidemark::markdown::HeadingLevel;
use tidemark::Result;

fn editor(text: &str, anchor: usize, head: usize) -> MarkdownEditor {
    let mut editor = MarkdownEditor::from_text(text, EditorSettings::default());
    editor
        .buffer_mut()
        .set_selection_range(SelectionRange::new(anchor, head))
        .unwrap();
    editor
}

fn selected(editor: &MarkdownEditor) -> String {
    editor.buffer().selected_text().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Idempotence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_toggle_twice_restores_text() {
    let cases: Vec<(&str, usize, usize, EditorCommand)> = vec![
        ("hello world", 3, 3, "toggleBold".parse().unwrap()),
        ("hello world", 0, 5, "toggleItalic".parse().unwrap()),
        ("hello world", 6, 11, "toggleStrikethrough".parse().unwrap()),
        ("Title", 0, 0, EditorCommand::ToggleHeading(HeadingLevel::H3)),
        ("a\nb", 0, 3, "toggleBlockquote".parse().unwrap()),
        ("item", 4, 4, "toggleUnorderedList".parse().unwrap()),
        ("one\ntwo", 0, 7, "toggleOrderedList".parse().unwrap()),
        ("line", 4, 4, "toggleCodeBlock".parse().unwrap()),
        ("one\ntwo", 0, 7, "toggleCodeBlock".parse().unwrap()),
        ("x", 0, 1, "drawLink".parse().unwrap()),
        ("", 0, 0, "drawLink".parse().unwrap()),
        ("x", 0, 1, "drawImage".parse().unwrap()),
        // Carets at construct boundaries
        ("**b** x", 5, 5, "toggleBold".parse().unwrap()),
        ("~~s~~ x", 5, 5, "toggleStrikethrough".parse().unwrap()),
        ("a [l](u) b", 8, 8, "drawLink".parse().unwrap()),
        ("```\na\n```\nafter", 15, 15, "toggleCodeBlock".parse().unwrap()),
        (
            "```\na\n```\nmiddle\n```\nb\n```",
            12,
            12,
            "toggleCodeBlock".parse().unwrap(),
        ),
    ];

    for (text, anchor, head, command) in cases {
        let mut ed = editor(text, anchor, head);
        assert!(ed.execute(command), "{} on {:?}", command, text);
        assert_ne!(ed.text(), text, "{} changed nothing", command);
        assert!(ed.execute(command), "{} again on {:?}", command, ed.text());
        assert_eq!(ed.text(), text, "{} twice", command);
    }
}

#[test]
fn test_toggle_at_span_edges_follows_state() {
    let cases = [
        ("x **bold** y", 2, "x bold y"),
        ("**bold**", 8, "bold"),
        ("a *it* b", 2, "a it b"),
        ("~~gone~~ z", 0, "gone z"),
    ];
    for (text, caret, expected) in cases {
        let mut ed = editor(text, caret, caret);
        let state = ed.get_state(None);
        assert!(state.bold || state.italic || state.strikethrough, "{:?}", text);
        let command = if state.bold {
            EditorCommand::ToggleInline(InlineStyle::Bold)
        } else if state.italic {
            EditorCommand::ToggleInline(InlineStyle::Italic)
        } else {
            EditorCommand::ToggleInline(InlineStyle::Strikethrough)
        };
        assert!(ed.execute(command));
        assert_eq!(ed.text(), expected, "caret {} in {:?}", caret, text);
    }
}

#[test]
fn test_caret_between_code_spans_keeps_them() {
    let mut ed = editor("a `x` b `y` c", 6, 6);
    assert!(!ed.get_state(None).code);
    assert!(ed.toggle_code_block());
    assert!(ed.text().starts_with("a `x` b `y` c\n```"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection preservation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_wrapping_keeps_selected_text() {
    let commands = [
        "toggleBold",
        "toggleItalic",
        "toggleStrikethrough",
        "drawLink",
        "drawImage",
    ];
    for name in commands {
        let mut ed = editor("alpha beta gamma", 6, 10);
        assert!(ed.execute(name.parse().unwrap()));
        assert_eq!(selected(&ed), "beta", "{}", name);
    }
}

#[test]
fn test_backward_selection_keeps_direction() {
    let mut ed = editor("alpha beta", 10, 6);
    assert!(ed.toggle_bold());
    let sel = ed.buffer().selection();
    assert!(sel.anchor > sel.head);
    assert_eq!(selected(&ed), "beta");
}

// ─────────────────────────────────────────────────────────────────────────────
// Headings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_heading_bigger_seven_times_is_plain() {
    let mut ed = editor("A paragraph", 2, 2);
    let mut levels = Vec::new();
    for _ in 0..7 {
        assert!(ed.toggle_heading_bigger());
        levels.push(ed.text().chars().take_while(|&c| c == '#').count());
    }
    assert_eq!(levels, vec![6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(ed.text(), "A paragraph");
}

#[test]
fn test_heading_is_one_atomic_edit() {
    let mut ed = editor("a\nb\nc", 0, 5);
    assert!(ed.toggle_heading(HeadingLevel::H2));
    assert_eq!(ed.text(), "## a\n## b\n## c");
    assert!(ed.undo());
    assert_eq!(ed.text(), "a\nb\nc");
    assert!(!ed.buffer().can_undo());
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ordered_list_increments() {
    let mut ed = editor("3. item", 7, 7);
    assert!(ed.continue_list());
    assert_eq!(ed.text(), "3. item\n4. ");
    assert_eq!(ed.buffer().selection(), SelectionRange::caret(ed.text().len()));
}

#[test]
fn test_empty_item_exits_list() {
    let mut ed = editor("- ", 2, 2);
    assert!(ed.continue_list());
    assert_eq!(ed.text(), "");
    assert_eq!(ed.buffer().selection(), SelectionRange::caret(0));
}

#[test]
fn test_enter_outside_list_falls_through() {
    let mut ed = editor("plain", 5, 5);
    assert!(!ed.continue_list());
    assert_eq!(ed.text(), "plain");
}

// ─────────────────────────────────────────────────────────────────────────────
// Code fences
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fence_round_trip() {
    let original = "first line\nsecond line";
    let mut ed = editor(original, 0, original.len());
    assert!(ed.toggle_code_block());
    assert_eq!(ed.text(), "```\nfirst line\nsecond line\n```");
    assert_eq!(selected(&ed), original);

    assert!(ed.toggle_code_block());
    assert_eq!(ed.text(), original);
}

// ─────────────────────────────────────────────────────────────────────────────
// Links
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_link_strip_precision() {
    let text = "before [text](http://x) after";
    let caret = 10;
    let mut ed = editor(text, caret, caret);
    assert!(ed.get_state(None).link);
    assert!(ed.draw_link(None));
    assert_eq!(ed.text(), "before text after");
    assert_eq!(ed.buffer().selection(), SelectionRange::caret(caret - 1));
}

// ─────────────────────────────────────────────────────────────────────────────
// Host buffer seam
// ─────────────────────────────────────────────────────────────────────────────

/// Host buffer that counts transactions and keeps no history.
struct CountingBuffer {
    inner: Document,
    dispatched: usize,
}

impl TextBuffer for CountingBuffer {
    fn text(&self) -> &str {
        self.inner.text()
    }

    fn selection(&self) -> SelectionRange {
        self.inner.selection()
    }

    fn dispatch(&mut self, transaction: Transaction) -> Result<()> {
        self.dispatched += 1;
        self.inner.dispatch(transaction)
    }
}

#[test]
fn test_custom_buffer_gets_one_transaction_per_toggle() {
    let mut inner = Document::new("a\nb\nc");
    inner
        .set_selection_range(SelectionRange::new(0, 5))
        .unwrap();
    let buffer = CountingBuffer {
        inner,
        dispatched: 0,
    };
    let mut ed = MarkdownEditor::new(buffer, EditorSettings::default());

    assert!(ed.toggle_blockquote());
    assert_eq!(ed.text(), "> a\n> b\n> c");
    assert_eq!(ed.buffer().dispatched, 1);

    // Without history the buffer reports undo as not handled.
    assert!(!ed.undo());
}
