//! Preview rendering
//!
//! Converts markdown to an HTML fragment with comrak, then applies the
//! preview's post-processing: external links open in a new window and task
//! list items lose their bullet.

use comrak::markdown_to_html;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::config::RenderingConfig;
use crate::markdown::parser::MarkdownOptions;

static EXTERNAL_ANCHOR: OnceLock<Regex> = OnceLock::new();
static CHECKBOX_ITEM: OnceLock<Regex> = OnceLock::new();

fn external_anchor() -> &'static Regex {
    EXTERNAL_ANCHOR.get_or_init(|| {
        Regex::new(r#"<a\s[^>]*href="https?://[^"]*"[^>]*>"#).expect("valid anchor regex")
    })
}

fn checkbox_item() -> &'static Regex {
    CHECKBOX_ITEM.get_or_init(|| {
        Regex::new(r#"<li>(\s*<input type="checkbox")"#).expect("valid checkbox regex")
    })
}

/// Render `markdown` to an HTML fragment.
pub fn render_html(markdown: &str, config: &RenderingConfig) -> String {
    let options = MarkdownOptions::from(config).to_comrak_options();
    let mut html = markdown_to_html(markdown, &options);

    if config.link_target_blank {
        html = add_anchor_target_blank(&html);
    }
    if config.tasklist {
        html = remove_list_style_when_checkbox(&html);
    }
    html
}

/// Add `target="_blank"` to `http(s)` anchors that carry no target.
pub fn add_anchor_target_blank(html: &str) -> String {
    external_anchor()
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            if tag.contains("target=") {
                tag.to_string()
            } else {
                format!("{} target=\"_blank\">", &tag[..tag.len() - 1])
            }
        })
        .into_owned()
}

/// Drop the bullet of list items that start with a task checkbox.
pub fn remove_list_style_when_checkbox(html: &str) -> String {
    checkbox_item()
        .replace_all(
            html,
            r#"<li style="list-style-type: none; margin-left: -1.5em">$1"#,
        )
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let html = render_html("# Title\n\n**bold**", &RenderingConfig::default());
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_single_line_breaks() {
        let config = RenderingConfig::default();
        assert!(render_html("a\nb", &config).contains("<br />"));

        let config = RenderingConfig {
            single_line_breaks: false,
            ..RenderingConfig::default()
        };
        assert!(!render_html("a\nb", &config).contains("<br"));
    }

    #[test]
    fn test_external_links_open_new_window() {
        let html = render_html("[x](https://example.com) [y](/local)", &RenderingConfig::default());
        assert!(html.contains(r#"<a href="https://example.com" target="_blank">"#));
        assert!(html.contains(r#"<a href="/local">"#));
    }

    #[test]
    fn test_existing_target_kept() {
        let html = r#"<a href="http://a" target="_self">a</a>"#;
        assert_eq!(add_anchor_target_blank(html), html);
    }

    #[test]
    fn test_target_blank_disabled() {
        let config = RenderingConfig {
            link_target_blank: false,
            ..RenderingConfig::default()
        };
        assert!(!render_html("[x](https://example.com)", &config).contains("target="));
    }

    #[test]
    fn test_checkbox_items_lose_bullet() {
        let html = render_html("- [ ] todo\n- plain", &RenderingConfig::default());
        assert!(html.contains("list-style-type: none"));
        assert_eq!(html.matches("list-style-type").count(), 1);
    }

    #[test]
    fn test_raw_html_omitted_by_default() {
        let html = render_html("<script>x</script>", &RenderingConfig::default());
        assert!(!html.contains("<script>"));
    }
}
