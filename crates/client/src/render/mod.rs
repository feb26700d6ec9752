//! Render adaptation for extracted content.
//!
//! Shape adaptation only, no business logic: HTML-capable surfaces get the
//! concatenated body wrapped in a fixed document shell with the base
//! location passed through; plain-text surfaces get the markup stripped.

use std::path::PathBuf;

use crate::extract::ExtractedContent;

/// Target display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Wrap in an HTML document shell.
    #[default]
    Html,
    /// Strip markup to plain text.
    PlainText,
}

/// A document ready for hand-off to a display surface.
#[derive(Debug, Clone)]
pub struct RenderableDocument {
    /// Rendered content (full HTML document or plain text).
    pub content: String,
    /// Base directory for resolving relative resource references.
    /// `None` in plain-text mode, where references cannot occur.
    pub base_dir: Option<PathBuf>,
    /// The mode this document was rendered for.
    pub mode: RenderMode,
}

/// Adapt `content` for the given display surface.
pub fn present(content: &ExtractedContent, mode: RenderMode) -> RenderableDocument {
    match mode {
        RenderMode::Html => RenderableDocument {
            content: wrap_document(&content.title, &content.body),
            base_dir: Some(content.base_dir.clone()),
            mode,
        },
        RenderMode::PlainText => RenderableDocument {
            content: strip_markup(&content.body),
            base_dir: None,
            mode,
        },
    }
}

/// Wrap `body` in the fixed document shell: charset, viewport, and
/// responsive image styling so embedded images fit the display width.
pub fn wrap_document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>
body {{ font-family: serif; line-height: 1.6; margin: 1em auto; max-width: 40em; padding: 0 1em; }}
img {{ max-width: 100%; height: auto; }}
</style>
<title>{}</title>
</head>
<body>
{body}
</body>
</html>"#,
        escape_text(title)
    )
}

/// Strip markup from concatenated XHTML fragments, keeping text content.
fn strip_markup(body: &str) -> String {
    let document = scraper::Html::parse_document(body);
    let mut text = String::new();

    for piece in document.root_element().text() {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(trimmed);
    }

    text
}

/// Minimal escaping for text interpolated into the shell's head.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
