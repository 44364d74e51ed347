//! Markdown to HTML conversion with pulldown-cmark.

use super::{RenderRequest, Renderer, RendererFactory, MARKDOWN_RENDERER};
use crate::error::{Error, Result};
use pulldown_cmark::{html, Options, Parser};
use std::io::Write;
use std::path::Path;

/// Converts Markdown bodies to HTML.
///
/// Front matter is expected to be stripped before the body reaches this renderer.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    /// CommonMark plus tables, footnotes, strikethrough, task lists, smart
    /// punctuation and heading attributes.
    pub fn new() -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        Self { options }
    }

    pub fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        MarkdownRenderer::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn supports(&self, filename: &str) -> bool {
        filename.ends_with(".md") || filename.ends_with(".markdown")
    }

    fn input_extension(&self) -> &str {
        "md"
    }

    fn output_extension(&self) -> &str {
        "html"
    }

    fn render(&self, mut request: RenderRequest<'_>) -> Result<()> {
        let markdown = request.resource.read_to_string()?;
        let name = request.resource.name().to_string();
        request
            .destination
            .write_all(self.to_html(&markdown).as_bytes())
            .and_then(|_| request.destination.flush())
            .map_err(|e| Error::io(name, e))
    }
}

/// Creates [`MarkdownRenderer`]s; needs neither the source nor the templates directory.
#[derive(Debug, Default)]
pub struct MarkdownRendererFactory;

impl RendererFactory for MarkdownRendererFactory {
    fn tag(&self) -> &str {
        MARKDOWN_RENDERER
    }

    fn create(&self, _source_dir: &Path, _templates_dir: &Path) -> Result<Box<dyn Renderer>> {
        Ok(Box::new(MarkdownRenderer::new()))
    }
}
