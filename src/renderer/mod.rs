//! Pluggable renderers.
//!
//! The processor only knows the [`Renderer`] capability; concrete engines are
//! created by a [`RendererFactory`] and looked up through a [`RendererRegistry`].

use crate::error::{Error, Result};
use crate::model::RenderModel;
use indexmap::IndexMap;
use log::debug;
use std::io::{Read, Write};
use std::path::Path;

pub mod markdown;
pub mod template;

pub use markdown::{MarkdownRenderer, MarkdownRendererFactory};
pub use template::{MiniJinjaRenderer, MiniJinjaRendererFactory};

/// Registry tag of the Markdown renderer.
pub const MARKDOWN_RENDERER: &str = "markdown";

/// Registry tag of the renderer that merges content into named templates.
pub const TEMPLATE_RENDERER: &str = "template";

/// A named, readable text source.
pub struct Resource<'a> {
    name: String,
    reader: Box<dyn Read + 'a>,
}

impl<'a> Resource<'a> {
    pub fn new<S: Into<String>>(name: S, reader: Box<dyn Read + 'a>) -> Self {
        Self { name: name.into(), reader }
    }

    /// A resource reading from an in-memory string.
    pub fn from_text<S: Into<String>>(name: S, text: &'a str) -> Self {
        Self::new(name, Box::new(text.as_bytes()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the whole resource as UTF-8 text.
    pub fn read_to_string(&mut self) -> Result<String> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text).map_err(|e| Error::io(&self.name, e))?;
        Ok(text)
    }
}

impl std::fmt::Debug for Resource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Everything a renderer needs for one render.
pub struct RenderRequest<'a> {
    /// Data exposed to the renderer.
    pub model: &'a RenderModel,
    /// Source text, consumed entirely by the renderer.
    pub resource: Resource<'a>,
    /// Named template to merge into, for renderers that support it.
    pub template: Option<&'a str>,
    /// Output, written and flushed by the renderer.
    pub destination: &'a mut dyn Write,
}

/// A component that turns a resource and a model into output text.
pub trait Renderer {
    /// Returns true if this renderer handles files named `filename`.
    fn supports(&self, filename: &str) -> bool;

    /// Extension of the sources this renderer reads, without the dot.
    fn input_extension(&self) -> &str;

    /// Extension of the output this renderer produces, without the dot.
    fn output_extension(&self) -> &str;

    /// Renders the request.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if a referenced template cannot be resolved
    /// * `Error::RenderError` if the engine fails
    /// * `Error::IoError` if reading the resource or writing the destination fails
    fn render(&self, request: RenderRequest<'_>) -> Result<()>;
}

/// Constructs a renderer for one pipeline run.
pub trait RendererFactory {
    /// Registry tag of the renderers this factory creates.
    fn tag(&self) -> &str;

    fn create(&self, source_dir: &Path, templates_dir: &Path) -> Result<Box<dyn Renderer>>;
}

/// Renderers of one run, keyed by tag in registration order.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: IndexMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding one renderer per factory, in factory order.
    pub fn from_factories(
        factories: &[Box<dyn RendererFactory>],
        source_dir: &Path,
        templates_dir: &Path,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for factory in factories {
            registry.register(factory.tag(), factory.create(source_dir, templates_dir)?)?;
        }
        Ok(registry)
    }

    /// The built-in renderers: Markdown, then template merge.
    pub fn with_defaults(source_dir: &Path, templates_dir: &Path) -> Result<Self> {
        let factories: Vec<Box<dyn RendererFactory>> =
            vec![Box::new(MarkdownRendererFactory), Box::new(MiniJinjaRendererFactory)];
        Self::from_factories(&factories, source_dir, templates_dir)
    }

    /// Registers `renderer` under `tag`, replacing any renderer already using it.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` if `tag` is blank
    pub fn register<S: Into<String>>(&mut self, tag: S, renderer: Box<dyn Renderer>) -> Result<()> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(Error::InvalidArgument("renderer tag cannot be empty".to_string()));
        }
        debug!("Registering renderer '{tag}'.");
        self.renderers.insert(tag, renderer);
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<&dyn Renderer> {
        self.renderers.get(tag).map(|r| r.as_ref())
    }

    /// The first registered renderer supporting `filename`, with its tag.
    pub fn find(&self, filename: &str) -> Option<(&str, &dyn Renderer)> {
        self.renderers
            .iter()
            .find(|(_, renderer)| renderer.supports(filename))
            .map(|(tag, renderer)| (tag.as_str(), renderer.as_ref()))
    }

    /// Registered tags, in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    /// Number of registered renderers.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Returns true if no renderer is registered.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}
