//! Template merging with MiniJinja.

use super::{RenderRequest, Renderer, RendererFactory, TEMPLATE_RENDERER};
use crate::error::{Error, Result};
use crate::model::CONTENT_KEY;
use cruet::Inflector;
use log::debug;
use minijinja::{path_loader, AutoEscape, Environment, ErrorKind};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// MiniJinja-based template renderer.
///
/// Named templates are resolved against a search path of directories, first
/// hit wins. The environment caches every template it loads for the rest of
/// the run. Output is never auto-escaped: `content` is already HTML.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
    search_path: Vec<PathBuf>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer resolving templates from `search_path`, in order.
    pub fn new<I, P>(search_path: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let search_path: Vec<PathBuf> = search_path.into_iter().map(Into::into).collect();
        let loaders: Vec<_> = search_path.iter().map(|dir| path_loader(dir.clone())).collect();

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_loader(move |name| {
            for load in &loaders {
                if let Some(source) = load(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(None)
        });
        register_filters(&mut env);

        Self { env, search_path }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    fn merge(
        &self,
        template: &str,
        resource: &str,
        body: String,
        request: &mut RenderRequest<'_>,
    ) -> Result<()> {
        let tmpl = self.env.get_template(template).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                Error::TemplateNotFound {
                    template: template.to_string(),
                    resource: resource.to_string(),
                }
            } else {
                Error::RenderError(format!("template '{template}' for '{resource}': {e:#}"))
            }
        })?;

        let mut context = request.model.clone();
        context.insert(CONTENT_KEY.to_string(), Value::String(body));

        tmpl.render_to_write(&context, &mut *request.destination)
            .map(|_| ())
            .map_err(|e| {
                Error::RenderError(format!("template '{template}' for '{resource}': {e:#}"))
            })
    }

    fn evaluate(&self, resource: &str, body: &str, request: &mut RenderRequest<'_>) -> Result<()> {
        let output = self
            .env
            .render_named_str(resource, body, request.model)
            .map_err(|e| Error::RenderError(format!("'{resource}': {e:#}")))?;
        request.destination.write_all(output.as_bytes()).map_err(|e| Error::io(resource, e))
    }
}

/// Case conversion filters, handy for slugs and titles.
fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("snake_case", |value: String| value.to_snake_case());
    env.add_filter("kebab_case", |value: String| value.to_kebab_case());
    env.add_filter("camel_case", |value: String| value.to_camel_case());
    env.add_filter("pascal_case", |value: String| value.to_pascal_case());
    env.add_filter("title_case", |value: String| value.to_title_case());
}

impl Renderer for MiniJinjaRenderer {
    fn supports(&self, filename: &str) -> bool {
        filename.ends_with(".j2") || filename.ends_with(".jinja")
    }

    fn input_extension(&self) -> &str {
        "j2"
    }

    fn output_extension(&self) -> &str {
        "html"
    }

    /// Merges the resource into `request.template` as `content`, or evaluates
    /// the resource itself as a template when no template is named.
    fn render(&self, mut request: RenderRequest<'_>) -> Result<()> {
        let body = request.resource.read_to_string()?;
        let resource = request.resource.name().to_string();

        match request.template {
            Some(template) => {
                debug!("Merging '{resource}' into template '{template}'.");
                self.merge(template, &resource, body, &mut request)?;
            }
            None => {
                debug!("Evaluating '{resource}' as a template.");
                self.evaluate(&resource, &body, &mut request)?;
            }
        }

        request.destination.flush().map_err(|e| Error::io(&resource, e))
    }
}

/// Creates [`MiniJinjaRenderer`]s searching the source directory, then the
/// templates directory.
#[derive(Debug, Default)]
pub struct MiniJinjaRendererFactory;

impl RendererFactory for MiniJinjaRendererFactory {
    fn tag(&self) -> &str {
        TEMPLATE_RENDERER
    }

    fn create(&self, source_dir: &Path, templates_dir: &Path) -> Result<Box<dyn Renderer>> {
        Ok(Box::new(MiniJinjaRenderer::new([source_dir, templates_dir])))
    }
}
