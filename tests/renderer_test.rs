use scms::error::{Error, Result};
use scms::model::RenderModel;
use scms::renderer::{
    MarkdownRenderer, MiniJinjaRenderer, RenderRequest, Renderer, RendererRegistry, Resource,
    MARKDOWN_RENDERER, TEMPLATE_RENDERER,
};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn render_to_string(
    renderer: &dyn Renderer,
    model: &RenderModel,
    text: &str,
    template: Option<&str>,
) -> Result<String> {
    let mut output = Vec::new();
    renderer.render(RenderRequest {
        model,
        resource: Resource::from_text("page.md", text),
        template,
        destination: &mut output,
    })?;
    Ok(String::from_utf8(output).unwrap())
}

fn model(entries: &[(&str, serde_json::Value)]) -> RenderModel {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

struct ShoutRenderer;

impl Renderer for ShoutRenderer {
    fn supports(&self, filename: &str) -> bool {
        filename.ends_with(".txt")
    }

    fn input_extension(&self) -> &str {
        "txt"
    }

    fn output_extension(&self) -> &str {
        "txt"
    }

    fn render(&self, mut request: RenderRequest<'_>) -> Result<()> {
        let text = request.resource.read_to_string()?;
        request.destination.write_all(text.to_uppercase().as_bytes()).unwrap();
        Ok(())
    }
}

#[test]
fn test_markdown_supports() {
    let renderer = MarkdownRenderer::new();
    assert!(renderer.supports("index.md"));
    assert!(renderer.supports("docs/guide.markdown"));
    assert!(!renderer.supports("index.html"));
    assert!(!renderer.supports("notes.txt"));
    assert_eq!(renderer.input_extension(), "md");
    assert_eq!(renderer.output_extension(), "html");
}

#[test]
fn test_markdown_extensions() {
    let renderer = MarkdownRenderer::new();
    let markdown = "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n```rust\nfn main() {}\n```\n";
    let html = render_to_string(&renderer, &RenderModel::new(), markdown, None).unwrap();

    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<table>"));
    assert!(html.contains("<del>gone</del>"));
    assert!(html.contains("<code class=\"language-rust\">"));
}

#[test]
fn test_template_merges_content() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("page.html"),
        "<title>{{ title }}</title><main>{{ content }}</main>",
    )
    .unwrap();
    let renderer = MiniJinjaRenderer::new([temp_dir.path()]);

    let html = render_to_string(
        &renderer,
        &model(&[("title", json!("Hello"))]),
        "<p>Body</p>",
        Some("page.html"),
    )
    .unwrap();

    assert_eq!(html, "<title>Hello</title><main><p>Body</p></main>");
}

#[test]
fn test_template_search_path_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::write(first.path().join("shared.html"), "first").unwrap();
    fs::write(second.path().join("shared.html"), "second").unwrap();
    fs::create_dir(second.path().join("layouts")).unwrap();
    fs::write(second.path().join("layouts/only.html"), "only {{ content }}").unwrap();

    let renderer = MiniJinjaRenderer::new([first.path(), second.path()]);
    let empty = RenderModel::new();

    assert_eq!(render_to_string(&renderer, &empty, "", Some("shared.html")).unwrap(), "first");
    assert_eq!(
        render_to_string(&renderer, &empty, "x", Some("layouts/only.html")).unwrap(),
        "only x"
    );
    assert_eq!(renderer.search_path().len(), 2);
}

#[test]
fn test_missing_template() {
    let temp_dir = TempDir::new().unwrap();
    let renderer = MiniJinjaRenderer::new([temp_dir.path()]);

    match render_to_string(&renderer, &RenderModel::new(), "Body", Some("missing.html")) {
        Err(Error::TemplateNotFound { template, resource }) => {
            assert_eq!(template, "missing.html");
            assert_eq!(resource, "page.md");
        }
        other => panic!("Expected TemplateNotFound, got {other:?}"),
    }
}

#[test]
fn test_broken_template_is_a_render_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.html"), "{% if %}").unwrap();
    let renderer = MiniJinjaRenderer::new([temp_dir.path()]);

    let result = render_to_string(&renderer, &RenderModel::new(), "", Some("broken.html"));
    assert!(matches!(result, Err(Error::RenderError(_))));
}

#[test]
fn test_inline_evaluation_without_template() {
    let renderer = MiniJinjaRenderer::new(Vec::<&Path>::new());
    let output = render_to_string(
        &renderer,
        &model(&[("name", json!("World"))]),
        "Hello {{ name }}",
        None,
    )
    .unwrap();
    assert_eq!(output, "Hello World");
}

#[test]
fn test_case_filters() {
    let renderer = MiniJinjaRenderer::new(Vec::<&Path>::new());
    let output = render_to_string(
        &renderer,
        &model(&[("title", json!("Getting Started"))]),
        "{{ title | kebab_case }} {{ title | snake_case }}",
        None,
    )
    .unwrap();
    assert_eq!(output, "getting-started getting_started");
}

#[test]
fn test_default_registry() {
    let temp_dir = TempDir::new().unwrap();
    let registry = RendererRegistry::with_defaults(temp_dir.path(), temp_dir.path()).unwrap();

    assert_eq!(registry.tags().collect::<Vec<_>>(), vec![MARKDOWN_RENDERER, TEMPLATE_RENDERER]);
    assert_eq!(registry.find("index.md").unwrap().0, MARKDOWN_RENDERER);
    assert_eq!(registry.find("about.j2").unwrap().0, TEMPLATE_RENDERER);
    assert!(registry.find("style.css").is_none());
    assert!(registry.get(TEMPLATE_RENDERER).is_some());
}

#[test]
fn test_custom_renderer_registration() {
    let mut registry = RendererRegistry::new();
    assert!(registry.is_empty());
    assert!(matches!(
        registry.register(" ", Box::new(ShoutRenderer)),
        Err(Error::InvalidArgument(_))
    ));

    registry.register("shout", Box::new(ShoutRenderer)).unwrap();
    assert_eq!(registry.len(), 1);

    let (tag, renderer) = registry.find("notes.txt").unwrap();
    assert_eq!(tag, "shout");
    let output = render_to_string(renderer, &RenderModel::new(), "quiet", None).unwrap();
    assert_eq!(output, "QUIET");
}
