//! Core pipeline orchestration.
//! Walks the source tree depth-first and, for every entry, mirrors directories,
//! renders files through the first matching pattern rule, or copies them verbatim.

use log::{debug, info, warn};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    config::{find_config_file, load_config, Config, PatternRule},
    constants::{DEFAULT_EXCLUDES, DEFAULT_TEMPLATES_DIR, MARKUP_EXTENSIONS},
    error::{Error, Result},
    metadata::strip_metadata,
    model::{compose, relative_root, RenderModel},
    pattern::PatternSet,
    renderer::{RenderRequest, Renderer, RendererRegistry, Resource, TEMPLATE_RENDERER},
};

/// Inputs needed to set up a pipeline run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Configuration file; looked up in the source directory when absent.
    pub config_file: Option<PathBuf>,
    /// Already parsed configuration, used instead of reading a file.
    pub config: Option<Config>,
    /// Overrides the templates directory of the configuration.
    pub templates_dir: Option<PathBuf>,
}

impl Settings {
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(source_dir: S, dest_dir: D) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            config_file: None,
            config: None,
            templates_dir: None,
        }
    }

    pub fn with_config_file<P: Into<PathBuf>>(mut self, config_file: P) -> Self {
        self.config_file = Some(config_file.into());
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_templates_dir<P: Into<PathBuf>>(mut self, templates_dir: P) -> Self {
        self.templates_dir = Some(templates_dir.into());
        self
    }
}

/// Everything one run needs, built once and shared read-only by every step.
pub struct PipelineContext {
    source_dir: PathBuf,
    dest_dir: PathBuf,
    templates_dir: PathBuf,
    config_file: Option<PathBuf>,
    config: Config,
    renderers: RendererRegistry,
    default_excludes: PatternSet,
}

impl PipelineContext {
    /// Validates the directories, loads the configuration and creates the renderers.
    ///
    /// The source/destination layout is checked before anything is created.
    ///
    /// # Errors
    /// * `Error::ConfigurationError` if the source directory is missing, the
    ///   destination equals, contains or lies inside the source, a path expected
    ///   to be a directory is a file, or the configuration is invalid
    /// * `Error::IoError` if a directory cannot be created or resolved
    pub fn init(settings: Settings) -> Result<Self> {
        let source_dir = resolve_source_dir(&settings.source_dir)?;
        let dest_dir = resolve_path(&settings.dest_dir)?;
        check_layout(&source_dir, &dest_dir)?;

        ensure_directory(&dest_dir)?;
        let dest_dir = fs::canonicalize(&dest_dir).map_err(|e| Error::io(&dest_dir, e))?;

        let (config, config_file) = match (settings.config, settings.config_file) {
            (Some(config), file) => (config, file),
            (None, Some(file)) => (load_config(&file)?, Some(file)),
            (None, None) => {
                let file = find_config_file(&source_dir)?;
                (load_config(&file)?, Some(file))
            }
        };
        let config_file = config_file.map(|file| fs::canonicalize(&file).unwrap_or(file));

        let templates_dir = match (settings.templates_dir, &config.templates_dir) {
            (Some(dir), _) => resolve_path(&dir)?,
            (None, Some(dir)) => resolve_path(&source_dir.join(dir))?,
            (None, None) => source_dir.join(DEFAULT_TEMPLATES_DIR),
        };
        if !templates_dir.is_dir() {
            warn!("Templates directory '{}' does not exist", templates_dir.display());
        }

        let renderers = RendererRegistry::with_defaults(&source_dir, &templates_dir)?;
        let default_excludes = PatternSet::new(DEFAULT_EXCLUDES)?;

        Ok(Self {
            source_dir,
            dest_dir,
            templates_dir,
            config_file,
            config,
            renderers,
            default_excludes,
        })
    }

    /// Adds or replaces a renderer before the run starts.
    pub fn register_renderer<S: Into<String>>(
        &mut self,
        tag: S,
        renderer: Box<dyn Renderer>,
    ) -> Result<()> {
        self.renderers.register(tag, renderer)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    /// Path of `path` relative to the source directory, `/`-separated.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` if `path` is not inside the source directory
    pub fn relative_path(&self, path: &Path) -> Result<String> {
        let relative = path.strip_prefix(&self.source_dir).map_err(|_| {
            Error::InvalidArgument(format!(
                "'{}' is not inside the source directory '{}'",
                path.display(),
                self.source_dir.display()
            ))
        })?;
        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Decides whether an entry of the source tree takes part in the run.
    ///
    /// The destination tree is always skipped. With default excludes enabled the
    /// configuration file, the templates directory and version-control clutter
    /// are skipped too. Configured excludes apply in every case.
    pub fn is_included(&self, path: &Path) -> bool {
        if path.starts_with(&self.dest_dir) {
            debug!("Skipping destination path '{}'", path.display());
            return false;
        }

        let Ok(relative) = self.relative_path(path) else {
            return false;
        };

        if self.config.default_excludes_enabled {
            if self.config_file.as_deref() == Some(path) {
                debug!("Skipping configuration file '{relative}'");
                return false;
            }
            if self.templates_dir != self.source_dir && path.starts_with(&self.templates_dir) {
                debug!("Skipping templates directory entry '{relative}'");
                return false;
            }
            if self.default_excludes.is_match(&relative) {
                debug!("Skipping '{relative}' matched by default excludes");
                return false;
            }
        }

        if self.config.excludes.is_match(&relative) {
            debug!("Skipping '{relative}' matched by excludes");
            return false;
        }

        true
    }
}

/// What happened to one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A directory was mirrored into the destination.
    Directory { target: PathBuf },
    /// A file was rendered, and possibly also copied verbatim.
    Rendered { target: PathBuf, template: String, raw_copy: Option<PathBuf> },
    /// A file matched no rule and was copied verbatim.
    Copied { target: PathBuf },
}

/// Counts of a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub directories: usize,
    pub rendered: usize,
    pub copied: usize,
}

impl Summary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Directory { .. } => self.directories += 1,
            Outcome::Rendered { raw_copy, .. } => {
                self.rendered += 1;
                if raw_copy.is_some() {
                    self.copied += 1;
                }
            }
            Outcome::Copied { .. } => self.copied += 1,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rendered, {} copied, {} directories",
            self.rendered, self.copied, self.directories
        )
    }
}

/// Walks the source tree of a [`PipelineContext`] and dispatches every entry.
pub struct Processor<'a> {
    ctx: &'a PipelineContext,
}

impl<'a> Processor<'a> {
    pub fn new(ctx: &'a PipelineContext) -> Self {
        Self { ctx }
    }

    /// Processes the whole source tree.
    ///
    /// Symbolic links are followed, so a linked directory is mirrored like a
    /// real one. Stops at the first error; whatever was written so far stays in place.
    pub fn run(&self) -> Result<Summary> {
        info!(
            "Processing '{}' into '{}'",
            self.ctx.source_dir.display(),
            self.ctx.dest_dir.display()
        );

        let mut summary = Summary::default();
        let walker = WalkDir::new(&self.ctx.source_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.ctx.is_included(entry.path()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                Error::IoError { path, source: e.into() }
            })?;
            let outcome = self.process(entry.path(), entry.file_type().is_dir())?;
            summary.record(&outcome);
        }

        info!("Finished: {summary}");
        Ok(summary)
    }

    /// Processes one included entry of the source tree.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` if `path` is outside the source directory
    /// * any error of rendering, copying or creating directories
    pub fn process(&self, path: &Path, is_dir: bool) -> Result<Outcome> {
        let relative = self.ctx.relative_path(path)?;

        if is_dir {
            let target = self.ctx.dest_dir.join(&relative);
            ensure_directory(&target)?;
            debug!("Created directory '{}'", target.display());
            return Ok(Outcome::Directory { target });
        }

        match self.ctx.config.find_rule(&relative) {
            Some(rule) => self.render(path, &relative, rule),
            None => {
                let target = self.ctx.dest_dir.join(&relative);
                copy_file(path, &target)?;
                debug!("Copied '{relative}' to '{}'", target.display());
                Ok(Outcome::Copied { target })
            }
        }
    }

    fn render(&self, path: &Path, relative: &str, rule: &PatternRule) -> Result<Outcome> {
        let dest_relative = apply_extension(relative, rule.dest_file_extension());
        let target = self.ctx.dest_dir.join(&dest_relative);
        debug!(
            "Rendering '{relative}' with template '{}' (pattern '{}') to '{}'",
            rule.template(),
            rule.pattern(),
            target.display()
        );

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut extracted = RenderModel::new();
        let body = if is_markup(relative) {
            content
        } else {
            strip_metadata(&content, &mut extracted)
        };

        let model = compose(
            &relative_root(&dest_relative),
            &self.ctx.config.model,
            rule.model(),
            &extracted,
        );
        let body = self.convert(relative, body, &model)?;

        let merger = self.ctx.renderers.get(TEMPLATE_RENDERER).ok_or_else(|| {
            Error::ConfigurationError(format!("no '{TEMPLATE_RENDERER}' renderer registered"))
        })?;
        let mut writer = create_file(&target)?;
        merger.render(RenderRequest {
            model: &model,
            resource: Resource::from_text(relative, &body),
            template: Some(rule.template()),
            destination: &mut writer,
        })?;
        writer.flush().map_err(|e| Error::io(&target, e))?;

        let raw_copy = if self.ctx.config.default_excludes_enabled {
            None
        } else {
            let raw = self.ctx.dest_dir.join(relative);
            if raw == target {
                warn!("Not copying raw '{relative}' over its own rendered output");
                None
            } else {
                copy_file(path, &raw)?;
                debug!("Copied raw '{relative}' to '{}'", raw.display());
                Some(raw)
            }
        };

        Ok(Outcome::Rendered { target, template: rule.template().to_string(), raw_copy })
    }

    /// Runs the body through the first renderer supporting the file name, if any.
    fn convert(&self, relative: &str, body: String, model: &RenderModel) -> Result<String> {
        let filename = relative.rsplit('/').next().unwrap_or(relative);
        let Some((tag, renderer)) = self.ctx.renderers.find(filename) else {
            return Ok(body);
        };

        debug!("Converting '{relative}' with the '{tag}' renderer");
        let mut output = Vec::new();
        renderer.render(RenderRequest {
            model,
            resource: Resource::from_text(relative, &body),
            template: None,
            destination: &mut output,
        })?;
        String::from_utf8(output)
            .map_err(|e| Error::RenderError(format!("'{relative}' produced invalid UTF-8: {e}")))
    }
}

/// Sets up and runs a whole pipeline.
pub fn process_site(settings: Settings) -> Result<Summary> {
    let ctx = PipelineContext::init(settings)?;
    Processor::new(&ctx).run()
}

/// Replaces the extension of the file name in `path` with `extension`; names
/// without one (or dot-files) get it appended.
pub fn apply_extension(path: &str, extension: &str) -> String {
    let (dir, name) = match path.rfind('/') {
        Some(index) => path.split_at(index + 1),
        None => ("", path),
    };
    let stem = match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    };
    format!("{dir}{stem}{extension}")
}

/// Returns true for files that are already markup and carry no front matter.
pub fn is_markup(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(index) if index > 0 => {
            let extension = &name[index + 1..];
            MARKUP_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(extension))
        }
        _ => false,
    }
}

fn resolve_source_dir(source_dir: &Path) -> Result<PathBuf> {
    if !source_dir.exists() {
        return Err(Error::ConfigurationError(format!(
            "Source directory '{}' does not exist",
            source_dir.display()
        )));
    }
    if !source_dir.is_dir() {
        return Err(Error::ConfigurationError(format!(
            "Specified source '{}' is not a directory",
            source_dir.display()
        )));
    }
    fs::canonicalize(source_dir).map_err(|e| Error::io(source_dir, e))
}

/// Makes `path` absolute, resolving symlinks of its longest existing ancestor so
/// that paths which do not exist yet compare correctly with canonical ones.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_err(|e| Error::io(path, e))?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.components().next_back()) {
            (Some(parent), Some(Component::Normal(name))) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }

    let mut resolved = fs::canonicalize(existing).map_err(|e| Error::io(existing, e))?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

fn check_layout(source_dir: &Path, dest_dir: &Path) -> Result<()> {
    if source_dir == dest_dir {
        return Err(Error::ConfigurationError(
            "Source directory and destination directory cannot be the same".to_string(),
        ));
    }
    if dest_dir.starts_with(source_dir) {
        return Err(Error::ConfigurationError(format!(
            "Destination directory '{}' cannot be inside the source directory '{}'",
            dest_dir.display(),
            source_dir.display()
        )));
    }
    if source_dir.starts_with(dest_dir) {
        return Err(Error::ConfigurationError(format!(
            "Source directory '{}' cannot be inside the destination directory '{}'",
            source_dir.display(),
            dest_dir.display()
        )));
    }
    Ok(())
}

/// Creates `path` as a directory unless it already is one.
fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::ConfigurationError(format!(
                "Specified file '{}' is not a directory",
                path.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Makes sure `path` can be written as a file, creating its parent directories.
fn prepare_file(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(Error::ConfigurationError(format!(
            "File '{}' was expected to be a file, not a directory",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    Ok(())
}

fn create_file(path: &Path) -> Result<BufWriter<fs::File>> {
    prepare_file(path)?;
    let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    Ok(BufWriter::new(file))
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    prepare_file(dest)?;
    fs::copy(source, dest).map(|_| ()).map_err(|e| Error::io(dest, e))
}
