//! Configuration handling for scms.
//! Loads the site configuration from YAML or JSON and validates it once into
//! typed pattern rules, so the rest of the pipeline never inspects raw values.

use crate::constants::{CONFIG_FILES, DEFAULT_DEST_EXTENSION};
use crate::error::{Error, Result};
use crate::model::RenderModel;
use crate::pattern::{PathPattern, PatternSet};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration document as written, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    patterns: Option<IndexMap<String, Option<RawPatternRule>>>,
    model: Option<RenderModel>,
    excludes: Option<Vec<String>>,
    default_excludes_enabled: Option<bool>,
    templates_dir: Option<PathBuf>,
    #[serde(flatten)]
    unknown: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPatternRule {
    template: Option<String>,
    model: Option<RenderModel>,
    dest_file_extension: Option<String>,
    #[serde(flatten)]
    unknown: IndexMap<String, serde_json::Value>,
}

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, anything else is read as YAML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// A pattern together with what to do with the files it matches.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: PathPattern,
    template: String,
    dest_file_extension: Option<String>,
    model: RenderModel,
}

impl PatternRule {
    /// Creates a rule rendering files matching `pattern` through `template`.
    ///
    /// # Errors
    /// * `Error::ConfigurationError` if the pattern is invalid or the template is blank
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let template = template.trim();
        if template.is_empty() {
            return Err(missing_template(pattern));
        }
        Ok(Self {
            pattern: PathPattern::new(pattern)?,
            template: template.to_string(),
            dest_file_extension: None,
            model: RenderModel::new(),
        })
    }

    pub fn with_model(mut self, model: RenderModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the extension of rendered files; a missing leading dot is added.
    ///
    /// # Errors
    /// * `Error::ConfigurationError` if the extension is blank
    pub fn with_dest_file_extension(mut self, extension: &str) -> Result<Self> {
        let extension = extension.trim();
        if extension.is_empty() || extension == "." {
            return Err(Error::ConfigurationError(format!(
                "'destFileExtension' for pattern '{}' cannot be empty",
                self.pattern
            )));
        }
        self.dest_file_extension = Some(if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{extension}")
        });
        Ok(self)
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    /// Extension of rendered files, `.html` unless the rule overrides it.
    pub fn dest_file_extension(&self) -> &str {
        self.dest_file_extension.as_deref().unwrap_or(DEFAULT_DEST_EXTENSION)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }
}

fn missing_template(pattern: &str) -> Error {
    Error::ConfigurationError(format!(
        "Required 'template' value is missing for pattern '{pattern}'"
    ))
}

/// Validated site configuration, immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Rules in declaration order; the first matching rule wins.
    pub patterns: Vec<PatternRule>,
    /// Global model shared by every rendered file.
    pub model: RenderModel,
    pub excludes: PatternSet,
    pub default_excludes_enabled: bool,
    /// Templates directory, relative to the source directory unless absolute.
    pub templates_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            model: RenderModel::new(),
            excludes: PatternSet::empty(),
            default_excludes_enabled: true,
            templates_dir: None,
        }
    }
}

impl Config {
    /// The first rule, in declaration order, whose pattern matches `path`.
    pub fn find_rule(&self, path: &str) -> Option<&PatternRule> {
        self.patterns.iter().find(|rule| rule.matches(path))
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        warn_unknown_keys("configuration", &raw.unknown);

        let mut patterns = Vec::new();
        for (pattern, rule) in raw.patterns.unwrap_or_default() {
            let Some(rule) = rule else {
                return Err(missing_template(&pattern));
            };
            warn_unknown_keys(&format!("pattern '{pattern}'"), &rule.unknown);

            let template = rule.template.ok_or_else(|| missing_template(&pattern))?;
            let mut compiled =
                PatternRule::new(&pattern, &template)?.with_model(rule.model.unwrap_or_default());
            if let Some(extension) = rule.dest_file_extension {
                compiled = compiled.with_dest_file_extension(&extension)?;
            }
            debug!("Loaded pattern '{}' -> '{}'", pattern, compiled.template());
            patterns.push(compiled);
        }

        Ok(Self {
            patterns,
            model: raw.model.unwrap_or_default(),
            excludes: PatternSet::new(raw.excludes.unwrap_or_default())?,
            default_excludes_enabled: raw.default_excludes_enabled.unwrap_or(true),
            templates_dir: raw.templates_dir,
        })
    }
}

fn warn_unknown_keys(scope: &str, unknown: &IndexMap<String, serde_json::Value>) {
    for key in unknown.keys() {
        warn!("Ignoring unrecognized key '{key}' in {scope}");
    }
}

/// Parses and validates configuration content.
///
/// # Errors
/// * `Error::ConfigurationError` if the content is malformed, a key has the
///   wrong shape, a pattern is invalid, or a rule has no template
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    let raw: RawConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| {
            Error::ConfigurationError(format!("Invalid configuration format: {e}"))
        })?,
        ConfigFormat::Yaml if content.trim().is_empty() => return Ok(Config::default()),
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
            Error::ConfigurationError(format!("Invalid configuration format: {e}"))
        })?,
    };
    Config::from_raw(raw)
}

/// Finds the configuration file in `source_dir`, trying [`CONFIG_FILES`] in order.
///
/// # Errors
/// * `Error::ConfigurationError` if none of them exists
pub fn find_config_file<P: AsRef<Path>>(source_dir: P) -> Result<PathBuf> {
    for file in CONFIG_FILES {
        let config_path = source_dir.as_ref().join(file);
        if config_path.exists() {
            return Ok(config_path);
        }
    }

    Err(Error::ConfigurationError(format!(
        "Configuration file not found in '{}' (tried: {}). Create one or pass its location explicitly",
        source_dir.as_ref().display(),
        CONFIG_FILES.join(", ")
    )))
}

/// Reads and validates the configuration file at `path`.
///
/// # Errors
/// * `Error::ConfigurationError` if the path is missing, is a directory, or the
///   content is invalid
/// * `Error::IoError` if the file cannot be read
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::ConfigurationError(format!(
            "Configuration file '{}' not found",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(Error::ConfigurationError(format!(
            "Expected configuration file '{}' is a directory, not a file",
            path.display()
        )));
    }

    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_config(&content, ConfigFormat::from_path(path)).map_err(|e| match e {
        Error::ConfigurationError(message) => {
            Error::ConfigurationError(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}
