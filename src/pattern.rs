//! Ant-style path matching.
//!
//! Patterns are matched against `/`-separated paths relative to the source
//! directory. `?` matches one character and `*` any run of characters, neither
//! crossing a `/`; `**` as a whole segment spans any number of directories.
//! Everything else matches literally and the whole path must be consumed.

use crate::error::{Error, Result};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use log::debug;

/// Converts a path to the canonical `/`-separated form used for matching.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Rewrites characters that globset treats specially but Ant-style patterns
/// treat literally into single-character classes.
fn escape_literals(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        match ch {
            '[' => escaped.push_str("[[]"),
            ']' => escaped.push_str("[]]"),
            '{' => escaped.push_str("[{]"),
            '}' => escaped.push_str("[}]"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn compile_glob(pattern: &str, source: &str) -> Result<Glob> {
    GlobBuilder::new(&escape_literals(pattern))
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|e| Error::ConfigurationError(format!("invalid pattern '{source}': {e}")))
}

/// Compiles a pattern into the globs that together implement it.
///
/// A trailing `/**` also matches the directory named by the prefix, so
/// `drafts/**` covers `drafts` itself as well as everything below it.
fn build_globs(pattern: &str) -> Result<Vec<Glob>> {
    let normalized = normalize_path(pattern);
    if normalized.is_empty() {
        return Err(Error::ConfigurationError("empty pattern".to_string()));
    }

    let mut globs = vec![compile_glob(&normalized, pattern)?];
    if let Some(prefix) = normalized.strip_suffix("/**") {
        if !prefix.is_empty() {
            globs.push(compile_glob(prefix, pattern)?);
        }
    }
    Ok(globs)
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    matchers: Vec<GlobMatcher>,
}

impl PathPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    /// * `Error::ConfigurationError` if the pattern is empty or cannot be compiled
    pub fn new(pattern: &str) -> Result<Self> {
        let matchers = build_globs(pattern)?.iter().map(Glob::compile_matcher).collect();
        Ok(Self { pattern: pattern.to_string(), matchers })
    }

    /// The pattern as it was written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the whole of `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.matchers.iter().any(|m| m.is_match(&path))
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Returns true if `path` matches `pattern`.
///
/// An invalid pattern matches nothing.
pub fn matches(pattern: &str, path: &str) -> bool {
    match PathPattern::new(pattern) {
        Ok(compiled) => compiled.matches(path),
        Err(e) => {
            debug!("{e}");
            false
        }
    }
}

/// A group of patterns checked in one pass, used for excludes.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PatternSet {
    /// Compiles every pattern into a single set.
    ///
    /// # Errors
    /// * `Error::ConfigurationError` naming the first pattern that fails to compile
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut sources = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            for glob in build_globs(pattern)? {
                builder.add(glob);
            }
            sources.push(pattern.to_string());
        }
        let set = builder.build().map_err(|e| {
            Error::ConfigurationError(format!("failed to build pattern set: {e}"))
        })?;

        Ok(Self { patterns: sources, set })
    }

    /// An empty set that matches nothing.
    pub fn empty() -> Self {
        Self { patterns: Vec::new(), set: GlobSet::empty() }
    }

    /// Returns true if any pattern of the set matches `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.set.is_match(normalize_path(path))
    }

    /// The patterns of the set as written, in order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the set holds no pattern.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}
