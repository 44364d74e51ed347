//! scms is a pattern-driven static site processor.
//! It walks a source tree and, for every file, either renders it through a
//! template after extracting its front matter, or copies it verbatim into a
//! mirrored destination tree.

/// Command-line interface module for the scms binary
pub mod cli;

/// Site configuration: pattern rules, global model and excludes.
/// Supports YAML and JSON formats (scms.yml, scms.yaml, scms.json)
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling
pub mod error;

/// Logger setup for the binary
pub mod logger;

/// Front matter extraction
pub mod metadata;

/// Rendering model composition
pub mod model;

/// Ant-style path patterns used for rule selection and excludes
pub mod pattern;

/// Core pipeline orchestration
/// Walks the source tree and dispatches every entry
pub mod processor;

/// Renderer abstraction and the built-in Markdown and template renderers
pub mod renderer;
