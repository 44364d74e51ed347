//! Common constants used throughout scms.

/// Configuration file names looked up in the source directory, in order.
pub const CONFIG_FILES: [&str; 3] = ["scms.yml", "scms.yaml", "scms.json"];

/// Directory (relative to the source directory) searched for templates when
/// neither the command line nor the configuration names one.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Extension given to rendered files when a rule does not set `destFileExtension`.
pub const DEFAULT_DEST_EXTENSION: &str = ".html";

/// Extensions of files that are already markup and never carry front matter.
pub const MARKUP_EXTENSIONS: [&str; 4] = ["html", "htm", "xhtml", "xml"];

/// Patterns skipped while default excludes are enabled.
pub const DEFAULT_EXCLUDES: [&str; 14] = [
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/.DS_Store",
    "**/.git/**",
    "**/.gitignore",
    "**/.gitattributes",
    "**/.gitmodules",
    "**/.svn/**",
    "**/.hg/**",
    "**/CVS/**",
    "**/.bzr/**",
];
