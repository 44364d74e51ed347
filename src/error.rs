//! Error handling for scms.
//! Defines the error kinds raised while configuring and running the pipeline.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors that can abort a pipeline run.
///
/// None of them are retried: the pipeline assumes a local, reliable filesystem
/// and fails fast, naming the offending path, pattern or template.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing configuration, or a directory layout the pipeline
    /// cannot work with (source equals destination, file where a directory is expected).
    #[error("Configuration error: {0}.")]
    ConfigurationError(String),

    /// A renderer could not resolve the template it was asked to merge.
    #[error("Template '{template}' not found while rendering '{resource}'.")]
    TemplateNotFound { template: String, resource: String },

    /// A renderer engine failed for a reason other than a missing template.
    #[error("Render error: {0}.")]
    RenderError(String),

    /// Filesystem read, write or create failure.
    #[error("IO error on '{path}': {source}.")]
    IoError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Caller misuse of a library operation.
    #[error("Invalid argument: {0}.")]
    InvalidArgument(String),
}

impl Error {
    /// Wraps an `io::Error` together with the path it happened on.
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::IoError { path: path.as_ref().display().to_string(), source }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1.
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
