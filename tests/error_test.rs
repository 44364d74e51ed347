use std::error::Error as _;
use std::io;

use scms::error::Error;

#[test]
fn test_io_helper_keeps_path_and_source() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err = Error::io("site/index.md", io_err);

    match &err {
        Error::IoError { path, source } => {
            assert_eq!(path, "site/index.md");
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        _ => panic!("Expected IoError variant"),
    }
    assert_eq!(err.to_string(), "IO error on 'site/index.md': file not found.");
    assert_eq!(err.source().unwrap().to_string(), "file not found");
}

#[test]
fn test_error_display() {
    let err = Error::ConfigurationError("bad pattern".to_string());
    assert_eq!(err.to_string(), "Configuration error: bad pattern.");

    let err = Error::TemplateNotFound {
        template: "page.html".to_string(),
        resource: "docs/index.md".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Template 'page.html' not found while rendering 'docs/index.md'."
    );

    let err = Error::RenderError("unexpected end of input".to_string());
    assert_eq!(err.to_string(), "Render error: unexpected end of input.");

    let err = Error::InvalidArgument("blank tag".to_string());
    assert_eq!(err.to_string(), "Invalid argument: blank tag.");
}

#[test]
fn test_errors_without_cause() {
    let err = Error::RenderError("broken".to_string());
    assert!(err.source().is_none());
}
