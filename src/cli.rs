//! Command-line interface implementation for scms.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::{Path, PathBuf};

use crate::processor::Settings;

/// Command-line arguments structure for scms.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "scms: renders a source tree into a static website",
    long_about = "Ingests content files in [SOURCE_DIR] and renders a static website into DEST_DIR.\n\
                  If unspecified, SOURCE_DIR defaults to the current working directory. \
                  DEST_DIR is required and cannot be the same as, or inside, the source directory."
)]
pub struct Args {
    /// [SOURCE_DIR] DEST_DIR
    #[arg(value_name = "DIRS", num_args = 1..=2, required = true)]
    pub dirs: Vec<PathBuf>,

    /// Configuration file. Defaults to scms.yml, scms.yaml or scms.json in the source directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the templates. Defaults to <SOURCE_DIR>/templates
    #[arg(short, long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Source directory: the first of two positional paths, else the current directory.
    pub fn source_dir(&self) -> PathBuf {
        match self.dirs.as_slice() {
            [source, _] => expand_home(source),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Destination directory: always the last positional path.
    pub fn dest_dir(&self) -> PathBuf {
        self.dirs.last().map(|dir| expand_home(dir)).unwrap_or_default()
    }

    /// Pipeline settings described by these arguments.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::new(self.source_dir(), self.dest_dir());
        if let Some(config) = &self.config {
            settings = settings.with_config_file(expand_home(config));
        }
        if let Some(templates) = &self.templates {
            settings = settings.with_templates_dir(expand_home(templates));
        }
        settings
    }
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    let rest = text.strip_prefix("~/").or_else(|| text.strip_prefix("~\\"));
    match (rest, std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        let path = PathBuf::from("site/output");
        assert_eq!(expand_home(&path), path);
        let path = PathBuf::from("/abs/~/x");
        assert_eq!(expand_home(&path), path);
    }
}
