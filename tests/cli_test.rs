use clap::Parser;
use scms::cli::Args;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("scms")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_source_and_destination() {
    let args = make_args(&["./site", "./public"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.source_dir(), PathBuf::from("./site"));
    assert_eq!(parsed.dest_dir(), PathBuf::from("./public"));
    assert!(parsed.config.is_none());
    assert!(parsed.templates.is_none());
    assert!(!parsed.verbose);
}

#[test]
fn test_destination_only_uses_current_directory() {
    let args = make_args(&["./public"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.source_dir(), std::env::current_dir().unwrap());
    assert_eq!(parsed.dest_dir(), PathBuf::from("./public"));
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--config",
        "site.json",
        "--templates",
        "layouts",
        "--verbose",
        "./site",
        "./public",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.config, Some(PathBuf::from("site.json")));
    assert_eq!(parsed.templates, Some(PathBuf::from("layouts")));
    assert!(parsed.verbose);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-c", "scms.yml", "-t", "tpl", "-v", "./public"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.config, Some(PathBuf::from("scms.yml")));
    assert_eq!(parsed.templates, Some(PathBuf::from("tpl")));
    assert!(parsed.verbose);
}

#[test]
fn test_settings_from_args() {
    let args = make_args(&["-c", "conf/scms.yml", "-t", "layouts", "./site", "./public"]);
    let settings = Args::try_parse_from(args).unwrap().settings();

    assert_eq!(settings.source_dir, PathBuf::from("./site"));
    assert_eq!(settings.dest_dir, PathBuf::from("./public"));
    assert_eq!(settings.config_file, Some(PathBuf::from("conf/scms.yml")));
    assert_eq!(settings.templates_dir, Some(PathBuf::from("layouts")));
    assert!(settings.config.is_none());
}

#[test]
fn test_missing_args() {
    let args = make_args(&[]);
    assert!(Args::try_parse_from(args).is_err());

    let args = make_args(&["-v"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./a", "./b", "./c"]);
    assert!(Args::try_parse_from(args).is_err());
}
