use scms::pattern::{matches, PathPattern, PatternSet};

#[test]
fn test_recursive_wildcard_crosses_directories() {
    assert!(matches("**/*.ext", "a/b/c.ext"));
    assert!(matches("**/*.ext", "c.ext"));
    assert!(matches("docs/**/*.md", "docs/x.md"));
    assert!(matches("docs/**/*.md", "docs/a/b/x.md"));
    assert!(!matches("docs/**/*.md", "other/x.md"));
    assert!(matches("**", "any/depth/file.txt"));
}

#[test]
fn test_single_wildcard_stays_in_segment() {
    assert!(!matches("*.ext", "a/c.ext"));
    assert!(matches("*.ext", "c.ext"));
    assert!(matches("a/*.md", "a/x.md"));
    assert!(!matches("a/*.md", "a/b/x.md"));
}

#[test]
fn test_question_mark_matches_one_character() {
    assert!(matches("a/?.md", "a/x.md"));
    assert!(!matches("a/?.md", "a/xy.md"));
    assert!(!matches("a?b", "a/b"));
}

#[test]
fn test_match_is_total() {
    assert!(!matches("docs", "docs/x.md"));
    assert!(!matches("docs/x", "docs/x.md"));
    assert!(!matches("x.md", "docs/x.md"));
    assert!(matches("docs/x.md", "docs/x.md"));
}

#[test]
fn test_matching_is_case_sensitive() {
    assert!(!matches("*.MD", "readme.md"));
    assert!(matches("*.md", "readme.md"));
}

#[test]
fn test_brackets_and_braces_are_literal() {
    assert!(matches("page[1].md", "page[1].md"));
    assert!(!matches("page[1].md", "page1.md"));
    assert!(matches("{a,b}.txt", "{a,b}.txt"));
    assert!(!matches("{a,b}.txt", "a.txt"));
}

#[test]
fn test_backslashes_are_normalized() {
    assert!(matches("docs/*.md", "docs\\x.md"));
    assert!(matches("docs\\*.md", "docs/x.md"));
}

#[test]
fn test_trailing_recursive_wildcard_matches_directory() {
    assert!(matches("drafts/**", "drafts"));
    assert!(matches("drafts/**", "drafts/a/b.md"));
    assert!(!matches("drafts/**", "draftsx"));
    assert!(!matches("drafts/**", "other/drafts"));
}

#[test]
fn test_path_pattern_keeps_source() {
    let pattern = PathPattern::new("**/*.md").unwrap();
    assert_eq!(pattern.as_str(), "**/*.md");
    assert_eq!(pattern.to_string(), "**/*.md");
    assert!(pattern.matches("a/b.md"));
}

#[test]
fn test_empty_pattern_is_rejected() {
    assert!(PathPattern::new("").is_err());
    assert!(!matches("", "a"));
}

#[test]
fn test_pattern_set() {
    let set = PatternSet::new(["*.tmp", "drafts/**"]).unwrap();
    assert_eq!(set.patterns().len(), 2);
    assert!(set.is_match("x.tmp"));
    assert!(!set.is_match("a/x.tmp"));
    assert!(set.is_match("drafts"));
    assert!(set.is_match("drafts/wip.md"));
    assert!(!set.is_match("index.md"));

    let empty = PatternSet::empty();
    assert!(empty.is_empty());
    assert!(!empty.is_match("anything"));
}
