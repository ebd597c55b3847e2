//! Formatting, validation and generic parsing integration tests

use pid_core::{
    check_doi_authority, format_identifier_string, is_valid_global_id, parse,
    test_for_null_terminator, GlobalId,
};
use proptest::prelude::*;
use rstest::rstest;

// === Formatting ===

#[rstest]
#[case("FK2/BYM3IW", "FK2/BYM3IW")]
#[case(" FK2/BYM3IW ", "FK2/BYM3IW")]
#[case("FK2 /\tBYM\n3IW", "FK2/BYM3IW")]
#[case("it's", "its")]
#[case("a;b;c", "abc")]
#[case("", "")]
#[case("A\u{00A0}B", "A\u{00A0}B")]
#[case("A\u{000B}B", "AB")]
fn test_format_identifier_string(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(
        format_identifier_string(Some(input)),
        Some(expected.to_string())
    );
}

#[test]
fn test_format_none_is_none() {
    assert_eq!(format_identifier_string(None), None);
}

// === Null terminators ===

#[rstest]
#[case("abc", false)]
#[case("abc\0", true)]
#[case("a\0bc", true)]
#[case("\0abc", false)] // Leading NUL is not reported
fn test_null_terminator(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(test_for_null_terminator(Some(input)), expected);
}

// === Validation ===

#[rstest]
#[case(Some("doi"), Some("10.5072"), Some("FK2/BYM3IW"), true)]
#[case(Some("hdl"), Some("1902.1"), Some("111012"), true)]
#[case(None, Some("10.5072"), Some("FK2"), false)]
#[case(Some("doi"), None, Some("FK2"), false)]
#[case(Some("doi"), Some("10.5072"), None, false)]
#[case(Some("doi"), Some("10.5072 "), Some("FK2"), false)]
#[case(Some("doi"), Some("10.5072"), Some("FK'2"), false)]
#[case(Some("doi"), Some("10.5072"), Some("FK2;"), false)]
#[case(Some("doi"), Some("10.5\0072"), Some("FK2"), false)]
#[case(Some("doi"), Some("10.5072"), Some("FK2\0"), false)]
#[case(Some("doi"), Some("10.5072"), Some("A\u{00A0}B"), true)]
fn test_is_valid_global_id(
    #[case] protocol: Option<&str>,
    #[case] authority: Option<&str>,
    #[case] identifier: Option<&str>,
    #[case] expected: bool,
) {
    assert_eq!(is_valid_global_id(protocol, authority, identifier), expected);
}

#[rstest]
#[case(Some("10.5072"), true)]
#[case(Some("10."), true)]
#[case(Some("20.5072"), false)]
#[case(Some("1902.1"), false)]
#[case(None, false)]
fn test_check_doi_authority(#[case] authority: Option<&str>, #[case] expected: bool) {
    assert_eq!(check_doi_authority(authority), expected);
}

// === Generic parsing ===

#[rstest]
#[case("doi:10.5072/FK2/BYM3IW", "doi", "10.5072", "FK2/BYM3IW")]
#[case("hdl:1902.1/111012", "hdl", "1902.1", "111012")]
#[case("https://doi.org/10.5072/FK2/BYM3IW", "doi", "10.5072", "FK2/BYM3IW")]
#[case("http://dx.doi.org/10.5072/FK2/BYM3IW", "doi", "10.5072", "FK2/BYM3IW")]
#[case("https://hdl.handle.net/1902.1/111012", "hdl", "1902.1", "111012")]
fn test_parse_examples(
    #[case] raw: &str,
    #[case] protocol: &str,
    #[case] authority: &str,
    #[case] identifier: &str,
) {
    let id = parse(raw).unwrap();
    assert_eq!(id.protocol(), protocol);
    assert_eq!(id.authority(), authority);
    assert_eq!(id.identifier(), identifier);
}

#[rstest]
#[case("")]
#[case("doi:")]
#[case(":10.5072/FK2")]
#[case("doi:10.5072")]
#[case("doi:/FK2")]
#[case("doi:11.5072/FK2")]
#[case("ark:/13030/tf5p30086k")]
#[case("doi:10.5072/FK2 BYM3IW")]
fn test_parse_rejects(#[case] raw: &str) {
    assert!(parse(raw).is_none(), "expected '{}' to be rejected", raw);
}

#[test]
fn test_parse_then_render() {
    let id = parse("hdl:1902.1/111012").unwrap();
    assert_eq!(id.as_string(), "hdl:1902.1/111012");
    assert_eq!(id.to_url(), "https://hdl.handle.net/1902.1/111012");
}

// === Property-Based Tests ===

proptest! {
    #[test]
    fn test_format_is_idempotent(s in "\\PC*") {
        let once = format_identifier_string(Some(s.as_str())).unwrap();
        let twice = format_identifier_string(Some(once.as_str())).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_strings_are_fixed_points(s in "[A-Za-z0-9./_:-]{0,40}") {
        prop_assert_eq!(format_identifier_string(Some(s.as_str())), Some(s.clone()));
    }

    #[test]
    fn test_formatted_parts_validate(
        authority in "[ A-Za-z0-9.';]{1,20}",
        identifier in "[ A-Za-z0-9/';]{1,20}"
    ) {
        let authority = format_identifier_string(Some(authority.as_str())).unwrap();
        let identifier = format_identifier_string(Some(identifier.as_str())).unwrap();
        prop_assert!(is_valid_global_id(Some("perma"), Some(authority.as_str()), Some(identifier.as_str())));
        prop_assert!(GlobalId::new("perma", authority, identifier, "/", "", "").is_some());
    }

    #[test]
    fn test_dirty_parts_never_validate(
        clean in "[A-Za-z0-9]{1,10}",
        dirt in prop::sample::select(vec![" ", "\t", "'", ";"])
    ) {
        let dirty = format!("{}{}{}", clean, dirt, clean);
        prop_assert!(!is_valid_global_id(Some("doi"), Some(dirty.as_str()), Some("X")));
        prop_assert!(!is_valid_global_id(Some("doi"), Some("10.1"), Some(dirty.as_str())));
    }
}
