//! Normalization and validation rules shared by every provider grammar

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ASCII whitespace runs, single quotes and semicolons never survive into a stored PID.
    // Unicode spaces such as NBSP are kept.
    static ref STRIP_PATTERN: Regex = Regex::new(r"(?-u:\s)+|'|;").unwrap();
}

/// Every DOI authority (registrant prefix) starts with this
pub const DOI_AUTHORITY_PREFIX: &str = "10.";

/// Remove whitespace, single quotes and semicolons from an identifier part
pub fn format_identifier_string(s: Option<&str>) -> Option<String> {
    s.map(|s| STRIP_PATTERN.replace_all(s, "").into_owned())
}

/// Check for an embedded NUL character.
///
/// A NUL in the first position is not reported. Stored identifiers were
/// validated this way historically, so the leading position stays exempt.
pub fn test_for_null_terminator(s: Option<&str>) -> bool {
    match s {
        Some(s) => s.find('\0').is_some_and(|index| index > 0),
        None => false,
    }
}

/// True when `s` is already in normalized form
pub fn is_normalized(s: &str) -> bool {
    !STRIP_PATTERN.is_match(s)
}

/// Validate a protocol/authority/identifier triple
pub fn is_valid_global_id(
    protocol: Option<&str>,
    authority: Option<&str>,
    identifier: Option<&str>,
) -> bool {
    let (Some(_), Some(authority), Some(identifier)) = (protocol, authority, identifier) else {
        return false;
    };

    for part in [authority, identifier] {
        if !is_normalized(part) || test_for_null_terminator(Some(part)) {
            return false;
        }
    }

    true
}

/// Check that a DOI authority carries the `10.` directory indicator
pub fn check_doi_authority(doi_authority: Option<&str>) -> bool {
    doi_authority.is_some_and(|a| a.starts_with(DOI_AUTHORITY_PREFIX))
}
