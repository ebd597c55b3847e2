//! Generic PID grammar: `protocol:authority<separator>identifier`
//!
//! Provider grammars build on these splitting helpers. [`parse`] is the
//! provider-independent fallback that understands DOIs and Handles in their
//! bare and resolver-URL forms.

use crate::format::check_doi_authority;
use crate::global_id::{
    GlobalId, DOI_PROTOCOL, DOI_RESOLVER_URL, HDL_PROTOCOL, HDL_RESOLVER_URL,
};

/// Provider label for ids parsed without a configured provider
pub const UNMANAGED_PROVIDER_NAME: &str = "UNMANAGED";

/// Resolver URL forms and the scheme prefix they stand for
const RESOLVER_PREFIXES: &[(&str, &str)] = &[
    ("https://doi.org/", "doi:"),
    ("http://doi.org/", "doi:"),
    ("https://dx.doi.org/", "doi:"),
    ("http://dx.doi.org/", "doi:"),
    ("https://hdl.handle.net/", "hdl:"),
    ("http://hdl.handle.net/", "hdl:"),
];

/// Split `protocol:rest` at the first colon.
///
/// At least one character must precede the colon.
pub fn split_protocol(raw: &str) -> Option<(&str, &str)> {
    match raw.find(':') {
        Some(index) if index > 0 => Some((&raw[..index], &raw[index + 1..])),
        _ => None,
    }
}

/// Split `authority<separator>identifier` at the first separator.
///
/// Both sides must be non-empty. An empty separator never splits.
pub fn split_authority<'a>(s: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    if separator.is_empty() {
        return None;
    }
    match s.find(separator) {
        Some(index) if index > 0 && index + separator.len() < s.len() => {
            Some((&s[..index], &s[index + separator.len()..]))
        }
        _ => None,
    }
}

/// Rewrite a leading resolver URL (`https://doi.org/...`) into its scheme form
pub fn rewrite_resolver_url(raw: &str) -> String {
    for (url, scheme) in RESOLVER_PREFIXES {
        if let Some(rest) = raw.strip_prefix(url) {
            return format!("{}{}", scheme, rest);
        }
    }
    raw.to_string()
}

/// Parse a DOI or Handle without consulting any provider.
///
/// Returns `None` for anything that is not a recognized PID.
pub fn parse(raw: &str) -> Option<GlobalId> {
    let rewritten = rewrite_resolver_url(raw);
    let (protocol, rest) = split_protocol(&rewritten)?;

    let url_prefix = match protocol {
        DOI_PROTOCOL => DOI_RESOLVER_URL,
        HDL_PROTOCOL => HDL_RESOLVER_URL,
        _ => {
            tracing::debug!("No generic grammar for protocol '{}'", protocol);
            return None;
        }
    };

    let (authority, identifier) = split_authority(rest, "/")?;
    if protocol == DOI_PROTOCOL && !check_doi_authority(Some(authority)) {
        return None;
    }

    GlobalId::new(
        protocol,
        authority,
        identifier,
        "/",
        url_prefix,
        UNMANAGED_PROVIDER_NAME,
    )
}
