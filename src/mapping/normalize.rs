//! URL normalization applied at the registry boundary.
//!
//! # Rules
//! - `http://` and `https://` prefixes are stripped from patterns and from
//!   incoming query URLs, so both compare on the same canonical form
//! - A remote destination with no path gets a trailing `/`
//!
//! Both transforms are pure and idempotent.

const PROTOCOLS: [&str; 2] = ["http://", "https://"];

/// Strip every leading `http://` or `https://`.
///
/// Repeated prefixes (`http://https://foo.com`) are all removed so that the
/// result is a fixed point.
pub fn strip_protocol(url: &str) -> &str {
    let mut rest = url;
    while let Some(stripped) = PROTOCOLS.iter().find_map(|proto| rest.strip_prefix(proto)) {
        rest = stripped;
    }
    rest
}

/// Canonical form of a source pattern or query URL.
pub fn normalize_pattern(pattern: &str) -> String {
    strip_protocol(pattern).to_string()
}

/// Canonical form of a destination.
///
/// Local destinations are returned unchanged. A remote destination whose
/// host has no path after it (`foo.com`, `https://foo.com`) is turned into
/// an explicit root reference by appending `/`.
pub fn normalize_destination(destination: &str, is_local: bool) -> String {
    if is_local || destination.is_empty() || has_path(destination) {
        return destination.to_string();
    }
    format!("{destination}/")
}

fn has_path(destination: &str) -> bool {
    strip_protocol(destination).contains('/')
}
