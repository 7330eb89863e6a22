//! Constraint primitives shared by the engines

use regex::Regex;
use std::sync::LazyLock;

/// Every account must belong to this organisation
pub const ORG_DOMAIN_SUFFIX: &str = "@ngi.com.br";

pub const MIN_PASSWORD_CHARS: usize = 6;

// Local part of printable ASCII specials, dotted hostname labels of up to
// 63 characters that neither start nor end with a hyphen.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("EMAIL_REGEX: invalid regex pattern")
});

pub fn is_present(value: &str) -> bool {
    !value.is_empty()
}

/// Present after trimming surrounding whitespace
pub fn is_present_trimmed(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Exact, case-sensitive suffix match on the value as typed
pub fn has_org_domain(value: &str) -> bool {
    value.ends_with(ORG_DOMAIN_SUFFIX)
}

pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// Trim, lowercase, then capitalise the first letter of every word.
///
/// Runs of whitespace between words collapse to a single space.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
