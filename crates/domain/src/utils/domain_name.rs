//! Company domain normalisation used as a contact → company join key.

use crate::constants::WWW_PREFIX;

/// Normalise a company domain for index lookups.
///
/// Lowercases, trims surrounding whitespace and strips a single leading
/// `www.`. Returns `None` when nothing is left.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_ascii_lowercase();
    let stripped = lowered.strip_prefix(WWW_PREFIX).unwrap_or(&lowered);

    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}
