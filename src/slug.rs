//! Filename derivation for exported certificates.

/// Normalize a name into a filename-safe token: trimmed, lowercased, runs of
/// whitespace collapsed to single hyphens.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Full export filename: `<prefix>-<slug>.png`.
pub fn export_filename(prefix: &str, name: &str) -> String {
    format!("{}-{}.png", prefix, slugify(name))
}
