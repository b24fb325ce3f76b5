//! URL slug generation

/// Convert a display name into a URL slug.
///
/// Non-ASCII characters and punctuation other than `_` and `-` are dropped,
/// the text is lowercased, runs of whitespace and hyphens become a single
/// hyphen, and leading or trailing hyphens and underscores are stripped.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars().filter(char::is_ascii) {
        let c = c.to_ascii_lowercase();
        if c == '-' || c.is_ascii_whitespace() {
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}
