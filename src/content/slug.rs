//! URL slug derivation.

/// Maximum slug length in characters
pub const MAX_SLUG_LEN: usize = 60;

const STRIPPED: [char; 4] = [':', '/', '.', ','];

/// Derive a URL-safe slug from a title.
///
/// Lowercases, turns spaces into hyphens, drops `: / . ,`, and truncates to
/// [`MAX_SLUG_LEN`] characters. Applying it to its own output is a no-op.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .map(|c| if c == ' ' { '-' } else { c })
        .take(MAX_SLUG_LEN)
        .collect()
}
