//! Client-side authoring conveniences.
//!
//! The dashboard derives a slug while the author types a title, and splits
//! the tag input on commas. Both are conveniences only - the server
//! validates whatever actually arrives, and a hand-edited slug wins over
//! the derived one.

use slug::slugify;

/// Derive a URL-safe slug from a title.
pub fn derive_slug(title: &str) -> String {
    slugify(title)
}

/// Split a comma-separated tag input into trimmed, non-empty tags.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercase_and_hyphenated() {
        assert_eq!(derive_slug("Hello, World!"), "hello-world");
        assert_eq!(derive_slug("  Rust 2024 Roadmap  "), "rust-2024-roadmap");
    }

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        assert_eq!(
            split_tags(" rust, web ,,cms "),
            vec!["rust", "web", "cms"]
        );
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }
}
