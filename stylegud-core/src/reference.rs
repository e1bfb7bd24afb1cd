//! Reference URI derivation.
//!
//! Slugs follow the KSS reference URI rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::StyleGuideEntry;

static NON_WORD_RUN: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII word characters only; `\w` in `regex` is Unicode-aware.
    Regex::new(r"[^A-Za-z0-9_-]+").expect("static pattern is valid")
});

/// Converts a reference string into a URL-safe slug.
///
/// `" - "` collapses to `"-"` first, then every run of characters other than ASCII
/// word characters and `-` becomes a single `"-"`, then the result is lower-cased.
pub fn uriify(reference: &str) -> String {
    let collapsed = reference.replace(" - ", "-");
    NON_WORD_RUN
        .replace_all(&collapsed, "-")
        .to_lowercase()
}

/// Sets `reference_uri` on every entry in place and hands the same dataset back.
pub fn set_references(mut entries: Vec<StyleGuideEntry>) -> Vec<StyleGuideEntry> {
    for entry in &mut entries {
        entry.reference_uri = Some(uriify(&entry.reference));
    }
    entries
}
