//! Comma-separated tag lists.
//!
//! Tasks store their tags as a single normalised string (`"report,exam"`).
//! Both the ASCII comma and the full-width comma (`，`) are accepted as
//! separators on input.

use std::collections::BTreeSet;

/// Separator used when storing a normalised tag list.
pub const TAG_SEPARATOR: char = ',';

/// Full-width comma accepted as an alternative separator.
const FULLWIDTH_COMMA: char = '，';

/// Split a raw tag string into trimmed, non-empty tags, preserving order.
pub fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([TAG_SEPARATOR, FULLWIDTH_COMMA])
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Normalise a raw tag string for storage.
///
/// Returns `None` when no tags remain after trimming.
pub fn normalize_tags(raw: &str) -> Option<String> {
    let tags: Vec<&str> = split_tags(raw).collect();
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(","))
    }
}

/// Collect the distinct tags from many stored tag lists, sorted.
pub fn collect_tags<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lists
        .into_iter()
        .flat_map(split_tags)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
