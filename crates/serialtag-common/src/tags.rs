//! Hashtag engine for free-text description fields.
//!
//! Hashtags live inside a single description string. A tag is any
//! whitespace-separated token starting with `#` that still has content once
//! the leading `#` characters are stripped; its identity is that stripped
//! body. Serial tags are the reserved form `#serial:<value>`.
//!
//! The string-level functions ([`parse_tags`], [`merge_tags`],
//! [`strip_serial_tags`]) are pure. The record-level operations
//! ([`extract_tags`], [`put_tags`], [`remove_tags`]) apply them to anything
//! implementing [`Described`].
//!
//! # Example
//!
//! ```
//! use serialtag_common::tags::merge_tags;
//!
//! let merged = merge_tags("#serial:OLD #site-a", &["serial:NEW"]);
//! assert_eq!(merged, " #site-a #serial:NEW");
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::Described;

/// Matches every serial tag, including an empty `#serial:`.
static SERIAL_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#serial:[a-zA-Z0-9-]*").expect("Invalid regex pattern"));

/// Returns the tag body of a token, or `None` if the token is not a tag.
fn tag_body(token: &str) -> Option<&str> {
    if !token.starts_with('#') {
        return None;
    }
    let body = token.trim_start_matches('#');
    (!body.is_empty()).then_some(body)
}

/// Returns the distinct tag bodies found in `description`.
pub fn parse_tags(description: &str) -> HashSet<String> {
    description
        .split_whitespace()
        .filter_map(tag_body)
        .map(str::to_string)
        .collect()
}

/// Removes every serial tag from `description`.
///
/// Only the matched substrings are removed; surrounding whitespace is kept.
pub fn strip_serial_tags(description: &str) -> String {
    SERIAL_TAG_RE.replace_all(description, "").into_owned()
}

/// Strips stale serial tags, then appends each desired tag that is missing.
///
/// Tags are appended in the order given, each as `#<tag>`. A separating
/// space is added unless the text is empty or already ends in whitespace.
pub fn merge_tags<S: AsRef<str>>(description: &str, desired: &[S]) -> String {
    let mut merged = strip_serial_tags(description);
    let mut present = parse_tags(&merged);

    for tag in desired {
        let tag = tag.as_ref();
        if present.contains(tag) {
            continue;
        }
        if !merged.is_empty() && !merged.ends_with(char::is_whitespace) {
            merged.push(' ');
        }
        merged.push('#');
        merged.push_str(tag);
        present.insert(tag.to_string());
    }

    merged
}

/// Returns the set of tags in a record's description.
///
/// A missing description is treated as empty.
pub fn extract_tags<R: Described + ?Sized>(record: &R) -> HashSet<String> {
    parse_tags(record.description().unwrap_or_default())
}

/// Ensures `desired_tags` are present in the record's description.
///
/// Existing serial tags are dropped first so a stale serial never survives
/// next to a new one. Non-serial tags are left untouched.
pub fn put_tags<R: Described, S: AsRef<str>>(desired_tags: &[S], mut record: R) -> R {
    let merged = merge_tags(record.description().unwrap_or_default(), desired_tags);
    record.set_description(merged);
    record
}

/// Removes every serial tag from the record's description.
pub fn remove_tags<R: Described>(mut record: R) -> R {
    let stripped = strip_serial_tags(record.description().unwrap_or_default());
    record.set_description(stripped);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Interface;
    use pretty_assertions::assert_eq;

    fn iface(description: Option<&str>) -> Interface {
        Interface {
            id: "i1".to_string(),
            name: Some("controller".to_string()),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    fn set(tags: &[&str]) -> HashSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_extract_tags_collapses_duplicates() {
        assert_eq!(extract_tags(&iface(Some("#a #b #b"))), set(&["a", "b"]));
    }

    #[test]
    fn test_extract_tags_empty_inputs() {
        assert!(extract_tags(&iface(None)).is_empty());
        assert!(extract_tags(&iface(Some(""))).is_empty());
        assert!(extract_tags(&iface(Some("  \n\t "))).is_empty());
    }

    #[test]
    fn test_extract_tags_token_rules() {
        let record = iface(Some("uplink #wan\n##core # ### mid#word #serial:SN-1"));
        assert_eq!(extract_tags(&record), set(&["wan", "core", "serial:SN-1"]));
    }

    #[test]
    fn test_extract_tags_does_not_mutate() {
        let record = iface(Some("#a"));
        let _ = extract_tags(&record);
        assert_eq!(record.description(), Some("#a"));
    }

    #[test]
    fn test_put_tags_appends() {
        let record = put_tags(&["serial:XYZ123"], iface(Some("#foo")));
        assert_eq!(record.description(), Some("#foo #serial:XYZ123"));
    }

    #[test]
    fn test_put_tags_on_missing_description() {
        let record = put_tags(&["serial:SN1"], iface(None));
        assert_eq!(record.description(), Some("#serial:SN1"));
    }

    #[test]
    fn test_put_tags_is_idempotent() {
        let once = put_tags(&["serial:XYZ123"], iface(Some("#foo")));
        let twice = put_tags(&["serial:XYZ123"], once.clone());
        assert_eq!(once.description(), twice.description());
    }

    #[test]
    fn test_put_tags_is_idempotent_after_stale_replacement() {
        let once = put_tags(&["serial:NEW"], iface(Some("#serial:OLD #foo")));
        let twice = put_tags(&["serial:NEW"], once.clone());
        assert_eq!(once.description(), twice.description());
    }

    #[test]
    fn test_put_tags_replaces_stale_serial() {
        let record = put_tags(&["serial:NEW"], iface(Some("#serial:OLD #foo")));
        let description = record.description().unwrap();

        assert_eq!(description, " #foo #serial:NEW");
        assert!(!description.contains("#serial:OLD"));
    }

    #[test]
    fn test_put_tags_keeps_existing_generic_tag() {
        let record = put_tags(&["foo", "bar"], iface(Some("note #foo")));
        assert_eq!(record.description(), Some("note #foo #bar"));
    }

    #[test]
    fn test_put_tags_does_not_duplicate_desired() {
        let record = put_tags(&["bar", "bar"], iface(Some("x")));
        assert_eq!(record.description(), Some("x #bar"));
    }

    #[test]
    fn test_put_tags_keeps_extra_fields() {
        let mut record = iface(Some(""));
        record
            .extra
            .insert("mtu".to_string(), serde_json::Value::from(1500));

        let record = put_tags(&["serial:SN1"], record);
        assert_eq!(record.extra.get("mtu"), Some(&serde_json::Value::from(1500)));
    }

    #[test]
    fn test_remove_tags() {
        let record = remove_tags(iface(Some("#serial:ABC #keep")));
        let description = record.description().unwrap();

        assert!(description.contains("#keep"));
        assert!(!description.contains("#serial:"));
    }

    #[test]
    fn test_remove_tags_purges_duplicates_and_keeps_whitespace() {
        let record = remove_tags(iface(Some("a #serial:X\nb #serial:X #serial:")));
        assert_eq!(record.description(), Some("a \nb  "));
    }

    #[test]
    fn test_remove_tags_on_missing_description() {
        let record = remove_tags(iface(None));
        assert_eq!(record.description(), Some(""));
    }

    #[test]
    fn test_strip_only_matches_serial_charset() {
        // The value stops at the first character outside [A-Za-z0-9-].
        assert_eq!(strip_serial_tags("#serial:AB_12"), "_12");
        assert_eq!(strip_serial_tags("#Serial:AB"), "#Serial:AB");
    }

    #[test]
    fn test_parse_tags_handles_newlines() {
        assert_eq!(parse_tags("#one\n#two"), set(&["one", "two"]));
    }
}
