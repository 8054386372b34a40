//! Anchor generation: turns heading titles into unique, URL-safe ids.
//!
//! Anchors are stable only while a heading's title and, for duplicated
//! titles, its section number stay the same. Renames are reported so authors
//! know which links may break when chapters move.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::Error;
use crate::issues::{Issue, IssueLog};
use crate::types::NumberPath;

/// Every anchor handed out during the run. Never shrinks.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    /// Anchors already assigned.
    assigned: HashSet<String>,
}

impl AnchorRegistry {
    /// Whether an anchor has already been assigned.
    pub fn contains(&self, anchor: &str) -> bool {
        return self.assigned.contains(anchor);
    }

    /// Produce a unique anchor for a heading and register it.
    ///
    /// The normalized title is used as-is when free. Otherwise the leading
    /// segments of `number` are prefixed one at a time (`2-intro`,
    /// `2-1-intro`, ...) until the result is unique, and an
    /// `Issue::AnchorRenamed` is logged.
    ///
    /// The prefix keeps the segments in reading order, so section 2.1 gets
    /// `2-1-setup`, never `1-2-setup`. Existing books link to anchors in this
    /// form; changing the order breaks those links.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateAnchor` if the anchor still collides after
    /// every number segment has been used.
    pub fn generate(
        &mut self,
        title: &str,
        number: &NumberPath,
        issues: &mut IssueLog,
    ) -> Result<String, Error> {
        let candidate = normalize_title(title);
        let segments = number.segments();
        let mut anchor = candidate.clone();
        let mut prefix_len = 0_usize;

        while self.contains(&anchor) {
            if prefix_len >= segments.len() {
                return Err(Error::DuplicateAnchor {
                    anchor,
                    number: number.to_string(),
                    title: title.to_string(),
                });
            }
            prefix_len = prefix_len.saturating_add(1);
            let prefix = segments.get(..prefix_len).unwrap_or_default();
            anchor = prefix_with_segments(&candidate, prefix);
        }

        if anchor != candidate {
            issues.push(Issue::AnchorRenamed {
                original: candidate,
                renamed: anchor.clone(),
            });
        }

        self.assigned.insert(anchor.clone());
        return Ok(anchor);
    }
}

/// Replace every character outside `[A-Za-z0-9-]` with `-` and lower-case the rest.
pub fn normalize_title(title: &str) -> String {
    return title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                return c.to_ascii_lowercase();
            }
            return '-';
        })
        .collect();
}

/// Build `s1-s2-...-candidate`.
fn prefix_with_segments(candidate: &str, segments: &[u32]) -> String {
    let mut out = String::with_capacity(candidate.len().saturating_add(8));
    for segment in segments {
        let _ = write!(out, "{segment}-");
    }
    out.push_str(candidate);
    return out;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[u32]) -> NumberPath {
        NumberPath(segments.to_vec())
    }

    #[test]
    fn normalizes_punctuation_and_case() {
        assert_eq!(normalize_title("Getting Started!"), "getting-started-");
        assert_eq!(normalize_title("C++ & Rust"), "c-----rust");
        assert_eq!(normalize_title("pre-built"), "pre-built");
        assert_eq!(normalize_title("Café"), "caf-");
    }

    #[test]
    fn unique_title_is_used_verbatim() {
        let mut registry = AnchorRegistry::default();
        let mut issues = IssueLog::default();
        let anchor = registry.generate("Intro", &path(&[1]), &mut issues).unwrap();
        assert_eq!(anchor, "intro");
        assert!(registry.contains("intro"));
        assert!(issues.is_empty());
    }

    #[test]
    fn duplicate_gets_one_segment_prefix() {
        let mut registry = AnchorRegistry::default();
        let mut issues = IssueLog::default();
        registry.generate("Intro", &path(&[1]), &mut issues).unwrap();
        let anchor = registry.generate("Intro", &path(&[2]), &mut issues).unwrap();
        assert_eq!(anchor, "2-intro");
        assert_eq!(
            issues.issues(),
            &[Issue::AnchorRenamed {
                original: "intro".to_string(),
                renamed: "2-intro".to_string(),
            }]
        );
    }

    #[test]
    fn uses_minimal_number_of_segments() {
        let mut registry = AnchorRegistry::default();
        let mut issues = IssueLog::default();
        registry.generate("Setup", &path(&[1, 1]), &mut issues).unwrap();
        let second = registry.generate("Setup", &path(&[2, 1]), &mut issues).unwrap();
        assert_eq!(second, "2-setup");
        let third = registry.generate("Setup", &path(&[2, 2]), &mut issues).unwrap();
        assert_eq!(third, "2-2-setup");
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn prefix_keeps_reading_order() {
        let mut registry = AnchorRegistry::default();
        let mut issues = IssueLog::default();
        registry.generate("Setup", &path(&[1, 1]), &mut issues).unwrap();
        registry.generate("Setup", &path(&[2, 3]), &mut issues).unwrap();
        let anchor = registry.generate("Setup", &path(&[2, 1]), &mut issues).unwrap();
        assert_eq!(anchor, "2-1-setup");
    }

    #[test]
    fn exhausted_segments_are_fatal() {
        let mut registry = AnchorRegistry::default();
        let mut issues = IssueLog::default();
        registry.generate("Intro", &path(&[1]), &mut issues).unwrap();
        registry.generate("1 Intro", &path(&[2]), &mut issues).unwrap();
        let err = registry.generate("Intro", &path(&[1]), &mut issues).unwrap_err();
        assert!(matches!(err, Error::DuplicateAnchor { ref anchor, .. } if anchor == "1-intro"));
    }

    #[test]
    fn same_input_gives_same_anchors() {
        let run = || {
            let mut registry = AnchorRegistry::default();
            let mut issues = IssueLog::default();
            ["Intro", "Setup", "Usage"]
                .iter()
                .enumerate()
                .map(|(i, title)| {
                    let n = u32::try_from(i).unwrap() + 1;
                    registry.generate(title, &path(&[n]), &mut issues).unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
