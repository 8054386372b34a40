/// Core domain types: heading records, number paths, and the table of contents.
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// One numbered heading, created once by the numbering pass in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRecord {
    /// Anchor id, unique within the run.
    pub anchor: String,
    /// Nesting depth: 0 for `##` chapters, 1 for `###` sections, and so on.
    pub level: usize,
    /// Hierarchical section number such as `2.1.3`.
    pub number: NumberPath,
    /// Title text as authored, trailing whitespace removed.
    pub title: String,
}

/// Hierarchical counters from level 0 down to a heading's own level.
/// Always holds `level + 1` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPath(
    /// Counter values, most significant first.
    pub Vec<u32>,
);

impl NumberPath {
    /// Segments in reading order.
    pub fn segments(&self) -> &[u32] {
        return &self.0;
    }
}

impl fmt::Display for NumberPath {
    /// Join the segments with `.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        return Ok(());
    }
}

impl Serialize for NumberPath {
    /// Serialized in its rendered `N.N.N` form.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.collect_str(self);
    }
}

/// Ordered list of every numbered heading. Append-only while numbering,
/// read-only while tokens and links are resolved.
#[derive(Debug, Default)]
pub struct TableOfContents {
    /// Anchor index for link validation.
    anchors: HashSet<String>,
    /// Records in document order.
    entries: Vec<HeadingRecord>,
}

impl TableOfContents {
    /// Whether some heading carries this anchor.
    pub fn contains_anchor(&self, anchor: &str) -> bool {
        return self.anchors.contains(anchor);
    }

    /// Records in document order.
    pub fn entries(&self) -> &[HeadingRecord] {
        return &self.entries;
    }

    /// True when no numbered heading was seen.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of headings recorded.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Append a record at the end of the document order.
    pub fn push(&mut self, record: HeadingRecord) {
        self.anchors.insert(record.anchor.clone());
        self.entries.push(record);
    }
}
