//! Advisory findings collected during a run and reported once at the end.

use std::fmt;

/// A non-fatal inconsistency. Rendered as a human-readable warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A duplicate title forced a number prefix onto its anchor.
    AnchorRenamed {
        /// Anchor the title would normally have produced.
        original: String,
        /// Anchor actually assigned.
        renamed: String,
    },
    /// An `(#anchor)` link points at no generated heading.
    DanglingReference {
        /// The anchor as written in the link.
        anchor: String,
    },
    /// No line consisted of the `[toc]` token.
    MissingToc,
    /// `[version]` appeared but no version file was found.
    VersionNotFound,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Self::AnchorRenamed { original, renamed } => write!(
                f,
                "Duplicate anchor `{original}` was renamed to `{renamed}`. The new anchor \
                 depends on section numbering and may change when chapters or sections \
                 are added, removed, or reordered."
            ),
            Self::DanglingReference { anchor } => write!(
                f,
                "Link target `#{anchor}` does not match any heading anchor."
            ),
            Self::MissingToc => write!(
                f,
                "No `[toc]` token found; the book has no table of contents."
            ),
            Self::VersionNotFound => write!(
                f,
                "A `[version]` token was used but no version file was found in any \
                 enclosing repository root; the token was left in place."
            ),
        };
    }
}

/// Ordered, append-only list of issues owned by the run.
#[derive(Debug, Default)]
pub struct IssueLog {
    /// Issues in the order they were found.
    issues: Vec<Issue>,
}

impl IssueLog {
    /// Consume the log, yielding issues in the order they were found.
    pub fn drain(self) -> Vec<Issue> {
        return self.issues;
    }

    /// True when nothing was reported.
    pub fn is_empty(&self) -> bool {
        return self.issues.is_empty();
    }

    /// Issues recorded so far.
    pub fn issues(&self) -> &[Issue] {
        return &self.issues;
    }

    /// Number of issues recorded so far.
    pub fn len(&self) -> usize {
        return self.issues.len();
    }

    /// Record an issue.
    pub fn push(&mut self, issue: Issue) {
        log::debug!("issue: {issue}");
        self.issues.push(issue);
    }
}
