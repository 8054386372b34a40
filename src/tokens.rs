//! Second pass: expand `[toc]`, substitute `[date]` and `[version]`, and
//! check every `(#anchor)` link against the finished table of contents.

use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use regex::{NoExpand, Regex};

use crate::error::Error;
use crate::issues::{Issue, IssueLog};
use crate::numbering::is_fence;
use crate::types::TableOfContents;

/// `[date]`, any case.
#[allow(clippy::expect_used, reason = "hardcoded pattern, compile-time invariant")]
static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?i)\[date\]").expect("valid regex"));

/// `(#anchor)` link target.
#[allow(clippy::expect_used, reason = "hardcoded pattern, compile-time invariant")]
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\(#([^()\s]+)\)").expect("valid regex"));

/// The table-of-contents placeholder, matched against a whole trimmed line.
const TOC_TOKEN: &str = "[toc]";

/// `[version]`, any case.
#[allow(clippy::expect_used, reason = "hardcoded pattern, compile-time invariant")]
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?i)\[version\]").expect("valid regex"));

/// Replacement text for inline tokens, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct TokenValues {
    /// Rendered date for `[date]`.
    pub date: String,
    /// Project version for `[version]`, if one was found.
    pub version: Option<String>,
}

impl TokenValues {
    /// Render `now` with `date_format` and pair it with the looked-up version.
    ///
    /// # Errors
    ///
    /// Returns `Error::DateFormat` if the format string is invalid.
    pub fn at<Tz>(now: &DateTime<Tz>, date_format: &str, version: Option<String>) -> Result<Self, Error>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut date = String::new();
        if write!(date, "{}", now.format(date_format)).is_err() {
            return Err(Error::DateFormat {
                format: date_format.to_string(),
            });
        }
        return Ok(Self { date, version });
    }
}

/// Log a dangling-reference issue for every `(#anchor)` on the line that
/// matches no heading.
fn check_references(line: &str, toc: &TableOfContents, issues: &mut IssueLog) {
    for cap in REFERENCE.captures_iter(line) {
        let Some(anchor) = cap.get(1).map(|m| return m.as_str()) else {
            continue;
        };
        if !toc.contains_anchor(anchor) {
            issues.push(Issue::DanglingReference {
                anchor: anchor.to_string(),
            });
        }
    }
    return;
}

/// Render the table of contents as a nested markdown list, two spaces of
/// indent per level, chapters in bold.
pub fn render_toc(toc: &TableOfContents) -> String {
    let mut out = String::new();
    for record in toc.entries() {
        let indent = "  ".repeat(record.level);
        let link = format!("[{} {}](#{})", record.number, record.title, record.anchor);
        if record.level == 0 {
            let _ = writeln!(out, "{indent}- **{link}**");
        } else {
            let _ = writeln!(out, "{indent}- {link}");
        }
    }
    return out;
}

/// Stream the numbered book through token substitution and link checks.
///
/// Issues for a missing `[toc]` and for an unresolvable `[version]` are
/// logged once, after the whole book has been read.
///
/// # Errors
///
/// Returns `Error::Io` if the buffer cannot be read or the output written.
pub fn resolve_tokens<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    toc: &TableOfContents,
    values: &TokenValues,
    issues: &mut IssueLog,
) -> Result<(), Error> {
    let mut in_code_block = false;
    let mut toc_seen = false;
    let mut version_missing = false;

    for line in reader.lines() {
        let line = line?;

        if is_fence(&line) {
            in_code_block = !in_code_block;
            writeln!(out, "{line}")?;
            continue;
        }
        if in_code_block {
            writeln!(out, "{line}")?;
            continue;
        }

        check_references(&line, toc, issues);

        if line.trim().eq_ignore_ascii_case(TOC_TOKEN) {
            out.write_all(render_toc(toc).as_bytes())?;
            toc_seen = true;
            continue;
        }

        let substituted = substitute_inline_tokens(&line, values, &mut version_missing);
        writeln!(out, "{substituted}")?;
    }

    if !toc_seen {
        issues.push(Issue::MissingToc);
    }
    if version_missing {
        issues.push(Issue::VersionNotFound);
    }
    return Ok(());
}

/// Replace `[date]` and, when known, `[version]`. Sets `version_missing` when
/// a `[version]` token has to be left in place.
fn substitute_inline_tokens(line: &str, values: &TokenValues, version_missing: &mut bool) -> String {
    let dated = DATE_TOKEN.replace_all(line, NoExpand(&values.date));
    return match &values.version {
        Some(version) => VERSION_TOKEN.replace_all(&dated, NoExpand(version)).into_owned(),
        None => {
            if VERSION_TOKEN.is_match(&dated) {
                *version_missing = true;
            }
            dated.into_owned()
        },
    };
}
