//! First pass: number headings, inject anchors, and collect the table of contents.
//!
//! All chapter files are treated as one continuous document. Counters, the
//! code-block flag, and the blank-line tracking live in `ScanState` and carry
//! over from one source to the next.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::anchor::AnchorRegistry;
use crate::error::Error;
use crate::issues::IssueLog;
use crate::types::{HeadingRecord, NumberPath, TableOfContents};

/// `#` run, whitespace, then a title ending in a non-space character.
#[allow(clippy::expect_used, reason = "hardcoded pattern, compile-time invariant")]
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^(#+)\s+(.*\S)\s*$").expect("valid regex"));

/// Horizontal rule emitted between chapters.
const SEPARATOR: &str = "---";

/// Whether a line opens or closes a fenced code block.
pub fn is_fence(line: &str) -> bool {
    return line.trim_start().starts_with("```");
}

/// Whether a chapter title names the book's own contents page.
fn is_contents_title(title: &str) -> bool {
    return title.eq_ignore_ascii_case("contents") || title.eq_ignore_ascii_case("table of contents");
}

/// Scan state that persists across chapter files.
#[derive(Debug)]
struct ScanState {
    /// A numbered chapter has been written, so later ones need a separator.
    chapter_emitted: bool,
    /// The first level-0 heading has not been seen yet.
    contents_pending: bool,
    /// Counter per level; deeper levels are dropped when a shallower one advances.
    counters: Vec<u32>,
    /// Inside a fenced code block.
    in_code_block: bool,
    /// The last emitted line was blank. True at the start of the book.
    last_blank: bool,
}

impl ScanState {
    /// Bump the counter at `level`, reset everything deeper, and return the path.
    fn advance(&mut self, level: usize) -> NumberPath {
        let depth = level.saturating_add(1);
        self.counters.resize(depth, 0);
        if let Some(counter) = self.counters.get_mut(level) {
            *counter = counter.saturating_add(1);
        }
        return NumberPath(self.counters.clone());
    }
}

impl Default for ScanState {
    fn default() -> Self {
        return Self {
            chapter_emitted: false,
            contents_pending: true,
            counters: Vec::new(),
            in_code_block: false,
            last_blank: true,
        };
    }
}

/// The numbering pass, borrowing the run's shared registries.
pub struct NumberingPass<'run> {
    /// Anchor namespace shared with nothing else.
    anchors: &'run mut AnchorRegistry,
    /// Sink for rename warnings.
    issues: &'run mut IssueLog,
    /// State threaded across sources.
    state: ScanState,
    /// Headings collected so far.
    toc: &'run mut TableOfContents,
}

impl<'run> NumberingPass<'run> {
    /// Start a pass with fresh scan state.
    pub fn new(
        anchors: &'run mut AnchorRegistry,
        toc: &'run mut TableOfContents,
        issues: &'run mut IssueLog,
    ) -> Self {
        return Self {
            anchors,
            issues,
            state: ScanState::default(),
            toc,
        };
    }

    /// Write a line and remember whether it was blank.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the output cannot be written.
    fn emit<W: Write>(&mut self, out: &mut W, line: &str) -> Result<(), Error> {
        writeln!(out, "{line}")?;
        self.state.last_blank = line.trim().is_empty();
        return Ok(());
    }

    /// Emit a blank line unless the previous line already was one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the output cannot be written.
    fn ensure_blank<W: Write>(&mut self, out: &mut W) -> Result<(), Error> {
        if self.state.last_blank {
            return Ok(());
        }
        return self.emit(out, "");
    }

    /// Rewrite one numbered heading and record it.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateAnchor` from the anchor registry, or `Error::Io`.
    fn number_heading<W: Write>(
        &mut self,
        out: &mut W,
        hashes: &str,
        title: &str,
    ) -> Result<(), Error> {
        let level = hashes.len().saturating_sub(2);

        if level == 0 {
            if self.state.chapter_emitted {
                self.ensure_blank(out)?;
                self.emit(out, SEPARATOR)?;
                self.emit(out, "")?;
            }
            self.state.chapter_emitted = true;
        }
        self.ensure_blank(out)?;

        let number = self.state.advance(level);
        let anchor = self.anchors.generate(title, &number, self.issues)?;
        log::debug!("{number} {title} -> #{anchor}");

        let rendered = format!("{hashes} {number} {title} <a name=\"{anchor}\" id=\"{anchor}\"></a>");
        self.emit(out, &rendered)?;

        self.toc.push(HeadingRecord {
            anchor,
            level,
            number,
            title: title.to_string(),
        });
        return Ok(());
    }

    /// Number every heading in one source and append the result to `out`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SourceUnreadable` if the source cannot be read,
    /// `Error::DuplicateAnchor` for an unresolvable anchor collision,
    /// or `Error::Io` if the output cannot be written.
    pub fn process_source<R: BufRead, W: Write>(
        &mut self,
        path: &Path,
        reader: R,
        out: &mut W,
    ) -> Result<(), Error> {
        for line in reader.lines() {
            let line = line.map_err(|source| {
                return Error::SourceUnreadable {
                    path: path.to_path_buf(),
                    source,
                };
            })?;
            self.process_line(out, &line)?;
        }
        return Ok(());
    }

    /// Route one line: fences and code are copied, headings are numbered.
    ///
    /// # Errors
    ///
    /// Propagates errors from heading numbering or output writes.
    fn process_line<W: Write>(&mut self, out: &mut W, line: &str) -> Result<(), Error> {
        if is_fence(line) {
            self.state.in_code_block = !self.state.in_code_block;
            return self.emit(out, line);
        }
        if self.state.in_code_block {
            return self.emit(out, line);
        }

        let Some(caps) = HEADING.captures(line) else {
            return self.emit(out, line);
        };
        let hashes = caps.get(1).map_or("", |m| return m.as_str());
        let title = caps.get(2).map_or("", |m| return m.as_str());

        // Single `#` is the book title.
        if hashes.len() == 1 {
            return self.emit(out, line);
        }

        if hashes.len() == 2 && self.state.contents_pending {
            self.state.contents_pending = false;
            if is_contents_title(title) {
                return self.emit(out, line);
            }
        }

        return self.number_heading(out, hashes, title);
    }
}
