//! Run orchestration: both passes over a scoped intermediate buffer.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek as _, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::anchor::AnchorRegistry;
use crate::error::Error;
use crate::issues::IssueLog;
use crate::numbering::NumberingPass;
use crate::tokens::{self, TokenValues};
use crate::types::TableOfContents;

/// What a finished run leaves behind besides the output text.
#[derive(Debug)]
pub struct Assembly {
    /// Advisory findings, in the order they were found.
    pub issues: IssueLog,
    /// Every numbered heading.
    pub toc: TableOfContents,
}

/// Assemble `chapters` into one book written to `out`.
///
/// Pass 1 numbers headings into an anonymous temp file, which is rewound and
/// fed to pass 2 for token substitution and link checks. The temp file is
/// removed when it drops, on success and on every error path.
///
/// # Errors
///
/// Returns `Error::SourceUnreadable` or `Error::InputNotFound` for chapter
/// I/O failures, `Error::DuplicateAnchor` for an unresolvable collision, or
/// `Error::Io` for buffer and output failures.
pub fn assemble<W: Write>(
    chapters: &[PathBuf],
    values: &TokenValues,
    out: &mut W,
) -> Result<Assembly, Error> {
    let mut buffer = tempfile::tempfile()?;
    let mut issues = IssueLog::default();
    let toc = number_chapters(chapters, &mut buffer, &mut issues)?;

    buffer.seek(SeekFrom::Start(0))?;
    if toc.is_empty() {
        log::warn!("no numbered headings found");
    }
    log::info!("resolving tokens and links across {} headings", toc.len());

    write_banner(out, chapters)?;
    tokens::resolve_tokens(BufReader::new(&mut buffer), out, &toc, values, &mut issues)?;
    out.flush()?;

    return Ok(Assembly { issues, toc });
}

/// Run pass 1 over every chapter, in order, into `out`.
///
/// # Errors
///
/// Returns chapter I/O errors, `Error::DuplicateAnchor`, or `Error::Io`.
pub fn number_chapters<W: Write>(
    chapters: &[PathBuf],
    out: &mut W,
    issues: &mut IssueLog,
) -> Result<TableOfContents, Error> {
    let mut anchors = AnchorRegistry::default();
    let mut toc = TableOfContents::default();
    {
        let mut writer = BufWriter::new(&mut *out);
        let mut pass = NumberingPass::new(&mut anchors, &mut toc, issues);
        for path in chapters {
            log::info!("numbering {}", path.display());
            let file = open_chapter(path)?;
            pass.process_source(path, BufReader::new(file), &mut writer)?;
        }
        writer.flush()?;
    }
    log::debug!("numbered {} headings, {} issues so far", toc.len(), issues.len());
    return Ok(toc);
}

/// Open a chapter, mapping not-found to `Error::InputNotFound`.
///
/// # Errors
///
/// Returns `Error::InputNotFound` or `Error::SourceUnreadable`.
fn open_chapter(path: &Path) -> Result<File, Error> {
    return File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Error::InputNotFound { path: path.to_path_buf() };
        }
        return Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        };
    });
}

/// Write the generated-file warning that heads every book.
///
/// # Errors
///
/// Returns `Error::Io` if the output cannot be written.
fn write_banner<W: Write>(out: &mut W, chapters: &[PathBuf]) -> Result<(), Error> {
    writeln!(out, "<!--")?;
    writeln!(out, "  GENERATED FILE - DO NOT EDIT.")?;
    writeln!(out, "  Assembled by {} {} from:", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
    for path in chapters {
        writeln!(out, "    {}", path.display())?;
    }
    writeln!(out, "  Edit the chapter files and rebuild instead.")?;
    writeln!(out, "-->")?;
    writeln!(out)?;
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::Issue;

    fn write_chapters(dir: &Path, chapters: &[(&str, &str)]) -> Vec<PathBuf> {
        chapters
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                std::fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    fn values() -> TokenValues {
        TokenValues {
            date: "17/05/2024".to_string(),
            version: Some("3.2.0".to_string()),
        }
    }

    #[test]
    fn assembles_book_with_toc_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let chapters = write_chapters(
            dir.path(),
            &[
                ("00-front.md", "# Manual\n\n## Contents\n\n[toc]\n\nBuilt [date], v[version].\n"),
                ("01-intro.md", "## Intro\n\nRead [setup](#setup).\n\n### Setup\n"),
                ("02-again.md", "## Intro\n\nBack to [the start](#intro).\n"),
            ],
        );

        let mut out = Vec::new();
        let assembly = assemble(&chapters, &values(), &mut out).unwrap();
        let book = String::from_utf8(out).unwrap();

        assert!(book.starts_with("<!--\n  GENERATED FILE"));
        assert!(book.contains("- **[1 Intro](#intro)**\n  - [1.1 Setup](#setup)\n- **[2 Intro](#2-intro)**\n"));
        assert!(book.contains("Built 17/05/2024, v3.2.0."));
        assert!(book.contains("## 2 Intro <a name=\"2-intro\" id=\"2-intro\"></a>"));
        assert!(book.contains("\n---\n\n## 2 Intro"));
        assert_eq!(book.matches("\n---\n").count(), 1);

        assert_eq!(assembly.toc.len(), 3);
        assert_eq!(
            assembly.issues.drain(),
            vec![Issue::AnchorRenamed {
                original: "intro".to_string(),
                renamed: "2-intro".to_string(),
            }]
        );
    }

    #[test]
    fn forward_references_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let chapters = write_chapters(
            dir.path(),
            &[
                ("a.md", "[toc]\n## First\nSee [later](#last-words) and [gone](#nowhere).\n"),
                ("b.md", "## Last Words\n"),
            ],
        );
        let mut out = Vec::new();
        let assembly = assemble(&chapters, &values(), &mut out).unwrap();
        assert_eq!(
            assembly.issues.drain(),
            vec![Issue::DanglingReference { anchor: "nowhere".to_string() }]
        );
    }

    #[test]
    fn missing_chapter_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = assemble(&[dir.path().join("ghost.md")], &values(), &mut out).unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_utf8_chapter_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        std::fs::write(&path, b"## A\n\xff\n").unwrap();

        let mut out = Vec::new();
        let err = assemble(&[path.clone()], &values(), &mut out).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { path: ref p, .. } if *p == path));
        assert!(out.is_empty());
    }

    #[test]
    fn numbering_only_collects_toc() {
        let dir = tempfile::tempdir().unwrap();
        let chapters = write_chapters(dir.path(), &[("a.md", "## One\n### Two\n")]);
        let mut issues = IssueLog::default();
        let toc = number_chapters(&chapters, &mut std::io::sink(), &mut issues).unwrap();
        assert_eq!(toc.len(), 2);
        assert!(issues.is_empty());
    }
}
