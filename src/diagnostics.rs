use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::issues::Issue;

/// ANSI bold, used for markdown headings on stderr.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Print markdown to stderr with `#` headings in bold.
fn eprint_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
    return;
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    eprint_markdown(&render_error(e));
    return;
}

/// Print the end-of-run issue listing, or a clean-completion notice.
pub fn print_issues(issues: &[Issue]) {
    eprint_markdown(&render_issues(issues));
    return;
}

/// Render an error as a structured markdown diagnostic: what happened and
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DuplicateAnchor { anchor, number, title } => {
            render_duplicate_anchor(anchor, number, title)
        },
        Error::DateFormat { format } => format!("\
# Error: Invalid Date Format

`{format}` is not a valid strftime-style format.

## Fix

Correct `date_format` in `{CONFIG_FILE}`, for example:

    date_format = \"%d/%m/%Y\"
"),
        Error::InputNotFound { path } => format!("\
# Error: Input Not Found

`{}` does not exist.
", path.display()),
        Error::NoChapters { path } => format!("\
# Error: No Chapters

`{}` contains no `.md` files.
", path.display()),
        Error::NoInputs => format!("\
# Error: No Inputs

No chapter files were given.

## Fix

Pass chapter files or directories on the command line, or list them in `{CONFIG_FILE}`:

    chapters = [\"chapters/\"]
"),
        Error::SourceUnreadable { path, source } => format!("\
# Error: Unreadable Chapter

Could not read `{}`: {source}
", path.display()),
        Error::TomlDe(err) => format!("\
# Error: Invalid Config

`{CONFIG_FILE}` is not valid:

{err}
"),
        Error::Io(_) | Error::Json(_) | Error::Watch { .. } => format!("\
# Error

{e}
"),
    };
}

/// Explain an anchor collision that number prefixes could not resolve.
fn render_duplicate_anchor(anchor: &str, number: &str, title: &str) -> String {
    return format!("\
# Error: Duplicate Anchor

Heading {number} `{title}` needs a unique anchor, but `{anchor}` is already
taken even with every section number prefixed.

## Fix

Rename the heading, or rename the earlier heading whose title produces `{anchor}`.
");
}

/// One paragraph per issue under a count heading.
fn render_issues(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "Book assembled with no issues.\n".to_string();
    }

    let noun = if issues.len() == 1 { "issue" } else { "issues" };
    let mut out = format!("# {} {noun}\n", issues.len());
    for issue in issues {
        let _ = write!(out, "\n{issue}\n");
    }
    return out;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_are_separate_paragraphs() {
        let md = render_issues(&[
            Issue::MissingToc,
            Issue::DanglingReference { anchor: "x".to_string() },
        ]);
        assert!(md.starts_with("# 2 issues\n\n"));
        assert_eq!(md.matches("\n\n").count(), 2);
        assert!(md.contains("`#x`"));
    }

    #[test]
    fn no_issues_reports_success() {
        assert_eq!(render_issues(&[]), "Book assembled with no issues.\n");
    }

    #[test]
    fn duplicate_anchor_names_heading() {
        let md = render_error(&Error::DuplicateAnchor {
            anchor: "1-intro".to_string(),
            number: "1".to_string(),
            title: "Intro".to_string(),
        });
        assert!(md.starts_with("# Error: Duplicate Anchor"));
        assert!(md.contains("Heading 1 `Intro`"));
    }
}
