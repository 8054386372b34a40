//! Core CLI commands for bookstitch: build, check, toc.

use std::fs::Permissions;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::assemble::{self, Assembly};
use crate::config::Config;
use crate::diagnostics;
use crate::error;
use crate::issues::IssueLog;
use crate::sources;
use crate::tokens::{self, TokenValues};
use crate::version;

/// Chapters and token values for one run.
struct Prepared {
    /// Chapter files in book order.
    chapters: Vec<PathBuf>,
    /// Project configuration.
    config: Config,
}

impl Prepared {
    /// Resolve today's date and the project version for token substitution.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the working directory is unavailable, or
    /// `Error::DateFormat` for a bad `date_format`.
    fn token_values(&self) -> Result<TokenValues, error::Error> {
        let cwd = std::env::current_dir()?;
        let version = version::find_version(&cwd, &self.config.repo_marker, &self.config.version_file);
        return TokenValues::at(&chrono::Local::now(), &self.config.date_format, version);
    }
}

/// Assemble the book and write it to `output`, or stdout when `None`.
/// Issues are reported but never change the outcome.
///
/// # Errors
///
/// Returns config, input, anchor, or output errors.
pub fn build(inputs: &[PathBuf], output: Option<&Path>) -> Result<(), error::Error> {
    let prepared = prepare(inputs, output)?;
    let values = prepared.token_values()?;

    let assembly = match output {
        None => {
            let mut stdout = BufWriter::new(std::io::stdout().lock());
            assemble::assemble(&prepared.chapters, &values, &mut stdout)?
        },
        Some(path) => write_book_atomically(path, &prepared.chapters, &values)?,
    };

    if let Some(path) = output {
        log::info!("wrote {}", path.display());
    }
    diagnostics::print_issues(assembly.issues.issues());
    return Ok(());
}

/// Assemble the book, discard the output, and report issues.
/// Exits 1 when any issue was found.
///
/// # Errors
///
/// Returns config, input, or anchor errors.
pub fn check(inputs: &[PathBuf]) -> Result<ExitCode, error::Error> {
    let prepared = prepare(inputs, None)?;
    let values = prepared.token_values()?;

    let assembly = assemble::assemble(&prepared.chapters, &values, &mut std::io::sink())?;
    let issues = assembly.issues.drain();
    diagnostics::print_issues(&issues);

    if issues.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::from(1));
}

/// Load config and expand inputs, falling back to the configured chapters.
/// The book at `output`, if any, is left out of the chapters.
///
/// # Errors
///
/// Returns config loading or input collection errors.
fn prepare(inputs: &[PathBuf], output: Option<&Path>) -> Result<Prepared, error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let requested = if inputs.is_empty() { config.chapters.as_slice() } else { inputs };
    let chapters = sources::collect(requested, output)?;
    return Ok(Prepared { chapters, config });
}

/// Number the chapters and print the table of contents as a markdown list
/// or as JSON.
///
/// # Errors
///
/// Returns config, input, anchor, or serialization errors.
pub fn toc(inputs: &[PathBuf], json: bool) -> Result<(), error::Error> {
    let prepared = prepare(inputs, None)?;
    let mut issues = IssueLog::default();
    let toc = assemble::number_chapters(&prepared.chapters, &mut std::io::sink(), &mut issues)?;

    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, toc.entries())?;
        writeln!(stdout)?;
    } else {
        stdout.write_all(tokens::render_toc(&toc).as_bytes())?;
    }
    stdout.flush()?;

    if !issues.is_empty() {
        diagnostics::print_issues(issues.issues());
    }
    return Ok(());
}

/// Assemble into a temp file beside `path` and move it into place only once
/// both passes have succeeded. The book keeps the permissions of the file it
/// replaces, or gets `0644` when new.
///
/// # Errors
///
/// Returns assembly errors, or `Error::Io` if the temp file cannot be
/// created or persisted.
fn write_book_atomically(
    path: &Path,
    chapters: &[PathBuf],
    values: &TokenValues,
) -> Result<Assembly, error::Error> {
    let dir = path
        .parent()
        .filter(|p| return !p.as_os_str().is_empty())
        .unwrap_or_else(|| return Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;

    let assembly = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let assembly = assemble::assemble(chapters, values, &mut writer)?;
        writer.flush()?;
        assembly
    };

    if let Some(permissions) = book_permissions(path) {
        staged.as_file().set_permissions(permissions)?;
    }
    staged.persist(path).map_err(|e| return error::Error::Io(e.error))?;
    return Ok(assembly);
}

/// Permissions for the book at `path`: those of the existing file, or the
/// platform default for a new one. Temp files are created owner-only.
fn book_permissions(path: &Path) -> Option<Permissions> {
    if let Ok(metadata) = std::fs::metadata(path) {
        return Some(metadata.permissions());
    }
    return new_book_permissions();
}

#[cfg(unix)]
fn new_book_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt as _;
    return Some(Permissions::from_mode(0o644));
}

#[cfg(not(unix))]
fn new_book_permissions() -> Option<Permissions> {
    return None;
}
