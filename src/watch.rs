//! File watcher: builds once on startup, then rebuilds on chapter changes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::config::Config;
use crate::diagnostics;
use crate::error;
use crate::sources;

/// Debounce delay between filesystem events and rebuild.
const DEBOUNCE_MS: u64 = 100;

/// Directories to watch, flagged `true` when they must be watched
/// recursively: directory inputs, so new chapter files are picked up.
/// Every chapter's parent is watched non-recursively.
///
/// # Errors
///
/// Returns input collection errors.
fn collect_watch_dirs(inputs: &[PathBuf]) -> Result<BTreeMap<PathBuf, bool>, error::Error> {
    let mut dirs = BTreeMap::new();
    for input in inputs {
        if input.is_dir() {
            dirs.insert(input.clone(), true);
        }
    }
    for chapter in sources::collect(inputs, None)? {
        let parent = chapter
            .parent()
            .filter(|p| return !p.as_os_str().is_empty())
            .map_or_else(|| return PathBuf::from("."), Path::to_path_buf);
        dirs.entry(parent).or_insert(false);
    }
    return Ok(dirs);
}

/// Create a filesystem watcher that signals on changes to markdown files
/// other than the book itself.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    output: PathBuf,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_chapter_change(p, &output))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// A markdown path that is not the generated book.
fn is_chapter_change(path: &Path, output: &Path) -> bool {
    if path.extension().is_none_or(|ext| return ext != "md") {
        return false;
    }
    let same_as_output = path == output
        || std::fs::canonicalize(path)
            .ok()
            .zip(std::fs::canonicalize(output).ok())
            .is_some_and(|(a, b)| return a == b);
    return !same_as_output;
}

/// Entry point for `build --watch`.
///
/// # Errors
///
/// Returns errors from config loading, input collection, or watcher setup.
pub fn run(inputs: &[PathBuf], output: &Path) -> Result<ExitCode, error::Error> {
    let config = Config::load(Path::new("."))?;
    let requested = if inputs.is_empty() { config.chapters } else { inputs.to_vec() };

    log::info!("watch: initial build");
    let mut last_code = run_build(&requested, output);

    let watch_dirs = collect_watch_dirs(&requested)?;
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, output.to_path_buf())?;

    for (dir, &recursive) in &watch_dirs {
        let mode = if recursive { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
        if let Err(e) = watcher.watch(dir, mode) {
            log::warn!("watch: cannot watch {}: {e}", dir.display());
        }
    }

    let dir_count = watch_dirs.len();
    log::info!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        log::info!("watch: change detected, rebuilding");
        last_code = run_build(&requested, output);
    }

    return Ok(last_code);
}

/// Build once and report. Returns the exit code the build would have had.
fn run_build(inputs: &[PathBuf], output: &Path) -> ExitCode {
    return match commands::build(inputs, Some(output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_output_and_non_markdown() {
        let output = Path::new("book/out.md");
        assert!(!is_chapter_change(Path::new("book/out.md"), output));
        assert!(!is_chapter_change(Path::new("book/.tmpA1b2"), output));
        assert!(is_chapter_change(Path::new("book/01-intro.md"), output));
    }

    #[test]
    fn watches_chapter_parents_and_input_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let chapters = dir.path().join("chapters");
        std::fs::create_dir(&chapters).unwrap();
        std::fs::write(chapters.join("01.md"), "## One\n").unwrap();
        let front = dir.path().join("front.md");
        std::fs::write(&front, "# Book\n").unwrap();

        let dirs = collect_watch_dirs(&[front, chapters.clone()]).unwrap();
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs.get(&chapters), Some(&true));
        assert_eq!(dirs.get(dir.path()), Some(&false));
    }
}
