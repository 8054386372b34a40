use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Error;

/// Expand the requested inputs into the ordered list of chapter files.
/// Files are kept in the order given. A directory contributes every `.md`
/// file beneath it, sorted by file name so `01-`, `02-`, ... come out in order.
///
/// `output` is the book being written, if any. It is never a chapter, so a
/// book generated into one of its own input directories is skipped.
///
/// # Errors
///
/// Returns `Error::NoInputs` for an empty request, `Error::InputNotFound`
/// for a missing path, or `Error::NoChapters` for a directory without markdown.
pub fn collect(inputs: &[PathBuf], output: Option<&Path>) -> Result<Vec<PathBuf>, Error> {
    if inputs.is_empty() {
        return Err(Error::NoInputs);
    }

    let book = output.and_then(|path| return std::fs::canonicalize(path).ok());
    let mut chapters = Vec::new();
    for input in inputs {
        if input.is_dir() {
            chapters.extend(expand_directory(input, book.as_deref())?);
        } else if input.is_file() {
            if is_book(input, book.as_deref()) {
                log::warn!("skipping {}: it is the output file", input.display());
                continue;
            }
            chapters.push(input.clone());
        } else {
            return Err(Error::InputNotFound { path: input.clone() });
        }
    }
    return Ok(chapters);
}

/// All markdown files under `dir` except the book, sorted by name at each level.
///
/// # Errors
///
/// Returns `Error::NoChapters` if the directory holds no markdown files.
fn expand_directory(dir: &Path, book: Option<&Path>) -> Result<Vec<PathBuf>, Error> {
    let chapters: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "md"))
        .filter(|e| return !is_book(e.path(), book))
        .map(|e| return e.into_path())
        .collect();

    if chapters.is_empty() {
        return Err(Error::NoChapters { path: dir.to_path_buf() });
    }
    return Ok(chapters);
}

/// Whether `path` names the same file as the canonical `book` path.
fn is_book(path: &Path, book: Option<&Path>) -> bool {
    return book.is_some_and(|book| {
        return std::fs::canonicalize(path).is_ok_and(|p| return p == book);
    });
}
