/// Project version lookup for the `[version]` token.
use std::path::Path;

/// Walk from `start` up through its ancestors looking for a repository root
/// (a directory holding `repo_marker`) that also holds `version_file`.
/// Returns the file's first line, trimmed, or `None` if no such root exists
/// or the line is empty. Roots without a version file are skipped.
pub fn find_version(start: &Path, repo_marker: &str, version_file: &str) -> Option<String> {
    for dir in start.ancestors() {
        if !dir.join(repo_marker).is_dir() {
            continue;
        }
        let candidate = dir.join(version_file);
        let Ok(content) = std::fs::read_to_string(&candidate) else {
            continue;
        };
        let version = content.lines().next().unwrap_or("").trim();
        if version.is_empty() {
            log::debug!("{} has an empty first line", candidate.display());
            return None;
        }
        log::debug!("version {version} from {}", candidate.display());
        return Some(version.to_string());
    }
    return None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_version_in_enclosing_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("VERSION"), "  3.2.0  \nchangelog\n").unwrap();
        let nested = dir.path().join("docs/book");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_version(&nested, ".git", "VERSION").as_deref(), Some("3.2.0"));
    }

    #[test]
    fn skips_root_without_version_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("VERSION"), "1.0\n").unwrap();
        let inner = dir.path().join("vendor/sub");
        std::fs::create_dir_all(inner.join(".git")).unwrap();

        assert_eq!(find_version(&inner, ".git", "VERSION").as_deref(), Some("1.0"));
    }

    #[test]
    fn version_file_outside_repo_root_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), "9.9\n").unwrap();
        assert_eq!(find_version(dir.path(), ".bookstitch-test-marker", "VERSION"), None);
    }

    #[test]
    fn empty_first_line_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("VERSION"), "\n2.0\n").unwrap();
        assert_eq!(find_version(dir.path(), ".git", "VERSION"), None);
    }
}
