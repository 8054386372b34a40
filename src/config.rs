use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the optional project config file.
pub const CONFIG_FILE: &str = ".bookstitch.toml";

/// Project configuration loaded from `.bookstitch.toml`.
#[derive(Debug)]
pub struct Config {
    /// Chapters used when the command line names none.
    pub chapters: Vec<PathBuf>,
    /// `chrono` format string for `[date]`.
    pub date_format: String,
    /// Directory that marks a repository root.
    pub repo_marker: String,
    /// File in the repository root whose first line is the version.
    pub version_file: String,
}

/// Raw TOML structure for `.bookstitch.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct BookstitchTomlConfig {
    /// See `Config::chapters`.
    #[serde(default)]
    chapters: Vec<PathBuf>,
    /// See `Config::date_format`.
    date_format: Option<String>,
    /// See `Config::repo_marker`.
    repo_marker: Option<String>,
    /// See `Config::version_file`.
    version_file: Option<String>,
}

impl Config {
    /// Load config from `.bookstitch.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist. A file that exists but
    /// is malformed is an error; the defaults are never substituted for it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let raw: BookstitchTomlConfig = toml::from_str(&content)?;
        let defaults = Self::default();
        let chapters = raw.chapters.into_iter().map(|p| return root.join(p)).collect();
        return Ok(Self {
            chapters,
            date_format: raw.date_format.unwrap_or(defaults.date_format),
            repo_marker: raw.repo_marker.unwrap_or(defaults.repo_marker),
            version_file: raw.version_file.unwrap_or(defaults.version_file),
        });
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            chapters: Vec::new(),
            date_format: "%d/%m/%Y".to_string(),
            repo_marker: ".git".to_string(),
            version_file: "VERSION".to_string(),
        };
    }
}
