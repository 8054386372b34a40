/// Crate-level error types for bookstitch diagnostics.
use std::path::PathBuf;

/// Fatal conditions that abort a run. Advisory findings never land here;
/// they are collected in the `IssueLog` instead. Each variant names the
/// file, anchor, or reason so a diagnostic can be rendered without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured `date_format` is not a valid chrono format string.
    #[error("invalid date format: `{format}`")]
    DateFormat {
        /// Format string from `.bookstitch.toml`.
        format: String,
    },

    /// Two headings produced the same anchor even after every number segment
    /// was used as a prefix.
    #[error("duplicate anchor `{anchor}` for heading {number} `{title}`")]
    DuplicateAnchor {
        /// Anchor that could not be made unique.
        anchor: String,
        /// Rendered number path of the heading that collided.
        number: String,
        /// Heading title as authored.
        title: String,
    },

    /// A chapter path given on the command line or in config does not exist.
    #[error("input not found: {}", path.display())]
    InputNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem or an output stream.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of the table of contents failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A directory input contained no markdown files.
    #[error("no markdown chapters in {}", path.display())]
    NoChapters {
        /// Directory that was expanded.
        path: PathBuf,
    },

    /// Neither the command line nor `.bookstitch.toml` named any chapter.
    #[error("no input chapters given")]
    NoInputs,

    /// A chapter exists but could not be read to the end.
    #[error("cannot read {}: {source}", path.display())]
    SourceUnreadable {
        /// Chapter file that failed.
        path: PathBuf,
        /// The underlying read error.
        source: std::io::Error,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}
