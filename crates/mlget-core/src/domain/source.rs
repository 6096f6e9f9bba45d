//! Resolved fetch locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use super::transfer::file_name_for;

/// URL schemes accepted as direct fetch locations.
pub const URL_SCHEMES: &[&str] = &["http", "https", "file"];

/// File suffixes recognized as package archives.
pub const ARCHIVE_SUFFIXES: &[&str] = &[".whl", ".tar.gz"];

/// Suffixes collected from the index-download scratch directory.
pub const BINARY_PACKAGE_SUFFIXES: &[&str] = &[".whl", ".tar.gz"];

/// One place a package can be fetched from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum Candidate {
    /// A URL with an allow-listed scheme, passed through unchanged.
    Url(String),
    /// An existing local file, canonicalized.
    LocalPath(PathBuf),
    /// An archive file name that does not exist locally; trusted as-is.
    Passthrough(String),
}

impl Candidate {
    /// The string handed to the transfer engine.
    ///
    /// Local paths are turned into `file://` URIs so the streaming strategy
    /// can read them like any other URL.
    #[must_use]
    pub fn fetch_location(&self) -> String {
        match self {
            Self::Url(url) | Self::Passthrough(url) => url.clone(),
            Self::LocalPath(path) => file_uri(path),
        }
    }

    /// File name the fetched artifact is saved under.
    ///
    /// Local paths keep their own name verbatim, including characters that
    /// are special in URLs.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::LocalPath(path) => path.file_name().map_or_else(
                || file_name_for(&self.fetch_location()),
                |name| name.to_string_lossy().into_owned(),
            ),
            Self::Url(url) | Self::Passthrough(url) => file_name_for(url),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) | Self::Passthrough(url) => f.write_str(url),
            Self::LocalPath(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Whether `spec` starts with one of the allow-listed URL schemes.
#[must_use]
pub fn is_url(spec: &str) -> bool {
    spec.split_once("://").is_some_and(|(scheme, _)| {
        URL_SCHEMES
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
    })
}

/// Whether the location uses the `file` scheme.
#[must_use]
pub fn is_file_url(location: &str) -> bool {
    location
        .split_once("://")
        .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case("file"))
}

/// Whether `name` ends with a recognized archive suffix.
#[must_use]
pub fn has_archive_suffix(name: &str) -> bool {
    ARCHIVE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Build a percent-encoded `file://` URI for an absolute path.
///
/// Relative paths cannot be expressed as file URIs and are joined verbatim.
#[must_use]
pub fn file_uri(path: &Path) -> String {
    Url::from_file_path(path).map_or_else(
        |()| format!("file://{}", path.to_string_lossy().replace('\\', "/")),
        String::from,
    )
}

/// Local path named by a `file://` URI, with percent-escapes decoded.
#[must_use]
pub fn file_uri_path(location: &str) -> Option<PathBuf> {
    Url::parse(location).ok()?.to_file_path().ok()
}
