use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("no resource given")]
    Empty,
    #[error("not an http(s) URL or local .html file: {0}")]
    Unsupported(String),
    #[error("local file not found: {}", .0.display())]
    NotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Remote(Url),
    LocalFile(PathBuf),
}

/// Where a document comes from, plus the in-page anchor the user asked for.
///
/// The anchor is kept separately so the remote request never carries a
/// fragment, while `as_str` still reports the locator exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator {
    raw: String,
    source: Source,
    base: Url,
    anchor: Option<String>,
}

impl SourceLocator {
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(LocatorError::Empty);
        }

        let (path, fragment) = match Url::parse(raw) {
            Ok(mut url) if matches!(url.scheme(), "http" | "https") => {
                let anchor = take_anchor(url.fragment());
                url.set_fragment(None);
                return Ok(Self {
                    raw: raw.to_string(),
                    base: url.clone(),
                    source: Source::Remote(url),
                    anchor,
                });
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| LocatorError::Unsupported(raw.to_string()))?;
                (path, url.fragment().map(str::to_string))
            }
            Ok(_) => return Err(LocatorError::Unsupported(raw.to_string())),
            Err(_) => match raw.split_once('#') {
                Some((path, fragment)) => (expand_tilde(path), Some(fragment.to_string())),
                None => (expand_tilde(raw), None),
            },
        };
        if !has_html_extension(&path) {
            return Err(LocatorError::Unsupported(raw.to_string()));
        }
        let path = path
            .canonicalize()
            .map_err(|_| LocatorError::NotFound(path.clone()))?;
        if !path.is_file() {
            return Err(LocatorError::NotFound(path));
        }
        let base =
            Url::from_file_path(&path).map_err(|()| LocatorError::Unsupported(raw.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            source: Source::LocalFile(path),
            base,
            anchor: take_anchor(fragment.as_deref()),
        })
    }

    /// The locator as the user supplied it, anchor included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Base for resolving relative references found in the document.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The URL to request, without the fragment. `None` for local files.
    pub fn remote_url(&self) -> Option<&Url> {
        match &self.source {
            Source::Remote(url) => Some(url),
            Source::LocalFile(_) => None,
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match &self.source {
            Source::LocalFile(path) => Some(path),
            Source::Remote(_) => None,
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn take_anchor(fragment: Option<&str>) -> Option<String> {
    fragment.filter(|f| !f.is_empty()).map(str::to_string)
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
