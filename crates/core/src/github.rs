//! Transformation functions for GitHub API responses
//!
//! Everything here is pure: URL parsing, endpoint derivation, response
//! types, and the decoding of file content into plain text. The HTTP calls
//! live in the `dockgen` crate.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Host prefixes accepted in front of `owner/repo`.
const HOST_PREFIXES: &[&str] = &[
    "https://www.github.com/",
    "https://github.com/",
    "http://www.github.com/",
    "http://github.com/",
    "www.github.com/",
    "github.com/",
];

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// Repository response from `GET /repos/{owner}/{repo}`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GitHubRepository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
}

/// One entry of `GET /repos/{owner}/{repo}/contents`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GitHubContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub git_url: Option<String>,
}

/// Git blob response (the target of `git_url`)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GitHubBlob {
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

// =============================================================================
// Repository references
// =============================================================================

/// Owner and name of a repository, derived from its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// API path of the repository, e.g. `repos/owner/repo`
    pub fn api_path(&self) -> String {
        format!("repos/{}/{}", self.owner, self.repo)
    }

    /// Full URL of the repository metadata endpoint
    pub fn metadata_url(&self, api_base: &str) -> String {
        format!("{}/{}", api_base.trim_end_matches('/'), self.api_path())
    }

    /// Full URL of the top-level directory listing
    pub fn contents_url(&self, api_base: &str) -> String {
        format!("{}/contents", self.metadata_url(api_base))
    }

    /// Raw URL of a file on the static-content host
    pub fn raw_url(&self, raw_base: &str, git_ref: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            raw_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            git_ref,
            path.trim_start_matches('/')
        )
    }
}

/// Parse a repository URL into its owner and name
///
/// Accepts `https://github.com/owner/repo` (with or without `www.`, scheme,
/// trailing slash or `.git` suffix) and the bare `owner/repo` form.
pub fn parse_repo_url(input: &str) -> Result<RepoRef, String> {
    let trimmed = input.trim();

    let path = HOST_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    if path.contains("://") {
        return Err(format!("Unsupported repository host: {}", input));
    }

    // Query strings and fragments are not part of the repository path
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut segments = path.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => Ok(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        _ => Err(format!("Invalid repository URL: {}", input)),
    }
}

// =============================================================================
// Content references and decoding
// =============================================================================

/// Where the content of a listed file can be retrieved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// Direct download URL returning the raw bytes
    Download(String),
    /// Git object URL returning a [`GitHubBlob`]
    GitBlob(String),
}

impl GitHubContentEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    /// Resolve the content reference, preferring the direct download URL
    pub fn content_ref(&self) -> Option<ContentRef> {
        self.download_url
            .clone()
            .map(ContentRef::Download)
            .or_else(|| self.git_url.clone().map(ContentRef::GitBlob))
    }
}

/// Keep only the `file` entries, in listing order
pub fn select_files(entries: &[GitHubContentEntry]) -> Vec<&GitHubContentEntry> {
    entries.iter().filter(|entry| entry.is_file()).collect()
}

/// File content as it arrives from the hosting provider
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    PlainText(String),
    Base64(String),
    StructuredJson(serde_json::Value),
}

impl FileContent {
    /// Classify a raw download body
    ///
    /// JSON bodies served with a JSON content type become `StructuredJson`
    /// (a JSON string literal is unwrapped to `PlainText`). Everything else is
    /// read as UTF-8, replacing invalid sequences.
    pub fn from_download(content_type: Option<&str>, body: &[u8]) -> Self {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);

        if is_json {
            match serde_json::from_slice::<serde_json::Value>(body) {
                Ok(serde_json::Value::String(text)) => return FileContent::PlainText(text),
                Ok(value) => return FileContent::StructuredJson(value),
                Err(_) => {}
            }
        }

        FileContent::PlainText(String::from_utf8_lossy(body).into_owned())
    }

    /// Classify a git blob by its declared encoding
    pub fn from_blob(blob: GitHubBlob) -> Self {
        match blob.encoding.as_deref() {
            Some("base64") => FileContent::Base64(blob.content),
            _ => FileContent::PlainText(blob.content),
        }
    }

    /// Normalize to plain text
    pub fn into_text(self) -> Result<String, String> {
        match self {
            FileContent::PlainText(text) => Ok(text),
            FileContent::Base64(encoded) => decode_base64(&encoded),
            FileContent::StructuredJson(value) => serde_json::to_string(&value)
                .map_err(|e| format!("Failed to serialize JSON content: {}", e)),
        }
    }
}

/// Decode a base64 payload into text
///
/// GitHub wraps base64 content at 60 columns, so whitespace is removed before
/// decoding.
pub fn decode_base64(encoded: &str) -> Result<String, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("Invalid base64 content: {}", e))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
