use crate::config::GitHubConfig;
use crate::prelude::*;
use dockgen_core::github::{
    parse_repo_url, select_files, ContentRef, FileContent, GitHubBlob, GitHubContentEntry,
    GitHubRepository, RepoRef,
};
use dockgen_core::prompt::{RepositoryFile, RepositoryMetadata};
use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Everything fetched for one repository
#[derive(Debug, Clone)]
pub struct FetchedRepository {
    pub metadata: RepositoryMetadata,
    pub files: Vec<RepositoryFile>,
}

/// Reads repository metadata and top-level files from GitHub
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

/// Create an HTTP client that sends the bearer token (if any) on every request
pub fn create_github_client(config: &GitHubConfig) -> Result<reqwest::Client, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("dockgen/", env!("CARGO_PKG_VERSION"))),
    );

    if let Some(token) = &config.token {
        let mut value = HeaderValue::from_str(&f!("Bearer {token}"))
            .map_err(|e| Error::Config(f!("Invalid GITHUB_TOKEN header value: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Config(f!("Failed to build HTTP client: {}", e)))
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, Error> {
        let client = create_github_client(&config)?;
        Ok(Self { client, config })
    }

    /// Fetch metadata, README and top-level files of the repository at `repo_url`
    pub async fn fetch(&self, repo_url: &str) -> Result<FetchedRepository, Error> {
        let repo = parse_repo_url(repo_url).map_err(Error::Fetch)?;

        let metadata = self.fetch_metadata(&repo).await?;
        let files = self.fetch_files(&repo).await?;

        Ok(FetchedRepository { metadata, files })
    }

    /// Fetch repository metadata and the README concurrently.
    ///
    /// Fails as soon as either request fails.
    pub async fn fetch_metadata(&self, repo: &RepoRef) -> Result<RepositoryMetadata, Error> {
        let metadata_url = repo.metadata_url(&self.config.api_base);
        let readme_url = repo.raw_url(
            &self.config.raw_base,
            &self.config.readme_ref,
            &self.config.readme_path,
        );

        let (repository, readme) = futures::try_join!(
            self.get_json::<GitHubRepository>(&metadata_url, "repository metadata"),
            self.get_text(&readme_url, "README")
        )?;

        Ok(RepositoryMetadata {
            name: repository.name,
            description: repository.description,
            html_url: repository.html_url,
            readme,
        })
    }

    /// Fetch the content of every top-level file, in listing order.
    ///
    /// One request per `file` entry, all in flight at once; the first failure
    /// aborts the whole group.
    pub async fn fetch_files(&self, repo: &RepoRef) -> Result<Vec<RepositoryFile>, Error> {
        let listing_url = repo.contents_url(&self.config.api_base);
        let entries: Vec<GitHubContentEntry> =
            self.get_json(&listing_url, "directory listing").await?;

        let files = select_files(&entries);
        log::debug!(
            "{} of {} top-level entries are files",
            files.len(),
            entries.len()
        );

        try_join_all(files.into_iter().map(|entry| self.fetch_file(entry))).await
    }

    async fn fetch_file(&self, entry: &GitHubContentEntry) -> Result<RepositoryFile, Error> {
        let what = f!("file '{}'", entry.name);

        let content = match entry.content_ref() {
            Some(ContentRef::Download(url)) => {
                let response = self.send(&url, &what).await?;
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| Error::Fetch(f!("Failed to read {}: {}", what, e)))?;
                FileContent::from_download(content_type.as_deref(), &body)
            }
            Some(ContentRef::GitBlob(url)) => {
                FileContent::from_blob(self.get_json::<GitHubBlob>(&url, &what).await?)
            }
            None => {
                return Err(Error::Fetch(f!("No content URL for {}", what)));
            }
        };

        let content = content
            .into_text()
            .map_err(|e| Error::Fetch(f!("Failed to decode {}: {}", what, e)))?;

        Ok(RepositoryFile {
            name: entry.name.clone(),
            content,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, Error> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await
            .map_err(|e| Error::Fetch(f!("Failed to send request for {}: {}", what, e)))?;

        check_status(response, what)
            .await?
            .json::<T>()
            .await
            .map_err(|e| Error::Fetch(f!("Failed to parse {} response: {}", what, e)))
    }

    async fn get_text(&self, url: &str, what: &str) -> Result<String, Error> {
        self.send(url, what)
            .await?
            .text()
            .await
            .map_err(|e| Error::Fetch(f!("Failed to read {}: {}", what, e)))
    }

    async fn send(&self, url: &str, what: &str) -> Result<reqwest::Response, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(f!("Failed to send request for {}: {}", what, e)))?;

        check_status(response, what).await
    }
}

/// Log the HTTP status of a failed request and turn it into a fetch error
async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    match status {
        StatusCode::NOT_FOUND => log::warn!(
            "{} not found at {} (HTTP 404): wrong URL or private repository",
            what,
            url
        ),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => log::warn!(
            "{} forbidden at {} (HTTP {}): missing token scope or rate limit reached",
            what,
            url,
            status.as_u16()
        ),
        _ => log::warn!("{} request to {} failed with HTTP {}", what, url, status),
    }

    let body = response.text().await.unwrap_or_default();
    log::debug!("{} error body: {}", what, body);

    Err(Error::Fetch(f!("Failed to fetch {} [{}]", what, status)))
}
