//! Local HTTP server standing in for GitHub and the completion provider

use crate::config::{ApiFlavor, CompletionConfig, GitHubConfig};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned responses served by [`MockProvider`]
#[derive(Debug, Clone)]
pub struct MockState {
    pub metadata: (StatusCode, serde_json::Value),
    pub readme: (StatusCode, String),
    pub listing: (StatusCode, serde_json::Value),
    /// file name -> (content type, body)
    pub files: HashMap<String, (&'static str, String)>,
    /// blob name -> blob JSON
    pub blobs: HashMap<String, serde_json::Value>,
    pub completion: (StatusCode, serde_json::Value),
}

impl MockState {
    /// A small Node.js repository whose completion succeeds
    pub fn happy(base: &str) -> Self {
        let license = base64::engine::general_purpose::STANDARD.encode("MIT License\n");

        Self {
            metadata: (
                StatusCode::OK,
                serde_json::json!({
                    "name": "hello-world",
                    "full_name": "octocat/hello-world",
                    "description": "My first repository",
                    "html_url": "https://github.com/octocat/hello-world",
                    "default_branch": "main"
                }),
            ),
            readme: (StatusCode::OK, "# Hello World\n\nRun `npm start`.\n".to_string()),
            listing: (
                StatusCode::OK,
                serde_json::json!([
                    {"name": "package.json", "type": "file", "download_url": format!("{base}/files/package.json"), "git_url": format!("{base}/blobs/package.json")},
                    {"name": "src", "type": "dir", "download_url": null, "git_url": format!("{base}/trees/src")},
                    {"name": "index.js", "type": "file", "download_url": format!("{base}/files/index.js"), "git_url": null},
                    {"name": "docs", "type": "dir", "download_url": null, "git_url": null},
                    {"name": "LICENSE", "type": "file", "download_url": null, "git_url": format!("{base}/blobs/LICENSE")}
                ]),
            ),
            files: HashMap::from([
                (
                    "package.json".to_string(),
                    (
                        "application/json",
                        r#"{"name": "app", "scripts": {"start": "node index.js"}}"#.to_string(),
                    ),
                ),
                (
                    "index.js".to_string(),
                    ("text/plain; charset=utf-8", "console.log('hello');\n".to_string()),
                ),
            ]),
            blobs: HashMap::from([(
                "LICENSE".to_string(),
                // GitHub wraps base64 content with newlines
                serde_json::json!({"content": format!("{license}\n"), "encoding": "base64"}),
            )]),
            completion: (
                StatusCode::OK,
                serde_json::json!({
                    "id": "chatcmpl-1",
                    "object": "chat.completion",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "\nFROM node:18\nCMD [\"node\", \"index.js\"]\n"},
                        "finish_reason": "stop"
                    }]
                }),
            ),
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    paths: Vec<String>,
    authorization: Vec<Option<String>>,
    completion_requests: Vec<serde_json::Value>,
}

struct Shared {
    state: MockState,
    recorded: Mutex<Recorded>,
}

impl Shared {
    fn record(&self, uri: &Uri, headers: &HeaderMap) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.paths.push(uri.path().to_string());
        recorded.authorization.push(
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }
}

/// A running mock server, stopped when the test runtime shuts down
pub struct MockProvider {
    pub base: String,
    shared: Arc<Shared>,
}

impl MockProvider {
    pub async fn start(setup: impl FnOnce(&str) -> MockState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let shared = Arc::new(Shared {
            state: setup(&base),
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/repos/{owner}/{repo}", get(metadata_handler))
            .route("/repos/{owner}/{repo}/contents", get(listing_handler))
            .route("/raw/{owner}/{repo}/{git_ref}/{*path}", get(readme_handler))
            .route("/files/{name}", get(file_handler))
            .route("/blobs/{name}", get(blob_handler))
            .route("/v1/chat/completions", post(completion_handler))
            .route("/v1/completions", post(completion_handler))
            .with_state(shared.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base, shared }
    }

    pub fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_base: self.base.clone(),
            raw_base: format!("{}/raw", self.base),
            token: None,
            readme_ref: GitHubConfig::DEFAULT_README_REF.to_string(),
            readme_path: GitHubConfig::DEFAULT_README_PATH.to_string(),
        }
    }

    pub fn completion_config(&self, api: ApiFlavor) -> CompletionConfig {
        CompletionConfig {
            base_url: format!("{}/v1", self.base),
            api_key: "sk-test".to_string(),
            model: CompletionConfig::DEFAULT_CHAT_MODEL.to_string(),
            api,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Number of requests whose path starts with `prefix`
    pub fn hits(&self, prefix: &str) -> usize {
        let recorded = self.shared.recorded.lock().unwrap();
        recorded
            .paths
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }

    /// `Authorization` header of every request, in arrival order
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.shared.recorded.lock().unwrap().authorization.clone()
    }

    pub fn last_completion_request(&self) -> Option<serde_json::Value> {
        self.shared
            .recorded
            .lock()
            .unwrap()
            .completion_requests
            .last()
            .cloned()
    }
}

async fn metadata_handler(
    State(shared): State<Arc<Shared>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    shared.record(&uri, &headers);
    let (status, body) = shared.state.metadata.clone();
    (status, Json(body)).into_response()
}

async fn listing_handler(
    State(shared): State<Arc<Shared>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    shared.record(&uri, &headers);
    let (status, body) = shared.state.listing.clone();
    (status, Json(body)).into_response()
}

async fn readme_handler(
    State(shared): State<Arc<Shared>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    shared.record(&uri, &headers);
    let (status, body) = shared.state.readme.clone();
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn file_handler(
    State(shared): State<Arc<Shared>>,
    Path(name): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    shared.record(&uri, &headers);
    match shared.state.files.get(&name) {
        Some((content_type, body)) => {
            ([(header::CONTENT_TYPE, *content_type)], body.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn blob_handler(
    State(shared): State<Arc<Shared>>,
    Path(name): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    shared.record(&uri, &headers);
    match shared.state.blobs.get(&name) {
        Some(blob) => Json(blob.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn completion_handler(
    State(shared): State<Arc<Shared>>,
    uri: Uri,
    headers: HeaderMap,
    Json(request): Json<serde_json::Value>,
) -> Response {
    shared.record(&uri, &headers);
    shared
        .recorded
        .lock()
        .unwrap()
        .completion_requests
        .push(request);
    let (status, body) = shared.state.completion.clone();
    (status, Json(body)).into_response()
}
