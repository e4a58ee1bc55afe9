//! Common test utilities: scripted transports, fake search backends and fixtures

#![allow(dead_code)]

use ghsearch::search::transport::{HttpRequest, HttpResponse, Transport};
use ghsearch::search::{RepositoryItem, RepositorySearch, SearchError, SearchPage, SearchParams};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Transport that replays canned responses and records every request
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, SearchError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse, SearchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(responses: Vec<HttpResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, SearchError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SearchError::Network("no scripted response left".into())))
    }
}

/// A repository item with predictable fields
pub fn repo(id: u64, name: &str, stars: u64) -> RepositoryItem {
    RepositoryItem {
        id,
        name: name.to_string(),
        full_name: Some(format!("owner/{name}")),
        visibility: "public".to_string(),
        stargazers_count: stars,
        description: Some(format!("{name} description")),
        html_url: format!("https://github.com/owner/{name}"),
        language: Some("Rust".to_string()),
    }
}

/// JSON body of a successful search response
pub fn search_body(total_count: u64, names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": i + 1,
                "name": name,
                "full_name": format!("owner/{name}"),
                "visibility": "public",
                "stargazers_count": 1000 - i as u64,
                "description": format!("{name} description"),
                "html_url": format!("https://github.com/owner/{name}"),
                "language": "Rust",
                "forks_count": 3
            })
        })
        .collect();

    json!({
        "total_count": total_count,
        "incomplete_results": false,
        "items": items
    })
    .to_string()
}

pub fn ok_response(total_count: u64, names: &[&str]) -> HttpResponse {
    HttpResponse::new(200, search_body(total_count, names))
}

/// 403 carrying the primary rate-limit headers
pub fn primary_limit(retry_after_secs: u64) -> HttpResponse {
    HttpResponse::new(403, r#"{"message":"API rate limit exceeded for 127.0.0.1."}"#)
        .with_header("x-ratelimit-remaining", "0")
        .with_header("retry-after", retry_after_secs.to_string())
}

/// 403 with the abuse-detection message
pub fn secondary_limit() -> HttpResponse {
    HttpResponse::new(
        403,
        r#"{"message":"You have exceeded a secondary rate limit and have been temporarily blocked."}"#,
    )
    .with_header("retry-after", "60")
}

/// Search backend answering from a keyword table, with optional per-keyword delay
pub struct FakeSearch {
    pages: HashMap<String, SearchPage>,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, SearchError>,
    calls: Mutex<Vec<SearchParams>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delays: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, keyword: &str, total_count: u64, names: &[&str]) -> Self {
        let items = names
            .iter()
            .enumerate()
            .map(|(i, name)| repo(i as u64 + 1, name, 1000 - i as u64))
            .collect();
        self.pages.insert(
            keyword.to_string(),
            SearchPage {
                total_count,
                incomplete_results: false,
                items,
            },
        );
        self
    }

    pub fn with_delay(mut self, keyword: &str, delay: Duration) -> Self {
        self.delays.insert(keyword.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, keyword: &str, error: SearchError) -> Self {
        self.failures.insert(keyword.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<SearchParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RepositorySearch for FakeSearch {
    async fn search(&self, params: &SearchParams, _per_page: u32) -> Result<SearchPage, SearchError> {
        self.calls.lock().unwrap().push(params.clone());

        if let Some(delay) = self.delays.get(&params.keyword) {
            tokio::time::sleep(*delay).await;
        }
        if params.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if let Some(error) = self.failures.get(&params.keyword) {
            return Err(error.clone());
        }
        Ok(self.pages.get(&params.keyword).cloned().unwrap_or(SearchPage {
            total_count: 0,
            incomplete_results: false,
            items: Vec::new(),
        }))
    }
}

/// Test fixture for config files
pub struct TestFixture {
    /// Temporary directory that gets cleaned up automatically
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read test file")
    }
}
