#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use scout_core::client::SearchClient;
use scout_core::error::{Result, ScoutError};
use scout_core::model::{Project, SearchResponse, Task, User};
use tokio::sync::oneshot;

type Gate = oneshot::Receiver<Result<SearchResponse>>;

#[derive(Default)]
struct Inner {
    gates: Mutex<HashMap<String, Gate>>,
    calls: Mutex<Vec<String>>,
}

/// In-memory client whose responses are released by the test, so fetches
/// can be made to resolve in any order. Queries without a gate resolve
/// immediately with an empty response.
#[derive(Clone, Default)]
pub struct GatedClient {
    inner: Arc<Inner>,
}

impl GatedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the response for `query` (lower-cased, as submitted) until the
    /// returned sender fires.
    pub fn gate(&self, query: &str) -> oneshot::Sender<Result<SearchResponse>> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .gates
            .lock()
            .unwrap()
            .insert(query.to_string(), rx);
        tx
    }

    /// Queries submitted so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }
}

impl SearchClient for GatedClient {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        self.inner.calls.lock().unwrap().push(query.to_string());
        let gate = self.inner.gates.lock().unwrap().remove(query);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ScoutError::RemoteFetch("gate dropped".into()))),
            None => Ok(SearchResponse::default()),
        }
    }
}

pub fn response(tasks: &[&str], projects: &[&str], users: &[&str]) -> SearchResponse {
    SearchResponse {
        tasks: Some(
            tasks
                .iter()
                .enumerate()
                .map(|(i, t)| Task::new(i as i64 + 1, *t))
                .collect(),
        ),
        projects: Some(
            projects
                .iter()
                .enumerate()
                .map(|(i, p)| Project::new(i as i64 + 1, *p))
                .collect(),
        ),
        users: Some(
            users
                .iter()
                .enumerate()
                .map(|(i, u)| User::new(i as i64 + 1, *u))
                .collect(),
        ),
    }
}

pub fn unavailable() -> ScoutError {
    ScoutError::RemoteFetch("GET http://localhost:8000/search returned 503".into())
}
