use crate::config::ApiConfig;
use crate::error::{Result, ScoutError};
use crate::model::{SearchResponse, Task};

use super::SearchClient;

/// Longest body excerpt carried in an error message.
const BODY_PREVIEW_LEN: usize = 300;

/// Search client for the project-management REST API.
///
/// Issues `GET {base_url}/search?query=<q>` and decodes the
/// `{ tasks, projects, users }` payload. Also lists a project's tasks via
/// `GET {base_url}/tasks?projectId=<id>` for the timeline. Failures are
/// returned once; there is no retry.
pub struct HttpSearchClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpSearchClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url).map_err(|e| {
            ScoutError::InvalidInput(format!("invalid api.base_url '{base_url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScoutError::InvalidInput(format!(
                "api.base_url must be http or https, got '{base_url}'"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

impl HttpSearchClient {
    /// Every task of one project, in API order.
    pub async fn project_tasks(&self, project_id: i64) -> Result<Vec<Task>> {
        let id = project_id.to_string();
        self.get_json("tasks", &[("projectId", id.as_str())]).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        let request_url = reqwest::Url::parse_with_params(&url, params)
            .map_err(|e| ScoutError::InvalidInput(format!("invalid request url '{url}': {e}")))?;
        let resp = self.http.get(request_url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ScoutError::RemoteFetch(format!(
                "GET {url} returned {status}: {}",
                preview(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ScoutError::RemoteFetch(format!(
                "failed to decode {path} response: {e}\nBody: {}",
                preview(&body)
            ))
        })
    }
}

impl SearchClient for HttpSearchClient {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        self.get_json("search", &[("query", query)]).await
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://pm.local:8000/".to_string(),
            ..Default::default()
        };
        let client = HttpSearchClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://pm.local:8000");
        assert_eq!(client.endpoint(), "http://pm.local:8000/search");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        for base_url in ["not a url", "ftp://pm.local"] {
            let config = ApiConfig {
                base_url: base_url.to_string(),
                ..Default::default()
            };
            let err = HttpSearchClient::new(&config).err().unwrap();
            assert!(matches!(err, ScoutError::InvalidInput(_)), "{base_url}: {err}");
            assert!(!err.is_fetch_failure());
        }
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let p = preview(&body);
        assert_eq!(p.chars().count(), BODY_PREVIEW_LEN);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_fetch_failure() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            connect_timeout_secs: 1,
        };
        let client = HttpSearchClient::new(&config).unwrap();
        let err = client.search("alpha").await.unwrap_err();
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_task_listing() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            connect_timeout_secs: 1,
        };
        let client = HttpSearchClient::new(&config).unwrap();
        let err = client.project_tasks(4).await.unwrap_err();
        assert!(err.is_fetch_failure());
    }
}
