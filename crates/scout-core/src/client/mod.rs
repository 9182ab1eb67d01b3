mod http;

pub use http::HttpSearchClient;

use crate::error::Result;
use crate::model::SearchResponse;

/// Remote source of raw search candidates. The HTTP API is the primary
/// implementation; tests and embedders can supply their own.
pub trait SearchClient: Send + Sync {
    /// Fetch candidates for an already lower-cased query.
    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<SearchResponse>> + Send;
}
