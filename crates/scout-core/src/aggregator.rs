//! Remote fetch plus per-variant fuzzy ranking, guarded by a generation token.
//!
//! Every issued query bumps a monotonically increasing generation, including
//! queries too short to search. A fetch that resolves after a newer query was
//! issued is reported as [`Aggregation::Stale`] and must not be displayed, so
//! the last *issued* query always wins regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::client::SearchClient;
use crate::config::SearchConfig;
use crate::fuzzy::{FuzzyMatcher, MatchOptions};
use crate::model::{AggregatedResult, CandidateSet, Query};

/// A query that qualified for a remote fetch, stamped with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub query: Query,
}

/// What issuing a query decided, synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issued {
    /// Query shorter than the minimum: nothing to fetch.
    Idle { generation: u64 },
    Fetch(Ticket),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub query: Query,
    pub generation: u64,
    pub message: String,
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "search for '{}' failed: {}", self.query, self.message)
    }
}

/// Outcome of one aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Idle { generation: u64 },
    Ready(AggregatedResult),
    Failed(FetchFailure),
    /// Superseded by a newer query before the fetch resolved. Never shown.
    Stale { query: Query, generation: u64 },
}

impl Aggregation {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Idle { generation } | Self::Stale { generation, .. } => *generation,
            Self::Ready(result) => result.generation,
            Self::Failed(failure) => failure.generation,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

pub struct ResultAggregator<C> {
    client: C,
    matcher: FuzzyMatcher,
    min_query_len: usize,
    latest: AtomicU64,
}

impl<C: SearchClient> ResultAggregator<C> {
    pub fn new(client: C, config: &SearchConfig) -> Self {
        Self::with_matcher(
            client,
            FuzzyMatcher::new(MatchOptions::from(config)),
            config.min_query_len,
        )
    }

    pub fn with_matcher(client: C, matcher: FuzzyMatcher, min_query_len: usize) -> Self {
        Self {
            client,
            matcher,
            min_query_len: min_query_len.max(1),
            latest: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    pub fn min_query_len(&self) -> usize {
        self.min_query_len
    }

    /// Generation of the most recently issued query (0 before any).
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest_generation() == generation
    }

    pub fn qualifies(&self, query: &Query) -> bool {
        query.char_len() >= self.min_query_len
    }

    /// Stamp `query` with the next generation. Anything issued earlier
    /// becomes stale from this point on.
    pub fn issue(&self, query: Query) -> Issued {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        if self.qualifies(&query) {
            tracing::debug!(generation, query = %query, "issuing search");
            Issued::Fetch(Ticket { generation, query })
        } else {
            tracing::debug!(generation, len = query.char_len(), "query below minimum length, idle");
            Issued::Idle { generation }
        }
    }

    /// Fetch and rank candidates for an issued ticket. Exactly one remote
    /// call; errors are converted to [`Aggregation::Failed`].
    pub async fn resolve(&self, ticket: Ticket) -> Aggregation {
        let fetched = self.client.search(&ticket.query.normalized()).await;

        if !self.is_current(ticket.generation) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.latest_generation(),
                query = %ticket.query,
                "discarding stale search result"
            );
            return Aggregation::Stale {
                query: ticket.query,
                generation: ticket.generation,
            };
        }

        match fetched {
            Ok(response) => Aggregation::Ready(self.rank(&ticket, response.into_candidates())),
            Err(e) => {
                tracing::warn!(
                    generation = ticket.generation,
                    query = %ticket.query,
                    error = %e,
                    "search fetch failed"
                );
                Aggregation::Failed(FetchFailure {
                    query: ticket.query,
                    generation: ticket.generation,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Issue and resolve in one step.
    pub async fn aggregate(&self, query: impl Into<Query>) -> Aggregation {
        match self.issue(query.into()) {
            Issued::Idle { generation } => Aggregation::Idle { generation },
            Issued::Fetch(ticket) => self.resolve(ticket).await,
        }
    }

    /// Rank each variant independently against the ticket's query.
    pub fn rank(&self, ticket: &Ticket, candidates: CandidateSet) -> AggregatedResult {
        let pattern = self.matcher.compile(ticket.query.as_str());
        AggregatedResult {
            query: ticket.query.clone(),
            generation: ticket.generation,
            tasks: self.matcher.rank_compiled(&pattern, candidates.tasks),
            projects: self.matcher.rank_compiled(&pattern, candidates.projects),
            users: self.matcher.rank_compiled(&pattern, candidates.users),
        }
    }
}
