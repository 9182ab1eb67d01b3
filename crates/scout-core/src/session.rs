//! Interactive search session: debounced input in, render frames out.
//!
//! A single task owns the debouncer, the aggregator and the current state.
//! Fetches run concurrently in a [`JoinSet`] but their outcomes are applied
//! on the session task, one at a time, and only while their generation is
//! still the latest issued one.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

use crate::aggregator::{Aggregation, Issued, ResultAggregator};
use crate::client::SearchClient;
use crate::config::SearchConfig;
use crate::debounce::QueryDebouncer;
use crate::facet::{ActiveFacet, Projection};
use crate::memo::Memo;
use crate::model::{AggregatedResult, Query};

/// Pipeline state. Exactly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading { query: Query },
    Ready(Arc<AggregatedResult>),
    Failed { query: Query, reason: String },
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Idle,
    Loading { query: Query },
    Ready(Arc<Projection>),
    Failed { query: Query, reason: String },
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Ready(_) => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Generation of the query that produced `view` (0 before any input).
    pub generation: u64,
    pub facet: ActiveFacet,
    pub view: View,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self {
            generation: 0,
            facet: ActiveFacet::All,
            view: View::Idle,
        }
    }
}

#[derive(Debug)]
enum Command {
    Input(String),
    SetFacet(ActiveFacet),
    Retry,
    Shutdown,
}

/// Handle to a running session. Dropping it stops the session as well.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    frames: watch::Receiver<RenderFrame>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Current raw value of the search box.
    pub fn input(&self, text: impl Into<String>) {
        self.send(Command::Input(text.into()));
    }

    pub fn set_facet(&self, facet: ActiveFacet) {
        self.send(Command::SetFacet(facet));
    }

    /// Re-issue the last settled query.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Returns false once the session task has stopped.
    fn send(&self, command: Command) -> bool {
        match self.commands.send(command) {
            Ok(()) => true,
            Err(mpsc::error::SendError(command)) => {
                tracing::debug!(?command, "search session stopped, dropping command");
                false
            }
        }
    }

    pub fn frames(&self) -> watch::Receiver<RenderFrame> {
        self.frames.clone()
    }

    pub fn current(&self) -> RenderFrame {
        self.frames.borrow().clone()
    }

    /// Cancel the debouncer, abort in-flight fetches and wait for the
    /// session task to finish.
    pub async fn shutdown(self) {
        self.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "search session task ended abnormally");
        }
    }
}

pub struct SearchSession<C> {
    aggregator: Arc<ResultAggregator<C>>,
    debouncer: QueryDebouncer,
    state: SearchState,
    generation: u64,
    facet: ActiveFacet,
    last_settled: Option<Query>,
    projections: Memo<(u64, ActiveFacet), Arc<Projection>>,
    fetches: JoinSet<Aggregation>,
    frames: watch::Sender<RenderFrame>,
}

impl<C: SearchClient + 'static> SearchSession<C> {
    /// Start a session on the current tokio runtime.
    pub fn spawn(client: C, config: &SearchConfig) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (frames_tx, frames_rx) = watch::channel(RenderFrame::default());

        let session = Self {
            aggregator: Arc::new(ResultAggregator::new(client, config)),
            debouncer: QueryDebouncer::new(config.debounce()),
            state: SearchState::Idle,
            generation: 0,
            facet: ActiveFacet::All,
            last_settled: None,
            projections: Memo::new(),
            fetches: JoinSet::new(),
            frames: frames_tx,
        };
        let task = tokio::spawn(session.run(commands_rx));

        SessionHandle {
            commands: commands_tx,
            frames: frames_rx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let wake = self.debouncer.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Input(text)) => self.debouncer.push(text),
                    Some(Command::SetFacet(facet)) => self.set_facet(facet),
                    Some(Command::Retry) => self.retry(),
                    Some(Command::Shutdown) | None => break,
                },
                _ = tokio::time::sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {
                    if let Some(value) = self.debouncer.take_settled(Instant::now()) {
                        self.settle(Query::new(value));
                    }
                }
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => match joined {
                    Ok(outcome) => self.apply(outcome),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => tracing::warn!(error = %e, "search fetch task panicked"),
                },
            }
        }

        self.debouncer.cancel();
        self.fetches.abort_all();
        tracing::debug!(generation = self.generation, "search session stopped");
    }

    fn settle(&mut self, query: Query) {
        tracing::debug!(query = %query, "query settled");
        self.last_settled = Some(query.clone());
        self.issue(query);
    }

    fn retry(&mut self) {
        match self.last_settled.clone() {
            Some(query) => {
                tracing::debug!(query = %query, "retrying last settled query");
                self.issue(query);
            }
            None => tracing::debug!("retry requested before any query settled"),
        }
    }

    fn issue(&mut self, query: Query) {
        match self.aggregator.issue(query) {
            Issued::Idle { generation } => self.transition(SearchState::Idle, generation),
            Issued::Fetch(ticket) => {
                let generation = ticket.generation;
                let query = ticket.query.clone();
                let aggregator = Arc::clone(&self.aggregator);
                self.fetches
                    .spawn(async move { aggregator.resolve(ticket).await });
                self.transition(SearchState::Loading { query }, generation);
            }
        }
    }

    fn apply(&mut self, outcome: Aggregation) {
        let generation = outcome.generation();
        // The token may have moved on between resolve and delivery
        if !self.aggregator.is_current(generation) {
            tracing::debug!(
                generation,
                latest = self.aggregator.latest_generation(),
                "dropping superseded search outcome"
            );
            return;
        }

        match outcome {
            Aggregation::Ready(result) => {
                self.transition(SearchState::Ready(Arc::new(result)), generation)
            }
            Aggregation::Failed(failure) => self.transition(
                SearchState::Failed {
                    query: failure.query,
                    reason: failure.message,
                },
                generation,
            ),
            Aggregation::Idle { .. } | Aggregation::Stale { .. } => {}
        }
    }

    fn set_facet(&mut self, facet: ActiveFacet) {
        self.facet = facet;
        self.publish();
    }

    fn transition(&mut self, state: SearchState, generation: u64) {
        self.state = state;
        self.generation = generation;
        self.publish();
    }

    fn publish(&mut self) {
        let facet = self.facet;
        let view = match &self.state {
            SearchState::Idle => View::Idle,
            SearchState::Loading { query } => View::Loading {
                query: query.clone(),
            },
            SearchState::Ready(result) => {
                let projection = self
                    .projections
                    .get_or_compute((result.generation, facet), |_| {
                        Arc::new(Projection::new(result, facet))
                    });
                View::Ready(Arc::clone(projection))
            }
            SearchState::Failed { query, reason } => View::Failed {
                query: query.clone(),
                reason: reason.clone(),
            },
        };

        self.frames.send_replace(RenderFrame {
            generation: self.generation,
            facet,
            view,
        });
    }
}
