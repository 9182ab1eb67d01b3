//! Approximate matching of a query against each candidate's match key.
//!
//! Scoring is delegated to `fuse-rust`, a bitap (shift-or) search that
//! tolerates insertions, deletions and substitutions. A match found with `e`
//! errors at byte position `p` scores `e / pattern_len + |p - location| / distance`,
//! so typos and late matches both push the distance up. Candidates whose best
//! score exceeds the threshold are dropped; the rest are sorted ascending,
//! stable on ties.

use fuse_rust::Fuse;

use crate::config::SearchConfig;
use crate::model::{Matchable, ScoredMatch};

/// Longest slice of a query scored as one bitap pattern. Longer queries are
/// split on char boundaries and the chunk scores averaged.
const MAX_PATTERN_BYTES: usize = 32;

/// Distance reported for a non-identical match, so that only an identical
/// key can score a perfect 0.0.
const MIN_INEXACT_DISTANCE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    /// Maximum distance still considered a match. 0.0 accepts only identical keys.
    pub threshold: f64,
    /// Byte position where a match is expected to start.
    pub location: usize,
    /// How many bytes away from `location` a match may drift before
    /// the positional penalty alone reaches 1.0.
    pub distance: usize,
    /// Score on errors only, ignoring where in the key the match sits.
    pub ignore_location: bool,
    pub case_sensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            location: 0,
            distance: 100,
            ignore_location: false,
            case_sensitive: false,
        }
    }
}

impl From<&SearchConfig> for MatchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            threshold: config.threshold,
            location: config.location,
            distance: config.distance,
            ignore_location: config.ignore_location,
            case_sensitive: false,
        }
    }
}

/// One bitap-sized slice of a compiled pattern.
struct Chunk {
    pattern: fuse_rust::Pattern,
    /// Byte offset of the slice within the query.
    start: usize,
}

/// A query compiled once and reused across every candidate of every variant.
pub struct Pattern {
    text: String,
    chunks: Vec<Chunk>,
}

impl Pattern {
    pub fn new(query: &str, case_sensitive: bool) -> Self {
        let text = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };

        // Case is already folded above; fuse must not fold it again.
        let compiler = Fuse {
            is_case_sensitive: true,
            ..Fuse::default()
        };
        let chunks = split_chunks(&text)
            .into_iter()
            .filter_map(|(start, slice)| {
                let pattern = compiler.create_pattern(slice)?;
                Some(Chunk { pattern, start })
            })
            .collect();

        Self { text, chunks }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("text", &self.text)
            .field(
                "chunk_starts",
                &self.chunks.iter().map(|c| c.start).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// `(byte_offset, slice)` pieces of at most [`MAX_PATTERN_BYTES`], never
/// splitting a character.
fn split_chunks(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if idx + c.len_utf8() - start > MAX_PATTERN_BYTES {
            pieces.push((start, &text[start..idx]));
            start = idx;
        }
    }
    if start < text.len() {
        pieces.push((start, &text[start..]));
    }
    pieces
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Ranks candidates of a single variant against a query.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    options: MatchOptions,
}

impl FuzzyMatcher {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn compile(&self, query: &str) -> Pattern {
        Pattern::new(query, self.options.case_sensitive)
    }

    /// Scorer for a chunk starting `offset` bytes into the query.
    fn fuse_at(&self, offset: usize) -> Fuse {
        let distance = if self.options.ignore_location {
            i32::MAX
        } else {
            to_i32(self.options.distance)
        };
        Fuse {
            location: to_i32(self.options.location.saturating_add(offset)),
            distance,
            threshold: self.options.threshold,
            is_case_sensitive: true,
            ..Fuse::default()
        }
    }

    /// Distance of `text` from the compiled pattern, or `None` if it is not a match.
    pub fn score(&self, pattern: &Pattern, text: &str) -> Option<f64> {
        if pattern.is_empty() {
            return None;
        }

        let key = if self.options.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        };
        if key == pattern.text {
            return Some(0.0);
        }
        if key.is_empty() {
            return None;
        }

        let mut any_match = false;
        let mut total = 0.0;
        for chunk in &pattern.chunks {
            match self.fuse_at(chunk.start).search(Some(&chunk.pattern), &key) {
                Some(hit) if hit.score <= self.options.threshold => {
                    any_match = true;
                    total += hit.score.max(MIN_INEXACT_DISTANCE);
                }
                _ => total += 1.0,
            }
        }
        if !any_match {
            return None;
        }

        let distance = total / pattern.chunks.len() as f64;
        (distance <= self.options.threshold).then_some(distance)
    }

    /// Rank `candidates` against `query`, best first.
    pub fn rank<T: Matchable>(&self, query: &str, candidates: Vec<T>) -> Vec<ScoredMatch<T>> {
        let pattern = self.compile(query);
        self.rank_compiled(&pattern, candidates)
    }

    /// Like [`rank`](Self::rank) with a pattern compiled up front.
    pub fn rank_compiled<T: Matchable>(
        &self,
        pattern: &Pattern,
        candidates: Vec<T>,
    ) -> Vec<ScoredMatch<T>> {
        let mut matches: Vec<ScoredMatch<T>> = candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let distance = self.score(pattern, item.match_key())?;
                Some(ScoredMatch {
                    item,
                    distance,
                    index,
                })
            })
            .collect();

        // sort_by is stable: equal distances keep candidate order.
        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches
    }
}
