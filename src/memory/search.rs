//! Quality-aware search with a transparent confidence fallback.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::confidence::{calculate_confidence, round4};
use crate::errors::Error;
use crate::memory_types::{
    CitationMode, Fallback, SearchHit, SearchRequest, SearchResponse, now_timestamp,
};
use crate::similarity::{jaccard, token_set};

use super::store::{MemoryStore, validate_limit};

fn validate_min_confidence(min_confidence: f64) -> Result<(), Error> {
    if !min_confidence.is_finite() || !(0.0..=1.0).contains(&min_confidence) {
        return Err(Error::InvalidInput(format!(
            "min_confidence {min_confidence} must be between 0.0 and 1.0"
        )));
    }
    Ok(())
}

impl MemoryStore {
    #[must_use = "handle the error or results may be lost"]
    /// Search memories ranked by `confidence × relevance`.
    ///
    /// Runs a strict pass at `request.min_confidence`. When that yields
    /// nothing and the floor was above zero, runs one relaxed pass at zero
    /// over every source type and reports it in `fallback`.
    ///
    /// Every matching entry (not only the returned top results) has its
    /// access statistics bumped and its stored confidence recomputed with
    /// the query relevance. The snapshot is rewritten before returning.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Query is empty or exceeds 100,000 bytes
    /// - `max_results` is 0 or exceeds `MAX_SEARCH_LIMIT`
    /// - `min_confidence` is outside `[0, 1]`
    /// - The snapshot cannot be written (`Persistence`)
    pub fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse, Error> {
        let query = request.query.trim();
        Self::validate_input_length(query)?;
        validate_limit(request.max_results)?;
        validate_min_confidence(request.min_confidence)?;

        let query_tokens = token_set(query);

        let mut threshold = request.min_confidence;
        let mut fallback = Fallback::unused();
        let source_filter = request.source_filter.as_deref();
        let mut results =
            self.ranked_pass(&query_tokens, source_filter, request.max_results, threshold);

        if results.is_empty() && threshold > 0.0 {
            tracing::warn!(
                query,
                threshold,
                "no results above confidence threshold, retrying at 0"
            );
            fallback = Fallback::relaxed(threshold);
            threshold = 0.0;
            // The relaxed pass keeps the query and limit but drops the source filter.
            results = self.ranked_pass(&query_tokens, None, request.max_results, threshold);
        }

        self.persist()?;

        let citations = if results.iter().any(|hit| hit.entry.citation.is_some()) {
            CitationMode::Auto
        } else {
            CitationMode::None
        };

        Ok(SearchResponse {
            query: request.query.clone(),
            count: results.len(),
            results,
            min_confidence_threshold: threshold,
            fallback,
            citations,
        })
    }

    /// One filtering and ranking pass over the index at `min_confidence`.
    fn ranked_pass(
        &mut self,
        query_tokens: &HashSet<String>,
        source_filter: Option<&str>,
        max_results: usize,
        min_confidence: f64,
    ) -> Vec<SearchHit> {
        let now = now_timestamp();
        let mut hits = Vec::new();

        for (id, entry) in self.index.iter_mut() {
            if entry.confidence < min_confidence {
                continue;
            }
            if let Some(source) = source_filter {
                if entry.source_type != source {
                    continue;
                }
            }

            let relevance = jaccard(query_tokens, &token_set(&entry.content));
            if relevance == 0.0 {
                continue;
            }

            entry.record_access(&now);
            entry.confidence = calculate_confidence(entry, Some(relevance));

            hits.push(SearchHit {
                id: id.to_string(),
                entry: entry.clone(),
                relevance_score: round4(relevance),
                combined_score: round4(entry.confidence * relevance),
            });
        }

        hits.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(max_results);

        tracing::debug!(threshold = min_confidence, hits = hits.len(), "search pass");
        hits
    }
}
