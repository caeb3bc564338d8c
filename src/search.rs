//! Vectorless retrieval over a built index artifact.
//!
//! A query descends the outline greedily: every frontier node's title is
//! scored against the question, the best node is entered, and its children
//! become the next frontier. Only one root-to-leaf path is explored per
//! query; siblings not chosen are scored but never revisited. The visited
//! nodes are then ranked to produce citations and the final answer.

use crate::error::{Error, Result};
use crate::score::combined_score;
use crate::tree::{IndexArtifact, IndexNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Answer returned when no visited node scored above zero.
pub const FALLBACK_ANSWER: &str = "No relevant content found in the document.";

/// Maximum answer length, in characters.
pub const ANSWER_CHAR_LIMIT: usize = 2000;

/// How many of a node's leading spans feed its citation excerpt.
pub const EXCERPT_SPANS: usize = 2;

/// Default number of citations returned.
pub const DEFAULT_TOP_K: usize = 3;

/// Retrieval strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Greedy lexical descent; no external calls.
    #[default]
    Vectorless,
    /// LLM-guided descent; requires navigation to be enabled in config.
    Llm,
}

/// A question against one indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Document identity, as provided at indexing time.
    pub document_id: String,
    /// Natural-language question.
    pub question: String,
    /// Number of citations to return, at least 1.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub mode: QueryMode,
    /// When false, the citation list is cleared from the response.
    #[serde(default = "default_true")]
    pub include_citations: bool,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_true() -> bool {
    true
}

impl QueryRequest {
    /// Build a request with default top-k, mode, and citation settings.
    pub fn new(document_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            question: question.into(),
            top_k: DEFAULT_TOP_K,
            mode: QueryMode::default(),
            include_citations: true,
        }
    }
}

/// One node selected into the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub node_id: String,
    /// Page the cited node starts on.
    pub page: usize,
    pub section_title: String,
    pub title: String,
    /// Up to the first two owned spans, newline-joined.
    pub excerpt: String,
    pub score: f64,
}

/// Records every descent step, in visitation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryTrace {
    pub visited_node_ids: Vec<String>,
    /// Human-readable log of each selection with its score.
    pub decisions: Vec<String>,
}

/// The answer plus its supporting citations and decision trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Concatenated citation excerpts, or the fixed fallback string.
    pub answer: String,
    /// Ordered by descending score.
    pub citations: Vec<Citation>,
    pub trace: QueryTrace,
}

/// A retrieval strategy over a built artifact.
///
/// The baseline greedy scorer and any guided navigator are variants of this
/// one capability, so callers stay strategy-agnostic.
pub trait Retriever {
    /// Answer a question against an artifact.
    fn retrieve(&self, artifact: &IndexArtifact, request: &QueryRequest) -> Result<QueryResponse>;
}

/// Greedy best-first descent using the combined lexical score.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyTreeRetriever;

impl Retriever for GreedyTreeRetriever {
    fn retrieve(&self, artifact: &IndexArtifact, request: &QueryRequest) -> Result<QueryResponse> {
        if request.top_k == 0 {
            return Err(Error::invalid_input("top_k must be at least 1"));
        }
        let root = artifact
            .root()
            .ok_or_else(|| Error::corrupt("artifact has no root node"))?;
        let nodes_by_id = artifact.nodes_by_id();

        let mut trace = QueryTrace::default();
        let mut visited: Vec<(String, f64)> = Vec::new();
        let mut frontier: Vec<&str> = vec![root.node_id.as_str()];

        loop {
            let mut best: Option<(&IndexNode, f64)> = None;
            for &candidate_id in &frontier {
                let node = *nodes_by_id.get(candidate_id).ok_or_else(|| {
                    Error::corrupt(format!("frontier references missing node '{candidate_id}'"))
                })?;
                let score = combined_score(&request.question, &node.title);
                // Strict comparison keeps the earliest frontier entry on ties.
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((node, score));
                }
            }
            let Some((selected, score)) = best else {
                break;
            };

            trace.visited_node_ids.push(selected.node_id.clone());
            trace
                .decisions
                .push(format!("selected {} score={:.3}", selected.node_id, score));
            visited.push((selected.node_id.clone(), score));

            if selected.is_leaf() {
                break;
            }
            frontier = selected.child_ids.iter().map(String::as_str).collect();
        }

        debug!(
            document_id = %artifact.document_id,
            steps = trace.visited_node_ids.len(),
            "descent complete"
        );
        assemble_response(artifact, request, visited, trace)
    }
}

/// Rank visited nodes, build citations, and synthesize the answer.
///
/// Shared by every retrieval strategy so that answer shape stays uniform
/// regardless of how the descent chose its path.
pub(crate) fn assemble_response(
    artifact: &IndexArtifact,
    request: &QueryRequest,
    mut visited: Vec<(String, f64)>,
    trace: QueryTrace,
) -> Result<QueryResponse> {
    let nodes_by_id = artifact.nodes_by_id();
    let spans_by_id = artifact.spans_by_id();

    // Zero-score nodes never make the answer; an all-zero descent must
    // degrade to the fallback with no citations.
    visited.retain(|(_, score)| *score > 0.0);
    visited.sort_by(|a, b| b.1.total_cmp(&a.1));
    visited.truncate(request.top_k);

    let mut citations = Vec::with_capacity(visited.len());
    for (node_id, score) in visited {
        let node = *nodes_by_id
            .get(node_id.as_str())
            .ok_or_else(|| Error::corrupt(format!("visited node '{node_id}' is missing")))?;

        let mut excerpt_parts = Vec::new();
        for span_id in node.span_ids.iter().take(EXCERPT_SPANS) {
            let span = *spans_by_id.get(span_id.as_str()).ok_or_else(|| {
                Error::corrupt(format!("node '{node_id}' references missing span '{span_id}'"))
            })?;
            if !span.text.is_empty() {
                excerpt_parts.push(span.text.as_str());
            }
        }

        citations.push(Citation {
            node_id,
            page: node.page_start,
            section_title: node.title.clone(),
            title: node.title.clone(),
            excerpt: excerpt_parts.join("\n"),
            score,
        });
    }

    let mut answer: String = citations
        .iter()
        .filter(|citation| !citation.excerpt.is_empty())
        .map(|citation| citation.excerpt.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if answer.chars().count() > ANSWER_CHAR_LIMIT {
        answer = answer.chars().take(ANSWER_CHAR_LIMIT).collect();
    }
    if answer.is_empty() {
        answer = FALLBACK_ANSWER.to_string();
    }

    if !request.include_citations {
        citations.clear();
    }

    Ok(QueryResponse {
        answer,
        citations,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::IndexBuilder;

    fn demo_artifact() -> IndexArtifact {
        IndexBuilder::new(10)
            .build(
                "demo",
                "Introduction to RAG\n\nRAG combines retrieval and generation.",
            )
            .unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let artifact = demo_artifact();
        let mut request = QueryRequest::new("demo", "RAG");
        request.top_k = 1;

        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].page, 1);
        assert!(response.citations[0].excerpt.contains("RAG"));
        assert!(response.answer.contains("RAG"));
        assert_eq!(
            response.trace.visited_node_ids,
            vec!["doc-demo", "page-1", "page-1-sec-1"]
        );
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let artifact = demo_artifact();
        let request = QueryRequest::new("demo", "zzzz");

        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        assert_eq!(response.answer, FALLBACK_ANSWER);
        assert!(response.citations.is_empty());
        // The descent still ran and is visible in the trace.
        assert_eq!(response.trace.visited_node_ids.len(), 3);
    }

    #[test]
    fn test_descent_follows_single_path() {
        let text = format!("{}\n\n{}", "x".repeat(2100), "y".repeat(2100));
        let artifact = IndexBuilder::new(10).build("doc", &text).unwrap();
        let request = QueryRequest::new("doc", "Page 2");

        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        let visited = &response.trace.visited_node_ids;
        assert_eq!(visited.len(), 3);
        assert_eq!(visited[1], "page-2");
        assert_eq!(visited[2], "page-2-sec-1");
        assert_eq!(response.trace.decisions.len(), 3);
        assert!(response.trace.decisions[1].starts_with("selected page-2 score="));
    }

    #[test]
    fn test_tie_break_selects_earliest_frontier_entry() {
        let text = format!("{}\n\n{}", "x".repeat(2100), "y".repeat(2100));
        let artifact = IndexBuilder::new(10).build("doc", &text).unwrap();
        // Shares nothing with any title, so every frontier scores all zeros.
        let request = QueryRequest::new("doc", "zzzz");

        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        assert_eq!(response.trace.visited_node_ids[1], "page-1");
    }

    #[test]
    fn test_top_k_zero_is_rejected() {
        let artifact = demo_artifact();
        let mut request = QueryRequest::new("demo", "RAG");
        request.top_k = 0;

        assert!(matches!(
            GreedyTreeRetriever.retrieve(&artifact, &request),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_include_citations_false_keeps_answer() {
        let artifact = demo_artifact();
        let mut request = QueryRequest::new("demo", "RAG");
        request.include_citations = false;

        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        assert!(response.citations.is_empty());
        assert!(response.answer.contains("RAG"));
    }

    #[test]
    fn test_empty_artifact_is_rejected() {
        let artifact = IndexArtifact {
            document_id: "broken".to_string(),
            nodes: vec![],
            spans: vec![],
        };
        let request = QueryRequest::new("broken", "anything");

        assert!(matches!(
            GreedyTreeRetriever.retrieve(&artifact, &request),
            Err(Error::ArtifactCorrupt(_))
        ));
    }

    #[test]
    fn test_answer_truncated_to_char_limit() {
        // Two spans on one page whose joined text exceeds the limit.
        let text = format!("{}\n\n{}", "x".repeat(1500), "x".repeat(600));
        let artifact = IndexBuilder::new(10).build("doc", &text).unwrap();
        let request = QueryRequest::new("doc", "page");

        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        assert_eq!(response.answer.chars().count(), ANSWER_CHAR_LIMIT);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"document_id": "d", "question": "q"}"#).unwrap();

        assert_eq!(request.top_k, DEFAULT_TOP_K);
        assert_eq!(request.mode, QueryMode::Vectorless);
        assert!(request.include_citations);
        assert_eq!(serde_json::to_string(&QueryMode::Llm).unwrap(), "\"llm\"");
    }

    #[test]
    fn test_response_roundtrips_through_json() {
        let artifact = demo_artifact();
        let request = QueryRequest::new("demo", "RAG");
        let response = GreedyTreeRetriever.retrieve(&artifact, &request).unwrap();

        let json = serde_json::to_string(&response).unwrap();
        let parsed: QueryResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, response);
    }
}
