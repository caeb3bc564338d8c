//! LLM-guided descent over a built index artifact.
//!
//! Mirrors the greedy retriever's contract: one root-to-leaf path, a full
//! decision trace, and the shared answer assembly. The LLM only picks which
//! child to enter at each level; citation ranking still uses the lexical
//! score so answers stay comparable across modes.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::llm::client::LlmClient;
use crate::llm::prompts::Prompts;
use crate::score::combined_score;
use crate::search::{assemble_response, QueryRequest, QueryResponse, QueryTrace};
use crate::tree::{IndexArtifact, IndexNode};
use serde::Deserialize;
use tracing::{debug, warn};

/// One child choice parsed from a navigation response.
#[derive(Debug, Deserialize)]
struct ChildSelection {
    node_id: String,
    #[serde(default)]
    reason: String,
}

/// Navigates the outline by asking an LLM to pick a child at each level.
pub struct LlmNavigator {
    client: LlmClient,
}

impl LlmNavigator {
    /// Create a navigator from an explicit client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Create a navigator from configuration.
    ///
    /// Fails with [`Error::LlmUnavailable`] when navigation is disabled, so
    /// callers can tell "not configured" apart from a failed call.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.llm.enabled {
            return Err(Error::LlmUnavailable);
        }
        config.validate()?;
        Ok(Self::new(LlmClient::new(config.llm.clone())))
    }

    /// Answer a question by descending the outline with LLM guidance.
    pub async fn retrieve(
        &self,
        artifact: &IndexArtifact,
        request: &QueryRequest,
    ) -> Result<QueryResponse> {
        if request.top_k == 0 {
            return Err(Error::invalid_input("top_k must be at least 1"));
        }
        let root = artifact
            .root()
            .ok_or_else(|| Error::corrupt("artifact has no root node"))?;
        let nodes_by_id = artifact.nodes_by_id();

        let mut trace = QueryTrace::default();
        let mut visited: Vec<(String, f64)> = Vec::new();
        let mut frontier: Vec<&IndexNode> = vec![root];

        loop {
            let (selected, decision) = self.select_from(&frontier, request).await?;

            trace.visited_node_ids.push(selected.node_id.clone());
            trace.decisions.push(decision);
            visited.push((
                selected.node_id.clone(),
                combined_score(&request.question, &selected.title),
            ));

            if selected.is_leaf() {
                break;
            }
            frontier = selected
                .child_ids
                .iter()
                .map(|child_id| {
                    nodes_by_id.get(child_id.as_str()).copied().ok_or_else(|| {
                        Error::corrupt(format!(
                            "node '{}' references missing child '{child_id}'",
                            selected.node_id
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
        }

        assemble_response(artifact, request, visited, trace)
    }

    /// Pick one node out of the frontier, asking the LLM when there is a
    /// real choice to make.
    async fn select_from<'a>(
        &self,
        frontier: &[&'a IndexNode],
        request: &QueryRequest,
    ) -> Result<(&'a IndexNode, String)> {
        if frontier.len() == 1 {
            let only = frontier[0];
            return Ok((only, format!("selected {} (only candidate)", only.node_id)));
        }

        let children = frontier
            .iter()
            .map(|node| {
                format!(
                    "{}: {} [pages {}-{}]",
                    node.node_id, node.title, node.page_start, node.page_end
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = Prompts::select_child()
            .replace("{question}", &request.question)
            .replace("{children}", &children);

        let response = self
            .client
            .complete(Some(Prompts::system_navigator()), &prompt)
            .await?;

        match parse_selection(&response) {
            Ok(selection) => {
                if let Some(node) = frontier
                    .iter()
                    .copied()
                    .find(|node| node.node_id == selection.node_id)
                {
                    debug!(node_id = %node.node_id, "navigation step");
                    let decision = if selection.reason.is_empty() {
                        format!("llm selected {}", node.node_id)
                    } else {
                        format!("llm selected {}: {}", node.node_id, selection.reason)
                    };
                    return Ok((node, decision));
                }
                warn!(
                    node_id = %selection.node_id,
                    "navigation chose an unknown node, falling back to lexical scoring"
                );
            }
            Err(err) => {
                warn!(error = %err, "navigation response unparseable, falling back to lexical scoring");
            }
        }

        // Lexical fallback mirrors the greedy retriever's selection rule.
        let mut best = frontier[0];
        let mut best_score = combined_score(&request.question, &best.title);
        for &node in &frontier[1..] {
            let score = combined_score(&request.question, &node.title);
            if score > best_score {
                best = node;
                best_score = score;
            }
        }
        Ok((
            best,
            format!(
                "selected {} score={:.3} (lexical fallback)",
                best.node_id, best_score
            ),
        ))
    }
}

fn parse_selection(response: &str) -> Result<ChildSelection> {
    let json_str = extract_json(response);
    serde_json::from_str(&json_str).map_err(|e| {
        // Truncate in chars, not bytes: the response is arbitrary UTF-8.
        let preview: String = response.chars().take(200).collect();
        Error::LlmParse(format!(
            "Failed to parse navigation response: {}. Response: {}",
            e, preview
        ))
    })
}

/// Extract JSON from a potentially markdown-wrapped response.
fn extract_json(response: &str) -> String {
    let response = response.trim();

    // Check for ```json code block
    if response.starts_with("```json") {
        if let Some(end) = response.rfind("```") {
            let start = "```json".len();
            if end > start {
                return response[start..end].trim().to_string();
            }
        }
    }

    // Check for ``` code block
    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|n| n + 1).unwrap_or(3);
            if end > start {
                return response[start..end].trim().to_string();
            }
        }
    }

    // Find JSON object
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        let response = r#"{"node_id": "page-1", "reason": "covers the topic"}"#;
        assert_eq!(extract_json(response), response);
    }

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"node_id\": \"page-1\"}\n```";
        assert_eq!(extract_json(response), r#"{"node_id": "page-1"}"#);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "The best child is:\n{\"node_id\": \"page-2\"}\nHope that helps.";
        assert_eq!(extract_json(response), r#"{"node_id": "page-2"}"#);
    }

    #[test]
    fn test_parse_selection() {
        let selection =
            parse_selection(r#"{"node_id": "page-1-sec-2", "reason": "matches"}"#).unwrap();
        assert_eq!(selection.node_id, "page-1-sec-2");
        assert_eq!(selection.reason, "matches");
    }

    #[test]
    fn test_parse_selection_reason_is_optional() {
        let selection = parse_selection(r#"{"node_id": "page-1"}"#).unwrap();
        assert_eq!(selection.node_id, "page-1");
        assert!(selection.reason.is_empty());
    }

    #[test]
    fn test_parse_selection_rejects_garbage() {
        assert!(matches!(
            parse_selection("not json"),
            Err(Error::LlmParse(_))
        ));
    }

    #[test]
    fn test_parse_selection_rejects_multibyte_garbage() {
        // 201 bytes but 200 chars: byte 200 falls inside the final char.
        let response = format!("{}é", "a".repeat(199));
        let err = parse_selection(&response).unwrap_err();
        assert!(matches!(err, Error::LlmParse(_)));
        assert!(err.to_string().ends_with('é'));
    }

    #[test]
    fn test_from_config_requires_enabled() {
        let config = Config::default();
        assert!(matches!(
            LlmNavigator::from_config(&config),
            Err(Error::LlmUnavailable)
        ));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = Config::default();
        config.llm.enabled = true;
        assert!(matches!(
            LlmNavigator::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_config_accepts_complete_config() {
        let config = Config::with_llm("https://api.example.com", "key", "gpt-4");
        assert!(LlmNavigator::from_config(&config).is_ok());
    }
}
