//! LLM prompts for guided outline navigation.

/// Collection of prompts used for LLM-guided descent.
pub struct Prompts;

impl Prompts {
    /// System prompt for outline navigation.
    pub fn system_navigator() -> &'static str {
        "You are an expert at navigating hierarchical document outlines. You pick the single child section most likely to answer a question. Always respond with valid JSON when requested."
    }

    /// Prompt to select the most relevant child of the current node.
    pub fn select_child() -> &'static str {
        r#"You are navigating a document outline to answer a question.

Question: {question}

You are at one node of the outline. Its child sections are listed below, one per line, as `node_id: title [pages a-b]`:
{children}

Pick the single child most likely to contain the answer to the question.

Reply in JSON format:
{
    "node_id": <the chosen child's node_id>,
    "reason": <one short sentence on why this child is most relevant>
}
Directly return the final JSON structure. Do not output anything else."#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_not_empty() {
        assert!(!Prompts::system_navigator().is_empty());
        assert!(!Prompts::select_child().is_empty());
    }

    #[test]
    fn test_select_child_has_placeholders() {
        let prompt = Prompts::select_child();
        assert!(prompt.contains("{question}"));
        assert!(prompt.contains("{children}"));
    }
}
