//! Index builder - turns raw document text into an outline artifact.
//!
//! Building is deterministic and side-effect-free: the same text and page
//! limit always produce the same node and span ids. The tree has three
//! levels at most: one root, one node per page, one node per detected
//! section within a page.

use crate::error::{Error, Result};
use crate::segment::{detect_headings, segment, PageText};
use crate::tree::{IndexArtifact, IndexNode, TextSpan};
use std::collections::HashSet;
use tracing::debug;

/// Default page cap applied when none is configured.
pub const DEFAULT_MAX_PAGES: usize = 300;

/// Builds an [`IndexArtifact`] from raw document text.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    max_pages: usize,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl IndexBuilder {
    /// Create a builder with an explicit page cap.
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    /// Build the outline artifact for one document.
    ///
    /// Fails with [`Error::InvalidInput`] when the text is blank or the page
    /// cap is zero; both are deterministic input errors that retrying cannot
    /// fix. On success the artifact is complete and valid; there is no
    /// partially-built state.
    pub fn build(&self, document_id: &str, text: &str) -> Result<IndexArtifact> {
        if self.max_pages == 0 {
            return Err(Error::invalid_input("max_pages must be positive"));
        }
        if text.trim().is_empty() {
            return Err(Error::invalid_input("document text is empty"));
        }

        let pages = segment(text, self.max_pages);
        let spans = build_spans(&pages);

        let root_id = format!("doc-{document_id}");
        let mut nodes = vec![IndexNode {
            node_id: root_id.clone(),
            parent_id: None,
            title: "Document".to_string(),
            level: 0,
            page_start: 1,
            page_end: pages.len(),
            span_ids: spans.iter().map(|span| span.span_id.clone()).collect(),
            child_ids: Vec::new(),
        }];

        for page in &pages {
            let page_node_id = format!("page-{}", page.number);
            let page_span_ids: Vec<String> = spans
                .iter()
                .filter(|span| span.page_number == page.number)
                .map(|span| span.span_id.clone())
                .collect();

            let page_index = nodes.len();
            nodes.push(IndexNode {
                node_id: page_node_id.clone(),
                parent_id: Some(root_id.clone()),
                title: format!("Page {}", page.number),
                level: 1,
                page_start: page.number,
                page_end: page.number,
                span_ids: page_span_ids.clone(),
                child_ids: Vec::new(),
            });
            nodes[0].child_ids.push(page_node_id.clone());

            for (section_idx, section) in detect_headings(&page.text).iter().enumerate() {
                let section_node_id = format!("page-{}-sec-{}", page.number, section_idx + 1);
                // Substring containment is a heuristic: a span that straddles
                // a heading boundary, or whose interior indentation differs
                // from the line-trimmed body, matches nothing.
                let mut section_span_ids: Vec<String> = spans
                    .iter()
                    .filter(|span| {
                        span.page_number == page.number
                            && section.body.contains(span.text.as_str())
                    })
                    .map(|span| span.span_id.clone())
                    .collect();
                if section_span_ids.is_empty() {
                    section_span_ids = page_span_ids.clone();
                }

                nodes.push(IndexNode {
                    node_id: section_node_id.clone(),
                    parent_id: Some(page_node_id.clone()),
                    title: section.title.clone(),
                    level: 2,
                    page_start: page.number,
                    page_end: page.number,
                    span_ids: section_span_ids,
                    child_ids: Vec::new(),
                });
                nodes[page_index].child_ids.push(section_node_id);
            }

            // Spans matched by no section go to the page's last section;
            // every span must stay reachable through a leaf.
            if nodes.len() > page_index + 1 {
                let owned: HashSet<&str> = nodes[page_index + 1..]
                    .iter()
                    .flat_map(|section| section.span_ids.iter())
                    .map(String::as_str)
                    .collect();
                let leftover: Vec<String> = page_span_ids
                    .iter()
                    .filter(|span_id| !owned.contains(span_id.as_str()))
                    .cloned()
                    .collect();
                if let Some(last) = nodes.last_mut() {
                    last.span_ids.extend(leftover);
                }
            }
        }

        let artifact = IndexArtifact {
            document_id: document_id.to_string(),
            nodes,
            spans,
        };
        debug!(
            document_id,
            pages = artifact.page_count(),
            nodes = artifact.node_count(),
            spans = artifact.spans.len(),
            "built index artifact"
        );
        Ok(artifact)
    }
}

/// One span per paragraph, in encounter order, with trimmed text.
fn build_spans(pages: &[PageText]) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    for page in pages {
        for (idx, paragraph) in page.text.split("\n\n").enumerate() {
            spans.push(TextSpan {
                span_id: format!("p{}-s{}", page.number, idx + 1),
                page_number: page.number,
                text: paragraph.trim().to_string(),
            });
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_single_page_structure() {
        let builder = IndexBuilder::new(10);
        let artifact = builder
            .build(
                "demo",
                "Introduction to RAG\n\nRAG combines retrieval and generation.",
            )
            .unwrap();

        assert_eq!(artifact.node_count(), 3);
        let root = artifact.root().unwrap();
        assert_eq!(root.node_id, "doc-demo");
        assert_eq!(root.page_end, 1);
        assert_eq!(root.child_ids, vec!["page-1"]);

        let page = artifact.node("page-1").unwrap();
        assert_eq!(page.title, "Page 1");
        assert_eq!(page.span_ids, vec!["p1-s1", "p1-s2"]);

        let section = artifact.node("page-1-sec-1").unwrap();
        assert_eq!(section.title, "Introduction");
        assert_eq!(section.span_ids, vec!["p1-s1", "p1-s2"]);

        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = IndexBuilder::new(10);
        let text = "1 Overview\nSome text.\n\n2.1 Details\nMore text.";

        let first = builder.build("doc", text).unwrap();
        let second = builder.build("doc", text).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_build_rejects_empty_text() {
        let builder = IndexBuilder::default();
        assert!(matches!(
            builder.build("doc", "  \n  "),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_rejects_zero_max_pages() {
        let builder = IndexBuilder::new(0);
        assert!(matches!(
            builder.build("doc", "some text"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_headings_become_sections_of_their_page() {
        let builder = IndexBuilder::new(10);
        let artifact = builder
            .build("doc", "1 Overview\nSome text.\n2.1 Details\nMore text.")
            .unwrap();

        let page = artifact.node("page-1").unwrap();
        assert_eq!(page.child_ids, vec!["page-1-sec-1", "page-1-sec-2"]);
        assert_eq!(artifact.node("page-1-sec-1").unwrap().title, "Overview");
        assert_eq!(artifact.node("page-1-sec-2").unwrap().title, "Details");
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_build_section_falls_back_to_page_spans() {
        // The single paragraph includes the heading line, so no section body
        // contains the full span text.
        let builder = IndexBuilder::new(10);
        let artifact = builder.build("doc", "1 Alpha\nBody line.").unwrap();

        let page = artifact.node("page-1").unwrap();
        let section = artifact.node("page-1-sec-1").unwrap();
        assert_eq!(section.span_ids, page.span_ids);
        assert_eq!(section.span_ids, vec!["p1-s1"]);
    }

    #[test]
    fn test_build_attaches_unmatched_span_to_last_section() {
        // The second paragraph keeps its interior indentation, so the
        // line-trimmed section body never contains it.
        let builder = IndexBuilder::new(10);
        let artifact = builder
            .build(
                "doc",
                "Clean paragraph.\n\nIndented start\n  continuation line",
            )
            .unwrap();

        let section = artifact.node("page-1-sec-1").unwrap();
        assert_eq!(section.span_ids, vec!["p1-s1", "p1-s2"]);
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_build_multi_page() {
        let text = format!("{}\n\n{}", "x".repeat(2100), "y".repeat(2100));
        let artifact = IndexBuilder::new(10).build("doc", &text).unwrap();

        let root = artifact.root().unwrap();
        assert_eq!(root.page_end, 2);
        assert_eq!(root.child_ids, vec!["page-1", "page-2"]);
        assert_eq!(artifact.section_count(), 2);
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_build_trailing_blank_page_stays_valid() {
        // Text ending right after a page closes leaves a blank final page
        // with a single empty span.
        let text = format!("{}\n\n", "x".repeat(2100));
        let artifact = IndexBuilder::new(10).build("doc", &text).unwrap();

        let page = artifact.node("page-2").unwrap();
        assert!(page.is_leaf());
        assert_eq!(page.span_ids, vec!["p2-s1"]);
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_build_respects_page_cap() {
        let text = format!(
            "{}\n\n{}\n\n{}",
            "a".repeat(2100),
            "b".repeat(2100),
            "c".repeat(2100)
        );
        let artifact = IndexBuilder::new(2).build("doc", &text).unwrap();

        assert_eq!(artifact.page_count(), 2);
        assert!(artifact.node("page-3").is_none());
    }
}
