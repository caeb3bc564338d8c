//! Tree structure for hierarchical document indexing.
//!
//! The outline is stored as a flat arena: every node carries its own id and
//! refers to its parent, children, and owned text spans by id. Flat sibling
//! lists keep the artifact trivially serializable and free of ownership
//! cycles; tree shape is reconstructed through id lookups.

use crate::error::{Error, Result};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single paragraph-level unit of source text.
///
/// Spans are atomic and immutable once created; `span_id` is derived from
/// the page number and paragraph ordinal (page 3, 2nd paragraph → `"p3-s2"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TextSpan {
    /// Identifier unique within one artifact.
    pub span_id: String,
    /// 1-indexed page the span belongs to.
    pub page_number: usize,
    /// Trimmed paragraph text.
    pub text: String,
}

/// One level of the document outline: document, page, or section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct IndexNode {
    /// Stable, human-inspectable identifier (`"doc-<id>"`, `"page-<n>"`,
    /// `"page-<n>-sec-<k>"`).
    pub node_id: String,
    /// Parent node id; `None` only for the root.
    pub parent_id: Option<String>,
    /// Display title scored during descent.
    pub title: String,
    /// Depth in the outline: 0 = document, 1 = page, 2 = section.
    pub level: usize,
    /// First page covered (1-indexed).
    pub page_start: usize,
    /// Last page covered (inclusive); equals `page_start` below the root.
    pub page_end: usize,
    /// Owned spans, in document order.
    pub span_ids: Vec<String>,
    /// Children, in build order. Build order pins tie-breaking in descent.
    pub child_ids: Vec<String>,
}

impl IndexNode {
    /// Whether this node is the document root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.child_ids.is_empty()
    }
}

/// The immutable output of indexing one document: the outline tree plus all
/// text spans it references. Built once, queried read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct IndexArtifact {
    /// Opaque caller-provided document identity.
    pub document_id: String,
    /// All tree nodes, root first.
    pub nodes: Vec<IndexNode>,
    /// All text spans, in document order.
    pub spans: Vec<TextSpan>,
}

impl IndexArtifact {
    /// The root node, if the artifact has one in first position.
    pub fn root(&self) -> Option<&IndexNode> {
        self.nodes.first().filter(|node| node.is_root())
    }

    /// Look up a node by id.
    pub fn node(&self, node_id: &str) -> Option<&IndexNode> {
        self.nodes.iter().find(|node| node.node_id == node_id)
    }

    /// Borrowed node lookup map for repeated access.
    pub fn nodes_by_id(&self) -> HashMap<&str, &IndexNode> {
        self.nodes
            .iter()
            .map(|node| (node.node_id.as_str(), node))
            .collect()
    }

    /// Borrowed span lookup map for repeated access.
    pub fn spans_by_id(&self) -> HashMap<&str, &TextSpan> {
        self.spans
            .iter()
            .map(|span| (span.span_id.as_str(), span))
            .collect()
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of section-level nodes.
    pub fn section_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.level == 2).count()
    }

    /// Number of pages covered by the root.
    pub fn page_count(&self) -> usize {
        self.root().map(|root| root.page_end).unwrap_or(0)
    }

    /// All leaf nodes (nodes without children).
    pub fn leaves(&self) -> Vec<&IndexNode> {
        self.nodes.iter().filter(|node| node.is_leaf()).collect()
    }

    /// Maximum depth of the outline (1 for a root-only artifact).
    pub fn max_depth(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| node.level + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check the structural invariants of the artifact.
    ///
    /// Verifies: a single level-0 root in first position, unique node and
    /// span ids, parent/child references that exist and agree, levels that
    /// increase by exactly one, ordered page ranges, and that every span is
    /// owned by at least one leaf.
    pub fn validate(&self) -> Result<()> {
        let root = self
            .nodes
            .first()
            .ok_or_else(|| Error::corrupt("artifact has no nodes"))?;
        if !root.is_root() || root.level != 0 {
            return Err(Error::corrupt("first node is not a level-0 root"));
        }

        let mut by_id: HashMap<&str, &IndexNode> = HashMap::new();
        for node in &self.nodes {
            if by_id.insert(node.node_id.as_str(), node).is_some() {
                return Err(Error::corrupt(format!(
                    "duplicate node id '{}'",
                    node.node_id
                )));
            }
        }

        let mut span_ids: HashSet<&str> = HashSet::new();
        for span in &self.spans {
            if !span_ids.insert(span.span_id.as_str()) {
                return Err(Error::corrupt(format!(
                    "duplicate span id '{}'",
                    span.span_id
                )));
            }
        }

        for node in &self.nodes {
            if node.page_start > node.page_end {
                return Err(Error::corrupt(format!(
                    "node '{}' has page_start > page_end",
                    node.node_id
                )));
            }

            match &node.parent_id {
                None => {
                    if node.node_id != root.node_id {
                        return Err(Error::corrupt(format!(
                            "second root '{}' found",
                            node.node_id
                        )));
                    }
                }
                Some(parent_id) => {
                    let parent = by_id.get(parent_id.as_str()).ok_or_else(|| {
                        Error::corrupt(format!(
                            "node '{}' references missing parent '{}'",
                            node.node_id, parent_id
                        ))
                    })?;
                    if node.level != parent.level + 1 {
                        return Err(Error::corrupt(format!(
                            "level must increase by one from '{}' to '{}'",
                            parent.node_id, node.node_id
                        )));
                    }
                    if !parent.child_ids.contains(&node.node_id) {
                        return Err(Error::corrupt(format!(
                            "node '{}' is not listed by its parent '{}'",
                            node.node_id, parent.node_id
                        )));
                    }
                }
            }

            for child_id in &node.child_ids {
                let child = by_id.get(child_id.as_str()).ok_or_else(|| {
                    Error::corrupt(format!(
                        "node '{}' references missing child '{}'",
                        node.node_id, child_id
                    ))
                })?;
                if child.parent_id.as_deref() != Some(node.node_id.as_str()) {
                    return Err(Error::corrupt(format!(
                        "child '{}' does not point back to '{}'",
                        child_id, node.node_id
                    )));
                }
            }

            for span_id in &node.span_ids {
                if !span_ids.contains(span_id.as_str()) {
                    return Err(Error::corrupt(format!(
                        "node '{}' references missing span '{}'",
                        node.node_id, span_id
                    )));
                }
            }
        }

        let mut covered: HashSet<&str> = HashSet::new();
        for leaf in self.nodes.iter().filter(|node| node.is_leaf()) {
            for span_id in &leaf.span_ids {
                covered.insert(span_id.as_str());
            }
        }
        for span in &self.spans {
            if !covered.contains(span.span_id.as_str()) {
                return Err(Error::corrupt(format!(
                    "span '{}' is not owned by any leaf",
                    span.span_id
                )));
            }
        }

        Ok(())
    }

    /// Format the outline as an indented tree for display.
    pub fn format_outline(&self) -> String {
        let mut out = format!(
            "Document {} ({} pages, {} nodes, {} spans)\n",
            self.document_id,
            self.page_count(),
            self.node_count(),
            self.spans.len()
        );
        out.push_str(&"─".repeat(50));
        out.push('\n');

        if let Some(root) = self.root() {
            self.format_node(root, 0, &mut out);
        }

        out
    }

    fn format_node(&self, node: &IndexNode, indent: usize, out: &mut String) {
        let prefix = "  ".repeat(indent);
        out.push_str(&format!(
            "{}{} [pages {}-{}]\n",
            prefix, node.title, node.page_start, node.page_end
        ));
        for child_id in &node.child_ids {
            if let Some(child) = self.node(child_id) {
                self.format_node(child, indent + 1, out);
            }
        }
    }

    /// Convert to pretty-printed JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
