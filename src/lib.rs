//! Vectorless - hierarchical document indexing and retrieval without embeddings.
//!
//! This library answers natural-language questions against a document without
//! building dense vector embeddings. It organizes the document into a
//! hierarchical outline (document → pages → sections) and answers queries by
//! greedily navigating that outline with lexical/fuzzy text-matching
//! heuristics, returning an answer plus citations and a decision trace.
//!
//! # Overview
//!
//! Unlike traditional RAG systems that chunk documents and rank chunks by
//! embedding distance, this crate:
//! 1. Segments raw text into pages and paragraph-level spans
//! 2. Detects numbered section headings and builds an outline tree
//! 3. Descends the tree per query, scoring only node titles
//! 4. Assembles an answer from the best-scoring nodes' spans
//!
//! # Quick Start
//!
//! ```no_run
//! use vectorless::{
//!     indexer::IndexBuilder,
//!     persistence::{load_artifact, save_artifact},
//!     search::{GreedyTreeRetriever, QueryRequest, Retriever},
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Build the index once
//!     let builder = IndexBuilder::default();
//!     let text = std::fs::read_to_string("document.txt")?;
//!     let artifact = builder.build("my-doc", &text)?;
//!
//!     // Save the artifact for later use
//!     save_artifact(&artifact, Path::new("index_artifact.json"))?;
//!
//!     // Query it as often as needed
//!     let artifact = load_artifact(Path::new("index_artifact.json"))?;
//!     let request = QueryRequest::new("my-doc", "What is this document about?");
//!     let response = GreedyTreeRetriever.retrieve(&artifact, &request)?;
//!
//!     println!("{}", response.answer);
//!     for citation in &response.citations {
//!         println!("  p.{} {} ({:.3})", citation.page, citation.title, citation.score);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **segment**: Splits raw text into pages and detects section headings
//! - **tree**: The arena-shaped artifact model (nodes, spans, validation)
//! - **indexer**: Builds the immutable outline artifact
//! - **score**: Fuzzy and term-overlap relevance scoring
//! - **search**: Greedy tree descent, citations, and answer assembly
//! - **llm**: Optional LLM-guided navigation (disabled by default)
//! - **persistence**: JSON/bincode artifact storage

pub mod config;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod persistence;
pub mod score;
pub mod search;
pub mod segment;
pub mod tree;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use indexer::IndexBuilder;
pub use llm::{LlmClient, LlmNavigator};
pub use persistence::{load_artifact, save_artifact};
pub use search::{
    GreedyTreeRetriever, QueryMode, QueryRequest, QueryResponse, Retriever,
};
pub use tree::{IndexArtifact, IndexNode, TextSpan};
