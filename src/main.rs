//! Vectorless CLI
//!
//! Index a document into a hierarchical outline artifact and answer
//! questions against it without embeddings.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::EnvFilter;
use vectorless::{
    config::Config,
    indexer::IndexBuilder,
    llm::{LlmClient, LlmNavigator},
    persistence::{artifact_exists, artifact_size, load_artifact, save_artifact},
    search::{GreedyTreeRetriever, QueryMode, QueryRequest, Retriever, DEFAULT_TOP_K},
};

/// Vectorless - hierarchical document indexing and retrieval without embeddings
#[derive(Parser)]
#[command(name = "vectorless")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index artifact for a document
    Index {
        /// Path to the document file (text file)
        document: PathBuf,

        /// Identifier for the document (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Output path for the artifact file
        #[arg(short, long, default_value = "data/index_artifact.json")]
        output: PathBuf,

        /// Page cap override for this run
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Answer a question against an index artifact
    Query {
        /// The question to answer
        question: String,

        /// Path to the artifact file
        #[arg(short, long, default_value = "data/index_artifact.json")]
        index: PathBuf,

        /// Number of citations to return
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// Retrieval mode
        #[arg(long, default_value = "vectorless", value_parser = ["vectorless", "llm"])]
        mode: String,

        /// Omit citations from the output
        #[arg(long)]
        no_citations: bool,

        /// Print the descent trace
        #[arg(long)]
        trace: bool,
    },

    /// Display the outline of an index artifact
    Show {
        /// Path to the artifact file
        #[arg(default_value = "data/index_artifact.json")]
        index: PathBuf,

        /// Output as JSON instead of a formatted outline
        #[arg(long)]
        json: bool,
    },

    /// Show information about an index artifact
    Info {
        /// Path to the artifact file
        #[arg(default_value = "data/index_artifact.json")]
        index: PathBuf,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            document,
            id,
            output,
            max_pages,
        } => cmd_index(document, id, output, max_pages),
        Commands::Query {
            question,
            index,
            top_k,
            mode,
            no_citations,
            trace,
        } => cmd_query(question, index, top_k, mode, no_citations, trace).await,
        Commands::Show { index, json } => cmd_show(index, json),
        Commands::Info { index } => cmd_info(index),
        Commands::Test => cmd_test().await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_index(
    document: PathBuf,
    id: Option<String>,
    output: PathBuf,
    max_pages: Option<usize>,
) -> Result<()> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let max_pages = max_pages.unwrap_or(config.limits.max_pages);
    let document_id = id.unwrap_or_else(|| {
        document
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document")
            .to_string()
    });

    println!("Indexing document: {}", document.display());

    let start = Instant::now();

    let text = std::fs::read_to_string(&document)
        .with_context(|| format!("Failed to read document '{}'", document.display()))?;

    let char_count = text.chars().count();
    if char_count > config.limits.max_text_length {
        anyhow::bail!(
            "Document is {} characters, above the limit of {}",
            char_count,
            config.limits.max_text_length
        );
    }

    let builder = IndexBuilder::new(max_pages);
    let artifact = builder
        .build(&document_id, &text)
        .context("Failed to build index")?;

    let build_duration = start.elapsed();

    println!("\nIndex Built:");
    println!("  Document id: {}", artifact.document_id);
    println!("  Pages:       {}", artifact.page_count());
    println!("  Nodes:       {}", artifact.node_count());
    println!("  Sections:    {}", artifact.section_count());
    println!("  Spans:       {}", artifact.spans.len());
    println!("  Max depth:   {}", artifact.max_depth());
    println!("  Build time:  {:.2?}", build_duration);

    save_artifact(&artifact, &output).context("Failed to save artifact")?;

    let size = artifact_size(&output)?;
    println!("\nIndex saved to: {}", output.display());
    println!("  File size: {:.1} KB", size as f64 / 1024.0);

    Ok(())
}

async fn cmd_query(
    question: String,
    index_path: PathBuf,
    top_k: usize,
    mode: String,
    no_citations: bool,
    show_trace: bool,
) -> Result<()> {
    if !artifact_exists(&index_path) {
        anyhow::bail!(
            "Index not found at '{}'. Run 'index' command first.",
            index_path.display()
        );
    }

    let artifact = load_artifact(&index_path).context("Failed to load artifact")?;

    let mode = match mode.as_str() {
        "llm" => QueryMode::Llm,
        _ => QueryMode::Vectorless,
    };
    let request = QueryRequest {
        document_id: artifact.document_id.clone(),
        question,
        top_k,
        mode,
        include_citations: !no_citations,
    };

    println!("Question: \"{}\"", request.question);
    println!();

    let start = Instant::now();

    let response = match mode {
        QueryMode::Vectorless => GreedyTreeRetriever
            .retrieve(&artifact, &request)
            .context("Retrieval failed")?,
        QueryMode::Llm => {
            let config = Config::load().context("Failed to load configuration")?;
            let navigator =
                LlmNavigator::from_config(&config).context("LLM navigation unavailable")?;
            navigator
                .retrieve(&artifact, &request)
                .await
                .context("Retrieval failed")?
        }
    };

    let query_duration = start.elapsed();

    println!("Answer:");
    println!("{}", response.answer);

    if !response.citations.is_empty() {
        println!();
        println!("Citations:");
        println!("{}", "─".repeat(60));

        for (i, citation) in response.citations.iter().enumerate() {
            println!(
                "{:>2}. {} [page {}] (score {:.3})",
                i + 1,
                citation.title,
                citation.page,
                citation.score
            );

            let preview: String = citation.excerpt.chars().take(200).collect();
            for line in preview.lines().take(3) {
                println!("    {}", line);
            }
            if citation.excerpt.chars().count() > 200 {
                println!("    ...");
            }
        }

        println!("{}", "─".repeat(60));
    }

    if show_trace {
        println!();
        println!("Descent trace:");
        for decision in &response.trace.decisions {
            println!("  {}", decision);
        }
    }

    println!();
    println!("Answered in {:.2?}", query_duration);

    Ok(())
}

fn cmd_show(index_path: PathBuf, json: bool) -> Result<()> {
    if !artifact_exists(&index_path) {
        anyhow::bail!(
            "Index not found at '{}'. Run 'index' command first.",
            index_path.display()
        );
    }

    let artifact = load_artifact(&index_path).context("Failed to load artifact")?;

    if json {
        let json_str = artifact.to_json().context("Failed to serialize artifact")?;
        println!("{}", json_str);
    } else {
        println!("{}", artifact.format_outline());
    }

    Ok(())
}

fn cmd_info(index_path: PathBuf) -> Result<()> {
    if !artifact_exists(&index_path) {
        anyhow::bail!(
            "Index not found at '{}'. Run 'index' command first.",
            index_path.display()
        );
    }

    let artifact = load_artifact(&index_path).context("Failed to load artifact")?;
    let size = artifact_size(&index_path)?;

    println!("Index Artifact Information");
    println!("{}", "─".repeat(40));
    println!("  Document id:  {}", artifact.document_id);
    println!("  Total pages:  {}", artifact.page_count());
    println!("  Nodes:        {}", artifact.node_count());
    println!("  Sections:     {}", artifact.section_count());
    println!("  Spans:        {}", artifact.spans.len());
    println!("  Max depth:    {}", artifact.max_depth());
    println!("  File size:    {:.1} KB", size as f64 / 1024.0);
    println!("  Index path:   {}", index_path.display());

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    if !config.llm.enabled {
        println!("LLM navigation is disabled. Set LLM_NAVIGATION=true to enable it.");
        return Ok(());
    }

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!("  API Key:   {}...", config.llm.api_key_preview());
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
