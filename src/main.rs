mod clean;
mod config;
mod crawler;
mod db;
mod document;
mod error;
mod fetch;
mod parser;
mod pipeline;
mod rag;
mod server;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use url::Url;

use crate::config::Settings;
use crate::crawler::{CrawlConfig, CrawlState};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::parser::dom::ExtractorConfig;
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::HttpEmbedder;
use crate::rag::index::VectorIndex;
use crate::rag::llm::HttpChatModel;
use crate::rag::{ingest, Rag};

#[derive(Parser)]
#[command(name = "docs_rag", about = "Crawl a MkDocs site and answer questions over it")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk next-page links from the start path and save the URL list
    Crawl {
        /// Max pages to visit
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Scrape every crawled URL into documents.json
    Scrape,
    /// Crawl + scrape in one go
    Run {
        /// Max pages to visit
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Embed documents.json (or a single page) into the vector store
    Index {
        /// Index one page's plain text instead of documents.json
        #[arg(long)]
        url: Option<String>,
    },
    /// Answer one question from the indexed docs
    Ask {
        query: String,
    },
    /// Serve the question-answering API
    Serve,
    /// Print a page's visible text
    Clean {
        url: String,
    },
    /// Show index statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Crawl { limit } => {
            let fetcher = HttpFetcher::new()?;
            let paths = crawl_paths(&fetcher, &settings, limit).await?;
            println!("Saved {} URLs to {}", paths.len(), settings.urls_path().display());
            Ok(())
        }
        Commands::Scrape => {
            let paths: Vec<String> = document::read_json(&settings.urls_path())
                .context("No URL list. Run 'crawl' first.")?;
            let fetcher = HttpFetcher::new()?;
            scrape_paths(&fetcher, &settings, &paths).await
        }
        Commands::Run { limit } => {
            let fetcher = HttpFetcher::new()?;

            let t_crawl = Instant::now();
            let paths = crawl_paths(&fetcher, &settings, limit).await?;
            println!(
                "Crawled {} URLs in {:.1}s",
                paths.len(),
                t_crawl.elapsed().as_secs_f64()
            );

            scrape_paths(&fetcher, &settings, &paths).await
        }
        Commands::Index { url } => {
            let conn = db::connect(&settings.data_dir)?;
            db::init_schema(&conn)?;
            let chunker = TextChunker::new(settings.chunk_size, settings.chunk_overlap);

            let chunks = match &url {
                Some(url) => {
                    let html = HttpFetcher::new()?.fetch(url).await?;
                    ingest::chunk_page(&chunker, url, &html)
                }
                None => {
                    let docs = document::read_collection(&settings.documents_path())
                        .context("No documents. Run 'scrape' first.")?;
                    let removed = db::clear(&conn)?;
                    if removed > 0 {
                        println!("Cleared {} old chunks", removed);
                    }
                    ingest::chunk_documents(&chunker, &docs)
                }
            };
            if chunks.is_empty() {
                println!("Nothing to index.");
                return Ok(());
            }

            println!("Embedding {} chunks...", chunks.len());
            let embedder = embedder(&settings);
            let vectors = ingest::embed_chunks(&embedder, &chunks).await?;
            let stored = db::insert_chunks(&conn, &chunks, &vectors)?;
            println!("Stored {} chunks.", stored);
            Ok(())
        }
        Commands::Ask { query } => {
            let rag = build_rag(&settings)?;
            match rag.answer(&query).await? {
                Some(answer) => println!("{}", answer),
                None => println!("Bye."),
            }
            Ok(())
        }
        Commands::Serve => {
            let rag = build_rag(&settings)?;
            println!("Loaded {} chunks", rag.index_len());
            server::serve(Arc::new(rag), &settings.bind).await
        }
        Commands::Clean { url } => {
            let html = HttpFetcher::new()?.fetch(&url).await?;
            println!("{}", clean::clean_text(&html));
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.data_dir)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            let urls = document::read_json::<Vec<String>>(&settings.urls_path())
                .map(|u| u.len())
                .unwrap_or(0);
            let docs = document::read_collection(&settings.documents_path())
                .map(|d| d.len())
                .unwrap_or(0);
            println!("URLs:      {}", urls);
            println!("Documents: {}", docs);
            println!("Pages:     {}", s.pages);
            println!("Chunks:    {}", s.chunks);
            println!("Indexed:   {}", s.last_indexed.as_deref().unwrap_or("-"));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn extractor(settings: &Settings) -> ExtractorConfig {
    ExtractorConfig {
        content_selector: settings.content_selector.clone(),
        normalize_highlight: settings.normalize_highlight,
        ..ExtractorConfig::default()
    }
}

fn embedder(settings: &Settings) -> HttpEmbedder {
    HttpEmbedder::new(
        &settings.embed_base_url,
        &settings.embed_model,
        settings.embed_api_key.clone(),
    )
}

fn build_rag(settings: &Settings) -> anyhow::Result<Rag> {
    let conn = db::connect(&settings.data_dir)?;
    db::init_schema(&conn)?;
    let index: VectorIndex = db::load_index(&conn)?;

    let chat = HttpChatModel::new(
        &settings.llm_base_url,
        &settings.llm_model,
        settings.llm_api_key.clone(),
    );
    Ok(Rag::new(
        Box::new(embedder(settings)),
        Box::new(chat),
        index,
        settings.top_k,
    ))
}

/// Crawls and saves whatever was discovered, even when the walk fails midway.
async fn crawl_paths(
    fetcher: &HttpFetcher,
    settings: &Settings,
    limit: Option<usize>,
) -> anyhow::Result<Vec<String>> {
    let config = CrawlConfig {
        base_url: Url::parse(&settings.base_url).context("Invalid base_url")?,
        start_path: settings.start_path.clone(),
        stop_path: settings.stop_path.clone(),
        limit,
    };
    let mut state = CrawlState::seeded(&config.start_path);

    let outcome = crawler::crawl(fetcher, &config, &mut state).await;
    document::write_json(&settings.urls_path(), &state.paths)?;
    outcome?;
    Ok(state.paths)
}

async fn scrape_paths(
    fetcher: &HttpFetcher,
    settings: &Settings,
    paths: &[String],
) -> anyhow::Result<()> {
    if paths.is_empty() {
        println!("No URLs to scrape.");
        return Ok(());
    }
    let base_url = Url::parse(&settings.base_url).context("Invalid base_url")?;

    println!("Scraping {} pages...", paths.len());
    let (pages, stats) =
        pipeline::scrape_all_pages(fetcher, &base_url, paths, &extractor(settings)).await?;
    document::write_collection(&settings.documents_path(), &pages)?;
    println!(
        "Done: {} scraped ({} ok, {} errors). Saved to {}",
        stats.total,
        stats.ok,
        stats.errors,
        settings.documents_path().display()
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
