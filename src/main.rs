use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siebwerk::config::Config;
use siebwerk::corpus;
use siebwerk::encoding::{load_is_miscoded, repair_article};
use siebwerk::error::Error;
use siebwerk::models::{Article, ArticleInput};
use siebwerk::pipeline::Pipeline;
use siebwerk::segment::RuleSplitter;
use siebwerk::storage::{sqlite_factory, RepositoryFactory};

#[derive(Parser)]
#[command(
    name = "siebwerk",
    version,
    about = "German news-corpus cleaning, dedup and training-corpus export",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest articles from a JSON Lines file
    Ingest {
        /// Input file, one JSON article per line
        #[arg(short, long)]
        file: PathBuf,

        /// Source label for records without one
        #[arg(short, long, default_value = "unknown")]
        source: String,
    },

    /// Clean stored articles at paragraph granularity
    Clean,

    /// Split stored articles into raw sentences
    Split,

    /// Clean the stored raw sentences into canonical units
    CleanSentences,

    /// Export the canonical units as a training corpus
    Export {
        /// Output file path
        #[arg(short, long, default_value = "corpus.txt")]
        output: PathBuf,

        /// Minimum token count per exported line
        #[arg(long)]
        min_tokens: Option<u32>,

        /// Units per shuffled batch
        #[arg(long)]
        batch_size: Option<u64>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,

        /// Lowercase each line at write time
        #[arg(long, default_value = "false")]
        lowercase: bool,
    },

    /// Show store statistics
    Stats,

    /// Delete the dedup tables (and optionally the articles)
    Reset {
        /// Confirm the deletion
        #[arg(long, default_value = "false")]
        yes: bool,

        /// Also delete the ingested articles
        #[arg(long, default_value = "false")]
        articles: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(db) = &cli.db {
        config.storage.db_path = db.clone();
    }
    config.validate()?;

    let factory = sqlite_factory(&config.storage.db_path);

    match cli.command {
        Commands::Ingest { file, source } => {
            tracing::info!(file = %file.display(), source = %source, "starting ingest");
            ingest(&factory, &file, &source).await?;
        }

        Commands::Clean => {
            tracing::info!("starting article cleaning");
            let pipeline = Pipeline::new(config.pipeline.clone());
            let snapshot = pipeline
                .clean_articles(Arc::clone(&factory), config.normalize)
                .await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Split => {
            tracing::info!("starting sentence splitting");
            let pipeline = Pipeline::new(config.pipeline.clone());
            let snapshot = pipeline
                .split_sentences(Arc::clone(&factory), Arc::new(RuleSplitter::new()))
                .await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::CleanSentences => {
            tracing::info!("starting raw-sentence cleaning");
            let pipeline = Pipeline::new(config.pipeline.clone());
            let snapshot = pipeline
                .clean_sentences(Arc::clone(&factory), config.normalize)
                .await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Export {
            output,
            min_tokens,
            batch_size,
            seed,
            lowercase,
        } => {
            let mut opts = config.export.clone();
            if let Some(min_tokens) = min_tokens {
                opts.min_tokens = min_tokens;
            }
            if let Some(batch_size) = batch_size {
                opts.batch_size = batch_size;
            }
            if let Some(seed) = seed {
                opts.seed = seed;
            }
            opts.lowercase = opts.lowercase || lowercase;
            if opts.batch_size == 0 {
                anyhow::bail!("batch_size must be greater than 0");
            }
            let summary = corpus::export(&factory()?, &opts, &output)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Stats => {
            let stats = factory()?.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }

        Commands::Reset { yes, articles } => {
            if !yes {
                anyhow::bail!("reset deletes data; pass --yes to confirm");
            }
            factory()?.reset(articles)?;
            tracing::info!(articles, "store reset");
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("siebwerk=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("siebwerk=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Load one JSONL file into the article table.
///
/// The whole load is parsed before any write: the mojibake scan is a
/// corpus-level decision, and a missing or unreadable file must fail before
/// the store is touched. Malformed lines are logged and skipped.
async fn ingest(factory: &RepositoryFactory, file: &std::path::Path, source: &str) -> Result<()> {
    if !file.exists() {
        return Err(Error::missing_resource(format!(
            "ingest file not found: {}",
            file.display()
        ))
        .into());
    }

    let handle = std::fs::File::open(file)
        .with_context(|| format!("Failed to open ingest file: {}", file.display()))?;
    let reader = std::io::BufReader::new(handle);

    let mut articles = Vec::new();
    let mut malformed = 0u64;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ArticleInput>(&line) {
            Ok(input) => {
                let mut article = Article::from_input(input, source);
                decode_entities(&mut article);
                articles.push(article);
            }
            Err(e) => {
                malformed += 1;
                tracing::warn!(line = line_no + 1, error = %e, "malformed record skipped");
            }
        }
    }

    let mut repaired = 0u64;
    let mut dropped_values = 0u64;
    if load_is_miscoded(&articles) {
        tracing::warn!("mojibake detected, repairing the whole load");
        for article in &mut articles {
            dropped_values += repair_article(article) as u64;
            repaired += 1;
        }
    }

    let repo = factory()?;
    let mut inserted = 0u64;
    let mut duplicates = 0u64;
    let mut rejected = 0u64;
    for article in &articles {
        match repo.insert_article(article) {
            Ok(true) => inserted += 1,
            Ok(false) => duplicates += 1,
            Err(e) => {
                rejected += 1;
                tracing::warn!(url = ?article.url, error = %e, "article rejected");
            }
        }
    }

    tracing::info!(
        inserted,
        duplicates,
        rejected,
        malformed,
        repaired,
        dropped_values,
        "ingest completed"
    );
    println!(
        "ingested {inserted} articles ({duplicates} duplicates, {rejected} rejected, {malformed} malformed lines)"
    );
    Ok(())
}

/// Archives store HTML entities (`&quot;`, `&amp;`) verbatim; decode them
/// once at ingest so every later stage sees plain text.
fn decode_entities(article: &mut Article) {
    for field in article.text_fields_mut() {
        if let Some(value) = field.as_deref() {
            if value.contains('&') {
                *field = Some(html_escape::decode_html_entities(value).into_owned());
            }
        }
    }
}
