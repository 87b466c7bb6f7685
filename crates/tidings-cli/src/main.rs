use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tidings_client::{LexiconScorer, ReqwestFetcher, ScraperParser};
use tidings_core::seed::{FAKE_ARTICLE_COUNT, seed_fake_articles};
use tidings_core::traits::BlobStore;
use tidings_core::{ArticleFetcher, EnrichmentService, IngestionService, PipelineConfig};
use tidings_store::{BlobClient, StoreConfig};

#[derive(Parser)]
#[command(name = "tidings", version, about = "News ingestion and sentiment enrichment")]
struct Cli {
    /// Storage connection string (memory://, file:///path, postgres://...)
    #[arg(long, global = true, env = "BLOB_CONNECTION_STRING", hide_env_values = true)]
    connection_string: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the homepage once and write raw article records
    Ingest,

    /// Score one raw blob and write its sentiment record
    Enrich {
        /// Blob name in the raw container (e.g. article-Some_Title.json)
        name: String,
    },

    /// Upload synthetic articles to the raw container
    Seed {
        /// Number of fake articles to write
        #[arg(short, long, default_value_t = FAKE_ARTICLE_COUNT)]
        count: usize,
    },

    /// List blob names in a container
    List {
        /// Container name (e.g. articles-data)
        container: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tidings=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    let mut store_config = StoreConfig::from_env().context("Invalid storage configuration")?;
    if cli.connection_string.is_some() {
        store_config.connection_string = cli.connection_string;
    }
    let store = BlobClient::new(store_config);

    match cli.command {
        Commands::Ingest => cmd_ingest(&config, store).await?,
        Commands::Enrich { name } => cmd_enrich(&config, store, &name).await?,
        Commands::Seed { count } => {
            let names = seed_fake_articles(&store, &config.raw_container, count)
                .await
                .context("Failed to seed fake articles")?;
            println!(
                "Successfully generated and uploaded {} fake articles.",
                names.len()
            );
        }
        Commands::List { container } => {
            let names = store
                .list(&container)
                .await
                .with_context(|| format!("Failed to list container {container}"))?;
            for name in names {
                println!("{name}");
            }
        }
    }

    Ok(())
}

async fn cmd_ingest(config: &PipelineConfig, store: BlobClient) -> Result<()> {
    let articles = ArticleFetcher::new(
        ReqwestFetcher::new()?,
        ScraperParser::new(),
        config.source.clone(),
    );
    let service = IngestionService::new(articles, store, config.raw_container.clone());

    let report = service.ingest().await.context("Ingestion failed")?;
    for name in &report.written {
        println!("{name}");
    }
    tracing::info!(
        discovered = report.discovered,
        written = report.written.len(),
        skipped = report.skipped,
        failed = report.failed,
        "Ingestion finished"
    );
    Ok(())
}

async fn cmd_enrich(config: &PipelineConfig, store: BlobClient, name: &str) -> Result<()> {
    let content = store
        .get(&config.raw_container, name)
        .await
        .with_context(|| format!("Failed to read {}/{name}", config.raw_container))?;

    let service = EnrichmentService::new(
        LexiconScorer::new(),
        store,
        config.sentiment_container.clone(),
    );
    let enriched = service
        .enrich(&content, name)
        .await
        .with_context(|| format!("Failed to enrich {name}"))?;

    println!("{}", serde_json::to_string_pretty(&enriched)?);
    Ok(())
}
