//! openalt-seed - populate the directory with curated entries

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openalt::{
    auth::JwtValidator,
    seed::Seeder,
    services::{Directory, DirectorySettings, GitHubClient},
    store::{DirectoryStore, MemoryStore, MongoStore},
};

#[derive(Parser, Debug)]
#[command(name = "openalt-seed")]
#[command(about = "Seed the OpenAlt directory with categories, products and alternatives")]
struct SeedArgs {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "openalt")]
    mongodb_db: String,

    /// Seed an in-memory store instead of MongoDB
    #[arg(long)]
    dry_run: bool,

    /// Fetch GitHub statistics for every alternative afterwards
    #[arg(long)]
    refresh_stats: bool,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api_url: String,

    /// GitHub token (optional, raises the rate limit)
    #[arg(long, env = "GITHUB_TOKEN")]
    github_token: Option<String>,

    /// Timeout for GitHub calls in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = SeedArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("openalt={},info", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn DirectoryStore> = if args.dry_run {
        warn!("Dry run: seeding an in-memory store, nothing is persisted");
        Arc::new(MemoryStore::new())
    } else {
        info!("Seeding MongoDB database '{}'", args.mongodb_db);
        Arc::new(MongoStore::connect(&args.mongodb_uri, &args.mongodb_db).await?)
    };

    let report = Seeder::new(Arc::clone(&store)).run().await?;
    info!(
        "Seeded {} categories, {} tags, {} tech stacks, {} proprietary products, {} alternatives",
        report.categories, report.tags, report.tech_stacks, report.proprietary, report.alternatives
    );
    if report.skipped_keywords > 0 {
        warn!("{} keywords had no category", report.skipped_keywords);
    }

    if args.refresh_stats {
        let github = GitHubClient::new(
            &args.github_api_url,
            args.github_token.clone(),
            Duration::from_millis(args.request_timeout_ms),
        )?;
        // No tokens are issued here, the validator only satisfies the constructor
        let directory = Directory::new(store, JwtValidator::new_dev(), DirectorySettings::default())
            .with_github(Arc::new(github));

        let (refreshed, failed) = directory.refresh_all_stats().await?;
        info!("Refreshed statistics for {} alternatives ({} failed)", refreshed, failed);
    }

    Ok(())
}
