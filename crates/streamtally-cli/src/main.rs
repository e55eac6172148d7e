mod failures;
mod metrics;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::metrics::MetricsArgs;

#[derive(Debug, Parser)]
#[command(name = "streamtally")]
#[command(about = "Streaming metrics by song, grouped by date with day-over-day deltas")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Show one page of a song's metrics
    Metrics(MetricsArgs),
    /// List songs whose latest crawl failed
    Failures {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: i64,
        /// Page size: 10, 20, 50 or 100
        #[arg(long)]
        size: Option<i64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("streamtally: no command given; see --help");
        return Ok(());
    };

    let config = streamtally_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "loaded configuration");

    let pool_config = streamtally_db::PoolConfig::from_app_config(&config);
    let pool = streamtally_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            streamtally_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = streamtally_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
        Commands::Metrics(args) => {
            metrics::run_metrics(&pool, &args, config.default_page_size).await?;
        }
        Commands::Failures { page, size, format } => {
            let size = size.unwrap_or_else(|| i64::from(config.default_page_size));
            failures::run_failures(&pool, page, size, format).await?;
        }
    }

    Ok(())
}
