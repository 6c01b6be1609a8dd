mod runs;
mod score;
mod unify;

use clap::{Parser, Subcommand};
use creatordb_core::Platform;
use creatordb_scoring::CampaignType;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "creatordb")]
#[command(about = "Creator profile unification and campaign scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance commands.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run a unification pass over all source profiles.
    Unify {
        /// Report what would be written without touching the store.
        #[arg(long)]
        dry_run: bool,
    },
    /// Score source profiles for a campaign type.
    Score {
        /// Campaign type: betting, gaming, or esports.
        #[arg(long)]
        campaign: CampaignType,
        /// Restrict scoring to one platform's profiles.
        #[arg(long)]
        platform: Option<Platform>,
        /// Score a single source profile by id.
        #[arg(long, conflicts_with = "platform")]
        profile_id: Option<i64>,
        /// Maximum number of profiles to score (highest-reach first).
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Override the configured cap on concurrent signal generations.
        #[arg(long)]
        max_concurrent: Option<usize>,
        /// Emit results as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// List recent unification runs.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify database connectivity.
    Ping,
    /// Apply pending migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = creatordb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let pool_config = creatordb_db::PoolConfig::from_app_config(&config);
    let pool = creatordb_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                creatordb_db::ping(&pool).await?;
                println!("database is reachable");
            }
            DbCommands::Migrate => {
                let applied = creatordb_db::run_migrations(&pool).await?;
                println!("applied {applied} migrations");
            }
        },
        Commands::Unify { dry_run } => {
            unify::run_unify(&pool, &config, dry_run).await?;
        }
        Commands::Score {
            campaign,
            platform,
            profile_id,
            limit,
            max_concurrent,
            json,
        } => {
            let args = score::ScoreArgs {
                campaign,
                platform,
                profile_id,
                limit,
                max_concurrent,
                json,
            };
            score::run_score(&pool, &config, args).await?;
        }
        Commands::Runs { limit } => {
            runs::run_list_runs(&pool, limit).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
