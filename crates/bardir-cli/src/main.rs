mod collect;
mod db;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectArgs;
use crate::db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "bardir")]
#[command(about = "Collects attorney records from the State Bar of Texas directory")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the directory and store every listed attorney
    Collect(CollectArgs),
    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = bardir_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = bardir_db::PoolConfig::from_app_config(&config);
    let pool = bardir_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Collect(args) => {
            bardir_db::run_migrations(&pool).await?;
            collect::run_collect(&pool, &config, &args).await?;
        }
        Commands::Db { command } => db::run_db(&pool, &config, &command).await?,
    }

    pool.close().await;
    Ok(())
}
