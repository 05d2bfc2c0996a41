//! `db` command handlers.

use clap::Subcommand;

use crate::collect::QueryArgs;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
    /// Show stored row count and the resume point for a search
    Status {
        #[command(flatten)]
        query: QueryArgs,
    },
}

pub(crate) async fn run_db(
    pool: &sqlx::SqlitePool,
    config: &bardir_core::AppConfig,
    command: &DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Migrate => {
            let applied = bardir_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            bardir_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Status { query } => {
            let key = query.to_query().progress_key();
            let total = bardir_db::count_attorneys(pool, None).await?;
            let tagged = bardir_db::count_attorneys(pool, Some(config.jurisdiction.as_str())).await?;
            let pages = bardir_db::list_completed_pages(pool, &key).await?;
            let resume = bardir_db::resume_page(pool, &key).await?;

            println!("attorneys: {total} ({tagged} tagged {})", config.jurisdiction);
            println!("search {key}: {} page(s) complete, resume at page {resume}", pages.len());
            if let Some(last) = pages.last() {
                println!("last page completed at {}", last.completed_at.to_rfc3339());
            }
        }
    }
    Ok(())
}
