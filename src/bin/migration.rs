use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => ecoscore_api::config::load_config()
            .context("DATABASE_URL is unset and configuration could not be loaded")?
            .database_url,
    };

    info!("Starting database migration");
    ecoscore_api::migrator::run_migration(&database_url).await?;
    info!("Migration completed successfully");

    Ok(())
}
