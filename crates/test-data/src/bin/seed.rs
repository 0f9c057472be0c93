//! Default seed script - creates a coach with teams and a season of load data
//!
//! Run with:
//! ```
//! cargo run -p test-data --bin seed
//! ```
//!
//! Set `SEED_CONFIG` to a JSON file holding a [`SeedConfig`] to change the
//! scenario size. Without it the default config is used with a fixed seed.

use pitchload::{config::Config, database::Database};
use sqlx::postgres::PgPoolOptions;
use test_data::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("../pitchload/migrations").run(&pool).await?;
    tracing::info!("Connected to database");

    let seed_config = match std::env::var("SEED_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)?;
            tracing::info!("Using seed config from {path}");
            serde_json::from_str(&raw)?
        }
        Err(_) => SeedConfig {
            seed: Some(12345), // Reproducible data
            ..Default::default()
        },
    };

    let result = ScenarioBuilder::from_config(seed_config)
        .build(&Database::new(pool))
        .await?;

    // Summary output
    tracing::info!("Seed completed!");
    tracing::info!(
        "  Coach: {} (password: {})",
        result.coach.email,
        test_data::generators::DEFAULT_PASSWORD
    );
    tracing::info!("  Teams: {}", result.teams.len());
    tracing::info!("  Players: {}", result.players.len());
    tracing::info!("  Activities: {}", result.activity_count);
    tracing::info!("  Match periods: {}", result.period_count);
    tracing::info!(
        "  Took {}ms generating, {}ms seeding",
        result.metrics.generation_time_ms,
        result.metrics.seeding_time_ms
    );

    Ok(())
}
