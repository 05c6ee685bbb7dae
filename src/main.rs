use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use groundbook_pricing::cache::{start_cache_warmer, AppCache};
use groundbook_pricing::config::Config;
use groundbook_pricing::pricing::RuleSource;
use groundbook_pricing::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groundbook_pricing=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to read configuration")?;

    let rules = match (&config.database_url, &config.rules_file) {
        (Some(url), _) => {
            tracing::info!("Reading pricing rules from database");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            RuleSource::Postgres(pool)
        }
        (None, Some(path)) => {
            tracing::info!("Reading pricing rules from {}", path.display());
            RuleSource::from_file(path)?
        }
        (None, None) => anyhow::bail!("Set DATABASE_URL or PRICING_RULES_FILE"),
    };

    let cache = AppCache::new(config.rules_cache_ttl);
    tokio::spawn(start_cache_warmer(
        cache.clone(),
        rules.clone(),
        config.rules_cache_ttl,
    ));

    let bind_addr = config.bind_addr;
    let state = AppState {
        rules,
        cache,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
