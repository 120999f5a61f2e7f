use chrono::Utc;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingerspell_server::db::{self, login_attempts};
use fingerspell_server::{routes, AppState, Config, GlyphTable, SessionStore};

/// How often expired sessions and login-attempt rows are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fingerspell_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Fingerspell Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    let glyphs = GlyphTable::load(&config.glyph_map_path)?;

    // Open database and run migrations
    let pool = db::connect(&config.database_path).await?;

    let state = AppState::new(pool, config.clone(), glyphs);
    spawn_sweeper(state.sessions.clone(), state.pool.clone());

    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_sweeper(sessions: SessionStore, pool: SqlitePool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired();
            if removed > 0 {
                tracing::info!("Swept {} expired sessions", removed);
            }

            match login_attempts::purge_expired(&pool, Utc::now().timestamp()).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!("Purged {} stale login-attempt records", purged),
                Err(e) => tracing::error!("Failed to purge login attempts: {}", e),
            }
        }
    });
}
