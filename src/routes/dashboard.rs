use axum::{extract::State, response::Html, Json};

use crate::error::Result;
use crate::session::AuthSession;
use crate::stats::{self, DashboardStats};
use crate::views::render_dashboard_page;
use crate::AppState;

async fn load_stats(state: &AppState) -> Result<DashboardStats> {
    stats::dashboard(
        &state.pool,
        state.config.top_users_limit,
        &state.config.frequency_options(),
    )
    .await
}

/// Usage dashboard, recomputed on every request
pub async fn dashboard(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Html<String>> {
    let stats = load_stats(&state).await?;
    Ok(Html(render_dashboard_page(&session.username, &stats)))
}

/// Same figures as the dashboard, as JSON
pub async fn api_stats(
    State(state): State<AppState>,
    _session: AuthSession,
) -> Result<Json<DashboardStats>> {
    Ok(Json(load_stats(&state).await?))
}
