pub mod auth;
pub mod dashboard;
pub mod health;
pub mod home;
pub mod translate;

pub use auth::{login_page, login_submit, logout, signup_page, signup_submit};
pub use dashboard::{api_stats, dashboard};
pub use health::health_check;
pub use home::root;
pub use translate::{index_page, index_submit};

use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let glyph_files = ServeDir::new(&state.config.glyph_asset_dir);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/signup", get(signup_page).post(signup_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/index", get(index_page).post(index_submit))
        .route("/dashboard", get(dashboard))
        .route("/api/stats", get(api_stats))
        .nest_service("/glyphs", glyph_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
