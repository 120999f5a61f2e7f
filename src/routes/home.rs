use axum::response::Redirect;

use crate::session::AuthSession;

/// Send logged-in users to the translator and everyone else to the login page
pub async fn root(session: Option<AuthSession>) -> Redirect {
    match session {
        Some(_) => Redirect::to("/index"),
        None => Redirect::to("/login"),
    }
}
