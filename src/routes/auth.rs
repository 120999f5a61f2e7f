use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use crate::auth;
use crate::constants::{MSG_ACCOUNT_CREATED, MSG_STORE_FAILURE};
use crate::session::{removal_cookie, session_cookie, AuthSession};
use crate::views::{render_login_page, render_signup_page};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub created: Option<String>,
}

pub async fn signup_page() -> Html<String> {
    Html(render_signup_page(None))
}

/// Create an account
///
/// On success redirects to the login page with the "account created"
/// notice. Rejections re-render the form with the reason:
/// 409 for a taken username, 422 for a bad username or weak password,
/// 500 if the store fails.
pub async fn signup_submit(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match auth::register(&state.pool, &form.username, &form.password).await {
        Ok(_) => Redirect::to("/login?created=1").into_response(),
        Err(e) => {
            let (status, message) = e.status_and_message();
            let message = if e.is_internal() {
                MSG_STORE_FAILURE.to_string()
            } else {
                message
            };
            (status, Html(render_signup_page(Some(&message)))).into_response()
        }
    }
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let notice = query
        .created
        .as_deref()
        .filter(|flag| *flag == "1")
        .map(|_| MSG_ACCOUNT_CREATED);
    Html(render_login_page(None, notice))
}

/// Check credentials, start a session and set the session cookie
pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let lockout = state.config.lockout_policy();
    let username = match auth::login(&state.pool, &lockout, &form.username, &form.password).await
    {
        Ok(username) => username,
        Err(e) if e.is_internal() => return e.into_response(),
        Err(e) => {
            let (status, message) = e.status_and_message();
            return (status, Html(render_login_page(Some(&message), None))).into_response();
        }
    };

    let token = state.sessions.create(&username);
    let jar = jar.add(session_cookie(token, state.sessions.ttl_secs()));

    (jar, Redirect::to("/index")).into_response()
}

pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    session: AuthSession,
) -> impl IntoResponse {
    state.sessions.remove(&session.token);
    tracing::info!("User logged out: {}", session.username);

    (jar.remove(removal_cookie()), Redirect::to("/login"))
}
