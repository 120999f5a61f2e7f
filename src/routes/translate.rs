use axum::{extract::State, response::Html, Form};
use serde::Deserialize;

use crate::error::Result;
use crate::glyphs::has_lowercase_letter;
use crate::recorder;
use crate::session::AuthSession;
use crate::views::render_index_page;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateForm {
    #[serde(default)]
    pub text_input: String,
}

pub async fn index_page(session: AuthSession) -> Html<String> {
    Html(render_index_page(
        &session.username,
        "",
        &[],
        false,
        session.translation_count,
    ))
}

/// Render the glyphs for the submitted text and record the submission
///
/// Lowercase letters only produce a warning; the text is still recorded.
pub async fn index_submit(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<TranslateForm>,
) -> Result<Html<String>> {
    let text = form.text_input;

    recorder::record(
        &state.pool,
        &state.sessions,
        &session.token,
        &session.username,
        &text,
    )
    .await?;

    let translation_count = state
        .sessions
        .get(&session.token)
        .map(|s| s.translation_count)
        .unwrap_or(session.translation_count);
    let glyphs = state.glyphs.map(&text);

    Ok(Html(render_index_page(
        &session.username,
        &text,
        &glyphs,
        has_lowercase_letter(&text),
        translation_count,
    )))
}
