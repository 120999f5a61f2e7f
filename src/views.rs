//! Server-rendered HTML pages.

use axum::http::StatusCode;
use std::fmt::Write;

use crate::constants::MSG_LOWERCASE_WARNING;
use crate::glyphs::Glyph;
use crate::stats::DashboardStats;

// ── HTML Templates ────────────────────────────────────────────────────

fn base_style() -> &'static str {
    r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        background: #f5f5f5; color: #333; padding: 20px;
        display: flex; flex-direction: column; align-items: center; min-height: 100vh;
    }
    nav { width: 100%; max-width: 960px; display: flex; gap: 16px; justify-content: flex-end; margin-bottom: 16px; font-size: 14px; }
    nav a { color: #4a6cf7; text-decoration: none; }
    nav .who { margin-right: auto; color: #666; }
    .card {
        background: #fff; border-radius: 16px; padding: 32px;
        max-width: 400px; width: 100%; box-shadow: 0 4px 24px rgba(0,0,0,0.08);
    }
    .card.wide { max-width: 960px; }
    .logo { text-align: center; margin-bottom: 24px; }
    .logo h1 { font-size: 28px; color: #1a1a2e; }
    .logo p { font-size: 14px; color: #666; margin-top: 4px; }
    .form-group { margin-bottom: 16px; }
    .form-group label { display: block; font-size: 14px; font-weight: 500; margin-bottom: 6px; color: #444; }
    .form-group input, .form-group textarea {
        width: 100%; padding: 12px 14px; border: 1.5px solid #ddd;
        border-radius: 10px; font-size: 16px; outline: none;
    }
    .btn {
        width: 100%; padding: 14px; border: none; border-radius: 10px;
        font-size: 16px; font-weight: 600; cursor: pointer;
    }
    .btn-primary { background: #4a6cf7; color: #fff; }
    .error { background: #fff0f0; color: #d32f2f; padding: 10px 14px; border-radius: 8px; font-size: 13px; margin-bottom: 16px; }
    .notice { background: #f0fff4; color: #2e7d32; padding: 10px 14px; border-radius: 8px; font-size: 13px; margin-bottom: 16px; }
    .warning { background: #fffbe6; color: #8a6d00; padding: 10px 14px; border-radius: 8px; font-size: 13px; margin-bottom: 16px; }
    .link { text-align: center; margin-top: 16px; font-size: 14px; color: #666; }
    .link a { color: #4a6cf7; text-decoration: none; }
    .glyphs { display: flex; flex-wrap: wrap; gap: 8px; margin-top: 16px; }
    .glyph { text-align: center; font-size: 12px; color: #666; }
    .glyph img { width: 72px; height: 72px; object-fit: contain; display: block; }
    .counter { font-size: 14px; color: #666; margin-top: 16px; }
    .metrics { display: flex; gap: 16px; margin-bottom: 24px; }
    .metric { flex: 1; background: #f0f4ff; border-radius: 12px; padding: 16px; text-align: center; }
    .metric .value { font-size: 32px; font-weight: 700; color: #1a1a2e; }
    .metric .label { font-size: 13px; color: #666; }
    h2 { font-size: 18px; margin: 24px 0 8px; }
    table { width: 100%; border-collapse: collapse; font-size: 14px; }
    th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #eee; }
    .bar { background: #4a6cf7; height: 10px; border-radius: 5px; }
    .empty { color: #999; font-size: 14px; }
    "#
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn message_box(class: &str, message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<div class="{class}">{}</div>"#, escape_html(m)))
        .unwrap_or_default()
}

fn page(title: &str, nav: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} - Fingerspell</title>
<style>{style}</style>
</head><body>
{nav}
{body}
</body></html>"#,
        title = escape_html(title),
        style = base_style(),
    )
}

fn nav_bar(username: &str) -> String {
    format!(
        r#"<nav><span class="who">Signed in as {}</span><a href="/index">Translate</a><a href="/dashboard">Dashboard</a><a href="/logout">Log out</a></nav>"#,
        escape_html(username)
    )
}

pub fn render_login_page(error: Option<&str>, notice: Option<&str>) -> String {
    let body = format!(
        r#"<div class="card">
  <div class="logo"><h1>Fingerspell</h1><p>Log in</p></div>
  {notice}
  {error}
  <form method="POST" action="/login">
    <div class="form-group">
      <label>Username</label>
      <input type="text" name="username" required autocomplete="username">
    </div>
    <div class="form-group">
      <label>Password</label>
      <input type="password" name="password" required autocomplete="current-password">
    </div>
    <button type="submit" class="btn btn-primary">Log in</button>
  </form>
  <div class="link">No account? <a href="/signup">Sign up</a></div>
</div>"#,
        notice = message_box("notice", notice),
        error = message_box("error", error),
    );
    page("Log in", "", &body)
}

pub fn render_signup_page(error: Option<&str>) -> String {
    let body = format!(
        r#"<div class="card">
  <div class="logo"><h1>Fingerspell</h1><p>Create an account</p></div>
  {error}
  <form method="POST" action="/signup">
    <div class="form-group">
      <label>Username</label>
      <input type="text" name="username" required autocomplete="username">
    </div>
    <div class="form-group">
      <label>Password</label>
      <input type="password" name="password" required autocomplete="new-password">
    </div>
    <p class="link">At least 8 characters with 4 letters, 3 numbers and 1 special character.</p>
    <button type="submit" class="btn btn-primary">Sign up</button>
  </form>
  <div class="link">Already registered? <a href="/login">Log in</a></div>
</div>"#,
        error = message_box("error", error),
    );
    page("Sign up", "", &body)
}

/// Translation page: the input form, the glyphs for the last submission
/// and this session's counter
pub fn render_index_page(
    username: &str,
    text: &str,
    glyphs: &[Glyph<'_>],
    show_lowercase_warning: bool,
    translation_count: u64,
) -> String {
    let warning = message_box(
        "warning",
        show_lowercase_warning.then_some(MSG_LOWERCASE_WARNING),
    );

    let mut glyph_html = String::new();
    for glyph in glyphs {
        let character = escape_html(&glyph.character.to_string());
        // Percent-encoding leaves nothing that needs HTML escaping
        let _ = write!(
            glyph_html,
            r#"<div class="glyph"><img src="/glyphs/{}" alt="{character}">{character}</div>"#,
            urlencoding::encode(glyph.image),
        );
    }

    let body = format!(
        r#"<div class="card wide">
  <div class="logo"><h1>Fingerspell</h1><p>Type text to see it fingerspelled</p></div>
  {warning}
  <form method="POST" action="/index">
    <div class="form-group">
      <textarea name="text_input" rows="3">{text}</textarea>
    </div>
    <button type="submit" class="btn btn-primary">Translate</button>
  </form>
  <div class="glyphs">{glyph_html}</div>
  <p class="counter">Translations this session: {translation_count}</p>
</div>"#,
        text = escape_html(text),
    );
    page("Translate", &nav_bar(username), &body)
}

pub fn render_dashboard_page(username: &str, stats: &DashboardStats) -> String {
    let mut top_users = String::new();
    for user in &stats.top_users {
        let _ = write!(
            top_users,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(&user.username),
            user.count
        );
    }

    let busiest_day = stats.daily.iter().map(|d| d.count).max().unwrap_or(0);
    let mut daily = String::new();
    for day in &stats.daily {
        let _ = write!(
            daily,
            r#"<tr><td>{}</td><td>{}</td><td><div class="bar" style="width:{}%"></div></td></tr>"#,
            day.day,
            day.count,
            percent(day.count, busiest_day)
        );
    }

    let most_common = stats.top_characters.first().map(|c| c.count).unwrap_or(0);
    let mut characters = String::new();
    for entry in &stats.top_characters {
        let _ = write!(
            characters,
            r#"<tr><td>{}</td><td>{}</td><td><div class="bar" style="width:{}%"></div></td></tr>"#,
            escape_html(&entry.character.to_string()),
            entry.count,
            percent(entry.count as i64, most_common as i64)
        );
    }

    let body = format!(
        r#"<div class="card wide">
  <div class="logo"><h1>Usage dashboard</h1></div>
  <div class="metrics">
    <div class="metric"><div class="value">{total}</div><div class="label">Translations</div></div>
    <div class="metric"><div class="value">{unique}</div><div class="label">Users</div></div>
    <div class="metric"><div class="value">{average:.2}</div><div class="label">Per user</div></div>
  </div>
  <h2>Top users</h2>
  {top_users}
  <h2>Daily usage</h2>
  {daily}
  <h2>Most common characters</h2>
  {characters}
</div>"#,
        total = stats.total,
        unique = stats.unique_users,
        average = stats.average_per_user,
        top_users = table_or_empty("<tr><th>User</th><th>Translations</th></tr>", &top_users),
        daily = table_or_empty("<tr><th>Day</th><th>Translations</th><th></th></tr>", &daily),
        characters = table_or_empty(
            "<tr><th>Character</th><th>Count</th><th></th></tr>",
            &characters
        ),
    );
    page("Dashboard", &nav_bar(username), &body)
}

pub fn render_error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<div class="card">
  <div class="logo"><h1>{code}</h1><p>{reason}</p></div>
  <div class="error">{message}</div>
  <div class="link"><a href="/">Back</a></div>
</div>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = escape_html(message),
    );
    page("Error", "", &body)
}

fn table_or_empty(header: &str, rows: &str) -> String {
    if rows.is_empty() {
        r#"<p class="empty">No translations yet.</p>"#.to_string()
    } else {
        format!("<table>{header}{rows}</table>")
    }
}

fn percent(value: i64, max: i64) -> i64 {
    if max <= 0 {
        0
    } else {
        value * 100 / max
    }
}
