//! HTML page rendering.
//!
//! Pages are a shared layout plus a content fragment. Placeholders use
//! `{{name}}`; every value is escaped before substitution except the
//! content fragment itself, which is trusted template text.

use axum::response::Html;
use serde::Serialize;

const LAYOUT: &str = include_str!("../../templates/layout.html");
pub(crate) const INDEX: &str = include_str!("../../templates/index.html");
pub(crate) const ABOUT: &str = include_str!("../../templates/about.html");
const DASHBOARD: &str = include_str!("../../templates/dashboard.html");
const ERROR: &str = include_str!("../../templates/error.html");

pub(crate) fn page(title: &str, content: &str) -> Html<String> {
    Html(
        LAYOUT
            .replace("{{title}}", &escape_html(title))
            .replace("{{content}}", content),
    )
}

/// Dashboard with the embed configuration available to the viewer script
/// as `#embed-config`.
pub(crate) fn dashboard<T: Serialize>(
    title: &str,
    embed_config: &T,
) -> Result<Html<String>, serde_json::Error> {
    let content = DASHBOARD.replace("{{embed_config}}", &script_json(embed_config)?);
    Ok(page(title, &content))
}

pub(crate) fn error_page(title: &str, message: &str) -> Html<String> {
    let content = ERROR.replace("{{message}}", &escape_html(message));
    page(title, &content)
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON safe to place inside a `<script>` element: `<`, `>` and `&` are
/// emitted as unicode escapes so `</script>` cannot appear.
pub(crate) fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}
