use serde::Deserialize;

/// Body for both create and update. On create every field is required; on
/// update absent or empty fields are left alone. Any `id` or `user_id` sent by
/// the client is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ArticlePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_font: Option<String>,
}
