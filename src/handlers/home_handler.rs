use axum::response::Html;

use crate::routes::MYSELF_PATH;

pub async fn home_handler() -> Html<String> {
    Html(format!(
        "<h1>Connected to Jira</h1><p><a href=\"{MYSELF_PATH}\">Show my Jira profile</a></p>"
    ))
}
