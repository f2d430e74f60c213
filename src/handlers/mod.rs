pub mod api;
pub mod practice;

use askama::Template;
use axum::{extract::State, response::Html};

use crate::auth::AuthContext;
use crate::db::{self, try_lock, ChapterSummary, LogOnError};
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Navbar data shared by the page templates
#[derive(Debug, Clone)]
pub struct NavContext {
    pub username: String,
}

impl NavContext {
    pub fn from_auth(auth: &AuthContext) -> Self {
        Self {
            username: auth.username.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub nav: NavContext,
    pub chapters: Vec<ChapterSummary>,
}

/// GET / - Chapter list with the user's latest results
pub async fn index(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Html<String>, AppError> {
    let conn = try_lock(&state.db)?;
    let chapters = db::list_chapters_for_user(&conn, auth.user_id)
        .log_warn_default("Failed to list chapters");
    drop(conn);

    let template = IndexTemplate {
        nav: NavContext::from_auth(&auth),
        chapters,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub use api::{session_report_json, submit_verse_json};
pub use practice::{report_page, session_page, start_session, submit_verse};
