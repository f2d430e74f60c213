//! Memorization session pages: prompt, per-verse feedback and report.

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db::try_lock;
use crate::error::AppError;
use crate::filters;
use crate::handlers::NavContext;
use crate::memorize::{SessionProgress, SessionReport, VerseFeedback, VersePrompt};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "verse.html")]
pub struct VerseTemplate {
    pub nav: NavContext,
    pub prompt: VersePrompt,
}

#[derive(Template)]
#[template(path = "feedback.html")]
pub struct FeedbackTemplate {
    pub nav: NavContext,
    pub feedback: VerseFeedback,
    /// What the user typed, echoed back
    pub input: String,
}

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub nav: NavContext,
    pub report: SessionReport,
}

#[derive(Deserialize)]
pub struct VerseForm {
    #[serde(default)]
    pub text: String,
}

/// POST /chapters/{id}/start
pub async fn start_session(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(chapter_id): Path<i64>,
) -> Result<Redirect, AppError> {
    let conn = try_lock(&state.db)?;
    let session = state.aggregator(&conn).start(auth.user_id, chapter_id)?;
    Ok(Redirect::to(&format!("/sessions/{}", session.id)))
}

/// GET /sessions/{id} - Prompt for the next verse
pub async fn session_page(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(session_id): Path<i64>,
) -> Result<Response, AppError> {
    let conn = try_lock(&state.db)?;
    let progress = state.aggregator(&conn).progress(auth.user_id, session_id)?;
    drop(conn);

    match progress {
        SessionProgress::Completed => {
            Ok(Redirect::to(&format!("/sessions/{}/report", session_id)).into_response())
        }
        SessionProgress::Next(prompt) => {
            let template = VerseTemplate {
                nav: NavContext::from_auth(&auth),
                prompt,
            };
            Ok(Html(template.render().unwrap_or_default()).into_response())
        }
    }
}

/// POST /sessions/{id}/verses/{index} - Score one verse
pub async fn submit_verse(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((session_id, verse_index)): Path<(i64, usize)>,
    Form(form): Form<VerseForm>,
) -> Result<Html<String>, AppError> {
    let conn = try_lock(&state.db)?;
    let feedback = state
        .aggregator(&conn)
        .submit(auth.user_id, session_id, verse_index, &form.text)?;
    drop(conn);

    let template = FeedbackTemplate {
        nav: NavContext::from_auth(&auth),
        feedback,
        input: form.text,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

/// GET /sessions/{id}/report
pub async fn report_page(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(session_id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let conn = try_lock(&state.db)?;
    let report = state.aggregator(&conn).report(auth.user_id, session_id)?;
    drop(conn);

    let template = ReportTemplate {
        nav: NavContext::from_auth(&auth),
        report,
    };
    Ok(Html(template.render().unwrap_or_default()))
}
