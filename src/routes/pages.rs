// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pages for authenticated athletes.

use crate::error::Result;
use crate::middleware::auth::AuthSession;
use crate::views;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Page routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/results", get(results))
        .route("/results/", get(results))
}

/// Home page: activity ID form.
async fn home(Extension(auth): Extension<AuthSession>) -> Html<String> {
    let name = auth.credential.display_name();
    Html(views::input_page(name.as_deref()))
}

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    /// Kept as a string: anything non-numeric means "latest activity".
    #[serde(default)]
    activity_id: Option<String>,
}

/// Results page: segment efforts compared with PRs.
async fn results(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Query(params): Query<ResultsParams>,
) -> Result<Html<String>> {
    let comparison = state
        .comparator
        .compare_activity(params.activity_id.as_deref(), &auth.credential)
        .await
        .inspect_err(|e| {
            if e.is_token_error() {
                tracing::info!(
                    athlete_id = auth.credential.athlete_id,
                    "Access token rejected, clearing session credential"
                );
                state.sessions.reset(&auth.session_id);
            }
        })?;

    Ok(Html(views::results_page(&comparison)))
}
