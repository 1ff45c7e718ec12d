//! Combobox lookup proxy.

use super::RequestSession;
use crate::routes::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupParams {
    #[serde(default)]
    pub param_code: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Handler for GET /api/lookups/:param_type
///
/// Served from the shared lookup cache. Needs a session cookie; a 401 from
/// the admin API removes the session cookies in the same response.
#[instrument(skip_all, name = "hrm.lookups.get", fields(param_type = %param_type))]
pub async fn get_lookup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(param_type): Path<String>,
    Query(params): Query<LookupParams>,
) -> Response {
    let session = RequestSession::new(&state, jar);
    let query = state.lookups.query(
        &param_type,
        params.param_code.as_deref(),
        params.user_id.as_deref(),
    );

    let result = state
        .lookups
        .items(session.guard(), query)
        .await
        .map(|items| items.as_ref().clone());

    session.respond(result)
}
