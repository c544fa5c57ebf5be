use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::access::course::CourseCapabilities;
use crate::database::table_names::POST_TABLE_NAME;
use crate::middleware::bearer_auth::BearerAuth;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::string_utils::get_str_thing;
use crate::models::view::status::{ReadStateView, StatusView};
use crate::services::read_tracking_service::ReadTrackingService;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/posts/:post_id/read", post(mark_read).get(get_read))
}

async fn mark_read(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(post_id): Path<String>,
) -> CtxResult<Json<StatusView>> {
    let post_id = get_str_thing(POST_TABLE_NAME, &post_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let marked = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .mark_post_read(&auth_data.user, &post_id)
    .await?;
    Ok(Json(StatusView { status: marked }))
}

async fn get_read(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(post_id): Path<String>,
) -> CtxResult<Json<ReadStateView>> {
    let post_id = get_str_thing(POST_TABLE_NAME, &post_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let read = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .is_post_read(&auth_data.user, &post_id)
    .await?;
    Ok(Json(ReadStateView { read }))
}
