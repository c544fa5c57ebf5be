use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use surrealdb::sql::Thing;

use crate::access::course::CourseCapabilities;
use crate::database::table_names::DISCUSSION_TABLE_NAME;
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::middleware::bearer_auth::BearerAuth;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::{PostSortKey, QryOrder};
use crate::middleware::utils::string_utils::{get_str_thing, thing_key};
use crate::models::view::post::{PostListView, PostView};
use crate::models::view::status::{CountView, StatusView, SubscriptionStatusView};
use crate::routes::forums::SubscriptionAction;
use crate::services::discussion_pager_service::DiscussionPagerService;
use crate::services::discussion_service::{DiscussionService, ReplyInput};
use crate::services::read_tracking_service::ReadTrackingService;
use crate::services::subscription_service::SubscriptionService;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/discussions/:discussion_id", delete(delete_discussion))
        .route(
            "/api/discussions/:discussion_id/posts",
            get(get_posts).post(create_reply),
        )
        .route("/api/discussions/:discussion_id/read", post(mark_read))
        .route("/api/discussions/:discussion_id/unread", get(get_unread))
        .route(
            "/api/discussions/:discussion_id/subscription",
            post(toggle_subscription),
        )
        .route("/api/discussions/:discussion_id/lock", patch(set_locked))
}

#[derive(Debug, Deserialize)]
pub struct GetPostsQuery {
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscussionSubscriptionInput {
    pub action: SubscriptionAction,
}

#[derive(Debug, Deserialize)]
pub struct LockInput {
    pub locked: bool,
}

fn discussion_thing(discussion_id: &str) -> Result<Thing, AppError> {
    get_str_thing(DISCUSSION_TABLE_NAME, discussion_id)
}

async fn get_posts(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
    Query(query): Query<GetPostsQuery>,
) -> CtxResult<Json<PostListView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let sort = match &query.sort_by {
        Some(key) => PostSortKey::parse(key)?,
        None => PostSortKey::Created,
    };
    let direction = match &query.sort_direction {
        Some(dir) => dir.parse::<QryOrder>()?,
        None => QryOrder::ASC,
    };

    let oracle = CourseCapabilities::new(&state.db.access);
    let (discussion, nodes) = DiscussionPagerService::new(&state, &oracle)
        .list_posts(&auth_data.user, &discussion_id, sort, direction)
        .await?;

    let forum = state.db.forums.get_by_id(&discussion.forum).await?;
    let tracker = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    );
    let read_ids = if tracker.can_track(&forum, Some(&auth_data.user)).await? {
        Some(tracker.read_post_ids(&auth_data.user, &discussion_id).await?)
    } else {
        None
    };

    let posts = nodes
        .into_iter()
        .map(|node| {
            let read = read_ids.as_ref().map(|ids| tracker.is_read(&node.post, ids));
            PostView {
                read,
                ..PostView::from(node)
            }
        })
        .collect();

    Ok(Json(PostListView {
        discussion_id: thing_key(&discussion.id),
        posts,
    }))
}

async fn create_reply(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
    Json(body): Json<ReplyInput>,
) -> CtxResult<Json<PostView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let post = DiscussionService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .add_reply(&auth_data.user, &discussion_id, body)
    .await?;
    Ok(Json(post.into()))
}

async fn mark_read(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
) -> CtxResult<Json<StatusView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .mark_discussion_read(&auth_data.user, &discussion_id)
    .await?;
    Ok(Json(StatusView { status: true }))
}

async fn get_unread(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
) -> CtxResult<Json<CountView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let count = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .count_unread_in_discussion(&auth_data.user, &discussion_id)
    .await?;
    Ok(Json(CountView { count }))
}

async fn toggle_subscription(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
    Json(body): Json<DiscussionSubscriptionInput>,
) -> CtxResult<Json<SubscriptionStatusView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let service = SubscriptionService::new(&state, &state.db.subscriptions, &oracle);
    let view = match body.action {
        SubscriptionAction::Subscribe => {
            let changed = service
                .subscribe_user_to_discussion(&auth_data.user, &discussion_id)
                .await?;
            SubscriptionStatusView::new(true, changed)
        }
        SubscriptionAction::Unsubscribe => {
            let changed = service
                .unsubscribe_user_from_discussion(&auth_data.user, &discussion_id)
                .await?;
            SubscriptionStatusView::new(false, changed)
        }
    };
    Ok(Json(view))
}

async fn set_locked(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
    Json(body): Json<LockInput>,
) -> CtxResult<Json<StatusView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    DiscussionService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .set_locked(&auth_data.user, &discussion_id, body.locked)
    .await?;
    Ok(Json(StatusView {
        status: body.locked,
    }))
}

async fn delete_discussion(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(discussion_id): Path<String>,
) -> CtxResult<Json<StatusView>> {
    let discussion_id = discussion_thing(&discussion_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    DiscussionService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    )
    .delete_discussion(&auth_data.user, &discussion_id)
    .await?;
    Ok(Json(StatusView { status: true }))
}
