use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::access::course::CourseCapabilities;
use crate::database::table_names::{DISCUSSION_TABLE_NAME, FORUM_TABLE_NAME, USER_TABLE_NAME};
use crate::entities::forum::SubscriptionMode;
use crate::entities::subscription::MailDigest;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::middleware::bearer_auth::BearerAuth;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::{DiscussionSortKey, Pagination, QryOrder};
use crate::middleware::utils::string_utils::{get_str_thing, thing_key};
use crate::models::view::discussion::{CreatedDiscussionView, DiscussionListView, DiscussionView};
use crate::models::view::status::{
    CountView, DigestView, StatusView, SubscribersView, SubscriptionStatusView,
};
use crate::services::discussion_pager_service::{DiscussionPagerService, DiscussionQuery};
use crate::services::discussion_service::{DiscussionService, StartDiscussionInput};
use crate::services::read_tracking_service::ReadTrackingService;
use crate::services::subscription_service::SubscriptionService;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route(
            "/api/forums/:forum_id/discussions",
            get(get_discussions).post(create_discussion),
        )
        .route("/api/forums/:forum_id/read", post(mark_read))
        .route("/api/forums/:forum_id/unread", get(get_unread))
        .route("/api/forums/:forum_id/subscription_mode", put(set_subscription_mode))
        .route("/api/forums/:forum_id/subscription", post(toggle_subscription))
        .route("/api/forums/:forum_id/subscribers", get(get_subscribers))
        .route("/api/forums/:forum_id/digest", get(get_digest).put(set_digest))
        .route("/api/forums/:forum_id/tracking", post(toggle_tracking))
}

#[derive(Debug, Deserialize)]
pub struct GetDiscussionsQuery {
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl GetDiscussionsQuery {
    fn into_query(self) -> Result<DiscussionQuery, AppError> {
        let defaults = DiscussionQuery::default();
        Ok(DiscussionQuery {
            sort: match self.sort_by {
                Some(key) => DiscussionSortKey::parse(&key)?,
                None => defaults.sort,
            },
            direction: match self.sort_direction {
                Some(dir) => dir.parse::<QryOrder>()?,
                None => defaults.direction,
            },
            pagination: Pagination::new(self.page.unwrap_or(-1), self.per_page.unwrap_or(0))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MarkReadInput {
    pub discussion_id: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionModeInput {
    pub mode: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionAction {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionInput {
    pub action: SubscriptionAction,
    /// Another user, needs the manage subscriptions capability.
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribersQuery {
    pub discussion_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DigestInput {
    pub digest: Option<MailDigest>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackingAction {
    Start,
    Stop,
}

#[derive(Debug, Deserialize)]
pub struct TrackingInput {
    pub action: TrackingAction,
}

fn forum_thing(forum_id: &str) -> Result<Thing, AppError> {
    get_str_thing(FORUM_TABLE_NAME, forum_id)
}

async fn get_discussions(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Query(query): Query<GetDiscussionsQuery>,
) -> CtxResult<Json<DiscussionListView>> {
    let forum_id = forum_thing(&forum_id)?;
    let query = query.into_query()?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let page = DiscussionPagerService::new(&state, &oracle)
        .list_discussions(&auth_data.user, &forum_id, query)
        .await?;

    let tracker = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    );
    let mut warnings = vec![];
    let tracked = tracker.can_track(&page.forum, Some(&auth_data.user)).await?;
    let unread: Option<HashMap<Thing, u64>> = if tracked {
        let counts = tracker
            .unread_by_discussion(&auth_data.user, &page.forum)
            .await?;
        Some(
            counts
                .into_iter()
                .map(|c| (c.discussion, c.unread.max(0) as u64))
                .collect(),
        )
    } else {
        warnings.push("readtrackingdisabled".to_string());
        None
    };

    let discussions = page
        .discussions
        .into_iter()
        .map(|summary| {
            let unread_count = unread
                .as_ref()
                .map(|map| map.get(&summary.discussion.id).copied().unwrap_or(0));
            DiscussionView {
                unread: unread_count,
                ..DiscussionView::from(summary)
            }
        })
        .collect();

    Ok(Json(DiscussionListView {
        forum_id: thing_key(&forum_id),
        discussions,
        total: page.total,
        warnings,
    }))
}

async fn create_discussion(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Json(body): Json<StartDiscussionInput>,
) -> CtxResult<Json<CreatedDiscussionView>> {
    let forum_id = forum_thing(&forum_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let service = DiscussionService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    );
    let (discussion, post) = service
        .create_discussion(&auth_data.user, &forum_id, body)
        .await?;
    Ok(Json(CreatedDiscussionView {
        discussion: discussion.into(),
        post: post.into(),
    }))
}

async fn mark_read(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Json(body): Json<MarkReadInput>,
) -> CtxResult<Json<StatusView>> {
    let forum_id = forum_thing(&forum_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let tracker = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    );
    match body.discussion_id {
        Some(discussion_id) => {
            let discussion_id = get_str_thing(DISCUSSION_TABLE_NAME, &discussion_id)?;
            let discussion = state.db.discussions.get_by_id(&discussion_id).await?;
            if discussion.forum != forum_id {
                return Err(AppError::not_found(discussion_id.to_string()).into());
            }
            tracker
                .mark_discussion_read(&auth_data.user, &discussion_id)
                .await?;
        }
        None => {
            let group = body.group_id.filter(|g| !g.is_empty());
            tracker
                .mark_forum_read(&auth_data.user, &forum_id, group)
                .await?;
        }
    }
    Ok(Json(StatusView { status: true }))
}

async fn get_unread(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
) -> CtxResult<Json<CountView>> {
    let forum_id = forum_thing(&forum_id)?;
    let forum = state.db.forums.get_by_id(&forum_id).await?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let tracker = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    );
    let count = tracker.count_unread_in_forum(&auth_data.user, &forum).await?;
    Ok(Json(CountView { count }))
}

async fn set_subscription_mode(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Json(body): Json<SubscriptionModeInput>,
) -> CtxResult<Json<StatusView>> {
    let forum_id = forum_thing(&forum_id)?;
    let mode = body
        .mode
        .parse::<SubscriptionMode>()
        .map_err(|_| AppError::invalid(format!("unknown subscription mode: {}", body.mode)))?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let changed = SubscriptionService::new(&state, &state.db.subscriptions, &oracle)
        .set_subscription_mode(&auth_data.user, &forum_id, mode)
        .await?;
    Ok(Json(StatusView { status: changed }))
}

async fn toggle_subscription(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Json(body): Json<SubscriptionInput>,
) -> CtxResult<Json<SubscriptionStatusView>> {
    let forum_id = forum_thing(&forum_id)?;
    let user = match &body.user_id {
        Some(user_id) => get_str_thing(USER_TABLE_NAME, user_id)?,
        None => auth_data.user.clone(),
    };
    let oracle = CourseCapabilities::new(&state.db.access);
    let service = SubscriptionService::new(&state, &state.db.subscriptions, &oracle);
    let view = match body.action {
        SubscriptionAction::Subscribe => {
            let changed = service
                .subscribe_user(&auth_data.user, &user, &forum_id)
                .await?;
            SubscriptionStatusView::new(true, changed)
        }
        SubscriptionAction::Unsubscribe => {
            let changed = service
                .unsubscribe_user(&auth_data.user, &user, &forum_id)
                .await?;
            SubscriptionStatusView::new(false, changed)
        }
    };
    Ok(Json(view))
}

async fn get_subscribers(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Query(query): Query<SubscribersQuery>,
) -> CtxResult<Json<SubscribersView>> {
    let forum_id = forum_thing(&forum_id)?;
    let discussion_id = match &query.discussion_id {
        Some(id) => Some(get_str_thing(DISCUSSION_TABLE_NAME, id)?),
        None => None,
    };
    let oracle = CourseCapabilities::new(&state.db.access);
    let users = SubscriptionService::new(&state, &state.db.subscriptions, &oracle)
        .subscribed_users(&auth_data.user, &forum_id, discussion_id.as_ref())
        .await?;
    Ok(Json(SubscribersView {
        user_ids: users.iter().map(thing_key).collect(),
    }))
}

async fn get_digest(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
) -> CtxResult<Json<DigestView>> {
    let forum_id = forum_thing(&forum_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let digest = SubscriptionService::new(&state, &state.db.subscriptions, &oracle)
        .get_digest(&auth_data.user, &forum_id)
        .await?;
    Ok(Json(DigestView { digest }))
}

async fn set_digest(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Json(body): Json<DigestInput>,
) -> CtxResult<Json<DigestView>> {
    let forum_id = forum_thing(&forum_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    SubscriptionService::new(&state, &state.db.subscriptions, &oracle)
        .set_digest(&auth_data.user, &forum_id, body.digest)
        .await?;
    Ok(Json(DigestView {
        digest: body.digest,
    }))
}

async fn toggle_tracking(
    auth_data: BearerAuth,
    State(state): State<Arc<CtxState>>,
    Path(forum_id): Path<String>,
    Json(body): Json<TrackingInput>,
) -> CtxResult<Json<StatusView>> {
    let forum_id = forum_thing(&forum_id)?;
    let oracle = CourseCapabilities::new(&state.db.access);
    let tracker = ReadTrackingService::new(
        &state,
        &state.db.read_marks,
        &state.db.tracking_prefs,
        &oracle,
    );
    let changed = match body.action {
        TrackingAction::Start => tracker.start_tracking(&auth_data.user, &forum_id).await?,
        TrackingAction::Stop => tracker.stop_tracking(&auth_data.user, &forum_id).await?,
    };
    Ok(Json(StatusView { status: changed }))
}
