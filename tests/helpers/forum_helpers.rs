use axum::http::StatusCode;
use axum_test::TestServer;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use forumx_server::entities::forum::{CreateForum, Forum, TrackingType};
use forumx_server::interfaces::repositories::forum::ForumRepositoryInterface;
use forumx_server::middleware::mw_ctx::CtxState;
use forumx_server::middleware::utils::string_utils::thing_key;
use forumx_server::models::view::discussion::{CreatedDiscussionView, DiscussionListView};
use forumx_server::models::view::post::PostView;
use forumx_server::models::view::status::CountView;
use forumx_server::services::discussion_service::{ReplyInput, StartDiscussionInput};

use super::{TestUser, COURSE};

#[allow(dead_code)]
pub async fn create_forum(state: &CtxState, tracking_type: TrackingType) -> Forum {
    let name: String = Sentence(2..4).fake();
    state
        .db
        .forums
        .create(CreateForum::new(
            COURSE,
            &name,
            tracking_type,
            state.clock.now(),
        ))
        .await
        .expect("forum created")
}

#[allow(dead_code)]
pub fn discussion_input(group_id: Option<&str>) -> StartDiscussionInput {
    StartDiscussionInput {
        name: Sentence(2..5).fake(),
        message: Paragraph(1..3).fake(),
        message_format: Default::default(),
        group_id: group_id.map(|g| g.to_string()),
        time_start: 0,
        time_end: 0,
        attachments: vec![],
    }
}

#[allow(dead_code)]
pub fn reply_input(parent_id: Option<String>) -> ReplyInput {
    ReplyInput {
        parent_id,
        subject: None,
        message: Paragraph(1..3).fake(),
        message_format: Default::default(),
        attachments: vec![],
    }
}

#[allow(dead_code)]
pub async fn start_discussion(
    server: &TestServer,
    user: &TestUser,
    forum: &Forum,
    group_id: Option<&str>,
) -> CreatedDiscussionView {
    let response = server
        .post(&format!("/api/forums/{}/discussions", thing_key(&forum.id)))
        .authorization_bearer(&user.token)
        .json(&discussion_input(group_id))
        .await;
    response.assert_status_ok();
    response.json::<CreatedDiscussionView>()
}

#[allow(dead_code)]
pub async fn reply(
    server: &TestServer,
    user: &TestUser,
    discussion_id: &str,
    parent_id: Option<String>,
) -> PostView {
    let response = server
        .post(&format!("/api/discussions/{discussion_id}/posts"))
        .authorization_bearer(&user.token)
        .json(&reply_input(parent_id))
        .await;
    response.assert_status_ok();
    response.json::<PostView>()
}

#[allow(dead_code)]
pub async fn list_discussions(
    server: &TestServer,
    user: &TestUser,
    forum: &Forum,
    query: &str,
) -> DiscussionListView {
    let response = server
        .get(&format!(
            "/api/forums/{}/discussions{query}",
            thing_key(&forum.id)
        ))
        .authorization_bearer(&user.token)
        .await;
    response.assert_status(StatusCode::OK);
    response.json::<DiscussionListView>()
}

#[allow(dead_code)]
pub async fn discussion_unread(server: &TestServer, user: &TestUser, discussion_id: &str) -> u64 {
    let response = server
        .get(&format!("/api/discussions/{discussion_id}/unread"))
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    response.json::<CountView>().count
}

#[allow(dead_code)]
pub async fn forum_unread(server: &TestServer, user: &TestUser, forum: &Forum) -> u64 {
    let response = server
        .get(&format!("/api/forums/{}/unread", thing_key(&forum.id)))
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    response.json::<CountView>().count
}
