mod helpers;

use axum::http::StatusCode;
use forumx_server::access::role::Role;
use forumx_server::database::table_names::{DISCUSSION_TABLE_NAME, POST_TABLE_NAME};
use forumx_server::entities::forum::TrackingType;
use forumx_server::entities::post::CreatePost;
use forumx_server::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use forumx_server::interfaces::repositories::post::PostRepositoryInterface;
use forumx_server::interfaces::repositories::read_mark::ReadMarkRepositoryInterface;
use forumx_server::interfaces::repositories::subscription::SubscriptionRepositoryInterface;
use forumx_server::middleware::error::ErrorResponseBody;
use forumx_server::middleware::mw_ctx::AppEventType;
use forumx_server::middleware::utils::string_utils::{get_str_thing, new_thing, thing_key};
use forumx_server::models::view::status::StatusView;
use serde_json::json;

use helpers::create_user;
use helpers::forum_helpers::{
    create_forum, discussion_input, reply, reply_input, start_discussion,
};

test_with_server!(creating_a_discussion_emits_events, |server, ctx_state, _clock| {
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let mut events = ctx_state.event_sender.subscribe();

    let created = start_discussion(&server, &student, &forum, None).await;
    assert_eq!(created.discussion.first_post_id, Some(created.post.id.clone()));
    assert_eq!(created.post.parent_id, None);
    assert_eq!(created.post.subject, created.discussion.name);

    let event = events.try_recv().unwrap();
    assert_eq!(event.event, AppEventType::DiscussionCreated);
    assert_eq!(event.forum_id, forum.id);
    assert_eq!(event.user_id, student.user);
    let event = events.try_recv().unwrap();
    assert_eq!(event.event, AppEventType::PostCreated);
    assert_eq!(
        event.post_id.map(|p| thing_key(&p)),
        Some(created.post.id.clone())
    );

    let post = reply(&server, &student, &created.discussion.id, None).await;
    let event = events.try_recv().unwrap();
    assert_eq!(event.event, AppEventType::PostCreated);
    assert_eq!(event.post_id.map(|p| thing_key(&p)), Some(post.id));
});

test_with_server!(invalid_discussion_input_is_rejected, |server, ctx_state, _clock| {
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let guest = create_user(&ctx_state, Role::Guest, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let path = format!("/api/forums/{}/discussions", thing_key(&forum.id));

    let mut input = discussion_input(None);
    input.name = "".to_string();
    server
        .post(&path)
        .authorization_bearer(&student.token)
        .json(&input)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mut input = discussion_input(None);
    input.time_start = 200;
    input.time_end = 100;
    server
        .post(&path)
        .authorization_bearer(&student.token)
        .json(&input)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post(&path)
        .authorization_bearer(&guest.token)
        .json(&discussion_input(None))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post(&path)
        .authorization_bearer(&student.token)
        .json(&discussion_input(Some("other-group")))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/api/forums/missing/discussions")
        .authorization_bearer(&student.token)
        .json(&discussion_input(None))
        .await
        .assert_status(StatusCode::NOT_FOUND);
});

test_with_server!(locked_discussions_refuse_replies, |server, ctx_state, _clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let created = start_discussion(&server, &student, &forum, None).await;
    let lock_path = format!("/api/discussions/{}/lock", created.discussion.id);

    server
        .patch(&lock_path)
        .authorization_bearer(&student.token)
        .json(&json!({ "locked": true }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .patch(&lock_path)
        .authorization_bearer(&teacher.token)
        .json(&json!({ "locked": true }))
        .await;
    response.assert_status_ok();
    assert!(response.json::<StatusView>().status);

    let response = server
        .post(&format!("/api/discussions/{}/posts", created.discussion.id))
        .authorization_bearer(&student.token)
        .json(&reply_input(None))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<ErrorResponseBody>().code, "discussionlocked");

    reply(&server, &teacher, &created.discussion.id, None).await;

    server
        .patch(&lock_path)
        .authorization_bearer(&teacher.token)
        .json(&json!({ "locked": false }))
        .await
        .assert_status_ok();
    reply(&server, &student, &created.discussion.id, None).await;
});

test_with_server!(reply_parent_must_be_in_the_discussion, |server, ctx_state, _clock| {
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let first = start_discussion(&server, &student, &forum, None).await;
    let second = start_discussion(&server, &student, &forum, None).await;

    server
        .post(&format!("/api/discussions/{}/posts", first.discussion.id))
        .authorization_bearer(&student.token)
        .json(&reply_input(Some(second.post.id.clone())))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
});

test_with_server!(deleting_a_discussion_cascades, |server, ctx_state, clock| {
    let manager = create_user(&ctx_state, Role::Manager, vec![]).await;
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let created = start_discussion(&server, &student, &forum, None).await;
    clock.advance(1);
    let post = reply(&server, &manager, &created.discussion.id, None).await;
    let discussion_id = get_str_thing(DISCUSSION_TABLE_NAME, &created.discussion.id).unwrap();

    server
        .post(&format!("/api/discussions/{}/read", created.discussion.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/discussions/{}/subscription", created.discussion.id))
        .authorization_bearer(&student.token)
        .json(&json!({ "action": "subscribe" }))
        .await
        .assert_status_ok();

    server
        .delete(&format!("/api/discussions/{}", created.discussion.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let mut events = ctx_state.event_sender.subscribe();
    server
        .delete(&format!("/api/discussions/{}", created.discussion.id))
        .authorization_bearer(&manager.token)
        .await
        .assert_status_ok();
    assert_eq!(events.try_recv().unwrap().event, AppEventType::DiscussionDeleted);

    server
        .get(&format!("/api/discussions/{}/posts", created.discussion.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/posts/{}/read", post.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        ctx_state
            .db
            .read_marks
            .count_by_user(&student.user, &forum.id)
            .await
            .unwrap(),
        0
    );
    assert!(ctx_state
        .db
        .subscriptions
        .discussion_preferences(&discussion_id)
        .await
        .unwrap()
        .is_empty());
    assert!(ctx_state
        .db
        .read_marks
        .get(&student.user, &get_str_thing(POST_TABLE_NAME, &post.id).unwrap())
        .await
        .unwrap()
        .is_none());
});

test_with_server!(owners_delete_until_someone_replies, |server, ctx_state, _clock| {
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let other = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;

    let lonely = start_discussion(&server, &student, &forum, None).await;
    server
        .delete(&format!("/api/discussions/{}", lonely.discussion.id))
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .delete(&format!("/api/discussions/{}", lonely.discussion.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status_ok();

    let answered = start_discussion(&server, &student, &forum, None).await;
    reply(&server, &other, &answered.discussion.id, None).await;
    server
        .delete(&format!("/api/discussions/{}", answered.discussion.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
});

test_with_server!(reply_and_discussion_stamp_land_together, |server, ctx_state, clock| {
    let author = create_user(&ctx_state, Role::Student, vec![]).await;
    let replier = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let created = start_discussion(&server, &author, &forum, None).await;
    let discussion_id = get_str_thing(DISCUSSION_TABLE_NAME, &created.discussion.id).unwrap();

    clock.advance(30);
    let post = reply(&server, &replier, &created.discussion.id, None).await;
    let discussion = ctx_state.db.discussions.get_by_id(&discussion_id).await.unwrap();
    assert_eq!(discussion.time_modified, post.created);
    assert_eq!(discussion.user_modified, replier.user);

    let missing = get_str_thing(DISCUSSION_TABLE_NAME, "missing").unwrap();
    let orphan = new_thing(POST_TABLE_NAME);
    let result = ctx_state
        .db
        .discussions
        .add_post(
            &missing,
            orphan.clone(),
            CreatePost {
                discussion: missing.clone(),
                parent: None,
                user: replier.user.clone(),
                created: ctx_state.clock.now(),
                modified: ctx_state.clock.now(),
                subject: "lost".to_string(),
                message: "lost".to_string(),
                message_format: Default::default(),
                attachments: vec![],
            },
        )
        .await;
    assert!(result.is_err());
    assert!(ctx_state.db.posts.get_by_id(&orphan).await.is_err());
});

test_with_server!(health_check_reports_version, |server, _ctx_state, _clock| {
    let response = server.get("/hc").await;
    response.assert_status_ok();
    assert!(response.text().starts_with('v'));
});
