mod helpers;

use axum::http::StatusCode;
use forumx_server::access::role::Role;
use forumx_server::entities::forum::TrackingType;
use forumx_server::middleware::error::ErrorResponseBody;
use forumx_server::middleware::utils::string_utils::thing_key;
use forumx_server::models::view::discussion::{CreatedDiscussionView, DiscussionView};
use forumx_server::models::view::post::PostListView;

use helpers::create_user;
use helpers::forum_helpers::{
    create_forum, discussion_input, list_discussions, reply, start_discussion,
};

fn ids(discussions: &[DiscussionView]) -> Vec<String> {
    discussions.iter().map(|d| d.id.clone()).collect()
}

test_with_server!(listing_is_deterministic_and_pages_concatenate, |server, ctx_state, clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    for i in 0..5 {
        // pairs share a modification time
        if i % 2 == 0 {
            clock.advance(10);
        }
        start_discussion(&server, &teacher, &forum, None).await;
    }

    let all = list_discussions(&server, &teacher, &forum, "").await;
    assert_eq!(all.total, 5);
    assert_eq!(all.discussions.len(), 5);
    let again = list_discussions(&server, &teacher, &forum, "").await;
    assert_eq!(ids(&all.discussions), ids(&again.discussions));

    let mut paged = vec![];
    for page in 0..3 {
        let listed = list_discussions(
            &server,
            &teacher,
            &forum,
            &format!("?page={page}&per_page=2"),
        )
        .await;
        assert_eq!(listed.total, 5);
        assert!(listed.discussions.len() <= 2);
        paged.extend(ids(&listed.discussions));
    }
    assert_eq!(paged, ids(&all.discussions));

    let beyond = list_discussions(&server, &teacher, &forum, "?page=3&per_page=2").await;
    assert!(beyond.discussions.is_empty());
});

test_with_server!(equal_sort_values_fall_back_to_id, |server, ctx_state, _clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    for _ in 0..4 {
        start_discussion(&server, &teacher, &forum, None).await;
    }

    for query in ["", "?sort_by=timemodified&sort_direction=ASC", "?sort_by=timestart"] {
        let listed = list_discussions(&server, &teacher, &forum, query).await;
        let mut sorted = ids(&listed.discussions);
        sorted.sort();
        assert_eq!(ids(&listed.discussions), sorted, "query {query}");
    }

    let by_id_desc = list_discussions(&server, &teacher, &forum, "?sort_by=id&sort_direction=desc").await;
    let mut expected = ids(&by_id_desc.discussions);
    expected.sort();
    expected.reverse();
    assert_eq!(ids(&by_id_desc.discussions), expected);
});

test_with_server!(sort_direction_follows_request, |server, ctx_state, clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let first = start_discussion(&server, &teacher, &forum, None).await;
    clock.advance(10);
    let second = start_discussion(&server, &teacher, &forum, None).await;

    let newest_first = list_discussions(&server, &teacher, &forum, "").await;
    assert_eq!(
        ids(&newest_first.discussions),
        vec![second.discussion.id.clone(), first.discussion.id.clone()]
    );

    clock.advance(10);
    reply(&server, &teacher, &first.discussion.id, None).await;
    let after_reply = list_discussions(&server, &teacher, &forum, "").await;
    assert_eq!(after_reply.discussions[0].id, first.discussion.id);

    let oldest_first = list_discussions(&server, &teacher, &forum, "?sort_by=timemodified&sort_direction=asc").await;
    assert_eq!(oldest_first.discussions[0].id, second.discussion.id);
});

test_with_server!(invalid_listing_arguments_are_rejected, |server, ctx_state, _clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let base = format!("/api/forums/{}/discussions", thing_key(&forum.id));

    for query in [
        "?sort_by=popularity",
        "?sort_direction=sideways",
        "?page=0&per_page=0",
        "?page=1",
        "?page=9223372036854775807&per_page=2",
    ] {
        let response = server
            .get(&format!("{base}{query}"))
            .authorization_bearer(&teacher.token)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorResponseBody>().code, "invalidargument");
    }
});

test_with_server!(visibility_applies_before_pagination, |server, ctx_state, clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let student = create_user(&ctx_state, Role::Student, vec!["a"]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;

    let mut visible = vec![];
    for group in [Some("a"), Some("b"), None, Some("b"), Some("a")] {
        clock.advance(1);
        let created = start_discussion(&server, &teacher, &forum, group).await;
        if group != Some("b") {
            visible.push(created.discussion.id);
        }
    }
    visible.reverse();

    let mut paged = vec![];
    for page in 0..2 {
        let listed = list_discussions(
            &server,
            &student,
            &forum,
            &format!("?page={page}&per_page=2"),
        )
        .await;
        assert_eq!(listed.total, 3);
        paged.extend(ids(&listed.discussions));
    }
    assert_eq!(paged, visible);

    let teacher_view = list_discussions(&server, &teacher, &forum, "").await;
    assert_eq!(teacher_view.total, 5);
});

test_with_server!(timed_discussions_are_hidden_outside_their_window, |server, ctx_state, clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;

    let now = ctx_state.clock.now();
    let mut input = discussion_input(None);
    input.time_start = now + 3_600;
    let response = server
        .post(&format!("/api/forums/{}/discussions", thing_key(&forum.id)))
        .authorization_bearer(&teacher.token)
        .json(&input)
        .await;
    response.assert_status_ok();
    let timed = response.json::<CreatedDiscussionView>();

    assert_eq!(list_discussions(&server, &student, &forum, "").await.total, 0);
    assert_eq!(list_discussions(&server, &teacher, &forum, "").await.total, 1);
    server
        .get(&format!("/api/discussions/{}/posts", timed.discussion.id))
        .authorization_bearer(&student.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    clock.advance(3_600);
    assert_eq!(list_discussions(&server, &student, &forum, "").await.total, 1);
});

test_with_server!(summaries_carry_replies_and_last_post, |server, ctx_state, clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let quiet = start_discussion(&server, &teacher, &forum, None).await;
    clock.advance(1);
    let busy = start_discussion(&server, &teacher, &forum, None).await;
    clock.advance(1);
    reply(&server, &student, &busy.discussion.id, None).await;
    clock.advance(1);
    let last = reply(&server, &teacher, &busy.discussion.id, None).await;

    let listed = list_discussions(&server, &student, &forum, "").await;
    let busy_view = &listed.discussions[0];
    assert_eq!(busy_view.id, busy.discussion.id);
    assert_eq!(busy_view.num_replies, 2);
    assert_eq!(busy_view.last_post.as_ref().map(|p| p.id.clone()), Some(last.id));
    assert_eq!(busy_view.user_modified_id, teacher.key);

    let quiet_view = &listed.discussions[1];
    assert_eq!(quiet_view.num_replies, 0);
    assert_eq!(
        quiet_view.last_post.as_ref().map(|p| p.id.clone()),
        Some(quiet.post.id)
    );
});

test_with_server!(posts_list_their_children, |server, ctx_state, clock| {
    let teacher = create_user(&ctx_state, Role::Teacher, vec![]).await;
    let student = create_user(&ctx_state, Role::Student, vec![]).await;
    let forum = create_forum(&ctx_state, TrackingType::Optional).await;
    let created = start_discussion(&server, &teacher, &forum, None).await;
    let discussion_id = created.discussion.id.clone();
    clock.advance(1);
    let first_reply = reply(&server, &student, &discussion_id, None).await;
    clock.advance(1);
    let nested = reply(&server, &teacher, &discussion_id, Some(first_reply.id.clone())).await;
    assert_eq!(nested.parent_id, Some(first_reply.id.clone()));
    assert!(nested.subject.starts_with("Re: "));

    let response = server
        .get(&format!("/api/discussions/{discussion_id}/posts"))
        .authorization_bearer(&student.token)
        .await;
    response.assert_status_ok();
    let posts = response.json::<PostListView>().posts;
    let listed: Vec<(String, Vec<String>)> = posts
        .into_iter()
        .map(|p| (p.id, p.children))
        .collect();
    assert_eq!(
        listed,
        vec![
            (created.post.id.clone(), vec![first_reply.id.clone()]),
            (first_reply.id.clone(), vec![nested.id.clone()]),
            (nested.id, vec![]),
        ]
    );

    let newest_first = server
        .get(&format!("/api/discussions/{discussion_id}/posts?sort_direction=desc"))
        .authorization_bearer(&student.token)
        .await
        .json::<PostListView>();
    assert_eq!(newest_first.posts[2].id, created.post.id);

    server
        .get(&format!("/api/discussions/{discussion_id}/posts?sort_by=likes"))
        .authorization_bearer(&student.token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
});
