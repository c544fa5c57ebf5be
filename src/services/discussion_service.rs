use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use tracing::info;
use validator::Validate;

use crate::access::capability::Capability;
use crate::access::discussion::DiscussionAccess;
use crate::database::table_names::{DISCUSSION_TABLE_NAME, POST_TABLE_NAME};
use crate::entities::discussion::{CreateDiscussion, Discussion};
use crate::entities::post::{CreatePost, MessageFormat, Post};
use crate::interfaces::capability::CapabilityOracle;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::interfaces::repositories::post::PostRepositoryInterface;
use crate::interfaces::repositories::read_mark::{
    ReadMarkRepositoryInterface, TrackingPreferenceRepositoryInterface,
};
use crate::middleware::error::{AppError, AppResult, BestEffort, ErrorCode};
use crate::middleware::mw_ctx::{emit, AppEvent, AppEventType, CtxState};
use crate::middleware::utils::string_utils::{get_str_thing, new_thing};
use crate::services::read_tracking_service::ReadTrackingService;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StartDiscussionInput {
    #[validate(length(min = 1, max = 255, message = "Name must have 1 to 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Message can not be empty"))]
    pub message: String,
    #[serde(default)]
    pub message_format: MessageFormat,
    pub group_id: Option<String>,
    #[serde(default)]
    pub time_start: i64,
    #[serde(default)]
    pub time_end: i64,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReplyInput {
    /// Defaults to the first post of the discussion.
    pub parent_id: Option<String>,
    #[validate(length(max = 255, message = "Subject max 255 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "Message can not be empty"))]
    pub message: String,
    #[serde(default)]
    pub message_format: MessageFormat,
    #[serde(default)]
    pub attachments: Vec<String>,
}

pub struct DiscussionService<'a, R, T, C>
where
    R: ReadMarkRepositoryInterface,
    T: TrackingPreferenceRepositoryInterface,
    C: CapabilityOracle,
{
    state: &'a CtxState,
    oracle: &'a C,
    access: DiscussionAccess<'a, C>,
    tracker: ReadTrackingService<'a, R, T, C>,
}

impl<'a, R, T, C> DiscussionService<'a, R, T, C>
where
    R: ReadMarkRepositoryInterface,
    T: TrackingPreferenceRepositoryInterface,
    C: CapabilityOracle,
{
    pub fn new(state: &'a CtxState, read_marks: &'a R, tracking_prefs: &'a T, oracle: &'a C) -> Self {
        Self {
            state,
            oracle,
            access: DiscussionAccess::new(oracle),
            tracker: ReadTrackingService::new(state, read_marks, tracking_prefs, oracle),
        }
    }

    pub async fn create_discussion(
        &self,
        user: &Thing,
        forum_id: &Thing,
        data: StartDiscussionInput,
    ) -> AppResult<(Discussion, Post)> {
        data.validate()?;
        if data.time_end != 0 && data.time_end <= data.time_start {
            return Err(AppError::invalid("time_end must be after time_start"));
        }
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::StartDiscussion, &forum)
            .await?;

        let group_id = data.group_id.filter(|g| !g.is_empty());
        if let Some(group) = &group_id {
            let all_groups = self
                .access
                .can(user, Capability::AccessAllGroups, &forum)
                .await?;
            if !all_groups && !self.oracle.groups(user, &forum.course).await?.contains(group) {
                return Err(AppError::no_permission(Capability::AccessAllGroups.to_string()));
            }
        }

        let now = self.state.clock.now();
        let discussion_id = new_thing(DISCUSSION_TABLE_NAME);
        let post_id = new_thing(POST_TABLE_NAME);
        let discussion = self
            .state
            .db
            .discussions
            .create_with_post(
                discussion_id.clone(),
                CreateDiscussion {
                    forum: forum.id.clone(),
                    name: data.name.clone(),
                    group_id,
                    user: user.clone(),
                    locked: false,
                    time_start: data.time_start,
                    time_end: data.time_end,
                    time_modified: now,
                    user_modified: user.clone(),
                    created: now,
                },
                post_id.clone(),
                CreatePost {
                    discussion: discussion_id.clone(),
                    parent: None,
                    user: user.clone(),
                    created: now,
                    modified: now,
                    subject: data.name,
                    message: data.message,
                    message_format: data.message_format,
                    attachments: data.attachments,
                },
            )
            .await?;
        let post = self.state.db.posts.get_by_id(&post_id).await?;
        info!(discussion = %discussion.id, forum = %forum.id, "discussion created");

        emit(
            &self.state.event_sender,
            AppEvent::discussion(AppEventType::DiscussionCreated, user, &forum.id, &discussion.id),
        );
        emit(
            &self.state.event_sender,
            AppEvent::discussion(AppEventType::PostCreated, user, &forum.id, &discussion.id)
                .with_post(&post.id),
        );
        self.tracker
            .mark_post(user, &forum, &post)
            .await
            .or_log("mark own post read");
        Ok((discussion, post))
    }

    pub async fn add_reply(&self, user: &Thing, discussion_id: &Thing, data: ReplyInput) -> AppResult<Post> {
        data.validate()?;
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        let now = self.state.clock.now();
        self.access.require_view(user, &forum, &discussion, now).await?;
        self.access
            .require(user, Capability::ReplyPost, &forum)
            .await?;
        if discussion.locked
            && !self
                .access
                .can(user, Capability::LockDiscussion, &forum)
                .await?
        {
            return Err(AppError::StateConflict {
                code: ErrorCode::DiscussionLocked,
                description: format!("discussion {} is locked", discussion.name),
            });
        }

        let parent = match &data.parent_id {
            Some(parent_id) => {
                let parent = self
                    .state
                    .db
                    .posts
                    .get_by_id(&get_str_thing(POST_TABLE_NAME, parent_id)?)
                    .await?;
                if parent.discussion != discussion.id {
                    return Err(AppError::invalid("parent post belongs to another discussion"));
                }
                parent.id
            }
            None => discussion
                .first_post
                .clone()
                .ok_or(AppError::not_found(format!("first post of {}", discussion.id)))?,
        };

        let subject = data
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Re: {}", discussion.name));
        let post = self
            .state
            .db
            .discussions
            .add_post(
                &discussion.id,
                new_thing(POST_TABLE_NAME),
                CreatePost {
                    discussion: discussion.id.clone(),
                    parent: Some(parent),
                    user: user.clone(),
                    created: now,
                    modified: now,
                    subject,
                    message: data.message,
                    message_format: data.message_format,
                    attachments: data.attachments,
                },
            )
            .await?;

        emit(
            &self.state.event_sender,
            AppEvent::discussion(AppEventType::PostCreated, user, &forum.id, &discussion.id)
                .with_post(&post.id),
        );
        self.tracker
            .mark_post(user, &forum, &post)
            .await
            .or_log("mark own post read");
        Ok(post)
    }

    pub async fn set_locked(&self, user: &Thing, discussion_id: &Thing, locked: bool) -> AppResult<()> {
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        self.access
            .require(user, Capability::LockDiscussion, &forum)
            .await?;
        self.state
            .db
            .discussions
            .set_locked(discussion_id, locked)
            .await
    }

    /// Owners may delete their own discussion until someone replies.
    pub async fn delete_discussion(&self, user: &Thing, discussion_id: &Thing) -> AppResult<()> {
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        let can_delete_any = self
            .access
            .can(user, Capability::DeleteAnyPost, &forum)
            .await?;
        if !can_delete_any {
            let posts = self.state.db.posts.count_by_discussion(discussion_id).await?;
            if !discussion.is_owner(user) || posts > 1 {
                return Err(AppError::no_permission(Capability::DeleteAnyPost.to_string()));
            }
        }
        self.state.db.discussions.delete(discussion_id).await?;
        info!(discussion = %discussion_id, "discussion deleted");
        emit(
            &self.state.event_sender,
            AppEvent::discussion(AppEventType::DiscussionDeleted, user, &forum.id, discussion_id),
        );
        Ok(())
    }
}
