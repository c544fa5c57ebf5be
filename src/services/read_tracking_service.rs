use std::collections::HashSet;

use surrealdb::sql::Thing;
use tracing::{debug, info};

use crate::access::discussion::DiscussionAccess;
use crate::access::capability::Capability;
use crate::config::TrackingConfig;
use crate::entities::forum::{Forum, TrackingType};
use crate::entities::post::Post;
use crate::entities::read_mark::DiscussionUnread;
use crate::interfaces::capability::CapabilityOracle;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::interfaces::repositories::post::PostRepositoryInterface;
use crate::interfaces::repositories::read_mark::{
    ReadMarkRepositoryInterface, TrackingPreferenceRepositoryInterface,
};
use crate::middleware::error::{AppError, AppResult, ErrorCode};
use crate::middleware::mw_ctx::{emit, AppEvent, AppEventType, CtxState};

pub struct ReadTrackingService<'a, R, T, C>
where
    R: ReadMarkRepositoryInterface,
    T: TrackingPreferenceRepositoryInterface,
    C: CapabilityOracle,
{
    state: &'a CtxState,
    read_marks: &'a R,
    tracking_prefs: &'a T,
    access: DiscussionAccess<'a, C>,
    config: TrackingConfig,
}

impl<'a, R, T, C> ReadTrackingService<'a, R, T, C>
where
    R: ReadMarkRepositoryInterface,
    T: TrackingPreferenceRepositoryInterface,
    C: CapabilityOracle,
{
    pub fn new(state: &'a CtxState, read_marks: &'a R, tracking_prefs: &'a T, oracle: &'a C) -> Self {
        Self {
            state,
            read_marks,
            tracking_prefs,
            access: DiscussionAccess::new(oracle),
            config: state.tracking,
        }
    }

    fn cutoff(&self) -> Option<i64> {
        self.config.cutoff(self.state.clock.now())
    }

    /// Without a user only the site and forum settings are checked.
    pub async fn can_track(&self, forum: &Forum, user: Option<&Thing>) -> AppResult<bool> {
        if !self.config.enabled || forum.tracking_type == TrackingType::Off {
            return Ok(false);
        }
        let Some(user) = user else {
            return Ok(true);
        };
        if self.allows_opt_out(forum) {
            Ok(!self.tracking_prefs.is_opted_out(user, &forum.id).await?)
        } else {
            Ok(true)
        }
    }

    pub async fn mark_post_read(&self, user: &Thing, post_id: &Thing) -> AppResult<bool> {
        let post = self.state.db.posts.get_by_id(post_id).await?;
        let discussion = self.state.db.discussions.get_by_id(&post.discussion).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        self.access
            .require_view(user, &forum, &discussion, self.state.clock.now())
            .await?;
        self.mark_post(user, &forum, &post).await
    }

    /// Marks a post the caller already loaded, e.g. the author's own new post.
    pub async fn mark_post(&self, user: &Thing, forum: &Forum, post: &Post) -> AppResult<bool> {
        if !self.can_track(forum, Some(user)).await? {
            return Ok(false);
        }
        let now = self.state.clock.now();
        if let Some(mark) = self.read_marks.get(user, &post.id).await? {
            if mark.last_read >= now {
                return Ok(false);
            }
        }
        self.read_marks
            .upsert(user, &forum.id, &post.discussion, &post.id, now)
            .await?;
        Ok(true)
    }

    pub async fn mark_discussion_read(&self, user: &Thing, discussion_id: &Thing) -> AppResult<u64> {
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        let now = self.state.clock.now();
        self.access.require_view(user, &forum, &discussion, now).await?;
        if !self.can_track(&forum, Some(user)).await? {
            return Ok(0);
        }
        let marked = self
            .read_marks
            .mark_discussion(user, &forum.id, discussion_id, self.cutoff(), now)
            .await?;
        debug!(user = %user, discussion = %discussion_id, marked, "discussion marked read");
        Ok(marked)
    }

    /// With a group, discussions of other groups are left untouched.
    pub async fn mark_forum_read(
        &self,
        user: &Thing,
        forum_id: &Thing,
        group: Option<String>,
    ) -> AppResult<u64> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        if !self.can_track(&forum, Some(user)).await? {
            return Ok(0);
        }
        let marked = self
            .read_marks
            .mark_forum(user, forum_id, group, self.cutoff(), self.state.clock.now())
            .await?;
        debug!(user = %user, forum = %forum_id, marked, "forum marked read");
        Ok(marked)
    }

    pub async fn count_unread_in_discussion(&self, user: &Thing, discussion_id: &Thing) -> AppResult<u64> {
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        self.access
            .require_view(user, &forum, &discussion, self.state.clock.now())
            .await?;
        if !self.can_track(&forum, Some(user)).await? {
            return Ok(0);
        }
        self.read_marks
            .unread_in_discussion(user, discussion_id, self.cutoff())
            .await
    }

    pub async fn count_unread_in_forum(&self, user: &Thing, forum: &Forum) -> AppResult<u64> {
        self.access
            .require(user, Capability::ViewDiscussion, forum)
            .await?;
        let per_discussion = self.unread_by_discussion(user, forum).await?;
        Ok(per_discussion.iter().map(|d| d.unread.max(0) as u64).sum())
    }

    /// Discussions without unread posts are left out.
    pub async fn unread_by_discussion(&self, user: &Thing, forum: &Forum) -> AppResult<Vec<DiscussionUnread>> {
        if !self.can_track(forum, Some(user)).await? {
            return Ok(vec![]);
        }
        self.read_marks
            .unread_by_discussion(user, &forum.id, self.cutoff())
            .await
    }

    pub async fn read_post_ids(&self, user: &Thing, discussion_id: &Thing) -> AppResult<HashSet<Thing>> {
        let ids = self.read_marks.read_post_ids(user, discussion_id).await?;
        Ok(ids.into_iter().collect())
    }

    /// Posts older than the cutoff always count as read.
    pub fn is_read(&self, post: &Post, read_ids: &HashSet<Thing>) -> bool {
        self.cutoff().is_some_and(|cutoff| post.created <= cutoff) || read_ids.contains(&post.id)
    }

    pub async fn is_post_read(&self, user: &Thing, post_id: &Thing) -> AppResult<bool> {
        let post = self.state.db.posts.get_by_id(post_id).await?;
        let discussion = self.state.db.discussions.get_by_id(&post.discussion).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        self.access
            .require_view(user, &forum, &discussion, self.state.clock.now())
            .await?;
        if self.cutoff().is_some_and(|cutoff| post.created <= cutoff) {
            return Ok(true);
        }
        Ok(self.read_marks.get(user, post_id).await?.is_some())
    }

    fn allows_opt_out(&self, forum: &Forum) -> bool {
        match forum.tracking_type {
            TrackingType::Optional => true,
            TrackingType::Forced => self.config.allow_forced,
            TrackingType::Off => false,
        }
    }

    fn require_toggleable(&self, forum: &Forum) -> AppResult<()> {
        if self.config.enabled && self.allows_opt_out(forum) {
            Ok(())
        } else {
            Err(AppError::StateConflict {
                code: ErrorCode::CannotTrack,
                description: format!("read tracking of {} can not be changed", forum.name),
            })
        }
    }

    pub async fn start_tracking(&self, user: &Thing, forum_id: &Thing) -> AppResult<bool> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        self.require_toggleable(&forum)?;
        let changed = self.tracking_prefs.opt_in(user, forum_id).await?;
        if changed {
            emit(
                &self.state.event_sender,
                AppEvent::forum(AppEventType::TrackingEnabled, user, forum_id),
            );
        }
        Ok(changed)
    }

    /// Drops the user's read marks for the forum with the opt-out.
    pub async fn stop_tracking(&self, user: &Thing, forum_id: &Thing) -> AppResult<bool> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        self.require_toggleable(&forum)?;
        let changed = self
            .tracking_prefs
            .opt_out(user, forum_id, self.state.clock.now())
            .await?;
        if changed {
            emit(
                &self.state.event_sender,
                AppEvent::forum(AppEventType::TrackingDisabled, user, forum_id),
            );
        }
        Ok(changed)
    }

    /// Read marks of posts past the cutoff carry no information.
    pub async fn clean_read_marks(&self) -> AppResult<()> {
        if let Some(cutoff) = self.cutoff() {
            self.read_marks.remove_older_than(cutoff).await?;
            info!(cutoff, "old read marks removed");
        }
        Ok(())
    }
}
