use std::collections::HashMap;

use surrealdb::sql::Thing;

use crate::access::capability::Capability;
use crate::access::discussion::DiscussionAccess;
use crate::entities::discussion::Discussion;
use crate::entities::forum::Forum;
use crate::entities::post::Post;
use crate::interfaces::capability::CapabilityOracle;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::interfaces::repositories::post::PostRepositoryInterface;
use crate::middleware::error::AppResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::{DiscussionSortKey, Pagination, PostSortKey, QryOrder};

#[derive(Debug, Clone, Copy)]
pub struct DiscussionQuery {
    pub sort: DiscussionSortKey,
    pub direction: QryOrder,
    pub pagination: Pagination,
}

impl Default for DiscussionQuery {
    fn default() -> Self {
        Self {
            sort: DiscussionSortKey::TimeModified,
            direction: QryOrder::DESC,
            pagination: Pagination::all(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscussionSummary {
    pub discussion: Discussion,
    pub num_replies: u64,
    pub last_post: Option<Post>,
}

#[derive(Debug, Clone)]
pub struct DiscussionPage {
    pub forum: Forum,
    pub discussions: Vec<DiscussionSummary>,
    /// Visible discussions across all pages.
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct PostNode {
    pub post: Post,
    pub children: Vec<Thing>,
}

pub struct DiscussionPagerService<'a, C>
where
    C: CapabilityOracle,
{
    state: &'a CtxState,
    access: DiscussionAccess<'a, C>,
}

impl<'a, C> DiscussionPagerService<'a, C>
where
    C: CapabilityOracle,
{
    pub fn new(state: &'a CtxState, oracle: &'a C) -> Self {
        Self {
            state,
            access: DiscussionAccess::new(oracle),
        }
    }

    pub async fn list_discussions(
        &self,
        user: &Thing,
        forum_id: &Thing,
        query: DiscussionQuery,
    ) -> AppResult<DiscussionPage> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        let visibility = self
            .access
            .visibility(user, &forum, self.state.clock.now())
            .await?;

        let discussions = self
            .state
            .db
            .discussions
            .list(forum_id, &visibility, query.sort, query.direction, query.pagination)
            .await?;
        let total = self.state.db.discussions.count(forum_id, &visibility).await?;

        let post_counts: HashMap<Thing, u64> = self
            .state
            .db
            .posts
            .count_by_discussions(discussions.iter().map(|d| d.id.clone()).collect())
            .await?
            .into_iter()
            .map(|c| (c.discussion, c.count.max(0) as u64))
            .collect();

        let mut summaries = Vec::with_capacity(discussions.len());
        for discussion in discussions {
            let num_replies = post_counts
                .get(&discussion.id)
                .map_or(0, |count| count.saturating_sub(1));
            let last_post = self.resolve_last_post(&discussion.id).await?;
            summaries.push(DiscussionSummary {
                discussion,
                num_replies,
                last_post,
            });
        }

        Ok(DiscussionPage {
            forum,
            discussions: summaries,
            total,
        })
    }

    /// Most recent post, the first post when nobody replied yet.
    pub async fn resolve_last_post(&self, discussion_id: &Thing) -> AppResult<Option<Post>> {
        self.state.db.posts.get_latest(discussion_id).await
    }

    pub async fn count_replies(&self, discussion_id: &Thing) -> AppResult<u64> {
        let posts = self.state.db.posts.count_by_discussion(discussion_id).await?;
        Ok(posts.saturating_sub(1))
    }

    pub async fn list_posts(
        &self,
        user: &Thing,
        discussion_id: &Thing,
        sort: PostSortKey,
        direction: QryOrder,
    ) -> AppResult<(Discussion, Vec<PostNode>)> {
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        self.access
            .require_view(user, &forum, &discussion, self.state.clock.now())
            .await?;

        let posts = self
            .state
            .db
            .posts
            .get_by_discussion(discussion_id, sort, direction)
            .await?;
        Ok((discussion, build_post_nodes(posts)))
    }
}

/// Attaches direct child ids to each post, keeping the listing order.
fn build_post_nodes(posts: Vec<Post>) -> Vec<PostNode> {
    let mut children: HashMap<Thing, Vec<Thing>> = HashMap::new();
    for post in &posts {
        if let Some(parent) = &post.parent {
            children
                .entry(parent.clone())
                .or_default()
                .push(post.id.clone());
        }
    }
    posts
        .into_iter()
        .map(|post| PostNode {
            children: children.remove(&post.id).unwrap_or_default(),
            post,
        })
        .collect()
}
