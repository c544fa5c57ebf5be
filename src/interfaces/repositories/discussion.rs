use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{
    access::discussion::Visibility,
    entities::{
        discussion::{CreateDiscussion, Discussion},
        post::{CreatePost, Post},
    },
    middleware::{
        error::AppResult,
        utils::db_utils::{DiscussionSortKey, Pagination, QryOrder},
    },
};

#[async_trait]
pub trait DiscussionRepositoryInterface: Send + Sync {
    /// Creates the discussion and its first post atomically.
    async fn create_with_post(
        &self,
        id: Thing,
        data: CreateDiscussion,
        post_id: Thing,
        post: CreatePost,
    ) -> AppResult<Discussion>;

    async fn get_by_id(&self, discussion: &Thing) -> AppResult<Discussion>;

    /// Creates a reply and stamps the discussion as modified by its author,
    /// both or neither.
    async fn add_post(&self, discussion: &Thing, post_id: Thing, post: CreatePost) -> AppResult<Post>;

    async fn set_locked(&self, discussion: &Thing, locked: bool) -> AppResult<()>;

    /// Removes the discussion with its posts, read marks and discussion
    /// subscriptions in one transaction.
    async fn delete(&self, discussion: &Thing) -> AppResult<()>;

    async fn list(
        &self,
        forum: &Thing,
        visibility: &Visibility,
        sort: DiscussionSortKey,
        direction: QryOrder,
        pagination: Pagination,
    ) -> AppResult<Vec<Discussion>>;

    async fn count(&self, forum: &Thing, visibility: &Visibility) -> AppResult<u64>;
}
