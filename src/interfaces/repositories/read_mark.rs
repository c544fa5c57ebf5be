use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{
    entities::read_mark::{DiscussionUnread, ReadMark},
    middleware::error::AppResult,
};

#[async_trait]
pub trait ReadMarkRepositoryInterface: Send + Sync {
    async fn get(&self, user: &Thing, post: &Thing) -> AppResult<Option<ReadMark>>;

    async fn upsert(
        &self,
        user: &Thing,
        forum: &Thing,
        discussion: &Thing,
        post: &Thing,
        now: i64,
    ) -> AppResult<()>;

    /// Marks every post of the discussion newer than `cutoff` in one
    /// transaction. Returns the number of posts marked.
    async fn mark_discussion(
        &self,
        user: &Thing,
        forum: &Thing,
        discussion: &Thing,
        cutoff: Option<i64>,
        now: i64,
    ) -> AppResult<u64>;

    /// Forum wide variant. With a group only that group's and group-less
    /// discussions are touched.
    async fn mark_forum(
        &self,
        user: &Thing,
        forum: &Thing,
        group: Option<String>,
        cutoff: Option<i64>,
        now: i64,
    ) -> AppResult<u64>;

    async fn unread_in_discussion(
        &self,
        user: &Thing,
        discussion: &Thing,
        cutoff: Option<i64>,
    ) -> AppResult<u64>;

    async fn unread_by_discussion(
        &self,
        user: &Thing,
        forum: &Thing,
        cutoff: Option<i64>,
    ) -> AppResult<Vec<DiscussionUnread>>;

    async fn read_post_ids(&self, user: &Thing, discussion: &Thing) -> AppResult<Vec<Thing>>;

    async fn remove_older_than(&self, cutoff: i64) -> AppResult<()>;

    async fn count_by_user(&self, user: &Thing, forum: &Thing) -> AppResult<u64>;
}

#[async_trait]
pub trait TrackingPreferenceRepositoryInterface: Send + Sync {
    async fn is_opted_out(&self, user: &Thing, forum: &Thing) -> AppResult<bool>;

    /// Records the opt-out and drops the user's read marks for the forum.
    /// Returns false when the user had already opted out.
    async fn opt_out(&self, user: &Thing, forum: &Thing, now: i64) -> AppResult<bool>;

    /// Returns false when there was no opt-out to remove.
    async fn opt_in(&self, user: &Thing, forum: &Thing) -> AppResult<bool>;
}
