use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{
    entities::subscription::{DiscussionPreference, DiscussionSubscription, MailDigest},
    middleware::error::AppResult,
};

#[async_trait]
pub trait SubscriptionRepositoryInterface: Send + Sync {
    async fn is_forum_subscribed(&self, user: &Thing, forum: &Thing) -> AppResult<bool>;

    /// Returns true when a new row was written.
    async fn subscribe_forum(&self, user: &Thing, forum: &Thing, now: i64) -> AppResult<bool>;

    /// Returns true when a row was removed.
    async fn unsubscribe_forum(&self, user: &Thing, forum: &Thing) -> AppResult<bool>;

    async fn forum_subscribers(&self, forum: &Thing) -> AppResult<Vec<Thing>>;

    async fn count_forum_subscriptions(&self, forum: &Thing) -> AppResult<u64>;

    async fn discussion_preference(
        &self,
        user: &Thing,
        discussion: &Thing,
    ) -> AppResult<Option<DiscussionPreference>>;

    async fn set_discussion_preference(
        &self,
        user: &Thing,
        forum: &Thing,
        discussion: &Thing,
        preference: DiscussionPreference,
        now: i64,
    ) -> AppResult<()>;

    async fn discussion_preferences(&self, discussion: &Thing) -> AppResult<Vec<DiscussionSubscription>>;

    async fn get_digest(&self, user: &Thing, forum: &Thing) -> AppResult<Option<MailDigest>>;

    async fn set_digest(&self, user: &Thing, forum: &Thing, digest: Option<MailDigest>) -> AppResult<()>;
}
