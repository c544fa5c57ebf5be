use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{
    entities::forum::{CreateForum, Forum, SubscriptionMode},
    middleware::error::AppResult,
};

#[async_trait]
pub trait ForumRepositoryInterface: Send + Sync {
    async fn create(&self, data: CreateForum) -> AppResult<Forum>;
    async fn get_by_id(&self, forum: &Thing) -> AppResult<Forum>;
    /// Changes the mode and, in the same transaction, upserts a forum
    /// subscription for every user in `subscribe_users`.
    async fn set_subscription_mode(
        &self,
        forum: &Thing,
        mode: SubscriptionMode,
        subscribe_users: Vec<Thing>,
        now: i64,
    ) -> AppResult<()>;
}
