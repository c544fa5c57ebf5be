use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{
    entities::post::Post,
    middleware::{
        error::AppResult,
        utils::db_utils::{PostSortKey, QryOrder},
    },
};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DiscussionPostCount {
    pub discussion: Thing,
    pub count: i64,
}

#[async_trait]
pub trait PostRepositoryInterface: Send + Sync {
    async fn get_by_id(&self, post: &Thing) -> AppResult<Post>;
    async fn get_by_discussion(
        &self,
        discussion: &Thing,
        sort: PostSortKey,
        direction: QryOrder,
    ) -> AppResult<Vec<Post>>;
    async fn get_latest(&self, discussion: &Thing) -> AppResult<Option<Post>>;
    async fn count_by_discussion(&self, discussion: &Thing) -> AppResult<u64>;
    async fn count_by_discussions(&self, discussions: Vec<Thing>) -> AppResult<Vec<DiscussionPostCount>>;
}
