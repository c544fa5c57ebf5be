use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::database::surrdb_utils::take_count;
use crate::database::table_names::{DISCUSSION_TABLE_NAME, POST_TABLE_NAME, USER_TABLE_NAME};
use crate::entities::post::Post;
use crate::interfaces::repositories::post::{DiscussionPostCount, PostRepositoryInterface};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::utils::db_utils::{order_clause, PostSortKey, QryOrder};

#[derive(Debug)]
pub struct PostRepository {
    client: Arc<Db>,
}

impl PostRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {POST_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS discussion ON TABLE {POST_TABLE_NAME} TYPE record<{DISCUSSION_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS parent ON TABLE {POST_TABLE_NAME} TYPE option<record<{POST_TABLE_NAME}>>;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {POST_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS created ON TABLE {POST_TABLE_NAME} TYPE int;
        DEFINE FIELD IF NOT EXISTS modified ON TABLE {POST_TABLE_NAME} TYPE int;
        DEFINE FIELD IF NOT EXISTS subject ON TABLE {POST_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS message ON TABLE {POST_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS message_format ON TABLE {POST_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS attachments ON TABLE {POST_TABLE_NAME} TYPE array<string> DEFAULT [];
        DEFINE INDEX IF NOT EXISTS idx_discussion ON TABLE {POST_TABLE_NAME} COLUMNS discussion;
        DEFINE INDEX IF NOT EXISTS idx_discussion_created ON TABLE {POST_TABLE_NAME} COLUMNS discussion, created;
        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

#[async_trait]
impl PostRepositoryInterface for PostRepository {
    async fn get_by_id(&self, post: &Thing) -> AppResult<Post> {
        let mut res = self
            .client
            .query("SELECT * FROM $post;")
            .bind(("post", post.clone()))
            .await?;
        let data: Option<Post> = res.take(0)?;
        data.ok_or(AppError::not_found(post.to_raw()))
    }

    async fn get_by_discussion(
        &self,
        discussion: &Thing,
        sort: PostSortKey,
        direction: QryOrder,
    ) -> AppResult<Vec<Post>> {
        let sql = format!(
            "SELECT * FROM {POST_TABLE_NAME} WHERE discussion = $discussion ORDER BY {};",
            order_clause(sort.column(), direction)
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("discussion", discussion.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn get_latest(&self, discussion: &Thing) -> AppResult<Option<Post>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {POST_TABLE_NAME} WHERE discussion = $discussion ORDER BY created DESC, id DESC LIMIT 1;"
            ))
            .bind(("discussion", discussion.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn count_by_discussion(&self, discussion: &Thing) -> AppResult<u64> {
        let mut res = self
            .client
            .query(format!(
                "SELECT count() AS count FROM {POST_TABLE_NAME} WHERE discussion = $discussion GROUP ALL;"
            ))
            .bind(("discussion", discussion.clone()))
            .await?;
        take_count(&mut res, 0)
    }

    async fn count_by_discussions(&self, discussions: Vec<Thing>) -> AppResult<Vec<DiscussionPostCount>> {
        if discussions.is_empty() {
            return Ok(vec![]);
        }
        let mut res = self
            .client
            .query(format!(
                "SELECT discussion, count() AS count FROM {POST_TABLE_NAME} WHERE discussion INSIDE $discussions GROUP BY discussion;"
            ))
            .bind(("discussions", discussions))
            .await?;
        Ok(res.take(0)?)
    }
}
