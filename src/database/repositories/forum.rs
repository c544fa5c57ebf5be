use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;
use tracing::debug;

use crate::database::client::Db;
use crate::database::table_names::{FORUM_SUB_TABLE_NAME, FORUM_TABLE_NAME};
use crate::entities::forum::{CreateForum, Forum, SubscriptionMode};
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::utils::string_utils::new_thing;

#[derive(Debug)]
pub struct ForumRepository {
    client: Arc<Db>,
}

impl ForumRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {FORUM_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS course ON TABLE {FORUM_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS name ON TABLE {FORUM_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS tracking_type ON TABLE {FORUM_TABLE_NAME} TYPE string ASSERT $value INSIDE ['OFF', 'OPTIONAL', 'FORCED'];
        DEFINE FIELD IF NOT EXISTS subscription_mode ON TABLE {FORUM_TABLE_NAME} TYPE string ASSERT $value INSIDE ['CHOOSE', 'FORCE', 'INITIAL', 'DISALLOW'];
        DEFINE FIELD IF NOT EXISTS completion_discussions ON TABLE {FORUM_TABLE_NAME} TYPE int DEFAULT 0;
        DEFINE FIELD IF NOT EXISTS completion_replies ON TABLE {FORUM_TABLE_NAME} TYPE int DEFAULT 0;
        DEFINE FIELD IF NOT EXISTS completion_posts ON TABLE {FORUM_TABLE_NAME} TYPE int DEFAULT 0;
        DEFINE FIELD IF NOT EXISTS time_modified ON TABLE {FORUM_TABLE_NAME} TYPE int;
        DEFINE INDEX IF NOT EXISTS idx_course ON TABLE {FORUM_TABLE_NAME} COLUMNS course;

        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

#[async_trait]
impl ForumRepositoryInterface for ForumRepository {
    async fn create(&self, data: CreateForum) -> AppResult<Forum> {
        let mut res = self
            .client
            .query("CREATE $id CONTENT $data;")
            .bind(("id", new_thing(FORUM_TABLE_NAME)))
            .bind(("data", data))
            .await?
            .check()?;
        let forum: Option<Forum> = res.take(0)?;
        forum.ok_or(AppError::Generic {
            description: "forum not created".to_string(),
        })
    }

    async fn get_by_id(&self, forum: &Thing) -> AppResult<Forum> {
        let mut res = self
            .client
            .query("SELECT * FROM $forum;")
            .bind(("forum", forum.clone()))
            .await?;
        let data: Option<Forum> = res.take(0)?;
        data.ok_or(AppError::not_found(forum.to_raw()))
    }

    async fn set_subscription_mode(
        &self,
        forum: &Thing,
        mode: SubscriptionMode,
        subscribe_users: Vec<Thing>,
        now: i64,
    ) -> AppResult<()> {
        let subscribing = subscribe_users.len();
        let sql = format!(
            "BEGIN TRANSACTION;
            UPDATE $forum SET subscription_mode = $mode, time_modified = $now;
            FOR $user IN $users {{
                UPSERT type::thing('{FORUM_SUB_TABLE_NAME}', [$user, $forum])
                    SET user = $user, forum = $forum, created = created ?? $now;
            }};
            COMMIT TRANSACTION;"
        );
        self.client
            .query(sql)
            .bind(("forum", forum.clone()))
            .bind(("mode", mode))
            .bind(("users", subscribe_users))
            .bind(("now", now))
            .await?
            .check()?;
        debug!(forum = %forum, %mode, subscribing, "subscription mode stored");
        Ok(())
    }
}
