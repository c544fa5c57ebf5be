use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;
use tracing::debug;

use crate::database::client::Db;
use crate::database::surrdb_utils::{cutoff_clause, take_count, take_last};
use crate::database::table_names::{
    DISCUSSION_TABLE_NAME, FORUM_TABLE_NAME, POST_TABLE_NAME, READ_MARK_TABLE_NAME,
    USER_TABLE_NAME,
};
use crate::entities::read_mark::{DiscussionUnread, ReadMark};
use crate::interfaces::repositories::read_mark::ReadMarkRepositoryInterface;
use crate::middleware::error::AppResult;

#[derive(Debug)]
pub struct ReadMarkRepository {
    client: Arc<Db>,
}

impl ReadMarkRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {READ_MARK_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {READ_MARK_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS forum ON TABLE {READ_MARK_TABLE_NAME} TYPE record<{FORUM_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS discussion ON TABLE {READ_MARK_TABLE_NAME} TYPE record<{DISCUSSION_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS post ON TABLE {READ_MARK_TABLE_NAME} TYPE record<{POST_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS first_read ON TABLE {READ_MARK_TABLE_NAME} TYPE int;
        DEFINE FIELD IF NOT EXISTS last_read ON TABLE {READ_MARK_TABLE_NAME} TYPE int;
        DEFINE INDEX IF NOT EXISTS idx_user_discussion ON TABLE {READ_MARK_TABLE_NAME} COLUMNS user, discussion;
        DEFINE INDEX IF NOT EXISTS idx_user_forum ON TABLE {READ_MARK_TABLE_NAME} COLUMNS user, forum;
        DEFINE INDEX IF NOT EXISTS idx_post ON TABLE {READ_MARK_TABLE_NAME} COLUMNS post;
        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

// keyed by [user, post] so concurrent marks land on the same row
fn upsert_mark_sql() -> String {
    format!(
        "UPSERT type::thing('{READ_MARK_TABLE_NAME}', [$user, $post_id])
            SET user = $user, forum = $forum, discussion = $discussion_id, post = $post_id,
                first_read = first_read ?? $now, last_read = $now;"
    )
}

#[async_trait]
impl ReadMarkRepositoryInterface for ReadMarkRepository {
    async fn get(&self, user: &Thing, post: &Thing) -> AppResult<Option<ReadMark>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM type::thing('{READ_MARK_TABLE_NAME}', [$user, $post]);"
            ))
            .bind(("user", user.clone()))
            .bind(("post", post.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn upsert(
        &self,
        user: &Thing,
        forum: &Thing,
        discussion: &Thing,
        post: &Thing,
        now: i64,
    ) -> AppResult<()> {
        self.client
            .query(upsert_mark_sql())
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("discussion_id", discussion.clone()))
            .bind(("post_id", post.clone()))
            .bind(("now", now))
            .await?
            .check()?;
        Ok(())
    }

    async fn mark_discussion(
        &self,
        user: &Thing,
        forum: &Thing,
        discussion: &Thing,
        cutoff: Option<i64>,
        now: i64,
    ) -> AppResult<u64> {
        let sql = format!(
            "BEGIN TRANSACTION;
            LET $posts = (SELECT VALUE id FROM {POST_TABLE_NAME} WHERE discussion = $discussion_id{});
            FOR $post_id IN $posts {{
                {}
            }};
            COMMIT TRANSACTION;
            RETURN array::len($posts);",
            cutoff_clause("created", cutoff),
            upsert_mark_sql()
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("discussion_id", discussion.clone()))
            .bind(("cutoff", cutoff.unwrap_or(0)))
            .bind(("now", now))
            .await?
            .check()?;
        let marked: Option<u64> = take_last(&mut res)?;
        Ok(marked.unwrap_or(0))
    }

    async fn mark_forum(
        &self,
        user: &Thing,
        forum: &Thing,
        group: Option<String>,
        cutoff: Option<i64>,
        now: i64,
    ) -> AppResult<u64> {
        let group_clause = match group {
            Some(_) => " AND (!discussion.group_id OR discussion.group_id = $group)",
            None => "",
        };
        let sql = format!(
            "BEGIN TRANSACTION;
            LET $posts = (SELECT id, discussion FROM {POST_TABLE_NAME} WHERE discussion.forum = $forum{group_clause}{});
            FOR $p IN $posts {{
                LET $post_id = $p.id;
                LET $discussion_id = $p.discussion;
                {}
            }};
            COMMIT TRANSACTION;
            RETURN array::len($posts);",
            cutoff_clause("created", cutoff),
            upsert_mark_sql()
        );
        debug!(%sql, "marking forum read");
        let mut res = self
            .client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("group", group.unwrap_or_default()))
            .bind(("cutoff", cutoff.unwrap_or(0)))
            .bind(("now", now))
            .await?
            .check()?;
        let marked: Option<u64> = take_last(&mut res)?;
        Ok(marked.unwrap_or(0))
    }

    async fn unread_in_discussion(
        &self,
        user: &Thing,
        discussion: &Thing,
        cutoff: Option<i64>,
    ) -> AppResult<u64> {
        let sql = format!(
            "LET $read = (SELECT VALUE post FROM {READ_MARK_TABLE_NAME} WHERE user = $user AND discussion = $discussion);
            SELECT count() AS count FROM {POST_TABLE_NAME} WHERE discussion = $discussion{} AND id NOTINSIDE $read GROUP ALL;",
            cutoff_clause("created", cutoff)
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("discussion", discussion.clone()))
            .bind(("cutoff", cutoff.unwrap_or(0)))
            .await?;
        take_count(&mut res, 1)
    }

    async fn unread_by_discussion(
        &self,
        user: &Thing,
        forum: &Thing,
        cutoff: Option<i64>,
    ) -> AppResult<Vec<DiscussionUnread>> {
        let sql = format!(
            "LET $read = (SELECT VALUE post FROM {READ_MARK_TABLE_NAME} WHERE user = $user AND forum = $forum);
            SELECT discussion, count() AS unread FROM {POST_TABLE_NAME}
                WHERE discussion.forum = $forum{} AND id NOTINSIDE $read GROUP BY discussion;",
            cutoff_clause("created", cutoff)
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("cutoff", cutoff.unwrap_or(0)))
            .await?;
        Ok(res.take(1)?)
    }

    async fn read_post_ids(&self, user: &Thing, discussion: &Thing) -> AppResult<Vec<Thing>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE post FROM {READ_MARK_TABLE_NAME} WHERE user = $user AND discussion = $discussion;"
            ))
            .bind(("user", user.clone()))
            .bind(("discussion", discussion.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn remove_older_than(&self, cutoff: i64) -> AppResult<()> {
        self.client
            .query(format!(
                "DELETE {READ_MARK_TABLE_NAME} WHERE post.created <= $cutoff;"
            ))
            .bind(("cutoff", cutoff))
            .await?
            .check()?;
        Ok(())
    }

    async fn count_by_user(&self, user: &Thing, forum: &Thing) -> AppResult<u64> {
        let mut res = self
            .client
            .query(format!(
                "SELECT count() AS count FROM {READ_MARK_TABLE_NAME} WHERE user = $user AND forum = $forum GROUP ALL;"
            ))
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .await?;
        take_count(&mut res, 0)
    }
}
