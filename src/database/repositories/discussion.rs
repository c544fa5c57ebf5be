use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;
use tracing::debug;

use crate::access::discussion::{GroupFilter, Visibility};
use crate::database::client::Db;
use crate::database::surrdb_utils::{take_count, take_last};
use crate::database::table_names::{
    DISCUSSION_SUB_TABLE_NAME, DISCUSSION_TABLE_NAME, FORUM_TABLE_NAME, POST_TABLE_NAME,
    READ_MARK_TABLE_NAME, USER_TABLE_NAME,
};
use crate::entities::discussion::{CreateDiscussion, Discussion};
use crate::entities::post::{CreatePost, Post};
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::utils::db_utils::{order_clause, DiscussionSortKey, Pagination, QryOrder};

#[derive(Debug)]
pub struct DiscussionRepository {
    client: Arc<Db>,
}

impl DiscussionRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {DISCUSSION_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS forum ON TABLE {DISCUSSION_TABLE_NAME} TYPE record<{FORUM_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS name ON TABLE {DISCUSSION_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS group_id ON TABLE {DISCUSSION_TABLE_NAME} TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS first_post ON TABLE {DISCUSSION_TABLE_NAME} TYPE option<record<{POST_TABLE_NAME}>>;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {DISCUSSION_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS locked ON TABLE {DISCUSSION_TABLE_NAME} TYPE bool DEFAULT false;
        DEFINE FIELD IF NOT EXISTS time_start ON TABLE {DISCUSSION_TABLE_NAME} TYPE int DEFAULT 0;
        DEFINE FIELD IF NOT EXISTS time_end ON TABLE {DISCUSSION_TABLE_NAME} TYPE int DEFAULT 0;
        DEFINE FIELD IF NOT EXISTS time_modified ON TABLE {DISCUSSION_TABLE_NAME} TYPE int;
        DEFINE FIELD IF NOT EXISTS user_modified ON TABLE {DISCUSSION_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS created ON TABLE {DISCUSSION_TABLE_NAME} TYPE int;
        DEFINE INDEX IF NOT EXISTS idx_forum ON TABLE {DISCUSSION_TABLE_NAME} COLUMNS forum;
        DEFINE INDEX IF NOT EXISTS idx_forum_modified ON TABLE {DISCUSSION_TABLE_NAME} COLUMNS forum, time_modified;
        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

/// Extra `WHERE` conditions for what the viewer may see, bound to `$groups` and `$now`.
fn visibility_clause(visibility: &Visibility) -> String {
    let mut clause = String::new();
    if let GroupFilter::Groups(_) = visibility.groups {
        clause.push_str(" AND (!group_id OR group_id INSIDE $groups)");
    }
    if !visibility.include_hidden_timed {
        clause.push_str(
            " AND (time_start = 0 OR time_start <= $now) AND (time_end = 0 OR time_end > $now)",
        );
    }
    clause
}

fn bound_groups(visibility: &Visibility) -> Vec<String> {
    match &visibility.groups {
        GroupFilter::All => vec![],
        GroupFilter::Groups(groups) => groups.clone(),
    }
}

#[async_trait]
impl DiscussionRepositoryInterface for DiscussionRepository {
    async fn create_with_post(
        &self,
        id: Thing,
        data: CreateDiscussion,
        post_id: Thing,
        post: CreatePost,
    ) -> AppResult<Discussion> {
        let mut res = self
            .client
            .query(
                "BEGIN TRANSACTION;
                CREATE $id CONTENT $data;
                CREATE $post_id CONTENT $post;
                UPDATE $id SET first_post = $post_id;
                COMMIT TRANSACTION;
                SELECT * FROM $id;",
            )
            .bind(("id", id))
            .bind(("data", data))
            .bind(("post_id", post_id))
            .bind(("post", post))
            .await?
            .check()?;
        let discussion: Option<Discussion> = take_last(&mut res)?;
        discussion.ok_or(AppError::Generic {
            description: "discussion not created".to_string(),
        })
    }

    async fn get_by_id(&self, discussion: &Thing) -> AppResult<Discussion> {
        let mut res = self
            .client
            .query("SELECT * FROM $discussion;")
            .bind(("discussion", discussion.clone()))
            .await?;
        let data: Option<Discussion> = res.take(0)?;
        data.ok_or(AppError::not_found(discussion.to_raw()))
    }

    async fn add_post(&self, discussion: &Thing, post_id: Thing, post: CreatePost) -> AppResult<Post> {
        let mut res = self
            .client
            .query(
                "BEGIN TRANSACTION;
                LET $existing = (SELECT VALUE id FROM $discussion);
                IF array::len($existing) == 0 { THROW 'discussion not found'; };
                CREATE $post_id CONTENT $post;
                UPDATE $discussion SET time_modified = $post.created, user_modified = $post.user;
                COMMIT TRANSACTION;
                SELECT * FROM $post_id;",
            )
            .bind(("discussion", discussion.clone()))
            .bind(("post_id", post_id))
            .bind(("post", post))
            .await?
            .check()?;
        let post: Option<Post> = take_last(&mut res)?;
        post.ok_or(AppError::Generic {
            description: "post not created".to_string(),
        })
    }

    async fn set_locked(&self, discussion: &Thing, locked: bool) -> AppResult<()> {
        self.client
            .query("UPDATE $discussion SET locked = $locked;")
            .bind(("discussion", discussion.clone()))
            .bind(("locked", locked))
            .await?
            .check()?;
        Ok(())
    }

    async fn delete(&self, discussion: &Thing) -> AppResult<()> {
        let sql = format!(
            "BEGIN TRANSACTION;
            DELETE {READ_MARK_TABLE_NAME} WHERE discussion = $discussion;
            DELETE {DISCUSSION_SUB_TABLE_NAME} WHERE discussion = $discussion;
            DELETE {POST_TABLE_NAME} WHERE discussion = $discussion;
            DELETE $discussion;
            COMMIT TRANSACTION;"
        );
        self.client
            .query(sql)
            .bind(("discussion", discussion.clone()))
            .await?
            .check()?;
        Ok(())
    }

    async fn list(
        &self,
        forum: &Thing,
        visibility: &Visibility,
        sort: DiscussionSortKey,
        direction: QryOrder,
        pagination: Pagination,
    ) -> AppResult<Vec<Discussion>> {
        let window = pagination.window();
        let limit_clause = match window {
            Some(_) => " LIMIT $limit START $start",
            None => "",
        };
        let (limit, start) = window.unwrap_or((0, 0));
        let sql = format!(
            "SELECT * FROM {DISCUSSION_TABLE_NAME} WHERE forum = $forum{} ORDER BY {}{limit_clause};",
            visibility_clause(visibility),
            order_clause(sort.column(), direction),
        );
        debug!(%sql, "listing discussions");
        let mut res = self
            .client
            .query(sql)
            .bind(("forum", forum.clone()))
            .bind(("groups", bound_groups(visibility)))
            .bind(("now", visibility.now))
            .bind(("limit", limit))
            .bind(("start", start))
            .await?;
        Ok(res.take(0)?)
    }

    async fn count(&self, forum: &Thing, visibility: &Visibility) -> AppResult<u64> {
        let sql = format!(
            "SELECT count() AS count FROM {DISCUSSION_TABLE_NAME} WHERE forum = $forum{} GROUP ALL;",
            visibility_clause(visibility),
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("forum", forum.clone()))
            .bind(("groups", bound_groups(visibility)))
            .bind(("now", visibility.now))
            .await?;
        take_count(&mut res, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_clause_follows_the_filter() {
        assert_eq!(visibility_clause(&Visibility::everything(5)), "");

        let vis = Visibility {
            groups: GroupFilter::Groups(vec!["g1".to_string()]),
            include_hidden_timed: false,
            now: 5,
        };
        let clause = visibility_clause(&vis);
        assert!(clause.contains("group_id INSIDE $groups"));
        assert!(clause.contains("time_end > $now"));
    }
}
