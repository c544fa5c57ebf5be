use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::database::surrdb_utils::take_last;
use crate::database::table_names::{
    FORUM_TABLE_NAME, READ_MARK_TABLE_NAME, TRACKING_PREF_TABLE_NAME, USER_TABLE_NAME,
};
use crate::interfaces::repositories::read_mark::TrackingPreferenceRepositoryInterface;
use crate::middleware::error::AppResult;

#[derive(Debug)]
pub struct TrackingPreferenceRepository {
    client: Arc<Db>,
}

impl TrackingPreferenceRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {TRACKING_PREF_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {TRACKING_PREF_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS forum ON TABLE {TRACKING_PREF_TABLE_NAME} TYPE record<{FORUM_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS created ON TABLE {TRACKING_PREF_TABLE_NAME} TYPE int;
        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

#[async_trait]
impl TrackingPreferenceRepositoryInterface for TrackingPreferenceRepository {
    async fn is_opted_out(&self, user: &Thing, forum: &Thing) -> AppResult<bool> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE id FROM type::thing('{TRACKING_PREF_TABLE_NAME}', [$user, $forum]);"
            ))
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .await?;
        let ids: Vec<Thing> = res.take(0)?;
        Ok(!ids.is_empty())
    }

    async fn opt_out(&self, user: &Thing, forum: &Thing, now: i64) -> AppResult<bool> {
        let sql = format!(
            "BEGIN TRANSACTION;
            LET $rid = type::thing('{TRACKING_PREF_TABLE_NAME}', [$user, $forum]);
            LET $existing = (SELECT VALUE id FROM $rid);
            UPSERT $rid SET user = $user, forum = $forum, created = created ?? $now;
            DELETE {READ_MARK_TABLE_NAME} WHERE user = $user AND forum = $forum;
            COMMIT TRANSACTION;
            RETURN array::len($existing) == 0;"
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("now", now))
            .await?
            .check()?;
        let changed: Option<bool> = take_last(&mut res)?;
        Ok(changed.unwrap_or(false))
    }

    async fn opt_in(&self, user: &Thing, forum: &Thing) -> AppResult<bool> {
        let sql = format!(
            "BEGIN TRANSACTION;
            LET $rid = type::thing('{TRACKING_PREF_TABLE_NAME}', [$user, $forum]);
            LET $existing = (SELECT VALUE id FROM $rid);
            DELETE $rid;
            COMMIT TRANSACTION;
            RETURN array::len($existing) > 0;"
        );
        let mut res = self
            .client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .await?
            .check()?;
        let changed: Option<bool> = take_last(&mut res)?;
        Ok(changed.unwrap_or(false))
    }
}
