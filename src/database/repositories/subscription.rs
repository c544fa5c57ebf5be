use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::database::surrdb_utils::{take_count, take_last};
use crate::database::table_names::{
    DIGEST_TABLE_NAME, DISCUSSION_SUB_TABLE_NAME, DISCUSSION_TABLE_NAME, FORUM_SUB_TABLE_NAME,
    FORUM_TABLE_NAME, USER_TABLE_NAME,
};
use crate::entities::subscription::{DiscussionPreference, DiscussionSubscription, MailDigest};
use crate::interfaces::repositories::subscription::SubscriptionRepositoryInterface;
use crate::middleware::error::AppResult;

#[derive(Debug)]
pub struct SubscriptionRepository {
    client: Arc<Db>,
}

impl SubscriptionRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {FORUM_SUB_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {FORUM_SUB_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS forum ON TABLE {FORUM_SUB_TABLE_NAME} TYPE record<{FORUM_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS created ON TABLE {FORUM_SUB_TABLE_NAME} TYPE int;
        DEFINE INDEX IF NOT EXISTS idx_forum ON TABLE {FORUM_SUB_TABLE_NAME} COLUMNS forum;

        DEFINE TABLE IF NOT EXISTS {DISCUSSION_SUB_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {DISCUSSION_SUB_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS forum ON TABLE {DISCUSSION_SUB_TABLE_NAME} TYPE record<{FORUM_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS discussion ON TABLE {DISCUSSION_SUB_TABLE_NAME} TYPE record<{DISCUSSION_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS preference ON TABLE {DISCUSSION_SUB_TABLE_NAME} TYPE string ASSERT $value INSIDE ['SUBSCRIBED', 'UNSUBSCRIBED'];
        DEFINE FIELD IF NOT EXISTS time_modified ON TABLE {DISCUSSION_SUB_TABLE_NAME} TYPE int;
        DEFINE INDEX IF NOT EXISTS idx_discussion ON TABLE {DISCUSSION_SUB_TABLE_NAME} COLUMNS discussion;

        DEFINE TABLE IF NOT EXISTS {DIGEST_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {DIGEST_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS forum ON TABLE {DIGEST_TABLE_NAME} TYPE record<{FORUM_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS digest ON TABLE {DIGEST_TABLE_NAME} TYPE string ASSERT $value INSIDE ['SINGLE', 'COMPLETE', 'SUBJECTS'];
        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepositoryInterface for SubscriptionRepository {
    async fn is_forum_subscribed(&self, user: &Thing, forum: &Thing) -> AppResult<bool> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE id FROM type::thing('{FORUM_SUB_TABLE_NAME}', [$user, $forum]);"
            ))
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .await?;
        let ids: Vec<Thing> = res.take(0)?;
        Ok(!ids.is_empty())
    }

    async fn subscribe_forum(&self, user: &Thing, forum: &Thing, now: i64) -> AppResult<bool> {
        let sql = format!(
            "BEGIN TRANSACTION;
            LET $rid = type::thing('{FORUM_SUB_TABLE_NAME}', [$user, $forum]);
            LET $existing = (SELECT VALUE id FROM $rid);
            UPSERT $rid SET user = $user, forum = $forum, created = created ?? $now;
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
        let created: Option<bool> = take_last(&mut res)?;
        Ok(created.unwrap_or(false))
    }

    async fn unsubscribe_forum(&self, user: &Thing, forum: &Thing) -> AppResult<bool> {
        let sql = format!(
            "BEGIN TRANSACTION;
            LET $rid = type::thing('{FORUM_SUB_TABLE_NAME}', [$user, $forum]);
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
        let removed: Option<bool> = take_last(&mut res)?;
        Ok(removed.unwrap_or(false))
    }

    async fn forum_subscribers(&self, forum: &Thing) -> AppResult<Vec<Thing>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE user FROM {FORUM_SUB_TABLE_NAME} WHERE forum = $forum;"
            ))
            .bind(("forum", forum.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn count_forum_subscriptions(&self, forum: &Thing) -> AppResult<u64> {
        let mut res = self
            .client
            .query(format!(
                "SELECT count() AS count FROM {FORUM_SUB_TABLE_NAME} WHERE forum = $forum GROUP ALL;"
            ))
            .bind(("forum", forum.clone()))
            .await?;
        take_count(&mut res, 0)
    }

    async fn discussion_preference(
        &self,
        user: &Thing,
        discussion: &Thing,
    ) -> AppResult<Option<DiscussionPreference>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE preference FROM type::thing('{DISCUSSION_SUB_TABLE_NAME}', [$user, $discussion]);"
            ))
            .bind(("user", user.clone()))
            .bind(("discussion", discussion.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn set_discussion_preference(
        &self,
        user: &Thing,
        forum: &Thing,
        discussion: &Thing,
        preference: DiscussionPreference,
        now: i64,
    ) -> AppResult<()> {
        self.client
            .query(format!(
                "UPSERT type::thing('{DISCUSSION_SUB_TABLE_NAME}', [$user, $discussion])
                    SET user = $user, forum = $forum, discussion = $discussion,
                        preference = $preference, time_modified = $now;"
            ))
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("discussion", discussion.clone()))
            .bind(("preference", preference))
            .bind(("now", now))
            .await?
            .check()?;
        Ok(())
    }

    async fn discussion_preferences(&self, discussion: &Thing) -> AppResult<Vec<DiscussionSubscription>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {DISCUSSION_SUB_TABLE_NAME} WHERE discussion = $discussion;"
            ))
            .bind(("discussion", discussion.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn get_digest(&self, user: &Thing, forum: &Thing) -> AppResult<Option<MailDigest>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE digest FROM type::thing('{DIGEST_TABLE_NAME}', [$user, $forum]);"
            ))
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn set_digest(&self, user: &Thing, forum: &Thing, digest: Option<MailDigest>) -> AppResult<()> {
        let sql = match digest {
            Some(_) => format!(
                "UPSERT type::thing('{DIGEST_TABLE_NAME}', [$user, $forum]) SET user = $user, forum = $forum, digest = $digest;"
            ),
            None => format!(
                "LET $rid = type::thing('{DIGEST_TABLE_NAME}', [$user, $forum]); DELETE $rid;"
            ),
        };
        self.client
            .query(sql)
            .bind(("user", user.clone()))
            .bind(("forum", forum.clone()))
            .bind(("digest", digest))
            .await?
            .check()?;
        Ok(())
    }
}
