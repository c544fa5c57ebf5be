use std::sync::Arc;

use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;

use crate::middleware::error::AppResult;

use super::repositories::{
    access::AccessRepository, discussion::DiscussionRepository, forum::ForumRepository,
    post::PostRepository, read_mark::ReadMarkRepository, subscription::SubscriptionRepository,
    tracking_preference::TrackingPreferenceRepository,
};

pub type Db = Surreal<Any>;

#[derive(Debug)]
pub struct DbConfig<'a> {
    pub url: &'a str,
    pub database: &'a str,
    pub namespace: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

#[derive(Debug)]
pub struct Database {
    pub client: Arc<Db>,
    pub forums: ForumRepository,
    pub discussions: DiscussionRepository,
    pub posts: PostRepository,
    pub read_marks: ReadMarkRepository,
    pub tracking_prefs: TrackingPreferenceRepository,
    pub subscriptions: SubscriptionRepository,
    pub access: AccessRepository,
}

impl Database {
    pub async fn connect(config: DbConfig<'_>) -> AppResult<Self> {
        info!(url = config.url, ns = config.namespace, db = config.database, "connecting DB");
        let conn = connect(config.url).await?;

        if let (Some(password), Some(username)) = (config.password, config.username) {
            conn.signin(Root { username, password }).await?;
        }

        conn.use_ns(config.namespace)
            .use_db(config.database)
            .await?;

        let version = conn.version().await?;
        info!("connected DB version: {version}");

        let client = Arc::new(conn);
        Ok(Self {
            forums: ForumRepository::new(client.clone()),
            discussions: DiscussionRepository::new(client.clone()),
            posts: PostRepository::new(client.clone()),
            read_marks: ReadMarkRepository::new(client.clone()),
            tracking_prefs: TrackingPreferenceRepository::new(client.clone()),
            subscriptions: SubscriptionRepository::new(client.clone()),
            access: AccessRepository::new(client.clone()),
            client,
        })
    }

    pub async fn run_migrations(&self) -> AppResult<()> {
        self.forums.mutate_db().await?;
        self.discussions.mutate_db().await?;
        self.posts.mutate_db().await?;
        self.read_marks.mutate_db().await?;
        self.tracking_prefs.mutate_db().await?;
        self.subscriptions.mutate_db().await?;
        self.access.mutate_db().await?;
        info!("migrations done");
        Ok(())
    }
}
