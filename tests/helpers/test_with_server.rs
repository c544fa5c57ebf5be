/// Start of the manual clock in tests, 2024-01-01.
#[allow(dead_code)]
pub const TEST_EPOCH: i64 = 1_704_067_200;

#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident, $clock:ident| $body:block) => {
        $crate::test_with_server!(
            $name,
            forumx_server::config::TrackingConfig::default(),
            |$server, $ctx_state, $clock| $body
        );
    };
    ($name:ident, $tracking:expr, |$server:ident, $ctx_state:ident, $clock:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        async fn $name() {
            use std::sync::Arc;
            use axum_test::TestServer;
            use forumx_server::config::AppConfig;
            use forumx_server::database::client::{Database, DbConfig};
            use forumx_server::middleware::mw_ctx::create_ctx_state;
            use forumx_server::utils::clock::ManualClock;

            let config = AppConfig {
                db_namespace: "test".to_string(),
                db_database: uuid::Uuid::new_v4().simple().to_string(),
                db_password: None,
                db_username: None,
                db_url: "mem://".to_string(),
                jwt_secret: "secret".to_string(),
                port: 0,
                tracking: $tracking,
                event_capacity: 100,
            };

            let $clock = Arc::new(ManualClock::new($crate::helpers::test_with_server::TEST_EPOCH));

            let $ctx_state = {
                let db = Database::connect(DbConfig {
                    url: &config.db_url,
                    database: &config.db_database,
                    namespace: &config.db_namespace,
                    password: config.db_password.as_deref(),
                    username: config.db_username.as_deref(),
                })
                .await
                .expect("db connected");

                db.run_migrations().await.expect("migrations run");
                create_ctx_state(db, &config, $clock.clone())
            };

            let routes_all = forumx_server::init::main_router(&$ctx_state);
            let $server = TestServer::new(routes_all).expect("Failed to create test server");

            $body
        }
    };
}
