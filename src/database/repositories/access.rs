use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::access::role::Role;
use crate::database::client::Db;
use crate::database::table_names::{ACCESS_TABLE_NAME, USER_TABLE_NAME};
use crate::entities::course_access::CourseAccess;
use crate::interfaces::repositories::access::AccessRepositoryInterface;
use crate::middleware::error::AppResult;

#[derive(Debug)]
pub struct AccessRepository {
    client: Arc<Db>,
}

impl AccessRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
        DEFINE TABLE IF NOT EXISTS {ACCESS_TABLE_NAME} SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS user ON TABLE {ACCESS_TABLE_NAME} TYPE record<{USER_TABLE_NAME}>;
        DEFINE FIELD IF NOT EXISTS course ON TABLE {ACCESS_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS role ON TABLE {ACCESS_TABLE_NAME} TYPE string;
        DEFINE FIELD IF NOT EXISTS groups ON TABLE {ACCESS_TABLE_NAME} TYPE array<string> DEFAULT [];
        DEFINE INDEX IF NOT EXISTS idx_course ON TABLE {ACCESS_TABLE_NAME} COLUMNS course;
        DEFINE INDEX IF NOT EXISTS idx_role ON TABLE {ACCESS_TABLE_NAME} COLUMNS role;
        ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }
}

#[async_trait]
impl AccessRepositoryInterface for AccessRepository {
    async fn add(&self, user: Thing, course: &str, role: Role, groups: Vec<String>) -> AppResult<()> {
        self.client
            .query(format!(
                "UPSERT type::thing('{ACCESS_TABLE_NAME}', [$user, $course])
                    SET user = $user, course = $course, role = $role, groups = $groups;"
            ))
            .bind(("user", user))
            .bind(("course", course.to_string()))
            .bind(("role", role))
            .bind(("groups", groups))
            .await?
            .check()?;
        Ok(())
    }

    async fn get(&self, user: &Thing, course: &str) -> AppResult<Option<CourseAccess>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM type::thing('{ACCESS_TABLE_NAME}', [$user, $course]);"
            ))
            .bind(("user", user.clone()))
            .bind(("course", course.to_string()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn get_by_course(&self, course: &str) -> AppResult<Vec<CourseAccess>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {ACCESS_TABLE_NAME} WHERE course = $course;"
            ))
            .bind(("course", course.to_string()))
            .await?;
        Ok(res.take(0)?)
    }
}
