use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{access::role::Role, entities::course_access::CourseAccess, middleware::error::AppResult};

#[async_trait]
pub trait AccessRepositoryInterface: Send + Sync {
    async fn add(&self, user: Thing, course: &str, role: Role, groups: Vec<String>) -> AppResult<()>;
    async fn get(&self, user: &Thing, course: &str) -> AppResult<Option<CourseAccess>>;
    async fn get_by_course(&self, course: &str) -> AppResult<Vec<CourseAccess>>;
}
