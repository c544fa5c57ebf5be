use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{access::capability::Capability, middleware::error::AppResult};

/// Permission evaluation owned by the host platform.
#[async_trait]
pub trait CapabilityOracle: Send + Sync {
    async fn can(&self, user: &Thing, capability: Capability, course: &str) -> AppResult<bool>;

    /// Groups the user belongs to in the course.
    async fn groups(&self, user: &Thing, course: &str) -> AppResult<Vec<String>>;

    async fn users_with(&self, capability: Capability, course: &str) -> AppResult<Vec<Thing>>;
}
