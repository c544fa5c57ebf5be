use async_trait::async_trait;
use surrealdb::sql::Thing;

use crate::{
    interfaces::{capability::CapabilityOracle, repositories::access::AccessRepositoryInterface},
    middleware::error::AppResult,
};

use super::capability::Capability;

/// Evaluates capabilities from the roles stored per course.
pub struct CourseCapabilities<'a, A>
where
    A: AccessRepositoryInterface,
{
    access_repository: &'a A,
}

impl<'a, A> CourseCapabilities<'a, A>
where
    A: AccessRepositoryInterface,
{
    pub fn new(access_repository: &'a A) -> Self {
        Self { access_repository }
    }
}

#[async_trait]
impl<'a, A> CapabilityOracle for CourseCapabilities<'a, A>
where
    A: AccessRepositoryInterface,
{
    async fn can(&self, user: &Thing, capability: Capability, course: &str) -> AppResult<bool> {
        let access = self.access_repository.get(user, course).await?;
        Ok(access.map_or(false, |a| a.role.has(capability)))
    }

    async fn groups(&self, user: &Thing, course: &str) -> AppResult<Vec<String>> {
        let access = self.access_repository.get(user, course).await?;
        Ok(access.map(|a| a.groups).unwrap_or_default())
    }

    async fn users_with(&self, capability: Capability, course: &str) -> AppResult<Vec<Thing>> {
        let mut users = self
            .access_repository
            .get_by_course(course)
            .await?
            .into_iter()
            .filter(|a| a.role.has(capability))
            .map(|a| a.user)
            .collect::<Vec<Thing>>();
        users.sort_by(|a, b| a.to_raw().cmp(&b.to_raw()));
        users.dedup();
        Ok(users)
    }
}
