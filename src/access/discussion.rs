use surrealdb::sql::Thing;

use crate::{
    entities::{discussion::Discussion, forum::Forum},
    interfaces::capability::CapabilityOracle,
    middleware::error::{AppError, AppResult},
};

use super::capability::Capability;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    All,
    /// Group-less discussions plus the listed groups.
    Groups(Vec<String>),
}

impl GroupFilter {
    pub fn allows(&self, group: Option<&str>) -> bool {
        match (self, group) {
            (GroupFilter::All, _) | (_, None) => true,
            (GroupFilter::Groups(groups), Some(group)) => groups.iter().any(|g| g == group),
        }
    }
}

/// Which discussions of a forum a user gets to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub groups: GroupFilter,
    pub include_hidden_timed: bool,
    pub now: i64,
}

impl Visibility {
    pub fn everything(now: i64) -> Self {
        Self {
            groups: GroupFilter::All,
            include_hidden_timed: true,
            now,
        }
    }

    pub fn allows(&self, discussion: &Discussion) -> bool {
        self.groups.allows(discussion.group_id.as_deref())
            && (self.include_hidden_timed || discussion.is_timed_visible(self.now))
    }
}

pub struct DiscussionAccess<'a, C>
where
    C: CapabilityOracle,
{
    oracle: &'a C,
}

impl<'a, C> DiscussionAccess<'a, C>
where
    C: CapabilityOracle,
{
    pub fn new(oracle: &'a C) -> Self {
        Self { oracle }
    }

    pub async fn can(&self, user: &Thing, capability: Capability, forum: &Forum) -> AppResult<bool> {
        self.oracle.can(user, capability, &forum.course).await
    }

    pub async fn require(&self, user: &Thing, capability: Capability, forum: &Forum) -> AppResult<()> {
        if self.can(user, capability, forum).await? {
            Ok(())
        } else {
            Err(AppError::no_permission(capability.to_string()))
        }
    }

    pub async fn visibility(&self, user: &Thing, forum: &Forum, now: i64) -> AppResult<Visibility> {
        let groups = if self.can(user, Capability::AccessAllGroups, forum).await? {
            GroupFilter::All
        } else {
            GroupFilter::Groups(self.oracle.groups(user, &forum.course).await?)
        };
        let include_hidden_timed = self
            .can(user, Capability::ViewHiddenTimedPosts, forum)
            .await?;
        Ok(Visibility {
            groups,
            include_hidden_timed,
            now,
        })
    }

    /// Fails with `PermissionDenied` unless the user can read the discussion.
    pub async fn require_view(
        &self,
        user: &Thing,
        forum: &Forum,
        discussion: &Discussion,
        now: i64,
    ) -> AppResult<()> {
        self.require(user, Capability::ViewDiscussion, forum).await?;
        if self.visibility(user, forum, now).await?.allows(discussion) {
            Ok(())
        } else {
            Err(AppError::no_permission(Capability::ViewDiscussion.to_string()))
        }
    }
}
