use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::capability::Capability;

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    Student,
    Teacher,
    Manager,
}

const GUEST: &[Capability] = &[Capability::ViewDiscussion];

const STUDENT: &[Capability] = &[
    Capability::ViewDiscussion,
    Capability::StartDiscussion,
    Capability::ReplyPost,
    Capability::AllowForceSubscribe,
];

const TEACHER: &[Capability] = &[
    Capability::ViewDiscussion,
    Capability::StartDiscussion,
    Capability::ReplyPost,
    Capability::AllowForceSubscribe,
    Capability::AccessAllGroups,
    Capability::ViewHiddenTimedPosts,
    Capability::ViewSubscribers,
    Capability::ManageSubscriptions,
    Capability::LockDiscussion,
];

const MANAGER: &[Capability] = &[
    Capability::ViewDiscussion,
    Capability::StartDiscussion,
    Capability::ReplyPost,
    Capability::AllowForceSubscribe,
    Capability::AccessAllGroups,
    Capability::ViewHiddenTimedPosts,
    Capability::ViewSubscribers,
    Capability::ManageSubscriptions,
    Capability::LockDiscussion,
    Capability::DeleteAnyPost,
];

impl Role {
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Guest => GUEST,
            Role::Student => STUDENT,
            Role::Teacher => TEACHER,
            Role::Manager => MANAGER,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Guest => write!(f, "GUEST"),
            Role::Student => write!(f, "STUDENT"),
            Role::Teacher => write!(f, "TEACHER"),
            Role::Manager => write!(f, "MANAGER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_cannot_manage_subscriptions() {
        assert!(Role::Student.has(Capability::ReplyPost));
        assert!(!Role::Student.has(Capability::ManageSubscriptions));
        assert!(Role::Teacher.has(Capability::ManageSubscriptions));
    }

    #[test]
    fn guests_are_not_potential_subscribers() {
        assert!(!Role::Guest.has(Capability::AllowForceSubscribe));
        assert!(Role::Guest.has(Capability::ViewDiscussion));
    }

    #[test]
    fn only_managers_delete_any_post() {
        assert!(Role::Manager.has(Capability::DeleteAnyPost));
        assert!(!Role::Teacher.has(Capability::DeleteAnyPost));
    }
}
