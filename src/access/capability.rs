use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Eq, PartialEq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    ViewDiscussion,
    StartDiscussion,
    ReplyPost,
    /// Counted as a potential subscriber in forced and initial modes.
    AllowForceSubscribe,
    AccessAllGroups,
    ViewHiddenTimedPosts,
    ViewSubscribers,
    ManageSubscriptions,
    LockDiscussion,
    DeleteAnyPost,
}
