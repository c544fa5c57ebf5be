use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// User has seen the post as of `last_read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadMark {
    pub user: Thing,
    pub forum: Thing,
    pub discussion: Thing,
    pub post: Thing,
    pub first_read: i64,
    pub last_read: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionUnread {
    pub discussion: Thing,
    pub unread: i64,
}

/// Opt-out of read tracking for one forum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingPreference {
    pub user: Thing,
    pub forum: Thing,
    pub created: i64,
}
