use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: Thing,
    pub forum: Thing,
    pub name: String,
    pub group_id: Option<String>,
    pub first_post: Option<Thing>,
    pub user: Thing,
    pub locked: bool,
    pub time_start: i64,
    pub time_end: i64,
    pub time_modified: i64,
    pub user_modified: Thing,
    pub created: i64,
}

impl Discussion {
    /// Inside its display window. Zero bounds are open.
    pub fn is_timed_visible(&self, now: i64) -> bool {
        (self.time_start == 0 || self.time_start <= now) && (self.time_end == 0 || self.time_end > now)
    }

    pub fn is_owner(&self, user: &Thing) -> bool {
        &self.user == user
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDiscussion {
    pub forum: Thing,
    pub name: String,
    pub group_id: Option<String>,
    pub user: Thing,
    pub locked: bool,
    pub time_start: i64,
    pub time_end: i64,
    pub time_modified: i64,
    pub user_modified: Thing,
    pub created: i64,
}
