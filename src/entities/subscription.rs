use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "lowercase")]
pub enum DiscussionPreference {
    Subscribed,
    Unsubscribed,
}

impl DiscussionPreference {
    pub fn from_flag(subscribed: bool) -> Self {
        if subscribed {
            DiscussionPreference::Subscribed
        } else {
            DiscussionPreference::Unsubscribed
        }
    }

    pub fn is_subscribed(&self) -> bool {
        *self == DiscussionPreference::Subscribed
    }
}

/// Explicit override of the forum level state for one discussion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionSubscription {
    pub user: Thing,
    pub forum: Thing,
    pub discussion: Thing,
    pub preference: DiscussionPreference,
    pub time_modified: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MailDigest {
    Single,
    Complete,
    Subjects,
}
