use serde::{Deserialize, Serialize};

use crate::entities::subscription::{DiscussionPreference, MailDigest};

/// Outcome of an idempotent action, `status` is false when nothing changed.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusView {
    pub status: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountView {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadStateView {
    pub read: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionStatusView {
    /// `subscribed` or `unsubscribed`.
    pub status: String,
    pub changed: bool,
}

impl SubscriptionStatusView {
    pub fn new(subscribed: bool, changed: bool) -> Self {
        Self {
            status: DiscussionPreference::from_flag(subscribed).to_string(),
            changed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribersView {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DigestView {
    pub digest: Option<MailDigest>,
}
