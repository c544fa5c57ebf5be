use serde::{Deserialize, Serialize};

use crate::entities::discussion::Discussion;
use crate::middleware::utils::string_utils::thing_key;
use crate::services::discussion_pager_service::DiscussionSummary;

use super::post::PostView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionView {
    pub id: String,
    pub forum_id: String,
    pub name: String,
    pub group_id: Option<String>,
    pub first_post_id: Option<String>,
    pub user_id: String,
    pub locked: bool,
    pub time_start: i64,
    pub time_end: i64,
    pub time_modified: i64,
    pub user_modified_id: String,
    pub created: i64,
    #[serde(default)]
    pub num_replies: u64,
    pub last_post: Option<PostView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread: Option<u64>,
}

impl From<Discussion> for DiscussionView {
    fn from(d: Discussion) -> Self {
        Self {
            id: thing_key(&d.id),
            forum_id: thing_key(&d.forum),
            name: d.name,
            group_id: d.group_id,
            first_post_id: d.first_post.as_ref().map(thing_key),
            user_id: thing_key(&d.user),
            locked: d.locked,
            time_start: d.time_start,
            time_end: d.time_end,
            time_modified: d.time_modified,
            user_modified_id: thing_key(&d.user_modified),
            created: d.created,
            num_replies: 0,
            last_post: None,
            unread: None,
        }
    }
}

impl From<DiscussionSummary> for DiscussionView {
    fn from(summary: DiscussionSummary) -> Self {
        Self {
            num_replies: summary.num_replies,
            last_post: summary.last_post.map(PostView::from),
            ..DiscussionView::from(summary.discussion)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiscussionListView {
    pub forum_id: String,
    pub discussions: Vec<DiscussionView>,
    pub total: u64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedDiscussionView {
    pub discussion: DiscussionView,
    pub post: PostView,
}
