use serde::{Deserialize, Serialize};

use crate::entities::post::{MessageFormat, Post};
use crate::middleware::utils::string_utils::thing_key;
use crate::services::discussion_pager_service::PostNode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    pub discussion_id: String,
    pub parent_id: Option<String>,
    pub user_id: String,
    pub created: i64,
    pub modified: i64,
    pub subject: String,
    pub message: String,
    pub message_format: MessageFormat,
    pub attachments: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    /// Only present when the reader has read tracking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: thing_key(&post.id),
            discussion_id: thing_key(&post.discussion),
            parent_id: post.parent.as_ref().map(thing_key),
            user_id: thing_key(&post.user),
            created: post.created,
            modified: post.modified,
            subject: post.subject,
            message: post.message,
            message_format: post.message_format,
            attachments: post.attachments,
            children: vec![],
            read: None,
        }
    }
}

impl From<PostNode> for PostView {
    fn from(node: PostNode) -> Self {
        Self {
            children: node.children.iter().map(thing_key).collect(),
            ..PostView::from(node.post)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListView {
    pub discussion_id: String,
    pub posts: Vec<PostView>,
}
