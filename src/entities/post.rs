use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MessageFormat {
    #[default]
    Html,
    Plain,
    Markdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Thing,
    pub discussion: Thing,
    pub parent: Option<Thing>,
    pub user: Thing,
    pub created: i64,
    pub modified: i64,
    pub subject: String,
    pub message: String,
    pub message_format: MessageFormat,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Post {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePost {
    pub discussion: Thing,
    pub parent: Option<Thing>,
    pub user: Thing,
    pub created: i64,
    pub modified: i64,
    pub subject: String,
    pub message: String,
    pub message_format: MessageFormat,
    pub attachments: Vec<String>,
}
