pub const USER_TABLE_NAME: &str = "user";
pub const FORUM_TABLE_NAME: &str = "forum";
pub const DISCUSSION_TABLE_NAME: &str = "discussion";
pub const POST_TABLE_NAME: &str = "post";
pub const READ_MARK_TABLE_NAME: &str = "forum_read";
pub const TRACKING_PREF_TABLE_NAME: &str = "forum_track_pref";
pub const FORUM_SUB_TABLE_NAME: &str = "forum_subscription";
pub const DISCUSSION_SUB_TABLE_NAME: &str = "discussion_subscription";
pub const DIGEST_TABLE_NAME: &str = "forum_digest";
pub const ACCESS_TABLE_NAME: &str = "course_access";
