pub mod discussion_pager_service;
pub mod discussion_service;
pub mod read_tracking_service;
pub mod subscription_service;
