pub mod discussion;
pub mod post;
pub mod status;
