pub mod course_access;
pub mod discussion;
pub mod forum;
pub mod post;
pub mod read_mark;
pub mod subscription;
