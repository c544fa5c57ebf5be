pub mod capability;
pub mod course;
pub mod discussion;
pub mod role;
