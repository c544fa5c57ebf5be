pub mod discussions;
pub mod forums;
pub mod posts;
