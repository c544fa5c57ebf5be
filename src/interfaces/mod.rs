pub mod capability;
pub mod clock;
pub mod repositories;
