pub mod bearer_auth;
pub mod error;
pub mod mw_ctx;
pub mod utils;
