// handlers/public/mod.rs - Endpoints that sit outside the entity routes
pub mod auth;
pub mod root;

pub use root::{health, root};
