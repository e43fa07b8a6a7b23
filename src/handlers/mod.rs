// handlers/mod.rs - HTTP handlers
//
// health: store liveness probe
// user:   profile and goal resources under /api/user
// pages:  page route descriptors, the router fallback

pub mod health;
pub mod pages;
pub mod user;

pub use health::health;
pub use pages::page;
