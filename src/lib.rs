pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod redirect;
pub mod routing;
pub mod server;
pub mod state;

#[cfg(test)]
pub mod testing;
