pub mod classify;
pub mod goals;
pub mod redirect;
pub mod serve;
pub mod token;
pub mod user;
