pub mod auth;
pub mod response;
pub mod route_gate;

pub use auth::{authorize_caller, resolve_session, AuthSession, SessionUser};
pub use response::{ApiJson, ApiResponse, ApiResult};
pub use route_gate::route_gate_middleware;
