// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here receives an `AuthUser` injected by `jwt_auth_middleware`
// and scopes all reads and writes to that user's account.

pub mod settings;

pub use settings::*;
