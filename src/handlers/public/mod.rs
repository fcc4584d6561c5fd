// handlers/public/mod.rs - Public handlers (no authentication)
//
// Service description and liveness, reachable without a token.

pub mod system;

pub use system::{health, root};
