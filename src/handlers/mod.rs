// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (JWT auth, scoped to the caller's account)
pub mod public;
pub mod protected;

use crate::auth::JwtKeys;
use crate::middleware::AuthUser;
use crate::services::{AccountContext, GenderService};

/// Shared state handed to every handler and to the auth middleware
#[derive(Clone)]
pub struct AppState {
    pub genders: GenderService,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(genders: GenderService, jwt: JwtKeys) -> Self {
        Self { genders, jwt }
    }

    /// Turn the authenticated caller into the explicit context services expect
    pub fn account_context(&self, user: &AuthUser) -> AccountContext {
        self.genders.context(user.account_id, user.locale.as_deref())
    }
}
