//! Email + one-time-code login for UTM managers. The state machine persists
//! through the session store so a restart resumes where the user left off.
//! Nothing in this module may log the one-time code or the session token.
//!
//! Flow Overview: `request_login` emails a code and stages the address,
//! `verify` trades the code for a token and manager identity, `logout` drops
//! the local session without calling the server.

pub mod client;
pub mod error;
pub mod guards;
pub mod state;
pub mod types;

pub use error::AuthError;
pub use guards::{landing_route, require_session, Route};
pub use state::AuthController;
pub use types::AuthState;
