use crate::{features::auth::types::AuthState, storage::{Session, SessionStore}};

/// Screens the client can route to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Otp,
    Dashboard,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Otp => "/otp",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Reads the auth state from storage. A session wins over a staged email.
#[must_use]
pub fn current_state(store: &SessionStore) -> AuthState {
    if let Some(session) = store.read_session() {
        AuthState::Authenticated(session)
    } else if let Some(email) = store.read_login_email() {
        AuthState::OtpPending { email }
    } else {
        AuthState::Anonymous
    }
}

/// Where the client should open.
#[must_use]
pub fn landing_route(store: &SessionStore) -> Route {
    match current_state(store) {
        AuthState::Anonymous => Route::Login,
        AuthState::OtpPending { .. } => Route::Otp,
        AuthState::Authenticated(_) => Route::Dashboard,
    }
}

/// Gate for protected screens: the session, or the route to send the user to.
/// UX-only; the API enforces access on its own.
///
/// # Errors
/// Returns `Route::Login` when no session is stored.
pub fn require_session(store: &SessionStore) -> Result<Session, Route> {
    store.read_session().ok_or(Route::Login)
}
