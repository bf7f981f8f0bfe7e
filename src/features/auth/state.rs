//! Login state machine: `Anonymous -> OtpPending -> Authenticated`, back to
//! `Anonymous` on logout. The state itself lives in the session store so it
//! survives restarts; this controller only adds the in-flight bookkeeping that
//! keeps double submissions from racing each other.

use crate::{
    api::ApiClient,
    features::auth::{
        client,
        error::AuthError,
        guards,
        types::{validate_email, validate_otp, AuthState},
    },
    storage::{Session, SessionStore},
};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct AuthController {
    api: ApiClient,
    // Sequence of issued login requests; only the latest may stage its email.
    login_seq: Arc<AtomicU64>,
    login_pending: Arc<AtomicUsize>,
    verifying: Arc<AtomicBool>,
}

impl AuthController {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            login_seq: Arc::new(AtomicU64::new(0)),
            login_pending: Arc::new(AtomicUsize::new(0)),
            verifying: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.api.store()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        guards::current_state(self.store())
    }

    /// True while a login or verify call is waiting on the server; the UI should
    /// disable the triggering control.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.login_pending.load(Ordering::Acquire) > 0 || self.verifying.load(Ordering::Acquire)
    }

    /// `Anonymous -> OtpPending`. Also restarts a pending login with a new email.
    ///
    /// # Errors
    /// Validation, transport and server failures leave the state unchanged.
    /// `Superseded` is returned when a newer request was issued meanwhile.
    #[instrument(skip(self, email))]
    pub async fn request_login(&self, email: &str) -> Result<(), AuthError> {
        let email = validate_email(email).map_err(AuthError::Validation)?;
        if self.store().is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }

        let ticket = self.login_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let _pending = Pending::enter(&self.login_pending);

        client::request_otp(&self.api, &email)
            .await
            .map_err(AuthError::Login)?;

        if self.login_seq.load(Ordering::Acquire) != ticket {
            debug!(ticket, "discarding login response overtaken by a newer request");
            return Err(AuthError::Superseded);
        }

        self.store().save_login_email(&email)?;
        info!("verification code requested");
        Ok(())
    }

    /// `OtpPending -> OtpPending`: asks for a fresh code for the staged email.
    ///
    /// # Errors
    /// `MissingLoginEmail` when nothing is staged; request failures otherwise.
    #[instrument(skip(self))]
    pub async fn resend(&self) -> Result<(), AuthError> {
        let email = self
            .store()
            .read_login_email()
            .ok_or(AuthError::MissingLoginEmail)?;
        let _pending = Pending::enter(&self.login_pending);

        client::request_otp(&self.api, &email)
            .await
            .map_err(AuthError::Login)?;

        info!("verification code resent");
        Ok(())
    }

    /// `OtpPending -> Authenticated`.
    ///
    /// # Errors
    /// Malformed codes and a missing staged email fail before any network call.
    /// Server rejections keep the state at `OtpPending`.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, code: &str) -> Result<Session, AuthError> {
        let code = validate_otp(code).map_err(AuthError::Validation)?;
        let email = self
            .store()
            .read_login_email()
            .ok_or(AuthError::MissingLoginEmail)?;
        let _guard = InFlight::acquire(&self.verifying).ok_or(AuthError::InFlight)?;

        let response = client::verify_otp(&self.api, &email, &code)
            .await
            .map_err(AuthError::Verification)?;

        // Somebody else finished the login first; the first success wins.
        if let Some(existing) = self.store().read_session() {
            debug!("ignoring verification response, already authenticated");
            return Ok(existing);
        }

        let session = response.into_session().ok_or_else(|| {
            warn!("verification response missing token or manager id");
            AuthError::InvalidResponse
        })?;

        self.store().save_session(&session)?;
        self.store().clear_login_email()?;
        info!(manager_id = %session.manager_id, "manager authenticated");
        Ok(session)
    }

    /// Drops the staged email so the user can start over with another address.
    ///
    /// # Errors
    /// Returns an error if storage can not be updated.
    pub fn restart_login(&self) -> Result<(), AuthError> {
        self.login_seq.fetch_add(1, Ordering::AcqRel);
        self.store().clear_login_email()?;
        Ok(())
    }

    /// `Authenticated -> Anonymous`. Purely local, no server call.
    ///
    /// # Errors
    /// Returns an error if storage can not be updated.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store().clear_session()?;
        self.store().clear_login_email()?;
        info!("logged out");
        Ok(())
    }
}

/// Holds a boolean flag for the lifetime of one request.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts outstanding requests of one kind.
struct Pending<'a>(&'a AtomicUsize);

impl<'a> Pending<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::ApiError, config::AppConfig, features::auth::guards::Route, storage::MemoryStorage};
    use serde_json::json;
    use std::{net::TcpListener, time::Duration};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn controller(uri: &str) -> AuthController {
        let config = AppConfig::new(uri, "/tmp/refdash-tests").unwrap();
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        AuthController::new(ApiClient::new(&config, store).unwrap())
    }

    fn verify_body() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "token": "tok1",
                "manager": {"id": "m1", "name": "A", "email": "a@x.com", "refCode": "R1"}
            }
        })
    }

    async fn mount_login(server: &MockServer, email: &str, delay_ms: u64) {
        Mock::given(method("POST"))
            .and(path("/utm/manager/login"))
            .and(body_json(json!({"email": email})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "OTP sent"}))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn full_login_flow_creates_session_and_clears_email() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(&server, "a@x.com", 0).await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/verify-otp"))
            .and(body_json(json!({"email": "a@x.com", "otp": "123456"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(verify_body()))
            .expect(1)
            .mount(&server)
            .await;

        let auth = controller(&server.uri());
        assert_eq!(auth.state(), AuthState::Anonymous);

        auth.request_login("a@x.com").await.unwrap();
        assert_eq!(auth.store().read_login_email().as_deref(), Some("a@x.com"));
        assert_eq!(
            auth.state(),
            AuthState::OtpPending {
                email: "a@x.com".to_string()
            }
        );

        let session = auth.verify("123456").await.unwrap();
        assert_eq!(
            session,
            Session {
                token: "tok1".to_string(),
                manager_id: "m1".to_string(),
                manager_name: "A".to_string(),
                manager_email: "a@x.com".to_string(),
                ref_code: "R1".to_string(),
            }
        );
        assert_eq!(auth.store().read_login_email(), None);
        assert_eq!(auth.store().read_session(), Some(session.clone()));
        assert_eq!(auth.state(), AuthState::Authenticated(session));

        auth.logout().unwrap();
        assert_eq!(auth.store().read_session(), None);
        assert_eq!(auth.state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn verify_without_staged_email_never_calls_the_server() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        let auth = controller(&server.uri());

        let err = auth.verify("123456").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingLoginEmail));
        assert_eq!(err.redirect(), Some(Route::Login));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn validation_failures_never_call_the_server() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        let auth = controller(&server.uri());
        auth.store().save_login_email("a@x.com").unwrap();

        assert!(matches!(
            auth.request_login("  ").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.verify("12345").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.verify("abcdef").await,
            Err(AuthError::Validation(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
        assert_eq!(auth.store().read_login_email().as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn failed_login_stays_anonymous() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/login"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Manager not found"})),
            )
            .mount(&server)
            .await;

        let auth = controller(&server.uri());
        let err = auth.request_login("nobody@x.com").await.unwrap_err();
        assert!(matches!(err, AuthError::Login(ApiError::Http { status: 404, .. })));
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert!(!auth.is_busy());
    }

    #[tokio::test]
    async fn wrong_code_keeps_otp_pending_and_surfaces_server_message() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid or expired OTP"})),
            )
            .mount(&server)
            .await;

        let auth = controller(&server.uri());
        auth.store().save_login_email("a@x.com").unwrap();

        let err = auth.verify("000000").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid or expired OTP");
        assert_eq!(
            auth.state(),
            AuthState::OtpPending {
                email: "a@x.com".to_string()
            }
        );
        assert!(auth.store().read_session().is_none());
    }

    #[tokio::test]
    async fn resend_reuses_staged_email_without_changing_state() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/login"))
            .and(body_json(json!({"email": "a@x.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let auth = controller(&server.uri());
        assert!(matches!(
            auth.resend().await,
            Err(AuthError::MissingLoginEmail)
        ));

        auth.store().save_login_email("a@x.com").unwrap();
        auth.resend().await.unwrap();
        assert_eq!(
            auth.state(),
            AuthState::OtpPending {
                email: "a@x.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn resend_failure_is_not_fatal() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let auth = controller(&server.uri());
        auth.store().save_login_email("a@x.com").unwrap();
        assert!(matches!(auth.resend().await, Err(AuthError::Login(_))));
        assert_eq!(auth.store().read_login_email().as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn latest_login_request_wins_when_earlier_response_arrives_last() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(&server, "first@x.com", 300).await;
        mount_login(&server, "second@x.com", 0).await;

        let auth = controller(&server.uri());
        let (first, second) = tokio::join!(
            auth.request_login("first@x.com"),
            auth.request_login("second@x.com")
        );

        assert!(matches!(first, Err(AuthError::Superseded)));
        assert!(second.is_ok());
        assert_eq!(
            auth.store().read_login_email().as_deref(),
            Some("second@x.com")
        );
        assert!(!auth.is_busy());
    }

    #[tokio::test]
    async fn latest_login_request_wins_when_it_responds_last() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(&server, "first@x.com", 0).await;
        mount_login(&server, "second@x.com", 300).await;

        let auth = controller(&server.uri());
        let (first, second) = tokio::join!(
            auth.request_login("first@x.com"),
            auth.request_login("second@x.com")
        );

        assert!(matches!(first, Err(AuthError::Superseded)));
        assert!(second.is_ok());
        assert_eq!(
            auth.store().read_login_email().as_deref(),
            Some("second@x.com")
        );
    }

    #[tokio::test]
    async fn concurrent_verify_is_rejected_while_one_is_in_flight() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/verify-otp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(verify_body())
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = controller(&server.uri());
        auth.store().save_login_email("a@x.com").unwrap();

        let (first, second) = tokio::join!(auth.verify("123456"), auth.verify("123456"));
        assert!(first.is_ok());
        assert!(matches!(second, Err(AuthError::InFlight)));
        assert!(auth.state().is_authenticated());
        assert!(!auth.is_busy());
    }

    #[tokio::test]
    async fn late_verification_response_does_not_replace_existing_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/utm/manager/verify-otp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(verify_body())
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        // Two controllers sharing one store model two windows on the same profile.
        let first = controller(&server.uri());
        let second = AuthController::new(first.api.clone());
        first.store().save_login_email("a@x.com").unwrap();

        let winner = Session {
            token: "winner".to_string(),
            manager_id: "m1".to_string(),
            manager_name: "A".to_string(),
            manager_email: "a@x.com".to_string(),
            ref_code: "R1".to_string(),
        };
        let pending = tokio::spawn({
            let second = second.clone();
            async move { second.verify("123456").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.store().save_session(&winner).unwrap();

        let result = pending.await.unwrap().unwrap();
        assert_eq!(result.token, "winner");
        assert_eq!(first.store().read_session(), Some(winner));
    }

    #[tokio::test]
    async fn request_login_refused_when_authenticated() {
        let auth = controller("http://127.0.0.1:9");
        auth.store()
            .save_session(&Session {
                token: "tok1".to_string(),
                manager_id: "m1".to_string(),
                manager_name: "A".to_string(),
                manager_email: "a@x.com".to_string(),
                ref_code: "R1".to_string(),
            })
            .unwrap();
        let err = auth.request_login("a@x.com").await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyAuthenticated));
        assert_eq!(err.redirect(), Some(Route::Dashboard));
    }

    #[test]
    fn logout_clears_session_regardless_of_state() {
        let auth = controller("http://127.0.0.1:9");
        auth.logout().unwrap();
        assert_eq!(auth.state(), AuthState::Anonymous);

        auth.store().save_login_email("a@x.com").unwrap();
        auth.restart_login().unwrap();
        assert_eq!(auth.state(), AuthState::Anonymous);
    }
}
