use crate::{
    cli::{actions::redirect_error, globals::GlobalArgs},
    features::auth::{landing_route, AuthController, AuthError, AuthState},
};
use anyhow::{anyhow, Result};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Args {
    pub globals: GlobalArgs,
}

#[derive(Debug, Clone)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub email: String,
}

// Debug is hand-written so the one-time code never reaches the logs.
#[derive(Clone)]
pub struct VerifyArgs {
    pub globals: GlobalArgs,
    pub code: String,
}

impl std::fmt::Debug for VerifyArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyArgs")
            .field("globals", &self.globals)
            .field("code", &"[REDACTED]")
            .finish()
    }
}

fn controller(globals: &GlobalArgs) -> Result<AuthController> {
    let (_, api) = globals.client()?;
    Ok(AuthController::new(api))
}

fn auth_failure(err: &AuthError) -> anyhow::Error {
    debug!(error = %err, "auth step failed");
    err.redirect()
        .map_or_else(|| anyhow!(err.user_message()), redirect_error)
}

/// # Errors
/// Returns an error when the code could not be sent.
pub async fn login(args: LoginArgs) -> Result<()> {
    let auth = controller(&args.globals)?;
    auth.request_login(&args.email)
        .await
        .map_err(|err| auth_failure(&err))?;
    println!(
        "Verification code sent to {}. Run `refdash verify <code>` to finish signing in.",
        args.email.trim()
    );
    Ok(())
}

/// # Errors
/// Returns an error when verification fails or no login is pending.
pub async fn verify(args: VerifyArgs) -> Result<()> {
    let auth = controller(&args.globals)?;
    let session = auth
        .verify(&args.code)
        .await
        .map_err(|err| auth_failure(&err))?;
    println!(
        "Signed in as {} <{}>",
        session.manager_name, session.manager_email
    );
    Ok(())
}

/// # Errors
/// Returns an error when no login is pending or the code could not be sent.
pub async fn resend(args: Args) -> Result<()> {
    let auth = controller(&args.globals)?;
    auth.resend().await.map_err(|err| auth_failure(&err))?;
    println!("A new verification code has been sent.");
    Ok(())
}

/// # Errors
/// Returns an error if the stored session can not be removed.
pub fn logout(args: &Args) -> Result<()> {
    let auth = controller(&args.globals)?;
    auth.logout().map_err(|err| auth_failure(&err))?;
    println!("Signed out.");
    Ok(())
}

/// # Errors
/// Returns an error if the configuration is invalid.
pub fn status(args: &Args) -> Result<()> {
    let auth = controller(&args.globals)?;
    match auth.state() {
        AuthState::Anonymous => println!("Not signed in."),
        AuthState::OtpPending { email } => {
            println!("Waiting for the code sent to {email}.");
        }
        AuthState::Authenticated(session) => println!(
            "Signed in as {} <{}> (manager {}, referral code {})",
            session.manager_name, session.manager_email, session.manager_id, session.ref_code
        ),
    }
    println!("Landing screen: {}", landing_route(auth.store()).path());
    Ok(())
}
