//! Session establishment.
//!
//! A static token is used when one is configured and no credentials were
//! given on the command line. Otherwise an interactive login runs until the
//! controller binds a tenant, prompting for whatever credentials are missing.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tracing::{info, warn};

use serialtag_common::{ApiResult, SyncError, SyncResult};

use crate::config::Credentials;

/// Message shown when a configured token does not yield a tenant.
pub const TOKEN_FAILURE_MESSAGE: &str = "AUTH_TOKEN login failure, please check token.";

/// A controller connection that can be logged in.
///
/// Both methods return the tenant id on success, `None` when the controller
/// accepted the request but bound no tenant.
#[async_trait]
pub trait Session: Send {
    /// Authenticates with a static token.
    async fn use_token(&mut self, token: &str) -> ApiResult<Option<String>>;

    /// Authenticates with email and password.
    async fn login(&mut self, email: &str, password: &str) -> ApiResult<Option<String>>;
}

/// Source of interactively entered credentials.
pub trait Prompt {
    /// Reads the login email.
    fn email(&mut self) -> io::Result<String>;

    /// Reads the password.
    fn password(&mut self) -> io::Result<String>;
}

/// Prompts on the terminal; the password is read without echo.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn email(&mut self) -> io::Result<String> {
        print!("login: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no login email entered",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn password(&mut self) -> io::Result<String> {
        print!("Password: ");
        io::stdout().flush()?;
        rpassword::read_password()
    }
}

/// Establishes a session and returns the tenant id.
///
/// # Returns
///
/// * `Ok(tenant_id)` - Session bound to a tenant
/// * `Err(SyncError::Auth)` - Token rejected
/// * `Err(SyncError::Io)` - Credentials could not be read from the prompt
pub async fn authenticate<S, P>(
    session: &mut S,
    credentials: &Credentials,
    prompt: &mut P,
) -> SyncResult<String>
where
    S: Session + ?Sized,
    P: Prompt + ?Sized,
{
    if let Some(token) = credentials.token_for_login() {
        return match session.use_token(token).await {
            Ok(Some(tenant)) => {
                info!(tenant = %tenant, "Authenticated with token");
                Ok(tenant)
            }
            Ok(None) => Err(SyncError::auth(TOKEN_FAILURE_MESSAGE)),
            Err(e) => {
                warn!("Token validation failed: {}", e);
                Err(SyncError::auth(TOKEN_FAILURE_MESSAGE))
            }
        };
    }

    let mut email = credentials.email.clone();
    let mut password = credentials.password.clone();

    loop {
        let user = match email.take() {
            Some(user) => user,
            None => prompt
                .email()
                .map_err(|e| SyncError::io("read login email", e))?,
        };
        let secret = match password.take() {
            Some(secret) => secret,
            None => prompt
                .password()
                .map_err(|e| SyncError::io("read password", e))?,
        };

        match session.login(&user, &secret).await {
            Ok(Some(tenant)) => {
                info!(tenant = %tenant, user = %user, "Logged in");
                return Ok(tenant);
            }
            Ok(None) => warn!(user = %user, "Login returned no tenant"),
            Err(e) => warn!(user = %user, "Login failed: {}", e),
        }
        println!("Login failed, please try again.");
    }
}
