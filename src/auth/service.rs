//! Login/logout orchestration and per-request session verification.
//!
//! Sits between the HTTP gateway and the store: the store does dumb CRUD
//! keyed by sid, this layer owns the policy (credential checks, sid minting,
//! TTL arithmetic, what counts as authenticated).

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::password;
use crate::auth::store::{AuthStore, Identity};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Default session lifetime: one hour.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Role assigned at signup when the request names none.
pub const DEFAULT_ROLE: &str = "student";

/// Non-failing authentication probe result.
#[derive(Debug, Clone)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub identity: Option<Identity>,
}

/// Issues and verifies sessions against a shared store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<AuthStore>,
    session_ttl_secs: u64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<AuthStore>, session_ttl_secs: u64, bcrypt_cost: u32) -> Self {
        Self {
            store,
            session_ttl_secs,
            bcrypt_cost,
        }
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_secs
    }

    /// Create a new account.
    ///
    /// The store's uniqueness constraint decides duplicates; there is no
    /// read-then-write existence check to race against.
    pub async fn signup(
        &self,
        username: &str,
        password_plain: &str,
        role: Option<&str>,
    ) -> AuthResult<()> {
        password::validate_signup(username, password_plain)?;

        let password_hash = password::hash_password(password_plain, self.bcrypt_cost).await?;
        let role = role.or(Some(DEFAULT_ROLE));
        self.store.create_account(username, &password_hash, role)?;

        tracing::info!(username, "account created");
        Ok(())
    }

    /// Verify credentials and mint a session.
    ///
    /// Returns the sid (the cookie value) and the identity snapshot stored
    /// with it. Unknown username and wrong password both come back as
    /// `InvalidCredentials`, and the unknown-username path still burns one
    /// bcrypt verification so the two are not distinguishable by timing.
    pub async fn login(&self, username: &str, password_plain: &str) -> AuthResult<(String, Identity)> {
        let account = match self.store.find_account(username)? {
            Some(account) => account,
            None => {
                password::dummy_verify(password_plain).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !password::verify_password(password_plain, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let sid = Uuid::new_v4().to_string();
        let identity = Identity {
            username: account.username,
            role: account.role,
        };
        let expire = Utc::now().timestamp() + self.session_ttl_secs as i64;
        self.store.create_session(&sid, &identity, expire)?;

        tracing::info!(username = %identity.username, "session created");
        Ok((sid, identity))
    }

    /// Delete the session for a sid. Missing or already-invalid sids are
    /// success, not an error.
    pub fn logout(&self, sid: Option<&str>) -> AuthResult<()> {
        if let Some(sid) = sid {
            self.store.delete_session(sid)?;
        }
        Ok(())
    }

    /// Precondition gate for protected operations: resolve a sid to its
    /// identity or reject.
    pub fn authenticate(&self, sid: Option<&str>) -> AuthResult<Identity> {
        let sid = sid.ok_or(AuthError::Unauthenticated)?;
        self.store
            .read_session(sid)?
            .ok_or(AuthError::InvalidSession)
    }

    /// Non-failing status probe for UI use. Storage faults degrade to
    /// unauthenticated rather than surfacing an error.
    pub fn check_status(&self, sid: Option<&str>) -> AuthStatus {
        match self.authenticate(sid) {
            Ok(identity) => AuthStatus {
                authenticated: true,
                identity: Some(identity),
            },
            Err(e) => {
                if e.is_internal() {
                    tracing::warn!("status probe degraded to unauthenticated: {e}");
                }
                AuthStatus {
                    authenticated: false,
                    identity: None,
                }
            }
        }
    }
}
