//! Session state, held by an explicit provider instead of ambient globals.
//!
//! The provider starts in [`AuthState::Loading`], resolves once [`SessionProvider::init`]
//! has checked any restored session, and republishes on every login and logout.
//! Observers subscribe through a `tokio::sync::watch` channel.
//!
//! The CLI keeps its own signed-in session here. The HTTP console keeps none: each
//! request presents an access token and [`SessionProvider::authorize`] resolves it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::remote::{AccessTokenSource, AuthService, RemoteError, Session, SessionUser};

/// Resolution of the current session, as consumed by the route guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    /// Not yet resolved for the first time
    Loading,
    Authenticated(SessionUser),
    Unauthenticated,
}

impl AuthState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Loading)
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to log in. Please check your credentials.")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

pub struct SessionProvider {
    auth: Arc<dyn AuthService>,
    session: RwLock<Option<Session>>,
    state: watch::Sender<AuthState>,
    expiry_skew: Duration,
}

impl SessionProvider {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            auth,
            session: RwLock::new(None),
            state,
            expiry_skew: Duration::seconds(60),
        }
    }

    pub fn with_expiry_skew(mut self, seconds: i64) -> Self {
        self.expiry_skew = Duration::seconds(seconds);
        self
    }

    /// Resolve the initial state from a previously persisted session, if any.
    ///
    /// An expired access token is refreshed; anything the auth service rejects
    /// resolves to `Unauthenticated`.
    pub async fn init(&self, restored: Option<Session>) -> AuthState {
        let resolved = match restored {
            None => None,
            Some(session) => match self.restore(session).await {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Discarding restored session: {}", e);
                    None
                }
            },
        };

        let state = match &resolved {
            Some(session) => AuthState::Authenticated(session.user.clone()),
            None => AuthState::Unauthenticated,
        };
        *self.session.write().await = resolved;
        self.publish(state.clone());
        state
    }

    async fn restore(&self, session: Session) -> Result<Session, RemoteError> {
        if session.is_expired(Utc::now(), self.expiry_skew) {
            return self.auth.refresh(&session).await;
        }
        let user = self.auth.validate(&session.access_token).await?;
        Ok(Session { user, ..session })
    }

    /// Check credentials without installing the session here
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        match self.auth.login(email, password).await {
            Ok(session) => {
                info!("Authenticated {}", email);
                Ok(session)
            }
            Err(RemoteError::Unauthorized(msg)) => {
                warn!("Login rejected for {}: {}", email, msg);
                Err(SessionError::InvalidCredentials)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, SessionError> {
        let session = self.authenticate(email, password).await?;

        let user = session.user.clone();
        *self.session.write().await = Some(session);
        info!("Signed in as {}", user.email.as_deref().unwrap_or("<no email>"));
        self.publish(AuthState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Sign out remotely and locally; the local session is dropped even if the service call fails
    pub async fn logout(&self) -> Result<(), SessionError> {
        let session = self.session.write().await.take();
        self.publish(AuthState::Unauthenticated);

        match session {
            Some(session) => {
                self.auth.logout(&session.access_token).await?;
                info!("Signed out");
                Ok(())
            }
            None => Err(SessionError::NotSignedIn),
        }
    }

    /// Revoke a session known only by its access token
    pub async fn revoke(&self, access_token: &str) -> Result<(), SessionError> {
        self.auth.logout(access_token).await?;
        info!("Revoked session");
        Ok(())
    }

    /// Resolve the access token presented by one caller.
    ///
    /// `Loading` until this provider has resolved for the first time; a missing
    /// or rejected token is `Unauthenticated`.
    pub async fn authorize(&self, access_token: Option<&str>) -> AuthState {
        if !self.state().is_resolved() {
            return AuthState::Loading;
        }

        match access_token {
            None => AuthState::Unauthenticated,
            Some(token) => match self.auth.validate(token).await {
                Ok(user) => AuthState::Authenticated(user),
                Err(e) => {
                    debug!("Access token rejected: {}", e);
                    AuthState::Unauthenticated
                }
            },
        }
    }

    /// Drop the in-memory session without contacting the auth service
    pub async fn teardown(&self) {
        self.session.write().await.take();
        self.publish(AuthState::Unauthenticated);
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Wait until the first resolution has happened
    pub async fn resolved(&self) -> AuthState {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(AuthState::is_resolved).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    fn publish(&self, state: AuthState) {
        self.state.send_replace(state);
    }
}

#[async_trait]
impl AccessTokenSource for SessionProvider {
    async fn access_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.access_token.clone())
    }
}
