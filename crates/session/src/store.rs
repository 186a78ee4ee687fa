use std::{
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use eventdesk_api::{ApiClient, ApiError, AuthPayload, TokenSource};
use eventdesk_shared::{LoginRequest, ProfileUpdate, RegisterRequest, User};
use strum::{AsRefStr, Display};
use time::Duration;

use crate::{
    CookieStore, PersistedSession, RealtimeChannel, SessionError, SessionStorage, expired_cookie,
    session_cookie, token_expiry,
};

pub const STORAGE_KEY: &str = "auth-storage";

/// A user and the bearer token issued for them. They only exist together.
#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub user: User,
    pub token: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub credentials: Option<Credentials>,
    pub is_loading: bool,
}

#[derive(AsRefStr, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl Session {
    pub fn state(&self) -> SessionState {
        match (self.is_loading, &self.credentials) {
            (true, _) => SessionState::Authenticating,
            (false, Some(_)) => SessionState::Authenticated,
            (false, None) => SessionState::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|credentials| &credentials.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials
            .as_ref()
            .map(|credentials| credentials.token.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub storage_key: String,
    pub cookie_name: String,
    pub cookie_max_age: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_owned(),
            cookie_name: "token".to_owned(),
            cookie_max_age: Duration::days(7),
        }
    }
}

struct Inner {
    session: RwLock<Session>,
    storage: Arc<dyn SessionStorage>,
    cookies: Arc<dyn CookieStore>,
    realtime: Arc<RealtimeChannel>,
    options: SessionOptions,
}

/// Owns the session of the running application.
///
/// Every change to the credentials is written to `storage` while the state
/// lock is held, so the durable copy never lags behind memory.
#[derive(Clone)]
pub struct SessionStore(Arc<Inner>);

impl SessionStore {
    /// Rehydrates the session from `storage`. A record holding only one of
    /// user and token is ignored and left in place.
    pub fn open(
        storage: Arc<dyn SessionStorage>,
        cookies: Arc<dyn CookieStore>,
        realtime: Arc<RealtimeChannel>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let credentials = match storage.load(&options.storage_key) {
            Ok(Some(PersistedSession {
                user: Some(user),
                token: Some(token),
            })) => {
                tracing::debug!(user_id = %user.id, "session rehydrated");
                Some(Credentials { user, token })
            }
            Ok(Some(PersistedSession { user, token })) if user.is_some() || token.is_some() => {
                tracing::warn!("ignoring incomplete session record");
                None
            }
            Ok(_) => None,
            Err(SessionError::Corrupt(err)) => {
                tracing::warn!(err = %err, "ignoring unreadable session record");
                None
            }
            Err(err) => return Err(err),
        };

        Ok(Self(Arc::new(Inner {
            session: RwLock::new(Session {
                credentials,
                is_loading: false,
            }),
            storage,
            cookies,
            realtime,
            options,
        })))
    }

    pub fn snapshot(&self) -> Session {
        self.0
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot().state()
    }

    pub fn user(&self) -> Option<User> {
        self.snapshot().credentials.map(|credentials| credentials.user)
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().credentials.map(|credentials| credentials.token)
    }

    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.token().as_deref().and_then(token_expiry)
    }

    pub fn has_cookie(&self) -> bool {
        self.0.cookies.get(&self.0.options.cookie_name).is_some()
    }

    /// Writes an expired session cookie without touching the session.
    pub fn clear_cookie(&self) -> Result<(), SessionError> {
        self.0
            .cookies
            .set(expired_cookie(&self.0.options.cookie_name))
    }

    pub fn options(&self) -> &SessionOptions {
        &self.0.options
    }

    /// Reopens the realtime channel for a rehydrated session. Safe to call
    /// any number of times.
    pub fn initialize(&self) -> SessionState {
        let session = self.snapshot();

        match session.token() {
            Some(token) => {
                tracing::info!("session found, keeping user signed in");
                self.0.realtime.connect(token);
            }
            None => tracing::debug!("no session found"),
        }

        session.state()
    }

    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn login(
        &self,
        api: &ApiClient,
        request: &LoginRequest,
    ) -> Result<User, SessionError> {
        self.authenticate(api.login(request)).await
    }

    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn register(
        &self,
        api: &ApiClient,
        request: &RegisterRequest,
    ) -> Result<User, SessionError> {
        self.authenticate(api.register(request)).await
    }

    async fn authenticate(
        &self,
        call: impl Future<Output = Result<AuthPayload, ApiError>>,
    ) -> Result<User, SessionError> {
        self.commit(|session| session.is_loading = true)?;

        let result = match call.await {
            Ok(payload) => self.establish(payload),
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "signed in");
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(err = %err, "sign in failed");
                if let Err(cleanup) = self.reset() {
                    tracing::error!(
                        err = %cleanup,
                        "failed to clear session after sign in failure"
                    );
                }
                Err(err)
            }
        }
    }

    fn establish(&self, payload: AuthPayload) -> Result<User, SessionError> {
        let AuthPayload { user, token } = payload;

        self.commit(|session| {
            session.credentials = Some(Credentials {
                user: user.clone(),
                token: token.clone(),
            });
            session.is_loading = false;
        })?;

        self.0.realtime.connect(&token);
        self.0.cookies.set(session_cookie(
            &self.0.options.cookie_name,
            &token,
            self.0.options.cookie_max_age,
        ))?;

        Ok(user)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        if let Some(user) = self.user() {
            tracing::info!(user_id = %user.id, "signing out");
        }

        self.reset()
    }

    /// Back to anonymous: memory cleared, durable record removed, realtime
    /// closed and an expired cookie written. Every step runs even when an
    /// earlier one fails; the first failure is returned.
    pub fn reset(&self) -> Result<(), SessionError> {
        let removed = {
            let mut session = self
                .0
                .session
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *session = Session::default();
            self.0.storage.remove(&self.0.options.storage_key)
        };

        self.0.realtime.disconnect();
        let cleared = self
            .0
            .cookies
            .set(expired_cookie(&self.0.options.cookie_name));

        removed.and(cleared)
    }

    /// Replaces the user with the server's copy. On failure the current user
    /// is kept.
    #[tracing::instrument(skip_all)]
    pub async fn update_profile(
        &self,
        api: &ApiClient,
        update: &ProfileUpdate,
    ) -> Result<User, SessionError> {
        if self.state() != SessionState::Authenticated {
            return Err(SessionError::NotAuthenticated);
        }

        let user = api.update_profile(update).await.inspect_err(|err| {
            tracing::warn!(err = %err, "profile update failed");
        })?;

        self.commit(|session| {
            if let Some(credentials) = session.credentials.as_mut() {
                credentials.user = user.clone();
            }
        })?;

        Ok(user)
    }

    /// Applies `change` and saves the credentials if they moved, all under
    /// the write lock. Memory is left untouched when saving fails.
    fn commit<R>(&self, change: impl FnOnce(&mut Session) -> R) -> Result<R, SessionError> {
        let mut session = self
            .0
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut next = session.clone();
        let output = change(&mut next);

        if next.credentials != session.credentials {
            self.persist(next.credentials.as_ref())?;
        }

        *session = next;

        Ok(output)
    }

    fn persist(&self, credentials: Option<&Credentials>) -> Result<(), SessionError> {
        let key = &self.0.options.storage_key;

        match credentials {
            Some(Credentials { user, token }) => self.0.storage.save(
                key,
                &PersistedSession {
                    user: Some(user.clone()),
                    token: Some(token.clone()),
                },
            ),
            None => self.0.storage.remove(key),
        }
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}
