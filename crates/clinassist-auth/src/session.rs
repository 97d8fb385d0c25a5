use std::sync::Arc;

use clinassist_client::ApiClient;
use clinassist_core::models::therapeute::Therapeute;
use clinassist_core::models::user::{AuthResponse, LoginRequest, Role, User};
use clinassist_storage::{KeyValueStore, keys, state};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::AuthError;
use crate::{flows, jwt};

/// The signed-in identity.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub therapeute_id: Option<i64>,
    pub therapeute: Option<Therapeute>,
}

impl Session {
    fn from_response(response: AuthResponse) -> Self {
        Self {
            user: response.user,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            therapeute_id: None,
            therapeute: None,
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn scope(&self) -> DataScope {
        match (self.user.role, self.therapeute_id) {
            (Role::Therapeute, Some(id)) => DataScope::Therapeute(id),
            (Role::Therapeute, None) => DataScope::Unresolved,
            _ => DataScope::All,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.id)
            .field("username", &self.user.username)
            .field("role", &self.user.role)
            .field("therapeute_id", &self.therapeute_id)
            .finish_non_exhaustive()
    }
}

/// Which slice of the backend's data the current session may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScope {
    /// Unrestricted listing, delegated to the backend's paging.
    All,
    /// Only records belonging to this therapist.
    Therapeute(i64),
    /// A therapist whose record could not be resolved. Scoped listings are
    /// empty until it is.
    Unresolved,
}

/// Session/identity store.
///
/// Owns the in-memory session, mirrors it to durable storage and keeps the
/// bearer token on the shared [`ApiClient`] in sync. Reads are derived from
/// memory; subscribers observe every change.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Build the store and hydrate any session persisted by a previous run.
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = hydrate(storage.as_ref());
        if let Some(session) = &session {
            api.set_token(Some(session.access_token.clone()));
            info!(user_id = session.user.id, role = %session.user.role, "session restored");
        }

        Self {
            api,
            storage,
            state: watch::Sender::new(session),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Authenticate and persist the resulting session.
    ///
    /// For THERAPEUTE users the therapist record is looked up as well; a
    /// failed lookup leaves the session with an unresolved scope.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session, AuthError> {
        if credentials.username_or_email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Authentication("missing credentials".to_string()));
        }

        let response = flows::login(&self.api, credentials).await?;
        self.api.set_token(Some(response.access_token.clone()));

        let mut session = Session::from_response(response);
        self.persist_identity(&session)?;
        self.forget_therapeute()?;

        if session.user.role == Role::Therapeute {
            match flows::lookup_therapeute(&self.api, session.user.id).await {
                Ok(therapeute) => {
                    self.persist_therapeute(&therapeute)?;
                    session.therapeute_id = Some(therapeute.id);
                    session.therapeute = Some(therapeute);
                }
                Err(e) => {
                    warn!(
                        user_id = session.user.id,
                        error = %e,
                        "therapist lookup failed; scoped listings will be empty"
                    );
                }
            }
        }

        info!(
            user_id = session.user.id,
            role = %session.user.role,
            therapeute_id = ?session.therapeute_id,
            "logged in"
        );
        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Drop every stored identity artifact and the bearer token.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.api.clear_token();
        self.state.send_replace(None);
        state::remove_all(self.storage.as_ref(), &keys::SESSION_KEYS)?;
        info!("logged out");
        Ok(())
    }

    /// Rotate tokens with the stored refresh token. Therapist resolution is
    /// kept as is.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let current = self.session().ok_or(AuthError::NotAuthenticated)?;
        if current.refresh_token.is_empty() {
            return Err(AuthError::MissingRefreshToken);
        }

        let response = flows::refresh(&self.api, &current.refresh_token).await?;
        self.api.set_token(Some(response.access_token.clone()));

        let session = Session {
            therapeute_id: current.therapeute_id,
            therapeute: current.therapeute,
            ..Session::from_response(response)
        };
        self.persist_identity(&session)?;

        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Replace the resolved therapist, e.g. after `GET /therapeutes/me`.
    pub fn set_current_therapeute(&self, therapeute: Therapeute) -> Result<(), AuthError> {
        if self.state.borrow().is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        self.persist_therapeute(&therapeute)?;
        self.state.send_modify(|session| {
            if let Some(session) = session {
                session.therapeute_id = Some(therapeute.id);
                session.therapeute = Some(therapeute);
            }
        });
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    /// A session exists and its access token has not visibly expired.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .borrow()
            .as_ref()
            .is_some_and(|s| {
                !s.access_token.is_empty() && !jwt::is_expired(&s.access_token, jwt::now_secs())
            })
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.state.borrow().as_ref().map(Session::role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn is_therapeute(&self) -> bool {
        self.role() == Some(Role::Therapeute)
    }

    pub fn is_receptionist(&self) -> bool {
        self.role() == Some(Role::Receptionist)
    }

    pub fn is_patient(&self) -> bool {
        self.role() == Some(Role::Patient)
    }

    pub fn therapeute_id(&self) -> Option<i64> {
        self.state.borrow().as_ref().and_then(|s| s.therapeute_id)
    }

    pub fn current_therapeute(&self) -> Option<Therapeute> {
        self.state.borrow().as_ref().and_then(|s| s.therapeute.clone())
    }

    /// Signed-out callers get [`DataScope::All`]; the backend rejects them.
    pub fn scope(&self) -> DataScope {
        self.state
            .borrow()
            .as_ref()
            .map(Session::scope)
            .unwrap_or(DataScope::All)
    }

    fn persist_identity(&self, session: &Session) -> Result<(), AuthError> {
        let store = self.storage.as_ref();
        store.set(keys::ACCESS_TOKEN, &session.access_token)?;
        store.set(keys::REFRESH_TOKEN, &session.refresh_token)?;
        state::save_json(store, keys::USER, &session.user)?;
        Ok(())
    }

    fn persist_therapeute(&self, therapeute: &Therapeute) -> Result<(), AuthError> {
        let store = self.storage.as_ref();
        store.set(keys::THERAPEUTE_ID, &therapeute.id.to_string())?;
        state::save_json(store, keys::CURRENT_THERAPEUTE, therapeute)?;
        Ok(())
    }

    fn forget_therapeute(&self) -> Result<(), AuthError> {
        state::remove_all(
            self.storage.as_ref(),
            &[keys::THERAPEUTE_ID, keys::CURRENT_THERAPEUTE],
        )?;
        Ok(())
    }
}

fn hydrate(store: &dyn KeyValueStore) -> Option<Session> {
    let access_token = match store.get(keys::ACCESS_TOKEN) {
        Ok(Some(token)) if !token.is_empty() => token,
        Ok(_) => return None,
        Err(e) => {
            warn!(error = %e, "session storage unreadable");
            return None;
        }
    };
    let user: User = state::load_json_lenient(store, keys::USER)?;
    let refresh_token = store
        .get(keys::REFRESH_TOKEN)
        .ok()
        .flatten()
        .unwrap_or_default();

    let therapeute: Option<Therapeute> = state::load_json_lenient(store, keys::CURRENT_THERAPEUTE);
    let therapeute_id = store
        .get(keys::THERAPEUTE_ID)
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .or_else(|| therapeute.as_ref().map(|t| t.id));

    Some(Session {
        user,
        access_token,
        refresh_token,
        therapeute_id,
        therapeute,
    })
}
