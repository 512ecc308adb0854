use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::bus::{BusEvent, SharedBus};
use crate::models::{Identity, LoginCredentials, RegisterPayload, Role, User};
use crate::services::AuthService;
use crate::session::{decode_identity, TokenStorage};
use crate::stores::{run_action, ErrorText, StoreStatus, Tracked};
use crate::Error;

const LOGIN_FAILED: &str = "Could not log in.";
const REGISTER_FAILED: &str = "Could not complete the registration.";

/// Outcome of restoring the session at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoredSession {
    Restored(Identity),
    /// Nothing was stored
    Anonymous,
    /// A token was stored but could not be decoded; it has been cleared
    Rejected,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub identity: Option<Identity>,
    pub token: Option<String>,
    pub status: StoreStatus,
}

impl AuthState {
    /// Both a token and a decoded identity are required
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.identity.is_some()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }
}

impl Tracked for AuthState {
    fn status_mut(&mut self) -> &mut StoreStatus {
        &mut self.status
    }
}

/// Session state: the token, the identity decoded from it, and the
/// authentication flag the router reads.
#[derive(Clone)]
pub struct AuthStore {
    state: Arc<RwLock<AuthState>>,
    service: AuthService,
    storage: Arc<dyn TokenStorage>,
    bus: SharedBus,
    authenticated: Arc<watch::Sender<bool>>,
}

impl AuthStore {
    pub fn new(service: AuthService, storage: Arc<dyn TokenStorage>, bus: SharedBus) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            state: Arc::new(RwLock::new(AuthState::default())),
            service,
            storage,
            bus,
            authenticated: Arc::new(authenticated),
        }
    }

    /// Receiver that always holds the current authentication flag
    pub fn watch_authenticated(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn user_role(&self) -> Option<Role> {
        self.state.read().await.user_role()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.status.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.status.error.clone()
    }

    async fn publish_flag(&self) {
        let authenticated = self.state.read().await.is_authenticated();
        self.authenticated.send_replace(authenticated);
    }

    /// Exchange credentials for a token, persist it and decode the identity.
    ///
    /// A token whose claims cannot be read is rejected and any existing
    /// session is logged out, in memory and in storage.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let action = async {
            let response = self.service.login(credentials).await?;
            let identity = match decode_identity(&response.token) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!("Login returned an unreadable token, ending any session: {}", e);
                    self.logout().await;
                    return Err(Error::from(e));
                }
            };
            self.storage.store(&response.token).await?;
            Ok::<_, Error>((response.token, identity))
        };

        let identity = run_action(
            &self.state,
            ErrorText::PreferServer(LOGIN_FAILED),
            action,
            |state, (token, identity): (String, Identity)| {
                state.token = Some(token);
                state.identity = Some(identity.clone());
                identity
            },
        )
        .await?;

        self.publish_flag().await;
        info!(user_id = %identity.id, role = ?identity.role, "Logged in");
        self.bus.publish(BusEvent::SessionStarted {
            user_id: identity.id.clone(),
        });
        Ok(identity)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<User, Error> {
        let action = async { Ok::<_, Error>(self.service.register(payload).await?.user) };
        let user = run_action(
            &self.state,
            ErrorText::PreferServer(REGISTER_FAILED),
            action,
            |_, user| user,
        )
        .await?;

        info!(user_id = %user.id, "Registered account");
        Ok(user)
    }

    /// Forget the session locally. Always succeeds; a storage failure is logged.
    pub async fn logout(&self) {
        {
            let mut state = self.state.write().await;
            state.identity = None;
            state.token = None;
        }
        self.clear_storage().await;
        self.publish_flag().await;
        info!("Logged out");
        self.bus.publish(BusEvent::SessionEnded);
    }

    /// Restore the session from storage on startup.
    ///
    /// A stored token that does not decode forces a logout.
    pub async fn initialize_auth(&self) -> Result<RestoredSession, Error> {
        let Some(token) = self.storage.load().await? else {
            return Ok(RestoredSession::Anonymous);
        };

        match decode_identity(&token) {
            Ok(identity) => {
                {
                    let mut state = self.state.write().await;
                    state.token = Some(token);
                    state.identity = Some(identity.clone());
                }
                self.publish_flag().await;
                info!(user_id = %identity.id, "Restored session");
                self.bus.publish(BusEvent::SessionStarted {
                    user_id: identity.id.clone(),
                });
                Ok(RestoredSession::Restored(identity))
            }
            Err(e) => {
                warn!("Stored session token is unreadable, logging out: {}", e);
                self.logout().await;
                Ok(RestoredSession::Rejected)
            }
        }
    }

    async fn clear_storage(&self) {
        if let Err(e) = self.storage.clear().await {
            warn!("Failed to clear stored session token: {}", e);
        }
    }
}
