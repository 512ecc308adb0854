//! Console composition root.
//!
//! [`Console`] owns one instance of every store, the router and the bus, and
//! exposes the flows a view layer drives: restoring the session, logging in
//! and out, navigating, and loading the dashboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::bus::{create_bus, SharedBus};
use crate::config::Config;
use crate::models::{Business, LoginCredentials, RegisterPayload};
use crate::router::{Route, Router};
use crate::services::{AuthService, BusinessService, DishService, DrinkService, OrderService};
use crate::session::{FileTokenStorage, TokenStorage};
use crate::stores::{AuthStore, BusinessStore, MenuStore, OrderStore, RestoredSession};
use crate::Error;

pub struct Console {
    pub auth: AuthStore,
    pub business: BusinessStore,
    pub menu: MenuStore,
    pub orders: OrderStore,
    pub router: Router,
    bus: SharedBus,
    shutdown: CancellationToken,
    followers_started: AtomicBool,
}

impl Console {
    /// Console backed by the token file in the configured data directory
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let storage = Arc::new(FileTokenStorage::new(config.data_dir()));
        Self::with_storage(&config.api_base_url, storage)
    }

    pub fn with_storage(
        api_base_url: &str,
        storage: Arc<dyn TokenStorage>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(api_base_url, storage.clone())?;
        let bus = create_bus();

        let auth = AuthStore::new(AuthService::new(api.clone()), storage, bus.clone());
        let business = BusinessStore::new(BusinessService::new(api.clone()));
        let menu = MenuStore::new(
            BusinessService::new(api.clone()),
            DishService::new(api.clone()),
            DrinkService::new(api.clone()),
            bus.clone(),
        );
        let orders = OrderStore::new(OrderService::new(api), bus.clone());
        let router = Router::new(auth.watch_authenticated());

        Ok(Self {
            auth,
            business,
            menu,
            orders,
            router,
            bus,
            shutdown: CancellationToken::new(),
            followers_started: AtomicBool::new(false),
        })
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    /// Restore the session and start background followers.
    ///
    /// An unreadable stored token logs out and lands on the login page.
    /// Returns the current route.
    pub async fn initialize(&self) -> Result<Route, Error> {
        if !self.followers_started.swap(true, Ordering::SeqCst) {
            self.business
                .follow_menu_updates(&self.bus, self.shutdown.child_token());
        }

        match self.auth.initialize_auth().await? {
            RestoredSession::Rejected => Ok(self.router.push(Route::login()).await),
            RestoredSession::Restored(_) | RestoredSession::Anonymous => {
                Ok(self.router.current().await)
            }
        }
    }

    /// Log in and go to the dashboard
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Route, Error> {
        self.auth.login(credentials).await?;
        Ok(self.router.push(Route::Dashboard).await)
    }

    /// Create an account and go to the login page flagged as just registered
    pub async fn register(&self, payload: &RegisterPayload) -> Result<Route, Error> {
        self.auth.register(payload).await?;
        Ok(self.router.push(Route::Login { registered: true }).await)
    }

    /// End the session, drop every cached resource and go to login
    pub async fn logout(&self) -> Route {
        self.auth.logout().await;
        self.business.reset().await;
        self.menu.reset().await;
        self.orders.reset().await;
        self.router.push(Route::login()).await
    }

    pub async fn navigate(&self, location: &str) -> Route {
        self.router.navigate(location).await
    }

    /// Fetch the business, then its menu and orders side by side.
    ///
    /// A user without a business yields `Ok(None)` and nothing else is loaded.
    /// When both fetches fail the menu error is returned; each store keeps
    /// its own message.
    pub async fn load_dashboard(&self) -> Result<Option<Business>, Error> {
        let Some(business) = self.business.fetch_business_data().await? else {
            info!("No business yet; dashboard shows the creation prompt");
            return Ok(None);
        };

        // Both fetches run to completion so neither store is left loading
        let (menu, orders) = futures::join!(
            self.menu.fetch_menu(&business.id),
            self.orders.fetch_orders(&business.id),
        );
        menu?;
        orders?;
        Ok(Some(business))
    }

    /// Stop background followers
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
