use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{BusEvent, SharedBus};
use crate::models::{validate_schedule, Business, BusinessHours, CreateBusinessPayload, Dish, Drink};
use crate::services::BusinessService;
use crate::stores::{run_action, ErrorText, StoreStatus, Tracked};
use crate::Error;

const FETCH_FAILED: &str = "Could not load your business.";
const CREATE_FAILED: &str = "There was an error creating the business.";
const SCHEDULE_FAILED: &str = "There was an error saving the schedule.";
const NO_BUSINESS: &str = "Cannot update the schedule because no business is selected.";
const DUPLICATE_DAY: &str = "The schedule lists the same day more than once.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusinessState {
    pub business: Option<Business>,
    pub status: StoreStatus,
}

impl BusinessState {
    pub fn has_business(&self) -> bool {
        self.business.is_some()
    }

    pub fn has_schedule(&self) -> bool {
        self.business
            .as_ref()
            .is_some_and(|b| !b.schedule.is_empty())
    }

    pub fn dishes(&self) -> &[Dish] {
        self.business.as_ref().map(|b| b.dishes.as_slice()).unwrap_or_default()
    }

    pub fn drinks(&self) -> &[Drink] {
        self.business.as_ref().map(|b| b.drinks.as_slice()).unwrap_or_default()
    }

    pub fn is_menu_empty(&self) -> bool {
        self.dishes().is_empty() && self.drinks().is_empty()
    }
}

impl Tracked for BusinessState {
    fn status_mut(&mut self) -> &mut StoreStatus {
        &mut self.status
    }
}

/// The logged-in owner's business profile and schedule
#[derive(Clone)]
pub struct BusinessStore {
    state: Arc<RwLock<BusinessState>>,
    service: BusinessService,
}

impl BusinessStore {
    pub fn new(service: BusinessService) -> Self {
        Self {
            state: Arc::new(RwLock::new(BusinessState::default())),
            service,
        }
    }

    pub async fn snapshot(&self) -> BusinessState {
        self.state.read().await.clone()
    }

    pub async fn business(&self) -> Option<Business> {
        self.state.read().await.business.clone()
    }

    pub async fn business_id(&self) -> Option<String> {
        self.state.read().await.business.as_ref().map(|b| b.id.clone())
    }

    pub async fn has_business(&self) -> bool {
        self.state.read().await.has_business()
    }

    pub async fn has_schedule(&self) -> bool {
        self.state.read().await.has_schedule()
    }

    pub async fn is_menu_empty(&self) -> bool {
        self.state.read().await.is_menu_empty()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.status.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.status.error.clone()
    }

    pub async fn reset(&self) {
        *self.state.write().await = BusinessState::default();
    }

    /// Load the current user's business.
    ///
    /// A 404 is not a failure: it means the user has not created a business
    /// yet, so the state becomes `None` with no error.
    pub async fn fetch_business_data(&self) -> Result<Option<Business>, Error> {
        let action = async {
            match self.service.get_my_business().await {
                Ok(business) => Ok(Some(business)),
                Err(e) if e.is_not_found() => {
                    debug!("User has no business yet");
                    Ok(None)
                }
                Err(e) => Err(Error::from(e)),
            }
        };

        run_action(
            &self.state,
            ErrorText::PreferServer(FETCH_FAILED),
            action,
            |state, business: Option<Business>| {
                state.business = business.clone();
                business
            },
        )
        .await
    }

    /// Create a business, then reload it so the state reflects the server.
    pub async fn create_business(
        &self,
        payload: &CreateBusinessPayload,
    ) -> Result<Option<Business>, Error> {
        let action = async {
            self.service.create(payload).await?;
            match self.service.get_my_business().await {
                Ok(business) => Ok(Some(business)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(Error::from(e)),
            }
        };

        let business = run_action(
            &self.state,
            ErrorText::PreferServer(CREATE_FAILED),
            action,
            |state, business: Option<Business>| {
                state.business = business.clone();
                business
            },
        )
        .await?;

        info!(name = %payload.name, "Business created");
        Ok(business)
    }

    /// Replace the weekly schedule of the loaded business.
    ///
    /// Nothing is sent when no business is loaded or when a weekday appears
    /// twice; the error field explains why.
    pub async fn update_schedule(&self, schedule: &[BusinessHours]) -> Result<Business, Error> {
        let business_id = {
            let mut state = self.state.write().await;
            let Some(id) = state.business.as_ref().map(|b| b.id.clone()) else {
                state.status.error = Some(NO_BUSINESS.to_string());
                return Err(Error::NoBusiness);
            };
            if let Err(day) = validate_schedule(schedule) {
                state.status.error = Some(DUPLICATE_DAY.to_string());
                return Err(Error::InvalidSchedule(day));
            }
            id
        };

        let action = async {
            Ok::<_, Error>(
                self.service
                    .update_schedule(&business_id, schedule)
                    .await?
                    .business,
            )
        };

        run_action(
            &self.state,
            ErrorText::PreferServer(SCHEDULE_FAILED),
            action,
            |state, business: Business| {
                state.business = Some(business.clone());
                business
            },
        )
        .await
    }

    /// Reload the loaded business through the menu endpoint, which returns it
    /// with dishes and drinks populated.
    pub async fn refresh_menu(&self) -> Result<Option<Business>, Error> {
        let Some(business_id) = self.business_id().await else {
            return Ok(None);
        };

        let action = async { Ok::<_, Error>(self.service.get_menu(&business_id).await?.menu) };

        run_action(
            &self.state,
            ErrorText::PreferServer(FETCH_FAILED),
            action,
            |state, business: Business| {
                state.business = Some(business.clone());
                Some(business)
            },
        )
        .await
    }

    /// Refresh the business whenever its menu changes.
    ///
    /// Runs until `shutdown` is cancelled or the bus closes.
    pub fn follow_menu_updates(&self, bus: &SharedBus, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        let mut rx = bus.subscribe();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = rx.recv() => event,
                };

                match event {
                    Ok(BusEvent::MenuUpdated { business_id }) => {
                        if store.business_id().await.as_deref() != Some(business_id.as_str()) {
                            continue;
                        }
                        if let Err(e) = store.refresh_menu().await {
                            warn!("Failed to refresh business after menu change: {}", e);
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Menu follower lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
