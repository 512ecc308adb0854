//! State containers
//!
//! Each store owns an in-memory copy of one slice of server state plus a
//! loading flag and the last error message. Actions follow one shape:
//! mark loading and clear the error, call the service, apply the response
//! only on success, record a display message on failure, clear loading.
//! A failed action never touches the resource data.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::api::ApiError;

mod auth;
mod business;
mod menu;
mod order;

pub use auth::{AuthState, AuthStore, RestoredSession};
pub use business::{BusinessState, BusinessStore};
pub use menu::{MenuState, MenuStore};
pub use order::{OrderState, OrderStore};

/// Loading flag and last error, shared by every store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

pub(crate) trait Tracked {
    fn status_mut(&mut self) -> &mut StoreStatus;
}

/// Errors that can be rendered inline
pub(crate) trait DisplayMessage {
    fn display_message(&self, fallback: &str) -> String;
}

impl DisplayMessage for ApiError {
    fn display_message(&self, fallback: &str) -> String {
        ApiError::display_message(self, fallback)
    }
}

impl DisplayMessage for crate::Error {
    fn display_message(&self, fallback: &str) -> String {
        match self {
            crate::Error::Api(e) => e.display_message(fallback),
            _ => fallback.to_string(),
        }
    }
}

/// How a failed action is described to the user
#[derive(Clone, Copy)]
pub(crate) enum ErrorText {
    /// Backend message when present, else this text
    PreferServer(&'static str),
    /// Always this text
    Fixed(&'static str),
}

impl ErrorText {
    fn render(self, err: &impl DisplayMessage) -> String {
        match self {
            ErrorText::PreferServer(fallback) => err.display_message(fallback),
            ErrorText::Fixed(text) => text.to_string(),
        }
    }
}

/// Clears the loading flag if the action future is dropped before it settles,
/// e.g. by `select!`, `timeout` or a sibling failing inside `try_join!`.
struct LoadingGuard<'a, S: Tracked + Send + Sync + 'static> {
    state: &'a Arc<RwLock<S>>,
    armed: bool,
}

impl<S: Tracked + Send + Sync + 'static> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut guard) = self.state.try_write() {
            guard.status_mut().is_loading = false;
            return;
        }
        // Lock is busy; finish the reset once it frees up
        let state = Arc::clone(self.state);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state.write().await.status_mut().is_loading = false;
                });
            }
            Err(_) => warn!("Action cancelled outside a runtime; loading flag left set"),
        }
    }
}

/// Run one store action: `apply` sees the state only when `action` succeeds.
///
/// The lock is released while `action` is in flight, so overlapping actions
/// interleave and the last response wins. Dropping the returned future midway
/// still clears the loading flag.
pub(crate) async fn run_action<S, T, R, E, Fut, A>(
    state: &Arc<RwLock<S>>,
    text: ErrorText,
    action: Fut,
    apply: A,
) -> Result<R, E>
where
    S: Tracked + Send + Sync + 'static,
    E: DisplayMessage,
    Fut: Future<Output = Result<T, E>>,
    A: FnOnce(&mut S, T) -> R,
{
    {
        let mut guard = state.write().await;
        let status = guard.status_mut();
        status.is_loading = true;
        status.error = None;
    }
    let mut loading = LoadingGuard { state, armed: true };

    let result = action.await;

    let mut guard = state.write().await;
    let outcome = match result {
        Ok(value) => Ok(apply(&mut guard, value)),
        Err(e) => {
            guard.status_mut().error = Some(text.render(&e));
            Err(e)
        }
    };
    guard.status_mut().is_loading = false;
    loading.armed = false;
    outcome
}

/// Swap the element whose key matches `updated`'s key. Order is preserved.
/// Returns false, leaving the list alone, when no element matches.
pub(crate) fn replace_by_key<T, K>(items: &mut [T], updated: T, key: K) -> bool
where
    K: Fn(&T) -> &str,
{
    let target = key(&updated).to_string();
    match items.iter().position(|item| key(item) == target) {
        Some(index) => {
            items[index] = updated;
            true
        }
        None => false,
    }
}
