//! Restaurant Console - Rust Implementation
//!
//! Restores the saved session, opens the configured start page and, when
//! signed in, prints a summary of the dashboard.

use restaurant_console::{config, router::Route, Console};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restaurant_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Restaurant Console v{} ({})",
        env!("RC_VERSION"),
        env!("RC_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!("Configuration loaded, API: {}", config.api_base_url);

    let console = Console::new(&config)?;
    let route = console.initialize().await?;
    tracing::info!("Session restored, at {}", route);

    let route = console.navigate(&config.start_path).await;
    if !console.auth.is_authenticated().await {
        tracing::info!("Not signed in, landed on {}", route);
        return Ok(());
    }
    tracing::info!("Opened {}", route);

    if let Some(identity) = console.auth.identity().await {
        tracing::info!("Signed in as {} ({:?})", identity.email, identity.role);
    }

    match console.load_dashboard().await {
        Ok(Some(business)) => {
            let menu = console.menu.snapshot().await;
            let orders = console.orders.snapshot().await;
            tracing::info!(
                "{}: {} dishes, {} drinks, {} orders ({} pending)",
                business.name,
                menu.dishes.len(),
                menu.drinks.len(),
                orders.orders.len(),
                orders.pending_count()
            );
            if !console.business.has_schedule().await {
                tracing::warn!("No opening hours set; see {}", Route::Schedule);
            }
        }
        Ok(None) => tracing::info!("No business registered for this account yet"),
        Err(e) => tracing::warn!("Failed to load dashboard: {}", e),
    }

    console.shutdown();
    Ok(())
}
