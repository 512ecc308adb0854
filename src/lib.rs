//! Restaurant Console - Rust Implementation
//!
//! Headless client for a restaurant ordering platform's management console.
//!
//! This library provides:
//! - Typed access to the REST backend (auth, business, dishes, drinks, orders)
//! - Session token persistence and identity decoding
//! - Stores that cache server state with loading and error tracking
//! - A guarded router that follows the authentication state
//! - An event bus that keeps unrelated stores in step

pub mod api;
pub mod app;
pub mod bus;
pub mod config;
pub mod error;
pub mod models;
pub mod router;
pub mod services;
pub mod session;
pub mod stores;

pub use app::Console;
pub use error::{Error, Result};
