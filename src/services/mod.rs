//! Domain services, one per backend resource.
//!
//! Each method maps to exactly one REST endpoint and returns the backend's
//! response envelope. Errors pass through unchanged; the stores decide what
//! to show.

mod auth;
mod business;
mod dish;
mod drink;
mod order;

pub use auth::AuthService;
pub use business::BusinessService;
pub use dish::DishService;
pub use drink::DrinkService;
pub use order::OrderService;
