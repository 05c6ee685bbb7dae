//! Pricing engine module for ground bookings.
//!
//! Rule-based discount pricing: a base hourly rate, a booking window and a
//! set of discount rules in, a capped final price with a breakdown out.
//! The calculators are pure; services and routes wrap them for the booking flow.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

// Re-export commonly used items
pub use calculators::{compute_price, compute_price_with_policy, format_currency, round_money};
pub use models::{BookingRequest, DiscountRule, PricingPolicy, PricingResult};
pub use routes::router;
pub use services::RuleSource;
pub use validation::ValidationError;
