//! HTTP API handlers for tohong-ai

pub mod compatibility;
pub mod facts;
pub mod health;

pub use compatibility::{compatibility_routes, AuspiciousDatesResponse, CoupleProfileRequest, PersonInput};
pub use facts::facts_routes;
pub use health::health_routes;
