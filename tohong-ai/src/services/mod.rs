//! Service layer for tohong-ai
//!
//! The provider seam, its HTTP implementation, and the orchestration that
//! turns a couple profile into validated results.

pub mod chat_client;
pub mod compatibility_service;
pub mod request_builder;
pub mod response_validator;
pub mod text_provider;

pub use chat_client::ChatCompletionsClient;
pub use compatibility_service::{CompatibilityService, RequestContext, RequestStage};
pub use request_builder::FactSheet;
pub use text_provider::{ProviderError, ProviderRequest, TextProvider};
