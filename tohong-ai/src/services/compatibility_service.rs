//! Compatibility service
//!
//! Runs the two caller-facing operations, compatibility (hợp tuổi) and
//! auspicious wedding dates, through the same state machine:
//!
//! ```text
//! BUILDING_REQUEST → AWAITING_PROVIDER → DECODING → VALIDATING → SUCCEEDED
//!        └──────────────────┴────────────────┴───────────┴──────→ FAILED
//! ```
//!
//! Each invocation is independent: one provider call, no retries, no shared
//! mutable state. Who is asking travels in [`RequestContext`].

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use tohong_common::{AuspiciousDate, CoupleProfile, HarmonyResult, StructuredResponseDecoder};

use crate::error::ServiceError;
use crate::services::request_builder::{
    build_auspicious_dates_request, build_harmony_request, FactSheet,
};
use crate::services::response_validator::{validate_auspicious_dates, validate_harmony};
use crate::services::text_provider::{ProviderError, ProviderRequest, TextProvider};

/// Language used for free-text fields when the caller does not choose one
pub const DEFAULT_LANGUAGE: &str = "vi";

/// States of one service invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStage {
    BuildingRequest,
    AwaitingProvider,
    Decoding,
    Validating,
    Succeeded,
    Failed,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::BuildingRequest => "BUILDING_REQUEST",
            RequestStage::AwaitingProvider => "AWAITING_PROVIDER",
            RequestStage::Decoding => "DECODING",
            RequestStage::Validating => "VALIDATING",
            RequestStage::Succeeded => "SUCCEEDED",
            RequestStage::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStage::Succeeded | RequestStage::Failed)
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller identity and preferences for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Tags every log line of the invocation
    pub request_id: Uuid,
    pub user_id: Option<String>,
    /// Language code for free-text fields in the reply
    pub language: String,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_id: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Blank input keeps the default language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !language.trim().is_empty() {
            self.language = language.trim().to_string();
        }
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Compatibility,
    AuspiciousDates,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Compatibility => "compatibility",
            Operation::AuspiciousDates => "auspicious_dates",
        }
    }
}

/// Compatibility and auspicious-date orchestration
pub struct CompatibilityService {
    provider: Arc<dyn TextProvider>,
    decoder: StructuredResponseDecoder,
}

impl CompatibilityService {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            decoder: StructuredResponseDecoder::new(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Score and explain the couple's compatibility
    ///
    /// # Errors
    /// Any [`ServiceError`]; the operation never returns a partial result.
    pub async fn compute_compatibility(
        &self,
        profile: &CoupleProfile,
        ctx: &RequestContext,
        cancel_token: &CancellationToken,
    ) -> Result<HarmonyResult, ServiceError> {
        self.run(
            Operation::Compatibility,
            profile,
            ctx,
            cancel_token,
            build_harmony_request,
            validate_harmony,
        )
        .await
    }

    /// Recommend wedding dates, best first, in the order the provider gave
    ///
    /// An empty list is a valid result.
    pub async fn find_auspicious_dates(
        &self,
        profile: &CoupleProfile,
        ctx: &RequestContext,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<AuspiciousDate>, ServiceError> {
        self.run(
            Operation::AuspiciousDates,
            profile,
            ctx,
            cancel_token,
            build_auspicious_dates_request,
            validate_dates,
        )
        .await
    }

    async fn run<T>(
        &self,
        operation: Operation,
        profile: &CoupleProfile,
        ctx: &RequestContext,
        cancel_token: &CancellationToken,
        build: fn(&FactSheet, &str) -> ProviderRequest,
        validate: fn(&Value, &FactSheet) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let start = Instant::now();

        match self.execute(operation, profile, ctx, cancel_token, build, validate).await {
            Ok(result) => {
                transition(operation, ctx, RequestStage::Succeeded);
                tracing::info!(
                    request_id = %ctx.request_id,
                    user_id = ctx.user_id.as_deref().unwrap_or("-"),
                    operation = operation.as_str(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request succeeded"
                );
                Ok(result)
            }
            Err(e) => {
                transition(operation, ctx, RequestStage::Failed);
                tracing::warn!(
                    request_id = %ctx.request_id,
                    user_id = ctx.user_id.as_deref().unwrap_or("-"),
                    operation = operation.as_str(),
                    stage = %e.stage(),
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request failed"
                );
                Err(e)
            }
        }
    }

    async fn execute<T>(
        &self,
        operation: Operation,
        profile: &CoupleProfile,
        ctx: &RequestContext,
        cancel_token: &CancellationToken,
        build: fn(&FactSheet, &str) -> ProviderRequest,
        validate: fn(&Value, &FactSheet) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        transition(operation, ctx, RequestStage::BuildingRequest);
        check_profile(profile)?;
        let sheet = FactSheet::from_profile(profile);
        let request = build(&sheet, &ctx.language);

        transition(operation, ctx, RequestStage::AwaitingProvider);
        let raw = self.call_provider(&request, cancel_token).await?;
        tracing::debug!(
            request_id = %ctx.request_id,
            provider = self.provider.name(),
            response_len = raw.len(),
            "Provider responded"
        );

        transition(operation, ctx, RequestStage::Decoding);
        let value = self.decoder.decode_value(&raw)?;

        transition(operation, ctx, RequestStage::Validating);
        validate(&value, &sheet)
    }

    /// One provider call, abandoned as soon as the token fires
    async fn call_provider(
        &self,
        request: &ProviderRequest,
        cancel_token: &CancellationToken,
    ) -> Result<String, ProviderError> {
        if cancel_token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => Err(ProviderError::Cancelled),
            result = self.provider.generate(request) => result,
        }
    }
}

fn transition(operation: Operation, ctx: &RequestContext, stage: RequestStage) {
    tracing::debug!(
        request_id = %ctx.request_id,
        operation = operation.as_str(),
        stage = stage.as_str(),
        "Stage transition"
    );
}

fn validate_dates(value: &Value, _sheet: &FactSheet) -> Result<Vec<AuspiciousDate>, ServiceError> {
    validate_auspicious_dates(value)
}

fn check_profile(profile: &CoupleProfile) -> Result<(), ServiceError> {
    for (role, person) in [("groom", &profile.groom), ("bride", &profile.bride)] {
        if person.name.trim().is_empty() {
            return Err(ServiceError::InvalidProfile(format!("{role} name must not be blank")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(RequestStage::AwaitingProvider.to_string(), "AWAITING_PROVIDER");
        assert_eq!(
            serde_json::to_value(RequestStage::BuildingRequest).unwrap(),
            "BUILDING_REQUEST"
        );
        assert!(RequestStage::Failed.is_terminal());
        assert!(!RequestStage::Validating.is_terminal());
    }

    #[test]
    fn test_request_context_builders() {
        let ctx = RequestContext::new().with_user("u-1").with_language("  ");
        assert_eq!(ctx.user_id.as_deref(), Some("u-1"));
        assert_eq!(ctx.language, DEFAULT_LANGUAGE);

        let ctx = RequestContext::default().with_language("en");
        assert_eq!(ctx.language, "en");
        assert_ne!(ctx.request_id, RequestContext::new().request_id);
    }
}
