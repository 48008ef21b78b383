//! Compatibility API handlers
//!
//! POST /compatibility, POST /auspicious-dates

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tohong_common::{AuspiciousDate, CoupleProfile, HarmonyResult, PersonProfile};

use crate::{
    error::{ApiResult, ServiceError},
    services::RequestContext,
    AppState,
};

/// One partner as submitted by the form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    /// `HH:MM`, optional
    #[serde(default)]
    pub birth_time: Option<String>,
}

impl PersonInput {
    fn parse(&self, role: &str) -> Result<PersonProfile, ServiceError> {
        PersonProfile::parse(&self.name, &self.birth_date, self.birth_time.as_deref())
            .map_err(|e| ServiceError::InvalidProfile(format!("{role}: {e}")))
    }
}

/// Request body shared by both operations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleProfileRequest {
    pub groom: PersonInput,
    pub bride: PersonInput,
    #[serde(default)]
    pub desired_date_range: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CoupleProfileRequest {
    /// Validate the form and build the explicit request context
    pub fn into_parts(self) -> Result<(CoupleProfile, RequestContext), ServiceError> {
        let profile = CoupleProfile::new(
            self.groom.parse("groom")?,
            self.bride.parse("bride")?,
            self.desired_date_range,
        );

        let mut ctx = RequestContext::new();
        if let Some(user_id) = self.user_id.filter(|u| !u.trim().is_empty()) {
            ctx = ctx.with_user(user_id);
        }
        if let Some(language) = self.language {
            ctx = ctx.with_language(language);
        }

        Ok((profile, ctx))
    }
}

/// POST /auspicious-dates response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuspiciousDatesResponse {
    pub dates: Vec<AuspiciousDate>,
}

/// POST /compatibility
pub async fn compute_compatibility(
    State(state): State<AppState>,
    payload: Result<Json<CoupleProfileRequest>, JsonRejection>,
) -> ApiResult<Json<HarmonyResult>> {
    let Json(request) = payload?;
    match run_compatibility(&state, request).await {
        Ok(harmony) => Ok(Json(harmony)),
        Err(e) => {
            state.record_error(&e).await;
            Err(e.into())
        }
    }
}

/// POST /auspicious-dates
pub async fn find_auspicious_dates(
    State(state): State<AppState>,
    payload: Result<Json<CoupleProfileRequest>, JsonRejection>,
) -> ApiResult<Json<AuspiciousDatesResponse>> {
    let Json(request) = payload?;
    match run_auspicious_dates(&state, request).await {
        Ok(dates) => Ok(Json(AuspiciousDatesResponse { dates })),
        Err(e) => {
            state.record_error(&e).await;
            Err(e.into())
        }
    }
}

async fn run_compatibility(
    state: &AppState,
    request: CoupleProfileRequest,
) -> Result<HarmonyResult, ServiceError> {
    let (profile, ctx) = request.into_parts()?;
    let cancel_token = state.shutdown.child_token();
    state
        .service
        .compute_compatibility(&profile, &ctx, &cancel_token)
        .await
}

async fn run_auspicious_dates(
    state: &AppState,
    request: CoupleProfileRequest,
) -> Result<Vec<AuspiciousDate>, ServiceError> {
    let (profile, ctx) = request.into_parts()?;
    let cancel_token = state.shutdown.child_token();
    state
        .service
        .find_auspicious_dates(&profile, &ctx, &cancel_token)
        .await
}

/// Build compatibility routes
pub fn compatibility_routes() -> Router<AppState> {
    Router::new()
        .route("/compatibility", post(compute_compatibility))
        .route("/auspicious-dates", post(find_auspicious_dates))
}
