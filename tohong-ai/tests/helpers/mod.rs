//! Shared fixtures for tohong-ai integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tohong_ai::services::{CompatibilityService, ProviderError, ProviderRequest, TextProvider};
use tohong_common::{CoupleProfile, PersonProfile};

/// Provider that replays canned replies and records every request
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Self::with(Ok(reply.to_string()))
    }

    pub fn failing(error: ProviderError) -> Arc<Self> {
        Self::with(Err(error))
    }

    fn with(reply: Result<String, ProviderError>) -> Arc<Self> {
        let provider = Self::default();
        provider.replies.lock().unwrap().push_back(reply);
        Arc::new(provider)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

/// Provider whose call never completes
pub struct StalledProvider;

#[async_trait]
impl TextProvider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
        std::future::pending::<()>().await;
        Err(ProviderError::EmptyResponse)
    }
}

pub fn service(provider: Arc<dyn TextProvider>) -> CompatibilityService {
    CompatibilityService::new(provider)
}

/// Groom born 1990-10-09 (Canh Ngọ), bride born 1992-03-21 (Nhâm Thân)
pub fn couple() -> CoupleProfile {
    CoupleProfile::new(
        PersonProfile::parse("Minh", "1990-10-09", Some("08:30")).unwrap(),
        PersonProfile::parse("Lan", "1992-03-21", None).unwrap(),
        "Tháng 11 - 12/2026",
    )
}

pub fn harmony_json(score: &str, conflict_status: &str) -> String {
    format!(
        r#"{{
  "score": {score},
  "summary": "Hai bạn khá hợp nhau.",
  "conflictStatus": "{conflict_status}",
  "detailedAnalysis": "Thổ sinh Kim, mệnh chồng hỗ trợ mệnh vợ."
}}"#
    )
}

/// Couple born outside the Nạp Âm table (1975 and 1978)
pub fn unresolved_couple() -> CoupleProfile {
    CoupleProfile::new(
        PersonProfile::parse("Hùng", "1975-04-02", None).unwrap(),
        PersonProfile::parse("Mai", "1978-08-15", None).unwrap(),
        "",
    )
}

pub fn date_json(solar_date: &str, suitability: &str) -> String {
    format!(
        r#"{{"solarDate": "{solar_date}", "lunarDate": "Mùng 2 tháng 10", "dayQualityLabel": "Hoàng Đạo", "favorableTimeWindows": "Thìn (7h-9h)", "rationale": "Ngày Hoàng Đạo, hợp tuổi cả hai.", "suitability": "{suitability}"}}"#
    )
}
