//! Compatibility service integration tests
//!
//! Drives both operations end to end against scripted providers.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{
    couple, date_json, harmony_json, service, unresolved_couple, ScriptedProvider, StalledProvider,
};
use tohong_ai::services::{ProviderError, RequestContext, RequestStage};
use tohong_ai::ServiceError;
use tohong_common::calendar::UNRESOLVED_ELEMENT_LABEL;
use tohong_common::{ConflictStatus, CoupleProfile, ElementKey, PersonProfile, Suitability};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_ten_point_score_is_scaled() {
    // Given: provider wraps a 0-10 score in a code fence with prose
    let reply = format!("Đây là kết quả:\n```json\n{}\n```\nChúc mừng!", harmony_json("8.5", "GENERATIVE"));
    let provider = ScriptedProvider::replying(&reply);
    let service = service(provider.clone());

    // When
    let result = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    // Then
    assert_eq!(result.score, 85);
    assert_eq!(result.conflict_status, ConflictStatus::Generative);
    assert_eq!(result.groom.element_key, Some(ElementKey::Earth));
    assert_eq!(result.bride.sexagenary_name, "Nhâm Thân");
    assert!(result.combined_analysis.is_none());
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn test_contradicting_echo_is_ignored() {
    // Given: the reply restates the groom with the wrong year pillar and palace
    let reply = harmony_json("80", "GENERATIVE").replace(
        "\"conflictStatus\"",
        r#""groom": {"sexagenaryName": "Giáp Tý", "elementLabel": "Hải Trung Kim", "elementKey": "METAL", "palaceName": "Ly", "palaceElement": "Hỏa"},
  "conflictStatus""#,
    );
    let service = service(ScriptedProvider::replying(&reply));

    // When
    let result = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    // Then: the projection matches the computed facts
    assert_eq!(result.groom.sexagenary_name, "Canh Ngọ");
    assert_eq!(result.groom.element_label, "Lộ Bàng Thổ");
    assert_eq!(result.groom.element_key, Some(ElementKey::Earth));
    assert_eq!(result.groom.palace_name, "Khảm");
    assert_eq!(result.bride.element_key, Some(ElementKey::Metal));
}

#[tokio::test]
async fn test_unresolved_years_compatibility_succeeds() {
    // Given: both birth years fall outside the Nạp Âm table
    let provider = ScriptedProvider::replying(&harmony_json("6", "NEUTRAL"));
    let service = service(provider.clone());

    // When
    let result = service
        .compute_compatibility(&unresolved_couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    // Then: sentinel label, no element key, provider still consulted
    assert_eq!(result.score, 60);
    assert_eq!(result.groom.sexagenary_name, "Ất Mão");
    assert_eq!(result.groom.element_label, UNRESOLVED_ELEMENT_LABEL);
    assert_eq!(result.groom.element_key, None);
    assert_eq!(result.bride.sexagenary_name, "Mậu Ngọ");
    assert_eq!(result.bride.element_key, None);
    assert!(provider.requests()[0].prompt.contains(UNRESOLVED_ELEMENT_LABEL));
}

#[tokio::test]
async fn test_unresolved_years_dates_succeed() {
    let reply = format!("[{}]", date_json("2026-11-14", "HIGH"));
    let service = service(ScriptedProvider::replying(&reply));

    let dates = service
        .find_auspicious_dates(&unresolved_couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].suitability, Suitability::High);
}

#[tokio::test]
async fn test_hundred_point_score_is_kept() {
    let provider = ScriptedProvider::replying(&harmony_json("85", "NEUTRAL"));
    let service = service(provider);

    let result = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.score, 85);
}

#[tokio::test]
async fn test_prompt_embeds_fact_sheet_and_language() {
    let provider = ScriptedProvider::replying(&harmony_json("70", "NEUTRAL"));
    let service = service(provider.clone());
    let ctx = RequestContext::new().with_user("user-42").with_language("en");

    service
        .compute_compatibility(&couple(), &ctx, &CancellationToken::new())
        .await
        .unwrap();

    let requests = provider.requests();
    let prompt = &requests[0].prompt;
    assert!(prompt.contains("Canh Ngọ"));
    assert!(prompt.contains("Nhâm Thân"));
    assert!(prompt.contains("Lộ Bàng Thổ"));
    assert!(prompt.contains("in English"));
    assert!(!requests[0].system_instruction.is_empty());
}

#[tokio::test]
async fn test_raw_line_breaks_in_strings_are_repaired() {
    let reply = harmony_json("7", "NEUTRAL").replace(
        "Thổ sinh Kim, mệnh chồng hỗ trợ mệnh vợ.",
        "Thổ sinh Kim.\n    Mệnh chồng hỗ trợ mệnh vợ.",
    );
    let service = service(ScriptedProvider::replying(&reply));

    let result = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.detailed_analysis, "Thổ sinh Kim.\nMệnh chồng hỗ trợ mệnh vợ.");
    assert_eq!(result.score, 70);
}

#[tokio::test]
async fn test_dates_keep_provider_order() {
    // Given: five dates, not in calendar order
    let days = ["2026-12-05", "2026-11-14", "2026-12-20", "2026-11-02", "2026-12-27"];
    let entries: Vec<String> = days.iter().map(|d| date_json(d, "HIGH")).collect();
    let reply = format!("{{\"dates\": [{}]}}", entries.join(",\n"));
    let service = service(ScriptedProvider::replying(&reply));

    // When
    let dates = service
        .find_auspicious_dates(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    // Then
    let got: Vec<String> = dates.iter().map(|d| d.solar_date.to_string()).collect();
    assert_eq!(got, days);
}

#[tokio::test]
async fn test_dates_bare_array() {
    let reply = format!(
        "```\n[{}, {}, {}]\n```",
        date_json("2026-11-02", "VERY_HIGH"),
        date_json("2026-11-14", "HIGH"),
        date_json("2026-12-05", "MODERATE")
    );
    let service = service(ScriptedProvider::replying(&reply));

    let dates = service
        .find_auspicious_dates(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(dates.len(), 3);
    assert_eq!(dates[0].suitability, Suitability::VeryHigh);
    assert_eq!(dates[2].suitability, Suitability::Moderate);
}

#[tokio::test]
async fn test_dates_empty_object_is_empty_list() {
    let service = service(ScriptedProvider::replying("{}"));

    let dates = service
        .find_auspicious_dates(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(dates.is_empty());
}

#[tokio::test]
async fn test_long_rationale_is_bounded() {
    let long = "Ngày tốt. ".repeat(60);
    let reply = format!("[{}]", date_json("2026-11-02", "HIGH").replace("Ngày Hoàng Đạo, hợp tuổi cả hai.", &long));
    let service = service(ScriptedProvider::replying(&reply));

    let dates = service
        .find_auspicious_dates(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(dates[0].rationale.chars().count(), 280);
    assert!(dates[0].rationale.ends_with('…'));
}

#[tokio::test]
async fn test_prose_reply_is_decode_error_with_raw_text() {
    let reply = "Xin lỗi, tôi không thể trả lời câu hỏi này.";
    let service = service(ScriptedProvider::replying(reply));

    let err = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "DECODE_ERROR");
    assert_eq!(err.stage(), RequestStage::Decoding);
    match err {
        ServiceError::Decode(decode) => assert_eq!(decode.raw, reply),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_conflict_status_is_invalid_response() {
    let service = service(ScriptedProvider::replying(&harmony_json("80", "HARMONIOUS")));

    let err = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidProviderResponse(_)));
    assert_eq!(err.stage(), RequestStage::Validating);
}

#[tokio::test]
async fn test_score_above_hundred_is_invalid_response() {
    let service = service(ScriptedProvider::replying(&harmony_json("120", "NEUTRAL")));

    let err = service
        .compute_compatibility(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "INVALID_PROVIDER_RESPONSE");
}

#[tokio::test]
async fn test_provider_error_is_propagated() {
    let provider = ScriptedProvider::failing(ProviderError::Api(500, "upstream down".to_string()));
    let service = service(provider);

    let err = service
        .find_auspicious_dates(&couple(), &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "PROVIDER_CALL_FAILED");
    assert!(matches!(
        err,
        ServiceError::ProviderCallFailed(ProviderError::Api(500, _))
    ));
}

#[tokio::test]
async fn test_cancelled_token_skips_provider() {
    let provider = ScriptedProvider::replying(&harmony_json("80", "NEUTRAL"));
    let service = service(provider.clone());
    let token = CancellationToken::new();
    token.cancel();

    let err = service
        .compute_compatibility(&couple(), &RequestContext::new(), &token)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_cancel_during_provider_call() {
    // Given: a provider that never answers
    let service = service(Arc::new(StalledProvider));
    let token = CancellationToken::new();
    let trigger = token.clone();

    // When: the caller cancels shortly after the call starts
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        service.compute_compatibility(&couple(), &RequestContext::new(), &token),
    )
    .await
    .expect("cancellation did not interrupt the provider call");

    // Then
    let err = result.unwrap_err();
    assert_eq!(err.kind(), "PROVIDER_CANCELLED");
    assert_eq!(err.stage(), RequestStage::AwaitingProvider);
}

#[tokio::test]
async fn test_blank_name_is_invalid_profile() {
    let provider = ScriptedProvider::replying(&harmony_json("80", "NEUTRAL"));
    let service = service(provider.clone());
    let mut groom = PersonProfile::parse("Minh", "1990-10-09", None).unwrap();
    groom.name = "   ".to_string();
    let profile = CoupleProfile::new(groom, couple().bride, "");

    let err = service
        .compute_compatibility(&profile, &RequestContext::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "INVALID_PROFILE");
    assert!(provider.requests().is_empty());
}
