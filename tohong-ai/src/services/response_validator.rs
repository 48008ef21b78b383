//! Shape, range and closed-set validation of decoded provider replies
//!
//! Decoding only guarantees *some* JSON value. These functions turn that
//! value into typed results or an `InvalidProviderResponse` error; a result
//! is never returned partially filled.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::str::FromStr;

use tohong_common::models::{
    bound_rationale, CalendarProjection, CombinedAnalysis, WesternProjection,
};
use tohong_common::{AuspiciousDate, ConflictStatus, HarmonyResult, Suitability};

use crate::error::ServiceError;
use crate::services::request_builder::FactSheet;

/// Scores at or below this are read as a 0-10 scale
pub const TEN_POINT_SCALE_MAX: f64 = 10.0;

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::InvalidProviderResponse(message.into())
}

/// Convert a provider score to the 0-100 display scale
///
/// Values up to 10 are treated as a 0-10 scale and multiplied by 10; larger
/// values are taken as already 0-100. The result is rounded.
pub fn normalize_score(raw: f64) -> Result<u8, ServiceError> {
    if !raw.is_finite() || raw < 0.0 {
        return Err(invalid(format!("score {raw} is not a non-negative number")));
    }

    let scaled = if raw <= TEN_POINT_SCALE_MAX { raw * 10.0 } else { raw };
    if scaled > 100.0 {
        return Err(invalid(format!("score {raw} exceeds 100")));
    }

    Ok(scaled.round() as u8)
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ServiceError> {
    value
        .as_object()
        .ok_or_else(|| invalid(format!("{what} must be a JSON object")))
}

fn required_str(obj: &Map<String, Value>, field: &str, what: &str) -> Result<String, ServiceError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(invalid(format!("{what}.{field} must be a string"))),
        None => Err(invalid(format!("{what}.{field} is missing"))),
    }
}

fn first_str(obj: &Map<String, Value>, fields: &[&str], what: &str) -> Result<String, ServiceError> {
    for field in fields {
        if obj.contains_key(*field) {
            return required_str(obj, field, what);
        }
    }
    Err(invalid(format!("{what}.{} is missing", fields[0])))
}

fn closed_set<T: FromStr>(obj: &Map<String, Value>, field: &str, what: &str) -> Result<T, ServiceError> {
    let literal = required_str(obj, field, what)?;
    literal
        .parse::<T>()
        .map_err(|_| invalid(format!("{what}.{field} has unknown value '{literal}'")))
}

fn score_value(value: Option<&Value>) -> Result<f64, ServiceError> {
    match value {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid("score is not representable")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("score '{s}' is not numeric"))),
        Some(_) => Err(invalid("score must be a number")),
        None => Err(invalid("score is missing")),
    }
}

fn combined_analysis(
    value: Option<&Value>,
    sheet: &FactSheet,
) -> Result<Option<CombinedAnalysis>, ServiceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let obj = as_object(value, "combinedAnalysis")?;
            Ok(Some(CombinedAnalysis {
                groom: WesternProjection::from_facts(&sheet.groom.western),
                bride: WesternProjection::from_facts(&sheet.bride.western),
                synthesis: required_str(obj, "synthesis", "combinedAnalysis")?,
            }))
        }
    }
}

/// Validate a decoded compatibility reply
///
/// Only the reading itself (score, summary, conflict status, analysis,
/// synthesis) is taken from the provider. The per-person projections come
/// from the fact sheet, so calendar gaps stay as the unresolved label and an
/// echo that disagrees with the computed facts has no effect.
pub fn validate_harmony(value: &Value, sheet: &FactSheet) -> Result<HarmonyResult, ServiceError> {
    let obj = as_object(value, "response")?;

    let score = normalize_score(score_value(obj.get("score"))?)?;

    let detailed_analysis = required_str(obj, "detailedAnalysis", "response")?;
    if detailed_analysis.is_empty() {
        return Err(invalid("response.detailedAnalysis is empty"));
    }

    Ok(HarmonyResult {
        score,
        summary: required_str(obj, "summary", "response")?,
        groom: CalendarProjection::from_facts(&sheet.groom.calendar),
        bride: CalendarProjection::from_facts(&sheet.bride.calendar),
        conflict_status: closed_set::<ConflictStatus>(obj, "conflictStatus", "response")?,
        detailed_analysis,
        combined_analysis: combined_analysis(obj.get("combinedAnalysis"), sheet)?,
    })
}

fn auspicious_date(index: usize, value: &Value) -> Result<AuspiciousDate, ServiceError> {
    let what = format!("dates[{index}]");
    let obj = as_object(value, &what)?;

    let raw_date = required_str(obj, "solarDate", &what)?;
    let solar_date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
        .map_err(|e| invalid(format!("{what}.solarDate '{raw_date}' is not YYYY-MM-DD: {e}")))?;

    Ok(AuspiciousDate {
        solar_date,
        lunar_date: required_str(obj, "lunarDate", &what)?,
        day_quality_label: first_str(obj, &["dayQualityLabel", "dayQuality"], &what)?,
        favorable_time_windows: first_str(obj, &["favorableTimeWindows", "favorableHours"], &what)?,
        rationale: bound_rationale(&required_str(obj, "rationale", &what)?),
        suitability: closed_set::<Suitability>(obj, "suitability", &what)?,
    })
}

/// Validate a decoded auspicious-date reply
///
/// Accepts a bare array or an object carrying a `dates` array. An object
/// without `dates` yields an empty list. Order is preserved as given.
pub fn validate_auspicious_dates(value: &Value) -> Result<Vec<AuspiciousDate>, ServiceError> {
    let items = match value {
        Value::Object(obj) => match obj.get("dates") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(_) => return Err(invalid("response.dates must be an array")),
        },
        Value::Array(items) => items,
        _ => return Err(invalid("response must be a JSON array or object")),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| auspicious_date(index, item))
        .collect()
}
