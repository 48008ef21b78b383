//! Deterministic facts endpoint
//!
//! GET /facts?date=YYYY-MM-DD&gender=male[&name=..] returns the calendar and
//! numerology facts for one person without calling the provider.

use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;

use tohong_common::{Gender, PersonFacts, PersonProfile};

use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// GET /facts query
#[derive(Debug, Deserialize)]
pub struct FactsQuery {
    pub date: String,
    pub gender: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// GET /facts
pub async fn get_facts(Query(query): Query<FactsQuery>) -> ApiResult<Json<PersonFacts>> {
    let gender: Gender = query
        .gender
        .parse()
        .map_err(|e: tohong_common::Error| ApiError::BadRequest(e.to_string()))?;

    let name = query
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("-");
    let profile = PersonProfile::parse(name, &query.date, query.time.as_deref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(PersonFacts::compute(&profile, gender)))
}

/// Build facts routes
pub fn facts_routes() -> Router<AppState> {
    Router::new().route("/facts", get(get_facts))
}
