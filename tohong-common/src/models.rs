//! Result models returned to callers
//!
//! These are the validated, strongly-typed shapes produced after a provider
//! reply has been decoded. Every "key" enum is a closed set: parsing any other
//! literal is an error, never a silent default.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::{CalendarFacts, ElementKey};
use crate::numerology::WesternFacts;
use crate::{Error, Result};

/// Maximum rationale length kept on an [`AuspiciousDate`]
pub const MAX_RATIONALE_CHARS: usize = 280;

/// Relation between the couple's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictStatus {
    /// Elements feed each other (tương sinh)
    Generative,
    /// Elements overcome each other (tương khắc)
    Conflicting,
    /// Neither feeding nor overcoming (bình hòa)
    Neutral,
}

impl ConflictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStatus::Generative => "GENERATIVE",
            ConflictStatus::Conflicting => "CONFLICTING",
            ConflictStatus::Neutral => "NEUTRAL",
        }
    }
}

impl FromStr for ConflictStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GENERATIVE" => Ok(ConflictStatus::Generative),
            "CONFLICTING" => Ok(ConflictStatus::Conflicting),
            "NEUTRAL" => Ok(ConflictStatus::Neutral),
            other => Err(Error::InvalidInput(format!("Unknown conflict status: {other}"))),
        }
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking label attached to a candidate wedding date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suitability {
    VeryHigh,
    High,
    Moderate,
}

impl Suitability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suitability::VeryHigh => "VERY_HIGH",
            Suitability::High => "HIGH",
            Suitability::Moderate => "MODERATE",
        }
    }
}

impl FromStr for Suitability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VERY_HIGH" => Ok(Suitability::VeryHigh),
            "HIGH" => Ok(Suitability::High),
            "MODERATE" => Ok(Suitability::Moderate),
            other => Err(Error::InvalidInput(format!("Unknown suitability: {other}"))),
        }
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar facts for one partner as shown in a harmony reading
///
/// Always built from the computed [`CalendarFacts`], never from provider text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarProjection {
    pub sexagenary_name: String,
    /// Nạp Âm label, or the unresolved sentinel
    pub element_label: String,
    /// Absent when the birth year is outside the Nạp Âm table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_key: Option<ElementKey>,
    pub palace_name: String,
    pub palace_element: String,
}

impl CalendarProjection {
    pub fn from_facts(facts: &CalendarFacts) -> Self {
        Self {
            sexagenary_name: facts.sexagenary_name.clone(),
            element_label: facts.element_label.clone(),
            element_key: facts.element_key,
            palace_name: facts.bagua.palace_name.clone(),
            palace_element: facts.bagua.element_affinity.clone(),
        }
    }
}

/// Western facts for one partner as shown in a harmony reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WesternProjection {
    pub zodiac_sign: String,
    pub life_path_number: u8,
}

impl WesternProjection {
    pub fn from_facts(facts: &WesternFacts) -> Self {
        Self {
            zodiac_sign: facts.zodiac_sign.name().to_string(),
            life_path_number: facts.life_path_number,
        }
    }
}

/// Optional zodiac/numerology section of a harmony reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAnalysis {
    pub groom: WesternProjection,
    pub bride: WesternProjection,
    pub synthesis: String,
}

/// Validated compatibility reading for a couple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyResult {
    /// Display score, 0-100
    pub score: u8,
    pub summary: String,
    pub groom: CalendarProjection,
    pub bride: CalendarProjection,
    pub conflict_status: ConflictStatus,
    pub detailed_analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_analysis: Option<CombinedAnalysis>,
}

/// One recommended wedding date, in provider rank order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuspiciousDate {
    pub solar_date: NaiveDate,
    pub lunar_date: String,
    pub day_quality_label: String,
    pub favorable_time_windows: String,
    /// At most [`MAX_RATIONALE_CHARS`] characters
    pub rationale: String,
    pub suitability: Suitability,
}

/// Trim and cap a rationale at [`MAX_RATIONALE_CHARS`] characters
pub fn bound_rationale(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_RATIONALE_CHARS {
        return trimmed.to_string();
    }

    let mut bounded: String = trimmed.chars().take(MAX_RATIONALE_CHARS - 1).collect();
    bounded.push('…');
    bounded
}
