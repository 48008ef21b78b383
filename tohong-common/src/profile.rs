//! Couple profiles and per-person derived facts

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarFacts, Gender};
use crate::models::ConflictStatus;
use crate::numerology::WesternFacts;
use crate::{Error, Result};

/// One partner's birth record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    pub name: String,
    pub birth_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<NaiveTime>,
}

impl PersonProfile {
    /// Build a profile from raw form input
    ///
    /// `birth_date` must be `YYYY-MM-DD`; `birth_time` accepts `HH:MM` or
    /// `HH:MM:SS`, and blank is treated as absent.
    ///
    /// # Errors
    /// `Error::InvalidInput` for a blank name or a malformed date/time.
    pub fn parse(name: &str, birth_date: &str, birth_time: Option<&str>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Name must not be blank".to_string()));
        }

        let birth_date = NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d").map_err(|e| {
            Error::InvalidInput(format!("Invalid birth date '{}': {}", birth_date.trim(), e))
        })?;

        let birth_time = match birth_time.map(str::trim).filter(|t| !t.is_empty()) {
            Some(raw) => Some(
                NaiveTime::parse_from_str(raw, "%H:%M")
                    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
                    .map_err(|e| Error::InvalidInput(format!("Invalid birth time '{raw}': {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            birth_date,
            birth_time,
        })
    }
}

/// Both partners plus the requested wedding window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleProfile {
    pub groom: PersonProfile,
    pub bride: PersonProfile,
    /// Free text, e.g. "Tháng 10 - 12/2026"
    #[serde(default)]
    pub desired_date_range: String,
}

impl CoupleProfile {
    pub fn new(groom: PersonProfile, bride: PersonProfile, desired_date_range: impl Into<String>) -> Self {
        Self {
            groom,
            bride,
            desired_date_range: desired_date_range.into(),
        }
    }

    /// Derived facts for groom (male) and bride (female)
    pub fn facts(&self) -> (PersonFacts, PersonFacts) {
        (
            PersonFacts::compute(&self.groom, Gender::Male),
            PersonFacts::compute(&self.bride, Gender::Female),
        )
    }
}

/// Everything the calculators derive for one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFacts {
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<NaiveTime>,
    pub calendar: CalendarFacts,
    pub western: WesternFacts,
}

impl PersonFacts {
    pub fn compute(profile: &PersonProfile, gender: Gender) -> Self {
        Self {
            name: profile.name.clone(),
            gender,
            birth_date: profile.birth_date,
            birth_time: profile.birth_time,
            calendar: CalendarFacts::compute(profile.birth_date.year(), gender),
            western: WesternFacts::compute(profile.birth_date),
        }
    }

    /// Five-element relation with another person; unresolved years are neutral
    pub fn element_relation(&self, other: &PersonFacts) -> ConflictStatus {
        match (self.calendar.element_key, other.calendar.element_key) {
            (Some(a), Some(b)) => a.relation_to(b),
            _ => ConflictStatus::Neutral,
        }
    }
}
