//! Compatibility request assembly
//!
//! Turns a couple profile into a deterministic fact sheet and wraps it in the
//! provider prompts for the two operations. The same profile always yields
//! byte-identical prompts.

use std::fmt::Write as _;

use tohong_common::calendar::UNRESOLVED_ELEMENT_LABEL;
use tohong_common::models::MAX_RATIONALE_CHARS;
use tohong_common::{ConflictStatus, CoupleProfile, PersonFacts};

use crate::services::text_provider::ProviderRequest;

const SYSTEM_INSTRUCTION: &str = "You are an expert in Vietnamese wedding customs, \
Sino-Vietnamese astrology (Can Chi, Ngũ Hành Nạp Âm, Bát Trạch cung mệnh), Western \
astrology and numerology. Use the fact sheet exactly as given; never recompute it. \
Respond with a single JSON value only, no markdown and no commentary.";

const HARMONY_SCHEMA: &str = r#"{
  "score": <integer 0-100>,
  "summary": "<one or two sentences>",
  "conflictStatus": "GENERATIVE|CONFLICTING|NEUTRAL",
  "detailedAnalysis": "<several paragraphs>",
  "combinedAnalysis": {
    "synthesis": "<how zodiac and numerology complement the Eastern reading>"
  }
}"#;

const DATES_SCHEMA: &str = r#"{
  "dates": [
    {
      "solarDate": "YYYY-MM-DD",
      "lunarDate": "<lunar date with Can Chi of the day>",
      "dayQualityLabel": "<e.g. Hoàng Đạo, Thiên Đức>",
      "favorableTimeWindows": "<auspicious hours>",
      "rationale": "<short reason>",
      "suitability": "VERY_HIGH|HIGH|MODERATE"
    }
  ]
}"#;

/// Number of dates requested from the provider
pub const REQUESTED_DATE_COUNT: usize = 5;

/// Deterministic facts about a couple, computed before any provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSheet {
    pub groom: PersonFacts,
    pub bride: PersonFacts,
    /// Five-element relation hint (does not bind the provider)
    pub element_relation: ConflictStatus,
    pub desired_date_range: String,
}

impl FactSheet {
    pub fn from_profile(profile: &CoupleProfile) -> Self {
        let (groom, bride) = profile.facts();
        let element_relation = groom.element_relation(&bride);

        Self {
            groom,
            bride,
            element_relation,
            desired_date_range: profile.desired_date_range.trim().to_string(),
        }
    }

    /// Render as plain text lines for embedding in a prompt
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_person(&mut out, "Groom", &self.groom);
        render_person(&mut out, "Bride", &self.bride);
        let _ = writeln!(out, "Element relation hint: {}", self.element_relation);
        if !self.desired_date_range.is_empty() {
            let _ = writeln!(out, "Desired wedding period: {}", self.desired_date_range);
        }
        out
    }
}

fn render_person(out: &mut String, role: &str, person: &PersonFacts) {
    let calendar = &person.calendar;
    let birth_time = person
        .birth_time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let _ = writeln!(out, "{role}: {}", person.name);
    let _ = writeln!(out, "- Birth date: {} (time: {birth_time})", person.birth_date.format("%Y-%m-%d"));
    let _ = writeln!(out, "- Lunar year: {}", calendar.sexagenary_name);
    match (calendar.element_key, &calendar.element_gloss) {
        (Some(key), Some(gloss)) => {
            let _ = writeln!(
                out,
                "- Nạp Âm element: {} ({gloss}) [{key}]",
                calendar.element_label
            );
        }
        _ => {
            let _ = writeln!(out, "- Nạp Âm element: {UNRESOLVED_ELEMENT_LABEL} [derive from lunar year]");
        }
    }
    let _ = writeln!(
        out,
        "- Palace (cung mệnh): {} ({})",
        calendar.bagua.palace_name, calendar.bagua.element_affinity
    );
    let _ = writeln!(
        out,
        "- Zodiac sign: {} ({})",
        person.western.zodiac_sign,
        person.western.zodiac_sign.vietnamese_name()
    );
    let _ = writeln!(out, "- Life path number: {}", person.western.life_path_number);
}

fn language_line(language: &str) -> String {
    match language.trim().to_lowercase().as_str() {
        "" | "vi" | "vi-vn" => "Write every free-text field in Vietnamese.".to_string(),
        "en" | "en-us" | "en-gb" => "Write every free-text field in English.".to_string(),
        other => format!("Write every free-text field in the language with code '{other}'."),
    }
}

/// Prompt for the compatibility (hợp tuổi) reading
pub fn build_harmony_request(sheet: &FactSheet, language: &str) -> ProviderRequest {
    let prompt = format!(
        "Assess the marriage compatibility of this couple.\n\n\
         FACT SHEET\n{facts}\n\
         Return JSON with exactly this shape:\n{schema}\n\n\
         Base the reading on the fact sheet; do not restate or change it. \
         {language}",
        facts = sheet.render(),
        schema = HARMONY_SCHEMA,
        language = language_line(language),
    );

    ProviderRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt,
    }
}

/// Prompt for the auspicious wedding date (ngày cưới) search
pub fn build_auspicious_dates_request(sheet: &FactSheet, language: &str) -> ProviderRequest {
    let period = if sheet.desired_date_range.is_empty() {
        "the next twelve months"
    } else {
        sheet.desired_date_range.as_str()
    };

    let prompt = format!(
        "Choose the {count} best wedding dates for this couple within {period}, \
         best first.\n\n\
         FACT SHEET\n{facts}\n\
         Return JSON with exactly this shape:\n{schema}\n\n\
         Keep each rationale under {max} characters. {language}",
        count = REQUESTED_DATE_COUNT,
        facts = sheet.render(),
        schema = DATES_SCHEMA,
        max = MAX_RATIONALE_CHARS,
        language = language_line(language),
    );

    ProviderRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt,
    }
}
