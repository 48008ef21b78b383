//! # Tơ Hồng Common Library
//!
//! Deterministic core shared by every tohong binary:
//! - Sino-Vietnamese calendar math (sexagenary name, Nạp Âm element, bagua palace)
//! - Western zodiac sign and life-path numerology
//! - Couple profile parsing
//! - Result models returned by the compatibility service
//! - Resilient decoding of JSON embedded in generated text
//! - Configuration loading

pub mod calendar;
pub mod config;
pub mod decoder;
pub mod error;
pub mod models;
pub mod numerology;
pub mod profile;

pub use calendar::{BaguaPalace, CalendarFacts, ElementKey, Gender, NapAm};
pub use decoder::{DecodeError, StructuredResponseDecoder};
pub use error::{Error, Result};
pub use models::{AuspiciousDate, ConflictStatus, HarmonyResult, Suitability};
pub use numerology::{WesternFacts, ZodiacSign};
pub use profile::{CoupleProfile, PersonFacts, PersonProfile};
