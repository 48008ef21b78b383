//! Sino-Vietnamese calendar math
//!
//! Pure functions deriving a person's calendar facts from birth year and gender:
//! - Sexagenary year name (Can + Chi)
//! - Nạp Âm element label and key
//! - Bagua palace (cung mệnh) with its element affinity
//!
//! All functions are deterministic and free of shared state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::ConflictStatus;
use crate::{Error, Result};

/// Heavenly stems indexed by `year mod 10`.
///
/// Index 0 is Canh because years ending in 0 are Canh years.
pub const STEMS: [&str; 10] = [
    "Canh", "Tân", "Nhâm", "Quý", "Giáp", "Ất", "Bính", "Đinh", "Mậu", "Kỷ",
];

/// Earthly branches indexed by `year mod 12`.
///
/// Index 0 is Thân (e.g. 2004 Giáp Thân, 2004 mod 12 == 0).
pub const BRANCHES: [&str; 12] = [
    "Thân", "Dậu", "Tuất", "Hợi", "Tý", "Sửu", "Dần", "Mão", "Thìn", "Tỵ", "Ngọ", "Mùi",
];

/// First birth year covered by the Nạp Âm table
pub const FIRST_TABULATED_YEAR: i32 = 1980;
/// Last birth year covered by the Nạp Âm table
pub const LAST_TABULATED_YEAR: i32 = 2005;

/// Label returned for years outside the Nạp Âm table
pub const UNRESOLVED_ELEMENT_LABEL: &str = "Chưa xác định";

/// Palace name returned when an index has no palace table entry
pub const UNKNOWN_PALACE: &str = "Không xác định";

/// Nạp Âm labels, one entry per two consecutive years starting at 1980
const NAP_AM_PAIRS: [(&str, &str, ElementKey); 13] = [
    ("Thạch Lựu Mộc", "Pomegranate Wood", ElementKey::Wood),
    ("Đại Hải Thủy", "Great Ocean Water", ElementKey::Water),
    ("Hải Trung Kim", "Metal in the Sea", ElementKey::Metal),
    ("Lư Trung Hỏa", "Furnace Fire", ElementKey::Fire),
    ("Đại Lâm Mộc", "Great Forest Wood", ElementKey::Wood),
    ("Lộ Bàng Thổ", "Roadside Earth", ElementKey::Earth),
    ("Kiếm Phong Kim", "Sword-Edge Metal", ElementKey::Metal),
    ("Sơn Đầu Hỏa", "Mountain-Top Fire", ElementKey::Fire),
    ("Giản Hạ Thủy", "Stream Water", ElementKey::Water),
    ("Thành Đầu Thổ", "City-Wall Earth", ElementKey::Earth),
    ("Bạch Lạp Kim", "Melted Wax Metal", ElementKey::Metal),
    ("Dương Liễu Mộc", "Willow Wood", ElementKey::Wood),
    ("Tuyền Trung Thủy", "Spring Water", ElementKey::Water),
];

/// Lo Shu palace table (center palace 5 is handled separately)
const PALACES: [(u8, &str, &str); 8] = [
    (1, "Khảm", "Thủy"),
    (2, "Khôn", "Thổ"),
    (3, "Chấn", "Mộc"),
    (4, "Tốn", "Mộc"),
    (6, "Càn", "Kim"),
    (7, "Đoài", "Kim"),
    (8, "Cấn", "Thổ"),
    (9, "Ly", "Hỏa"),
];

/// Center palace resolution for men
const CENTER_PALACE_MALE: (&str, &str) = ("Khôn", "Thổ");
/// Center palace resolution for women
const CENTER_PALACE_FEMALE: (&str, &str) = ("Cấn", "Thổ");

/// Birth gender used by the palace formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "nam" | "groom" => Ok(Gender::Male),
            "female" | "f" | "nữ" | "nu" | "bride" => Ok(Gender::Female),
            other => Err(Error::InvalidInput(format!("Unknown gender: {other}"))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// One of the five elements (Ngũ Hành)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKey {
    Metal,
    Wood,
    Water,
    Fire,
    Earth,
}

impl ElementKey {
    /// Wire literal (`METAL`, `WOOD`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKey::Metal => "METAL",
            ElementKey::Wood => "WOOD",
            ElementKey::Water => "WATER",
            ElementKey::Fire => "FIRE",
            ElementKey::Earth => "EARTH",
        }
    }

    /// Vietnamese element name
    pub fn vietnamese_name(&self) -> &'static str {
        match self {
            ElementKey::Metal => "Kim",
            ElementKey::Wood => "Mộc",
            ElementKey::Water => "Thủy",
            ElementKey::Fire => "Hỏa",
            ElementKey::Earth => "Thổ",
        }
    }

    /// Element this one feeds in the generative cycle
    pub fn generates(&self) -> ElementKey {
        match self {
            ElementKey::Wood => ElementKey::Fire,
            ElementKey::Fire => ElementKey::Earth,
            ElementKey::Earth => ElementKey::Metal,
            ElementKey::Metal => ElementKey::Water,
            ElementKey::Water => ElementKey::Wood,
        }
    }

    /// Element this one overcomes in the controlling cycle
    pub fn controls(&self) -> ElementKey {
        match self {
            ElementKey::Wood => ElementKey::Earth,
            ElementKey::Earth => ElementKey::Water,
            ElementKey::Water => ElementKey::Fire,
            ElementKey::Fire => ElementKey::Metal,
            ElementKey::Metal => ElementKey::Wood,
        }
    }

    /// Relation between two elements, regardless of direction
    pub fn relation_to(&self, other: ElementKey) -> ConflictStatus {
        if self.generates() == other || other.generates() == *self {
            ConflictStatus::Generative
        } else if self.controls() == other || other.controls() == *self {
            ConflictStatus::Conflicting
        } else {
            ConflictStatus::Neutral
        }
    }
}

impl FromStr for ElementKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "METAL" => Ok(ElementKey::Metal),
            "WOOD" => Ok(ElementKey::Wood),
            "WATER" => Ok(ElementKey::Water),
            "FIRE" => Ok(ElementKey::Fire),
            "EARTH" => Ok(ElementKey::Earth),
            other => Err(Error::InvalidInput(format!("Unknown element key: {other}"))),
        }
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nạp Âm entry for a birth year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NapAm {
    /// Sino-Vietnamese label (e.g. "Lộ Bàng Thổ")
    pub label: &'static str,
    /// English gloss of the label
    pub gloss: &'static str,
    /// Element the label belongs to
    pub key: ElementKey,
}

/// Bagua palace (cung mệnh) assigned to a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaguaPalace {
    /// Normalized Lo Shu index (1-9)
    pub index: u8,
    /// Palace name (e.g. "Khảm")
    pub palace_name: String,
    /// Element affinity of the palace (e.g. "Thủy")
    pub element_affinity: String,
}

impl BaguaPalace {
    fn new(index: u8, palace_name: &str, element_affinity: &str) -> Self {
        Self {
            index,
            palace_name: palace_name.to_string(),
            element_affinity: element_affinity.to_string(),
        }
    }

    fn unknown(index: u8) -> Self {
        Self::new(index, UNKNOWN_PALACE, UNKNOWN_PALACE)
    }

    /// True when the palace resolved through the table or the center rule
    pub fn is_known(&self) -> bool {
        self.palace_name != UNKNOWN_PALACE
    }
}

/// Calendar facts for one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFacts {
    /// Sexagenary year name ("Canh Ngọ")
    pub sexagenary_name: String,
    /// Nạp Âm label, or [`UNRESOLVED_ELEMENT_LABEL`]
    pub element_label: String,
    /// English gloss of the label when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_gloss: Option<String>,
    /// Element key when the year is tabulated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_key: Option<ElementKey>,
    /// Bagua palace
    pub bagua: BaguaPalace,
}

impl CalendarFacts {
    /// Compute all calendar facts for a birth year and gender
    pub fn compute(year: i32, gender: Gender) -> Self {
        let nap_am = nap_am(year).ok();
        if nap_am.is_none() {
            tracing::debug!(year, "Birth year outside Nạp Âm table, using sentinel label");
        }

        Self {
            sexagenary_name: sexagenary_name(year),
            element_label: nap_am
                .map(|n| n.label.to_string())
                .unwrap_or_else(|| UNRESOLVED_ELEMENT_LABEL.to_string()),
            element_gloss: nap_am.map(|n| n.gloss.to_string()),
            element_key: nap_am.map(|n| n.key),
            bagua: bagua_palace(year, gender),
        }
    }

    /// True when the element label came from the table
    pub fn is_element_resolved(&self) -> bool {
        self.element_key.is_some()
    }
}

/// Sexagenary name of a year, "Stem Branch"
pub fn sexagenary_name(year: i32) -> String {
    let stem = STEMS[year.rem_euclid(10) as usize];
    let branch = BRANCHES[year.rem_euclid(12) as usize];
    format!("{stem} {branch}")
}

/// Strict Nạp Âm lookup
///
/// # Errors
/// Returns [`Error::UnresolvedCalendarYear`] outside 1980-2005.
pub fn nap_am(year: i32) -> Result<NapAm> {
    if !(FIRST_TABULATED_YEAR..=LAST_TABULATED_YEAR).contains(&year) {
        return Err(Error::UnresolvedCalendarYear(year));
    }

    let (label, gloss, key) = NAP_AM_PAIRS[((year - FIRST_TABULATED_YEAR) / 2) as usize];
    Ok(NapAm { label, gloss, key })
}

/// Nạp Âm label of a year, degrading to [`UNRESOLVED_ELEMENT_LABEL`]
pub fn element_label(year: i32) -> String {
    nap_am(year)
        .map(|n| n.label.to_string())
        .unwrap_or_else(|_| UNRESOLVED_ELEMENT_LABEL.to_string())
}

/// Sum of the decimal digits of `n`
pub fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

/// Repeatedly replace `n` with its digit sum until it is a single digit
pub fn fold_to_single_digit(mut n: u32) -> u32 {
    while n > 9 {
        n = digit_sum(n);
    }
    n
}

/// Raw palace index for a year and gender, normalized into 1-9
///
/// Years before 2000 use `11 - S` (male) and `4 + S` (female), where S is the
/// folded digit sum of the whole year. From 2000 on the formulas are
/// `9 - S` (male) and `6 + S` (female); this second pair is provisional and
/// kept as-is.
pub fn palace_index(year: i32, gender: Gender) -> u8 {
    let folded = fold_to_single_digit(digit_sum(year.unsigned_abs())) as i32;

    let raw = match (year < 2000, gender) {
        (true, Gender::Male) => 11 - folded,
        (true, Gender::Female) => 4 + folded,
        (false, Gender::Male) => 9 - folded,
        (false, Gender::Female) => 6 + folded,
    };

    normalize_palace_index(raw)
}

fn normalize_palace_index(mut index: i32) -> u8 {
    while index > 9 {
        index -= 9;
    }
    while index <= 0 {
        index += 9;
    }
    index as u8
}

/// Bagua palace for a year and gender
///
/// Index 5 (center palace) resolves to Khôn for men and Cấn for women.
pub fn bagua_palace(year: i32, gender: Gender) -> BaguaPalace {
    let index = palace_index(year, gender);

    if index == 5 {
        let (name, element) = match gender {
            Gender::Male => CENTER_PALACE_MALE,
            Gender::Female => CENTER_PALACE_FEMALE,
        };
        return BaguaPalace::new(index, name, element);
    }

    PALACES
        .iter()
        .find(|(i, _, _)| *i == index)
        .map(|(i, name, element)| BaguaPalace::new(*i, name, element))
        .unwrap_or_else(|| BaguaPalace::unknown(index))
}
