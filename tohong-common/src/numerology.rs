//! Western zodiac and life-path numerology

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{digit_sum, fold_to_single_digit};
use crate::{Error, Result};

/// Tropical zodiac sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// First day of the sign that begins in each month (index = month - 1)
const SIGN_STARTS: [(u32, ZodiacSign); 12] = [
    (20, ZodiacSign::Aquarius),
    (19, ZodiacSign::Pisces),
    (21, ZodiacSign::Aries),
    (20, ZodiacSign::Taurus),
    (21, ZodiacSign::Gemini),
    (21, ZodiacSign::Cancer),
    (23, ZodiacSign::Leo),
    (23, ZodiacSign::Virgo),
    (23, ZodiacSign::Libra),
    (23, ZodiacSign::Scorpio),
    (22, ZodiacSign::Sagittarius),
    (22, ZodiacSign::Capricorn),
];

impl ZodiacSign {
    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn vietnamese_name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Bạch Dương",
            ZodiacSign::Taurus => "Kim Ngưu",
            ZodiacSign::Gemini => "Song Tử",
            ZodiacSign::Cancer => "Cự Giải",
            ZodiacSign::Leo => "Sư Tử",
            ZodiacSign::Virgo => "Xử Nữ",
            ZodiacSign::Libra => "Thiên Bình",
            ZodiacSign::Scorpio => "Bọ Cạp",
            ZodiacSign::Sagittarius => "Nhân Mã",
            ZodiacSign::Capricorn => "Ma Kết",
            ZodiacSign::Aquarius => "Bảo Bình",
            ZodiacSign::Pisces => "Song Ngư",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Zodiac sign for a day of month and month (1-12)
///
/// Only range checks are applied, so `(29, 2)` is accepted regardless of year.
///
/// # Errors
/// Returns `Error::InvalidInput` when month is not 1-12 or day is not 1-31.
pub fn zodiac_sign(day: u32, month: u32) -> Result<ZodiacSign> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidInput(format!("Month out of range: {month}")));
    }
    if !(1..=31).contains(&day) {
        return Err(Error::InvalidInput(format!("Day out of range: {day}")));
    }

    Ok(sign_for(day, month))
}

fn sign_for(day: u32, month: u32) -> ZodiacSign {
    let (start_day, sign) = SIGN_STARTS[(month - 1) as usize];
    if day >= start_day {
        sign
    } else {
        // Previous month's sign; January wraps to December (Capricorn)
        SIGN_STARTS[((month + 10) % 12) as usize].1
    }
}

/// Life-path number of a full date
///
/// Every digit of year, month and day is summed together, then folded until
/// a single digit remains. Master numbers (11, 22, 33) are not preserved.
pub fn life_path_number(date: NaiveDate) -> u8 {
    let sum = digit_sum(date.year().unsigned_abs()) + digit_sum(date.month()) + digit_sum(date.day());
    fold_to_single_digit(sum) as u8
}

/// Life-path number of an ISO `YYYY-MM-DD` date string
pub fn life_path_number_iso(iso_date: &str) -> Result<u8> {
    let date = NaiveDate::parse_from_str(iso_date.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidInput(format!("Invalid date '{iso_date}': {e}")))?;
    Ok(life_path_number(date))
}

/// Western facts for one person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WesternFacts {
    pub zodiac_sign: ZodiacSign,
    pub life_path_number: u8,
}

impl WesternFacts {
    pub fn compute(birth_date: NaiveDate) -> Self {
        let zodiac_sign = sign_for(birth_date.day(), birth_date.month());

        Self {
            zodiac_sign,
            life_path_number: life_path_number(birth_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aries_boundary() {
        assert_eq!(zodiac_sign(21, 3).unwrap(), ZodiacSign::Aries);
        assert_eq!(zodiac_sign(20, 3).unwrap(), ZodiacSign::Pisces);
    }

    #[test]
    fn test_leap_day_matches_neighbor() {
        assert_eq!(zodiac_sign(29, 2).unwrap(), zodiac_sign(28, 2).unwrap());
        assert_eq!(zodiac_sign(29, 2).unwrap(), ZodiacSign::Pisces);
    }

    #[test]
    fn test_year_wrap_capricorn() {
        assert_eq!(zodiac_sign(22, 12).unwrap(), ZodiacSign::Capricorn);
        assert_eq!(zodiac_sign(31, 12).unwrap(), ZodiacSign::Capricorn);
        assert_eq!(zodiac_sign(1, 1).unwrap(), ZodiacSign::Capricorn);
        assert_eq!(zodiac_sign(19, 1).unwrap(), ZodiacSign::Capricorn);
        assert_eq!(zodiac_sign(20, 1).unwrap(), ZodiacSign::Aquarius);
        assert_eq!(zodiac_sign(21, 12).unwrap(), ZodiacSign::Sagittarius);
    }

    #[test]
    fn test_every_boundary() {
        let cases = [
            ((18, 2), ZodiacSign::Aquarius),
            ((19, 2), ZodiacSign::Pisces),
            ((19, 4), ZodiacSign::Aries),
            ((20, 4), ZodiacSign::Taurus),
            ((20, 5), ZodiacSign::Taurus),
            ((21, 5), ZodiacSign::Gemini),
            ((20, 6), ZodiacSign::Gemini),
            ((21, 6), ZodiacSign::Cancer),
            ((22, 7), ZodiacSign::Cancer),
            ((23, 7), ZodiacSign::Leo),
            ((22, 8), ZodiacSign::Leo),
            ((23, 8), ZodiacSign::Virgo),
            ((22, 9), ZodiacSign::Virgo),
            ((23, 9), ZodiacSign::Libra),
            ((22, 10), ZodiacSign::Libra),
            ((23, 10), ZodiacSign::Scorpio),
            ((21, 11), ZodiacSign::Scorpio),
            ((22, 11), ZodiacSign::Sagittarius),
        ];
        for ((day, month), expected) in cases {
            assert_eq!(zodiac_sign(day, month).unwrap(), expected, "{day}/{month}");
        }
    }

    #[test]
    fn test_zodiac_rejects_out_of_range() {
        assert!(zodiac_sign(1, 13).is_err());
        assert!(zodiac_sign(0, 5).is_err());
        assert!(zodiac_sign(32, 5).is_err());
    }

    #[test]
    fn test_life_path_no_master_numbers() {
        // 1+9+9+0+1+0+0+9 = 29 -> 11 -> 2; master number 11 is not kept
        assert_eq!(life_path_number_iso("1990-10-09").unwrap(), 2);
    }

    #[test]
    fn test_life_path_nine_is_terminal() {
        // 1+9+8+1+0+1+0+7 = 27 -> 9
        assert_eq!(life_path_number_iso("1981-01-07").unwrap(), 9);
    }

    #[test]
    fn test_life_path_always_single_digit() {
        let mut date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        while date <= end {
            let n = life_path_number(date);
            assert!((1..=9).contains(&n), "{date} -> {n}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_life_path_rejects_bad_date() {
        assert!(life_path_number_iso("1990-02-30").is_err());
        assert!(life_path_number_iso("not a date").is_err());
    }

    #[test]
    fn test_western_facts_agree_with_calculators() {
        let date = NaiveDate::from_ymd_opt(1992, 1, 5).unwrap();
        let facts = WesternFacts::compute(date);
        assert_eq!(facts.zodiac_sign, zodiac_sign(5, 1).unwrap());
        assert_eq!(facts.life_path_number, life_path_number(date));
    }
}
