//! The 24 solar terms (节气)
//!
//! Terms are indexed from 小寒 (Minor Cold, solar longitude 285°) so that the
//! terms of one Gregorian year come out in calendar order, ending with 冬至.
//! Even indices are sectional terms (节, they open a sexagenary month); odd
//! indices are principal terms (中气, they anchor lunar month numbering).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::astro;
use crate::error::{CalendarError, Result};

/// One of the 24 solar terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolarTerm {
    MinorCold,
    MajorCold,
    StartOfSpring,
    RainWater,
    AwakeningOfInsects,
    SpringEquinox,
    PureBrightness,
    GrainRain,
    StartOfSummer,
    GrainBuds,
    GrainInEar,
    SummerSolstice,
    MinorHeat,
    MajorHeat,
    StartOfAutumn,
    EndOfHeat,
    WhiteDew,
    AutumnEquinox,
    ColdDew,
    FrostDescent,
    StartOfWinter,
    MinorSnow,
    MajorSnow,
    WinterSolstice,
}

const TERM_NAMES: [&str; 24] = [
    "小寒", "大寒", "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至", "小暑", "大暑",
    "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至",
];

const TERM_PINYIN: [&str; 24] = [
    "Xiaohan", "Dahan", "Lichun", "Yushui", "Jingzhe", "Chunfen", "Qingming", "Guyu", "Lixia", "Xiaoman",
    "Mangzhong", "Xiazhi", "Xiaoshu", "Dashu", "Liqiu", "Chushu", "Bailu", "Qiufen", "Hanlu", "Shuangjiang",
    "Lidong", "Xiaoxue", "Daxue", "Dongzhi",
];

impl SolarTerm {
    pub const ALL: [SolarTerm; 24] = [
        SolarTerm::MinorCold,
        SolarTerm::MajorCold,
        SolarTerm::StartOfSpring,
        SolarTerm::RainWater,
        SolarTerm::AwakeningOfInsects,
        SolarTerm::SpringEquinox,
        SolarTerm::PureBrightness,
        SolarTerm::GrainRain,
        SolarTerm::StartOfSummer,
        SolarTerm::GrainBuds,
        SolarTerm::GrainInEar,
        SolarTerm::SummerSolstice,
        SolarTerm::MinorHeat,
        SolarTerm::MajorHeat,
        SolarTerm::StartOfAutumn,
        SolarTerm::EndOfHeat,
        SolarTerm::WhiteDew,
        SolarTerm::AutumnEquinox,
        SolarTerm::ColdDew,
        SolarTerm::FrostDescent,
        SolarTerm::StartOfWinter,
        SolarTerm::MinorSnow,
        SolarTerm::MajorSnow,
        SolarTerm::WinterSolstice,
    ];

    /// Term at a position (taken modulo 24)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 24]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn chinese(self) -> &'static str {
        TERM_NAMES[self.index()]
    }

    pub fn pinyin(self) -> &'static str {
        TERM_PINYIN[self.index()]
    }

    /// Apparent solar longitude at which the term begins, in degrees
    pub fn longitude(self) -> f64 {
        ((285 + 15 * self.index()) % 360) as f64
    }

    /// Sectional term (节): opens a sexagenary month
    pub fn is_sectional(self) -> bool {
        self.index() % 2 == 0
    }

    /// Principal term (中气): a lunar month without one is a leap month candidate
    pub fn is_principal(self) -> bool {
        !self.is_sectional()
    }

    /// Term in effect at a given apparent solar longitude
    pub fn at_longitude(longitude: f64) -> Self {
        let from_minor_cold = astro::normalize_degrees(longitude - 285.0);
        Self::from_index((from_minor_cold / 15.0).floor() as usize)
    }
}

impl std::fmt::Display for SolarTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.chinese())
    }
}

/// A solar term together with the moment it begins (China Standard Time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMoment {
    pub term: SolarTerm,
    pub moment: NaiveDateTime,
}

/// TT Julian day at which `term` begins in Gregorian `year`
pub fn term_jde(year: i32, term: SolarTerm) -> f64 {
    // 小寒 falls around January 6th; terms are spaced about 15.2 days apart
    let jan6 = NaiveDate::from_ymd_opt(year, 1, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(astro::julian_day)
        .unwrap_or_else(|| astro::J2000 + (year - 2000) as f64 * astro::TROPICAL_YEAR);
    let guess = astro::china_to_tt(jan6) + term.index() as f64 * astro::TROPICAL_YEAR / 24.0;
    astro::solar_longitude_crossing(term.longitude(), guess)
}

/// Moment (China Standard Time) at which `term` begins in `year`
pub fn term_moment(year: i32, term: SolarTerm) -> Result<NaiveDateTime> {
    crate::check_year(year)?;
    astro::moment_from_julian_day(astro::tt_to_china(term_jde(year, term)))
        .ok_or_else(|| CalendarError::InvalidSolarDate(format!("{} of year {}", term.pinyin(), year)))
}

/// All 24 terms of a Gregorian year in calendar order (小寒 .. 冬至)
pub fn terms_of_year(year: i32) -> Result<Vec<TermMoment>> {
    SolarTerm::ALL
        .iter()
        .map(|&term| term_moment(year, term).map(|moment| TermMoment { term, moment }))
        .collect()
}

/// Term in effect at a civil moment
pub fn term_in_effect(moment: NaiveDateTime) -> SolarTerm {
    let jde = astro::china_to_tt(astro::julian_day(moment));
    SolarTerm::at_longitude(astro::apparent_solar_longitude(jde))
}

/// The term that begins during a civil day, if any
pub fn term_on(date: NaiveDate) -> Result<Option<TermMoment>> {
    crate::check_year(date.year())?;
    let start = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CalendarError::InvalidSolarDate(date.to_string()))?;
    let end = start + Duration::days(1);

    let before = term_in_effect(start);
    let after = term_in_effect(end);
    if before == after {
        return Ok(None);
    }

    let moment = term_moment(date.year(), after)?;
    Ok(Some(TermMoment { term: after, moment }))
}
