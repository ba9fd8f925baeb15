//! Lunar months and lunar/solar date conversion
//!
//! Months follow the modern rules: a month begins on the Beijing date of a
//! new moon, the month holding the winter solstice is month 11, and when a
//! solstice year (month 11 to month 11) has 13 months the first one without
//! a principal term is the leap month, numbered after its predecessor.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::astro;
use crate::error::{CalendarError, Result};
use crate::ganzhi::GanZhi;
use crate::term::{SolarTerm, term_jde};

const MONTH_NAMES: [&str; 12] = ["正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊"];
const DIGITS: [&str; 10] = ["十", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// A date in the Chinese lunar calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Whether `month` is the intercalary (闰) repeat of that month
    #[serde(default)]
    pub leap: bool,
}

impl LunarDate {
    /// A date in a regular (non-leap) month
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            leap: false,
        }
    }

    /// A date in the leap repeat of `month`
    pub fn in_leap_month(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            leap: true,
        }
    }

    /// Sexagenary name of the lunar year
    pub fn year_ganzhi(&self) -> GanZhi {
        GanZhi::for_year(self.year)
    }

    /// Traditional month name, e.g. `闰二月` or `腊月`
    pub fn month_name(&self) -> String {
        let name = MONTH_NAMES
            .get((self.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("?");
        format!("{}{}月", if self.leap { "闰" } else { "" }, name)
    }

    /// Traditional day name, e.g. `初一`, `廿一`, `三十`
    pub fn day_name(&self) -> String {
        match self.day {
            1..=10 => format!("初{}", DIGITS[(self.day % 10) as usize]),
            11..=19 => format!("十{}", DIGITS[(self.day % 10) as usize]),
            20 => "二十".to_string(),
            21..=29 => format!("廿{}", DIGITS[(self.day % 10) as usize]),
            30 => "三十".to_string(),
            _ => "?".to_string(),
        }
    }

    /// Full Chinese rendering, e.g. `庚午年四月廿一`
    pub fn chinese(&self) -> String {
        format!("{}年{}{}", self.year_ganzhi(), self.month_name(), self.day_name())
    }
}

impl std::fmt::Display for LunarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.leap {
            write!(f, "{}-L{:02}-{:02}", self.year, self.month, self.day)
        } else {
            write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

/// One month of a lunar year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarMonth {
    pub number: u32,
    pub leap: bool,
    pub first_day: NaiveDate,
    /// 29 or 30
    pub days: u32,
}

impl LunarMonth {
    fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date < self.first_day + Duration::days(self.days as i64)
    }
}

/// The months of one lunar year, in order, starting with month 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarYear {
    pub year: i32,
    pub months: Vec<LunarMonth>,
}

impl LunarYear {
    /// Gregorian date of the lunar new year (first day of month 1)
    pub fn new_year_day(&self) -> NaiveDate {
        self.months[0].first_day
    }

    /// Number of the leap month, if this year has one
    pub fn leap_month(&self) -> Option<u32> {
        self.months.iter().find(|m| m.leap).map(|m| m.number)
    }

    pub fn month(&self, number: u32, leap: bool) -> Option<&LunarMonth> {
        self.months.iter().find(|m| m.number == number && m.leap == leap)
    }

    /// Total days in the year (353-355 or 383-385)
    pub fn days(&self) -> u32 {
        self.months.iter().map(|m| m.days).sum()
    }
}

/// Lunar calendar with a per-year month cache
///
/// Years are computed on first use and never change afterwards, so the cache
/// is safe to share across threads.
#[derive(Debug, Default)]
pub struct LunarCalendar {
    years: RwLock<HashMap<i32, Arc<LunarYear>>>,
}

impl LunarCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Months of lunar `year`
    pub fn year(&self, year: i32) -> Result<Arc<LunarYear>> {
        crate::check_year(year)?;
        self.cached_year(year)
    }

    /// Months of lunar `year` without the range check; `from_solar` needs
    /// lunar 1899 for Gregorian dates before lunar new year 1900
    fn cached_year(&self, year: i32) -> Result<Arc<LunarYear>> {
        if let Ok(years) = self.years.read()
            && let Some(cached) = years.get(&year)
        {
            return Ok(Arc::clone(cached));
        }

        let computed = Arc::new(compute_year(year)?);
        debug!(
            year,
            new_year = %computed.new_year_day(),
            leap_month = ?computed.leap_month(),
            "Computed lunar year"
        );
        if let Ok(mut years) = self.years.write() {
            years.insert(year, Arc::clone(&computed));
        }
        Ok(computed)
    }

    /// Gregorian date of a lunar date
    pub fn to_solar(&self, date: LunarDate) -> Result<NaiveDate> {
        if !(1..=12).contains(&date.month) || !(1..=30).contains(&date.day) {
            return Err(CalendarError::InvalidLunarDate(date.to_string()));
        }

        let year = self.year(date.year)?;
        let month = year.month(date.month, date.leap).ok_or_else(|| {
            CalendarError::InvalidLunarDate(format!("lunar year {} has no {}", date.year, date.month_name()))
        })?;
        if date.day > month.days {
            return Err(CalendarError::InvalidLunarDate(format!(
                "{} of lunar year {} has only {} days",
                date.month_name(),
                date.year,
                month.days
            )));
        }

        Ok(month.first_day + Duration::days(date.day as i64 - 1))
    }

    /// Lunar date of a Gregorian date
    ///
    /// The range applies to the Gregorian year, so early January 1900 maps
    /// into lunar 1899.
    pub fn from_solar(&self, date: NaiveDate) -> Result<LunarDate> {
        let civil_year = date.year();
        crate::check_year(civil_year)?;

        let this_year = self.cached_year(civil_year)?;
        let (lunar_year, year) = if date >= this_year.new_year_day() {
            (civil_year, this_year)
        } else {
            (civil_year - 1, self.cached_year(civil_year - 1)?)
        };

        year.months
            .iter()
            .find(|m| m.contains(date))
            .map(|m| LunarDate {
                year: lunar_year,
                month: m.number,
                day: (date - m.first_day).num_days() as u32 + 1,
                leap: m.leap,
            })
            .ok_or_else(|| CalendarError::InvalidSolarDate(format!("{} is outside the lunar calendar range", date)))
    }
}

/// Month starts (as JDN) and numbering for the solstice year ending with the
/// winter solstice of `year`: month 11 of `year - 1` up to, not including,
/// month 11 of `year`
fn solstice_year(year: i32) -> Vec<(i64, i64, u32, bool)> {
    let solstice_jde = term_jde(year - 1, SolarTerm::WinterSolstice);
    let first_solstice = astro::china_day(solstice_jde);
    let last_solstice = astro::china_day(term_jde(year, SolarTerm::WinterSolstice));

    let new_moon_day = |k: i64| astro::china_day(astro::new_moon(k));
    let mut k = astro::lunation_near(solstice_jde);
    while new_moon_day(k) > first_solstice {
        k -= 1;
    }
    while new_moon_day(k + 1) <= first_solstice {
        k += 1;
    }

    let mut starts = Vec::with_capacity(15);
    loop {
        let day = new_moon_day(k);
        if day > last_solstice {
            break;
        }
        starts.push(day);
        k += 1;
    }

    let principal_days: Vec<i64> = [year - 1, year]
        .iter()
        .flat_map(|&y| {
            SolarTerm::ALL
                .iter()
                .filter(|t| t.is_principal())
                .map(move |&t| astro::china_day(term_jde(y, t)))
        })
        .collect();

    // starts runs from month 11 of the previous year to month 11 of this one
    let month_count = starts.len() - 1;
    let mut leap_pending = month_count == 13;
    let mut number = 11;
    let mut previous = 11;
    let mut months = Vec::with_capacity(month_count);

    for (i, pair) in starts.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let has_principal = principal_days.iter().any(|&d| d >= start && d < end);
        if leap_pending && i > 0 && !has_principal {
            months.push((start, end, previous, true));
            leap_pending = false;
            continue;
        }
        months.push((start, end, number, false));
        previous = number;
        number = number % 12 + 1;
    }

    months
}

fn compute_year(year: i32) -> Result<LunarYear> {
    let this_sui = solstice_year(year);
    let next_sui = solstice_year(year + 1);

    let months = this_sui
        .into_iter()
        .filter(|&(_, _, number, _)| number <= 10)
        .chain(next_sui.into_iter().filter(|&(_, _, number, _)| number >= 11))
        .map(|(start, end, number, leap)| {
            let first_day = astro::date_from_jdn(start).ok_or_else(|| CalendarError::out_of_range(year))?;
            Ok(LunarMonth {
                number,
                leap,
                first_day,
                days: (end - start) as u32,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LunarYear { year, months })
}
