//! Four-pillar (八字) extraction from a civil moment
//!
//! - Year pillar changes at the exact moment of 立春, not on lunar new year.
//! - Month pillar changes at each sectional term; its stem follows the
//!   "five tigers" rule from the year stem.
//! - Day pillar is `(JDN + 49) mod 60`.
//! - Hour branch is the two-hour watch; its stem follows the "five rats" rule
//!   from the day stem. 23:00 opens the next day's Zi watch.
//!
//! No true-solar-time (longitude) correction is applied: the clock reading
//! is taken as China Standard Time.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::astro;
use crate::error::{CalendarError, Result};
use crate::ganzhi::{Branch, GanZhi};
use crate::term::{SolarTerm, term_jde};

/// How the late Zi watch (23:00-23:59) is assigned to a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZiHourRule {
    /// Day pillar stays on the civil date; the hour stem follows the next day
    #[default]
    SameDay,
    /// Day pillar also rolls over to the next day at 23:00
    NextDay,
}

impl std::fmt::Display for ZiHourRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SameDay => write!(f, "same-day"),
            Self::NextDay => write!(f, "next-day"),
        }
    }
}

impl std::str::FromStr for ZiHourRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "same-day" | "same_day" | "sameday" => Ok(Self::SameDay),
            "next-day" | "next_day" | "nextday" => Ok(Self::NextDay),
            _ => Err(format!("Unknown zi hour rule: {}", s)),
        }
    }
}

/// The year, month, day and hour pillars of a moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: GanZhi,
    pub month: GanZhi,
    pub day: GanZhi,
    pub hour: GanZhi,
}

impl std::fmt::Display for FourPillars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

/// Build a validated civil moment from calendar fields
pub fn civil_moment(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CalendarError::InvalidSolarDate(format!("{:04}-{:02}-{:02}", year, month, day)))?;
    date.and_hms_opt(hour, minute, 0)
        .ok_or(CalendarError::InvalidTime { hour, minute })
}

/// Day pillar of a civil date
pub fn day_pillar(date: NaiveDate) -> GanZhi {
    GanZhi::from_index(astro::jdn(date) + 49)
}

/// Year pillar of a moment, switching at 立春
pub fn year_pillar(moment: NaiveDateTime) -> GanZhi {
    let jde = astro::china_to_tt(astro::julian_day(moment));
    let civil_year = moment.year();
    let year = if jde < term_jde(civil_year, SolarTerm::StartOfSpring) {
        civil_year - 1
    } else {
        civil_year
    };
    GanZhi::for_year(year)
}

/// Month pillar of a moment given its year pillar
pub fn month_pillar(moment: NaiveDateTime, year: GanZhi) -> GanZhi {
    let jde = astro::china_to_tt(astro::julian_day(moment));
    let since_lichun = astro::normalize_degrees(astro::apparent_solar_longitude(jde) - 315.0);
    let months_since_tiger = (since_lichun / 30.0).floor() as i64;
    // 甲/己 years open with 丙寅, 乙/庚 with 戊寅, and so on
    let tiger_month = GanZhi::from_index((year.stem().index() % 5) as i64 * 12 + 2);
    tiger_month.offset(months_since_tiger)
}

/// Hour pillar for a clock hour, given the day pillar that governs the hour stem
pub fn hour_pillar(hour: u32, day: GanZhi) -> GanZhi {
    // 甲/己 days open with 甲子, 乙/庚 with 丙子, and so on
    let rat_hour = GanZhi::from_index((day.stem().index() % 5) as i64 * 12);
    rat_hour.offset(Branch::for_hour(hour).index() as i64)
}

/// All four pillars of a civil moment (China Standard Time)
pub fn four_pillars(moment: NaiveDateTime, rule: ZiHourRule) -> Result<FourPillars> {
    crate::check_year(moment.year())?;
    Ok(pillars_at(moment, rule))
}

/// Four pillars of a lunar date and clock time
///
/// The range applies to the lunar year, so the last lunar month of 2100
/// may land in January 2101.
pub fn lunar_four_pillars(
    calendar: &crate::lunar::LunarCalendar,
    date: crate::lunar::LunarDate,
    hour: u32,
    minute: u32,
    rule: ZiHourRule,
) -> Result<FourPillars> {
    let solar = calendar.to_solar(date)?;
    let moment = solar
        .and_hms_opt(hour, minute, 0)
        .ok_or(CalendarError::InvalidTime { hour, minute })?;
    Ok(pillars_at(moment, rule))
}

fn pillars_at(moment: NaiveDateTime, rule: ZiHourRule) -> FourPillars {
    let year = year_pillar(moment);
    let month = month_pillar(moment, year);

    let civil_day = day_pillar(moment.date());
    let late_zi = moment.hour() == 23;
    let next_day = civil_day.offset(1);
    let day = if late_zi && rule == ZiHourRule::NextDay { next_day } else { civil_day };
    let hour = hour_pillar(moment.hour(), if late_zi { next_day } else { civil_day });

    FourPillars { year, month, day, hour }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lunar::{LunarCalendar, LunarDate};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        civil_moment(y, m, d, h, min).unwrap()
    }

    fn pillars(y: i32, m: u32, d: u32, h: u32, min: u32) -> String {
        four_pillars(at(y, m, d, h, min), ZiHourRule::SameDay).unwrap().to_string()
    }

    #[test]
    fn test_known_day_pillars() {
        assert_eq!(day_pillar(NaiveDate::from_ymd_opt(1949, 10, 1).unwrap()).to_string(), "甲子");
        assert_eq!(day_pillar(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()).to_string(), "戊午");
        assert_eq!(day_pillar(NaiveDate::from_ymd_opt(1990, 5, 15).unwrap()).to_string(), "庚辰");
    }

    #[test]
    fn test_golden_charts() {
        assert_eq!(pillars(1990, 5, 15, 8, 30), "庚午 辛巳 庚辰 庚辰");
        assert_eq!(pillars(2000, 1, 1, 0, 0), "己卯 丙子 戊午 壬子");
        assert_eq!(pillars(1949, 10, 1, 15, 0), "己丑 癸酉 甲子 壬申");
        assert_eq!(pillars(2023, 12, 25, 10, 15), "癸卯 甲子 丁巳 乙巳");
    }

    #[test]
    fn test_year_and_month_switch_at_lichun() {
        // 立春 2024 falls at 16:27 China time on February 4th
        assert_eq!(pillars(2024, 2, 4, 16, 0), "癸卯 乙丑 戊戌 庚申");
        assert_eq!(pillars(2024, 2, 4, 17, 0), "甲辰 丙寅 戊戌 辛酉");
        assert_eq!(pillars(1984, 2, 2, 12, 0), "癸亥 乙丑 丙寅 甲午");
        assert_eq!(pillars(1984, 2, 5, 12, 0), "甲子 丙寅 己巳 庚午");
    }

    #[test]
    fn test_late_zi_hour_rules() {
        let moment = at(1990, 5, 15, 23, 30);
        let same = four_pillars(moment, ZiHourRule::SameDay).unwrap();
        assert_eq!(same.day.to_string(), "庚辰");
        assert_eq!(same.hour.to_string(), "戊子");

        let next = four_pillars(moment, ZiHourRule::NextDay).unwrap();
        assert_eq!(next.day.to_string(), "辛巳");
        assert_eq!(next.hour.to_string(), "戊子");
        assert_eq!(next.year, same.year);
        assert_eq!(next.month, same.month);
    }

    #[test]
    fn test_hour_pillar_cycle() {
        let jia_day: GanZhi = "甲子".parse().unwrap();
        assert_eq!(hour_pillar(0, jia_day).to_string(), "甲子");
        assert_eq!(hour_pillar(12, jia_day).to_string(), "庚午");
        let geng_day: GanZhi = "庚辰".parse().unwrap();
        assert_eq!(hour_pillar(8, geng_day).to_string(), "庚辰");
        assert_eq!(hour_pillar(22, geng_day).to_string(), "丁亥");
    }

    #[test]
    fn test_lunar_input_matches_solar() {
        let calendar = LunarCalendar::new();
        let lunar = lunar_four_pillars(&calendar, LunarDate::new(1990, 4, 21), 8, 30, ZiHourRule::SameDay).unwrap();
        let solar = four_pillars(at(1990, 5, 15, 8, 30), ZiHourRule::SameDay).unwrap();
        assert_eq!(lunar, solar);
    }

    #[test]
    fn test_last_lunar_month_of_range_crosses_into_next_year() {
        let calendar = LunarCalendar::new();
        let date = LunarDate::new(2100, 12, 29);
        let solar = calendar.to_solar(date).unwrap();
        assert_eq!(solar.year(), 2101);

        let pillars = lunar_four_pillars(&calendar, date, 12, 0, ZiHourRule::SameDay).unwrap();
        // Before 立春 2101, so still the 庚申 year in its 丑 month
        assert_eq!(pillars.year, GanZhi::for_year(2100));
        assert_eq!(pillars.month.to_string(), "己丑");
        assert_eq!(pillars.day, day_pillar(solar));

        // Solar input keeps the Gregorian bound
        assert!(matches!(
            four_pillars(solar.and_hms_opt(12, 0, 0).unwrap(), ZiHourRule::SameDay),
            Err(CalendarError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_civil_moment_validation() {
        assert!(matches!(civil_moment(2023, 2, 29, 0, 0), Err(CalendarError::InvalidSolarDate(_))));
        assert!(matches!(civil_moment(2024, 2, 29, 24, 0), Err(CalendarError::InvalidTime { .. })));
        assert!(matches!(
            four_pillars(at(1899, 6, 1, 0, 0), ZiHourRule::SameDay),
            Err(CalendarError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_zi_hour_rule_parse() {
        assert_eq!("same-day".parse::<ZiHourRule>().unwrap(), ZiHourRule::SameDay);
        assert_eq!("NEXT-DAY".parse::<ZiHourRule>().unwrap(), ZiHourRule::NextDay);
        assert!("midnight".parse::<ZiHourRule>().is_err());
    }
}
