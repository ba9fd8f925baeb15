//! Daily almanac (黄历): the calendrical facts of one civil day

use chrono::NaiveDate;
use lunarcal::{GanZhi, LunarCalendar, LunarDate, SolarTerm, TermMoment};
use serde::Serialize;
use tracing::debug;

use crate::error::ChartError;
use crate::zodiac::Animal;

/// Calendrical facts of a single day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Almanac {
    pub date: NaiveDate,
    pub lunar_date: LunarDate,
    /// Traditional rendering, e.g. `甲辰年正月初一`
    pub lunar_label: String,
    pub day_ganzhi: GanZhi,
    /// Sexagenary name of the lunar year
    pub year_ganzhi: GanZhi,
    pub zodiac: Animal,
    /// Term in effect at noon
    pub solar_term: SolarTerm,
    /// Term beginning during this day, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_today: Option<TermMoment>,
}

impl Almanac {
    pub fn for_date(calendar: &LunarCalendar, date: NaiveDate) -> Result<Self, ChartError> {
        let reject = |e: lunarcal::CalendarError| ChartError::CalculationFailed(e.to_string());

        let lunar_date = calendar.from_solar(date).map_err(reject)?;
        let term_today = lunarcal::term_on(date).map_err(reject)?;
        let noon = date
            .and_hms_opt(12, 0, 0)
            .ok_or_else(|| ChartError::CalculationFailed(format!("no noon on {}", date)))?;
        let year_ganzhi = lunar_date.year_ganzhi();

        let almanac = Self {
            date,
            lunar_label: lunar_date.chinese(),
            lunar_date,
            day_ganzhi: lunarcal::day_pillar(date),
            year_ganzhi,
            zodiac: Animal::of_branch(year_ganzhi.branch()),
            solar_term: lunarcal::term_in_effect(noon),
            term_today,
        };
        debug!(%date, lunar = %almanac.lunar_label, day = %almanac.day_ganzhi, "Built almanac");
        Ok(almanac)
    }
}
