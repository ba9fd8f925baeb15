//! Calendar conversion collaborator
//!
//! The deriver never computes pillars itself; it hands a civil moment to a
//! `CalendarConverter` and maps the result. `LunisolarConverter` is the
//! default engine, backed by the `lunarcal` crate.

use lunarcal::{Branch, CalendarError, FourPillars, LunarCalendar, LunarDate, Stem, ZiHourRule};
use thiserror::Error;
use tracing::debug;

use crate::input::{CalendarSystem, CivilDate, CivilTime};

/// A date and clock time as entered, in either calendar system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilMoment {
    pub date: CivilDate,
    pub time: CivilTime,
}

impl CivilMoment {
    pub fn new(date: CivilDate, time: CivilTime) -> Self {
        Self { date, time }
    }
}

impl std::fmt::Display for CivilMoment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// Stem and branch for each of the four time units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SexagenaryPillars {
    pub year: (Stem, Branch),
    pub month: (Stem, Branch),
    pub day: (Stem, Branch),
    pub hour: (Stem, Branch),
}

impl From<FourPillars> for SexagenaryPillars {
    fn from(p: FourPillars) -> Self {
        Self {
            year: (p.year.stem(), p.year.branch()),
            month: (p.month.stem(), p.month.branch()),
            day: (p.day.stem(), p.day.branch()),
            hour: (p.hour.stem(), p.hour.branch()),
        }
    }
}

/// Why a conversion produced no pillars
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The engine is not loaded or cannot be reached
    #[error("{0}")]
    Unavailable(String),

    /// The engine ran but refused the input moment
    #[error("{0}")]
    Rejected(String),
}

impl From<CalendarError> for ConversionError {
    fn from(err: CalendarError) -> Self {
        ConversionError::Rejected(err.to_string())
    }
}

/// Converts a civil moment into sexagenary pillars
pub trait CalendarConverter: Send + Sync {
    /// Whether the engine is ready to accept conversions
    fn is_available(&self) -> bool;

    fn convert(&self, moment: CivilMoment, system: CalendarSystem) -> Result<SexagenaryPillars, ConversionError>;
}

/// Default converter: astronomical lunisolar calendar, China Standard Time
#[derive(Debug, Default)]
pub struct LunisolarConverter {
    calendar: LunarCalendar,
    rule: ZiHourRule,
}

impl LunisolarConverter {
    pub fn new(rule: ZiHourRule) -> Self {
        Self {
            calendar: LunarCalendar::new(),
            rule,
        }
    }

    pub fn rule(&self) -> ZiHourRule {
        self.rule
    }

    /// The lunar calendar backing lunar-date conversions
    pub fn calendar(&self) -> &LunarCalendar {
        &self.calendar
    }
}

impl CalendarConverter for LunisolarConverter {
    fn is_available(&self) -> bool {
        true
    }

    fn convert(&self, moment: CivilMoment, system: CalendarSystem) -> Result<SexagenaryPillars, ConversionError> {
        let CivilMoment { date, time } = moment;
        let pillars = match system {
            CalendarSystem::Solar => {
                let civil = lunarcal::civil_moment(date.year, date.month, date.day, time.hour, time.minute)?;
                lunarcal::four_pillars(civil, self.rule)?
            }
            CalendarSystem::Lunar => {
                // Lunar input always refers to the regular month, never its leap repeat
                let lunar = LunarDate::new(date.year, date.month, date.day);
                lunarcal::lunar_four_pillars(&self.calendar, lunar, time.hour, time.minute, self.rule)?
            }
        };
        debug!(%moment, %system, %pillars, "Converted moment");
        Ok(pillars.into())
    }
}
