//! LunarCal - Chinese lunisolar calendar engine
//!
//! Computes everything the traditional calendar needs from first principles:
//! solar term moments from the Sun's apparent longitude, lunar months from
//! new moons, and the sexagenary (stem-branch) pillars of any civil moment.
//! All civil times are China Standard Time (UTC+8).
//!
//! # Modules
//!
//! - [`astro`] - Julian days, ΔT, solar longitude, new moons
//! - [`ganzhi`] - Stems, branches and the 60-step cycle
//! - [`term`] - The 24 solar terms
//! - [`lunar`] - Lunar months and lunar/solar conversion
//! - [`pillar`] - Year, month, day and hour pillars
//!
//! # Example
//!
//! ```ignore
//! use lunarcal::{LunarCalendar, LunarDate, ZiHourRule, civil_moment, four_pillars};
//!
//! let moment = civil_moment(1990, 5, 15, 8, 30)?;
//! let pillars = four_pillars(moment, ZiHourRule::SameDay)?;
//! assert_eq!(pillars.to_string(), "庚午 辛巳 庚辰 庚辰");
//!
//! let calendar = LunarCalendar::new();
//! let solar = calendar.to_solar(LunarDate::new(1990, 4, 21))?;
//! ```

pub mod astro;
pub mod error;
pub mod ganzhi;
pub mod lunar;
pub mod pillar;
pub mod term;

pub use error::{CalendarError, Result};
pub use ganzhi::{Branch, GanZhi, Polarity, Stem};
pub use lunar::{LunarCalendar, LunarDate, LunarMonth, LunarYear};
pub use pillar::{FourPillars, ZiHourRule, civil_moment, day_pillar, four_pillars, lunar_four_pillars};
pub use term::{SolarTerm, TermMoment, term_in_effect, term_moment, term_on, terms_of_year};

/// First supported year (Gregorian and lunar)
pub const MIN_YEAR: i32 = 1900;

/// Last supported year (Gregorian and lunar)
pub const MAX_YEAR: i32 = 2100;

pub(crate) fn check_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::out_of_range(year))
    }
}
