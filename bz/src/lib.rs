//! Bazi - Four-Pillars chart derivation
//!
//! Turns a birth date and time, given in the Gregorian or the lunar calendar,
//! into the four sexagenary pillars (year, month, day, hour) with their
//! element and zodiac mappings. Calendar conversion is delegated to an
//! injected [`CalendarConverter`]; the default one is backed by `lunarcal`.
//!
//! # Example
//!
//! ```ignore
//! use bazi::{CalendarSystem, ChartDeriver, ZiHourRule};
//!
//! let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
//! let chart = deriver.derive_from_input(Some("1990-05-15"), Some("08:30"), CalendarSystem::Solar)?;
//! assert_eq!(chart.eight_characters(), "庚午 辛巳 庚辰 庚辰");
//! assert_eq!(chart.day_master_element, bazi::Element::Metal);
//! ```

pub mod almanac;
pub mod chart;
pub mod cli;
pub mod config;
pub mod converter;
pub mod deriver;
pub mod element;
pub mod error;
pub mod history;
pub mod input;
pub mod zodiac;

pub use almanac::Almanac;
pub use chart::{Chart, FiveElementScore, Pillar};
pub use converter::{CalendarConverter, CivilMoment, ConversionError, LunisolarConverter, SexagenaryPillars};
pub use deriver::{ChartDeriver, PairError, Partner};
pub use element::Element;
pub use error::{ChartError, InputField};
pub use history::{DEFAULT_HISTORY_LIMIT, HistoryError, HistoryRecord, HistoryStore};
pub use input::{BirthData, CalendarSystem, CivilDate, CivilTime, Gender};
pub use lunarcal::{Branch, Stem, ZiHourRule};
pub use zodiac::Animal;
