//! Birth input types and parsing of form-style date/time strings

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, InputField};

/// Calendar system the birth date is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CalendarSystem {
    /// Gregorian (阳历)
    #[default]
    Solar,
    /// Traditional lunar calendar (阴历), non-leap months only
    Lunar,
}

impl std::fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solar => write!(f, "solar"),
            Self::Lunar => write!(f, "lunar"),
        }
    }
}

impl std::str::FromStr for CalendarSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solar" | "gregorian" => Ok(Self::Solar),
            "lunar" => Ok(Self::Lunar),
            _ => Err(format!("Unknown calendar: {}. Use: solar or lunar", s)),
        }
    }
}

/// Gender recorded with the birth data; it does not affect the pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(format!("Unknown gender: {}. Use: male or female", s)),
        }
    }
}

/// A calendar date in whichever system the caller uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivilDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CivilDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Parse `YYYY-MM-DD`; only checks that the parts are integers
    pub fn parse(value: &str) -> Result<Self, ChartError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ChartError::missing(InputField::Date));
        }

        let parts: Vec<&str> = value.split('-').collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(ChartError::unparseable(InputField::Date, value));
        };
        let bad = || ChartError::unparseable(InputField::Date, value);
        Ok(Self {
            year: year.parse().map_err(|_| bad())?,
            month: month.parse().map_err(|_| bad())?,
            day: day.parse().map_err(|_| bad())?,
        })
    }
}

impl std::fmt::Display for CivilDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A clock time (China Standard Time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivilTime {
    pub hour: u32,
    pub minute: u32,
}

impl CivilTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Parse `HH:mm` or `HH:mm:ss`; only checks that the parts are integers.
    /// Seconds are dropped.
    pub fn parse(value: &str) -> Result<Self, ChartError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ChartError::missing(InputField::Time));
        }

        let bad = || ChartError::unparseable(InputField::Time, value);
        let parts: Vec<&str> = value.split(':').collect();
        let (hour, minute) = match parts.as_slice() {
            [hour, minute] => (hour, minute),
            [hour, minute, seconds] => {
                seconds.parse::<u32>().map_err(|_| bad())?;
                (hour, minute)
            }
            _ => return Err(bad()),
        };
        Ok(Self {
            hour: hour.parse().map_err(|_| bad())?,
            minute: minute.parse().map_err(|_| bad())?,
        })
    }
}

impl std::fmt::Display for CivilTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Everything a user enters to request a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthData {
    pub birth_date: CivilDate,
    pub birth_time: CivilTime,
    pub gender: Gender,
    pub calendar_type: CalendarSystem,
}

impl BirthData {
    pub fn new(date: CivilDate, time: CivilTime, gender: Gender, calendar: CalendarSystem) -> Self {
        Self {
            birth_date: date,
            birth_time: time,
            gender,
            calendar_type: calendar,
        }
    }

    /// Parse form fields; the date is checked before the time
    pub fn parse(
        date: Option<&str>,
        time: Option<&str>,
        gender: Gender,
        calendar: CalendarSystem,
    ) -> Result<Self, ChartError> {
        let date = CivilDate::parse(date.ok_or(ChartError::missing(InputField::Date))?)?;
        let time = CivilTime::parse(time.ok_or(ChartError::missing(InputField::Time))?)?;
        Ok(Self::new(date, time, gender, calendar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(CivilDate::parse("1990-05-15").unwrap(), CivilDate::new(1990, 5, 15));
        assert_eq!(CivilDate::parse(" 2024-2-4 ").unwrap(), CivilDate::new(2024, 2, 4));
    }

    #[test]
    fn test_parse_date_errors_name_date() {
        for bad in ["", "   ", "1990/05/15", "1990-05", "1990-May-15", "1990-05-15-01"] {
            let err = CivilDate::parse(bad).unwrap_err();
            assert_eq!(err.field(), Some(InputField::Date), "input {:?}", bad);
        }
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(CivilTime::parse("08:30").unwrap(), CivilTime::new(8, 30));
        assert_eq!(CivilTime::parse("23:05").unwrap(), CivilTime::new(23, 5));
    }

    #[test]
    fn test_parse_time_drops_seconds() {
        assert_eq!(CivilTime::parse("08:30:00").unwrap(), CivilTime::new(8, 30));
        assert_eq!(CivilTime::parse("23:59:59").unwrap(), CivilTime::new(23, 59));
    }

    #[test]
    fn test_parse_time_errors_name_time() {
        for bad in ["", "8", "8h30", "aa:bb", "08:30:xx", "08:30:00:00"] {
            let err = CivilTime::parse(bad).unwrap_err();
            assert_eq!(err.field(), Some(InputField::Time), "input {:?}", bad);
        }
    }

    #[test]
    fn test_birth_data_missing_fields() {
        let err = BirthData::parse(None, Some("08:30"), Gender::Male, CalendarSystem::Solar).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Date));

        let err = BirthData::parse(Some("1990-05-15"), None, Gender::Male, CalendarSystem::Solar).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Time));

        // Both missing reports the date first
        let err = BirthData::parse(None, None, Gender::Female, CalendarSystem::Lunar).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Date));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Lunar".parse::<CalendarSystem>().unwrap(), CalendarSystem::Lunar);
        assert_eq!("gregorian".parse::<CalendarSystem>().unwrap(), CalendarSystem::Solar);
        assert!("julian".parse::<CalendarSystem>().is_err());
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
    }

    #[test]
    fn test_birth_data_serde_shape() {
        let birth = BirthData::new(
            CivilDate::new(1990, 5, 15),
            CivilTime::new(8, 30),
            Gender::Female,
            CalendarSystem::Solar,
        );
        let json = serde_json::to_value(birth).unwrap();
        assert_eq!(json["calendarType"], "Solar");
        assert_eq!(json["gender"], "Female");
        assert_eq!(json["birthDate"]["year"], 1990);
    }
}
