//! Chart Deriver: birth data in, four-pillar chart out

use std::sync::Arc;

use lunarcal::ZiHourRule;
use thiserror::Error;
use tracing::{debug, warn};

use crate::chart::{Chart, Pillar};
use crate::converter::{CalendarConverter, CivilMoment, ConversionError, LunisolarConverter};
use crate::error::ChartError;
use crate::input::{BirthData, CalendarSystem, CivilDate, CivilTime};

/// Derives charts through an injected calendar converter
///
/// Holds no mutable state; one deriver can serve any number of threads.
#[derive(Clone)]
pub struct ChartDeriver {
    converter: Arc<dyn CalendarConverter>,
}

impl std::fmt::Debug for ChartDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartDeriver")
            .field("available", &self.converter.is_available())
            .finish()
    }
}

impl ChartDeriver {
    pub fn new(converter: Arc<dyn CalendarConverter>) -> Self {
        Self { converter }
    }

    /// Deriver backed by the built-in lunisolar engine
    pub fn lunisolar(rule: ZiHourRule) -> Self {
        Self::new(Arc::new(LunisolarConverter::new(rule)))
    }

    /// Derive the chart of a date and time in the given calendar system
    pub fn derive(&self, date: CivilDate, time: CivilTime, system: CalendarSystem) -> Result<Chart, ChartError> {
        if !self.converter.is_available() {
            warn!("Calendar converter is not available");
            return Err(ChartError::EngineUnavailable(
                "calendar conversion engine is not initialized".to_string(),
            ));
        }

        let moment = CivilMoment::new(date, time);
        let pillars = self.converter.convert(moment, system).map_err(|e| match e {
            ConversionError::Unavailable(msg) => ChartError::EngineUnavailable(msg),
            ConversionError::Rejected(msg) => ChartError::CalculationFailed(msg),
        })?;

        let chart = Chart::from_pillars(
            Pillar::year(pillars.year.0, pillars.year.1),
            Pillar::new(pillars.month.0, pillars.month.1),
            Pillar::new(pillars.day.0, pillars.day.1),
            Pillar::new(pillars.hour.0, pillars.hour.1),
        );
        debug!(%moment, %system, chart = %chart, day_master = %chart.day_master, "Derived chart");
        Ok(chart)
    }

    /// Derive from raw form fields (`YYYY-MM-DD`, `HH:mm`)
    pub fn derive_from_input(
        &self,
        date: Option<&str>,
        time: Option<&str>,
        system: CalendarSystem,
    ) -> Result<Chart, ChartError> {
        let birth = BirthData::parse(date, time, Default::default(), system)?;
        self.derive_birth(&birth)
    }

    pub fn derive_birth(&self, birth: &BirthData) -> Result<Chart, ChartError> {
        self.derive(birth.birth_date, birth.birth_time, birth.calendar_type)
    }

    /// Derive two charts independently, e.g. for a compatibility match
    pub fn derive_pair(&self, first: &BirthData, second: &BirthData) -> Result<(Chart, Chart), PairError> {
        let a = self.derive_birth(first).map_err(|source| PairError {
            person: Partner::First,
            source,
        })?;
        let b = self.derive_birth(second).map_err(|source| PairError {
            person: Partner::Second,
            source,
        })?;
        Ok((a, b))
    }
}

/// Which side of a pair failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partner {
    First,
    Second,
}

impl std::fmt::Display for Partner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "person A"),
            Self::Second => write!(f, "person B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Chart for {person} failed: {source}")]
pub struct PairError {
    pub person: Partner,
    #[source]
    pub source: ChartError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::SexagenaryPillars;
    use crate::element::Element;
    use crate::error::InputField;
    use crate::input::Gender;
    use crate::zodiac::Animal;
    use lunarcal::{Branch, Stem};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OfflineConverter;

    impl CalendarConverter for OfflineConverter {
        fn is_available(&self) -> bool {
            false
        }

        fn convert(&self, _: CivilMoment, _: CalendarSystem) -> Result<SexagenaryPillars, ConversionError> {
            panic!("convert must not be called on an unavailable engine");
        }
    }

    struct RejectingConverter;

    impl CalendarConverter for RejectingConverter {
        fn is_available(&self) -> bool {
            true
        }

        fn convert(&self, moment: CivilMoment, _: CalendarSystem) -> Result<SexagenaryPillars, ConversionError> {
            Err(ConversionError::Rejected(format!("no such day: {}", moment.date)))
        }
    }

    /// Reports ready but loses the engine mid-call
    struct UnreachableConverter;

    impl CalendarConverter for UnreachableConverter {
        fn is_available(&self) -> bool {
            true
        }

        fn convert(&self, _: CivilMoment, _: CalendarSystem) -> Result<SexagenaryPillars, ConversionError> {
            Err(ConversionError::Unavailable("engine connection lost".to_string()))
        }
    }

    /// Always returns the same pillars and counts calls
    struct FixedConverter {
        calls: AtomicUsize,
    }

    impl CalendarConverter for FixedConverter {
        fn is_available(&self) -> bool {
            true
        }

        fn convert(&self, _: CivilMoment, _: CalendarSystem) -> Result<SexagenaryPillars, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SexagenaryPillars {
                year: (Stem::Jia, Branch::Chen),
                month: (Stem::Bing, Branch::Yin),
                day: (Stem::Ren, Branch::Zi),
                hour: (Stem::Geng, Branch::Zi),
            })
        }
    }

    fn birth(date: &str, time: &str) -> BirthData {
        BirthData::parse(Some(date), Some(time), Gender::Male, CalendarSystem::Solar).unwrap()
    }

    #[test]
    fn test_derive_golden_fixtures() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        let cases = [
            ("1990-05-15", "08:30", "庚午 辛巳 庚辰 庚辰"),
            ("2000-01-01", "00:00", "己卯 丙子 戊午 壬子"),
            ("1949-10-01", "15:00", "己丑 癸酉 甲子 壬申"),
            ("2024-02-04", "16:00", "癸卯 乙丑 戊戌 庚申"),
            ("2024-02-04", "17:00", "甲辰 丙寅 戊戌 辛酉"),
        ];
        for (date, time, expected) in cases {
            let chart = deriver.derive_from_input(Some(date), Some(time), CalendarSystem::Solar).unwrap();
            assert_eq!(chart.eight_characters(), expected, "{} {}", date, time);
        }
    }

    #[test]
    fn test_derive_categories() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        let chart = deriver.derive_birth(&birth("1990-05-15", "08:30")).unwrap();
        assert_eq!(chart.day_master, Stem::Geng);
        assert_eq!(chart.day_master_element, Element::Metal);
        assert_eq!(chart.zodiac, Animal::Horse);
        assert_eq!(chart.year.animal, Some(Animal::Horse));
        assert!(!chart.is_analyzed());
    }

    #[test]
    fn test_derive_lunar_input() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        let lunar = deriver
            .derive_from_input(Some("1990-04-21"), Some("08:30"), CalendarSystem::Lunar)
            .unwrap();
        let solar = deriver
            .derive_from_input(Some("1990-05-15"), Some("08:30"), CalendarSystem::Solar)
            .unwrap();
        assert_eq!(lunar, solar);
    }

    #[test]
    fn test_derive_lunar_input_at_end_of_range() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        // Last month of lunar 2100 falls in January 2101
        let chart = deriver
            .derive_from_input(Some("2100-12-29"), Some("12:00"), CalendarSystem::Lunar)
            .unwrap();
        let solar = lunarcal::LunarCalendar::new()
            .to_solar(lunarcal::LunarDate::new(2100, 12, 29))
            .unwrap();
        let day = lunarcal::day_pillar(solar);

        assert_eq!(chart.year.to_string(), "庚申");
        assert_eq!(chart.month.to_string(), "己丑");
        assert_eq!((chart.day.gan, chart.day.zhi), (day.stem(), day.branch()));
        assert_eq!(chart.zodiac, Animal::Monkey);

        // The same day entered as a Gregorian date is out of range
        let err = deriver
            .derive_from_input(Some(&solar.to_string()), Some("12:00"), CalendarSystem::Solar)
            .unwrap_err();
        assert!(matches!(err, ChartError::CalculationFailed(_)));
    }

    #[test]
    fn test_time_with_seconds() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        let with_seconds = deriver
            .derive_from_input(Some("1990-05-15"), Some("08:30:00"), CalendarSystem::Solar)
            .unwrap();
        let without = deriver
            .derive_from_input(Some("1990-05-15"), Some("08:30"), CalendarSystem::Solar)
            .unwrap();
        assert_eq!(with_seconds, without);
    }

    #[test]
    fn test_missing_input_names_field() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);

        let err = deriver.derive_from_input(None, Some("08:30"), CalendarSystem::Solar).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Date));

        let err = deriver.derive_from_input(Some("1990-05-15"), None, CalendarSystem::Solar).unwrap_err();
        assert_eq!(err.field(), Some(InputField::Time));

        let err = deriver
            .derive_from_input(Some("1990-05-15"), Some("half past eight"), CalendarSystem::Solar)
            .unwrap_err();
        assert_eq!(err.field(), Some(InputField::Time));
    }

    #[test]
    fn test_unavailable_engine() {
        let deriver = ChartDeriver::new(Arc::new(OfflineConverter));
        let err = deriver.derive_birth(&birth("1990-05-15", "08:30")).unwrap_err();
        assert!(matches!(err, ChartError::EngineUnavailable(_)));
    }

    #[test]
    fn test_engine_lost_during_conversion() {
        let deriver = ChartDeriver::new(Arc::new(UnreachableConverter));
        let err = deriver.derive_birth(&birth("1990-05-15", "08:30")).unwrap_err();
        assert_eq!(err, ChartError::EngineUnavailable("engine connection lost".to_string()));
    }

    #[test]
    fn test_input_checked_before_engine() {
        let deriver = ChartDeriver::new(Arc::new(OfflineConverter));
        let err = deriver.derive_from_input(None, None, CalendarSystem::Solar).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_rejected_moment_keeps_message() {
        let deriver = ChartDeriver::new(Arc::new(RejectingConverter));
        let err = deriver.derive_birth(&birth("2023-02-30", "12:00")).unwrap_err();
        assert_eq!(err, ChartError::CalculationFailed("no such day: 2023-02-30".to_string()));
    }

    #[test]
    fn test_real_engine_rejects_impossible_dates() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        for (date, time, system) in [
            ("2023-02-30", "12:00", CalendarSystem::Solar),
            ("1850-06-01", "12:00", CalendarSystem::Solar),
            ("2023-05-15", "25:00", CalendarSystem::Solar),
            ("2023-13-01", "12:00", CalendarSystem::Lunar),
        ] {
            let err = deriver.derive_from_input(Some(date), Some(time), system).unwrap_err();
            assert!(matches!(err, ChartError::CalculationFailed(_)), "{} {}", date, time);
        }
    }

    #[test]
    fn test_injected_converter_builds_chart() {
        let converter = Arc::new(FixedConverter {
            calls: AtomicUsize::new(0),
        });
        let deriver = ChartDeriver::new(converter.clone());
        let chart = deriver.derive_birth(&birth("2024-03-01", "00:10")).unwrap();

        assert_eq!(chart.eight_characters(), "甲辰 丙寅 壬子 庚子");
        assert_eq!(chart.day_master_element, Element::Water);
        assert_eq!(chart.zodiac, Animal::Dragon);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_derive_pair_names_failing_person() {
        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        let good = birth("1990-05-15", "08:30");
        let bad = birth("2023-02-30", "12:00");

        let (a, b) = deriver.derive_pair(&good, &birth("1984-02-05", "12:00")).unwrap();
        assert_eq!(a.zodiac, Animal::Horse);
        assert_eq!(b.zodiac, Animal::Rat);

        let err = deriver.derive_pair(&good, &bad).unwrap_err();
        assert_eq!(err.person, Partner::Second);
        assert!(err.to_string().starts_with("Chart for person B failed"));

        let err = deriver.derive_pair(&bad, &good).unwrap_err();
        assert_eq!(err.person, Partner::First);
    }

    #[test]
    fn test_deriver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChartDeriver>();

        let deriver = ChartDeriver::lunisolar(ZiHourRule::SameDay);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let deriver = deriver.clone();
                std::thread::spawn(move || deriver.derive_birth(&birth("1990-05-15", "08:30")).unwrap())
            })
            .collect();
        let charts: Vec<Chart> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(charts.windows(2).all(|w| w[0] == w[1]));
    }
}
