//! Chart model: four pillars plus categorical mappings
//!
//! Field names serialize in camelCase (`dayMaster`, `favorableElements`, ...)
//! so a chart can be handed verbatim to any downstream consumer.

use lunarcal::{Branch, GanZhi, Stem};
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::zodiac::Animal;

/// One time unit of the chart: a stem over a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pillar {
    pub gan: Stem,
    pub zhi: Branch,
    /// Element of the stem
    pub element: Element,
    /// Only set on the year pillar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal: Option<Animal>,
}

impl Pillar {
    pub fn new(gan: Stem, zhi: Branch) -> Self {
        Self {
            gan,
            zhi,
            element: Element::of_stem(gan),
            animal: None,
        }
    }

    /// A year pillar, carrying the zodiac animal of its branch
    pub fn year(gan: Stem, zhi: Branch) -> Self {
        Self {
            animal: Some(Animal::of_branch(zhi)),
            ..Self::new(gan, zhi)
        }
    }

    /// Position in the 60-step cycle, when stem and branch form a valid pair
    pub fn ganzhi(&self) -> Option<GanZhi> {
        GanZhi::from_parts(self.gan, self.zhi)
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.gan, self.zhi)
    }
}

/// Share of one element in a five-element breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveElementScore {
    pub name: Element,
    pub percentage: f64,
    pub score: f64,
}

/// A derived Bazi chart
///
/// The analytic fields start empty; they are filled only by a later
/// interpretation step, which is not part of derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    pub day_master: Stem,
    pub day_master_element: Element,
    pub zodiac: Animal,

    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub favorable_elements: Vec<Element>,
    #[serde(default)]
    pub unfavorable_elements: Vec<Element>,
    #[serde(default)]
    pub missing_elements: Vec<Element>,
    #[serde(default)]
    pub lucky_colors: Vec<String>,
    #[serde(default)]
    pub lucky_numbers: Vec<u32>,
    #[serde(default)]
    pub five_elements: Vec<FiveElementScore>,
}

impl Chart {
    /// Assemble a chart from its four pillars; analytic fields stay empty
    pub fn from_pillars(year: Pillar, month: Pillar, day: Pillar, hour: Pillar) -> Self {
        let year = Pillar::year(year.gan, year.zhi);
        Self {
            day_master: day.gan,
            day_master_element: Element::of_stem(day.gan),
            zodiac: Animal::of_branch(year.zhi),
            year,
            month: Pillar::new(month.gan, month.zhi),
            day: Pillar::new(day.gan, day.zhi),
            hour: Pillar::new(hour.gan, hour.zhi),
            strength: String::new(),
            structure: String::new(),
            favorable_elements: Vec::new(),
            unfavorable_elements: Vec::new(),
            missing_elements: Vec::new(),
            lucky_colors: Vec::new(),
            lucky_numbers: Vec::new(),
            five_elements: Vec::new(),
        }
    }

    /// Pillars in year, month, day, hour order
    pub fn pillars(&self) -> [&Pillar; 4] {
        [&self.year, &self.month, &self.day, &self.hour]
    }

    /// Whether any interpretation has been attached
    pub fn is_analyzed(&self) -> bool {
        !self.strength.is_empty()
            || !self.structure.is_empty()
            || !self.favorable_elements.is_empty()
            || !self.unfavorable_elements.is_empty()
            || !self.missing_elements.is_empty()
            || !self.lucky_colors.is_empty()
            || !self.lucky_numbers.is_empty()
            || !self.five_elements.is_empty()
    }

    /// The eight characters, e.g. `庚午 辛巳 庚辰 庚辰`
    pub fn eight_characters(&self) -> String {
        self.pillars().iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ")
    }
}

impl std::fmt::Display for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.eight_characters())
    }
}
