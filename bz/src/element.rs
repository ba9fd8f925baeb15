//! The five element categories (五行) and their stem/branch partition

use lunarcal::{Branch, Stem};
use serde::{Deserialize, Serialize};

/// One of the five classical element categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [Element::Wood, Element::Fire, Element::Earth, Element::Metal, Element::Water];

    /// Bare English category name
    pub fn name(self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Fire => "Fire",
            Self::Earth => "Earth",
            Self::Metal => "Metal",
            Self::Water => "Water",
        }
    }

    pub fn chinese(self) -> char {
        match self {
            Self::Wood => '木',
            Self::Fire => '火',
            Self::Earth => '土',
            Self::Metal => '金',
            Self::Water => '水',
        }
    }

    /// Bilingual display label, e.g. `Wood (木)`
    pub fn label(self) -> String {
        format!("{} ({})", self.name(), self.chinese())
    }

    /// Element of a Heavenly Stem (two stems per element)
    pub fn of_stem(stem: Stem) -> Self {
        match stem {
            Stem::Jia | Stem::Yi => Self::Wood,
            Stem::Bing | Stem::Ding => Self::Fire,
            Stem::Wu | Stem::Ji => Self::Earth,
            Stem::Geng | Stem::Xin => Self::Metal,
            Stem::Ren | Stem::Gui => Self::Water,
        }
    }

    /// Element of an Earthly Branch (Earth holds the four seasonal tombs)
    pub fn of_branch(branch: Branch) -> Self {
        match branch {
            Branch::Yin | Branch::Mao => Self::Wood,
            Branch::Si | Branch::Wu => Self::Fire,
            Branch::Chen | Branch::Xu | Branch::Chou | Branch::Wei => Self::Earth,
            Branch::Shen | Branch::You => Self::Metal,
            Branch::Zi | Branch::Hai => Self::Water,
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(s) || s.chars().eq([e.chinese()]))
            .ok_or_else(|| format!("Unknown element: {}", s))
    }
}
