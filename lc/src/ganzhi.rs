//! Heavenly stems, earthly branches and the sexagenary cycle
//!
//! Stems and branches serialize as their Chinese characters (`"甲"`, `"子"`),
//! which is also how they are parsed back.

use serde::{Deserialize, Serialize};

/// Yin/Yang polarity of a stem or branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    fn from_position(index: usize) -> Self {
        if index % 2 == 0 { Polarity::Yang } else { Polarity::Yin }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yang => write!(f, "yang"),
            Self::Yin => write!(f, "yin"),
        }
    }
}

/// One of the 10 Heavenly Stems, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

const STEM_CHARS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];
const STEM_PINYIN: [&str; 10] = ["Jia", "Yi", "Bing", "Ding", "Wu", "Ji", "Geng", "Xin", "Ren", "Gui"];

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    /// Stem at a cycle position (taken modulo 10)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 10]
    }

    /// Zero-based position in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn chinese(self) -> char {
        STEM_CHARS[self.index()]
    }

    pub fn pinyin(self) -> &'static str {
        STEM_PINYIN[self.index()]
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_position(self.index())
    }

    /// Look up a stem by its Chinese character
    pub fn from_char(c: char) -> Option<Self> {
        STEM_CHARS.iter().position(|&s| s == c).map(Self::from_index)
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.chinese())
    }
}

impl std::str::FromStr for Stem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(stem) = Self::from_char(c)
        {
            return Ok(stem);
        }
        STEM_PINYIN
            .iter()
            .position(|p| p.eq_ignore_ascii_case(s))
            .map(Self::from_index)
            .ok_or_else(|| format!("Unknown stem: {}", s))
    }
}

impl From<Stem> for String {
    fn from(stem: Stem) -> Self {
        stem.chinese().to_string()
    }
}

impl TryFrom<String> for Stem {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One of the 12 Earthly Branches, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

const BRANCH_CHARS: [char; 12] = ['子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥'];
const BRANCH_PINYIN: [&str; 12] = [
    "Zi", "Chou", "Yin", "Mao", "Chen", "Si", "Wu", "Wei", "Shen", "You", "Xu", "Hai",
];

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    /// Branch at a cycle position (taken modulo 12)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Zero-based position in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn chinese(self) -> char {
        BRANCH_CHARS[self.index()]
    }

    pub fn pinyin(self) -> &'static str {
        BRANCH_PINYIN[self.index()]
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_position(self.index())
    }

    /// Branch governing a clock hour (two-hour watches, 23:00 opens Zi)
    pub fn for_hour(hour: u32) -> Self {
        Self::from_index(((hour as usize) + 1) / 2)
    }

    /// Look up a branch by its Chinese character
    pub fn from_char(c: char) -> Option<Self> {
        BRANCH_CHARS.iter().position(|&b| b == c).map(Self::from_index)
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.chinese())
    }
}

impl std::str::FromStr for Branch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(branch) = Self::from_char(c)
        {
            return Ok(branch);
        }
        BRANCH_PINYIN
            .iter()
            .position(|p| p.eq_ignore_ascii_case(s))
            .map(Self::from_index)
            .ok_or_else(|| format!("Unknown branch: {}", s))
    }
}

impl From<Branch> for String {
    fn from(branch: Branch) -> Self {
        branch.chinese().to_string()
    }
}

impl TryFrom<String> for Branch {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A position in the 60-step sexagenary cycle (0 = 甲子, 59 = 癸亥)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GanZhi(u8);

impl GanZhi {
    /// Cycle position, taken modulo 60 (negative values wrap)
    pub fn from_index(index: i64) -> Self {
        Self(index.rem_euclid(60) as u8)
    }

    /// Combine a stem and a branch; `None` when their parities differ
    pub fn from_parts(stem: Stem, branch: Branch) -> Option<Self> {
        let (s, b) = (stem.index() as i64, branch.index() as i64);
        if s % 2 != b % 2 {
            return None;
        }
        Some(Self::from_index(6 * s - 5 * b))
    }

    /// Position of a Gregorian-numbered sexagenary year (1984 = 甲子)
    pub fn for_year(year: i32) -> Self {
        Self::from_index(year as i64 - 4)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn stem(self) -> Stem {
        Stem::from_index(self.index())
    }

    pub fn branch(self) -> Branch {
        Branch::from_index(self.index())
    }

    /// The position `steps` further along the cycle
    pub fn offset(self, steps: i64) -> Self {
        Self::from_index(self.0 as i64 + steps)
    }
}

impl std::fmt::Display for GanZhi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.stem(), self.branch())
    }
}

impl std::str::FromStr for GanZhi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(format!("Expected a stem and a branch: {}", s));
        }
        let stem = Stem::from_char(chars[0]).ok_or_else(|| format!("Unknown stem: {}", chars[0]))?;
        let branch = Branch::from_char(chars[1]).ok_or_else(|| format!("Unknown branch: {}", chars[1]))?;
        Self::from_parts(stem, branch).ok_or_else(|| format!("Not a sexagenary pair: {}", s))
    }
}

impl From<GanZhi> for String {
    fn from(gz: GanZhi) -> Self {
        gz.to_string()
    }
}

impl TryFrom<String> for GanZhi {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
