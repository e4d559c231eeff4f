//! Characters, brands and the typed attribute model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock;

/// One of the two competing shows, or the neutral free-agency pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Brand {
    #[serde(rename = "RAW")]
    Raw,
    #[serde(rename = "SmackDown", alias = "SD")]
    SmackDown,
    #[serde(rename = "Free Agency", alias = "FA")]
    FreeAgency,
}

impl Brand {
    /// The two brands that run weekly shows.
    pub const COMPETING: [Brand; 2] = [Brand::Raw, Brand::SmackDown];

    pub fn is_competing(self) -> bool {
        !matches!(self, Brand::FreeAgency)
    }

    /// The opposing show. Free agency has no rival and maps to itself.
    pub fn rival(self) -> Brand {
        match self {
            Brand::Raw => Brand::SmackDown,
            Brand::SmackDown => Brand::Raw,
            Brand::FreeAgency => Brand::FreeAgency,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Brand::Raw => "RAW",
            Brand::SmackDown => "SmackDown",
            Brand::FreeAgency => "Free Agency",
        }
    }

    /// Parse the short or long label used on the command line and in saves.
    pub fn parse(s: &str) -> Option<Brand> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Brand::Raw),
            "smackdown" | "sd" => Some(Brand::SmackDown),
            "free agency" | "fa" => Some(Brand::FreeAgency),
            _ => None,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hard matching constraint for singles and tag bouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// Soft matching modifier. Unknown labels read as neutral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Alignment {
    Face,
    Heel,
    #[default]
    Neutral,
}

impl From<String> for Alignment {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "face" => Alignment::Face,
            "heel" => Alignment::Heel,
            _ => Alignment::Neutral,
        }
    }
}

impl From<Alignment> for String {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::Face => "face",
            Alignment::Heel => "heel",
            Alignment::Neutral => "neutral",
        }
        .to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Active,
    Manager,
    Mentor,
    Personality,
    Retired,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Paid every week.
    #[default]
    Full,
    /// Paid only for weeks with an appearance.
    PerAppearance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Weekly salary in USD.
    pub salary: Decimal,
    pub weeks_remaining: u32,
    #[serde(default, rename = "type")]
    pub kind: ContractKind,
}

/// Every numeric trait a character carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attr {
    WorkRate,
    Psychology,
    Charisma,
    Mic,
    Chemistry,
    StarPower,
    Reputation,
    Likeability,
    Consistency,
    Momentum,
    Stamina,
    Durability,
    StrengthPower,
    Agility,
    Athleticism,
    RingSafety,
    Professionalism,
    Adaptability,
    Morale,
    Fatigue,
}

impl Attr {
    /// The fifteen attributes shown on a profile and snapshotted weekly.
    pub const CORE: [Attr; 15] = [
        Attr::WorkRate,
        Attr::Psychology,
        Attr::Charisma,
        Attr::Mic,
        Attr::Chemistry,
        Attr::StarPower,
        Attr::Reputation,
        Attr::Likeability,
        Attr::Consistency,
        Attr::Momentum,
        Attr::Stamina,
        Attr::Durability,
        Attr::StrengthPower,
        Attr::Agility,
        Attr::Athleticism,
    ];

    /// Inclusive bounds for the attribute.
    pub fn bounds(self) -> (i32, i32) {
        match self {
            Attr::Morale | Attr::Fatigue => (0, 100),
            _ => (0, 99),
        }
    }

    /// Save-file key for the attribute.
    pub fn key(self) -> &'static str {
        match self {
            Attr::WorkRate => "workrate",
            Attr::Psychology => "psychology",
            Attr::Charisma => "charisma",
            Attr::Mic => "mic",
            Attr::Chemistry => "chemistry",
            Attr::StarPower => "starpower",
            Attr::Reputation => "reputation",
            Attr::Likeability => "likeability",
            Attr::Consistency => "consistency",
            Attr::Momentum => "momentum",
            Attr::Stamina => "stamina",
            Attr::Durability => "durability",
            Attr::StrengthPower => "strengthPower",
            Attr::Agility => "agility",
            Attr::Athleticism => "athleticism",
            Attr::RingSafety => "ringSafety",
            Attr::Professionalism => "professionalism",
            Attr::Adaptability => "adaptability",
            Attr::Morale => "morale",
            Attr::Fatigue => "fatigue",
        }
    }

    /// Short label used in mentorship and progression reports.
    pub fn abbr(self) -> &'static str {
        match self {
            Attr::WorkRate => "WR",
            Attr::Psychology => "PSY",
            Attr::Charisma => "CHA",
            Attr::Mic => "MIC",
            Attr::Chemistry => "CHEM",
            Attr::StarPower => "SP",
            Attr::Reputation => "REP",
            Attr::Likeability => "LIKE",
            Attr::Consistency => "CON",
            Attr::Momentum => "MOM",
            Attr::Stamina => "STA",
            Attr::Durability => "DUR",
            Attr::StrengthPower => "STR",
            Attr::Agility => "AGI",
            Attr::Athleticism => "ATH",
            Attr::RingSafety => "SAFE",
            Attr::Professionalism => "PRO",
            Attr::Adaptability => "ADA",
            Attr::Morale => "Morale",
            Attr::Fatigue => "FAT",
        }
    }
}

fn d60() -> i32 {
    60
}
fn d65() -> i32 {
    65
}
fn d66() -> i32 {
    66
}
fn d70() -> i32 {
    70
}
fn d72() -> i32 {
    72
}
fn d74() -> i32 {
    74
}
fn d76() -> i32 {
    76
}
fn d10() -> i32 {
    10
}

/// Legacy saves stored held titles as a comma-joined string or null.
#[derive(Deserialize)]
#[serde(untagged)]
enum TitleList {
    One(String),
    Many(Vec<String>),
}

fn lenient_titles<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<TitleList> = Option::deserialize(de)?;
    Ok(match raw {
        None => Vec::new(),
        Some(TitleList::Many(v)) => v,
        Some(TitleList::One(s)) => s
            .split(", ")
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// A wrestler or on-screen personality. The name is the primary key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub gender: Gender,
    pub brand: Brand,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default = "clock::default_birthday", with = "clock::dmy")]
    pub birthday: NaiveDate,

    #[serde(rename = "workrate", default = "d60")]
    pub work_rate: i32,
    #[serde(default = "d72")]
    pub psychology: i32,
    #[serde(default = "d66")]
    pub charisma: i32,
    #[serde(default = "d66")]
    pub mic: i32,
    #[serde(default = "d60")]
    pub chemistry: i32,

    #[serde(rename = "starpower", default = "d60")]
    pub star_power: i32,
    #[serde(default = "d60")]
    pub reputation: i32,
    #[serde(default = "d60")]
    pub likeability: i32,
    #[serde(default = "d76")]
    pub consistency: i32,
    #[serde(default = "d60")]
    pub momentum: i32,

    #[serde(default = "d76")]
    pub stamina: i32,
    #[serde(default = "d74")]
    pub durability: i32,
    #[serde(default = "d65")]
    pub strength_power: i32,
    #[serde(default = "d65")]
    pub agility: i32,
    #[serde(default = "d65")]
    pub athleticism: i32,

    #[serde(default = "d70")]
    pub ring_safety: i32,
    #[serde(default = "d70")]
    pub professionalism: i32,
    #[serde(default = "d65")]
    pub adaptability: i32,
    #[serde(default = "d65")]
    pub morale: i32,
    #[serde(default = "d10")]
    pub fatigue: i32,
    #[serde(default)]
    pub injury_weeks: u32,
    #[serde(default)]
    pub retired: bool,

    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub weeks_inactive: u32,
    #[serde(default)]
    pub role: Role,
    /// Derived from the title map; recomputed after every title change.
    #[serde(default, deserialize_with = "lenient_titles")]
    pub champion_of: Vec<String>,
    #[serde(default)]
    pub contract: Option<Contract>,
}

impl Character {
    /// Uninjured and not retired.
    pub fn is_available(&self) -> bool {
        self.injury_weeks == 0 && !self.retired
    }

    pub fn attr(&self, a: Attr) -> i32 {
        match a {
            Attr::WorkRate => self.work_rate,
            Attr::Psychology => self.psychology,
            Attr::Charisma => self.charisma,
            Attr::Mic => self.mic,
            Attr::Chemistry => self.chemistry,
            Attr::StarPower => self.star_power,
            Attr::Reputation => self.reputation,
            Attr::Likeability => self.likeability,
            Attr::Consistency => self.consistency,
            Attr::Momentum => self.momentum,
            Attr::Stamina => self.stamina,
            Attr::Durability => self.durability,
            Attr::StrengthPower => self.strength_power,
            Attr::Agility => self.agility,
            Attr::Athleticism => self.athleticism,
            Attr::RingSafety => self.ring_safety,
            Attr::Professionalism => self.professionalism,
            Attr::Adaptability => self.adaptability,
            Attr::Morale => self.morale,
            Attr::Fatigue => self.fatigue,
        }
    }

    fn slot(&mut self, a: Attr) -> &mut i32 {
        match a {
            Attr::WorkRate => &mut self.work_rate,
            Attr::Psychology => &mut self.psychology,
            Attr::Charisma => &mut self.charisma,
            Attr::Mic => &mut self.mic,
            Attr::Chemistry => &mut self.chemistry,
            Attr::StarPower => &mut self.star_power,
            Attr::Reputation => &mut self.reputation,
            Attr::Likeability => &mut self.likeability,
            Attr::Consistency => &mut self.consistency,
            Attr::Momentum => &mut self.momentum,
            Attr::Stamina => &mut self.stamina,
            Attr::Durability => &mut self.durability,
            Attr::StrengthPower => &mut self.strength_power,
            Attr::Agility => &mut self.agility,
            Attr::Athleticism => &mut self.athleticism,
            Attr::RingSafety => &mut self.ring_safety,
            Attr::Professionalism => &mut self.professionalism,
            Attr::Adaptability => &mut self.adaptability,
            Attr::Morale => &mut self.morale,
            Attr::Fatigue => &mut self.fatigue,
        }
    }

    /// Set an attribute, clamped to its bounds.
    pub fn set_attr(&mut self, a: Attr, value: i32) {
        let (lo, hi) = a.bounds();
        *self.slot(a) = value.clamp(lo, hi);
    }

    /// Add `delta` with clamping and return the change actually applied.
    pub fn bump(&mut self, a: Attr, delta: i32) -> i32 {
        if delta == 0 {
            return 0;
        }
        let before = self.attr(a);
        self.set_attr(a, before + delta);
        self.attr(a) - before
    }

    /// Average of charisma and mic.
    pub fn promo_quality(&self) -> f64 {
        f64::from(self.charisma + self.mic) / 2.0
    }

    /// Fixed weighted blend shown as "OVR" on profiles.
    pub fn overall(&self) -> i32 {
        let o = f64::from(self.work_rate) * 0.30
            + f64::from(self.star_power) * 0.25
            + self.promo_quality() * 0.15
            + f64::from(self.momentum) * 0.10
            + f64::from(self.psychology) * 0.10
            + f64::from(self.consistency) * 0.10;
        (o.round() as i32).clamp(1, 99)
    }

    /// Age in whole years on the given simulated date.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        clock::age_on(self.birthday, today)
    }

    pub fn has_style(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.style_tags
            .iter()
            .any(|t| t.to_ascii_lowercase().contains(&needle))
    }

    /// Clamp every numeric trait back into range.
    pub fn clamp_all(&mut self) {
        for a in Attr::CORE {
            let v = self.attr(a);
            self.set_attr(a, v);
        }
        for a in [
            Attr::RingSafety,
            Attr::Professionalism,
            Attr::Adaptability,
            Attr::Morale,
            Attr::Fatigue,
        ] {
            let v = self.attr(a);
            self.set_attr(a, v);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample(name: &str, gender: Gender, brand: Brand) -> Character {
        Character {
            name: name.to_string(),
            gender,
            brand,
            alignment: Alignment::Neutral,
            birthday: NaiveDate::from_ymd_opt(1975, 1, 1).unwrap(),
            work_rate: 70,
            psychology: 70,
            charisma: 70,
            mic: 70,
            chemistry: 70,
            star_power: 70,
            reputation: 70,
            likeability: 70,
            consistency: 70,
            momentum: 60,
            stamina: 70,
            durability: 70,
            strength_power: 70,
            agility: 70,
            athleticism: 70,
            ring_safety: 70,
            professionalism: 70,
            adaptability: 65,
            morale: 65,
            fatigue: 0,
            injury_weeks: 0,
            retired: false,
            style_tags: vec![],
            weeks_inactive: 0,
            role: Role::Active,
            champion_of: vec![],
            contract: None,
        }
    }

    #[test]
    fn bump_reports_clamped_delta() {
        let mut c = sample("A", Gender::Male, Brand::Raw);
        c.momentum = 97;
        assert_eq!(c.bump(Attr::Momentum, 5), 2);
        assert_eq!(c.momentum, 99);
        c.fatigue = 98;
        assert_eq!(c.bump(Attr::Fatigue, 5), 2);
        assert_eq!(c.fatigue, 100);
    }

    #[test]
    fn legacy_character_shape_loads() {
        let json = r#"{
            "name": "Old Timer", "gender": "M", "brand": "SD",
            "alignment": "tweener", "birthday": "05-04-1956",
            "workrate": 81, "starpower": 77, "championOf": "SmackDown World"
        }"#;
        let c: Character = serde_json::from_str(json).unwrap();
        assert_eq!(c.brand, Brand::SmackDown);
        assert_eq!(c.alignment, Alignment::Neutral);
        assert_eq!(c.work_rate, 81);
        assert_eq!(c.champion_of, vec!["SmackDown World".to_string()]);
        assert_eq!(c.ring_safety, 70);
        assert_eq!(c.birthday, NaiveDate::from_ymd_opt(1956, 4, 5).unwrap());
    }

    #[test]
    fn overall_blend() {
        let c = sample("A", Gender::Male, Brand::Raw);
        // 70*0.9 + 60*0.1
        assert_eq!(c.overall(), 69);
    }
}
