//! The world aggregate: one save's entire mutable state, plus the repair
//! pass that hydrates older or partial saves and the read-only invariant
//! check.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::character::{Attr, Brand, Character, Role};
use crate::chemistry::{Chemistry, CHEM_MAX, CHEM_MIN};
use crate::clock;
use crate::records::{HistoryEntry, MatchRecord};
use crate::relationships::{RelationshipGraph, REL_CAP};
use crate::story::{StoryBook, StoryMap, HEAT_MAX};
use crate::titles::{self, TitleMap};

pub const SCHEMA_VERSION: u32 = 2;
/// Number of mentorship groups a save carries.
pub const MENTOR_SLOTS: usize = 5;
pub const MAX_MENTEES: usize = 3;
/// Weekly finance rows kept per brand.
pub const FINANCE_HISTORY_LIMIT: usize = 104;

/// Opening balance for each brand, in USD.
pub fn starting_cash() -> Decimal {
    Decimal::new(5_000_000, 0)
}

/// Crowd carry-over for a brand's next show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Afterglow {
    /// 0 = none, 1 = warm crowd, 2 = red-hot crowd.
    pub level: i32,
    /// Shows left before the crowd cools off.
    pub ttl: u32,
}

/// Repeat-penalty immunity: participant key -> weeks left.
pub type HotMap = BTreeMap<String, i32>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentorSlot {
    pub mentor: Option<String>,
    pub mentees: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxMessage {
    pub id: String,
    pub week: u32,
    #[serde(with = "clock::dmy")]
    pub date: NaiveDate,
    pub from: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub resolved: bool,
}

/// Snapshot of every character's core attributes, taken once per week
/// before the first show runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekBaseline {
    pub week: u32,
    /// Character -> attribute key -> value.
    pub attrs: BTreeMap<String, BTreeMap<String, i32>>,
}

/// One-shot data fix markers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationFlags {
    pub all_matches_v1: bool,
}

/// Revenue lines for one show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Revenue {
    pub tickets: Decimal,
    pub tv: Decimal,
    pub merch: Decimal,
    pub sponsorship: Decimal,
}

impl Revenue {
    pub fn total(&self) -> Decimal {
        self.tickets + self.tv + self.merch + self.sponsorship
    }
}

/// Expense lines for one show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expenses {
    pub payroll: Decimal,
    pub production: Decimal,
    pub travel: Decimal,
    pub medical: Decimal,
}

impl Expenses {
    pub fn total(&self) -> Decimal {
        self.payroll + self.production + self.travel + self.medical
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRow {
    pub week: u32,
    #[serde(with = "clock::dmy")]
    pub date: NaiveDate,
    pub attendance: u32,
    pub revenue: Revenue,
    pub expenses: Expenses,
    #[serde(default)]
    pub adjustments: Decimal,
    pub net: Decimal,
    pub cash_after: Decimal,
}

/// A one-off charge or credit applied with the next finance row for the
/// matching brand and week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAdjustment {
    pub brand: Brand,
    pub week: u32,
    /// Signed USD; negative is a charge.
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandBooks {
    pub cash: Decimal,
    #[serde(alias = "revenue")]
    pub revenue_total: Decimal,
    #[serde(alias = "expenses")]
    pub expense_total: Decimal,
    #[serde(alias = "adjustments")]
    pub adjustments_total: Decimal,
    /// Last week an overdraw warning went out.
    pub warned_negative_week: Option<u32>,
    pub history: Vec<FinanceRow>,
}

impl Default for BrandBooks {
    fn default() -> Self {
        Self {
            cash: starting_cash(),
            revenue_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            adjustments_total: Decimal::ZERO,
            warned_negative_week: None,
            history: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceLedger {
    #[serde(alias = "brand")]
    pub brands: BTreeMap<Brand, BrandBooks>,
    #[serde(alias = "pendingAdjustments")]
    pub pending: Vec<PendingAdjustment>,
}

/// Root aggregate. Exactly one exists per save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldState {
    pub schema_version: u32,
    /// Seed the week dice derive from.
    pub seed: u64,
    pub week: u32,
    #[serde(with = "clock::dmy")]
    pub start_date: NaiveDate,
    /// The brand the player books.
    #[serde(alias = "brand")]
    pub user_brand: Brand,
    pub roster: Vec<Character>,
    #[serde(alias = "champs")]
    pub titles: TitleMap,
    pub chemistry: Chemistry,
    pub relationships: RelationshipGraph,
    pub storylines: StoryMap,
    #[serde(alias = "matchHistory")]
    pub history: BTreeMap<Brand, Vec<HistoryEntry>>,
    /// Canonical records keyed by id.
    pub matches: BTreeMap<String, MatchRecord>,
    pub last_week_keys: BTreeMap<Brand, Vec<String>>,
    pub hot_matches: BTreeMap<Brand, HotMap>,
    pub afterglow: BTreeMap<Brand, Afterglow>,
    pub finances: FinanceLedger,
    pub mentorships: Vec<MentorSlot>,
    pub inbox: Vec<InboxMessage>,
    pub baseline: Option<WeekBaseline>,
    pub normalization: NormalizationFlags,
    pub match_seq: u64,
    pub mail_seq: u64,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            seed: 42,
            week: 1,
            start_date: clock::default_start_date(),
            user_brand: Brand::Raw,
            roster: Vec::new(),
            titles: TitleMap::new(),
            chemistry: Chemistry::default(),
            relationships: RelationshipGraph::default(),
            storylines: StoryMap::new(),
            history: BTreeMap::new(),
            matches: BTreeMap::new(),
            last_week_keys: BTreeMap::new(),
            hot_matches: BTreeMap::new(),
            afterglow: BTreeMap::new(),
            finances: FinanceLedger::default(),
            mentorships: vec![MentorSlot::default(); MENTOR_SLOTS],
            inbox: Vec::new(),
            baseline: None,
            normalization: NormalizationFlags::default(),
            match_seq: 0,
            mail_seq: 0,
        }
    }
}

impl WorldState {
    /// Simulated date of the current week.
    pub fn sim_date(&self) -> NaiveDate {
        clock::sim_date(self.start_date, self.week)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.roster.iter().position(|c| c.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&Character> {
        self.roster.iter().find(|c| c.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.roster.iter_mut().find(|c| c.name == name)
    }

    /// Characters signed to `brand`, retired or not.
    pub fn brand_roster(&self, brand: Brand) -> impl Iterator<Item = &Character> {
        self.roster.iter().filter(move |c| c.brand == brand)
    }

    /// Bookable characters on `brand`.
    pub fn available(&self, brand: Brand) -> impl Iterator<Item = &Character> {
        self.brand_roster(brand).filter(|c| c.is_available())
    }

    pub fn stories(&self, brand: Brand) -> Option<&StoryBook> {
        self.storylines.get(&brand)
    }

    pub fn stories_mut(&mut self, brand: Brand) -> &mut StoryBook {
        self.storylines.entry(brand).or_default()
    }

    pub fn books_mut(&mut self, brand: Brand) -> &mut BrandBooks {
        self.finances.brands.entry(brand).or_default()
    }

    /// Post a message to the top of the inbox.
    pub fn push_mail(&mut self, from: &str, title: &str, body: &str) {
        self.mail_seq += 1;
        let msg = InboxMessage {
            id: format!("mail-{}-{}", self.week, self.mail_seq),
            week: self.week,
            date: self.sim_date(),
            from: from.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            resolved: false,
        };
        self.inbox.insert(0, msg);
    }

    pub fn next_match_seq(&mut self) -> u64 {
        self.match_seq += 1;
        self.match_seq
    }

    /// Rebuild every derived `champion_of` list.
    pub fn refresh_champions(&mut self) {
        titles::set_champion_flags(&mut self.roster, &self.titles);
    }
}

/// World invariant violations.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Week numbers start at 1.
    #[error("week must be >= 1")]
    WeekZero,
    #[error("duplicate character name: {0}")]
    DuplicateName(String),
    #[error("{name}: {attr} = {value} is out of range")]
    AttrOutOfRange {
        name: String,
        attr: &'static str,
        value: i32,
    },
    #[error("{brand} {title} is held by someone not on {brand}")]
    CrossBrandTitle { brand: Brand, title: String },
    #[error("storyline {0} is malformed")]
    BadStoryline(String),
    #[error("relationship {0} is out of range")]
    RelationshipOutOfRange(String),
    #[error("chemistry {0} is out of range")]
    ChemistryOutOfRange(String),
    #[error("expected 5 mentorship slots, found {0}")]
    MentorSlots(usize),
    #[error("{0} has stale champion flags")]
    StaleChampionFlags(String),
    #[error("{0} is retired but still booked on a brand")]
    RetiredOnBrand(String),
}

const ALL_ATTRS: [Attr; 20] = [
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
    Attr::RingSafety,
    Attr::Professionalism,
    Attr::Adaptability,
    Attr::Morale,
    Attr::Fatigue,
];

/// Validate a single character's numeric traits.
pub fn validate_character(c: &Character) -> Result<(), ValidationError> {
    for a in ALL_ATTRS {
        let (lo, hi) = a.bounds();
        let v = c.attr(a);
        if !(lo..=hi).contains(&v) {
            return Err(ValidationError::AttrOutOfRange {
                name: c.name.clone(),
                attr: a.key(),
                value: v,
            });
        }
    }
    if c.role == Role::Retired && c.brand.is_competing() {
        return Err(ValidationError::RetiredOnBrand(c.name.clone()));
    }
    Ok(())
}

/// Check the world's invariants without mutating it.
pub fn validate_world(world: &WorldState) -> Result<(), ValidationError> {
    if world.week == 0 {
        return Err(ValidationError::WeekZero);
    }
    let mut seen = BTreeSet::new();
    for c in &world.roster {
        if !seen.insert(c.name.as_str()) {
            return Err(ValidationError::DuplicateName(c.name.clone()));
        }
        validate_character(c)?;
    }
    for (brand, belts) in &world.titles {
        for (title, h) in belts {
            let Some(h) = h else { continue };
            let ok = h
                .names()
                .iter()
                .all(|n| world.find(n).map(|c| c.brand) == Some(*brand));
            if !ok {
                return Err(ValidationError::CrossBrandTitle {
                    brand: *brand,
                    title: title.clone(),
                });
            }
        }
    }
    let mut flags = world.roster.clone();
    titles::set_champion_flags(&mut flags, &world.titles);
    for (fresh, stored) in flags.iter().zip(&world.roster) {
        let mut a = fresh.champion_of.clone();
        let mut b = stored.champion_of.clone();
        a.sort();
        b.sort();
        if a != b {
            return Err(ValidationError::StaleChampionFlags(stored.name.clone()));
        }
    }
    for book in world.storylines.values() {
        for s in &book.lines {
            let mut names = s.names.clone();
            names.sort();
            names.dedup();
            if names.len() < 2 || names.len() != s.names.len() || !(0..=HEAT_MAX).contains(&s.heat) {
                return Err(ValidationError::BadStoryline(s.key()));
            }
        }
    }
    for e in &world.relationships.edges {
        if e.a > e.b || !(-REL_CAP..=REL_CAP).contains(&e.level) {
            return Err(ValidationError::RelationshipOutOfRange(format!("{}__{}", e.a, e.b)));
        }
    }
    for (k, v) in &world.chemistry.0 {
        if !(CHEM_MIN..=CHEM_MAX).contains(v) {
            return Err(ValidationError::ChemistryOutOfRange(k.clone()));
        }
    }
    if world.mentorships.len() != MENTOR_SLOTS {
        return Err(ValidationError::MentorSlots(world.mentorships.len()));
    }
    Ok(())
}

/// Enforce the mentorship slot rules: exactly five groups, the first group
/// naming a mentor keeps them, mentees are never mentors and appear once,
/// at most three mentees, and every name must be on the roster.
pub fn normalize_mentorships(slots: &mut Vec<MentorSlot>, roster: &[Character]) {
    let known = |n: &str| roster.iter().any(|c| c.name == n);
    let mut mentors: BTreeSet<String> = BTreeSet::new();
    for s in slots.iter_mut() {
        match s.mentor.take() {
            Some(m) if known(&m) && mentors.insert(m.clone()) => s.mentor = Some(m),
            _ => {}
        }
    }
    let mut taken: BTreeSet<String> = BTreeSet::new();
    for s in slots.iter_mut() {
        let kept: Vec<String> = std::mem::take(&mut s.mentees)
            .into_iter()
            .filter(|n| known(n) && !mentors.contains(n) && taken.insert(n.clone()))
            .take(MAX_MENTEES)
            .collect();
        s.mentees = if s.mentor.is_some() { kept } else { Vec::new() };
    }
    slots.resize_with(MENTOR_SLOTS, MentorSlot::default);
    slots.truncate(MENTOR_SLOTS);
}

/// Hydrate a loaded or freshly built world in place: clamp every scalar,
/// fill per-brand maps, drop cross-brand holders and rebuild derived flags.
pub fn repair_world(world: &mut WorldState) {
    world.schema_version = SCHEMA_VERSION;
    world.week = world.week.max(1);

    let mut seen = BTreeSet::new();
    world.roster.retain(|c| {
        let fresh = seen.insert(c.name.clone());
        if !fresh {
            warn!(name = %c.name, "dropping duplicate roster entry");
        }
        fresh
    });
    for c in &mut world.roster {
        c.clamp_all();
        if c.retired && c.role == Role::Active {
            c.role = Role::Retired;
        }
        if c.role == Role::Retired {
            c.brand = Brand::FreeAgency;
        }
    }

    titles::fill_missing_titles(&mut world.titles);
    titles::strip_cross_brand_titles(&mut world.titles, &world.roster);
    world.refresh_champions();

    world.chemistry.clamp_all();
    world.relationships.repair();

    world.storylines.retain(|b, _| b.is_competing());
    for brand in Brand::COMPETING {
        world.storylines.entry(brand).or_default().repair();
        world.history.entry(brand).or_default();
        world.last_week_keys.entry(brand).or_default();
        world.hot_matches.entry(brand).or_default();
        world.afterglow.entry(brand).or_default();
        world.finances.brands.entry(brand).or_default();
    }
    for m in world.hot_matches.values_mut() {
        m.retain(|_, ttl| *ttl > 0);
    }
    for books in world.finances.brands.values_mut() {
        let excess = books.history.len().saturating_sub(FINANCE_HISTORY_LIMIT);
        books.history.drain(..excess);
    }

    normalize_mentorships(&mut world.mentorships, &world.roster);
    world.match_seq = world.match_seq.max(world.matches.len() as u64);
    debug!(week = world.week, roster = world.roster.len(), "world repaired");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::tests::sample;
    use crate::character::Gender;
    use crate::titles::{TitleHolder, WORLD_TITLE};

    fn small_world() -> WorldState {
        let mut w = WorldState::default();
        w.roster = vec![
            sample("Ace", Gender::Male, Brand::Raw),
            sample("Bolt", Gender::Male, Brand::SmackDown),
            sample("Cid", Gender::Male, Brand::Raw),
        ];
        repair_world(&mut w);
        w
    }

    #[test]
    fn repaired_world_validates() {
        let w = small_world();
        assert_eq!(validate_world(&w), Ok(()));
        assert_eq!(w.mentorships.len(), MENTOR_SLOTS);
        assert!(w.storylines.contains_key(&Brand::SmackDown));
        assert_eq!(w.finances.brands[&Brand::Raw].cash, starting_cash());
    }

    #[test]
    fn validate_flags_cross_brand_holder() {
        let mut w = small_world();
        w.titles
            .get_mut(&Brand::Raw)
            .unwrap()
            .insert(WORLD_TITLE.into(), Some(TitleHolder::Single("Bolt".into())));
        assert!(matches!(
            validate_world(&w),
            Err(ValidationError::CrossBrandTitle { .. })
        ));
        repair_world(&mut w);
        assert_eq!(validate_world(&w), Ok(()));
    }

    #[test]
    fn partial_save_hydrates() {
        let json = r#"{
            "week": 3,
            "brand": "SD",
            "roster": [{"name": "Ace", "gender": "M", "brand": "RAW", "momentum": 140}],
            "champs": {"RAW": {"World": "Ace"}}
        }"#;
        let mut w: WorldState = serde_json::from_str(json).unwrap();
        assert_eq!(w.user_brand, Brand::SmackDown);
        repair_world(&mut w);
        assert_eq!(w.roster[0].momentum, 99);
        assert_eq!(w.roster[0].champion_of, vec!["RAW World".to_string()]);
        assert_eq!(validate_world(&w), Ok(()));
    }

    #[test]
    fn mentorship_rules() {
        let w = small_world();
        let mut slots = vec![
            MentorSlot { mentor: Some("Ace".into()), mentees: vec!["Cid".into(), "Bolt".into(), "Ghost".into()] },
            MentorSlot { mentor: Some("Ace".into()), mentees: vec!["Cid".into()] },
            MentorSlot { mentor: Some("Cid".into()), mentees: vec![] },
        ];
        normalize_mentorships(&mut slots, &w.roster);
        assert_eq!(slots.len(), MENTOR_SLOTS);
        assert_eq!(slots[0].mentees, vec!["Bolt".to_string()]);
        assert_eq!(slots[1].mentor, None);
        assert_eq!(slots[2].mentor.as_deref(), Some("Cid"));
    }

    #[test]
    fn mail_is_newest_first() {
        let mut w = small_world();
        w.push_mail("Office", "One", "first");
        w.push_mail("Office", "Two", "second");
        assert_eq!(w.inbox[0].title, "Two");
        assert_ne!(w.inbox[0].id, w.inbox[1].id);
    }
}
