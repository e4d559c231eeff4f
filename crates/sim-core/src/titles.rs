//! Championship belts, their holders, and the derived champion flags.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::character::{Brand, Character};

/// Name of the tag-team belt on both brands.
pub const TAG_TITLE: &str = "Tag";
pub const WORLD_TITLE: &str = "World";
pub const WOMEN_TITLE: &str = "Women";

/// Belts each brand defends, in display order.
pub fn titles_for(brand: Brand) -> &'static [&'static str] {
    match brand {
        Brand::Raw => &[WORLD_TITLE, "Intercontinental", TAG_TITLE, WOMEN_TITLE],
        Brand::SmackDown => &[WORLD_TITLE, "United States", TAG_TITLE, "Cruiserweight"],
        Brand::FreeAgency => &[],
    }
}

pub fn is_tag_title(title: &str) -> bool {
    title == TAG_TITLE
}

/// A single champion or a two-person team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TitleHolder {
    Single(String),
    Team([String; 2]),
}

impl TitleHolder {
    pub fn names(&self) -> Vec<&str> {
        match self {
            TitleHolder::Single(n) => vec![n.as_str()],
            TitleHolder::Team([a, b]) => vec![a.as_str(), b.as_str()],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| *n == name)
    }

    /// True when the holder is exactly this set of names.
    pub fn same_set(&self, names: &[&str]) -> bool {
        let mine: BTreeSet<&str> = self.names().into_iter().collect();
        let theirs: BTreeSet<&str> = names.iter().copied().collect();
        mine == theirs
    }

    pub fn label(&self) -> String {
        self.names().join(" & ")
    }
}

/// Brand -> belt -> holder (`None` = vacant).
pub type TitleMap = BTreeMap<Brand, BTreeMap<String, Option<TitleHolder>>>;

/// Ensure every competing brand has an entry for each of its belts.
pub fn fill_missing_titles(titles: &mut TitleMap) {
    for brand in Brand::COMPETING {
        let belts = titles.entry(brand).or_default();
        for t in titles_for(brand) {
            belts.entry((*t).to_string()).or_insert(None);
        }
    }
    titles.retain(|b, _| b.is_competing());
}

pub fn holder<'a>(titles: &'a TitleMap, brand: Brand, title: &str) -> Option<&'a TitleHolder> {
    titles.get(&brand).and_then(|m| m.get(title)).and_then(Option::as_ref)
}

/// Recompute every character's `champion_of` list from the title map.
pub fn set_champion_flags(roster: &mut [Character], titles: &TitleMap) {
    let mut held: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (brand, belts) in titles {
        for (title, h) in belts {
            let Some(h) = h else { continue };
            for n in h.names() {
                held.entry(n).or_default().push(format!("{brand} {title}"));
            }
        }
    }
    for c in roster.iter_mut() {
        c.champion_of = held.remove(c.name.as_str()).unwrap_or_default();
    }
}

/// Vacate any belt whose holder is missing from the roster or no longer on
/// the belt's brand. Returns the vacated `(brand, title)` pairs.
pub fn strip_cross_brand_titles(titles: &mut TitleMap, roster: &[Character]) -> Vec<(Brand, String)> {
    let brand_of = |n: &str| roster.iter().find(|c| c.name == n).map(|c| c.brand);
    let mut vacated = Vec::new();
    for (brand, belts) in titles.iter_mut() {
        for (title, slot) in belts.iter_mut() {
            let valid = match slot {
                Some(h) => h.names().iter().all(|n| brand_of(n) == Some(*brand)),
                None => true,
            };
            if !valid {
                info!(%brand, %title, "vacating cross-brand title");
                *slot = None;
                vacated.push((*brand, title.clone()));
            }
        }
    }
    vacated
}

/// Vacate every belt the named character holds, alone or as part of a team.
pub fn vacate_holder(titles: &mut TitleMap, name: &str) -> Vec<(Brand, String)> {
    let mut vacated = Vec::new();
    for (brand, belts) in titles.iter_mut() {
        for (title, slot) in belts.iter_mut() {
            if slot.as_ref().is_some_and(|h| h.contains(name)) {
                *slot = None;
                vacated.push((*brand, title.clone()));
            }
        }
    }
    vacated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::tests::sample;
    use crate::character::Gender;

    #[test]
    fn holder_shapes_deserialize() {
        let single: Option<TitleHolder> = serde_json::from_str(r#""Ace""#).unwrap();
        let team: Option<TitleHolder> = serde_json::from_str(r#"["A","B"]"#).unwrap();
        let vacant: Option<TitleHolder> = serde_json::from_str("null").unwrap();
        assert_eq!(single, Some(TitleHolder::Single("Ace".into())));
        assert!(team.unwrap().same_set(&["B", "A"]));
        assert!(vacant.is_none());
    }

    #[test]
    fn cross_brand_holder_is_vacated() {
        let mut roster = vec![
            sample("Ace", Gender::Male, Brand::Raw),
            sample("Bolt", Gender::Male, Brand::SmackDown),
        ];
        let mut titles = TitleMap::new();
        fill_missing_titles(&mut titles);
        titles
            .get_mut(&Brand::Raw)
            .unwrap()
            .insert(WORLD_TITLE.into(), Some(TitleHolder::Single("Ace".into())));
        titles
            .get_mut(&Brand::Raw)
            .unwrap()
            .insert("Intercontinental".into(), Some(TitleHolder::Single("Bolt".into())));
        let gone = strip_cross_brand_titles(&mut titles, &roster);
        assert_eq!(gone, vec![(Brand::Raw, "Intercontinental".to_string())]);
        set_champion_flags(&mut roster, &titles);
        assert_eq!(roster[0].champion_of, vec!["RAW World".to_string()]);
        assert!(roster[1].champion_of.is_empty());
    }

    #[test]
    fn team_vacates_when_one_member_leaves() {
        let mut titles = TitleMap::new();
        fill_missing_titles(&mut titles);
        titles.get_mut(&Brand::SmackDown).unwrap().insert(
            TAG_TITLE.into(),
            Some(TitleHolder::Team(["A".into(), "B".into()])),
        );
        let gone = vacate_holder(&mut titles, "B");
        assert_eq!(gone.len(), 1);
        assert!(holder(&titles, Brand::SmackDown, TAG_TITLE).is_none());
    }
}
