//! Opening roster, belts and relationships for a new season.
//!
//! The roster is fictional. Women are booked on RAW and cruiserweights on
//! SmackDown so every belt has a natural division.

use chrono::NaiveDate;

use crate::archetype::{build_character, BaseStats};
use crate::character::{Alignment, Brand, Character, Gender};
use crate::clock;
use crate::relationships::{EdgeFlags, RelType, RelationshipGraph};
use crate::titles::{fill_missing_titles, TitleHolder, TitleMap, TAG_TITLE, WOMEN_TITLE, WORLD_TITLE};

struct SeedEntry {
    name: &'static str,
    gender: Gender,
    brand: Brand,
    alignment: Alignment,
    born: (i32, u32, u32),
    /// sp, wr, cha, mic, psy, sta, dur, con, like, mom
    stats: [i32; 10],
    pro: i32,
    tags: &'static [&'static str],
}

use Alignment::{Face, Heel, Neutral};
use Brand::{FreeAgency as FA, Raw, SmackDown as SD};
use Gender::{Female as F, Male as M};

const SEED: &[SeedEntry] = &[
    SeedEntry { name: "Rex Calloway", gender: M, brand: Raw, alignment: Face, born: (1966, 3, 14), stats: [92, 86, 84, 82, 86, 80, 78, 84, 88, 70], pro: 84, tags: &["veteran", "technical"] },
    SeedEntry { name: "Dante Vox", gender: M, brand: Raw, alignment: Heel, born: (1972, 5, 2), stats: [90, 80, 92, 94, 82, 78, 76, 80, 70, 68], pro: 78, tags: &["showman"] },
    SeedEntry { name: "Marcus Stone", gender: M, brand: Raw, alignment: Face, born: (1970, 9, 21), stats: [82, 74, 72, 68, 74, 80, 88, 76, 80, 62], pro: 74, tags: &["powerhouse"] },
    SeedEntry { name: "Jet Rivera", gender: M, brand: Raw, alignment: Face, born: (1977, 8, 30), stats: [76, 84, 70, 64, 72, 86, 68, 72, 82, 60], pro: 70, tags: &["high flyer"] },
    SeedEntry { name: "Silas Crane", gender: M, brand: Raw, alignment: Heel, born: (1968, 11, 9), stats: [80, 88, 70, 76, 90, 78, 74, 86, 58, 58], pro: 82, tags: &["technical"] },
    SeedEntry { name: "Tommy Blaze", gender: M, brand: Raw, alignment: Face, born: (1974, 2, 17), stats: [72, 76, 74, 70, 70, 78, 76, 72, 76, 56], pro: 68, tags: &["striker"] },
    SeedEntry { name: "Gunnar Holt", gender: M, brand: Raw, alignment: Heel, born: (1965, 7, 4), stats: [78, 62, 64, 60, 70, 68, 90, 70, 54, 54], pro: 72, tags: &["giant"] },
    SeedEntry { name: "Kip Lawson", gender: M, brand: Raw, alignment: Face, born: (1976, 4, 11), stats: [74, 80, 70, 66, 74, 82, 72, 76, 78, 60], pro: 74, tags: &["tag specialist"] },
    SeedEntry { name: "Rory Lawson", gender: M, brand: Raw, alignment: Face, born: (1978, 6, 23), stats: [72, 82, 68, 62, 72, 84, 70, 74, 78, 60], pro: 72, tags: &["tag specialist", "high flyer"] },
    SeedEntry { name: "Vic Malone", gender: M, brand: Raw, alignment: Heel, born: (1971, 12, 1), stats: [70, 70, 72, 74, 68, 76, 84, 62, 50, 52], pro: 56, tags: &["hardcore"] },
    SeedEntry { name: "Owen Pike", gender: M, brand: Raw, alignment: Neutral, born: (1973, 10, 15), stats: [64, 72, 62, 60, 70, 76, 74, 74, 62, 50], pro: 76, tags: &["brawler"] },
    SeedEntry { name: "Lana Frost", gender: F, brand: Raw, alignment: Face, born: (1975, 12, 18), stats: [84, 78, 82, 76, 74, 78, 70, 76, 86, 66], pro: 80, tags: &["technical"] },
    SeedEntry { name: "Nikki Vale", gender: F, brand: Raw, alignment: Heel, born: (1977, 1, 29), stats: [78, 72, 80, 78, 70, 74, 70, 70, 60, 60], pro: 70, tags: &["showman"] },
    SeedEntry { name: "Tara Quinn", gender: F, brand: Raw, alignment: Face, born: (1979, 7, 7), stats: [72, 76, 70, 64, 68, 82, 66, 70, 78, 58], pro: 72, tags: &["high flyer"] },
    SeedEntry { name: "Jade Monroe", gender: F, brand: SD, alignment: Heel, born: (1974, 3, 3), stats: [70, 68, 74, 72, 70, 72, 74, 68, 56, 54], pro: 64, tags: &["powerhouse"] },
    SeedEntry { name: "Sasha Bloom", gender: F, brand: SD, alignment: Face, born: (1980, 5, 25), stats: [66, 64, 78, 74, 62, 74, 66, 64, 76, 52], pro: 70, tags: &["character"] },
    SeedEntry { name: "Cole Harrington", gender: M, brand: SD, alignment: Heel, born: (1967, 8, 12), stats: [90, 90, 82, 86, 90, 80, 76, 88, 66, 70], pro: 86, tags: &["technical", "veteran"] },
    SeedEntry { name: "Axel Ward", gender: M, brand: SD, alignment: Face, born: (1971, 4, 19), stats: [86, 78, 84, 80, 76, 82, 86, 78, 86, 66], pro: 76, tags: &["powerhouse"] },
    SeedEntry { name: "Duke Mercer", gender: M, brand: SD, alignment: Heel, born: (1964, 1, 27), stats: [80, 64, 70, 72, 72, 66, 92, 72, 52, 56], pro: 74, tags: &["giant"] },
    SeedEntry { name: "Eli Santos", gender: M, brand: Raw, alignment: Face, born: (1978, 9, 5), stats: [70, 82, 68, 60, 72, 86, 66, 74, 78, 60], pro: 74, tags: &["cruiser"] },
    SeedEntry { name: "Kenji Mori", gender: M, brand: SD, alignment: Face, born: (1976, 2, 8), stats: [68, 86, 60, 56, 80, 84, 68, 82, 72, 58], pro: 84, tags: &["cruiser", "technical"] },
    SeedEntry { name: "Wade Kessler", gender: M, brand: SD, alignment: Heel, born: (1969, 6, 30), stats: [76, 78, 72, 74, 76, 78, 80, 76, 58, 58], pro: 72, tags: &["striker"] },
    SeedEntry { name: "Sonny Reyes", gender: M, brand: SD, alignment: Heel, born: (1975, 11, 12), stats: [72, 78, 74, 70, 72, 80, 74, 74, 60, 60], pro: 70, tags: &["tag specialist"] },
    SeedEntry { name: "Lou Reyes", gender: M, brand: SD, alignment: Heel, born: (1973, 3, 22), stats: [70, 76, 70, 66, 74, 78, 76, 76, 58, 58], pro: 72, tags: &["tag specialist"] },
    SeedEntry { name: "Zane Hollis", gender: M, brand: SD, alignment: Face, born: (1979, 10, 2), stats: [74, 80, 72, 66, 66, 84, 64, 64, 80, 62], pro: 62, tags: &["daredevil"] },
    SeedEntry { name: "Carter Knox", gender: M, brand: SD, alignment: Neutral, born: (1972, 7, 16), stats: [74, 70, 82, 84, 72, 74, 72, 72, 66, 56], pro: 74, tags: &["character"] },
    SeedEntry { name: "Hugo Brandt", gender: M, brand: SD, alignment: Heel, born: (1970, 12, 24), stats: [66, 74, 60, 58, 74, 76, 78, 78, 52, 50], pro: 80, tags: &["technical"] },
    SeedEntry { name: "Ray Dalton", gender: M, brand: FA, alignment: Face, born: (1952, 6, 6), stats: [78, 70, 80, 82, 84, 60, 62, 80, 82, 50], pro: 88, tags: &["veteran"] },
    SeedEntry { name: "Petra Lind", gender: F, brand: FA, alignment: Neutral, born: (1981, 4, 4), stats: [60, 66, 66, 62, 60, 76, 68, 62, 64, 50], pro: 66, tags: &["striker"] },
];

fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(clock::default_birthday)
}

fn stats(s: [i32; 10]) -> BaseStats {
    BaseStats {
        star_power: s[0],
        work_rate: s[1],
        charisma: s[2],
        mic: s[3],
        psychology: s[4],
        stamina: s[5],
        durability: s[6],
        consistency: s[7],
        likeability: s[8],
        momentum: s[9],
    }
}

/// Move women to RAW and cruiserweights to SmackDown.
pub fn normalize_divisions(roster: &mut [Character]) {
    for c in roster.iter_mut() {
        if c.gender == Gender::Female && c.brand == Brand::SmackDown {
            c.brand = Brand::Raw;
        }
        if c.has_style("cruiser") && c.brand == Brand::Raw {
            c.brand = Brand::SmackDown;
        }
    }
}

pub fn seed_roster() -> Vec<Character> {
    let mut roster: Vec<Character> = SEED
        .iter()
        .map(|e| {
            let mut c = build_character(e.name, e.gender, e.brand, e.alignment, date(e.born), stats(e.stats), e.tags);
            c.professionalism = e.pro;
            c
        })
        .collect();
    normalize_divisions(&mut roster);
    roster
}

/// Opening champions. Applied before cross-brand holders are stripped.
pub fn champion_seed() -> TitleMap {
    let mut t = TitleMap::new();
    fill_missing_titles(&mut t);
    let single = |n: &str| Some(TitleHolder::Single(n.to_string()));
    let team = |a: &str, b: &str| Some(TitleHolder::Team([a.to_string(), b.to_string()]));
    let raw = [
        (WORLD_TITLE, single("Rex Calloway")),
        ("Intercontinental", single("Marcus Stone")),
        (TAG_TITLE, team("Kip Lawson", "Rory Lawson")),
        (WOMEN_TITLE, single("Lana Frost")),
    ];
    let sd = [
        (WORLD_TITLE, single("Cole Harrington")),
        ("United States", single("Axel Ward")),
        (TAG_TITLE, team("Sonny Reyes", "Lou Reyes")),
        ("Cruiserweight", single("Eli Santos")),
    ];
    for (brand, belts) in [(Brand::Raw, raw), (Brand::SmackDown, sd)] {
        let map = t.entry(brand).or_default();
        for (title, h) in belts {
            map.insert(title.to_string(), h);
        }
    }
    t
}

/// Pre-existing teams, feuds and friendships. Pairs with a missing member
/// are skipped.
pub fn seed_relationships(g: &mut RelationshipGraph, roster: &[Character]) {
    let k = EdgeFlags::KAYFABE;
    let b = EdgeFlags::BACKSTAGE;
    let seeds = [
        ("Kip Lawson", "Rory Lawson", RelType::Tag, 88, b),
        ("Kip Lawson", "Rory Lawson", RelType::Family, 80, b),
        ("Sonny Reyes", "Lou Reyes", RelType::Tag, 85, k),
        ("Rex Calloway", "Dante Vox", RelType::Rival, 75, k),
        ("Cole Harrington", "Axel Ward", RelType::Rival, 70, k),
        ("Lana Frost", "Nikki Vale", RelType::Rival, 65, k),
        ("Jet Rivera", "Eli Santos", RelType::Friend, 60, b),
        ("Kenji Mori", "Hugo Brandt", RelType::Friend, 55, b),
        ("Sasha Bloom", "Carter Knox", RelType::Romance, 40, k),
        ("Silas Crane", "Rex Calloway", RelType::Heat, 20, b),
    ];
    for (x, y, kind, level, flags) in seeds {
        let present = |n: &str| roster.iter().any(|c| c.name == n);
        if present(x) && present(y) {
            g.set(x, y, kind, level, flags);
        }
    }
}
