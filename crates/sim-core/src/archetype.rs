//! Derivation of a full attribute profile from ten base stats and a few
//! coarse style tags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::character::{Alignment, Brand, Character, Gender, Role};

/// The ten stats a seed entry provides. Everything else is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub star_power: i32,
    pub work_rate: i32,
    pub charisma: i32,
    pub mic: i32,
    pub psychology: i32,
    pub stamina: i32,
    pub durability: i32,
    pub consistency: i32,
    pub likeability: i32,
    pub momentum: i32,
}

impl BaseStats {
    /// Stock values for a character with no seed data, shaded by gender and
    /// alignment.
    pub fn defaults_for(gender: Gender, alignment: Alignment) -> Self {
        let mut b = BaseStats {
            star_power: 70,
            work_rate: 68,
            charisma: 66,
            mic: 66,
            psychology: 72,
            stamina: 76,
            durability: 74,
            consistency: 76,
            likeability: if alignment == Alignment::Heel { 62 } else { 70 },
            momentum: 56,
        };
        if gender == Gender::Female {
            b.charisma += 4;
            b.mic += 4;
            b.likeability += 4;
            b.work_rate -= 2;
        }
        if alignment == Alignment::Face {
            b.likeability += 4;
        }
        b
    }
}

fn has(tags: &[String], any: &[&str]) -> bool {
    tags.iter().any(|t| {
        let t = t.to_ascii_lowercase();
        any.iter().any(|a| t.contains(a))
    })
}

fn clamp30(v: f64) -> i32 {
    (v.round() as i32).clamp(30, 99)
}

/// Values derived from a base profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Derived {
    pub strength_power: i32,
    pub agility: i32,
    pub athleticism: i32,
    pub reputation: i32,
    pub chemistry: i32,
    pub ring_safety: i32,
}

/// Fill in the remaining physical and profile traits.
///
/// Power styles add strength, flyers add agility, tag specialists gel
/// faster, technicians work safer and hardcore or daredevil styles less so.
pub fn derive(b: &BaseStats, tags: &[String]) -> Derived {
    let wr = f64::from(b.work_rate);
    let sta = f64::from(b.stamina);
    let dur = f64::from(b.durability);
    let psy = f64::from(b.psychology);
    let con = f64::from(b.consistency);

    let mut strength = dur * 0.45 + wr * 0.15 + sta * 0.2;
    if has(tags, &["power", "giant"]) {
        strength += 10.0;
    }
    let mut agility = wr * 0.45 + sta * 0.25 + f64::from(b.charisma) * 0.05;
    if has(tags, &["high flyer", "cruiser", "daredevil"]) {
        agility += 10.0;
    }
    let strength = clamp30(strength);
    let agility = clamp30(agility);
    let athleticism = clamp30(f64::from(strength) * 0.4 + f64::from(agility) * 0.4 + sta * 0.2);
    let reputation = clamp30(con * 0.4 + psy * 0.35 + f64::from(b.star_power) * 0.25);
    let mut chemistry = psy * 0.55 + con * 0.35;
    if has(tags, &["tag specialist"]) {
        chemistry += 6.0;
    }
    let mut safety = dur * 0.45 + con * 0.30 + psy * 0.15 + sta * 0.10;
    if has(tags, &["technical", "veteran"]) {
        safety += 6.0;
    }
    if has(tags, &["hardcore", "daredevil"]) {
        safety -= 6.0;
    }
    Derived {
        strength_power: strength,
        agility,
        athleticism,
        reputation,
        chemistry: clamp30(chemistry),
        ring_safety: clamp30(safety),
    }
}

/// Build a character from seed data.
pub fn build_character(
    name: &str,
    gender: Gender,
    brand: Brand,
    alignment: Alignment,
    birthday: NaiveDate,
    base: BaseStats,
    tags: &[&str],
) -> Character {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    let d = derive(&base, &tags);
    let c30 = |v: i32| v.clamp(30, 99);
    Character {
        name: name.to_string(),
        gender,
        brand,
        alignment,
        birthday,
        work_rate: c30(base.work_rate),
        psychology: c30(base.psychology),
        charisma: c30(base.charisma),
        mic: c30(base.mic),
        chemistry: d.chemistry,
        star_power: c30(base.star_power),
        reputation: d.reputation,
        likeability: c30(base.likeability),
        consistency: c30(base.consistency),
        momentum: c30(base.momentum),
        stamina: c30(base.stamina),
        durability: c30(base.durability),
        strength_power: d.strength_power,
        agility: d.agility,
        athleticism: d.athleticism,
        ring_safety: d.ring_safety,
        professionalism: 70,
        adaptability: 65,
        morale: 65,
        fatigue: 10,
        injury_weeks: 0,
        retired: false,
        style_tags: tags,
        weeks_inactive: 0,
        role: Role::Active,
        champion_of: Vec::new(),
        contract: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_shade_by_gender_and_alignment() {
        let f = BaseStats::defaults_for(Gender::Female, Alignment::Face);
        assert_eq!(f.likeability, 78);
        assert_eq!(f.work_rate, 66);
        let h = BaseStats::defaults_for(Gender::Male, Alignment::Heel);
        assert_eq!(h.likeability, 62);
    }

    #[test]
    fn style_tags_shift_derived_traits() {
        let b = BaseStats::defaults_for(Gender::Male, Alignment::Neutral);
        let plain = derive(&b, &[]);
        let flyer = derive(&b, &["Daredevil".to_string()]);
        assert_eq!(flyer.agility, plain.agility + 10);
        assert!(flyer.ring_safety < plain.ring_safety);
        let tech = derive(&b, &["technical".to_string()]);
        assert!(tech.ring_safety > plain.ring_safety);
    }

    proptest! {
        #[test]
        fn derived_traits_stay_in_band(v in proptest::array::uniform10(0i32..=120)) {
            let b = BaseStats {
                star_power: v[0], work_rate: v[1], charisma: v[2], mic: v[3], psychology: v[4],
                stamina: v[5], durability: v[6], consistency: v[7], likeability: v[8], momentum: v[9],
            };
            let d = derive(&b, &["powerhouse".to_string(), "tag specialist".to_string()]);
            for x in [d.strength_power, d.agility, d.athleticism, d.reputation, d.chemistry, d.ring_safety] {
                prop_assert!((30..=99).contains(&x));
            }
        }
    }
}
