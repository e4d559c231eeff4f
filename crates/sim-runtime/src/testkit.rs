//! Shared fixtures for unit tests.

use chrono::NaiveDate;
use sim_core::{Alignment, Brand, Character, Gender, Role, WorldState};

pub(crate) fn fighter(name: &str, gender: Gender, brand: Brand) -> Character {
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

/// Four men and two women on RAW, two men on SmackDown, no belts held.
pub(crate) fn small_world() -> WorldState {
    let mut w = WorldState::default();
    w.roster = vec![
        fighter("Ace", Gender::Male, Brand::Raw),
        fighter("Bolt", Gender::Male, Brand::Raw),
        fighter("Cid", Gender::Male, Brand::Raw),
        fighter("Dax", Gender::Male, Brand::Raw),
        fighter("Eve", Gender::Female, Brand::Raw),
        fighter("Fay", Gender::Female, Brand::Raw),
        fighter("Gus", Gender::Male, Brand::SmackDown),
        fighter("Hal", Gender::Male, Brand::SmackDown),
    ];
    sim_core::repair_world(&mut w);
    w
}
