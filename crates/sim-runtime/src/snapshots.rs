//! Weekly attribute baselines and the character profile built on them.

use std::collections::BTreeMap;

use serde::Serialize;
use sim_core::{Attr, Character, WorldState};

/// Record every character's core attributes for the current week. Runs at
/// most once per week no matter how many shows follow.
pub fn snapshot_week_baseline_once(world: &mut WorldState) -> bool {
    if world.baseline.as_ref().is_some_and(|b| b.week == world.week) {
        return false;
    }
    let attrs = world
        .roster
        .iter()
        .map(|c| {
            let row = Attr::CORE.iter().map(|a| (a.key().to_string(), c.attr(*a))).collect();
            (c.name.clone(), row)
        })
        .collect();
    world.baseline = Some(sim_core::world::WeekBaseline {
        week: world.week,
        attrs,
    });
    true
}

/// Everything the profile screen shows for one character.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub character: Character,
    pub overall: i32,
    pub age: i32,
    pub titles: Vec<String>,
    /// Change of each core attribute since this week's baseline. Only
    /// non-zero entries are listed.
    pub deltas: BTreeMap<String, i32>,
}

pub fn profile(world: &WorldState, name: &str) -> Option<CharacterProfile> {
    let c = world.find(name)?;
    let base = world.baseline.as_ref().and_then(|b| b.attrs.get(name));
    let deltas = match base {
        Some(row) => Attr::CORE
            .iter()
            .filter_map(|a| {
                let d = c.attr(*a) - row.get(a.key()).copied().unwrap_or_else(|| c.attr(*a));
                (d != 0).then(|| (a.key().to_string(), d))
            })
            .collect(),
        None => BTreeMap::new(),
    };
    Some(CharacterProfile {
        character: c.clone(),
        overall: c.overall(),
        age: c.age_on(world.sim_date()),
        titles: c.champion_of.clone(),
        deltas,
    })
}
