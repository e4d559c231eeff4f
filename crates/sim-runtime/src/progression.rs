//! Weekly career drift: young workers grow, veterans wear down and anyone
//! left off television too long fades.

use std::collections::{BTreeMap, BTreeSet};

use sim_core::{Attr, Brand, Character, Dice, WorldState};
use tracing::debug;

/// Best segment score that counts as being used well.
pub const USED_WELL: i32 = 78;
pub const USED_ELITE: i32 = 88;
/// Below this age a worker is still developing.
pub const YOUNG_BELOW: i32 = 28;
/// Above this age a worker is declining.
pub const VETERAN_ABOVE: i32 = 36;

/// Apply a drift scaled down for very consistent workers.
fn nudge(c: &mut Character, a: Attr, delta: f64) -> i32 {
    let damp = 1.0 - f64::from((c.consistency - 70).max(0)) * 0.007;
    let d = (delta * damp).round() as i32;
    c.bump(a, d)
}

/// Run one week of progression for `brand`.
///
/// `appeared` holds the roster indices that were on tonight's show and
/// `best` their best segment score.
pub fn run_progression(
    world: &mut WorldState,
    brand: Brand,
    appeared: &BTreeSet<usize>,
    best: &BTreeMap<usize, i32>,
    dice: &mut dyn Dice,
) {
    let today = world.sim_date();
    for (i, c) in world.roster.iter_mut().enumerate() {
        if c.brand != brand || c.retired {
            continue;
        }
        let on_show = appeared.contains(&i);
        if on_show {
            c.weeks_inactive = 0;
        } else {
            c.weeks_inactive += 1;
        }
        let top = best.get(&i).copied().unwrap_or(0);
        let used_well = top >= USED_WELL;
        let age = c.age_on(today);
        let before = c.overall();

        if age < YOUNG_BELOW {
            let speed =
                1.0 + f64::from(c.adaptability - 60) * 0.01 + if used_well { 0.25 } else { 0.0 };
            if on_show {
                for (a, hi) in [
                    (Attr::WorkRate, 2),
                    (Attr::Psychology, 1),
                    (Attr::Athleticism, 2),
                    (Attr::Stamina, 2),
                    (Attr::Mic, 1),
                    (Attr::Charisma, 1),
                ] {
                    nudge(c, a, f64::from(dice.roll(0, hi)) * speed);
                }
            } else {
                if dice.chance(0.35) {
                    nudge(c, Attr::WorkRate, f64::from(dice.roll(0, 1)) * speed);
                }
                if dice.chance(0.30) {
                    nudge(c, Attr::Athleticism, f64::from(dice.roll(0, 1)) * speed);
                }
            }
        } else if age <= VETERAN_ABOVE {
            if used_well {
                nudge(c, Attr::WorkRate, f64::from(dice.roll(0, 2)));
                nudge(c, Attr::Psychology, f64::from(dice.roll(0, 1)));
            }
            if top >= USED_ELITE {
                nudge(c, Attr::Mic, f64::from(dice.roll(0, 1)));
                nudge(c, Attr::Charisma, f64::from(dice.roll(0, 1)));
            }
            if c.weeks_inactive >= 3 && dice.chance(0.40) {
                nudge(c, Attr::Momentum, f64::from(dice.roll(-4, -1)));
                nudge(c, Attr::WorkRate, f64::from(dice.roll(-1, 0)));
            }
        } else {
            let soften = 1.0 - f64::from((c.professionalism - 60).max(0)) * 0.012;
            if on_show {
                let ath = (f64::from(dice.roll(-2, -1)) * soften).round();
                nudge(c, Attr::Athleticism, ath);
                let sta = (f64::from(dice.roll(-2, -1)) * soften).round();
                nudge(c, Attr::Stamina, sta);
                let dur = (f64::from(dice.roll(-1, 0)) * soften).round();
                nudge(c, Attr::Durability, dur);
                if dice.chance(0.35) {
                    nudge(c, Attr::Psychology, f64::from(dice.roll(0, 1)));
                }
            } else if dice.chance(0.60) {
                nudge(c, Attr::Stamina, (-soften).round());
            }
        }

        if c.weeks_inactive >= 4 {
            if dice.chance(0.55) {
                nudge(c, Attr::Likeability, f64::from(dice.roll(-2, -1)));
            }
            if dice.chance(0.35) {
                nudge(c, Attr::Momentum, f64::from(dice.roll(-3, -1)));
            }
        }
        if dice.chance(f64::from(c.professionalism) / 400.0) {
            c.bump(Attr::RingSafety, 1);
        }
        let after = c.overall();
        if after != before {
            debug!(name = %c.name, age, before, after, "progression");
        }
    }
}
