//! Per-show side effects outside the bouts themselves: promos, fatigue,
//! injuries and champion aura drift.

use std::collections::{BTreeMap, BTreeSet};

use sim_core::titles::{self, titles_for};
use sim_core::{Attr, Brand, ChampPenaltyInfo, Dice, InjuryReport, PromoDetails, SimConfig, Slot, WorldState};
use tracing::{debug, info};

use crate::rating::{promo_quality_score, promo_score};

/// Promo quality at which the speaker gains momentum.
pub const PROMO_MOMENTUM_AT: i32 = 70;
/// Champion aura below this drags the show down.
pub const AURA_FLOOR: f64 = 70.0;

#[derive(Clone, Debug)]
pub struct PromoOutcome {
    pub score: i32,
    pub text: String,
    pub summary: String,
    pub details: PromoDetails,
}

/// Cut a promo. Speakers tied into a live storyline get the story bonus.
pub fn run_promo(
    world: &mut WorldState,
    brand: Brand,
    speaker: usize,
    text: Option<&str>,
    cfg: &SimConfig,
    dice: &mut dyn Dice,
) -> PromoOutcome {
    let Some(c) = world.roster.get(speaker).cloned() else {
        return PromoOutcome {
            score: 0,
            text: String::new(),
            summary: String::new(),
            details: PromoDetails::default(),
        };
    };
    let story_bonus = if world.stories(brand).is_some_and(|s| s.in_any_story(&c.name)) {
        cfg.story.promo_bonus
    } else {
        0
    };
    let score = promo_score(&c, story_bonus, dice);
    let quality = promo_quality_score(&c);
    let mut momentum_delta = BTreeMap::new();
    if quality >= PROMO_MOMENTUM_AT {
        let applied = world.roster[speaker].bump(Attr::Momentum, 1);
        momentum_delta.insert(c.name.clone(), applied);
    }
    let text = match text {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => format!("{} cuts a promo. Crowd pops (+Like/Momentum).", c.name),
    };
    PromoOutcome {
        score,
        text,
        summary: format!("{} hyped the crowd.", c.name),
        details: PromoDetails {
            speaker: c.name,
            promo_score: quality,
            story_bonus,
            momentum_delta,
        },
    }
}

/// Fatigue multiplier for a bout in `slot`.
pub fn slot_fatigue_mult(slot: Slot) -> f64 {
    match slot {
        Slot::PreShow => 0.8,
        Slot::MainEvent => 1.3,
        _ => 1.0,
    }
}

/// Tire out everyone who appeared and let everyone else on the brand recover.
///
/// `worked` maps roster index to the heaviest multiplier they took tonight.
/// Injured and retired characters are left alone.
pub fn apply_fatigue(
    world: &mut WorldState,
    brand: Brand,
    worked: &BTreeMap<usize, f64>,
    cfg: &SimConfig,
    dice: &mut dyn Dice,
) {
    let (inc_lo, inc_hi) = cfg.fatigue.wrestle_inc;
    let (dec_lo, dec_hi) = cfg.fatigue.rest_dec;
    for (i, c) in world.roster.iter_mut().enumerate() {
        if c.brand != brand || c.retired || c.injury_weeks > 0 {
            continue;
        }
        match worked.get(&i) {
            Some(mult) => {
                let inc = (f64::from(dice.roll(inc_lo, inc_hi)) * mult).round() as i32;
                let room = (cfg.fatigue.cap - c.fatigue).max(0);
                c.bump(Attr::Fatigue, inc.min(room));
            }
            None => {
                c.bump(Attr::Fatigue, -dice.roll(dec_lo, dec_hi));
            }
        }
    }
}

/// Tick injuries down by one week. Returns who healed.
pub fn countdown_injuries(world: &mut WorldState, brand: Brand) -> Vec<String> {
    let mut healed = Vec::new();
    for c in world.roster.iter_mut().filter(|c| c.brand == brand && c.injury_weeks > 0) {
        c.injury_weeks -= 1;
        if c.injury_weeks == 0 {
            healed.push(c.name.clone());
        }
    }
    if !healed.is_empty() {
        debug!(%brand, healed = ?healed, "back from injury");
    }
    healed
}

/// Chance that `victim` gets hurt in a bout against `opponents`.
pub fn injury_chance(world: &WorldState, victim: usize, opponents: &[usize], slot: Slot, cfg: &SimConfig) -> f64 {
    let t = &cfg.injury;
    let Some(c) = world.roster.get(victim) else {
        return 0.0;
    };
    let from_fatigue = (t.base + f64::from(c.fatigue) * t.per_fatigue).min(t.cap);
    let safety_cut = (f64::from(c.ring_safety - 70) * 0.003).max(0.0);
    let pro_cut = (f64::from(c.professionalism - 70) * 0.002).max(0.0);
    let safe = (f64::from(c.durability - 70) * 0.0025 + safety_cut + pro_cut).clamp(-0.1, 0.15);
    let careless = opponents
        .iter()
        .filter_map(|&o| world.roster.get(o))
        .map(|o| f64::from((70 - o.ring_safety).max(0)) * t.unsafe_opponent)
        .fold(0.0, f64::max);
    let me = if slot == Slot::MainEvent { t.main_event_extra } else { 0.0 };
    (from_fatigue - safe + careless + me).clamp(0.0, t.cap)
}

/// One segment's participants for injury purposes. A promo has its speaker
/// in `side_a` and nobody opposite.
#[derive(Clone, Debug)]
pub struct SegmentRoster {
    pub slot: Slot,
    pub side_a: Vec<usize>,
    pub side_b: Vec<usize>,
}

/// Roll once for everyone who appeared tonight, promo speakers included.
/// Someone who both talked and wrestled rolls with their bout's opponents.
pub fn roll_injuries(
    world: &mut WorldState,
    brand: Brand,
    segments: &[SegmentRoster],
    cfg: &SimConfig,
    dice: &mut dyn Dice,
) -> Vec<InjuryReport> {
    let t = &cfg.injury;
    let mut hurt = Vec::new();
    let mut rolled: BTreeSet<usize> = BTreeSet::new();
    let (bouts, promos): (Vec<&SegmentRoster>, Vec<&SegmentRoster>) =
        segments.iter().partition(|s| !s.side_b.is_empty());
    for seg in bouts.into_iter().chain(promos) {
        for (side, opps) in [(&seg.side_a, &seg.side_b), (&seg.side_b, &seg.side_a)] {
            for &victim in side {
                if !rolled.insert(victim) {
                    continue;
                }
                if world.roster.get(victim).map_or(true, |c| c.injury_weeks > 0 || c.retired) {
                    continue;
                }
                let p = injury_chance(world, victim, opps, seg.slot, cfg);
                if !dice.chance(p) {
                    continue;
                }
                let fatigue = world.roster[victim].fatigue;
                let (lo, hi) = if fatigue >= t.heavy_at {
                    t.dur_heavy
                } else if fatigue >= t.med_at {
                    t.dur_med
                } else {
                    t.dur_light
                };
                let weeks = dice.roll(lo, hi).max(1) as u32;
                let rest = dice.roll(10, 18);
                let c = &mut world.roster[victim];
                c.injury_weeks = weeks;
                c.bump(Attr::Fatigue, -rest);
                let name = c.name.clone();

                let careless: Vec<String> = opps
                    .iter()
                    .filter_map(|&o| world.roster.get(o))
                    .filter(|o| o.ring_safety < t.heat_below_safety)
                    .map(|o| o.name.clone())
                    .collect();
                for o in &careless {
                    world.relationships.on_danger_spot(o, &name);
                }
                info!(%brand, name = %name, weeks, "injury");
                if brand == world.user_brand {
                    world.push_mail(
                        "Medical",
                        "Injury Update",
                        &format!("{name} suffered an injury and will be out for {weeks} week(s)."),
                    );
                }
                hurt.push(InjuryReport { name, weeks });
            }
        }
    }
    hurt
}

/// How much a champion carries a belt.
pub fn aura(c: &sim_core::Character) -> f64 {
    f64::from(c.star_power) * 0.5
        + f64::from(c.consistency) * 0.25
        + f64::from(c.likeability) * 0.15
        + f64::from(c.momentum) * 0.10
}

/// Weak champions cost the show points. Their holders get a small nudge of
/// likeability and momentum to help them grow into the belt.
pub fn champion_aura_drift(world: &mut WorldState, brand: Brand) -> ChampPenaltyInfo {
    let mut drag = ChampPenaltyInfo::default();
    for &title in titles_for(brand) {
        let Some(holder) = titles::holder(&world.titles, brand, title) else {
            continue;
        };
        let idx: Vec<usize> = holder.names().into_iter().filter_map(|n| world.index_of(n)).collect();
        if idx.is_empty() {
            continue;
        }
        let avg = idx.iter().map(|&i| aura(&world.roster[i])).sum::<f64>() / idx.len() as f64;
        if avg >= AURA_FLOOR {
            continue;
        }
        let pen = ((AURA_FLOOR - avg) * 0.15).round() as i32;
        drag.total_penalty += pen;
        drag.weak_titles.push(title.to_string());
        for i in idx {
            let c = &mut world.roster[i];
            c.bump(Attr::Likeability, 1);
            c.bump(Attr::Momentum, 1);
        }
    }
    if drag.total_penalty > 0 {
        debug!(%brand, penalty = drag.total_penalty, weak = ?drag.weak_titles, "champion aura drag");
    }
    drag
}
