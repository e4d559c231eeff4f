//! One bout from bell to aftermath: winner draw, score, belts, momentum,
//! relationships, chemistry and permanent attribute drift.
//!
//! Every score input is read from the participants as they were before the
//! bell; momentum and the other consequences land afterwards.

use std::collections::BTreeMap;

use sim_core::titles::{self, TitleHolder};
use sim_core::{Alignment, Attr, BoutDetails, Brand, Character, Dice, SimConfig, Slot, WorldState};
use tracing::{debug, info};

use crate::rating::{
    cap_for, expected_singles, expected_tag, fatigue_penalty, rate_singles, side_strength, singles_alignment_pct,
    tag_alignment_pct, win_prob_a, RateContext, RATING_CAP, RATING_FLOOR,
};

/// Points a contested belt adds to the score.
pub const TITLE_BUMP: i32 = 3;
/// Bouts at or below this score sour chemistry and dent loser consistency.
pub const COLD_BOUT: i32 = 58;
/// A winner whose pre-bout chance was below this scored an upset.
pub const UPSET_PROB: f64 = 0.45;

/// Who is in the ring and what is at stake. Sides hold roster indices.
#[derive(Clone, Debug)]
pub struct Bout {
    pub slot: Slot,
    pub side_a: Vec<usize>,
    pub side_b: Vec<usize>,
    pub title: Option<String>,
}

impl Bout {
    pub fn is_tag(&self) -> bool {
        self.side_a.len() == 2 && self.side_b.len() == 2
    }
}

#[derive(Clone, Debug)]
pub struct BoutOutcome {
    pub score: i32,
    /// Blend-only expectation for these workers, for hot detection.
    pub expected: i32,
    pub names: Vec<String>,
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    pub text: String,
    pub tags: Vec<String>,
    pub details: BoutDetails,
}

type Effects = BTreeMap<String, BTreeMap<String, i32>>;

fn nudge(world: &mut WorldState, idx: usize, attr: Attr, delta: i32, effects: &mut Effects) -> i32 {
    let Some(c) = world.roster.get_mut(idx) else {
        return 0;
    };
    let applied = c.bump(attr, delta);
    if applied != 0 {
        *effects
            .entry(c.name.clone())
            .or_default()
            .entry(attr.key().to_string())
            .or_default() += applied;
    }
    applied
}

fn avg_star(side: &[&Character]) -> f64 {
    if side.is_empty() {
        return 60.0;
    }
    side.iter().map(|c| f64::from(c.star_power)).sum::<f64>() / side.len() as f64
}

/// Run a bout and apply its immediate consequences to the world.
pub fn simulate_bout(
    world: &mut WorldState,
    brand: Brand,
    bout: &Bout,
    cfg: &SimConfig,
    dice: &mut dyn Dice,
) -> BoutOutcome {
    let tag = bout.is_tag();
    let snap = |ids: &[usize]| -> Vec<Character> { ids.iter().filter_map(|&i| world.roster.get(i).cloned()).collect() };
    let pre_a = snap(&bout.side_a);
    let pre_b = snap(&bout.side_b);
    let ra: Vec<&Character> = pre_a.iter().collect();
    let rb: Vec<&Character> = pre_b.iter().collect();
    let names: Vec<String> = ra.iter().chain(&rb).map(|c| c.name.clone()).collect();
    let side_names = |s: &[&Character]| s.iter().map(|c| c.name.clone()).collect::<Vec<_>>();

    let a_side_score = f64::from(side_strength(&ra) + dice.roll(-6, 6));
    let b_side_score = f64::from(side_strength(&rb) + dice.roll(-6, 6));
    let prob_a = win_prob_a(a_side_score, b_side_score);
    let a_wins = dice.unit() < prob_a;
    let (win_ids, lose_ids, win_side, lose_side) = if a_wins {
        (&bout.side_a, &bout.side_b, &ra, &rb)
    } else {
        (&bout.side_b, &bout.side_a, &rb, &ra)
    };
    let winners = side_names(win_side);
    let losers = side_names(lose_side);

    let story = world
        .stories(brand)
        .map(|s| s.story_bonus(&names, cfg.story.max_bonus))
        .unwrap_or(0);
    let pairs: Vec<(&Character, &Character)> = ra.iter().copied().zip(rb.iter().copied()).collect();
    let n = pairs.len().max(1) as f64;
    let base_chem = pairs
        .iter()
        .map(|(x, y)| f64::from(world.chemistry.get(&x.name, &y.name)))
        .sum::<f64>()
        / n;
    let rel_bonus = (pairs
        .iter()
        .map(|(x, y)| f64::from(world.relationships.chem_bonus(&x.name, &y.name)))
        .sum::<f64>()
        / n)
        .round() as i32;
    let chem_pts = (base_chem * 0.6 + f64::from(rel_bonus)).round() as i32;

    let title = bout
        .title
        .clone()
        .filter(|t| titles::titles_for(brand).contains(&t.as_str()) && titles::is_tag_title(t) == tag);
    if bout.title.is_some() && title.is_none() {
        debug!(%brand, title = ?bout.title, "belt not contestable in this bout");
    }

    let ctx = RateContext {
        slot: Some(bout.slot),
        title: title.is_some(),
        story,
        chem: chem_pts,
    };
    let cap = pairs
        .iter()
        .map(|(x, y)| cap_for(x, y, story, chem_pts))
        .max()
        .unwrap_or(RATING_CAP);
    let (base_rating, align_pct, expected) = match (tag, ra.as_slice(), rb.as_slice()) {
        (true, [a1, a2], [b1, b2]) => {
            // Tag pairings rate without the belt; the title bump comes later.
            let pair_ctx = RateContext { title: false, ..ctx };
            let p1 = rate_singles(a1, b1, pair_ctx, dice);
            let p2 = rate_singles(a2, b2, pair_ctx, dice);
            let pre = (f64::from(p1 + p2) / 2.0 + f64::from(dice.roll(-2, 2))).round() as i32;
            (
                pre,
                tag_alignment_pct([*a1, *a2], [*b1, *b2], &cfg.alignment),
                expected_tag([*a1, *a2], [*b1, *b2]),
            )
        }
        (_, [a, ..], [b, ..]) => (
            rate_singles(a, b, ctx, dice),
            singles_alignment_pct(a, b, &cfg.alignment),
            expected_singles(a, b),
        ),
        _ => (RATING_FLOOR, 0.0, RATING_FLOOR),
    };
    let mut score = ((f64::from(base_rating) * (1.0 - align_pct)).round() as i32).clamp(RATING_FLOOR, cap);
    let fatigue = (pairs.iter().map(|(x, y)| f64::from(fatigue_penalty(x, y))).sum::<f64>() / n).round() as i32;

    let mut effects = Effects::new();
    let mut tags: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    let (mut title_applied, mut title_changed, mut title_bump) = (false, false, 0);

    if let Some(t) = &title {
        let a_refs: Vec<&str> = ra.iter().map(|c| c.name.as_str()).collect();
        let b_refs: Vec<&str> = rb.iter().map(|c| c.name.as_str()).collect();
        let win_refs: Vec<&str> = winners.iter().map(String::as_str).collect();
        let current = titles::holder(&world.titles, brand, t).cloned();
        let on_the_line = match &current {
            None => true,
            Some(h) if tag => h.same_set(&a_refs) || h.same_set(&b_refs),
            Some(h) => names.iter().any(|n| h.contains(n)),
        };
        if on_the_line {
            title_applied = true;
            title_bump = TITLE_BUMP;
            score = (score + TITLE_BUMP).min(cap);
            let retained = current.as_ref().is_some_and(|h| {
                if tag {
                    h.same_set(&win_refs)
                } else {
                    win_refs.iter().any(|n| h.contains(n))
                }
            });
            if retained {
                tags.push("title defense".into());
                for &i in win_ids {
                    let like = dice.roll(2, 4);
                    nudge(world, i, Attr::Likeability, like, &mut effects);
                    let mom = dice.roll(2, 5);
                    nudge(world, i, Attr::Momentum, mom, &mut effects);
                }
            } else {
                let new_holder = match winners.as_slice() {
                    [x, y] if tag => Some(TitleHolder::Team([x.clone(), y.clone()])),
                    [x, ..] => Some(TitleHolder::Single(x.clone())),
                    [] => None,
                };
                if let Some(h) = new_holder {
                    world.titles.entry(brand).or_default().insert(t.clone(), Some(h));
                    world.refresh_champions();
                    tags.push("title change!".into());
                    title_changed = true;
                    info!(%brand, title = %t, champion = %winners.join(" & "), "title change");
                }
            }
        } else {
            notes.push(format!("{t} champion not in the bout; belt not on the line"));
        }
    }

    let mut momentum_delta = BTreeMap::new();
    for (ids, lo, hi) in [(win_ids, 4, 8), (lose_ids, -5, -2)] {
        for &i in ids {
            let d = dice.roll(lo, hi);
            let applied = nudge(world, i, Attr::Momentum, d, &mut effects);
            if let Some(c) = world.roster.get(i) {
                momentum_delta.insert(c.name.clone(), applied);
            }
        }
    }

    let hot = score >= cfg.hot.buzz;
    match (winners.as_slice(), losers.as_slice()) {
        ([w1, w2], [l1, l2]) if tag => {
            world.relationships.on_tag_teammates(w1, w2, true, hot);
            world.relationships.on_tag_teammates(l1, l2, false, hot);
        }
        _ => {
            if let [a, b, ..] = names.as_slice() {
                world.relationships.on_singles_face_off(a, b, hot, title_changed);
            }
        }
    }
    for (x, y) in &pairs {
        if score >= cfg.hot.buzz {
            world.chemistry.bump(&x.name, &y.name, 1);
        } else if score <= COLD_BOUT {
            world.chemistry.bump(&x.name, &y.name, -1);
        }
    }

    let opp_star = avg_star(lose_side);
    let win_prob = if a_wins { prob_a } else { 1.0 - prob_a };
    let upset = win_prob < UPSET_PROB;
    let big_opp = i32::from(opp_star >= 80.0);
    for (&i, c) in win_ids.iter().zip(win_side.iter()) {
        let star_gain = (big_opp + i32::from(hot) + i32::from(upset)).clamp(0, 2);
        let rep_gain = (1 + big_opp + i32::from(title_changed) + i32::from(upset)).clamp(1, 3);
        nudge(world, i, Attr::StarPower, star_gain, &mut effects);
        nudge(world, i, Attr::Reputation, rep_gain, &mut effects);
        if hot && c.alignment == Alignment::Face {
            nudge(world, i, Attr::Likeability, 1, &mut effects);
        }
        if score >= 85 {
            nudge(world, i, Attr::Consistency, 1, &mut effects);
        }
        if score >= 92 {
            nudge(world, i, Attr::Psychology, 1, &mut effects);
        }
        if title_changed {
            let (sp, rep) = if opp_star >= 85.0 { (3, 3) } else { (2, 2) };
            nudge(world, i, Attr::StarPower, sp, &mut effects);
            nudge(world, i, Attr::Reputation, rep, &mut effects);
            nudge(world, i, Attr::Consistency, 1, &mut effects);
        }
    }
    for &i in lose_ids {
        if upset {
            nudge(world, i, Attr::Reputation, -1, &mut effects);
        }
        if score <= COLD_BOUT {
            nudge(world, i, Attr::Consistency, -1, &mut effects);
        }
    }

    let mut text = format!("{} defeat {}.", winners.join(" & "), losers.join(" & "));
    if title_applied {
        text.push_str(" (Title bout)");
    }
    debug!(%brand, slot = %bout.slot, score, winners = ?winners, "bout finished");

    let details = BoutDetails {
        a_side_score,
        b_side_score,
        prob_a,
        winners: winners.clone(),
        base_rating,
        expected,
        story_bonus: story,
        base_chem,
        rel_bonus,
        chem_pts,
        fatigue_penalty: fatigue,
        alignment_penalty_pct: align_pct.max(0.0),
        title,
        title_applied,
        title_changed,
        title_bump,
        repeat_penalty: 0,
        momentum_delta,
        hot_match: hot,
        upset_win: upset,
        opp_star_avg_for_winners: opp_star,
        attr_effects: effects,
        story_heat: None,
        notes,
    };
    BoutOutcome {
        score,
        expected,
        names,
        winners,
        losers,
        text,
        tags,
        details,
    }
}
