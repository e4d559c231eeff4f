//! Rating engine: side strength, win probability, bout and promo scores,
//! hot-match expectations and the crowd-facing summaries.

use sim_core::config::{AlignmentTuning, HotTuning};
use sim_core::{Alignment, Character, Dice, SegmentResult, Slot};

const W_WORK: f64 = 0.38;
const W_STAR: f64 = 0.22;
const W_MOM: f64 = 0.12;
const W_PSY: f64 = 0.16;
const W_LIKE: f64 = 0.08;

/// Elo sensitivity; smaller values make upsets more frequent.
pub const WIN_SENSITIVITY: f64 = 28.0;

/// Floor of every bout score.
pub const RATING_FLOOR: i32 = 30;
pub const RATING_CAP: i32 = 92;
/// Ceiling for a pairing of two elite workers with real story and chemistry.
pub const ELITE_CAP: i32 = 95;

fn avg(side: &[&Character], f: impl Fn(&Character) -> i32) -> f64 {
    if side.is_empty() {
        return 0.0;
    }
    side.iter().map(|c| f64::from(f(c))).sum::<f64>() / side.len() as f64
}

/// Rounded weighted strength of one side, plus one point when the side
/// mixes a face and a heel.
pub fn side_strength(side: &[&Character]) -> i32 {
    if side.is_empty() {
        return 0;
    }
    let mix = side.iter().any(|c| c.alignment == Alignment::Heel) && side.iter().any(|c| c.alignment == Alignment::Face);
    let s = avg(side, |c| c.work_rate) * W_WORK
        + avg(side, |c| c.star_power) * W_STAR
        + avg(side, |c| c.momentum) * W_MOM
        + avg(side, |c| c.psychology) * W_PSY
        + avg(side, |c| c.likeability) * W_LIKE
        + if mix { 1.0 } else { 0.0 };
    s.round() as i32
}

/// Probability that side A wins given both side scores.
pub fn win_prob_a(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((b - a) / WIN_SENSITIVITY))
}

fn singles_blend(a: &Character, b: &Character) -> f64 {
    let pair = |x: i32, y: i32| f64::from(x + y) / 2.0;
    let promo = (a.promo_quality() + b.promo_quality()) / 2.0;
    pair(a.work_rate, b.work_rate) * 0.26
        + pair(a.psychology, b.psychology) * 0.16
        + pair(a.star_power, b.star_power) * 0.20
        + promo * 0.10
        + pair(a.likeability, b.likeability) * 0.08
        + pair(a.momentum, b.momentum) * 0.06
        + pair(a.athleticism, b.athleticism) * 0.05
}

/// The singles blend with no modifiers, used as the expectation for hot
/// detection.
pub fn expected_singles(a: &Character, b: &Character) -> i32 {
    (singles_blend(a, b).round() as i32).clamp(RATING_FLOOR, RATING_CAP)
}

/// Expectation for a tag bout: the rounded mean of both cross pairings.
pub fn expected_tag(a: [&Character; 2], b: [&Character; 2]) -> i32 {
    let e = f64::from(expected_singles(a[0], b[0]) + expected_singles(a[1], b[1])) / 2.0;
    e.round() as i32
}

pub fn is_hot(score: i32, expected: i32, hot: &HotTuning) -> bool {
    score >= hot.absolute || score >= expected + hot.relative
}

fn elite(c: &Character) -> bool {
    c.star_power >= 90 && c.work_rate >= 85 && c.psychology >= 82
}

/// Score ceiling for a pairing.
pub fn cap_for(a: &Character, b: &Character, story: i32, chem: i32) -> i32 {
    if elite(a) && elite(b) && story >= 6 && chem >= 3 {
        ELITE_CAP
    } else {
        RATING_CAP
    }
}

/// Points lost to average fatigue above 40.
pub fn fatigue_penalty(a: &Character, b: &Character) -> i32 {
    let avg = f64::from(a.fatigue + b.fatigue) / 2.0;
    ((avg - 40.0) * 0.15).round().max(0.0) as i32
}

/// Slot bonus added on top of the blend.
pub fn slot_bonus(slot: Slot) -> i32 {
    match slot {
        Slot::MainEvent => 6,
        Slot::Opener => 3,
        _ => 0,
    }
}

/// Inputs beyond the two workers that shape a singles score.
#[derive(Clone, Copy, Debug, Default)]
pub struct RateContext {
    pub slot: Option<Slot>,
    pub title: bool,
    pub story: i32,
    pub chem: i32,
}

/// Television-style singles score, clamped to `30..=cap`.
pub fn rate_singles(a: &Character, b: &Character, ctx: RateContext, dice: &mut dyn Dice) -> i32 {
    let mut base = singles_blend(a, b);
    if a.alignment != b.alignment {
        base += 3.0;
    }
    base += f64::from(ctx.slot.map(slot_bonus).unwrap_or(0));
    if ctx.title {
        base += 4.0;
    }
    base += f64::from(ctx.story + ctx.chem);
    base -= f64::from(fatigue_penalty(a, b));
    base += f64::from(dice.roll(-4, 6));
    let cap = cap_for(a, b, ctx.story, ctx.chem);
    (base.round() as i32).clamp(RATING_FLOOR, cap)
}

/// Fractional penalty for a same-alignment singles bout.
pub fn singles_alignment_pct(a: &Character, b: &Character, t: &AlignmentTuning) -> f64 {
    if a.alignment != b.alignment {
        return 0.0;
    }
    match a.alignment {
        Alignment::Heel => t.singles_same + t.singles_heel_extra,
        Alignment::Neutral => (t.singles_same - t.singles_neutral_relief).max(0.0),
        Alignment::Face => t.singles_same,
    }
}

/// Combined multiplier loss for a tag bout: each internally mixed team is
/// docked, and two uniform teams of the same alignment are docked again.
pub fn tag_alignment_pct(a: [&Character; 2], b: [&Character; 2], t: &AlignmentTuning) -> f64 {
    let a_mixed = a[0].alignment != a[1].alignment;
    let b_mixed = b[0].alignment != b[1].alignment;
    let mut keep = 1.0;
    if a_mixed {
        keep *= 1.0 - t.tag_mixed_team;
    }
    if b_mixed {
        keep *= 1.0 - t.tag_mixed_team;
    }
    if !a_mixed && !b_mixed && a[0].alignment == b[0].alignment {
        keep *= 1.0 - t.tag_teams_same;
    }
    1.0 - keep
}

/// `mic * 0.55 + charisma * 0.45`, rounded. Seventy or better moves momentum.
pub fn promo_quality_score(c: &Character) -> i32 {
    (f64::from(c.mic) * 0.55 + f64::from(c.charisma) * 0.45).round() as i32
}

/// Segment score for a promo, clamped to `55..=90`.
pub fn promo_score(c: &Character, story_bonus: i32, dice: &mut dyn Dice) -> i32 {
    let mut s = c.promo_quality() * 0.60
        + f64::from(c.star_power) * 0.18
        + f64::from(c.likeability) * 0.10
        + f64::from(c.momentum) * 0.07;
    s += f64::from(c.reputation - 60) * 0.08;
    s += f64::from(c.professionalism - 70) * 0.04;
    s += f64::from(story_bonus);
    s += f64::from(dice.roll(-4, 6));
    ((s / 1.25).round() as i32).clamp(55, 90)
}

/// Crowd reaction to a bout, by score band.
pub fn match_summary<S: AsRef<str>>(score: i32, names: &[S]) -> String {
    let names = names.iter().map(|n| n.as_ref()).collect::<Vec<_>>().join(" vs ");
    let tail = match score {
        s if s >= 90 => "tore the house down.",
        s if s >= 80 => "delivered a great match.",
        s if s >= 70 => "put on a solid performance.",
        s if s >= 60 => "kept the crowd interested.",
        _ => "struggled to connect with the crowd.",
    };
    format!("{names} {tail}")
}

/// One-line reaction to a 1..10 TV rating.
pub fn rate_to_blurb(tv: f64) -> &'static str {
    match tv {
        t if t >= 9.0 => "Molten. Fans buzzing.",
        t if t >= 8.0 => "Strong show. Momentum building.",
        t if t >= 7.0 => "Solid TV. Some peaks, some dips.",
        t if t >= 6.0 => "Mid. Lukewarm spots.",
        _ => "Cold. Time to shake the card.",
    }
}

/// TV-point adjustment from how the closing stretch compared with the rest
/// of the card, with an explanatory note when it fires.
pub fn afterglow_tv_bump(segments: &[SegmentResult]) -> (f64, Option<&'static str>) {
    let get = |slot: Slot| segments.iter().find(|s| s.seg == slot);
    let me = get(Slot::MainEvent);
    let opener = get(Slot::Opener);
    let close: Vec<i32> = [get(Slot::Match), me].into_iter().flatten().map(|s| s.score).collect();

    let mean = |v: &[i32]| {
        if v.is_empty() {
            0.0
        } else {
            v.iter().map(|x| f64::from(*x)).sum::<f64>() / v.len() as f64
        }
    };
    let close_avg = mean(&close);
    let card: Vec<i32> = segments.iter().map(|s| s.score).collect();
    let card_avg = mean(&card);

    let mut bump: f64 = 0.0;
    let mut note = None;
    if !close.is_empty() {
        if close_avg >= 88.0 {
            bump = 0.6;
            note = Some("The closing stretch sent fans home buzzing.");
        } else if close_avg >= 82.0 {
            bump = 0.4;
            note = Some("Strong finish lifted the whole card.");
        } else if close_avg >= 78.0 {
            bump = 0.25;
            note = Some("Good finish helped the show's perception.");
        }
    }
    if let Some(me) = me {
        let diff = card_avg - f64::from(me.score);
        if me.score < 70 && diff >= 5.0 {
            bump = bump.min(-0.6);
            note = Some("Flat main event cooled an otherwise decent night.");
        } else if diff >= 8.0 {
            bump = bump.min(-0.4);
            note = Some("Underwhelming main event hurt the overall feel.");
        } else if diff >= 5.0 {
            bump = bump.min(-0.25);
            note = Some("Main event didn't quite live up to the build.");
        }
    }
    if bump >= 0.0 && opener.is_some_and(|o| o.score >= 84) {
        bump = (bump + 0.1).min(0.7);
        note = note.or(Some("Hot opener set a great pace."));
    }
    (bump, note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fighter;
    use proptest::prelude::*;
    use sim_core::dice::Flat;
    use sim_core::{Brand, FlatDice, Gender, SegmentKind};

    fn seg(slot: Slot, score: i32) -> SegmentResult {
        SegmentResult {
            id: None,
            seg: slot,
            kind: SegmentKind::Singles,
            score,
            text: String::new(),
            tags: vec![],
            summary: String::new(),
            names: vec![],
            explain: None,
        }
    }

    #[test]
    fn even_sides_are_a_coin_flip() {
        let a = fighter("A", Gender::Male, Brand::Raw);
        let b = fighter("B", Gender::Male, Brand::Raw);
        let (sa, sb) = (side_strength(&[&a]), side_strength(&[&b]));
        assert_eq!(sa, sb);
        assert!((win_prob_a(f64::from(sa), f64::from(sb)) - 0.5).abs() < 1e-9);
        assert!(win_prob_a(80.0, 52.0) > 0.9);
    }

    #[test]
    fn main_event_example_lands_near_blend() {
        let mut a = fighter("A", Gender::Male, Brand::Raw);
        let mut b = fighter("B", Gender::Male, Brand::Raw);
        for c in [&mut a, &mut b] {
            c.work_rate = 80;
            c.star_power = 80;
            c.psychology = 80;
            c.momentum = 60;
            c.likeability = 60;
        }
        b.alignment = Alignment::Heel;
        let blend = singles_blend(&a, &b);
        let ctx = RateContext {
            slot: Some(Slot::MainEvent),
            ..RateContext::default()
        };
        for pick in [Flat::Low, Flat::Mid, Flat::High] {
            let mut d = FlatDice { pick, unit: 0.5 };
            let s = rate_singles(&a, &b, ctx, &mut d);
            let lo = (blend + 3.0 + 6.0 - 4.0).round() as i32;
            let hi = (blend + 3.0 + 6.0 + 6.0).round() as i32;
            assert!((lo..=hi.min(RATING_CAP)).contains(&s), "{s} not in {lo}..{hi}");
        }
    }

    #[test]
    fn elite_pairing_escapes_cap() {
        let mut a = fighter("A", Gender::Male, Brand::Raw);
        let mut b = fighter("B", Gender::Male, Brand::Raw);
        for c in [&mut a, &mut b] {
            c.star_power = 99;
            c.work_rate = 99;
            c.psychology = 99;
            c.charisma = 99;
            c.mic = 99;
            c.likeability = 99;
            c.momentum = 99;
            c.athleticism = 99;
        }
        let mut d = FlatDice { pick: Flat::High, unit: 0.5 };
        let plain = rate_singles(&a, &b, RateContext::default(), &mut d);
        assert_eq!(plain, RATING_CAP);
        let magic = RateContext {
            story: 6,
            chem: 3,
            ..RateContext::default()
        };
        assert_eq!(rate_singles(&a, &b, magic, &mut d), ELITE_CAP);
    }

    #[test]
    fn alignment_penalties() {
        let t = AlignmentTuning::default();
        let mut a = fighter("A", Gender::Male, Brand::Raw);
        let mut b = fighter("B", Gender::Male, Brand::Raw);
        assert!((singles_alignment_pct(&a, &b, &t) - 0.03).abs() < 1e-9);
        a.alignment = Alignment::Heel;
        b.alignment = Alignment::Heel;
        assert!((singles_alignment_pct(&a, &b, &t) - 0.07).abs() < 1e-9);
        b.alignment = Alignment::Face;
        assert_eq!(singles_alignment_pct(&a, &b, &t), 0.0);

        let c = fighter("C", Gender::Male, Brand::Raw);
        let d = fighter("D", Gender::Male, Brand::Raw);
        // A heel + B face is mixed; C and D are uniform neutrals.
        assert!((tag_alignment_pct([&a, &b], [&c, &d], &t) - 0.06).abs() < 1e-9);
    }

    #[test]
    fn promo_is_clamped() {
        let mut c = fighter("A", Gender::Female, Brand::Raw);
        c.charisma = 30;
        c.mic = 30;
        c.star_power = 30;
        assert_eq!(promo_score(&c, 0, &mut FlatDice::quiet()), 55);
        c.charisma = 99;
        c.mic = 99;
        c.star_power = 99;
        c.reputation = 99;
        c.likeability = 99;
        c.momentum = 99;
        assert!(promo_score(&c, 6, &mut FlatDice::quiet()) <= 90);
    }

    #[test]
    fn closing_stretch_moves_tv() {
        let hot = [seg(Slot::Opener, 70), seg(Slot::Match, 90), seg(Slot::MainEvent, 90)];
        assert_eq!(afterglow_tv_bump(&hot).0, 0.6);
        let flat = [seg(Slot::Opener, 80), seg(Slot::Match, 80), seg(Slot::MainEvent, 60)];
        let (bump, note) = afterglow_tv_bump(&flat);
        assert_eq!(bump, -0.6);
        assert!(note.unwrap().starts_with("Flat main event"));
        let opener = [seg(Slot::Opener, 86)];
        assert!((afterglow_tv_bump(&opener).0 - 0.1).abs() < 1e-9);
    }

    #[test]
    fn summaries_and_blurbs() {
        assert_eq!(match_summary(91, &["A", "B"]), "A vs B tore the house down.");
        assert_eq!(match_summary(50, &["A", "B", "C", "D"]), "A vs B vs C vs D struggled to connect with the crowd.");
        assert_eq!(rate_to_blurb(9.2), "Molten. Fans buzzing.");
        assert_eq!(rate_to_blurb(1.0), "Cold. Time to shake the card.");
    }

    proptest! {
        #[test]
        fn singles_score_in_range(
            wr in 0i32..=99, sp in 0i32..=99, fat in 0i32..=100,
            story in 0i32..=12, chem in -10i32..=10, seed in any::<u64>()
        ) {
            let mut a = fighter("A", Gender::Male, Brand::Raw);
            let mut b = fighter("B", Gender::Male, Brand::Raw);
            a.work_rate = wr;
            b.star_power = sp;
            a.fatigue = fat;
            let mut d = sim_core::SeededDice::new(seed);
            let ctx = RateContext { slot: Some(Slot::MainEvent), title: true, story, chem };
            let s = rate_singles(&a, &b, ctx, &mut d);
            prop_assert!((RATING_FLOOR..=ELITE_CAP).contains(&s));
            let p = win_prob_a(f64::from(wr), f64::from(sp));
            prop_assert!(p > 0.0 && p < 1.0);
        }
    }
}
