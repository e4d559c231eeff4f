//! Weekly mentorship ticks. A mentor's own attributes decide what rubs off
//! on their mentees; most weeks nothing happens.

use sim_core::world::normalize_mentorships;
use sim_core::{Attr, Brand, Character, Dice, WorldState};
use tracing::debug;

/// Attributes a mentee report covers, in report order.
const REPORTED: [Attr; 11] = [
    Attr::WorkRate,
    Attr::Psychology,
    Attr::Mic,
    Attr::Charisma,
    Attr::Athleticism,
    Attr::RingSafety,
    Attr::StrengthPower,
    Attr::Agility,
    Attr::Professionalism,
    Attr::Momentum,
    Attr::Morale,
];

/// Skill attributes scaled by the mentor's reputation.
const SKILLS: [Attr; 8] = [
    Attr::WorkRate,
    Attr::Psychology,
    Attr::Mic,
    Attr::Charisma,
    Attr::Athleticism,
    Attr::RingSafety,
    Attr::StrengthPower,
    Attr::Agility,
];

/// Map a mentor stat onto a weekly gain of `0..=max_up`.
pub fn tier_delta(stat: i32, lo: i32, hi: i32, max_up: i32) -> i32 {
    if stat <= lo {
        return 0;
    }
    if stat >= hi {
        return max_up;
    }
    let frac = f64::from(stat - lo) / f64::from((hi - lo).max(1));
    ((frac * f64::from(max_up)).round() as i32).max(0)
}

/// Weekly chance that a mentor's group gets anything at all.
pub fn proc_chance(m: &Character) -> f64 {
    let p = 0.10
        + f64::from(m.charisma - 70) / 350.0
        + f64::from(m.psychology - 70) / 350.0
        + f64::from(m.reputation - 60) / 500.0
        + f64::from(m.professionalism - 60) / 600.0;
    p.clamp(0.06, 0.35)
}

/// What one mentor passes on each tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recipe {
    /// Gains per attribute, in report order minus morale.
    pub gains: Vec<(Attr, i32)>,
    pub morale: i32,
    pub bad_pro: i32,
    pub bad_safety: i32,
    pub bad_morale: i32,
}

fn style_bumps(m: &Character) -> Vec<Attr> {
    let has = |keys: &[&str]| {
        m.style_tags
            .iter()
            .any(|t| keys.iter().any(|k| t.eq_ignore_ascii_case(k)))
    };
    let mut out = Vec::new();
    if has(&["technical"]) {
        out.extend([Attr::WorkRate, Attr::Psychology]);
    }
    if has(&["showman", "character"]) {
        out.extend([Attr::Mic, Attr::Charisma]);
    }
    if has(&["high flyer", "cruiser", "daredevil"]) {
        out.extend([Attr::Athleticism, Attr::Agility]);
    }
    if has(&["powerhouse", "giant"]) {
        out.push(Attr::StrengthPower);
    }
    if has(&["striker"]) {
        out.extend([Attr::RingSafety, Attr::WorkRate]);
    }
    if has(&["tag specialist"]) {
        out.push(Attr::Psychology);
    }
    out
}

pub fn recipe(m: &Character) -> Recipe {
    let mut gains: Vec<(Attr, i32)> = vec![
        (Attr::WorkRate, tier_delta(m.work_rate, 72, 90, 2)),
        (Attr::Psychology, tier_delta(m.psychology, 72, 92, 2)),
        (Attr::Mic, tier_delta(m.mic, 65, 90, 2)),
        (Attr::Charisma, tier_delta(m.charisma, 65, 90, 2)),
        (Attr::Athleticism, tier_delta(m.athleticism, 68, 90, 2)),
        (Attr::RingSafety, tier_delta(m.ring_safety, 68, 90, 2)),
        (Attr::StrengthPower, tier_delta(m.strength_power, 72, 92, 2)),
        (Attr::Agility, tier_delta(m.agility, 72, 92, 2)),
        (Attr::Professionalism, tier_delta(m.professionalism, 75, 95, 1)),
        (Attr::Momentum, tier_delta(m.momentum, 68, 90, 1)),
    ];
    for bump in style_bumps(m) {
        if let Some(g) = gains.iter_mut().find(|g| g.0 == bump) {
            g.1 += 1;
        }
    }
    let rep_amp = (0.7 + f64::from(m.reputation - 60) / 60.0).clamp(0.5, 1.4);
    let morale_amp = match m.morale {
        x if x >= 70 => 1.1,
        x if x >= 55 => 1.0,
        _ => 0.8,
    };
    for (a, g) in gains.iter_mut() {
        if SKILLS.contains(a) {
            *g = (f64::from(*g) * rep_amp).round() as i32;
        }
        if SKILLS.contains(a) || *a == Attr::Momentum {
            *g = (f64::from(*g) * morale_amp).round() as i32;
        }
    }
    let morale = 1 + match m.morale {
        x if x >= 80 => 2,
        x if x >= 60 => 1,
        _ => 0,
    };
    let bad = |v: i32, hard: i32, soft: i32, big: i32, small: i32| {
        if v < hard {
            big
        } else if v < soft {
            small
        } else {
            0
        }
    };
    Recipe {
        gains,
        morale,
        bad_pro: bad(m.professionalism, 50, 65, -2, -1),
        bad_safety: bad(m.ring_safety, 50, 60, -2, -1),
        bad_morale: bad(m.morale, 40, 55, -3, -1),
    }
}

fn add(c: &mut Character, a: Attr, d: i32, cap: i32) {
    if d != 0 {
        c.bump(a, d.clamp(-3, cap));
    }
}

/// Apply this week's mentorships for `brand` and post one report to the
/// inbox when anything moved. Returns the report lines.
pub fn run_mentorships(world: &mut WorldState, brand: Brand, dice: &mut dyn Dice) -> Vec<String> {
    normalize_mentorships(&mut world.mentorships, &world.roster);
    let today = world.sim_date();
    let mut report = Vec::new();

    for slot in world.mentorships.clone() {
        let Some(mentor) = slot.mentor.as_deref().and_then(|n| world.find(n)).cloned() else {
            continue;
        };
        if mentor.brand != brand || mentor.retired {
            continue;
        }
        if !dice.chance(proc_chance(&mentor)) {
            continue;
        }
        let r = recipe(&mentor);
        let mentor_age = mentor.age_on(today);

        for name in &slot.mentees {
            let Some(w) = world.find_mut(name) else { continue };
            if w.brand != brand || w.retired {
                continue;
            }
            let before: Vec<i32> = REPORTED.iter().map(|a| w.attr(*a)).collect();

            for &(a, g) in &r.gains {
                let cap = if matches!(a, Attr::Professionalism | Attr::Momentum) { 2 } else { 3 };
                add(w, a, g, cap);
            }
            w.bump(Attr::Morale, r.morale);
            add(w, Attr::Professionalism, r.bad_pro, 0);
            add(w, Attr::RingSafety, r.bad_safety, 0);
            w.bump(Attr::Morale, r.bad_morale);

            let older = w.age_on(today) > mentor_age;
            let (mut morale, mut pro) = (0, 0);
            if older {
                morale -= 3;
                pro -= 1;
            }
            if w.star_power >= 80 {
                morale -= 2;
            }
            let damp = match w.professionalism {
                x if x >= 85 => 0.4,
                x if x >= 70 => 0.7,
                _ => 1.0,
            };
            add(w, Attr::Professionalism, (f64::from(pro) * damp).round() as i32, 0);
            w.bump(Attr::Morale, (f64::from(morale) * damp).round() as i32);

            let parts: Vec<String> = REPORTED
                .iter()
                .zip(&before)
                .filter_map(|(a, b)| {
                    let d = w.attr(*a) - b;
                    (d != 0).then(|| if d > 0 { format!("{} +{d}", a.abbr()) } else { format!("{} {d}", a.abbr()) })
                })
                .collect();
            if !parts.is_empty() {
                report.push(format!("{} → {}: {}", mentor.name, w.name, parts.join(", ")));
            }
        }
    }

    if !report.is_empty() {
        debug!(%brand, lines = report.len(), "mentorship tick");
        if brand == world.user_brand {
            world.push_mail(
                "Coaches",
                "Mentorship Report",
                &format!("Mentorship effects landed this week:\n\n{}", report.join("\n")),
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::small_world;
    use proptest::prelude::*;
    use sim_core::world::MentorSlot;
    use sim_core::FlatDice;

    #[test]
    fn tiers_scale_between_bounds() {
        assert_eq!(tier_delta(72, 72, 90, 2), 0);
        assert_eq!(tier_delta(81, 72, 90, 2), 1);
        assert_eq!(tier_delta(95, 72, 90, 2), 2);
    }

    #[test]
    fn technical_veteran_recipe() {
        let mut m = small_world().find("Ace").unwrap().clone();
        m.work_rate = 90;
        m.psychology = 92;
        m.reputation = 60;
        m.morale = 65;
        m.style_tags = vec!["Technical".into()];
        let r = recipe(&m);
        let wr = r.gains.iter().find(|g| g.0 == Attr::WorkRate).unwrap().1;
        // (2 + 1) * 0.7 rounds to 2.
        assert_eq!(wr, 2);
        assert_eq!(r.morale, 2);
        assert_eq!((r.bad_pro, r.bad_safety, r.bad_morale), (0, 0, 0));
    }

    #[test]
    fn eager_tick_reports_once() {
        let mut w = small_world();
        {
            let ace = w.find_mut("Ace").unwrap();
            ace.work_rate = 90;
            ace.reputation = 90;
        }
        w.mentorships[0] = MentorSlot {
            mentor: Some("Ace".into()),
            mentees: vec!["Bolt".into(), "Gus".into()],
        };
        let lines = run_mentorships(&mut w, Brand::Raw, &mut FlatDice::eager());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "Ace → Bolt: WR +2, Morale +2");
        assert_eq!(w.find("Bolt").unwrap().work_rate, 72);
        assert_eq!(w.find("Gus").unwrap().work_rate, 70);
        assert_eq!(w.inbox[0].from, "Coaches");
        assert_eq!(w.inbox.len(), 1);
    }

    #[test]
    fn quiet_week_does_nothing() {
        let mut w = small_world();
        w.mentorships[0] = MentorSlot {
            mentor: Some("Ace".into()),
            mentees: vec!["Bolt".into()],
        };
        assert!(run_mentorships(&mut w, Brand::Raw, &mut FlatDice::quiet()).is_empty());
        assert!(w.inbox.is_empty());
    }

    proptest! {
        #[test]
        fn proc_chance_stays_in_band(cha in 0i32..100, psy in 0i32..100, rep in 0i32..100, pro in 0i32..100) {
            let mut m = small_world().roster[0].clone();
            m.charisma = cha;
            m.psychology = psy;
            m.reputation = rep;
            m.professionalism = pro;
            let p = proc_chance(&m);
            prop_assert!((0.06..=0.35).contains(&p));
        }
    }
}
