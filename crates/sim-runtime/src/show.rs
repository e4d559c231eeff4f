//! Weekly show runner: validates a booking, plays every segment in running
//! order, scores the night and applies the week's aftermath for the brand.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use sim_core::story::{apply_story_ecosystem, key_from_names};
use sim_core::{
    clock, validate_brand_booking, Afterglow, Booking, BookingError, Brand, CardSegment, Dice, HistoryEntry, MatchDetails,
    MatchRecord, SegmentResult, ShowResult, SimConfig, Slot, WorldState,
};
use tracing::{info, warn};

use crate::effects::{self, SegmentRoster};
use crate::rating::{afterglow_tv_bump, is_hot, match_summary, rate_to_blurb};
use crate::simulate::{simulate_bout, Bout};
use crate::{inbox, mentorships, progression, retirement, snapshots};

/// A segment never adds fewer than this many points to the show score.
pub const MIN_SEGMENT_POINTS: i32 = 10;

fn fnv1a(s: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for b in s.bytes() {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Stable segment id: `M{yyyymmdd}-{fnv hex}-{seq base36}`.
pub fn match_id(ymd: &str, brand: Brand, slot: Slot, names: &[String], seq: u64) -> String {
    let raw = format!("{ymd}|{brand}|{slot}|{}|{seq}", names.join("|"));
    format!("M{ymd}-{:08X}-{}", fnv1a(&raw), base36(seq))
}

/// Canonical record for a segment that carries an id.
pub fn segment_record(s: &SegmentResult, brand: Brand, week: u32, date: NaiveDate) -> Option<MatchRecord> {
    let id = s.id.clone()?;
    let title = s
        .explain
        .as_ref()
        .and_then(|e| e.bout())
        .filter(|b| b.title_applied)
        .and_then(|b| b.title.clone());
    Some(MatchRecord {
        id,
        week,
        date,
        brand,
        segment: s.seg,
        kind: s.kind,
        title,
        names: s.names.clone(),
        rating: s.score,
        text: s.text.clone(),
        tags: s.tags.clone(),
        summary: s.summary.clone(),
        details: s.explain.clone(),
    })
}

#[derive(Default)]
struct Tally {
    show_score: i32,
    hot: u32,
    very_hot: u32,
}

/// Run one brand's weekly show.
///
/// The booking is checked in full before anything changes, including that
/// every participant belongs to `brand`; a rejected booking leaves the
/// world untouched.
pub fn run_show(
    world: &mut WorldState,
    brand: Brand,
    booking: &Booking,
    cfg: &SimConfig,
    dice: &mut dyn Dice,
) -> Result<ShowResult, BookingError> {
    if !brand.is_competing() {
        return Err(BookingError::NoShow(brand));
    }
    let card = validate_brand_booking(&world.roster, brand, booking)?;
    snapshots::snapshot_week_baseline_once(world);

    let carried = world.afterglow.get(&brand).copied().unwrap_or_default();
    let last_keys: BTreeSet<String> = world
        .last_week_keys
        .get(&brand)
        .map(|v| v.iter().cloned().collect())
        .unwrap_or_default();
    let ymd = clock::ymd_stamp(world.sim_date());
    let hot_bonus = (f64::from(cfg.story.heat_on_hot) * 0.5).round() as i32;

    let mut tally = Tally::default();
    let mut segments: Vec<SegmentResult> = Vec::with_capacity(card.len());
    let mut match_keys = Vec::new();
    let mut granted: BTreeSet<String> = BTreeSet::new();
    let mut worked: BTreeMap<usize, f64> = BTreeMap::new();
    let mut best: BTreeMap<usize, i32> = BTreeMap::new();
    let mut rosters: Vec<SegmentRoster> = Vec::new();

    for (slot, seg) in &card {
        let slot = *slot;
        let bout = match seg {
            CardSegment::Promo { .. } => None,
            CardSegment::Singles { a, b, title } => Some(Bout {
                slot,
                side_a: vec![*a],
                side_b: vec![*b],
                title: title.clone(),
            }),
            CardSegment::Tag { teams, title } => Some(Bout {
                slot,
                side_a: teams[0].to_vec(),
                side_b: teams[1].to_vec(),
                title: title.clone(),
            }),
        };
        let (score, text, tags, summary, names, explain) = match (seg, bout) {
            (CardSegment::Promo { speaker, text }, _) => {
                let out = effects::run_promo(world, brand, *speaker, text.as_deref(), cfg, dice);
                let m = worked.entry(*speaker).or_insert(cfg.fatigue.promo_mult);
                *m = m.max(cfg.fatigue.promo_mult);
                rosters.push(SegmentRoster {
                    slot,
                    side_a: vec![*speaker],
                    side_b: Vec::new(),
                });
                let names = vec![out.details.speaker.clone()];
                (out.score, out.text, Vec::new(), out.summary, names, MatchDetails::Promo(out.details))
            }
            (_, None) => continue,
            (_, Some(bout)) => {
                let mut out = simulate_bout(world, brand, &bout, cfg, dice);
                let key = key_from_names(&out.names);
                let raw = out.score;
                let mut score = raw;

                let mut penalty = 0;
                if last_keys.contains(&key) {
                    let immune = world
                        .hot_matches
                        .get(&brand)
                        .and_then(|m| m.get(&key))
                        .is_some_and(|ttl| *ttl > 0);
                    if immune {
                        out.tags.push("hot rematch (no penalty)".into());
                    } else {
                        let in_story = world.stories(brand).is_some_and(|s| s.find(&out.names).is_some());
                        // Storyline rematches are expected and cost half.
                        let frac = if in_story { cfg.repeat_penalty / 2.0 } else { cfg.repeat_penalty };
                        penalty = (f64::from(raw) * frac).round() as i32;
                        score -= penalty;
                        out.tags.push(if in_story {
                            format!("repeat -{penalty} (story)")
                        } else {
                            format!("repeat -{penalty}")
                        });
                    }
                }

                let hot = is_hot(raw, out.expected, &cfg.hot);
                if hot {
                    out.tags.push("hot match".into());
                    world.hot_matches.entry(brand).or_default().insert(key.clone(), cfg.hot.ttl);
                    granted.insert(key.clone());
                }

                let heat = world
                    .stories_mut(brand)
                    .record_segment(&out.names, score, hot, penalty, hot_bonus);
                if let Some(mut d) = heat {
                    out.tags.push(if d.applied > 0 {
                        format!("story heat +{}", d.applied)
                    } else {
                        format!("story heat {}", d.applied)
                    });
                    apply_story_ecosystem(
                        &mut d,
                        &mut world.roster,
                        &mut world.relationships,
                        &out.winners,
                        &out.losers,
                        score,
                    );
                    out.details.story_heat = Some(d);
                }
                out.details.repeat_penalty = penalty;

                if score >= cfg.crowd.very_hot_seg {
                    tally.very_hot += 1;
                }
                if score >= cfg.crowd.hot_seg {
                    tally.hot += 1;
                }
                let mult = effects::slot_fatigue_mult(slot);
                for &i in bout.side_a.iter().chain(&bout.side_b) {
                    let m = worked.entry(i).or_insert(mult);
                    *m = m.max(mult);
                }
                rosters.push(SegmentRoster {
                    slot,
                    side_a: bout.side_a.clone(),
                    side_b: bout.side_b.clone(),
                });
                match_keys.push(key);

                let summary = match_summary(score, &out.names);
                let explain = if bout.is_tag() {
                    MatchDetails::Tag(out.details.clone())
                } else {
                    MatchDetails::Singles(out.details.clone())
                };
                (score, out.text, out.tags, summary, out.names, explain)
            }
        };

        tally.show_score += ((f64::from(score) * slot.weight()).round() as i32).max(MIN_SEGMENT_POINTS);
        for i in seg.participants() {
            let b = best.entry(i).or_insert(score);
            *b = (*b).max(score);
        }

        let seq = world.next_match_seq();
        let id = match_id(&ymd, brand, slot, &names, seq);
        let kind = seg.kind();
        segments.push(SegmentResult {
            id: Some(id),
            seg: slot,
            kind,
            score,
            text,
            tags,
            summary,
            names,
            explain: Some(explain),
        });
    }

    let appeared: BTreeSet<usize> = worked.keys().copied().collect();
    let mut draw: Vec<(f64, i32)> = appeared
        .iter()
        .filter_map(|&i| world.roster.get(i))
        .map(|c| (f64::from(c.star_power) + f64::from(c.likeability) * 0.3, c.star_power))
        .collect();
    draw.sort_by(|x, y| y.0.total_cmp(&x.0));
    let top: Vec<i32> = draw.iter().take(cfg.tv.star_draw_top_n).map(|d| d.1).collect();
    if !top.is_empty() {
        let avg = f64::from(top.iter().sum::<i32>()) / top.len() as f64;
        tally.show_score += (avg * cfg.tv.star_draw_factor).round() as i32;
    }

    let champ_penalty_info = effects::champion_aura_drift(world, brand);
    tally.show_score -= champ_penalty_info.total_penalty;

    // Each show consumes one week of carried afterglow.
    if carried.ttl > 0 {
        tally.show_score += match carried.level {
            l if l >= 2 => cfg.crowd.big_boost,
            1 => cfg.crowd.boost,
            _ => 0,
        };
        let ttl = carried.ttl - 1;
        let level = if ttl == 0 { 0 } else { carried.level };
        world.afterglow.insert(brand, Afterglow { level, ttl });
    }

    let match_segs: Vec<usize> = (0..segments.len()).filter(|&i| segments[i].kind.is_match()).collect();
    let me = match_segs.iter().copied().find(|&i| segments[i].seg == Slot::MainEvent);
    if let Some(me) = me.filter(|_| match_segs.len() > 1) {
        let others: Vec<i32> = match_segs.iter().filter(|&&i| i != me).map(|&i| segments[i].score).collect();
        let avg_others = (f64::from(others.iter().sum::<i32>()) / others.len() as f64).round() as i32;
        let me_score = segments[me].score;
        if me_score < cfg.main_event.flat_floor || me_score + cfg.main_event.underwhelm_delta < avg_others {
            tally.show_score += cfg.main_event.penalty;
            segments[me].tags.push("underwhelming main event".into());
        }
    }

    let (week, date) = (world.week, world.sim_date());
    for rec in segments.iter().filter_map(|s| segment_record(s, brand, week, date)) {
        world.matches.insert(rec.id.clone(), rec);
    }

    let wavg = f64::from(tally.show_score) / Slot::total_weight();
    let (bump, note) = afterglow_tv_bump(&segments);
    let tv_rating = (((wavg - cfg.tv.baseline) / cfg.tv.scale).round() + bump).clamp(1.0, 10.0);
    let level = if tally.very_hot >= 1 {
        2
    } else if tally.hot >= 2 {
        1
    } else {
        0
    };
    if level > 0 {
        world.afterglow.insert(
            brand,
            Afterglow {
                level,
                ttl: cfg.crowd.afterglow_ttl,
            },
        );
    }
    let mut fan_react = rate_to_blurb(tv_rating).to_string();
    if let Some(n) = note {
        fan_react.push(' ');
        fan_react.push_str(n);
    }

    world.stories_mut(brand).decay(cfg.story.decay);
    progression::run_progression(world, brand, &appeared, &best, dice);
    mentorships::run_mentorships(world, brand, dice);
    effects::countdown_injuries(world, brand);
    effects::apply_fatigue(world, brand, &worked, cfg, dice);
    inbox::weekly_mail(world, brand, &segments);
    if let Some(map) = world.hot_matches.get_mut(&brand) {
        for (k, ttl) in map.iter_mut() {
            if !granted.contains(k) {
                *ttl -= 1;
            }
        }
        map.retain(|_, ttl| *ttl > 0);
    }
    let injuries = effects::roll_injuries(world, brand, &rosters, cfg, dice);
    let retired_this_week = retirement::process_retirements(world, brand, cfg);
    if let Err(e) = sim_econ::contract_tick(world, brand) {
        warn!(%brand, error = %e, "contract tick failed");
    }

    let result = ShowResult {
        brand,
        week: world.week,
        segments,
        show_score: (wavg.round() as i32).max(MIN_SEGMENT_POINTS),
        tv_rating,
        fan_react,
        match_keys,
        champ_penalty_info,
        injuries,
        retired_this_week,
    };
    if let Err(e) = sim_econ::record_weekly_finance(world, &result) {
        warn!(%brand, error = %e, "finance row not recorded");
    }
    world.history.entry(brand).or_default().push(HistoryEntry {
        week: result.week,
        date,
        tv_rating: result.tv_rating,
        show_score: result.show_score,
        segments: result.segments.clone(),
        injuries: result.injuries.clone(),
        retired_this_week: result.retired_this_week.clone(),
    });
    world.last_week_keys.insert(brand, result.match_keys.clone());
    info!(
        %brand,
        week = result.week,
        score = result.show_score,
        tv = result.tv_rating,
        injuries = result.injuries.len(),
        "show complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::small_world;
    use sim_core::story::Storyline;
    use sim_core::{FlatDice, SegmentSpec};

    fn card() -> Booking {
        Booking::from([
            (Slot::Opener, SegmentSpec::Singles { a: "Ace".into(), b: "Bolt".into(), championship: None }),
            (Slot::Promo1, SegmentSpec::Promo { speaker: "Eve".into(), text: None }),
            (Slot::Match, SegmentSpec::Singles { a: "Eve".into(), b: "Fay".into(), championship: None }),
            (Slot::MainEvent, SegmentSpec::Singles { a: "Cid".into(), b: "Dax".into(), championship: None }),
        ])
    }

    #[test]
    fn ids_are_stable_and_shaped() {
        let names = vec!["Ace".to_string(), "Bolt".to_string()];
        let a = match_id("20250106", Brand::Raw, Slot::Opener, &names, 37);
        let b = match_id("20250106", Brand::Raw, Slot::Opener, &names, 37);
        assert_eq!(a, b);
        assert!(a.starts_with("M20250106-"));
        assert!(a.ends_with("-11"));
        assert_eq!(a.len(), "M20250106-".len() + 8 + 3);
        assert_ne!(a, match_id("20250106", Brand::Raw, Slot::Opener, &names, 38));
    }

    #[test]
    fn fnv_matches_reference_vector() {
        assert_eq!(fnv1a(""), 0x811c_9dc5);
        assert_eq!(fnv1a("a"), 0xe40c_292c);
    }

    #[test]
    fn show_records_every_segment() {
        let mut w = small_world();
        let r = run_show(&mut w, Brand::Raw, &card(), &SimConfig::default(), &mut FlatDice::quiet()).unwrap();
        assert_eq!(r.segments.len(), 4);
        assert_eq!(w.matches.len(), 4);
        assert!(r.segments.iter().all(|s| s.id.as_deref().is_some_and(|id| w.matches.contains_key(id))));
        assert!((1.0..=10.0).contains(&r.tv_rating));
        assert_eq!(r.match_keys.len(), 3);
        assert_eq!(w.history[&Brand::Raw].len(), 1);
        assert_eq!(w.last_week_keys[&Brand::Raw], r.match_keys);
        assert!(w.baseline.is_some());
    }

    #[test]
    fn rejected_booking_changes_nothing() {
        let mut w = small_world();
        let before = w.clone();
        let mut bad = card();
        bad.insert(Slot::Tag, SegmentSpec::Singles { a: "Ace".into(), b: "Eve".into(), championship: None });
        let err = run_show(&mut w, Brand::Raw, &bad, &SimConfig::default(), &mut FlatDice::quiet()).unwrap_err();
        assert_eq!(err, BookingError::MixedGenderSingles(Slot::Tag));
        assert_eq!(w, before);
        assert!(matches!(
            run_show(&mut w, Brand::FreeAgency, &card(), &SimConfig::default(), &mut FlatDice::quiet()),
            Err(BookingError::NoShow(Brand::FreeAgency))
        ));
    }

    #[test]
    fn straight_rematch_is_penalized() {
        let mut w = small_world();
        let cfg = SimConfig::default();
        run_show(&mut w, Brand::Raw, &card(), &cfg, &mut FlatDice::quiet()).unwrap();
        w.hot_matches.clear();
        w.storylines.clear();
        w.week += 1;
        let r = run_show(&mut w, Brand::Raw, &card(), &cfg, &mut FlatDice::quiet()).unwrap();
        let opener = r.segments.iter().find(|s| s.seg == Slot::Opener).unwrap();
        assert!(opener.tags.iter().any(|t| t.starts_with("repeat -")));
        let penalty = opener.explain.as_ref().and_then(|e| e.bout()).map(|b| b.repeat_penalty).unwrap();
        assert!(penalty > 0);
    }

    #[test]
    fn storyline_rematch_costs_half_the_configured_penalty() {
        let mut w = small_world();
        let cfg = SimConfig { repeat_penalty: 0.40, ..SimConfig::default() };
        run_show(&mut w, Brand::Raw, &card(), &cfg, &mut FlatDice::quiet()).unwrap();
        w.hot_matches.clear();
        w.storylines.clear();
        w.stories_mut(Brand::Raw).lines.push(Storyline {
            names: vec!["Ace".into(), "Bolt".into()],
            heat: 30,
            ..Storyline::default()
        });
        w.week += 1;
        let r = run_show(&mut w, Brand::Raw, &card(), &cfg, &mut FlatDice::quiet()).unwrap();
        let opener = r.segments.iter().find(|s| s.seg == Slot::Opener).unwrap();
        let penalty = opener.explain.as_ref().and_then(|e| e.bout()).map(|b| b.repeat_penalty).unwrap();
        let raw = opener.score + penalty;
        assert_eq!(penalty, (f64::from(raw) * 0.20).round() as i32);
        assert!(opener.tags.contains(&format!("repeat -{penalty} (story)")));
    }

    #[test]
    fn off_brand_talent_cannot_take_a_belt() {
        let mut w = small_world();
        let before = w.clone();
        let booking = Booking::from([(
            Slot::MainEvent,
            SegmentSpec::Singles { a: "Gus".into(), b: "Hal".into(), championship: Some("World".into()) },
        )]);
        let err = run_show(&mut w, Brand::Raw, &booking, &SimConfig::default(), &mut FlatDice::eager()).unwrap_err();
        assert_eq!(err, BookingError::OffBrand { slot: Slot::MainEvent, name: "Gus".into(), brand: Brand::Raw });
        assert_eq!(w, before);
        assert!(sim_core::titles::holder(&w.titles, Brand::Raw, "World").is_none());
    }

    #[test]
    fn afterglow_carries_into_the_next_two_shows() {
        let mut cfg = SimConfig::default();
        cfg.crowd.hot_seg = 1000;
        cfg.crowd.very_hot_seg = 1000;
        let mut glowing = small_world();
        glowing.afterglow.insert(Brand::Raw, Afterglow { level: 2, ttl: 2 });
        let mut flat = small_world();

        let mut gaps = Vec::new();
        let mut left = Vec::new();
        for _ in 0..3 {
            let a = run_show(&mut glowing, Brand::Raw, &card(), &cfg, &mut FlatDice::quiet()).unwrap();
            let b = run_show(&mut flat, Brand::Raw, &card(), &cfg, &mut FlatDice::quiet()).unwrap();
            gaps.push(a.show_score - b.show_score);
            left.push(glowing.afterglow[&Brand::Raw]);
            crate::season::advance_week(&mut glowing);
            crate::season::advance_week(&mut flat);
        }
        assert!(gaps[0] >= 1 && gaps[1] >= 1, "{gaps:?}");
        assert_eq!(gaps[2], 0);
        assert_eq!(
            left,
            vec![Afterglow { level: 2, ttl: 1 }, Afterglow { level: 0, ttl: 0 }, Afterglow { level: 0, ttl: 0 }]
        );
    }

    #[test]
    fn show_score_is_the_weighted_average() {
        let mut w = small_world();
        let booking = Booking::from([(
            Slot::MainEvent,
            SegmentSpec::Singles { a: "Cid".into(), b: "Dax".into(), championship: None },
        )]);
        let mut cfg = SimConfig::default();
        cfg.tv.star_draw_factor = 0.0;
        let r = run_show(&mut w, Brand::Raw, &booking, &cfg, &mut FlatDice::quiet()).unwrap();
        let tally = ((f64::from(r.segments[0].score) * 1.4).round() as i32).max(MIN_SEGMENT_POINTS);
        let expected = ((f64::from(tally) / Slot::total_weight()).round() as i32).max(MIN_SEGMENT_POINTS);
        assert!(r.show_score < tally);
        assert_eq!(r.show_score, expected);
        assert_eq!(w.history[&Brand::Raw][0].show_score, expected);
    }
}
