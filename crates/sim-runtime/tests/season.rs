use proptest::prelude::*;
use sim_core::titles::{holder, WORLD_TITLE};
use sim_core::{
    validate_world, Attr, Booking, BookingError, Brand, ErrorReply, FlatDice, SegmentSpec, SimConfig, Slot,
    TitleHolder, WorldState,
};
use sim_runtime::{advance_week, new_world, normalize_match_records, run_rival_week, run_show, run_week};

fn singles(a: &str, b: &str, title: Option<&str>) -> SegmentSpec {
    SegmentSpec::Singles {
        a: a.into(),
        b: b.into(),
        championship: title.map(str::to_string),
    }
}

fn play_weeks(world: &mut WorldState, cfg: &SimConfig, weeks: u32) {
    for _ in 0..weeks {
        let brand = world.user_brand;
        let card = sim_ai::ai_booking(world, brand, cfg, &mut sim_runtime::week_dice(world, brand));
        run_week(world, &card, cfg).unwrap();
        run_rival_week(world, cfg).unwrap();
        advance_week(world);
    }
}

#[test]
fn mixed_gender_card_is_rejected_without_side_effects() {
    let cfg = SimConfig::default();
    let mut w = new_world(3, Brand::Raw, &cfg);
    let before = w.clone();
    let mut card = Booking::new();
    card.insert(Slot::Opener, singles("Silas Crane", "Dante Vox", None));
    card.insert(Slot::MainEvent, singles("Rex Calloway", "Lana Frost", None));

    let err = run_week(&mut w, &card, &cfg).unwrap_err();
    assert_eq!(err, BookingError::MixedGenderSingles(Slot::MainEvent));
    assert_eq!(w, before);

    let reply = ErrorReply { error: err.to_string() };
    assert_eq!(
        serde_json::to_string(&reply).unwrap(),
        r#"{"error":"MainEvent: Mixed-gender singles is not allowed."}"#
    );
}

#[test]
fn vacant_belt_is_won_then_defended() {
    let cfg = SimConfig::default();
    let mut w = new_world(3, Brand::Raw, &cfg);
    w.titles.get_mut(&Brand::Raw).unwrap().insert(WORLD_TITLE.into(), None);
    w.refresh_champions();

    // Quiet dice always hand the bout to the second name.
    let mut card = Booking::new();
    card.insert(Slot::MainEvent, singles("Silas Crane", "Dante Vox", Some(WORLD_TITLE)));
    let show = run_show(&mut w, Brand::Raw, &card, &cfg, &mut FlatDice::quiet()).unwrap();
    assert_eq!(holder(&w.titles, Brand::Raw, WORLD_TITLE), Some(&TitleHolder::Single("Dante Vox".into())));
    assert!(show.segments[0].tags.iter().any(|t| t.to_lowercase().contains("title change")));
    assert_eq!(w.find("Dante Vox").unwrap().champion_of, vec!["RAW World".to_string()]);
    advance_week(&mut w);

    let mut card = Booking::new();
    card.insert(Slot::MainEvent, singles("Jet Rivera", "Dante Vox", Some(WORLD_TITLE)));
    run_show(&mut w, Brand::Raw, &card, &cfg, &mut FlatDice::quiet()).unwrap();
    assert_eq!(holder(&w.titles, Brand::Raw, WORLD_TITLE), Some(&TitleHolder::Single("Dante Vox".into())));
    assert_eq!(validate_world(&w), Ok(()));
}

#[test]
fn same_pairing_next_week_costs_points() {
    let cfg = SimConfig::default();
    let mut w = new_world(3, Brand::Raw, &cfg);
    let mut card = Booking::new();
    card.insert(Slot::Opener, singles("Owen Pike", "Vic Malone", None));
    run_show(&mut w, Brand::Raw, &card, &cfg, &mut FlatDice::quiet()).unwrap();
    advance_week(&mut w);
    w.hot_matches.values_mut().for_each(|m| m.clear());

    let show = run_show(&mut w, Brand::Raw, &card, &cfg, &mut FlatDice::quiet()).unwrap();
    assert!(show.segments[0].tags.iter().any(|t| t.starts_with("repeat -")));
}

#[test]
fn season_keeps_records_and_normalizes_to_a_fixed_point() {
    let cfg = SimConfig::default();
    let mut w = new_world(5, Brand::SmackDown, &cfg);
    play_weeks(&mut w, &cfg, 6);

    assert_eq!(w.week, 7);
    assert_eq!(w.history[&Brand::Raw].len(), 6);
    assert_eq!(w.history[&Brand::SmackDown].len(), 6);
    let ids = w
        .history
        .values()
        .flatten()
        .flat_map(|h| &h.segments)
        .filter_map(|s| s.id.clone())
        .collect::<std::collections::BTreeSet<_>>();
    assert_eq!(ids.len(), w.matches.len());

    assert_eq!(normalize_match_records(&mut w, true).changed, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]
    #[test]
    fn any_seed_keeps_the_world_valid(seed in 0u64..5_000) {
        let cfg = SimConfig::default();
        let mut w = new_world(seed, Brand::Raw, &cfg);
        play_weeks(&mut w, &cfg, 3);
        prop_assert_eq!(validate_world(&w), Ok(()));
        for c in &w.roster {
            for a in Attr::CORE {
                let (lo, hi) = a.bounds();
                prop_assert!((lo..=hi).contains(&c.attr(a)), "{} {:?} = {}", c.name, a, c.attr(a));
            }
            prop_assert!(c.fatigue >= 0);
        }
    }
}
