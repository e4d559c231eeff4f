//! Season lifecycle: building a fresh world, running both brands' weeks and
//! moving the calendar forward.

use sim_core::seed::{champion_seed, seed_relationships, seed_roster};
use sim_core::titles::{strip_cross_brand_titles, titles_for};
use sim_core::{repair_world, Booking, BookingError, Brand, SeededDice, ShowResult, SimConfig, WorldState};
use sim_econ::{backfill_contracts, ensure_ledger};
use tracing::{debug, info};

use crate::effects::countdown_injuries;
use crate::show::run_show;

fn briefing(world: &WorldState, brand: Brand) -> String {
    let mut top: Vec<(&str, i32)> = world.brand_roster(brand).map(|c| (c.name.as_str(), c.overall())).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1));
    let mut lines = vec![
        format!("Welcome, manager of {brand}."),
        String::new(),
        format!("Your aim this season is simple: beat {} in both TV ratings and revenue.", brand.rival()),
        "The brand with the best average TV rating gets the season-closing main event.".to_string(),
        String::new(),
        "Top stars to build around:".to_string(),
    ];
    lines.extend(top.iter().take(3).map(|(n, ov)| format!("• {n} (OVR {ov})")));
    lines.push(String::new());
    lines.push("Current champions:".to_string());
    for title in titles_for(brand) {
        let held = world
            .titles
            .get(&brand)
            .and_then(|m| m.get(*title))
            .and_then(Option::as_ref)
            .map(|h| h.label())
            .unwrap_or_else(|| "Vacant".to_string());
        lines.push(format!("• {title}: {held}"));
    }
    lines.join("\n")
}

/// Fill in everything a loaded or hand-built world may be missing: the
/// core repair pass plus contracts and finance books.
pub fn hydrate(world: &mut WorldState) {
    repair_world(world);
    let signed = backfill_contracts(world);
    ensure_ledger(world);
    debug!(signed, "world hydrated");
}

/// Start a new season from the opening roster with the user booking
/// `user_brand`.
pub fn new_world(seed: u64, user_brand: Brand, cfg: &SimConfig) -> WorldState {
    let mut world = WorldState {
        seed,
        user_brand,
        roster: seed_roster(),
        titles: champion_seed(),
        ..WorldState::default()
    };
    let stripped = strip_cross_brand_titles(&mut world.titles, &world.roster);
    seed_relationships(&mut world.relationships, &world.roster);
    hydrate(&mut world);
    let body = briefing(&world, user_brand);
    world.push_mail("Head Office", &format!("Season Briefing: {user_brand}"), &body);
    info!(
        seed,
        %user_brand,
        roster = world.roster.len(),
        stripped = stripped.len(),
        retirement_age = cfg.retirement_age,
        "new season"
    );
    world
}

/// Dice for one brand's show in the current week. The same save, week and
/// brand always roll the same numbers.
pub fn week_dice(world: &WorldState, brand: Brand) -> SeededDice {
    let salt = match brand {
        Brand::Raw => 0x52,
        Brand::SmackDown => 0x53,
        Brand::FreeAgency => 0x46,
    };
    let mix = world
        .seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add((u64::from(world.week) << 8) | salt);
    SeededDice::new(mix)
}

/// Run the user's show for this week.
pub fn run_week(world: &mut WorldState, booking: &Booking, cfg: &SimConfig) -> Result<ShowResult, BookingError> {
    let brand = world.user_brand;
    let mut dice = week_dice(world, brand);
    run_show(world, brand, booking, cfg, &mut dice)
}

/// Let the AI book and run the rival brand's show for this week.
pub fn run_rival_week(world: &mut WorldState, cfg: &SimConfig) -> Result<ShowResult, BookingError> {
    let brand = world.user_brand.rival();
    let mut dice = week_dice(world, brand);
    let card = sim_ai::ai_booking(world, brand, cfg, &mut dice);
    run_show(world, brand, &card, cfg, &mut dice)
}

/// Close the week: advance the calendar, heal free agents and let untouched
/// chemistry and relationships cool. Afterglow is spent by shows, not weeks.
pub fn advance_week(world: &mut WorldState) {
    world.week += 1;
    let healed = countdown_injuries(world, Brand::FreeAgency);
    world.chemistry.decay();
    world.relationships.decay();
    info!(week = world.week, date = %world.sim_date(), healed = healed.len(), "week advanced");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::titles::{holder, WORLD_TITLE};
    use sim_core::validate_world;
    use sim_core::world::Afterglow;

    #[test]
    fn new_world_is_valid_and_briefed() {
        let w = new_world(7, Brand::Raw, &SimConfig::default());
        assert_eq!(validate_world(&w), Ok(()));
        assert_eq!(w.seed, 7);
        assert!(w.roster.iter().all(|c| c.contract.is_some() || c.retired));
        assert_eq!(w.inbox.len(), 1);
        assert_eq!(w.inbox[0].from, "Head Office");
        assert!(w.inbox[0].body.contains("• World: Rex Calloway"));
        assert!(holder(&w.titles, Brand::Raw, WORLD_TITLE).is_some());
    }

    #[test]
    fn week_dice_depend_on_brand_and_week() {
        use sim_core::Dice;
        let mut w = new_world(7, Brand::Raw, &SimConfig::default());
        let a = week_dice(&w, Brand::Raw).roll(0, 1_000_000);
        assert_eq!(a, week_dice(&w, Brand::Raw).roll(0, 1_000_000));
        assert_ne!(a, week_dice(&w, Brand::SmackDown).roll(0, 1_000_000));
        w.week += 1;
        assert_ne!(a, week_dice(&w, Brand::Raw).roll(0, 1_000_000));
    }

    #[test]
    fn advance_keeps_afterglow_and_heals_free_agents() {
        let mut w = new_world(7, Brand::Raw, &SimConfig::default());
        w.afterglow.insert(Brand::Raw, Afterglow { level: 2, ttl: 1 });
        w.afterglow.insert(Brand::SmackDown, Afterglow { level: 1, ttl: 2 });
        w.find_mut("Ray Dalton").unwrap().injury_weeks = 1;
        advance_week(&mut w);
        assert_eq!(w.week, 2);
        assert_eq!(w.afterglow[&Brand::Raw], Afterglow { level: 2, ttl: 1 });
        assert_eq!(w.afterglow[&Brand::SmackDown], Afterglow { level: 1, ttl: 2 });
        assert_eq!(w.find("Ray Dalton").unwrap().injury_weeks, 0);
    }

    #[test]
    fn rival_week_runs_the_other_brand() {
        let cfg = SimConfig::default();
        let mut w = new_world(11, Brand::Raw, &cfg);
        let show = run_rival_week(&mut w, &cfg).unwrap();
        assert_eq!(show.brand, Brand::SmackDown);
        assert!(!show.segments.is_empty());
        assert_eq!(w.history[&Brand::SmackDown].len(), 1);
        assert!(w.history[&Brand::Raw].is_empty());
        assert_eq!(validate_world(&w), Ok(()));
    }
}
