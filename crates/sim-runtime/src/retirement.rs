//! Retirement: age and worn-out bodies end careers.

use sim_core::titles::vacate_holder;
use sim_core::{Brand, Character, Role, SimConfig, WorldState};
use tracing::info;

/// Stamina or durability below this forces retirement.
pub const BROKEN_DOWN: i32 = 10;

pub fn should_retire(c: &Character, age: i32, cfg: &SimConfig) -> bool {
    age >= cfg.retirement_age || c.stamina < BROKEN_DOWN || c.durability < BROKEN_DOWN
}

/// Retire everyone on `brand` who is due. Belts are vacated and the retiree
/// moves to the free-agent pool without a contract. Returns only the names
/// retired by this call. Injuries keep healing in the free-agent pool.
pub fn process_retirements(world: &mut WorldState, brand: Brand, cfg: &SimConfig) -> Vec<String> {
    let today = world.sim_date();
    let due: Vec<String> = world
        .brand_roster(brand)
        .filter(|c| !c.retired && should_retire(c, c.age_on(today), cfg))
        .map(|c| c.name.clone())
        .collect();
    if due.is_empty() {
        return due;
    }
    for name in &due {
        let vacated = vacate_holder(&mut world.titles, name);
        if let Some(c) = world.find_mut(name) {
            c.retired = true;
            c.role = Role::Retired;
            c.brand = Brand::FreeAgency;
            c.contract = None;
        }
        info!(%brand, name = %name, vacated = vacated.len(), "retired");
        if brand == world.user_brand {
            world.push_mail(
                "Talent Relations",
                "Retirement",
                &format!("{name} has retired and moved to the free-agent pool."),
            );
        }
    }
    world.refresh_champions();
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::small_world;
    use chrono::NaiveDate;
    use sim_core::titles::holder;
    use sim_core::TitleHolder;

    #[test]
    fn old_champion_retires_and_belt_goes_vacant() {
        let mut w = small_world();
        let cfg = SimConfig::default();
        w.find_mut("Ace").unwrap().birthday = NaiveDate::from_ymd_opt(1940, 1, 1).unwrap();
        w.titles
            .entry(Brand::Raw)
            .or_default()
            .insert("World".into(), Some(TitleHolder::Single("Ace".into())));
        w.refresh_champions();

        let gone = process_retirements(&mut w, Brand::Raw, &cfg);
        assert_eq!(gone, vec!["Ace".to_string()]);
        let ace = w.find("Ace").unwrap();
        assert!(ace.retired);
        assert_eq!(ace.role, Role::Retired);
        assert_eq!(ace.brand, Brand::FreeAgency);
        assert!(ace.champion_of.is_empty());
        assert!(holder(&w.titles, Brand::Raw, "World").is_none());
        assert_eq!(w.inbox[0].title, "Retirement");

        assert!(process_retirements(&mut w, Brand::Raw, &cfg).is_empty());
    }

    #[test]
    fn broken_body_retires_young() {
        let mut w = small_world();
        w.find_mut("Bolt").unwrap().durability = 5;
        let gone = process_retirements(&mut w, Brand::Raw, &SimConfig::default());
        assert_eq!(gone, vec!["Bolt".to_string()]);
    }

    #[test]
    fn retiring_keeps_the_injury_clock() {
        let mut w = small_world();
        {
            let cid = w.find_mut("Cid").unwrap();
            cid.stamina = 5;
            cid.injury_weeks = 4;
        }
        let gone = process_retirements(&mut w, Brand::Raw, &SimConfig::default());
        assert_eq!(gone, vec!["Cid".to_string()]);
        let cid = w.find("Cid").unwrap();
        assert_eq!(cid.brand, Brand::FreeAgency);
        assert_eq!(cid.injury_weeks, 4);
    }
}
