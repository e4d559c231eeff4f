//! Talent contracts: backfill, weekly countdown, renewal, and moving
//! characters between brands and free agency.

use rust_decimal::Decimal;
use sim_core::titles::vacate_holder;
use sim_core::{Brand, Character, Contract, ContractKind, Role, WorldState};
use tracing::{debug, info};

use crate::finances::queue_adjustment;
use crate::{format_money, EconError};

/// Length of a fresh or renewed deal.
pub const CONTRACT_WEEKS: u32 = 52;
/// Signing bonus, in weeks of salary.
pub const SIGNING_BONUS_WEEKS: i64 = 2;

/// Lowest weekly salary anyone is paid.
pub const MIN_SALARY: i64 = 500;

/// Weekly salary for a given overall: `overall^2 * 3`, rounded to the
/// nearest $500 and never below [`MIN_SALARY`].
pub fn salary_for_overall(overall: i32) -> Decimal {
    let raw = i64::from(overall.clamp(1, 99)).pow(2) * 3;
    Decimal::from(((raw + 250) / 500 * 500).max(MIN_SALARY))
}

fn fresh_contract(c: &Character) -> Contract {
    let kind = if c.brand.is_competing() { ContractKind::Full } else { ContractKind::PerAppearance };
    Contract {
        salary: salary_for_overall(c.overall()),
        weeks_remaining: CONTRACT_WEEKS,
        kind,
    }
}

/// Give every non-retired character without a deal a contract priced from
/// their overall. Opening deals are staggered so renewals do not all land
/// in the same week. Retired characters lose any deal they still hold.
pub fn backfill_contracts(world: &mut WorldState) -> usize {
    let mut added = 0;
    for c in &mut world.roster {
        if c.retired {
            c.contract = None;
            continue;
        }
        if c.contract.is_none() {
            let mut k = fresh_contract(c);
            let stagger = c.name.bytes().map(u32::from).sum::<u32>() % 40;
            k.weeks_remaining = 12 + stagger;
            c.contract = Some(k);
            added += 1;
        }
    }
    if added > 0 {
        debug!(added, "backfilled contracts");
    }
    added
}

/// Count down every contract on `brand` by one week. Expiring deals for
/// active characters renew for 52 weeks at their current worth, with a
/// signing bonus charged to next week's show. Retired characters' deals
/// lapse. Returns the renewed names.
pub fn contract_tick(world: &mut WorldState, brand: Brand) -> Result<Vec<String>, EconError> {
    if !brand.is_competing() {
        return Err(EconError::NotABrand(brand));
    }
    let mut renewed: Vec<(String, Decimal)> = Vec::new();
    for c in world.roster.iter_mut().filter(|c| c.brand == brand) {
        let overall = c.overall();
        let Some(k) = c.contract.as_mut() else { continue };
        k.weeks_remaining = k.weeks_remaining.saturating_sub(1);
        if k.weeks_remaining > 0 {
            continue;
        }
        if c.retired {
            c.contract = None;
            continue;
        }
        let salary = salary_for_overall(overall);
        k.salary = salary;
        k.weeks_remaining = CONTRACT_WEEKS;
        renewed.push((c.name.clone(), salary));
    }
    let next_week = world.week + 1;
    let user_brand = world.user_brand;
    for (name, salary) in &renewed {
        let bonus = -*salary * Decimal::from(SIGNING_BONUS_WEEKS);
        queue_adjustment(world, brand, next_week, bonus, &format!("Signing bonus: {name}"))?;
        info!(%brand, name = %name, salary = %salary, "contract renewed");
        if brand == user_brand {
            world.push_mail(
                "Talent Relations",
                "Contract Renewed",
                &format!(
                    "{name} re-signed for {CONTRACT_WEEKS} weeks at {}/week.",
                    format_money(*salary)
                ),
            );
        }
    }
    Ok(renewed.into_iter().map(|(n, _)| n).collect())
}

/// Sign a character to a brand in the given role. Any belt they hold is
/// vacated first. A retired character is never signed as an active
/// wrestler; they come aboard as a manager instead.
pub fn sign_to_brand(world: &mut WorldState, name: &str, brand: Brand, role: Role) -> Result<(), EconError> {
    let idx = world
        .index_of(name)
        .ok_or_else(|| EconError::UnknownCharacter(name.to_string()))?;
    vacate_holder(&mut world.titles, name);
    let c = &mut world.roster[idx];
    c.brand = brand;
    c.role = if c.retired && role == Role::Active { Role::Manager } else { role };
    if c.contract.is_none() && !c.retired {
        c.contract = Some(fresh_contract(c));
    }
    world.refresh_champions();
    info!(name, %brand, "signed");
    Ok(())
}

/// Release a character to free agency, vacating any held belt.
pub fn release_to_free_agency(world: &mut WorldState, name: &str) -> Result<(), EconError> {
    let idx = world
        .index_of(name)
        .ok_or_else(|| EconError::UnknownCharacter(name.to_string()))?;
    vacate_holder(&mut world.titles, name);
    let c = &mut world.roster[idx];
    c.brand = Brand::FreeAgency;
    if c.retired {
        c.role = Role::Retired;
    }
    if let Some(k) = c.contract.as_mut() {
        k.kind = ContractKind::PerAppearance;
    }
    world.refresh_champions();
    info!(name, "released to free agency");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::titles::{holder, WORLD_TITLE};
    use sim_core::repair_world;

    fn world() -> WorldState {
        let mut w = WorldState::default();
        w.roster = sim_core::seed::seed_roster();
        w.titles = sim_core::seed::champion_seed();
        repair_world(&mut w);
        backfill_contracts(&mut w);
        w
    }

    #[test]
    fn salary_rounds_to_500() {
        assert_eq!(salary_for_overall(80), Decimal::from(19_000));
        assert_eq!(salary_for_overall(50), Decimal::from(7_500));
    }

    #[test]
    fn weakest_workers_still_get_paid() {
        assert_eq!(salary_for_overall(1), Decimal::from(MIN_SALARY));
        assert_eq!(salary_for_overall(12), Decimal::from(MIN_SALARY));
        assert_eq!(salary_for_overall(13), Decimal::from(500));
    }

    #[test]
    fn everyone_active_gets_a_deal() {
        let w = world();
        assert!(w.roster.iter().filter(|c| !c.retired).all(|c| c.contract.is_some()));
    }

    #[test]
    fn expiring_deal_renews_with_bonus() {
        let mut w = world();
        let name = "Rex Calloway";
        w.find_mut(name).unwrap().contract.as_mut().unwrap().weeks_remaining = 1;
        let renewed = contract_tick(&mut w, Brand::Raw).unwrap();
        assert_eq!(renewed, vec![name.to_string()]);
        let k = w.find(name).unwrap().contract.clone().unwrap();
        assert_eq!(k.weeks_remaining, CONTRACT_WEEKS);
        let adj = w.finances.pending.iter().find(|p| p.reason.contains(name)).unwrap();
        assert_eq!(adj.week, 2);
        assert_eq!(adj.amount, -k.salary * Decimal::from(2));
        assert_eq!(w.inbox[0].title, "Contract Renewed");
    }

    #[test]
    fn retired_deals_lapse() {
        let mut w = world();
        let c = w.find_mut("Owen Pike").unwrap();
        c.retired = true;
        c.contract.as_mut().unwrap().weeks_remaining = 1;
        contract_tick(&mut w, Brand::Raw).unwrap();
        assert!(w.find("Owen Pike").unwrap().contract.is_none());
    }

    #[test]
    fn release_vacates_titles() {
        let mut w = world();
        release_to_free_agency(&mut w, "Rex Calloway").unwrap();
        assert!(holder(&w.titles, Brand::Raw, WORLD_TITLE).is_none());
        let rex = w.find("Rex Calloway").unwrap();
        assert_eq!(rex.brand, Brand::FreeAgency);
        assert!(rex.champion_of.is_empty());
        assert!(release_to_free_agency(&mut w, "Nobody").is_err());
    }

    #[test]
    fn retired_signing_becomes_manager() {
        let mut w = world();
        w.find_mut("Ray Dalton").unwrap().retired = true;
        sign_to_brand(&mut w, "Ray Dalton", Brand::SmackDown, Role::Active).unwrap();
        assert_eq!(w.find("Ray Dalton").unwrap().role, Role::Manager);
    }

    proptest! {
        #[test]
        fn salary_is_positive_and_monotone(a in 1i32..99) {
            prop_assert!(salary_for_overall(a) > Decimal::ZERO);
            prop_assert!(salary_for_overall(a + 1) >= salary_for_overall(a));
        }
    }
}
