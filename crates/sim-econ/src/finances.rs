//! Weekly show finances.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sim_core::world::{Expenses, FinanceRow, PendingAdjustment, Revenue, FINANCE_HISTORY_LIMIT};
use sim_core::{Brand, ContractKind, ShowResult, WorldState};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::{format_money, EconError};

const BASE_ATTENDANCE: f64 = 11_000.0;
const MIN_ATTENDANCE: f64 = 9_000.0;
const ATTENDANCE_PER_RATING: f64 = 900.0;
const ATTENDANCE_PER_AFTERGLOW: f64 = 120.0;
const TICKET_PRICE: i64 = 45;
const TV_BASE: f64 = 160_000.0;
const TV_PER_RATING: f64 = 65_000.0;
const MERCH_PER_STAR: i64 = 1_400;
const SPONSOR_PER_AFTERGLOW: i64 = 12_000;
const PRODUCTION_BASE: i64 = 130_000;
const PRODUCTION_PER_HEAD: i64 = 14;
const TRAVEL_PER_WORKER: i64 = 1_800;
const MEDICAL_PER_WEEK: i64 = 5_000;

/// Revenue and expense lines for one show, before adjustments.
#[derive(Clone, Debug, PartialEq)]
pub struct FinanceBreakdown {
    pub attendance: u32,
    pub revenue: Revenue,
    pub expenses: Expenses,
}

/// Make sure both brands have books and drop adjustments for brands that
/// cannot record a show.
pub fn ensure_ledger(world: &mut WorldState) {
    for b in Brand::COMPETING {
        world.finances.brands.entry(b).or_default();
    }
    world.finances.brands.retain(|b, _| b.is_competing());
    world.finances.pending.retain(|p| p.brand.is_competing());
}

/// Queue a one-off charge (negative) or credit for a brand's show in `week`.
pub fn queue_adjustment(
    world: &mut WorldState,
    brand: Brand,
    week: u32,
    amount: Decimal,
    reason: &str,
) -> Result<(), EconError> {
    if !brand.is_competing() {
        return Err(EconError::NotABrand(brand));
    }
    world.finances.pending.push(PendingAdjustment {
        brand,
        week,
        amount,
        reason: if reason.trim().is_empty() { "Adjustment".into() } else { reason.to_string() },
    });
    Ok(())
}

fn dec(v: f64) -> Result<Decimal, EconError> {
    Decimal::from_f64(v.round()).ok_or(EconError::NonFinite)
}

/// Price a finished show.
pub fn compute_breakdown(world: &WorldState, show: &ShowResult) -> Result<FinanceBreakdown, EconError> {
    let brand = show.brand;
    if !brand.is_competing() {
        return Err(EconError::NotABrand(brand));
    }
    if !show.tv_rating.is_finite() {
        return Err(EconError::NonFinite);
    }
    let rating = show.tv_rating;
    let glow = world.afterglow.get(&brand).map(|a| a.ttl).unwrap_or(0);

    let attendance = (BASE_ATTENDANCE + rating * ATTENDANCE_PER_RATING + f64::from(glow) * ATTENDANCE_PER_AFTERGLOW)
        .round()
        .max(MIN_ATTENDANCE);
    let attendance_i = attendance as i64;

    let used: BTreeSet<&str> = show
        .segments
        .iter()
        .flat_map(|s| s.names.iter().map(String::as_str))
        .collect();
    let workers: Vec<_> = used.iter().filter_map(|n| world.find(n)).collect();
    let star_sum: i64 = workers.iter().map(|c| i64::from(c.star_power)).sum();

    let revenue = Revenue {
        tickets: Decimal::from(attendance_i * TICKET_PRICE),
        tv: dec(TV_BASE + rating.max(0.0) * TV_PER_RATING)?,
        merch: Decimal::from(star_sum * MERCH_PER_STAR),
        sponsorship: Decimal::from(i64::from(glow) * SPONSOR_PER_AFTERGLOW),
    };

    let payroll = world
        .brand_roster(brand)
        .filter_map(|c| {
            let k = c.contract.as_ref()?;
            match k.kind {
                ContractKind::Full => Some(k.salary),
                ContractKind::PerAppearance if used.contains(c.name.as_str()) => Some(k.salary),
                ContractKind::PerAppearance => None,
            }
        })
        .sum::<Decimal>();
    let injury_weeks: i64 = show.injuries.iter().map(|i| i64::from(i.weeks)).sum();
    let expenses = Expenses {
        payroll,
        production: Decimal::from(PRODUCTION_BASE + attendance_i * PRODUCTION_PER_HEAD),
        travel: Decimal::from(workers.len() as i64 * TRAVEL_PER_WORKER),
        medical: Decimal::from(injury_weeks * MEDICAL_PER_WEEK),
    };
    Ok(FinanceBreakdown {
        attendance: attendance_i.max(0) as u32,
        revenue,
        expenses,
    })
}

/// Book a show's finances: price it, fold in any pending adjustments for the
/// brand and week, update cash and totals, and warn the player once per week
/// when their brand is overdrawn.
pub fn record_weekly_finance(world: &mut WorldState, show: &ShowResult) -> Result<FinanceRow, EconError> {
    let brand = show.brand;
    let bd = compute_breakdown(world, show)?;
    let week = world.week;
    let date = world.sim_date();

    let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut world.finances.pending)
        .into_iter()
        .partition(|p| p.brand == brand && p.week == week);
    world.finances.pending = rest;
    let adjustments: Decimal = due.iter().map(|p| p.amount).sum();

    let revenue = bd.revenue.total();
    let expense = bd.expenses.total();
    let net = revenue - expense + adjustments;

    let user_brand = world.user_brand;
    let books = world.books_mut(brand);
    books.revenue_total += revenue;
    books.expense_total += expense;
    books.adjustments_total += adjustments;
    books.cash += net;
    let row = FinanceRow {
        week,
        date,
        attendance: bd.attendance,
        revenue: bd.revenue,
        expenses: bd.expenses,
        adjustments,
        net,
        cash_after: books.cash,
    };
    books.history.push(row.clone());
    let excess = books.history.len().saturating_sub(FINANCE_HISTORY_LIMIT);
    books.history.drain(..excess);

    let overdrawn = books.cash < Decimal::ZERO && books.warned_negative_week != Some(week) && brand == user_brand;
    let cash = books.cash;
    if overdrawn {
        books.warned_negative_week = Some(week);
        warn!(%brand, week, cash = %cash, "brand overdrawn");
        world.push_mail(
            "Finance Office",
            &format!("{brand} finances overdrawn"),
            &format!(
                "We are {} in the red. Consider trimming payroll or booking hotter cards to boost revenue.",
                format_money(cash.abs())
            ),
        );
    }
    info!(%brand, week, net = %net, cash = %cash, "finances recorded");
    Ok(row)
}
