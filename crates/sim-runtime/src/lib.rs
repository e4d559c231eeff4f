//! Weekly show runtime.
//!
//! Everything that moves a season forward lives here: segment rating, bout
//! simulation and its aftermath, the show orchestrator, weekly progression,
//! mentorships, retirements, inbox events and the season lifecycle. All
//! randomness comes in through [`sim_core::Dice`] so a seeded week replays
//! exactly.

pub mod effects;
pub mod inbox;
pub mod mentorships;
pub mod normalize;
pub mod progression;
pub mod rating;
pub mod retirement;
pub mod season;
pub mod show;
pub mod simulate;
pub mod snapshots;

#[cfg(test)]
pub(crate) mod testkit;

pub use normalize::{normalize_match_records, winners_from_text, NormalizeReport};
pub use season::{advance_week, hydrate, new_world, run_rival_week, run_week, week_dice};
pub use show::{match_id, run_show};
pub use snapshots::{profile, CharacterProfile};
