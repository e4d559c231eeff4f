//! Opponent booking for the rival brand.
//!
//! The AI never sees the user's card. It reads the shared world, fills the
//! rival's seven slots with a greedy planner and hands back a [`Booking`]
//! that the show runner can execute like any user-submitted one.
//!
//! [`Booking`]: sim_core::Booking

pub mod booking;

pub use booking::{ai_booking, star_score, work_score};
