//! Core domain models and invariants for Ringside Booker.
//!
//! This crate defines the serializable world aggregate and everything it is
//! built from: characters and their attribute model, belts, bookings, match
//! records, storylines, relationships and chemistry. It also owns the tuning
//! config, the injectable dice, the simulated calendar, and the repair and
//! validation passes that keep a save internally consistent.

pub mod archetype;
pub mod booking;
pub mod character;
pub mod chemistry;
pub mod clock;
pub mod config;
pub mod dice;
pub mod records;
pub mod relationships;
pub mod seed;
pub mod story;
pub mod titles;
pub mod world;

pub use booking::{
    validate_booking, validate_brand_booking, Booking, BookingError, Card, CardSegment, ErrorReply, SegmentKind,
    SegmentSpec, Slot,
};
pub use character::{Alignment, Attr, Brand, Character, Contract, ContractKind, Gender, Role};
pub use chemistry::{pair_key, Chemistry};
pub use config::SimConfig;
pub use dice::{Dice, FlatDice, SeededDice};
pub use records::{
    BoutDetails, ChampPenaltyInfo, HistoryEntry, InjuryReport, MatchDetails, MatchRecord, PromoDetails,
    SegmentResult, ShowResult, StoryHeatDetail,
};
pub use relationships::{RelType, RelationshipGraph};
pub use story::{key_from_names, StoryBook, Storyline};
pub use titles::{TitleHolder, TitleMap};
pub use world::{repair_world, validate_world, Afterglow, InboxMessage, MentorSlot, ValidationError, WorldState};
