//! Weekly booking input: the seven fixed slots, segment specs, and the
//! legality check that runs before any state is touched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::character::{Brand, Character};

/// The seven fixed TV segment positions, in running order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    PreShow,
    Opener,
    Promo1,
    Tag,
    Promo2,
    Match,
    MainEvent,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::PreShow,
        Slot::Opener,
        Slot::Promo1,
        Slot::Tag,
        Slot::Promo2,
        Slot::Match,
        Slot::MainEvent,
    ];

    /// Contribution of the segment to the night's weighted score.
    pub fn weight(self) -> f64 {
        match self {
            Slot::PreShow => 0.8,
            Slot::Opener | Slot::Tag | Slot::Match => 1.0,
            Slot::Promo1 | Slot::Promo2 => 0.5,
            Slot::MainEvent => 1.4,
        }
    }

    /// Sum of all slot weights.
    pub fn total_weight() -> f64 {
        Slot::ALL.iter().map(|s| s.weight()).sum()
    }

    /// Whether a championship may be contested in this slot.
    pub fn title_eligible(self) -> bool {
        matches!(self, Slot::Opener | Slot::Tag | Slot::Match | Slot::MainEvent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::PreShow => "PreShow",
            Slot::Opener => "Opener",
            Slot::Promo1 => "Promo1",
            Slot::Tag => "Tag",
            Slot::Promo2 => "Promo2",
            Slot::Match => "Match",
            Slot::MainEvent => "MainEvent",
        }
    }

    pub fn parse(s: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|x| x.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the booker asked for in one slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SegmentSpec {
    Promo {
        speaker: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Singles {
        a: String,
        b: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        championship: Option<String>,
    },
    Tag {
        teams: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        championship: Option<String>,
    },
}

impl SegmentSpec {
    /// Every name the segment references.
    pub fn names(&self) -> Vec<&str> {
        match self {
            SegmentSpec::Promo { speaker, .. } => vec![speaker.as_str()],
            SegmentSpec::Singles { a, b, .. } => vec![a.as_str(), b.as_str()],
            SegmentSpec::Tag { teams, .. } => teams.iter().flatten().map(String::as_str).collect(),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            SegmentSpec::Promo { .. } => SegmentKind::Promo,
            SegmentSpec::Singles { .. } => SegmentKind::Singles,
            SegmentSpec::Tag { .. } => SegmentKind::Tag,
        }
    }
}

/// A week's card for one brand. Empty slots are skipped.
pub type Booking = BTreeMap<Slot, SegmentSpec>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Singles,
    Tag,
    Promo,
}

impl SegmentKind {
    pub fn is_match(self) -> bool {
        !matches!(self, SegmentKind::Promo)
    }
}

/// Booking legality errors. Raised before any state mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("{0}: Missing wrestlers.")]
    MissingWrestlers(Slot),
    #[error("{0}: Promo speaker not found.")]
    MissingSpeaker(Slot),
    #[error("{0}: Tag needs four wrestlers.")]
    IncompleteTag(Slot),
    #[error("{slot}: Injured wrestler booked ({name}).")]
    Injured { slot: Slot, name: String },
    #[error("{slot}: {name} is retired.")]
    Retired { slot: Slot, name: String },
    #[error("{slot}: {name} is not on the {brand} roster.")]
    OffBrand { slot: Slot, name: String, brand: Brand },
    #[error("{0}: Mixed-gender singles is not allowed.")]
    MixedGenderSingles(Slot),
    #[error("{0}: Tag must be all same gender.")]
    MixedGenderTag(Slot),
    #[error("{0} does not run a weekly show.")]
    NoShow(Brand),
}

impl BookingError {
    /// Slot the error points at, if any.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            BookingError::MissingWrestlers(s)
            | BookingError::MissingSpeaker(s)
            | BookingError::IncompleteTag(s)
            | BookingError::MixedGenderSingles(s)
            | BookingError::MixedGenderTag(s) => Some(*s),
            BookingError::Injured { slot, .. }
            | BookingError::Retired { slot, .. }
            | BookingError::OffBrand { slot, .. } => Some(*slot),
            BookingError::NoShow(_) => None,
        }
    }
}

/// Wire shape for a rejected booking: `{ "error": "..." }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

impl From<&BookingError> for ErrorReply {
    fn from(e: &BookingError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// A validated segment, with participants resolved to roster indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardSegment {
    Promo {
        speaker: usize,
        text: Option<String>,
    },
    Singles {
        a: usize,
        b: usize,
        title: Option<String>,
    },
    Tag {
        teams: [[usize; 2]; 2],
        title: Option<String>,
    },
}

impl CardSegment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            CardSegment::Promo { .. } => SegmentKind::Promo,
            CardSegment::Singles { .. } => SegmentKind::Singles,
            CardSegment::Tag { .. } => SegmentKind::Tag,
        }
    }

    pub fn participants(&self) -> Vec<usize> {
        match self {
            CardSegment::Promo { speaker, .. } => vec![*speaker],
            CardSegment::Singles { a, b, .. } => vec![*a, *b],
            CardSegment::Tag { teams, .. } => vec![teams[0][0], teams[0][1], teams[1][0], teams[1][1]],
        }
    }
}

/// Validated card in running order.
pub type Card = Vec<(Slot, CardSegment)>;

fn find(roster: &[Character], name: &str) -> Option<usize> {
    roster.iter().position(|c| c.name == name)
}

fn check_fit(slot: Slot, roster: &[Character], idx: usize) -> Result<(), BookingError> {
    let c = &roster[idx];
    if c.retired {
        return Err(BookingError::Retired {
            slot,
            name: c.name.clone(),
        });
    }
    if c.injury_weeks > 0 {
        return Err(BookingError::Injured {
            slot,
            name: c.name.clone(),
        });
    }
    Ok(())
}

/// Check every slot of a booking against the roster.
///
/// Championships named outside a title-eligible slot are dropped.
pub fn validate_booking(roster: &[Character], booking: &Booking) -> Result<Card, BookingError> {
    let mut card = Vec::with_capacity(booking.len());
    for (&slot, spec) in booking {
        let seg = match spec {
            SegmentSpec::Promo { speaker, text } => {
                let i = find(roster, speaker).ok_or(BookingError::MissingSpeaker(slot))?;
                CardSegment::Promo {
                    speaker: i,
                    text: text.clone(),
                }
            }
            SegmentSpec::Singles { a, b, championship } => {
                let (Some(ia), Some(ib)) = (find(roster, a), find(roster, b)) else {
                    return Err(BookingError::MissingWrestlers(slot));
                };
                if ia == ib {
                    return Err(BookingError::MissingWrestlers(slot));
                }
                check_fit(slot, roster, ia)?;
                check_fit(slot, roster, ib)?;
                if roster[ia].gender != roster[ib].gender {
                    return Err(BookingError::MixedGenderSingles(slot));
                }
                CardSegment::Singles {
                    a: ia,
                    b: ib,
                    title: championship.clone().filter(|_| slot.title_eligible()),
                }
            }
            SegmentSpec::Tag { teams, championship } => {
                if teams.len() != 2 || teams.iter().any(|t| t.len() != 2) {
                    return Err(BookingError::IncompleteTag(slot));
                }
                let mut ids = [[0usize; 2]; 2];
                for (ti, team) in teams.iter().enumerate() {
                    for (pi, name) in team.iter().enumerate() {
                        ids[ti][pi] = find(roster, name).ok_or(BookingError::IncompleteTag(slot))?;
                    }
                }
                let flat = [ids[0][0], ids[0][1], ids[1][0], ids[1][1]];
                for (k, i) in flat.iter().enumerate() {
                    if flat[..k].contains(i) {
                        return Err(BookingError::IncompleteTag(slot));
                    }
                }
                for &i in &flat {
                    check_fit(slot, roster, i)?;
                }
                let g = roster[flat[0]].gender;
                if flat.iter().any(|&i| roster[i].gender != g) {
                    return Err(BookingError::MixedGenderTag(slot));
                }
                CardSegment::Tag {
                    teams: ids,
                    title: championship.clone().filter(|_| slot.title_eligible()),
                }
            }
        };
        card.push((slot, seg));
    }
    Ok(card)
}

/// [`validate_booking`] for one brand's show: every participant must also
/// be signed to `brand`.
pub fn validate_brand_booking(roster: &[Character], brand: Brand, booking: &Booking) -> Result<Card, BookingError> {
    let card = validate_booking(roster, booking)?;
    for (slot, seg) in &card {
        if let Some(&i) = seg.participants().iter().find(|&&i| roster[i].brand != brand) {
            return Err(BookingError::OffBrand {
                slot: *slot,
                name: roster[i].name.clone(),
                brand,
            });
        }
    }
    Ok(card)
}
