//! Match and promo records, per-segment show output, and history entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::booking::{SegmentKind, Slot};
use crate::character::Brand;
use crate::clock;

/// Story heat movement caused by one segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryHeatDetail {
    pub before: i32,
    pub after: i32,
    /// `after - before`, after the heat clamp.
    pub delta: i32,
    /// Clamped change requested by the segment.
    pub applied: i32,
    pub tier: i32,
    pub tier_delta: i32,
    pub morale: BTreeMap<String, i32>,
    pub rivalry: BTreeMap<String, i32>,
}

/// Every numeric input behind a bout's score and its consequences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoutDetails {
    #[serde(alias = "sideAScore", alias = "aScore")]
    pub a_side_score: f64,
    #[serde(alias = "sideBScore", alias = "bScore")]
    pub b_side_score: f64,
    #[serde(alias = "winProbA", alias = "aWinProb")]
    pub prob_a: f64,
    #[serde(alias = "victors", alias = "winSideNames")]
    pub winners: Vec<String>,
    /// Score before alignment, champion and repeat adjustments.
    pub base_rating: i32,
    /// Singles-blend expectation used for hot detection.
    pub expected: i32,
    #[serde(alias = "storyPts")]
    pub story_bonus: i32,
    #[serde(alias = "chemBase")]
    pub base_chem: f64,
    #[serde(alias = "relationshipBonus")]
    pub rel_bonus: i32,
    #[serde(alias = "chemistryPts")]
    pub chem_pts: i32,
    pub fatigue_penalty: i32,
    #[serde(alias = "alignmentPenalty")]
    pub alignment_penalty_pct: f64,
    pub title: Option<String>,
    pub title_applied: bool,
    pub title_changed: bool,
    #[serde(alias = "titleBonus")]
    pub title_bump: i32,
    #[serde(alias = "repeatPenaltyPts")]
    pub repeat_penalty: i32,
    #[serde(alias = "momentum")]
    pub momentum_delta: BTreeMap<String, i32>,
    pub hot_match: bool,
    pub upset_win: bool,
    pub opp_star_avg_for_winners: f64,
    /// Permanent attribute deltas keyed by character then attribute key.
    pub attr_effects: BTreeMap<String, BTreeMap<String, i32>>,
    pub story_heat: Option<StoryHeatDetail>,
    pub notes: Vec<String>,
}

/// Inputs and effects of a promo.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromoDetails {
    pub speaker: String,
    /// `mic * 0.55 + charisma * 0.45`; 70 or better moves momentum.
    pub promo_score: i32,
    pub story_bonus: i32,
    pub momentum_delta: BTreeMap<String, i32>,
}

/// Structured explanation attached to every segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatchDetails {
    Singles(BoutDetails),
    Tag(BoutDetails),
    Promo(PromoDetails),
}

impl MatchDetails {
    pub fn kind(&self) -> SegmentKind {
        match self {
            MatchDetails::Singles(_) => SegmentKind::Singles,
            MatchDetails::Tag(_) => SegmentKind::Tag,
            MatchDetails::Promo(_) => SegmentKind::Promo,
        }
    }

    pub fn bout(&self) -> Option<&BoutDetails> {
        match self {
            MatchDetails::Singles(b) | MatchDetails::Tag(b) => Some(b),
            MatchDetails::Promo(_) => None,
        }
    }

    pub fn bout_mut(&mut self) -> Option<&mut BoutDetails> {
        match self {
            MatchDetails::Singles(b) | MatchDetails::Tag(b) => Some(b),
            MatchDetails::Promo(_) => None,
        }
    }

    pub fn winners(&self) -> &[String] {
        self.bout().map(|b| b.winners.as_slice()).unwrap_or(&[])
    }
}

/// One televised segment, keyed by its hashed id in the world's record map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: String,
    pub week: u32,
    #[serde(with = "clock::dmy")]
    pub date: NaiveDate,
    pub brand: Brand,
    pub segment: Slot,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub rating: i32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: Option<MatchDetails>,
}

/// Show output for one segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    #[serde(default)]
    pub id: Option<String>,
    pub seg: Slot,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub score: i32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default, alias = "details", alias = "debug")]
    pub explain: Option<MatchDetails>,
}

impl SegmentResult {
    pub fn involves(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub name: String,
    pub weeks: u32,
}

/// Champion aura drag for one show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampPenaltyInfo {
    pub total_penalty: i32,
    /// Belts whose holders dragged the show down.
    pub weak_titles: Vec<String>,
}

/// Everything a brand's show produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResult {
    pub brand: Brand,
    pub week: u32,
    pub segments: Vec<SegmentResult>,
    pub show_score: i32,
    pub tv_rating: f64,
    pub fan_react: String,
    pub match_keys: Vec<String>,
    pub champ_penalty_info: ChampPenaltyInfo,
    pub injuries: Vec<InjuryReport>,
    pub retired_this_week: Vec<String>,
}

/// Per-brand, per-week archive entry. Appended, never rewritten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub week: u32,
    #[serde(with = "clock::dmy")]
    pub date: NaiveDate,
    pub tv_rating: f64,
    pub show_score: i32,
    #[serde(default)]
    pub segments: Vec<SegmentResult>,
    #[serde(default)]
    pub injuries: Vec<InjuryReport>,
    #[serde(default)]
    pub retired_this_week: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_detail_names_are_accepted() {
        let json = r#"{
            "type": "singles",
            "sideAScore": 71.5, "winProbA": 0.6,
            "victors": ["Ace"], "chemBase": 2, "momentum": {"Ace": 5}
        }"#;
        let d: MatchDetails = serde_json::from_str(json).unwrap();
        let b = d.bout().unwrap();
        assert_eq!(b.winners, vec!["Ace".to_string()]);
        assert!((b.a_side_score - 71.5).abs() < 1e-9);
        assert_eq!(b.momentum_delta.get("Ace"), Some(&5));
        assert_eq!(d.kind(), SegmentKind::Singles);
    }

    #[test]
    fn segment_result_reads_old_explain_keys() {
        let json = r#"{
            "id": null, "seg": "Promo1", "type": "promo", "score": 70,
            "debug": {"type": "promo", "speaker": "Ace", "promoScore": 74}
        }"#;
        let s: SegmentResult = serde_json::from_str(json).unwrap();
        assert!(matches!(s.explain, Some(MatchDetails::Promo(ref p)) if p.promo_score == 74));
    }
}
