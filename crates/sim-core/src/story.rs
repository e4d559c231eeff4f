//! Storylines: deduplicated participant sets with a heat scalar.
//!
//! A storyline is created only when a segment between its participants
//! produces positive heat, and removed once weekly decay brings it to zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::character::{Attr, Character};
use crate::records::StoryHeatDetail;
use crate::relationships::{RelType, RelationshipGraph};

pub const HEAT_MAX: i32 = 100;
/// Heat points per tier.
pub const TIER_SIZE: i32 = 12;

/// Canonical identity for a set of names: sorted, deduplicated, `" | "`-joined.
pub fn key_from_names<S: AsRef<str>>(names: &[S]) -> String {
    uniq_sorted(names).join(" | ")
}

pub fn uniq_sorted<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut v: Vec<String> = names
        .iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    v.sort();
    v.dedup();
    v
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Storyline {
    pub names: Vec<String>,
    pub heat: i32,
    /// Weeks since the storyline was last touched by a segment.
    pub weeks: u32,
    pub last_score: i32,
    pub last_delta: i32,
}

impl Storyline {
    pub fn key(&self) -> String {
        key_from_names(&self.names)
    }

    pub fn tier(&self) -> i32 {
        tier_of(self.heat)
    }

    pub fn includes(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

pub fn tier_of(heat: i32) -> i32 {
    (f64::from(heat) / f64::from(TIER_SIZE)).round().max(0.0) as i32
}

/// Heat change for a segment score, before hot and repeat adjustments.
pub fn heat_delta_for(score: i32) -> i32 {
    match score {
        s if s >= 92 => 9,
        s if s >= 86 => 7,
        s if s >= 80 => 5,
        s if s >= 74 => 3,
        s if s >= 68 => 2,
        s if s >= 62 => 1,
        s if s >= 55 => -2,
        _ => -4,
    }
}

/// A brand's active storylines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryBook {
    pub lines: Vec<Storyline>,
}

impl StoryBook {
    pub fn find(&self, names: &[String]) -> Option<&Storyline> {
        let key = key_from_names(names);
        self.lines.iter().find(|s| s.key() == key)
    }

    pub fn heat_of(&self, names: &[String]) -> i32 {
        self.find(names).map(|s| s.heat).unwrap_or(0)
    }

    /// `round(min(max_bonus, heat / 12))` for the exact participant set.
    pub fn story_bonus(&self, names: &[String], max_bonus: i32) -> i32 {
        let heat = self.heat_of(names);
        (f64::from(heat) / f64::from(TIER_SIZE))
            .min(f64::from(max_bonus))
            .round() as i32
    }

    /// Whether the name appears in any storyline with heat.
    pub fn in_any_story(&self, name: &str) -> bool {
        self.lines.iter().any(|s| s.heat > 0 && s.includes(name))
    }

    /// Fold one segment's result into the storyline for `names`.
    ///
    /// Returns `None` when no storyline exists and the applied heat would not
    /// be positive.
    pub fn record_segment(
        &mut self,
        names: &[String],
        score: i32,
        hot: bool,
        repeat_penalty: i32,
        hot_bonus: i32,
    ) -> Option<StoryHeatDetail> {
        let names = uniq_sorted(names);
        if names.len() < 2 {
            return None;
        }
        let mut delta = heat_delta_for(score);
        if hot {
            delta += hot_bonus;
        }
        if repeat_penalty > 0 {
            let drag = (f64::from(repeat_penalty) / 10.0).round() as i32;
            delta -= drag.max(1);
        }
        let applied = delta.clamp(-10, 12);

        let key = key_from_names(&names);
        let idx = match self.lines.iter().position(|s| s.key() == key) {
            Some(i) => i,
            None if applied > 0 => {
                self.lines.push(Storyline {
                    names,
                    ..Storyline::default()
                });
                self.lines.len() - 1
            }
            None => return None,
        };
        let line = &mut self.lines[idx];
        let before = line.heat;
        let tier_before = line.tier();
        line.heat = (line.heat + applied).clamp(0, HEAT_MAX);
        line.weeks = 0;
        line.last_score = score;
        line.last_delta = applied;
        let tier = line.tier();
        Some(StoryHeatDetail {
            before,
            after: line.heat,
            delta: line.heat - before,
            applied,
            tier,
            tier_delta: tier - tier_before,
            ..StoryHeatDetail::default()
        })
    }

    /// Weekly cool-down. Storylines at zero heat are removed.
    pub fn decay(&mut self, amount: i32) {
        for s in &mut self.lines {
            s.heat = (s.heat - amount).max(0);
            s.weeks += 1;
        }
        self.lines.retain(|s| s.heat > 0);
    }

    /// Sort and dedupe participants, clamp heat, merge duplicates.
    pub fn repair(&mut self) {
        let mut out: Vec<Storyline> = Vec::with_capacity(self.lines.len());
        for mut s in std::mem::take(&mut self.lines) {
            s.names = uniq_sorted(&s.names);
            s.heat = s.heat.clamp(0, HEAT_MAX);
            if s.names.len() < 2 || s.heat == 0 {
                continue;
            }
            match out.iter_mut().find(|o| o.names == s.names) {
                Some(o) => o.heat = o.heat.max(s.heat),
                None => out.push(s),
            }
        }
        self.lines = out;
    }
}

/// Per-brand storyline books.
pub type StoryMap = BTreeMap<crate::character::Brand, StoryBook>;

fn win_base(score: i32) -> i32 {
    match score {
        s if s >= 90 => 4,
        s if s >= 82 => 3,
        s if s >= 74 => 2,
        s if s >= 68 => 1,
        _ => 0,
    }
}

fn lose_base(score: i32) -> i32 {
    match score {
        s if s >= 82 => 0,
        s if s >= 72 => -1,
        s if s >= 64 => -2,
        _ => -3,
    }
}

/// Morale and rivalry consequences of a storyline update.
///
/// Winners ride the heat, losers sag unless the bout was good. A storyline
/// crossing into a higher tier also deepens the rivalry between the two
/// sides, while a cooling storyline erodes it.
pub fn apply_story_ecosystem(
    detail: &mut StoryHeatDetail,
    roster: &mut [Character],
    rels: &mut RelationshipGraph,
    winners: &[String],
    losers: &[String],
    score: i32,
) {
    let heat_step = detail.after / 25;
    let tier_up = i32::from(detail.tier_delta > 0);
    let win_gain = win_base(score) + heat_step + tier_up;
    let slip = if detail.applied < 0 {
        (f64::from(detail.applied) / 2.0).round().max(-2.0) as i32
    } else {
        0
    };
    let lose_gain = lose_base(score) + if detail.tier >= 4 { -1 } else { 0 } + slip;

    for (names, gain) in [(winners, win_gain), (losers, lose_gain)] {
        for n in names {
            if gain == 0 {
                continue;
            }
            if let Some(c) = roster.iter_mut().find(|c| &c.name == n) {
                let applied = c.bump(Attr::Morale, gain);
                detail.morale.insert(n.clone(), applied);
            }
        }
    }

    let mut rivalry = 0;
    if detail.tier > 0 {
        rivalry += (detail.after / 20).max(1);
    }
    if detail.applied < 0 {
        rivalry += detail.applied.max(-3);
    }
    if rivalry == 0 {
        return;
    }
    for w in winners {
        for l in losers {
            let level = rels.bump(w, l, RelType::Rival, rivalry);
            detail.rivalry.insert(crate::chemistry::pair_key(w, l), level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::tests::sample;
    use crate::character::{Brand, Gender};

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn key_is_order_free() {
        assert_eq!(key_from_names(&["b", "a", "b"]), "a | b");
    }

    #[test]
    fn weak_segment_never_creates_story() {
        let mut book = StoryBook::default();
        assert!(book.record_segment(&names(&["A", "B"]), 50, false, 0, 5).is_none());
        assert!(book.lines.is_empty());
    }

    #[test]
    fn good_segment_creates_and_decay_removes() {
        let mut book = StoryBook::default();
        let d = book.record_segment(&names(&["B", "A"]), 86, true, 0, 5).unwrap();
        assert_eq!(d.applied, 12);
        assert_eq!(book.heat_of(&names(&["A", "B"])), 12);
        assert_eq!(book.story_bonus(&names(&["A", "B"]), 12), 1);
        assert!(book.in_any_story("A"));
        for _ in 0..4 {
            book.decay(3);
        }
        assert!(book.lines.is_empty());
    }

    #[test]
    fn repeat_drag_is_at_least_one() {
        let mut book = StoryBook::default();
        book.record_segment(&names(&["A", "B"]), 80, false, 0, 5);
        let d = book.record_segment(&names(&["A", "B"]), 68, false, 3, 5).unwrap();
        assert_eq!(d.delta, 1);
    }

    #[test]
    fn delta_reports_the_clamped_move() {
        let mut book = StoryBook::default();
        book.record_segment(&names(&["A", "B"]), 74, false, 0, 5);
        let d = book.record_segment(&names(&["A", "B"]), 40, false, 0, 5).unwrap();
        assert_eq!((d.before, d.after), (3, 0));
        assert_eq!(d.applied, -4);
        assert_eq!(d.delta, -3);
    }

    #[test]
    fn ecosystem_moves_morale_and_rivalry() {
        let mut roster = vec![
            sample("A", Gender::Male, Brand::Raw),
            sample("B", Gender::Male, Brand::Raw),
        ];
        let mut rels = RelationshipGraph::default();
        let mut book = StoryBook::default();
        let mut d = book.record_segment(&names(&["A", "B"]), 92, true, 0, 5).unwrap();
        apply_story_ecosystem(&mut d, &mut roster, &mut rels, &names(&["A"]), &names(&["B"]), 92);
        // tier 1 crossing: 4 + 0 + 1
        assert_eq!(roster[0].morale, 70);
        assert_eq!(roster[1].morale, 65);
        assert_eq!(rels.level("A", "B", RelType::Rival), 1);
    }
}
