//! Typed, signed affinities between pairs of characters.
//!
//! Edges are stored with the lexicographically smaller name first. Several
//! edge types may coexist between the same pair.

use serde::{Deserialize, Serialize};

pub const REL_CAP: i32 = 100;
/// Weekly pull toward zero.
pub const REL_DECAY: i32 = 2;

pub const STEP_TEAM_WIN: i32 = 6;
pub const STEP_TEAM_LOSS: i32 = 2;
pub const STEP_FACE_OFF: i32 = 3;
pub const STEP_TITLE_TAKE: i32 = 6;
pub const STEP_TITLE_RESPECT: i32 = 4;
pub const STEP_HOT_MATCH: i32 = 4;
pub const STEP_INJURY_CAUSE: i32 = -12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelType {
    Friend,
    Tag,
    Stable,
    Rival,
    Romance,
    Family,
    /// Backstage tension.
    Heat,
}

impl RelType {
    /// Chemistry contribution per level point.
    fn chem_scale(self) -> f64 {
        match self {
            RelType::Romance => 0.04,
            RelType::Friend => 0.03,
            RelType::Tag => 0.04,
            RelType::Stable => 0.02,
            RelType::Rival => 0.05,
            RelType::Family => 0.01,
            RelType::Heat => -0.08,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub a: String,
    pub b: String,
    #[serde(rename = "type")]
    pub kind: RelType,
    pub level: i32,
    /// On-screen relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kayfabe: Option<bool>,
    /// Real, off-screen relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstage: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    pub kayfabe: Option<bool>,
    pub backstage: Option<bool>,
}

impl EdgeFlags {
    pub const KAYFABE: EdgeFlags = EdgeFlags {
        kayfabe: Some(true),
        backstage: None,
    };
    pub const BACKSTAGE: EdgeFlags = EdgeFlags {
        kayfabe: None,
        backstage: Some(true),
    };
}

fn sorted<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipGraph {
    pub edges: Vec<RelationshipEdge>,
}

impl RelationshipGraph {
    pub fn get(&self, a: &str, b: &str, kind: RelType) -> Option<&RelationshipEdge> {
        let (x, y) = sorted(a, b);
        self.edges.iter().find(|e| e.a == x && e.b == y && e.kind == kind)
    }

    pub fn level(&self, a: &str, b: &str, kind: RelType) -> i32 {
        self.get(a, b, kind).map(|e| e.level).unwrap_or(0)
    }

    /// Net level across every edge type between the pair.
    pub fn net_level(&self, a: &str, b: &str) -> i32 {
        let (x, y) = sorted(a, b);
        self.edges
            .iter()
            .filter(|e| e.a == x && e.b == y)
            .map(|e| e.level)
            .sum()
    }

    fn edge_mut(&mut self, a: &str, b: &str, kind: RelType) -> &mut RelationshipEdge {
        let (x, y) = sorted(a, b);
        let pos = self
            .edges
            .iter()
            .position(|e| e.a == x && e.b == y && e.kind == kind);
        let idx = match pos {
            Some(i) => i,
            None => {
                self.edges.push(RelationshipEdge {
                    a: x.to_string(),
                    b: y.to_string(),
                    kind,
                    level: 0,
                    kayfabe: None,
                    backstage: None,
                });
                self.edges.len() - 1
            }
        };
        &mut self.edges[idx]
    }

    pub fn set(&mut self, a: &str, b: &str, kind: RelType, level: i32, flags: EdgeFlags) {
        let e = self.edge_mut(a, b, kind);
        e.level = level.clamp(-REL_CAP, REL_CAP);
        if flags.kayfabe.is_some() {
            e.kayfabe = flags.kayfabe;
        }
        if flags.backstage.is_some() {
            e.backstage = flags.backstage;
        }
    }

    /// Add `delta` to the typed edge, creating it on first contact.
    pub fn bump(&mut self, a: &str, b: &str, kind: RelType, delta: i32) -> i32 {
        let e = self.edge_mut(a, b, kind);
        e.level = (e.level + delta).clamp(-REL_CAP, REL_CAP);
        e.level
    }

    /// Rounded chemistry bonus from every edge between the pair.
    pub fn chem_bonus(&self, a: &str, b: &str) -> i32 {
        let (x, y) = sorted(a, b);
        let total: f64 = self
            .edges
            .iter()
            .filter(|e| e.a == x && e.b == y)
            .map(|e| f64::from(e.level) * e.kind.chem_scale())
            .sum();
        total.round() as i32
    }

    pub fn decay(&mut self) {
        for e in &mut self.edges {
            if e.level > 0 {
                e.level = (e.level - REL_DECAY).max(0);
            } else if e.level < 0 {
                e.level = (e.level + REL_DECAY).min(0);
            }
        }
        self.prune();
    }

    pub fn prune(&mut self) {
        self.edges.retain(|e| e.level.abs() >= 1);
    }

    /// Normalize key order, clamp levels and merge duplicate typed edges.
    pub fn repair(&mut self) {
        let mut merged: Vec<RelationshipEdge> = Vec::with_capacity(self.edges.len());
        for mut e in std::mem::take(&mut self.edges) {
            if e.a > e.b {
                std::mem::swap(&mut e.a, &mut e.b);
            }
            e.level = e.level.clamp(-REL_CAP, REL_CAP);
            match merged
                .iter_mut()
                .find(|m| m.a == e.a && m.b == e.b && m.kind == e.kind)
            {
                Some(m) => m.level = e.level,
                None => merged.push(e),
            }
        }
        self.edges = merged;
        self.prune();
    }

    pub fn on_tag_teammates(&mut self, a: &str, b: &str, won: bool, hot: bool) {
        let step = if won { STEP_TEAM_WIN } else { STEP_TEAM_LOSS };
        self.bump(a, b, RelType::Tag, step);
        if hot {
            self.bump(a, b, RelType::Friend, STEP_HOT_MATCH);
        }
    }

    pub fn on_singles_face_off(&mut self, a: &str, b: &str, hot: bool, title_changed: bool) {
        self.bump(a, b, RelType::Rival, STEP_FACE_OFF);
        if hot {
            self.bump(a, b, RelType::Rival, STEP_HOT_MATCH);
        }
        if title_changed {
            self.bump(a, b, RelType::Rival, STEP_TITLE_TAKE);
            self.bump(a, b, RelType::Friend, STEP_TITLE_RESPECT);
        }
    }

    /// An unsafe worker hurt someone.
    pub fn on_danger_spot(&mut self, cause: &str, victim: &str) {
        self.bump(cause, victim, RelType::Heat, STEP_INJURY_CAUSE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_edges_coexist() {
        let mut g = RelationshipGraph::default();
        g.bump("Zed", "Ace", RelType::Tag, 10);
        g.bump("Ace", "Zed", RelType::Friend, 5);
        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.edges[0].a, "Ace");
        assert_eq!(g.net_level("Zed", "Ace"), 15);
    }

    #[test]
    fn chem_bonus_weights() {
        let mut g = RelationshipGraph::default();
        g.set("A", "B", RelType::Rival, 80, EdgeFlags::KAYFABE);
        g.set("A", "B", RelType::Heat, 20, EdgeFlags::BACKSTAGE);
        // 80 * 0.05 - 20 * 0.08 = 2.4
        assert_eq!(g.chem_bonus("B", "A"), 2);
    }

    #[test]
    fn decay_prunes_small_edges() {
        let mut g = RelationshipGraph::default();
        g.bump("A", "B", RelType::Friend, 2);
        g.bump("A", "C", RelType::Heat, -5);
        g.decay();
        assert!(g.get("A", "B", RelType::Friend).is_none());
        assert_eq!(g.level("A", "C", RelType::Heat), -3);
    }

    #[test]
    fn levels_are_capped() {
        let mut g = RelationshipGraph::default();
        assert_eq!(g.bump("A", "B", RelType::Rival, 250), REL_CAP);
        assert_eq!(g.bump("A", "B", RelType::Rival, -500), -REL_CAP);
    }
}
