//! One-shot repair of the canonical match records from show history.
//!
//! Older saves stored explanations on history segments only, or kept
//! records without winners. The pass rebuilds every record that has an id,
//! recovering winners from the stored details or, failing that, from the
//! result text.

use serde::Serialize;
use sim_core::{BoutDetails, MatchDetails, MatchRecord, SegmentKind, WorldState};
use tracing::info;

use crate::show::segment_record;

const VERBS: [&str; 9] = ["defeats", "defeat", "def.", "beat", "beats", "pins", "pin", "submits", "submit"];
const FILLER: [&str; 4] = ["team", "the", "by", "via"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub scanned: usize,
    pub changed: usize,
}

/// Winners named before the first result verb in lines like
/// `"Result: Ace & Bolt defeat Cid & Dax."`.
pub fn winners_from_text(text: &str) -> Vec<String> {
    let line = text.replace('\n', " ");
    let line = match line.split_once(':') {
        Some((_, rest)) => rest.to_string(),
        None => line,
    };
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some(verb) = words
        .iter()
        .position(|w| VERBS.iter().any(|v| w.eq_ignore_ascii_case(v)))
    else {
        return Vec::new();
    };
    let left = words[..verb]
        .iter()
        .filter(|w| !FILLER.iter().any(|f| w.eq_ignore_ascii_case(f)))
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" and ", " & ")
        .replace("(c)", "");
    let mut out: Vec<String> = Vec::new();
    for name in left.split(['&', ',']).map(str::trim).filter(|n| !n.is_empty()) {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

fn merge_tags(a: &[String], b: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(a.len() + b.len());
    for t in a.iter().chain(b) {
        if !t.is_empty() && !out.contains(t) {
            out.push(t.clone());
        }
    }
    out
}

/// Rebuild canonical records from every history segment with an id.
///
/// Runs once per save unless `force` is set; records are only rewritten
/// when the rebuilt version differs, so a second forced run changes nothing.
pub fn normalize_match_records(world: &mut WorldState, force: bool) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    if world.normalization.all_matches_v1 && !force {
        return report;
    }
    let mut rebuilt: Vec<MatchRecord> = Vec::new();
    for (&brand, entries) in &world.history {
        for entry in entries {
            for seg in &entry.segments {
                report.scanned += 1;
                let Some(fresh) = segment_record(seg, brand, entry.week, entry.date) else {
                    continue;
                };
                let cur = world.matches.get(&fresh.id);
                let mut rec = match cur {
                    Some(c) => MatchRecord {
                        title: c.title.clone().or(fresh.title.clone()),
                        names: if c.names.is_empty() { fresh.names.clone() } else { c.names.clone() },
                        text: if c.text.is_empty() { fresh.text.clone() } else { c.text.clone() },
                        summary: if c.summary.is_empty() { fresh.summary.clone() } else { c.summary.clone() },
                        tags: merge_tags(&c.tags, &fresh.tags),
                        details: c.details.clone().or(fresh.details.clone()),
                        ..c.clone()
                    },
                    None => fresh,
                };

                let known = rec.details.as_ref().is_some_and(|d| !d.winners().is_empty());
                if !known && rec.kind.is_match() {
                    let parsed = winners_from_text(if rec.text.is_empty() { &rec.summary } else { &rec.text });
                    if !parsed.is_empty() {
                        match rec.details.as_mut().and_then(MatchDetails::bout_mut) {
                            Some(b) => b.winners = parsed,
                            None => {
                                let b = BoutDetails {
                                    winners: parsed,
                                    ..BoutDetails::default()
                                };
                                rec.details = Some(if rec.kind == SegmentKind::Tag {
                                    MatchDetails::Tag(b)
                                } else {
                                    MatchDetails::Singles(b)
                                });
                            }
                        }
                    }
                }
                if cur != Some(&rec) {
                    rebuilt.push(rec);
                }
            }
        }
    }
    report.changed = rebuilt.len();
    for rec in rebuilt {
        world.matches.insert(rec.id.clone(), rec);
    }
    world.normalization.all_matches_v1 = true;
    info!(scanned = report.scanned, changed = report.changed, "match records normalized");
    report
}
