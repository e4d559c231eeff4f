//! Inbox events generated from a finished show.

use std::collections::BTreeSet;

use sim_core::{Brand, SegmentResult, WorldState};

/// Momentum at or below which a worker asks the booker for a push.
pub const COLD_MOMENTUM: i32 = 35;

fn already_pinged(world: &WorldState, name: &str) -> bool {
    world
        .inbox
        .iter()
        .any(|m| m.week == world.week && m.from == name && m.title == "Wants a push")
}

/// Push requests from cold workers who appeared tonight and title news for
/// every belt that changed hands. Push requests only go to the user's own
/// brand; title news goes out for both.
pub fn weekly_mail(world: &mut WorldState, brand: Brand, segments: &[SegmentResult]) {
    if brand == world.user_brand {
        let mut seen = BTreeSet::new();
        let appeared: Vec<&str> = segments
            .iter()
            .flat_map(|s| s.names.iter().map(String::as_str))
            .filter(|n| seen.insert(*n))
            .collect();
        for name in appeared {
            let cold = world.find(name).is_some_and(|c| c.momentum <= COLD_MOMENTUM);
            if cold && !already_pinged(world, name) {
                world.push_mail(
                    name,
                    "Wants a push",
                    &format!("{name}: \"Boss, I'm ice cold out there. Can I get something to heat me up?\""),
                );
            }
        }
    }
    for s in segments {
        if s.tags.iter().any(|t| t.to_ascii_lowercase().contains("title change")) {
            let text = if s.text.is_empty() { "Title changed hands." } else { s.text.as_str() };
            world.push_mail("Office", "Championship Update", &format!("Result: {text}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::small_world;
    use sim_core::{SegmentKind, Slot};

    fn seg(names: &[&str], tags: &[&str]) -> SegmentResult {
        SegmentResult {
            id: None,
            seg: Slot::Match,
            kind: SegmentKind::Singles,
            score: 70,
            text: "Ace defeat Bolt. (Title bout)".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            summary: String::new(),
            names: names.iter().map(|n| n.to_string()).collect(),
            explain: None,
        }
    }

    #[test]
    fn cold_worker_asks_once_per_week() {
        let mut w = small_world();
        w.find_mut("Bolt").unwrap().momentum = 30;
        let segs = [seg(&["Ace", "Bolt"], &[]), seg(&["Bolt", "Cid"], &[])];
        weekly_mail(&mut w, Brand::Raw, &segs);
        weekly_mail(&mut w, Brand::Raw, &segs);
        assert_eq!(w.inbox.len(), 1);
        assert_eq!(w.inbox[0].from, "Bolt");
        assert!(w.inbox[0].body.starts_with("Bolt: \"Boss"));
    }

    #[test]
    fn title_news_goes_out_for_rival_too() {
        let mut w = small_world();
        w.find_mut("Gus").unwrap().momentum = 10;
        weekly_mail(&mut w, Brand::SmackDown, &[seg(&["Gus", "Hal"], &["title change!"])]);
        assert_eq!(w.inbox.len(), 1);
        assert_eq!(w.inbox[0].title, "Championship Update");
        assert_eq!(w.inbox[0].body, "Result: Ace defeat Bolt. (Title bout)");
    }
}
