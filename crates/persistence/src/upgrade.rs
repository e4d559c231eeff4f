//! Lift older save shapes to the current schema before typed decoding.
//!
//! Everything here works on raw JSON so that a save which no longer
//! matches the typed model can still be rescued. Anything the typed model
//! can default is left alone.

use serde_json::{Map, Value};
use sim_core::world::SCHEMA_VERSION;
use tracing::debug;

const DEFAULT_BRAND: &str = "RAW";
const DEFAULT_START: &str = "01-04-2001";

fn rename(o: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(v) = o.remove(from) {
        if !o.contains_key(to) {
            o.insert(to.to_string(), v);
        }
    }
}

/// `{RAW: 1, SmackDown: 0, ttl: {RAW: 2}}` becomes
/// `{RAW: {level: 1, ttl: 2}, SmackDown: {level: 0, ttl: 0}}`.
fn upgrade_afterglow(v: &mut Value) {
    let Some(o) = v.as_object_mut() else { return };
    let ttl = o.remove("ttl").and_then(|t| t.as_object().cloned()).unwrap_or_default();
    for (brand, level) in o.iter_mut() {
        if let Some(n) = level.as_i64() {
            let t = ttl.get(brand).and_then(Value::as_u64).unwrap_or(0);
            *level = serde_json::json!({ "level": n, "ttl": t });
        }
    }
}

/// Flat `{key: {ttl}}` or `{key: ttl}` maps are filed under the user's brand.
fn upgrade_hot_matches(v: &mut Value, brand: &str) {
    let Some(o) = v.as_object_mut() else { return };
    let flat = o.values().any(|x| x.is_number() || x.get("ttl").is_some());
    if !flat {
        return;
    }
    let mut inner = Map::new();
    for (k, x) in std::mem::take(o) {
        let ttl = x.as_i64().or_else(|| x.get("ttl").and_then(Value::as_i64)).unwrap_or(0);
        if ttl > 0 {
            inner.insert(k, Value::from(ttl));
        }
    }
    o.insert(brand.to_string(), Value::Object(inner));
}

fn infer_kind(seg: &Map<String, Value>) -> &'static str {
    match seg.get("names").and_then(Value::as_array).map(Vec::len) {
        Some(4) => "tag",
        Some(1) => "promo",
        _ => "singles",
    }
}

/// Segments: fill a missing `type`, move `details`/`debug` onto `explain`
/// and stamp the explanation with the segment type.
fn upgrade_segment(seg: &mut Value) {
    let Some(o) = seg.as_object_mut() else { return };
    if !o.get("type").is_some_and(Value::is_string) {
        let kind = infer_kind(o);
        o.insert("type".into(), Value::from(kind));
    }
    if o.get("explain").map_or(true, Value::is_null) {
        for legacy in ["details", "debug"] {
            if let Some(v) = o.remove(legacy) {
                if !v.is_null() {
                    o.insert("explain".into(), v);
                    break;
                }
            }
        }
    }
    o.remove("details");
    o.remove("debug");
    let kind = o.get("type").cloned().unwrap_or(Value::from("singles"));
    match o.get_mut("explain") {
        Some(Value::Object(e)) => {
            if !e.get("type").is_some_and(Value::is_string) {
                e.insert("type".into(), kind);
            }
        }
        Some(other) if !other.is_null() => *other = Value::Null,
        _ => {}
    }
}

fn upgrade_history(o: &mut Map<String, Value>, brand: &str, start: &str) {
    // Pre-brand saves kept a flat list next to the per-brand map.
    if let Some(Value::Array(flat)) = o.get("history").cloned() {
        let mut by_brand = Map::new();
        for mut entry in flat {
            let b = entry
                .get("brand")
                .and_then(Value::as_str)
                .unwrap_or(brand)
                .to_string();
            if let Some(e) = entry.as_object_mut() {
                e.remove("brand");
            }
            if let Some(list) = by_brand
                .entry(b)
                .or_insert_with(|| Value::Array(Vec::new()))
                .as_array_mut()
            {
                list.push(entry);
            }
        }
        o.insert("history".into(), Value::Object(by_brand));
    }
    if let Some(Value::Object(mh)) = o.remove("matchHistory") {
        let h = o
            .entry("history")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(h) = h.as_object_mut() {
            for (b, entries) in mh {
                let slot = h.entry(b).or_insert_with(|| Value::Array(Vec::new()));
                if let (Some(dst), Value::Array(src)) = (slot.as_array_mut(), entries) {
                    dst.extend(src);
                }
            }
        }
    }
    let Some(Value::Object(h)) = o.get_mut("history") else { return };
    for entries in h.values_mut().filter_map(Value::as_array_mut) {
        for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
            entry.entry("date").or_insert_with(|| Value::from(start));
            entry.entry("tvRating").or_insert(Value::from(0.0));
            entry.entry("showScore").or_insert(Value::from(0));
            entry.entry("week").or_insert(Value::from(1));
            if let Some(Value::Array(segs)) = entry.get_mut("segments") {
                segs.iter_mut().for_each(upgrade_segment);
            }
        }
    }
}

/// Upgrade a raw save of any known vintage to the current shape.
pub fn upgrade_value(mut save: Value) -> Value {
    if let Some(o) = save.as_object_mut() {
        upgrade_object(o);
    }
    save
}

fn upgrade_object(o: &mut Map<String, Value>) {
    let from = o.get("schemaVersion").and_then(Value::as_u64).unwrap_or(1);

    rename(o, "champs", "titles");
    rename(o, "brand", "userBrand");
    let brand = o
        .get("userBrand")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_BRAND)
        .to_string();
    let start = o
        .get("startDate")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_START)
        .to_string();

    upgrade_history(o, &brand, &start);
    if let Some(v) = o.get_mut("afterglow") {
        upgrade_afterglow(v);
    }
    if let Some(v) = o.get_mut("hotMatches") {
        upgrade_hot_matches(v, &brand);
    }
    if let Some(Value::Object(m)) = o.get("mentorships").cloned() {
        let slots = m.get("slots").cloned().unwrap_or(Value::Array(Vec::new()));
        o.insert("mentorships".into(), slots);
    }
    if let Some(Value::Object(m)) = o.get_mut("matches") {
        m.values_mut().for_each(upgrade_segment);
    }
    // Retired flags and world flags from older builds are rebuilt on repair.
    o.remove("flags");
    o.insert("schemaVersion".into(), Value::from(SCHEMA_VERSION));
    if from < u64::from(SCHEMA_VERSION) {
        debug!(from, to = SCHEMA_VERSION, "save shape upgraded");
    }
}
