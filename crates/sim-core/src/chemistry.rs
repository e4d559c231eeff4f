//! Pairwise in-ring chemistry, a bounded scalar in `[-10, 10]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CHEM_MIN: i32 = -10;
pub const CHEM_MAX: i32 = 10;

/// Order-independent key for a pair of names: `"A__B"`.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}__{b}")
    } else {
        format!("{b}__{a}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chemistry(pub BTreeMap<String, i32>);

impl Chemistry {
    pub fn get(&self, a: &str, b: &str) -> i32 {
        self.0.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, a: &str, b: &str, amount: i32) {
        let v = self.0.entry(pair_key(a, b)).or_insert(0);
        *v = (*v + amount).clamp(CHEM_MIN, CHEM_MAX);
    }

    /// One step toward zero; zeroed pairs are dropped.
    pub fn decay(&mut self) {
        for v in self.0.values_mut() {
            *v -= v.signum();
        }
        self.0.retain(|_, v| *v != 0);
    }

    pub fn clamp_all(&mut self) {
        for v in self.0.values_mut() {
            *v = (*v).clamp(CHEM_MIN, CHEM_MAX);
        }
        self.0.retain(|_, v| *v != 0);
    }
}
