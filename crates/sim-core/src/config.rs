//! Tunable constants. `SimConfig::default()` reproduces the stock balance;
//! every group can be overridden from a YAML or JSON file.

use serde::{Deserialize, Serialize};

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
    /// Fraction of the score removed from an unsanctioned rematch.
    pub repeat_penalty: f64,
    pub hot: HotTuning,
    pub crowd: CrowdTuning,
    pub main_event: MainEventTuning,
    pub tv: TvTuning,
    pub fatigue: FatigueTuning,
    pub injury: InjuryTuning,
    pub story: StoryTuning,
    pub alignment: AlignmentTuning,
    pub ai: AiTuning,
    /// Characters retire on or after this age.
    pub retirement_age: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            repeat_penalty: 0.18,
            hot: HotTuning::default(),
            crowd: CrowdTuning::default(),
            main_event: MainEventTuning::default(),
            tv: TvTuning::default(),
            fatigue: FatigueTuning::default(),
            injury: InjuryTuning::default(),
            story: StoryTuning::default(),
            alignment: AlignmentTuning::default(),
            ai: AiTuning::default(),
            retirement_age: 51,
        }
    }
}

/// Hot-match detection and immunity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotTuning {
    /// Score that is always hot.
    pub absolute: i32,
    /// Overperformance above the expected score that is also hot.
    pub relative: i32,
    /// Weeks of repeat-penalty immunity.
    pub ttl: i32,
    /// Score at which a bout counts as hot for relationships and star gains.
    pub buzz: i32,
}

impl Default for HotTuning {
    fn default() -> Self {
        Self {
            absolute: 85,
            relative: 12,
            ttl: 1,
            buzz: 82,
        }
    }
}

/// Crowd afterglow carried to the next show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrowdTuning {
    pub afterglow_ttl: u32,
    pub hot_seg: i32,
    pub very_hot_seg: i32,
    /// Raw show points for a level-1 afterglow.
    pub boost: i32,
    /// Raw show points for a level-2 afterglow.
    pub big_boost: i32,
}

impl Default for CrowdTuning {
    fn default() -> Self {
        Self {
            afterglow_ttl: 2,
            hot_seg: 85,
            very_hot_seg: 90,
            boost: 5,
            big_boost: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainEventTuning {
    pub underwhelm_delta: i32,
    pub flat_floor: i32,
    pub penalty: i32,
}

impl Default for MainEventTuning {
    fn default() -> Self {
        Self {
            underwhelm_delta: 6,
            flat_floor: 70,
            penalty: -8,
        }
    }
}

/// Raw score to 1..10 TV rating conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvTuning {
    pub baseline: f64,
    pub scale: f64,
    pub star_draw_top_n: usize,
    pub star_draw_factor: f64,
}

impl Default for TvTuning {
    fn default() -> Self {
        Self {
            baseline: 48.0,
            scale: 6.0,
            star_draw_top_n: 3,
            star_draw_factor: 0.18,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueTuning {
    /// Per-appearance gain before the slot multiplier.
    pub wrestle_inc: (i32, i32),
    /// Recovery for characters who sat the show out.
    pub rest_dec: (i32, i32),
    pub cap: i32,
    /// Multiplier for characters whose only segment was a promo.
    pub promo_mult: f64,
}

impl Default for FatigueTuning {
    fn default() -> Self {
        Self {
            wrestle_inc: (10, 16),
            rest_dec: (8, 12),
            cap: 100,
            promo_mult: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjuryTuning {
    pub base: f64,
    pub per_fatigue: f64,
    pub cap: f64,
    pub dur_light: (i32, i32),
    pub dur_med: (i32, i32),
    pub dur_heavy: (i32, i32),
    pub heavy_at: i32,
    pub med_at: i32,
    /// Risk per point of opponent ring safety below 70.
    pub unsafe_opponent: f64,
    /// Extra risk for main-event bouts.
    pub main_event_extra: f64,
    /// Opponents below this ring safety earn backstage heat when they hurt someone.
    pub heat_below_safety: i32,
}

impl Default for InjuryTuning {
    fn default() -> Self {
        Self {
            base: 0.01,
            per_fatigue: 0.0015,
            cap: 0.25,
            dur_light: (1, 3),
            dur_med: (2, 6),
            dur_heavy: (4, 8),
            heavy_at: 85,
            med_at: 70,
            unsafe_opponent: 0.004,
            main_event_extra: 0.002,
            heat_below_safety: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryTuning {
    pub decay: i32,
    pub max_bonus: i32,
    pub promo_bonus: i32,
    /// Heat added on a hot segment is half of this.
    pub heat_on_hot: i32,
    /// Heat at which the AI treats a rematch as sanctioned.
    pub rematch_heat: i32,
    /// Heat at which the AI considers a story for its card.
    pub viable_heat: i32,
}

impl Default for StoryTuning {
    fn default() -> Self {
        Self {
            decay: 3,
            max_bonus: 12,
            promo_bonus: 6,
            heat_on_hot: 10,
            rematch_heat: 28,
            viable_heat: 22,
        }
    }
}

/// Percent multipliers applied to same-alignment bouts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentTuning {
    pub singles_same: f64,
    pub singles_heel_extra: f64,
    pub singles_neutral_relief: f64,
    pub tag_mixed_team: f64,
    pub tag_teams_same: f64,
}

impl Default for AlignmentTuning {
    fn default() -> Self {
        Self {
            singles_same: 0.05,
            singles_heel_extra: 0.02,
            singles_neutral_relief: 0.02,
            tag_mixed_team: 0.06,
            tag_teams_same: 0.04,
        }
    }
}

/// Opponent booking floors and title-defense chances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub world_defense: f64,
    pub women_main_event: f64,
    pub women_defense: f64,
    pub tag_defense: f64,
    pub main_avg_star: f64,
    pub main_women_star: f64,
    pub opener_avg_work: f64,
    pub mid_avg_star: f64,
    pub women_avg_star: f64,
    pub min_promo: f64,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            world_defense: 0.40,
            women_main_event: 0.15,
            women_defense: 0.35,
            tag_defense: 0.35,
            main_avg_star: 80.0,
            main_women_star: 72.0,
            opener_avg_work: 74.0,
            mid_avg_star: 62.0,
            women_avg_star: 55.0,
            min_promo: 70.0,
        }
    }
}
