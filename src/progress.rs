// 🌱 Progress Updater - Watering grants xp, xp rolls over into levels
//
// Following the rule:
//   threshold = level * xp_per_level
//   xp + xp_per_watering >= threshold  →  level + 1, carry the remainder
//
// Pure functions only. Persisting the returned map is the caller's job
// (see garden.rs).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Plant id → progress record
pub type ProgressMap = HashMap<String, PlantProgress>;

// ============================================================================
// PLANT PROGRESS
// ============================================================================

/// Level/xp/lastWatered triple for one plant
///
/// Serialized with camelCase keys so the stored blob reads
/// `{"level": 1, "xp": 0, "lastWatered": 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantProgress {
    pub level: u32,
    pub xp: u32,
    /// Milliseconds since epoch, 0 = never watered
    pub last_watered: i64,
}

impl Default for PlantProgress {
    fn default() -> Self {
        PlantProgress {
            level: 1,
            xp: 0,
            last_watered: 0,
        }
    }
}

impl PlantProgress {
    /// Xp needed to leave the current level (default rules)
    pub fn threshold(&self) -> u32 {
        GrowthRules::default().threshold(self.level)
    }

    /// Fill ratio of the xp bar, in [0, 1)
    pub fn xp_fraction(&self) -> f64 {
        let threshold = self.threshold();
        if threshold == 0 {
            return 0.0;
        }
        self.xp as f64 / threshold as f64
    }

    pub fn has_been_watered(&self) -> bool {
        self.last_watered > 0
    }

    pub fn last_watered_at(&self) -> Option<DateTime<Utc>> {
        if !self.has_been_watered() {
            return None;
        }
        DateTime::from_timestamp_millis(self.last_watered)
    }
}

/// Sum of levels across every record (the garden's headline number)
pub fn total_level(progress: &ProgressMap) -> u64 {
    progress.values().map(|p| p.level as u64).sum()
}

// ============================================================================
// GROWTH RULES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthRules {
    /// Xp granted by one watering (default: 5)
    pub xp_per_watering: u32,

    /// Threshold multiplier, threshold = level * xp_per_level (default: 10)
    pub xp_per_level: u32,
}

impl Default for GrowthRules {
    fn default() -> Self {
        GrowthRules {
            xp_per_watering: 5,
            xp_per_level: 10,
        }
    }
}

impl GrowthRules {
    pub fn threshold(&self, level: u32) -> u32 {
        level.saturating_mul(self.xp_per_level)
    }

    /// Grow one record by a single watering event at `now_ms`
    pub fn grow(&self, current: PlantProgress, now_ms: i64) -> PlantProgress {
        let mut level = current.level.max(1);
        let mut xp = current.xp.saturating_add(self.xp_per_watering);

        // Runs at most once with the default rules (5 < 10)
        let mut threshold = self.threshold(level);
        while threshold > 0 && xp >= threshold {
            xp -= threshold;
            level = level.saturating_add(1);
            threshold = self.threshold(level);
        }

        PlantProgress {
            level,
            xp,
            last_watered: now_ms,
        }
    }
}

// ============================================================================
// WATERING
// ============================================================================

/// Water `plant_id` now (wall clock) with the default rules
pub fn apply_watering(progress: &ProgressMap, plant_id: &str) -> ProgressMap {
    apply_watering_at(
        progress,
        plant_id,
        Utc::now().timestamp_millis(),
        &GrowthRules::default(),
    )
}

/// Water `plant_id` at an explicit timestamp
///
/// Unknown ids start from the default record. Every other entry is copied
/// through untouched.
pub fn apply_watering_at(
    progress: &ProgressMap,
    plant_id: &str,
    now_ms: i64,
    rules: &GrowthRules,
) -> ProgressMap {
    let current = progress.get(plant_id).copied().unwrap_or_default();
    let grown = rules.grow(current, now_ms);

    let mut next = progress.clone();
    next.insert(plant_id.to_string(), grown);
    next
}
