// 🌿 Garden Session - Owns the progress map and its storage
//
// Created once at startup from storage, mutated only through sync_catalog()
// and water(). Persistence happens here, after the pure computation in
// progress.rs / reconciliation.rs has produced the next map:
//   - water()        always writes
//   - sync_catalog() writes only when a record was actually added

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::catalog::{plant_ids, Plant};
use crate::db::{load_progress, save_progress, KeyValueStore, STORAGE_KEY};
use crate::progress::{self, apply_watering_at, GrowthRules, PlantProgress, ProgressMap};
use crate::reconciliation::{missing_ids, reconcile};

/// Outcome of one watering event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringOutcome {
    pub plant_id: String,
    pub before: PlantProgress,
    pub after: PlantProgress,
    pub leveled_up: bool,
}

/// Outcome of folding a catalog into the garden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Ids that received a fresh default record
    pub added: Vec<String>,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenSummary {
    pub plants_tracked: usize,
    pub plants_watered: usize,
    pub total_level: u64,
    pub highest_level: u32,
}

pub struct Garden<S: KeyValueStore> {
    store: S,
    storage_key: String,
    rules: GrowthRules,
    progress: ProgressMap,
}

impl<S: KeyValueStore> Garden<S> {
    /// Open a session under the default storage key
    pub fn open(store: S) -> Result<Self> {
        Self::open_with(store, STORAGE_KEY, GrowthRules::default())
    }

    pub fn open_with(store: S, storage_key: &str, rules: GrowthRules) -> Result<Self> {
        let progress = load_progress(&store, storage_key)?;
        log::info!(
            "Garden loaded: {} plants tracked under '{}'",
            progress.len(),
            storage_key
        );

        Ok(Garden {
            store,
            storage_key: storage_key.to_string(),
            rules,
            progress,
        })
    }

    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    /// Record for `plant_id`, or the default if it has never been seen
    pub fn plant(&self, plant_id: &str) -> PlantProgress {
        self.progress.get(plant_id).copied().unwrap_or_default()
    }

    pub fn rules(&self) -> &GrowthRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Make sure every catalog id has a record; persist only on change
    pub fn sync_ids<I, T>(&mut self, catalog_ids: I) -> Result<SyncOutcome>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let ids: Vec<T> = catalog_ids.into_iter().collect();
        let added = missing_ids(&self.progress, &ids);

        let next = match reconcile(&self.progress, &ids) {
            Cow::Borrowed(_) => {
                log::debug!("Catalog sync: nothing new ({} ids)", ids.len());
                return Ok(SyncOutcome {
                    added,
                    changed: false,
                });
            }
            Cow::Owned(next) => next,
        };

        save_progress(&mut self.store, &self.storage_key, &next)?;
        self.progress = next;
        log::info!("Catalog sync: {} new plants added to garden", added.len());

        Ok(SyncOutcome {
            added,
            changed: true,
        })
    }

    pub fn sync_catalog(&mut self, plants: &[Plant]) -> Result<SyncOutcome> {
        self.sync_ids(plant_ids(plants))
    }

    /// Water `plant_id` now and persist the new map
    pub fn water(&mut self, plant_id: &str) -> Result<WateringOutcome> {
        self.water_at(plant_id, chrono::Utc::now().timestamp_millis())
    }

    pub fn water_at(&mut self, plant_id: &str, now_ms: i64) -> Result<WateringOutcome> {
        let before = self.plant(plant_id);
        let next = apply_watering_at(&self.progress, plant_id, now_ms, &self.rules);

        save_progress(&mut self.store, &self.storage_key, &next)?;
        self.progress = next;

        let after = self.plant(plant_id);
        let leveled_up = after.level > before.level;
        if leveled_up {
            log::info!("🌟 {} reached level {}", plant_id, after.level);
        } else {
            log::debug!("Watered {}: xp {} → {}", plant_id, before.xp, after.xp);
        }

        Ok(WateringOutcome {
            plant_id: plant_id.to_string(),
            before,
            after,
            leveled_up,
        })
    }

    pub fn summary(&self) -> GardenSummary {
        GardenSummary {
            plants_tracked: self.progress.len(),
            plants_watered: self
                .progress
                .values()
                .filter(|p| p.has_been_watered())
                .count(),
            total_level: progress::total_level(&self.progress),
            highest_level: self.progress.values().map(|p| p.level).max().unwrap_or(0),
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
