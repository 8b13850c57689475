// Verdant Terrarium - Core Library
// Exposes the garden progression logic for the CLI, the API server, and tests

pub mod progress;       // Progress Updater - watering, xp, level rollover
pub mod reconciliation; // Catalog Reconciler - default records for new plants
pub mod catalog;        // Plant records + catalog sources with fallback
pub mod db;             // Key-value storage + progress blob
pub mod garden;         // Garden session (owns map + storage)
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use progress::{
    PlantProgress, ProgressMap, GrowthRules,
    apply_watering, apply_watering_at, total_level,
};
pub use reconciliation::{reconcile, missing_ids};
pub use catalog::{
    Plant, PlantCategory, Difficulty, Need, Availability,
    CatalogSource, StaticCatalog, JsonFileCatalog,
    CatalogFilter, filter_plants,
    load_catalog, fallback_plants, plant_ids, find_plant,
};
pub use db::{
    KeyValueStore, SqliteStore, MemoryStore, STORAGE_KEY,
    setup_database, load_progress, save_progress,
};
pub use garden::{Garden, GardenSummary, SyncOutcome, WateringOutcome};
pub use config::Config;
pub use logging::init_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
