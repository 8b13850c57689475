use std::env;
use std::path::PathBuf;

use crate::catalog::{CatalogSource, JsonFileCatalog, StaticCatalog};
use crate::db::STORAGE_KEY;
use crate::progress::GrowthRules;

pub const DEFAULT_DB_PATH: &str = "terrarium.db";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings, read from TERRARIUM_* environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding the key-value store (TERRARIUM_DB)
    pub db_path: PathBuf,

    /// Key the progress blob is stored under (TERRARIUM_STORAGE_KEY)
    pub storage_key: String,

    /// Optional JSON catalog snapshot (TERRARIUM_CATALOG)
    pub catalog_path: Option<PathBuf>,

    /// Server bind address (TERRARIUM_ADDR)
    pub addr: String,

    /// Xp per watering / per level (TERRARIUM_XP_PER_WATERING, TERRARIUM_XP_PER_LEVEL)
    pub rules: GrowthRules,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            storage_key: STORAGE_KEY.to_string(),
            catalog_path: None,
            addr: DEFAULT_ADDR.to_string(),
            rules: GrowthRules::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Config {
            db_path: get("TERRARIUM_DB").map(PathBuf::from).unwrap_or(defaults.db_path),
            storage_key: get("TERRARIUM_STORAGE_KEY").unwrap_or(defaults.storage_key),
            catalog_path: get("TERRARIUM_CATALOG").map(PathBuf::from),
            addr: get("TERRARIUM_ADDR").unwrap_or(defaults.addr),
            rules: GrowthRules {
                xp_per_watering: parse_positive(get("TERRARIUM_XP_PER_WATERING"), "TERRARIUM_XP_PER_WATERING")
                    .unwrap_or(defaults.rules.xp_per_watering),
                xp_per_level: parse_positive(get("TERRARIUM_XP_PER_LEVEL"), "TERRARIUM_XP_PER_LEVEL")
                    .unwrap_or(defaults.rules.xp_per_level),
            },
        }
    }

    pub fn catalog_source(&self) -> Box<dyn CatalogSource + Send + Sync> {
        match &self.catalog_path {
            Some(path) => Box::new(JsonFileCatalog::new(path.clone())),
            None => Box::new(StaticCatalog),
        }
    }
}

/// Positive integer from a variable; anything else is logged and ignored
fn parse_positive(value: Option<String>, name: &str) -> Option<u32> {
    let value = value?;
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("Ignoring {}={:?}: expected a positive integer", name, value);
            None
        }
    }
}
