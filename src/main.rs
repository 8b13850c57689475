use anyhow::{bail, Result};
use std::env;

// Use library instead of local modules
use verdant_terrarium::{
    find_plant, init_logging, load_catalog, Config, Garden, GrowthRules, Plant, PlantProgress,
    SqliteStore,
};

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env();

    match args.get(1).map(String::as_str) {
        None | Some("status") => run_status(&config)?,
        Some("sync") => run_sync(&config)?,
        Some("water") => match args.get(2) {
            Some(plant_id) => run_water(&config, plant_id)?,
            None => bail!("usage: verdant-terrarium water <plant-id>"),
        },
        Some(other) => bail!(
            "unknown command: {} (commands: status | sync | water <plant-id>)",
            other
        ),
    }

    Ok(())
}

fn open_garden(config: &Config) -> Result<Garden<SqliteStore>> {
    let store = SqliteStore::open(&config.db_path)?;
    Garden::open_with(store, &config.storage_key, config.rules)
}

fn load_plants(config: &Config) -> Vec<Plant> {
    let source = config.catalog_source();
    load_catalog(&*source)
}

fn run_status(config: &Config) -> Result<()> {
    println!("🪴 Verdant Terrarium - My Garden");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let garden = open_garden(config)?;
    let plants = load_plants(config);

    let mut ids: Vec<&String> = garden.progress().keys().collect();
    ids.sort();

    if ids.is_empty() {
        println!("\n🌱 Your garden is empty.");
        println!("   Run: verdant-terrarium sync");
        return Ok(());
    }

    println!();
    for id in ids {
        let progress = garden.plant(id);
        let name = find_plant(&plants, id).map(|p| p.name.as_str()).unwrap_or(id);
        println!("  {:<24} {}", name, describe(&progress, garden.rules()));
    }

    let summary = garden.summary();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✓ {} plants, {} watered, total level {}",
        summary.plants_tracked, summary.plants_watered, summary.total_level
    );

    Ok(())
}

fn run_sync(config: &Config) -> Result<()> {
    println!("🔄 Syncing catalog into garden...");

    let plants = load_plants(config);
    println!("✓ Catalog has {} plants", plants.len());

    let mut garden = open_garden(config)?;
    let outcome = garden.sync_catalog(&plants)?;

    if outcome.changed {
        println!("✓ Added {} new plants:", outcome.added.len());
        for id in &outcome.added {
            println!("   + {}", id);
        }
    } else {
        println!("✓ Garden already up to date");
    }

    Ok(())
}

fn run_water(config: &Config, plant_id: &str) -> Result<()> {
    let mut garden = open_garden(config)?;
    let outcome = garden.water(plant_id)?;

    println!("💧 Watered {}", plant_id);
    println!("   {}", describe(&outcome.after, garden.rules()));

    if outcome.leveled_up {
        println!("🌟 Level up! {} is now level {}", plant_id, outcome.after.level);
    }

    Ok(())
}

fn describe(progress: &PlantProgress, rules: &GrowthRules) -> String {
    let watered = progress
        .last_watered_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        "Lv {:<3} xp {:>3}/{:<4} last watered {}",
        progress.level,
        progress.xp,
        rules.threshold(progress.level),
        watered
    )
}
