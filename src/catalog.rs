// 🪴 Plant Catalog - What the shop sells, and where the ids come from
//
// The live catalog comes from an upstream feed that can fail. Whatever
// happens there, the garden needs *some* list of plants, so every fetch
// goes through load_catalog() which falls back to the built-in list.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// PLANT ATTRIBUTES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantCategory {
    Indoor,
    Outdoor,
    Succulent,
    Flowering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Expert,
}

/// Low / medium / high, used for both sunlight and water needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Need {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    LowStock,
    #[default]
    OutOfStock,
    Seasonal,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::LowStock => "Low Stock",
            Availability::OutOfStock => "Out of Stock",
            Availability::Seasonal => "Seasonal",
        }
    }
}

// ============================================================================
// PLANT
// ============================================================================

/// One catalog entry. Only `id` matters to the garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    /// Stable join key between catalog and progress records
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub description: String,
    pub category: PlantCategory,
    pub difficulty: Difficulty,
    pub sunlight: Need,
    pub water: Need,
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    pub size: String,
    pub location: String,
    #[serde(default)]
    pub is_new: bool,
}

/// Catalog ids in catalog order
pub fn plant_ids(plants: &[Plant]) -> Vec<&str> {
    plants.iter().map(|p| p.id.as_str()).collect()
}

pub fn find_plant<'a>(plants: &'a [Plant], id: &str) -> Option<&'a Plant> {
    plants.iter().find(|p| p.id == id)
}

// ============================================================================
// FILTERING
// ============================================================================

/// Catalog search + facet filters
///
/// Every facet accepts "all" (or absence) as "no filter". Deserializes from a
/// query string such as `?search=fig&category=indoor&availability=in-stock`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogFilter {
    /// Case-insensitive substring of name or scientific name
    pub search: Option<String>,
    #[serde(deserialize_with = "all_or")]
    pub category: Option<PlantCategory>,
    #[serde(deserialize_with = "all_or")]
    pub difficulty: Option<Difficulty>,
    #[serde(deserialize_with = "all_or")]
    pub sunlight: Option<Need>,
    /// `in-stock` also admits `low-stock` plants
    #[serde(deserialize_with = "all_or")]
    pub availability: Option<Availability>,
}

fn all_or<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => serde_json::from_value(serde_json::Value::String(value.to_string()))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl CatalogFilter {
    pub fn matches(&self, plant: &Plant) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                plant.name.to_lowercase().contains(&term)
                    || plant.scientific_name.to_lowercase().contains(&term)
            }
        };

        let matches_availability = match self.availability {
            None => true,
            Some(Availability::InStock) => matches!(
                plant.availability,
                Availability::InStock | Availability::LowStock
            ),
            Some(wanted) => plant.availability == wanted,
        };

        matches_search
            && self.category.map_or(true, |c| plant.category == c)
            && self.difficulty.map_or(true, |d| plant.difficulty == d)
            && self.sunlight.map_or(true, |s| plant.sunlight == s)
            && matches_availability
    }
}

/// Plants passing `filter`, in catalog order
pub fn filter_plants<'a>(plants: &'a [Plant], filter: &CatalogFilter) -> Vec<&'a Plant> {
    plants.iter().filter(|p| filter.matches(p)).collect()
}

// ============================================================================
// CATALOG SOURCES
// ============================================================================

/// Upstream supplier of plant records
pub trait CatalogSource {
    fn name(&self) -> &str;
    fn fetch_plants(&self) -> Result<Vec<Plant>>;
}

/// The built-in list, used when nothing better is configured
pub struct StaticCatalog;

impl CatalogSource for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_plants(&self) -> Result<Vec<Plant>> {
        Ok(fallback_plants())
    }
}

/// A catalog snapshot staged on disk as a JSON array of plants
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileCatalog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileCatalog {
    fn name(&self) -> &str {
        "json-file"
    }

    fn fetch_plants(&self) -> Result<Vec<Plant>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog from {}", self.path.display()))?;
        let plants: Vec<Plant> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog {}", self.path.display()))?;
        Ok(plants)
    }
}

/// Fetch from `source`, falling back to the built-in list on any error
pub fn load_catalog(source: &dyn CatalogSource) -> Vec<Plant> {
    match source.fetch_plants() {
        Ok(plants) => {
            log::info!("Loaded {} plants from {} catalog", plants.len(), source.name());
            plants
        }
        Err(e) => {
            log::error!(
                "Error fetching plants from {} catalog, using fallback: {:#}",
                source.name(),
                e
            );
            fallback_plants()
        }
    }
}

// ============================================================================
// FALLBACK LIST
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn plant(
    id: &str,
    name: &str,
    scientific_name: &str,
    description: &str,
    category: PlantCategory,
    difficulty: Difficulty,
    sunlight: Need,
    water: Need,
    tags: &[&str],
    availability: Availability,
    size: &str,
) -> Plant {
    Plant {
        id: id.to_string(),
        name: name.to_string(),
        scientific_name: scientific_name.to_string(),
        description: description.to_string(),
        category,
        difficulty,
        sunlight,
        water,
        image_url: format!("/images/plants/{}.jpg", id),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        availability,
        size: size.to_string(),
        location: "Greenhouse".to_string(),
        is_new: false,
    }
}

pub fn fallback_plants() -> Vec<Plant> {
    vec![
        plant(
            "monstera",
            "Monstera Deliciosa",
            "Monstera deliciosa",
            "Split-leaf favourite that climbs happily on a moss pole.",
            PlantCategory::Indoor,
            Difficulty::Easy,
            Need::Medium,
            Need::Medium,
            &["air-purifying", "statement"],
            Availability::InStock,
            "Large",
        ),
        plant(
            "snake-plant",
            "Snake Plant",
            "Dracaena trifasciata",
            "Upright sword leaves that shrug off neglect and low light.",
            PlantCategory::Indoor,
            Difficulty::Easy,
            Need::Low,
            Need::Low,
            &["air-purifying", "beginner"],
            Availability::InStock,
            "Medium",
        ),
        plant(
            "fiddle-leaf-fig",
            "Fiddle Leaf Fig",
            "Ficus lyrata",
            "Broad violin-shaped leaves. Dislikes being moved.",
            PlantCategory::Indoor,
            Difficulty::Expert,
            Need::High,
            Need::Medium,
            &["statement"],
            Availability::LowStock,
            "Large",
        ),
        plant(
            "echeveria",
            "Echeveria",
            "Echeveria elegans",
            "Pale blue rosettes for a bright windowsill.",
            PlantCategory::Succulent,
            Difficulty::Easy,
            Need::High,
            Need::Low,
            &["pet-friendly", "compact"],
            Availability::InStock,
            "Small",
        ),
        plant(
            "hibiscus",
            "Hibiscus",
            "Hibiscus rosa-sinensis",
            "Big tropical blooms through the warm months.",
            PlantCategory::Flowering,
            Difficulty::Moderate,
            Need::High,
            Need::High,
            &["flowering"],
            Availability::Seasonal,
            "Medium",
        ),
        plant(
            "bougainvillea",
            "Bougainvillea",
            "Bougainvillea glabra",
            "Vigorous climber with papery magenta bracts.",
            PlantCategory::Outdoor,
            Difficulty::Moderate,
            Need::High,
            Need::Low,
            &["climber", "flowering"],
            Availability::OutOfStock,
            "Large",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenCatalog;

    impl CatalogSource for BrokenCatalog {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch_plants(&self) -> Result<Vec<Plant>> {
            anyhow::bail!("feed unreachable")
        }
    }

    #[test]
    fn test_fallback_ids_are_unique() {
        let plants = fallback_plants();
        let mut ids = plant_ids(&plants);
        let total = ids.len();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), total);
        assert!(total > 0);
    }

    #[test]
    fn test_load_catalog_falls_back_on_error() {
        let plants = load_catalog(&BrokenCatalog);

        assert_eq!(plants, fallback_plants());

        println!("✅ Catalog fallback test passed: {} plants", plants.len());
    }

    #[test]
    fn test_json_file_catalog() {
        let path = std::env::temp_dir().join(format!(
            "terrarium_catalog_{}.json",
            std::process::id()
        ));
        let json = serde_json::json!([{
            "id": "pothos",
            "name": "Golden Pothos",
            "scientificName": "Epipremnum aureum",
            "description": "Trailing vine",
            "category": "indoor",
            "difficulty": "easy",
            "sunlight": "low",
            "water": "medium",
            "imageUrl": "/p.jpg",
            "availability": "low-stock",
            "size": "Small",
            "location": "Shelf",
            "isNew": true
        }]);
        fs::write(&path, json.to_string()).unwrap();

        let plants = JsonFileCatalog::new(&path).fetch_plants().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].id, "pothos");
        assert_eq!(plants[0].availability, Availability::LowStock);
        assert!(plants[0].tags.is_empty());
        assert!(plants[0].is_new);
    }

    #[test]
    fn test_missing_json_file_falls_back() {
        let source = JsonFileCatalog::new("/nonexistent/terrarium/catalog.json");

        assert!(source.fetch_plants().is_err());
        assert_eq!(load_catalog(&source).len(), fallback_plants().len());
    }

    #[test]
    fn test_availability_defaults_to_out_of_stock() {
        let json = r#"{
            "id": "x", "name": "X", "scientificName": "", "description": "",
            "category": "outdoor", "difficulty": "moderate", "sunlight": "high",
            "water": "high", "imageUrl": "", "size": "", "location": ""
        }"#;

        let plant: Plant = serde_json::from_str(json).unwrap();

        assert_eq!(plant.availability, Availability::OutOfStock);
        assert!(!plant.is_new);
        assert!(find_plant(&[plant.clone()], "x").is_some());
    }

    #[test]
    fn test_filter_defaults_match_everything() {
        let plants = fallback_plants();

        let filtered = filter_plants(&plants, &CatalogFilter::default());

        assert_eq!(filtered.len(), plants.len());
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let plants = fallback_plants();
        let by_name = CatalogFilter {
            search: Some("SNAKE".to_string()),
            ..Default::default()
        };
        let by_scientific = CatalogFilter {
            search: Some("ficus".to_string()),
            ..Default::default()
        };

        let ids: Vec<&str> = filter_plants(&plants, &by_name).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["snake-plant"]);

        let ids: Vec<&str> = filter_plants(&plants, &by_scientific).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["fiddle-leaf-fig"]);
    }

    #[test]
    fn test_filter_in_stock_includes_low_stock() {
        let plants = fallback_plants();
        let filter = CatalogFilter {
            availability: Some(Availability::InStock),
            ..Default::default()
        };

        let filtered = filter_plants(&plants, &filter);

        assert!(filtered.iter().any(|p| p.availability == Availability::LowStock));
        assert!(filtered.iter().all(|p| matches!(
            p.availability,
            Availability::InStock | Availability::LowStock
        )));
        assert!(!filtered.iter().any(|p| p.id == "hibiscus" || p.id == "bougainvillea"));

        println!("✅ In-stock filter test passed: {} plants", filtered.len());
    }

    #[test]
    fn test_filter_facets_combine() {
        let plants = fallback_plants();
        let filter = CatalogFilter {
            category: Some(PlantCategory::Indoor),
            difficulty: Some(Difficulty::Easy),
            sunlight: Some(Need::Low),
            ..Default::default()
        };

        let ids: Vec<&str> = filter_plants(&plants, &filter).iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["snake-plant"]);
    }

    #[test]
    fn test_filter_deserializes_all_as_no_filter() {
        let json = serde_json::json!({
            "category": "all",
            "difficulty": "expert",
            "sunlight": "all",
            "availability": "in-stock"
        });

        let filter: CatalogFilter = serde_json::from_value(json).unwrap();

        assert_eq!(filter.category, None);
        assert_eq!(filter.difficulty, Some(Difficulty::Expert));
        assert_eq!(filter.sunlight, None);
        assert_eq!(filter.availability, Some(Availability::InStock));
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_filter_rejects_unknown_facet_value() {
        let json = serde_json::json!({"category": "aquatic"});

        assert!(serde_json::from_value::<CatalogFilter>(json).is_err());
    }
}
