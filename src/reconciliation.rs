// ⚖️ Catalog Reconciler - Every catalog plant gets a progress record
//
// The catalog is refreshable and can grow upstream. Re-fetching it must
// never reset progress: known ids are left exactly as they are, unknown ids
// get the default record.
//
// When nothing is missing the input map is handed back borrowed, so callers
// that persist on change (garden.rs) skip the write.

use crate::progress::{PlantProgress, ProgressMap};
use std::borrow::Cow;

/// Ensure every id in `catalog_ids` has a record
///
/// Returns `Cow::Borrowed(progress)` when every id is already known,
/// `Cow::Owned` with the defaults inserted otherwise.
pub fn reconcile<'a, I, S>(progress: &'a ProgressMap, catalog_ids: I) -> Cow<'a, ProgressMap>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Cow<'a, ProgressMap> = Cow::Borrowed(progress);

    for id in catalog_ids {
        let id = id.as_ref();
        if result.contains_key(id) {
            continue;
        }
        result
            .to_mut()
            .insert(id.to_string(), PlantProgress::default());
    }

    result
}

/// Ids from `catalog_ids` with no record yet, in catalog order, deduplicated
pub fn missing_ids<I, S>(progress: &ProgressMap, catalog_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut missing: Vec<String> = Vec::new();

    for id in catalog_ids {
        let id = id.as_ref();
        if !progress.contains_key(id) && !missing.iter().any(|m| m == id) {
            missing.push(id.to_string());
        }
    }

    missing
}
