//! JSON import/export module for review items.
//! Saves and loads review state to/from JSON files, e.g. to move progress between devices.

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::models::ReviewItem;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Exports items to a pretty-printed JSON array at the specified path.
pub fn export_items_to_path(items: &[ReviewItem], path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(items)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;

    tracing::info!(count = items.len(), path = %path.display(), "Exported review items");
    Ok(())
}

/// Imports items from a JSON file.
/// Items whose ease factor is below the configured floor, or whose next review
/// is not `interval` days after the last one, are rejected.
pub fn import_items(path: &Path, config: &SchedulerConfig) -> Result<Vec<ReviewItem>> {
    let file = File::open(path)?;
    let items: Vec<ReviewItem> = serde_json::from_reader(BufReader::new(file))?;

    if let Some(bad) = items
        .iter()
        .find(|item| item.ease_factor < config.min_ease_factor)
    {
        return Err(Error::InvalidItem(format!(
            "'{}' has ease factor {} below the minimum {}",
            bad.id, bad.ease_factor, config.min_ease_factor
        )));
    }

    if let Some(bad) = items.iter().find(|item| !item.has_consistent_due_date()) {
        return Err(Error::InvalidItem(format!(
            "'{}' is due {} but was last reviewed {} with an interval of {} day(s)",
            bad.id, bad.next_review, bad.last_reviewed, bad.interval
        )));
    }

    tracing::info!(count = items.len(), path = %path.display(), "Imported review items");
    Ok(items)
}
