//! Verified collection snapshots

use std::path::Path;

use arcade::{report_file_name, verified_collections, write_report, CollectionEntry};

use crate::AppContext;

const SNAPSHOT_PREFIX: &str = "collections_data";

/// Fetch verified collections and store a `{id, name}` snapshot
pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let collections = ctx.arcade.get_collections().await?;
    let total = collections.len();
    let verified = verified_collections(collections);

    let file_name = report_file_name(SNAPSHOT_PREFIX, "json", chrono::Utc::now());
    let snapshot = serde_json::to_string_pretty(&verified)?;
    let path = write_report(&ctx.report_dir, &file_name, &snapshot)?;

    tracing::info!(total = total, verified = verified.len(), "Stored collections snapshot");
    println!("Saved {} verified collections to {}", verified.len(), path.display());
    Ok(())
}

/// Entries from the newest snapshot in `dir`; empty when none is readable
pub fn load_latest(dir: &Path) -> Vec<CollectionEntry> {
    let Some(path) = latest_snapshot(dir) else {
        tracing::debug!(dir = %dir.display(), "No collections snapshot found");
        return Vec::new();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|body| serde_json::from_str(&body).map_err(|e| e.to_string()));

    match parsed {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable collections snapshot");
            Vec::new()
        }
    }
}

/// Snapshot names embed a sortable timestamp, so the greatest name is newest
fn latest_snapshot(dir: &Path) -> Option<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SNAPSHOT_PREFIX) && n.ends_with(".json"))
        })
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_latest_picks_newest_snapshot() {
        let dir = std::env::temp_dir().join(format!("arcade-collections-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("collections_data_20260101_000000.json"),
            r#"[{"id":"0x01","name":"Old"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("collections_data_20261017_093000.json"),
            r#"[{"id":"0x01","name":"New"}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("listings_20261231_000000.log"), "ignored").unwrap();

        let entries = load_latest(&dir);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "New");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_latest_missing_dir() {
        assert!(load_latest(Path::new("/nonexistent/arcade-lender")).is_empty());
    }
}
