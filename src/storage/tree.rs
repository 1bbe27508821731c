//! Directory-tree materializer.
//!
//! The final stage writes one subdirectory per logical entity under a
//! configured root, with a fixed-name JSON file per subdirectory holding
//! that entity's record. Loading walks exactly one level and builds the
//! index fresh on every pass; a missing or malformed per-entity file is
//! not an error for the whole tree, the entity is simply omitted.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Load one JSON record per immediate child directory of `base`.
///
/// Keys are child directory names; children whose `record_file` is missing
/// or fails to decode are omitted.
pub async fn load_tree(base: &Path, record_file: &str) -> Result<BTreeMap<String, Value>> {
    let mut tree = BTreeMap::new();
    let mut entries = tokio::fs::read_dir(base).await?;

    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        match tokio::fs::read(entry.path().join(record_file)).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    tree.insert(name, value);
                }
                Err(e) => {
                    log::debug!("skipping {name}: malformed {record_file}: {e}");
                }
            },
            Err(e) => {
                log::debug!("skipping {name}: no readable {record_file}: {e}");
            }
        }
    }
    Ok(tree)
}

/// Synchronous variant of [`load_tree`], same contract.
pub fn load_tree_sync(base: &Path, record_file: &str) -> Result<BTreeMap<String, Value>> {
    let mut tree = BTreeMap::new();

    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        match fs::read(entry.path().join(record_file)) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    tree.insert(name, value);
                }
                Err(e) => {
                    log::debug!("skipping {name}: malformed {record_file}: {e}");
                }
            },
            Err(e) => {
                log::debug!("skipping {name}: no readable {record_file}: {e}");
            }
        }
    }
    Ok(tree)
}

/// Write one entity's record to `{base}/{key}/{record_file}`, pretty-printed,
/// atomically (temp file + rename).
pub async fn write_record(base: &Path, key: &str, record_file: &str, value: &Value) -> Result<()> {
    let dir = base.join(key);
    tokio::fs::create_dir_all(&dir).await?;

    let path = dir.join(record_file);
    let tmp = path.with_extension("tmp");
    let bytes = serde_json::to_vec_pretty(value)?;

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, &path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn seed_entity(base: &Path, name: &str, content: &str) {
        let dir = base.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("module.json"), content).unwrap();
    }

    #[tokio::test]
    async fn loads_one_record_per_child() {
        let tmp = TempDir::new().unwrap();
        seed_entity(tmp.path(), "CS1010", r#"{"ModuleCode": "CS1010"}"#);
        seed_entity(tmp.path(), "MA1101R", r#"{"ModuleCode": "MA1101R"}"#);

        let tree = load_tree(tmp.path(), "module.json").await.unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree["CS1010"]["ModuleCode"], json!("CS1010"));
    }

    #[tokio::test]
    async fn malformed_child_is_omitted() {
        let tmp = TempDir::new().unwrap();
        seed_entity(tmp.path(), "CS1010", r#"{"ModuleCode": "CS1010"}"#);
        seed_entity(tmp.path(), "BROKEN", "{not json");
        seed_entity(tmp.path(), "MA1101R", r#"{"ModuleCode": "MA1101R"}"#);

        let tree = load_tree(tmp.path(), "module.json").await.unwrap();
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains_key("BROKEN"));
    }

    #[test]
    fn sync_variant_matches_async_contract() {
        let tmp = TempDir::new().unwrap();
        seed_entity(tmp.path(), "CS1010", r#"{"ModuleCredit": "4"}"#);
        // plain files at the top level are not entities
        fs::write(tmp.path().join("stray.json"), "{}").unwrap();
        // a child without the record file is skipped
        fs::create_dir_all(tmp.path().join("EMPTY")).unwrap();

        let tree = load_tree_sync(tmp.path(), "module.json").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["CS1010"]["ModuleCredit"], json!("4"));
    }

    #[test]
    fn walk_is_one_level_only() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("2016-2017").join("CS1010");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("module.json"), "{}").unwrap();

        let tree = load_tree_sync(tmp.path(), "module.json").unwrap();
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn write_record_round_trips() {
        let tmp = TempDir::new().unwrap();
        let record = json!({"ModuleCode": "CS1010", "ModuleCredit": "4"});

        write_record(tmp.path(), "CS1010", "module.json", &record)
            .await
            .unwrap();

        let tree = load_tree(tmp.path(), "module.json").await.unwrap();
        assert_eq!(tree["CS1010"], record);
    }
}
