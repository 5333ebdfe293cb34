//! JSON file snapshots of the word store.
//!
//! `vocabulary.json` maps each english key to `{korean, category}` (the older
//! `{english: korean}` form is still read), `quiz_stats.json` maps keys to
//! `[correct, wrong]`.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{normalize_key, Word, WordStore};

pub const VOCAB_FILE: &str = "vocabulary.json";
pub const STATS_FILE: &str = "quiz_stats.json";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Legacy(String),
    Full {
        #[serde(default)]
        korean: String,
        #[serde(default)]
        category: String,
    },
}

#[derive(Serialize)]
struct EntryOut<'a> {
    korean: &'a str,
    category: &'a str,
}

pub struct SnapshotFiles {
    vocab_path: PathBuf,
    stats_path: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotFiles {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vocab_path: dir.join(VOCAB_FILE),
            stats_path: dir.join(STATS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn vocab_path(&self) -> &Path {
        &self.vocab_path
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// Loads both files. A missing file counts as empty; an unreadable one
    /// is moved to `<name>.corrupt-<timestamp>` and treated as empty, so the
    /// next save cannot overwrite it.
    pub async fn load(&self) -> WordStore {
        let vocabulary = match read_json::<Map<String, Value>>(&self.vocab_path).await {
            Ok(Some(map)) => map,
            Ok(None) => {
                tracing::info!(path = %self.vocab_path.display(), "no vocabulary file, starting empty");
                Map::new()
            }
            Err(err) => {
                tracing::error!(path = %self.vocab_path.display(), error = %err, "vocabulary load failed");
                set_aside(&self.vocab_path).await;
                Map::new()
            }
        };

        let stats = match read_json::<HashMap<String, [u32; 2]>>(&self.stats_path).await {
            Ok(Some(stats)) => stats,
            Ok(None) => HashMap::new(),
            Err(err) => {
                tracing::error!(path = %self.stats_path.display(), error = %err, "quiz stats load failed");
                set_aside(&self.stats_path).await;
                HashMap::new()
            }
        };

        let words = words_from_snapshot(vocabulary, &stats);
        let store = WordStore::from_words(words);
        tracing::info!(words = store.len(), "vocabulary loaded");
        store
    }

    /// Writes the current store. Concurrent callers are serialized and each
    /// takes its snapshot after acquiring the writer, so the last write always
    /// carries the newest state.
    pub async fn save(&self, store: &WordStore) -> Result<(), SnapshotError> {
        let _guard = self.write_lock.lock().await;
        let words = store.snapshot();
        let (vocabulary, stats) = encode_snapshot(&words)?;

        // each file is replaced atomically, but not the pair; stats for keys
        // missing from the vocabulary are dropped on load
        write_atomic(&self.vocab_path, &vocabulary).await?;
        write_atomic(&self.stats_path, &stats).await?;
        tracing::debug!(words = words.len(), "snapshot saved");
        Ok(())
    }
}

fn words_from_snapshot(vocabulary: Map<String, Value>, stats: &HashMap<String, [u32; 2]>) -> Vec<Word> {
    let stats: HashMap<String, [u32; 2]> = stats
        .iter()
        .map(|(key, counts)| (normalize_key(key), *counts))
        .collect();

    vocabulary
        .into_iter()
        .filter_map(|(english, value)| {
            let (korean, category) = match serde_json::from_value::<StoredEntry>(value) {
                Ok(StoredEntry::Legacy(korean)) => (korean, String::new()),
                Ok(StoredEntry::Full { korean, category }) => (korean, category),
                Err(err) => {
                    tracing::warn!(english = %english, error = %err, "skipping malformed vocabulary entry");
                    return None;
                }
            };
            let [correct, wrong] = stats.get(&normalize_key(&english)).copied().unwrap_or([0, 0]);
            Some(Word {
                english,
                korean,
                category,
                correct_count: correct,
                wrong_count: wrong,
            })
        })
        .collect()
}

fn encode_snapshot(words: &[Word]) -> Result<(Vec<u8>, Vec<u8>), serde_json::Error> {
    let mut vocabulary = Map::new();
    let mut stats = Map::new();
    for word in words {
        vocabulary.insert(
            word.english.clone(),
            serde_json::to_value(EntryOut {
                korean: &word.korean,
                category: &word.category,
            })?,
        );
        if word.total() > 0 {
            stats.insert(
                word.english.clone(),
                serde_json::json!([word.correct_count, word.wrong_count]),
            );
        }
    }
    Ok((
        serde_json::to_vec_pretty(&vocabulary)?,
        serde_json::to_vec_pretty(&stats)?,
    ))
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, SnapshotError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".corrupt-{stamp}"));
    path.with_file_name(name)
}

async fn set_aside(path: &Path) {
    let backup = corrupt_path(path);
    match tokio::fs::rename(path, &backup).await {
        Ok(()) => {
            tracing::warn!(path = %path.display(), backup = %backup.display(), "unreadable snapshot moved aside")
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to move unreadable snapshot aside")
        }
    }
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = SnapshotFiles::new(dir.path());
        assert!(files.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        let files = SnapshotFiles::new(dir.path().join("nested"));

        let store = WordStore::new();
        store.add("zebra", "얼룩말", Some("animal")).unwrap();
        store.add("apple", "사과", Some("fruit")).unwrap();
        store.record_answer("apple", |_| true).unwrap();
        store.record_answer("apple", |_| false).unwrap();
        files.save(&store).await.unwrap();

        let loaded = files.load().await;
        assert_eq!(loaded.snapshot(), store.snapshot());

        let stats: Value = serde_json::from_slice(&std::fs::read(files.stats_path()).unwrap()).unwrap();
        assert_eq!(stats, serde_json::json!({"apple": [1, 1]}));
    }

    #[tokio::test]
    async fn test_legacy_vocabulary_format() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(VOCAB_FILE),
            r#"{"book": "책", "desk": {"korean": "책상", "category": "school"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(STATS_FILE),
            r#"{"book": [2, 3], "ghost": [9, 9]}"#,
        )
        .unwrap();

        let store = SnapshotFiles::new(dir.path()).load().await;
        let words = store.snapshot();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].english, "book");
        assert_eq!(words[0].category, "");
        assert_eq!((words[0].correct_count, words[0].wrong_count), (2, 3));
        assert_eq!(words[1].category, "school");
        assert_eq!(words[1].total(), 0);
    }

    fn backups(dir: &Path, prefix: &str) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&format!("{prefix}.corrupt-")))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VOCAB_FILE), "{not json").unwrap();
        assert!(SnapshotFiles::new(dir.path()).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_vocabulary_survives_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let broken: String = {
            let entries: Vec<String> = (0..50).map(|i| format!("\"word{i}\": \"뜻{i}\"")).collect();
            format!("{{{},}}", entries.join(","))
        };
        std::fs::write(dir.path().join(VOCAB_FILE), &broken).unwrap();
        std::fs::write(dir.path().join(STATS_FILE), "[1, 2").unwrap();

        let files = SnapshotFiles::new(dir.path());
        let store = files.load().await;
        assert!(store.is_empty());
        store.add("new", "새", None).unwrap();
        files.save(&store).await.unwrap();

        let vocab_backups = backups(dir.path(), VOCAB_FILE);
        assert_eq!(vocab_backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&vocab_backups[0]).unwrap(), broken);
        let stats_backups = backups(dir.path(), STATS_FILE);
        assert_eq!(stats_backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&stats_backups[0]).unwrap(), "[1, 2");

        let saved: Value = serde_json::from_slice(&std::fs::read(files.vocab_path()).unwrap()).unwrap();
        assert_eq!(saved, serde_json::json!({"new": {"korean": "새", "category": ""}}));
    }

    #[tokio::test]
    async fn test_missing_files_are_not_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        SnapshotFiles::new(dir.path()).load().await;
        assert!(backups(dir.path(), VOCAB_FILE).is_empty());
        assert!(backups(dir.path(), STATS_FILE).is_empty());
    }
}
