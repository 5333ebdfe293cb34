pub mod snapshot;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

pub const MAX_ENGLISH_LEN: usize = 100;
pub const MAX_KOREAN_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub english: String,
    pub korean: String,
    pub category: String,
    pub correct_count: u32,
    pub wrong_count: u32,
}

impl Word {
    pub fn new(english: impl Into<String>, korean: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            korean: korean.into(),
            category: category.into(),
            correct_count: 0,
            wrong_count: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.correct_count.saturating_add(self.wrong_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("'{0}' 단어가 이미 존재합니다.")]
    DuplicateWord(String),
    #[error("단어를 찾을 수 없습니다.")]
    NotFound(String),
}

/// Keys are compared trimmed and lowercased.
pub fn normalize_key(english: &str) -> String {
    english.trim().to_lowercase()
}

fn validate_fields(english: &str, korean: &str) -> Result<(), StoreError> {
    if english.is_empty() {
        return Err(StoreError::InvalidInput("영어 단어를 입력해주세요.".to_string()));
    }
    if korean.is_empty() {
        return Err(StoreError::InvalidInput("한국어 뜻을 입력해주세요.".to_string()));
    }
    if english.chars().count() > MAX_ENGLISH_LEN {
        return Err(StoreError::InvalidInput(format!(
            "영어 단어는 {MAX_ENGLISH_LEN}자 이하여야 합니다."
        )));
    }
    if korean.chars().count() > MAX_KOREAN_LEN {
        return Err(StoreError::InvalidInput(format!(
            "한국어 뜻은 {MAX_KOREAN_LEN}자 이하여야 합니다."
        )));
    }
    Ok(())
}

#[derive(Default)]
struct Entries {
    order: Vec<String>,
    by_key: HashMap<String, Arc<Mutex<Word>>>,
}

/// Shared vocabulary store.
///
/// Structural changes (add, update, remove) hold the write lock. Counter
/// updates hold the read lock plus the entry's own mutex, so checks on
/// different words proceed in parallel while checks on the same word are
/// serialized.
#[derive(Default)]
pub struct WordStore {
    entries: RwLock<Entries>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from previously saved words. Entries with an empty or
    /// repeated key are skipped.
    pub fn from_words(words: impl IntoIterator<Item = Word>) -> Self {
        let mut entries = Entries::default();
        for mut word in words {
            let key = normalize_key(&word.english);
            if key.is_empty() || entries.by_key.contains_key(&key) {
                tracing::warn!(english = %word.english, "skipping invalid or duplicate saved word");
                continue;
            }
            word.english = key.clone();
            entries.order.push(key.clone());
            entries.by_key.insert(key, Arc::new(Mutex::new(word)));
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Words in insertion order. An empty filter lists every word.
    pub fn list(&self, category: Option<&str>) -> Vec<Word> {
        let category = category.filter(|c| !c.is_empty());
        let entries = self.entries.read();
        entries
            .order
            .iter()
            .filter_map(|key| entries.by_key.get(key))
            .map(|entry| entry.lock().clone())
            .filter(|word| category.map_or(true, |c| word.category == c))
            .collect()
    }

    pub fn snapshot(&self) -> Vec<Word> {
        self.list(None)
    }

    pub fn get(&self, english: &str) -> Result<Word, StoreError> {
        let key = normalize_key(english);
        let entries = self.entries.read();
        entries
            .by_key
            .get(&key)
            .map(|entry| entry.lock().clone())
            .ok_or(StoreError::NotFound(key))
    }

    pub fn add(&self, english: &str, korean: &str, category: Option<&str>) -> Result<Word, StoreError> {
        let key = normalize_key(english);
        let korean = korean.trim();
        validate_fields(&key, korean)?;

        let mut entries = self.entries.write();
        if entries.by_key.contains_key(&key) {
            return Err(StoreError::DuplicateWord(key));
        }

        let word = Word::new(key.clone(), korean, category.unwrap_or_default().trim());
        entries.order.push(key.clone());
        entries
            .by_key
            .insert(key, Arc::new(Mutex::new(word.clone())));
        Ok(word)
    }

    /// Replaces the fields of an existing word, keeping its counters and its
    /// position. A missing or blank category keeps the current one.
    pub fn update(
        &self,
        old_english: &str,
        new_english: &str,
        new_korean: &str,
        new_category: Option<&str>,
    ) -> Result<Word, StoreError> {
        let old_key = normalize_key(old_english);
        let new_key = normalize_key(new_english);
        let new_korean = new_korean.trim();
        validate_fields(&new_key, new_korean)?;

        let mut entries = self.entries.write();
        let Some(entry) = entries.by_key.get(&old_key).cloned() else {
            return Err(StoreError::NotFound(old_key));
        };
        if new_key != old_key && entries.by_key.contains_key(&new_key) {
            return Err(StoreError::DuplicateWord(new_key));
        }

        let updated = {
            let mut word = entry.lock();
            word.english = new_key.clone();
            word.korean = new_korean.to_string();
            if let Some(category) = new_category.map(str::trim).filter(|c| !c.is_empty()) {
                word.category = category.to_string();
            }
            word.clone()
        };

        if new_key != old_key {
            entries.by_key.remove(&old_key);
            entries.by_key.insert(new_key.clone(), entry);
            if let Some(slot) = entries.order.iter_mut().find(|key| **key == old_key) {
                *slot = new_key;
            }
        }

        Ok(updated)
    }

    pub fn remove(&self, english: &str) -> Result<Word, StoreError> {
        let key = normalize_key(english);
        if key.is_empty() {
            return Err(StoreError::InvalidInput("단어를 입력해주세요.".to_string()));
        }

        let mut entries = self.entries.write();
        let Some(entry) = entries.by_key.remove(&key) else {
            return Err(StoreError::NotFound(key));
        };
        entries.order.retain(|k| *k != key);
        let removed = entry.lock().clone();
        Ok(removed)
    }

    pub fn categories(&self) -> BTreeSet<String> {
        let entries = self.entries.read();
        entries
            .by_key
            .values()
            .map(|entry| entry.lock().category.trim().to_string())
            .filter(|category| !category.is_empty())
            .collect()
    }

    /// Judges an answer against the current word and bumps exactly one
    /// counter, all under the word's lock. Returns the verdict and the word
    /// as it stands after the update.
    pub fn record_answer<F>(&self, english: &str, judge: F) -> Result<(bool, Word), StoreError>
    where
        F: FnOnce(&Word) -> bool,
    {
        let key = normalize_key(english);
        let entries = self.entries.read();
        let entry = entries
            .by_key
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        let mut word = entry.lock();
        let is_correct = judge(&word);
        if is_correct {
            word.correct_count = word.correct_count.saturating_add(1);
        } else {
            word.wrong_count = word.wrong_count.saturating_add(1);
        }
        Ok((is_correct, word.clone()))
    }
}
