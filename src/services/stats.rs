use serde::Serialize;

use crate::store::{Word, WordStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub word: String,
    pub korean: String,
    pub category: String,
    pub correct: u32,
    pub wrong: u32,
    pub total: u32,
    pub accuracy: u32,
}

impl StatEntry {
    fn from_word(word: Word) -> Self {
        let total = word.total();
        Self {
            accuracy: accuracy_percent(word.correct_count, total),
            correct: word.correct_count,
            wrong: word.wrong_count,
            total,
            word: word.english,
            korean: word.korean,
            category: word.category,
        }
    }
}

/// `100 * correct / total`, rounded half-up; 0 when there are no attempts.
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    ((200 * correct + total) / (2 * total)) as u32
}

/// One entry per quizzed word, most accurate first. Ties keep store order.
pub fn summarize(store: &WordStore) -> Vec<StatEntry> {
    let mut entries: Vec<StatEntry> = store
        .snapshot()
        .into_iter()
        .filter(|word| word.total() > 0)
        .map(StatEntry::from_word)
        .collect();
    entries.sort_by(|a, b| b.accuracy.cmp(&a.accuracy));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy_percent(3, 4), 75);
        assert_eq!(accuracy_percent(1, 8), 13);
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(0, 5), 0);
        assert_eq!(accuracy_percent(5, 5), 100);
        assert_eq!(accuracy_percent(0, 0), 0);
    }

    #[test]
    fn test_summarize_skips_unquizzed_and_sorts() {
        let store = WordStore::new();
        store.add("apple", "사과", Some("fruit")).unwrap();
        store.add("banana", "바나나", Some("fruit")).unwrap();
        store.add("cherry", "체리", Some("fruit")).unwrap();

        for ok in [true, true, true, false] {
            store.record_answer("apple", |_| ok).unwrap();
        }
        store.record_answer("cherry", |_| true).unwrap();

        let stats = summarize(&store);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].word, "cherry");
        assert_eq!(stats[0].accuracy, 100);
        assert_eq!(
            stats[1],
            StatEntry {
                word: "apple".to_string(),
                korean: "사과".to_string(),
                category: "fruit".to_string(),
                correct: 3,
                wrong: 1,
                total: 4,
                accuracy: 75,
            }
        );
    }

    #[test]
    fn test_summarize_reflects_current_counters() {
        let store = WordStore::new();
        store.add("apple", "사과", None).unwrap();
        store.record_answer("apple", |_| false).unwrap();
        assert_eq!(summarize(&store)[0].accuracy, 0);

        store.record_answer("apple", |_| true).unwrap();
        assert_eq!(summarize(&store)[0].accuracy, 50);

        store.remove("apple").unwrap();
        assert!(summarize(&store).is_empty());
    }
}
