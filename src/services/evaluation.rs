use serde_json::Value;

use crate::services::quiz::{QuizMode, QuizType};
use crate::store::{normalize_key, StoreError, WordStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answer as submitted by the player, already checked for shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice { selected: i64, correct_index: i64 },
    Text(String),
}

impl Answer {
    /// Multiple-choice answers accept a JSON number or a numeric string and
    /// need the echoed `correct_index`; text answers must be non-blank.
    pub fn parse(mode: QuizMode, raw: &Value, correct_index: Option<i64>) -> Result<Self, CheckError> {
        match mode {
            QuizMode::Multiple => {
                let correct_index = correct_index
                    .ok_or_else(|| CheckError::InvalidInput("정답 인덱스가 없습니다.".to_string()))?;
                let selected = match raw {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| CheckError::InvalidInput("잘못된 답안입니다.".to_string()))?;
                Ok(Self::Choice {
                    selected,
                    correct_index,
                })
            }
            QuizMode::Text => {
                let text = match raw {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => String::new(),
                };
                if text.trim().is_empty() {
                    return Err(CheckError::InvalidInput("답을 입력해주세요.".to_string()));
                }
                Ok(Self::Text(text))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub word: String,
    pub answer: Answer,
    pub quiz_type: QuizType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub correct_count: u32,
    pub wrong_count: u32,
}

pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Judges the answer and records the outcome on the word.
pub fn check(store: &WordStore, request: &CheckRequest) -> Result<CheckOutcome, CheckError> {
    let key = normalize_key(&request.word);
    if key.is_empty() {
        return Err(CheckError::InvalidInput("단어를 입력해주세요.".to_string()));
    }
    let direction = request
        .quiz_type
        .direction()
        .ok_or_else(|| CheckError::InvalidInput("문제 유형이 올바르지 않습니다.".to_string()))?;

    let (is_correct, word) = store.record_answer(&key, |word| match &request.answer {
        Answer::Choice {
            selected,
            correct_index,
        } => selected == correct_index,
        Answer::Text(text) => normalize_answer(text) == normalize_answer(direction.expected_answer(word)),
    })?;

    if is_correct {
        tracing::debug!(english = %word.english, "answer correct");
    } else {
        tracing::debug!(english = %word.english, "answer wrong");
    }

    Ok(CheckOutcome {
        is_correct,
        correct_answer: direction.expected_answer(&word).to_string(),
        correct_count: word.correct_count,
        wrong_count: word.wrong_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> WordStore {
        let store = WordStore::new();
        store.add("apple", "사과", Some("fruit")).unwrap();
        store
    }

    fn text(word: &str, answer: &str, quiz_type: QuizType) -> CheckRequest {
        CheckRequest {
            word: word.to_string(),
            answer: Answer::Text(answer.to_string()),
            quiz_type,
        }
    }

    #[test]
    fn test_text_answer_is_trimmed_and_case_insensitive() {
        let store = store();
        let outcome = check(&store, &text("apple", "  APPLE ", QuizType::KoreanToEnglish)).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.correct_answer, "apple");

        let outcome = check(&store, &text("Apple", " 사과", QuizType::EnglishToKorean)).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.correct_answer, "사과");
        assert_eq!((outcome.correct_count, outcome.wrong_count), (2, 0));
    }

    #[test]
    fn test_wrong_text_answer_counts_as_wrong() {
        let store = store();
        let outcome = check(&store, &text("apple", "배", QuizType::EnglishToKorean)).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "사과");
        assert_eq!((outcome.correct_count, outcome.wrong_count), (0, 1));
    }

    #[test]
    fn test_choice_compares_indices() {
        let store = store();
        let right = CheckRequest {
            word: "apple".to_string(),
            answer: Answer::parse(QuizMode::Multiple, &json!("2"), Some(2)).unwrap(),
            quiz_type: QuizType::EnglishToKorean,
        };
        assert!(check(&store, &right).unwrap().is_correct);

        let wrong = CheckRequest {
            answer: Answer::parse(QuizMode::Multiple, &json!(1), Some(2)).unwrap(),
            ..right
        };
        let outcome = check(&store, &wrong).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!((outcome.correct_count, outcome.wrong_count), (1, 1));
    }

    #[test]
    fn test_parse_rejects_malformed_answers() {
        assert!(matches!(
            Answer::parse(QuizMode::Multiple, &json!(0), None),
            Err(CheckError::InvalidInput(_))
        ));
        assert!(matches!(
            Answer::parse(QuizMode::Multiple, &json!("first"), Some(0)),
            Err(CheckError::InvalidInput(_))
        ));
        assert!(matches!(
            Answer::parse(QuizMode::Text, &json!("   "), None),
            Err(CheckError::InvalidInput(_))
        ));
        assert!(matches!(
            Answer::parse(QuizMode::Text, &Value::Null, None),
            Err(CheckError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_word_is_not_found() {
        let store = store();
        store.remove("apple").unwrap();
        let err = check(&store, &text("apple", "사과", QuizType::EnglishToKorean)).unwrap_err();
        assert!(matches!(err, CheckError::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn test_random_type_is_rejected_and_leaves_counters() {
        let store = store();
        let err = check(&store, &text("apple", "사과", QuizType::Random)).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
        assert_eq!(store.get("apple").unwrap().total(), 0);
    }
}
