use serde::{Deserialize, Serialize};

use crate::services::evaluation::normalize_answer;
use crate::services::random::{sample_into_front, weighted_index, RandomSource};
use crate::store::{Word, WordStore};

pub const CHOICE_COUNT: usize = 4;
const DISTRACTOR_COUNT: usize = CHOICE_COUNT - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizDirection {
    EnglishToKorean,
    KoreanToEnglish,
}

impl QuizDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnglishToKorean => "english_to_korean",
            Self::KoreanToEnglish => "korean_to_english",
        }
    }

    /// The field the player has to supply.
    pub fn expected_answer<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Self::EnglishToKorean => &word.korean,
            Self::KoreanToEnglish => &word.english,
        }
    }

    pub fn question(&self, word: &Word) -> String {
        match self {
            Self::EnglishToKorean => format!("'{}'의 한국어 뜻은?", word.english),
            Self::KoreanToEnglish => format!("'{}'의 영어 단어는?", word.korean),
        }
    }
}

/// Requested direction; `Random` is resolved per question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    #[default]
    EnglishToKorean,
    KoreanToEnglish,
    Random,
}

impl QuizType {
    pub fn direction(self) -> Option<QuizDirection> {
        match self {
            Self::EnglishToKorean => Some(QuizDirection::EnglishToKorean),
            Self::KoreanToEnglish => Some(QuizDirection::KoreanToEnglish),
            Self::Random => None,
        }
    }

    fn resolve<R: RandomSource + ?Sized>(self, rng: &mut R) -> QuizDirection {
        self.direction().unwrap_or_else(|| {
            if rng.coin() {
                QuizDirection::EnglishToKorean
            } else {
                QuizDirection::KoreanToEnglish
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    Multiple,
    #[default]
    Text,
}

/// Requested answer mode; `Random` is resolved per question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizModeRequest {
    Multiple,
    #[default]
    Text,
    Random,
}

impl QuizModeRequest {
    fn resolve<R: RandomSource + ?Sized>(self, rng: &mut R) -> QuizMode {
        match self {
            Self::Multiple => QuizMode::Multiple,
            Self::Text => QuizMode::Text,
            Self::Random => {
                if rng.coin() {
                    QuizMode::Multiple
                } else {
                    QuizMode::Text
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuizRequest {
    pub quiz_type: QuizType,
    pub mode: QuizModeRequest,
    pub category: Option<String>,
    pub focus_mode: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    pub word: Word,
    pub direction: QuizDirection,
    pub mode: QuizMode,
    pub question: String,
    pub correct_answer: String,
    /// Empty in text mode.
    pub choices: Vec<String>,
    pub correct_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("{}", empty_pool_message(.0))]
    EmptyPool(Option<String>),
    #[error("객관식 문제를 만들려면 서로 다른 단어가 최소 {required}개 필요합니다. (현재 {available}개)")]
    InsufficientPool { required: usize, available: usize },
}

fn empty_pool_message(category: &Option<String>) -> String {
    match category {
        Some(category) => format!("'{category}' 카테고리에 단어가 없습니다."),
        None => "퀴즈를 하려면 먼저 단어를 추가해주세요.".to_string(),
    }
}

/// Weight of a word answered correctly every time.
pub const FOCUS_FLOOR: f64 = 0.1;

/// Selection weight in focus mode: `FOCUS_FLOOR + (1 - accuracy) * (1 - FOCUS_FLOOR)`.
///
/// Strictly decreasing in raw accuracy, from 1 at 0% down to `FOCUS_FLOOR`
/// at 100%. Unseen words weigh 1.
pub fn focus_weight(word: &Word) -> f64 {
    let total = word.total();
    if total == 0 {
        return 1.0;
    }
    let accuracy = f64::from(word.correct_count) / f64::from(total);
    FOCUS_FLOOR + (1.0 - accuracy) * (1.0 - FOCUS_FLOOR)
}

/// Builds one question.
///
/// Draw order: direction coin (random type only), mode coin (random mode
/// only), target word, distractors, then the slot of the correct choice.
pub fn generate<R: RandomSource + ?Sized>(
    store: &WordStore,
    request: &QuizRequest,
    rng: &mut R,
) -> Result<QuizSession, QuizError> {
    let category = request.category.as_deref().filter(|c| !c.is_empty());
    let pool = store.list(category);
    if pool.is_empty() {
        return Err(QuizError::EmptyPool(category.map(str::to_string)));
    }

    let direction = request.quiz_type.resolve(rng);
    let mode = request.mode.resolve(rng);

    if mode == QuizMode::Multiple && pool.len() < CHOICE_COUNT {
        return Err(QuizError::InsufficientPool {
            required: CHOICE_COUNT,
            available: pool.len(),
        });
    }

    let target = select_target(&pool, request.focus_mode, rng);
    let word = pool[target].clone();
    let correct_answer = direction.expected_answer(&word).to_string();
    let question = direction.question(&word);

    let (choices, correct_index) = match mode {
        QuizMode::Text => (Vec::new(), None),
        QuizMode::Multiple => {
            let (choices, index) = build_choices(&pool, target, direction, rng)?;
            (choices, Some(index))
        }
    };

    Ok(QuizSession {
        word,
        direction,
        mode,
        question,
        correct_answer,
        choices,
        correct_index,
    })
}

fn select_target<R: RandomSource + ?Sized>(pool: &[Word], focus_mode: bool, rng: &mut R) -> usize {
    if focus_mode {
        let weights: Vec<f64> = pool.iter().map(focus_weight).collect();
        if let Some(index) = weighted_index(rng, &weights) {
            return index;
        }
    }
    rng.below(pool.len())
}

fn build_choices<R: RandomSource + ?Sized>(
    pool: &[Word],
    target: usize,
    direction: QuizDirection,
    rng: &mut R,
) -> Result<(Vec<String>, usize), QuizError> {
    let correct = direction.expected_answer(&pool[target]);
    let mut seen = vec![normalize_answer(correct)];
    let mut distractors: Vec<String> = Vec::new();

    for (index, word) in pool.iter().enumerate() {
        if index == target {
            continue;
        }
        let value = direction.expected_answer(word);
        let normalized = normalize_answer(value);
        if seen.contains(&normalized) {
            continue;
        }
        seen.push(normalized);
        distractors.push(value.to_string());
    }

    if distractors.len() < DISTRACTOR_COUNT {
        return Err(QuizError::InsufficientPool {
            required: CHOICE_COUNT,
            available: distractors.len() + 1,
        });
    }

    sample_into_front(rng, &mut distractors, DISTRACTOR_COUNT);
    // distractors come out in random order; one random slot completes the shuffle
    let correct_index = rng.below(CHOICE_COUNT);
    distractors.insert(correct_index, correct.to_string());
    Ok((distractors, correct_index))
}
