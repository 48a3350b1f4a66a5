use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type CardId = String;

/// Minimum review interval, applied after any incorrect judgment.
pub const BASE_INTERVAL_HOURS: u64 = 4;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "med" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            other => Err(crate::CoreError::Invalid(format!("unknown difficulty: {other}"))),
        }
    }
}

/// The user's pass/fail self-assessment for the presented card.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    Correct,
    Incorrect,
}

impl Judgment {
    pub fn is_correct(&self) -> bool {
        matches!(self, Judgment::Correct)
    }
}

impl From<bool> for Judgment {
    fn from(was_correct: bool) -> Self {
        if was_correct {
            Judgment::Correct
        } else {
            Judgment::Incorrect
        }
    }
}

/// Descriptive metadata. Never consulted by the scheduler.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CardTags {
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub tags: CardTags,

    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub correct_streak: u32,
}

impl Card {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), prompt, answer)
    }

    pub fn with_id(
        id: impl Into<CardId>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            answer: answer.into(),
            tags: CardTags::default(),
            last_reviewed_at: None,
            next_review_at: None,
            correct_streak: 0,
        }
    }

    pub fn tagged(mut self, tags: CardTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Due when never scheduled, or when the scheduled instant has arrived.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_at {
            None => true,
            Some(at) => at <= now,
        }
    }

    pub fn review_state(&self) -> ReviewPatch {
        ReviewPatch {
            last_reviewed_at: self.last_reviewed_at,
            next_review_at: self.next_review_at,
            correct_streak: self.correct_streak,
        }
    }

    pub(crate) fn apply(&mut self, patch: &ReviewPatch) {
        self.last_reviewed_at = patch.last_reviewed_at;
        self.next_review_at = patch.next_review_at;
        self.correct_streak = patch.correct_streak;
    }
}

/// The three review fields, replaced together on a card.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReviewPatch {
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: Option<DateTime<Utc>>,
    pub correct_streak: u32,
}

impl ReviewPatch {
    /// Seed state: never reviewed, immediately due.
    pub fn unreviewed() -> Self {
        Self::default()
    }
}
