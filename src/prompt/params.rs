//! Encounter request parameters and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Target difficulty tier, embedded verbatim into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl Difficulty {
    /// The label used in prompts and display.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Deadly => "Deadly",
        }
    }

    /// Parse a case-insensitive label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "deadly" => Some(Difficulty::Deadly),
            _ => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ParamsError
// ---------------------------------------------------------------------------

/// Out-of-range request parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("party size must be between 1 and 12 (got {0})")]
    PartySize(u32),

    #[error("average level must be between 1 and 20 (got {0})")]
    AverageLevel(u32),

    #[error("enemy count must be between 1 and 20 (got {0})")]
    EnemyCount(u32),
}

// ---------------------------------------------------------------------------
// EncounterParams
// ---------------------------------------------------------------------------

/// Immutable parameters for one generate request, captured at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterParams {
    /// Number of player characters, 1–12.
    pub party_size: u32,
    /// Average character level, 1–20.
    pub average_level: u32,
    /// Target difficulty tier.
    pub difficulty: Difficulty,
    /// Free-text terrain / location description.
    pub terrain: String,
    /// Free-text flavor or scenario hook.
    pub flavor: String,
    /// Exact number of enemies, 1–20.  `None` leaves the count to the model.
    pub enemy_count: Option<u32>,
}

impl EncounterParams {
    /// Check every numeric field against its documented range.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(1..=12).contains(&self.party_size) {
            return Err(ParamsError::PartySize(self.party_size));
        }
        if !(1..=20).contains(&self.average_level) {
            return Err(ParamsError::AverageLevel(self.average_level));
        }
        if let Some(count) = self.enemy_count {
            if !(1..=20).contains(&count) {
                return Err(ParamsError::EnemyCount(count));
            }
        }
        Ok(())
    }
}

impl Default for EncounterParams {
    fn default() -> Self {
        Self {
            party_size: 4,
            average_level: 3,
            difficulty: Difficulty::default(),
            terrain: String::new(),
            flavor: String::new(),
            enemy_count: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
