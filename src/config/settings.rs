//! Tuning constants for resolution, scoring and difficulty.
//!
//! Defaults are part of the published methodology: changing one changes how
//! scores compare month to month, so bump them deliberately.

use crate::utils::error::{HeatError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSettings {
    /// 模糊比對的合併門檻 (0..=1)
    pub similarity_threshold: f64,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Weights of the heat score's weighted sum. They are normalized by their
/// total, so only their ratios matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub presence: f64,
    pub cross_source: f64,
    pub position: f64,
    pub text_cue: f64,
    /// Weight of the novelty signal against the previous issue.
    pub freshness: f64,
    /// Position at which the inverse-rank signal has halved.
    pub position_decay: f64,
    /// Position signal for mentions from sources whose order carries no rank.
    pub unranked_position_signal: f64,
    /// Novelty signal for restaurants already in the previous issue. New ones get 1.0.
    pub carried_over_signal: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            presence: 0.25,
            cross_source: 0.35,
            position: 0.15,
            text_cue: 0.15,
            freshness: 0.10,
            position_decay: 5.0,
            unranked_position_signal: 0.5,
            carried_over_signal: 0.5,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.presence + self.cross_source + self.position + self.text_cue + self.freshness
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyThresholds {
    pub very_hard_min_sources: usize,
    pub very_hard_min_position: f64,
    pub hard_min_sources: usize,
    pub hard_min_position: f64,
    pub moderate_min_position: f64,
    /// Scarcity cue at or above which the tier moves up one step.
    pub scarcity_bump: f64,
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            very_hard_min_sources: 2,
            very_hard_min_position: 0.8,
            hard_min_sources: 2,
            hard_min_position: 0.75,
            moderate_min_position: 0.4,
            scarcity_bump: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub resolution: ResolutionSettings,
    pub scoring: ScoringWeights,
    pub difficulty: DifficultyThresholds,
    pub max_entities: Option<usize>,
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_range(
            "resolution.similarity_threshold",
            self.resolution.similarity_threshold,
            0.0,
            1.0,
        )?;

        let scoring = &self.scoring;
        for (field, value) in [
            ("scoring.presence", scoring.presence),
            ("scoring.cross_source", scoring.cross_source),
            ("scoring.position", scoring.position),
            ("scoring.text_cue", scoring.text_cue),
            ("scoring.freshness", scoring.freshness),
        ] {
            validate_range(field, value, 0.0, f64::MAX)?;
        }
        if scoring.total() <= 0.0 {
            return Err(HeatError::ConfigValidationError {
                field: "scoring".to_string(),
                message: "At least one scoring weight must be positive".to_string(),
            });
        }
        if !(scoring.position_decay > 0.0) {
            return Err(HeatError::InvalidConfigValueError {
                field: "scoring.position_decay".to_string(),
                value: scoring.position_decay.to_string(),
                reason: "Value must be greater than 0".to_string(),
            });
        }
        validate_range(
            "scoring.unranked_position_signal",
            scoring.unranked_position_signal,
            0.0,
            1.0,
        )?;
        validate_range(
            "scoring.carried_over_signal",
            scoring.carried_over_signal,
            0.0,
            1.0,
        )?;

        let difficulty = &self.difficulty;
        for (field, value) in [
            ("difficulty.very_hard_min_position", difficulty.very_hard_min_position),
            ("difficulty.hard_min_position", difficulty.hard_min_position),
            ("difficulty.moderate_min_position", difficulty.moderate_min_position),
            ("difficulty.scarcity_bump", difficulty.scarcity_bump),
        ] {
            validate_range(field, value, 0.0, 1.0)?;
        }

        if let Some(max) = self.max_entities {
            validate_positive_number("issue.max_entities", max, 1)?;
        }

        Ok(())
    }
}
