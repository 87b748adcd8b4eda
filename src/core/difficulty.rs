use crate::config::settings::DifficultyThresholds;
use crate::core::scorer::HeatSignals;
use crate::domain::model::DifficultyTier;

pub const VERY_HARD_TIP: &str =
    "Book exactly 30 days out at midnight, turn on notifications, and target bar or counter seats.";
pub const HARD_TIP: &str =
    "Check the usual drop times (often mornings), set alerts, and stay flexible on time and party size.";
pub const MODERATE_TIP: &str =
    "Book one to two weeks ahead and aim for off-peak (early or late) seatings.";
pub const EASY_TIP: &str =
    "Walk-in friendly: go early (before 6pm) or book same-day.";

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyEstimate {
    pub tier: DifficultyTier,
    pub tip: &'static str,
}

pub struct DifficultyEstimator {
    thresholds: DifficultyThresholds,
}

impl DifficultyEstimator {
    pub fn new(thresholds: DifficultyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn estimate(&self, signals: &HeatSignals) -> DifficultyEstimate {
        let t = &self.thresholds;

        let base = if signals.cross_source_count >= t.very_hard_min_sources
            && signals.position >= t.very_hard_min_position
        {
            DifficultyTier::VeryHard
        } else if signals.cross_source_count >= t.hard_min_sources
            || signals.position >= t.hard_min_position
        {
            DifficultyTier::Hard
        } else if signals.position >= t.moderate_min_position {
            DifficultyTier::Moderate
        } else {
            DifficultyTier::Easy
        };

        // 文字線索只微調一級
        let tier = if signals.scarcity_cue >= t.scarcity_bump {
            base.harder()
        } else if signals.easy_cue {
            base.easier()
        } else {
            base
        };

        DifficultyEstimate {
            tier,
            tip: tip_for(tier),
        }
    }
}

pub fn tip_for(tier: DifficultyTier) -> &'static str {
    match tier {
        DifficultyTier::VeryHard => VERY_HARD_TIP,
        DifficultyTier::Hard => HARD_TIP,
        DifficultyTier::Moderate => MODERATE_TIP,
        DifficultyTier::Easy => EASY_TIP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(cross_source_count: usize, position: f64) -> HeatSignals {
        HeatSignals {
            cross_source_count,
            presence: 1.0,
            cross_source: 0.5,
            position,
            text_cue: 0.0,
            freshness: 1.0,
            scarcity_cue: 0.0,
            easy_cue: false,
            carried_over: false,
        }
    }

    fn estimator() -> DifficultyEstimator {
        DifficultyEstimator::new(DifficultyThresholds::default())
    }

    #[test]
    fn test_base_tiers() {
        assert_eq!(estimator().estimate(&signals(2, 1.0)).tier, DifficultyTier::VeryHard);
        assert_eq!(estimator().estimate(&signals(2, 0.5)).tier, DifficultyTier::Hard);
        assert_eq!(estimator().estimate(&signals(1, 0.9)).tier, DifficultyTier::Hard);
        assert_eq!(estimator().estimate(&signals(1, 0.5)).tier, DifficultyTier::Moderate);
        assert_eq!(estimator().estimate(&signals(1, 0.2)).tier, DifficultyTier::Easy);
    }

    #[test]
    fn test_tip_is_keyed_by_tier() {
        let estimate = estimator().estimate(&signals(2, 1.0));
        assert!(estimate.tip.starts_with("Book exactly 30 days out at midnight"));
        assert_eq!(estimator().estimate(&signals(1, 0.2)).tip, EASY_TIP);
    }

    #[test]
    fn test_text_cues_shift_one_tier() {
        let mut scarce = signals(1, 0.5);
        scarce.scarcity_cue = 1.0;
        assert_eq!(estimator().estimate(&scarce).tier, DifficultyTier::Hard);

        let mut easy = signals(2, 0.5);
        easy.easy_cue = true;
        assert_eq!(estimator().estimate(&easy).tier, DifficultyTier::Moderate);

        let mut capped = signals(2, 1.0);
        capped.scarcity_cue = 1.0;
        assert_eq!(estimator().estimate(&capped).tier, DifficultyTier::VeryHard);
    }

    #[test]
    fn test_is_deterministic() {
        let s = signals(1, 0.76);
        assert_eq!(estimator().estimate(&s), estimator().estimate(&s));
    }
}
