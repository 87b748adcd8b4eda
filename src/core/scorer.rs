//! Heat score: a 0-100 integer from five signals, each in [0, 1].
//!
//! | signal       | definition                                                     |
//! |--------------|----------------------------------------------------------------|
//! | presence     | sum of the trust weights of the sources mentioning it, capped  |
//! | cross_source | share of configured sources that mention it                    |
//! | position     | mean inverse-rank `1 / (1 + p / decay)` over every mention     |
//! |              | (mentions from unranked sources count a fixed neutral value)   |
//! | text_cue     | strongest intensity keyword bucket in any blurb, over 15       |
//! | freshness    | 1.0 when absent from the previous issue, else the configured   |
//! |              | carried-over value                                             |
//!
//! `score = round(100 * sum(w_i * s_i) / sum(w_i))`
//!
//! An entity whose name normalized to nothing has no identity to rank, so all
//! of its signals are zero.

use crate::config::settings::ScoringWeights;
use crate::domain::model::{NormalizedKey, ResolvedEntity};
use std::collections::HashSet;

const MAX_CUE: u8 = 15;

pub const INTENSITY_KEYWORDS: &[(u8, &[&str])] = &[
    (5, &["buzz", "buzzy", "hype", "hot", "hottest", "must-try", "viral"]),
    (8, &["line", "lines", "packed", "crowded", "always full", "slam", "slammed"]),
    (12, &["hard to book", "tough reservation", "impossible", "sold out", "booked up"]),
    (15, &["the hardest", "hardest", "nearly impossible", "months out", "hot right now"]),
];

pub const SCARCITY_KEYWORDS: &[(u8, &[&str])] = &[
    (5, &["reservations recommended", "book ahead", "limited seating"]),
    (8, &["reservation release", "drops", "at noon", "at 10am", "set your alarm"]),
    (12, &["walk-in only", "walk ins only", "no reservations", "bar seats", "counter seats"]),
    (15, &["ticketed", "prepaid", "waiting list", "sold out", "months out"]),
];

pub const EASY_KEYWORDS: &[&str] = &[
    "walk-in friendly",
    "plenty of seats",
    "easy to book",
    "no problem getting in",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatSignals {
    pub cross_source_count: usize,
    pub presence: f64,
    pub cross_source: f64,
    pub position: f64,
    pub text_cue: f64,
    pub freshness: f64,
    pub scarcity_cue: f64,
    pub easy_cue: bool,
    pub carried_over: bool,
}

pub struct HeatScorer {
    weights: ScoringWeights,
    configured_sources: usize,
    previous_keys: HashSet<NormalizedKey>,
}

impl HeatScorer {
    pub fn new(weights: ScoringWeights, configured_sources: usize) -> Self {
        Self {
            weights,
            configured_sources,
            previous_keys: HashSet::new(),
        }
    }

    /// Keys of the restaurants published in the previous issue.
    pub fn with_previous_keys(mut self, keys: HashSet<NormalizedKey>) -> Self {
        self.previous_keys = keys;
        self
    }

    pub fn score(&self, entity: &ResolvedEntity) -> u8 {
        self.score_signals(&self.signals(entity))
    }

    pub fn signals(&self, entity: &ResolvedEntity) -> HeatSignals {
        if entity.key().is_empty() {
            return HeatSignals::default();
        }

        let sources = entity.sources();
        let cross_source_count = sources.len();

        let presence = sources
            .iter()
            .map(|s| s.trust_weight.max(0.0))
            .sum::<f64>()
            .min(1.0);

        let cross_source = if self.configured_sources == 0 {
            0.0
        } else {
            (cross_source_count as f64 / self.configured_sources as f64).min(1.0)
        };

        let mentions = entity.mentions();
        let position = if mentions.is_empty() {
            0.0
        } else {
            mentions
                .iter()
                .map(|m| {
                    if m.source.ranked {
                        self.inverse_rank(m.position)
                    } else {
                        self.weights.unranked_position_signal
                    }
                })
                .sum::<f64>()
                / mentions.len() as f64
        };

        let carried_over = self.previous_keys.contains(entity.key());
        let freshness = if carried_over {
            self.weights.carried_over_signal
        } else {
            1.0
        };

        let blurbs: Vec<String> = mentions
            .iter()
            .map(|m| prepare_text(&m.blurb))
            .collect();

        HeatSignals {
            cross_source_count,
            presence,
            cross_source,
            position,
            text_cue: cue(&blurbs, INTENSITY_KEYWORDS),
            freshness,
            scarcity_cue: cue(&blurbs, SCARCITY_KEYWORDS),
            easy_cue: blurbs
                .iter()
                .any(|b| EASY_KEYWORDS.iter().any(|kw| contains_phrase(b, kw))),
            carried_over,
        }
    }

    pub fn score_signals(&self, signals: &HeatSignals) -> u8 {
        let w = &self.weights;
        let total = w.total();
        if !(total > 0.0) {
            return 0;
        }
        let weighted = w.presence * signals.presence
            + w.cross_source * signals.cross_source
            + w.position * signals.position
            + w.text_cue * signals.text_cue
            + w.freshness * signals.freshness;
        let scaled = (100.0 * weighted / total).round();
        if !scaled.is_finite() {
            return 0;
        }
        scaled.clamp(0.0, 100.0) as u8
    }

    fn inverse_rank(&self, position: usize) -> f64 {
        1.0 / (1.0 + position as f64 / self.weights.position_decay)
    }
}

/// Strongest bucket hit across all blurbs, scaled to [0, 1].
fn cue(blurbs: &[String], buckets: &[(u8, &[&str])]) -> f64 {
    let best = blurbs
        .iter()
        .map(|b| keyword_score(b, buckets))
        .max()
        .unwrap_or(0);
    f64::from(best.min(MAX_CUE)) / f64::from(MAX_CUE)
}

fn keyword_score(prepared: &str, buckets: &[(u8, &[&str])]) -> u8 {
    buckets
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| contains_phrase(prepared, kw)))
        .map(|(score, _)| *score)
        .max()
        .unwrap_or(0)
}

/// Lowercase, punctuation to spaces (hyphens kept), single-spaced and padded
/// so that phrase lookups only match whole words.
fn prepare_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_phrase(prepared: &str, keyword: &str) -> bool {
    prepared.contains(&prepare_text(keyword))
}
