use crate::config::settings::Settings;
use crate::core::assembler::IssueAssembler;
use crate::core::context::RunContext;
use crate::core::difficulty::DifficultyEstimator;
use crate::core::normalize::normalize;
use crate::core::parser::parse;
use crate::core::resolver::{EntityResolver, MergeDecision};
use crate::core::scorer::HeatScorer;
use crate::domain::model::{IssuePayload, NormalizedKey, RawMention, ScoredEntity, SourceInput};
use std::collections::HashSet;

/// The synchronous core: parse → resolve → score → assemble.
///
/// Sources are processed strictly in the order given. A source whose markup
/// cannot be parsed is skipped with a warning; the run never aborts, and if
/// every source fails the result is a valid issue with no entities.
pub struct HeatIndexPipeline {
    settings: Settings,
}

impl HeatIndexPipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn run(&self, inputs: &[SourceInput], mut context: RunContext) -> IssuePayload {
        let mentions = self.extract_mentions(inputs, &mut context);
        context.record_mentions(mentions.len());

        let resolver = EntityResolver::new(self.settings.resolution.similarity_threshold);
        let resolution = resolver.resolve_with_audit(mentions);
        let fuzzy_merges = resolution
            .decisions
            .iter()
            .filter(|d| matches!(d, MergeDecision::Fuzzy { .. }))
            .count();
        let entities = resolution.entities;
        tracing::info!(
            "🔗 Resolved {} mentions into {} restaurants ({} fuzzy merges)",
            context.total_mentions(),
            entities.len(),
            fuzzy_merges
        );

        let previous_keys: HashSet<NormalizedKey> = context
            .previous_names()
            .iter()
            .map(|name| normalize(name))
            .filter(|key| !key.is_empty())
            .collect();
        let configured_sources = context.sources().len().max(inputs.len());
        let scorer = HeatScorer::new(self.settings.scoring.clone(), configured_sources)
            .with_previous_keys(previous_keys);
        let estimator = DifficultyEstimator::new(self.settings.difficulty.clone());

        let scored: Vec<ScoredEntity> = entities
            .into_iter()
            .map(|entity| {
                let signals = scorer.signals(&entity);
                let heat_score = scorer.score_signals(&signals);
                let estimate = estimator.estimate(&signals);
                ScoredEntity {
                    entity,
                    heat_score,
                    difficulty_tier: estimate.tier,
                    tip: estimate.tip.to_string(),
                    carried_over: signals.carried_over,
                }
            })
            .collect();

        IssueAssembler::new(self.settings.max_entities).assemble(scored, context)
    }

    fn extract_mentions(&self, inputs: &[SourceInput], context: &mut RunContext) -> Vec<RawMention> {
        let mut mentions = Vec::new();

        for input in inputs {
            match parse(&input.raw_markup, &input.source) {
                Ok(outcome) => {
                    tracing::info!(
                        "📄 {}: extracted {} mentions",
                        input.source.name,
                        outcome.mentions.len()
                    );
                    for warning in outcome.warnings {
                        context.warn(warning.to_string());
                    }
                    mentions.extend(outcome.mentions);
                }
                Err(e) => {
                    context.warn(format!("{}: skipped ({})", input.source.name, e));
                }
            }
        }

        mentions
    }
}
