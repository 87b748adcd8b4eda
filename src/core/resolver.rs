//! Entity resolution: one deterministic left-to-right pass that partitions
//! mentions into restaurants.
//!
//! For each mention, in input order:
//! 1. an entity already indexed under the mention's exact key absorbs it;
//! 2. otherwise the most similar existing entity absorbs it if the similarity
//!    reaches the threshold (earliest entity wins ties);
//! 3. otherwise the mention seeds a new entity.
//!
//! Mentions whose key is empty always seed their own entity so that nothing
//! is silently dropped.

use crate::core::normalize::{display_name, normalize};
use crate::core::similarity::similarity;
use crate::domain::model::{NormalizedKey, RawMention, ResolvedEntity};
use std::collections::HashMap;

/// Why a mention landed in the entity it did.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    ExactKey { entity: usize },
    Fuzzy { entity: usize, score: f64 },
    NewEntity { entity: usize },
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub entities: Vec<ResolvedEntity>,
    /// One decision per input mention, in input order.
    pub decisions: Vec<MergeDecision>,
}

pub struct EntityResolver {
    threshold: f64,
}

impl EntityResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn resolve(&self, mentions: Vec<RawMention>) -> Vec<ResolvedEntity> {
        self.resolve_with_audit(mentions).entities
    }

    pub fn resolve_with_audit(&self, mentions: Vec<RawMention>) -> Resolution {
        let mut entities: Vec<ResolvedEntity> = Vec::new();
        let mut index: HashMap<NormalizedKey, usize> = HashMap::new();
        let mut decisions = Vec::with_capacity(mentions.len());

        for mention in mentions {
            let key = normalize(&mention.name);

            let decision = if key.is_empty() {
                MergeDecision::NewEntity {
                    entity: entities.len(),
                }
            } else if let Some(&entity) = index.get(&key) {
                MergeDecision::ExactKey { entity }
            } else {
                match self.best_fuzzy_match(&key, &entities) {
                    Some((entity, score)) => MergeDecision::Fuzzy { entity, score },
                    None => MergeDecision::NewEntity {
                        entity: entities.len(),
                    },
                }
            };

            match &decision {
                MergeDecision::ExactKey { entity } => {
                    tracing::debug!("'{}' joins '{}' (exact key)", mention.name, entities[*entity].display_name());
                    entities[*entity].merge(mention);
                }
                MergeDecision::Fuzzy { entity, score } => {
                    tracing::debug!(
                        "'{}' joins '{}' (similarity {:.3})",
                        mention.name,
                        entities[*entity].display_name(),
                        score
                    );
                    // 別名也登記進索引，之後同名的提及可直接命中
                    index.entry(key).or_insert(*entity);
                    entities[*entity].merge(mention);
                }
                MergeDecision::NewEntity { entity } => {
                    tracing::debug!("'{}' starts a new entity", mention.name);
                    if !key.is_empty() {
                        index.insert(key.clone(), *entity);
                    }
                    let name = display_name(&mention.name);
                    entities.push(ResolvedEntity::new(key, name, mention));
                }
            }

            decisions.push(decision);
        }

        Resolution {
            entities,
            decisions,
        }
    }

    fn best_fuzzy_match(&self, key: &NormalizedKey, entities: &[ResolvedEntity]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, entity) in entities.iter().enumerate() {
            if entity.key().is_empty() {
                continue;
            }
            let score = similarity(key.as_str(), entity.key().as_str());
            if score >= self.threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        best
    }
}
