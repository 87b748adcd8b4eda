use crate::core::context::RunContext;
use crate::domain::model::{IssueEntity, IssuePayload, IssueStats, ScoredEntity};
use std::cmp::Ordering;

pub struct IssueAssembler {
    max_entities: Option<usize>,
}

impl IssueAssembler {
    pub fn new(max_entities: Option<usize>) -> Self {
        Self { max_entities }
    }

    /// Order, truncate, and attach run metadata. `stats.total_entities`
    /// counts every resolved entity, including those cut by the cap.
    pub fn assemble(&self, mut scored: Vec<ScoredEntity>, context: RunContext) -> IssuePayload {
        let total_entities = scored.len();
        scored.sort_by(issue_order);

        if let Some(max) = self.max_entities {
            scored.truncate(max);
        }

        let (generated_at, sources, warnings, total_mentions) = context.into_parts();
        IssuePayload {
            generated_at,
            sources,
            entities: scored.iter().map(IssueEntity::from).collect(),
            stats: IssueStats {
                total_mentions,
                total_entities,
                warnings,
            },
        }
    }
}

/// Heat descending, then cross-source count descending, then display name
/// ascending. The key breaks any remaining tie; the sort is stable beyond that.
pub fn issue_order(a: &ScoredEntity, b: &ScoredEntity) -> Ordering {
    b.heat_score
        .cmp(&a.heat_score)
        .then_with(|| {
            b.entity
                .cross_source_count()
                .cmp(&a.entity.cross_source_count())
        })
        .then_with(|| a.entity.display_name().cmp(b.entity.display_name()))
        .then_with(|| a.entity.key().cmp(b.entity.key()))
}
