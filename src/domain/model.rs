use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 每個來源對應的擷取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRule {
    ResyHitList,
    EaterHeatmap,
    OrderedList,
}

/// 一個被爬取的榜單來源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub trust_weight: f64,
    /// 名單順序是否代表排名
    #[serde(default = "default_ranked")]
    pub ranked: bool,
    pub rule: ExtractionRule,
}

fn default_ranked() -> bool {
    true
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, trust_weight: f64, rule: ExtractionRule) -> Self {
        Self {
            name: name.into(),
            url: None,
            trust_weight,
            ranked: true,
            rule,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn unranked(mut self) -> Self {
        self.ranked = false;
        self
    }
}

/// One appearance of a restaurant in one source's list.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMention {
    pub name: String,
    pub blurb: String,
    pub position: usize,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub source: Arc<SourceDescriptor>,
}

impl RawMention {
    pub fn new(
        name: impl Into<String>,
        blurb: impl Into<String>,
        position: usize,
        source: Arc<SourceDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            blurb: blurb.into(),
            position,
            link: None,
            image_url: None,
            source,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Canonical comparison key. Only ever used for equality and lookup, never shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deduplicated restaurant and every mention that was merged into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    key: NormalizedKey,
    display_name: String,
    mentions: Vec<RawMention>,
}

impl ResolvedEntity {
    pub(crate) fn new(key: NormalizedKey, display_name: String, seed: RawMention) -> Self {
        Self {
            key,
            display_name,
            mentions: vec![seed],
        }
    }

    pub(crate) fn merge(&mut self, mention: RawMention) {
        self.mentions.push(mention);
    }

    pub fn key(&self) -> &NormalizedKey {
        &self.key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Mentions in discovery order.
    pub fn mentions(&self) -> &[RawMention] {
        &self.mentions
    }

    pub fn into_mentions(self) -> Vec<RawMention> {
        self.mentions
    }

    /// Distinct sources, in the order they were first seen.
    pub fn sources(&self) -> Vec<&SourceDescriptor> {
        let mut sources: Vec<&SourceDescriptor> = Vec::new();
        for mention in &self.mentions {
            if !sources.iter().any(|s| s.name == mention.source.name) {
                sources.push(&mention.source);
            }
        }
        sources
    }

    pub fn cross_source_count(&self) -> usize {
        self.sources().len()
    }

    /// Longest non-empty blurb; the earliest one wins a tie.
    pub fn best_blurb(&self) -> &str {
        self.mentions
            .iter()
            .map(|m| m.blurb.trim())
            .filter(|b| !b.is_empty())
            .fold("", |best, b| if b.len() > best.len() { b } else { best })
    }

    /// Reservation platforms first, otherwise the first link any source gave.
    pub fn link(&self) -> Option<&str> {
        let links = || self.mentions.iter().filter_map(|m| m.link.as_deref());
        links()
            .find(|l| l.contains("resy.com") || l.contains("opentable.com"))
            .or_else(|| links().next())
    }

    /// First thumbnail any mention carried.
    pub fn image_url(&self) -> Option<&str> {
        self.mentions.iter().find_map(|m| m.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Moderate,
    Hard,
    VeryHard,
}

impl DifficultyTier {
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Moderate => "Moderate",
            DifficultyTier::Hard => "Hard",
            DifficultyTier::VeryHard => "Very Hard",
        }
    }

    pub fn harder(self) -> Self {
        match self {
            DifficultyTier::Easy => DifficultyTier::Moderate,
            DifficultyTier::Moderate => DifficultyTier::Hard,
            DifficultyTier::Hard | DifficultyTier::VeryHard => DifficultyTier::VeryHard,
        }
    }

    pub fn easier(self) -> Self {
        match self {
            DifficultyTier::Easy | DifficultyTier::Moderate => DifficultyTier::Easy,
            DifficultyTier::Hard => DifficultyTier::Moderate,
            DifficultyTier::VeryHard => DifficultyTier::Hard,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntity {
    pub entity: ResolvedEntity,
    pub heat_score: u8,
    pub difficulty_tier: DifficultyTier,
    pub tip: String,
    /// Also appeared in the previous issue.
    pub carried_over: bool,
}

/// One row of the published issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEntity {
    pub display_name: String,
    pub heat_score: u8,
    pub difficulty_tier: DifficultyTier,
    pub tip: String,
    pub blurb: String,
    pub cross_source_count: usize,
    pub sources: Vec<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub carried_over: bool,
}

impl From<&ScoredEntity> for IssueEntity {
    fn from(scored: &ScoredEntity) -> Self {
        let entity = &scored.entity;
        Self {
            display_name: entity.display_name().to_string(),
            heat_score: scored.heat_score,
            difficulty_tier: scored.difficulty_tier,
            tip: scored.tip.clone(),
            blurb: entity.best_blurb().to_string(),
            cross_source_count: entity.cross_source_count(),
            sources: entity.sources().iter().map(|s| s.name.clone()).collect(),
            link: entity.link().map(str::to_string),
            image_url: entity.image_url().map(str::to_string),
            carried_over: scored.carried_over,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueStats {
    pub total_mentions: usize,
    pub total_entities: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuePayload {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceDescriptor>,
    pub entities: Vec<IssueEntity>,
    pub stats: IssueStats,
}

impl IssuePayload {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Raw markup for one source, as handed over by the fetch stage.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub source: SourceDescriptor,
    pub raw_markup: String,
}

impl SourceInput {
    pub fn new(source: SourceDescriptor, raw_markup: impl Into<String>) -> Self {
        Self {
            source,
            raw_markup: raw_markup.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub inputs: Vec<SourceInput>,
    pub warnings: Vec<String>,
    /// Restaurant names published in the previous issue.
    pub previous_names: Vec<String>,
}

/// 上一期已發布的名單，跨月份保存
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueHistory {
    #[serde(default)]
    pub last_issue_names: Vec<String>,
}

impl IssueHistory {
    pub fn from_issue(issue: &IssuePayload) -> Self {
        Self {
            last_issue_names: issue.entities.iter().map(|e| e.display_name.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(name: &str, blurb: &str, position: usize, source: &Arc<SourceDescriptor>) -> RawMention {
        RawMention::new(name, blurb, position, Arc::clone(source))
    }

    #[test]
    fn test_derived_attributes_follow_merges() {
        let resy = Arc::new(SourceDescriptor::new("Resy", 1.0, ExtractionRule::ResyHitList));
        let eater = Arc::new(SourceDescriptor::new("Eater", 0.8, ExtractionRule::EaterHeatmap));

        let mut entity = ResolvedEntity::new(
            NormalizedKey::new("carbone".to_string()),
            "Carbone".to_string(),
            mention("Carbone", "Spicy rigatoni.", 3, &resy),
        );
        assert_eq!(entity.cross_source_count(), 1);

        entity.merge(mention("Carbone NYC", "", 0, &eater));
        entity.merge(mention("Carbone", "Still the hardest table in town.", 1, &resy));

        assert_eq!(entity.cross_source_count(), 2);
        assert_eq!(entity.best_blurb(), "Still the hardest table in town.");
        let names: Vec<&str> = entity.sources().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Resy", "Eater"]);
    }

    #[test]
    fn test_link_prefers_reservation_platforms() {
        let source = Arc::new(SourceDescriptor::new("Eater", 0.8, ExtractionRule::EaterHeatmap));
        let mut entity = ResolvedEntity::new(
            NormalizedKey::new("tatiana".to_string()),
            "Tatiana".to_string(),
            mention("Tatiana", "", 0, &source).with_link("https://tatiananyc.com"),
        );
        entity.merge(mention("Tatiana", "", 1, &source).with_link("https://resy.com/cities/ny/tatiana"));

        assert_eq!(entity.link(), Some("https://resy.com/cities/ny/tatiana"));
    }

    #[test]
    fn test_first_available_image_wins() {
        let source = Arc::new(SourceDescriptor::new("Eater", 0.8, ExtractionRule::EaterHeatmap));
        let mut entity = ResolvedEntity::new(
            NormalizedKey::new("bong".to_string()),
            "Bong".to_string(),
            mention("Bong", "", 0, &source),
        );
        assert_eq!(entity.image_url(), None);

        entity.merge(mention("Bong", "", 1, &source).with_image("https://cdn.eater.com/bong.jpg"));
        entity.merge(mention("Bong", "", 2, &source).with_image("https://cdn.eater.com/other.jpg"));
        assert_eq!(entity.image_url(), Some("https://cdn.eater.com/bong.jpg"));
    }

    #[test]
    fn test_difficulty_tier_steps_saturate() {
        assert_eq!(DifficultyTier::VeryHard.harder(), DifficultyTier::VeryHard);
        assert_eq!(DifficultyTier::Easy.easier(), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::Moderate.harder(), DifficultyTier::Hard);
        assert!(DifficultyTier::Easy < DifficultyTier::VeryHard);
    }
}
