pub mod assembler;
pub mod context;
pub mod difficulty;
pub mod etl;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod rules;
pub mod scorer;
pub mod similarity;

pub use crate::domain::model::{
    DifficultyTier, ExtractResult, IssueEntity, IssuePayload, IssueStats, RawMention,
    ResolvedEntity, ScoredEntity, SourceDescriptor, SourceInput,
};
pub use crate::domain::ports::{ConfigProvider, Fetcher, Pipeline, Renderer, Storage};
pub use crate::utils::error::Result;
