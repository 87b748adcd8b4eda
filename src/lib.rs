pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{HtmlRenderer, HttpFetcher, LocalStorage};
pub use app::pipelines::IssuePipeline;
pub use config::{Settings, TomlConfig};
pub use core::{context::RunContext, etl::EtlEngine, pipeline::HeatIndexPipeline};
pub use domain::model::{
    DifficultyTier, ExtractionRule, IssueEntity, IssuePayload, IssueStats, SourceDescriptor,
    SourceInput,
};
pub use utils::error::{HeatError, Result};
