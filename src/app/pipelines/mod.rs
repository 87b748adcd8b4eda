pub mod issue_pipeline;

pub use issue_pipeline::IssuePipeline;
