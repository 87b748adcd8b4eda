use crate::config::settings::Settings;
use crate::domain::model::{ExtractResult, IssuePayload, SourceDescriptor};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono_tz::Tz;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn issue_title(&self) -> &str;
    fn sources(&self) -> &[SourceDescriptor];
    fn settings(&self) -> Settings;
    fn output_path(&self) -> &str;
    fn write_json(&self) -> bool;
    /// Zone for the issue's month label and dated file names.
    fn timezone(&self) -> Tz;
    /// Storage path of the previous issue's restaurant names.
    fn state_file(&self) -> &str;
    /// Look up `og:image` on venue pages for entries without a thumbnail.
    fn og_image_fallback(&self) -> bool;
}

/// Retrieves raw markup for a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Turns a finished issue into a document.
pub trait Renderer: Send + Sync {
    fn render(&self, title: &str, issue: &IssuePayload) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractResult>;
    async fn transform(&self, extracted: ExtractResult) -> Result<IssuePayload>;
    async fn load(&self, issue: IssuePayload) -> Result<String>;
}
