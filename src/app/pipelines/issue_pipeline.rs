use crate::core::context::RunContext;
use crate::core::parser::og_image;
use crate::core::pipeline::HeatIndexPipeline;
use crate::core::{
    ConfigProvider, ExtractResult, Fetcher, IssuePayload, Pipeline, Renderer, SourceInput, Storage,
};
use crate::domain::model::IssueHistory;
use crate::utils::error::{HeatError, Result};
use futures::future::join_all;
use url::Url;

pub const INDEX_FILE: &str = "index.html";

/// Listing pages whose `og:image` is the listicle's banner, not the venue.
const OG_SKIP_HOSTS: &[&str] = &["eater.com", "blog.resy.com"];

/// Fetches every configured source, runs the heat index core and writes the
/// rendered issue to storage.
pub struct IssuePipeline<F: Fetcher, R: Renderer, S: Storage, C: ConfigProvider> {
    pub(crate) fetcher: F,
    pub(crate) renderer: R,
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<F: Fetcher, R: Renderer, S: Storage, C: ConfigProvider> IssuePipeline<F, R, S, C> {
    pub fn new(fetcher: F, renderer: R, storage: S, config: C) -> Self {
        Self {
            fetcher,
            renderer,
            storage,
            config,
        }
    }

    /// Names from the previous issue. A missing file means this is the first issue.
    async fn read_history(&self, warnings: &mut Vec<String>) -> Vec<String> {
        let path = self.config.state_file();
        match self.storage.read_file(path).await {
            Ok(data) => match serde_json::from_slice::<IssueHistory>(&data) {
                Ok(history) => {
                    tracing::info!(
                        "📚 Loaded {} names from the previous issue",
                        history.last_issue_names.len()
                    );
                    history.last_issue_names
                }
                Err(e) => {
                    warnings.push(format!("{}: unreadable issue history ({})", path, e));
                    Vec::new()
                }
            },
            Err(HeatError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("📭 No issue history at {}, every restaurant counts as new", path);
                Vec::new()
            }
            Err(e) => {
                warnings.push(format!("{}: unreadable issue history ({})", path, e));
                Vec::new()
            }
        }
    }

    /// 沒有縮圖的條目改抓店家頁面的 og:image，失敗就略過
    async fn fill_missing_images(&self, issue: &mut IssuePayload) {
        let targets: Vec<(usize, String)> = issue
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.image_url.is_none())
            .filter_map(|(i, e)| e.link.clone().map(|link| (i, link)))
            .filter(|(_, link)| og_lookup_allowed(link))
            .collect();
        if targets.is_empty() {
            return;
        }

        let lookups = targets.iter().map(|(i, link)| async move {
            (*i, link, self.fetcher.fetch(link).await)
        });

        let mut found = 0;
        for (i, link, fetched) in join_all(lookups).await {
            match fetched {
                Ok(markup) => {
                    if let Some(image) = og_image(&markup) {
                        issue.entities[i].image_url = Some(resolve_against(link, image));
                        found += 1;
                    }
                }
                Err(e) => tracing::debug!("og:image lookup failed for {}: {}", link, e),
            }
        }
        tracing::info!("🖼️ Found {} of {} missing thumbnails", found, targets.len());
    }
}

fn og_lookup_allowed(link: &str) -> bool {
    let lower = link.to_lowercase();
    !OG_SKIP_HOSTS.iter().any(|host| lower.contains(host))
}

fn resolve_against(page: &str, image: String) -> String {
    Url::parse(page)
        .and_then(|base| base.join(&image))
        .map(|u| u.to_string())
        .unwrap_or(image)
}

#[async_trait::async_trait]
impl<F: Fetcher, R: Renderer, S: Storage, C: ConfigProvider> Pipeline for IssuePipeline<F, R, S, C> {
    async fn extract(&self) -> Result<ExtractResult> {
        let sources = self.config.sources();

        // 並行抓取，結果依設定順序排列
        let fetches = sources.iter().map(|source| async move {
            match source.url.as_deref() {
                Some(url) => {
                    tracing::debug!("Fetching {} from {}", source.name, url);
                    (source, Some(self.fetcher.fetch(url).await))
                }
                None => (source, None),
            }
        });

        let mut result = ExtractResult::default();
        for (source, fetched) in join_all(fetches).await {
            match fetched {
                Some(Ok(markup)) => {
                    tracing::debug!("{}: {} bytes", source.name, markup.len());
                    result.inputs.push(SourceInput::new(source.clone(), markup));
                }
                Some(Err(e)) => {
                    result
                        .warnings
                        .push(format!("{}: fetch failed ({})", source.name, e));
                }
                None => {
                    result
                        .warnings
                        .push(format!("{}: skipped (no url configured)", source.name));
                }
            }
        }

        result.previous_names = self.read_history(&mut result.warnings).await;
        Ok(result)
    }

    async fn transform(&self, extracted: ExtractResult) -> Result<IssuePayload> {
        let mut context = RunContext::now(self.config.sources().to_vec())
            .with_previous_names(extracted.previous_names);
        for warning in extracted.warnings {
            context.warn(warning);
        }

        let core = HeatIndexPipeline::new(self.config.settings());
        let mut issue = core.run(&extracted.inputs, context);

        if self.config.og_image_fallback() {
            self.fill_missing_images(&mut issue).await;
        }
        Ok(issue)
    }

    async fn load(&self, issue: IssuePayload) -> Result<String> {
        let html = self.renderer.render(self.config.issue_title(), &issue)?;
        let local = issue.generated_at.with_timezone(&self.config.timezone());
        let dated = format!("issue-{}", local.format("%Y-%m-%d"));

        self.storage.write_file(INDEX_FILE, html.as_bytes()).await?;
        self.storage
            .write_file(&format!("{}.html", dated), html.as_bytes())
            .await?;

        if self.config.write_json() {
            let json = serde_json::to_string_pretty(&issue)?;
            self.storage
                .write_file(&format!("{}.json", dated), json.as_bytes())
                .await?;
            tracing::debug!("Wrote {}.json ({} bytes)", dated, json.len());
        }

        // 空的一期不覆蓋上期名單
        if issue.is_empty() {
            tracing::warn!("⚠️ Empty issue, keeping the previous issue history");
        } else {
            let history = serde_json::to_string_pretty(&IssueHistory::from_issue(&issue))?;
            self.storage
                .write_file(self.config.state_file(), history.as_bytes())
                .await?;
        }

        Ok(format!("{}/{}", self.config.output_path(), INDEX_FILE))
    }
}
