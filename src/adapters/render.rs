use crate::core::{IssuePayload, Renderer};
use crate::utils::error::Result;
use chrono_tz::Tz;
use handlebars::Handlebars;
use serde::Serialize;

const ISSUE_TEMPLATE_NAME: &str = "issue";
const ISSUE_TEMPLATE: &str = include_str!("../../templates/issue.html.hbs");

/// Renders an issue into a standalone HTML page. Handlebars escapes every
/// `{{value}}`, so scraped text cannot inject markup.
///
/// Dates are shown in the renderer's zone (New York unless set), so a run
/// just after midnight UTC on the 1st still reads as the previous month.
pub struct HtmlRenderer {
    handlebars: Handlebars<'static>,
    timezone: Tz,
}

#[derive(Serialize)]
struct IssueView<'a> {
    title: &'a str,
    period_label: String,
    generated_at: String,
    entities: Vec<EntityView<'a>>,
    sources: Vec<SourceView<'a>>,
    total_mentions: usize,
    total_entities: usize,
    warning_count: usize,
}

#[derive(Serialize)]
struct EntityView<'a> {
    rank: usize,
    display_name: &'a str,
    heat_score: u8,
    heat_class: &'static str,
    difficulty: &'static str,
    tip: &'a str,
    blurb: &'a str,
    sources: String,
    link: Option<&'a str>,
    image_url: Option<&'a str>,
    is_new: bool,
}

#[derive(Serialize)]
struct SourceView<'a> {
    name: &'a str,
    url: Option<&'a str>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        Self::with_template(ISSUE_TEMPLATE)
    }

    pub fn with_template(template: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string(ISSUE_TEMPLATE_NAME, template)?;
        Ok(Self {
            handlebars,
            timezone: chrono_tz::America::New_York,
        })
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, title: &str, issue: &IssuePayload) -> Result<String> {
        let local = issue.generated_at.with_timezone(&self.timezone);
        let view = IssueView {
            title,
            period_label: local.format("%B %Y").to_string(),
            generated_at: local.format("%Y-%m-%d %H:%M %Z").to_string(),
            entities: issue
                .entities
                .iter()
                .enumerate()
                .map(|(i, e)| EntityView {
                    rank: i + 1,
                    display_name: &e.display_name,
                    heat_score: e.heat_score,
                    heat_class: heat_class(e.heat_score),
                    difficulty: e.difficulty_tier.label(),
                    tip: &e.tip,
                    blurb: &e.blurb,
                    sources: e.sources.join(" · "),
                    link: e.link.as_deref(),
                    image_url: e.image_url.as_deref(),
                    is_new: !e.carried_over,
                })
                .collect(),
            sources: issue
                .sources
                .iter()
                .map(|s| SourceView {
                    name: &s.name,
                    url: s.url.as_deref(),
                })
                .collect(),
            total_mentions: issue.stats.total_mentions,
            total_entities: issue.stats.total_entities,
            warning_count: issue.stats.warnings.len(),
        };

        Ok(self.handlebars.render(ISSUE_TEMPLATE_NAME, &view)?)
    }
}

fn heat_class(score: u8) -> &'static str {
    match score {
        80..=100 => "scorching",
        60..=79 => "hot",
        _ => "warm",
    }
}
