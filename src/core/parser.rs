//! Turns one source's raw markup into ordered raw mentions.
//!
//! Parsing is best-effort: malformed or drifting markup yields whatever could
//! be extracted plus `PartialExtractionWarning`s. Only input that is not
//! markup at all (empty, binary, no tags) is rejected.

use crate::core::normalize::normalize;
use crate::core::rules::{strategy, HeadingProfile, Strategy};
use crate::domain::model::{RawMention, SourceDescriptor};
use crate::utils::error::{HeatError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use url::Url;

static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h2, h3"));
static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector("ol > li"));
static LIST_NAME: LazyLock<Selector> = LazyLock::new(|| selector("strong, b, a"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static IMAGES: LazyLock<Selector> = LazyLock::new(|| selector("picture source, img"));
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:image"], meta[name="og:image"]"#));

/// Lazy-loading pages park the real URL in one of these.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original", "data-url"];
const SRCSET_ATTRS: &[&str] = &["srcset", "data-srcset"];
const JUNK_IMAGE_HINTS: &[&str] = &["logo", "icon", "avatar", "spinner", "placeholder", "sprite"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Non-fatal: expected structure was missing, results may be partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialExtractionWarning {
    pub source_name: String,
    pub message: String,
}

impl fmt::Display for PartialExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source_name, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub mentions: Vec<RawMention>,
    pub warnings: Vec<PartialExtractionWarning>,
}

impl ParseOutcome {
    fn warn(&mut self, source: &SourceDescriptor, message: impl Into<String>) {
        self.warnings.push(PartialExtractionWarning {
            source_name: source.name.clone(),
            message: message.into(),
        });
    }
}

pub fn parse(markup: &str, source: &SourceDescriptor) -> Result<ParseOutcome> {
    check_markup(markup, source)?;

    let document = Html::parse_document(markup);
    let shared = Arc::new(source.clone());
    let mut outcome = ParseOutcome::default();

    let container = match document.select(&ARTICLE).next() {
        Some(article) => article,
        None => {
            outcome.warn(source, "no <article> container found; scanned the whole document");
            document.root_element()
        }
    };

    let base = source.url.as_deref().and_then(|u| Url::parse(u).ok());

    match strategy(source.rule) {
        Strategy::Headings(profile) => {
            extract_headings(container, &profile, base.as_ref(), &shared, &mut outcome)
        }
        Strategy::OrderedList { home_domain } => {
            let home = home_domain_for(home_domain, base.as_ref());
            extract_list_items(container, &home, base.as_ref(), &shared, &mut outcome)
        }
    }

    tracing::debug!(
        "{}: extracted {} mentions ({} warnings)",
        source.name,
        outcome.mentions.len(),
        outcome.warnings.len()
    );
    Ok(outcome)
}

fn check_markup(markup: &str, source: &SourceDescriptor) -> Result<()> {
    let reject = |reason: &str| {
        Err(HeatError::UnparsableDocument {
            source_name: source.name.clone(),
            reason: reason.to_string(),
        })
    };

    if markup.trim().is_empty() {
        return reject("document is empty");
    }

    let total = markup.chars().count();
    let suspicious = markup
        .chars()
        .filter(|c| *c == '\0' || *c == '\u{FFFD}' || (c.is_control() && !c.is_whitespace()))
        .count();
    if markup.contains('\0') || suspicious * 100 > total {
        return reject("document looks like binary data");
    }

    if !markup.contains('<') {
        return reject("document contains no markup");
    }

    Ok(())
}

#[derive(Debug, Clone, Default)]
struct EntrySlice {
    blurb: Option<String>,
    hrefs: Vec<String>,
    images: Vec<ImageCandidate>,
}

#[derive(Debug, Clone, PartialEq)]
struct ImageCandidate {
    url: String,
    alt: String,
}

fn extract_headings(
    container: ElementRef<'_>,
    profile: &HeadingProfile,
    base: Option<&Url>,
    source: &Arc<SourceDescriptor>,
    outcome: &mut ParseOutcome,
) {
    let headings: Vec<ElementRef<'_>> = container.select(&HEADINGS).collect();
    if headings.is_empty() {
        outcome.warn(source, "no h2/h3 headings found");
        return;
    }

    let slices = slice_entries(container, &headings);

    for (heading, slice) in headings.iter().zip(slices) {
        let text = element_text(heading);
        let Some(name) = profile.accept(&text) else {
            tracing::debug!("{}: skipping heading '{}'", source.name, text);
            continue;
        };

        let link = pick_link(&slice.hrefs, base, profile.home_domain);
        if profile.require_blurb_or_link && slice.blurb.is_none() && link.is_none() {
            tracing::debug!("{}: '{}' has neither blurb nor link", source.name, name);
            continue;
        }

        let image = pick_image(&slice.images, base, &name);
        let position = outcome.mentions.len();
        let mut mention = RawMention::new(
            name,
            slice.blurb.unwrap_or_default(),
            position,
            Arc::clone(source),
        );
        if let Some(link) = link {
            mention = mention.with_link(link);
        }
        if let Some(image) = image {
            mention = mention.with_image(image);
        }
        outcome.mentions.push(mention);
    }

    if outcome.mentions.is_empty() {
        outcome.warn(
            source,
            format!("{} headings found but no entries extracted", headings.len()),
        );
    }
}

/// Assign every element after heading `i` and before heading `i + 1`, in
/// document order, to entry `i`. Headings need not be siblings.
fn slice_entries(container: ElementRef<'_>, headings: &[ElementRef<'_>]) -> Vec<EntrySlice> {
    let starts: HashMap<_, usize> = headings
        .iter()
        .enumerate()
        .map(|(i, h)| (h.id(), i))
        .collect();
    let mut slices = vec![EntrySlice::default(); headings.len()];
    let mut current: Option<usize> = None;

    for node in container.descendants() {
        if let Some(&idx) = starts.get(&node.id()) {
            current = Some(idx);
            continue;
        }
        let (Some(idx), Some(element)) = (current, ElementRef::wrap(node)) else {
            continue;
        };

        let slice = &mut slices[idx];
        match element.value().name() {
            "p" if slice.blurb.is_none() => {
                let text = element_text(&element);
                if !text.is_empty() {
                    slice.blurb = Some(text);
                }
            }
            "a" => {
                if let Some(href) = element.value().attr("href") {
                    slice.hrefs.push(href.trim().to_string());
                }
            }
            "img" | "source" => {
                if let Some(candidate) = image_candidate(&element) {
                    slice.images.push(candidate);
                }
            }
            _ => {}
        }
    }

    slices
}

fn extract_list_items(
    container: ElementRef<'_>,
    home_domain: &str,
    base: Option<&Url>,
    source: &Arc<SourceDescriptor>,
    outcome: &mut ParseOutcome,
) {
    let items: Vec<ElementRef<'_>> = container.select(&LIST_ITEMS).collect();
    if items.is_empty() {
        outcome.warn(source, "no ordered-list items found");
        return;
    }

    for item in &items {
        let Some(name) = item
            .select(&LIST_NAME)
            .map(|el| element_text(&el))
            .find(|t| !t.is_empty())
        else {
            tracing::debug!("{}: list item without a name", source.name);
            continue;
        };

        let full = element_text(item);
        let rest = full.strip_prefix(name.as_str()).unwrap_or(&full);
        let blurb = rest
            .trim_start_matches(|c: char| {
                c.is_whitespace() || matches!(c, ':' | '-' | ',' | '.' | '\u{2013}' | '\u{2014}')
            })
            .trim()
            .to_string();

        let hrefs: Vec<String> = item
            .select(&ANCHORS)
            .filter_map(|a| a.value().attr("href"))
            .map(|h| h.trim().to_string())
            .collect();

        let images: Vec<ImageCandidate> = item
            .select(&IMAGES)
            .filter_map(|el| image_candidate(&el))
            .collect();
        let image = pick_image(&images, base, &name);

        let position = outcome.mentions.len();
        let mut mention = RawMention::new(name, blurb, position, Arc::clone(source));
        if let Some(link) = pick_link(&hrefs, base, home_domain) {
            mention = mention.with_link(link);
        }
        if let Some(image) = image {
            mention = mention.with_image(image);
        }
        outcome.mentions.push(mention);
    }

    if outcome.mentions.is_empty() {
        outcome.warn(
            source,
            format!("{} list items found but no entries extracted", items.len()),
        );
    }
}

fn home_domain_for(configured: &str, base: Option<&Url>) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    base.and_then(|b| b.host_str())
        .map(|h| h.trim_start_matches("www.").to_string())
        .unwrap_or_default()
}

/// Reservation platforms first, then links leaving the source's own site,
/// then whatever came first.
fn pick_link(hrefs: &[String], base: Option<&Url>, home_domain: &str) -> Option<String> {
    let links: Vec<Url> = hrefs
        .iter()
        .filter_map(|href| match base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        })
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .collect();

    let is_reservation = |u: &Url| {
        u.host_str().is_some_and(|h| {
            h == "resy.com" || h == "www.resy.com" || h.ends_with("opentable.com")
        })
    };
    let is_outbound = |u: &Url| {
        u.host_str()
            .is_some_and(|h| home_domain.is_empty() || !h.ends_with(home_domain))
    };

    links
        .iter()
        .find(|u| is_reservation(*u))
        .or_else(|| links.iter().find(|u| is_outbound(*u)))
        .or_else(|| links.first())
        .map(|u| u.to_string())
}

/// `<img>` reads its direct URL attributes first and falls back to the
/// largest srcset entry. `<source>` only has srcsets.
fn image_candidate(element: &ElementRef<'_>) -> Option<ImageCandidate> {
    let value = element.value();
    let direct = if value.name() == "img" {
        IMAGE_ATTRS
            .iter()
            .filter_map(|attr| value.attr(attr))
            .map(str::trim)
            .find(|url| !url.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    let url = direct.or_else(|| {
        SRCSET_ATTRS
            .iter()
            .filter_map(|attr| value.attr(attr))
            .find_map(last_srcset_url)
    })?;

    Some(ImageCandidate {
        url,
        alt: value.attr("alt").unwrap_or_default().trim().to_string(),
    })
}

fn last_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
        .last()
        .map(str::to_string)
}

/// Highest-scoring candidate, earliest on ties. Alt text naming the
/// restaurant wins; logos, icons and SVGs lose.
fn pick_image(candidates: &[ImageCandidate], base: Option<&Url>, name: &str) -> Option<String> {
    let name_key = normalize(name);
    let mut best: Option<(i32, String)> = None;

    for candidate in candidates {
        let resolved = match base {
            Some(base) => base.join(&candidate.url),
            None => Url::parse(&candidate.url),
        };
        let Ok(url) = resolved else { continue };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }

        let url = url.to_string();
        let lower = url.to_lowercase();
        let mut score = 0;
        if !name_key.is_empty() && normalize(&candidate.alt).as_str().contains(name_key.as_str()) {
            score += 50;
        }
        if JUNK_IMAGE_HINTS.iter().any(|hint| lower.contains(hint)) {
            score -= 40;
        }
        if lower.ends_with(".svg") {
            score -= 30;
        }

        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, url));
        }
    }

    best.map(|(_, url)| url)
}

/// `og:image` of a venue page, used when a listing carried no thumbnail.
pub fn og_image(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    document
        .select(&OG_IMAGE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
