//! Per-source extraction strategies.
//!
//! Source layouts drift independently, so each source gets its own profile
//! here rather than a branch inside the parser. Adding a source means adding
//! an `ExtractionRule` variant and its profile.

use crate::core::normalize::LIST_NUMBERING;
use crate::domain::model::ExtractionRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Entries start at `h2`/`h3` headings; each entry runs to the next heading.
    Headings(HeadingProfile),
    /// Entries are `<ol><li>` items with the name in the first `strong`/`b`/`a`.
    OrderedList { home_domain: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingProfile {
    pub max_heading_len: usize,
    pub skip_containing: &'static [&'static str],
    pub skip_exact: &'static [&'static str],
    pub skip_prefix: &'static [&'static str],
    pub strip_numbering: bool,
    pub require_blurb_or_link: bool,
    /// The source's own domain; links there are not outbound.
    pub home_domain: &'static str,
}

const RESY_HIT_LIST: HeadingProfile = HeadingProfile {
    max_heading_len: 90,
    skip_containing: &[
        "hit list",
        "where to eat",
        "updated",
        "read more",
        "newest restaurant openings",
        "openings, now on resy",
        "now on resy",
        "newsletter",
        "sign up",
        "subscribe",
        "follow us",
        "gift card",
        "resy events",
        "private dining",
        "more from resy",
    ],
    skip_exact: &[],
    skip_prefix: &[],
    strip_numbering: true,
    require_blurb_or_link: true,
    home_domain: "resy.com",
};

const EATER_HEATMAP: HeadingProfile = HeadingProfile {
    max_heading_len: 110,
    skip_containing: &["the heatmap", "where to eat", "related", "updates"],
    skip_exact: &["see more", "more maps in eater ny"],
    skip_prefix: &["more maps"],
    strip_numbering: false,
    require_blurb_or_link: false,
    home_domain: "eater.com",
};

pub fn strategy(rule: ExtractionRule) -> Strategy {
    match rule {
        ExtractionRule::ResyHitList => Strategy::Headings(RESY_HIT_LIST),
        ExtractionRule::EaterHeatmap => Strategy::Headings(EATER_HEATMAP),
        ExtractionRule::OrderedList => Strategy::OrderedList { home_domain: "" },
    }
}

impl HeadingProfile {
    /// The restaurant name carried by a heading, or `None` for promo and
    /// utility headings.
    pub fn accept(&self, heading_text: &str) -> Option<String> {
        let text = heading_text.trim();
        if text.is_empty() || text.chars().count() > self.max_heading_len {
            return None;
        }

        let lower = text.to_lowercase();
        if self.skip_containing.iter().any(|p| lower.contains(p))
            || self.skip_exact.iter().any(|p| lower == *p)
            || self.skip_prefix.iter().any(|p| lower.starts_with(p))
        {
            return None;
        }

        let name = if self.strip_numbering {
            LIST_NUMBERING.replace(text, "").trim().to_string()
        } else {
            text.to_string()
        };

        if name.chars().count() < 2 {
            return None;
        }
        Some(name)
    }
}
