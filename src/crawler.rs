use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;
use crate::fetch::Fetcher;

const CANONICAL: &str = "link[rel~=canonical][href]";
const NEXT: &str = "link[rel~=next][href]";

pub struct CrawlConfig {
    pub base_url: Url,
    pub start_path: String,
    /// Last page of the walk; appended and then the walk ends.
    pub stop_path: String,
    /// Max pages to fetch.
    pub limit: Option<usize>,
}

/// Paths found so far (relative to the base url, in visiting order) and the
/// ones already fetched. Owned by the caller so a failed walk keeps its progress.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub paths: Vec<String>,
    pub visited: HashSet<String>,
}

impl CrawlState {
    pub fn seeded(start_path: &str) -> Self {
        Self {
            paths: vec![start_path.to_string()],
            visited: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    StopPath,
    NoNextLink,
    Revisit,
    Limit,
    Empty,
}

/// Follow canonical and `rel=next` links from the last known path until the
/// stop path, a dead end, or a page seen before.
pub async fn crawl<F: Fetcher>(
    fetcher: &F,
    config: &CrawlConfig,
    state: &mut CrawlState,
) -> Result<StopReason, ScrapeError> {
    let reason = loop {
        let Some(current) = state.paths.last().cloned() else {
            break StopReason::Empty;
        };
        if state.visited.contains(&current) {
            // Keep `paths` free of duplicates.
            state.paths.pop();
            break StopReason::Revisit;
        }
        if config.limit.is_some_and(|n| state.visited.len() >= n) {
            break StopReason::Limit;
        }
        state.visited.insert(current.clone());

        let current_abs = config.base_url.join(&current)?;
        let html = fetcher.fetch(current_abs.as_str()).await?;
        let links = PageLinks::parse(&html)?;
        debug!(path = %current, ?links, "crawled");

        if let Some(canonical) = links.canonical {
            let canonical_rel = to_relative(&config.base_url, &canonical);
            if canonical_rel == config.stop_path {
                state.paths.push(canonical_rel);
                break StopReason::StopPath;
            }
            if !canonical_rel.is_empty() && !state.visited.contains(&canonical_rel) {
                state.paths.push(canonical_rel);
                continue;
            }
        }

        let Some(next) = links.next else {
            break StopReason::NoNextLink;
        };
        let next_rel = to_relative(&config.base_url, current_abs.join(&next)?.as_str());
        let reached_stop = next_rel == config.stop_path;
        state.paths.push(next_rel);
        if reached_stop {
            break StopReason::StopPath;
        }
    };

    info!(
        pages = state.paths.len(),
        last = state.paths.last().map(String::as_str).unwrap_or(""),
        ?reason,
        "crawl finished"
    );
    Ok(reason)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub canonical: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    pub fn parse(html: &str) -> Result<Self, ScrapeError> {
        let page = Html::parse_document(html);
        let href = |css: &str| -> Result<Option<String>, ScrapeError> {
            let sel = Selector::parse(css).map_err(|e| ScrapeError::Parse(e.to_string()))?;
            Ok(page
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("href"))
                .map(str::to_string))
        };
        Ok(Self {
            canonical: href(CANONICAL)?,
            next: href(NEXT)?,
        })
    }
}

/// Strip the base url prefix; urls on other sites pass through unchanged.
pub fn to_relative(base: &Url, url: &str) -> String {
    url.strip_prefix(base.as_str()).unwrap_or(url).to_string()
}
