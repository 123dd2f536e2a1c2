use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};
use url::Url;

use crate::document::Document;
use crate::fetch::Fetcher;
use crate::parser::assemble;
use crate::parser::dom::ExtractorConfig;

/// Scrape stats returned after completion.
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch every path (one request at a time), then assemble the pages in
/// parallel. The result keeps crawl order; pages that fail are logged and
/// left out.
pub async fn scrape_all_pages<F: Fetcher>(
    fetcher: &F,
    base_url: &Url,
    paths: &[String],
    extractor: &ExtractorConfig,
) -> Result<(Vec<Document>, ScrapeStats)> {
    let total = paths.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut fetched = Vec::with_capacity(total);
    let mut errors = 0usize;
    for path in paths {
        let url = base_url.join(path)?;
        match fetcher.fetch(url.as_str()).await {
            Ok(html) => fetched.push((url.to_string(), html)),
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let assembled: Vec<_> = fetched
        .par_iter()
        .map(|(url, html)| assemble(html, url, extractor))
        .collect();

    let mut pages = Vec::with_capacity(assembled.len());
    for result in assembled {
        match result {
            Ok(doc) => pages.push(doc),
            Err(e) => {
                warn!("Skipping page: {}", e);
                errors += 1;
            }
        }
    }

    let ok = pages.len();
    info!("Scraped {} pages ({} ok, {} errors)", total, ok, errors);
    Ok((pages, ScrapeStats { total, ok, errors }))
}
