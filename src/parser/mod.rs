pub mod classify;
pub mod dom;
pub mod normalize;

use scraper::{Html, Selector};
use tracing::debug;

use crate::document::{ContentBlock, Document};
use crate::error::ScrapeError;
use classify::{classify, Emit};
use dom::ExtractorConfig;

/// Parse a page and walk its main content container depth-first, collecting
/// typed blocks in reading order.
pub fn assemble(html: &str, url: &str, config: &ExtractorConfig) -> Result<Document, ScrapeError> {
    let selector = Selector::parse(&config.content_selector)
        .map_err(|e| ScrapeError::Parse(format!("bad content selector {:?}: {}", config.content_selector, e)))?;

    let page = Html::parse_document(html);
    let root = page
        .select(&selector)
        .next()
        .ok_or_else(|| ScrapeError::MissingContent { url: url.to_string() })?;

    let mut doc = Document::new(url);
    for node in root.descendants().skip(1) {
        match classify(node, config) {
            Some(Emit::Title(text)) => {
                // Every H1 overwrites the title; the last one on the page wins.
                doc.title = Some(text.clone());
                doc.content.push(ContentBlock::Heading { level: 1, text });
            }
            Some(Emit::Block(block)) => doc.content.push(block),
            Some(Emit::Items(items)) => doc.content.extend(items),
            None => {}
        }
    }

    debug!(url, blocks = doc.content.len(), "assembled page");
    Ok(doc)
}
