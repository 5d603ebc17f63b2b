//! End-to-end extraction: markup in, [`ContentRecord`] out.
//!
//! [`PageExtractor`] is the synchronous core and never fails on markup.
//! [`Scraper`] adds the IO around it: fetching or reading the document and
//! decoding its bytes.

use chrono::{DateTime, SecondsFormat, Utc};
use engine_logging::{engine_debug, engine_info};
use thiserror::Error;

use crate::anchor::find_anchor;
use crate::config::ScraperConfig;
use crate::decode::{decode_html, DecodeError};
use crate::dom::Document;
use crate::fallback::{select_content, PatternChain};
use crate::fetch::Fetcher;
use crate::links::{absolutize_links, extract_flat_links, extract_nested_links, LinkEntry};
use crate::locator::{LocatorError, SourceLocator};
use crate::markdown::MarkdownRenderer;
use crate::noise::strip_noise;
use crate::persist::PersistError;
use crate::record::{section_title, ContentRecord};
use crate::region::{scope_region, Region};
use crate::types::FetchError;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub struct PageExtractor {
    config: ScraperConfig,
    content: PatternChain,
    navigation: PatternChain,
    footer: PatternChain,
    renderer: MarkdownRenderer,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new(ScraperConfig::default())
    }
}

impl PageExtractor {
    pub fn new(config: ScraperConfig) -> Self {
        Self::with_renderer(config, MarkdownRenderer::new())
    }

    pub fn with_renderer(config: ScraperConfig, renderer: MarkdownRenderer) -> Self {
        let content = PatternChain::compile(&config.content_selectors);
        let navigation = PatternChain::compile(&config.nav_selectors);
        let footer = PatternChain::compile(std::slice::from_ref(&config.footer_selector));
        Self {
            config,
            content,
            navigation,
            footer,
            renderer,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Run the whole pipeline over already-decoded markup.
    pub fn extract(
        &self,
        markup: &str,
        locator: &SourceLocator,
        scraped_at: DateTime<Utc>,
    ) -> ContentRecord {
        let doc = Document::parse(markup);
        let base = locator.base_url();
        let page_title = doc.title().unwrap_or_else(|| self.config.untitled.clone());
        let description = doc.description().unwrap_or_default();

        let anchored = locator.anchor().and_then(|anchor| {
            let found = find_anchor(&doc, anchor);
            match found {
                Some(element) => engine_info!("anchor #{} found on <{}>", anchor, element.value().name()),
                None => engine_info!("anchor #{} not found, using content fallback", anchor),
            }
            found.map(scope_region)
        });
        let region = anchored.or_else(|| select_content(&doc, &self.content).map(Region::subtree));
        let title = section_title(&page_title, locator.anchor(), region.as_ref());

        let navigation_links = self.navigation_links(&doc, locator);
        let footer_links = self.footer_links(&doc, locator);

        let body = match region {
            Some(region) => {
                let mut fragment = region.into_fragment();
                strip_noise(
                    &mut fragment,
                    &self.config.header_link_class,
                    &self.config.badge_alt_marker,
                );
                let rewritten = absolutize_links(&mut fragment, base);
                engine_debug!("absolutized {} link(s)", rewritten);
                self.renderer.render(&fragment)
            }
            None => {
                engine_info!("no content region in {}, emitting metadata only", locator);
                String::new()
            }
        };

        ContentRecord {
            title,
            source_locator: locator.as_str().to_string(),
            description,
            scraped_at: scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            navigation_links,
            footer_links,
            body,
        }
    }

    fn navigation_links(&self, doc: &Document, locator: &SourceLocator) -> Vec<LinkEntry> {
        let Some((pattern, container)) = self.navigation.first_match(doc) else {
            return Vec::new();
        };
        let links = extract_nested_links(container, locator.base_url());
        engine_debug!("{} navigation link(s) under {:?}", links.len(), pattern);
        links
    }

    fn footer_links(&self, doc: &Document, locator: &SourceLocator) -> Vec<LinkEntry> {
        let Some((_, container)) = self.footer.first_match(doc) else {
            return Vec::new();
        };
        let links = extract_flat_links(container, locator.base_url());
        engine_debug!("{} footer link(s)", links.len());
        links
    }
}

/// Retrieves a document for a locator and runs it through a [`PageExtractor`].
pub struct Scraper<F> {
    fetcher: F,
    extractor: PageExtractor,
}

impl<F: Fetcher> Scraper<F> {
    pub fn new(fetcher: F, extractor: PageExtractor) -> Self {
        Self { fetcher, extractor }
    }

    pub fn extractor(&self) -> &PageExtractor {
        &self.extractor
    }

    pub async fn scrape(
        &self,
        locator: &SourceLocator,
        scraped_at: DateTime<Utc>,
    ) -> Result<ContentRecord, ScrapeError> {
        let markup = self.load(locator).await?;
        Ok(self.extractor.extract(&markup, locator, scraped_at))
    }

    async fn load(&self, locator: &SourceLocator) -> Result<String, ScrapeError> {
        if let Some(url) = locator.remote_url() {
            let output = self.fetcher.fetch(url.as_str()).await?;
            let decoded = decode_html(
                &output.bytes,
                output.metadata.content_type.as_deref(),
                Some(url),
            )?;
            engine_debug!("decoded {} as {}", url, decoded.encoding_label);
            return Ok(decoded.html);
        }

        let path = locator.local_path().ok_or_else(|| {
            ScrapeError::Locator(LocatorError::Unsupported(locator.as_str().to_string()))
        })?;
        engine_info!("reading {}", path.display());
        let bytes = tokio::fs::read(path).await.map_err(|source| ScrapeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(decode_html(&bytes, None, None)?.html)
    }
}
