//! Scribe engine: turns an HTML page (optionally narrowed by an in-page
//! anchor) into front-mattered Markdown plus a navigation/footer link graph.
mod anchor;
mod config;
mod decode;
mod dom;
mod fallback;
mod fetch;
mod filename;
mod frontmatter;
mod links;
mod locator;
mod markdown;
mod noise;
mod persist;
mod record;
mod region;
mod scrape;
mod types;

pub use anchor::find_anchor;
pub use config::ScraperConfig;
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use dom::{normalize_text, DomNode, Document, ElementData, Fragment};
pub use fallback::{select_content, PatternChain};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::default_output_base;
pub use frontmatter::{build_markdown_document, parse_front_matter, FrontMatter};
pub use links::{
    absolutize_links, extract_flat_links, extract_nested_links, resolve_href, LinkEntry,
};
pub use locator::{LocatorError, SourceLocator};
pub use markdown::{ClassHintInference, LanguageInference, MarkdownRenderer};
pub use noise::strip_noise;
pub use persist::{ensure_output_dir, write_atomically, OutputPaths, OutputWriter, PersistError};
pub use record::{section_title, ContentRecord, ContextMetadata};
pub use region::{scope_region, Region, RegionKind};
pub use scrape::{PageExtractor, ScrapeError, Scraper};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
