use serde::{Deserialize, Serialize};

use crate::frontmatter::{build_markdown_document, FrontMatter};
use crate::links::LinkEntry;
use crate::region::Region;

/// The result of one scrape: immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub title: String,
    pub source_locator: String,
    pub description: String,
    pub scraped_at: String,
    pub navigation_links: Vec<LinkEntry>,
    pub footer_links: Vec<LinkEntry>,
    pub body: String,
}

/// Side-car metadata persisted next to the Markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMetadata {
    pub source_url: String,
    pub page_title: String,
    pub scraped_at: String,
    pub navigation_links: Vec<LinkEntry>,
    pub footer_links: Vec<LinkEntry>,
}

impl ContentRecord {
    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            title: self.title.clone(),
            source_url: self.source_locator.clone(),
            description: self.description.clone(),
            scraped_at: self.scraped_at.clone(),
        }
    }

    /// Front matter, a blank line, then the rendered body (possibly empty).
    pub fn to_markdown(&self) -> String {
        build_markdown_document(&self.front_matter(), &self.body)
    }

    pub fn metadata(&self) -> ContextMetadata {
        ContextMetadata {
            source_url: self.source_locator.clone(),
            page_title: self.title.clone(),
            scraped_at: self.scraped_at.clone(),
            navigation_links: self.navigation_links.clone(),
            footer_links: self.footer_links.clone(),
        }
    }

    /// The `(markdown, metadata)` pair handed to the output writer.
    pub fn into_output(self) -> (String, ContextMetadata) {
        let markdown = self.to_markdown();
        let metadata = self.metadata();
        (markdown, metadata)
    }
}

/// Page title, extended with the section name when an anchor was requested
/// and a region (anchored or fallback) exists: the first `h1`-`h3` inside the
/// region, or `#<anchor>` when the region has none.
pub fn section_title(page_title: &str, anchor: Option<&str>, region: Option<&Region>) -> String {
    match (anchor, region) {
        (Some(anchor), Some(region)) => {
            let section = region
                .leading_heading_text()
                .unwrap_or_else(|| format!("#{anchor}"));
            format!("{page_title} (Section: {section})")
        }
        _ => page_title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::region::scope_region;

    fn region_for(markup: &str, id: &str) -> Region {
        let doc = Document::parse(markup);
        let anchor = crate::anchor::find_anchor(&doc, id).unwrap();
        scope_region(anchor)
    }

    #[test]
    fn section_title_uses_first_heading() {
        let region = region_for(r#"<h2 id="a">Install   Guide</h2><p>x</p>"#, "a");
        assert_eq!(
            section_title("Docs", Some("a"), Some(&region)),
            "Docs (Section: Install Guide)"
        );
    }

    #[test]
    fn section_title_falls_back_to_anchor() {
        let region = region_for(r#"<div id="box"><p>no headings</p><h4>too deep</h4></div>"#, "box");
        assert_eq!(
            section_title("Docs", Some("box"), Some(&region)),
            "Docs (Section: #box)"
        );
    }

    #[test]
    fn plain_title_without_anchor_region() {
        assert_eq!(section_title("Docs", Some("a"), None), "Docs");
        assert_eq!(section_title("Docs", None, None), "Docs");
    }

    #[test]
    fn metadata_serializes_expected_keys() {
        let record = ContentRecord {
            title: "T".into(),
            source_locator: "https://e.com".into(),
            description: String::new(),
            scraped_at: "2024-01-01T00:00:00Z".into(),
            navigation_links: vec![LinkEntry {
                text: "A".into(),
                href: "https://e.com/a".into(),
                children: vec![LinkEntry::new("B", "https://e.com/b")],
            }],
            footer_links: vec![LinkEntry::new("C", "https://e.com/c")],
            body: String::new(),
        };
        let json = serde_json::to_value(record.metadata()).unwrap();
        assert_eq!(json["page_title"], "T");
        assert_eq!(json["source_url"], "https://e.com");
        assert_eq!(json["navigation_links"][0]["children"][0]["text"], "B");
        assert!(json["footer_links"][0].get("children").is_none());
        assert!(record.to_markdown().ends_with("---\n\n"));
    }
}
