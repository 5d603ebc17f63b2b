/// Structural patterns and noise markers used by the page extractor.
///
/// Selector lists are tried in order; the first selector with a match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Content containers, landmark/role patterns first, bare `body` last.
    pub content_selectors: Vec<String>,
    /// Navigation containers feeding the nested link graph.
    pub nav_selectors: Vec<String>,
    /// Container feeding the flat footer link list.
    pub footer_selector: String,
    /// Class marking in-text "jump to heading" decorator links.
    pub header_link_class: String,
    /// Substring of `alt` text that marks a badge/shield image.
    pub badge_alt_marker: String,
    /// Title used when the page has no `<title>`.
    pub untitled: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            content_selectors: to_owned(&[
                "main .md-content",
                "main.VPContent",
                "main#content",
                "main article",
                r#"div[role="main"]"#,
                "div.book",
                "div.body",
                "article",
                "main",
                "div#main",
                "div.main-content",
                "div#content",
                "div.content",
                "body",
            ]),
            nav_selectors: to_owned(&[
                r#"div[role="navigation"]"#,
                "nav.md-nav--primary",
                "aside.VPSidebar",
                "nav.sidebar-container",
                "aside.theme-doc-sidebar-container-mobile",
                "div.toc",
                r#"nav[aria-label="Main"]"#,
                "nav#main-nav",
                ".bd-sidebar-primary",
                "nav#bd-docs-nav",
                "div.wy-menu-vertical",
                r#"div[class*="sidebar"]"#,
                r#"div[id*="sidebar"]"#,
                "nav",
            ]),
            footer_selector: "footer".to_string(),
            header_link_class: "headerlink".to_string(),
            badge_alt_marker: "Badge".to_string(),
            untitled: "No Title Found".to_string(),
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
