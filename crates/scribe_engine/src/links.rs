//! Link graph extraction from navigation and footer containers, plus the
//! href resolution shared with the renderer.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::{normalize_text, Fragment, LIST_TAGS};

/// One navigable item. `children` mirrors nested list structure and is
/// always empty for footer links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub text: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LinkEntry>,
}

impl LinkEntry {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            children: Vec::new(),
        }
    }
}

/// Resolve `reference` against `base` into an absolute URL string.
///
/// Returns `None` for blank references or ones that cannot be joined.
pub fn resolve_href(reference: &str, base: &Url) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.join(trimmed).ok().map(String::from)
}

/// Nested link graph of a navigation container: taken from the first
/// list (`ul`/`ol`/`dl`) below it.
pub fn extract_nested_links(container: ElementRef<'_>, base: &Url) -> Vec<LinkEntry> {
    let list = container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| LIST_TAGS.contains(&el.value().name()));
    match list {
        Some(list) => links_from_list(list, base),
        None => Vec::new(),
    }
}

fn links_from_list(list: ElementRef<'_>, base: &Url) -> Vec<LinkEntry> {
    let mut links = Vec::new();
    for item in child_elements(list).filter(|el| matches!(el.value().name(), "li" | "dt")) {
        let anchor = child_elements(item)
            .find(|el| el.value().name() == "a" && el.value().attr("href").is_some());
        let nested = child_elements(item).find(|el| LIST_TAGS.contains(&el.value().name()));

        match (anchor, nested) {
            (Some(anchor), nested) => {
                let Some(mut entry) = entry_for(anchor, base) else {
                    continue;
                };
                if let Some(nested) = nested {
                    entry.children = links_from_list(nested, base);
                }
                links.push(entry);
            }
            (None, Some(nested)) => links.extend(links_from_list(nested, base)),
            (None, None) => {}
        }
    }
    links
}

/// Every link under a footer container, in document order, flattened.
pub fn extract_flat_links(container: ElementRef<'_>, base: &Url) -> Vec<LinkEntry> {
    container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a" && el.value().attr("href").is_some())
        .filter_map(|anchor| entry_for(anchor, base))
        .collect()
}

fn entry_for(anchor: ElementRef<'_>, base: &Url) -> Option<LinkEntry> {
    let text = normalize_text(&anchor.text().collect::<String>());
    if text.is_empty() {
        return None;
    }
    let href = resolve_href(anchor.value().attr("href")?, base)?;
    Some(LinkEntry::new(text, href))
}

fn child_elements<'a>(parent: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    parent.children().filter_map(ElementRef::wrap)
}

/// Rewrite every `a[href]` in the fragment to an absolute URL. References
/// that cannot be resolved are left as they are.
pub fn absolutize_links(fragment: &mut Fragment, base: &Url) -> usize {
    let anchors = fragment.select_ids(fragment.root_id(), |node| {
        node.as_element()
            .is_some_and(|el| el.name() == "a" && el.attr("href").is_some())
    });
    let mut rewritten = 0;
    for id in anchors {
        fragment.update(id, |node| {
            if let Some(el) = node.as_element_mut() {
                let resolved = el.attr("href").and_then(|href| resolve_href(href, base));
                if let Some(resolved) = resolved {
                    el.set_attr("href", resolved);
                    rewritten += 1;
                }
            }
        });
    }
    rewritten
}
