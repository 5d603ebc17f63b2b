use engine_logging::{engine_debug, engine_warn};
use scraper::{ElementRef, Selector};

use crate::dom::Document;

/// An ordered list of compiled selectors; the first one that matches wins.
#[derive(Debug, Clone)]
pub struct PatternChain {
    patterns: Vec<(String, Selector)>,
}

impl PatternChain {
    /// Compile `selectors` in order. Invalid selectors are logged and dropped.
    pub fn compile<S: AsRef<str>>(selectors: &[S]) -> Self {
        let patterns = selectors
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                match Selector::parse(raw) {
                    Ok(sel) => Some((raw.to_string(), sel)),
                    Err(err) => {
                        engine_warn!("skipping invalid selector {:?}: {:?}", raw, err);
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First element matching the highest-priority pattern that matches at
    /// all, together with that pattern's source text.
    pub fn first_match<'a>(&self, doc: &'a Document) -> Option<(&str, ElementRef<'a>)> {
        self.patterns.iter().find_map(|(raw, sel)| {
            doc.html()
                .select(sel)
                .next()
                .map(|element| (raw.as_str(), element))
        })
    }
}

/// Content fallback: the first container matched by `chain`, if any.
pub fn select_content<'a>(doc: &'a Document, chain: &PatternChain) -> Option<ElementRef<'a>> {
    match chain.first_match(doc) {
        Some((pattern, element)) => {
            engine_debug!("content container matched {:?}", pattern);
            Some(element)
        }
        None => {
            engine_debug!("no content container matched");
            None
        }
    }
}
