use scraper::ElementRef;

use crate::dom::Document;

/// First element (document order) whose `id` attribute equals `identifier`.
pub fn find_anchor<'a>(doc: &'a Document, identifier: &str) -> Option<ElementRef<'a>> {
    if identifier.is_empty() {
        return None;
    }
    doc.elements().find(|el| el.value().id() == Some(identifier))
}
