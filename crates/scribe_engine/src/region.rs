//! Region scoping: from an anchor element to the bounded content it names.
//!
//! A non-heading anchor is its own region. A heading anchor opens a section
//! that runs over its following siblings until a heading of the same or a
//! shallower level closes it. A sibling that merely *contains* such a
//! heading ends the walk: that heading and its later siblings under the same
//! parent are dropped from the copy, the rest of the sibling is kept.
//!
//! Only siblings are inspected, never the anchor's ancestors: when nothing
//! closes the section, it captures everything to the end of the anchor's
//! own container.

use engine_logging::engine_debug;
use scraper::{ElementRef, Node};

use crate::dom::{
    find_descendant, heading_level, normalize_text, subtree_text, DomNode, Fragment, MarkupNode,
};

/// How a region was bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// The whole subtree of a single element.
    Subtree,
    /// A synthetic container spliced from a heading and its siblings.
    Section { level: u8 },
}

/// An extracted content region. Owns copies of the nodes it holds; editing
/// it never touches the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    fragment: Fragment,
    kind: RegionKind,
}

impl Region {
    /// Region made of a copy of the entire subtree at `element`.
    pub fn subtree(element: ElementRef<'_>) -> Self {
        Self {
            fragment: Fragment::copy_of(element),
            kind: RegionKind::Subtree,
        }
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn fragment_mut(&mut self) -> &mut Fragment {
        &mut self.fragment
    }

    pub fn into_fragment(self) -> Fragment {
        self.fragment
    }

    /// Whitespace-normalized text of the first `h1`-`h3` in the region.
    pub fn leading_heading_text(&self) -> Option<String> {
        self.fragment
            .root()
            .descendants()
            .find(|n| n.value().tag_name().and_then(heading_level).is_some_and(|l| l <= 3))
            .map(|heading| normalize_text(&subtree_text(heading)))
            .filter(|text| !text.is_empty())
    }
}

/// Compute the region for `anchor`.
pub fn scope_region(anchor: ElementRef<'_>) -> Region {
    let Some(level) = heading_level(anchor.value().name()) else {
        return Region::subtree(anchor);
    };

    let closes = |tag: &str| heading_level(tag).is_some_and(|l| l <= level);
    let is_stop = |node: &Node| node.tag_name().is_some_and(closes);
    let is_stop_copy = |node: &DomNode| node.tag_name().is_some_and(closes);

    let mut fragment = Fragment::container("div");
    let root = fragment.root_id();
    fragment.append_copy(root, *anchor);

    let mut taken = 0usize;
    for sibling in anchor.next_siblings() {
        match sibling.value() {
            Node::Text(_) => {
                fragment.append_copy(root, sibling);
            }
            Node::Element(el) if closes(el.name()) => {
                engine_debug!("section h{} closed by sibling <{}>", level, el.name());
                break;
            }
            Node::Element(el) => {
                if find_descendant(sibling, is_stop).is_some() {
                    if let Some(copy) = fragment.append_copy(root, sibling) {
                        fragment.prune_from_first(copy, is_stop_copy);
                    }
                    taken += 1;
                    engine_debug!(
                        "section h{} truncated inside sibling <{}>",
                        level,
                        el.name()
                    );
                    break;
                }
                fragment.append_copy(root, sibling);
                taken += 1;
            }
            _ => {}
        }
    }
    engine_debug!("section h{} spans {} sibling element(s)", level, taken);

    Region {
        fragment,
        kind: RegionKind::Section { level },
    }
}
