//! Parsed documents and owned fragments.
//!
//! A [`Document`] wraps the `scraper` parse of a page and is never mutated.
//! Everything that gets edited (noise removal, link rewriting, truncation)
//! happens on a [`Fragment`], an owned `ego_tree` built from copies of source
//! nodes.

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};

/// Tag names of list-like containers.
pub const LIST_TAGS: &[&str] = &["ul", "ol", "dl"];

/// Heading depth (1-6) for `h1`..`h6`, `None` for any other tag.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Tag-level view shared by source nodes and fragment nodes, so searches can
/// run over either tree.
pub trait MarkupNode {
    /// Lowercase tag name for elements, `None` for text and other leaves.
    fn tag_name(&self) -> Option<&str>;
}

impl MarkupNode for Node {
    fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|el| el.name())
    }
}

impl MarkupNode for DomNode {
    fn tag_name(&self) -> Option<&str> {
        match self {
            DomNode::Element(el) => Some(el.name()),
            DomNode::Text(_) => None,
        }
    }
}

/// First proper descendant of `node` (document order) satisfying `pred`.
///
/// Iterative pre-order walk with early exit; stack depth does not grow with
/// markup nesting.
pub fn find_descendant<'a, T, P>(node: NodeRef<'a, T>, pred: P) -> Option<NodeRef<'a, T>>
where
    T: MarkupNode,
    P: Fn(&T) -> bool,
{
    node.descendants().skip(1).find(|candidate| pred(candidate.value()))
}

/// Whitespace-normalized text: runs collapsed to a single space, trimmed.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A parsed HTML page. Parsing is best-effort and never fails.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Text of the first `<title>`, trimmed; `None` when missing or blank.
    pub fn title(&self) -> Option<String> {
        let sel = Selector::parse("title").ok()?;
        self.html
            .select(&sel)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// `content` of `<meta name="description">`, trimmed.
    pub fn description(&self) -> Option<String> {
        let sel = Selector::parse(r#"meta[name="description"]"#).ok()?;
        self.html
            .select(&sel)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }
}

/// Element payload inside a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Class list in source order, duplicates removed.
    pub fn classes(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for class in self.attr("class").unwrap_or_default().split_whitespace() {
            if !seen.contains(&class) {
                seen.push(class);
            }
        }
        seen
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// A node of a [`Fragment`]: an element or a text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(ElementData),
    Text(String),
}

impl DomNode {
    /// Copy the payload of a parsed node. Comments, doctypes and processing
    /// instructions have no counterpart and yield `None`.
    fn from_source(node: &Node) -> Option<Self> {
        match node {
            Node::Element(el) => Some(DomNode::Element(ElementData {
                name: el.name().to_string(),
                attrs: el
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })),
            Node::Text(text) => Some(DomNode::Text(String::from(&**text))),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            DomNode::Element(el) => Some(el),
            DomNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            DomNode::Element(el) => Some(el),
            DomNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DomNode::Text(text) => Some(text),
            DomNode::Element(_) => None,
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name() == Some(tag)
    }
}

/// An owned tree of copied nodes. Its root is always an element.
///
/// Nodes removed with [`Fragment::remove`] stay in the arena but are no
/// longer reachable from the root, so every traversal ignores them.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    tree: Tree<DomNode>,
}

impl Fragment {
    /// Empty synthetic container element.
    pub fn container(tag: &str) -> Self {
        Self {
            tree: Tree::new(DomNode::Element(ElementData::new(tag))),
        }
    }

    /// Deep copy of an element subtree. The copy shares nothing with the
    /// source tree.
    pub fn copy_of(source: ElementRef<'_>) -> Self {
        let root = DomNode::Element(ElementData {
            name: source.value().name().to_string(),
            attrs: source
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        let mut fragment = Self {
            tree: Tree::new(root),
        };
        let root_id = fragment.root_id();
        fragment.copy_children(*source, root_id);
        fragment
    }

    /// Parse a markup snippet into a `div` container holding its top-level
    /// nodes.
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_fragment(markup);
        let mut fragment = Self::container("div");
        let root_id = fragment.root_id();
        fragment.copy_children(*html.root_element(), root_id);
        fragment
    }

    pub fn root(&self) -> NodeRef<'_, DomNode> {
        self.tree.root()
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, DomNode>> {
        self.tree.get(id)
    }

    /// Apply `edit` to the value of node `id`, if it exists.
    pub fn update<F>(&mut self, id: NodeId, edit: F)
    where
        F: FnOnce(&mut DomNode),
    {
        if let Some(mut node) = self.tree.get_mut(id) {
            edit(node.value());
        }
    }

    /// Append a deep copy of a source node (element or text) under `parent`.
    /// Returns the id of the copy, or `None` for node kinds that are not
    /// copied (comments and the like) or an unknown parent.
    pub fn append_copy(&mut self, parent: NodeId, source: NodeRef<'_, Node>) -> Option<NodeId> {
        let value = DomNode::from_source(source.value())?;
        let id = self.tree.get_mut(parent)?.append(value).id();
        self.copy_children(source, id);
        Some(id)
    }

    fn copy_children(&mut self, source: NodeRef<'_, Node>, dest: NodeId) {
        let mut pending = vec![(source, dest)];
        while let Some((src, dst)) = pending.pop() {
            for child in src.children() {
                let Some(value) = DomNode::from_source(child.value()) else {
                    continue;
                };
                let Some(mut parent) = self.tree.get_mut(dst) else {
                    continue;
                };
                let id = parent.append(value).id();
                if child.has_children() {
                    pending.push((child, id));
                }
            }
        }
    }

    /// Detach a node (and its subtree) from its parent. Removing the root is
    /// a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Reachable descendants of `from` (inclusive) whose value satisfies
    /// `pred`, in document order.
    pub fn select_ids<P>(&self, from: NodeId, pred: P) -> Vec<NodeId>
    where
        P: Fn(&DomNode) -> bool,
    {
        self.tree
            .get(from)
            .map(|node| {
                node.descendants()
                    .filter(|n| pred(n.value()))
                    .map(|n| n.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Within the subtree at `within`, find the first proper descendant
    /// matching `pred`, then remove it together with every later sibling
    /// under the same parent. Content after that parent is kept. Returns
    /// whether anything was pruned.
    pub fn prune_from_first<P>(&mut self, within: NodeId, pred: P) -> bool
    where
        P: Fn(&DomNode) -> bool,
    {
        let doomed: Vec<NodeId> = match self
            .tree
            .get(within)
            .and_then(|node| find_descendant(node, &pred))
        {
            Some(first) => std::iter::once(first.id())
                .chain(first.next_siblings().map(|s| s.id()))
                .collect(),
            None => return false,
        };
        for id in doomed {
            self.remove(id);
        }
        true
    }

    /// Concatenated text of the reachable tree.
    pub fn text(&self) -> String {
        subtree_text(self.root())
    }
}

/// Concatenated text of every text leaf under `node`.
pub fn subtree_text(node: NodeRef<'_, DomNode>) -> String {
    node.descendants()
        .filter_map(|n| n.value().as_text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element<'a>(doc: &'a Document, tag: &str) -> ElementRef<'a> {
        doc.elements().find(|e| e.value().name() == tag).unwrap()
    }

    #[test]
    fn malformed_markup_still_parses() {
        let doc = Document::parse("<html><body><div><p>unclosed <b>bold</div></span><h2>Next");
        assert!(doc.elements().any(|e| e.value().name() == "h2"));
        assert!(doc.title().is_none());
    }

    #[test]
    fn copy_breaks_links_to_source() {
        let doc = Document::parse(r#"<div id="a"><p>one</p><p>two</p></div>"#);
        let div = first_element(&doc, "div");
        let mut copy = Fragment::copy_of(div);
        let ps = copy.select_ids(copy.root_id(), |n| n.is_tag("p"));
        assert_eq!(ps.len(), 2);
        copy.remove(ps[0]);
        assert_eq!(copy.text(), "two");
        // source untouched
        assert_eq!(div.text().collect::<String>(), "onetwo");
        assert!(copy.root().parent().is_none());
    }

    #[test]
    fn prune_stays_within_the_matched_parent() {
        let mut frag = Fragment::parse(
            "<div><p>keep</p><section><p>a</p><h2>stop</h2><p>b</p></section><p>tail</p></div><p>outside</p>",
        );
        let div = frag.select_ids(frag.root_id(), |n| n.is_tag("div"))[1];
        assert!(frag.prune_from_first(div, |n| n.is_tag("h2")));
        assert_eq!(frag.text(), "keepatailoutside");
        assert!(!frag.prune_from_first(div, |n| n.is_tag("h2")));
    }

    #[test]
    fn classes_are_ordered_and_deduplicated() {
        let mut el = ElementData::new("div");
        el.set_attr("class", "b a b  c");
        assert_eq!(el.classes(), vec!["b", "a", "c"]);
        assert!(el.has_class("c"));
        assert!(!el.has_class("d"));
    }

    #[test]
    fn find_descendant_skips_self() {
        let doc = Document::parse("<h2 id=x>t</h2>");
        let h2 = first_element(&doc, "h2");
        assert!(find_descendant(*h2, |n| n.tag_name() == Some("h2")).is_none());
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("header"), None);
    }
}
