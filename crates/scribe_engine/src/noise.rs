use ego_tree::NodeId;
use engine_logging::engine_debug;

use crate::dom::Fragment;

/// Remove presentational clutter from a fragment before rendering:
/// "jump to heading" decorator links carrying `header_link_class`, and badge
/// images whose `alt` contains `badge_marker`. A badge wrapped directly in a
/// link takes the link with it.
///
/// Returns the number of subtrees removed.
pub fn strip_noise(fragment: &mut Fragment, header_link_class: &str, badge_marker: &str) -> usize {
    let root = fragment.root_id();
    let mut removed = 0;

    let decorators = fragment.select_ids(root, |node| {
        node.as_element()
            .is_some_and(|el| el.name() == "a" && el.has_class(header_link_class))
    });
    for id in decorators {
        if id != root {
            fragment.remove(id);
            removed += 1;
        }
    }

    let badges = fragment.select_ids(root, |node| {
        node.as_element().is_some_and(|el| {
            el.name() == "img" && el.attr("alt").is_some_and(|alt| alt.contains(badge_marker))
        })
    });
    for id in badges {
        let Some(img) = fragment.get(id) else {
            continue;
        };
        let target = match img.parent() {
            Some(parent) if parent.value().is_tag("a") => parent.id(),
            _ => id,
        };
        if target == root || !is_attached(fragment, target) {
            continue;
        }
        fragment.remove(target);
        removed += 1;
    }

    engine_debug!("noise filter removed {} node(s)", removed);
    removed
}

fn is_attached(fragment: &Fragment, id: NodeId) -> bool {
    let root = fragment.root_id();
    fragment
        .get(id)
        .is_some_and(|node| node.ancestors().any(|a| a.id() == root))
}
