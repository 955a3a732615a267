//! Navigation composition: ancestor rows, sibling row, child row.
//!
//! Every page gets a layered navigation fragment derived from the shared
//! navigation table:
//!
//! ```text
//! <div id="navtree">
//!   <ul>…</ul>   ← one row per ancestor level, root-most first
//!   <ul>…</ul>   ← the page's own siblings, current page marked active
//!   <ul>…</ul>   ← the page's children
//! </div>
//! ```
//!
//! Each ancestor row shows that ancestor's *own* siblings, with exactly the
//! ancestor on the path to the current page marked active. Rows that would
//! be empty are omitted entirely.
//!
//! Ordering overrides come from front matter: [`reorder_children`] is a pure
//! function whose result the caller writes back into the navigation table,
//! so listings generated elsewhere observe the same order.

use crate::links::LinkTable;
use crate::scan::NavNode;
use maud::{Markup, html};
use std::collections::BTreeMap;

/// One entry in a navigation row.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub name: String,
    /// Whether this entry lies on the path to the current page.
    pub active: bool,
}

/// The layered navigation structure for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavView {
    /// Sibling groups of each ancestor, ordered root-most first.
    pub ancestors: Vec<Vec<NavEntry>>,
    /// The current page's own siblings (empty for the root).
    pub siblings: Vec<NavEntry>,
    /// The current page's children, in (possibly reordered) final order.
    pub children: Vec<String>,
}

/// Apply a metadata-declared ordering to an actual children list.
///
/// Declared names that exist among the actual children come first, in
/// declared order; the remaining actual children follow in their original
/// scan order. No duplicates, no drops:
///
/// ```text
/// actual [a, b, c] + declared [c, a]  →  [c, a, b]
/// ```
pub fn reorder_children(actual: &[String], declared: &[String]) -> Vec<String> {
    if declared.is_empty() {
        return actual.to_vec();
    }
    let mut ordered = Vec::with_capacity(actual.len());
    for name in declared {
        if actual.contains(name) && !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    for name in actual {
        if !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    ordered
}

/// Derive the navigation view for `name` from the navigation table.
///
/// The ancestor chain is walked upward from the page's parent until the
/// root sentinel. An ancestor with no recorded grandparent contributes a
/// silently empty row rather than an error.
pub fn compose(name: &str, navigation: &BTreeMap<String, NavNode>, root: &str) -> NavView {
    let Some(node) = navigation.get(name) else {
        return NavView::default();
    };

    let mut ancestors = Vec::new();
    let mut siblings = Vec::new();

    if let Some(parent) = &node.parent {
        siblings = sibling_row(navigation, parent, name);

        let mut current = parent.clone();
        while current != root {
            let grandparent = navigation.get(&current).and_then(|n| n.parent.clone());
            let row = match &grandparent {
                Some(g) => sibling_row(navigation, g, &current),
                None => Vec::new(),
            };
            ancestors.insert(0, row);
            match grandparent {
                Some(g) => current = g,
                None => break,
            }
        }
    }

    NavView {
        ancestors,
        siblings,
        children: node.children.clone(),
    }
}

/// The children of `parent`, each tagged active iff it equals `active_name`.
fn sibling_row(
    navigation: &BTreeMap<String, NavNode>,
    parent: &str,
    active_name: &str,
) -> Vec<NavEntry> {
    navigation
        .get(parent)
        .map(|node| {
            node.children
                .iter()
                .map(|child| NavEntry {
                    name: child.clone(),
                    active: child == active_name,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Render the navigation view as the `#navtree` HTML fragment.
///
/// Absent or empty rows are omitted entirely rather than rendered as empty
/// lists.
pub fn render_nav(view: &NavView, links: &LinkTable) -> Markup {
    html! {
        div #navtree {
            @for row in &view.ancestors {
                @if !row.is_empty() {
                    ul {
                        @for entry in row {
                            li {
                                a href=(links.href(&entry.name))
                                    class=[entry.active.then_some("active")] {
                                    (entry.name)
                                }
                            }
                        }
                    }
                }
            }
            @if !view.siblings.is_empty() {
                ul {
                    @for entry in &view.siblings {
                        li {
                            a href=(links.href(&entry.name))
                                class=[entry.active.then_some("active")] {
                                (entry.name)
                            }
                        }
                    }
                }
            }
            @if !view.children.is_empty() {
                ul {
                    @for child in &view.children {
                        li { a href=(links.href(child)) { (child) } }
                    }
                }
            }
        }
    }
}
