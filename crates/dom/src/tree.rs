//! The live tree and the swap engine.
//!
//! `DomTree` owns the document root and the id counter. Swaps move parsed
//! fragment nodes into place without cloning, so nodes that are not replaced
//! keep their identity, and report exactly which elements entered and left
//! the tree so callers can activate the former and drop state for the latter.

use std::fmt;

use crate::builder::build_fragment;
use crate::serialize;
use crate::tokenizer::tokenize;
use crate::types::{Id, Node, NodeId, Token};

#[derive(Debug, PartialEq, Eq)]
pub enum SwapError {
    /// The target id is not in the tree (typically removed by an earlier
    /// swap while an exchange for it was still in flight).
    TargetDetached(Id),
    /// The target exists but cannot hold children or has no parent to swap
    /// within (text node, comment, the document root).
    InvalidTarget(Id),
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapError::TargetDetached(id) => write!(f, "swap target {} is detached", id.0),
            SwapError::InvalidTarget(id) => write!(f, "swap target {} cannot be swapped", id.0),
        }
    }
}

/// What a swap did: which top-level elements the fragment contributed (in
/// insertion order) and which elements left the tree.
#[derive(Debug, Default, PartialEq)]
pub struct SwapOutcome {
    pub inserted: Vec<Id>,
    pub removed: Vec<Id>,
}

/// Parse an HTML string as a fragment, as if inside a generic container.
/// Permissive: malformed input is never rejected. Node ids are unassigned
/// until the fragment enters a tree.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    build_fragment(tokenize(html))
}

pub struct DomTree {
    root: Node,
    next_id: NodeId,
}

impl DomTree {
    /// Parse a whole document. The permissive fragment builder applies:
    /// html/head/body appear in the tree only if the markup carries them.
    pub fn parse_document(html: &str) -> Self {
        let tokens = tokenize(html);
        let doctype = tokens.iter().find_map(|t| match t {
            Token::Doctype(s) => Some(s.clone()),
            _ => None,
        });
        let mut root = Node::Document {
            id: Id(0),
            doctype,
            children: build_fragment(tokens),
        };
        let mut next_id = 1;
        assign_ids(&mut root, &mut next_id);
        Self { root, next_id }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// First `<body>` element, the conventional bootstrap root.
    pub fn body(&self) -> Option<Id> {
        fn walk(node: &Node) -> Option<Id> {
            if node.name().is_some_and(|n| n.eq_ignore_ascii_case("body")) {
                return Some(node.id());
            }
            node.children().iter().find_map(walk)
        }
        walk(&self.root)
    }

    pub fn find(&self, id: Id) -> Option<&Node> {
        fn walk(node: &Node, id: Id) -> Option<&Node> {
            if node.id() == id {
                return Some(node);
            }
            node.children().iter().find_map(|c| walk(c, id))
        }
        walk(&self.root, id)
    }

    pub fn find_mut(&mut self, id: Id) -> Option<&mut Node> {
        let mut path = Vec::new();
        if !path_to(&self.root, id, &mut path) {
            return None;
        }
        let mut current = &mut self.root;
        for index in path {
            current = &mut current.children_mut()?[index];
        }
        Some(current)
    }

    /// First element (document order) matching the predicate. Convenience
    /// for hosts that need an id to dispatch against or swap into.
    pub fn find_element<F: FnMut(&Node) -> bool>(&self, mut predicate: F) -> Option<Id> {
        fn walk<F: FnMut(&Node) -> bool>(node: &Node, predicate: &mut F) -> Option<Id> {
            if node.is_element() && predicate(node) {
                return Some(node.id());
            }
            node.children()
                .iter()
                .find_map(|child| walk(child, predicate))
        }
        walk(&self.root, &mut predicate)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.find(id).is_some()
    }

    pub fn inner_html(&self, id: Id) -> Option<String> {
        self.find(id).map(serialize::inner_html)
    }

    pub fn outer_html(&self, id: Id) -> Option<String> {
        self.find(id).map(serialize::outer_html)
    }

    /// Replace the target element's children with the parsed fragment.
    /// An empty fragment empties the target; that is not an error.
    pub fn swap_inner(&mut self, target: Id, html: &str) -> Result<SwapOutcome, SwapError> {
        let fragment = self.adopt_fragment(html);
        let node = self
            .find_mut(target)
            .ok_or(SwapError::TargetDetached(target))?;
        let children = node
            .children_mut()
            .ok_or(SwapError::InvalidTarget(target))?;

        let mut outcome = SwapOutcome {
            inserted: top_level_element_ids(&fragment),
            removed: Vec::new(),
        };
        for old in children.iter() {
            collect_element_ids(old, &mut outcome.removed);
        }
        *children = fragment;
        log::debug!(
            target: "oyc.swap",
            "swap_inner target={} inserted={} removed={}",
            target.0,
            outcome.inserted.len(),
            outcome.removed.len()
        );
        Ok(outcome)
    }

    /// Replace the target element itself with the parsed fragment, splicing
    /// the fragment's nodes into the parent at the target's position. An
    /// empty fragment removes the target and puts nothing back.
    pub fn swap_outer(&mut self, target: Id, html: &str) -> Result<SwapOutcome, SwapError> {
        let fragment = self.adopt_fragment(html);

        let mut path = Vec::new();
        if !path_to(&self.root, target, &mut path) {
            return Err(SwapError::TargetDetached(target));
        }
        // The document root has no parent to splice within.
        let Some(target_index) = path.pop() else {
            return Err(SwapError::InvalidTarget(target));
        };
        let mut parent = &mut self.root;
        for index in path {
            parent = &mut parent.children_mut().expect("path steps through parents")[index];
        }
        let children = parent.children_mut().expect("parent holds the target");

        let mut outcome = SwapOutcome {
            inserted: top_level_element_ids(&fragment),
            removed: Vec::new(),
        };
        collect_element_ids(&children[target_index], &mut outcome.removed);
        children.splice(target_index..=target_index, fragment);
        log::debug!(
            target: "oyc.swap",
            "swap_outer target={} inserted={} removed={}",
            target.0,
            outcome.inserted.len(),
            outcome.removed.len()
        );
        Ok(outcome)
    }

    fn adopt_fragment(&mut self, html: &str) -> Vec<Node> {
        let mut fragment = parse_fragment(html);
        for node in &mut fragment {
            assign_ids(node, &mut self.next_id);
        }
        fragment
    }
}

fn assign_ids(node: &mut Node, next_id: &mut NodeId) {
    if node.id() == Id(0) {
        node.set_id(Id(*next_id));
        *next_id = next_id.wrapping_add(1);
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            assign_ids(child, next_id);
        }
    }
}

fn path_to(node: &Node, id: Id, path: &mut Vec<usize>) -> bool {
    if node.id() == id {
        return true;
    }
    for (index, child) in node.children().iter().enumerate() {
        path.push(index);
        if path_to(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn top_level_element_ids(fragment: &[Node]) -> Vec<Id> {
    fragment
        .iter()
        .filter(|n| n.is_element())
        .map(Node::id)
        .collect()
}

fn collect_element_ids(node: &Node, out: &mut Vec<Id>) {
    if node.is_element() {
        out.push(node.id());
    }
    for child in node.children() {
        collect_element_ids(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::get_attribute;

    fn first_element_named(tree: &DomTree, name: &str) -> Id {
        fn walk(node: &Node, name: &str) -> Option<Id> {
            if node.name() == Some(name) {
                return Some(node.id());
            }
            node.children().iter().find_map(|c| walk(c, name))
        }
        walk(tree.root(), name).expect("element present")
    }

    #[test]
    fn parse_document_assigns_unique_ids() {
        let tree = DomTree::parse_document("<body><div><p>x</p></div></body>");
        let mut seen = Vec::new();
        fn walk(node: &Node, seen: &mut Vec<Id>) {
            seen.push(node.id());
            for c in node.children() {
                walk(c, seen);
            }
        }
        walk(tree.root(), &mut seen);
        let mut deduped = seen.clone();
        deduped.sort_by_key(|id| id.0);
        deduped.dedup();
        assert_eq!(seen.len(), deduped.len(), "ids must be unique: {seen:?}");
    }

    #[test]
    fn body_is_found_when_present() {
        let tree = DomTree::parse_document("<html><body><p>x</p></body></html>");
        let body = tree.body().expect("body");
        assert_eq!(tree.find(body).and_then(Node::name), Some("body"));

        let bare = DomTree::parse_document("<p>x</p>");
        assert_eq!(bare.body(), None);
    }

    #[test]
    fn swap_inner_replaces_children_and_reports_insertions() {
        let mut tree = DomTree::parse_document("<body><div id=t><p>old</p></div></body>");
        let target = first_element_named(&tree, "div");
        let outcome = tree
            .swap_inner(target, "<span>a</span>text<span>b</span>")
            .expect("swap");
        assert_eq!(outcome.inserted.len(), 2, "text nodes are not reported");
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(
            tree.inner_html(target).as_deref(),
            Some("<span>a</span>text<span>b</span>")
        );
        // Inserted ids are live and in insertion order.
        let names: Vec<_> = outcome
            .inserted
            .iter()
            .map(|id| tree.find(*id).and_then(Node::name).unwrap().to_string())
            .collect();
        assert_eq!(names, ["span", "span"]);
    }

    #[test]
    fn swap_inner_with_empty_fragment_empties_target() {
        let mut tree = DomTree::parse_document("<body><div><p>old</p></div></body>");
        let target = first_element_named(&tree, "div");
        let outcome = tree.swap_inner(target, "").expect("swap");
        assert!(outcome.inserted.is_empty());
        assert_eq!(tree.inner_html(target).as_deref(), Some(""));
    }

    #[test]
    fn swap_inner_on_detached_target_fails() {
        let mut tree = DomTree::parse_document("<body><div><p>old</p></div></body>");
        let p = first_element_named(&tree, "p");
        let div = first_element_named(&tree, "div");
        tree.swap_inner(div, "").expect("swap");
        assert_eq!(tree.swap_inner(p, "<b>x</b>"), Err(SwapError::TargetDetached(p)));
    }

    #[test]
    fn swap_outer_preserves_sibling_identity() {
        let mut tree =
            DomTree::parse_document("<body><p id=a>a</p><p id=b>b</p><p id=c>c</p></body>");
        let a = first_element_named(&tree, "body");
        let siblings: Vec<Id> = tree.find(a).unwrap().children().iter().map(Node::id).collect();
        let (first, middle, last) = (siblings[0], siblings[1], siblings[2]);

        let outcome = tree
            .swap_outer(middle, "<em>new</em><strong>er</strong>")
            .expect("swap");
        assert_eq!(outcome.inserted.len(), 2);
        assert_eq!(outcome.removed, vec![middle]);

        // Untouched siblings keep their ids; the replacement sits between them.
        assert!(tree.contains(first));
        assert!(tree.contains(last));
        assert!(!tree.contains(middle));
        assert_eq!(
            tree.inner_html(a).as_deref(),
            Some("<p id=\"a\">a</p><em>new</em><strong>er</strong><p id=\"c\">c</p>")
        );
    }

    #[test]
    fn swap_outer_with_empty_fragment_removes_target() {
        let mut tree = DomTree::parse_document("<body><p>only</p></body>");
        let p = first_element_named(&tree, "p");
        let outcome = tree.swap_outer(p, "").expect("swap");
        assert!(outcome.inserted.is_empty());
        assert_eq!(outcome.removed, vec![p]);
        let body = first_element_named(&tree, "body");
        assert_eq!(tree.inner_html(body).as_deref(), Some(""));
    }

    #[test]
    fn swap_outer_of_document_root_is_invalid() {
        let mut tree = DomTree::parse_document("<p>x</p>");
        let root = tree.root().id();
        assert_eq!(
            tree.swap_outer(root, "<p>y</p>"),
            Err(SwapError::InvalidTarget(root))
        );
    }

    #[test]
    fn swap_is_idempotent_on_serialized_content() {
        let mut tree = DomTree::parse_document("<body><div>seed</div></body>");
        let target = first_element_named(&tree, "div");
        let html = "<p class=\"x\">same <b>thing</b></p>";
        tree.swap_inner(target, html).expect("first swap");
        let first = tree.inner_html(target).unwrap();
        tree.swap_inner(target, html).expect("second swap");
        let second = tree.inner_html(target).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, html);
    }

    #[test]
    fn directive_attributes_survive_fragment_adoption() {
        let mut tree = DomTree::parse_document("<body><div>seed</div></body>");
        let target = first_element_named(&tree, "div");
        let outcome = tree
            .swap_inner(target, r#"<button oyc-get="/next">more</button>"#)
            .expect("swap");
        let button = tree.find(outcome.inserted[0]).unwrap();
        assert_eq!(get_attribute(button, "oyc-get"), Some("/next"));
    }
}
