//! Pluggable directive handlers. An extension contributes the attribute
//! names the activation scan matches on and a per-element `process` callback
//! invoked once per matching element per activation pass.
//!
//! Registration is not retroactive: elements already in the document when an
//! extension registers are only picked up by later `process`/
//! `process_subtree` calls. There is no backfill pass.

use dom::{DomTree, Id, Node, attrs};

use crate::data::{DataBag, DataStore};
use crate::timers::{Task, TimerQueue};

/// What an extension may reach during `init` and `process`: the live tree,
/// the timer queue, and the per-element data bags. Deliberately narrower
/// than the engine itself so extensions cannot re-enter activation.
pub struct ExtensionCx<'a> {
    pub(crate) tree: &'a mut DomTree,
    pub(crate) timers: &'a mut TimerQueue,
    pub(crate) data: &'a mut DataStore,
    pub(crate) now_ms: u64,
}

impl ExtensionCx<'_> {
    /// Directive attribute lookup with the `data-` fallback.
    pub fn attribute(&self, element: Id, name: &str) -> Option<String> {
        self.tree
            .find(element)
            .and_then(|node| attrs::get_attribute(node, name))
            .map(str::to_string)
    }

    pub fn tree(&mut self) -> &mut DomTree {
        &mut *self.tree
    }

    pub fn data(&mut self, element: Id) -> &mut DataBag {
        self.data.bag(element)
    }

    /// Run a DOM edit against `element` after `delay_ms` of virtual time.
    /// If the element has left the tree by then, the edit is dropped.
    pub fn schedule(
        &mut self,
        delay_ms: u64,
        element: Id,
        mutate: impl FnOnce(&mut Node) + 'static,
    ) {
        self.timers.schedule(
            self.now_ms + delay_ms,
            Task::Mutate {
                target: element,
                mutate: Box::new(mutate),
            },
        );
    }
}

pub trait Extension {
    fn name(&self) -> &str;

    /// Attribute names that make an element a match for this extension.
    /// `data-` aliases are implied, same as for built-in directives.
    fn attributes(&self) -> &[&str];

    /// Called once at registration.
    fn init(&mut self, _cx: &mut ExtensionCx<'_>) {}

    /// Called once per matching element per activation pass.
    fn process(&mut self, cx: &mut ExtensionCx<'_>, element: Id);
}

#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Box<dyn Extension>>,
}

impl ExtensionRegistry {
    pub(crate) fn register(&mut self, mut extension: Box<dyn Extension>, cx: &mut ExtensionCx<'_>) {
        log::debug!(target: "oyc.engine", "registering extension {:?}", extension.name());
        extension.init(cx);
        self.extensions.push(extension);
    }

    pub(crate) fn scan_attributes(&self) -> impl Iterator<Item = &str> {
        self.extensions
            .iter()
            .flat_map(|e| e.attributes().iter().copied())
    }

    /// Indices of extensions whose attributes are present on the node.
    pub(crate) fn matching(&self, node: &Node) -> Vec<usize> {
        self.extensions
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.attributes()
                    .iter()
                    .any(|attribute| attrs::has_attribute(node, attribute))
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn process(&mut self, index: usize, cx: &mut ExtensionCx<'_>, element: Id) {
        self.extensions[index].process(cx, element);
    }
}
