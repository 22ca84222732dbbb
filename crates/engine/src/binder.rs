//! The binding table: which element reacts to which event, how.
//!
//! Bindings are re-derived from attributes at activation time and owned by
//! the table keyed on element id; when an element leaves the tree the engine
//! drops its entry, the headless analogue of listeners being collected with
//! their element. Modifier interpretation happens at dispatch time, in the
//! engine, not here.

use std::collections::HashMap;

use dom::Id;
use net::Method;
use trigger::ModifierSet;

/// What firing a binding does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Perform an HTTP exchange and swap the response into the event target.
    Exchange { method: Method, url: String },
    /// Invoke a named handler from the engine's handler registry.
    Invoke { handler: String },
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub event: String,
    pub modifiers: ModifierSet,
    pub action: Action,
    /// Identity for targeted removal (`once`); assigned by the table.
    pub(crate) seq: u64,
}

#[derive(Default)]
pub struct Bindings {
    map: HashMap<Id, Vec<Binding>>,
    next_seq: u64,
}

impl Bindings {
    pub fn bind(&mut self, element: Id, event: String, modifiers: ModifierSet, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.map.entry(element).or_default().push(Binding {
            event,
            modifiers,
            action,
            seq,
        });
    }

    /// Remove every binding on `element` for `event`.
    pub fn unbind(&mut self, element: Id, event: &str) {
        if let Some(bindings) = self.map.get_mut(&element) {
            bindings.retain(|b| b.event != event);
            if bindings.is_empty() {
                self.map.remove(&element);
            }
        }
    }

    pub(crate) fn remove_seq(&mut self, element: Id, seq: u64) {
        if let Some(bindings) = self.map.get_mut(&element) {
            bindings.retain(|b| b.seq != seq);
            if bindings.is_empty() {
                self.map.remove(&element);
            }
        }
    }

    pub(crate) fn matching(&self, element: Id, event: &str) -> Vec<Binding> {
        self.map
            .get(&element)
            .map(|bindings| {
                bindings
                    .iter()
                    .filter(|b| b.event == event)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn drop_element(&mut self, element: Id) {
        self.map.remove(&element);
    }

    pub fn count(&self, element: Id) -> usize {
        self.map.get(&element).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
