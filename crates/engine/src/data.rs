//! Per-element data bags for extensions that need to stash state on an
//! element. Engine-owned and keyed by element id instead of an expando
//! property on the node, so a bag disappears with its element.

use std::collections::HashMap;

use dom::Id;

pub type DataBag = HashMap<String, String>;

#[derive(Default)]
pub struct DataStore {
    bags: HashMap<Id, DataBag>,
}

impl DataStore {
    /// The element's bag, created empty on first access.
    pub fn bag(&mut self, element: Id) -> &mut DataBag {
        self.bags.entry(element).or_default()
    }

    pub fn get(&self, element: Id) -> Option<&DataBag> {
        self.bags.get(&element)
    }

    pub fn remove(&mut self, element: Id) {
        self.bags.remove(&element);
    }

    pub fn clear(&mut self) {
        self.bags.clear();
    }
}
