//! The activation engine: scans a subtree for directive-bearing elements,
//! attaches HTTP-triggering and named-handler bindings, performs exchanges,
//! and re-activates whatever a swap inserts — the recursive loop that keeps
//! directives in server-returned HTML working.

use std::collections::{HashMap, HashSet};
use std::fmt;

use dom::{DomTree, Id, Node, SwapError, attrs};
use net::{METHODS, Transport, TransportError};
use trigger::{ModifierSet, TriggerDescriptor, parse_trigger};

use crate::binder::{Action, Bindings};
use crate::data::{DataBag, DataStore};
use crate::registry::{Extension, ExtensionCx, ExtensionRegistry};
use crate::timers::{Task, TimerQueue};

pub const IGNORE_ATTRIBUTE: &str = "oyc-ignore";
pub const TRIGGER_ATTRIBUTE: &str = "oyc-trigger";

const ON_PREFIX: &str = "oyc-on:";
const DATA_ON_PREFIX: &str = "data-oyc-on:";

fn default_trigger() -> TriggerDescriptor {
    TriggerDescriptor {
        event: "click".to_string(),
        modifiers: ModifierSet::default(),
    }
}

/// A delivered interaction. Headless stand-in for the browser event object;
/// `target` is the element the interaction happened on.
#[derive(Clone, Debug)]
pub struct Event {
    pub name: String,
    pub target: Id,
}

pub type Handler = Box<dyn FnMut(&mut DomTree, &Event)>;

#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    /// `throttle`/`debounce` are parsed but firing them is a feature gap;
    /// fail loudly instead of silently degrading to `delay`.
    NotImplemented(&'static str),
    Transport(TransportError),
    Swap(SwapError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotImplemented(what) => write!(f, "{what} is not yet implemented"),
            EngineError::Transport(e) => e.fmt(f),
            EngineError::Swap(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<TransportError> for EngineError {
    fn from(e: TransportError) -> Self {
        EngineError::Transport(e)
    }
}

impl From<SwapError> for EngineError {
    fn from(e: SwapError) -> Self {
        EngineError::Swap(e)
    }
}

/// What one `dispatch` call did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Actions run synchronously during the dispatch.
    pub fired: usize,
    /// Actions deferred by a `delay` modifier.
    pub scheduled: usize,
    /// A matched binding carried the `prevent` modifier.
    pub default_prevented: bool,
}

pub struct Engine<T: Transport> {
    tree: DomTree,
    bindings: Bindings,
    data: DataStore,
    timers: TimerQueue,
    registry: ExtensionRegistry,
    handlers: HashMap<String, Handler>,
    /// Elements whose self-processing already ran. Activation is additive
    /// and never re-derives listeners in place, so this guard makes
    /// "never reprocess the same node" explicit instead of implicit.
    processed: HashSet<Id>,
    /// Same guard for the separate `oyc-on` binding pass.
    on_bound: HashSet<Id>,
    now_ms: u64,
    transport: T,
}

impl<T: Transport> Engine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            tree: DomTree::parse_document(""),
            bindings: Bindings::default(),
            data: DataStore::default(),
            timers: TimerQueue::default(),
            registry: ExtensionRegistry::default(),
            handlers: HashMap::new(),
            processed: HashSet::new(),
            on_bound: HashSet::new(),
            now_ms: 0,
            transport,
        }
    }

    /// Parse a document and run the bootstrap activation pass over `<body>`
    /// (or over every top-level element when the markup carries no body).
    /// Replaces any previously loaded document and its engine state.
    pub fn load(&mut self, html: &str) {
        self.tree = DomTree::parse_document(html);
        self.bindings.clear();
        self.data.clear();
        self.timers.clear();
        self.processed.clear();
        self.on_bound.clear();

        match self.tree.body() {
            Some(body) => self.process_subtree(body),
            None => {
                let roots: Vec<Id> = self
                    .tree
                    .root()
                    .children()
                    .iter()
                    .filter(|n| n.is_element())
                    .map(Node::id)
                    .collect();
                for id in roots {
                    self.process_subtree(id);
                }
            }
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Per-element data bag (`getOycData`).
    pub fn data(&mut self, element: Id) -> &mut DataBag {
        self.data.bag(element)
    }

    /// Register a named handler that `oyc-on:<event>="name"` can resolve.
    /// The explicit replacement for global-scope function lookup.
    pub fn register_handler(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&mut DomTree, &Event) + 'static,
    ) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Register an extension. Only future activation passes see its
    /// attributes; existing elements are not retroactively scanned.
    pub fn register_extension(&mut self, extension: Box<dyn Extension>) {
        let Self {
            tree,
            timers,
            data,
            now_ms,
            registry,
            ..
        } = self;
        let mut cx = ExtensionCx {
            tree,
            timers,
            data,
            now_ms: *now_ms,
        };
        registry.register(extension, &mut cx);
    }

    /// Directly attach a binding (the re-exported `on` of the public API).
    pub fn bind(&mut self, element: Id, event: &str, modifiers: ModifierSet, action: Action) {
        self.bindings.bind(element, event.to_string(), modifiers, action);
    }

    /// Remove every binding on `element` for `event` (the re-exported `off`).
    pub fn unbind(&mut self, element: Id, event: &str) {
        self.bindings.unbind(element, event);
    }

    /// Attach behavior to exactly this element: HTTP-method directives and
    /// extension directives. Idempotent; a second call is a no-op.
    pub fn process(&mut self, element: Id) {
        if self.processed.contains(&element) {
            return;
        }
        let Some(node) = self.tree.find(element) else {
            log::warn!(target: "oyc.engine", "process: element {} not in tree", element.0);
            return;
        };
        if !node.is_element() {
            return;
        }

        let descriptor = attrs::get_attribute(node, TRIGGER_ATTRIBUTE).and_then(parse_trigger);
        let mut exchanges = Vec::new();
        for method in METHODS {
            let attribute = format!("oyc-{}", method.directive_suffix());
            if let Some(url) = attrs::get_attribute(node, &attribute) {
                exchanges.push((method, url.to_string()));
            }
        }
        let extension_matches = self.registry.matching(node);

        for (method, url) in exchanges {
            let TriggerDescriptor { event, modifiers } =
                descriptor.clone().unwrap_or_else(default_trigger);
            self.bindings
                .bind(element, event, modifiers, Action::Exchange { method, url });
        }
        self.processed.insert(element);

        for index in extension_matches {
            let Self {
                tree,
                timers,
                data,
                now_ms,
                registry,
                ..
            } = self;
            let mut cx = ExtensionCx {
                tree,
                timers,
                data,
                now_ms: *now_ms,
            };
            registry.process(index, &mut cx, element);
        }
    }

    /// Attach behavior to the element and all matching descendants.
    ///
    /// Pass order: ignore guard, self-processing, descendant scan over the
    /// combined directive attribute set, then the `oyc-on` pass for the
    /// whole subtree — so `oyc-on` bindings land after (and independent of)
    /// the default HTTP-trigger bindings.
    pub fn process_subtree(&mut self, root: Id) {
        let Some(node) = self.tree.find(root) else {
            log::warn!(target: "oyc.engine", "process_subtree: element {} not in tree", root.0);
            return;
        };
        if attrs::has_attribute(node, IGNORE_ATTRIBUTE) {
            log::debug!(target: "oyc.engine", "skipping ignored subtree at {}", root.0);
            return;
        }

        let scan: Vec<String> = METHODS
            .iter()
            .map(|m| format!("oyc-{}", m.directive_suffix()))
            .chain([TRIGGER_ATTRIBUTE.to_string()])
            .chain(self.registry.scan_attributes().map(str::to_string))
            .collect();

        let mut matches = Vec::new();
        collect_directive_elements(node, &scan, &mut matches);

        self.process(root);
        for element in matches {
            self.process(element);
        }

        let mut on_elements = Vec::new();
        if let Some(node) = self.tree.find(root) {
            collect_on_elements(node, &mut on_elements);
        }
        for (element, on_handlers) in on_elements {
            self.bind_on_handlers(element, on_handlers);
        }
    }

    fn bind_on_handlers(&mut self, element: Id, on_handlers: Vec<(String, String)>) {
        if !self.on_bound.insert(element) {
            return;
        }
        let descriptor = self
            .tree
            .find(element)
            .and_then(|node| attrs::get_attribute(node, TRIGGER_ATTRIBUTE))
            .and_then(parse_trigger);
        for (event, handler) in on_handlers {
            // A trigger descriptor on the element overrides the event named
            // in the attribute, same as for HTTP directives.
            let (event, modifiers) = match &descriptor {
                Some(d) => (d.event.clone(), d.modifiers.clone()),
                None => (event, ModifierSet::default()),
            };
            self.bindings
                .bind(element, event, modifiers, Action::Invoke { handler });
        }
    }

    /// Deliver an interaction to an element. Runs (or schedules) every
    /// matching binding.
    ///
    /// `throttle`/`debounce` on a matched binding and transport or swap
    /// failures surface here; directive-parsing problems never do.
    pub fn dispatch(&mut self, target: Id, event: &str) -> Result<DispatchSummary, EngineError> {
        let matched = self.bindings.matching(target, event);
        let mut summary = DispatchSummary::default();

        for binding in matched {
            if binding.modifiers.throttle.is_some() {
                return Err(EngineError::NotImplemented("throttle"));
            }
            if binding.modifiers.debounce.is_some() {
                return Err(EngineError::NotImplemented("debounce"));
            }
            if binding.modifiers.prevent {
                summary.default_prevented = true;
            }
            if binding.modifiers.once {
                self.bindings.remove_seq(target, binding.seq);
            }
            match binding.modifiers.delay {
                Some(delay) => {
                    self.timers.schedule(
                        self.now_ms + delay,
                        Task::Fire {
                            target,
                            event: binding.event,
                            action: binding.action,
                        },
                    );
                    summary.scheduled += 1;
                }
                None => {
                    self.run_action(target, event, binding.action)?;
                    summary.fired += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Advance the virtual clock and run everything that comes due,
    /// including tasks scheduled by tasks.
    pub fn advance(&mut self, ms: u64) -> Result<(), EngineError> {
        self.now_ms += ms;
        loop {
            let due = self.timers.take_due(self.now_ms);
            if due.is_empty() {
                return Ok(());
            }
            for task in due {
                match task {
                    Task::Fire {
                        target,
                        event,
                        action,
                    } => self.run_action(target, &event, action)?,
                    Task::Mutate { target, mutate } => match self.tree.find_mut(target) {
                        Some(node) => mutate(node),
                        None => log::debug!(
                            target: "oyc.engine",
                            "dropping scheduled edit for detached element {}",
                            target.0
                        ),
                    },
                }
            }
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn run_action(&mut self, target: Id, event: &str, action: Action) -> Result<(), EngineError> {
        match action {
            Action::Exchange { method, url } => {
                let response = self.transport.exchange(method, &url)?;
                if !response.ok() {
                    // Deliberate: a non-success response leaves the DOM
                    // untouched. See DESIGN.md on the failure-UX question.
                    log::warn!(
                        target: "oyc.fetch",
                        "{method} {url} -> {}: response discarded",
                        response.status
                    );
                    return Ok(());
                }
                let outcome = self.tree.swap_inner(target, &response.body)?;
                self.forget(&outcome.removed);
                for inserted in outcome.inserted {
                    self.process_subtree(inserted);
                }
                Ok(())
            }
            Action::Invoke { handler } => {
                let Self { handlers, tree, .. } = self;
                match handlers.get_mut(&handler) {
                    Some(callback) => {
                        let event = Event {
                            name: event.to_string(),
                            target,
                        };
                        callback(tree, &event);
                    }
                    None => log::warn!(
                        target: "oyc.engine",
                        "no handler named {handler:?} registered"
                    ),
                }
                Ok(())
            }
        }
    }

    /// Drop engine state for elements that left the tree.
    fn forget(&mut self, removed: &[Id]) {
        for &element in removed {
            self.bindings.drop_element(element);
            self.data.remove(element);
            self.processed.remove(&element);
            self.on_bound.remove(&element);
        }
    }
}


/// Descendants of `node` (not `node` itself) carrying any scan attribute,
/// in document order, pruning subtrees opted out with `oyc-ignore`.
fn collect_directive_elements(node: &Node, scan: &[String], out: &mut Vec<Id>) {
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if attrs::has_attribute(child, IGNORE_ATTRIBUTE) {
            continue;
        }
        if scan.iter().any(|a| attrs::has_attribute(child, a)) {
            out.push(child.id());
        }
        collect_directive_elements(child, scan, out);
    }
}

/// `node` and descendants carrying `oyc-on:*` attributes. This scan reads
/// raw attribute names because the event is embedded in the name, which the
/// fixed-attribute scan above cannot express.
fn collect_on_elements(node: &Node, out: &mut Vec<(Id, Vec<(String, String)>)>) {
    if node.is_element() {
        let on_handlers: Vec<(String, String)> = node
            .attributes()
            .iter()
            .filter_map(|(name, value)| {
                let event = name
                    .strip_prefix(ON_PREFIX)
                    .or_else(|| name.strip_prefix(DATA_ON_PREFIX))?;
                Some((event.to_string(), value.clone().unwrap_or_default()))
            })
            .collect();
        if !on_handlers.is_empty() {
            out.push((node.id(), on_handlers));
        }
    }
    for child in node.children() {
        if child.is_element() && attrs::has_attribute(child, IGNORE_ATTRIBUTE) {
            continue;
        }
        collect_on_elements(child, out);
    }
}
