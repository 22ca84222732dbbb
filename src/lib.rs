//! oyc: declarative HTML behavior driven by directive attributes.
//!
//! Elements opt into behavior through `oyc-*` attributes (`data-oyc-*`
//! works everywhere): `oyc-get="/url"` and friends issue an HTTP exchange
//! on an event and swap the response body into the element, `oyc-trigger`
//! picks the event and its modifiers, `oyc-on:<event>="name"` invokes a
//! registered handler, and `oyc-ignore` fences a subtree off entirely.
//! Content swapped in by an exchange is activated recursively, so
//! server-returned HTML keeps working without any host-side glue.
//!
//! The engine is headless and deterministic: events arrive through
//! [`Oyc::dispatch`] and time passes only through [`Oyc::advance`].
//!
//! ```no_run
//! use oyc::Oyc;
//!
//! let mut app = Oyc::new();
//! app.load(r#"<body><button oyc-get="/fragment">load</button></body>"#);
//! let button = app
//!     .tree()
//!     .find_element(|n| n.name() == Some("button"))
//!     .unwrap();
//! app.dispatch(button, "click").unwrap();
//! ```

pub use dom::{DomTree, Id, Node, SwapError, SwapOutcome};
pub use engine::ext::class::ClassExtension;
pub use engine::{
    Action, DataBag, DispatchSummary, Engine, EngineError, Event, Extension, ExtensionCx,
    Handler, IGNORE_ATTRIBUTE, TRIGGER_ATTRIBUTE,
};
pub use net::{HttpTransport, Method, Response, Transport, TransportError};
pub use trigger::{ModifierSet, TriggerDescriptor, parse_interval, parse_trigger};

/// The assembled engine. [`Oyc::new`] wires in the real HTTP transport;
/// hosts and tests that need scripted responses use [`Oyc::with_transport`].
pub struct Oyc<T: Transport = HttpTransport> {
    engine: Engine<T>,
}

impl Oyc<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl Default for Oyc<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Oyc<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            engine: Engine::new(transport),
        }
    }

    /// Load a document and activate it, starting from `<body>`.
    pub fn load(&mut self, html: &str) {
        self.engine.load(html);
    }

    pub fn tree(&self) -> &DomTree {
        self.engine.tree()
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        self.engine.tree_mut()
    }

    /// Activate exactly this element.
    pub fn process(&mut self, element: Id) {
        self.engine.process(element);
    }

    /// Activate this element and its matching descendants.
    pub fn process_subtree(&mut self, root: Id) {
        self.engine.process_subtree(root);
    }

    pub fn register_handler(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&mut DomTree, &Event) + 'static,
    ) {
        self.engine.register_handler(name, handler);
    }

    pub fn register_extension(&mut self, extension: Box<dyn Extension>) {
        self.engine.register_extension(extension);
    }

    /// Attach a binding directly, outside the attribute scan.
    pub fn on(&mut self, element: Id, event: &str, modifiers: ModifierSet, action: Action) {
        self.engine.bind(element, event, modifiers, action);
    }

    /// Remove every binding on `element` for `event`.
    pub fn off(&mut self, element: Id, event: &str) {
        self.engine.unbind(element, event);
    }

    /// Per-element scratch storage, created on first access.
    pub fn data(&mut self, element: Id) -> &mut DataBag {
        self.engine.data(element)
    }

    /// Deliver an event to an element.
    pub fn dispatch(&mut self, target: Id, event: &str) -> Result<DispatchSummary, EngineError> {
        self.engine.dispatch(target, event)
    }

    /// Advance the virtual clock by `ms` and run everything that comes due.
    pub fn advance(&mut self, ms: u64) -> Result<(), EngineError> {
        self.engine.advance(ms)
    }

    pub fn now_ms(&self) -> u64 {
        self.engine.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.engine.pending_timers()
    }
}
