pub mod ext;

mod binder;
mod data;
mod engine;
mod registry;
mod timers;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::binder::Action;
pub use crate::data::{DataBag, DataStore};
pub use crate::engine::{
    DispatchSummary, Engine, EngineError, Event, Handler, IGNORE_ATTRIBUTE, TRIGGER_ATTRIBUTE,
};
pub use crate::registry::{Extension, ExtensionCx, ExtensionRegistry};
