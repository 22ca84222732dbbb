//! `oyc-class`: timed class-list operations.
//!
//! The attribute value consists of runs separated by `&`. Within a run, `,`
//! separates operations, each `add|remove|toggle:<class>[:<interval>]`.
//! Operations in a run apply sequentially with their delays accumulated;
//! runs are independent of each other.

use dom::{Id, Node, attrs};
use trigger::parse_interval;

use crate::registry::{Extension, ExtensionCx};

pub const CLASS_ATTRIBUTE: &str = "oyc-class";

pub struct ClassExtension;

impl Extension for ClassExtension {
    fn name(&self) -> &str {
        "class"
    }

    fn attributes(&self) -> &[&str] {
        &[CLASS_ATTRIBUTE]
    }

    fn process(&mut self, cx: &mut ExtensionCx<'_>, element: Id) {
        let Some(value) = cx.attribute(element, CLASS_ATTRIBUTE) else {
            return;
        };
        for run in value.split('&') {
            let mut total_delay = 0u64;
            for operation in run.split(',') {
                let operation = operation.trim();
                if operation.is_empty() {
                    continue;
                }
                let mut parts = operation.splitn(3, ':');
                let action = parts.next().unwrap_or_default();
                let Some(class) = parts.next() else {
                    log::warn!(
                        target: "oyc.class",
                        "class operation without a class name: {operation:?}"
                    );
                    continue;
                };
                total_delay += parts
                    .next()
                    .map(|interval| parse_interval(interval).unwrap_or(0))
                    .unwrap_or(0);

                let apply: fn(&mut Node, &str) = match action {
                    "add" => attrs::add_class,
                    "remove" => attrs::remove_class,
                    "toggle" => attrs::toggle_class,
                    _ => {
                        log::warn!(
                            target: "oyc.class",
                            "unknown class operation {action:?} in {operation:?}"
                        );
                        continue;
                    }
                };
                let class = class.to_string();
                cx.schedule(total_delay, element, move |node| apply(node, &class));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::test_support::ScriptedTransport;
    use dom::attrs::get_attribute;

    fn engine_with(html: &str) -> Engine<ScriptedTransport> {
        let mut engine = Engine::new(ScriptedTransport::empty());
        engine.register_extension(Box::new(ClassExtension));
        engine.load(html);
        engine
    }

    #[test]
    fn add_operation_applies_after_its_delay() {
        let mut engine =
            engine_with(r#"<body><div oyc-class="add:highlight:100ms">x</div></body>"#);
        let div = engine.tree().find_element(|n| n.name() == Some("div")).unwrap();

        engine.advance(99).unwrap();
        assert_eq!(
            get_attribute(engine.tree().find(div).unwrap(), "class"),
            None
        );
        engine.advance(1).unwrap();
        assert_eq!(
            get_attribute(engine.tree().find(div).unwrap(), "class"),
            Some("highlight")
        );
    }

    #[test]
    fn delays_accumulate_within_a_run() {
        let mut engine = engine_with(
            r#"<body><div oyc-class="add:a:100ms,remove:a:100ms">x</div></body>"#,
        );
        let div = engine.tree().find_element(|n| n.name() == Some("div")).unwrap();

        engine.advance(100).unwrap();
        assert_eq!(get_attribute(engine.tree().find(div).unwrap(), "class"), Some("a"));
        engine.advance(100).unwrap();
        assert_eq!(get_attribute(engine.tree().find(div).unwrap(), "class"), None);
    }

    #[test]
    fn runs_are_independent() {
        let mut engine = engine_with(
            r#"<body><div oyc-class="add:a:200ms&add:b:100ms">x</div></body>"#,
        );
        let div = engine.tree().find_element(|n| n.name() == Some("div")).unwrap();

        engine.advance(100).unwrap();
        assert_eq!(get_attribute(engine.tree().find(div).unwrap(), "class"), Some("b"));
        engine.advance(100).unwrap();
        assert_eq!(
            get_attribute(engine.tree().find(div).unwrap(), "class"),
            Some("b a")
        );
    }

    #[test]
    fn toggle_flips_presence() {
        let mut engine = engine_with(
            r#"<body><div class="on" oyc-class="toggle:on:50ms,toggle:on:50ms">x</div></body>"#,
        );
        let div = engine.tree().find_element(|n| n.name() == Some("div")).unwrap();

        engine.advance(50).unwrap();
        assert_eq!(get_attribute(engine.tree().find(div).unwrap(), "class"), None);
        engine.advance(50).unwrap();
        assert_eq!(get_attribute(engine.tree().find(div).unwrap(), "class"), Some("on"));
    }

    #[test]
    fn malformed_operations_degrade_without_panicking() {
        let mut engine = engine_with(
            r#"<body><div oyc-class="sparkle:x,add,,add:ok">x</div></body>"#,
        );
        let div = engine.tree().find_element(|n| n.name() == Some("div")).unwrap();
        engine.advance(0).unwrap();
        assert_eq!(get_attribute(engine.tree().find(div).unwrap(), "class"), Some("ok"));
    }

    #[test]
    fn scheduled_edit_is_dropped_when_element_leaves_the_tree() {
        let mut engine =
            engine_with(r#"<body><div oyc-class="add:late:100ms">x</div></body>"#);
        let body = engine.tree().body().unwrap();
        engine.tree_mut().swap_inner(body, "<p>gone</p>").unwrap();
        // The pending edit targets a detached element; advancing must not
        // panic and must not touch the new content.
        engine.advance(100).unwrap();
        assert_eq!(
            engine.tree().inner_html(body).as_deref(),
            Some("<p>gone</p>")
        );
    }
}
