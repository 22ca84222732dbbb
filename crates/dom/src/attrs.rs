//! Name-based attribute access with the `data-` fallback convention: every
//! directive can be written either as `oyc-x` or `data-oyc-x` for HTML
//! validator compatibility. No caching; always reads live node state.

use crate::types::Node;

fn raw_attribute<'a>(node: &'a Node, name: &str) -> Option<&'a Option<String>> {
    let Node::Element { attributes, .. } = node else {
        return None;
    };
    attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

/// Value of `name`, falling back to `data-{name}`. A bare attribute with no
/// value reads as the empty string.
pub fn get_attribute<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    match raw_attribute(node, name) {
        Some(value) => Some(value.as_deref().unwrap_or("")),
        None => {
            let fallback = format!("data-{name}");
            raw_attribute(node, &fallback).map(|v| v.as_deref().unwrap_or(""))
        }
    }
}

pub fn has_attribute(node: &Node, name: &str) -> bool {
    get_attribute(node, name).is_some()
}

pub fn set_attribute(node: &mut Node, name: &str, value: &str) {
    let Node::Element { attributes, .. } = node else {
        return;
    };
    match attributes.iter_mut().find(|(k, _)| k == name) {
        Some((_, v)) => *v = Some(value.to_string()),
        None => attributes.push((name.to_string(), Some(value.to_string()))),
    }
}

pub fn remove_attribute(node: &mut Node, name: &str) {
    if let Node::Element { attributes, .. } = node {
        attributes.retain(|(k, _)| k != name);
    }
}

fn class_list(node: &Node) -> Vec<String> {
    get_attribute(node, "class")
        .unwrap_or("")
        .split_ascii_whitespace()
        .map(str::to_string)
        .collect()
}

fn set_class_list(node: &mut Node, classes: &[String]) {
    if classes.is_empty() {
        remove_attribute(node, "class");
    } else {
        set_attribute(node, "class", &classes.join(" "));
    }
}

pub fn has_class(node: &Node, class: &str) -> bool {
    class_list(node).iter().any(|c| c == class)
}

pub fn add_class(node: &mut Node, class: &str) {
    let mut classes = class_list(node);
    if !classes.iter().any(|c| c == class) {
        classes.push(class.to_string());
        set_class_list(node, &classes);
    }
}

pub fn remove_class(node: &mut Node, class: &str) {
    let mut classes = class_list(node);
    let before = classes.len();
    classes.retain(|c| c != class);
    if classes.len() != before {
        set_class_list(node, &classes);
    }
}

pub fn toggle_class(node: &mut Node, class: &str) {
    if has_class(node, class) {
        remove_class(node, class);
    } else {
        add_class(node, class);
    }
}
