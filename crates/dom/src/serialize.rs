//! Serialize nodes back to HTML text. The inverse of the fragment parser at
//! the fidelity the engine needs: attribute order and text content are
//! preserved, entities are re-escaped, void elements get no end tag.

use crate::entities::{escape_attribute, escape_text};
use crate::types::Node;

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn serialize_into(node: &Node, out: &mut String) {
    match node {
        Node::Document {
            doctype, children, ..
        } => {
            if let Some(dt) = doctype {
                out.push_str("<!");
                out.push_str(dt);
                out.push('>');
            }
            for child in children {
                serialize_into(child, out);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                if let Some(value) = value {
                    out.push_str("=\"");
                    escape_attribute(value, out);
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_element(name) {
                return;
            }
            for child in children {
                serialize_into(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text { text, .. } => escape_text(text, out),
        Node::Comment { text, .. } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

/// The node itself, serialized.
pub fn outer_html(node: &Node) -> String {
    let mut out = String::new();
    serialize_into(node, &mut out);
    out
}

/// The node's children, serialized in document order.
pub fn inner_html(node: &Node) -> String {
    let mut out = String::new();
    for child in node.children() {
        serialize_into(child, &mut out);
    }
    out
}
