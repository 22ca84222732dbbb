//! Token stream to node tree. Permissive by design: unclosed tags are
//! auto-closed at end of input, stray end tags pop to the nearest matching
//! open element (or are dropped), unknown tags become ordinary elements.

use crate::types::{Id, Node, Token};

struct OpenElement {
    name: String,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

struct FragmentBuilder {
    /// Children of the implicit container the fragment is parsed inside of.
    top: Vec<Node>,
    open: Vec<OpenElement>,
}

impl FragmentBuilder {
    fn new() -> Self {
        Self {
            top: Vec::new(),
            open: Vec::new(),
        }
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.top.push(node),
        }
    }

    fn close_one(&mut self) {
        let closed = self.open.pop().expect("close_one requires an open element");
        self.append(Node::Element {
            id: Id(0),
            name: closed.name,
            attributes: closed.attributes,
            children: closed.children,
        });
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_one();
        }
        self.top
    }
}

/// Build fragment nodes from a token stream, as if parsed inside a generic
/// container element: no html/head/body synthesis, no foster parenting.
/// Doctype tokens are meaningless inside a fragment and are dropped.
pub fn build_fragment(tokens: Vec<Token>) -> Vec<Node> {
    let mut builder = FragmentBuilder::new();

    for token in tokens {
        match token {
            Token::Doctype(_) => {}
            Token::Comment(text) => builder.append(Node::Comment { id: Id(0), text }),
            Token::Text(text) => {
                if !text.is_empty() {
                    builder.append(Node::Text { id: Id(0), text });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if self_closing {
                    builder.append(Node::Element {
                        id: Id(0),
                        name,
                        attributes,
                        children: Vec::new(),
                    });
                } else {
                    builder.open.push(OpenElement {
                        name,
                        attributes,
                        children: Vec::new(),
                    });
                }
            }
            Token::EndTag(name) => {
                let matches_open = builder
                    .open
                    .iter()
                    .rposition(|open| open.name.eq_ignore_ascii_case(&name));
                // Stray end tags with no matching open element are dropped.
                if let Some(index) = matches_open {
                    while builder.open.len() > index {
                        builder.close_one();
                    }
                }
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn build(html: &str) -> Vec<Node> {
        build_fragment(tokenize(html))
    }

    #[test]
    fn builds_siblings_at_top_level() {
        let nodes = build("<p>a</p><p>b</p>");
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.name() == Some("p")));
    }

    #[test]
    fn auto_closes_unclosed_tags() {
        let nodes = build("<div><span>x");
        assert_eq!(nodes.len(), 1);
        let div = &nodes[0];
        assert_eq!(div.name(), Some("div"));
        assert_eq!(div.children()[0].name(), Some("span"));
    }

    #[test]
    fn drops_stray_end_tags() {
        let nodes = build("</div><p>x</p>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name(), Some("p"));
    }

    #[test]
    fn end_tag_pops_through_unclosed_children() {
        let nodes = build("<ul><li>a<li>b</ul>");
        assert_eq!(nodes.len(), 1);
        let ul = &nodes[0];
        // Without spec-level implied end tags the second <li> nests inside
        // the first; closing </ul> still closes everything underneath it.
        assert_eq!(ul.name(), Some("ul"));
        assert_eq!(ul.children()[0].name(), Some("li"));
    }

    #[test]
    fn keeps_unknown_tags_as_opaque_elements() {
        let nodes = build("<my-widget x=1>body</my-widget>");
        assert_eq!(nodes[0].name(), Some("my-widget"));
    }

    #[test]
    fn table_fragments_parse_without_foster_parenting() {
        // "Parse as if inside a generic container": a bare <td> fragment
        // survives as a td element instead of being dropped by table rules.
        let nodes = build("<td>cell</td>");
        assert_eq!(nodes[0].name(), Some("td"));
    }

    #[test]
    fn empty_input_builds_empty_fragment() {
        assert!(build("").is_empty());
    }
}
