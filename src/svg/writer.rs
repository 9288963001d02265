//! Serializes an [`SvgDocument`] back to SVG text.

use std::fmt::Write;

use crate::svg::document::{NodeId, NodeKind, SvgDocument};

impl SvgDocument {
    /// Writes the document as a standalone SVG file (with XML declaration).
    ///
    /// Element order, attributes, namespace prefixes, text and comments are
    /// preserved. Processing instructions and any DTD are not.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_node(self.root(), &mut out);
        out.push('\n');
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            Some(NodeKind::Element(element)) => {
                out.push('<');
                out.push_str(element.name());
                for (prefix, uri) in element.namespaces() {
                    match prefix {
                        Some(prefix) => {
                            let _ = write!(out, " xmlns:{prefix}=\"{}\"", escape_attribute(uri));
                        }
                        None => {
                            let _ = write!(out, " xmlns=\"{}\"", escape_attribute(uri));
                        }
                    }
                }
                for attr in element.attributes() {
                    let _ = write!(out, " {}=\"{}\"", attr.name, escape_attribute(&attr.value));
                }

                let children = self.children(node);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{}>", element.name());
            }
            Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeKind::Comment(text)) => {
                let _ = write!(out, "<!--{text}-->");
            }
            None => {}
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
