use super::*;

impl Dom {
    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.dump_node_into(node_id, &mut out);
        out
    }

    fn dump_node_into(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Document => {
                    for child in &self.nodes[node_id.0].children {
                        self.dump_node_into(*child, out);
                    }
                }
                NodeType::Text(text) => out.push_str(&escape_html_text_for_serialization(text)),
                NodeType::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeType::Element(element) => {
                    push_open_tag(element, out);
                    if is_void_tag(&element.tag_name) {
                        return;
                    }
                    for child in &self.nodes[node_id.0].children {
                        self.dump_node_into(*child, out);
                    }
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                }
            }
        })
    }

    pub(crate) fn inner_html(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[node_id.0].children {
            self.dump_node_into(*child, &mut out);
        }
        out
    }

    /// Indented rendering of a subtree, one tag or text run per line.
    pub(crate) fn pretty_node(&self, node_id: NodeId) -> String {
        let mut lines = Vec::new();
        self.pretty_node_into(node_id, 0, &mut lines);
        lines.join("\n")
    }

    fn pretty_node_into(&self, node_id: NodeId, depth: usize, lines: &mut Vec<String>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            let indent = "  ".repeat(depth);
            match &self.nodes[node_id.0].node_type {
                NodeType::Document => {
                    for child in &self.nodes[node_id.0].children {
                        self.pretty_node_into(*child, depth, lines);
                    }
                }
                NodeType::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        lines.push(format!(
                            "{indent}{}",
                            escape_html_text_for_serialization(trimmed)
                        ));
                    }
                }
                NodeType::Comment(text) => lines.push(format!("{indent}<!--{text}-->")),
                NodeType::Element(element) => {
                    let mut open = String::new();
                    push_open_tag(element, &mut open);
                    if is_void_tag(&element.tag_name) {
                        lines.push(format!("{indent}{open}"));
                        return;
                    }
                    let close = format!("</{}>", element.tag_name);
                    let children = &self.nodes[node_id.0].children;
                    let text_only = children
                        .iter()
                        .all(|child| matches!(self.nodes[child.0].node_type, NodeType::Text(_)));
                    if text_only {
                        let text = self.text_content(node_id);
                        lines.push(format!(
                            "{indent}{open}{}{close}",
                            escape_html_text_for_serialization(text.trim())
                        ));
                        return;
                    }
                    lines.push(format!("{indent}{open}"));
                    for child in children {
                        self.pretty_node_into(*child, depth + 1, lines);
                    }
                    lines.push(format!("{indent}{close}"));
                }
            }
        })
    }
}

fn push_open_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag_name);
    for (k, v) in &element.attrs {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(&escape_html_attr_for_serialization(v));
        out.push('"');
    }
    out.push('>');
}
