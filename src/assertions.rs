use super::*;
use crate::dom::{STACK_GROWTH, STACK_RED_ZONE};
use fancy_regex::Regex;

const SNIPPET_MAX_CHARS: usize = 200;

impl Harness {
    pub fn assert_text(&self, root: NodeId, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(root, selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    /// Like [`Harness::assert_text`] but `pattern` only has to match somewhere
    /// in the text content.
    pub fn assert_text_matches(&self, root: NodeId, selector: &str, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|err| Error::InvalidPattern(err.to_string()))?;
        let target = self.select_one(root, selector)?;
        let actual = self.dom.text_content(target);
        let matched = regex
            .is_match(&actual)
            .map_err(|err| Error::InvalidPattern(err.to_string()))?;
        if !matched {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("/{pattern}/"),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, root: NodeId, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(root, selector)?;
        let actual = self.dom.value(target).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, root: NodeId, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(root, selector)?;
        let actual = self.dom.checked(target).unwrap_or(false);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, root: NodeId, selector: &str) -> Result<()> {
        let _ = self.select_one(root, selector)?;
        Ok(())
    }

    /// Checks that the `actual` subtree satisfies the `expected` one.
    ///
    /// Tags must agree, every expected attribute must be present with the same
    /// value (`class` only needs to be a subset of the actual tokens), trimmed
    /// text must be equal, and children are matched by position once
    /// whitespace-only text is skipped. An `<!-- ignore -->` comment in the
    /// expected tree matches any single node.
    pub fn assert_satisfies(&self, actual: NodeId, expected: NodeId) -> Result<()> {
        self.dom.ensure_node(actual)?;
        self.dom.ensure_node(expected)?;
        match self.first_mismatch(actual, expected) {
            None => Ok(()),
            Some((actual_node, want, got)) => Err(Error::AssertionFailed {
                selector: self.dom.node_label(actual_node),
                expected: want,
                actual: got,
                dom_snippet: self.node_snippet(actual),
            }),
        }
    }

    fn first_mismatch(&self, actual: NodeId, expected: NodeId) -> Option<(NodeId, String, String)> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            let actual_type = &self.dom.nodes[actual.0].node_type;
            let expected_type = &self.dom.nodes[expected.0].node_type;
            match (expected_type, actual_type) {
                (NodeType::Comment(text), _) if is_ignore_comment(text) => None,
                (NodeType::Text(want), NodeType::Text(got)) => (want.trim() != got.trim())
                    .then(|| (actual, format!("text {:?}", want.trim()), format!("text {:?}", got.trim()))),
                (NodeType::Comment(want), NodeType::Comment(got)) => (want != got)
                    .then(|| (actual, format!("<!--{want}-->"), format!("<!--{got}-->"))),
                (NodeType::Element(want), NodeType::Element(got)) => {
                    if want.tag_name != got.tag_name {
                        return Some((
                            actual,
                            format!("<{}>", want.tag_name),
                            format!("<{}>", got.tag_name),
                        ));
                    }
                    if let Some(mismatch) = attrs_mismatch(want, got) {
                        return Some((actual, mismatch.0, mismatch.1));
                    }
                    self.children_mismatch(actual, expected)
                }
                (NodeType::Document, NodeType::Document) => self.children_mismatch(actual, expected),
                _ => Some((
                    actual,
                    self.node_snippet(expected),
                    self.node_snippet(actual),
                )),
            }
        })
    }

    fn children_mismatch(
        &self,
        actual: NodeId,
        expected: NodeId,
    ) -> Option<(NodeId, String, String)> {
        let actual_children = self.significant_children(actual);
        let expected_children = self.significant_children(expected);
        if actual_children.len() != expected_children.len() {
            return Some((
                actual,
                format!("{} child nodes", expected_children.len()),
                format!("{} child nodes", actual_children.len()),
            ));
        }
        actual_children
            .into_iter()
            .zip(expected_children)
            .find_map(|(got, want)| self.first_mismatch(got, want))
    }

    fn significant_children(&self, node: NodeId) -> Vec<NodeId> {
        self.dom
            .children(node)
            .iter()
            .copied()
            .filter(|child| match &self.dom.nodes[child.0].node_type {
                NodeType::Text(text) => !text.trim().is_empty(),
                _ => true,
            })
            .collect()
    }

    pub(crate) fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), SNIPPET_MAX_CHARS)
    }
}

fn attrs_mismatch(want: &Element, got: &Element) -> Option<(String, String)> {
    for (name, value) in &want.attrs {
        let actual = got.attrs.get(name);
        let satisfied = if name == "class" {
            let have = class_tokens(actual.map(String::as_str));
            class_tokens(Some(value.as_str()))
                .iter()
                .all(|token| have.contains(token))
        } else {
            actual == Some(value)
        };
        if !satisfied {
            return Some((
                format!("{name}=\"{value}\""),
                match actual {
                    Some(actual) => format!("{name}=\"{actual}\""),
                    None => format!("no {name} attribute"),
                },
            ));
        }
    }
    None
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
