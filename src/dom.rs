use super::*;

mod query;
mod serialize;
mod tree_mutation;

// Red zone / growth sizes for recursive walks over deep trees.
pub(crate) const STACK_RED_ZONE: usize = 64 * 1024;
pub(crate) const STACK_GROWTH: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) body: NodeId,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let document = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        let mut dom = Self {
            nodes: vec![document],
            root: NodeId(0),
            body: NodeId(0),
        };
        let html = dom.create_element(Some(dom.root), "html".to_string(), BTreeMap::new());
        dom.body = dom.create_element(Some(html), "body".to_string(), BTreeMap::new());
        dom
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: Option<NodeId>,
        tag_name: String,
        attrs: BTreeMap<String, String>,
    ) -> NodeId {
        self.create_node(parent, NodeType::Element(Element::new(tag_name, attrs)))
    }

    pub(crate) fn create_text(&mut self, parent: Option<NodeId>, text: String) -> NodeId {
        self.create_node(parent, NodeType::Text(text))
    }

    pub(crate) fn create_comment(&mut self, parent: Option<NodeId>, text: String) -> NodeId {
        self.create_node(parent, NodeType::Comment(text))
    }

    pub(crate) fn contains_node(&self, node_id: NodeId) -> bool {
        node_id.0 < self.nodes.len()
    }

    pub(crate) fn ensure_node(&self, node_id: NodeId) -> Result<()> {
        if self.contains_node(node_id) {
            Ok(())
        } else {
            Err(Error::NodeNotFound(node_id.to_string()))
        }
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id.0].children
    }

    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        node_id == self.root || self.is_descendant_of(node_id, self.root)
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.value.as_str())
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> Option<bool> {
        self.element(node_id).map(|element| element.checked)
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Text(text) => text.clone(),
            NodeType::Comment(_) => String::new(),
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                self.collect_text(node_id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            for child in &self.nodes[node_id.0].children {
                match &self.nodes[child.0].node_type {
                    NodeType::Text(text) => out.push_str(text),
                    NodeType::Element(_) => self.collect_text(*child, out),
                    NodeType::Comment(_) | NodeType::Document => {}
                }
            }
        })
    }

    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => "#document".to_string(),
            NodeType::Text(_) => "#text".to_string(),
            NodeType::Comment(_) => "#comment".to_string(),
            NodeType::Element(element) => {
                let mut label = format!("<{}", element.tag_name);
                if let Some(id) = element.attrs.get("id") {
                    label.push_str(&format!(" id=\"{id}\""));
                }
                for (name, value) in &element.attrs {
                    if name.starts_with("data-") {
                        label.push_str(&format!(" {name}=\"{value}\""));
                    }
                }
                label.push('>');
                label
            }
        }
    }
}
