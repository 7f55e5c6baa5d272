use super::*;

impl Dom {
    pub(crate) fn detach(&mut self, node_id: NodeId) {
        if let Some(parent) = self.nodes[node_id.0].parent.take() {
            self.nodes[parent.0]
                .children
                .retain(|child| *child != node_id);
        }
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_child_at(parent, usize::MAX, child)
    }

    pub(crate) fn insert_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<()> {
        self.ensure_node(parent)?;
        self.ensure_node(child)?;
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(Error::InvalidArgument(format!(
                "cannot insert {child} into its own subtree"
            )));
        }
        if matches!(
            self.nodes[parent.0].node_type,
            NodeType::Text(_) | NodeType::Comment(_)
        ) {
            return Err(Error::InvalidArgument(format!(
                "{} cannot have children",
                self.node_label(parent)
            )));
        }

        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    pub(crate) fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> Result<()> {
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == old)
        else {
            return Err(Error::NodeNotFound(format!(
                "{old} is not a child of {}",
                self.node_label(parent)
            )));
        };
        self.detach(old);
        self.insert_child_at(parent, index, new)
    }

    pub(crate) fn remove_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    pub(crate) fn truncate_children(&mut self, parent: NodeId, len: usize) {
        if self.nodes[parent.0].children.len() <= len {
            return;
        }
        let removed = self.nodes[parent.0].children.split_off(len);
        for child in removed {
            self.nodes[child.0].parent = None;
        }
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self.element_mut(node_id).ok_or_else(|| {
            Error::InvalidArgument(format!("cannot set value on non-element {node_id}"))
        })?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self.element_mut(node_id).ok_or_else(|| {
            Error::InvalidArgument(format!("cannot set checked on non-element {node_id}"))
        })?;
        element.checked = checked;
        Ok(())
    }

    pub(crate) fn set_character_data(&mut self, node_id: NodeId, data: &str) {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Text(text) | NodeType::Comment(text) => {
                if text != data {
                    *text = data.to_string();
                }
            }
            NodeType::Document | NodeType::Element(_) => {}
        }
    }

    /// Copies `node_id` and its whole subtree into fresh detached nodes.
    pub(crate) fn deep_clone(&mut self, node_id: NodeId) -> NodeId {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            let node_type = match &self.nodes[node_id.0].node_type {
                // A document clone would be a second document; clone as a plain container.
                NodeType::Document => {
                    NodeType::Element(Element::new("div".to_string(), BTreeMap::new()))
                }
                other => other.clone(),
            };
            let copy = self.create_node(None, node_type);
            let children = self.nodes[node_id.0].children.clone();
            for child in children {
                let child_copy = self.deep_clone(child);
                self.nodes[child_copy.0].parent = Some(copy);
                self.nodes[copy.0].children.push(child_copy);
            }
            copy
        })
    }
}
