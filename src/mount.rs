use super::*;

/// Identity of one mounted tree within its harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub(crate) usize);

/// Where [`Harness::mount_with`] renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Container {
    /// A fresh `div` attached under the document body.
    #[default]
    Default,
    /// A fresh element of this tag attached under the document body.
    Tag(String),
    /// An existing node, used as-is.
    Node(NodeId),
}

impl From<NodeId> for Container {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for Container {
    fn from(tag_name: &str) -> Self {
        Self::Tag(tag_name.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions {
    pub container: Container,
}

impl MountOptions {
    pub fn container(container: impl Into<Container>) -> Self {
        Self {
            container: container.into(),
        }
    }
}

/// Detached deep clones of the top-level nodes of a multi-node mount, in
/// document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    root: RootId,
    nodes: Vec<NodeId>,
}

impl Fragment {
    pub fn root(&self) -> RootId {
        self.root
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// What a mount produced: nothing, the single top-level node itself, or a
/// fragment of clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountHandle {
    Empty,
    Node(NodeId),
    Fragment(Fragment),
}

impl MountHandle {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(*node),
            Self::Empty | Self::Fragment(_) => None,
        }
    }

    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            Self::Fragment(fragment) => Some(fragment),
            Self::Empty | Self::Node(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Self::Empty => Vec::new(),
            Self::Node(node) => vec![*node],
            Self::Fragment(fragment) => fragment.nodes.clone(),
        }
    }
}

impl Harness {
    pub fn mount(&mut self, tree: impl Into<VNode>) -> Result<MountHandle> {
        self.mount_with(tree, MountOptions::default())
    }

    /// Renders `tree` into the container named by `options` and settles the
    /// resulting updates before returning.
    pub fn mount_with(
        &mut self,
        tree: impl Into<VNode>,
        options: MountOptions,
    ) -> Result<MountHandle> {
        let tree = tree.into();
        let (root, container) = self.act(|this| {
            let container = this.prepare_container(options.container)?;
            let root = this.roots.register(container, tree);
            this.render_root(root)?;
            Ok((root, container))
        })?;

        let children = self.dom.children(container).to_vec();
        if self.trace_state.enabled {
            let line = format!(
                "[mount] root={} container={} children={}",
                root.0,
                self.dom.node_label(container),
                children.len()
            );
            self.trace_line(line);
        }

        Ok(match children.as_slice() {
            [] => MountHandle::Empty,
            [only] => MountHandle::Node(*only),
            many => {
                let mut nodes = Vec::with_capacity(many.len());
                for child in many {
                    nodes.push(self.dom.deep_clone(*child));
                }
                MountHandle::Fragment(Fragment { root, nodes })
            }
        })
    }

    fn prepare_container(&mut self, container: Container) -> Result<NodeId> {
        match container {
            Container::Default => self.attach_container("div"),
            Container::Tag(tag_name) => {
                let tag_name = tag_name.trim().to_ascii_lowercase();
                if tag_name.is_empty() || !tag_name.bytes().all(is_selector_ident_char) {
                    return Err(Error::InvalidArgument(format!(
                        "invalid container tag name: {tag_name:?}"
                    )));
                }
                self.attach_container(&tag_name)
            }
            Container::Node(node) => {
                self.dom.ensure_node(node)?;
                if self.dom.element(node).is_none() {
                    return Err(Error::InvalidArgument(format!(
                        "container {node} is not an element"
                    )));
                }
                if let Some(previous) = self.roots.hosted_by(node) {
                    self.teardown_root(previous, false);
                }
                for nested in self.roots.nested_in(&self.dom, node) {
                    self.teardown_root(nested, true);
                }
                self.clear_container(node);
                Ok(node)
            }
        }
    }

    /// Drops whatever the node held before it became a container; the first
    /// render starts from an empty child list.
    fn clear_container(&mut self, container: NodeId) {
        for child in self.dom.children(container).to_vec() {
            self.clear_listeners_in(child);
        }
        self.dom.remove_children(container);
    }

    fn attach_container(&mut self, tag_name: &str) -> Result<NodeId> {
        let container = self
            .dom
            .create_element(None, tag_name.to_string(), BTreeMap::new());
        self.dom.append_child(self.dom.body, container)?;
        Ok(container)
    }

    /// Tears down the root owning `handle`, or every tracked root when `handle`
    /// is `None`. Torn-down containers are detached from their parents, except
    /// the document body and containers that belong to another root's output.
    /// Handles no root owns are ignored.
    pub fn unmount(&mut self, handle: Option<&MountHandle>) -> Result<()> {
        self.act(|this| {
            let targets: Vec<RootId> = match handle {
                None => this.roots.roots.keys().copied().collect(),
                Some(MountHandle::Node(node)) if this.dom.contains_node(*node) => {
                    this.roots.owner_of(&this.dom, *node).into_iter().collect()
                }
                Some(MountHandle::Node(_)) => Vec::new(),
                Some(MountHandle::Fragment(fragment)) => vec![fragment.root],
                Some(MountHandle::Empty) => this
                    .roots
                    .roots
                    .iter()
                    .filter(|(_, record)| this.dom.children(record.container).is_empty())
                    .map(|(id, _)| *id)
                    .collect(),
            };
            for root in targets {
                let detach = this.detaches_on_unmount(root);
                this.teardown_root(root, detach);
            }
            Ok(())
        })
    }

    /// The document body and containers inside another root's output stay
    /// where they are.
    fn detaches_on_unmount(&self, root: RootId) -> bool {
        let Some(container) = self.root_container(root) else {
            return false;
        };
        if container == self.dom.body {
            return false;
        }
        self.dom
            .parent(container)
            .and_then(|parent| self.roots.owner_of(&self.dom, parent))
            .is_none()
    }

    pub fn mounted_roots(&self) -> Vec<RootId> {
        self.roots.roots.keys().copied().collect()
    }

    pub fn root_container(&self, root: RootId) -> Option<NodeId> {
        self.roots.roots.get(&root).map(|record| record.container)
    }

    pub(crate) fn teardown_root(&mut self, root: RootId, detach_container: bool) {
        let Some(container) = self.root_container(root) else {
            return;
        };
        for nested in self.roots.nested_in(&self.dom, container) {
            self.teardown_root(nested, false);
        }
        let Some(record) = self.roots.roots.remove(&root) else {
            return;
        };
        self.clear_container(record.container);
        self.hooks.drop_root(root);
        self.scheduler.work.borrow_mut().dirty_roots.remove(&root);
        if detach_container {
            self.dom.detach(record.container);
        }
        if self.trace_state.enabled {
            let line = format!(
                "[unmount] root={} container={} detached={}",
                root.0,
                self.dom.node_label(record.container),
                detach_container
            );
            self.trace_line(line);
        }
    }
}
