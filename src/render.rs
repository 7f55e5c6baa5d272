use super::*;
use crate::dom::{STACK_GROWTH, STACK_RED_ZONE};
use crate::vnode::ComponentNode;

/// A [`VNode`] tree with components expanded and fragments flattened.
enum Resolved {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        value: Option<String>,
        checked: Option<bool>,
        listeners: Vec<(EventKind, EventHandler)>,
        children: Vec<Resolved>,
    },
    Text(String),
    Comment(String),
}

struct RenderPass {
    root: RootId,
    effects: Vec<Task>,
    seen_instances: HashSet<HookKey>,
}

impl Harness {
    /// Re-renders a mounted root and patches its container in place. Roots that
    /// were unmounted in the meantime are skipped.
    pub(crate) fn render_root(&mut self, root: RootId) -> Result<()> {
        let Some(record) = self.roots.roots.get(&root) else {
            return Ok(());
        };
        let container = record.container;
        let tree = record.tree.clone();

        let mut pass = RenderPass {
            root,
            effects: Vec::new(),
            seen_instances: HashSet::new(),
        };
        let mut resolved = Vec::new();
        self.expand(&mut pass, &tree, &mut Vec::new(), &mut resolved);
        self.patch_children(container, &resolved)?;

        let RenderPass {
            effects,
            seen_instances,
            ..
        } = pass;
        self.hooks
            .slots
            .retain(|key, _| key.root != root || seen_instances.contains(key));
        self.scheduler.work.borrow_mut().effects.extend(effects);

        if self.trace_state.enabled {
            let line = format!(
                "[render] root={} container={} children={}",
                root.0,
                self.dom.node_label(container),
                self.dom.children(container).len()
            );
            self.trace_flush_line(line);
        }
        Ok(())
    }

    fn expand(
        &mut self,
        pass: &mut RenderPass,
        node: &VNode,
        path: &mut Vec<usize>,
        out: &mut Vec<Resolved>,
    ) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match node {
            VNode::Empty => {}
            VNode::Text(content) => out.push(Resolved::Text(content.clone())),
            VNode::Ignore => out.push(Resolved::Comment(IGNORE_COMMENT.to_string())),
            VNode::Fragment(children) => self.expand_children(pass, children, path, out),
            VNode::Element(element) => {
                let mut children = Vec::new();
                self.expand_children(pass, &element.children, path, &mut children);
                out.push(Resolved::Element {
                    tag: element.tag.clone(),
                    attrs: element.attrs.clone(),
                    value: element.value.clone(),
                    checked: element.checked,
                    listeners: element.listeners.clone(),
                    children,
                });
            }
            VNode::Component(component) => {
                let rendered = self.render_component(pass, component, path);
                path.push(0);
                self.expand(pass, &rendered, path, out);
                path.pop();
            }
        })
    }

    fn expand_children(
        &mut self,
        pass: &mut RenderPass,
        children: &[VNode],
        path: &mut Vec<usize>,
        out: &mut Vec<Resolved>,
    ) {
        for (index, child) in children.iter().enumerate() {
            path.push(index);
            self.expand(pass, child, path, out);
            path.pop();
        }
    }

    fn render_component(
        &mut self,
        pass: &mut RenderPass,
        node: &ComponentNode,
        path: &[usize],
    ) -> VNode {
        let key = HookKey {
            root: pass.root,
            path: path.to_vec(),
        };
        let mut slots = self.hooks.take(&key);
        let rendered = {
            let mut hooks = Hooks {
                root: pass.root,
                slots: &mut slots,
                cursor: 0,
                work: self.scheduler.work.clone(),
                effects: &mut pass.effects,
            };
            node.component.render(&mut hooks)
        };
        self.hooks.put(key.clone(), slots);
        pass.seen_instances.insert(key);
        rendered
    }

    fn patch_children(&mut self, parent: NodeId, desired: &[Resolved]) -> Result<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || -> Result<()> {
            for (index, want) in desired.iter().enumerate() {
                let existing = self.dom.children(parent).get(index).copied();
                let node = match existing {
                    Some(node) if self.can_reuse(node, want) => node,
                    Some(old) => {
                        let fresh = self.create_resolved(want);
                        self.release_subtree(old);
                        self.dom.replace_child(parent, fresh, old)?;
                        fresh
                    }
                    None => {
                        let fresh = self.create_resolved(want);
                        self.dom.append_child(parent, fresh)?;
                        fresh
                    }
                };
                self.apply_resolved(node, want)?;
            }

            let stale = self
                .dom
                .children(parent)
                .get(desired.len()..)
                .map(<[NodeId]>::to_vec)
                .unwrap_or_default();
            for node in stale {
                self.release_subtree(node);
            }
            self.dom.truncate_children(parent, desired.len());
            Ok(())
        })
    }

    fn can_reuse(&self, node: NodeId, want: &Resolved) -> bool {
        match (&self.dom.nodes[node.0].node_type, want) {
            (NodeType::Element(element), Resolved::Element { tag, .. }) => element.tag_name == *tag,
            (NodeType::Text(_), Resolved::Text(_)) => true,
            (NodeType::Comment(_), Resolved::Comment(_)) => true,
            _ => false,
        }
    }

    fn create_resolved(&mut self, want: &Resolved) -> NodeId {
        match want {
            Resolved::Element { tag, attrs, .. } => {
                self.dom.create_element(None, tag.clone(), attrs.clone())
            }
            Resolved::Text(content) => self.dom.create_text(None, content.clone()),
            Resolved::Comment(content) => self.dom.create_comment(None, content.clone()),
        }
    }

    fn apply_resolved(&mut self, node: NodeId, want: &Resolved) -> Result<()> {
        match want {
            Resolved::Text(content) | Resolved::Comment(content) => {
                self.dom.set_character_data(node, content);
                Ok(())
            }
            Resolved::Element {
                attrs,
                value,
                checked,
                listeners,
                children,
                ..
            } => {
                if let Some(element) = self.dom.element_mut(node) {
                    if element.attrs != *attrs {
                        element.attrs = attrs.clone();
                    }
                    element.disabled = attrs.contains_key("disabled");
                    if let Some(value) = value {
                        element.value = value.clone();
                    }
                    if let Some(checked) = checked {
                        element.checked = *checked;
                    }
                }

                self.listeners.clear_node(node);
                for (kind, handler) in listeners {
                    self.listeners.add(
                        node,
                        *kind,
                        Listener {
                            handler: handler.clone(),
                        },
                    );
                }

                // Another root renders into this node; its children are not ours.
                if self.roots.hosted_by(node).is_some() {
                    return Ok(());
                }
                self.patch_children(node, children)
            }
        }
    }

    /// Drops listeners under a node leaving the tree, along with any root
    /// mounted into it.
    fn release_subtree(&mut self, node: NodeId) {
        let mut hosted: Vec<RootId> = self.roots.hosted_by(node).into_iter().collect();
        hosted.extend(self.roots.nested_in(&self.dom, node));
        for root in hosted {
            self.teardown_root(root, false);
        }
        self.clear_listeners_in(node);
    }

    pub(crate) fn clear_listeners_in(&mut self, node: NodeId) {
        let mut nodes = Vec::new();
        self.dom.collect_elements_dfs(node, &mut nodes);
        for node in nodes {
            self.listeners.clear_node(node);
        }
    }
}
