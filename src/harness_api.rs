use super::*;

/// Construction-time settings of a [`Harness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// When true, every mount, unmount and dispatch drains pending renders,
    /// effects and deferred tasks before returning. When false, that work stays
    /// queued until [`Harness::flush`].
    pub act_environment: bool,
    pub flush_step_limit: usize,
    pub trace: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            act_environment: true,
            flush_step_limit: 10_000,
            trace: false,
        }
    }
}

/// Owns the synthetic DOM, the mounted roots and the pending work of the
/// component runtime. Create one per test.
///
/// Nodes live in an append-only arena for the harness's lifetime. Ids are never
/// reused, so a handle kept past `unmount` (or a fragment clone) still reads its
/// last state and never aliases a newer node.
pub struct Harness {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) hooks: HookStore,
    pub(crate) roots: RootRegistry,
    pub(crate) scheduler: SchedulerState,
    pub(crate) trace_state: TraceState,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("nodes", &self.dom.nodes.len())
            .field("roots", &self.roots.roots.len())
            .field("listeners", &self.listeners.listener_count())
            .field("hooks", &self.hooks)
            .field("pending", &self.scheduler.work.borrow())
            .finish()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::from_config(HarnessConfig::default())
    }

    /// Builds a harness from explicit settings; a zero `flush_step_limit` is
    /// rejected like [`Harness::set_flush_step_limit`] rejects it.
    pub fn with_config(config: HarnessConfig) -> Result<Self> {
        check_flush_step_limit(config.flush_step_limit)?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: HarnessConfig) -> Self {
        let scheduler = SchedulerState {
            act_environment: config.act_environment,
            flush_step_limit: config.flush_step_limit,
            ..SchedulerState::default()
        };
        let trace_state = TraceState {
            enabled: config.trace,
            ..TraceState::default()
        };
        Self {
            dom: Dom::new(),
            listeners: ListenerStore::default(),
            hooks: HookStore::default(),
            roots: RootRegistry::default(),
            scheduler,
            trace_state,
        }
    }

    pub fn set_act_environment(&mut self, enabled: bool) {
        self.scheduler.act_environment = enabled;
    }

    pub fn is_act_environment(&self) -> bool {
        self.scheduler.act_environment
    }

    pub fn set_flush_step_limit(&mut self, max_steps: usize) -> Result<()> {
        check_flush_step_limit(max_steps)?;
        self.scheduler.flush_step_limit = max_steps;
        Ok(())
    }

    /// Runs `run` as one unit of work. When the outermost scope returns and the
    /// harness is in act environment mode, pending work is drained before
    /// control comes back.
    pub fn act<T>(&mut self, run: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scheduler.task_depth += 1;
        let result = run(self);
        self.scheduler.task_depth = self.scheduler.task_depth.saturating_sub(1);
        let value = result?;
        if self.scheduler.task_depth == 0 && self.scheduler.act_environment {
            self.flush()?;
        }
        Ok(value)
    }

    /// Drains dirty roots, then post-commit effects, then deferred tasks, until
    /// nothing is pending. Returns the number of steps run.
    pub fn flush(&mut self) -> Result<usize> {
        let limit = self.scheduler.flush_step_limit;
        let mut steps = 0usize;
        loop {
            let next = {
                let mut work = self.scheduler.work.borrow_mut();
                if let Some(root) = work.dirty_roots.pop_first() {
                    Some(Step::Render(root))
                } else if let Some(effect) = work.effects.pop_front() {
                    Some(Step::Run(effect))
                } else {
                    work.deferred.pop_front().map(Step::Run)
                }
            };
            let Some(step) = next else {
                break;
            };

            steps += 1;
            if steps > limit {
                return Err(Error::FlushLimitExceeded { limit, steps });
            }

            match step {
                Step::Render(root) => self.render_root(root)?,
                Step::Run(task) => task(),
            }
        }
        if steps > 0 {
            self.trace_flush_line(format!("[flush] ran={steps}"));
        }
        Ok(steps)
    }

    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.work.borrow().is_empty()
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.events = enabled;
    }

    pub fn set_trace_flush(&mut self, enabled: bool) {
        self.trace_state.flush = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidArgument(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_state.log_limit = max_entries;
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_flush_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.flush {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if self.trace_state.enabled {
            if self.trace_state.to_stderr {
                eprintln!("{line}");
            }
            if self.trace_state.logs.len() >= self.trace_state.log_limit {
                self.trace_state.logs.pop_front();
            }
            self.trace_state.logs.push_back(line);
        }
    }

    pub fn document_body(&self) -> NodeId {
        self.dom.body
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.dom
            .create_element(None, tag_name.to_ascii_lowercase(), BTreeMap::new())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.dom.append_child(parent, child)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.dom.contains_node(node) {
            return None;
        }
        self.dom.parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.dom.contains_node(node) {
            return Vec::new();
        }
        self.dom.children(node).to_vec()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.dom.contains_node(node) && self.dom.is_connected(node)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        if !self.dom.contains_node(node) {
            return None;
        }
        self.dom.tag_name(node)
    }

    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.dom.ensure_node(root)?;
        self.dom.query_selector_from(root, selector)
    }

    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.ensure_node(root)?;
        self.dom.query_selector_all_from(root, selector)
    }

    /// Like [`Harness::query_selector`] but `root` itself may match, and a miss
    /// is an error.
    pub fn select_one(&self, root: NodeId, selector: &str) -> Result<NodeId> {
        self.dom.ensure_node(root)?;
        self.dom
            .query_selector_inclusive(root, selector)?
            .ok_or_else(|| Error::NodeNotFound(selector.to_string()))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        if !self.dom.contains_node(node) {
            return String::new();
        }
        self.dom.text_content(node)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        if !self.dom.contains_node(node) {
            return None;
        }
        self.dom.attr(node, name)
    }

    pub fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.dom.contains_node(node)
            && self
                .dom
                .element(node)
                .is_some_and(|element| has_class(element, class_name))
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        if !self.dom.contains_node(node) {
            return None;
        }
        self.dom.value(node).map(str::to_string)
    }

    pub fn checked(&self, node: NodeId) -> Option<bool> {
        if !self.dom.contains_node(node) {
            return None;
        }
        self.dom.checked(node)
    }

    /// Writes an element's value directly, without dispatching anything.
    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        self.dom.ensure_node(node)?;
        self.dom.set_value(node, value)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<()> {
        self.dom.ensure_node(node)?;
        self.dom.set_checked(node, checked)
    }

    pub fn outer_html(&self, node: NodeId) -> Result<String> {
        self.dom.ensure_node(node)?;
        Ok(self.dom.dump_node(node))
    }

    pub fn inner_html(&self, node: NodeId) -> Result<String> {
        self.dom.ensure_node(node)?;
        Ok(self.dom.inner_html(node))
    }

    /// Indented, human-readable rendering of a subtree.
    pub fn pretty_html(&self, node: NodeId) -> Result<String> {
        self.dom.ensure_node(node)?;
        Ok(self.dom.pretty_node(node))
    }
}

enum Step {
    Render(RootId),
    Run(Task),
}

fn check_flush_step_limit(max_steps: usize) -> Result<()> {
    if max_steps == 0 {
        return Err(Error::InvalidArgument(
            "flush step limit requires at least 1 step".into(),
        ));
    }
    Ok(())
}
