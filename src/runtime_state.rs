use super::*;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::mount::RootId;
use crate::simulate::{Event, EventKind};

pub(crate) type EventHandler = Rc<dyn Fn(&Event)>;
pub(crate) type Task = Box<dyn FnOnce()>;

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) handler: EventHandler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Listener")
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    pub(crate) map: HashMap<NodeId, HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, kind: EventKind, listener: Listener) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(kind)
            .or_default()
            .push(listener);
    }

    pub(crate) fn get(&self, node_id: NodeId, kind: EventKind) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(&kind))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn clear_node(&mut self, node_id: NodeId) {
        self.map.remove(&node_id);
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.map
            .values()
            .flat_map(|events| events.values())
            .map(Vec::len)
            .sum()
    }
}

/// Work queued by state updates, effects and deferred callbacks, drained by
/// the harness flush loop.
#[derive(Default)]
pub(crate) struct PendingWork {
    pub(crate) dirty_roots: BTreeSet<RootId>,
    pub(crate) effects: VecDeque<Task>,
    pub(crate) deferred: VecDeque<Task>,
}

impl PendingWork {
    pub(crate) fn is_empty(&self) -> bool {
        self.dirty_roots.is_empty() && self.effects.is_empty() && self.deferred.is_empty()
    }
}

impl fmt::Debug for PendingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWork")
            .field("dirty_roots", &self.dirty_roots)
            .field("effects", &self.effects.len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

pub(crate) type SharedWork = Rc<RefCell<PendingWork>>;

#[derive(Debug)]
pub(crate) struct SchedulerState {
    pub(crate) work: SharedWork,
    pub(crate) act_environment: bool,
    pub(crate) flush_step_limit: usize,
    pub(crate) task_depth: usize,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            work: Rc::new(RefCell::new(PendingWork::default())),
            act_environment: true,
            flush_step_limit: 10_000,
            task_depth: 0,
        }
    }
}

/// Hook slots of one component instance, addressed by call order.
pub(crate) type HookSlots = Vec<Rc<dyn Any>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct HookKey {
    pub(crate) root: RootId,
    pub(crate) path: Vec<usize>,
}

#[derive(Default)]
pub(crate) struct HookStore {
    pub(crate) slots: HashMap<HookKey, HookSlots>,
}

impl HookStore {
    pub(crate) fn take(&mut self, key: &HookKey) -> HookSlots {
        self.slots.remove(key).unwrap_or_default()
    }

    pub(crate) fn put(&mut self, key: HookKey, slots: HookSlots) {
        if !slots.is_empty() {
            self.slots.insert(key, slots);
        }
    }

    pub(crate) fn drop_root(&mut self, root: RootId) {
        self.slots.retain(|key, _| key.root != root);
    }
}

impl fmt::Debug for HookStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookStore")
            .field("instances", &self.slots.len())
            .finish()
    }
}

#[derive(Debug)]
pub(crate) struct RootRecord {
    pub(crate) container: NodeId,
    pub(crate) tree: VNode,
}

#[derive(Debug, Default)]
pub(crate) struct RootRegistry {
    pub(crate) roots: BTreeMap<RootId, RootRecord>,
    pub(crate) next_root_id: usize,
}

impl RootRegistry {
    pub(crate) fn register(&mut self, container: NodeId, tree: VNode) -> RootId {
        self.next_root_id += 1;
        let id = RootId(self.next_root_id);
        self.roots.insert(id, RootRecord { container, tree });
        id
    }

    pub(crate) fn hosted_by(&self, container: NodeId) -> Option<RootId> {
        self.roots
            .iter()
            .find(|(_, record)| record.container == container)
            .map(|(id, _)| *id)
    }

    /// Nearest root whose container is `node_id` or one of its ancestors.
    pub(crate) fn owner_of(&self, dom: &Dom, node_id: NodeId) -> Option<RootId> {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if let Some(root) = self.hosted_by(node) {
                return Some(root);
            }
            cursor = dom.parent(node);
        }
        None
    }

    /// Roots whose containers sit strictly inside `node_id`.
    pub(crate) fn nested_in(&self, dom: &Dom, node_id: NodeId) -> Vec<RootId> {
        self.roots
            .iter()
            .filter(|(_, record)| dom.is_descendant_of(record.container, node_id))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) flush: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            flush: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}
