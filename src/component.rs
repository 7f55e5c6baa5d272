use super::*;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A renderable unit with hook-based local state.
///
/// Closures of shape `Fn(&mut Hooks) -> VNode` are components too.
pub trait Component: 'static {
    fn render(&self, cx: &mut Hooks<'_>) -> VNode;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Component for F
where
    F: Fn(&mut Hooks<'_>) -> VNode + 'static,
{
    fn render(&self, cx: &mut Hooks<'_>) -> VNode {
        self(cx)
    }
}

/// Per-render access to a component instance's hook slots.
///
/// Hooks are matched by call order, so a component must call them in the same
/// order on every render.
pub struct Hooks<'a> {
    pub(crate) root: RootId,
    pub(crate) slots: &'a mut HookSlots,
    pub(crate) cursor: usize,
    pub(crate) work: SharedWork,
    pub(crate) effects: &'a mut Vec<Task>,
}

struct EffectDeps<D>(RefCell<D>);

impl Hooks<'_> {
    fn next_slot(&mut self) -> usize {
        let idx = self.cursor;
        self.cursor += 1;
        idx
    }

    fn set_slot(&mut self, idx: usize, value: Rc<dyn Any>) {
        if idx < self.slots.len() {
            self.slots[idx] = value;
        } else {
            self.slots.push(value);
        }
    }

    /// Local state that survives re-renders; `init` runs on first render only.
    pub fn use_state<T: 'static>(&mut self, init: impl FnOnce() -> T) -> State<T> {
        let idx = self.next_slot();
        let existing = self
            .slots
            .get(idx)
            .and_then(|slot| slot.clone().downcast::<RefCell<T>>().ok());
        let cell = match existing {
            Some(cell) => cell,
            None => {
                let cell = Rc::new(RefCell::new(init()));
                self.set_slot(idx, cell.clone());
                cell
            }
        };
        State {
            cell,
            root: self.root,
            work: self.work.clone(),
        }
    }

    /// Runs `effect` after the render is committed, on the first render and
    /// whenever `deps` differs from the previous render's.
    pub fn use_effect<D>(&mut self, deps: D, effect: impl FnOnce() + 'static)
    where
        D: PartialEq + 'static,
    {
        let idx = self.next_slot();
        let previous = self
            .slots
            .get(idx)
            .and_then(|slot| slot.clone().downcast::<EffectDeps<D>>().ok());
        let changed = match previous {
            Some(previous) => {
                let changed = *previous.0.borrow() != deps;
                if changed {
                    *previous.0.borrow_mut() = deps;
                }
                changed
            }
            None => {
                self.set_slot(idx, Rc::new(EffectDeps(RefCell::new(deps))));
                true
            }
        };
        if changed {
            self.effects.push(Box::new(effect));
        }
    }

    pub fn updater(&self) -> Updater {
        Updater {
            root: self.root,
            work: self.work.clone(),
        }
    }
}

/// Shared handle to one piece of component state. Writes schedule a re-render
/// of the owning root.
pub struct State<T> {
    cell: Rc<RefCell<T>>,
    root: RootId,
    work: SharedWork,
}

impl<T> State<T> {
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&*self.cell.borrow())
    }

    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
        self.schedule_render();
    }

    pub fn update(&self, change: impl FnOnce(&mut T)) {
        change(&mut *self.cell.borrow_mut());
        self.schedule_render();
    }

    fn schedule_render(&self) {
        self.work.borrow_mut().dirty_roots.insert(self.root);
    }
}

impl<T: Clone> State<T> {
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            root: self.root,
            work: self.work.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &self.cell.borrow())
            .field("root", &self.root)
            .finish()
    }
}

/// Schedules work against a mounted root from outside the render pass.
#[derive(Clone)]
pub struct Updater {
    root: RootId,
    work: SharedWork,
}

impl Updater {
    /// Queues `task` to run during the next flush, after pending renders and
    /// effects.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.work.borrow_mut().deferred.push_back(Box::new(task));
    }

    pub fn request_render(&self) {
        self.work.borrow_mut().dirty_roots.insert(self.root);
    }

    pub fn root(&self) -> RootId {
        self.root
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater").field("root", &self.root).finish()
    }
}
