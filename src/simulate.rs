use super::*;
use std::cell::Cell;

/// Where the unsupported-event error points readers for the supported names.
pub const SUPPORTED_EVENTS_REFERENCE: &str =
    "https://docs.rs/component_tester/latest/component_tester/enum.EventKind.html";

const ARITY_MESSAGE: &str = "simulate takes either one or two arguments";
const MISSING_TYPE_MESSAGE: &str = "All events must have a type";

macro_rules! event_kinds {
    ($($variant:ident => $name:literal, $method:ident, $method_with:ident, bubbles: $bubbles:literal;)*) => {
        /// Closed set of event names the dispatcher supports.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EventKind {
            $($variant,)*
        }

        impl EventKind {
            pub const ALL: &'static [EventKind] = &[$(EventKind::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn bubbles(self) -> bool {
                match self {
                    $(Self::$variant => $bubbles,)*
                }
            }
        }

        impl ElementWrapper<'_> {
            $(
                #[doc = concat!("Dispatches `", $name, "` on the bound node.")]
                pub fn $method(&mut self) -> Result<&mut Self> {
                    self.dispatch_kind(EventKind::$variant, EventArgs::default())
                }

                #[doc = concat!("Dispatches `", $name, "` with a target selector and/or event data.")]
                pub fn $method_with(&mut self, args: impl Into<EventArgs>) -> Result<&mut Self> {
                    self.dispatch_kind(EventKind::$variant, args.into())
                }
            )*
        }
    };
}

event_kinds! {
    Click => "click", click, click_with, bubbles: true;
    DoubleClick => "doubleClick", double_click, double_click_with, bubbles: true;
    ContextMenu => "contextMenu", context_menu, context_menu_with, bubbles: true;
    Change => "change", change, change_with, bubbles: true;
    Input => "input", input, input_with, bubbles: true;
    Submit => "submit", submit, submit_with, bubbles: true;
    Reset => "reset", reset, reset_with, bubbles: true;
    Select => "select", select, select_with, bubbles: true;
    Focus => "focus", focus, focus_with, bubbles: true;
    Blur => "blur", blur, blur_with, bubbles: true;
    KeyDown => "keyDown", key_down, key_down_with, bubbles: true;
    KeyUp => "keyUp", key_up, key_up_with, bubbles: true;
    KeyPress => "keyPress", key_press, key_press_with, bubbles: true;
    MouseDown => "mouseDown", mouse_down, mouse_down_with, bubbles: true;
    MouseUp => "mouseUp", mouse_up, mouse_up_with, bubbles: true;
    MouseMove => "mouseMove", mouse_move, mouse_move_with, bubbles: true;
    MouseOver => "mouseOver", mouse_over, mouse_over_with, bubbles: true;
    MouseOut => "mouseOut", mouse_out, mouse_out_with, bubbles: true;
    MouseEnter => "mouseEnter", mouse_enter, mouse_enter_with, bubbles: false;
    MouseLeave => "mouseLeave", mouse_leave, mouse_leave_with, bubbles: false;
    Scroll => "scroll", scroll, scroll_with, bubbles: false;
    Wheel => "wheel", wheel, wheel_with, bubbles: true;
    Copy => "copy", copy, copy_with, bubbles: true;
    Cut => "cut", cut, cut_with, bubbles: true;
    Paste => "paste", paste, paste_with, bubbles: true;
    DragStart => "dragStart", drag_start, drag_start_with, bubbles: true;
    Drag => "drag", drag, drag_with, bubbles: true;
    DragEnd => "dragEnd", drag_end, drag_end_with, bubbles: true;
    Drop => "drop", drop, drop_with, bubbles: true;
    TouchStart => "touchStart", touch_start, touch_start_with, bubbles: true;
    TouchMove => "touchMove", touch_move, touch_move_with, bubbles: true;
    TouchEnd => "touchEnd", touch_end, touch_end_with, bubbles: true;
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options passed through to handlers. `value` and `checked` are also written
/// to the target before a `change` is dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventData {
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub key: Option<String>,
    pub key_code: Option<u32>,
    pub extra: BTreeMap<String, String>,
}

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = Some(key_code);
        self
    }

    pub fn with_extra(mut self, name: &str, value: impl Into<String>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }
}

/// One event of a [`Harness::simulate_events`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDescriptor {
    pub event_type: Option<String>,
    pub target: Option<String>,
    pub value: Option<String>,
    pub data: EventData,
}

impl EventDescriptor {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Self::default()
        }
    }

    pub fn target(mut self, selector: impl Into<String>) -> Self {
        self.target = Some(selector.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }
}

impl From<&str> for EventDescriptor {
    fn from(event_type: &str) -> Self {
        Self::new(event_type)
    }
}

impl From<String> for EventDescriptor {
    fn from(event_type: String) -> Self {
        Self::new(event_type)
    }
}

impl From<EventKind> for EventDescriptor {
    fn from(kind: EventKind) -> Self {
        Self::new(kind.name())
    }
}

/// Ordered descriptors of one call; a single string or descriptor becomes a
/// one-element sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Events(pub Vec<EventDescriptor>);

impl From<&str> for Events {
    fn from(event_type: &str) -> Self {
        Self(vec![event_type.into()])
    }
}

impl From<String> for Events {
    fn from(event_type: String) -> Self {
        Self(vec![event_type.into()])
    }
}

impl From<EventKind> for Events {
    fn from(kind: EventKind) -> Self {
        Self(vec![kind.into()])
    }
}

impl From<EventDescriptor> for Events {
    fn from(descriptor: EventDescriptor) -> Self {
        Self(vec![descriptor])
    }
}

impl<T: Into<EventDescriptor>> From<Vec<T>> for Events {
    fn from(descriptors: Vec<T>) -> Self {
        Self(descriptors.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<EventDescriptor>, const N: usize> From<[T; N]> for Events {
    fn from(descriptors: [T; N]) -> Self {
        Self(descriptors.into_iter().map(Into::into).collect())
    }
}

/// Arguments of a fluent call: an optional target selector and event data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventArgs {
    pub selector: Option<String>,
    pub data: EventData,
}

impl From<()> for EventArgs {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<&str> for EventArgs {
    fn from(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            data: EventData::default(),
        }
    }
}

impl From<String> for EventArgs {
    fn from(selector: String) -> Self {
        Self {
            selector: Some(selector),
            data: EventData::default(),
        }
    }
}

impl From<EventData> for EventArgs {
    fn from(data: EventData) -> Self {
        Self {
            selector: None,
            data,
        }
    }
}

impl From<(&str, EventData)> for EventArgs {
    fn from((selector, data): (&str, EventData)) -> Self {
        Self {
            selector: Some(selector.to_string()),
            data,
        }
    }
}

/// Synthetic event as seen by handlers.
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    target: NodeId,
    current_target: Cell<NodeId>,
    target_value: String,
    target_checked: bool,
    data: EventData,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub(crate) fn new(
        kind: EventKind,
        target: NodeId,
        target_value: String,
        target_checked: bool,
        data: EventData,
    ) -> Self {
        Self {
            kind,
            target,
            current_target: Cell::new(target),
            target_value,
            target_checked,
            data,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.name()
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    /// Value of the target element when the event was dispatched.
    pub fn target_value(&self) -> &str {
        &self.target_value
    }

    pub fn target_checked(&self) -> bool {
        self.target_checked
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Chainable event helpers bound to one node, produced by
/// [`Harness::simulate`].
#[derive(Debug)]
pub struct ElementWrapper<'h> {
    harness: &'h mut Harness,
    node: NodeId,
}

impl ElementWrapper<'_> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn harness(&mut self) -> &mut Harness {
        self.harness
    }

    /// Dispatches an event by name; unknown names fail like the two-argument
    /// form does.
    pub fn fire(&mut self, event_type: &str, args: impl Into<EventArgs>) -> Result<&mut Self> {
        let EventArgs { selector, data } = args.into();
        let value = data.value.clone();
        self.harness
            .trigger(self.node, event_type, selector.as_deref(), value, data)?;
        Ok(self)
    }

    fn dispatch_kind(&mut self, kind: EventKind, args: EventArgs) -> Result<&mut Self> {
        self.fire(kind.name(), args)
    }
}

/// Positional argument of the legacy [`simulate_args`] entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulateArg {
    Node(NodeId),
    Events(Events),
}

impl From<NodeId> for SimulateArg {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<Events> for SimulateArg {
    fn from(events: Events) -> Self {
        Self::Events(events)
    }
}

impl From<EventDescriptor> for SimulateArg {
    fn from(descriptor: EventDescriptor) -> Self {
        Self::Events(descriptor.into())
    }
}

impl From<&str> for SimulateArg {
    fn from(event_type: &str) -> Self {
        Self::Events(event_type.into())
    }
}

/// Positional call shape: `[node]` returns the fluent wrapper, `[node, events]`
/// dispatches immediately. Any other arity fails before dispatching anything.
pub fn simulate_args(
    harness: &mut Harness,
    args: Vec<SimulateArg>,
) -> Result<Option<ElementWrapper<'_>>> {
    if args.is_empty() || args.len() > 2 {
        return Err(Error::InvalidArgument(ARITY_MESSAGE.into()));
    }
    let mut args = args.into_iter();
    let Some(SimulateArg::Node(node)) = args.next() else {
        return Err(Error::InvalidArgument(
            "simulate expects a mounted node as its first argument".into(),
        ));
    };
    match args.next() {
        None => Ok(Some(harness.simulate(node))),
        Some(SimulateArg::Events(events)) => {
            harness.simulate_events(node, events)?;
            Ok(None)
        }
        Some(SimulateArg::Node(_)) => Err(Error::InvalidArgument(
            "simulate expects event descriptors as its second argument".into(),
        )),
    }
}

impl Harness {
    /// Binds the fluent event helpers to `node`. Nothing is dispatched yet.
    pub fn simulate(&mut self, node: NodeId) -> ElementWrapper<'_> {
        ElementWrapper {
            harness: self,
            node,
        }
    }

    /// Dispatches `events` in order against `node` or the elements their
    /// `target` selectors resolve to inside it.
    ///
    /// Each descriptor is fully applied before the next one is validated, so a
    /// failing descriptor leaves the effects of earlier ones in place.
    pub fn simulate_events(&mut self, node: NodeId, events: impl Into<Events>) -> Result<()> {
        let Events(descriptors) = events.into();
        for descriptor in descriptors {
            let Some(event_type) = descriptor.event_type.as_deref() else {
                return Err(Error::InvalidArgument(MISSING_TYPE_MESSAGE.into()));
            };
            let value = descriptor
                .value
                .clone()
                .or_else(|| descriptor.data.value.clone());
            self.trigger(
                node,
                event_type,
                descriptor.target.as_deref(),
                value,
                descriptor.data.clone(),
            )?;
        }
        Ok(())
    }

    pub(crate) fn trigger(
        &mut self,
        root: NodeId,
        event_type: &str,
        selector: Option<&str>,
        value: Option<String>,
        data: EventData,
    ) -> Result<()> {
        self.dom.ensure_node(root)?;
        let target = match selector {
            Some(selector) => match self.dom.query_selector_inclusive(root, selector)? {
                Some(target) => target,
                None => {
                    return Err(Error::TargetNotFound {
                        event_type: event_type.to_string(),
                        selector: selector.to_string(),
                        tree: self.dom.pretty_node(root),
                    });
                }
            },
            None => root,
        };

        if event_type == EventKind::Change.name() {
            if let Some(value) = value.as_deref() {
                self.dom.set_value(target, value)?;
            }
            if let Some(checked) = data.checked {
                self.dom.set_checked(target, checked)?;
            }
        }

        let kind = EventKind::from_name(event_type)
            .ok_or_else(|| Error::UnsupportedEvent(event_type.to_string()))?;

        self.act(|this| this.dispatch_event(target, kind, data))
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        kind: EventKind,
        data: EventData,
    ) -> Result<()> {
        let event = Event::new(
            kind,
            target,
            self.dom.value(target).unwrap_or_default().to_string(),
            self.dom.checked(target).unwrap_or(false),
            data,
        );

        let mut path = vec![target];
        if kind.bubbles() {
            let mut cursor = self.dom.parent(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = self.dom.parent(node);
            }
        }

        for node in path {
            event.current_target.set(node);
            let listeners = self.listeners.get(node, kind);
            if !listeners.is_empty() && self.trace_state.enabled {
                let phase = if node == target { "target" } else { "bubble" };
                let line = format!(
                    "[event] {} target={} current={} phase={} listeners={}",
                    kind,
                    self.dom.node_label(target),
                    self.dom.node_label(node),
                    phase,
                    listeners.len()
                );
                self.trace_event_line(line);
            }
            for listener in listeners {
                (listener.handler)(&event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        if self.trace_state.enabled {
            let line = format!(
                "[event] done {} target={} default_prevented={} propagation_stopped={}",
                kind,
                self.dom.node_label(target),
                event.is_default_prevented(),
                event.is_propagation_stopped()
            );
            self.trace_event_line(line);
        }
        Ok(())
    }
}
