use super::*;
use std::rc::Rc;

/// Declarative UI tree handed to [`Harness::mount`].
#[derive(Clone, Default)]
pub enum VNode {
    /// Renders nothing.
    #[default]
    Empty,
    Text(String),
    Element(ElementNode),
    /// Children rendered in order without a wrapping element.
    Fragment(Vec<VNode>),
    Component(ComponentNode),
    /// Renders an `<!-- ignore -->` comment; in [`Harness::assert_satisfies`]
    /// it matches any single node.
    Ignore,
}

#[derive(Clone)]
pub struct ElementNode {
    pub(crate) tag: String,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) value: Option<String>,
    pub(crate) checked: Option<bool>,
    pub(crate) listeners: Vec<(EventKind, EventHandler)>,
    pub(crate) children: Vec<VNode>,
}

#[derive(Clone)]
pub struct ComponentNode {
    pub(crate) name: String,
    pub(crate) component: Rc<dyn Component>,
}

/// Starts an element of the given tag.
pub fn h(tag: &str) -> ElementNode {
    ElementNode {
        tag: tag.to_ascii_lowercase(),
        attrs: BTreeMap::new(),
        value: None,
        checked: None,
        listeners: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(content: impl Into<String>) -> VNode {
    VNode::Text(content.into())
}

pub fn fragment<I, N>(children: I) -> VNode
where
    I: IntoIterator<Item = N>,
    N: Into<VNode>,
{
    VNode::Fragment(children.into_iter().map(Into::into).collect())
}

pub fn ignore() -> VNode {
    VNode::Ignore
}

pub fn component(component: impl Component) -> VNode {
    let name = component.name().to_string();
    VNode::Component(ComponentNode {
        name,
        component: Rc::new(component),
    })
}

impl ElementNode {
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Adds a class token, keeping the ones already present.
    pub fn class(mut self, class_name: &str) -> Self {
        let mut classes = class_tokens(self.attrs.get("class").map(String::as_str));
        for token in class_name.split_whitespace() {
            if !classes.iter().any(|existing| existing == token) {
                classes.push(token.to_string());
            }
        }
        if !classes.is_empty() {
            self.attrs.insert("class".to_string(), classes.join(" "));
        }
        self
    }

    /// Controlled value: written to the element's value on every render.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Controlled checked state: written to the element on every render.
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn disabled(self, disabled: bool) -> Self {
        if disabled {
            self.attr("disabled", "")
        } else {
            let mut this = self;
            this.attrs.remove("disabled");
            this
        }
    }

    pub fn on(mut self, kind: EventKind, handler: impl Fn(&Event) + 'static) -> Self {
        self.listeners.push((kind, Rc::new(handler)));
        self
    }

    pub fn on_click(self, handler: impl Fn(&Event) + 'static) -> Self {
        self.on(EventKind::Click, handler)
    }

    pub fn on_change(self, handler: impl Fn(&Event) + 'static) -> Self {
        self.on(EventKind::Change, handler)
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<VNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn text(self, content: impl Into<String>) -> Self {
        self.child(VNode::Text(content.into()))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl ComponentNode {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<ElementNode> for VNode {
    fn from(element: ElementNode) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for VNode {
    fn from(content: &str) -> Self {
        Self::Text(content.to_string())
    }
}

impl From<String> for VNode {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

impl From<Vec<VNode>> for VNode {
    fn from(children: Vec<VNode>) -> Self {
        Self::Fragment(children)
    }
}

impl<N: Into<VNode>> From<Option<N>> for VNode {
    fn from(node: Option<N>) -> Self {
        node.map(Into::into).unwrap_or(Self::Empty)
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(content) => f.debug_tuple("Text").field(content).finish(),
            Self::Element(element) => fmt::Debug::fmt(element, f),
            Self::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            Self::Component(node) => f.debug_tuple("Component").field(&node.name).finish(),
            Self::Ignore => f.write_str("Ignore"),
        }
    }
}

impl fmt::Debug for ElementNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self
            .listeners
            .iter()
            .map(|(kind, _)| kind.name())
            .collect::<Vec<_>>();
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attrs", &self.attrs)
            .field("value", &self.value)
            .field("checked", &self.checked)
            .field("listeners", &listeners)
            .field("children", &self.children)
            .finish()
    }
}
