//! Deterministic component mounting and event simulation for Rust tests.
//!
//! A [`Harness`] owns a synthetic DOM, the registry of mounted roots and the
//! pending-work queues of the component runtime. Trees built from [`VNode`]s are
//! mounted into it, and [`Harness::simulate`] / [`Harness::simulate_events`]
//! dispatch synthetic events against the mounted output.
//!
//! ```
//! use component_tester::{Harness, Result, h};
//!
//! fn main() -> Result<()> {
//!     let mut harness = Harness::new();
//!     let handle = harness.mount(h("p").attr("class", "greeting").text("hi"))?;
//!     let node = handle.node().expect("single root node");
//!     assert_eq!(harness.text_content(node), "hi");
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::error::Error as StdError;
use std::fmt;

mod assertions;
mod component;
mod core_dom_utils;
mod dom;
mod harness_api;
mod mount;
mod render;
mod runtime_state;
mod selector;
mod simulate;
mod vnode;

use core_dom_utils::*;
use dom::Dom;
use runtime_state::*;
use selector::*;

pub use component::{Component, Hooks, State, Updater};
pub use core_dom_utils::NodeId;
pub use harness_api::{Harness, HarnessConfig};
pub use mount::{Container, Fragment, MountHandle, MountOptions, RootId};
pub use simulate::{
    ElementWrapper, Event, EventArgs, EventData, EventDescriptor, EventKind, Events,
    SUPPORTED_EVENTS_REFERENCE, SimulateArg, simulate_args,
};
pub use vnode::{ComponentNode, ElementNode, VNode, component, fragment, h, ignore, text};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidArgument(String),
    TargetNotFound {
        event_type: String,
        selector: String,
        tree: String,
    },
    UnsupportedEvent(String),
    UnsupportedSelector(String),
    NodeNotFound(String),
    FlushLimitExceeded {
        limit: usize,
        steps: usize,
    },
    InvalidPattern(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "{msg}"),
            Self::TargetNotFound {
                event_type,
                selector,
                tree,
            } => write!(f, "Could not trigger {event_type} on '{selector}' in\n{tree}"),
            Self::UnsupportedEvent(event_type) => write!(
                f,
                "Event '{event_type}' is not supported by Simulate\nSee {SUPPORTED_EVENTS_REFERENCE}"
            ),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::NodeNotFound(what) => write!(f, "node not found: {what}"),
            Self::FlushLimitExceeded { limit, steps } => write!(
                f,
                "flush exceeded max steps (possible infinite update loop): limit={limit}, steps={steps}"
            ),
            Self::InvalidPattern(msg) => write!(f, "invalid pattern: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests;
