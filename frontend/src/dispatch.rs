//! Routes page events to component handlers.
//!
//! DOM listeners translate browser events into [`PageEvent`]s and hand them
//! to a [`DispatchTable`]; handlers never see a raw `web_sys::Event`, so
//! they can be driven directly in tests.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    SmoothScroll,
    NavToggle,
    Accordion,
    Reveal,
    ContactForm,
    JoinForm,
    CopyButton,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::SmoothScroll => "smooth-scroll",
            Component::NavToggle => "nav-toggle",
            Component::Accordion => "accordion",
            Component::Reveal => "reveal",
            Component::ContactForm => "contact-form",
            Component::JoinForm => "join-form",
            Component::CopyButton => "copy-button",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Input,
    Intersect,
}

impl EventKind {
    /// DOM event name a listener subscribes to, if any.
    pub fn dom_name(self) -> Option<&'static str> {
        match self {
            EventKind::Click => Some("click"),
            EventKind::Submit => Some("submit"),
            EventKind::Input => Some("input"),
            EventKind::Intersect => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The component's element at `index` was clicked.
    Activate { index: usize },
    /// An in-page link was clicked.
    Follow { href: String },
    /// A click landed inside a container, on an element with this tag.
    ClickInside { tag: String },
    Submit,
    Input,
    Intersect { index: usize, intersecting: bool },
}

impl PageEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::Activate { .. } | PageEvent::Follow { .. } | PageEvent::ClickInside { .. } => {
                EventKind::Click
            }
            PageEvent::Submit => EventKind::Submit,
            PageEvent::Input => EventKind::Input,
            PageEvent::Intersect { .. } => EventKind::Intersect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Nothing to do; the browser default stands.
    Ignored,
    Handled,
    /// Handled, and the browser default must be suppressed.
    PreventDefault,
}

pub type Handler = Box<dyn FnMut(&PageEvent) -> Response>;

#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<(Component, EventKind), Handler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for `(component, kind)`, replacing any earlier
    /// one.
    pub fn on(
        &mut self,
        component: Component,
        kind: EventKind,
        handler: impl FnMut(&PageEvent) -> Response + 'static,
    ) -> &mut Self {
        self.handlers.insert((component, kind), Box::new(handler));
        self
    }

    pub fn dispatch(&mut self, component: Component, event: &PageEvent) -> Response {
        match self.handlers.get_mut(&(component, event.kind())) {
            Some(handler) => handler(event),
            None => Response::Ignored,
        }
    }

    /// Components with at least one handler, in declaration order.
    pub fn components(&self) -> Vec<Component> {
        let mut components: Vec<_> = self.handlers.keys().map(|(c, _)| *c).collect();
        components.sort();
        components.dedup();
        components
    }
}
