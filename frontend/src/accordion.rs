//! FAQ accordion: at most one panel open at a time.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::error::{Result, SiteError};

pub const TRIGGER: &str = ".faq-trigger";
const OPEN_CLASS: &str = "is-open";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accordion {
    panels: Vec<PanelState>,
}

impl Accordion {
    #[cfg(test)]
    pub fn new(len: usize) -> Self {
        Self {
            panels: vec![PanelState::default(); len],
        }
    }

    /// Starts from whatever the markup says. Only the first expanded panel
    /// is kept open.
    pub fn from_states(expanded: impl IntoIterator<Item = bool>) -> Self {
        let mut seen_open = false;
        let panels = expanded
            .into_iter()
            .map(|open| {
                let expanded = open && !seen_open;
                seen_open |= expanded;
                PanelState { expanded }
            })
            .collect();
        Self { panels }
    }

    #[cfg(test)]
    pub fn panels(&self) -> &[PanelState] {
        &self.panels
    }

    #[cfg(test)]
    pub fn open_panel(&self) -> Option<usize> {
        self.panels.iter().position(|p| p.expanded)
    }

    /// Trigger activation. Collapses everything, then opens `index` unless
    /// it was the open one. Out-of-range indices change nothing.
    pub fn activate(&mut self, index: usize) -> &[PanelState] {
        let Some(target) = self.panels.get(index).copied() else {
            return &self.panels;
        };
        for panel in &mut self.panels {
            panel.expanded = false;
        }
        if !target.expanded {
            self.panels[index].expanded = true;
        }
        &self.panels
    }
}

/// One trigger and the panel it names through `aria-controls`.
pub struct DomPanel {
    trigger: Element,
    panel: Element,
}

impl DomPanel {
    fn apply(&self, state: PanelState) {
        let _ = self
            .trigger
            .set_attribute("aria-expanded", bool_attr(state.expanded));
        let _ = self
            .panel
            .class_list()
            .toggle_with_force(OPEN_CLASS, state.expanded);
        let _ = self
            .panel
            .set_attribute("aria-hidden", bool_attr(!state.expanded));
    }

    pub fn trigger(&self) -> &Element {
        &self.trigger
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Collects triggers whose panel exists. Triggers without one stay inert.
pub fn find_panels(document: &Document) -> Result<Vec<DomPanel>> {
    let triggers = document.query_selector_all(TRIGGER)?;
    let mut panels = Vec::new();
    for i in 0..triggers.length() {
        let Some(trigger) = triggers
            .item(i)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let panel = trigger
            .get_attribute("aria-controls")
            .and_then(|id| document.get_element_by_id(&id));
        match panel {
            Some(panel) => panels.push(DomPanel { trigger, panel }),
            None => log::debug!("Accordion trigger {} has no panel", i),
        }
    }
    if panels.is_empty() {
        return Err(SiteError::MissingElement(TRIGGER));
    }
    Ok(panels)
}

pub fn initial_state(panels: &[DomPanel]) -> Accordion {
    Accordion::from_states(
        panels
            .iter()
            .map(|p| p.trigger.get_attribute("aria-expanded").as_deref() == Some("true")),
    )
}

pub fn render(panels: &[DomPanel], states: &[PanelState]) {
    for (panel, state) in panels.iter().zip(states) {
        panel.apply(*state);
    }
}
