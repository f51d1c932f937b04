//! One-shot reveal of `.reveal` elements as they scroll into view.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    js_sys::Array, Document, Element, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::config::SiteConfig;
use crate::error::{describe, Result, SiteError};

pub const REVEAL: &str = ".reveal";
const VISIBLE_CLASS: &str = "is-visible";

/// Tracks which watched elements have been revealed. Reveals are
/// permanent.
#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(len: usize) -> Self {
        Self {
            revealed: vec![false; len],
        }
    }

    #[cfg(test)]
    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    /// Feeds one notification. Returns true only the first time `index` is
    /// seen intersecting.
    pub fn notify(&mut self, index: usize, intersecting: bool) -> bool {
        match self.revealed.get_mut(index) {
            Some(revealed) if intersecting && !*revealed => {
                *revealed = true;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.revealed.iter().filter(|r| !**r).count()
    }
}

fn elements(document: &Document) -> Result<Vec<Element>> {
    let nodes = document.query_selector_all(REVEAL)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Observes every reveal element. `on_intersect` receives the element's
/// index and whether it is intersecting; when it returns true the element
/// is marked visible and no longer observed. Returns how many elements are
/// watched.
pub fn watch(
    document: &Document,
    config: &SiteConfig,
    mut on_intersect: impl FnMut(usize, bool) -> bool + 'static,
) -> Result<usize> {
    let targets = elements(document)?;
    if targets.is_empty() {
        return Err(SiteError::MissingElement(REVEAL));
    }
    let count = targets.len();
    let targets = Rc::new(targets);

    let lookup = Rc::clone(&targets);
    let callback = Closure::wrap(Box::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let Some(index) = lookup.iter().position(|el| *el == target) else {
                    continue;
                };
                if on_intersect(index, entry.is_intersecting()) {
                    let _ = target.class_list().add_1(VISIBLE_CLASS);
                    observer.unobserve(&target);
                }
            }
        },
    ) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
    options.set_root_margin(&config.reveal_root_margin);

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|e| SiteError::Observer(describe(&e)))?;
    for target in targets.iter() {
        observer.observe(target);
    }

    // The observer holds the callback for the rest of the page's life.
    callback.forget();
    Ok(count)
}
