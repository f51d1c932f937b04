//! Header navigation: in-page smooth scrolling, the mobile menu toggle and
//! the active-page marker.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::error::{Result, SiteError};

pub const IN_PAGE_LINKS: &str = "a[href^=\"#\"]";
pub const NAV_TOGGLE: &str = ".nav-toggle";
pub const NAV: &str = ".nav";
const HEADER: &str = ".site-header";
const NAV_LINKS: &str = ".nav-list .nav-link[data-page]";
const OPEN_CLASS: &str = "is-open";
const ACTIVE_CLASS: &str = "nav-link--active";

/// Element id referenced by an in-page link, if any. A bare `#` refers to
/// nothing.
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Document offset to scroll to so the target clears the fixed header by
/// `gap` pixels.
pub fn scroll_offset(target_top: f64, scroll_y: f64, header_height: f64, gap: f64) -> f64 {
    target_top + scroll_y - header_height - gap
}

pub fn is_active(page: Option<&str>, link_page: Option<&str>) -> bool {
    matches!((page, link_page), (Some(page), Some(link)) if !page.is_empty() && page == link)
}

/// Mobile menu state, mirrored into `aria-expanded` and `is-open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavMenu {
    pub open: bool,
}

impl NavMenu {
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Closes the menu when a link inside it is followed. Other clicks in
    /// the menu are ignored.
    pub fn follow(&mut self, tag: &str) -> bool {
        if tag.eq_ignore_ascii_case("a") {
            self.open = false;
            true
        } else {
            false
        }
    }
}

/// Smoothly scrolls to the element with `id`. Returns false when the page
/// has no such element.
pub fn scroll_to(window: &Window, document: &Document, id: &str, gap: f64) -> bool {
    let Some(target) = document.get_element_by_id(id) else {
        return false;
    };
    let header_height = document
        .query_selector(HEADER)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|el| f64::from(el.offset_height()))
        .unwrap_or(0.0);
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let top = scroll_offset(
        target.get_bounding_client_rect().top(),
        scroll_y,
        header_height,
        gap,
    );

    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
    true
}

pub struct DomNav {
    pub toggle: Element,
    pub nav: Element,
}

impl DomNav {
    pub fn find(document: &Document) -> Result<Self> {
        let toggle = document
            .query_selector(NAV_TOGGLE)?
            .ok_or(SiteError::MissingElement(NAV_TOGGLE))?;
        let nav = document
            .query_selector(NAV)?
            .ok_or(SiteError::MissingElement(NAV))?;
        Ok(Self { toggle, nav })
    }

    pub fn initial_state(&self) -> NavMenu {
        NavMenu {
            open: self.toggle.get_attribute("aria-expanded").as_deref() == Some("true"),
        }
    }

    pub fn render(&self, menu: NavMenu) {
        let _ = self
            .toggle
            .set_attribute("aria-expanded", if menu.open { "true" } else { "false" });
        let _ = self.nav.class_list().toggle_with_force(OPEN_CLASS, menu.open);
    }
}

/// Marks the nav links for the current page. Returns how many matched.
pub fn mark_active_links(document: &Document) -> Result<usize> {
    let page = document
        .body()
        .and_then(|body| body.get_attribute("data-page"));
    if page.as_deref().map_or(true, str::is_empty) {
        return Ok(0);
    }
    let links = document.query_selector_all(NAV_LINKS)?;
    let mut marked = 0;
    for i in 0..links.length() {
        let Some(link) = links.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if is_active(page.as_deref(), link.get_attribute("data-page").as_deref()) {
            let _ = link.class_list().add_1(ACTIVE_CLASS);
            marked += 1;
        }
    }
    Ok(marked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_ids() {
        assert_eq!(fragment_id("#pricing"), Some("pricing"));
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id(""), None);
        assert_eq!(fragment_id("/about#team"), None);
    }

    #[test]
    fn offset_clears_header() {
        assert_eq!(scroll_offset(500.0, 1200.0, 72.0, 8.0), 1620.0);
        assert_eq!(scroll_offset(500.0, 0.0, 0.0, 8.0), 492.0);
        assert_eq!(scroll_offset(-300.0, 1000.0, 60.0, 8.0), 632.0);
    }

    #[test]
    fn active_page_matching() {
        assert!(is_active(Some("about"), Some("about")));
        assert!(!is_active(Some("about"), Some("home")));
        assert!(!is_active(None, Some("about")));
        assert!(!is_active(Some("about"), None));
        assert!(!is_active(Some(""), Some("")));
    }

    #[test]
    fn menu_toggles() {
        let mut menu = NavMenu::default();
        assert!(menu.toggle());
        assert!(!menu.toggle());
    }

    #[test]
    fn following_a_link_closes_menu() {
        let mut menu = NavMenu { open: true };
        assert!(!menu.follow("SPAN"));
        assert!(menu.open);
        assert!(menu.follow("A"));
        assert!(!menu.open);
    }
}
