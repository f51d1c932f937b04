//! Binds every component to the rendered page.
//!
//! Each `bind_*` either registers its handlers and listeners or returns the
//! reason it could not; one component failing never stops the rest.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Datelike;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::accordion;
use crate::clipboard::{self, BrowserClipboard, COPY_BUTTON};
use crate::config::SiteConfig;
use crate::dispatch::{Component, DispatchTable, EventKind, PageEvent, Response};
use crate::error::{Result, SiteError};
use crate::forms::dom::DomForm;
use crate::forms::{FormController, FormSpec};
use crate::nav::{self, DomNav, IN_PAGE_LINKS};
use crate::reveal::{self, RevealTracker};
use crate::storage::{DraftStore, LocalDraftStore, MemoryDraftStore};

pub type SharedTable = Rc<RefCell<DispatchTable>>;

pub struct Page {
    window: Window,
    document: Document,
    config: Rc<SiteConfig>,
    table: SharedTable,
}

impl Page {
    pub fn new(window: Window, document: Document, config: SiteConfig) -> Self {
        Self {
            window,
            document,
            config: Rc::new(config),
            table: Rc::new(RefCell::new(DispatchTable::new())),
        }
    }

    /// Binds all components and returns the ones that are active.
    pub fn bind_all(&self) -> Vec<Component> {
        if let Err(e) = self.bind_current_year() {
            debug!("Year stamp skipped: {}", e);
        }
        if let Err(e) = nav::mark_active_links(&self.document) {
            debug!("Active nav marking skipped: {}", e);
        }

        let steps: [(Component, fn(&Self) -> Result<()>); 7] = [
            (Component::SmoothScroll, Self::bind_smooth_scroll),
            (Component::NavToggle, Self::bind_nav_toggle),
            (Component::Accordion, Self::bind_accordion),
            (Component::Reveal, Self::bind_reveal),
            (Component::ContactForm, Self::bind_contact_form),
            (Component::JoinForm, Self::bind_join_form),
            (Component::CopyButton, Self::bind_copy_button),
        ];
        for (component, bind) in steps {
            match bind(self) {
                Ok(()) => debug!("Bound {}", component),
                Err(SiteError::MissingElement(what)) => {
                    debug!("{} disabled, no {} on this page", component, what)
                }
                Err(e) => warn!("{} disabled: {}", component, e),
            }
        }

        self.table.borrow().components()
    }

    /// Forwards a DOM event on `target` into the dispatch table.
    fn listen(
        &self,
        target: &EventTarget,
        component: Component,
        kind: EventKind,
        translate: impl Fn(&Event) -> Option<PageEvent> + 'static,
    ) -> Result<()> {
        let Some(name) = kind.dom_name() else {
            return Ok(());
        };
        let table = Rc::clone(&self.table);
        let callback = Closure::wrap(Box::new(move |event: Event| {
            let Some(page_event) = translate(&event) else {
                return;
            };
            let response = match table.try_borrow_mut() {
                Ok(mut table) => table.dispatch(component, &page_event),
                Err(_) => {
                    debug!("Dropped nested {:?} for {}", kind, component);
                    return;
                }
            };
            if response == Response::PreventDefault {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
        callback.forget();
        Ok(())
    }

    fn bind_current_year(&self) -> Result<()> {
        let year = self
            .document
            .get_element_by_id("year")
            .ok_or(SiteError::MissingElement("#year"))?;
        let current = chrono::Local::now().year().to_string();
        year.set_text_content(Some(current.as_str()));
        Ok(())
    }

    fn bind_smooth_scroll(&self) -> Result<()> {
        let links = self.document.query_selector_all(IN_PAGE_LINKS)?;
        if links.length() == 0 {
            return Err(SiteError::MissingElement(IN_PAGE_LINKS));
        }

        let window = self.window.clone();
        let document = self.document.clone();
        let gap = self.config.scroll_gap_px;
        self.table.borrow_mut().on(
            Component::SmoothScroll,
            EventKind::Click,
            move |event| {
                let PageEvent::Follow { href } = event else {
                    return Response::Ignored;
                };
                match nav::fragment_id(href) {
                    Some(id) if nav::scroll_to(&window, &document, id, gap) => {
                        Response::PreventDefault
                    }
                    _ => Response::Ignored,
                }
            },
        );

        for i in 0..links.length() {
            let Some(link) = links.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let source = link.clone();
            self.listen(&link, Component::SmoothScroll, EventKind::Click, move |_| {
                source
                    .get_attribute("href")
                    .map(|href| PageEvent::Follow { href })
            })?;
        }
        Ok(())
    }

    fn bind_nav_toggle(&self) -> Result<()> {
        let dom = DomNav::find(&self.document)?;
        let toggle = dom.toggle.clone();
        let container = dom.nav.clone();
        let mut menu = dom.initial_state();

        self.table
            .borrow_mut()
            .on(Component::NavToggle, EventKind::Click, move |event| {
                let changed = match event {
                    PageEvent::Activate { .. } => {
                        menu.toggle();
                        true
                    }
                    PageEvent::ClickInside { tag } => menu.follow(tag),
                    _ => false,
                };
                if !changed {
                    return Response::Ignored;
                }
                dom.render(menu);
                Response::Handled
            });

        self.listen(&toggle, Component::NavToggle, EventKind::Click, |_| {
            Some(PageEvent::Activate { index: 0 })
        })?;
        self.listen(&container, Component::NavToggle, EventKind::Click, |event| {
            let target = event.target()?.dyn_into::<Element>().ok()?;
            Some(PageEvent::ClickInside {
                tag: target.tag_name(),
            })
        })
    }

    fn bind_accordion(&self) -> Result<()> {
        let panels = accordion::find_panels(&self.document)?;
        let triggers: Vec<Element> = panels.iter().map(|p| p.trigger().clone()).collect();
        let mut state = accordion::initial_state(&panels);

        self.table
            .borrow_mut()
            .on(Component::Accordion, EventKind::Click, move |event| {
                let PageEvent::Activate { index } = event else {
                    return Response::Ignored;
                };
                let states = state.activate(*index);
                accordion::render(&panels, states);
                Response::Handled
            });

        for (index, trigger) in triggers.iter().enumerate() {
            self.listen(trigger, Component::Accordion, EventKind::Click, move |_| {
                Some(PageEvent::Activate { index })
            })?;
        }
        Ok(())
    }

    fn bind_reveal(&self) -> Result<()> {
        let table = Rc::clone(&self.table);
        let watched = reveal::watch(&self.document, &self.config, move |index, intersecting| {
            let event = PageEvent::Intersect {
                index,
                intersecting,
            };
            table
                .try_borrow_mut()
                .map(|mut table| table.dispatch(Component::Reveal, &event) == Response::Handled)
                .unwrap_or(false)
        })?;

        let mut tracker = RevealTracker::new(watched);
        self.table
            .borrow_mut()
            .on(Component::Reveal, EventKind::Intersect, move |event| match event {
                PageEvent::Intersect {
                    index,
                    intersecting,
                } if tracker.notify(*index, *intersecting) => Response::Handled,
                _ => Response::Ignored,
            });
        debug!("Watching {} reveal elements", watched);
        Ok(())
    }

    fn bind_contact_form(&self) -> Result<()> {
        let spec = FormSpec::contact(&self.config);
        self.bind_form(Component::ContactForm, FormController::new(spec))
    }

    fn bind_join_form(&self) -> Result<()> {
        let store: Box<dyn DraftStore> = match LocalDraftStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("Join form drafts will not persist: {}", e);
                Box::new(MemoryDraftStore::default())
            }
        };
        let spec = FormSpec::join(&self.config);
        self.bind_form(
            Component::JoinForm,
            FormController::new(spec).with_store(store),
        )
    }

    fn bind_form(&self, component: Component, controller: FormController) -> Result<()> {
        let mut view = DomForm::find(&self.document, controller.spec().form_id)?;
        let keeps_draft = controller.spec().draft_key.is_some();
        if keeps_draft {
            let restored = controller.restore(&mut view);
            if restored > 0 {
                info!("Restored {} saved fields into {}", restored, component);
            }
        }

        let form = view.element().clone();
        let bound = Rc::new(RefCell::new((controller, view)));

        let submit = Rc::clone(&bound);
        let mut table = self.table.borrow_mut();
        table.on(component, EventKind::Submit, move |_| {
            let mut bound = submit.borrow_mut();
            let (controller, view) = &mut *bound;
            controller.submit(view);
            Response::PreventDefault
        });
        if keeps_draft {
            let input = Rc::clone(&bound);
            table.on(component, EventKind::Input, move |_| {
                let bound = input.borrow();
                let (controller, view) = &*bound;
                controller.record(view);
                Response::Handled
            });
        }
        drop(table);

        self.listen(&form, component, EventKind::Submit, |_| Some(PageEvent::Submit))?;
        if keeps_draft {
            self.listen(&form, component, EventKind::Input, |_| Some(PageEvent::Input))?;
        }
        Ok(())
    }

    fn bind_copy_button(&self) -> Result<()> {
        let button = self
            .document
            .get_element_by_id(COPY_BUTTON)
            .ok_or(SiteError::MissingElement(COPY_BUTTON))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SiteError::MissingElement(COPY_BUTTON))?;

        let window = self.window.clone();
        let document = self.document.clone();
        let config = Rc::clone(&self.config);
        let target = button.clone();
        self.table
            .borrow_mut()
            .on(Component::CopyButton, EventKind::Click, move |_| {
                let backend = BrowserClipboard::new(window.clone(), document.clone());
                let config = Rc::clone(&config);
                let button = target.clone();
                spawn_local(async move {
                    let outcome = clipboard::copy_text(&backend, &config.contact_address).await;
                    clipboard::show_outcome(&button, outcome, &config);
                });
                Response::Handled
            });

        self.listen(&button, Component::CopyButton, EventKind::Click, |_| {
            Some(PageEvent::Activate { index: 0 })
        })
    }
}
