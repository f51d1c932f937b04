use log::info;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Window};

mod accordion;
mod boot;
mod clipboard;
mod config;
mod dispatch;
mod error;
mod forms;
mod nav;
mod reveal;
mod storage;
mod validation;

use boot::Page;
use config::{SiteConfig, CONFIG_ATTRIBUTE};

fn start(window: Window, document: Document) {
    let config = SiteConfig::from_attribute(
        document
            .body()
            .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE))
            .as_deref(),
    );
    log::set_max_level(config.log_level().to_level_filter());

    let page = Page::new(window, document, config);
    let active = page.bind_all();
    info!(
        "Site interactions ready: {}",
        active
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging. The page config may lower the level in `start`.
    console_log::init_with_level(log::Level::Trace).expect("error initializing log");
    log::set_max_level(config::default_log_level().to_level_filter());

    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    if document.ready_state() == "loading" {
        let target = document.clone();
        let on_ready = Closure::once_into_js(move || start(window, document));
        let _ = target
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    } else {
        start(window, document);
    }
}
