//! "Copy email" call-to-action.

use gloo_timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{js_sys::Reflect, Document, HtmlDocument, HtmlElement, HtmlInputElement, Window};

use crate::config::SiteConfig;
use crate::error::{describe, Result, SiteError};

pub const COPY_BUTTON: &str = "cta-email-btn";
const EMPHASIS_CLASS: &str = "btn-primary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

/// The two ways a page can put text on the clipboard.
#[allow(async_fn_in_trait)]
pub trait CopyBackend {
    /// Whether the asynchronous Clipboard API exists at all.
    fn has_clipboard_api(&self) -> bool;

    async fn write_text(&self, text: &str) -> Result<()>;

    /// `execCommand("copy")` on a throwaway input.
    fn legacy_copy(&self, text: &str) -> Result<()>;
}

/// One best-effort copy: the Clipboard API first, then the legacy command.
pub async fn copy_text<B: CopyBackend>(backend: &B, text: &str) -> CopyOutcome {
    if backend.has_clipboard_api() {
        match backend.write_text(text).await {
            Ok(()) => return CopyOutcome::Copied,
            Err(e) => log::debug!("Clipboard API refused, trying execCommand: {}", e),
        }
    }
    match backend.legacy_copy(text) {
        Ok(()) => CopyOutcome::Copied,
        Err(e) => {
            log::warn!("Copy failed: {}", e);
            CopyOutcome::Failed
        }
    }
}

/// Button text while the outcome is shown. On failure the address itself is
/// shown so it can be copied by hand.
pub fn outcome_label(outcome: CopyOutcome, config: &SiteConfig) -> &str {
    match outcome {
        CopyOutcome::Copied => &config.copied_label,
        CopyOutcome::Failed => &config.contact_address,
    }
}

/// Label to restore afterwards.
pub fn resting_label(current: Option<String>, config: &SiteConfig) -> String {
    current
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| config.fallback_label.clone())
}

pub struct BrowserClipboard {
    window: Window,
    document: Document,
}

impl BrowserClipboard {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}

impl CopyBackend for BrowserClipboard {
    fn has_clipboard_api(&self) -> bool {
        Reflect::get(&self.window.navigator(), &JsValue::from_str("clipboard"))
            .map(|api| !api.is_undefined() && !api.is_null())
            .unwrap_or(false)
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        let promise = self.window.navigator().clipboard().write_text(text);
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| SiteError::Clipboard(describe(&e)))
    }

    fn legacy_copy(&self, text: &str) -> Result<()> {
        let body = self
            .document
            .body()
            .ok_or(SiteError::MissingElement("body"))?;
        let input = self
            .document
            .create_element("input")?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| SiteError::Clipboard("could not create input".to_string()))?;
        input.set_value(text);
        body.append_child(&input)?;
        input.select();

        let copied = self
            .document
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| SiteError::Clipboard("execCommand unavailable".to_string()))
            .and_then(|doc| {
                doc.exec_command("copy")
                    .map_err(|e| SiteError::Clipboard(describe(&e)))
            });
        let _ = body.remove_child(&input);

        exec_command_outcome(copied)
    }
}

/// Only a thrown `execCommand` counts as a failed copy. Browsers report
/// `false` inconsistently, so the returned flag is not trusted either way.
fn exec_command_outcome(result: Result<bool>) -> Result<()> {
    result.map(|_| ())
}

/// Shows `outcome` on the button, then puts the original label back after
/// the configured delay.
pub fn show_outcome(button: &HtmlElement, outcome: CopyOutcome, config: &SiteConfig) {
    let resting = resting_label(button.text_content(), config);
    button.set_text_content(Some(outcome_label(outcome, config)));
    let _ = button.class_list().add_1(EMPHASIS_CLASS);

    let button = button.clone();
    Timeout::new(config.label_reset_ms, move || {
        button.set_text_content(Some(resting.as_str()));
        let _ = button.class_list().remove_1(EMPHASIS_CLASS);
    })
    .forget();
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;

    use super::*;

    #[derive(Default)]
    struct ScriptedBackend {
        api: bool,
        api_fails: bool,
        legacy_fails: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl CopyBackend for ScriptedBackend {
        fn has_clipboard_api(&self) -> bool {
            self.api
        }

        async fn write_text(&self, _text: &str) -> Result<()> {
            self.calls.borrow_mut().push("api");
            if self.api_fails {
                Err(SiteError::Clipboard("NotAllowedError".to_string()))
            } else {
                Ok(())
            }
        }

        fn legacy_copy(&self, _text: &str) -> Result<()> {
            self.calls.borrow_mut().push("legacy");
            if self.legacy_fails {
                Err(SiteError::Clipboard("refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn clipboard_api_is_preferred() {
        let backend = ScriptedBackend {
            api: true,
            ..Default::default()
        };
        assert_eq!(block_on(copy_text(&backend, "x")), CopyOutcome::Copied);
        assert_eq!(*backend.calls.borrow(), vec!["api"]);
    }

    #[test]
    fn falls_back_when_api_rejects() {
        let backend = ScriptedBackend {
            api: true,
            api_fails: true,
            ..Default::default()
        };
        assert_eq!(block_on(copy_text(&backend, "x")), CopyOutcome::Copied);
        assert_eq!(*backend.calls.borrow(), vec!["api", "legacy"]);
    }

    #[test]
    fn falls_back_when_api_missing() {
        let backend = ScriptedBackend::default();
        assert_eq!(block_on(copy_text(&backend, "x")), CopyOutcome::Copied);
        assert_eq!(*backend.calls.borrow(), vec!["legacy"]);
    }

    #[test]
    fn both_paths_failing_is_reported_once() {
        let backend = ScriptedBackend {
            api: true,
            api_fails: true,
            legacy_fails: true,
            ..Default::default()
        };
        assert_eq!(block_on(copy_text(&backend, "x")), CopyOutcome::Failed);
        assert_eq!(backend.calls.borrow().len(), 2);
    }

    #[test]
    fn declined_exec_command_still_counts_as_copied() {
        assert!(exec_command_outcome(Ok(false)).is_ok());
        assert!(exec_command_outcome(Ok(true)).is_ok());
        assert!(exec_command_outcome(Err(SiteError::Clipboard("SecurityError".into()))).is_err());
    }

    #[test]
    fn legacy_declined_without_throwing_is_copied() {
        struct DecliningBackend;

        impl CopyBackend for DecliningBackend {
            fn has_clipboard_api(&self) -> bool {
                false
            }

            async fn write_text(&self, _text: &str) -> Result<()> {
                unreachable!("clipboard api is absent")
            }

            fn legacy_copy(&self, _text: &str) -> Result<()> {
                exec_command_outcome(Ok(false))
            }
        }

        let outcome = block_on(copy_text(&DecliningBackend, "x"));
        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(
            outcome_label(outcome, &SiteConfig::default()),
            "Email copied"
        );
    }

    #[test]
    fn labels() {
        let config = SiteConfig::default();
        assert_eq!(outcome_label(CopyOutcome::Copied, &config), "Email copied");
        assert_eq!(outcome_label(CopyOutcome::Failed, &config), "hello@xcoudlabs.ai");
        assert_eq!(resting_label(Some("Email us".to_string()), &config), "Email us");
        assert_eq!(resting_label(Some(String::new()), &config), "Copy email");
        assert_eq!(resting_label(None, &config), "Copy email");
    }
}
