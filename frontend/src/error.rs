use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::DomException;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("element not found: {0}")]
    MissingElement(&'static str),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("intersection observer failed: {0}")]
    Observer(String),

    #[error("draft is not valid JSON: {0}")]
    Draft(#[from] serde_json::Error),

    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;

/// Readable text for a thrown JS value.
pub fn describe(err: &JsValue) -> String {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn is_quota_exceeded(err: &JsValue) -> bool {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return exception.name() == "QuotaExceededError";
    }
    describe(err).contains("QuotaExceededError")
}

/// Maps a failed `Storage` call onto the error taxonomy.
pub fn storage_error(err: JsValue) -> SiteError {
    if is_quota_exceeded(&err) {
        SiteError::QuotaExceeded
    } else {
        SiteError::Storage(describe(&err))
    }
}

impl From<JsValue> for SiteError {
    fn from(err: JsValue) -> Self {
        SiteError::Js(describe(&err))
    }
}
