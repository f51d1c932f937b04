use log::Level;
use serde::Deserialize;

/// Attribute on `<body>` that may carry a JSON override of [`SiteConfig`].
pub const CONFIG_ATTRIBUTE: &str = "data-site-config";

#[cfg(debug_assertions)]
pub fn default_log_level() -> Level {
    Level::Debug // Local builds
}

#[cfg(not(debug_assertions))]
pub fn default_log_level() -> Level {
    Level::Info
}

/// Tunables for the page behaviors. Every field has a default, so the
/// override JSON only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub log_level: Option<String>,
    pub draft_key: String,
    pub contact_address: String,
    pub copied_label: String,
    pub fallback_label: String,
    pub label_reset_ms: u32,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub scroll_gap_px: f64,
    pub contact_success: String,
    pub join_success: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            draft_key: "xcoudlabs-join".to_string(),
            contact_address: "hello@xcoudlabs.ai".to_string(),
            copied_label: "Email copied".to_string(),
            fallback_label: "Copy email".to_string(),
            label_reset_ms: 2200,
            reveal_threshold: 0.14,
            reveal_root_margin: "0px 0px -10% 0px".to_string(),
            scroll_gap_px: 8.0,
            contact_success: "Message sent. We’ll get back to you shortly.".to_string(),
            join_success: "Thanks for reaching out! We’ll review your details and get back to you."
                .to_string(),
        }
    }
}

impl SiteConfig {
    /// Parses the override attribute. Anything unreadable falls back to the
    /// defaults so a typo in the markup never disables the page.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring malformed {}: {}", CONFIG_ATTRIBUTE, e);
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or_else(default_log_level)
    }
}
