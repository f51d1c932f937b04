//! Contact and join forms. Both are one [`FormController`] configured by a
//! [`FormSpec`]; only the join form carries a draft.

pub mod dom;

use crate::config::SiteConfig;
use crate::storage::{discard_draft, load_draft, save_draft, Draft, DraftStore};
use crate::validation::{validate_fields, FieldDescriptor, ValidationReport};

pub const CONTACT_FORM_ID: &str = "contact-form";
pub const JOIN_FORM_ID: &str = "join-form";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Cleared,
    Error(String),
    Success(String),
}

/// What a form controller needs from its form. Implemented over the DOM by
/// [`dom::DomForm`].
pub trait FormView {
    /// Current value of the input with this id, or `None` if the form has
    /// no such input.
    fn field_value(&self, id: &str) -> Option<String>;

    /// Sets or clears the error state of one field.
    fn mark_field(&mut self, id: &str, error: Option<&str>);

    fn set_status(&mut self, status: &FormStatus);

    fn reset(&mut self);

    /// Every named control and its value.
    fn named_values(&self) -> Draft;

    /// Writes a value into the named control, if the form has one.
    fn fill_named(&mut self, name: &str, value: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    pub form_id: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub success_message: String,
    pub draft_key: Option<String>,
}

impl FormSpec {
    pub fn contact(config: &SiteConfig) -> Self {
        Self {
            form_id: CONTACT_FORM_ID,
            fields: vec![
                FieldDescriptor::required("contact-name"),
                FieldDescriptor::required("contact-email").email(),
                FieldDescriptor::required("contact-message"),
            ],
            success_message: config.contact_success.clone(),
            draft_key: None,
        }
    }

    pub fn join(config: &SiteConfig) -> Self {
        Self {
            form_id: JOIN_FORM_ID,
            fields: vec![
                FieldDescriptor::required("join-full-name"),
                FieldDescriptor::required("join-email").email(),
                FieldDescriptor::required("join-message"),
            ],
            success_message: config.join_success.clone(),
            draft_key: Some(config.draft_key.clone()),
        }
    }
}

pub struct FormController {
    spec: FormSpec,
    store: Option<Box<dyn DraftStore>>,
}

impl FormController {
    pub fn new(spec: FormSpec) -> Self {
        Self { spec, store: None }
    }

    /// Attaches draft persistence. Ignored for specs without a draft key.
    pub fn with_store(mut self, store: Box<dyn DraftStore>) -> Self {
        if self.spec.draft_key.is_some() {
            self.store = Some(store);
        }
        self
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    fn draft(&self) -> Option<(&dyn DraftStore, &str)> {
        match (&self.store, &self.spec.draft_key) {
            (Some(store), Some(key)) => Some((store.as_ref(), key.as_str())),
            _ => None,
        }
    }

    /// Prefills the form from a stored draft. Returns how many controls
    /// were filled.
    pub fn restore(&self, view: &mut dyn FormView) -> usize {
        let Some((store, key)) = self.draft() else {
            return 0;
        };
        let Some(draft) = load_draft(store, key) else {
            return 0;
        };
        draft
            .iter()
            .filter(|(name, value)| view.fill_named(name, value))
            .count()
    }

    /// Snapshots the form into the draft after an edit.
    pub fn record(&self, view: &dyn FormView) {
        if let Some((store, key)) = self.draft() {
            save_draft(store, key, &view.named_values());
        }
    }

    pub fn submit(&self, view: &mut dyn FormView) -> ValidationReport {
        let report = validate_fields(view, &self.spec.fields);
        if !report.is_valid() {
            log::debug!("{} rejected", self.spec.form_id);
            return report;
        }

        view.reset();
        view.set_status(&FormStatus::Success(self.spec.success_message.clone()));
        if let Some((store, key)) = self.draft() {
            discard_draft(store, key);
        }
        log::info!("{} submitted", self.spec.form_id);
        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::error::Result;
    use crate::storage::MemoryDraftStore;
    use crate::validation::{EMAIL_MESSAGE, FIX_FIELDS_MESSAGE, REQUIRED_MESSAGE};

    struct Control {
        id: String,
        name: Option<String>,
        value: String,
    }

    pub struct FakeForm {
        controls: Vec<Control>,
        errors: HashMap<String, String>,
        pub status: FormStatus,
        pub resets: usize,
    }

    impl FakeForm {
        /// Controls whose name equals their id.
        pub fn with_fields(fields: &[(&str, &str)]) -> Self {
            let named: Vec<_> = fields.iter().map(|(id, v)| (*id, *id, *v)).collect();
            Self::with_named(&named)
        }

        pub fn with_named(fields: &[(&str, &str, &str)]) -> Self {
            Self {
                controls: fields
                    .iter()
                    .map(|(id, name, value)| Control {
                        id: id.to_string(),
                        name: Some(name.to_string()),
                        value: value.to_string(),
                    })
                    .collect(),
                errors: HashMap::new(),
                status: FormStatus::Cleared,
                resets: 0,
            }
        }

        pub fn set_value(&mut self, id: &str, value: &str) {
            if let Some(control) = self.controls.iter_mut().find(|c| c.id == id) {
                control.value = value.to_string();
            }
        }

        pub fn value(&self, id: &str) -> Option<&str> {
            self.controls
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.value.as_str())
        }

        pub fn error(&self, id: &str) -> Option<&str> {
            self.errors.get(id).map(String::as_str)
        }
    }

    impl FormView for FakeForm {
        fn field_value(&self, id: &str) -> Option<String> {
            self.value(id).map(str::to_string)
        }

        fn mark_field(&mut self, id: &str, error: Option<&str>) {
            match error {
                Some(message) => {
                    self.errors.insert(id.to_string(), message.to_string());
                }
                None => {
                    self.errors.remove(id);
                }
            }
        }

        fn set_status(&mut self, status: &FormStatus) {
            self.status = status.clone();
        }

        fn reset(&mut self) {
            self.resets += 1;
            for control in &mut self.controls {
                control.value.clear();
            }
        }

        fn named_values(&self) -> Draft {
            self.controls
                .iter()
                .filter_map(|c| c.name.clone().map(|name| (name, c.value.clone())))
                .collect()
        }

        fn fill_named(&mut self, name: &str, value: &str) -> bool {
            match self
                .controls
                .iter_mut()
                .find(|c| c.name.as_deref() == Some(name))
            {
                Some(control) => {
                    control.value = value.to_string();
                    true
                }
                None => false,
            }
        }
    }

    /// Shares one in-memory store between a controller and the test, the
    /// way two page loads share `localStorage`.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<MemoryDraftStore>);

    impl DraftStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<()> {
            self.0.delete(key)
        }
    }

    fn contact_form(name: &str, email: &str, message: &str) -> FakeForm {
        FakeForm::with_fields(&[
            ("contact-name", name),
            ("contact-email", email),
            ("contact-message", message),
        ])
    }

    fn join_form() -> FakeForm {
        FakeForm::with_named(&[
            ("join-full-name", "full_name", ""),
            ("join-email", "email", ""),
            ("join-message", "message", ""),
        ])
    }

    fn join_controller(store: &SharedStore) -> FormController {
        FormController::new(FormSpec::join(&SiteConfig::default()))
            .with_store(Box::new(store.clone()))
    }

    #[test]
    fn contact_rejects_missing_name_and_bad_email() {
        let controller = FormController::new(FormSpec::contact(&SiteConfig::default()));
        let mut form = contact_form("", "bob@example", "hi");

        let report = controller.submit(&mut form);

        assert!(!report.is_valid());
        assert_eq!(form.error("contact-name"), Some(REQUIRED_MESSAGE));
        assert_eq!(form.error("contact-email"), Some(EMAIL_MESSAGE));
        assert_eq!(form.error("contact-message"), None);
        assert_eq!(form.status, FormStatus::Error(FIX_FIELDS_MESSAGE.to_string()));
        assert_eq!(form.resets, 0);
        assert_eq!(form.value("contact-email"), Some("bob@example"));
    }

    #[test]
    fn contact_accepts_valid_submission() {
        let config = SiteConfig::default();
        let controller = FormController::new(FormSpec::contact(&config));
        let mut form = contact_form("Ada", "ada@example.com", "hi");

        let report = controller.submit(&mut form);

        assert!(report.is_valid());
        assert_eq!(form.error("contact-name"), None);
        assert_eq!(form.error("contact-email"), None);
        assert_eq!(form.resets, 1);
        assert_eq!(form.value("contact-name"), Some(""));
        assert_eq!(
            form.status,
            FormStatus::Success("Message sent. We’ll get back to you shortly.".to_string())
        );
    }

    #[test]
    fn contact_ignores_store() {
        let store = SharedStore::default();
        let controller = FormController::new(FormSpec::contact(&SiteConfig::default()))
            .with_store(Box::new(store.clone()));
        let form = contact_form("Ada", "", "");

        controller.record(&form);

        assert!(!store.0.contains("xcoudlabs-join"));
    }

    #[test]
    fn join_draft_survives_reload() {
        let store = SharedStore::default();

        let controller = join_controller(&store);
        let mut form = join_form();
        form.set_value("join-full-name", "Ada Lovelace");
        controller.record(&form);
        form.set_value("join-email", "ada@");
        controller.record(&form);

        // Fresh page, same storage.
        let controller = join_controller(&store);
        let mut reloaded = join_form();
        let filled = controller.restore(&mut reloaded);

        assert_eq!(filled, 3);
        assert_eq!(reloaded.value("join-full-name"), Some("Ada Lovelace"));
        assert_eq!(reloaded.value("join-email"), Some("ada@"));
        assert_eq!(reloaded.value("join-message"), Some(""));
    }

    #[test]
    fn join_restore_skips_unknown_names() {
        let store = SharedStore::default();
        store
            .set("xcoudlabs-join", r#"{"full_name": "Ada", "company": "ACME"}"#)
            .unwrap();

        let mut form = join_form();
        let filled = join_controller(&store).restore(&mut form);

        assert_eq!(filled, 1);
        assert_eq!(form.value("join-full-name"), Some("Ada"));
    }

    #[test]
    fn join_restore_ignores_corrupt_draft() {
        let store = SharedStore::default();
        store.set("xcoudlabs-join", "not json").unwrap();

        let mut form = join_form();
        assert_eq!(join_controller(&store).restore(&mut form), 0);
        assert_eq!(form.value("join-full-name"), Some(""));
    }

    #[test]
    fn join_success_deletes_draft() {
        let store = SharedStore::default();
        let controller = join_controller(&store);
        let mut form = join_form();
        form.set_value("join-full-name", "Ada");
        form.set_value("join-email", "ada@example.com");
        form.set_value("join-message", "Let me in");
        controller.record(&form);
        assert!(store.0.contains("xcoudlabs-join"));

        let report = controller.submit(&mut form);

        assert!(report.is_valid());
        assert!(!store.0.contains("xcoudlabs-join"));
        assert_eq!(
            form.status,
            FormStatus::Success(
                "Thanks for reaching out! We’ll review your details and get back to you."
                    .to_string()
            )
        );
    }

    #[test]
    fn join_failure_keeps_draft() {
        let store = SharedStore::default();
        let controller = join_controller(&store);
        let mut form = join_form();
        form.set_value("join-full-name", "Ada");
        controller.record(&form);

        let report = controller.submit(&mut form);

        assert!(!report.is_valid());
        assert!(store.0.contains("xcoudlabs-join"));
        assert_eq!(form.value("join-full-name"), Some("Ada"));
    }

    #[test]
    fn join_works_without_storage() {
        let controller = FormController::new(FormSpec::join(&SiteConfig::default()))
            .with_store(Box::new(MemoryDraftStore::failing()));
        let mut form = join_form();
        form.set_value("join-full-name", "Ada");
        form.set_value("join-email", "ada@example.com");
        form.set_value("join-message", "hi");

        controller.record(&form);
        assert_eq!(controller.restore(&mut form), 0);
        assert!(controller.submit(&mut form).is_valid());
    }
}
