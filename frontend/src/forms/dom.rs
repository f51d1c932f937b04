use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlFormElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use super::{FormStatus, FormView};
use crate::error::{Result, SiteError};
use crate::storage::Draft;

const FIELD_WRAPPER: &str = ".field";
const FIELD_ERROR: &str = ".field-error";
const FIELD_ERROR_CLASS: &str = "field--error";
const STATUS: &str = ".form-status";
const STATUS_SUCCESS: &str = "form-status--success";
const STATUS_ERROR: &str = "form-status--error";
const NAMED_CONTROLS: &str = "input[name], textarea[name], select[name]";

/// Text-bearing form controls.
enum Control {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
    Select(HtmlSelectElement),
}

impl Control {
    fn from_element(element: Element) -> Option<Self> {
        let element = match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => return Some(Control::Input(input)),
            Err(element) => element,
        };
        let element = match element.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => return Some(Control::TextArea(area)),
            Err(element) => element,
        };
        element.dyn_into::<HtmlSelectElement>().ok().map(Control::Select)
    }

    fn value(&self) -> String {
        match self {
            Control::Input(el) => el.value(),
            Control::TextArea(el) => el.value(),
            Control::Select(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Control::Input(el) => el.set_value(value),
            Control::TextArea(el) => el.set_value(value),
            Control::Select(el) => el.set_value(value),
        }
    }

    fn name(&self) -> String {
        match self {
            Control::Input(el) => el.name(),
            Control::TextArea(el) => el.name(),
            Control::Select(el) => el.name(),
        }
    }
}

fn is_validated_tag(tag_name: &str) -> bool {
    tag_name.eq_ignore_ascii_case("input") || tag_name.eq_ignore_ascii_case("textarea")
}

/// A `<form>` in the page. All lookups are scoped to the form element.
pub struct DomForm {
    form: HtmlFormElement,
    status: Option<Element>,
}

impl DomForm {
    pub fn find(document: &Document, id: &'static str) -> Result<Self> {
        let form = document
            .get_element_by_id(id)
            .ok_or(SiteError::MissingElement(id))?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| SiteError::MissingElement(id))?;
        let status = form.query_selector(STATUS).ok().flatten();
        Ok(Self { form, status })
    }

    pub fn element(&self) -> &HtmlFormElement {
        &self.form
    }

    fn control(&self, selector: &str) -> Option<Control> {
        self.form
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(Control::from_element)
    }

    /// A validated field by id. Selects are drafted but never validated.
    fn by_id(&self, id: &str) -> Option<(Element, Control)> {
        let element = self.form.query_selector(&format!("#{}", id)).ok().flatten()?;
        if !is_validated_tag(&element.tag_name()) {
            return None;
        }
        let control = Control::from_element(element.clone())?;
        Some((element, control))
    }
}

impl FormView for DomForm {
    fn field_value(&self, id: &str) -> Option<String> {
        self.by_id(id).map(|(_, control)| control.value())
    }

    fn mark_field(&mut self, id: &str, error: Option<&str>) {
        let Some((element, _)) = self.by_id(id) else {
            return;
        };
        let Some(wrapper) = element.closest(FIELD_WRAPPER).ok().flatten() else {
            return;
        };
        let _ = wrapper
            .class_list()
            .toggle_with_force(FIELD_ERROR_CLASS, error.is_some());
        if let Some(slot) = wrapper.query_selector(FIELD_ERROR).ok().flatten() {
            slot.set_text_content(Some(error.unwrap_or("")));
        }
    }

    fn set_status(&mut self, status: &FormStatus) {
        let Some(el) = &self.status else {
            return;
        };
        let classes = el.class_list();
        let _ = classes.remove_2(STATUS_SUCCESS, STATUS_ERROR);
        match status {
            FormStatus::Cleared => el.set_text_content(Some("")),
            FormStatus::Error(message) => {
                el.set_text_content(Some(message.as_str()));
                let _ = classes.add_1(STATUS_ERROR);
            }
            FormStatus::Success(message) => {
                el.set_text_content(Some(message.as_str()));
                let _ = classes.add_1(STATUS_SUCCESS);
            }
        }
    }

    fn reset(&mut self) {
        self.form.reset();
    }

    fn named_values(&self) -> Draft {
        let mut draft = Draft::new();
        let Ok(nodes) = self.form.query_selector_all(NAMED_CONTROLS) else {
            return draft;
        };
        for i in 0..nodes.length() {
            let control = nodes
                .item(i)
                .and_then(|node| node.dyn_into::<Element>().ok())
                .and_then(Control::from_element);
            if let Some(control) = control {
                draft.insert(control.name(), control.value());
            }
        }
        draft
    }

    fn fill_named(&mut self, name: &str, value: &str) -> bool {
        let selector = format!("[name=\"{}\"]", name.replace('"', "\\\""));
        match self.control(&selector) {
            Some(control) => {
                control.set_value(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_text_entry_controls_are_validated() {
        assert!(is_validated_tag("INPUT"));
        assert!(is_validated_tag("textarea"));
        assert!(!is_validated_tag("SELECT"));
        assert!(!is_validated_tag("DIV"));
    }
}
