use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

pub const STATUS_ID: &str = "status";
pub const LOADING_MODAL_ID: &str = "loadingModal";

pub fn web_document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

pub fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
    web_document()
        .and_then(|doc| doc.get_element_by_id(id))
        .and_then(|node| node.dyn_into::<T>().ok())
}

pub fn set_text(id: &str, value: impl AsRef<str>) {
    let Some(doc) = web_document() else {
        return;
    };
    let Some(node) = doc.get_element_by_id(id) else {
        return;
    };
    let next = value.as_ref();
    if node.text_content().as_deref() == Some(next) {
        return;
    }
    node.set_text_content(Some(next));
}

pub fn set_display(element: &HtmlElement, visible: bool) {
    let style = element.style();
    if visible {
        let _ = style.remove_property("display");
    } else {
        let _ = style.set_property("display", "none");
    }
}

pub fn set_nav_enabled(id: &str, enabled: bool) {
    let Some(element) = element_by_id::<HtmlElement>(id) else {
        return;
    };

    let _ = element
        .style()
        .set_property("opacity", if enabled { "1" } else { "0.5" });
    if enabled {
        let _ = element.remove_attribute("disabled");
        let _ = element.set_attribute("aria-disabled", "false");
    } else {
        let _ = element.set_attribute("disabled", "disabled");
        let _ = element.set_attribute("aria-disabled", "true");
    }
}

pub fn set_status_text(text: &str) {
    set_text(STATUS_ID, text);
}

pub fn clear_status() {
    if let Some(panel) = element_by_id::<HtmlElement>(STATUS_ID) {
        panel.set_text_content(None);
    }
}

/// Appends one `<p>` line to the status panel and keeps it scrolled to the
/// newest entry.
pub fn append_status(message: &str) {
    let Some(doc) = web_document() else {
        return;
    };
    let Some(panel) = doc
        .get_element_by_id(STATUS_ID)
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let Ok(line) = doc.create_element("p") else {
        return;
    };
    line.set_text_content(Some(message));
    let _ = panel.append_child(&line);
    panel.set_scroll_top(panel.scroll_height());
}

pub fn show_loading_modal() {
    if let Some(modal) = element_by_id::<HtmlElement>(LOADING_MODAL_ID) {
        let _ = modal.style().set_property("display", "flex");
    }
}

pub fn hide_loading_modal() {
    if let Some(modal) = element_by_id::<HtmlElement>(LOADING_MODAL_ID) {
        let _ = modal.style().set_property("display", "none");
    }
}

pub fn named_field(name: &str) -> Option<Element> {
    web_document()?
        .query_selector(&format!("[name=\"{name}\"]"))
        .ok()
        .flatten()
}

pub fn field_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    element
        .dyn_ref::<HtmlTextAreaElement>()
        .map(|textarea| textarea.value())
}

pub fn set_field_value(element: &Element, value: &str) {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
        textarea.set_value(value);
    }
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn reload_page() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().reload();
    }
}

pub fn navigate(path: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_href(path);
    }
}
